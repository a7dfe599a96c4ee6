//! CLI command handlers.

pub mod auth;
pub mod catalog;
pub mod clients;
pub mod services;
pub mod stats;
pub mod theme;
pub mod users;

use std::sync::Arc;

use anyhow::{Context as _, Result};
use console::Style;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use intersul_config::ApiConfig;
use intersul_console::{AppContext, ConsoleError, FileStorage, Navigator, SystemAppearance};
use intersul_forms::Schema;

/// Shared context for all commands.
pub struct Context {
    /// Session, cache and API access.
    pub app: AppContext,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Resolve configuration and restore the stored session.
    pub fn load(server: Option<String>, json_output: bool, verbose: bool) -> Result<Self> {
        let loaded = intersul_config::load_config(None).context("Failed to load configuration")?;
        for warning in &loaded.warnings {
            warn!("{}", warning);
        }
        debug!(sources = ?loaded.loaded_from(), "Configuration loaded");

        let mut config = loaded.config;
        if let Some(url) = server {
            config.api.get_or_insert_with(ApiConfig::default).url = url;
            config.validate()?;
        }

        let storage = Arc::new(FileStorage::in_dir(&config.data_dir()));
        let app = AppContext::init(
            &config,
            storage,
            Arc::new(CliNavigator),
            Arc::new(TerminalAppearance),
        )?;

        Ok(Self {
            app,
            json_output,
            verbose,
        })
    }

    /// Print `value` as pretty JSON.
    pub fn print_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

/// Terminal stand-in for page navigation.
///
/// The only navigation the console triggers on its own is the redirect to
/// the login page after a 401, which becomes a hint on stderr.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn navigate(&self, path: &str) {
        let yellow = Style::new().yellow();
        if path.starts_with(intersul_session::LOGIN_PATH) {
            eprintln!(
                "{} Session expired. Run `intersul login` to sign in again.",
                yellow.apply_to("!")
            );
        }
    }
}

/// Dark/light preference from the terminal's `COLORFGBG` variable
/// (`"<fg>;<bg>"`), which many terminals export.
struct TerminalAppearance;

impl SystemAppearance for TerminalAppearance {
    fn prefers_dark(&self) -> bool {
        std::env::var("COLORFGBG")
            .ok()
            .and_then(|v| v.rsplit(';').next().and_then(|bg| bg.parse::<u8>().ok()))
            .is_some_and(|bg| bg < 7 || bg == 8)
    }
}

/// Print a console error the way the user should see it.
pub fn report(err: &ConsoleError, ctx: &Context) {
    let red = Style::new().red();
    let dim = Style::new().dim();

    eprintln!("{} {}", red.apply_to("Error:"), err.user_message());
    if let Some(fields) = err.field_errors() {
        for (path, message) in fields.iter() {
            let path = if path.is_empty() { "input" } else { path };
            eprintln!("  {} {}", dim.apply_to(format!("{}:", path)), message);
        }
    }
    if ctx.verbose {
        eprintln!("  {} {}", dim.apply_to("Detail:"), err);
    }
}

/// Collects the flags a user actually passed into a form object.
#[derive(Default)]
pub struct Form(Map<String, Value>);

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    /// Set `key` only when a value was given.
    pub fn opt<V: Into<Value>>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.insert(key.to_string(), value.into());
        }
        self
    }

    /// Validate against `schema` and decode.
    pub fn validate<T: DeserializeOwned>(self, schema: &Schema) -> Result<T, ConsoleError> {
        Ok(intersul_forms::validate(schema, &Value::Object(self.0))?)
    }
}

pub fn truncate(s: &str, max_chars: usize) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= max_chars {
        s
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

/// Wire name of a unit enum, e.g. `in_progress`.
pub fn wire<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

pub fn header(title: &str) {
    let dim = Style::new().dim();
    println!("{}", console::style(title).bold());
    println!("{}", dim.apply_to("─".repeat(50)));
}

pub fn field(label: &str, value: impl std::fmt::Display) {
    let dim = Style::new().dim();
    println!("  {} {}", dim.apply_to(format!("{:<14}", format!("{}:", label))), value);
}

pub fn success(message: impl std::fmt::Display) {
    let green = Style::new().green();
    println!("{} {}", green.apply_to("✓"), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use intersul_types::CreateClientRequest;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Gráfica Sul", 20), "Gráfica Sul");
        assert_eq!(truncate("Gráfica Sul Ltda", 10), "Gráfica...");
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(wire(&intersul_types::ServiceStatus::InProgress), "in_progress");
        assert_eq!(wire(&intersul_types::ClientStatus::Suspended), "suspended");
    }

    #[test]
    fn test_form_skips_missing_flags() {
        let request: CreateClientRequest = Form::new()
            .set("name", "Gráfica Sul")
            .set("email", "contato@graficasul.com.br")
            .opt("phone", None::<String>)
            .opt("city", Some("Porto Alegre"))
            .validate(&intersul_forms::schemas::client())
            .unwrap();
        assert_eq!(request.city.as_deref(), Some("Porto Alegre"));
        assert_eq!(request.phone, None);
    }

    #[test]
    fn test_form_reports_field_errors() {
        let err = Form::new()
            .set("name", "G")
            .set("email", "not-an-email")
            .validate::<CreateClientRequest>(&intersul_forms::schemas::client())
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.contains("name"));
        assert!(fields.contains("email"));
    }
}
