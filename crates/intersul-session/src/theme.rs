//! Light/dark theme preference.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::error::Result;
use crate::storage::{Storage, THEME_KEY};

/// The user's preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow the system appearance.
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// The appearance actually in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ResolvedTheme {
    pub fn as_theme(self) -> Theme {
        match self {
            ResolvedTheme::Light => Theme::Light,
            ResolvedTheme::Dark => Theme::Dark,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            ResolvedTheme::Light => ResolvedTheme::Dark,
            ResolvedTheme::Dark => ResolvedTheme::Light,
        }
    }
}

impl fmt::Display for ResolvedTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.as_theme(), f)
    }
}

/// Source of the system's light/dark preference.
pub trait SystemAppearance: Send + Sync {
    fn prefers_dark(&self) -> bool;
}

/// An appearance set by hand, e.g. from a flag or in tests.
#[derive(Debug, Default)]
pub struct StaticAppearance {
    dark: AtomicBool,
}

impl StaticAppearance {
    pub fn new(dark: bool) -> Self {
        Self {
            dark: AtomicBool::new(dark),
        }
    }

    pub fn set_dark(&self, dark: bool) {
        self.dark.store(dark, Ordering::SeqCst);
    }
}

impl SystemAppearance for StaticAppearance {
    fn prefers_dark(&self) -> bool {
        self.dark.load(Ordering::SeqCst)
    }
}

/// Preference plus the theme it resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeState {
    pub theme: Theme,
    pub resolved: ResolvedTheme,
}

impl ThemeState {
    pub fn is_dark(&self) -> bool {
        self.resolved == ResolvedTheme::Dark
    }
}

/// Owner of the theme preference.
pub struct ThemeStore {
    storage: Arc<dyn Storage>,
    appearance: Arc<dyn SystemAppearance>,
    tx: watch::Sender<ThemeState>,
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("state", &*self.tx.borrow())
            .finish_non_exhaustive()
    }
}

impl ThemeStore {
    pub fn new(storage: Arc<dyn Storage>, appearance: Arc<dyn SystemAppearance>) -> Self {
        let (tx, _) = watch::channel(ThemeState {
            theme: Theme::System,
            resolved: ResolvedTheme::Light,
        });
        Self {
            storage,
            appearance,
            tx,
        }
    }

    /// Load the stored preference. Missing or unknown values mean `System`.
    pub fn init(&self) -> ThemeState {
        let theme = self
            .storage
            .get(THEME_KEY)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();
        self.publish(theme)
    }

    /// Persist and apply a preference.
    pub fn set_theme(&self, theme: Theme) -> Result<ThemeState> {
        self.storage.set(THEME_KEY, theme.as_str())?;
        Ok(self.publish(theme))
    }

    /// Switch to the opposite of what is currently shown.
    ///
    /// The result is always an explicit light or dark preference.
    pub fn toggle(&self) -> Result<ThemeState> {
        let next = self.state().resolved.opposite().as_theme();
        self.set_theme(next)
    }

    /// Re-resolve after the system appearance changed.
    ///
    /// Only a `System` preference follows the change.
    pub fn system_changed(&self) -> ThemeState {
        let state = self.state();
        if state.theme != Theme::System {
            return state;
        }
        self.publish(Theme::System)
    }

    pub fn state(&self) -> ThemeState {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeState> {
        self.tx.subscribe()
    }

    fn resolve(&self, theme: Theme) -> ResolvedTheme {
        match theme {
            Theme::Light => ResolvedTheme::Light,
            Theme::Dark => ResolvedTheme::Dark,
            Theme::System if self.appearance.prefers_dark() => ResolvedTheme::Dark,
            Theme::System => ResolvedTheme::Light,
        }
    }

    fn publish(&self, theme: Theme) -> ThemeState {
        let state = ThemeState {
            theme,
            resolved: self.resolve(theme),
        };
        self.tx.send_if_modified(|current| {
            let changed = *current != state;
            *current = state;
            changed
        });
        debug!(theme = %state.theme, resolved = %state.resolved, "Theme applied");
        state
    }
}
