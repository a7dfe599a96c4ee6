//! Theme command - light/dark preference.

use anyhow::Result;
use clap::{Args, Subcommand};

use intersul_console::{Theme, ThemeState};

use super::{Context, field, header, success};

/// Arguments for the theme command.
#[derive(Args, Debug)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: ThemeCommand,
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommand {
    /// Show the preference and the theme in effect
    Show,

    /// Set the preference (light, dark, system)
    Set {
        theme: Theme,
    },

    /// Switch between light and dark
    Toggle,
}

/// Run the theme command.
pub async fn run(args: ThemeArgs, ctx: &Context) -> Result<()> {
    let themes = ctx.app.theme();

    let (state, changed) = match args.command {
        ThemeCommand::Show => (themes.state(), false),
        ThemeCommand::Set { theme } => (themes.set_theme(theme)?, true),
        ThemeCommand::Toggle => (themes.toggle()?, true),
    };

    if ctx.json_output {
        return ctx.print_json(&state);
    }
    if changed {
        success(format!("Theme set to {}", state.theme));
    }
    print_state(&state);
    Ok(())
}

fn print_state(state: &ThemeState) {
    header("Theme");
    field("Preference", state.theme);
    field("In effect", state.resolved);
}
