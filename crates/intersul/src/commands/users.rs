//! Users command - console accounts.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;

use intersul_forms::schemas;
use intersul_types::{EntityId, User, UserQuery};

use super::{Context, Form, header, success, truncate};

/// Arguments for the users command.
#[derive(Args, Debug)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    /// List users
    List {
        #[arg(short, long)]
        search: Option<String>,

        /// admin, manager, technician, commercial
        #[arg(long)]
        role: Option<String>,
    },

    /// Activate or deactivate a user
    Toggle {
        id: EntityId,
    },
}

/// Run the users command.
pub async fn run(args: UsersArgs, ctx: &Context) -> Result<()> {
    let users = ctx.app.users();

    match args.command {
        UsersCommand::List { search, role } => {
            let query: UserQuery = Form::new()
                .opt("search", search)
                .opt("role", role)
                .validate(&schemas::user_query())?;
            let found = users.list(&query).await?;

            if ctx.json_output {
                return ctx.print_json(&found);
            }
            header("Users");
            print_table(&found);
        }
        UsersCommand::Toggle { id } => {
            let user = users.toggle_active(id).await?;
            if ctx.json_output {
                return ctx.print_json(&user);
            }
            let state = if user.is_active { "activated" } else { "deactivated" };
            success(format!("{} {}", user.name, state));
        }
    }

    Ok(())
}

fn print_table(users: &[User]) {
    let dim = Style::new().dim();
    let red = Style::new().red();
    if users.is_empty() {
        println!("{}", dim.apply_to("No users found"));
        return;
    }
    for user in users {
        let active = if user.is_active {
            String::new()
        } else {
            red.apply_to("inactive").to_string()
        };
        println!(
            "{} {:<28} {:<32} {:<11} {}",
            dim.apply_to(format!("[{:>4}]", user.id)),
            truncate(&user.name, 28),
            truncate(&user.email, 32),
            user.role.as_str(),
            active,
        );
    }
}
