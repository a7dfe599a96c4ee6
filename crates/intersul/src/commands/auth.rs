//! Login, logout and whoami.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use console::Style;
use serde::Serialize;

use intersul_forms::schemas;
use intersul_types::{LoginRequest, User};

use super::{Context, Form, field, header, success};

/// Arguments for the login command.
#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
struct WhoamiOutput<'a> {
    authenticated: bool,
    user: Option<&'a User>,
    server: &'a str,
}

pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let email = match args.email {
        Some(email) => email,
        None => {
            print!("Email: ");
            std::io::stdout().flush()?;
            let mut input = String::new();
            std::io::stdin().read_line(&mut input)?;
            input.trim().to_string()
        }
    };
    let password = rpassword::prompt_password("Password: ")?;

    let request: LoginRequest = Form::new()
        .set("email", email)
        .set("password", password)
        .validate(&schemas::login())?;

    let response = ctx.app.auth().login(&request).await?;

    if ctx.json_output {
        return ctx.print_json(&response.user);
    }
    match response.user {
        Some(user) if ctx.app.session().snapshot().is_authenticated => {
            success(format!("Signed in as {} ({})", user.name, user.role));
        }
        _ => {
            let yellow = Style::new().yellow();
            println!(
                "{} The server accepted the credentials but returned no session.",
                yellow.apply_to("!")
            );
        }
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let was_signed_in = ctx.app.session().snapshot().is_authenticated;
    ctx.app.auth().logout().await?;

    if ctx.json_output {
        return ctx.print_json(&serde_json::json!({ "signed_out": was_signed_in }));
    }
    if was_signed_in {
        success("Signed out");
    } else {
        println!("{}", Style::new().dim().apply_to("Not signed in"));
    }
    Ok(())
}

pub async fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx.app.session().snapshot();
    let server = ctx.app.client().base_url().as_str();

    if ctx.json_output {
        return ctx.print_json(&WhoamiOutput {
            authenticated: session.is_authenticated,
            user: session.user.as_ref(),
            server,
        });
    }

    let Some(user) = &session.user else {
        let dim = Style::new().dim();
        println!("{}", dim.apply_to("Not signed in. Run `intersul login`."));
        return Ok(());
    };

    header("Signed-in User");
    field("Name", &user.name);
    field("Email", &user.email);
    field("Role", user.role);
    if let Some(sector) = &user.sector {
        field("Sector", sector);
    }
    field("Server", server);

    let mut permissions = Vec::new();
    if session.can_manage_users() {
        permissions.push("users");
    }
    if session.can_manage_services() {
        permissions.push("services");
    }
    if session.can_view_reports() {
        permissions.push("reports");
    }
    if !permissions.is_empty() {
        field("Manages", permissions.join(", "));
    }
    Ok(())
}
