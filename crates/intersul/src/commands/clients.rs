//! Clients command - client management.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;

use intersul_forms::schemas;
use intersul_types::{Client, ClientQuery, CreateClientRequest, EntityId};

use super::{Context, Form, field, header, success, truncate, wire};

/// Arguments for the clients command.
#[derive(Args, Debug)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientsCommand {
    /// List clients
    List {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by status (active, inactive, suspended)
        #[arg(long)]
        status: Option<String>,

        /// Filter by city
        #[arg(long)]
        city: Option<String>,

        /// Page number
        #[arg(long)]
        page: Option<u32>,

        /// Page size
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show a client
    Show {
        /// Client ID
        id: EntityId,
    },

    /// Create a client
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Phone, formatted (XX) XXXXX-XXXX
        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        contact_person: Option<String>,

        #[arg(long)]
        address: Option<String>,

        #[arg(long)]
        city: Option<String>,

        #[arg(long)]
        state: Option<String>,

        #[arg(long)]
        zip_code: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete a client
    Delete {
        /// Client ID
        id: EntityId,
    },
}

/// Run the clients command.
pub async fn run(args: ClientsArgs, ctx: &Context) -> Result<()> {
    let clients = ctx.app.clients();

    match args.command {
        ClientsCommand::List {
            search,
            status,
            city,
            page,
            limit,
        } => {
            let query: ClientQuery = Form::new()
                .opt("search", search)
                .opt("status", status)
                .opt("city", city)
                .opt("page", page)
                .opt("limit", limit)
                .validate(&schemas::client_query())?;
            let found = clients.list(&query).await?;

            if ctx.json_output {
                return ctx.print_json(&found);
            }
            header("Clients");
            print_table(&found);
        }
        ClientsCommand::Show { id } => {
            let client = clients.get(id).await?;
            if ctx.json_output {
                return ctx.print_json(&client);
            }
            print_client(&client);
        }
        ClientsCommand::Create {
            name,
            email,
            phone,
            company,
            contact_person,
            address,
            city,
            state,
            zip_code,
            notes,
        } => {
            let request: CreateClientRequest = Form::new()
                .set("name", name)
                .set("email", email)
                .opt("phone", phone)
                .opt("company", company)
                .opt("contact_person", contact_person)
                .opt("address", address)
                .opt("city", city)
                .opt("state", state)
                .opt("zip_code", zip_code)
                .opt("notes", notes)
                .validate(&schemas::client())?;
            let created = clients.create(&request).await?;

            if ctx.json_output {
                return ctx.print_json(&created);
            }
            success(format!("Client created: {} (#{})", created.name, created.id));
        }
        ClientsCommand::Delete { id } => {
            clients.delete(id).await?;
            if ctx.json_output {
                return ctx.print_json(&serde_json::json!({ "deleted": id }));
            }
            success(format!("Client #{} deleted", id));
        }
    }

    Ok(())
}

fn print_table(clients: &[Client]) {
    let dim = Style::new().dim();
    if clients.is_empty() {
        println!("{}", dim.apply_to("No clients found"));
        return;
    }
    for client in clients {
        println!(
            "{} {:<32} {:<28} {}",
            dim.apply_to(format!("[{:>4}]", client.id)),
            truncate(&client.name, 32),
            truncate(&client.email, 28),
            dim.apply_to(wire(&client.status)),
        );
    }
}

fn print_client(client: &Client) {
    header(&client.name);
    field("ID", client.id);
    field("Email", &client.email);
    field("Status", wire(&client.status));
    let optional = [
        ("Phone", &client.phone),
        ("Company", &client.company),
        ("Contact", &client.contact_person),
        ("Address", &client.address),
        ("City", &client.city),
        ("State", &client.state),
        ("ZIP", &client.zip_code),
        ("Last service", &client.last_service_date),
        ("Notes", &client.notes),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            field(label, value);
        }
    }
}
