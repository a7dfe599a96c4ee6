//! Services command - service orders.

use anyhow::Result;
use clap::{Args, Subcommand};
use console::Style;

use intersul_forms::schemas;
use intersul_types::{EntityId, Service, ServiceQuery};

use super::{Context, Form, field, header, truncate, wire};

/// Arguments for the services command.
#[derive(Args, Debug)]
pub struct ServicesArgs {
    #[command(subcommand)]
    pub command: ServicesCommand,
}

#[derive(Subcommand, Debug)]
pub enum ServicesCommand {
    /// List service orders
    List {
        #[arg(short, long)]
        search: Option<String>,

        /// pending, in_progress, completed, cancelled, on_hold
        #[arg(long)]
        status: Option<String>,

        /// low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// Only orders for this client
        #[arg(long)]
        client: Option<EntityId>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show a service order with its steps
    Show {
        id: EntityId,
    },
}

/// Run the services command.
pub async fn run(args: ServicesArgs, ctx: &Context) -> Result<()> {
    let services = ctx.app.services();

    match args.command {
        ServicesCommand::List {
            search,
            status,
            priority,
            client,
            page,
            limit,
        } => {
            let query: ServiceQuery = Form::new()
                .opt("search", search)
                .opt("status", status)
                .opt("priority", priority)
                .opt("client_id", client)
                .opt("page", page)
                .opt("limit", limit)
                .validate(&schemas::service_query())?;
            let found = services.list(&query).await?;

            if ctx.json_output {
                return ctx.print_json(&found);
            }
            header("Service Orders");
            print_table(&found);
        }
        ServicesCommand::Show { id } => {
            let service = services.get(id).await?;
            if ctx.json_output {
                return ctx.print_json(&service);
            }
            print_service(&service);
        }
    }

    Ok(())
}

fn print_table(services: &[Service]) {
    let dim = Style::new().dim();
    if services.is_empty() {
        println!("{}", dim.apply_to("No service orders found"));
        return;
    }
    for service in services {
        println!(
            "{} {:<32} {:<20} {:<12} {}",
            dim.apply_to(format!("[{:>4}]", service.id)),
            truncate(&service.title, 32),
            truncate(&service.client.name, 20),
            wire(&service.status),
            dim.apply_to(wire(&service.priority)),
        );
    }
}

fn print_service(service: &Service) {
    let dim = Style::new().dim();

    header(&service.title);
    field("ID", service.id);
    field("Client", &service.client.name);
    field("Category", &service.category.name);
    field("Status", wire(&service.status));
    field("Priority", wire(&service.priority));
    if let Some(user) = &service.assigned_to {
        field("Assigned to", &user.name);
    }
    if let Some(date) = &service.scheduled_date {
        field("Scheduled", date);
    }
    if let Some(date) = &service.completed_date {
        field("Completed", date);
    }
    if let Some(description) = &service.description {
        field("Description", description);
    }

    if !service.steps.is_empty() {
        println!();
        println!("  {}", console::style("Steps").bold());
        let mut steps: Vec<_> = service.steps.iter().collect();
        steps.sort_by_key(|s| s.order);
        for step in steps {
            println!(
                "  {} {:<36} {}",
                dim.apply_to(format!("{:>2}.", step.order)),
                truncate(&step.title, 36),
                dim.apply_to(wire(&step.status)),
            );
        }
    }
}
