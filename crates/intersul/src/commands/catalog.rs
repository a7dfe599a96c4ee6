//! Catalog command - copy-machine models.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use console::Style;

use intersul_client::FileUpload;
use intersul_forms::schemas;
use intersul_types::{
    CopyMachineCatalog, CreateCatalogRequest, EntityId, Paginated, UpdateCatalogRequest,
};

use super::{Context, Form, field, header, success, truncate};

/// Arguments for the catalog command.
#[derive(Args, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Model fields shared by create and update.
#[derive(Args, Debug)]
pub struct ModelFields {
    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub quantity: Option<u32>,

    /// Feature (repeatable)
    #[arg(long = "feature")]
    pub features: Vec<String>,

    /// Attach an image or brochure
    #[arg(long)]
    pub attach: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// List catalog models
    List {
        /// Search model or manufacturer
        #[arg(short, long)]
        search: Option<String>,

        #[arg(long, default_value = "1")]
        page: u32,

        #[arg(short, long, default_value = "10")]
        limit: u32,
    },

    /// Show a catalog model
    Show {
        id: EntityId,
    },

    /// Add a model to the catalog
    Create {
        #[arg(long)]
        model: String,

        #[arg(long)]
        manufacturer: String,

        #[command(flatten)]
        fields: ModelFields,
    },

    /// Update a catalog model
    Update {
        id: EntityId,

        #[arg(long)]
        model: Option<String>,

        #[arg(long)]
        manufacturer: Option<String>,

        #[command(flatten)]
        fields: ModelFields,
    },

    /// Remove a model from the catalog
    Delete {
        id: EntityId,
    },
}

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.app.catalog();

    match args.command {
        CatalogCommand::List {
            search,
            page,
            limit,
        } => {
            let found = catalog.list(search.as_deref(), page, limit).await?;
            if ctx.json_output {
                return ctx.print_json(&found);
            }
            header("Copy-Machine Catalog");
            print_page(&found);
        }
        CatalogCommand::Show { id } => {
            let machine = catalog.get(id).await?;
            if ctx.json_output {
                return ctx.print_json(&machine);
            }
            print_machine(&machine);
        }
        CatalogCommand::Create {
            model,
            manufacturer,
            fields,
        } => {
            let upload = read_attachment(fields.attach.as_ref())?;
            let request: CreateCatalogRequest = model_form(&fields)
                .set("model", model)
                .set("manufacturer", manufacturer)
                .validate(&schemas::copy_machine_catalog())?;

            let created = match upload {
                Some(upload) => catalog.create_with_file(&request, upload).await?,
                None => catalog.create(&request).await?,
            };
            if ctx.json_output {
                return ctx.print_json(&created);
            }
            success(format!("Model created: {} (#{})", created.model, created.id));
        }
        CatalogCommand::Update {
            id,
            model,
            manufacturer,
            fields,
        } => {
            let upload = read_attachment(fields.attach.as_ref())?;
            let request: UpdateCatalogRequest = model_form(&fields)
                .opt("model", model)
                .opt("manufacturer", manufacturer)
                .validate(&schemas::copy_machine_catalog().partial())?;

            let updated = match upload {
                Some(upload) => catalog.update_with_file(id, &request, upload).await?,
                None => catalog.update(id, &request).await?,
            };
            if ctx.json_output {
                return ctx.print_json(&updated);
            }
            success(format!("Model #{} updated", updated.id));
        }
        CatalogCommand::Delete { id } => {
            catalog.delete(id).await?;
            if ctx.json_output {
                return ctx.print_json(&serde_json::json!({ "deleted": id }));
            }
            success(format!("Model #{} deleted", id));
        }
    }

    Ok(())
}

fn model_form(fields: &ModelFields) -> Form {
    let features = (!fields.features.is_empty()).then(|| fields.features.clone());
    Form::new()
        .opt("description", fields.description.clone())
        .opt("price", fields.price)
        .opt("quantity", fields.quantity)
        .opt("features", features)
}

fn read_attachment(path: Option<&PathBuf>) -> Result<Option<FileUpload>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(Some(FileUpload::new(name, bytes)))
}

fn print_page(page: &Paginated<CopyMachineCatalog>) {
    let dim = Style::new().dim();
    if page.data.is_empty() {
        println!("{}", dim.apply_to("No models found"));
        return;
    }
    for machine in &page.data {
        println!(
            "{} {:<28} {:<16} {}",
            dim.apply_to(format!("[{:>4}]", machine.id)),
            truncate(&machine.model, 28),
            truncate(&machine.manufacturer, 16),
            machine
                .quantity
                .map(|q| format!("{} in stock", q))
                .unwrap_or_default(),
        );
    }
    println!();
    println!(
        "{}",
        dim.apply_to(format!(
            "Page {} of {} ({} models)",
            page.page, page.total_pages, page.total
        ))
    );
}

fn print_machine(machine: &CopyMachineCatalog) {
    header(&machine.model);
    field("ID", machine.id);
    field("Manufacturer", &machine.manufacturer);
    if let Some(description) = &machine.description {
        field("Description", description);
    }
    if let Some(price) = machine.price {
        field("Price", format!("{:.2}", price));
    }
    if let Some(quantity) = machine.quantity {
        field("Quantity", quantity);
    }
    if !machine.features.is_empty() {
        field("Features", machine.features.join(", "));
    }
    if let Some(file) = &machine.file {
        field("File", file);
    }
}
