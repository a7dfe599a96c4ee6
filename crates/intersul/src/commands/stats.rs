//! Stats command - dashboard numbers.

use anyhow::Result;
use console::{Style, style};

use intersul_types::DashboardStats;

use super::Context;

/// Run the stats command.
pub async fn run(ctx: &Context) -> Result<()> {
    let stats = ctx.app.dashboard().stats().await?;

    if ctx.json_output {
        return ctx.print_json(&stats);
    }
    print_stats(&stats);
    Ok(())
}

fn print_stats(stats: &DashboardStats) {
    let dim = Style::new().dim();

    println!();
    println!("{}", style("Intersul Dashboard").bold());
    println!("{}", dim.apply_to("─".repeat(50)));

    section("Clients");
    row("Total", stats.clients.total);
    row("Active", stats.clients.active);
    row("Inactive", stats.clients.inactive);
    row("Suspended", stats.clients.suspended);
    row("New this month", stats.clients.new_this_month);

    section("Services");
    row("Total", stats.services.total);
    row("Pending", stats.services.pending);
    row("In progress", stats.services.in_progress);
    row("Completed", stats.services.completed);
    row("Overdue", stats.services.overdue);

    section("Users");
    row("Total", stats.users.total);
    row("Active", stats.users.active);
    let mut roles: Vec<_> = stats.users.by_role.iter().collect();
    roles.sort();
    for (role, count) in roles {
        row(&format!("  {}", role), *count);
    }

    section("Copy machines");
    row("Installed", stats.copy_machines.total_machines);
    row("Active", stats.copy_machines.active_machines);
    row("Need maintenance", stats.copy_machines.maintenance_required);
    row(
        "Per client",
        format!("{:.1}", stats.copy_machines.average_machines_per_client),
    );
    println!();
}

fn section(title: &str) {
    println!();
    println!("  {}", style(title).bold());
}

fn row(label: &str, value: impl std::fmt::Display) {
    let dim = Style::new().dim();
    println!("    {} {}", dim.apply_to(format!("{:<18}", label)), value);
}
