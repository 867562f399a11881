use anyhow::Result;

use crate::cli::commands::{project_by_number, with_engine};
use crate::status::status_info;
use crate::store::{ProjectStore, ReplayOrder};

pub struct StatusCommand {
    pub number: i64,
}

impl StatusCommand {
    pub async fn execute(&self) -> Result<()> {
        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let info = status_info(project.status.code());

            println!("📋 Project #{}", project.number);
            println!("   Customer: {}", project.customer);
            println!("   Article:  {}", project.article);
            println!(
                "   Status:   {} ({}){}",
                info.label,
                project.status.code(),
                if project.archived { " [archived]" } else { "" }
            );
            println!(
                "   Quantity: {}{}",
                project.total_quantity,
                if project.quantity_fixed { " (fixed)" } else { "" }
            );
            if let (Some(first), Some(last)) = (project.first_delivery, project.last_delivery) {
                println!("   Delivery: {first} → {last}");
            }
            if let Some(reason) = &project.rejection_reason {
                println!("   Rejection reason: {reason}");
            }
            if !project.distribution.is_empty() {
                println!("   Distribution:");
                for (site, quantity) in &project.distribution {
                    println!("     📍 {site}: {quantity}");
                }
            }

            let approvals = engine.store().location_approvals(project.id).await?;
            if !approvals.is_empty() {
                println!("   Site responses:");
                for approval in &approvals {
                    println!(
                        "     ✅ {} by {} at {}",
                        approval.location, approval.actor_name, approval.approved_at
                    );
                }
            }

            let trail = engine
                .store()
                .history_for_project(project.id, ReplayOrder::NewestFirst)
                .await?;
            println!();
            println!("🗂  History ({} entries):", trail.len());
            for entry in &trail {
                let status_change = match (entry.previous_status, entry.new_status) {
                    (Some(prev), Some(new)) if prev != new => format!(" {prev} → {new}"),
                    _ => String::new(),
                };
                println!(
                    "   {} {}{} by {}{}",
                    entry.created_at.format("%Y-%m-%d %H:%M"),
                    entry.action,
                    status_change,
                    entry.actor_name,
                    entry
                        .reason
                        .as_deref()
                        .map(|r| format!(" ({r})"))
                        .unwrap_or_default()
                );
            }
            Ok(())
        })
        .await
    }
}
