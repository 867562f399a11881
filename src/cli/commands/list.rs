use anyhow::{anyhow, Result};

use crate::cli::commands::with_engine;
use crate::identity::Actor;
use crate::store::ProjectStore;
use crate::visibility::{archived_projects, visible_projects, ArchiveFilter};

pub struct ListCommand {
    pub actor: Actor,
    pub archived: bool,
    pub terminal: Option<String>,
}

impl ListCommand {
    pub async fn execute(&self) -> Result<()> {
        let filter = match self.terminal.as_deref() {
            None => ArchiveFilter::All,
            Some("approved") => ArchiveFilter::ApprovedThenArchived,
            Some("rejected") => ArchiveFilter::RejectedThenArchived,
            Some(other) => {
                return Err(anyhow!("expected 'approved' or 'rejected', got '{other}'"))
            }
        };

        with_engine(|engine| async move {
            let projects = engine.store().list_projects(self.archived).await?;
            let projects = if self.archived {
                archived_projects(projects, filter)
            } else {
                visible_projects(&self.actor.role, projects)
            };

            if projects.is_empty() {
                println!("📋 Nothing to show for role '{}'", self.actor.role);
                return Ok(());
            }

            for project in &projects {
                let archived_mark = if project.archived { " [archived]" } else { "" };
                println!(
                    "#{:<4} {:<24} {:<16} qty {:>10}  {}{}",
                    project.number,
                    project.customer,
                    project.article,
                    project.total_quantity,
                    project.status,
                    archived_mark
                );
            }
            println!();
            println!("📈 {} project(s)", projects.len());
            Ok(())
        })
        .await
    }
}
