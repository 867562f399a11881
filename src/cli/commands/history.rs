use std::str::FromStr;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::cli::commands::{project_by_number, with_engine};
use crate::history::{actor_trail, project_trail};
use crate::identity::Actor;
use crate::store::ReplayOrder;

pub struct HistoryCommand {
    pub actor: Actor,
    pub number: Option<i64>,
    pub subject: Option<String>,
    pub replay: bool,
}

impl HistoryCommand {
    pub async fn execute(&self) -> Result<()> {
        let order = if self.replay {
            ReplayOrder::OldestFirst
        } else {
            ReplayOrder::NewestFirst
        };
        let subject = self
            .subject
            .as_deref()
            .map(|raw| Uuid::from_str(raw).map_err(|e| anyhow!("invalid actor id: {e}")))
            .transpose()?;

        with_engine(|engine| async move {
            let entries = match self.number {
                Some(number) => {
                    let project = project_by_number(&engine, number).await?;
                    project_trail(engine.store().as_ref(), project.id, order).await?
                }
                None => actor_trail(engine.store().as_ref(), &self.actor, subject).await?,
            };

            if entries.is_empty() {
                println!("🗂  No history entries");
                return Ok(());
            }

            for entry in &entries {
                let status_change = match (entry.previous_status, entry.new_status) {
                    (Some(prev), Some(new)) if prev != new => format!(" {prev} → {new}"),
                    _ => String::new(),
                };
                println!(
                    "{} {}{} by {}{}",
                    entry.created_at.format("%Y-%m-%d %H:%M:%S"),
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
