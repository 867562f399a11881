use std::str::FromStr;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::cli::commands::{parse_distribution, project_by_number, with_engine};
use crate::identity::Actor;
use crate::project::QuantityCorrection;
use crate::roles::Location;
use crate::status::ProjectStatus;
use crate::store::ProjectStore;

pub struct ApproveCommand {
    pub actor: Actor,
    pub number: i64,
    pub location: Option<String>,
}

impl ApproveCommand {
    pub async fn execute(&self) -> Result<()> {
        let location = self
            .location
            .as_deref()
            .map(|name| {
                Location::resolve(name).ok_or_else(|| anyhow!("unknown site '{name}'"))
            })
            .transpose()?;

        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let updated = match project.status {
                ProjectStatus::PruefungPlanung => {
                    engine
                        .approve_location(&self.actor, project.id, location)
                        .await?
                }
                _ => engine.approve(&self.actor, project.id).await?,
            };

            if updated.status == ProjectStatus::Genehmigt {
                println!("✅ Project #{} fully approved", updated.number);
            } else if updated.status == ProjectStatus::PruefungPlanung
                && project.status == ProjectStatus::PruefungPlanung
            {
                let responded = engine.store().location_approvals(updated.id).await?;
                println!(
                    "✅ Site response recorded for project #{} ({}/{} sites)",
                    updated.number,
                    responded.len(),
                    updated.required_locations().len()
                );
            } else {
                println!(
                    "✅ Project #{} forwarded: {} → {}",
                    updated.number, project.status, updated.status
                );
            }
            Ok(())
        })
        .await
    }
}

pub struct RejectCommand {
    pub actor: Actor,
    pub number: i64,
    pub reason: String,
}

impl RejectCommand {
    pub async fn execute(&self) -> Result<()> {
        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let updated = engine.reject(&self.actor, project.id, &self.reason).await?;
            println!(
                "❌ Project #{} rejected ({} → {})",
                updated.number, project.status, updated.status
            );
            Ok(())
        })
        .await
    }
}

pub struct CorrectCommand {
    pub actor: Actor,
    pub number: i64,
    pub quantity: Option<f64>,
    pub distribution: Vec<String>,
    pub reason: String,
    pub operation_id: Option<String>,
}

impl CorrectCommand {
    pub async fn execute(&self) -> Result<()> {
        let distribution = if self.distribution.is_empty() {
            None
        } else {
            Some(parse_distribution(&self.distribution)?)
        };
        let operation_id = self
            .operation_id
            .as_deref()
            .map(|raw| Uuid::from_str(raw).map_err(|e| anyhow!("invalid operation id: {e}")))
            .transpose()?;

        let correction = QuantityCorrection {
            total_quantity: self.quantity,
            distribution,
            reason: self.reason.clone(),
            operation_id,
        };

        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let updated = engine.correct(&self.actor, project.id, correction).await?;
            println!(
                "✏️  Project #{} corrected, rolled back {} → {}",
                updated.number, project.status, updated.status
            );
            Ok(())
        })
        .await
    }
}

pub struct ResubmitCommand {
    pub actor: Actor,
    pub number: i64,
    pub quantity: Option<f64>,
    pub distribution: Vec<String>,
    pub reason: Option<String>,
}

impl ResubmitCommand {
    pub async fn execute(&self) -> Result<()> {
        let correction = if self.quantity.is_some() || !self.distribution.is_empty() {
            Some(QuantityCorrection {
                total_quantity: self.quantity,
                distribution: if self.distribution.is_empty() {
                    None
                } else {
                    Some(parse_distribution(&self.distribution)?)
                },
                reason: self.reason.clone().unwrap_or_default(),
                operation_id: None,
            })
        } else {
            None
        };

        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let updated = engine
                .resubmit(&self.actor, project.id, correction)
                .await?;
            println!(
                "🔁 Project #{} resubmitted to supply chain ({} → {})",
                updated.number, project.status, updated.status
            );
            Ok(())
        })
        .await
    }
}
