use anyhow::Result;

use crate::cli::commands::{parse_date, parse_distribution, with_engine};
use crate::identity::Actor;
use crate::project::ProjectDraft;

pub struct SubmitCommand {
    pub actor: Actor,
    pub customer: String,
    pub article: String,
    pub quantity: f64,
    pub fixed: bool,
    pub first_delivery: Option<String>,
    pub last_delivery: Option<String>,
    pub distribution: Vec<String>,
}

impl SubmitCommand {
    pub async fn execute(&self) -> Result<()> {
        let draft = ProjectDraft {
            customer: self.customer.clone(),
            article: self.article.clone(),
            total_quantity: self.quantity,
            quantity_fixed: self.fixed,
            first_delivery: self
                .first_delivery
                .as_deref()
                .map(parse_date)
                .transpose()?,
            last_delivery: self.last_delivery.as_deref().map(parse_date).transpose()?,
            distribution: parse_distribution(&self.distribution)?,
        };

        with_engine(|engine| async move {
            let project = engine.submit(&self.actor, draft).await?;
            println!(
                "✅ Project #{} submitted for {} ({})",
                project.number, project.customer, project.article
            );
            println!(
                "   Status: {} | total quantity {}",
                project.status, project.total_quantity
            );
            for (site, quantity) in &project.distribution {
                println!("   📍 {site}: {quantity}");
            }
            Ok(())
        })
        .await
    }
}
