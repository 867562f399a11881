use anyhow::Result;

use crate::cli::commands::{project_by_number, with_engine};
use crate::identity::Actor;

pub struct ArchiveCommand {
    pub actor: Actor,
    pub number: i64,
}

impl ArchiveCommand {
    pub async fn execute(&self) -> Result<()> {
        with_engine(|engine| async move {
            let project = project_by_number(&engine, self.number).await?;
            let updated = engine.archive(&self.actor, project.id).await?;
            println!(
                "📦 Project #{} archived (status stays '{}')",
                updated.number, updated.status
            );
            Ok(())
        })
        .await
    }
}
