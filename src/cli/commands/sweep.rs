use anyhow::Result;
use chrono::Utc;

use crate::cli::commands::{parse_date, with_engine};

pub struct SweepCommand {
    pub date: Option<String>,
}

impl SweepCommand {
    pub async fn execute(&self) -> Result<()> {
        let today = match self.date.as_deref() {
            Some(raw) => parse_date(raw)?,
            None => Utc::now().date_naive(),
        };

        with_engine(|engine| async move {
            let report = engine.run_completion_sweep(today).await?;
            if report.completed.is_empty() && report.failed.is_empty() {
                println!("🧹 Sweep found nothing to complete");
                return Ok(());
            }
            for number in &report.completed {
                println!("✅ Project #{number} auto-completed");
            }
            for (number, error) in &report.failed {
                println!("⚠️  Project #{number} failed: {error}");
            }
            Ok(())
        })
        .await
    }
}
