use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::identity::Actor;
use crate::notify::{LogNotifier, Notifier};
use crate::roles::Role;
use crate::store::{ProjectStore, SqliteProjectStore};
use crate::workflow::WorkflowEngine;

pub mod archive;
pub mod history;
pub mod list;
pub mod review;
pub mod status;
pub mod submit;
pub mod sweep;

/// Connect the store and hand a ready engine to the command body.
pub async fn with_engine<F, Fut, R>(f: F) -> Result<R>
where
    F: FnOnce(WorkflowEngine<SqliteProjectStore>) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let config = crate::config::config()?;
    let store =
        SqliteProjectStore::connect(&config.database.url, config.database.auto_migrate).await?;
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let engine = WorkflowEngine::new(Arc::new(store), notifier);
    f(engine).await
}

/// Resolve the acting identity from configuration, with CLI overrides.
pub fn resolve_actor(
    role_override: Option<&str>,
    actor_id_override: Option<&str>,
    actor_name_override: Option<&str>,
) -> Result<Actor> {
    let config = crate::config::config()?;

    let role_str = role_override.unwrap_or(&config.identity.role);
    let role = Role::from_str(role_str).map_err(|e| anyhow!("{e}"))?;

    let actor_id_str = actor_id_override
        .map(str::to_string)
        .or_else(|| config.identity.actor_id.clone())
        .ok_or_else(|| {
            anyhow!("actor identity not configured; set identity.actor_id or pass --actor-id")
        })?;
    let actor_id = Uuid::from_str(&actor_id_str)
        .map_err(|e| anyhow!("invalid actor id '{actor_id_str}': {e}"))?;

    let actor_name = actor_name_override
        .unwrap_or(&config.identity.actor_name)
        .to_string();

    Ok(Actor::new(actor_id, actor_name, role))
}

/// Parse repeatable "SITE=QUANTITY" arguments into a distribution map.
pub fn parse_distribution(entries: &[String]) -> Result<BTreeMap<String, f64>> {
    let mut distribution = BTreeMap::new();
    for entry in entries {
        let (site, quantity) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("expected SITE=QUANTITY, got '{entry}'"))?;
        let quantity: f64 = quantity
            .trim()
            .parse()
            .map_err(|e| anyhow!("bad quantity in '{entry}': {e}"))?;
        distribution.insert(site.trim().to_string(), quantity);
    }
    Ok(distribution)
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow!("expected YYYY-MM-DD, got '{value}': {e}"))
}

/// Look a project up by its human-facing number.
pub async fn project_by_number(
    engine: &WorkflowEngine<SqliteProjectStore>,
    number: i64,
) -> Result<crate::project::Project> {
    engine
        .store()
        .fetch_project_by_number(number)
        .await?
        .ok_or_else(|| anyhow!("no project with number {number}"))
}

pub async fn show_overview() -> Result<()> {
    println!("📋 Freigabe - Manufacturing Project Approval Workflow");
    println!();
    println!("To get started:");
    println!("  📝 freigabe submit    # Submit a new production request");
    println!("  📊 freigabe list      # See what is waiting for your role");
    println!("  ✅ freigabe approve   # Approve the current review stage");
    println!("  🗂  freigabe history   # Audit trail for a project");
    println!();
    println!("Review commands:");
    println!("  ❌ freigabe reject    # Reject with a reason");
    println!("  ✏️  freigabe correct   # Correct quantities, roll back a stage");
    println!("  📦 freigabe archive   # Archive a finished project");
    println!();
    println!("💡 Set your identity in freigabe.toml or via --role/--actor-id");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_distribution() {
        let parsed = parse_distribution(&[
            "Storkow=300".to_string(),
            "Brenz = 700.5".to_string(),
        ])
        .unwrap();
        assert_eq!(parsed.get("Storkow"), Some(&300.0));
        assert_eq!(parsed.get("Brenz"), Some(&700.5));
    }

    #[test]
    fn test_parse_distribution_rejects_garbage() {
        assert!(parse_distribution(&["Storkow".to_string()]).is_err());
        assert!(parse_distribution(&["Storkow=abc".to_string()]).is_err());
    }

    #[test]
    fn test_parse_date() {
        assert!(parse_date("2026-08-07").is_ok());
        assert!(parse_date("07.08.2026").is_err());
    }
}
