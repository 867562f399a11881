//! Audit trail read paths and the push feed.
//!
//! Writes happen exclusively inside workflow transitions; this module only
//! reads committed entries and rebroadcasts fresh ones to live viewers.

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::identity::Actor;
use crate::project::HistoryEntry;
use crate::store::{ProjectStore, ReplayOrder};

/// Push feed for freshly committed history entries. Subscribers of a project
/// being actively viewed observe new entries without polling; a lagging
/// receiver just re-queries, the feed is convenience, not correctness.
#[derive(Debug, Clone)]
pub struct HistoryFeed {
    tx: broadcast::Sender<HistoryEntry>,
}

impl HistoryFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HistoryEntry> {
        self.tx.subscribe()
    }

    /// Publish a committed entry. No subscribers is not an error.
    pub(crate) fn publish(&self, entry: &HistoryEntry) {
        let _ = self.tx.send(entry.clone());
    }
}

impl Default for HistoryFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A single project's audit trail.
pub async fn project_trail(
    store: &dyn ProjectStore,
    project_id: Uuid,
    order: ReplayOrder,
) -> Result<Vec<HistoryEntry>, WorkflowError> {
    store.history_for_project(project_id, order).await
}

/// Entries by actor. Admins may audit any actor (or all of them); everyone
/// else only ever sees their own entries, regardless of what they asked for.
pub async fn actor_trail(
    store: &dyn ProjectStore,
    requester: &Actor,
    subject: Option<Uuid>,
) -> Result<Vec<HistoryEntry>, WorkflowError> {
    if requester.role.is_admin() {
        match subject {
            Some(actor_id) => store.history_for_actor(actor_id).await,
            None => store.all_history().await,
        }
    } else {
        store.history_for_actor(requester.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::HistoryAction;
    use crate::status::ProjectStatus;
    use chrono::Utc;

    fn entry() -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            actor_id: Uuid::new_v4(),
            actor_name: "S. Wolf".to_string(),
            action: HistoryAction::Create,
            previous_status: None,
            new_status: Some(ProjectStatus::PruefungSupplyChain),
            reason: None,
            diff: None,
            operation_id: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_feed_delivers_to_subscriber() {
        let feed = HistoryFeed::new(8);
        let mut rx = feed.subscribe();

        let published = entry();
        feed.publish(&published);

        let received = rx.recv().await.unwrap();
        assert_eq!(received, published);
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let feed = HistoryFeed::default();
        feed.publish(&entry());
    }
}
