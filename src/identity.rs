// Identity seam - the engine treats the provider as the sole source of
// truth for "who is calling".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::roles::Role;

/// An authenticated caller. `id` is the stable identity reference used for
/// every authorization decision; `display_name` is presentation only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub display_name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role,
        }
    }
}

/// The synthetic actor attributed to scheduled jobs such as the
/// auto-complete sweep.
pub fn system_actor() -> Actor {
    Actor {
        id: Uuid::nil(),
        display_name: "System".to_string(),
        role: Role::Admin,
    }
}

/// Resolves the authenticated actor for the current request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_actor(&self) -> Result<Actor, WorkflowError>;
}

/// Identity resolved from static configuration (CLI deployments, where the
/// session is the operator's shell).
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    actor: Actor,
}

impl StaticIdentityProvider {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn current_actor(&self) -> Result<Actor, WorkflowError> {
        Ok(self.actor.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_provider_returns_configured_actor() {
        let actor = Actor::new(Uuid::new_v4(), "M. Krause", Role::SupplyChain);
        let provider = StaticIdentityProvider::new(actor.clone());
        assert_eq!(provider.current_actor().await.unwrap(), actor);
    }

    #[test]
    fn test_system_actor_is_nil_identity() {
        assert_eq!(system_actor().id, Uuid::nil());
    }
}
