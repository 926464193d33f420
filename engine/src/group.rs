use async_trait::async_trait;
use bigdecimal::BigDecimal;
use radiant_common::{GroupRequirement, Identity, User};
use tracing::info;

/// Host-side user storage: lookup by username and the wallet identity
/// linked by the user's sign-in.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Option<User>;
    async fn linked_identity(&self, user: &User) -> Option<Identity>;
}

/// Host-side group membership storage.
#[async_trait]
pub trait GroupBackend: Send + Sync {
    async fn add_member(&self, group: &str, user: &User);
    async fn remove_member(&self, group: &str, user: &User);
}

/// Applies the configured balance thresholds to a computed total.
/// Invoked by the caller after aggregation; a user without a computed
/// total gets no membership changes at all.
pub struct GroupSync<B> {
    backend: B,
    requirements: Vec<GroupRequirement>,
}

impl<B: GroupBackend> GroupSync<B> {
    pub fn new(backend: B, requirements: Vec<GroupRequirement>) -> Self {
        Self {
            backend,
            requirements,
        }
    }

    pub async fn sync(&self, user: &User, total: &BigDecimal) {
        for requirement in &self.requirements {
            if *total > requirement.required {
                info!(
                    username = %user.username,
                    group = %requirement.group,
                    "adding member"
                );
                self.backend.add_member(&requirement.group, user).await;
            } else {
                info!(
                    username = %user.username,
                    group = %requirement.group,
                    "removing member"
                );
                self.backend.remove_member(&requirement.group, user).await;
            }
        }
    }
}
