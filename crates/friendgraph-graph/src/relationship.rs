use friendgraph_core::{
    FriendGraphError, IdentityValidator, NeighborView, Result, User, UserId, UserStore,
};
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

use crate::resolve_neighbors;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FriendshipChange {
    Added,
    Removed,
}

impl fmt::Display for FriendshipChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FriendshipChange::Added => f.write_str("added"),
            FriendshipChange::Removed => f.write_str("removed"),
        }
    }
}

/// Maintains symmetric friend edges between pairs of users.
///
/// The two records of a pair are written one after the other with no
/// transaction around them. If the second write fails the pair stays
/// asymmetric; the caller's edge set is treated as authoritative and the next
/// toggle (or [`RelationshipEngine::reconcile_pair`]) repairs the target side.
#[derive(Clone)]
pub struct RelationshipEngine {
    store: Arc<dyn UserStore>,
    validator: IdentityValidator,
}

impl RelationshipEngine {
    pub fn new(store: Arc<dyn UserStore>, validator: IdentityValidator) -> Self {
        Self { store, validator }
    }

    /// Adds the friendship if absent, removes it if present, and returns the
    /// caller's resulting friend list.
    pub async fn toggle_friendship(
        &self,
        caller_id: &str,
        target_id: &str,
    ) -> Result<Vec<NeighborView>> {
        let (caller_id, target_id) = self.validate_pair(caller_id, target_id)?;
        let (mut caller, mut target) = self.load_pair(&caller_id, &target_id).await?;

        let currently_friends = caller.has_edge(&target.id);
        if target.has_edge(&caller.id) != currently_friends {
            warn!(
                caller = %caller.id,
                target = %target.id,
                caller_has_edge = currently_friends,
                "asymmetric friendship detected, reconciling target to caller"
            );
            target.set_edge(&caller.id, currently_friends);
        }

        let change = if currently_friends {
            caller.remove_edge(&target.id);
            target.remove_edge(&caller.id);
            FriendshipChange::Removed
        } else {
            caller.add_edge(&target.id);
            target.add_edge(&caller.id);
            FriendshipChange::Added
        };

        for user in [&mut caller, &mut target] {
            user.normalize_edges();
            user.touch();
        }

        self.persist_pair(&caller, &target).await?;
        info!(caller = %caller.id, target = %target.id, %change, "friendship toggled");

        self.current_friends(&caller.id).await
    }

    /// Makes the target's edge toward the caller match the caller's edge toward
    /// the target. Only the target is written, and only when they disagree.
    ///
    /// Returns `true` when a repair was persisted.
    pub async fn reconcile_pair(&self, caller_id: &str, target_id: &str) -> Result<bool> {
        let (caller_id, target_id) = self.validate_pair(caller_id, target_id)?;
        let (caller, mut target) = self.load_pair(&caller_id, &target_id).await?;

        let expected = caller.has_edge(&target.id);
        if target.has_edge(&caller.id) == expected {
            return Ok(false);
        }

        target.set_edge(&caller.id, expected);
        target.normalize_edges();
        target.touch();
        self.store.save_user(&target).await?;
        info!(
            caller = %caller.id,
            target = %target.id,
            friends = expected,
            "reconciled asymmetric friendship"
        );
        Ok(true)
    }

    fn validate_pair(&self, caller_id: &str, target_id: &str) -> Result<(UserId, UserId)> {
        let caller_id = self.validator.validate("id", caller_id)?;
        let target_id = self.validator.validate("friendId", target_id)?;
        if caller_id == target_id {
            return Err(FriendGraphError::InvalidOperation(
                "a user cannot befriend themselves".to_string(),
            ));
        }
        Ok((caller_id, target_id))
    }

    async fn load_pair(&self, caller_id: &UserId, target_id: &UserId) -> Result<(User, User)> {
        let (caller, target) = futures::try_join!(
            self.store.get_user(caller_id),
            self.store.get_user(target_id)
        )?;
        let mut caller = caller
            .ok_or_else(|| FriendGraphError::NotFound(format!("user {}", caller_id)))?;
        let mut target = target
            .ok_or_else(|| FriendGraphError::NotFound(format!("friend {}", target_id)))?;
        self.validator.canonicalize_user(&mut caller);
        self.validator.canonicalize_user(&mut target);
        Ok((caller, target))
    }

    async fn persist_pair(&self, caller: &User, target: &User) -> Result<()> {
        self.store.save_user(caller).await?;

        if let Err(err) = self.store.save_user(target).await {
            warn!(
                caller = %caller.id,
                target = %target.id,
                error = %err,
                "second write failed, friendship is asymmetric until the pair is touched again"
            );
            return Err(FriendGraphError::StoreFailure(format!(
                "saved {} but not {}: {}",
                caller.id, target.id, err
            )));
        }
        Ok(())
    }

    async fn current_friends(&self, caller_id: &UserId) -> Result<Vec<NeighborView>> {
        let caller = self
            .store
            .get_user(caller_id)
            .await?
            .ok_or_else(|| FriendGraphError::NotFound(format!("user {}", caller_id)))?;
        resolve_neighbors(self.store.as_ref(), &self.validator, &caller.edges).await
    }
}
