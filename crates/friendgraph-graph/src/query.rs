use friendgraph_core::{
    FriendGraphError, IdentityValidator, NeighborView, Result, SearchOutcome, SearchQuery, User,
    UserProfile, UserStore, MAX_SEARCH_RESULTS,
};
use std::sync::Arc;
use tracing::debug;

use crate::resolve_neighbors;

#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub max_results: usize,
    pub include_email: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            max_results: MAX_SEARCH_RESULTS,
            include_email: true,
        }
    }
}

/// Read side: profiles, friend lists and user search.
#[derive(Clone)]
pub struct FriendQueryService {
    store: Arc<dyn UserStore>,
    validator: IdentityValidator,
    options: QueryOptions,
}

impl FriendQueryService {
    pub fn new(store: Arc<dyn UserStore>, validator: IdentityValidator, options: QueryOptions) -> Self {
        Self {
            store,
            validator,
            options,
        }
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        let user = self.load(user_id).await?;
        Ok(UserProfile::from(&user))
    }

    /// Friend cards for every resolvable edge of `user_id`, in stored order.
    pub async fn list_friends(&self, user_id: &str) -> Result<Vec<NeighborView>> {
        let user = self.load(user_id).await?;
        let friends = resolve_neighbors(self.store.as_ref(), &self.validator, &user.edges).await?;
        debug!(
            user_id = %user.id,
            edges = user.edges.len(),
            resolved = friends.len(),
            "listed friends"
        );
        Ok(friends)
    }

    pub async fn search_users(&self, raw_query: &str) -> Result<SearchOutcome> {
        let query = SearchQuery::new(raw_query, self.options.include_email)?;
        let limit = self.options.max_results.clamp(1, MAX_SEARCH_RESULTS);
        let users = self.store.search_users(&query, limit).await?;
        let views: Vec<NeighborView> = users.iter().take(limit).map(NeighborView::from).collect();
        debug!(query = query.as_str(), hits = views.len(), "searched users");
        Ok(SearchOutcome::from_views(views))
    }

    async fn load(&self, user_id: &str) -> Result<User> {
        let id = self.validator.validate("id", user_id)?;
        self.store
            .get_user(&id)
            .await?
            .ok_or_else(|| FriendGraphError::NotFound(format!("user {}", id)))
    }
}
