use crate::{Result, SearchQuery, User, UserId};
use async_trait::async_trait;

/// Narrow port over the persistent user store.
///
/// Single-record reads and writes must be atomic; nothing else is assumed.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;
    async fn save_user(&self, user: &User) -> Result<()>;
    async fn exists(&self, id: &UserId) -> Result<bool>;
    /// Returns at most `limit` users matching `query`.
    async fn search_users(&self, query: &SearchQuery, limit: usize) -> Result<Vec<User>>;
}
