use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use friendgraph_core::{
    FriendGraphError, IdFormat, Result, SearchQuery, User, UserId, UserStore,
};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// `UserStore` backed by a concurrent map.
///
/// Records are keyed by the canonical spelling of their id for the configured
/// [`IdFormat`]: object ids ignore case, opaque ids are matched exactly.
/// Saves of individual records can be made to fail on demand, which is how
/// partial-write behaviour of the relationship engine is exercised.
#[derive(Default)]
pub struct InMemoryUserStore {
    id_format: IdFormat,
    users: DashMap<String, User>,
    failing_saves: DashSet<String>,
    saves: AtomicU64,
}

impl InMemoryUserStore {
    /// Empty store keyed by object ids.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_format(id_format: IdFormat) -> Self {
        Self {
            id_format,
            ..Self::default()
        }
    }

    /// Store keyed by object ids, pre-filled with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Result<Self> {
        Self::with_users_for_format(IdFormat::ObjectId, users)
    }

    pub fn with_users_for_format(
        id_format: IdFormat,
        users: impl IntoIterator<Item = User>,
    ) -> Result<Self> {
        let store = Self::for_format(id_format);
        for user in users {
            store.insert(user)?;
        }
        Ok(store)
    }

    /// Loads a JSON array of user records.
    pub async fn load_seed_file(path: &Path, id_format: IdFormat) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        let users: Vec<User> = serde_json::from_str(&raw)?;
        let count = users.len();
        let store = Self::with_users_for_format(id_format, users)?;
        info!("Loaded {} users from {:?}", count, path);
        Ok(store)
    }

    fn key(&self, id: &UserId) -> String {
        self.id_format.canonical(id.as_str())
    }

    /// Inserts or replaces a record, enforcing case-insensitive email uniqueness.
    pub fn insert(&self, user: User) -> Result<()> {
        let id_key = self.key(&user.id);
        let email = user.email.to_lowercase();
        let clash = self
            .users
            .iter()
            .any(|entry| entry.key() != &id_key && entry.value().email.to_lowercase() == email);
        if clash {
            return Err(FriendGraphError::StoreFailure(format!(
                "email already registered: {}",
                email
            )));
        }
        self.users.insert(id_key, user);
        Ok(())
    }

    /// Removes a record without touching edges that point to it.
    pub fn remove(&self, id: &UserId) -> Option<User> {
        self.users.remove(&self.key(id)).map(|(_, user)| user)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Makes every subsequent save of `id` fail until cleared.
    pub fn inject_save_failure(&self, id: &UserId) {
        self.failing_saves.insert(self.key(id));
    }

    pub fn clear_save_failure(&self, id: &UserId) {
        self.failing_saves.remove(&self.key(id));
    }

    /// Number of successful saves since creation.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        debug!(user_id = %id, "store get");
        Ok(self.users.get(&self.key(id)).map(|entry| entry.value().clone()))
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        debug!(user_id = %user.id, edges = user.edges.len(), "store save");
        if self.failing_saves.contains(&self.key(&user.id)) {
            return Err(FriendGraphError::StoreFailure(format!(
                "write rejected for user {}",
                user.id
            )));
        }
        self.insert(user.clone())?;
        self.saves.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn exists(&self, id: &UserId) -> Result<bool> {
        Ok(self.users.contains_key(&self.key(id)))
    }

    async fn search_users(&self, query: &SearchQuery, limit: usize) -> Result<Vec<User>> {
        let mut matches: Vec<User> = self
            .users
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();
        matches.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(limit);
        debug!(query = query.as_str(), hits = matches.len(), "store search");
        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_case_insensitive() {
        let user = User::new("Anna", "Lee", "anna@example.com").with_id("64B7F0C2A1D3E4F5A6B7C8D9");
        let store = InMemoryUserStore::with_users(vec![user]).unwrap();
        let found = store
            .get_user(&UserId::from("64b7f0c2a1d3e4f5a6b7c8d9"))
            .await
            .unwrap();
        assert!(found.is_some());
        assert!(store.exists(&UserId::from("64b7f0c2a1d3e4f5a6b7c8d9")).await.unwrap());
    }

    #[tokio::test]
    async fn opaque_ids_are_case_sensitive() {
        let low = User::new("Low", "Case", "low@example.com").with_id("ab");
        let up = User::new("Up", "Case", "up@example.com").with_id("AB");
        let store = InMemoryUserStore::with_users_for_format(IdFormat::Opaque, vec![low, up]).unwrap();
        assert_eq!(store.len(), 2);
        let low = store.get_user(&UserId::from("ab")).await.unwrap().unwrap();
        assert_eq!(low.first_name, "Low");
        let up = store.get_user(&UserId::from("AB")).await.unwrap().unwrap();
        assert_eq!(up.first_name, "Up");
        assert!(!store.exists(&UserId::from("Ab")).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryUserStore::new();
        store.insert(User::new("Anna", "Lee", "anna@example.com")).unwrap();
        let err = store
            .save_user(&User::new("Other", "Anna", "ANNA@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, FriendGraphError::StoreFailure(_)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn injected_failure_rejects_saves_until_cleared() {
        let user = User::new("Anna", "Lee", "anna@example.com");
        let store = InMemoryUserStore::with_users(vec![user.clone()]).unwrap();
        store.inject_save_failure(&user.id);
        assert!(store.save_user(&user).await.is_err());
        store.clear_save_failure(&user.id);
        assert!(store.save_user(&user).await.is_ok());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn search_truncates_to_limit() {
        let users = (0..10).map(|i| User::new(format!("Dana{}", i), "X", format!("d{}@example.com", i)));
        let store = InMemoryUserStore::with_users(users).unwrap();
        let query = SearchQuery::new("dana", false).unwrap();
        assert_eq!(store.search_users(&query, 3).await.unwrap().len(), 3);
        assert_eq!(store.search_users(&query, 50).await.unwrap().len(), 10);
    }
}
