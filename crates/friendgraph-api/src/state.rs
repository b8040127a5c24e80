use friendgraph_core::{ConfigManager, FriendGraphError, IdentityValidator, Result, UserStore};
use friendgraph_graph::{FriendQueryService, InMemoryUserStore, QueryOptions, RelationshipEngine};
use std::sync::Arc;
use tracing::info;

use crate::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigManager>,
    pub relationships: RelationshipEngine,
    pub queries: FriendQueryService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Builds state over the in-memory store, seeded from `store.seed_path` when set.
    pub async fn new(config: Arc<ConfigManager>) -> Result<Self> {
        let settings = config.settings();
        let format = settings.identity.format;
        let store = match &settings.store.seed_path {
            Some(path) => InMemoryUserStore::load_seed_file(path, format).await?,
            None => {
                info!("No seed file configured, starting with an empty user store");
                InMemoryUserStore::for_format(format)
            }
        };
        Self::with_store(config, Arc::new(store)).await
    }

    /// Builds state over an existing store.
    pub async fn with_store(config: Arc<ConfigManager>, store: Arc<dyn UserStore>) -> Result<Self> {
        let settings = config.settings();
        let secret = settings
            .secrets
            .jwt_secret
            .as_ref()
            .ok_or_else(|| FriendGraphError::Config("secrets.jwt_secret is not set".to_string()))?;

        let validator = IdentityValidator::new(settings.identity.format);
        let options = QueryOptions {
            max_results: settings.search.max_results,
            include_email: settings.search.include_email,
        };

        Ok(Self {
            relationships: RelationshipEngine::new(store.clone(), validator),
            queries: FriendQueryService::new(store, validator, options),
            verifier: Arc::new(TokenVerifier::new(secret)),
            config,
        })
    }
}
