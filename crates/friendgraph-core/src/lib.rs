pub mod config;
pub mod error;
pub mod identity;
pub mod search;
pub mod traits;
pub mod types;
pub mod view;

pub use crate::config::{
    ConfigManager, IdentityConfig, LoggingConfig, SearchConfig, SecretsConfig, SecurityConfig,
    ServerConfig, Settings, StoreConfig,
};
pub use error::*;
pub use identity::*;
pub use search::*;
pub use traits::*;
pub use types::*;
pub use view::*;
