pub mod auth;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use auth::*;
pub use error::*;
pub use handlers::*;
pub use routes::*;
pub use server::*;
pub use state::*;
