pub mod memory_store;
pub mod neighbors;
pub mod query;
pub mod relationship;

pub use memory_store::*;
pub use neighbors::*;
pub use query::*;
pub use relationship::*;
