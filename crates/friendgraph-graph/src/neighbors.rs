use friendgraph_core::{IdentityValidator, NeighborView, Result, UserId, UserStore};
use futures::future::join_all;
use tracing::debug;

/// Resolves an edge list into friend cards, preserving stored order.
///
/// Edges that fail validation or point at missing records are dropped; store
/// errors still propagate.
pub async fn resolve_neighbors(
    store: &dyn UserStore,
    validator: &IdentityValidator,
    edges: &[UserId],
) -> Result<Vec<NeighborView>> {
    let valid: Vec<UserId> = edges
        .iter()
        .filter_map(|id| match validator.validate("edge", id.as_str()) {
            Ok(canonical) => Some(canonical),
            Err(_) => {
                debug!(edge = %id, "skipping malformed edge");
                None
            }
        })
        .collect();

    let lookups = join_all(valid.iter().map(|id| store.get_user(id))).await;

    let mut views = Vec::with_capacity(lookups.len());
    for (id, lookup) in valid.into_iter().zip(lookups) {
        match lookup? {
            Some(user) => views.push(NeighborView::from(&user)),
            None => debug!(edge = %id, "skipping dangling edge"),
        }
    }
    Ok(views)
}
