use crate::{FriendGraphError, NeighborView, Result, User};

/// Hard ceiling on search results regardless of configuration.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Case-insensitive substring match over names and, optionally, email.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    raw: String,
    needle: String,
    include_email: bool,
}

impl SearchQuery {
    pub fn new(raw: &str, include_email: bool) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(FriendGraphError::InvalidQuery(
                "missing search query".to_string(),
            ));
        }
        Ok(Self {
            raw: raw.to_string(),
            needle: raw.to_lowercase(),
            include_email,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, user: &User) -> bool {
        user.first_name.to_lowercase().contains(&self.needle)
            || user.last_name.to_lowercase().contains(&self.needle)
            || (self.include_email && user.email.to_lowercase().contains(&self.needle))
    }
}

/// Result of a user search. An empty match set is a distinct outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Matches(Vec<NeighborView>),
    Empty,
}

impl SearchOutcome {
    pub fn from_views(views: Vec<NeighborView>) -> Self {
        if views.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Matches(views)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SearchOutcome::Matches(v) => v.len(),
            SearchOutcome::Empty => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, SearchOutcome::Empty)
    }
}
