use crate::{FriendGraphError, Result, User, UserId};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder values sent by broken clients in place of a real id.
const SENTINEL_IDS: &[&str] = &["undefined", "null", "nan", "[object object]"];

lazy_static! {
    static ref OBJECT_ID_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{24}$").unwrap();
    static ref OPAQUE_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

/// Canonical identifier format accepted by the backing user store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    /// 24 hexadecimal characters (12-byte object id).
    #[default]
    ObjectId,
    /// Any short token of letters, digits, `_` or `-`.
    Opaque,
}

impl IdFormat {
    fn matches(&self, raw: &str) -> bool {
        match self {
            IdFormat::ObjectId => OBJECT_ID_REGEX.is_match(raw),
            IdFormat::Opaque => OPAQUE_ID_REGEX.is_match(raw),
        }
    }

    /// Canonical spelling of `raw`. Object ids are hex and case-insensitive;
    /// opaque ids are compared exactly.
    pub fn canonical(&self, raw: &str) -> String {
        match self {
            IdFormat::ObjectId => raw.to_ascii_lowercase(),
            IdFormat::Opaque => raw.to_string(),
        }
    }
}

/// Rejects malformed identifiers before any store lookup happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityValidator {
    format: IdFormat,
}

impl IdentityValidator {
    pub fn new(format: IdFormat) -> Self {
        Self { format }
    }

    /// Validates `raw` and returns its canonical [`UserId`].
    ///
    /// `field` names the input in the error message (`"id"`, `"friendId"`, ...).
    pub fn validate(&self, field: &str, raw: &str) -> Result<UserId> {
        if raw.is_empty() {
            return Err(FriendGraphError::InvalidIdentifier(format!(
                "missing {}",
                field
            )));
        }

        let lowered = raw.to_ascii_lowercase();
        if SENTINEL_IDS.contains(&lowered.as_str()) {
            return Err(FriendGraphError::InvalidIdentifier(format!(
                "{} is a placeholder value: {}",
                field, raw
            )));
        }

        if !self.format.matches(raw) {
            return Err(FriendGraphError::InvalidIdentifier(format!(
                "malformed {}: {}",
                field, raw
            )));
        }

        Ok(UserId::from_raw(self.format.canonical(raw)))
    }

    pub fn canonicalize(&self, id: &UserId) -> UserId {
        UserId::from_raw(self.format.canonical(id.as_str()))
    }

    /// Rewrites a loaded record's id and edges into canonical form, then drops
    /// duplicates and self-references. Returns whether anything changed.
    pub fn canonicalize_user(&self, user: &mut User) -> bool {
        let id = self.canonicalize(&user.id);
        let edges: Vec<UserId> = user.edges.iter().map(|e| self.canonicalize(e)).collect();
        let mut changed = id != user.id || edges != user.edges;
        user.id = id;
        user.edges = edges;
        changed |= user.normalize_edges();
        changed
    }
}
