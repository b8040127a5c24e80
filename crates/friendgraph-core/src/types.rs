use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable user identifier.
///
/// Construction does not validate; ids coming from callers go through
/// [`crate::IdentityValidator`] first, which also yields the canonical spelling
/// that equality is defined on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh 24-hex-character id.
    pub fn generate() -> Self {
        let bytes: [u8; 12] = rand::random();
        Self(bytes.iter().map(|b| format!("{:02x}", b)).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

/// Full user record as held by the user store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(alias = "_id")]
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default, rename = "password")]
    pub password_hash: Option<SecretString>,
    #[serde(default)]
    pub picture_path: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "friends", alias = "edges")]
    pub edges: Vec<UserId>,
    #[serde(default)]
    pub viewed_profile: u64,
    #[serde(default)]
    pub impressions: u64,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::generate(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into().to_lowercase(),
            password_hash: None,
            picture_path: String::new(),
            occupation: String::new(),
            location: String::new(),
            edges: Vec::new(),
            viewed_profile: 0,
            impressions: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<UserId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_occupation(mut self, occupation: impl Into<String>) -> Self {
        self.occupation = occupation.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_picture_path(mut self, picture_path: impl Into<String>) -> Self {
        self.picture_path = picture_path.into();
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(SecretString::from(hash.into()));
        self
    }

    pub fn with_edges(mut self, edges: Vec<UserId>) -> Self {
        self.edges = edges;
        self
    }

    pub fn has_edge(&self, other: &UserId) -> bool {
        self.edges.iter().any(|id| id == other)
    }

    /// Appends `other` unless already present. Returns whether the set changed.
    pub fn add_edge(&mut self, other: &UserId) -> bool {
        if self.has_edge(other) {
            return false;
        }
        self.edges.push(other.clone());
        true
    }

    /// Removes every occurrence of `other`. Returns whether the set changed.
    pub fn remove_edge(&mut self, other: &UserId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|id| id != other);
        before != self.edges.len()
    }

    pub fn set_edge(&mut self, other: &UserId, present: bool) -> bool {
        if present {
            self.add_edge(other)
        } else {
            self.remove_edge(other)
        }
    }

    /// Drops duplicate entries and self-references, keeping first occurrences in order.
    ///
    /// Comparison is exact; ids are expected in canonical form.
    pub fn normalize_edges(&mut self) -> bool {
        let before = self.edges.len();
        let own = self.id.clone();
        let mut kept: Vec<UserId> = Vec::with_capacity(before);
        for id in self.edges.drain(..) {
            if id == own || kept.contains(&id) {
                continue;
            }
            kept.push(id);
        }
        self.edges = kept;
        before != self.edges.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
