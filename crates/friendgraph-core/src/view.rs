//! Public-safe projections of [`User`] records.
//!
//! Every response that exposes a user goes through one of these types; none of
//! them carries the password hash, and [`NeighborView`] also omits email and the
//! raw edge list so a friend card never leaks a third party's graph.

use crate::{User, UserId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Friend-card shape used in friend lists and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborView {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub occupation: String,
    pub location: String,
    pub picture_path: String,
}

impl From<&User> for NeighborView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            occupation: user.occupation.clone(),
            location: user.location.clone(),
            picture_path: user.picture_path.clone(),
        }
    }
}

/// Projects an optional record; missing records stay missing.
pub fn format_neighbor(user: Option<&User>) -> Option<NeighborView> {
    user.map(NeighborView::from)
}

/// Full profile returned by the single-user lookup, minus credential material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub picture_path: String,
    pub friends: Vec<UserId>,
    pub location: String,
    pub occupation: String,
    pub viewed_profile: u64,
    pub impressions: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            picture_path: user.picture_path.clone(),
            friends: user.edges.clone(),
            location: user.location.clone(),
            occupation: user.occupation.clone(),
            viewed_profile: user.viewed_profile,
            impressions: user.impressions,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User::new("Anna", "Lee", "anna@example.com")
            .with_occupation("Engineer")
            .with_location("Lisbon")
            .with_picture_path("anna.png")
            .with_password_hash("$2b$10$secret")
            .with_edges(vec![UserId::generate()])
    }

    #[test]
    fn neighbor_view_has_only_public_fields() {
        let value = serde_json::to_value(NeighborView::from(&sample())).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec!["firstName", "id", "lastName", "location", "occupation", "picturePath"]
        );
    }

    #[test]
    fn profile_never_contains_password() {
        let value = serde_json::to_value(UserProfile::from(&sample())).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("password"));
        assert!(!obj.contains_key("passwordHash"));
        assert_eq!(obj["email"], "anna@example.com");
        assert_eq!(obj["friends"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn missing_user_formats_to_none() {
        assert!(format_neighbor(None).is_none());
        let user = sample();
        assert_eq!(format_neighbor(Some(&user)).unwrap().first_name, "Anna");
    }
}
