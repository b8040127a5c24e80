use friendgraph_core::{
    FriendGraphError, IdFormat, IdentityValidator, SearchOutcome, User, UserId,
};
use friendgraph_graph::{FriendQueryService, InMemoryUserStore, QueryOptions};
use std::sync::Arc;
use tempfile::TempDir;

fn make_user(first: &str, last: &str) -> User {
    User::new(first, last, format!("{}.{}@example.com", first, last).to_lowercase())
}

fn service(users: Vec<User>) -> FriendQueryService {
    let store = Arc::new(InMemoryUserStore::with_users(users).unwrap());
    FriendQueryService::new(
        store,
        IdentityValidator::new(IdFormat::ObjectId),
        QueryOptions::default(),
    )
}

#[tokio::test]
async fn test_list_friends_preserves_order_and_skips_dangling() {
    let b = make_user("Ben", "Ng");
    let c = make_user("Cy", "Park");
    let ghost = UserId::generate();
    let malformed = UserId::from("undefined");
    let a = make_user("Ada", "Lovelace").with_edges(vec![
        c.id.clone(),
        ghost,
        malformed,
        b.id.clone(),
    ]);
    let a_id = a.id.clone();
    let svc = service(vec![a, b.clone(), c.clone()]);

    let friends = svc.list_friends(a_id.as_str()).await.unwrap();
    let names: Vec<&str> = friends.iter().map(|f| f.first_name.as_str()).collect();
    assert_eq!(names, vec!["Cy", "Ben"]);
}

#[tokio::test]
async fn test_list_friends_of_lonely_user_is_empty() {
    let a = make_user("Ada", "Lovelace");
    let id = a.id.clone();
    let svc = service(vec![a]);
    assert!(svc.list_friends(id.as_str()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_friends_errors() {
    let svc = service(vec![]);
    let err = svc.list_friends("undefined").await.unwrap_err();
    assert!(matches!(err, FriendGraphError::InvalidIdentifier(_)));
    let err = svc
        .list_friends(UserId::generate().as_str())
        .await
        .unwrap_err();
    assert!(matches!(err, FriendGraphError::NotFound(_)));
}

#[tokio::test]
async fn test_search_matches_substring() {
    let svc = service(vec![make_user("Anna", "Lee"), make_user("Bob", "Kim")]);
    match svc.search_users("an").await.unwrap() {
        SearchOutcome::Matches(views) => {
            assert_eq!(views.len(), 1);
            assert_eq!(views[0].first_name, "Anna");
        }
        SearchOutcome::Empty => panic!("expected a match"),
    }
}

#[tokio::test]
async fn test_search_is_bounded() {
    let users = (0..200).map(|i| make_user(&format!("Sam{}", i), "Smith"));
    let svc = service(users.collect());
    let outcome = svc.search_users("sam").await.unwrap();
    assert_eq!(outcome.len(), 50);
}

#[tokio::test]
async fn test_search_respects_configured_limit() {
    let store = Arc::new(
        InMemoryUserStore::with_users((0..30).map(|i| make_user(&format!("Sam{}", i), "Smith")))
            .unwrap(),
    );
    let svc = FriendQueryService::new(
        store,
        IdentityValidator::default(),
        QueryOptions {
            max_results: 5,
            include_email: true,
        },
    );
    assert_eq!(svc.search_users("smith").await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_search_empty_and_missing_query() {
    let svc = service(vec![make_user("Anna", "Lee")]);
    assert_eq!(svc.search_users("zzz").await.unwrap(), SearchOutcome::Empty);
    let err = svc.search_users("  ").await.unwrap_err();
    assert!(matches!(err, FriendGraphError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_search_by_email_when_enabled() {
    let user = User::new("Bob", "Kim", "rocket@example.com");
    let svc = service(vec![user]);
    assert_eq!(svc.search_users("ROCKET").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_profile_omits_credentials() {
    let a = make_user("Ada", "Lovelace").with_password_hash("$2b$10$abcdef");
    let id = a.id.clone();
    let svc = service(vec![a]);
    let profile = svc.get_profile(id.as_str()).await.unwrap();
    let json = serde_json::to_string(&profile).unwrap();
    assert!(!json.contains("$2b$10$abcdef"));
    assert!(json.contains("ada.lovelace@example.com"));
}

#[tokio::test]
async fn test_seed_file_loading() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.json");
    std::fs::write(
        &path,
        r#"[
            {"_id": "64b7f0c2a1d3e4f5a6b7c8d9", "firstName": "Anna", "lastName": "Lee",
             "email": "anna@example.com", "friends": ["64b7f0c2a1d3e4f5a6b7c8da"]},
            {"_id": "64b7f0c2a1d3e4f5a6b7c8da", "firstName": "Bob", "lastName": "Kim",
             "email": "bob@example.com", "friends": ["64b7f0c2a1d3e4f5a6b7c8d9"]}
        ]"#,
    )
    .unwrap();

    let store = Arc::new(InMemoryUserStore::load_seed_file(&path, IdFormat::ObjectId).await.unwrap());
    assert_eq!(store.len(), 2);
    let svc = FriendQueryService::new(store, IdentityValidator::default(), QueryOptions::default());
    let friends = svc.list_friends("64b7f0c2a1d3e4f5a6b7c8d9").await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].first_name, "Bob");
}

#[tokio::test]
async fn test_deleted_friend_is_filtered_from_list() {
    let b = make_user("Ben", "Ng");
    let c = make_user("Cy", "Park");
    let a = make_user("Ada", "Lovelace").with_edges(vec![b.id.clone(), c.id.clone()]);
    let (a_id, b_id) = (a.id.clone(), b.id.clone());
    let store = Arc::new(InMemoryUserStore::with_users(vec![a, b, c]).unwrap());
    let svc = FriendQueryService::new(
        store.clone(),
        IdentityValidator::default(),
        QueryOptions::default(),
    );

    assert_eq!(svc.list_friends(a_id.as_str()).await.unwrap().len(), 2);
    assert!(store.remove(&b_id).is_some());
    let friends = svc.list_friends(a_id.as_str()).await.unwrap();
    assert_eq!(friends.len(), 1);
    assert_eq!(friends[0].first_name, "Cy");
}
