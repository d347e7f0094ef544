use super::memory::MemoryChatSessionStore;
use super::*;

// =============================================================================
// ChatMessage wire format
// =============================================================================

#[test]
fn assistant_message_serializes_with_ai_tag() {
    let msg = ChatMessage::assistant("hello");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["type"], "ai");
    assert_eq!(json["content"], "hello");
    assert!(json["timestamp"].as_str().unwrap().contains('T'));
}

#[test]
fn user_message_serializes_with_user_tag() {
    let json = serde_json::to_value(ChatMessage::user("q")).unwrap();
    assert_eq!(json["type"], "user");
}

#[test]
fn deserializes_browser_iso_timestamp() {
    let raw = r#"{"id":"1717171717171","type":"user","content":"What is Big-O?","timestamp":"2024-05-31T16:08:37.171Z"}"#;
    let msg: ChatMessage = serde_json::from_str(raw).unwrap();
    assert_eq!(msg.id, "1717171717171");
    assert_eq!(msg.role, ChatRole::User);
    assert_eq!(msg.timestamp.year(), 2024);
}

#[test]
fn assistant_alias_is_accepted() {
    let raw = r#"{"id":"2","type":"assistant","content":"hi","timestamp":"2024-05-31T16:08:37Z"}"#;
    let msg: ChatMessage = serde_json::from_str(raw).unwrap();
    assert_eq!(msg.role, ChatRole::Assistant);
}

#[test]
fn unknown_role_is_rejected() {
    let raw = r#"{"id":"3","type":"system","content":"x","timestamp":"2024-05-31T16:08:37Z"}"#;
    assert!(serde_json::from_str::<ChatMessage>(raw).is_err());
}

#[test]
fn generated_message_ids_differ() {
    assert_ne!(ChatMessage::user("a").id, ChatMessage::user("a").id);
}

#[test]
fn prompt_labels() {
    assert_eq!(ChatRole::User.prompt_label(), "User");
    assert_eq!(ChatRole::Assistant.prompt_label(), "Assistant");
}

// =============================================================================
// Store contract (in-memory)
// =============================================================================

#[tokio::test]
async fn find_latest_on_empty_store_is_none() {
    let store = MemoryChatSessionStore::default();
    let found = store.find_latest_session(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn create_then_update_round_trips_in_order() {
    let store = MemoryChatSessionStore::default();
    let (user, article) = (Uuid::new_v4(), Uuid::new_v4());
    let t1 = vec![ChatMessage::user("What is Big-O?"), ChatMessage::assistant("An upper bound.")];

    let created = store.create_session(user, article, &t1).await.unwrap();
    let mut t2 = t1.clone();
    t2.push(ChatMessage::user("And Big-Theta?"));
    store.update_session(created.id, &t2).await.unwrap();

    let fetched = store.find_latest_session(user, article).await.unwrap().unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.messages, t2);
    assert!(fetched.updated_at >= created.updated_at);
}

#[tokio::test]
async fn create_twice_for_same_pair_keeps_one_session() {
    let store = MemoryChatSessionStore::default();
    let (user, article) = (Uuid::new_v4(), Uuid::new_v4());

    let first = store.create_session(user, article, &[ChatMessage::user("a")]).await.unwrap();
    let second = store.create_session(user, article, &[ChatMessage::user("b")]).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(store.len(), 1);
    let latest = store.find_latest_session(user, article).await.unwrap().unwrap();
    assert_eq!(latest.messages[0].content, "b");
}

#[tokio::test]
async fn sessions_are_scoped_per_pair() {
    let store = MemoryChatSessionStore::default();
    let user = Uuid::new_v4();
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

    store.create_session(user, a, &[ChatMessage::user("on a")]).await.unwrap();
    assert!(store.find_latest_session(user, b).await.unwrap().is_none());
    assert!(store.find_latest_session(Uuid::new_v4(), a).await.unwrap().is_none());
}

#[tokio::test]
async fn update_unknown_session_is_not_found() {
    let store = MemoryChatSessionStore::default();
    let id = Uuid::new_v4();
    let err = store.update_session(id, &[]).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(missing) if missing == id));
}

// =============================================================================
// Postgres (requires DATABASE_URL)
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;

    async fn store() -> (PgChatSessionStore, PgPool) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
        let pool = crate::db::init_pool(&url).await.expect("db init");
        (PgChatSessionStore::new(pool.clone()), pool)
    }

    async fn seed_article(pool: &PgPool) -> Uuid {
        sqlx::query_scalar("INSERT INTO blogs (title) VALUES ('Complexity') RETURNING id")
            .fetch_one(pool)
            .await
            .expect("seed article")
    }

    #[tokio::test]
    async fn pg_create_update_fetch_round_trip() {
        let (store, pool) = store().await;
        let article = seed_article(&pool).await;
        let user = Uuid::new_v4();
        let t1 = vec![ChatMessage::user("q1"), ChatMessage::assistant("a1")];

        let created = store.create_session(user, article, &t1).await.unwrap();
        let mut t2 = t1.clone();
        t2.push(ChatMessage::user("q2"));
        store.update_session(created.id, &t2).await.unwrap();

        let fetched = store.find_latest_session(user, article).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.messages.len(), 3);
        assert_eq!(fetched.messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>(), ["q1", "a1", "q2"]);
    }

    #[tokio::test]
    async fn pg_duplicate_create_upserts() {
        let (store, pool) = store().await;
        let article = seed_article(&pool).await;
        let user = Uuid::new_v4();

        let a = store.create_session(user, article, &[ChatMessage::user("tab one")]).await.unwrap();
        let b = store.create_session(user, article, &[ChatMessage::user("tab two")]).await.unwrap();
        assert_eq!(a.id, b.id);
    }
}
