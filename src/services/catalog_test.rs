use super::*;
use time::Duration;

fn article(title: &str) -> ArticleRow {
    ArticleRow {
        id: Uuid::new_v4(),
        title: title.into(),
        summary: String::new(),
        author_name: "Admin".into(),
        pages: vec![Page { title: "Page 1".into(), content: "body".into() }],
        tags: Vec::new(),
        featured: false,
        ai_insights_enabled: false,
        folder_id: None,
        folder_name: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        updated_at: OffsetDateTime::UNIX_EPOCH,
    }
}

fn aged(title: &str, days: i64) -> ArticleRow {
    let mut a = article(title);
    a.created_at = OffsetDateTime::UNIX_EPOCH + Duration::days(days);
    a
}

fn lines(n: usize) -> String {
    vec!["line"; n].join("\n")
}

fn titles(articles: &[ArticleRow]) -> Vec<&str> {
    articles.iter().map(|a| a.title.as_str()).collect()
}

// =============================================================================
// normalize_pages / normalize_tags
// =============================================================================

#[test]
fn missing_pages_fall_back_to_legacy_content() {
    let pages = normalize_pages(None, "legacy body");
    assert_eq!(pages, vec![Page { title: "Page 1".into(), content: "legacy body".into() }]);
}

#[test]
fn empty_pages_fall_back_to_legacy_content() {
    let pages = normalize_pages(Some(Vec::new()), "legacy");
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].content, "legacy");
}

#[test]
fn stored_pages_are_kept_in_order() {
    let stored = vec![
        Page { title: "Intro".into(), content: "a".into() },
        Page { title: "Deep dive".into(), content: "b".into() },
    ];
    assert_eq!(normalize_pages(Some(stored.clone()), "ignored"), stored);
}

#[test]
fn tags_are_trimmed_and_blank_dropped() {
    let tags = normalize_tags(vec![" arrays ".into(), String::new(), "  ".into(), "graphs".into()]);
    assert_eq!(tags, vec!["arrays", "graphs"]);
}

#[test]
fn page_deserializes_with_missing_fields() {
    let page: Page = serde_json::from_str(r#"{"content":"only body"}"#).unwrap();
    assert_eq!(page.title, "");
    assert_eq!(page.content, "only body");
}

// =============================================================================
// ArticlePatch
// =============================================================================

#[test]
fn patch_distinguishes_absent_and_null_folder() {
    let absent: ArticlePatch = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
    assert_eq!(absent.folder_id, None);

    let cleared: ArticlePatch = serde_json::from_str(r#"{"folder_id":null}"#).unwrap();
    assert_eq!(cleared.folder_id, Some(None));

    let id = Uuid::new_v4();
    let moved: ArticlePatch = serde_json::from_str(&format!(r#"{{"folder_id":"{id}"}}"#)).unwrap();
    assert_eq!(moved.folder_id, Some(Some(id)));
}

// =============================================================================
// ArticleRow helpers
// =============================================================================

#[test]
fn read_time_spans_all_pages() {
    let mut a = article("Long");
    a.pages = vec![
        Page { title: "1".into(), content: lines(30) },
        Page { title: "2".into(), content: lines(30) },
    ];
    assert_eq!(a.read_time(), 2);
}

#[test]
fn insight_content_joins_pages_with_blank_line() {
    let mut a = article("Two pages");
    a.pages = vec![
        Page { title: "1".into(), content: "first".into() },
        Page { title: "2".into(), content: "second".into() },
    ];
    assert_eq!(a.insight_content(), "first\n\nsecond");
}

// =============================================================================
// FolderFilter / SortOption parsing
// =============================================================================

#[test]
fn folder_filter_parses_keywords_and_ids() {
    let id = Uuid::new_v4();
    assert_eq!(FolderFilter::parse("all"), Some(FolderFilter::All));
    assert_eq!(FolderFilter::parse(""), Some(FolderFilter::All));
    assert_eq!(FolderFilter::parse("uncategorized"), Some(FolderFilter::Uncategorized));
    assert_eq!(FolderFilter::parse(&id.to_string()), Some(FolderFilter::Folder(id)));
    assert_eq!(FolderFilter::parse("nope"), None);
}

#[test]
fn sort_option_parses_all_variants() {
    let cases = [
        ("date-desc", SortOption::DateDesc),
        ("date-asc", SortOption::DateAsc),
        ("name-asc", SortOption::NameAsc),
        ("name-desc", SortOption::NameDesc),
        ("readtime-asc", SortOption::ReadTimeAsc),
        ("readtime-desc", SortOption::ReadTimeDesc),
        ("featured-first", SortOption::FeaturedFirst),
        ("tags-count", SortOption::TagsCount),
    ];
    for (raw, expected) in cases {
        assert_eq!(SortOption::parse(raw), Some(expected), "{raw}");
    }
    assert_eq!(SortOption::parse("random"), None);
    assert_eq!(SortOption::default(), SortOption::DateDesc);
}

// =============================================================================
// filter_and_sort
// =============================================================================

#[test]
fn search_matches_title_tag_or_summary_case_insensitively() {
    let mut by_tag = article("Trees");
    by_tag.tags = vec!["Recursion".into()];
    let mut by_summary = article("Stacks");
    by_summary.summary = "LIFO and recursion unwinding".into();
    let by_title = article("RECURSION basics");
    let miss = article("Hashing");

    let out = filter_and_sort(
        vec![by_tag, by_summary, by_title, miss],
        "recursion",
        FolderFilter::All,
        SortOption::NameAsc,
    );
    assert_eq!(titles(&out), ["RECURSION basics", "Stacks", "Trees"]);
}

#[test]
fn folder_filter_selects_uncategorized_and_specific_folder() {
    let folder = Uuid::new_v4();
    let mut filed = article("Filed");
    filed.folder_id = Some(folder);
    let loose = article("Loose");

    let uncategorized = filter_and_sort(
        vec![filed.clone(), loose.clone()],
        "",
        FolderFilter::Uncategorized,
        SortOption::DateDesc,
    );
    assert_eq!(titles(&uncategorized), ["Loose"]);

    let in_folder = filter_and_sort(vec![filed, loose], "", FolderFilter::Folder(folder), SortOption::DateDesc);
    assert_eq!(titles(&in_folder), ["Filed"]);
}

#[test]
fn sort_by_date_both_directions() {
    let items = vec![aged("old", 1), aged("new", 3), aged("mid", 2)];
    let desc = filter_and_sort(items.clone(), "", FolderFilter::All, SortOption::DateDesc);
    assert_eq!(titles(&desc), ["new", "mid", "old"]);
    let asc = filter_and_sort(items, "", FolderFilter::All, SortOption::DateAsc);
    assert_eq!(titles(&asc), ["old", "mid", "new"]);
}

#[test]
fn sort_by_name_ignores_case() {
    let items = vec![article("banana"), article("Apple"), article("cherry")];
    let asc = filter_and_sort(items.clone(), "", FolderFilter::All, SortOption::NameAsc);
    assert_eq!(titles(&asc), ["Apple", "banana", "cherry"]);
    let desc = filter_and_sort(items, "", FolderFilter::All, SortOption::NameDesc);
    assert_eq!(titles(&desc), ["cherry", "banana", "Apple"]);
}

#[test]
fn sort_by_read_time() {
    let mut long = article("long");
    long.pages[0].content = lines(100);
    let mut medium = article("medium");
    medium.pages[0].content = lines(50);
    let short = article("short");

    let items = vec![medium, short, long];
    let asc = filter_and_sort(items.clone(), "", FolderFilter::All, SortOption::ReadTimeAsc);
    assert_eq!(titles(&asc), ["short", "medium", "long"]);
    let desc = filter_and_sort(items, "", FolderFilter::All, SortOption::ReadTimeDesc);
    assert_eq!(titles(&desc), ["long", "medium", "short"]);
}

#[test]
fn featured_first_then_newest() {
    let mut featured_old = aged("featured-old", 1);
    featured_old.featured = true;
    let plain_new = aged("plain-new", 5);
    let plain_old = aged("plain-old", 2);
    let mut featured_new = aged("featured-new", 4);
    featured_new.featured = true;

    let out = filter_and_sort(
        vec![plain_old, featured_old, plain_new, featured_new],
        "",
        FolderFilter::All,
        SortOption::FeaturedFirst,
    );
    assert_eq!(titles(&out), ["featured-new", "featured-old", "plain-new", "plain-old"]);
}

#[test]
fn tags_count_descending() {
    let mut two = article("two");
    two.tags = vec!["a".into(), "b".into()];
    let none = article("none");
    let mut three = article("three");
    three.tags = vec!["a".into(), "b".into(), "c".into()];

    let out = filter_and_sort(vec![two, none, three], "", FolderFilter::All, SortOption::TagsCount);
    assert_eq!(titles(&out), ["three", "two", "none"]);
}

// =============================================================================
// catalog_stats
// =============================================================================

#[test]
fn stats_on_empty_catalog() {
    let stats = catalog_stats(&[]);
    assert_eq!(
        stats,
        CatalogStats { total_blogs: 0, unique_topics: 0, avg_read_time: 0, uncategorized_count: 0 }
    );
}

#[test]
fn stats_count_topics_read_time_and_uncategorized() {
    let mut a = article("a");
    a.tags = vec!["arrays".into(), "graphs".into()];
    a.pages[0].content = lines(42);
    let mut b = article("b");
    b.tags = vec!["graphs".into()];
    b.folder_id = Some(Uuid::new_v4());
    let c = article("c");

    let stats = catalog_stats(&[a, b, c]);
    assert_eq!(stats.total_blogs, 3);
    assert_eq!(stats.unique_topics, 2);
    // (2 + 1 + 1) / 3 = 1.33 -> 1
    assert_eq!(stats.avg_read_time, 1);
    assert_eq!(stats.uncategorized_count, 2);
}

// =============================================================================
// Postgres (requires DATABASE_URL)
// =============================================================================

// =========================================================================
// Validation
// =========================================================================

fn lazy_pool() -> PgPool {
    crate::state::test_helpers::test_app_state(None).pool
}

fn folder_draft(name: &str, description: Option<&str>) -> FolderDraft {
    FolderDraft { name: name.into(), description: description.map(str::to_owned) }
}

#[test]
fn blank_titles_are_invalid() {
    for title in ["", "   ", "\t\n"] {
        assert!(matches!(require_title(title), Err(CatalogError::Invalid(_))), "{title:?}");
    }
    assert_eq!(require_title("  Graphs ").unwrap(), "Graphs");
}

#[test]
fn blank_folder_names_are_invalid() {
    for name in ["", "  ", "\n"] {
        assert!(matches!(require_folder_name(name), Err(CatalogError::Invalid(_))), "{name:?}");
    }
    assert_eq!(require_folder_name(" Interview Prep ").unwrap(), "Interview Prep");
}

#[test]
fn blank_descriptions_become_none() {
    assert_eq!(blank_to_none(None), None);
    assert_eq!(blank_to_none(Some("   ".into())), None);
    assert_eq!(blank_to_none(Some(" Trees and graphs ".into())), Some("Trees and graphs".into()));
}

#[tokio::test]
async fn create_article_rejects_blank_title_before_querying() {
    let draft: ArticleDraft = serde_json::from_value(serde_json::json!({ "title": "  " })).unwrap();
    let err = create_article(&lazy_pool(), draft).await.unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
}

#[tokio::test]
async fn folder_writes_reject_blank_name_before_querying() {
    let err = create_folder(&lazy_pool(), folder_draft(" ", Some("desc"))).await.unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));

    let err = update_folder(&lazy_pool(), Uuid::new_v4(), folder_draft("", None)).await.unwrap_err();
    assert!(matches!(err, CatalogError::Invalid(_)));
}

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;

    async fn pool() -> PgPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
        crate::db::init_pool(&url).await.expect("db init")
    }

    #[tokio::test]
    async fn article_crud_round_trip() {
        let pool = pool().await;
        let folder = create_folder(&pool, FolderDraft { name: "Algorithms".into(), description: None })
            .await
            .unwrap();

        let created = create_article(
            &pool,
            ArticleDraft {
                title: "Complexity".into(),
                summary: "Big-O".into(),
                author_name: "Admin".into(),
                pages: vec![Page { title: "Intro".into(), content: "Big-O describes growth rate...".into() }],
                tags: vec![" big-o ".into()],
                featured: false,
                ai_insights_enabled: true,
                folder_id: Some(folder.id),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.tags, vec!["big-o"]);
        assert_eq!(created.folder_name.as_deref(), Some("Algorithms"));

        let patch: ArticlePatch = serde_json::from_str(r#"{"folder_id":null,"featured":true}"#).unwrap();
        let updated = update_article(&pool, created.id, patch).await.unwrap();
        assert!(updated.featured);
        assert!(updated.folder_id.is_none());

        delete_article(&pool, created.id).await.unwrap();
        assert!(matches!(get_article(&pool, created.id).await, Err(CatalogError::NotFound(_))));
        delete_folder(&pool, folder.id).await.unwrap();
    }

    #[tokio::test]
    async fn deleting_folder_uncategorizes_articles() {
        let pool = pool().await;
        let folder = create_folder(&pool, FolderDraft { name: "Temp".into(), description: Some(" ".into()) })
            .await
            .unwrap();
        assert!(folder.description.is_none());

        let draft = ArticleDraft {
            title: "Orphan".into(),
            summary: String::new(),
            author_name: String::new(),
            pages: Vec::new(),
            tags: Vec::new(),
            featured: false,
            ai_insights_enabled: false,
            folder_id: Some(folder.id),
        };
        let article = create_article(&pool, draft).await.unwrap();
        delete_folder(&pool, folder.id).await.unwrap();

        let reloaded = get_article(&pool, article.id).await.unwrap();
        assert!(reloaded.folder_id.is_none());
        delete_article(&pool, article.id).await.unwrap();
    }
}
