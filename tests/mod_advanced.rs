use bson::doc;
use devcamper::advanced::{AdvancedResults, CountMode, PageLink, PaginationConfig, scope};
use devcamper::document::Document;
use devcamper::engine::Engine;
use devcamper::query_string::QuerySpec;
use devcamper::resources::{self, BOOTCAMPS};
use devcamper::seed;
use devcamper::store::{MemoryStore, Populate};
use devcamper::ApiError;
use std::path::PathBuf;
use std::sync::Arc;

const DEVWORKS: &str = "5d713995b721c3bb38c1f5d0";

fn seeded() -> Arc<Engine> {
    let engine = Arc::new(Engine::new());
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    seed::import_dir(&engine, &dir).unwrap();
    engine
}

fn names(data: &[serde_json::Value]) -> Vec<&str> {
    data.iter().map(|d| d["name"].as_str().unwrap()).collect()
}

async fn bootcamps(q: &str) -> Result<devcamper::ResultEnvelope, ApiError> {
    let store = MemoryStore::new(seeded(), BOOTCAMPS);
    AdvancedResults::new().run(&store, &QuerySpec::parse(q)).await
}

#[tokio::test]
async fn lte_compares_numerically() {
    let env = bootcamps("averageCost[lte]=10000&sort=averageCost").await.unwrap();
    assert_eq!(env.count, 2);
    assert_eq!(names(&env.data), vec!["Codemasters", "Devworks Bootcamp"]);
}

#[tokio::test]
async fn range_and_membership_combine() {
    let env = bootcamps("averageCost[gt]=9000&averageCost[lt]=15000&careers[in]=UI%2FUX&sort=name")
        .await
        .unwrap();
    assert_eq!(names(&env.data), vec!["Devworks Bootcamp", "ModernTech Bootcamp"]);
}

#[tokio::test]
async fn literal_equality_on_nested_and_boolean_fields() {
    let env = bootcamps("location.state=MA&housing=true").await.unwrap();
    assert_eq!(names(&env.data), vec!["Devworks Bootcamp"]);
    let env = bootcamps("location.zipcode=02118").await.unwrap();
    assert_eq!(env.count, 1);
}

#[tokio::test]
async fn numeric_looking_text_still_matches() {
    let engine = Arc::new(Engine::new());
    let col = engine.create_collection("camps");
    col.insert_document(
        Document::new(doc! {"name": "NYC", "location": {"zipcode": "10001"}}).unwrap(),
    )
    .unwrap();
    let store = MemoryStore::new(engine, "camps");
    let results = AdvancedResults::new();
    let env = results
        .run(&store, &QuerySpec::parse("location.zipcode=10001"))
        .await
        .unwrap();
    assert_eq!(names(&env.data), vec!["NYC"]);
    let env = results
        .run(&store, &QuerySpec::parse("location.zipcode=10002"))
        .await
        .unwrap();
    assert_eq!(env.count, 0);
}

#[tokio::test]
async fn select_keeps_id_and_requested_fields() {
    let env = bootcamps("select=name,averageCost&sort=-averageCost").await.unwrap();
    let first = env.data[0].as_object().unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(keys.len(), 3);
    assert!(first.contains_key("_id"));
    assert_eq!(first["name"], "Devcentral Bootcamp");
    assert_eq!(first["averageCost"], 15000);
}

#[tokio::test]
async fn multi_key_sort() {
    let store = MemoryStore::new(seeded(), resources::COURSES);
    let env = AdvancedResults::new()
        .run(&store, &QuerySpec::parse("sort=-weeks,tuition&select=title,weeks,tuition"))
        .await
        .unwrap();
    let rows: Vec<(i64, i64)> = env
        .data
        .iter()
        .map(|d| (d["weeks"].as_i64().unwrap(), d["tuition"].as_i64().unwrap()))
        .collect();
    assert_eq!(rows[0], (12, 10000));
    assert_eq!(rows[1], (12, 10000));
    assert_eq!(rows[2], (10, 9000));
    assert_eq!(rows.last(), Some(&(6, 5000)));
}

#[tokio::test]
async fn default_sort_is_newest_first() {
    let engine = Arc::new(Engine::new());
    let col = engine.create_collection("events");
    for (name, at) in [
        ("old", "2020-01-01T00:00:00Z"),
        ("new", "2024-01-01T00:00:00Z"),
        ("mid", "2022-01-01T00:00:00Z"),
    ] {
        col.insert_document(Document::new(doc! {"name": name, "createdAt": at}).unwrap()).unwrap();
    }
    let store = MemoryStore::new(engine, "events");
    let env = AdvancedResults::new().run(&store, &QuerySpec::default()).await.unwrap();
    assert_eq!(names(&env.data), vec!["new", "mid", "old"]);
}

fn numbered(n: i64) -> Arc<Engine> {
    let engine = Arc::new(Engine::new());
    let col = engine.create_collection("items");
    for i in 0..n {
        col.insert_document(Document::new(doc! {"n": i, "even": i % 2 == 0}).unwrap()).unwrap();
    }
    engine
}

#[tokio::test]
async fn forty_five_items_paginate() {
    let store = MemoryStore::new(numbered(45), "items");
    let results = AdvancedResults::new();

    let p1 = results.run(&store, &QuerySpec::parse("sort=n")).await.unwrap();
    assert_eq!(p1.count, 20);
    assert_eq!(p1.pagination.next, Some(PageLink { page: 2, limit: 20 }));
    assert_eq!(p1.pagination.prev, None);

    let p3 = results.run(&store, &QuerySpec::parse("sort=n&page=3")).await.unwrap();
    assert_eq!(p3.count, 5);
    assert_eq!(p3.data[0]["n"], 40);
    assert_eq!(p3.pagination.next, None);
    assert_eq!(p3.pagination.prev, Some(PageLink { page: 2, limit: 20 }));

    let beyond = results.run(&store, &QuerySpec::parse("page=9")).await.unwrap();
    assert_eq!(beyond.count, 0);
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.pagination.prev, Some(PageLink { page: 8, limit: 20 }));
}

#[tokio::test]
async fn windows_do_not_overlap() {
    let store = MemoryStore::new(numbered(23), "items");
    let results = AdvancedResults::new();
    let mut seen = Vec::new();
    for page in 1..=5 {
        let env = results
            .run(&store, &QuerySpec::parse(&format!("sort=n&limit=5&page={page}")))
            .await
            .unwrap();
        seen.extend(env.data.iter().map(|d| d["n"].as_i64().unwrap()));
    }
    assert_eq!(seen, (0..23).collect::<Vec<_>>());
}

#[tokio::test]
async fn large_limits_reach_every_document() {
    let store = MemoryStore::new(numbered(10_005), "items");
    let results = AdvancedResults::new();

    let env = results
        .run(&store, &QuerySpec::parse("sort=n&limit=20000"))
        .await
        .unwrap();
    assert_eq!(env.count, 10_005);
    assert_eq!(env.pagination.next, None);

    let env = results
        .run(&store, &QuerySpec::parse("sort=n&limit=5000"))
        .await
        .unwrap();
    assert_eq!(env.count, 5000);
    assert_eq!(env.pagination.next, Some(PageLink { page: 2, limit: 5000 }));

    let capped = PaginationConfig { max_limit: 1000, ..PaginationConfig::default() };
    let env = AdvancedResults::new()
        .with_pagination(capped)
        .run(&store, &QuerySpec::parse("sort=n&limit=5000"))
        .await
        .unwrap();
    assert_eq!(env.count, 1000);
    assert_eq!(env.pagination.next, Some(PageLink { page: 2, limit: 1000 }));
}

#[tokio::test]
async fn count_mode_decides_next_link() {
    let store = MemoryStore::new(numbered(30), "items");
    let q = QuerySpec::parse("even=true&limit=10");

    let filtered = AdvancedResults::new().run(&store, &q).await.unwrap();
    assert_eq!(filtered.count, 10);
    assert!(filtered.pagination.next.is_some());

    let q2 = QuerySpec::parse("even=true&limit=10&page=2");
    let filtered = AdvancedResults::new().run(&store, &q2).await.unwrap();
    assert_eq!(filtered.count, 5);
    assert_eq!(filtered.pagination.next, None);

    let cfg = PaginationConfig { count_mode: CountMode::Collection, ..PaginationConfig::default() };
    let unfiltered = AdvancedResults::new().with_pagination(cfg).run(&store, &q2).await.unwrap();
    assert_eq!(unfiltered.count, 5);
    assert_eq!(unfiltered.pagination.next, Some(PageLink { page: 3, limit: 10 }));
}

#[tokio::test]
async fn populate_with_scope() {
    let store = resources::course_store(seeded());
    let results = AdvancedResults::new()
        .with_populate(Populate::path("bootcamp").select("name description"));
    let env = results
        .run_scoped(&store, &QuerySpec::parse("select=title,bootcamp"), scope("bootcamp", DEVWORKS))
        .await
        .unwrap();
    assert_eq!(env.count, 2);
    for course in &env.data {
        let camp = course["bootcamp"].as_object().unwrap();
        assert_eq!(camp["name"], "Devworks Bootcamp");
        assert!(camp.contains_key("description"));
        assert!(!camp.contains_key("averageCost"));
    }
}

#[tokio::test]
async fn malformed_operator_is_client_input() {
    let err = bootcamps("averageCost[lte]=1&averageCost[size]=2").await.unwrap_err();
    assert!(matches!(err, ApiError::ClientInput(_)));
    let err = bootcamps("select=name,-description").await.unwrap_err();
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
}
