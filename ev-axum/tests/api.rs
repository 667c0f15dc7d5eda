use axum::http::StatusCode;
use axum_test::TestServer;
use ev_axum::{config::AxumConfig, router};
use ev_local::LocalStore;
use ev_sqlite::{Db, config::SqliteConfig};
use rstest::*;
use serde_json::{Value, json};

mod app;
use app::{ADMIN, TestApp};

#[derive(Debug, Clone, Copy)]
enum Backend {
    Local,
    Shared,
}

async fn serve(backend: Backend) -> anyhow::Result<TestServer> {
    let config = AxumConfig {
        leaderboard_size: 3,
        ..Default::default()
    };
    let router = match backend {
        Backend::Local => router(TestApp(LocalStore::empty()), config),
        Backend::Shared => {
            let db = Db::open(&SqliteConfig::default()).await?;
            router(TestApp(db), config)
        }
    };
    Ok(TestServer::new(router)?)
}

fn entry(post: u64, category: &str) -> Value {
    json!({
        "source_url": format!("https://twitter.com/editor/status/{post}"),
        "caption": format!("edit #{post}"),
        "author": "@editor",
        "category": category,
    })
}

async fn submit(server: &TestServer, post: u64, category: &str) -> String {
    let response = server.post("/submission").json(&entry(post, category)).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_str()
        .map(str::to_owned)
        .unwrap_or_default()
}

async fn vote(server: &TestServer, id: &str, voter: &str, direction: &str) -> Value {
    let response = server
        .post(&format!("/submission/{id}/vote"))
        .json(&json!({ "voter": voter, "direction": direction }))
        .await;
    response.assert_status_ok();
    response.json()
}

// Important:
// Without a multithreaded runtime, the tests cannot make progress
#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn health_and_docs(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;

    let health = server.get("/health").await;
    health.assert_status_ok();
    health.assert_json(&json!({ "status": "ok" }));

    let docs = server.get("/docs/api.json").await;
    docs.assert_status_ok();
    let docs: Value = docs.json();
    assert!(docs["paths"]["/submission/{submission_id}/vote"].is_object());
    assert_eq!(docs["components"]["securitySchemes"]["jwt"]["scheme"], "bearer");
    let delete = &docs["paths"]["/category/{name}"]["delete"];
    assert!(delete["security"][0]["jwt"].is_array());
    let tags: Vec<&str> = docs["tags"]
        .as_array()
        .map(|tags| tags.iter().filter_map(|t| t["name"].as_str()).collect())
        .unwrap_or_default();
    for tag in ["submission", "vote", "category", "admin", "health"] {
        assert!(tags.contains(&tag), "{tag} is documented");
    }

    let page = server.get("/docs").await;
    page.assert_status_ok();
    assert!(page.text().contains("/docs/api.json"));

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn submission_is_normalized(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;

    let response = server
        .post("/submission")
        .json(&json!({
            "source_url": "https://x.com/someone/status/12345?s=20",
            "caption": "  Son dakika golü  ",
            "author": "@@Kanka ",
            "category": " FUTBOL ",
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["external_post_id"], "12345");
    assert_eq!(created["caption"], "Son dakika golü");
    assert_eq!(created["author"], "Kanka");
    assert_eq!(created["category"], "futbol");
    assert_eq!(created["vote_count"], 0);

    let id = created["id"].as_str().unwrap_or_default();
    let fetched = server.get(&format!("/submission/{id}")).await;
    fetched.assert_status_ok();
    fetched.assert_json(&created);

    Ok(())
}

#[rstest]
#[case::not_a_post("https://x.com/someone", "caption", "")]
#[case::empty_caption("https://x.com/someone/status/1", "   ", "")]
#[case::caption_too_long("https://x.com/someone/status/1", "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "")]
#[case::author_too_long("https://x.com/someone/status/1", "caption", "bbbbbbbbbbbbbbbbbbbbb")]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn invalid_submissions_are_refused(
    #[case] source_url: &str,
    #[case] caption: &str,
    #[case] author: &str,
) -> anyhow::Result<()> {
    let server = serve(Backend::Shared).await?;

    let response = server
        .post("/submission")
        .json(&json!({
            "source_url": source_url,
            "caption": caption,
            "author": author,
            "category": "mizah",
        }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let feed: Vec<Value> = server.get("/submission").await.json();
    assert!(feed.is_empty());

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn duplicate_posts_conflict(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    submit(&server, 77, "dizi").await;

    // Same post, different host and trailing parameters
    let response = server
        .post("/submission")
        .json(&json!({
            "source_url": "https://www.x.com/other/status/77?t=1",
            "caption": "again",
            "category": "film",
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    let feed: Vec<Value> = server.get("/submission").await.json();
    assert_eq!(feed.len(), 1);

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn votes_follow_the_damped_transitions(
    #[values(Backend::Local, Backend::Shared)] backend: Backend,
) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let id = submit(&server, 1, "mizah").await;

    let outcome = vote(&server, &id, "alice", "up").await;
    assert_eq!(outcome, json!({ "new_aggregate": 1, "new_voter_state": "up" }));

    let outcome = vote(&server, &id, "bob", "up").await;
    assert_eq!(outcome["new_aggregate"], 2);

    // The opposite direction only retracts
    let outcome = vote(&server, &id, "alice", "down").await;
    assert_eq!(outcome, json!({ "new_aggregate": 1, "new_voter_state": "none" }));

    let outcome = vote(&server, &id, "alice", "down").await;
    assert_eq!(outcome, json!({ "new_aggregate": 0, "new_voter_state": "down" }));

    // Repeating a direction retracts as well
    let outcome = vote(&server, &id, "bob", "up").await;
    assert_eq!(outcome, json!({ "new_aggregate": -1, "new_voter_state": "none" }));

    let fetched: Value = server.get(&format!("/submission/{id}")).await.json();
    assert_eq!(fetched["vote_count"], -1);

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn unknown_submissions_are_not_found(
    #[values(Backend::Local, Backend::Shared)] backend: Backend,
) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let missing = "00000000-0000-4000-8000-000000000000";

    server
        .get(&format!("/submission/{missing}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post(&format!("/submission/{missing}/vote"))
        .json(&json!({ "voter": "alice", "direction": "up" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/submission/{missing}"))
        .authorization_bearer(ADMIN)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn feed_filters_sorts_and_reports_my_vote(
    #[values(Backend::Local, Backend::Shared)] backend: Backend,
) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let first = submit(&server, 1, "futbol").await;
    let second = submit(&server, 2, "mizah").await;
    let third = submit(&server, 3, "futbol").await;

    vote(&server, &first, "alice", "up").await;
    vote(&server, &first, "bob", "up").await;
    vote(&server, &third, "alice", "down").await;

    let feed: Vec<Value> = server
        .get("/submission")
        .add_query_param("category", "futbol")
        .add_query_param("sort", "top")
        .add_query_param("voter", "alice")
        .await
        .json();
    let ids: Vec<&str> = feed.iter().filter_map(|e| e["id"].as_str()).collect();
    assert_eq!(ids, [first.as_str(), third.as_str()]);
    assert_eq!(feed[0]["my_vote"], "up");
    assert_eq!(feed[1]["my_vote"], "down");

    // Without a token nobody has voted
    let feed: Vec<Value> = server
        .get("/submission")
        .add_query_param("category", "all")
        .await
        .json();
    assert_eq!(feed.len(), 3);
    assert!(feed.iter().all(|e| e["my_vote"] == "none"));

    let feed: Vec<Value> = server
        .get("/submission")
        .add_query_param("sort", "newest")
        .await
        .json();
    let ids: Vec<&str> = feed.iter().filter_map(|e| e["id"].as_str()).collect();
    assert_eq!(ids.len(), 3);
    assert!(ids.contains(&second.as_str()));

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn leaderboard_is_capped(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let mut ids = Vec::new();
    for post in 1..=4 {
        ids.push(submit(&server, post, "dizi").await);
    }
    // Give submission n exactly n up-votes
    for (n, id) in ids.iter().enumerate() {
        for voter in 0..=n {
            vote(&server, id, &format!("voter-{voter}"), "up").await;
        }
    }

    let board: Vec<Value> = server.get("/leaderboard").await.json();
    let totals: Vec<i64> = board.iter().filter_map(|e| e["vote_count"].as_i64()).collect();
    assert_eq!(totals, [4, 3, 2]);

    let board: Vec<Value> = server
        .get("/leaderboard")
        .add_query_param("size", 1)
        .await
        .json();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0]["id"], ids[3]);

    // Asking for more than the configured size is capped
    let board: Vec<Value> = server
        .get("/leaderboard")
        .add_query_param("size", 50)
        .await
        .json();
    assert_eq!(board.len(), 3);

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn admin_operations_require_a_token(
    #[values(Backend::Local, Backend::Shared)] backend: Backend,
) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let id = submit(&server, 9, "mizah").await;

    server
        .delete(&format!("/submission/{id}"))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .delete(&format!("/submission/{id}"))
        .authorization_bearer("somebody")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .put(&format!("/submission/{id}/category"))
        .json(&json!({ "category": "film" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/category")
        .json(&json!({ "name": "anime" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .delete("/category/anime")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Nothing happened
    server
        .get(&format!("/submission/{id}"))
        .await
        .assert_status_ok();

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn admin_deletes_and_reassigns(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;
    let keep = submit(&server, 1, "mizah").await;
    let drop = submit(&server, 2, "mizah").await;
    vote(&server, &drop, "alice", "up").await;

    let response = server
        .put(&format!("/submission/{keep}/category"))
        .authorization_bearer(ADMIN)
        .json(&json!({ "category": " Anime " }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["category"], "anime");

    server
        .delete(&format!("/submission/{drop}"))
        .authorization_bearer(ADMIN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/submission/{drop}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    // The deleted entry's votes went with it
    let feed: Vec<Value> = server
        .get("/submission")
        .add_query_param("voter", "alice")
        .await
        .json();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0]["my_vote"], "none");

    // Reassignment grew the registry
    let categories: Vec<Value> = server.get("/category").await.json();
    assert!(categories.iter().any(|c| c["name"] == "anime"));

    Ok(())
}

#[rstest]
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn category_registry(#[values(Backend::Local, Backend::Shared)] backend: Backend) -> anyhow::Result<()> {
    let server = serve(backend).await?;

    let categories: Vec<Value> = server.get("/category").await.json();
    assert_eq!(categories.len(), 7);
    assert_eq!(
        categories[0],
        json!({ "name": "futbol", "display_name": "Futbol", "base": true })
    );

    let created = server
        .post("/category")
        .authorization_bearer(ADMIN)
        .json(&json!({ "name": "Anime" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    created.assert_json(&json!({ "name": "anime", "display_name": "Anime", "base": false }));

    server
        .post("/category")
        .authorization_bearer(ADMIN)
        .json(&json!({ "name": "ANIME" }))
        .await
        .assert_status_ok();
    server
        .post("/category")
        .authorization_bearer(ADMIN)
        .json(&json!({ "name": "all" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let categories: Vec<Value> = server.get("/category").await.json();
    assert_eq!(categories.len(), 8);

    // A submission keeps its tag after the tag is removed
    let id = submit(&server, 5, "anime").await;
    server
        .delete("/category/anime")
        .authorization_bearer(ADMIN)
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete("/category/anime")
        .authorization_bearer(ADMIN)
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete("/category/futbol")
        .authorization_bearer(ADMIN)
        .await
        .assert_status(StatusCode::CONFLICT);

    let categories: Vec<Value> = server.get("/category").await.json();
    assert_eq!(categories.len(), 7);
    let fetched: Value = server.get(&format!("/submission/{id}")).await.json();
    assert_eq!(fetched["category"], "anime");

    Ok(())
}
