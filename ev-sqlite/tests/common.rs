#![allow(dead_code)]

use ev_core::{
    admission::Draft,
    engine,
    models::{Submission, SubmissionId, Timestamp},
};
use ev_sqlite::{Db, config::SqliteConfig};

pub async fn memory_db() -> anyhow::Result<Db> {
    Ok(Db::open(&SqliteConfig::default()).await?)
}

pub fn draft(post: u64, category: &str) -> Draft {
    Draft {
        source_url: format!("https://x.com/editor/status/{post}"),
        caption: format!("edit #{post}"),
        author: "editor".to_owned(),
        category: category.to_owned(),
    }
}

pub async fn submit(db: &Db, post: u64, category: &str) -> anyhow::Result<Submission> {
    Ok(engine::submit(
        db,
        &draft(post, category),
        SubmissionId::random(),
        Timestamp::from_millis(1_700_000_000_000 + post as i64),
    )
    .await?)
}
