use std::sync::Arc;

use marquee_backend::journal::SearchJournal;
use tempfile::tempdir;

use super::support::{ScriptedCatalog, create_session, submit_input, test_app, wait_for_view};

#[tokio::test]
async fn journaled_searches_survive_a_restart() {
    let data_dir = tempdir().expect("temp data dir");

    {
        let catalog = Arc::new(ScriptedCatalog::default());
        let (app, _journal) = test_app(data_dir.path(), catalog);

        let session_id = create_session(&app).await;
        wait_for_view(&app, &session_id, |view| view["phase"] == "idle").await;

        submit_input(&app, &session_id, "batman").await;
        wait_for_view(&app, &session_id, |view| {
            view["committedQuery"] == "batman" && view["phase"] == "idle"
        })
        .await;

        submit_input(&app, &session_id, "alien").await;
        wait_for_view(&app, &session_id, |view| {
            view["committedQuery"] == "alien" && view["phase"] == "idle"
        })
        .await;
    }

    // A fresh process opening the same data dir sees the recorded counts.
    let reopened = SearchJournal::open(data_dir.path());
    assert_eq!(reopened.len(), 2);
    let queries: Vec<String> = reopened
        .trending(5)
        .into_iter()
        .map(|record| record.query)
        .collect();
    assert!(queries.contains(&"batman".to_string()));
    assert!(queries.contains(&"alien".to_string()));
}

#[tokio::test]
async fn repeated_searches_accumulate_across_sessions() {
    let data_dir = tempdir().expect("temp data dir");
    let catalog = Arc::new(ScriptedCatalog::default());
    let (app, journal) = test_app(data_dir.path(), catalog);

    for _ in 0..2 {
        let session_id = create_session(&app).await;
        wait_for_view(&app, &session_id, |view| view["phase"] == "idle").await;

        submit_input(&app, &session_id, "batman").await;
        wait_for_view(&app, &session_id, |view| {
            view["committedQuery"] == "batman" && view["phase"] == "idle"
        })
        .await;
    }

    let trending = journal.trending(5);
    assert_eq!(trending.len(), 1);
    assert_eq!(trending[0].count, 2);
}
