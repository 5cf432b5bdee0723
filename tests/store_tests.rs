// tests for the cloud archive
// run with: cargo test --features test-db
// requires DATABASE_URL env var

#![cfg(feature = "test-db")]

use codeguard::Archive;

fn get_db_url() -> String {
    std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for db tests")
}

#[tokio::test]
async fn test_connect() {
    let archive = Archive::connect(&get_db_url()).await;
    assert!(archive.is_ok());
}

#[tokio::test]
async fn test_insert_then_recent() {
    let archive = Archive::connect(&get_db_url()).await.unwrap();

    let code = "import os; os.system(input())";
    let report = "## Audit\n\n- **Critical**: command injection.";
    archive.insert(code, report).await.unwrap();

    let records = archive.recent().await.unwrap();
    assert!(!records.is_empty());

    // newest first, so ours is at the front
    let latest = &records[0];
    assert_eq!(latest.code, code);
    assert_eq!(latest.report, report);
    assert!(latest.id > 0);
}

#[tokio::test]
async fn test_timestamp_is_iso_8601() {
    let archive = Archive::connect(&get_db_url()).await.unwrap();

    archive.insert("x = 1", "no findings").await.unwrap();

    let records = archive.recent().await.unwrap();
    let stamp = records[0].created_at.as_deref().expect("timestamp set");
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
}

#[tokio::test]
async fn test_recent_caps_at_ten() {
    let archive = Archive::connect(&get_db_url()).await.unwrap();

    for i in 0..12 {
        archive
            .insert(&format!("print({i})"), "no findings")
            .await
            .unwrap();
    }

    let records = archive.recent().await.unwrap();
    assert_eq!(records.len(), 10);

    // timestamps never increase going down the list
    let stamps: Vec<_> = records.iter().filter_map(|r| r.created_at.clone()).collect();
    for pair in stamps.windows(2) {
        assert!(pair[0] >= pair[1]);
    }
}
