use std::path::PathBuf;

use quiz_core::model::BankId;
use serde_json::json;
use storage::repository::{BankRepository, StorageError};
use storage::{JsonFileRepository, read_html_pages, write_json_report};

fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("quiz-storage-{}", uuid::Uuid::new_v4()))
}

async fn seed(root: &PathBuf) {
    tokio::fs::create_dir_all(root.join("aws")).await.unwrap();
    tokio::fs::create_dir_all(root.join("terraform")).await.unwrap();
    tokio::fs::create_dir_all(root.join(".cache")).await.unwrap();

    let records = json!([
        {"filename": "question 1 discussion.html", "question": "Q1", "choices": ["a", "b"]},
        {"filename": "question 2 discussion.html", "question": null, "choices": []}
    ]);
    tokio::fs::write(
        root.join("aws").join("data_engineer_associate.json"),
        serde_json::to_vec(&records).unwrap(),
    )
    .await
    .unwrap();
    tokio::fs::write(root.join("aws").join("notes.txt"), b"ignored")
        .await
        .unwrap();
    tokio::fs::write(root.join("terraform").join("associate.json"), b"{\"not\": \"array\"}")
        .await
        .unwrap();
}

#[tokio::test]
async fn json_repository_lists_and_loads_banks() {
    let root = scratch_dir();
    seed(&root).await;
    let repo = JsonFileRepository::new(&root);

    assert_eq!(repo.list_vendors().await.unwrap(), vec!["aws", "terraform"]);

    let banks = repo.list_banks("aws").await.unwrap();
    assert_eq!(banks, vec![BankId::new("aws", "data_engineer_associate").unwrap()]);

    let records = repo.load_records(&banks[0]).await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["question"], "Q1");

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn json_repository_reports_missing_and_bad_documents() {
    let root = scratch_dir();
    seed(&root).await;
    let repo = JsonFileRepository::new(&root);

    let missing = BankId::new("aws", "sysops").unwrap();
    assert!(matches!(
        repo.load_records(&missing).await,
        Err(StorageError::NotFound(_))
    ));
    assert!(matches!(
        repo.list_banks("gcp").await,
        Err(StorageError::NotFound(_))
    ));

    let not_array = BankId::new("terraform", "associate").unwrap();
    assert!(matches!(
        repo.load_records(&not_array).await,
        Err(StorageError::Serialization(_))
    ));

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn report_writer_creates_parent_directories() {
    let root = scratch_dir();
    let path = root.join("reports").join("audit_report.json");

    write_json_report(&path, &json!({"total_questions": 3})).await.unwrap();

    let written: serde_json::Value =
        serde_json::from_slice(&tokio::fs::read(&path).await.unwrap()).unwrap();
    assert_eq!(written["total_questions"], 3);

    tokio::fs::remove_dir_all(&root).await.unwrap();
}

#[tokio::test]
async fn html_pages_are_read_in_name_order() {
    let root = scratch_dir();
    tokio::fs::create_dir_all(root.join("nested.html")).await.unwrap();
    tokio::fs::write(root.join("question 2.html"), "<p>two</p>").await.unwrap();
    tokio::fs::write(root.join("question 1.HTML"), "<p>one</p>").await.unwrap();
    tokio::fs::write(root.join("index.txt"), "skip").await.unwrap();

    let pages = read_html_pages(&root).await.unwrap();
    let names: Vec<_> = pages.iter().map(|p| p.filename.as_str()).collect();
    assert_eq!(names, vec!["question 1.HTML", "question 2.html"]);
    assert_eq!(pages[1].html, "<p>two</p>");

    assert!(matches!(
        read_html_pages(&root.join("missing")).await,
        Err(StorageError::NotFound(_))
    ));

    tokio::fs::remove_dir_all(&root).await.unwrap();
}
