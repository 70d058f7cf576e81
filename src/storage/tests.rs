use super::*;
use crate::artifact::{PageFiles, package};

fn artifact() -> PackagedArtifact {
    package(&PageFiles {
        page_title: "KPIs".to_string(),
        html: "<div>kpi</div>".to_string(),
        css: "div{}".to_string(),
        js: "console.log(1)".to_string(),
    })
}

fn uploader(store: Arc<MemoryObjectStore>, attempts: u32) -> ArtifactUploader {
    ArtifactUploader::new(store, "https://pub.example.dev/", RetryPolicy::new(attempts, 1))
}

fn prefix_of(url: &str) -> &str {
    url.trim_start_matches("https://pub.example.dev/")
        .trim_end_matches("/index.html")
}

#[test]
fn test_artifact_key_format() {
    let key = new_artifact_key();
    let parts: Vec<&str> = key.splitn(3, '-').collect();

    assert_eq!(parts[0], "artifact");
    assert_eq!(parts[1].len(), 14);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 32);
}

#[tokio::test]
async fn test_upload_writes_three_files_and_returns_index_url() {
    let store = Arc::new(MemoryObjectStore::new());
    let url = uploader(store.clone(), 1).upload(&artifact()).await.unwrap();

    assert!(url.starts_with("https://pub.example.dev/artifact-"));
    assert!(url.ends_with("/index.html"));

    let prefix = prefix_of(&url);
    let index = store.get(&format!("{}/index.html", prefix)).await.unwrap();
    assert_eq!(index.content_type, "text/html");
    assert!(String::from_utf8(index.body).unwrap().contains("<div>kpi</div>"));

    let css = store.get(&format!("{}/styles.css", prefix)).await.unwrap();
    assert_eq!(css.content_type, "text/css");
    assert_eq!(css.body, b"div{}".to_vec());

    let js = store.get(&format!("{}/app.js", prefix)).await.unwrap();
    assert_eq!(js.content_type, "application/javascript");
}

#[tokio::test]
async fn test_back_to_back_uploads_never_collide() {
    let store = Arc::new(MemoryObjectStore::new());
    let uploader = uploader(store.clone(), 1);

    let first = uploader.upload(&artifact()).await.unwrap();
    let second = uploader.upload(&artifact()).await.unwrap();

    assert_ne!(prefix_of(&first), prefix_of(&second));
    assert_eq!(store.keys().await.len(), 6);
}

#[tokio::test]
async fn test_transient_put_failure_is_retried() {
    let store = Arc::new(MemoryObjectStore::new());
    store.fail_next(1);

    let url = uploader(store.clone(), 2).upload(&artifact()).await.unwrap();
    assert!(store.get(&format!("{}/index.html", prefix_of(&url))).await.is_some());
}

#[tokio::test]
async fn test_persistent_failure_surfaces_upload_error() {
    let store = Arc::new(MemoryObjectStore::new());
    store.fail_next(10);

    let err = uploader(store, 2).upload(&artifact()).await.unwrap_err();
    assert!(matches!(err, StorageError::Upload { .. }));
}

#[tokio::test]
async fn test_missing_public_url_fails_before_any_write() {
    let store = Arc::new(MemoryObjectStore::new());
    let uploader = ArtifactUploader::new(store.clone(), "", RetryPolicy::once());

    let err = uploader.upload(&artifact()).await.unwrap_err();
    assert!(matches!(err, StorageError::MissingConfig(_)));
    assert!(store.keys().await.is_empty());
}

#[tokio::test]
async fn test_unconfigured_s3_store_fails_fast() {
    let config = StorageConfig {
        account_id: String::new(),
        access_key_id: String::new(),
        secret_access_key: String::new(),
        bucket_name: String::new(),
        public_base_url: String::new(),
        ..StorageConfig::default()
    };
    let uploader = ArtifactUploader::from_config(&config);

    match uploader.upload(&artifact()).await {
        Err(StorageError::MissingConfig(missing)) => {
            assert!(missing.contains(&"bucket_name"));
            assert!(missing.contains(&"access_key_id"));
        }
        other => panic!("expected MissingConfig, got {:?}", other),
    }
}
