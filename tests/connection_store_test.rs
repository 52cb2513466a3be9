//! Persistence of the connection profile list.

use quick_content_cli::{ConnectionProfile, ConnectionStore, StoreError};
use std::fs;
use tempfile::TempDir;

fn profiles() -> Vec<ConnectionProfile> {
    vec![
        ConnectionProfile {
            display_name: "Production".to_string(),
            base_url: "https://www.example.com/".to_string(),
            client_id: "cli-prod".to_string(),
            client_secret: "p\"@$$\\w0rd/ü✓\n{}".to_string(),
        },
        ConnectionProfile {
            display_name: "Local".to_string(),
            base_url: "http://localhost:5000".to_string(),
            client_id: "cli".to_string(),
            client_secret: "secret".to_string(),
        },
        ConnectionProfile {
            display_name: "Production".to_string(),
            base_url: "https://other.example.com".to_string(),
            client_id: "dup".to_string(),
            client_secret: "dup".to_string(),
        },
    ]
}

#[test]
fn test_save_then_load_round_trips_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let store = ConnectionStore::new(temp_dir.path().join("connections.json"));

    let original = profiles();
    store.save(&original).unwrap();

    assert_eq!(store.load().unwrap(), original);
}

#[test]
fn test_load_missing_file_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    let store = ConnectionStore::new(temp_dir.path().join("nope").join("connections.json"));

    assert!(store.load().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn test_save_creates_missing_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir
        .path()
        .join("OptimizelyQuickContent")
        .join("nested")
        .join("connections.json");
    let store = ConnectionStore::new(&path);

    store.save(&profiles()).unwrap();

    assert!(path.is_file());
    assert_eq!(store.load().unwrap().len(), 3);
}

#[test]
fn test_save_overwrites_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = ConnectionStore::new(temp_dir.path().join("connections.json"));

    store.save(&profiles()).unwrap();
    let shorter = vec![profiles().remove(1)];
    store.save(&shorter).unwrap();

    assert_eq!(store.load().unwrap(), shorter);
}

#[test]
fn test_reads_pascal_case_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("connections.json");
    fs::write(
        &path,
        r#"[
  {
    "DisplayName": "Staging",
    "BaseUrl": "https://staging.example.com",
    "ClientId": "cli",
    "ClientSecret": "s"
  }
]"#,
    )
    .unwrap();

    let loaded = ConnectionStore::new(&path).load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].display_name, "Staging");
    assert_eq!(loaded[0].base_url, "https://staging.example.com");
    assert_eq!(loaded[0].client_id, "cli");
    assert_eq!(loaded[0].client_secret, "s");
}

#[test]
fn test_corrupted_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("connections.json");
    fs::write(&path, "[{\"DisplayName\": ").unwrap();

    let err = ConnectionStore::new(&path).load().unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got {:?}", err);
    // The file is left as it was.
    assert_eq!(fs::read_to_string(&path).unwrap(), "[{\"DisplayName\": ");
}
