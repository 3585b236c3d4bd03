use std::path::PathBuf;

use tech_tracker::config::TrackerConfig;
use tech_tracker::db::Storage;
use tech_tracker::error::ImportError;
use tech_tracker::models::*;
use tech_tracker::store::{NotificationKind, TechnologyStore};
use tempfile::TempDir;

fn setup_with(config: TrackerConfig) -> TechnologyStore {
    let storage = Storage::open_memory().expect("Failed to create storage");
    storage.migrate().expect("Failed to migrate");
    TechnologyStore::load(storage, config)
}

fn setup() -> TechnologyStore {
    setup_with(TrackerConfig::default())
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write fixture");
    path
}

mod file_checks {
    use super::*;

    #[tokio::test]
    async fn rejects_files_without_json_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "roadmap.txt", "[]");
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store.import_from_json(&path).await.unwrap_err();

        assert!(matches!(err, ImportError::UnsupportedFileType(ref name) if name == "roadmap.txt"));
        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn accepts_upper_case_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "ROADMAP.JSON", r#"[{"title":"A","description":"B"}]"#);
        let mut store = setup();

        let outcome = store.import_from_json(&path).await.expect("import should succeed");
        assert_eq!(outcome.technologies.len(), 1);
    }

    #[tokio::test]
    async fn rejects_files_over_the_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "big.json", r#"[{"title":"A","description":"B"}]"#);
        let mut store = setup_with(TrackerConfig {
            max_import_bytes: 16,
            ..TrackerConfig::default()
        });

        let err = store.import_from_json(&path).await.unwrap_err();

        assert!(matches!(err, ImportError::FileTooLarge { limit: 16, .. }));
    }

    #[tokio::test]
    async fn reports_missing_files_as_io_errors() {
        let dir = TempDir::new().unwrap();
        let mut store = setup();

        let err = store
            .import_from_json(dir.path().join("absent.json"))
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Io(_)));
    }

    #[tokio::test]
    async fn rejects_malformed_json_with_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.json", "{ \"technologies\": [");
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store.import_from_json(&path).await.unwrap_err();

        assert!(matches!(err, ImportError::Parse(_)));
        assert!(err.to_string().starts_with("File is not valid JSON"));
        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn rejects_content_that_is_not_utf8_with_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("binary.json");
        std::fs::write(&path, [b'[', 0xff, b']']).expect("Failed to write fixture");
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store.import_from_json(&path).await.unwrap_err();

        assert!(matches!(err, ImportError::Parse(_)));
        assert!(err.to_string().starts_with("File is not valid JSON"));
        assert_eq!(store.technologies(), before.as_slice());
    }
}

mod validation_failures {
    use super::*;

    #[tokio::test]
    async fn rejects_an_empty_title_and_keeps_the_collection() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "empty-title.json",
            r#"{"technologies":[{"title":"","description":"x"}]}"#,
        );
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store.import_from_json(&path).await.unwrap_err();

        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Technology #1"));
        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn rejects_an_unknown_status_naming_the_allowed_values() {
        let mut store = setup();

        let err = store
            .import_from_str(r#"{"technologies":[{"title":"X","description":"Y","status":"bogus"}]}"#)
            .unwrap_err();

        let message = &err.validation_errors()[0];
        assert!(message.contains("bogus"));
        assert!(message.contains("not-started"));
        assert!(message.contains("in-progress"));
        assert!(message.contains("completed"));
    }

    #[tokio::test]
    async fn rejects_the_whole_document_when_any_record_fails() {
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store
            .import_from_str(
                r#"[
                    {"title":"Good","description":"fine"},
                    {"title":"   ","description":"blank title"},
                    {"title":"Late","description":"bad date","deadline":"31/12/2026"}
                ]"#,
            )
            .unwrap_err();

        let errors = err.validation_errors();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("Technology #2:"));
        assert!(errors[1].starts_with("Technology #3:"));
        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn rejects_documents_without_records() {
        let mut store = setup();

        let err = store.import_from_str(r#"{"name":"nothing here"}"#).unwrap_err();

        assert_eq!(err.validation_errors().len(), 1);
        assert!(err.validation_errors()[0].contains("No technologies"));
    }

    #[tokio::test]
    async fn rejects_ids_beyond_the_largest_supported_id() {
        let mut store = setup();
        let before = store.technologies().to_vec();

        let err = store
            .import_from_str(
                r#"[{"id":18446744073709551615,"title":"A","description":"B"},
                    {"title":"C","description":"D"}]"#,
            )
            .unwrap_err();

        let errors = err.validation_errors();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Technology #1: id 18446744073709551615 is out of range"));
        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn raises_an_error_notification() {
        let mut store = setup();

        let err = store.import_from_str("[1, 2]").unwrap_err();

        let notice = store.notification().expect("notification should be raised");
        assert_eq!(notice.kind, NotificationKind::Error);
        assert_eq!(notice.message, err.to_string());
    }
}

mod successful_imports {
    use super::*;

    #[tokio::test]
    async fn normalizes_a_minimal_record() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "minimal.json", r#"[{"title":"A","description":"B"}]"#);
        let mut store = setup();

        let outcome = store.import_from_json(&path).await.expect("import should succeed");

        assert_eq!(outcome.technologies.len(), 1);
        let tech = &store.technologies()[0];
        assert_eq!(tech.title, "A");
        assert_eq!(tech.description, "B");
        assert_eq!(tech.status, Status::NotStarted);
        assert!(tech.notes.is_empty());
        assert!(tech.deadline.is_none());
        assert!(tech.resources.is_empty());
        assert_eq!(tech.id, 1);
        assert_eq!(outcome.metadata.count, 1);
        assert_eq!(outcome.metadata.roadmap_name, "Learning Roadmap");
    }

    #[tokio::test]
    async fn accepts_a_single_record() {
        let mut store = setup();

        let outcome = store
            .import_from_str(r#"{"title":"  Solo  ","description":"","status":"in-progress"}"#)
            .expect("import should succeed");

        assert_eq!(outcome.technologies.len(), 1);
        assert_eq!(store.technologies()[0].title, "Solo");
        assert_eq!(store.technologies()[0].status, Status::InProgress);
    }

    #[tokio::test]
    async fn keeps_metadata_from_a_wrapped_document() {
        let mut store = setup();

        let outcome = store
            .import_from_str(
                r#"{"roadmapName":"Systems","exportedAt":"2026-10-01T10:00:00+00:00",
                    "technologies":[{"id":9,"title":"Rust","description":"lang","resources":"nope"}]}"#,
            )
            .expect("import should succeed");

        assert_eq!(outcome.metadata.roadmap_name, "Systems");
        assert_eq!(outcome.metadata.exported_at, "2026-10-01T10:00:00+00:00");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(store.get(9).map(|t| t.resources.len()), Some(0));
    }

    #[tokio::test]
    async fn continues_ids_after_the_imported_collection() {
        let mut store = setup();
        store
            .import_from_str(r#"[{"id":40,"title":"A","description":""}]"#)
            .expect("import should succeed");

        let created = store.add_technology(CreateTechnologyInput {
            title: "B".to_string(),
            ..CreateTechnologyInput::default()
        }).expect("id should be available");

        assert_eq!(created.id, 41);
    }

    #[tokio::test]
    async fn stops_adding_once_ids_are_exhausted() {
        let mut store = setup();
        store
            .import_from_str(&format!(
                r#"[{{"id":{},"title":"Last","description":""}}]"#,
                tech_tracker::ids::MAX_ID
            ))
            .expect("import should succeed");

        let created = store.add_technology(CreateTechnologyInput {
            title: "One more".to_string(),
            ..CreateTechnologyInput::default()
        });

        assert!(created.is_none());
        assert_eq!(store.technologies().len(), 1);
    }

    #[tokio::test]
    async fn raises_a_success_notification_that_expires() {
        let mut store = setup_with(TrackerConfig {
            success_notice_secs: 0,
            ..TrackerConfig::default()
        });

        store
            .import_from_str(r#"[{"title":"A","description":"B"}]"#)
            .expect("import should succeed");

        assert!(store.notification().is_none());
    }

    #[tokio::test]
    async fn notification_can_be_dismissed() {
        let mut store = setup();
        store
            .import_from_str(r#"[{"title":"A","description":"B"}]"#)
            .expect("import should succeed");

        let notice = store.notification().expect("notification should be raised");
        assert_eq!(notice.kind, NotificationKind::Success);
        assert!(notice.message.contains("Imported 1 technologies"));

        store.dismiss_notification();
        assert!(store.notification().is_none());
    }
}

mod round_trip {
    use super::*;

    #[tokio::test]
    async fn export_then_import_restores_the_collection() {
        let dir = TempDir::new().unwrap();
        let mut store = setup();
        store.update_status(2, Status::InProgress);
        store.update_notes(2, "Halfway there");
        store.add_resource(2, "https://react.dev/learn");
        store.update_deadline(
            3,
            Some(chrono::NaiveDate::from_ymd_opt(2026, 12, 1).unwrap()),
        );
        let before = store.technologies().to_vec();

        let path = store.export_to_file(dir.path()).await.expect("export should succeed");
        store.reset_all_data();
        store.update_all_status(Status::Completed);

        store.import_from_json(&path).await.expect("import should succeed");

        assert_eq!(store.technologies(), before.as_slice());
    }

    #[tokio::test]
    async fn export_document_carries_statistics_and_progress() {
        let store = setup();

        let document = store.export_to_json();
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["version"], "1.0");
        assert_eq!(json["roadmapName"], "Learning Roadmap");
        assert_eq!(json["statistics"]["total"], 6);
        assert_eq!(json["statistics"]["completed"], 1);
        assert_eq!(json["statistics"]["notStarted"], 5);
        assert_eq!(json["progress"], 17);
        assert_eq!(json["technologies"][0]["status"], "not-started");
        assert_eq!(json["technologies"][0]["deadline"], "");
    }
}
