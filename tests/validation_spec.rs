use serde_json::json;
use speculate2::speculate;
use tech_tracker::models::Status;
use tech_tracker::validation::validate;

speculate! {
    describe "validate" {
        it "rejects values that are neither objects nor arrays" {
            let report = validate(&json!("technologies"), "Roadmap");
            assert!(!report.valid);
            assert_eq!(report.errors, vec!["Import data must be a JSON object or array".to_string()]);
            assert!(report.technologies.is_empty());
        }

        it "fills defaults for optional fields" {
            let report = validate(&json!([{ "title": "Rust", "description": "" }]), "Roadmap");
            assert!(report.valid);

            let tech = &report.technologies[0];
            assert_eq!(tech.status, Status::NotStarted);
            assert!(tech.notes.is_empty());
            assert!(tech.deadline.is_none());
            assert!(tech.resources.is_empty());
            assert!(tech.category.is_none());
        }

        it "treats a null status as not-started" {
            let report = validate(&json!([{ "title": "A", "description": "", "status": null }]), "Roadmap");
            assert!(report.valid);
            assert_eq!(report.technologies[0].status, Status::NotStarted);
        }

        it "rejects a status that is not text" {
            let report = validate(&json!([{ "title": "A", "description": "", "status": 3 }]), "Roadmap");
            assert!(!report.valid);
            assert!(report.errors[0].contains("invalid status 3"));
        }

        it "requires description to be text" {
            let report = validate(&json!([{ "title": "A", "description": 5 }]), "Roadmap");
            assert_eq!(report.errors, vec![
                "Technology #1: description is required and must be text".to_string(),
            ]);
        }

        it "collects every problem of a record" {
            let report = validate(&json!([{ "title": 1, "status": "done" }]), "Roadmap");
            assert_eq!(report.errors.len(), 3);
            assert!(report.errors.iter().all(|e| e.starts_with("Technology #1:")));
        }

        it "keeps the passing subset of a failed document" {
            let report = validate(&json!([
                { "title": "Good", "description": "" },
                { "title": "", "description": "" }
            ]), "Roadmap");

            assert!(!report.valid);
            assert_eq!(report.technologies.len(), 1);
            assert_eq!(report.technologies[0].title, "Good");
        }

        it "parses deadlines and treats empty text as none" {
            let report = validate(&json!([
                { "title": "A", "description": "", "deadline": "2026-03-15" },
                { "title": "B", "description": "", "deadline": "" }
            ]), "Roadmap");

            assert!(report.valid);
            assert_eq!(report.technologies[0].deadline.map(|d| d.to_string()), Some("2026-03-15".to_string()));
            assert!(report.technologies[1].deadline.is_none());
        }

        it "drops non-text resources with a warning" {
            let report = validate(&json!([
                { "title": "A", "description": "", "resources": ["https://a.example", 4, null] }
            ]), "Roadmap");

            assert!(report.valid);
            assert_eq!(report.technologies[0].resources, vec!["https://a.example".to_string()]);
            assert_eq!(report.warnings, vec!["Technology #1: 2 non-text resource(s) dropped".to_string()]);
        }

        it "clears notes that are not text with a warning" {
            let report = validate(&json!([{ "title": "A", "description": "", "notes": ["x"] }]), "Roadmap");
            assert!(report.valid);
            assert!(report.technologies[0].notes.is_empty());
            assert_eq!(report.warnings.len(), 1);
        }

        it "keeps a trimmed category" {
            let report = validate(&json!([{ "title": "A", "description": "", "category": " backend " }]), "Roadmap");
            assert_eq!(report.technologies[0].category.as_deref(), Some("backend"));
        }

        it "uses the default roadmap name when the document has none" {
            let report = validate(&json!({ "roadmapName": "  ", "technologies": [] }), "Roadmap");
            assert!(report.valid);
            assert_eq!(report.metadata.roadmap_name, "Roadmap");
            assert_eq!(report.metadata.count, 0);
        }
    }
}
