use plotline::db::{Database, MemoryStore, ProjectStore};
use plotline::models::*;
use speculate2::speculate;

fn sample(title: &str) -> Project {
    let mut project = Project::new(title, "Mystery", "");
    project.outline.push(
        OutlineNode::with_id("act1", "Act I", "")
            .with_children(vec![OutlineNode::with_id("ch1", "Chapter 1", "Fog")]),
    );
    project.characters.push(Character::new("Ada", "A detective"));
    project
}

speculate! {
    before {
        let db = Database::open_memory().expect("Failed to create in-memory database");
        db.migrate().expect("Failed to run migrations");
    }

    describe "sqlite store" {
        it "returns None for an unknown project" {
            assert!(db.load("missing").expect("Query failed").is_none());
        }

        it "stores and loads the whole document" {
            let project = sample("Saltmarsh");
            db.save(&project).expect("Failed to save");

            let loaded = db.load(&project.id).expect("Query failed").expect("Project missing");
            assert_eq!(loaded, project);
        }

        it "overwrites on a second save" {
            let mut project = sample("Saltmarsh");
            db.save(&project).expect("Failed to save");

            project.title = "Marsh".to_string();
            project.outline.clear();
            db.save(&project).expect("Failed to save");

            let loaded = db.load(&project.id).expect("Query failed").unwrap();
            assert_eq!(loaded.title, "Marsh");
            assert!(loaded.outline.is_empty());
            assert_eq!(db.list().expect("Query failed").len(), 1);
        }

        it "lists the most recently saved project first" {
            let older = sample("Older");
            let newer = sample("Newer");
            db.save(&older).expect("Failed to save");
            std::thread::sleep(std::time::Duration::from_millis(5));
            db.save(&newer).expect("Failed to save");

            let titles: Vec<String> = db.list().expect("Query failed").into_iter().map(|s| s.title).collect();
            assert_eq!(titles, vec!["Newer", "Older"]);
        }

        it "deletes a project" {
            let project = sample("Saltmarsh");
            db.save(&project).expect("Failed to save");

            assert!(db.delete(&project.id).expect("Delete failed"));
            assert!(!db.delete(&project.id).expect("Delete failed"));
            assert!(db.load(&project.id).expect("Query failed").is_none());
        }
    }

    describe "on disk" {
        it "survives reopening" {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let path = dir.path().join("nested").join("plotline.db");
            let project = sample("Saltmarsh");

            {
                let db = Database::open(path.clone()).expect("Failed to open");
                db.migrate().expect("Failed to migrate");
                db.save(&project).expect("Failed to save");
            }

            let db = Database::open(path).expect("Failed to reopen");
            db.migrate().expect("Migrations should be idempotent");
            assert_eq!(db.load(&project.id).expect("Query failed"), Some(project));
        }
    }

    describe "memory store" {
        it "behaves like the sqlite store" {
            let store = MemoryStore::new();
            let project = sample("Saltmarsh");

            store.save(&project).expect("Failed to save");
            assert_eq!(store.load(&project.id).unwrap(), Some(project.clone()));
            assert_eq!(store.list().unwrap()[0].title, "Saltmarsh");
            assert!(store.delete(&project.id).unwrap());
            assert!(store.list().unwrap().is_empty());
        }
    }
}
