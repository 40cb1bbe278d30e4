use axum::http::StatusCode;
use axum_test::TestServer;
use plotline::api::{create_router, AppState};
use plotline::backup::ImportSummary;
use plotline::editor::Editor;
use plotline::history::HistoryStatus;
use plotline::models::*;
use plotline::selection::SelectedItem;
use plotline::tools::ToolOutcome;
use serde_json::json;

fn setup() -> TestServer {
    let mut project = Project::new("Saltmarsh", "Mystery", "");
    project.outline = vec![
        OutlineNode::with_id("A", "Act I", "").with_children(vec![OutlineNode::with_id("B", "Chapter 1", "Fog")]),
    ];
    project.characters = vec![Character {
        id: "ada".to_string(),
        ..Character::new("Ada", "A detective")
    }];
    let app = create_router(AppState::new(Editor::new(project).into_shared()));
    TestServer::new(app).expect("Failed to create test server")
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_ok() {
        let server = setup();
        let response = server.get("/api/v1/health").await;
        response.assert_status_ok();
        response.assert_json(&json!({ "status": "ok" }));
    }
}

mod project {
    use super::*;

    #[tokio::test]
    async fn returns_the_open_project() {
        let server = setup();
        let project: Project = server.get("/api/v1/project").await.json();
        assert_eq!(project.title, "Saltmarsh");
        assert_eq!(project.outline[0].children[0].id, "B");
    }

    #[tokio::test]
    async fn updates_details() {
        let server = setup();
        let response = server
            .put("/api/v1/project")
            .json(&json!({ "genre": "Gothic" }))
            .await;

        response.assert_status_ok();
        let project: Project = response.json();
        assert_eq!(project.genre, "Gothic");
        assert_eq!(project.title, "Saltmarsh");
    }

    #[tokio::test]
    async fn renders_the_tree() {
        let server = setup();
        let text = server.get("/api/v1/project/tree?ids=true").await.text();
        assert!(text.contains("Act I [A]"));
        assert!(text.contains("Chapter 1 [B]"));
    }

    #[tokio::test]
    async fn compiles_a_manuscript() {
        let server = setup();
        let text = server.get("/api/v1/project/manuscript").await.text();
        assert!(text.starts_with("# Saltmarsh"));
        assert!(text.contains("### Chapter 1"));
        assert!(text.contains("### Ada"));
    }

    #[tokio::test]
    async fn export_then_merge_import_adds_nothing() {
        let server = setup();
        let backup = server.get("/api/v1/project/export").await.text();

        let response = server.post("/api/v1/project/import?mode=merge").text(backup).await;

        response.assert_status_ok();
        let summary: ImportSummary = response.json();
        assert_eq!(summary.sections, 0);
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn replace_import_can_be_undone() {
        let server = setup();
        let replacement = json!({ "id": "other", "title": "Fresh Start", "outline": [] });

        server
            .post("/api/v1/project/import")
            .text(replacement.to_string())
            .await
            .assert_status_ok();
        let project: Project = server.get("/api/v1/project").await.json();
        assert_eq!(project.title, "Fresh Start");
        assert!(project.outline.is_empty());

        server.post("/api/v1/history/undo").await.assert_status_ok();
        let project: Project = server.get("/api/v1/project").await.json();
        assert_eq!(project.title, "Saltmarsh");
    }

    #[tokio::test]
    async fn rejects_an_invalid_backup() {
        let server = setup();
        let response = server
            .post("/api/v1/project/import")
            .text(r#"{"id": "p", "outline": [{"title": "No id"}]}"#)
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn has_no_save_status_without_an_autosaver() {
        let server = setup();
        let response = server.get("/api/v1/project/save-status").await;
        response.assert_json(&json!(null));
    }
}

mod tools {
    use super::*;

    #[tokio::test]
    async fn lists_definitions() {
        let server = setup();
        let definitions: Vec<serde_json::Value> = server.get("/api/v1/tools").await.json();
        assert!(definitions.iter().any(|d| d["name"] == "moveOutlineSection"));
    }

    #[tokio::test]
    async fn runs_a_tool() {
        let server = setup();
        let response = server
            .post("/api/v1/tools/addOutlineSection")
            .json(&json!({ "title": "Act II" }))
            .await;

        response.assert_status_ok();
        let outcome: ToolOutcome = response.json();
        assert!(outcome.success);
        assert!(outcome.id.is_some());
    }

    #[tokio::test]
    async fn reports_a_rejected_move() {
        let server = setup();
        let outcome: ToolOutcome = server
            .post("/api/v1/tools/moveOutlineSection")
            .json(&json!({ "sectionId": "A", "targetParentId": "B" }))
            .await
            .json();

        assert!(!outcome.success);
        let history: HistoryStatus = server.get("/api/v1/history").await.json();
        assert!(!history.can_undo);
    }

    #[tokio::test]
    async fn unknown_tools_are_not_found() {
        let server = setup();
        server
            .post("/api/v1/tools/launchRocket")
            .json(&json!({}))
            .await
            .assert_status_not_found();
    }
}

mod history {
    use super::*;

    #[tokio::test]
    async fn undo_and_redo_round_trip() {
        let server = setup();
        server
            .post("/api/v1/tools/deleteOutlineSection")
            .json(&json!({ "sectionId": "A" }))
            .await;

        let undone: serde_json::Value = server.post("/api/v1/history/undo").await.json();
        assert_eq!(undone["changed"], true);
        assert_eq!(undone["history"]["canRedo"], true);
        let project: Project = server.get("/api/v1/project").await.json();
        assert_eq!(project.outline.len(), 1);

        let redone: serde_json::Value = server.post("/api/v1/history/redo").await.json();
        assert_eq!(redone["changed"], true);
        let project: Project = server.get("/api/v1/project").await.json();
        assert!(project.outline.is_empty());
    }

    #[tokio::test]
    async fn undo_with_no_history_changes_nothing() {
        let server = setup();
        let undone: serde_json::Value = server.post("/api/v1/history/undo").await.json();
        assert_eq!(undone["changed"], false);
    }
}

mod selection {
    use super::*;

    #[tokio::test]
    async fn selects_and_clears() {
        let server = setup();

        let response = server
            .put("/api/v1/selection")
            .json(&json!({ "kind": "section", "id": "B" }))
            .await;
        response.assert_status_ok();
        let selected: SelectedItem = response.json();
        assert_eq!(selected.title(), "Chapter 1");

        server.delete("/api/v1/selection").await.assert_status(StatusCode::NO_CONTENT);
        let current: Option<SelectedItem> = server.get("/api/v1/selection").await.json();
        assert!(current.is_none());
    }

    #[tokio::test]
    async fn unknown_items_are_not_found() {
        let server = setup();
        server
            .put("/api/v1/selection")
            .json(&json!({ "kind": "note", "id": "nope" }))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn follows_edits_and_clears_on_delete() {
        let server = setup();
        server
            .put("/api/v1/selection")
            .json(&json!({ "kind": "character", "id": "ada" }))
            .await;

        server
            .post("/api/v1/tools/updateCharacter")
            .json(&json!({ "characterId": "ada", "name": "Ada Grey" }))
            .await;
        let current: Option<SelectedItem> = server.get("/api/v1/selection").await.json();
        assert_eq!(current.unwrap().title(), "Ada Grey");

        server
            .post("/api/v1/tools/deleteCharacter")
            .json(&json!({ "characterId": "ada" }))
            .await;
        let current: Option<SelectedItem> = server.get("/api/v1/selection").await.json();
        assert!(current.is_none());
    }
}
