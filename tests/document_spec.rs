use plotline::editor::Editor;
use plotline::models::*;
use speculate2::speculate;

fn novel() -> Project {
    let mut project = Project::new("Saltmarsh", "Mystery", "A drowned village");

    let mut ch1 = OutlineNode::with_id("ch1", "Chapter 1", "Fog rolls in.");
    ch1.character_ids = Some(vec!["ada".to_string(), "bo".to_string()]);
    let mut scene = OutlineNode::with_id("scene", "The Pier", "");
    scene.character_ids = Some(vec!["ada".to_string()]);

    project.outline = vec![
        OutlineNode::with_id("act1", "Act I", "")
            .with_children(vec![ch1.with_children(vec![scene])]),
        OutlineNode::with_id("act2", "Act II", ""),
    ];
    project.characters = vec![
        Character {
            id: "ada".to_string(),
            ..Character::new("Ada", "A detective")
        },
        Character {
            id: "bo".to_string(),
            ..Character::new("Bo", "The ferryman")
        },
    ];
    project
}

speculate! {
    before {
        let project = novel();
    }

    describe "sections" {
        it "adds a nested section without touching the original" {
            let next = project.add_section(Some("act2"), OutlineNode::with_id("ch9", "Chapter 9", ""));

            assert_eq!(next.find_section("act2").unwrap().children[0].id, "ch9");
            assert!(project.find_section("ch9").is_none());
        }

        it "updates only the fields given" {
            let next = project.update_section("ch1", &OutlineUpdate {
                title: Some("Chapter One".to_string()),
                ..Default::default()
            });

            let ch1 = next.find_section("ch1").unwrap();
            assert_eq!(ch1.title, "Chapter One");
            assert_eq!(ch1.content, "Fog rolls in.");
        }

        it "treats an unknown id as a no-op" {
            assert_eq!(project.delete_section("nope"), project);
            assert_eq!(project.move_section("nope", &MoveTarget::Root), project);
            assert_eq!(project.toggle_section_export("nope"), project);
        }

        it "deletes a section with its subtree" {
            let next = project.delete_section("ch1");

            assert!(next.find_section("ch1").is_none());
            assert!(next.find_section("scene").is_none());
            assert!(next.find_section("act1").unwrap().children.is_empty());
        }

        it "refuses to move a section under its own descendant" {
            let next = project.move_section("act1", &MoveTarget::Parent("scene".to_string()));
            assert_eq!(next, project);
        }

        it "moves a section beside a sibling" {
            let next = project.move_section("act2", &MoveTarget::Before("act1".to_string()));
            let order: Vec<&str> = next.outline.iter().map(|n| n.id.as_str()).collect();
            assert_eq!(order, vec!["act2", "act1"]);
        }

        it "returns to the default export state after two toggles" {
            let once = project.toggle_section_export("scene");
            assert_eq!(once.find_section("scene").unwrap().include_in_export, Some(false));

            let twice = once.toggle_section_export("scene");
            assert!(twice.find_section("scene").unwrap().is_included());
        }

        it "links and unlinks a character" {
            let linked = project.toggle_section_character("act2", "bo");
            assert!(linked.find_section("act2").unwrap().has_character("bo"));

            let unlinked = linked.toggle_section_character("act2", "bo");
            assert!(!unlinked.find_section("act2").unwrap().has_character("bo"));
        }
    }

    describe "characters" {
        it "cascades a delete into every section at every depth" {
            let next = project.delete_character("ada");

            assert!(next.find_character("ada").is_none());
            assert!(!next.find_section("ch1").unwrap().has_character("ada"));
            assert!(next.find_section("ch1").unwrap().has_character("bo"));
            assert!(!next.find_section("scene").unwrap().has_character("ada"));
        }

        it "leaves the project alone when deleting an unknown character" {
            assert_eq!(project.delete_character("ghost"), project);
        }

        it "applies a partial update" {
            let update = CharacterUpdate::default()
                .set(CharacterField::Motivation, "Find her brother")
                .set(CharacterField::Arc, "Learns to trust");
            let next = project.update_character("ada", &update);

            let ada = next.find_character("ada").unwrap();
            assert_eq!(ada.motivation.as_deref(), Some("Find her brother"));
            assert_eq!(ada.arc.as_deref(), Some("Learns to trust"));
            assert_eq!(ada.description, "A detective");
        }

        it "toggles one field out of exports" {
            let next = project.toggle_character_export("ada", "backstory");
            let ada = next.find_character("ada").unwrap();

            assert!(!ada.exports("backstory"));
            assert!(ada.exports("motivation"));
        }
    }

    describe "notes and task lists" {
        it "edits notes" {
            let note = Note::new("Tides", "");
            let id = note.id.clone();
            let next = project
                .add_note(note)
                .update_note(&id, &UpdateNoteInput { title: None, content: Some("High at dawn".to_string()) });

            assert_eq!(next.find_note(&id).unwrap().title, "Tides");
            assert_eq!(next.find_note(&id).unwrap().content, "High at dawn");
            assert!(next.delete_note(&id).notes.is_empty());
        }

        it "tracks task completion" {
            let mut list = TaskList::new("Research");
            let task = Task::new("Visit the marsh");
            let task_id = task.id.clone();
            list.tasks.push(task);
            let list_id = list.id.clone();

            let next = project.add_task_list(list).toggle_task(&list_id, &task_id);
            assert_eq!(next.find_task_list(&list_id).unwrap().remaining(), 0);

            let back = next.toggle_task(&list_id, &task_id);
            assert_eq!(back.find_task_list(&list_id).unwrap().remaining(), 1);
        }

        it "updates project details" {
            let next = project.update_details(&UpdateProjectInput {
                genre: Some("Gothic".to_string()),
                ..Default::default()
            });

            assert_eq!(next.genre, "Gothic");
            assert_eq!(next.title, "Saltmarsh");
        }
    }

    describe "editor" {
        it "undoes and redoes a commit exactly" {
            let mut editor = Editor::new(project.clone());
            let before = editor.snapshot();

            editor.commit("delete", |p| p.delete_section("act2"));
            let after = editor.snapshot();

            assert!(editor.undo());
            assert_eq!(editor.snapshot(), before);
            assert!(editor.redo());
            assert_eq!(editor.snapshot(), after);
        }

        it "drops the redo branch on a new edit" {
            let mut editor = Editor::new(project.clone());
            editor.commit("delete", |p| p.delete_section("act2"));
            editor.undo();

            editor.commit("rename", |p| p.update_details(&UpdateProjectInput {
                title: Some("Marsh".to_string()),
                ..Default::default()
            }));

            assert!(!editor.history_status().can_redo);
            assert!(!editor.redo());
        }

        it "refreshes the selection after an edit" {
            let mut editor = Editor::new(project.clone());
            assert!(editor.select(&ItemRef::new(ItemKind::Section, "ch1")));

            editor.commit("rename", |p| p.update_section("ch1", &OutlineUpdate {
                title: Some("Renamed".to_string()),
                ..Default::default()
            }));

            assert_eq!(editor.selection().unwrap().title(), "Renamed");
        }

        it "clears the selection when the item is undone away" {
            let mut editor = Editor::new(project.clone());
            let note = Note::new("Tides", "");
            let id = note.id.clone();
            editor.commit("add note", |p| p.add_note(note));
            editor.select(&ItemRef::new(ItemKind::Note, id));

            editor.undo();

            assert!(editor.selection().is_none());
        }

        it "keeps the selection when an unrelated item changes" {
            let mut editor = Editor::new(project.clone());
            editor.select(&ItemRef::new(ItemKind::Character, "bo"));

            editor.commit("delete", |p| p.delete_character("ada"));

            assert_eq!(editor.selection().unwrap().title(), "Bo");
        }

        it "publishes each committed snapshot" {
            let mut editor = Editor::new(project.clone());
            let mut snapshots = editor.subscribe();

            editor.commit("delete", |p| p.delete_section("act2"));

            assert!(snapshots.has_changed().unwrap());
            assert!(snapshots.borrow_and_update().find_section("act2").is_none());
        }

        it "does not publish a no-op commit" {
            let mut editor = Editor::new(project.clone());
            let snapshots = editor.subscribe();

            assert!(!editor.commit("delete", |p| p.delete_section("nope")));

            assert!(!snapshots.has_changed().unwrap());
            assert!(!editor.history_status().can_undo);
        }
    }
}
