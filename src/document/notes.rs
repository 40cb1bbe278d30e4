use crate::models::*;

impl Project {
    pub fn find_note(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    pub fn add_note(&self, note: Note) -> Project {
        let mut next = self.clone();
        next.notes.push(note);
        next
    }

    pub fn update_note(&self, id: &str, input: &UpdateNoteInput) -> Project {
        let mut next = self.clone();
        if let Some(note) = next.notes.iter_mut().find(|n| n.id == id) {
            if let Some(title) = &input.title {
                note.title = title.clone();
            }
            if let Some(content) = &input.content {
                note.content = content.clone();
            }
        }
        next
    }

    pub fn delete_note(&self, id: &str) -> Project {
        Project {
            notes: self.notes.iter().filter(|n| n.id != id).cloned().collect(),
            ..self.clone()
        }
    }
}
