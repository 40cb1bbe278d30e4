use crate::models::*;

impl Project {
    pub fn find_task_list(&self, id: &str) -> Option<&TaskList> {
        self.task_lists.iter().find(|l| l.id == id)
    }

    pub fn add_task_list(&self, list: TaskList) -> Project {
        let mut next = self.clone();
        next.task_lists.push(list);
        next
    }

    pub fn rename_task_list(&self, id: &str, title: &str) -> Project {
        self.update_task_list(id, |list| list.title = title.to_string())
    }

    pub fn delete_task_list(&self, id: &str) -> Project {
        Project {
            task_lists: self.task_lists.iter().filter(|l| l.id != id).cloned().collect(),
            ..self.clone()
        }
    }

    pub fn add_task(&self, list_id: &str, task: Task) -> Project {
        self.update_task_list(list_id, |list| list.tasks.push(task))
    }

    pub fn edit_task(&self, list_id: &str, task_id: &str, text: &str) -> Project {
        self.update_task(list_id, task_id, |task| task.text = text.to_string())
    }

    pub fn toggle_task(&self, list_id: &str, task_id: &str) -> Project {
        self.update_task(list_id, task_id, |task| task.completed = !task.completed)
    }

    pub fn delete_task(&self, list_id: &str, task_id: &str) -> Project {
        self.update_task_list(list_id, |list| list.tasks.retain(|t| t.id != task_id))
    }

    fn update_task_list(&self, id: &str, apply: impl FnOnce(&mut TaskList)) -> Project {
        let mut next = self.clone();
        if let Some(list) = next.task_lists.iter_mut().find(|l| l.id == id) {
            apply(list);
        }
        next
    }

    fn update_task(&self, list_id: &str, task_id: &str, apply: impl FnOnce(&mut Task)) -> Project {
        self.update_task_list(list_id, |list| {
            if let Some(task) = list.tasks.iter_mut().find(|t| t.id == task_id) {
                apply(task);
            }
        })
    }
}
