//! Notes panel: free-form scratch text plus a to-do list.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub id: Uuid,
    pub text: String,
    pub completed: bool,
}

/// To-do items in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TodoList {
    items: Vec<TodoItem>,
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trimmed item. Blank text is ignored.
    pub fn add(&mut self, text: &str) -> Option<&TodoItem> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.items.push(TodoItem {
            id: Uuid::new_v4(),
            text: text.to_string(),
            completed: false,
        });
        self.items.last()
    }

    /// Flip completion. Returns the new state, or `None` for an unknown id.
    pub fn toggle(&mut self, id: Uuid) -> Option<bool> {
        let item = self.items.iter_mut().find(|t| t.id == id)?;
        item.completed = !item.completed;
        Some(item.completed)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    /// Id of the item at a zero-based display position.
    pub fn id_at(&self, index: usize) -> Option<Uuid> {
        self.items.get(index).map(|t| t.id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.items.iter().filter(|t| !t.completed).count()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotesPanel {
    text: String,
    pub todos: TodoList,
}

impl NotesPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Append a line to the note text.
    pub fn append_line(&mut self, line: &str) {
        if !self.text.is_empty() && !self.text.ends_with('\n') {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }
}
