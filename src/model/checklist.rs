//! Checklist model.
//!
//! A checklist is an ordered list of categories, each holding an ordered
//! list of review items. Category names are unique and keep their first
//! insertion position.

use serde::{Deserialize, Serialize};

/// A single review item.
///
/// The `id` and `created_at` fields exist for addressing items inside a
/// running session. They are not written to Markdown, so every decode
/// assigns fresh values. Two items are equal when their content is equal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Synthetic identifier (e.g., "item_3f2a9c01b7d4")
    pub id: String,

    /// Item text as it appears after the bullet
    pub content: String,

    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
}

impl Item {
    /// Create a new item with a fresh identifier.
    pub fn new(content: impl Into<String>) -> Self {
        let id = format!("item_{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);
        Self {
            id,
            content: content.into(),
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.content == other.content
    }
}

impl Eq for Item {}

/// A named group of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub items: Vec<Item>,
}

impl Category {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Whether an item with exactly this content exists.
    #[must_use]
    pub fn contains(&self, content: &str) -> bool {
        self.items.iter().any(|i| i.content == content)
    }

    /// Append an item unless the same content is already present.
    ///
    /// Returns `true` if the item was added.
    pub fn push_unique(&mut self, content: &str) -> bool {
        if self.contains(content) {
            return false;
        }
        self.items.push(Item::new(content));
        true
    }
}

/// Ordered category → items mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist {
    categories: Vec<Category>,
}

impl Checklist {
    /// Create an empty checklist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True when there are no categories at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of categories (including empty ones).
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Total number of items across all categories.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    /// Categories in document order.
    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by exact name.
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Get a category, appending an empty one if it does not exist yet.
    pub fn entry(&mut self, name: &str) -> &mut Category {
        let pos = match self.categories.iter().position(|c| c.name == name) {
            Some(pos) => pos,
            None => {
                self.categories.push(Category::new(name));
                self.categories.len() - 1
            }
        };
        &mut self.categories[pos]
    }

    /// Add an item to a category, creating the category if needed.
    ///
    /// Returns `false` when the category already holds the same content.
    pub fn add_item(&mut self, category: &str, content: &str) -> bool {
        self.entry(category).push_unique(content)
    }

    /// Remove the item at `index` from `category`.
    ///
    /// A category left without items is removed. Returns `None` if the
    /// category or index does not exist.
    pub fn remove_item(&mut self, category: &str, index: usize) -> Option<Item> {
        let pos = self.categories.iter().position(|c| c.name == category)?;
        let items = &mut self.categories[pos].items;
        if index >= items.len() {
            return None;
        }
        let removed = items.remove(index);
        if items.is_empty() {
            self.categories.remove(pos);
        }
        Some(removed)
    }

    /// Remove an item by its session identifier.
    pub fn remove_by_id(&mut self, id: &str) -> Option<Item> {
        let (cat, idx) = self.categories.iter().enumerate().find_map(|(ci, c)| {
            c.items
                .iter()
                .position(|i| i.id == id)
                .map(|ii| (ci, ii))
        })?;
        let name = self.categories[cat].name.clone();
        self.remove_item(&name, idx)
    }

    /// Drop every category that has no items.
    pub fn prune(&mut self) {
        self.categories.retain(|c| !c.items.is_empty());
    }

    /// Consuming variant of [`Checklist::prune`].
    #[must_use]
    pub fn pruned(mut self) -> Self {
        self.prune();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_has_id() {
        let item = Item::new("Check null handling");
        assert!(item.id.starts_with("item_"));
        assert_eq!(item.id.len(), "item_".len() + 12);
        assert!(item.created_at > 0);
    }

    #[test]
    fn test_item_equality_ignores_metadata() {
        let a = Item::new("x");
        let b = Item::new("x");
        assert_ne!(a.id, b.id);
        assert_eq!(a, b);
        assert_ne!(a, Item::new("y"));
    }

    #[test]
    fn test_add_item_preserves_order_and_dedupes() {
        let mut list = Checklist::new();
        assert!(list.add_item("Security", "Validate input"));
        assert!(list.add_item("Correctness", "Check null handling"));
        assert!(!list.add_item("Security", "Validate input"));
        assert!(list.add_item("Security", "Escape output"));

        let names: Vec<_> = list.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Security", "Correctness"]);
        assert_eq!(list.item_count(), 3);
        assert_eq!(list.category("Security").unwrap().items[1].content, "Escape output");
    }

    #[test]
    fn test_remove_last_item_drops_category() {
        let mut list = Checklist::new();
        list.add_item("A", "x");
        list.add_item("B", "y");

        let removed = list.remove_item("A", 0).unwrap();
        assert_eq!(removed.content, "x");
        assert!(list.category("A").is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_item_out_of_range() {
        let mut list = Checklist::new();
        list.add_item("A", "x");
        assert!(list.remove_item("A", 1).is_none());
        assert!(list.remove_item("missing", 0).is_none());
        assert_eq!(list.item_count(), 1);
    }

    #[test]
    fn test_remove_by_id() {
        let mut list = Checklist::new();
        list.add_item("A", "x");
        list.add_item("A", "y");
        let id = list.category("A").unwrap().items[1].id.clone();

        assert_eq!(list.remove_by_id(&id).unwrap().content, "y");
        assert!(list.remove_by_id(&id).is_none());
        assert_eq!(list.item_count(), 1);
    }

    #[test]
    fn test_prune_removes_empty_categories() {
        let mut list = Checklist::new();
        list.entry("Empty");
        list.add_item("Full", "x");
        assert_eq!(list.len(), 2);

        let list = list.pruned();
        assert_eq!(list.len(), 1);
        assert!(list.category("Empty").is_none());
    }
}
