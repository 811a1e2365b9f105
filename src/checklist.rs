//! Checklist aggregate and its derived state.
//!
//! A [`Checklist`] exclusively owns an ordered collection of items and is the
//! only place item positions are mutated. After every mutation the `position`
//! values of all items form a dense zero-based ordering consistent with the
//! sorted view. Derived values (progress, completion) are recomputed on every
//! read, never cached.

use crate::db::now_ms;
use crate::types::{Category, Extraction, Generation, InputSource, Priority};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single entry in a checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub name: String,
    pub note: Option<String>,
    pub completed: bool,
    pub priority: Priority,
    /// Position within the owning checklist. Managed by the aggregate.
    pub position: i32,
}

impl ChecklistItem {
    /// Create a fresh, uncompleted item. The position is assigned when the
    /// item is added to a checklist.
    pub fn new(name: impl Into<String>, note: Option<String>, priority: Priority) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            note,
            completed: false,
            priority,
            position: 0,
        }
    }
}

/// The checklist aggregate root.
///
/// Items are private so every structural mutation goes through the methods
/// below; the store layer reconstructs aggregates via [`Checklist::restore`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checklist {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub input_source: InputSource,
    pub created_at: i64,
    pub updated_at: i64,
    items: Vec<ChecklistItem>,
}

impl Checklist {
    /// Create an empty checklist.
    pub fn new(title: impl Into<String>, category: Category, input_source: InputSource) -> Self {
        let now = now_ms();
        Self {
            id: Uuid::now_v7().to_string(),
            title: title.into(),
            category,
            input_source,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        }
    }

    /// Create a checklist pre-populated with items whose positions were
    /// already assigned by the producing collaborator.
    pub fn with_items(
        title: impl Into<String>,
        category: Category,
        items: Vec<ChecklistItem>,
        input_source: InputSource,
    ) -> Self {
        let mut checklist = Self::new(title, category, input_source);
        checklist.items = items;
        checklist
    }

    /// Build a checklist from an extraction result: one item per name in
    /// input order, all at medium priority, none completed.
    pub fn from_extraction(extraction: &Extraction, source: InputSource) -> Self {
        let items = extraction
            .items
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let mut item = ChecklistItem::new(name.clone(), None, Priority::Medium);
                item.position = index as i32;
                item
            })
            .collect();

        Self::with_items(
            extraction.suggested_title.clone(),
            extraction.category(),
            items,
            source,
        )
    }

    /// Build a checklist from a generation result, preserving each entry's
    /// note and priority. Tips are advisory display text and are not carried
    /// into the aggregate.
    pub fn from_generation(generation: &Generation) -> Self {
        let items = generation
            .items
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let mut item =
                    ChecklistItem::new(entry.name.clone(), entry.note.clone(), entry.priority());
                item.position = index as i32;
                item
            })
            .collect();

        Self::with_items(
            generation.title.clone(),
            generation.category(),
            items,
            InputSource::AiGenerated,
        )
    }

    /// Reconstruct an aggregate from stored rows. Store layer only.
    pub fn restore(
        id: String,
        title: String,
        category: Category,
        input_source: InputSource,
        created_at: i64,
        updated_at: i64,
        items: Vec<ChecklistItem>,
    ) -> Self {
        Self {
            id,
            title,
            category,
            input_source,
            created_at,
            updated_at,
            items,
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Items in display order, ascending by position. Recomputed on every
    /// call since positions change under reordering.
    pub fn sorted_items(&self) -> Vec<&ChecklistItem> {
        let mut sorted: Vec<&ChecklistItem> = self.items.iter().collect();
        sorted.sort_by_key(|item| item.position);
        sorted
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    /// Completion ratio in [0, 1]. Zero for an empty checklist.
    pub fn progress(&self) -> f64 {
        let total = self.total_count();
        if total > 0 {
            self.completed_count() as f64 / total as f64
        } else {
            0.0
        }
    }

    pub fn is_completed(&self) -> bool {
        let total = self.total_count();
        total > 0 && self.completed_count() == total
    }

    /// Append an item at the end of the list. Duplicate names are permitted.
    pub fn add_item(&mut self, mut item: ChecklistItem) {
        item.position = self.items.len() as i32;
        self.items.push(item);
        self.touch();
    }

    /// Remove an item by identifier and renumber the remainder to a dense
    /// zero-based ordering. Removing an unknown id is a silent no-op that
    /// leaves `updated_at` untouched.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != item_id);
        if self.items.len() == before {
            return false;
        }
        self.renumber();
        self.touch();
        true
    }

    /// Move the items at `sources` (positions in the current sorted view) as
    /// a block to immediately precede `destination`, then renumber all items
    /// 0..n-1 by final position.
    pub fn move_items(&mut self, sources: &[usize], destination: usize) {
        let mut sorted = std::mem::take(&mut self.items);
        sorted.sort_by_key(|item| item.position);

        let mut indices: Vec<usize> = sources
            .iter()
            .copied()
            .filter(|&index| index < sorted.len())
            .collect();
        indices.sort_unstable();
        indices.dedup();

        if indices.is_empty() {
            self.items = sorted;
            return;
        }

        let mut block = Vec::with_capacity(indices.len());
        for &index in indices.iter().rev() {
            block.push(sorted.remove(index));
        }
        block.reverse();

        // Removing elements ahead of the destination shifts it left.
        let shift = indices.iter().filter(|&&index| index < destination).count();
        let insert_at = destination.saturating_sub(shift).min(sorted.len());
        for (offset, item) in block.into_iter().enumerate() {
            sorted.insert(insert_at + offset, item);
        }

        for (position, item) in sorted.iter_mut().enumerate() {
            item.position = position as i32;
        }
        self.items = sorted;
        self.touch();
    }

    /// Toggle an item's completion flag. Returns the new state, or `None` if
    /// the id does not belong to this checklist.
    pub fn toggle_item(&mut self, item_id: &str) -> Option<bool> {
        let item = self.items.iter_mut().find(|item| item.id == item_id)?;
        item.completed = !item.completed;
        let state = item.completed;
        self.touch();
        Some(state)
    }

    /// Update an item's content fields. Returns false if the id is unknown.
    pub fn update_item(
        &mut self,
        item_id: &str,
        name: Option<String>,
        note: Option<Option<String>>,
        priority: Option<Priority>,
    ) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == item_id) else {
            return false;
        };
        if let Some(name) = name {
            item.name = name;
        }
        if let Some(note) = note {
            item.note = note;
        }
        if let Some(priority) = priority {
            item.priority = priority;
        }
        self.touch();
        true
    }

    /// Rename the checklist. An empty (or whitespace-only) title is rejected
    /// and the current title kept.
    pub fn set_title(&mut self, title: &str) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        self.title = title.to_string();
        self.touch();
        true
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.touch();
    }

    /// Reassign dense positions 0..n-1 following the current sorted view.
    fn renumber(&mut self) {
        let mut order: Vec<usize> = (0..self.items.len()).collect();
        order.sort_by_key(|&index| self.items[index].position);
        for (position, index) in order.into_iter().enumerate() {
            self.items[index].position = position as i32;
        }
    }

    fn touch(&mut self) {
        self.updated_at = now_ms();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeneratedItem;

    fn item(name: &str) -> ChecklistItem {
        ChecklistItem::new(name, None, Priority::Medium)
    }

    fn positions(checklist: &Checklist) -> Vec<i32> {
        checklist
            .sorted_items()
            .iter()
            .map(|item| item.position)
            .collect()
    }

    fn names(checklist: &Checklist) -> Vec<String> {
        checklist
            .sorted_items()
            .iter()
            .map(|item| item.name.clone())
            .collect()
    }

    #[test]
    fn add_item_assigns_dense_positions() {
        let mut checklist = Checklist::new("Groceries", Category::Shopping, InputSource::Text);
        for n in 0..5 {
            checklist.add_item(item(&format!("item {n}")));
            let expected: Vec<i32> = (0..=n as i32).collect();
            assert_eq!(positions(&checklist), expected);
        }
    }

    #[test]
    fn add_item_permits_duplicate_names() {
        let mut checklist = Checklist::new("Groceries", Category::Shopping, InputSource::Text);
        checklist.add_item(item("milk"));
        checklist.add_item(item("milk"));
        assert_eq!(checklist.total_count(), 2);
        assert_eq!(positions(&checklist), vec![0, 1]);
    }

    #[test]
    fn remove_item_renumbers_and_preserves_relative_order() {
        let mut checklist = Checklist::new("Groceries", Category::Shopping, InputSource::Text);
        checklist.add_item(item("milk"));
        checklist.add_item(item("eggs"));
        checklist.add_item(item("bread"));

        let eggs_id = checklist.sorted_items()[1].id.clone();
        assert!(checklist.remove_item(&eggs_id));

        assert_eq!(names(&checklist), vec!["milk", "bread"]);
        assert_eq!(positions(&checklist), vec![0, 1]);
    }

    #[test]
    fn remove_missing_item_is_silent_noop() {
        let mut checklist = Checklist::new("Groceries", Category::Shopping, InputSource::Text);
        checklist.add_item(item("milk"));
        let stamped = checklist.updated_at;

        assert!(!checklist.remove_item("no-such-id"));
        assert_eq!(checklist.total_count(), 1);
        assert_eq!(checklist.updated_at, stamped);
    }

    #[test]
    fn remove_last_item_leaves_empty_list() {
        let mut checklist = Checklist::new("Solo", Category::Other, InputSource::Text);
        checklist.add_item(item("only"));
        let id = checklist.items()[0].id.clone();

        assert!(checklist.remove_item(&id));
        assert_eq!(checklist.total_count(), 0);
        assert_eq!(checklist.progress(), 0.0);
        assert!(!checklist.is_completed());
    }

    #[test]
    fn move_item_to_front() {
        let mut checklist = Checklist::new("Trip", Category::Travel, InputSource::Text);
        for name in ["a", "b", "c", "d"] {
            checklist.add_item(item(name));
        }

        checklist.move_items(&[2], 0);
        assert_eq!(names(&checklist), vec!["c", "a", "b", "d"]);
        assert_eq!(positions(&checklist), vec![0, 1, 2, 3]);
    }

    #[test]
    fn move_item_toward_end_accounts_for_removal_shift() {
        let mut checklist = Checklist::new("Trip", Category::Travel, InputSource::Text);
        for name in ["a", "b", "c", "d"] {
            checklist.add_item(item(name));
        }

        checklist.move_items(&[0], 3);
        assert_eq!(names(&checklist), vec!["b", "c", "a", "d"]);

        checklist.move_items(&[0], 4);
        assert_eq!(names(&checklist), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn move_block_stays_contiguous() {
        let mut checklist = Checklist::new("Trip", Category::Travel, InputSource::Text);
        for name in ["a", "b", "c", "d", "e"] {
            checklist.add_item(item(name));
        }

        checklist.move_items(&[1, 2], 5);
        assert_eq!(names(&checklist), vec!["a", "d", "e", "b", "c"]);
        assert_eq!(positions(&checklist), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn move_to_own_position_is_identity_on_sequence() {
        let mut checklist = Checklist::new("Trip", Category::Travel, InputSource::Text);
        for name in ["a", "b", "c"] {
            checklist.add_item(item(name));
        }
        let ids_before: Vec<String> = checklist
            .sorted_items()
            .iter()
            .map(|item| item.id.clone())
            .collect();

        checklist.move_items(&[1], 1);
        let ids_after: Vec<String> = checklist
            .sorted_items()
            .iter()
            .map(|item| item.id.clone())
            .collect();

        assert_eq!(ids_before, ids_after);
        assert_eq!(positions(&checklist), vec![0, 1, 2]);
    }

    #[test]
    fn progress_stays_within_unit_interval() {
        let mut checklist = Checklist::new("Chores", Category::Task, InputSource::Text);
        assert_eq!(checklist.progress(), 0.0);

        checklist.add_item(item("sweep"));
        checklist.add_item(item("mop"));
        assert_eq!(checklist.progress(), 0.0);

        let id = checklist.sorted_items()[0].id.clone();
        checklist.toggle_item(&id);
        assert!((checklist.progress() - 0.5).abs() < f64::EPSILON);
        assert!(checklist.progress() >= 0.0 && checklist.progress() <= 1.0);
    }

    #[test]
    fn is_completed_flips_only_at_boundary() {
        let mut checklist = Checklist::new("Chores", Category::Task, InputSource::Text);
        checklist.add_item(item("sweep"));
        checklist.add_item(item("mop"));
        let ids: Vec<String> = checklist.items().iter().map(|i| i.id.clone()).collect();

        checklist.toggle_item(&ids[0]);
        assert!(!checklist.is_completed());

        checklist.toggle_item(&ids[1]);
        assert!(checklist.is_completed());

        checklist.toggle_item(&ids[0]);
        assert!(!checklist.is_completed());
    }

    #[test]
    fn empty_checklist_has_no_progress_and_is_not_completed() {
        let checklist = Checklist::new("Nothing", Category::Other, InputSource::Text);
        assert_eq!(checklist.total_count(), 0);
        assert_eq!(checklist.progress(), 0.0);
        assert!(!checklist.is_completed());
    }

    #[test]
    fn single_item_progress_is_zero_or_one() {
        let mut checklist = Checklist::new("Solo", Category::Other, InputSource::Text);
        checklist.add_item(item("only"));
        assert_eq!(checklist.progress(), 0.0);

        let id = checklist.items()[0].id.clone();
        checklist.toggle_item(&id);
        assert_eq!(checklist.progress(), 1.0);
        assert!(checklist.is_completed());
    }

    #[test]
    fn mutations_refresh_updated_at() {
        let mut checklist = Checklist::new("Chores", Category::Task, InputSource::Text);
        checklist.updated_at = 0;
        checklist.add_item(item("sweep"));
        assert!(checklist.updated_at > 0);

        checklist.updated_at = 0;
        let id = checklist.items()[0].id.clone();
        checklist.toggle_item(&id);
        assert!(checklist.updated_at > 0);

        checklist.updated_at = 0;
        assert!(checklist.set_title("Weekend chores"));
        assert!(checklist.updated_at > 0);

        checklist.updated_at = 0;
        checklist.set_category(Category::Procedure);
        assert!(checklist.updated_at > 0);
    }

    #[test]
    fn set_title_rejects_empty() {
        let mut checklist = Checklist::new("Chores", Category::Task, InputSource::Text);
        assert!(!checklist.set_title("   "));
        assert_eq!(checklist.title, "Chores");
    }

    #[test]
    fn update_item_edits_fields_in_place() {
        let mut checklist = Checklist::new("Chores", Category::Task, InputSource::Text);
        checklist.add_item(item("sweep"));
        let id = checklist.items()[0].id.clone();

        assert!(checklist.update_item(
            &id,
            Some("sweep the porch".into()),
            Some(Some("use the stiff broom".into())),
            Some(Priority::High),
        ));

        let updated = &checklist.items()[0];
        assert_eq!(updated.name, "sweep the porch");
        assert_eq!(updated.note.as_deref(), Some("use the stiff broom"));
        assert_eq!(updated.priority, Priority::High);

        assert!(!checklist.update_item("no-such-id", None, None, None));
    }

    #[test]
    fn extraction_builds_medium_priority_items_in_order() {
        let extraction = Extraction {
            items: vec!["milk".into(), "eggs".into()],
            suggested_title: "Shopping".into(),
            category: "shopping".into(),
        };

        let checklist = Checklist::from_extraction(&extraction, InputSource::Text);
        assert_eq!(checklist.title, "Shopping");
        assert_eq!(checklist.category, Category::Shopping);
        assert_eq!(checklist.input_source, InputSource::Text);
        assert_eq!(checklist.total_count(), 2);
        assert_eq!(names(&checklist), vec!["milk", "eggs"]);
        assert_eq!(positions(&checklist), vec![0, 1]);
        for entry in checklist.items() {
            assert_eq!(entry.priority, Priority::Medium);
            assert!(!entry.completed);
            assert!(entry.note.is_none());
        }
    }

    #[test]
    fn extraction_tags_originating_modality() {
        let extraction = Extraction {
            items: vec!["passport".into()],
            suggested_title: "Travel prep".into(),
            category: "travel".into(),
        };

        let checklist = Checklist::from_extraction(&extraction, InputSource::Photo);
        assert_eq!(checklist.input_source, InputSource::Photo);
    }

    #[test]
    fn generation_preserves_priorities_and_notes_in_order() {
        let generation = Generation {
            items: vec![
                GeneratedItem {
                    name: "book flights".into(),
                    note: Some("aim for a morning departure".into()),
                    priority: "high".into(),
                },
                GeneratedItem {
                    name: "pack snacks".into(),
                    note: None,
                    priority: "low".into(),
                },
                GeneratedItem {
                    name: "charge camera".into(),
                    note: None,
                    priority: "medium".into(),
                },
            ],
            title: "Trip prep".into(),
            tips: Some("start a week ahead".into()),
            category: "travel".into(),
        };

        let checklist = Checklist::from_generation(&generation);
        assert_eq!(checklist.input_source, InputSource::AiGenerated);
        assert_eq!(checklist.category, Category::Travel);
        assert_eq!(checklist.total_count(), 3);

        let sorted = checklist.sorted_items();
        assert_eq!(sorted[0].priority, Priority::High);
        assert_eq!(sorted[1].priority, Priority::Low);
        assert_eq!(sorted[2].priority, Priority::Medium);
        assert_eq!(
            sorted[0].note.as_deref(),
            Some("aim for a morning departure")
        );
        assert_eq!(positions(&checklist), vec![0, 1, 2]);
    }

    #[test]
    fn generation_with_unknown_category_falls_back_to_other() {
        let generation = Generation {
            items: vec![GeneratedItem {
                name: "something".into(),
                note: None,
                priority: "whenever".into(),
            }],
            title: "Misc".into(),
            tips: None,
            category: "miscellaneous".into(),
        };

        let checklist = Checklist::from_generation(&generation);
        assert_eq!(checklist.category, Category::Other);
        assert_eq!(checklist.items()[0].priority, Priority::Medium);
    }
}
