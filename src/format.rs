//! Output formatting for checklists.

use crate::checklist::Checklist;
use crate::types::Priority;

/// Plain-text rendering for sharing a checklist outside the app.
pub fn share_text(checklist: &Checklist) -> String {
    let mut text = format!("[{}]\n\n", checklist.title);

    for item in checklist.sorted_items() {
        let mark = if item.completed { "✓" } else { "○" };
        text.push_str(&format!("{} {}", mark, item.name));
        if let Some(ref note) = item.note {
            text.push_str(&format!(" ({note})"));
        }
        text.push('\n');
    }

    text.push_str(&format!(
        "\nProgress: {}/{}",
        checklist.completed_count(),
        checklist.total_count()
    ));
    text
}

/// Format a single checklist as markdown with its items in display order.
pub fn format_checklist_markdown(checklist: &Checklist) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {}\n", checklist.title));
    md.push_str(&format!("- **id**: `{}`\n", checklist.id));
    md.push_str(&format!("- **category**: {}\n", checklist.category.as_str()));
    md.push_str(&format!(
        "- **source**: {}\n",
        checklist.input_source.as_str()
    ));
    md.push_str(&format!(
        "- **progress**: {}/{}\n",
        checklist.completed_count(),
        checklist.total_count()
    ));
    md.push('\n');

    for (index, item) in checklist.sorted_items().iter().enumerate() {
        let check = if item.completed { "x" } else { " " };
        let priority_marker = match item.priority {
            Priority::High => "!!! ",
            Priority::Medium => "",
            Priority::Low => "",
        };
        md.push_str(&format!(
            "{}. [{}] {}{}",
            index + 1,
            check,
            priority_marker,
            item.name
        ));
        if let Some(ref note) = item.note {
            md.push_str(&format!(" - _{note}_"));
        }
        md.push('\n');
    }

    md
}

/// Format a list of checklists as a compact markdown overview.
pub fn format_checklists_markdown(checklists: &[Checklist]) -> String {
    let mut md = format!("# Checklists ({})\n\n", checklists.len());

    for checklist in checklists {
        let done = if checklist.is_completed() { " ✓" } else { "" };
        md.push_str(&format!(
            "- {} `{}` [{}] {}/{}{}\n",
            checklist.title,
            &checklist.id[..8.min(checklist.id.len())],
            checklist.category.as_str(),
            checklist.completed_count(),
            checklist.total_count(),
            done,
        ));
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::ChecklistItem;
    use crate::types::{Category, InputSource};

    fn sample() -> Checklist {
        let mut checklist = Checklist::new("Groceries", Category::Shopping, InputSource::Text);
        checklist.add_item(ChecklistItem::new("milk", None, Priority::Medium));
        checklist.add_item(ChecklistItem::new(
            "eggs",
            Some("a dozen".into()),
            Priority::High,
        ));
        let id = checklist.items()[0].id.clone();
        checklist.toggle_item(&id);
        checklist
    }

    #[test]
    fn share_text_shape() {
        let text = share_text(&sample());
        assert_eq!(
            text,
            "[Groceries]\n\n✓ milk\n○ eggs (a dozen)\n\nProgress: 1/2"
        );
    }

    #[test]
    fn detail_markdown_marks_completion_and_priority() {
        let md = format_checklist_markdown(&sample());
        assert!(md.contains("## Groceries"));
        assert!(md.contains("1. [x] milk"));
        assert!(md.contains("2. [ ] !!! eggs - _a dozen_"));
        assert!(md.contains("- **progress**: 1/2"));
    }

    #[test]
    fn overview_markdown_truncates_ids() {
        let md = format_checklists_markdown(&[sample()]);
        assert!(md.starts_with("# Checklists (1)"));
        assert!(md.contains("Groceries"));
        assert!(md.contains("1/2"));
    }
}
