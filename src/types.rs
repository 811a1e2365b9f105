//! Core types for the ticklist checklist engine.

use serde::{Deserialize, Serialize};

/// Item priority. High sorts before medium, medium before low.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse a priority string. Unrecognized values fall back to medium.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }

    /// Fixed precedence for priority-ordered views: high < medium < low.
    pub fn sort_precedence(&self) -> i32 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Checklist category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Shopping,
    Task,
    Procedure,
    Travel,
    Cooking,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shopping => "shopping",
            Category::Task => "task",
            Category::Procedure => "procedure",
            Category::Travel => "travel",
            Category::Cooking => "cooking",
            Category::Other => "other",
        }
    }

    /// Parse a category string. Unrecognized values fall back to other.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "shopping" => Category::Shopping,
            "task" => Category::Task,
            "procedure" => Category::Procedure,
            "travel" => Category::Travel,
            "cooking" => Category::Cooking,
            _ => Category::Other,
        }
    }

    pub const ALL: [Category; 6] = [
        Category::Shopping,
        Category::Task,
        Category::Procedure,
        Category::Travel,
        Category::Cooking,
        Category::Other,
    ];
}

/// How a checklist entered the system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Photo,
    Voice,
    #[default]
    Text,
    AiGenerated,
}

impl InputSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputSource::Photo => "photo",
            InputSource::Voice => "voice",
            InputSource::Text => "text",
            InputSource::AiGenerated => "ai_generated",
        }
    }

    /// Parse an input-source string. Unrecognized values fall back to text.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "photo" => InputSource::Photo,
            "voice" => InputSource::Voice,
            "ai_generated" | "ai-generated" => InputSource::AiGenerated,
            _ => InputSource::Text,
        }
    }
}

/// Structured result of extracting checklist items from free-form text.
///
/// `category` is kept as the raw model string; use [`Extraction::category`]
/// to resolve it, unknown values falling back to `other`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub items: Vec<String>,
    pub suggested_title: String,
    #[serde(default)]
    pub category: String,
}

impl Extraction {
    pub fn category(&self) -> Category {
        Category::parse(&self.category)
    }
}

/// Structured result of generating a checklist from a condition prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub items: Vec<GeneratedItem>,
    pub title: String,
    /// Advisory text for display only, never persisted into the aggregate.
    #[serde(default)]
    pub tips: Option<String>,
    #[serde(default)]
    pub category: String,
}

impl Generation {
    pub fn category(&self) -> Category {
        Category::parse(&self.category)
    }
}

/// A single generated checklist entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedItem {
    pub name: String,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub priority: String,
}

impl GeneratedItem {
    pub fn priority(&self) -> Priority {
        Priority::parse(&self.priority)
    }
}

/// Compact per-checklist progress snapshot for display surfaces.
///
/// Computed in SQL from the persisted store so a separate reader (the widget
/// server) never needs the full aggregate in memory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChecklistSummary {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub completed_count: i64,
    pub total_count: i64,
}

impl ChecklistSummary {
    pub fn progress(&self) -> f64 {
        if self.total_count > 0 {
            self.completed_count as f64 / self.total_count as f64
        } else {
            0.0
        }
    }

    pub fn is_completed(&self) -> bool {
        self.total_count > 0 && self.completed_count == self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_parse_falls_back_to_medium() {
        assert_eq!(Priority::parse("high"), Priority::High);
        assert_eq!(Priority::parse("LOW"), Priority::Low);
        assert_eq!(Priority::parse("urgent"), Priority::Medium);
        assert_eq!(Priority::parse(""), Priority::Medium);
    }

    #[test]
    fn priority_precedence_orders_high_first() {
        assert!(Priority::High.sort_precedence() < Priority::Medium.sort_precedence());
        assert!(Priority::Medium.sort_precedence() < Priority::Low.sort_precedence());
    }

    #[test]
    fn category_parse_falls_back_to_other() {
        assert_eq!(Category::parse("shopping"), Category::Shopping);
        assert_eq!(Category::parse("Travel"), Category::Travel);
        assert_eq!(Category::parse("groceries"), Category::Other);
    }

    #[test]
    fn input_source_parse_falls_back_to_text() {
        assert_eq!(InputSource::parse("photo"), InputSource::Photo);
        assert_eq!(InputSource::parse("ai-generated"), InputSource::AiGenerated);
        assert_eq!(InputSource::parse("telepathy"), InputSource::Text);
    }

    #[test]
    fn summary_progress_guards_empty() {
        let summary = ChecklistSummary {
            id: "x".into(),
            title: "Empty".into(),
            category: Category::Other,
            completed_count: 0,
            total_count: 0,
        };
        assert_eq!(summary.progress(), 0.0);
        assert!(!summary.is_completed());
    }
}
