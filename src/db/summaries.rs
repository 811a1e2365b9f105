//! Progress summary queries for display surfaces.
//!
//! Summaries are computed in SQL on every call so a reader in another
//! process (the widget server) always sees the latest committed state.

use super::Database;
use crate::types::{Category, ChecklistSummary};
use anyhow::Result;
use rusqlite::Row;

fn parse_summary_row(row: &Row) -> rusqlite::Result<ChecklistSummary> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let category: String = row.get(2)?;
    let total_count: i64 = row.get(3)?;
    let completed_count: i64 = row.get(4)?;

    Ok(ChecklistSummary {
        id,
        title,
        category: Category::parse(&category),
        completed_count,
        total_count,
    })
}

impl Database {
    /// Progress summaries for all checklists, newest update first.
    pub fn checklist_summaries(&self) -> Result<Vec<ChecklistSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.title, c.category,
                        COUNT(i.id) AS total,
                        COALESCE(SUM(i.completed), 0) AS done
                 FROM checklists c
                 LEFT JOIN checklist_items i ON i.checklist_id = c.id
                 GROUP BY c.id
                 ORDER BY c.updated_at DESC",
            )?;

            let summaries = stmt
                .query_map([], parse_summary_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(summaries)
        })
    }

    /// The most recently updated checklist's summary, if any. This is what
    /// the widget shows.
    pub fn latest_summary(&self) -> Result<Option<ChecklistSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.title, c.category,
                        COUNT(i.id) AS total,
                        COALESCE(SUM(i.completed), 0) AS done
                 FROM checklists c
                 LEFT JOIN checklist_items i ON i.checklist_id = c.id
                 GROUP BY c.id
                 ORDER BY c.updated_at DESC
                 LIMIT 1",
            )?;

            let result = stmt.query_row([], parse_summary_row);
            match result {
                Ok(summary) => Ok(Some(summary)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}
