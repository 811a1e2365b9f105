//! Checklist CRUD operations.
//!
//! The aggregate is the unit of persistence: callers load a [`Checklist`],
//! mutate it through its own methods, and write it back with
//! [`Database::save_checklist`] in one transaction. Item rows are owned by
//! their checklist row; deleting the parent cascades to the items.

use super::Database;
use crate::checklist::{Checklist, ChecklistItem};
use crate::types::{Category, InputSource, Priority};
use anyhow::{Result, anyhow, bail};
use rusqlite::{Connection, Row, params, params_from_iter};

/// Filter for listing checklists. Matches the home view: optional category,
/// optional case-insensitive search over titles and item names, newest
/// update first.
#[derive(Debug, Clone, Default)]
pub struct ChecklistQuery {
    pub category: Option<Category>,
    pub search: Option<String>,
}

fn parse_head_row(row: &Row) -> rusqlite::Result<(String, String, Category, InputSource, i64, i64)> {
    let id: String = row.get(0)?;
    let title: String = row.get(1)?;
    let category: String = row.get(2)?;
    let input_source: String = row.get(3)?;
    let created_at: i64 = row.get(4)?;
    let updated_at: i64 = row.get(5)?;

    Ok((
        id,
        title,
        Category::parse(&category),
        InputSource::parse(&input_source),
        created_at,
        updated_at,
    ))
}

fn load_items(conn: &Connection, checklist_id: &str) -> Result<Vec<ChecklistItem>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, note, completed, priority, position
         FROM checklist_items WHERE checklist_id = ?1 ORDER BY position",
    )?;

    let items = stmt
        .query_map(params![checklist_id], |row| {
            let id: String = row.get(0)?;
            let name: String = row.get(1)?;
            let note: Option<String> = row.get(2)?;
            let completed: bool = row.get(3)?;
            let priority: String = row.get(4)?;
            let position: i32 = row.get(5)?;

            Ok(ChecklistItem {
                id,
                name,
                note,
                completed,
                priority: Priority::parse(&priority),
                position,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(items)
}

fn insert_items(conn: &Connection, checklist_id: &str, items: &[ChecklistItem]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO checklist_items (id, checklist_id, name, note, completed, priority, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             note = excluded.note,
             completed = excluded.completed,
             priority = excluded.priority,
             position = excluded.position",
    )?;

    for item in items {
        stmt.execute(params![
            item.id,
            checklist_id,
            item.name,
            item.note,
            item.completed,
            item.priority.as_str(),
            item.position,
        ])?;
    }

    Ok(())
}

/// Delete item rows that are no longer part of the aggregate.
fn prune_items(conn: &Connection, checklist_id: &str, items: &[ChecklistItem]) -> Result<()> {
    if items.is_empty() {
        conn.execute(
            "DELETE FROM checklist_items WHERE checklist_id = ?1",
            params![checklist_id],
        )?;
        return Ok(());
    }

    let placeholders: Vec<String> = (2..items.len() + 2).map(|n| format!("?{n}")).collect();
    let sql = format!(
        "DELETE FROM checklist_items WHERE checklist_id = ?1 AND id NOT IN ({})",
        placeholders.join(", ")
    );

    let mut values: Vec<&str> = Vec::with_capacity(items.len() + 1);
    values.push(checklist_id);
    for item in items {
        values.push(&item.id);
    }

    conn.execute(&sql, params_from_iter(values))?;
    Ok(())
}

impl Database {
    /// Persist a freshly constructed checklist with its items.
    pub fn insert_checklist(&self, checklist: &Checklist) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            tx.execute(
                "INSERT INTO checklists (id, title, category, input_source, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    checklist.id,
                    checklist.title,
                    checklist.category.as_str(),
                    checklist.input_source.as_str(),
                    checklist.created_at,
                    checklist.updated_at,
                ],
            )?;
            insert_items(&tx, &checklist.id, checklist.items())?;

            tx.commit()?;
            Ok(())
        })
    }

    /// Load a checklist aggregate by exact id.
    pub fn get_checklist(&self, id: &str) -> Result<Option<Checklist>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, category, input_source, created_at, updated_at
                 FROM checklists WHERE id = ?1",
            )?;

            let head = match stmt.query_row(params![id], parse_head_row) {
                Ok(head) => head,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e.into()),
            };

            let items = load_items(conn, &head.0)?;
            let (id, title, category, input_source, created_at, updated_at) = head;
            Ok(Some(Checklist::restore(
                id,
                title,
                category,
                input_source,
                created_at,
                updated_at,
                items,
            )))
        })
    }

    /// Resolve a checklist by id prefix or exact title.
    ///
    /// An ambiguous prefix is an error rather than a guess.
    pub fn resolve_checklist(&self, needle: &str) -> Result<Checklist> {
        if let Some(checklist) = self.get_checklist(needle)? {
            return Ok(checklist);
        }

        let ids: Vec<String> = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM checklists
                 WHERE id LIKE ?1 || '%' OR title = ?1
                 ORDER BY updated_at DESC",
            )?;
            let ids = stmt
                .query_map(params![needle], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(ids)
        })?;

        match ids.as_slice() {
            [] => bail!("no checklist matches '{needle}'"),
            [id] => self
                .get_checklist(id)?
                .ok_or_else(|| anyhow!("no checklist matches '{needle}'")),
            _ => bail!(
                "'{needle}' matches {} checklists, use a longer id prefix",
                ids.len()
            ),
        }
    }

    /// List checklists matching the query, newest update first.
    pub fn list_checklists(&self, query: &ChecklistQuery) -> Result<Vec<Checklist>> {
        let heads: Vec<(String, String, Category, InputSource, i64, i64)> =
            self.with_conn(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT c.id, c.title, c.category, c.input_source,
                            c.created_at, c.updated_at
                     FROM checklists c
                     LEFT JOIN checklist_items i ON i.checklist_id = c.id
                     WHERE (?1 IS NULL OR c.category = ?1)
                       AND (?2 IS NULL OR c.title LIKE ?2 OR i.name LIKE ?2)
                     ORDER BY c.updated_at DESC",
                )?;

                let category = query.category.map(|c| c.as_str().to_string());
                let search = query.search.as_ref().map(|s| format!("%{s}%"));

                let heads = stmt
                    .query_map(params![category, search], parse_head_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(heads)
            })?;

        let mut checklists = Vec::with_capacity(heads.len());
        for (id, title, category, input_source, created_at, updated_at) in heads {
            let items = self.with_conn(|conn| load_items(conn, &id))?;
            checklists.push(Checklist::restore(
                id,
                title,
                category,
                input_source,
                created_at,
                updated_at,
                items,
            ));
        }

        Ok(checklists)
    }

    /// Write a mutated aggregate back to the store: head row, item upserts,
    /// and removal of item rows that left the aggregate, in one transaction.
    pub fn save_checklist(&self, checklist: &Checklist) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let updated = tx.execute(
                "UPDATE checklists
                 SET title = ?2, category = ?3, input_source = ?4, updated_at = ?5
                 WHERE id = ?1",
                params![
                    checklist.id,
                    checklist.title,
                    checklist.category.as_str(),
                    checklist.input_source.as_str(),
                    checklist.updated_at,
                ],
            )?;
            if updated == 0 {
                return Err(anyhow!("checklist not found: {}", checklist.id));
            }

            prune_items(&tx, &checklist.id, checklist.items())?;
            insert_items(&tx, &checklist.id, checklist.items())?;

            tx.commit()?;
            Ok(())
        })
    }

    /// Delete a checklist; item rows go with it via the cascade.
    pub fn delete_checklist(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM checklists WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
    }
}
