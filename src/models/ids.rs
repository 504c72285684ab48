//! Record id generation
//!
//! Food and recipe ids are readable slugs of the record name, made unique
//! against the target table.

use rusqlite::{Connection, OptionalExtension};

use crate::db::DbResult;

/// Lowercase the name and collapse every run of non `[a-z0-9]` chars into `-`
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c);
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        slug.push_str("item");
    }
    slug
}

/// First of `base`, `base-2`, `base-3`, ... not already used in `table`
///
/// `table` must be one of the crate's own table names.
pub fn unique_id(conn: &Connection, table: &str, base: &str) -> DbResult<String> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?1", table);
    let mut stmt = conn.prepare(&sql)?;

    let mut candidate = base.to_string();
    let mut n = 1;
    while stmt
        .query_row([&candidate], |_| Ok(()))
        .optional()?
        .is_some()
    {
        n += 1;
        candidate = format!("{}-{}", base, n);
    }
    Ok(candidate)
}
