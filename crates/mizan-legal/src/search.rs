use anyhow::{bail, Result};
use mizan_core::{db::Db, types::LawEntry};

pub const DEFAULT_LIMIT: i64 = 20;

/// Substring search over the law database.
///
/// The query is trimmed and must not be empty. A blank category means "any".
/// The limit is clamped by the store.
pub fn search_laws(
    db: &Db,
    query: &str,
    category: Option<&str>,
    limit: Option<i64>,
) -> Result<Vec<LawEntry>> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Search query is required");
    }
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    let results = db.search_laws(query, category, limit.unwrap_or(DEFAULT_LIMIT))?;
    tracing::debug!(query, ?category, hits = results.len(), "law search");
    Ok(results)
}
