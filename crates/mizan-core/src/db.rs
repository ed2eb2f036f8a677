use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::Mutex;

use crate::types::{
    AuditEvent, CaseAssessmentInput, LawEntry, RiskAssessmentResult, StoredAssessment,
};

const SCHEMA_SQL: &str = include_str!("../../../schema.sql");

/// Upper bound on search and listing page sizes.
pub const MAX_PAGE: i64 = 50;

pub struct Db {
    conn: Mutex<Connection>,
}

// ── Timestamp helpers ─────────────────────────────────────────────────────

fn parse_ts(s: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|ndt| ndt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

fn now_str() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Escape LIKE wildcards so user input matches literally.
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

// ── Row mappers ───────────────────────────────────────────────────────────

const ASSESSMENT_COLUMNS: &str = "id, user_id, case_id, assessment_data, risk_score, \
     risk_factors, mitigation_strategies, created_at";

fn json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row<'_>,
    idx: usize,
) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn row_to_assessment(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredAssessment> {
    let created_at_str: String = row.get(7)?;
    Ok(StoredAssessment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        case_id: row.get(2)?,
        assessment_data: json_column(row, 3)?,
        risk_score: row.get(4)?,
        risk_factors: json_column(row, 5)?,
        mitigation_strategies: json_column(row, 6)?,
        created_at: parse_ts(&created_at_str),
    })
}

fn row_to_audit_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<AuditEvent> {
    Ok(AuditEvent {
        id: row.get(0)?,
        ts: row.get(1)?,
        actor: row.get(2)?,
        action: row.get(3)?,
        detail: row.get(4)?,
    })
}

fn row_to_law(row: &rusqlite::Row<'_>) -> rusqlite::Result<LawEntry> {
    Ok(LawEntry {
        id: row.get(0)?,
        title: row.get(1)?,
        title_ar: row.get(2)?,
        category: row.get(3)?,
        article_number: row.get(4)?,
        content: row.get(5)?,
        content_ar: row.get(6)?,
    })
}

// ── Db impl ───────────────────────────────────────────────────────────────

impl Db {
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open SQLite database at {path:?}"))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("failed to set PRAGMAs")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Fresh in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        let mut db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn migrate(&mut self) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute_batch(SCHEMA_SQL)
            .context("failed to apply schema migrations")?;
        Ok(())
    }

    // ── Risk Assessments ──────────────────────────────────────────────────

    pub fn insert_assessment(
        &self,
        user_id: &str,
        case_id: &str,
        input: &CaseAssessmentInput,
        result: &RiskAssessmentResult,
    ) -> Result<StoredAssessment> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let created_at = now_str();
        conn.execute(
            "INSERT INTO risk_assessments \
             (user_id, case_id, assessment_data, risk_score, risk_factors, \
              mitigation_strategies, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user_id,
                case_id,
                serde_json::to_string(input)?,
                result.risk_score,
                serde_json::to_string(&result.risk_factors)?,
                serde_json::to_string(&result.mitigation_strategies)?,
                created_at,
            ],
        )
        .context("insert_assessment")?;
        Ok(StoredAssessment {
            id: conn.last_insert_rowid(),
            user_id: user_id.to_string(),
            case_id: case_id.to_string(),
            assessment_data: *input,
            risk_score: result.risk_score,
            risk_factors: result.risk_factors,
            mitigation_strategies: result.mitigation_strategies.clone(),
            created_at: parse_ts(&created_at),
        })
    }

    pub fn get_assessment(&self, id: i64) -> Result<Option<StoredAssessment>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let sql = format!("SELECT {ASSESSMENT_COLUMNS} FROM risk_assessments WHERE id = ?1");
        let result = conn
            .query_row(&sql, params![id], row_to_assessment)
            .optional()
            .context("get_assessment")?;
        Ok(result)
    }

    /// Newest first, scoped to one user and optionally one case.
    pub fn list_assessments(
        &self,
        user_id: &str,
        case_id: Option<&str>,
    ) -> Result<Vec<StoredAssessment>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let rows = match case_id {
            Some(case_id) => {
                let sql = format!(
                    "SELECT {ASSESSMENT_COLUMNS} FROM risk_assessments \
                     WHERE user_id = ?1 AND case_id = ?2 ORDER BY id DESC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![user_id, case_id], row_to_assessment)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
            None => {
                let sql = format!(
                    "SELECT {ASSESSMENT_COLUMNS} FROM risk_assessments \
                     WHERE user_id = ?1 ORDER BY id DESC"
                );
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![user_id], row_to_assessment)?
                    .collect::<rusqlite::Result<Vec<_>>>();
                rows
            }
        };
        rows.context("list_assessments")
    }

    // ── Config ────────────────────────────────────────────────────────────

    pub fn get_config(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let result = conn
            .query_row(
                "SELECT value FROM config WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("get_config")?;
        Ok(result)
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let updated_at = now_str();
        conn.execute(
            "INSERT INTO config (key, value, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, updated_at],
        )
        .context("set_config")?;
        Ok(())
    }

    // ── Audit Log ─────────────────────────────────────────────────────────

    pub fn log_event(&self, actor: &str, action: &str, detail: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO audit_events (ts, actor, action, detail) VALUES (?1, ?2, ?3, ?4)",
            params![Utc::now().timestamp(), actor, action, detail],
        )
        .context("log_event")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn recent_events(&self, limit: i64) -> Result<Vec<AuditEvent>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn.prepare(
            "SELECT id, ts, actor, action, detail FROM audit_events \
             ORDER BY id DESC LIMIT ?1",
        )?;
        let events = stmt
            .query_map(params![limit.clamp(1, 500)], row_to_audit_event)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("recent_events")?;
        Ok(events)
    }

    // ── Law Database ──────────────────────────────────────────────────────

    pub fn insert_law(&self, law: &LawEntry) -> Result<i64> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.execute(
            "INSERT INTO laws (title, title_ar, category, article_number, content, content_ar) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                law.title,
                law.title_ar,
                law.category,
                law.article_number,
                law.content,
                law.content_ar,
            ],
        )
        .context("insert_law")?;
        Ok(conn.last_insert_rowid())
    }

    pub fn count_laws(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        conn.query_row("SELECT COUNT(*) FROM laws", [], |row| row.get(0))
            .context("count_laws")
    }

    /// Case-insensitive substring match over English and Arabic title/content.
    pub fn search_laws(
        &self,
        query: &str,
        category: Option<&str>,
        limit: i64,
    ) -> Result<Vec<LawEntry>> {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let mut stmt = conn.prepare(
            "SELECT id, title, title_ar, category, article_number, content, content_ar \
             FROM laws \
             WHERE (title LIKE ?1 ESCAPE '\\' OR title_ar LIKE ?1 ESCAPE '\\' \
                    OR content LIKE ?1 ESCAPE '\\' OR content_ar LIKE ?1 ESCAPE '\\') \
               AND (?2 IS NULL OR category = ?2) \
             ORDER BY id ASC LIMIT ?3",
        )?;
        let laws = stmt
            .query_map(
                params![like_pattern(query), category, limit.clamp(1, MAX_PAGE)],
                row_to_law,
            )?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("search_laws")?;
        Ok(laws)
    }
}
