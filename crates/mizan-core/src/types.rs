use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Risk Assessment ──────────────────────────────────────────────────────

/// Caller-supplied case description, one per risk-assessment request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseAssessmentInput {
    /// 0-10.
    pub complexity_level: f64,
    /// 0-10, higher means stronger evidence.
    pub evidence_quality: f64,
    pub procedural_issues: bool,
    /// Non-negative, monetary units unspecified.
    pub claim_amount: f64,
    /// 0-10.
    pub urgency_level: f64,
    /// 0-10.
    pub opponent_resources: f64,
}

/// The six derived risk factors. Created and consumed within one request.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactorMap {
    pub legal_complexity: f64,
    pub evidence_strength: f64,
    pub procedural_risk: f64,
    pub financial_exposure: f64,
    pub time_sensitivity: f64,
    pub opposing_party_strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessmentResult {
    /// Rounded to two decimals.
    pub risk_score: f64,
    pub risk_factors: RiskFactorMap,
    pub mitigation_strategies: Vec<String>,
}

/// A risk assessment as stored in the database and returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAssessment {
    pub id: i64,
    pub user_id: String,
    pub case_id: String,
    pub assessment_data: CaseAssessmentInput,
    pub risk_score: f64,
    pub risk_factors: RiskFactorMap,
    pub mitigation_strategies: Vec<String>,
    pub created_at: DateTime<Utc>,
}

// ── Callers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Identity resolved from a verified bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallerIdentity {
    pub user_id: String,
    pub role: Role,
}

impl CallerIdentity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// ── Language ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Ar,
    #[default]
    En,
}

impl Language {
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Some(Self::Ar),
            "en" | "english" => Some(Self::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Ar => "ar",
            Self::En => "en",
        }
    }
}

// ── Audit / Law Database ─────────────────────────────────────────────────

/// Append-only record of a security-relevant action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: i64,
    pub ts: i64,
    /// User id of the caller, or "system".
    pub actor: String,
    /// e.g. "risk_assessment.stored", "settings.updated".
    pub action: String,
    pub detail: String,
}

/// One article in the law database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LawEntry {
    pub id: i64,
    pub title: String,
    pub title_ar: String,
    pub category: String,
    pub article_number: String,
    pub content: String,
    pub content_ar: String,
}
