//! Case risk scoring.
//!
//! Three pure steps: [`extract_factors`] maps the raw case description onto
//! six factor scores, [`aggregate`] combines them with fixed weights, and
//! [`mitigation_strategies`] turns factors that cross a threshold into advice.
//! [`assess_risk`] validates the input and runs all three.

use crate::error::{AssessError, AssessResult};
use crate::types::{CallerIdentity, CaseAssessmentInput, RiskAssessmentResult, RiskFactorMap};

// ── Factor coefficients ──────────────────────────────────────────────────

pub const COMPLEXITY_MULTIPLIER: f64 = 20.0;
pub const EVIDENCE_MULTIPLIER: f64 = 10.0;
pub const PROCEDURAL_RISK_FLAGGED: f64 = 30.0;
pub const PROCEDURAL_RISK_BASELINE: f64 = 10.0;
pub const CLAIM_DIVISOR: f64 = 1000.0;
pub const FINANCIAL_EXPOSURE_CAP: f64 = 40.0;
pub const URGENCY_MULTIPLIER: f64 = 15.0;
pub const OPPONENT_MULTIPLIER: f64 = 12.0;

/// Upper bound of the 0-10 input scales.
pub const SCALE_MAX: f64 = 10.0;

/// Aggregation weights. Must sum to 1.0.
pub mod weights {
    pub const LEGAL_COMPLEXITY: f64 = 0.25;
    pub const EVIDENCE_STRENGTH: f64 = 0.20;
    pub const PROCEDURAL_RISK: f64 = 0.15;
    pub const FINANCIAL_EXPOSURE: f64 = 0.20;
    pub const TIME_SENSITIVITY: f64 = 0.10;
    pub const OPPOSING_PARTY_STRENGTH: f64 = 0.10;

    pub const ALL: [f64; 6] = [
        LEGAL_COMPLEXITY,
        EVIDENCE_STRENGTH,
        PROCEDURAL_RISK,
        FINANCIAL_EXPOSURE,
        TIME_SENSITIVITY,
        OPPOSING_PARTY_STRENGTH,
    ];
}

/// Mitigation thresholds. A rule fires only when the factor is strictly greater.
pub mod thresholds {
    pub const LEGAL_COMPLEXITY: f64 = 50.0;
    pub const EVIDENCE_STRENGTH: f64 = 60.0;
    pub const PROCEDURAL_RISK: f64 = 20.0;
    pub const FINANCIAL_EXPOSURE: f64 = 30.0;
}

pub const COMPLEXITY_ADVICE: [&str; 2] = [
    "Consider engaging specialized legal counsel",
    "Conduct comprehensive legal research",
];
pub const EVIDENCE_ADVICE: [&str; 2] = [
    "Strengthen evidence collection efforts",
    "Engage expert witnesses if necessary",
];
pub const PROCEDURAL_ADVICE: [&str; 2] = [
    "Review all procedural requirements carefully",
    "Set up timeline monitoring system",
];
pub const FINANCIAL_ADVICE: [&str; 2] = [
    "Consider litigation insurance",
    "Explore settlement opportunities",
];

// ── Input validation ─────────────────────────────────────────────────────

impl CaseAssessmentInput {
    /// Decode from a JSON object, rejecting missing or mistyped fields.
    pub fn from_json(value: serde_json::Value) -> AssessResult<Self> {
        let input: Self =
            serde_json::from_value(value).map_err(|e| AssessError::malformed(e.to_string()))?;
        input.validate()?;
        Ok(input)
    }

    /// Check every numeric field is finite and inside its expected range.
    pub fn validate(&self) -> AssessResult<()> {
        let scales = [
            ("complexityLevel", self.complexity_level),
            ("evidenceQuality", self.evidence_quality),
            ("urgencyLevel", self.urgency_level),
            ("opponentResources", self.opponent_resources),
        ];
        for (name, value) in scales {
            if !value.is_finite() {
                return Err(AssessError::malformed(format!(
                    "`{name}` must be a finite number"
                )));
            }
            if !(0.0..=SCALE_MAX).contains(&value) {
                return Err(AssessError::malformed(format!(
                    "`{name}` must be between 0 and {SCALE_MAX}, got {value}"
                )));
            }
        }
        if !self.claim_amount.is_finite() {
            return Err(AssessError::malformed("`claimAmount` must be a finite number"));
        }
        if self.claim_amount < 0.0 {
            return Err(AssessError::malformed(format!(
                "`claimAmount` must not be negative, got {}",
                self.claim_amount
            )));
        }
        Ok(())
    }
}

// ── Scoring ──────────────────────────────────────────────────────────────

pub fn extract_factors(input: &CaseAssessmentInput) -> RiskFactorMap {
    RiskFactorMap {
        legal_complexity: input.complexity_level * COMPLEXITY_MULTIPLIER,
        evidence_strength: (SCALE_MAX - input.evidence_quality) * EVIDENCE_MULTIPLIER,
        procedural_risk: if input.procedural_issues {
            PROCEDURAL_RISK_FLAGGED
        } else {
            PROCEDURAL_RISK_BASELINE
        },
        financial_exposure: (input.claim_amount / CLAIM_DIVISOR).min(FINANCIAL_EXPOSURE_CAP),
        time_sensitivity: input.urgency_level * URGENCY_MULTIPLIER,
        opposing_party_strength: input.opponent_resources * OPPONENT_MULTIPLIER,
    }
}

/// Weighted sum of the factors, rounded to two decimals. Not clamped.
pub fn aggregate(factors: &RiskFactorMap) -> f64 {
    let weighted = factors.legal_complexity * weights::LEGAL_COMPLEXITY
        + factors.evidence_strength * weights::EVIDENCE_STRENGTH
        + factors.procedural_risk * weights::PROCEDURAL_RISK
        + factors.financial_exposure * weights::FINANCIAL_EXPOSURE
        + factors.time_sensitivity * weights::TIME_SENSITIVITY
        + factors.opposing_party_strength * weights::OPPOSING_PARTY_STRENGTH;
    round2(weighted)
}

/// Round half-up to two decimal places (scale by 100, round, scale back).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Advice for every factor above its threshold, in fixed rule order.
/// Time sensitivity and opposing-party strength have no rule.
pub fn mitigation_strategies(factors: &RiskFactorMap) -> Vec<String> {
    let rules: [(f64, f64, &[&str; 2]); 4] = [
        (factors.legal_complexity, thresholds::LEGAL_COMPLEXITY, &COMPLEXITY_ADVICE),
        (factors.evidence_strength, thresholds::EVIDENCE_STRENGTH, &EVIDENCE_ADVICE),
        (factors.procedural_risk, thresholds::PROCEDURAL_RISK, &PROCEDURAL_ADVICE),
        (factors.financial_exposure, thresholds::FINANCIAL_EXPOSURE, &FINANCIAL_ADVICE),
    ];
    rules
        .iter()
        .filter(|(value, threshold, _)| value > threshold)
        .flat_map(|(_, _, advice)| advice.iter().map(|s| s.to_string()))
        .collect()
}

/// Validate `input` and produce the full assessment for `caller`.
pub fn assess_risk(
    input: &CaseAssessmentInput,
    caller: &CallerIdentity,
) -> AssessResult<RiskAssessmentResult> {
    input.validate()?;
    let risk_factors = extract_factors(input);
    let risk_score = aggregate(&risk_factors);
    let mitigation_strategies = mitigation_strategies(&risk_factors);
    tracing::debug!(
        user = %caller.user_id,
        risk_score,
        strategies = mitigation_strategies.len(),
        "case risk assessed"
    );
    Ok(RiskAssessmentResult {
        risk_score,
        risk_factors,
        mitigation_strategies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(
        complexity: f64,
        evidence: f64,
        procedural: bool,
        claim: f64,
        urgency: f64,
        opponent: f64,
    ) -> CaseAssessmentInput {
        CaseAssessmentInput {
            complexity_level: complexity,
            evidence_quality: evidence,
            procedural_issues: procedural,
            claim_amount: claim,
            urgency_level: urgency,
            opponent_resources: opponent,
        }
    }

    /// Evidence quality 10 zeroes the evidence factor, so "all zero" means
    /// every factor except procedural risk contributes nothing.
    fn zero_risk() -> CaseAssessmentInput {
        input(0.0, 10.0, false, 0.0, 0.0, 0.0)
    }

    fn caller() -> CallerIdentity {
        CallerIdentity {
            user_id: "user-1".into(),
            role: crate::types::Role::User,
        }
    }

    #[test]
    fn legal_complexity_is_linear_with_zero_intercept() {
        for level in [0.0, 1.0, 2.5, 7.0, 10.0] {
            let f = extract_factors(&input(level, 5.0, false, 0.0, 0.0, 0.0));
            assert_eq!(f.legal_complexity, level * 20.0);
        }
    }

    #[test]
    fn evidence_strength_is_inverted() {
        assert_eq!(extract_factors(&input(0.0, 10.0, false, 0.0, 0.0, 0.0)).evidence_strength, 0.0);
        assert_eq!(extract_factors(&input(0.0, 0.0, false, 0.0, 0.0, 0.0)).evidence_strength, 100.0);
        let mut last = f64::INFINITY;
        for q in 0..=10 {
            let s = extract_factors(&input(0.0, q as f64, false, 0.0, 0.0, 0.0)).evidence_strength;
            assert!(s < last, "evidence strength must decrease as quality rises");
            last = s;
        }
    }

    #[test]
    fn financial_exposure_is_capped_at_forty() {
        for claim in [40_000.0, 40_001.0, 1_000_000.0, 1e12] {
            let f = extract_factors(&input(0.0, 10.0, false, claim, 0.0, 0.0));
            assert_eq!(f.financial_exposure, 40.0);
        }
        assert_eq!(extract_factors(&input(0.0, 10.0, false, 10_000.0, 0.0, 0.0)).financial_exposure, 10.0);
    }

    #[test]
    fn procedural_risk_is_one_of_two_constants() {
        assert_eq!(extract_factors(&input(3.0, 3.0, true, 5.0, 3.0, 3.0)).procedural_risk, 30.0);
        assert_eq!(extract_factors(&input(3.0, 3.0, false, 5.0, 3.0, 3.0)).procedural_risk, 10.0);
    }

    #[test]
    fn time_and_opponent_coefficients() {
        let f = extract_factors(&input(0.0, 10.0, false, 0.0, 4.0, 5.0));
        assert_eq!(f.time_sensitivity, 60.0);
        assert_eq!(f.opposing_party_strength, 60.0);
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = weights::ALL.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12, "weights drifted: {sum}");
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(12.346), 12.35);
        assert_eq!(round2(12.344), 12.34);
        assert_eq!(round2(41.8), 41.8);
    }

    #[test]
    fn scenario_typical_case() {
        let case = input(5.0, 8.0, false, 10_000.0, 3.0, 4.0);
        let f = extract_factors(&case);
        assert_eq!(
            f,
            RiskFactorMap {
                legal_complexity: 100.0,
                evidence_strength: 20.0,
                procedural_risk: 10.0,
                financial_exposure: 10.0,
                time_sensitivity: 45.0,
                opposing_party_strength: 48.0,
            }
        );
        assert_eq!(aggregate(&f), 41.8);
        assert_eq!(mitigation_strategies(&f), COMPLEXITY_ADVICE.map(String::from).to_vec());
    }

    #[test]
    fn scenario_procedural_issues_only() {
        let result = assess_risk(&input(0.0, 10.0, true, 0.0, 0.0, 0.0), &caller()).unwrap();
        assert_eq!(result.risk_factors.procedural_risk, 30.0);
        assert_eq!(result.risk_score, 4.5);
        assert_eq!(result.mitigation_strategies, PROCEDURAL_ADVICE.map(String::from).to_vec());
    }

    #[test]
    fn scenario_extreme_claim_is_clamped() {
        let f = extract_factors(&input(0.0, 10.0, false, 1_000_000.0, 0.0, 0.0));
        assert_eq!(f.financial_exposure, 40.0);
        assert_eq!(mitigation_strategies(&f), FINANCIAL_ADVICE.map(String::from).to_vec());
    }

    #[test]
    fn scenario_perfect_evidence_has_no_evidence_advice() {
        let f = extract_factors(&input(10.0, 10.0, true, 1_000_000.0, 10.0, 10.0));
        assert_eq!(f.evidence_strength, 0.0);
        let advice = mitigation_strategies(&f);
        for s in EVIDENCE_ADVICE {
            assert!(!advice.iter().any(|a| a == s));
        }
    }

    #[test]
    fn scenario_max_complexity_dominates() {
        let result = assess_risk(&input(10.0, 10.0, false, 0.0, 0.0, 0.0), &caller()).unwrap();
        assert_eq!(result.risk_factors.legal_complexity, 200.0);
        // Baseline procedural risk still contributes 10 * 0.15.
        assert_eq!(result.risk_score, 51.5);
        assert_eq!(
            result.mitigation_strategies,
            COMPLEXITY_ADVICE.map(String::from).to_vec()
        );
    }

    #[test]
    fn max_complexity_with_weak_evidence() {
        let f = extract_factors(&input(10.0, 0.0, false, 0.0, 0.0, 0.0));
        assert_eq!(f.legal_complexity * weights::LEGAL_COMPLEXITY, 50.0);
        assert_eq!(aggregate(&f), 71.5);
        let advice = mitigation_strategies(&f);
        assert_eq!(advice[..2], COMPLEXITY_ADVICE.map(String::from));
    }

    #[test]
    fn thresholds_are_strict() {
        let at_threshold = RiskFactorMap {
            legal_complexity: 50.0,
            evidence_strength: 60.0,
            procedural_risk: 20.0,
            financial_exposure: 30.0,
            time_sensitivity: 1000.0,
            opposing_party_strength: 1000.0,
        };
        assert!(mitigation_strategies(&at_threshold).is_empty());
    }

    #[test]
    fn all_rules_fire_in_order() {
        let f = extract_factors(&input(10.0, 0.0, true, 50_000.0, 10.0, 10.0));
        let expected: Vec<String> = COMPLEXITY_ADVICE
            .iter()
            .chain(EVIDENCE_ADVICE.iter())
            .chain(PROCEDURAL_ADVICE.iter())
            .chain(FINANCIAL_ADVICE.iter())
            .map(|s| s.to_string())
            .collect();
        assert_eq!(mitigation_strategies(&f), expected);
        assert_eq!(mitigation_strategies(&f), mitigation_strategies(&f));
    }

    #[test]
    fn zero_risk_scores_only_baseline_procedural() {
        let result = assess_risk(&zero_risk(), &caller()).unwrap();
        assert_eq!(result.risk_score, 1.5);
        assert!(result.mitigation_strategies.is_empty());
    }

    #[test]
    fn out_of_range_input_is_rejected() {
        let err = assess_risk(&input(11.0, 5.0, false, 0.0, 0.0, 0.0), &caller()).unwrap_err();
        assert!(matches!(err, AssessError::MalformedInput(ref m) if m.contains("complexityLevel")));
        let err = assess_risk(&input(1.0, 5.0, false, -1.0, 0.0, 0.0), &caller()).unwrap_err();
        assert!(matches!(err, AssessError::MalformedInput(ref m) if m.contains("claimAmount")));
        let err = assess_risk(&input(1.0, f64::NAN, false, 0.0, 0.0, 0.0), &caller()).unwrap_err();
        assert!(matches!(err, AssessError::MalformedInput(ref m) if m.contains("evidenceQuality")));
    }

    #[test]
    fn from_json_reports_missing_field() {
        let v = serde_json::json!({
            "complexityLevel": 5,
            "evidenceQuality": 8,
            "proceduralIssues": false,
            "claimAmount": 10000,
            "urgencyLevel": 3
        });
        let err = CaseAssessmentInput::from_json(v).unwrap_err();
        assert!(err.to_string().contains("opponentResources"), "{err}");
    }

    #[test]
    fn from_json_rejects_wrong_types() {
        let v = serde_json::json!({
            "complexityLevel": "high",
            "evidenceQuality": 8,
            "proceduralIssues": false,
            "claimAmount": 10000,
            "urgencyLevel": 3,
            "opponentResources": 4
        });
        assert!(matches!(
            CaseAssessmentInput::from_json(v),
            Err(AssessError::MalformedInput(_))
        ));
    }
}
