use clap::ValueEnum;
use serde::Serialize;

/// Kind of review finding being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum IssueType {
    Bug,
    Guideline,
    Context,
    Style,
}

impl IssueType {
    /// Starting score before evidence and adjustments are applied.
    pub fn base_score(self) -> f64 {
        match self {
            IssueType::Bug => 70.0,
            IssueType::Guideline => 60.0,
            IssueType::Context => 50.0,
            IssueType::Style => 20.0,
        }
    }
}

/// How strongly the finding is backed by concrete evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Evidence {
    Strong,
    Moderate,
    Weak,
    None,
}

impl Evidence {
    pub fn multiplier(self) -> f64 {
        match self {
            Evidence::Strong => 1.4,
            Evidence::Moderate => 1.1,
            Evidence::Weak => 0.7,
            Evidence::None => 0.3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Flag,
    Review,
    Skip,
}

impl Recommendation {
    pub fn for_score(score: u8) -> Self {
        if score >= FLAG_THRESHOLD {
            Recommendation::Flag
        } else if score >= REVIEW_THRESHOLD {
            Recommendation::Review
        } else {
            Recommendation::Skip
        }
    }

    pub fn reason(self) -> &'static str {
        match self {
            Recommendation::Flag => "High confidence issue, should be reported",
            Recommendation::Review => "Moderate confidence, may need manual review",
            Recommendation::Skip => "Low confidence, likely false positive",
        }
    }
}

pub const FLAG_THRESHOLD: u8 = 80;
pub const REVIEW_THRESHOLD: u8 = 50;

const VERIFIED_BONUS: f64 = 15.0;
const PRE_EXISTING_PENALTY: f64 = 50.0;
const LINTER_PENALTY: f64 = 30.0;

/// Everything known about a finding that feeds into its score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreFactors {
    pub issue_type: IssueType,
    pub evidence: Evidence,
    pub verified: bool,
    pub pre_existing: bool,
    pub linter_catchable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub score: u8,
    pub recommendation: Recommendation,
    pub reason: &'static str,
    pub factors: ScoreFactors,
}

/// Compute a 0-100 confidence score and the matching recommendation.
///
/// The base score is scaled by evidence strength, adjusted by the verified
/// bonus and the pre-existing and linter penalties, truncated toward zero
/// and clamped.
pub fn calculate_score(factors: ScoreFactors) -> ScoreResult {
    let mut score = factors.issue_type.base_score() * factors.evidence.multiplier();

    if factors.verified {
        score += VERIFIED_BONUS;
    }
    if factors.pre_existing {
        score -= PRE_EXISTING_PENALTY;
    }
    if factors.linter_catchable {
        score -= LINTER_PENALTY;
    }

    let score = (score.trunc() as i64).clamp(0, 100) as u8;
    let recommendation = Recommendation::for_score(score);

    ScoreResult {
        score,
        recommendation,
        reason: recommendation.reason(),
        factors,
    }
}
