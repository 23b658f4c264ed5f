//! Composite Complexity Score
//!
//! Every raw metric is normalized to [0, 1] and weighted; the weights sum to
//! 100, so the score lies in [0, 100]. Open-ended counts saturate
//! logarithmically, bounded metrics are clamped linearly.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::metrics::round_to;
use crate::config::ScoringConfig;

// =============================================================================
// Weights
// =============================================================================

pub const WEIGHT_OPERATIONS: f64 = 22.0;
pub const WEIGHT_SCHEMAS: f64 = 18.0;
pub const WEIGHT_REFS: f64 = 12.0;
pub const WEIGHT_PATHS: f64 = 8.0;
pub const WEIGHT_AVG_PARAMETERS: f64 = 8.0;
pub const WEIGHT_DEPTH: f64 = 10.0;
pub const WEIGHT_MAX_PARAMETERS: f64 = 4.0;
pub const WEIGHT_CIRCULARITY: f64 = 3.0;
pub const WEIGHT_UNIONS: f64 = 8.0;
pub const WEIGHT_ALL_OF: f64 = 4.0;
pub const WEIGHT_DISCRIMINATORS: f64 = 3.0;

// =============================================================================
// Normalization
// =============================================================================

/// `min(1, log10(1 + x) / log10(1 + k))`
pub fn log_saturation(x: f64, k: f64) -> f64 {
    let x = x.max(0.0);
    if k <= 0.0 {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }
    ((1.0 + x).log10() / (1.0 + k).log10()).min(1.0)
}

/// `x / denominator`, clamped to [0, 1]
pub fn linear(x: f64, denominator: f64) -> f64 {
    let x = x.max(0.0);
    if denominator <= 0.0 {
        return if x > 0.0 { 1.0 } else { 0.0 };
    }
    (x / denominator).min(1.0)
}

// =============================================================================
// Label
// =============================================================================

/// Four-level reading of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComplexityLabel {
    Low,
    Moderate,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl ComplexityLabel {
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 75.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for ComplexityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Scoring
// =============================================================================

/// Raw metrics the score is computed from
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreInputs {
    pub operations: usize,
    pub paths: usize,
    pub schemas: usize,
    pub refs: usize,
    pub avg_parameters: f64,
    pub max_parameters: usize,
    pub max_depth: usize,
    pub cyclic_schemas: usize,
    pub union_branches: usize,
    pub all_of: usize,
    pub discriminators: usize,
}

/// One weighted term of the score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    pub name: &'static str,
    pub weight: f64,
    /// Normalized value in [0, 1]
    pub normalized: f64,
}

impl ScoreComponent {
    pub fn contribution(&self) -> f64 {
        self.weight * self.normalized
    }
}

/// Score with its per-term breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub components: Vec<ScoreComponent>,
    /// Weighted sum, rounded to one decimal
    pub score: f64,
    pub label: ComplexityLabel,
}

pub fn score(inputs: &ScoreInputs, config: &ScoringConfig) -> ScoreBreakdown {
    let sat = &config.saturation;
    let lin = &config.linear;

    let term = |name: &'static str, weight: f64, normalized: f64| ScoreComponent { name, weight, normalized };
    let components = vec![
        term("operations", WEIGHT_OPERATIONS, log_saturation(inputs.operations as f64, sat.operations)),
        term("schemas", WEIGHT_SCHEMAS, log_saturation(inputs.schemas as f64, sat.schemas)),
        term("refs", WEIGHT_REFS, log_saturation(inputs.refs as f64, sat.refs)),
        term("paths", WEIGHT_PATHS, log_saturation(inputs.paths as f64, sat.paths)),
        term("avgParameters", WEIGHT_AVG_PARAMETERS, linear(inputs.avg_parameters, lin.avg_params)),
        term("depth", WEIGHT_DEPTH, linear(inputs.max_depth as f64, lin.depth)),
        term("maxParameters", WEIGHT_MAX_PARAMETERS, linear(inputs.max_parameters as f64, lin.max_params)),
        term("circularity", WEIGHT_CIRCULARITY, linear(inputs.cyclic_schemas as f64, lin.cyclic)),
        term("unions", WEIGHT_UNIONS, linear(inputs.union_branches as f64, lin.union_branches)),
        term("allOf", WEIGHT_ALL_OF, linear(inputs.all_of as f64, lin.all_of)),
        term("discriminators", WEIGHT_DISCRIMINATORS, linear(inputs.discriminators as f64, lin.discriminators)),
    ];

    let total: f64 = components.iter().map(ScoreComponent::contribution).sum();
    let score = round_to(total, 1).clamp(0.0, 100.0);
    ScoreBreakdown {
        components,
        score,
        label: ComplexityLabel::from_score(score),
    }
}

/// One-line human summary
pub fn summary(inputs: &ScoreInputs, breakdown: &ScoreBreakdown) -> String {
    format!(
        "{} complexity ({:.1}/100): {} operations across {} paths, {} schemas, {} refs, {} cyclic schemas, max depth {}, {} union branches",
        breakdown.label,
        breakdown.score,
        inputs.operations,
        inputs.paths,
        inputs.schemas,
        inputs.refs,
        inputs.cyclic_schemas,
        inputs.max_depth,
        inputs.union_branches,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn default_score(inputs: &ScoreInputs) -> ScoreBreakdown {
        score(inputs, &ScoringConfig::default())
    }

    fn huge() -> ScoreInputs {
        ScoreInputs {
            operations: 100_000,
            paths: 100_000,
            schemas: 100_000,
            refs: 1_000_000,
            avg_parameters: 500.0,
            max_parameters: 500,
            max_depth: 500,
            cyclic_schemas: 500,
            union_branches: 500,
            all_of: 500,
            discriminators: 500,
        }
    }

    #[test]
    fn test_weights_sum_to_100() {
        let breakdown = default_score(&ScoreInputs::default());
        let total: f64 = breakdown.components.iter().map(|c| c.weight).sum();
        assert_eq!(total, 100.0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(default_score(&ScoreInputs::default()).score, 0.0);
        let max = default_score(&huge());
        assert_eq!(max.score, 100.0);
        assert_eq!(max.label, ComplexityLabel::VeryHigh);
    }

    #[test]
    fn test_minimal_api_is_low() {
        let inputs = ScoreInputs {
            operations: 1,
            paths: 1,
            schemas: 1,
            max_depth: 1,
            ..ScoreInputs::default()
        };
        let breakdown = default_score(&inputs);
        assert!(breakdown.score > 0.0 && breakdown.score < 25.0, "{}", breakdown.score);
        assert_eq!(breakdown.label, ComplexityLabel::Low);
    }

    #[test]
    fn test_monotonic_in_each_input() {
        let base = ScoreInputs {
            operations: 10,
            paths: 8,
            schemas: 20,
            refs: 40,
            avg_parameters: 2.0,
            max_parameters: 5,
            max_depth: 3,
            cyclic_schemas: 1,
            union_branches: 4,
            all_of: 2,
            discriminators: 1,
        };
        let bumps: [fn(&mut ScoreInputs); 11] = [
            |i| i.operations *= 3,
            |i| i.paths *= 3,
            |i| i.schemas *= 3,
            |i| i.refs *= 3,
            |i| i.avg_parameters *= 3.0,
            |i| i.max_parameters *= 3,
            |i| i.max_depth *= 3,
            |i| i.cyclic_schemas *= 3,
            |i| i.union_branches *= 3,
            |i| i.all_of *= 3,
            |i| i.discriminators *= 3,
        ];
        let before = default_score(&base).score;
        for bump in bumps {
            let mut bumped = base.clone();
            bump(&mut bumped);
            assert!(default_score(&bumped).score >= before);
        }
    }

    #[test]
    fn test_log_saturation_caps_at_one() {
        assert_eq!(log_saturation(0.0, 200.0), 0.0);
        assert_eq!(log_saturation(200.0, 200.0), 1.0);
        assert_eq!(log_saturation(1e9, 200.0), 1.0);
        assert!(log_saturation(20.0, 200.0) > 0.5);
    }

    #[rstest]
    #[case(0.0, ComplexityLabel::Low)]
    #[case(24.9, ComplexityLabel::Low)]
    #[case(25.0, ComplexityLabel::Moderate)]
    #[case(49.9, ComplexityLabel::Moderate)]
    #[case(50.0, ComplexityLabel::High)]
    #[case(74.9, ComplexityLabel::High)]
    #[case(75.0, ComplexityLabel::VeryHigh)]
    #[case(100.0, ComplexityLabel::VeryHigh)]
    fn test_label_thresholds(#[case] score: f64, #[case] expected: ComplexityLabel) {
        assert_eq!(ComplexityLabel::from_score(score), expected);
    }

    #[test]
    fn test_label_serializes_with_space() {
        assert_eq!(serde_json::to_string(&ComplexityLabel::VeryHigh).unwrap(), "\"Very High\"");
    }

    #[test]
    fn test_summary_mentions_label_and_score() {
        let inputs = ScoreInputs { operations: 1, paths: 1, schemas: 1, ..ScoreInputs::default() };
        let breakdown = default_score(&inputs);
        let line = summary(&inputs, &breakdown);
        assert!(line.starts_with("Low complexity ("));
        assert!(line.contains("1 operations across 1 paths"));
    }
}
