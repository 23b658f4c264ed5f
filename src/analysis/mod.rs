//! Complexity Analysis
//!
//! Folds the located schema sites, the schema graph and raw document
//! counts into a [`ComplexityReport`].

pub mod metrics;
pub mod polymorphism;
pub mod report;
pub mod score;
pub mod waveform;

pub use metrics::{Meta, ObjectStats, OperationMetrics, RefStats};
pub use polymorphism::{count_polymorphism, PolymorphismCounts, PolymorphismSummary};
pub use report::{analyze, analyze_with_breakdown, ComplexityReport};
pub use score::{ComplexityLabel, ScoreBreakdown, ScoreComponent, ScoreInputs};
pub use waveform::{assess_waveforms, WaveformAdvisory};
