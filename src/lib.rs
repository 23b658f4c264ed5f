//! OpenAPI Merge & Complexity Analysis
//!
//! Two pipelines over parsed OpenAPI documents:
//!
//! - **Merge**: split a text blob of concatenated documents into fragments,
//!   parse them, and fold them into one document with internal-only refs.
//! - **Analyze**: locate every schema site, build the named-schema reference
//!   graph, detect cycles, measure depth and polymorphism, and score the
//!   result on a 0–100 scale.
//!
//! ## Architecture
//!
//! ```text
//! text ─▶ split ─▶ [Value] ─▶ merge ─▶ Value
//!                                        │
//!                     ┌──────────────────┼───────────────────┐
//!                     ▼                  ▼                   ▼
//!              graph::locator      SchemaGraph         analysis::metrics
//!                     │           cycles / depth             │
//!                     └──────▶ analysis::polymorphism ◀──────┘
//!                                        │
//!                                        ▼
//!                          ComplexityReport ─▶ assessment (Markdown)
//! ```

pub mod analysis;
pub mod assessment;
pub mod config;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod files;
pub mod graph;
pub mod merge;
pub mod split;

pub use analysis::{analyze, ComplexityLabel, ComplexityReport};
pub use assessment::render_assessment;
pub use config::{AnalyzerConfig, MergeConfig};
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use error::{Result, SpecError};
pub use graph::{find_cyclic_schemas, locate_schemas, SchemaGraph};
pub use merge::{merge_documents, merge_text, MergeConflict, MergeOutcome};
pub use split::{parse_document, split_documents, ParsedDocuments};
