//! Complexity Report
//!
//! One immutable snapshot per analysis run, serialized with camelCase keys.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info};

use super::metrics::{self, Meta};
use super::polymorphism::{count_polymorphism, PolymorphismSummary};
use super::score::{self, ComplexityLabel, ScoreBreakdown, ScoreInputs};
use super::waveform::{assess_waveforms, WaveformAdvisory};
use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::graph::{find_cyclic_schemas, locate_schemas, DepthComputer, SchemaGraph};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathsSection {
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationsSection {
    pub count: usize,
    pub methods: IndexMap<String, usize>,
    pub avg_parameters: f64,
    pub max_parameters: usize,
    pub post_ratio: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemasSection {
    /// Named component schemas
    pub count: usize,
    pub object_count: usize,
    pub avg_properties: f64,
    pub max_properties: usize,
    pub ref_count: usize,
    pub distinct_ref_targets: Vec<String>,
    pub circular_ref_schemas: Vec<String>,
    pub circular_ref_count: usize,
    pub max_nesting_depth: usize,
    /// Located schema sites that are not named component schemas
    pub inline_schema_count: usize,
    pub polymorphism: PolymorphismSummary,
}

/// Structural complexity report for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityReport {
    pub paths: PathsSection,
    pub operations: OperationsSection,
    pub schemas: SchemasSection,
    pub meta: Meta,
    pub complexity_score: f64,
    pub complexity_label: ComplexityLabel,
    pub summary: String,
    pub waveform_serialization: WaveformAdvisory,
}

impl ComplexityReport {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Analyze `doc`, returning the report and the score breakdown behind it
pub fn analyze_with_breakdown(doc: &Value, config: &AnalyzerConfig) -> (ComplexityReport, ScoreBreakdown) {
    let sites = locate_schemas(doc);
    let graph = SchemaGraph::from_document(doc);
    let cyclic = find_cyclic_schemas(&graph);
    let max_depth = DepthComputer::new(doc).max_named_depth();
    let polymorphism = count_polymorphism(doc, &sites);
    debug!(
        sites = sites.len(),
        schemas = graph.schema_count(),
        cyclic = cyclic.len(),
        max_depth,
        "walked schema graph"
    );

    let ops = metrics::operation_metrics(doc);
    let objects = metrics::object_stats(doc);
    let refs = metrics::ref_stats(doc);
    let paths = metrics::path_count(doc);

    let inputs = ScoreInputs {
        operations: ops.count,
        paths,
        schemas: graph.schema_count(),
        refs: refs.ref_count,
        avg_parameters: ops.avg_parameters,
        max_parameters: ops.max_parameters,
        max_depth,
        cyclic_schemas: cyclic.len(),
        union_branches: polymorphism.counts.union_branch_total,
        all_of: polymorphism.counts.all_of_count,
        discriminators: polymorphism.counts.discriminator_count,
    };
    let breakdown = score::score(&inputs, &config.scoring);
    let summary = score::summary(&inputs, &breakdown);

    let report = ComplexityReport {
        paths: PathsSection { count: paths },
        operations: OperationsSection {
            count: ops.count,
            methods: ops.methods,
            avg_parameters: ops.avg_parameters,
            max_parameters: ops.max_parameters,
            post_ratio: ops.post_ratio,
        },
        schemas: SchemasSection {
            count: graph.schema_count(),
            object_count: objects.object_count,
            avg_properties: objects.avg_properties,
            max_properties: objects.max_properties,
            ref_count: refs.ref_count,
            distinct_ref_targets: refs.distinct_ref_targets,
            circular_ref_count: cyclic.len(),
            circular_ref_schemas: cyclic,
            max_nesting_depth: max_depth,
            inline_schema_count: sites.inline_count(),
            polymorphism,
        },
        meta: metrics::meta(doc),
        complexity_score: breakdown.score,
        complexity_label: breakdown.label,
        summary,
        waveform_serialization: assess_waveforms(doc, &config.waveform),
    };

    info!(
        score = report.complexity_score,
        label = %report.complexity_label,
        "computed complexity report"
    );
    (report, breakdown)
}

/// Analyze `doc` into a complexity report
pub fn analyze(doc: &Value, config: &AnalyzerConfig) -> ComplexityReport {
    analyze_with_breakdown(doc, config).0
}
