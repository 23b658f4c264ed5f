//! Markdown Assessment
//!
//! Renders a qualitative reading of a [`ComplexityReport`]. Pure formatting;
//! every judgement is a fixed threshold on report fields.

use chrono::{DateTime, Utc};

use crate::analysis::{ComplexityLabel, ComplexityReport};

/// POST share at or above which the API reads as RPC over HTTP
pub const RPC_POST_RATIO: f64 = 0.8;
/// Union branches at or above which untagged unions become a consumer problem
pub const UNTAGGED_UNION_BRANCHES: usize = 20;
/// Cyclic schemas at or above which the graph counts as tangled
pub const TANGLED_CYCLIC_SCHEMAS: usize = 5;
/// Total refs at or above which the graph counts as tangled
pub const TANGLED_REF_COUNT: usize = 500;

/// Findings the Direct Answer is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Findings {
    pub rpc_style: bool,
    pub untagged_polymorphism: bool,
    pub tangled_graph: bool,
}

impl Findings {
    pub fn of(report: &ComplexityReport) -> Self {
        let poly = &report.schemas.polymorphism.counts;
        Self {
            rpc_style: report.operations.count > 0 && report.operations.post_ratio >= RPC_POST_RATIO,
            untagged_polymorphism: poly.union_branch_total >= UNTAGGED_UNION_BRANCHES
                && poly.discriminator_count == 0,
            tangled_graph: report.schemas.circular_ref_count >= TANGLED_CYCLIC_SCHEMAS
                || report.schemas.ref_count >= TANGLED_REF_COUNT,
        }
    }

    fn any(&self) -> bool {
        self.rpc_style || self.untagged_polymorphism || self.tangled_graph
    }
}

/// Render the assessment stamped with the current time
pub fn render_assessment(report: &ComplexityReport) -> String {
    render_assessment_at(report, Utc::now())
}

/// Render the assessment stamped with `generated`
pub fn render_assessment_at(report: &ComplexityReport, generated: DateTime<Utc>) -> String {
    let findings = Findings::of(report);
    let title = report.meta.title.as_deref().unwrap_or("Untitled API");
    let mut out = String::new();

    out.push_str(&format!("# API Complexity Assessment: {}\n\n", title));
    out.push_str(&format!(
        "_Generated {} · OpenAPI {} · API version {}_\n",
        generated.format("%Y-%m-%d %H:%M UTC"),
        report.meta.openapi_version.as_deref().unwrap_or("unknown"),
        report.meta.version.as_deref().unwrap_or("unknown"),
    ));

    executive_summary(&mut out, report);
    implementability(&mut out, report);
    rest_appropriateness(&mut out, report, &findings);
    consumer_burden(&mut out, report, &findings);
    integration_risk(&mut out, report, &findings);
    path_forward(&mut out, &findings);
    if report.waveform_serialization.issue_detected {
        waveform_section(&mut out, report);
    }

    out.push_str(&format!("\n**Direct Answer:** {}\n", direct_answer(report, &findings)));
    out
}

fn section(out: &mut String, heading: &str) {
    out.push_str(&format!("\n## {}\n\n", heading));
}

fn executive_summary(out: &mut String, report: &ComplexityReport) {
    section(out, "Executive Summary");
    out.push_str(&format!(
        "Complexity score **{:.1}/100 ({})**. {}.\n",
        report.complexity_score, report.complexity_label, report.summary
    ));
}

fn implementability(out: &mut String, report: &ComplexityReport) {
    section(out, "Real-World Implementability");
    let ops = &report.operations;
    let schemas = &report.schemas;
    out.push_str(&format!(
        "- {} operations over {} paths; {:.2} parameters per operation on average, {} at most.\n",
        ops.count, report.paths.count, ops.avg_parameters, ops.max_parameters
    ));
    out.push_str(&format!(
        "- {} named schemas ({} objects, {:.2} properties on average, {} at most) plus {} inline schemas.\n",
        schemas.count, schemas.object_count, schemas.avg_properties, schemas.max_properties, schemas.inline_schema_count
    ));
    out.push_str(&format!("- Maximum nesting depth {}.\n", schemas.max_nesting_depth));
    let verdict = match report.complexity_label {
        ComplexityLabel::Low => "A single developer can implement a client or server directly from the document.",
        ComplexityLabel::Moderate => "Implementable by hand, though generated models will save time.",
        ComplexityLabel::High => "Expect to rely on code generation and to hand-fix the generated models.",
        ComplexityLabel::VeryHigh => "Only practical with code generation and a dedicated integration effort.",
    };
    out.push_str(&format!("- {}\n", verdict));
}

fn rest_appropriateness(out: &mut String, report: &ComplexityReport, findings: &Findings) {
    section(out, "REST Architecture Appropriateness");
    let methods: Vec<String> = report
        .operations
        .methods
        .iter()
        .map(|(method, count)| format!("{} {}", method.to_uppercase(), count))
        .collect();
    let breakdown = if methods.is_empty() { "none".to_string() } else { methods.join(", ") };
    out.push_str(&format!(
        "Method mix: {} (POST share {:.0}%).\n\n",
        breakdown,
        report.operations.post_ratio * 100.0
    ));
    if findings.rpc_style {
        out.push_str(
            "The API is RPC-style: nearly every operation is a POST, so HTTP caching, idempotency and resource semantics do not apply.\n",
        );
    } else {
        out.push_str("The method mix is consistent with resource-oriented REST.\n");
    }
}

fn consumer_burden(out: &mut String, report: &ComplexityReport, findings: &Findings) {
    section(out, "Consumer Burden");
    let poly = &report.schemas.polymorphism;
    out.push_str(&format!(
        "- {} union nodes with {} branches in total (largest {}); {} allOf members; {} discriminators.\n",
        poly.counts.union_node_count,
        poly.counts.union_branch_total,
        poly.counts.max_union_branches,
        poly.counts.all_of_count,
        poly.counts.discriminator_count
    ));
    out.push_str(&format!(
        "- {} polymorphic named schemas, referenced {} times.\n",
        poly.polymorphic_schemas.len(),
        poly.polymorphic_ref_count
    ));
    if findings.untagged_polymorphism {
        out.push_str("- Unions carry no discriminator, so consumers must guess the variant from the payload shape.\n");
    }
}

fn integration_risk(out: &mut String, report: &ComplexityReport, findings: &Findings) {
    section(out, "Integration Risk & Vendor Lock-In");
    let schemas = &report.schemas;
    out.push_str(&format!(
        "- {} references to {} distinct schemas.\n",
        schemas.ref_count,
        schemas.distinct_ref_targets.len()
    ));
    if schemas.circular_ref_schemas.is_empty() {
        out.push_str("- No circular schema references.\n");
    } else {
        out.push_str(&format!(
            "- {} schemas take part in reference cycles: {}.\n",
            schemas.circular_ref_count,
            schemas.circular_ref_schemas.join(", ")
        ));
    }
    if findings.tangled_graph {
        out.push_str(
            "- The schema graph is tangled enough that generators differ in how they break cycles, which ties consumers to one toolchain.\n",
        );
    }
}

fn path_forward(out: &mut String, findings: &Findings) {
    section(out, "Recommended Path Forward");
    if !findings.any() {
        out.push_str("- No structural changes needed; keep the document under review as it grows.\n");
        return;
    }
    if findings.rpc_style {
        out.push_str("- Model reads as GET on resources; reserve POST for creation and commands.\n");
    }
    if findings.untagged_polymorphism {
        out.push_str("- Add a `discriminator` to every `oneOf`/`anyOf` that consumers must branch on.\n");
    }
    if findings.tangled_graph {
        out.push_str("- Break reference cycles with identifiers instead of embedded objects and split the schema set by domain.\n");
    }
}

fn waveform_section(out: &mut String, report: &ComplexityReport) {
    section(out, "Waveform Serialization");
    let advisory = &report.waveform_serialization;
    for property in &advisory.properties {
        out.push_str(&format!(
            "- `{}` is an array of `{}` at `{}`.\n",
            property.property, property.item_type, property.address
        ));
    }
    for estimate in &advisory.estimates {
        out.push_str(&format!(
            "- {}: {} bytes per sample in binary vs {} as JSON text, {}.\n",
            estimate.encoding, estimate.bytes_per_sample, estimate.json_bytes_per_sample, estimate.expansion
        ));
    }
    if let Some(recommendation) = &advisory.recommendation {
        out.push_str(&format!("\n{}.\n", recommendation));
    }
}

fn direct_answer(report: &ComplexityReport, findings: &Findings) -> String {
    let mut problems = Vec::new();
    if findings.rpc_style {
        problems.push("it is RPC-style rather than RESTful");
    }
    if findings.untagged_polymorphism {
        problems.push("it relies on untagged polymorphism");
    }
    if findings.tangled_graph {
        problems.push("its schema graph is tangled");
    }

    if problems.is_empty() {
        format!(
            "Yes. At {} complexity the API is reasonable to implement and consume as designed.",
            report.complexity_label
        )
    } else {
        format!(
            "Implementable, but costly: {}. Address these before adding more surface.",
            problems.join(", ")
        )
    }
}
