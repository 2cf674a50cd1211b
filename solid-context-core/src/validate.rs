//! Post-aggregation checks: primitive coverage and basic output quality.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::aggregate::HierarchicalOrganization;
use crate::classify::CORE_PRIMITIVES;

const MAX_REPORTED_ISSUES: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletenessReport {
    pub total: usize,
    pub found: usize,
    pub missing: usize,
    /// Percentage with two decimals, e.g. `"85.19%"`.
    pub coverage: String,
    pub found_primitives: Vec<&'static str>,
    pub missing_primitives: Vec<&'static str>,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub total_files: usize,
    pub domains: usize,
    pub files_without_metadata: usize,
    pub files_without_content: usize,
    /// First few issues only; see `total_issues`.
    pub issues: Vec<String>,
    pub total_issues: usize,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub completeness: CompletenessReport,
    pub quality: QualityReport,
    pub passed: bool,
}

/// A primitive counts as found when it is some file's classified primitive
/// or is mentioned anywhere in some file's content.
pub fn validate_completeness(org: &HierarchicalOrganization) -> CompletenessReport {
    let mut found: BTreeSet<&'static str> = BTreeSet::new();
    for file in org.files() {
        if let Some(p) = file.classification.primitive {
            found.insert(p);
        }
        found.extend(CORE_PRIMITIVES.iter().filter(|p| file.content().contains(**p)));
    }
    let missing_primitives: Vec<&'static str> = {
        let mut m: Vec<_> = CORE_PRIMITIVES
            .iter()
            .copied()
            .filter(|p| !found.contains(p))
            .collect();
        m.sort_unstable();
        m
    };
    let coverage = found.len() as f64 / CORE_PRIMITIVES.len() as f64 * 100.0;

    let report = CompletenessReport {
        total: CORE_PRIMITIVES.len(),
        found: found.len(),
        missing: missing_primitives.len(),
        coverage: format!("{coverage:.2}%"),
        found_primitives: found.into_iter().collect(),
        passed: missing_primitives.is_empty(),
        missing_primitives,
    };
    info!(
        coverage = %report.coverage,
        found = report.found,
        missing = report.missing,
        passed = report.passed,
        "Completeness validation complete"
    );
    if !report.passed {
        warn!(missing_primitives = ?report.missing_primitives, "Missing core primitives");
    }
    report
}

pub fn validate_quality(org: &HierarchicalOrganization) -> QualityReport {
    let mut issues = Vec::new();
    let mut without_metadata = 0;
    let mut without_content = 0;

    for file in org.files() {
        let meta = file.metadata();
        if meta.source_repo.is_empty() || meta.source_path.is_empty() {
            without_metadata += 1;
            issues.push(format!("File missing metadata: {}", file.relative_path()));
        }
    }

    let domains = org.domains().count();
    if domains == 0 {
        issues.push("No domains found".to_string());
    }

    for file in org.files() {
        if file.content().trim().is_empty() {
            without_content += 1;
            issues.push(format!("File has no content: {}", file.relative_path()));
        }
    }

    let total_issues = issues.len();
    issues.truncate(MAX_REPORTED_ISSUES);
    let report = QualityReport {
        total_files: org.total_files(),
        domains,
        files_without_metadata: without_metadata,
        files_without_content: without_content,
        issues,
        total_issues,
        passed: total_issues == 0,
    };
    info!(
        total_files = report.total_files,
        domains = report.domains,
        issues = report.total_issues,
        passed = report.passed,
        "Output quality validation complete"
    );
    if !report.passed {
        warn!(count = report.total_issues, sample = ?report.issues, "Quality issues found");
    }
    report
}

pub fn validate(org: &HierarchicalOrganization) -> ValidationReport {
    info!("Running comprehensive validation");
    let completeness = validate_completeness(org);
    let quality = validate_quality(org);
    let passed = completeness.passed && quality.passed;
    if passed {
        info!("All validations passed");
    } else {
        error!(
            completeness = completeness.passed,
            quality = quality.passed,
            "Validation failed"
        );
    }
    ValidationReport {
        completeness,
        quality,
        passed,
    }
}
