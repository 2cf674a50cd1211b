//! Generated navigation documents: the Markdown root index, one JSON index
//! per domain and the `STRUCTURE.md` summary.
//!
//! Generation time is passed in so output is reproducible in tests.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{DomainStats, HierarchicalOrganization};
use crate::classify::CORE_PRIMITIVES;
use crate::contract::{ClassifiedFile, Domain};

pub const ROOT_INDEX_FILE: &str = "index.md";
pub const DOMAIN_INDEX_FILE: &str = "index.json";
pub const STRUCTURE_FILE: &str = "STRUCTURE.md";

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn root_index(org: &HierarchicalOrganization, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# SolidJS Context Knowledge Base\n");
    let _ = writeln!(out, "> Generated at: {}", timestamp(generated_at));
    let _ = writeln!(out, "> Total Files: {}\n", org.total_files());
    let _ = writeln!(out, "## Overview\n");
    let _ = writeln!(
        out,
        "This knowledge base contains processed documentation and source code from the SolidJS ecosystem, optimized for AI agent consumption.\n"
    );
    let _ = writeln!(out, "## Domains\n");

    for (domain, stats) in org.stats() {
        let _ = writeln!(out, "### [{domain}](./{domain}/{DOMAIN_INDEX_FILE})\n");
        let _ = writeln!(out, "- **Total Files**: {}", stats.total);
        let _ = writeln!(out, "- **API References**: {}", stats.api);
        let _ = writeln!(out, "- **Examples**: {}", stats.examples);
        let _ = writeln!(out, "- **Description**: {}\n", domain.description());
    }

    let present: BTreeSet<&str> = org
        .files()
        .iter()
        .filter_map(|f| f.classification.primitive)
        .collect();
    let (covered, missing): (Vec<&str>, Vec<&str>) =
        CORE_PRIMITIVES.iter().copied().partition(|p| present.contains(p));

    let _ = writeln!(out, "## Core Primitives Coverage\n");
    let _ = writeln!(
        out,
        "The following core primitives are documented in this knowledge base:\n"
    );
    let _ = writeln!(
        out,
        "- **Covered ({}/{})**: {}",
        covered.len(),
        CORE_PRIMITIVES.len(),
        covered.join(", ")
    );
    if !missing.is_empty() {
        let _ = writeln!(out, "- **Missing**: {}", missing.join(", "));
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainIndex {
    pub domain: Domain,
    pub generated_at: String,
    pub stats: DomainStats,
    pub description: String,
    pub content: DomainIndexContent,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainIndexContent {
    pub api: Vec<ApiEntry>,
    pub examples: Vec<ExampleEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiEntry {
    pub path: String,
    pub name: String,
    pub repo: String,
    pub primitive: Option<String>,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleEntry {
    pub path: String,
    pub name: String,
    pub repo: String,
    pub summary: String,
}

fn source_name(file: &ClassifiedFile) -> String {
    let source_path = &file.metadata().source_path;
    source_path
        .rsplit('/')
        .next()
        .unwrap_or(source_path)
        .to_string()
}

/// `None` when the domain holds no files.
pub fn domain_index(
    org: &HierarchicalOrganization,
    domain: Domain,
    generated_at: DateTime<Utc>,
) -> Option<DomainIndex> {
    let group = org.group(domain)?;
    let api = org
        .api(domain)
        .map(|f| ApiEntry {
            path: f.relative_path().to_string(),
            name: source_name(f),
            repo: f.metadata().source_repo.clone(),
            primitive: f.classification.primitive.map(str::to_string),
            summary: format!("API documentation for {}", f.metadata().source_path),
        })
        .collect();
    let examples = org
        .examples(domain)
        .map(|f| ExampleEntry {
            path: f.relative_path().to_string(),
            name: source_name(f),
            repo: f.metadata().source_repo.clone(),
            summary: format!("Example/Tutorial for {}", f.metadata().source_path),
        })
        .collect();
    Some(DomainIndex {
        domain,
        generated_at: timestamp(generated_at),
        stats: group.stats(),
        description: format!("Index for {domain} domain"),
        content: DomainIndexContent { api, examples },
    })
}

pub fn domain_indexes(
    org: &HierarchicalOrganization,
    generated_at: DateTime<Utc>,
) -> Vec<DomainIndex> {
    let indexes: Vec<DomainIndex> = org
        .domains()
        .filter_map(|d| domain_index(org, d, generated_at))
        .collect();
    info!(
        domains = ?indexes.iter().map(|i| i.domain.as_str()).collect::<Vec<_>>(),
        "Domain indexes generated"
    );
    indexes
}

/// Per-domain counts plus a sketch of the output tree rooted at `root_name`.
pub fn structure_summary(
    org: &HierarchicalOrganization,
    root_name: &str,
    generated_at: DateTime<Utc>,
) -> String {
    let stats = org.stats();
    let mut out = String::from("# SolidJS Knowledge Base Structure\n\n");
    let _ = writeln!(out, "Generated: {}\n", timestamp(generated_at));
    out.push_str("## Domains\n\n");
    for (domain, s) in &stats {
        let _ = writeln!(out, "### {domain}");
        let _ = writeln!(out, "- API Reference: {} files", s.api);
        let _ = writeln!(out, "- Examples: {} files", s.examples);
        let _ = writeln!(out, "- Total: {} files\n", s.total);
    }
    out.push_str("## Directory Structure\n\n```\n");
    let _ = writeln!(out, "{root_name}/");
    let _ = writeln!(out, "├── {ROOT_INDEX_FILE} (root index)");
    for domain in stats.keys() {
        let _ = writeln!(out, "├── {domain}/");
        let _ = writeln!(out, "│   ├── {DOMAIN_INDEX_FILE} (domain index)");
        let _ = writeln!(out, "│   ├── api/ (API reference files)");
        let _ = writeln!(out, "│   └── examples/ (usage examples)");
    }
    out.push_str("```\n");
    out
}
