//! Domain, type and primitive classification.
//!
//! Domain resolution is an ordered list of [`DomainRule`]s; the first rule
//! that returns a domain wins and the configured default applies when none
//! does:
//!
//! 1. explicit domain already in the metadata
//! 2. repository name table
//! 3. path pattern table (fixed domain order, patterns in list order)
//! 4. file name contains a known primitive
//! 5. annotated source carrying the `@module reactivity` tag
//!
//! Primitive and type resolution are independent of the domain.

use std::collections::BTreeMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error, info, warn};

use crate::config::ClassifyConfig;
use crate::contract::{
    Classification, ClassifiedFile, DocType, Domain, FileKind, TransformedFile, UNKNOWN_DOMAIN,
};
use crate::transform::restamp_header;

/// Recognised core API constructs. Order breaks ties: first match wins.
pub const CORE_PRIMITIVES: [&str; 27] = [
    "createSignal",
    "createEffect",
    "createMemo",
    "createResource",
    "createStore",
    "createContext",
    "createRoot",
    "createRenderEffect",
    "createComputed",
    "createDeferred",
    "createSelector",
    "createReaction",
    "onMount",
    "onCleanup",
    "untrack",
    "batch",
    "splitProps",
    "mergeProps",
    "Show",
    "Switch",
    "Match",
    "For",
    "Index",
    "ErrorBoundary",
    "Suspense",
    "Dynamic",
    "Portal",
];

pub const REACTIVITY_MODULE_MARKER: &str = "@module reactivity";

/// Repository name to domain, before configuration overrides.
pub const DEFAULT_REPO_DOMAINS: [(&str, Domain); 3] = [
    ("solid-router", Domain::Routing),
    ("solid-start", Domain::Ssr),
    ("signals", Domain::CoreReactivity),
];

const DOMAIN_PATTERN_SOURCES: [(Domain, &[&str]); 4] = [
    (
        Domain::CoreReactivity,
        &["reactivity", "signal", "effect", "memo", "resource", "store", "batch", "untrack"],
    ),
    (Domain::Routing, &["router", "route", "navigation", "link"]),
    (Domain::Ssr, &["ssr", "server", "render", "hydrate"]),
    (Domain::Primitives, &["primitive", "utility", "helper"]),
];

static DOMAIN_PATTERNS: Lazy<Vec<(Domain, Vec<Regex>)>> = Lazy::new(|| {
    DOMAIN_PATTERN_SOURCES
        .iter()
        .map(|(domain, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).expect("domain pattern is valid"))
                .collect();
            (*domain, compiled)
        })
        .collect()
});

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassifyError {
    #[error("source path has no usable file name: {0}")]
    MissingFileName(PathBuf),
}

type ResolveDomain = fn(&Classifier, &TransformedFile) -> Result<Option<Domain>, ClassifyError>;

/// One step of domain resolution.
pub struct DomainRule {
    pub name: &'static str,
    resolve: ResolveDomain,
}

impl DomainRule {
    pub fn apply(
        &self,
        classifier: &Classifier,
        file: &TransformedFile,
    ) -> Result<Option<Domain>, ClassifyError> {
        (self.resolve)(classifier, file)
    }
}

pub const DOMAIN_RULES: [DomainRule; 5] = [
    DomainRule {
        name: "explicit-metadata",
        resolve: explicit_domain,
    },
    DomainRule {
        name: "repository",
        resolve: repository_domain,
    },
    DomainRule {
        name: "path-pattern",
        resolve: path_pattern_domain,
    },
    DomainRule {
        name: "file-name-primitive",
        resolve: file_name_primitive_domain,
    },
    DomainRule {
        name: "module-marker",
        resolve: module_marker_domain,
    },
];

fn explicit_domain(
    _: &Classifier,
    file: &TransformedFile,
) -> Result<Option<Domain>, ClassifyError> {
    let declared = file.metadata.domain.as_str();
    if declared.is_empty() || declared == UNKNOWN_DOMAIN {
        return Ok(None);
    }
    match declared.parse() {
        Ok(domain) => Ok(Some(domain)),
        Err(e) => {
            warn!(file = %file.descriptor.relative_path, error = %e, "Ignoring unrecognised explicit domain");
            Ok(None)
        }
    }
}

fn repository_domain(
    classifier: &Classifier,
    file: &TransformedFile,
) -> Result<Option<Domain>, ClassifyError> {
    Ok(classifier.repo_domains.get(&file.descriptor.repo_name).copied())
}

fn path_pattern_domain(
    _: &Classifier,
    file: &TransformedFile,
) -> Result<Option<Domain>, ClassifyError> {
    let path = file.descriptor.relative_path.to_lowercase();
    Ok(DOMAIN_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(&path)))
        .map(|(domain, _)| *domain))
}

fn file_name_primitive_domain(
    _: &Classifier,
    file: &TransformedFile,
) -> Result<Option<Domain>, ClassifyError> {
    let name = file_name(file)?;
    Ok(CORE_PRIMITIVES
        .iter()
        .any(|p| name.contains(p))
        .then_some(Domain::CoreReactivity))
}

fn module_marker_domain(
    _: &Classifier,
    file: &TransformedFile,
) -> Result<Option<Domain>, ClassifyError> {
    let tagged = file.descriptor.kind == FileKind::AnnotatedSource
        && file.content.contains(REACTIVITY_MODULE_MARKER);
    Ok(tagged.then_some(Domain::CoreReactivity))
}

fn file_name(file: &TransformedFile) -> Result<&str, ClassifyError> {
    file.descriptor
        .file_name()
        .ok_or_else(|| ClassifyError::MissingFileName(file.descriptor.absolute_path.clone()))
}

/// "examples" for tutorial and guide paths, "api" otherwise.
pub fn resolve_type(relative_path: &str) -> DocType {
    if relative_path.contains("tutorial") || relative_path.contains("guide") {
        DocType::Examples
    } else {
        DocType::Api
    }
}

/// Outcome of classifying one file. `fallback` carries the cause when the
/// default classification had to be used.
#[derive(Debug)]
pub struct Classified {
    pub file: ClassifiedFile,
    pub fallback: Option<ClassifyError>,
}

pub struct Classifier {
    repo_domains: BTreeMap<String, Domain>,
    default_domain: Domain,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(&ClassifyConfig::default())
    }
}

impl Classifier {
    /// Built-in repository table overlaid with the configured entries.
    pub fn new(config: &ClassifyConfig) -> Self {
        let mut repo_domains: BTreeMap<String, Domain> = DEFAULT_REPO_DOMAINS
            .iter()
            .map(|(repo, domain)| (repo.to_string(), *domain))
            .collect();
        repo_domains.extend(config.repo_domains.iter().map(|(k, v)| (k.clone(), *v)));
        Self {
            repo_domains,
            default_domain: config.default_domain,
        }
    }

    pub fn default_domain(&self) -> Domain {
        self.default_domain
    }

    pub fn resolve_domain(&self, file: &TransformedFile) -> Result<Domain, ClassifyError> {
        for rule in &DOMAIN_RULES {
            if let Some(domain) = rule.apply(self, file)? {
                debug!(file = %file.descriptor.relative_path, rule = rule.name, %domain, "Domain resolved");
                return Ok(domain);
            }
        }
        Ok(self.default_domain)
    }

    /// First vocabulary entry named by the file name or declared as an
    /// exported function/const in the content.
    pub fn resolve_primitive(
        &self,
        file: &TransformedFile,
    ) -> Result<Option<&'static str>, ClassifyError> {
        let name = file_name(file)?;
        Ok(CORE_PRIMITIVES.iter().copied().find(|p| {
            name.contains(p)
                || file.content.contains(&format!("export function {p}"))
                || file.content.contains(&format!("export const {p}"))
        }))
    }

    fn try_classify(&self, file: &TransformedFile) -> Result<Classification, ClassifyError> {
        Ok(Classification {
            domain: self.resolve_domain(file)?,
            doc_type: resolve_type(&file.descriptor.relative_path),
            primitive: self.resolve_primitive(file)?,
        })
    }

    /// Never fails: an internal error yields the default domain, "api" and no
    /// primitive.
    pub fn classify(&self, file: TransformedFile) -> Classified {
        match self.try_classify(&file) {
            Ok(classification) => Classified {
                file: finish(file, classification),
                fallback: None,
            },
            Err(e) => {
                error!(file = %file.descriptor.relative_path, error = %e, "Failed to classify file");
                let classification = Classification {
                    domain: self.default_domain,
                    doc_type: DocType::Api,
                    primitive: None,
                };
                Classified {
                    file: finish(file, classification),
                    fallback: Some(e),
                }
            }
        }
    }
}

/// Records the classification in the metadata and re-stamps the header.
fn finish(mut file: TransformedFile, classification: Classification) -> ClassifiedFile {
    file.metadata.domain = classification.domain.to_string();
    file.metadata.primitive = classification.primitive.map(str::to_string);
    file.content = restamp_header(&file.content, &file.metadata);
    ClassifiedFile {
        file,
        classification,
    }
}

#[derive(Debug, Default)]
pub struct ClassifyBatch {
    pub files: Vec<ClassifiedFile>,
    pub fallbacks: usize,
}

pub fn classify_all(classifier: &Classifier, files: Vec<TransformedFile>) -> ClassifyBatch {
    info!(total_files = files.len(), "Starting file classification");
    let mut batch = ClassifyBatch::default();
    let mut per_domain: BTreeMap<Domain, usize> = BTreeMap::new();
    for file in files {
        let classified = classifier.classify(file);
        if classified.fallback.is_some() {
            batch.fallbacks += 1;
        }
        *per_domain
            .entry(classified.file.classification.domain)
            .or_default() += 1;
        batch.files.push(classified.file);
    }
    info!(stats = ?per_domain, fallbacks = batch.fallbacks, "File classification complete");
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FileDescriptor, Metadata};
    use crate::frontmatter::{decode, FieldValue};
    use crate::transform::stamp_header;
    use chrono::Utc;

    fn transformed(rel: &str, content: &str) -> TransformedFile {
        let descriptor = FileDescriptor::new(format!("/raw/{rel}"), rel).unwrap();
        let metadata = Metadata::new(&descriptor, Utc::now());
        TransformedFile {
            content: stamp_header(content, &metadata),
            descriptor,
            metadata,
        }
    }

    #[test]
    fn repository_rule_assigns_signals_to_core_reactivity() {
        let file = transformed(
            "signals/src/core/effect.ts",
            "## API Documentation 1\n\nEffects are the leaf nodes...\n",
        );
        let classified = Classifier::default().classify(file);
        assert!(classified.fallback.is_none());
        let c = classified.file.classification;
        assert_eq!(c.domain, Domain::CoreReactivity);
        assert_eq!(c.doc_type, DocType::Api);
        assert_eq!(c.primitive, None);
    }

    #[test]
    fn repository_rule_beats_path_patterns() {
        let file = transformed("solid-start/src/router/FileRoutes.md", "# Routes");
        let c = Classifier::default().classify(file).file.classification;
        assert_eq!(c.domain, Domain::Ssr);
    }

    #[test]
    fn explicit_domain_beats_repository() {
        let mut file = transformed("signals/docs/intro.md", "# Intro");
        file.metadata.domain = "routing".into();
        assert_eq!(
            Classifier::default().resolve_domain(&file).unwrap(),
            Domain::Routing
        );
    }

    #[test]
    fn unrecognised_explicit_domain_falls_through() {
        let mut file = transformed("signals/docs/intro.md", "# Intro");
        file.metadata.domain = "testing".into();
        assert_eq!(explicit_domain(&Classifier::default(), &file).unwrap(), None);
        assert_eq!(
            Classifier::default().resolve_domain(&file).unwrap(),
            Domain::CoreReactivity
        );
    }

    #[test]
    fn path_patterns_are_scanned_in_domain_order() {
        let c = Classifier::default();
        // "store" (core-reactivity) is scanned before "server" (ssr).
        let file = transformed("solid/packages/server/store.md", "x");
        assert_eq!(c.resolve_domain(&file).unwrap(), Domain::CoreReactivity);

        let file = transformed("solid-docs/src/Navigation/Overview.md", "x");
        assert_eq!(c.resolve_domain(&file).unwrap(), Domain::Routing);

        let file = transformed("solid/packages/solid/web/Hydrate.md", "x");
        assert_eq!(c.resolve_domain(&file).unwrap(), Domain::Ssr);
    }

    #[test]
    fn file_name_primitive_maps_to_core_reactivity() {
        let file = transformed("solid/packages/solid/src/onMount.md", "x");
        assert_eq!(
            file_name_primitive_domain(&Classifier::default(), &file).unwrap(),
            Some(Domain::CoreReactivity)
        );
    }

    #[test]
    fn module_marker_only_counts_for_annotated_source() {
        let c = Classifier::default();
        let ts = transformed("solid/packages/solid/src/core.ts", "@module reactivity");
        assert_eq!(c.resolve_domain(&ts).unwrap(), Domain::CoreReactivity);

        let md = transformed("solid/packages/solid/docs/core.md", "@module reactivity");
        assert_eq!(c.resolve_domain(&md).unwrap(), Domain::Primitives);
    }

    #[test]
    fn tutorial_paths_are_examples_under_the_default_domain() {
        let file = transformed("templates/tutorial/getting-started.md", "# Start");
        let c = Classifier::default().classify(file).file.classification;
        assert_eq!(c.domain, Domain::Primitives);
        assert_eq!(c.doc_type, DocType::Examples);
    }

    #[test]
    fn configured_default_domain_is_used() {
        let config = ClassifyConfig {
            default_domain: Domain::Ssr,
            ..ClassifyConfig::default()
        };
        let file = transformed("templates/tutorial/getting-started.md", "# Start");
        assert_eq!(Classifier::new(&config).resolve_domain(&file).unwrap(), Domain::Ssr);
    }

    #[test]
    fn configured_repo_domains_extend_the_table() {
        let mut config = ClassifyConfig::default();
        config.repo_domains.insert("templates".into(), Domain::Routing);
        let file = transformed("templates/tutorial/getting-started.md", "# Start");
        assert_eq!(Classifier::new(&config).resolve_domain(&file).unwrap(), Domain::Routing);
    }

    #[test]
    fn primitive_from_export_and_vocabulary_order() {
        let c = Classifier::default();
        let file = transformed(
            "solid/packages/solid/src/reactive.md",
            "export function createMemo() {}\nexport const createSignal = () => {}",
        );
        assert_eq!(c.resolve_primitive(&file).unwrap(), Some("createSignal"));

        let file = transformed("solid/docs/createResource.md", "# Resource");
        assert_eq!(c.resolve_primitive(&file).unwrap(), Some("createResource"));
    }

    #[test]
    fn classification_restamps_header_with_domain_and_primitive() {
        let file = transformed("solid/docs/createStore.md", "# Stores");
        let classified = Classifier::default().classify(file).file;
        assert_eq!(classified.metadata().domain, "core-reactivity");
        let header = decode(classified.content()).header.unwrap();
        assert_eq!(
            header.get("domain").and_then(FieldValue::as_str),
            Some("core-reactivity")
        );
        assert_eq!(
            header.get("primitive").and_then(FieldValue::as_str),
            Some("createStore")
        );
        assert!(classified.content().ends_with("---\n\n# Stores"));
    }

    #[test]
    fn classification_keeps_leading_blank_lines_of_body() {
        let file = transformed("solid-router/docs/guide.md", "\n\n# Guide\n");
        let classified = Classifier::default().classify(file).file;
        let (_, body) = classified.content().split_once("---\n\n").unwrap();
        assert_eq!(body, "\n\n# Guide\n");
    }

    #[test]
    fn missing_file_name_yields_fallback() {
        let mut file = transformed("solid/docs/guide.md", "# Guide");
        file.descriptor.absolute_path = PathBuf::from("/");
        let classified = Classifier::default().classify(file);
        assert!(matches!(
            classified.fallback,
            Some(ClassifyError::MissingFileName(_))
        ));
        let c = classified.file.classification;
        assert_eq!(c.domain, Domain::Primitives);
        assert_eq!(c.doc_type, DocType::Api);
        assert_eq!(c.primitive, None);
    }

    #[test]
    fn every_file_gets_a_domain_and_type() {
        let paths = [
            "solid/README.md",
            "solid-docs/src/routes/index.mdx",
            "vite-plugin-solid/src/index.ts",
            "x/y/z.md",
        ];
        let files = paths.iter().map(|p| transformed(p, "text")).collect();
        let batch = classify_all(&Classifier::default(), files);
        assert_eq!(batch.files.len(), paths.len());
        assert_eq!(batch.fallbacks, 0);
        for f in &batch.files {
            assert!(Domain::ALL.contains(&f.classification.domain));
        }
    }
}
