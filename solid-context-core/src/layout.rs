//! Output path planning: `<domain>/<type>/<sanitised file name>`.

use std::collections::HashSet;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::aggregate::HierarchicalOrganization;
use crate::contract::ClassifiedFile;

static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9._-]").expect("unsafe char pattern is valid"));

/// Lowercases, turns whitespace runs into `-` and drops anything outside
/// `[a-z0-9._-]`.
pub fn sanitize_file_name(name: &str) -> String {
    let lower = name.to_lowercase();
    let dashed = WHITESPACE_RUN.replace_all(&lower, "-");
    UNSAFE_CHARS.replace_all(&dashed, "").into_owned()
}

fn base_name(relative_path: &str) -> &str {
    relative_path.rsplit('/').next().unwrap_or(relative_path)
}

/// `name.md` with suffix 2 becomes `name-2.md`.
fn with_suffix(name: &str, n: usize) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{n}{}", &name[..dot], &name[dot..]),
        _ => format!("{name}-{n}"),
    }
}

/// One output path per file, in file order. Names that collide inside the
/// same directory get `-2`, `-3`, ... before the extension.
pub fn plan_layout(org: &HierarchicalOrganization) -> Vec<(PathBuf, &ClassifiedFile)> {
    let mut taken: HashSet<PathBuf> = HashSet::new();
    org.files()
        .iter()
        .map(|file| {
            let dir = PathBuf::from(file.classification.domain.as_str())
                .join(file.classification.doc_type.as_str());
            let mut name = sanitize_file_name(base_name(file.relative_path()));
            if name.is_empty() {
                name = "untitled".to_string();
            }
            let mut candidate = dir.join(&name);
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = dir.join(with_suffix(&name, n));
                n += 1;
            }
            taken.insert(candidate.clone());
            (candidate, file)
        })
        .collect()
}
