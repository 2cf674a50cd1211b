//! Extracts `/** ... */` documentation blocks from annotated source and
//! reformats them as numbered Markdown sections.

use once_cell::sync::Lazy;
use regex::Regex;

static DOC_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").expect("doc block pattern is valid"));

/// Cleaned text of every non-empty documentation block, in source order.
pub fn doc_blocks(source: &str) -> Vec<String> {
    DOC_BLOCK
        .captures_iter(source)
        .filter_map(|caps| {
            let inner = caps.get(1).map_or("", |m| m.as_str());
            let lines: Vec<&str> = inner
                .split('\n')
                .map(strip_alignment_marker)
                .filter(|line| !line.is_empty())
                .collect();
            (!lines.is_empty()).then(|| lines.join("\n"))
        })
        .collect()
}

/// One `## API Documentation N` section per surviving block, numbered from 1.
/// Empty when the source carries no documentation, which callers treat as a
/// signal to drop the file.
pub fn extract(source: &str) -> String {
    doc_blocks(source)
        .iter()
        .enumerate()
        .map(|(i, block)| format!("## API Documentation {}\n\n{block}\n", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops optional leading whitespace, a single `*` and the space after it.
fn strip_alignment_marker(line: &str) -> &str {
    let line = line.trim_start();
    line.strip_prefix('*').unwrap_or(line).trim()
}
