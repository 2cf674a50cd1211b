//! MDX to plain Markdown by pattern stripping.
//!
//! Component markup (tags whose name starts with an uppercase letter) is
//! removed together with everything between an opening tag and the first
//! closing component tag that follows it. This is a greedy span strip, not a
//! balanced parse: nested components lose their inner text and an outer
//! closing tag can be left behind. Generic `div`/`span` wrappers are unwrapped
//! and their text kept.

use once_cell::sync::Lazy;
use regex::Regex;

static SELF_CLOSING_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[A-Z][a-zA-Z0-9]*[^>]*/>").expect("self-closing component pattern is valid")
});

static PAIRED_COMPONENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<[A-Z][a-zA-Z0-9]*[^>]*>.*?</[A-Z][a-zA-Z0-9]*>")
        .expect("paired component pattern is valid")
});

static CONTAINER_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<div[^>]*>|</div>|<span[^>]*>|</span>").expect("container tag pattern is valid")
});

static EXCESS_BLANK_LINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("blank line pattern is valid"));

/// Reduces MDX-flavoured Markdown to plain Markdown.
///
/// Passes are repeated until the text stops changing, so stripping one tag
/// can never expose another that survives: `normalize(normalize(x)) ==
/// normalize(x)`.
pub fn normalize(mdx: &str) -> String {
    let mut current = strip_once(mdx);
    loop {
        let next = strip_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_once(text: &str) -> String {
    let text = SELF_CLOSING_COMPONENT.replace_all(text, "");
    let text = PAIRED_COMPONENT.replace_all(&text, "");
    let text = CONTAINER_TAG.replace_all(&text, "");
    let text = EXCESS_BLANK_LINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_self_closing_components() {
        let input = "# Signals\n\n<EditPageLink />\n\nText <Badge label=\"new\"/> here.";
        assert_eq!(normalize(input), "# Signals\n\nText  here.");
    }

    #[test]
    fn removes_paired_components_with_their_content() {
        let input = "Intro\n<Callout type=\"info\">\nDo **not** read.\n</Callout>\nOutro";
        assert_eq!(normalize(input), "Intro\n\nOutro");
    }

    #[test]
    fn nested_components_are_stripped_bluntly() {
        let input = "<Tabs><Tab>a</Tab><Tab>b</Tab></Tabs> tail";
        assert_eq!(normalize(input), "</Tabs> tail");
    }

    #[test]
    fn unwraps_div_and_span_keeping_text() {
        let input = "<div class=\"note\">Keep <span style=\"x\">this</span></div>";
        assert_eq!(normalize(input), "Keep this");
    }

    #[test]
    fn lowercase_html_is_left_alone() {
        let input = "<details><summary>More</summary>body</details>";
        assert_eq!(normalize(input), input);
    }

    #[test]
    fn collapses_runs_of_blank_lines_and_trims() {
        let input = "\n\n# A\n\n\n\n\nB\n\n\n";
        assert_eq!(normalize(input), "# A\n\nB");
    }

    #[test]
    fn is_idempotent_when_stripping_exposes_new_markup() {
        let inputs = [
            "<<Foo/>Bar/> text",
            "<di<span>v>x</div>",
            "a\n\n<Note />\n\nb\n\n\n<div>\n\n\n</div>c",
            "plain markdown only",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input {input:?}");
        }
    }
}
