//! Post-processing: deterministic cleanup of model-generated HTML.
//!
//! Even when told to return a bare fragment, vision models regularly wrap
//! their answer in ` ```html ` fences, emit a full `<!DOCTYPE html>` document
//! with a `<style>` block, or sprinkle inline `style` attributes. The
//! embedding page expects a pure fragment, so these rules strip the wrappers
//! without touching the content tags.
//!
//! ## Rule Order
//!
//! Fences go first (the document wrapper is inside them), line endings are
//! normalised before the per-line passes, and the final-newline pass is last.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules to the raw model output.
///
/// Rules (applied in order):
/// 1. Strip outer code fences
/// 2. Normalise line endings (CRLF → LF)
/// 3. Drop `<!DOCTYPE>`, `<head>…</head>`, `<style>…</style>`, `<script>…</script>`
/// 4. Unwrap `<html>` and `<body>` tags, keeping their content
/// 5. Remove inline `style="…"` attributes
/// 6. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 7. Trim trailing whitespace per line and leading blank lines
/// 8. Collapse runs of blank lines to a single blank line
/// 9. End with exactly one newline (empty stays empty)
pub fn clean_html(input: &str) -> String {
    let s = strip_code_fences(input);
    let s = normalise_line_endings(&s);
    let s = drop_document_blocks(&s);
    let s = unwrap_document_tags(&s);
    let s = remove_inline_styles(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_lines(&s);
    let s = collapse_blank_lines(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Strip outer code fences ──────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```(?:html|HTML)?[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap());

fn strip_code_fences(input: &str) -> String {
    if let Some(caps) = RE_OUTER_FENCES.captures(input.trim()) {
        caps[1].to_string()
    } else {
        input.to_string()
    }
}

// ── Rule 2: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 3: Drop document-level blocks ───────────────────────────────────────

static RE_DOCTYPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<!doctype[^>]*>").unwrap());

static RE_DOCUMENT_BLOCKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?is)<head\b[^>]*>.*?</head\s*>|<style\b[^>]*>.*?</style\s*>|<script\b[^>]*>.*?</script\s*>",
    )
    .unwrap()
});

fn drop_document_blocks(input: &str) -> String {
    let s = RE_DOCTYPE.replace_all(input, "");
    RE_DOCUMENT_BLOCKS.replace_all(&s, "").into_owned()
}

// ── Rule 4: Unwrap <html> / <body> ───────────────────────────────────────────

static RE_WRAPPER_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?(?:html|body)\b[^>]*>").unwrap());

fn unwrap_document_tags(input: &str) -> String {
    RE_WRAPPER_TAGS.replace_all(input, "").into_owned()
}

// ── Rule 5: Remove inline styles ─────────────────────────────────────────────

static RE_STYLE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\s+style\s*=\s*(?:"[^"]*"|'[^']*')"#).unwrap());

fn remove_inline_styles(input: &str) -> String {
    RE_STYLE_ATTR.replace_all(input, "").into_owned()
}

// ── Rule 6: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}'],
        "",
    )
}

// ── Rule 7: Trim trailing whitespace and leading blank lines ────────────────

fn trim_lines(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .skip_while(|l| l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 8: Collapse blank lines ─────────────────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").into_owned()
}

// ── Rule 9: Single final newline ─────────────────────────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_code_fences("```html\n<p>x</p>\n```"), "<p>x</p>");
        assert_eq!(strip_code_fences("```\n<p>x</p>\n```"), "<p>x</p>");
        assert_eq!(strip_code_fences("<p>x</p>"), "<p>x</p>");
    }

    #[test]
    fn test_drop_head_and_style() {
        let input = "<!DOCTYPE html><html><head><title>t</title><style>p{color:red}</style></head><body><p>hi</p></body></html>";
        assert_eq!(clean_html(input), "<p>hi</p>\n");
    }

    #[test]
    fn test_style_block_outside_head() {
        let input = "<style>\nh1 { font-size: 2em }\n</style>\n<h1>Judul</h1>";
        assert_eq!(clean_html(input), "<h1>Judul</h1>\n");
    }

    #[test]
    fn test_script_removed() {
        let input = "<p>a</p><script>alert(1)</script><p>b</p>";
        assert_eq!(clean_html(input), "<p>a</p><p>b</p>\n");
    }

    #[test]
    fn test_inline_style_removed() {
        assert_eq!(
            remove_inline_styles(r#"<p style="margin:0">x</p><td style='a'>y</td>"#),
            "<p>x</p><td>y</td>"
        );
    }

    #[test]
    fn test_body_attributes_unwrapped() {
        assert_eq!(unwrap_document_tags("<BODY class=\"x\"><p>a</p></BODY>"), "<p>a</p>");
    }

    #[test]
    fn test_remove_invisible() {
        assert_eq!(remove_invisible_chars("a\u{200B}b\u{FEFF}c"), "abc");
    }

    #[test]
    fn test_collapse_and_newline() {
        assert_eq!(clean_html("\n\n<p>a</p>\n\n\n\n<p>b</p>   \n\n"), "<p>a</p>\n\n<p>b</p>\n");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert_eq!(clean_html("```html\n\n```"), "");
        assert_eq!(clean_html("   "), "");
    }

    #[test]
    fn test_full_pipeline_crlf_fenced_document() {
        let input = "```html\r\n<html>\r\n<body>\r\n<h1>FAQ</h1>\r\n<p>Apa?</p>\r\n</body>\r\n</html>\r\n```";
        let out = clean_html(input);
        assert_eq!(out, "<h1>FAQ</h1>\n<p>Apa?</p>\n");
    }
}
