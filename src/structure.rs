//! Heuristic plain-text → HTML structuring.
//!
//! OCR engines and PDF text layers return a flat run of lines with no markup.
//! This module guesses the structure from the *shape* of each line alone:
//! upper-case short lines become `<h1>`, title-case lines become `<h2>`,
//! `1.` / `a)` / `-` prefixes become list items, everything else is a
//! paragraph. It is a best-effort classifier, not a parser: tags are inferred,
//! so feeding the output (stripped of tags) back in is not guaranteed to
//! reproduce it.
//!
//! ## Rule order
//!
//! Each non-blank, trimmed line is tested against [`RULES`] in order and the
//! first match wins:
//!
//! | # | Rule | Emits |
//! |---|------|-------|
//! | 1 | all upper-case, < 6 words | `<h1>` (captures FAQ title) |
//! | 2 | title case, < 8 words | `<h2>` (+ `<h3>` for SOP titles) |
//! | 3 | `12. text` | `<ol>` item |
//! | 4 | `a) text`, `- text`, `• text`, `* text` | `<ul>` item |
//! | 5 | FAQ section active and ends with `?` | question + bold restatement |
//! | 6 | anything else | `<p>` |
//!
//! The running state (which list is open, the captured FAQ title) lives in
//! [`Structurer`], which is folded over the line sequence. Closing a list is
//! a single transition in [`Structurer::push_line`], so an `<ol>`/`<ul>` is
//! always closed exactly once.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bold restatement emitted after every question line inside an FAQ section.
pub const FAQ_RESTATEMENT_PREFIX: &str = "Berikut ini adalah";

/// Sub-headings containing this phrase are repeated as an `<h3>`.
pub const SOP_PHRASE: &str = "Standard Operating Procedure";

const MAX_H1_WORDS: usize = 6;
const MAX_H2_WORDS: usize = 8;

static RE_ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s").unwrap());

static RE_UNORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[a-z]\)|[-•*]\s)").unwrap());

/// Convert extracted plain text into an HTML fragment.
///
/// Never fails: a line that matches no specific rule becomes a paragraph.
/// The fragment contains only `h1 h2 h3 p ol ul li strong br` tags, one
/// element per line, and ends with a newline unless it is empty.
///
/// ```
/// use edgequake_pdf2html::structure_text;
///
/// assert_eq!(structure_text("HELLO WORLD"), "<h1>HELLO WORLD</h1>\n");
/// assert_eq!(structure_text("- item"), "<ul>\n  <li>item</li>\n</ul>\n");
/// assert_eq!(structure_text("\n   \n"), "");
/// ```
pub fn structure_text(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .fold(Structurer::default(), |mut s, line| {
            s.push_line(line);
            s
        })
        .finish()
}

/// The kind of list currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

/// Classification of a single trimmed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Top-level heading; `faq` is set when the text mentions FAQ.
    Heading { faq: bool },
    /// Sub-heading; `sop` is set when it also needs an `<h3>`.
    SubHeading { sop: bool },
    /// List item with its prefix stripped.
    ListItem { list: ListKind, body: &'a str },
    /// Question inside an FAQ section.
    FaqQuestion,
    Paragraph,
}

/// Rule predicate: returns the classification if the rule applies.
type Rule = for<'a> fn(&'a str, bool) -> Option<LineKind<'a>>;

/// Classification rules in priority order.
const RULES: [Rule; 6] = [
    heading_rule,
    sub_heading_rule,
    ordered_item_rule,
    unordered_item_rule,
    faq_question_rule,
    paragraph_rule,
];

/// Classify one trimmed, non-empty line.
///
/// `faq_active` reports whether an FAQ heading has been seen earlier in the
/// document.
pub fn classify(line: &str, faq_active: bool) -> LineKind<'_> {
    RULES
        .iter()
        .find_map(|rule| rule(line, faq_active))
        .unwrap_or(LineKind::Paragraph)
}

fn heading_rule<'a>(line: &'a str, _faq_active: bool) -> Option<LineKind<'a>> {
    (is_upper(line) && word_count(line) < MAX_H1_WORDS).then(|| LineKind::Heading {
        faq: line.to_uppercase().contains("FAQ"),
    })
}

fn sub_heading_rule<'a>(line: &'a str, _faq_active: bool) -> Option<LineKind<'a>> {
    (is_title(line) && word_count(line) < MAX_H2_WORDS).then(|| LineKind::SubHeading {
        sop: line.contains(SOP_PHRASE),
    })
}

fn ordered_item_rule<'a>(line: &'a str, _faq_active: bool) -> Option<LineKind<'a>> {
    RE_ORDERED_ITEM.find(line).map(|m| LineKind::ListItem {
        list: ListKind::Ordered,
        body: line[m.end()..].trim_start(),
    })
}

fn unordered_item_rule<'a>(line: &'a str, _faq_active: bool) -> Option<LineKind<'a>> {
    RE_UNORDERED_ITEM.find(line).map(|m| LineKind::ListItem {
        list: ListKind::Unordered,
        body: line[m.end()..].trim_start(),
    })
}

fn faq_question_rule<'a>(line: &'a str, faq_active: bool) -> Option<LineKind<'a>> {
    (faq_active && line.ends_with('?')).then_some(LineKind::FaqQuestion)
}

fn paragraph_rule<'a>(_line: &'a str, _faq_active: bool) -> Option<LineKind<'a>> {
    Some(LineKind::Paragraph)
}

/// Running state of one structuring pass.
///
/// Local to a single call of [`structure_text`]; nothing carries over
/// between documents.
#[derive(Debug, Default)]
pub struct Structurer {
    open_list: Option<ListKind>,
    /// Heading text of the FAQ section. Once set it is never cleared, so later
    /// non-FAQ headings keep the restatement behaviour alive.
    faq_title: Option<String>,
    html: String,
}

impl Structurer {
    /// Classify and emit one trimmed, non-empty line.
    pub fn push_line(&mut self, line: &str) {
        let kind = classify(line, self.faq_title.is_some());

        let wanted = match kind {
            LineKind::ListItem { list, .. } => Some(list),
            _ => None,
        };
        if self.open_list != wanted {
            self.close_list();
            if let Some(list) = wanted {
                self.html.push('<');
                self.html.push_str(list.tag());
                self.html.push_str(">\n");
                self.open_list = Some(list);
            }
        }

        let text = escape_html(line);
        match kind {
            LineKind::Heading { faq } => {
                self.html.push_str(&format!("<h1>{text}</h1>\n"));
                if faq {
                    self.faq_title = Some(text);
                }
            }
            LineKind::SubHeading { sop } => {
                self.html.push_str(&format!("<h2>{text}</h2>\n"));
                if sop {
                    self.html.push_str(&format!("<h3>{text}</h3>\n"));
                }
            }
            LineKind::ListItem { body, .. } => {
                self.html
                    .push_str(&format!("  <li>{}</li>\n", escape_html(body)));
            }
            LineKind::FaqQuestion => {
                let title = self.faq_title.as_deref().unwrap_or_default();
                self.html.push_str(&format!(
                    "{text}<br>\n<strong>{FAQ_RESTATEMENT_PREFIX} {title}</strong>\n"
                ));
            }
            LineKind::Paragraph => {
                self.html.push_str(&format!("<p>{text}</p>\n"));
            }
        }
    }

    /// Close any open list and return the fragment.
    pub fn finish(mut self) -> String {
        self.close_list();
        self.html
    }

    fn close_list(&mut self) {
        if let Some(list) = self.open_list.take() {
            self.html.push_str("</");
            self.html.push_str(list.tag());
            self.html.push_str(">\n");
        }
    }
}

// ── Line-shape predicates ────────────────────────────────────────────────

fn word_count(line: &str) -> usize {
    line.split_whitespace().count()
}

/// At least one cased letter and no lower-case letters.
fn is_upper(line: &str) -> bool {
    line.chars().any(char::is_uppercase) && !line.chars().any(char::is_lowercase)
}

/// Title case in the `str.istitle` sense: every run of letters starts with
/// a capital followed only by lower-case letters, and there is at least one
/// letter ("McDonald", "HELLO", "Hello world" fail). Leading digits or
/// punctuation are fine, but a line shaped like a list item never counts.
fn is_title(line: &str) -> bool {
    if RE_ORDERED_ITEM.is_match(line) || RE_UNORDERED_ITEM.is_match(line) {
        return false;
    }
    let mut prev_cased = false;
    let mut any_cased = false;
    for c in line.chars() {
        if c.is_uppercase() {
            if prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else if c.is_lowercase() {
            if !prev_cased {
                return false;
            }
            prev_cased = true;
            any_cased = true;
        } else {
            prev_cased = false;
        }
    }
    any_cased
}

/// Escape the characters that would otherwise open markup.
pub(crate) fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
