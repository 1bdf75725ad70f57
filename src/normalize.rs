//! Markdown normalisation pipeline.
//!
//! Upstream documentation is human-authored and carries several historical
//! conventions the translation step cannot be trusted with: indentation-based
//! code blocks, three different callout spellings, unclosed `<img>` tags and
//! stray `<style>` regions. [`normalize`] rewrites a document into one
//! canonical form before it is handed to the translator.
//!
//! Every function here is a pure, total transform over in-memory text. There
//! is no I/O, no shared state across invocations, and no failure mode beyond
//! odd input producing odd (but well-formed) output. Tab-indented code blocks
//! are not recognised; the upstream docs use four-space indentation only.

use regex::{NoExpand, Regex};
use std::sync::LazyLock;

/// Indentation prefix that marks a line as part of an indented code block.
const INDENT_PREFIX: &str = "    ";

/// Returns true if the line is a markdown list item.
///
/// Recognises `- `, `* ` and `+ ` bullets as well as ordinal markers such as
/// `1. ` or `10. `, where everything before the first `. ` must be digits.
/// The ordinal check is what separates `10. Item` (a list) from an indented
/// paragraph that merely contains a dot.
pub fn is_list_item(line: &str) -> bool {
    let stripped = line.trim_start();
    if stripped.starts_with("- ") || stripped.starts_with("* ") || stripped.starts_with("+ ") {
        return true;
    }
    if let Some(dot) = stripped.find(". ") {
        if dot > 0 && stripped[..dot].chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
    }
    false
}

/// Scanner mode for [`convert_indented_code_blocks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Ordinary prose.
    Normal,
    /// Inside a pre-existing backtick fence; lines pass through untouched.
    InFence,
    /// Inside a synthesized fence opened for an indented code block.
    InIndented,
}

/// True if an indented line at `i` may open a code block: the previous line
/// must be absent, blank, or ordinary non-indented prose. Indentation after a
/// list item is a list continuation, not code.
fn opens_code_block(lines: &[&str], i: usize) -> bool {
    if i == 0 {
        return true;
    }
    let prev = lines[i - 1];
    prev.trim().is_empty() || (!prev.starts_with(INDENT_PREFIX) && !is_list_item(prev))
}

/// Converts indentation-delimited code blocks into fenced code blocks.
///
/// Synthesized fences are bare ` ``` ` lines with no language tag, and the
/// four-space prefix is stripped from every line inside the block.
/// Pre-existing fenced blocks pass through unmodified, including unterminated
/// ones. Blank lines inside an indented block only end it when the following
/// line is not indented code (one-line lookahead), so a block interrupted by
/// an empty line stays a single fence.
pub fn convert_indented_code_blocks(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    let mut state = ScanState::Normal;

    for (i, &line) in lines.iter().enumerate() {
        // Backtick fence lines toggle passthrough, closing any synthesized
        // fence still open.
        if line.trim_start().starts_with("```") {
            if state == ScanState::InIndented {
                out.push("```".to_string());
            }
            state = if state == ScanState::InFence {
                ScanState::Normal
            } else {
                ScanState::InFence
            };
            out.push(line.to_string());
            continue;
        }
        if state == ScanState::InFence {
            out.push(line.to_string());
            continue;
        }

        let indented = line.starts_with(INDENT_PREFIX);
        let blank = line.trim().is_empty();

        if state == ScanState::Normal {
            if indented && !is_list_item(line) && opens_code_block(&lines, i) {
                state = ScanState::InIndented;
                out.push("```".to_string());
                out.push(line[INDENT_PREFIX.len()..].to_string());
            } else {
                out.push(line.to_string());
            }
        } else {
            // ScanState::InIndented
            if indented {
                out.push(line[INDENT_PREFIX.len()..].to_string());
            } else if blank {
                let resumes = lines
                    .get(i + 1)
                    .is_some_and(|next| next.starts_with(INDENT_PREFIX) && !is_list_item(next));
                if resumes {
                    out.push(String::new());
                } else {
                    out.push("```".to_string());
                    state = ScanState::Normal;
                    out.push(line.to_string());
                }
            } else {
                out.push("```".to_string());
                state = ScanState::Normal;
                out.push(line.to_string());
            }
        }
    }

    if state == ScanState::InIndented {
        out.push("```".to_string());
    }
    out.join("\n")
}

static STYLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style.*?>.*?</style>").expect("valid style tag regex"));

/// Deletes every `<style>...</style>` region including its contents.
/// Case-insensitive and spanning newlines; the shortest span per opening tag
/// is removed so unrelated regions are never swallowed together.
pub fn remove_style_tags(content: &str) -> String {
    STYLE_TAG.replace_all(content, "").into_owned()
}

static IMG_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img([^>]*)>").expect("valid img tag regex"));

/// Rewrites `<img ...>` tags into self-closing `<img ... />` form.
/// Tags already self-closed are left unchanged. Unclosed image tags break
/// MDX builds downstream.
pub fn fix_unclosed_img_tags(content: &str) -> String {
    IMG_TAG
        .replace_all(content, |caps: &regex::Captures<'_>| {
            let attrs = &caps[1];
            if attrs.ends_with('/') {
                caps[0].to_string()
            } else {
                format!("<img{attrs} />")
            }
        })
        .into_owned()
}

static TITLE_BRACES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(#+\s+.+?)\s+\{[^}]*\}\s*$").expect("valid title brace regex")
});

/// Strips trailing attribute braces from heading lines, e.g.
/// `#### after() {.collection-method}` becomes `#### after()`.
pub fn remove_title_braces(content: &str) -> String {
    content
        .lines()
        .map(|line| match TITLE_BRACES.captures(line) {
            Some(caps) => caps[1].to_string(),
            None => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

static VERSION_PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*version\s*\}\}").expect("valid version regex"));

/// Replaces every `{{version}}` placeholder (whitespace-tolerant inside the
/// braces) with the given version string, e.g. `11.x` or `master`.
pub fn replace_version_placeholder(content: &str, version: &str) -> String {
    VERSION_PLACEHOLDER
        .replace_all(content, NoExpand(version))
        .into_owned()
}

// Legacy `> {tip} message` form; case-sensitive keyword.
static CALLOUT_BRACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)>\s*\{(tip|note)\}\s*(.+)$").expect("valid callout regex"));

// Bracket tag with the message still on the same line.
static CALLOUT_TAGGED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)>\s*\[!(NOTE|WARNING|TIP)\]\s+(\S.+)$").expect("valid callout regex")
});

// Bold keyword form, case-insensitive, optional trailing message.
static CALLOUT_BOLD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\s*)>\s*\*\*(note|warning|tip)\*\*\s*(.*)$").expect("valid callout regex")
});

/// Unifies the three historical callout spellings into the canonical
/// two-line bracket-tag form:
///
/// ```text
/// > [!NOTE]
/// > message
/// ```
///
/// Patterns are tried in a fixed priority order and the first match wins.
/// A bracket tag already on a line of its own is canonical and passes
/// through unchanged. Leading indentation is preserved on both emitted
/// lines.
pub fn standardize_callouts(content: &str) -> String {
    let mut out: Vec<String> = Vec::new();

    for line in content.lines() {
        if let Some(caps) = CALLOUT_BRACE.captures(line) {
            let (indent, message) = (&caps[1], &caps[3]);
            let kind = caps[2].to_uppercase();
            out.push(format!("{indent}> [!{kind}]"));
            out.push(format!("{indent}> {message}"));
        } else if let Some(caps) = CALLOUT_TAGGED.captures(line) {
            let (indent, kind, message) = (&caps[1], &caps[2], &caps[3]);
            out.push(format!("{indent}> [!{kind}]"));
            out.push(format!("{indent}> {message}"));
        } else if let Some(caps) = CALLOUT_BOLD.captures(line) {
            let (indent, message) = (&caps[1], &caps[3]);
            let kind = caps[2].to_uppercase();
            out.push(format!("{indent}> [!{kind}]"));
            if !message.is_empty() {
                out.push(format!("{indent}> {message}"));
            }
        } else {
            out.push(line.to_string());
        }
    }

    out.join("\n")
}

/// Canonicalises the end of the document: all trailing whitespace is
/// stripped and exactly two newlines are appended, so the file ends with one
/// visible blank line. An empty or whitespace-only document becomes the
/// empty string.
pub fn ensure_ends_with_blank_line(content: &str) -> String {
    let trimmed = content.trim_end();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("{trimmed}\n\n")
}

/// Runs the full normalisation pipeline over a document.
///
/// The order is load-bearing: style regions are removed before callouts are
/// standardised so nothing inside a stripped region can match, the version
/// placeholder is substituted after all structural rewrites, and trailing
/// whitespace is normalised last. With no version supplied the placeholder
/// is left untouched.
pub fn normalize(content: &str, version: Option<&str>) -> String {
    let content = convert_indented_code_blocks(content);
    let content = remove_style_tags(&content);
    let content = fix_unclosed_img_tags(&content);
    let content = remove_title_braces(&content);
    let content = standardize_callouts(&content);
    let content = match version {
        Some(version) => replace_version_placeholder(&content, version),
        None => content,
    };
    ensure_ends_with_blank_line(&content)
}
