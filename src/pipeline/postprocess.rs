//! Post-processing: deterministic cleanup of transformer-generated Markdown.
//!
//! HTML→Markdown transformers differ in small but visible ways: some emit
//! setext (`Title\n=====`) headings for `h1`/`h2` and closed ATX headings
//! (`### Deep ###`) below that, some leave CRLF line
//! endings from the source, some leave runs of blank lines where empty
//! paragraphs used to be. These rules make the output uniform so the same
//! DOCX always yields byte-identical Markdown with ATX headings.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so the setext detector sees `\n` only;
//! setext conversion runs before heading spacing so the new `#` lines get
//! their blank line; the final-newline pass runs last. Trailing-whitespace
//! trimming keeps two-space hard breaks, which is how `<br>` survives.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all post-processing rules.
///
/// 1. Normalise line endings (CRLF → LF)
/// 2. Trim trailing whitespace per line (hard breaks kept)
/// 3. Convert setext headings to ATX (`#`, `##`)
/// 4. Strip closing `#` sequences from ATX headings
/// 5. Ensure heading lines have a blank line before them
/// 6. Collapse 3+ consecutive newlines down to 2
/// 7. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 8. Ensure the text ends with exactly one newline
pub fn clean_markdown(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = trim_trailing_whitespace(&s);
    let s = setext_to_atx(&s);
    let s = strip_closing_hashes(&s);
    let s = normalise_heading_spacing(&s);
    let s = collapse_blank_lines(&s);
    let s = remove_invisible_chars(&s);
    ensure_final_newline(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Trim trailing whitespace per line ────────────────────────────────

/// A line ending in two or more spaces, followed by a non-blank line, is a
/// Markdown hard break; it keeps exactly two spaces.
fn trim_trailing_whitespace(input: &str) -> String {
    let lines: Vec<&str> = input.lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim_end();
        let next_has_text = lines
            .get(i + 1)
            .is_some_and(|next| !next.trim().is_empty());
        if next_has_text && !trimmed.is_empty() && line.ends_with("  ") {
            out.push(format!("{trimmed}  "));
        } else {
            out.push(trimmed.to_string());
        }
    }
    out.join("\n")
}

// ── Rule 3: Setext → ATX ─────────────────────────────────────────────────────

static RE_SETEXT_H1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}=+$").unwrap());
static RE_SETEXT_H2: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ {0,3}-+$").unwrap());
static RE_LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s").unwrap());

fn can_be_setext_text(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty()
        && !t.starts_with('#')
        && !t.starts_with('>')
        && !t.starts_with('|')
        && !t.starts_with("```")
        && !RE_LIST_ITEM.is_match(line)
        && !RE_SETEXT_H1.is_match(line)
        && !RE_SETEXT_H2.is_match(line)
}

fn setext_to_atx(input: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;
    // Whether the last pushed line may still become a setext heading.
    let mut pending_text = false;

    for line in input.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push(line.to_string());
            pending_text = false;
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            continue;
        }

        if pending_text {
            let marker = if RE_SETEXT_H1.is_match(line) {
                Some("#")
            } else if RE_SETEXT_H2.is_match(line) {
                Some("##")
            } else {
                None
            };
            if let (Some(marker), Some(text)) = (marker, out.last_mut()) {
                *text = format!("{} {}", marker, text.trim());
                pending_text = false;
                continue;
            }
        }

        pending_text = can_be_setext_text(line);
        out.push(line.to_string());
    }

    out.join("\n")
}

// ── Rule 4: Closed ATX → open ATX ────────────────────────────────────────────

static RE_CLOSED_ATX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(#{1,6} .*?\S)[ \t]+#+[ \t]*$").unwrap());

fn strip_closing_hashes(input: &str) -> String {
    let mut in_fence = false;
    input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                return line.to_string();
            }
            if in_fence {
                return line.to_string();
            }
            RE_CLOSED_ATX.replace(line, "$1").into_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Normalise heading spacing ────────────────────────────────────────

static RE_ATX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6} \S").unwrap());

fn normalise_heading_spacing(input: &str) -> String {
    // Ensure a blank line before each heading (unless at the very start)
    let mut result = String::with_capacity(input.len() + 64);
    for (i, line) in input.lines().enumerate() {
        if RE_ATX.is_match(line) && i > 0 {
            // trim_end also drops a hard break that would now precede a blank line
            let trimmed = result.trim_end();
            result.truncate(trimmed.len());
            if !result.is_empty() {
                result.push_str("\n\n");
            }
        }
        result.push_str(line);
        result.push('\n');
    }
    result
}

// ── Rule 6: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}

// ── Rule 7: Remove invisible Unicode characters ─────────────────────────────

fn remove_invisible_chars(input: &str) -> String {
    input.replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}

// ── Rule 8: Ensure text ends with a single newline ───────────────────────────

fn ensure_final_newline(input: &str) -> String {
    let trimmed = input.trim_matches('\n').trim_end();
    if trimmed.is_empty() {
        String::from("\n")
    } else {
        format!("{}\n", trimmed)
    }
}
