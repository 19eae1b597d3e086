//! Whole-file quick stripper
//!
//! A cruder, regex-based alternative to the line normalizer: removes
//! comments and blank lines from a single file without any include
//! validation or dependency tracking. Preprocessor directives keep their
//! own lines; everything else is joined. Unlike the normalizer it is not
//! string-literal aware, so it should only be used on sources known not
//! to embed comment-like sequences in literals.

use regex::Regex;

/// Strip comments and blank lines from `source`
pub fn quickstrip(source: &str) -> String {
    let line_comments = Regex::new(r"(?m)//.*$").expect("literal regex");
    let block_comments = Regex::new(r"(?s)/\*.*?\*/").expect("literal regex");

    let text = line_comments.replace_all(source, "");
    let text = block_comments.replace_all(&text, "");

    let mut processed: Vec<String> = Vec::new();
    let mut prev_was_directive = false;

    for line in text.split('\n') {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        let is_directive = line.trim_start().starts_with('#');
        if is_directive && !prev_was_directive {
            if let Some(prev) = processed.last_mut() {
                prev.push('\n');
            }
        }

        let mut kept = line.to_string();
        if is_directive {
            kept.push('\n');
        }
        processed.push(kept);
        prev_was_directive = is_directive;
    }

    processed.concat()
}
