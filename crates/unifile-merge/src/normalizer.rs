//! Per-file line normalizer
//!
//! A single-pass, line-oriented state machine that compacts one source
//! file (stripping comments and superfluous line breaks) while tracking
//! the multi-line constructs that make C-family sources context
//! sensitive: block comments, raw string literals, and backslash-continued
//! preprocessor directives. Include directives are extracted as a side
//! effect: quoted targets become reliances on other declared files, angle
//! targets are deduplicated through the [`HeaderRegistry`].
//!
//! The scanner is string-literal aware: comment markers inside ordinary
//! `"…"` / `'…'` literals and raw strings are treated as literal text, so
//! compaction never changes the compiled meaning of a line.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use unifile_core::{Error, HeaderRegistry, Result};

/// The closed universe of canonical file paths eligible for merging
#[derive(Debug, Clone, Default)]
pub struct DeclaredFiles {
    paths: HashSet<PathBuf>,
}

impl DeclaredFiles {
    /// Build the declared set from canonical paths
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// Whether `path` is a member of the declared set
    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }
}

/// Output of normalizing one file
#[derive(Debug, Clone)]
pub struct Normalized {
    /// Compacted (or passed-through) text, without a trailing newline
    pub text: String,
    /// Local include targets in encounter order; a file included twice
    /// yields two entries
    pub reliances: Vec<PathBuf>,
}

/// Continuation state carried from one physical line to the next
#[derive(Debug, Clone, Default)]
struct LineState {
    /// Sentinel state preceding the first line
    start_of_file: bool,
    /// Previous line was a (non-continued) preprocessor directive
    preprocessor: bool,
    /// Previous line was a redundant standard include, dropped entirely
    dropped_include: bool,
    /// Previous emitted code ended in an alphanumeric character
    ends_alnum: bool,
    /// Inside a backslash-continued preprocessor directive
    in_macro: bool,
    /// Inside an unterminated block comment
    in_comment: bool,
    /// Inside an unterminated raw string; the delimiter that closes it
    raw_delim: Option<String>,
}

/// What became of an include directive
enum Directive {
    /// Kept in the output (local reliance, first standard occurrence, or
    /// unrecognized library header)
    Kept,
    /// Dropped: a standard header already emitted earlier in this run
    Redundant,
}

struct Normalizer<'a> {
    path: &'a Path,
    declared: &'a DeclaredFiles,
    registry: &'a mut HeaderRegistry,
    out: String,
    reliances: Vec<PathBuf>,
    last: LineState,
    cur: LineState,
    line_no: usize,
}

/// Normalize one file's source text.
///
/// With `compress` set, comments and superfluous line breaks are removed;
/// otherwise lines pass through verbatim, with includes still scanned and
/// validated (and redundant standard includes still dropped) so that
/// dependency ordering keeps working.
pub fn normalize(
    path: &Path,
    source: &str,
    declared: &DeclaredFiles,
    registry: &mut HeaderRegistry,
    compress: bool,
) -> Result<Normalized> {
    Normalizer::new(path, declared, registry).run(source, compress)
}

impl<'a> Normalizer<'a> {
    fn new(path: &'a Path, declared: &'a DeclaredFiles, registry: &'a mut HeaderRegistry) -> Self {
        Self {
            path,
            declared,
            registry,
            out: String::new(),
            reliances: Vec::new(),
            last: LineState {
                start_of_file: true,
                ..LineState::default()
            },
            cur: LineState::default(),
            line_no: 0,
        }
    }

    fn run(mut self, source: &str, compress: bool) -> Result<Normalized> {
        for line in source.split('\n') {
            if compress {
                self.feed(line)?;
            } else {
                self.feed_verbatim(line)?;
            }
        }

        if self.last.in_comment {
            return Err(Error::Unterminated {
                file: self.path.to_path_buf(),
                construct: "block comment",
            });
        }
        if self.last.raw_delim.is_some() {
            return Err(Error::Unterminated {
                file: self.path.to_path_buf(),
                construct: "raw string literal",
            });
        }

        trace!(file = %self.path.display(), bytes = self.out.len(), "normalized");
        Ok(Normalized {
            text: self.out,
            reliances: self.reliances,
        })
    }

    /// Dispatch one physical line, strict priority order: empty line,
    /// macro continuation, block-comment continuation, raw-string
    /// continuation, preprocessor directive, ordinary code.
    fn feed(&mut self, raw_line: &str) -> Result<()> {
        self.line_no += 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);
        self.cur = LineState::default();

        if line.is_empty() {
            if self.last.in_macro {
                // A blank line ends the continuation; keep the blank for
                // macro-body fidelity
                self.out.push_str("\n\n");
            } else {
                // Invisible: the previous state persists unchanged
                self.cur = self.last.clone();
            }
        } else {
            if self.last.preprocessor {
                self.out.push('\n');
            }
            if self.last.in_macro {
                self.macro_continuation(line);
            } else if self.last.in_comment {
                self.comment_continuation(line);
            } else if let Some(delim) = self.last.raw_delim.take() {
                self.raw_continuation(line, &delim);
            } else if !self.try_directive(line)? {
                self.conventional(line);
            }
        }

        self.last = std::mem::take(&mut self.cur);
        Ok(())
    }

    /// Pass-through mode: lines kept verbatim, includes still scanned
    fn feed_verbatim(&mut self, raw_line: &str) -> Result<()> {
        self.line_no += 1;
        let line = raw_line.strip_suffix('\r').unwrap_or(raw_line);

        let trimmed = line.trim();
        let keep = if trimmed.is_empty() || !trimmed.starts_with('#') {
            true
        } else {
            !matches!(self.scan_include(trimmed)?, Some(Directive::Redundant))
        };

        if keep {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.out.push_str(line);
        }
        Ok(())
    }

    /// Inside a backslash-continued directive: the line belongs to the
    /// macro body and is appended on its own output line unless it is
    /// blank once the trailing backslash is stripped.
    fn macro_continuation(&mut self, line: &str) {
        let line = line.trim_end();
        if line.ends_with('\\') {
            self.cur.in_macro = true;
        } else {
            self.cur.preprocessor = true;
        }

        let body = line.strip_suffix('\\').unwrap_or(line);
        if !body.trim().is_empty() {
            self.out.push('\n');
            self.out.push_str(line);
        }
    }

    /// Inside an unterminated block comment: discard until `*/`
    fn comment_continuation(&mut self, line: &str) {
        match line.find("*/") {
            None => {
                self.cur.in_comment = true;
                self.cur.ends_alnum = self.last.ends_alnum;
            }
            Some(end) => self.conventional(&line[end + 2..]),
        }
    }

    /// Inside an unterminated raw string: content is preserved exactly
    /// until the stored closing delimiter appears.
    fn raw_continuation(&mut self, line: &str, delim: &str) {
        self.out.push('\n');
        match line.find(delim) {
            None => {
                self.out.push_str(line);
                self.cur.raw_delim = Some(delim.to_string());
            }
            Some(idx) => {
                let end = idx + delim.len();
                self.out.push_str(&line[..end]);
                self.conventional(&line[end..]);
            }
        }
    }

    /// Preprocessor directive handling; returns false when the line is
    /// not a directive and should be treated as ordinary code.
    fn try_directive(&mut self, line: &str) -> Result<bool> {
        let trimmed = line.trim();
        if !trimmed.starts_with('#') {
            return Ok(false);
        }

        match self.scan_include(trimmed)? {
            Some(Directive::Redundant) => {
                trace!(file = %self.path.display(), line = self.line_no, "dropped redundant include");
                self.cur.dropped_include = true;
                self.cur.ends_alnum = self.last.ends_alnum;
            }
            _ => {
                if trimmed.ends_with('\\') {
                    self.cur.in_macro = true;
                } else {
                    self.cur.preprocessor = true;
                }
                // Directives stay visually grouped: no break when the
                // previous line was itself a (kept or dropped) directive
                let grouped = self.last.preprocessor
                    || self.last.dropped_include
                    || self.last.start_of_file;
                if !grouped {
                    self.out.push('\n');
                }
                self.out.push_str(trimmed);
            }
        }
        Ok(true)
    }

    /// Classify an include directive. Quoted targets must resolve to a
    /// member of the declared set and become reliances; angle targets go
    /// through the header registry. Returns None for non-include
    /// directives (and malformed includes, which are kept as-is).
    fn scan_include(&mut self, directive: &str) -> Result<Option<Directive>> {
        let args = match directive.strip_prefix("#include") {
            Some(args) => args,
            None => return Ok(None),
        };

        if let Some(open) = args.find('"') {
            let rest = &args[open + 1..];
            let close = match rest.find('"') {
                Some(close) => close,
                None => return Ok(None),
            };
            let target = &rest[..close];

            let resolved = self
                .path
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(target)
                .canonicalize()
                .map_err(|_| self.unresolved(target))?;
            if !self.declared.contains(&resolved) {
                return Err(self.unresolved(target));
            }

            debug!(file = %self.path.display(), reliance = %resolved.display(), "recorded reliance");
            self.reliances.push(resolved);
            Ok(Some(Directive::Kept))
        } else if let Some(open) = args.find('<') {
            let close = match args[open + 1..].find('>') {
                Some(close) => close,
                None => return Ok(None),
            };
            let name = &args[open + 1..open + 1 + close];

            if !self.registry.recognizes(name) {
                // Unknown library header: kept, never deduplicated
                return Ok(Some(Directive::Kept));
            }
            if self.registry.mark(name) {
                Ok(Some(Directive::Redundant))
            } else {
                Ok(Some(Directive::Kept))
            }
        } else {
            Ok(None)
        }
    }

    fn unresolved(&self, target: &str) -> Error {
        Error::UnresolvedInclude {
            file: self.path.to_path_buf(),
            line: self.line_no,
            target: target.to_string(),
        }
    }

    /// Ordinary code line: strip comments, preserve literals, collapse
    /// whitespace runs, and join with the previous code using a single
    /// space only where dropping the newline would fuse two tokens.
    fn conventional(&mut self, line: &str) {
        let line = line.trim_start();

        let mut kept = String::new();
        let mut enters_comment = false;
        let mut enters_raw: Option<String> = None;

        let mut i = 0;
        while i < line.len() {
            let rest = &line[i..];
            if let Some(after) = rest.strip_prefix("/*") {
                match after.find("*/") {
                    Some(end) => i += 2 + end + 2,
                    None => {
                        enters_comment = true;
                        i = line.len();
                    }
                }
            } else if rest.starts_with("//") {
                // Line comment: drop the remainder
                i = line.len();
            } else if let Some((delim, open_len)) = raw_opening(rest) {
                match rest[open_len..].find(&delim) {
                    Some(end) => {
                        let total = open_len + end + delim.len();
                        kept.push_str(&rest[..total]);
                        i += total;
                    }
                    None => {
                        kept.push_str(rest);
                        enters_raw = Some(delim);
                        i = line.len();
                    }
                }
            } else if rest.starts_with('"') {
                i += copy_quoted(rest, '"', &mut kept);
            } else if rest.starts_with('\'') {
                i += copy_quoted(rest, '\'', &mut kept);
            } else {
                let ch = match rest.chars().next() {
                    Some(ch) => ch,
                    None => break,
                };
                if ch == ' ' || ch == '\t' {
                    if !kept.is_empty() && !kept.ends_with(' ') {
                        kept.push(' ');
                    }
                } else {
                    kept.push(ch);
                }
                i += ch.len_utf8();
            }
        }

        if enters_raw.is_none() {
            while kept.ends_with(' ') {
                kept.pop();
            }
        }

        if kept.is_empty() {
            self.cur.in_comment = enters_comment;
            // Nothing emitted; the adjacency decision defers to whatever
            // produced output last
            self.cur.ends_alnum = self.last.ends_alnum;
            return;
        }

        if self.last.ends_alnum {
            self.out.push(' ');
        }
        self.out.push_str(&kept);

        if let Some(delim) = enters_raw {
            self.cur.raw_delim = Some(delim);
        } else {
            self.cur.in_comment = enters_comment;
            self.cur.ends_alnum = kept.chars().last().map_or(false, |c| c.is_alphanumeric());
        }
    }
}

/// `R"delim(` begins a raw string closed by `)delim"`. Returns the closing
/// delimiter and the opener length when `rest` (starting at `R`) is a
/// well-formed raw-string opening.
fn raw_opening(rest: &str) -> Option<(String, usize)> {
    let after = rest.strip_prefix("R\"")?;
    let open = after.find('(')?;
    // Raw-string delimiters are at most 16 characters and cannot contain
    // parentheses, quotes, backslashes, or whitespace
    if open > 16 {
        return None;
    }
    let delim = &after[..open];
    if delim
        .chars()
        .any(|c| c == ')' || c == '"' || c == '\\' || c.is_whitespace())
    {
        return None;
    }
    Some((format!("){}\"", delim), 2 + open + 1))
}

/// Copy a quoted literal (string or character) starting at the opening
/// quote, honoring backslash escapes. Returns the bytes consumed; an
/// unterminated literal consumes the remainder of the line.
fn copy_quoted(rest: &str, quote: char, kept: &mut String) -> usize {
    let mut iter = rest.char_indices();
    iter.next(); // opening quote
    kept.push(quote);

    let mut escaped = false;
    for (idx, ch) in iter {
        kept.push(ch);
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return idx + ch.len_utf8();
        }
    }
    rest.len()
}
