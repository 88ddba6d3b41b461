// crates/segment_marker/src/lib.rs

//! Segment directives shared by the extraction tool-chain, plus the
//! line scanner that turns them into positioned marker events.

use once_cell::sync::Lazy;
use regex::Regex;

/// Directive keyword that introduces a marker line (`#pragma ...`).
pub const PRAGMA: &str = "pragma";

/// Directive name opening a segment.
pub const START_SEGMENT: &str = "start_segment";

/// Directive name closing a segment.
pub const END_SEGMENT: &str = "end_segment";

static DEFAULT_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    build_marker_regex(START_SEGMENT, END_SEGMENT).expect("default marker pattern is valid")
});

static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

static CONDITIONAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*#[ \t]*(?P<directive>ifdef|ifndef|if|elif|else|endif)\b(?P<rest>.*)")
        .expect("conditional pattern is valid")
});

// Matched against a single line, so `^` is the line start.
fn build_marker_regex(start: &str, end: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(
        r"^[ \t]*#[ \t]*{}[ \t]+(?:(?P<start>{})|(?P<end>{}))\b",
        PRAGMA,
        regex::escape(start),
        regex::escape(end),
    ))
}

/// Why a pair of directive names was refused.
#[derive(Debug, thiserror::Error)]
pub enum MarkerSyntaxError {
    #[error("invalid directive name '{0}': expected an identifier such as `start_segment`")]
    InvalidName(String),
    #[error("start and end directives must differ (both are '{0}')")]
    SameName(String),
    #[error(transparent)]
    Pattern(#[from] regex::Error),
}

/// Which side of a segment a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Start,
    End,
}

/// One marker occurrence inside a document.
///
/// `offset` is the byte offset of the directive name (e.g. `start_segment`)
/// within the scanned buffer, which is the location a compiler front end
/// reports for the pragma token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerEvent {
    pub kind: MarkerKind,
    pub offset: usize,
}

/// The pair of directive names recognised by the scanner.
#[derive(Debug, Clone)]
pub struct MarkerSyntax {
    start: String,
    end: String,
    regex: Regex,
}

impl MarkerSyntax {
    /// Builds a syntax for custom directive names, e.g. `begin_snippet` / `end_snippet`.
    ///
    /// Both names must be C identifiers, since a pragma name is a single
    /// identifier token, and they must differ.
    pub fn new(start: &str, end: &str) -> Result<Self, MarkerSyntaxError> {
        for name in [start, end] {
            if !IDENTIFIER_RE.is_match(name) {
                return Err(MarkerSyntaxError::InvalidName(name.to_string()));
            }
        }
        if start == end {
            return Err(MarkerSyntaxError::SameName(start.to_string()));
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
            regex: build_marker_regex(start, end)?,
        })
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    /// Returns the directive name for the given marker kind.
    pub fn directive(&self, kind: MarkerKind) -> &str {
        match kind {
            MarkerKind::Start => &self.start,
            MarkerKind::End => &self.end,
        }
    }
}

impl Default for MarkerSyntax {
    fn default() -> Self {
        Self {
            start: START_SEGMENT.to_string(),
            end: END_SEGMENT.to_string(),
            regex: DEFAULT_MARKER_RE.clone(),
        }
    }
}

/// One `#if`/`#ifdef`/`#ifndef` group that is still open.
#[derive(Debug, Clone, Copy)]
struct Conditional {
    /// Whether the enclosing group is compiled at all.
    parent_active: bool,
    /// Whether the current branch is compiled.
    active: bool,
    /// `Some(true)` once a branch with a literal true condition was taken,
    /// `None` as soon as a condition cannot be decided from the text.
    taken: Option<bool>,
}

/// Evaluates the condition of `#if`/`#elif` when it is an integer literal.
fn literal_condition(rest: &str) -> Option<bool> {
    let expr = rest.split("//").next().unwrap_or("");
    let expr = expr.split("/*").next().unwrap_or("").trim();
    expr.parse::<i64>().ok().map(|value| value != 0)
}

/// Preprocessor state carried from line to line.
#[derive(Debug, Default)]
struct LineState {
    in_block_comment: bool,
    conditionals: Vec<Conditional>,
}

impl LineState {
    fn active(&self) -> bool {
        self.conditionals.last().map_or(true, |group| group.active)
    }

    /// Applies a conditional directive. Returns false if `line` is not one.
    fn apply_conditional(&mut self, line: &str) -> bool {
        let caps = match CONDITIONAL_RE.captures(line) {
            Some(caps) => caps,
            None => return false,
        };
        let rest = caps.name("rest").map_or("", |m| m.as_str());
        match &caps["directive"] {
            "if" | "ifdef" | "ifndef" => {
                let parent_active = self.active();
                let condition = if &caps["directive"] == "if" {
                    literal_condition(rest)
                } else {
                    None
                };
                self.conditionals.push(Conditional {
                    parent_active,
                    active: parent_active && condition.unwrap_or(true),
                    taken: condition,
                });
            }
            "elif" => {
                if let Some(group) = self.conditionals.last_mut() {
                    match group.taken {
                        Some(true) => group.active = false,
                        Some(false) => {
                            let condition = literal_condition(rest);
                            group.active = group.parent_active && condition.unwrap_or(true);
                            group.taken = condition;
                        }
                        None => group.active = group.parent_active,
                    }
                }
            }
            "else" => {
                if let Some(group) = self.conditionals.last_mut() {
                    group.active = group.parent_active && group.taken != Some(true);
                    group.taken = Some(true);
                }
            }
            _ => {
                self.conditionals.pop();
            }
        }
        true
    }

    /// Follows `/* */` comments through `line`. String and character
    /// literals end at the line break at the latest.
    fn track_comments(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if self.in_block_comment {
                if bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/') {
                    self.in_block_comment = false;
                    i += 2;
                } else {
                    i += 1;
                }
                continue;
            }
            match bytes[i] {
                b'/' if bytes.get(i + 1) == Some(&b'/') => return,
                b'/' if bytes.get(i + 1) == Some(&b'*') => {
                    self.in_block_comment = true;
                    i += 2;
                }
                quote @ (b'"' | b'\'') => {
                    i += 1;
                    while i < bytes.len() && bytes[i] != b'\n' {
                        if bytes[i] == b'\\' {
                            i += 2;
                        } else if bytes[i] == quote {
                            i += 1;
                            break;
                        } else {
                            i += 1;
                        }
                    }
                }
                _ => i += 1,
            }
        }
    }
}

/// Scans `content` for marker directives and returns them in document order.
///
/// A marker is a line of the form `#pragma <name>`, optionally indented and
/// with optional whitespace after the `#`. Anything after the name is ignored.
/// Lines that begin inside a `/* */` comment are not directives, and markers
/// in a group excluded by a literal `#if 0` (or the `#else` of `#if 1`) are
/// skipped. Other conditions are not evaluated; their groups count as compiled.
pub fn scan_markers(content: &str, syntax: &MarkerSyntax) -> Vec<MarkerEvent> {
    let mut state = LineState::default();
    let mut events = Vec::new();
    let mut line_start = 0;

    for line in content.split_inclusive('\n') {
        if !state.in_block_comment && !state.apply_conditional(line) && state.active() {
            if let Some(caps) = syntax.regex.captures(line) {
                let event = match (caps.name("start"), caps.name("end")) {
                    (Some(m), _) => Some((MarkerKind::Start, m.start())),
                    (None, Some(m)) => Some((MarkerKind::End, m.start())),
                    (None, None) => None,
                };
                if let Some((kind, offset)) = event {
                    events.push(MarkerEvent { kind, offset: line_start + offset });
                }
            }
        }
        state.track_comments(line);
        line_start += line.len();
    }
    log::debug!("scanned {} marker(s)", events.len());
    events
}

/// Cheap pre-check: false when neither directive name occurs in `content`,
/// so the document cannot hold a marker.
pub fn has_markers(content: &str, syntax: &MarkerSyntax) -> bool {
    content.contains(syntax.start.as_str()) || content.contains(syntax.end.as_str())
}
