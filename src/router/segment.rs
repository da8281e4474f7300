//! Route pattern segment classifier.
//!
//! Maps a raw pattern segment to the node kind that matches it, and parses
//! the segment into a ready-to-match [`NodeKind`].
//!
//! パターンセグメントの分類器

use regex::{Regex, RegexBuilder};

use crate::error::RouteError;

use super::{
    constraint::Constraint,
    node::{NodeKind, TemplatePart},
};

/// Kind of a route pattern segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// `users`
    Literal,
    /// `{id}`
    Capture,
    /// `{id?}`
    OptionalCapture,
    /// `{path*}`
    GreedyCapture,
    /// `{id:int}`
    ConstrainedCapture,
    /// `{name?guest}`
    DefaultCapture,
    /// `{file}.{ext}`
    MultiParameter,
    /// `(?<year>\d{4})`
    Regex,
    /// `^(?<rest>.*)$`
    GreedyRegex,
}

impl SegmentKind {
    /// Classifies a segment. First rule that applies wins; literal is the
    /// fallback so this never fails.
    pub fn classify(segment: &str) -> SegmentKind {
        if segment.starts_with('(') && segment.ends_with(')') {
            return SegmentKind::Regex;
        }
        if is_single_capture(segment) {
            return if segment.contains(':') {
                SegmentKind::ConstrainedCapture
            } else if segment.ends_with("?}") {
                SegmentKind::OptionalCapture
            } else if segment.ends_with("*}") {
                SegmentKind::GreedyCapture
            } else if segment.contains('?') {
                SegmentKind::DefaultCapture
            } else {
                SegmentKind::Capture
            };
        }
        if segment.starts_with("^(") && (segment.ends_with(')') || segment.ends_with(")$")) {
            return SegmentKind::GreedyRegex;
        }
        if segment.contains('{') && segment.contains('}') {
            return SegmentKind::MultiParameter;
        }
        SegmentKind::Literal
    }

    /// Contribution of one segment of this kind to a route's score.
    /// Literal text costs nothing; the looser the match, the higher the cost.
    pub fn cost(self) -> u32 {
        match self {
            SegmentKind::Literal => 0,
            SegmentKind::Regex => 400,
            SegmentKind::ConstrainedCapture => 500,
            SegmentKind::MultiParameter => 600,
            SegmentKind::Capture => 1000,
            SegmentKind::OptionalCapture | SegmentKind::DefaultCapture => 1100,
            SegmentKind::GreedyRegex => 5000,
            SegmentKind::GreedyCapture => 10000,
        }
    }

    /// Greedy kinds consume the rest of the path.
    pub fn is_greedy(self) -> bool {
        matches!(self, SegmentKind::GreedyCapture | SegmentKind::GreedyRegex)
    }
}

/// `{...}` with exactly one pair of braces
fn is_single_capture(segment: &str) -> bool {
    segment.len() >= 2
        && segment.starts_with('{')
        && segment.ends_with('}')
        && !segment[1..segment.len() - 1].contains(['{', '}'])
}

/// Splits a route template on `/`, dropping empty segments.
///
/// Slashes inside `(...)` or `{...}` do not split, so regex segments may
/// contain them. Brackets inside a regex character class (`[...]`) are
/// not counted.
pub fn split_pattern(pattern: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut in_class = false;
    let mut start = 0;

    for (i, ch) in pattern.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if in_class {
            match ch {
                '\\' => escaped = true,
                ']' => in_class = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' if depth > 0 => in_class = true,
            '(' | '{' => depth += 1,
            ')' | '}' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                if i > start {
                    segments.push(&pattern[start..i]);
                }
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < pattern.len() {
        segments.push(&pattern[start..]);
    }
    segments
}

/// Builds the matcher for one pattern segment.
///
/// `pattern` is only used for error messages.
pub(crate) fn parse_segment(
    pattern: &str,
    segment: &str,
    kind: SegmentKind,
    case_sensitive: bool,
) -> Result<NodeKind, RouteError> {
    let malformed = |reason: &'static str| RouteError::MalformedSegment {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
        reason,
    };
    // 波括弧の中身 (キャプチャ系のみ使う)
    let inner = segment.get(1..segment.len().saturating_sub(1)).unwrap_or("");

    match kind {
        SegmentKind::Literal => {
            if segment.contains(['{', '}']) {
                return Err(malformed("unbalanced brace"));
            }
            Ok(NodeKind::Literal {
                text: segment.into(),
                case_sensitive,
            })
        }
        SegmentKind::Capture => Ok(NodeKind::Capture {
            name: capture_name(inner).ok_or_else(|| malformed("empty capture name"))?,
        }),
        SegmentKind::OptionalCapture => {
            let name = inner.strip_suffix('?').unwrap_or(inner);
            Ok(NodeKind::OptionalCapture {
                name: capture_name(name).ok_or_else(|| malformed("empty capture name"))?,
            })
        }
        SegmentKind::GreedyCapture => {
            let name = inner.strip_suffix('*').unwrap_or(inner);
            Ok(NodeKind::GreedyCapture {
                name: capture_name(name).ok_or_else(|| malformed("empty capture name"))?,
            })
        }
        SegmentKind::DefaultCapture => {
            let (name, default) = inner.split_once('?').unwrap_or((inner, ""));
            Ok(NodeKind::DefaultCapture {
                name: capture_name(name).ok_or_else(|| malformed("empty capture name"))?,
                default: default.into(),
            })
        }
        SegmentKind::ConstrainedCapture => {
            let (name, raw) = inner.split_once(':').unwrap_or((inner, ""));
            let name = capture_name(name).ok_or_else(|| malformed("empty capture name"))?;
            let constraint = Constraint::parse(raw).ok_or_else(|| RouteError::UnknownConstraint {
                pattern: pattern.to_string(),
                constraint: raw.to_string(),
            })?;
            Ok(NodeKind::ConstrainedCapture { name, constraint })
        }
        SegmentKind::Regex => Ok(NodeKind::Regex {
            regex: compile(pattern, segment, segment, case_sensitive)?,
        }),
        SegmentKind::GreedyRegex => {
            let body = segment.strip_prefix('^').unwrap_or(segment);
            let body = body.strip_suffix('$').unwrap_or(body);
            Ok(NodeKind::GreedyRegex {
                regex: compile(pattern, segment, body, case_sensitive)?,
            })
        }
        SegmentKind::MultiParameter => {
            let parts = parse_template(pattern, segment)?;
            let mut source = String::new();
            for part in &parts {
                match part {
                    TemplatePart::Literal(text) => source.push_str(&regex::escape(text)),
                    TemplatePart::Param { .. } => source.push_str("(.+?)"),
                }
            }
            Ok(NodeKind::MultiParameter {
                regex: compile(pattern, segment, &source, case_sensitive)?,
                parts,
                case_sensitive,
            })
        }
    }
}

fn capture_name(raw: &str) -> Option<Box<str>> {
    let name = raw.trim();
    (!name.is_empty()).then(|| name.into())
}

/// 全体一致になるようにアンカーを付けてコンパイルする
fn compile(
    pattern: &str,
    segment: &str,
    body: &str,
    case_sensitive: bool,
) -> Result<Regex, RouteError> {
    RegexBuilder::new(&format!("^(?:{})$", body))
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|source| RouteError::InvalidRegex {
            pattern: pattern.to_string(),
            segment: segment.to_string(),
            source,
        })
}

/// `{file}.{ext:alpha}` -> [Param(file), Literal("."), Param(ext, alpha)]
fn parse_template(pattern: &str, segment: &str) -> Result<Vec<TemplatePart>, RouteError> {
    let malformed = |reason: &'static str| RouteError::MalformedSegment {
        pattern: pattern.to_string(),
        segment: segment.to_string(),
        reason,
    };

    let mut parts = Vec::new();
    let mut rest = segment;
    while !rest.is_empty() {
        match rest.find(['{', '}']) {
            None => {
                parts.push(TemplatePart::Literal(rest.into()));
                break;
            }
            Some(pos) if rest.as_bytes()[pos] == b'}' => return Err(malformed("unbalanced brace")),
            Some(open) => {
                if open > 0 {
                    parts.push(TemplatePart::Literal(rest[..open].into()));
                }
                let after = &rest[open + 1..];
                let close = after.find('}').ok_or_else(|| malformed("unterminated brace"))?;
                let body = &after[..close];
                if body.contains('{') {
                    return Err(malformed("nested brace"));
                }
                if body.contains(['?', '*']) {
                    return Err(malformed("optional or greedy placeholder in multi-parameter segment"));
                }
                let (name, constraint) = match body.split_once(':') {
                    Some((name, raw)) => {
                        let constraint = Constraint::parse(raw).ok_or_else(|| {
                            RouteError::UnknownConstraint {
                                pattern: pattern.to_string(),
                                constraint: raw.to_string(),
                            }
                        })?;
                        (name, Some(constraint))
                    }
                    None => (body, None),
                };
                let name = capture_name(name).ok_or_else(|| malformed("empty capture name"))?;
                parts.push(TemplatePart::Param { name, constraint });
                rest = &after[close + 1..];
            }
        }
    }

    if !parts.iter().any(|p| matches!(p, TemplatePart::Param { .. })) {
        return Err(malformed("no placeholder"));
    }
    Ok(parts)
}
