//! Trie nodes.
//!
//! Every node owns the matcher for its segment, its children and the route
//! terminals that end on it. Literal children live in a hash map keyed by
//! their (case-folded) text; every other kind lives in `dynamic` in
//! insertion order.
//!
//! ルートツリーのノード

use std::{borrow::Cow, sync::Arc};

use ahash::AHashMap as Map;
use log::trace;
use regex::Regex;
use smallvec::SmallVec;

use crate::{config::RouterConfig, error::RouteError};

use super::{
    cache::Condition,
    constraint::Constraint,
    result::{MatchResult, ParamValue, Parameters, RouteInfo, SegmentMatch},
    segment::{self, SegmentKind},
};

/// One piece of a multi-parameter segment template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Literal(Box<str>),
    Param {
        name: Box<str>,
        constraint: Option<Constraint>,
    },
}

/// Segment matcher of a node. One variant per segment kind.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Root,
    Literal { text: Box<str>, case_sensitive: bool },
    Capture { name: Box<str> },
    OptionalCapture { name: Box<str> },
    DefaultCapture { name: Box<str>, default: Box<str> },
    ConstrainedCapture { name: Box<str>, constraint: Constraint },
    GreedyCapture { name: Box<str> },
    Regex { regex: Regex },
    GreedyRegex { regex: Regex },
    MultiParameter {
        regex: Regex,
        parts: Vec<TemplatePart>,
        case_sensitive: bool,
    },
}

impl NodeKind {
    /// Tests one path segment against this node.
    ///
    /// Greedy kinds receive the `/`-joined remainder of the path instead of
    /// a single segment.
    pub fn match_segment(&self, value: &str) -> SegmentMatch {
        match self {
            NodeKind::Root => SegmentMatch::no_match(),
            NodeKind::Literal { text, case_sensitive } => {
                if literal_eq(text, value, *case_sensitive) {
                    SegmentMatch::matched(Parameters::new())
                } else {
                    SegmentMatch::no_match()
                }
            }
            NodeKind::Capture { name }
            | NodeKind::OptionalCapture { name }
            | NodeKind::DefaultCapture { name, .. }
            | NodeKind::GreedyCapture { name } => {
                if value.is_empty() {
                    return SegmentMatch::no_match();
                }
                let mut captures = Parameters::new();
                captures.insert(name, value);
                SegmentMatch::matched(captures)
            }
            NodeKind::ConstrainedCapture { name, constraint } => match constraint.check(value) {
                Some(bound) => {
                    let mut captures = Parameters::new();
                    captures.insert(name, bound);
                    SegmentMatch::matched(captures)
                }
                None => SegmentMatch::no_match(),
            },
            NodeKind::Regex { regex } | NodeKind::GreedyRegex { regex } => {
                let Some(caps) = regex.captures(value) else {
                    return SegmentMatch::no_match();
                };
                let mut captures = Parameters::new();
                for name in regex.capture_names().flatten() {
                    if let Some(m) = caps.name(name) {
                        captures.insert(name, m.as_str());
                    }
                }
                SegmentMatch::matched(captures)
            }
            NodeKind::MultiParameter {
                regex,
                parts,
                case_sensitive,
            } => {
                // 構造だけ先に正規表現で確認する
                if !regex.is_match(value) {
                    return SegmentMatch::no_match();
                }
                let mut captures = Parameters::new();
                if bind_template(parts, value, *case_sensitive, &mut captures) {
                    SegmentMatch::matched(captures)
                } else {
                    SegmentMatch::no_match()
                }
            }
        }
    }

    pub fn segment_kind(&self) -> Option<SegmentKind> {
        Some(match self {
            NodeKind::Root => return None,
            NodeKind::Literal { .. } => SegmentKind::Literal,
            NodeKind::Capture { .. } => SegmentKind::Capture,
            NodeKind::OptionalCapture { .. } => SegmentKind::OptionalCapture,
            NodeKind::DefaultCapture { .. } => SegmentKind::DefaultCapture,
            NodeKind::ConstrainedCapture { .. } => SegmentKind::ConstrainedCapture,
            NodeKind::GreedyCapture { .. } => SegmentKind::GreedyCapture,
            NodeKind::Regex { .. } => SegmentKind::Regex,
            NodeKind::GreedyRegex { .. } => SegmentKind::GreedyRegex,
            NodeKind::MultiParameter { .. } => SegmentKind::MultiParameter,
        })
    }

    fn is_greedy(&self) -> bool {
        matches!(self, NodeKind::GreedyCapture { .. } | NodeKind::GreedyRegex { .. })
    }
}

/// Binds the template parts against `value`, trying every split point of
/// each placeholder (shortest first) so constraints take part in the split.
fn bind_template(
    parts: &[TemplatePart],
    value: &str,
    case_sensitive: bool,
    captures: &mut Parameters,
) -> bool {
    let Some((part, rest)) = parts.split_first() else {
        return value.is_empty();
    };
    match part {
        TemplatePart::Literal(text) => {
            let len = text.chars().count();
            let end = value.char_indices().nth(len).map_or(value.len(), |(i, _)| i);
            literal_eq(&value[..end], text, case_sensitive)
                && bind_template(rest, &value[end..], case_sensitive, captures)
        }
        TemplatePart::Param { name, constraint } => {
            let ends = value
                .char_indices()
                .skip(1)
                .map(|(i, _)| i)
                .chain((!value.is_empty()).then_some(value.len()));
            for end in ends {
                let piece = &value[..end];
                let bound = match constraint {
                    Some(constraint) => match constraint.check(piece) {
                        Some(bound) => bound,
                        None => continue,
                    },
                    None => ParamValue::from(piece),
                };
                captures.insert(name, bound);
                if bind_template(rest, &value[end..], case_sensitive, captures) {
                    return true;
                }
            }
            false
        }
    }
}

#[inline]
fn literal_eq(a: &str, b: &str, case_sensitive: bool) -> bool {
    if case_sensitive {
        a == b
    } else {
        a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
    }
}

/// 大文字小文字を区別しない場合は小文字に正規化したものをキーにする
#[inline]
fn literal_key(text: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive || (text.is_ascii() && !text.bytes().any(|b| b.is_ascii_uppercase())) {
        return Cow::Borrowed(text);
    }
    // タイトルケース (ǅ など) も小文字に揃える
    let lowered = text.to_lowercase();
    if lowered == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(lowered)
    }
}

/// A route registration waiting to be attached to its terminal node.
pub(crate) struct PendingRoute<'a, C> {
    pub module_key: &'a Arc<str>,
    pub route_index: usize,
    pub description: &'a super::cache::RouteDescription<C>,
    pub route_length: usize,
}

/// Route payload stored on the node where its pattern ends.
pub(crate) struct Terminal<C> {
    pub info: Arc<RouteInfo>,
    pub condition: Option<Condition<C>>,
}

pub struct TrieNode<C> {
    segment: Box<str>,
    kind: NodeKind,
    literals: Map<Box<str>, TrieNode<C>>,
    dynamic: SmallVec<[Box<TrieNode<C>>; 2]>,
    terminals: SmallVec<[Terminal<C>; 1]>,
}

impl<C> TrieNode<C> {
    pub(crate) fn root() -> Self {
        Self::new("", NodeKind::Root)
    }

    fn new(segment: &str, kind: NodeKind) -> Self {
        TrieNode {
            segment: segment.into(),
            kind,
            literals: Map::default(),
            dynamic: SmallVec::new(),
            terminals: SmallVec::new(),
        }
    }

    pub fn segment(&self) -> &str {
        &self.segment
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Inserts the remaining segments of a route below this node, reusing
    /// children with the same segment text, and attaches the terminal at
    /// the last one.
    pub(crate) fn add(
        &mut self,
        segments: &[&str],
        route: &PendingRoute<'_, C>,
        score: u32,
        config: &RouterConfig,
    ) -> Result<(), RouteError> {
        let Some((first, rest)) = segments.split_first() else {
            self.attach(route, score);
            return Ok(());
        };

        let pattern = route.description.path();
        let kind = SegmentKind::classify(first);
        if kind.is_greedy() && !rest.is_empty() {
            return Err(RouteError::GreedyNotLast {
                pattern: pattern.to_string(),
                segment: first.to_string(),
            });
        }

        let child = if kind == SegmentKind::Literal {
            let matcher = segment::parse_segment(pattern, first, kind, config.case_sensitive)?;
            let key: Box<str> = literal_key(first, config.case_sensitive).into();
            self.literals
                .entry(key)
                .or_insert_with(|| TrieNode::new(first, matcher))
        } else {
            let idx = match self.dynamic.iter().position(|c| &*c.segment == *first) {
                Some(idx) => idx,
                None => {
                    let matcher =
                        segment::parse_segment(pattern, first, kind, config.case_sensitive)?;
                    self.dynamic.push(Box::new(TrieNode::new(first, matcher)));
                    self.dynamic.len() - 1
                }
            };
            self.dynamic[idx].as_mut()
        };

        child.add(rest, route, score + kind.cost(), config)
    }

    fn attach(&mut self, route: &PendingRoute<'_, C>, score: u32) {
        let description = route.description;
        let info = RouteInfo {
            module_key: route.module_key.clone(),
            method: description.method().clone(),
            path: description.path().into(),
            name: description.name().map(Into::into),
            route_index: route.route_index,
            route_length: route.route_length,
            score,
        };
        self.terminals.push(Terminal {
            info: Arc::new(info),
            condition: description.condition().cloned(),
        });
    }

    /// Collects every terminal reachable by matching `segments` below this
    /// node. All matching siblings are explored; a branch that dead-ends
    /// does not stop the others.
    pub(crate) fn collect(
        &self,
        segments: &[&str],
        params: &Parameters,
        ctx: &C,
        config: &RouterConfig,
        out: &mut Vec<MatchResult>,
    ) {
        let Some((first, rest)) = segments.split_first() else {
            self.emit(params, ctx, out);
            for child in &self.dynamic {
                child.collect_absent(params, ctx, out);
            }
            return;
        };

        if let Some(child) = self.literals.get(&*literal_key(first, config.case_sensitive)) {
            child.collect(rest, params, ctx, config, out);
        }

        for child in &self.dynamic {
            if child.kind.is_greedy() {
                let remainder = segments.join("/");
                let m = child.kind.match_segment(&remainder);
                if m.matched {
                    child.emit(&merge(params, m.captures), ctx, out);
                }
                continue;
            }

            let m = child.kind.match_segment(first);
            if m.matched {
                child.collect(rest, &merge(params, m.captures), ctx, config, out);
            } else {
                trace!("segment `{}` rejected by `{}`", first, child.segment);
            }
        }
    }

    /// The path ended before this node: only optional kinds still match.
    fn collect_absent(&self, params: &Parameters, ctx: &C, out: &mut Vec<MatchResult>) {
        let bound = match &self.kind {
            NodeKind::OptionalCapture { .. } => params.clone(),
            NodeKind::DefaultCapture { name, default } => {
                let mut bound = params.clone();
                bound.insert(name, &**default);
                bound
            }
            _ => return,
        };
        self.emit(&bound, ctx, out);
        for child in &self.dynamic {
            child.collect_absent(&bound, ctx, out);
        }
    }

    fn emit(&self, params: &Parameters, ctx: &C, out: &mut Vec<MatchResult>) {
        for terminal in &self.terminals {
            if let Some(condition) = &terminal.condition {
                if !condition(ctx) {
                    trace!(
                        "{} {} skipped by condition",
                        terminal.info.method, terminal.info.path
                    );
                    continue;
                }
            }
            out.push(MatchResult {
                route: terminal.info.clone(),
                parameters: params.clone(),
            });
        }
    }

    /// この部分木にある終端の数
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
            + self.literals.values().map(TrieNode::terminal_count).sum::<usize>()
            + self.dynamic.iter().map(|c| c.terminal_count()).sum::<usize>()
    }

    /// Children in match order: literals (sorted by key), then the rest in
    /// insertion order.
    pub fn children(&self) -> impl Iterator<Item = &TrieNode<C>> {
        let mut literals: Vec<_> = self.literals.iter().collect();
        literals.sort_by(|a, b| a.0.cmp(b.0));
        literals
            .into_iter()
            .map(|(_, node)| node)
            .chain(self.dynamic.iter().map(|c| c.as_ref()))
    }
}

fn merge(params: &Parameters, captures: Parameters) -> Parameters {
    if captures.is_empty() {
        return params.clone();
    }
    let mut merged = params.clone();
    merged.extend(captures);
    merged
}
