//! Type constraints for `{name:constraint}` captures.
//!
//! 制約付きキャプチャの制約

use std::sync::LazyLock;

use regex::Regex;

use super::result::ParamValue;

static GUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\{?[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\}?$")
        .expect("static guid regex")
});

static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])(T([01]\d|2[0-3]):[0-5]\d(:[0-5]\d)?)?$")
        .expect("static datetime regex")
});

static VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+){1,3}$").expect("static version regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Int,
    Long,
    Decimal,
    Bool,
    Alpha,
    Guid,
    DateTime,
    Version,
    Min(i64),
    Max(i64),
    Range(i64, i64),
    MinLength(usize),
    MaxLength(usize),
    Length(usize, usize),
}

impl Constraint {
    /// `int`, `range(1,10)` などをパースする。知らないものは `None`
    pub fn parse(raw: &str) -> Option<Constraint> {
        let raw = raw.trim();
        let (name, args) = match raw.find('(') {
            Some(open) => {
                let inner = raw[open + 1..].strip_suffix(')')?;
                (&raw[..open], Some(inner))
            }
            None => (raw, None),
        };
        let name = name.trim().to_ascii_lowercase();

        match (name.as_str(), args) {
            ("int", None) => Some(Constraint::Int),
            ("long", None) => Some(Constraint::Long),
            ("decimal", None) => Some(Constraint::Decimal),
            ("bool", None) => Some(Constraint::Bool),
            ("alpha", None) => Some(Constraint::Alpha),
            ("guid", None) => Some(Constraint::Guid),
            ("datetime", None) => Some(Constraint::DateTime),
            ("version", None) => Some(Constraint::Version),
            ("min", Some(args)) => Some(Constraint::Min(single(args)?)),
            ("max", Some(args)) => Some(Constraint::Max(single(args)?)),
            ("range", Some(args)) => {
                let (lo, hi) = pair(args)?;
                (lo <= hi).then_some(Constraint::Range(lo, hi))
            }
            ("minlength", Some(args)) => Some(Constraint::MinLength(single(args)?)),
            ("maxlength", Some(args)) => Some(Constraint::MaxLength(single(args)?)),
            ("length", Some(args)) => match pair::<usize>(args) {
                Some((lo, hi)) => (lo <= hi).then_some(Constraint::Length(lo, hi)),
                None => single(args).map(|n| Constraint::Length(n, n)),
            },
            _ => None,
        }
    }

    /// Validates a captured value, returning the value to bind on success.
    pub fn check(&self, value: &str) -> Option<ParamValue> {
        match self {
            Constraint::Int => value.parse::<i32>().ok().map(|v| ParamValue::Int(v as i64)),
            Constraint::Long => value.parse::<i64>().ok().map(ParamValue::Int),
            Constraint::Decimal => value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(ParamValue::Decimal),
            Constraint::Bool => {
                if value.eq_ignore_ascii_case("true") {
                    Some(ParamValue::Bool(true))
                } else if value.eq_ignore_ascii_case("false") {
                    Some(ParamValue::Bool(false))
                } else {
                    None
                }
            }
            Constraint::Alpha => (!value.is_empty() && value.chars().all(char::is_alphabetic))
                .then(|| ParamValue::from(value)),
            Constraint::Guid => GUID.is_match(value).then(|| ParamValue::from(value)),
            Constraint::DateTime => DATETIME.is_match(value).then(|| ParamValue::from(value)),
            Constraint::Version => VERSION.is_match(value).then(|| ParamValue::from(value)),
            Constraint::Min(min) => integer(value).filter(|v| v >= min).map(ParamValue::Int),
            Constraint::Max(max) => integer(value).filter(|v| v <= max).map(ParamValue::Int),
            Constraint::Range(lo, hi) => integer(value)
                .filter(|v| (*lo..=*hi).contains(v))
                .map(ParamValue::Int),
            Constraint::MinLength(n) => {
                (value.chars().count() >= *n).then(|| ParamValue::from(value))
            }
            Constraint::MaxLength(n) => {
                (value.chars().count() <= *n).then(|| ParamValue::from(value))
            }
            Constraint::Length(lo, hi) => {
                let len = value.chars().count();
                (*lo..=*hi).contains(&len).then(|| ParamValue::from(value))
            }
        }
    }
}

#[inline]
fn integer(value: &str) -> Option<i64> {
    value.parse::<i64>().ok()
}

fn single<T: std::str::FromStr>(args: &str) -> Option<T> {
    args.trim().parse().ok()
}

fn pair<T: std::str::FromStr>(args: &str) -> Option<(T, T)> {
    let (a, b) = args.split_once(',')?;
    Some((a.trim().parse().ok()?, b.trim().parse().ok()?))
}
