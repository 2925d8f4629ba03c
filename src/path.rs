//! Composite path access: descending a message by (segment, field,
//! repetition, component, subcomponent) where an omitted trailing index
//! means "return the ancestor", plus the compact string mini-language
//! (`"PID.5.2"`, `"PID-5-2"`) that the same descent is built from.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use nom::{
    bytes::complete::{take_while1, take_while_m_n},
    character::complete::one_of,
    combinator::opt,
    error::{VerboseError, VerboseErrorKind},
    sequence::preceded,
    Finish, IResult,
};

use crate::element::Element;

type VResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// Which segment a query or path access targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSelector {
    /// A one-based segment index, as in `message.get(2)`.
    Index(usize),
    /// A segment type such as `"PID"`; resolves to the first match.
    Type(String),
}

/// A parsed compact location, e.g. `PID.5.2` or `MSH-9-2`. Repetition is not
/// expressible in the compact string form and always means "first
/// repetition" when this query is resolved against a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    pub segment: SegmentSelector,
    pub field: Option<NonZeroUsize>,
    pub component: Option<NonZeroUsize>,
    pub sub_component: Option<NonZeroUsize>,
}

impl fmt::Display for SegmentSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentSelector::Index(i) => write!(f, "{i}"),
            SegmentSelector::Type(t) => write!(f, "{t}"),
        }
    }
}

impl fmt::Display for LocationQuery {
    /// Renders the query back to its compact dotted form, e.g. `PID.5.2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segment)?;
        if let Some(field) = self.field {
            write!(f, ".{field}")?;
        }
        if let Some(component) = self.component {
            write!(f, ".{component}")?;
        }
        if let Some(sub_component) = self.sub_component {
            write!(f, ".{sub_component}")?;
        }
        Ok(())
    }
}

fn is_valid_seg_id(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

fn parse_segment_id(s: &str) -> VResult<&str> {
    take_while_m_n(3, 3, is_valid_seg_id)(s)
}

fn is_digit_base_10(c: char) -> bool {
    c.is_ascii_digit()
}

fn parse_nonzero_integer(s: &str) -> VResult<NonZeroUsize> {
    let (s, val) = preceded(one_of(".- "), take_while1(is_digit_base_10))(s)?;
    let val = val.parse::<usize>().map_err(|_| {
        nom::Err::Failure(VerboseError {
            errors: vec![(s, VerboseErrorKind::Context("not an integer"))],
        })
    })?;
    let val = NonZeroUsize::new(val).ok_or_else(|| {
        nom::Err::Failure(VerboseError {
            errors: vec![(s, VerboseErrorKind::Context("index was 0"))],
        })
    })?;
    Ok((s, val))
}

fn parse_query(s: &str) -> VResult<LocationQuery> {
    let (s, segment) = parse_segment_id(s)?;
    let (s, field) = opt(parse_nonzero_integer)(s)?;
    let (s, component) = opt(parse_nonzero_integer)(s)?;
    let (s, sub_component) = opt(parse_nonzero_integer)(s)?;

    let segment = if segment.chars().all(|c| c.is_ascii_digit()) {
        SegmentSelector::Index(segment.parse().unwrap_or(1))
    } else {
        SegmentSelector::Type(segment.to_uppercase())
    };

    Ok((
        s,
        LocationQuery {
            segment,
            field,
            component,
            sub_component,
        },
    ))
}

impl FromStr for LocationQuery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_query(s).finish() {
            Ok((_leftover, query)) => Ok(query),
            Err(err) => Err(nom::error::convert_error(s, err)),
        }
    }
}

impl LocationQuery {
    pub fn new<S: AsRef<str>>(source: S) -> Result<LocationQuery, String> {
        FromStr::from_str(source.as_ref())
    }
}

/// Descend from `segment` while the next index is non-negative; the moment
/// an index is `-1` (omitted), the current node is returned. This is the
/// primitive both `get_field` and `LocationQuery` resolution are built on.
pub fn descend(segment: &Element, field: i64, rep: i64, comp: i64, sub: i64) -> Element {
    let mut node = segment.clone();
    if field < 0 {
        return node;
    }
    node = node.get(field as usize);
    if rep < 0 {
        return node;
    }
    node = node.get(rep as usize);
    if comp < 0 {
        return node;
    }
    node = node.get(comp as usize);
    if sub < 0 {
        return node;
    }
    node.get(sub as usize)
}

/// Resolve a parsed [`LocationQuery`] against a message's segments,
/// descending into the first repetition when a field is specified.
pub fn resolve_query(segments: &[Element], query: &LocationQuery) -> Option<Element> {
    let segment = match &query.segment {
        SegmentSelector::Index(i) => segments.get(i.saturating_sub(1)).cloned(),
        SegmentSelector::Type(t) => segments.iter().find(|s| &s.get(0).value() == t).cloned(),
    }?;
    let field = query.field.map(|v| v.get() as i64).unwrap_or(-1);
    let rep = if query.field.is_some() { 1 } else { -1 };
    let comp = query.component.map(|v| v.get() as i64).unwrap_or(-1);
    let sub = query.sub_component.map(|v| v.get() as i64).unwrap_or(-1);
    Some(descend(&segment, field, rep, comp, sub))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_and_dashed_forms() {
        let q = LocationQuery::new("PID.5.2").unwrap();
        assert_eq!(q.segment, SegmentSelector::Type("PID".to_string()));
        assert_eq!(q.field.unwrap().get(), 5);
        assert_eq!(q.component.unwrap().get(), 2);
        assert!(q.sub_component.is_none());

        let q = LocationQuery::new("MSH-9-2").unwrap();
        assert_eq!(q.segment, SegmentSelector::Type("MSH".to_string()));
        assert_eq!(q.field.unwrap().get(), 9);
        assert_eq!(q.component.unwrap().get(), 2);
    }

    #[test]
    fn lowercase_segment_is_normalized() {
        let q = LocationQuery::new("pid.1").unwrap();
        assert_eq!(q.segment, SegmentSelector::Type("PID".to_string()));
    }

    #[test]
    fn segment_only_query_has_no_indices() {
        let q = LocationQuery::new("PV1").unwrap();
        assert!(q.field.is_none());
    }

    #[test]
    fn display_renders_the_compact_dotted_form() {
        let q = LocationQuery::new("PID.5.2").unwrap();
        assert_eq!(q.to_string(), "PID.5.2");

        let q = LocationQuery::new("MSH-9-2").unwrap();
        assert_eq!(q.to_string(), "MSH.9.2");

        let q = LocationQuery::new("PV1").unwrap();
        assert_eq!(q.to_string(), "PV1");
    }

    #[test]
    fn rejects_zero_index() {
        assert!(LocationQuery::new("PID.0").is_err());
    }
}
