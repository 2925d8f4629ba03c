//! The `Message` entry point: constructs the root divider and the element
//! tree over it, and layers the MSH conveniences and composite path access
//! on top.

use std::fmt;
use std::rc::Rc;

use crate::buffer::new_shared_buffer;
use crate::divider::DividerHandle;
use crate::element::Element;
use crate::error::{CoreError, Result};
use crate::escape;
use crate::location::{locate, LocatedElement};
use crate::path::{self, LocationQuery, SegmentSelector};
use crate::separators::{sanitize_line_endings, validate_header, Separators};

/// The paired application/facility fields MSH carries twice: once for the
/// sender (MSH-3/4) and once for the receiver (MSH-5/6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Party {
    pub application: String,
    pub facility: String,
}

/// A live, mutable view over one HL7 v2 message's text. `Message` is not
/// `Clone`: a shallow clone would share the same buffer, letting a write
/// through one handle silently change the other. Use [`Message::deep_clone`]
/// for an independent copy. Every [`Element`] descended from one `Message`
/// shares its buffer and is kept consistent by the divider version-stamp
/// protocol.
pub struct Message {
    root: Element,
    separators: Rc<Separators>,
}

impl Message {
    /// Parse `source` into a message. The input is sanitized (line endings
    /// normalized to the HL7 segment terminator) before validation.
    pub fn new(source: &str) -> Result<Self> {
        let sanitized = sanitize_line_endings(source);
        validate_header(&sanitized)?;
        let separators = Rc::new(Separators::from_message(&sanitized));
        let buffer = new_shared_buffer(sanitized);
        let divider = DividerHandle::root(buffer);
        let root = Element::new_message(divider, separators.clone());
        Ok(Message { root, separators })
    }

    /// Parse `source`, accepting the same input but returning the fixed
    /// [`CoreError`] set rather than panicking — identical to [`Message::new`];
    /// kept as a separate name for callers migrating from parsers that
    /// distinguish "construct" from "parse".
    pub fn parse(source: &str) -> Result<Self> {
        Self::new(source)
    }

    pub(crate) fn root(&self) -> &Element {
        &self.root
    }

    /// The full message text, materialized fresh from the shared buffer.
    pub fn value(&self) -> String {
        self.root.value()
    }

    /// Replace the message text wholesale and re-derive the encoding
    /// separators from it. Fails the same way [`Message::new`] does if the
    /// replacement text doesn't pass header validation.
    pub fn set_value(&mut self, source: &str) -> Result<()> {
        let sanitized = sanitize_line_endings(source);
        validate_header(&sanitized)?;
        let separators = Rc::new(Separators::from_message(&sanitized));
        let buffer = new_shared_buffer(sanitized);
        let divider = DividerHandle::root(buffer);
        self.root = Element::new_message(divider, separators.clone());
        self.separators = separators;
        Ok(())
    }

    /// `true` iff the current value still starts with the header segment
    /// identifier.
    pub fn validate(&self) -> bool {
        self.value().starts_with("MSH")
    }

    /// A deep, independent copy: a fresh buffer holding the same text, with
    /// no shared dividers or caches with `self`.
    pub fn deep_clone(&self) -> Message {
        Message::new(&self.value()).expect("a valid message's text is always re-parseable")
    }

    /// The encoding separators declared by this message's MSH-1/MSH-2.
    pub fn separators(&self) -> Separators {
        *self.separators
    }

    pub fn escape(&self, s: &str) -> String {
        escape::escape(s, &self.separators)
    }

    pub fn unescape(&self, s: &str) -> String {
        escape::unescape(s, &self.separators)
    }

    /// Segment at one-based index `index`. Never fails: an index past the
    /// current segment count returns a detached placeholder whose writes
    /// materialize the slot through padding.
    pub fn segment(&self, index: usize) -> Element {
        self.root.get(index)
    }

    /// All segments, in order.
    pub fn segments(&self) -> Vec<Element> {
        self.root.descendant_elements()
    }

    /// The first segment whose type (slot 0) equals `segment_type`.
    pub fn segment_by_type(&self, segment_type: &str) -> Option<Element> {
        self.segments()
            .into_iter()
            .find(|s| s.get(0).value() == segment_type)
    }

    /// Every segment whose type equals `segment_type`, in order.
    pub fn segments_by_type(&self, segment_type: &str) -> Vec<Element> {
        self.segments()
            .into_iter()
            .filter(|s| s.get(0).value() == segment_type)
            .collect()
    }

    /// Composite path descent: the first negative index among
    /// `field, rep, comp, sub` stops the descent and returns the current
    /// node. `segment` may select by one-based index or by segment type; a
    /// type that matches nothing returns `None`.
    pub fn get_field(
        &self,
        segment: SegmentSelector,
        field: i64,
        rep: i64,
        comp: i64,
        sub: i64,
    ) -> Option<Element> {
        let seg = match segment {
            SegmentSelector::Index(i) => self.segment(i),
            SegmentSelector::Type(t) => self.segment_by_type(&t)?,
        };
        Some(path::descend(&seg, field, rep, comp, sub))
    }

    /// Like [`Message::get_field`], but for a segment type returns every
    /// matching segment's descent instead of only the first.
    pub fn get_fields(
        &self,
        segment: SegmentSelector,
        field: i64,
        rep: i64,
        comp: i64,
        sub: i64,
    ) -> Vec<Element> {
        match segment {
            SegmentSelector::Index(i) => vec![path::descend(&self.segment(i), field, rep, comp, sub)],
            SegmentSelector::Type(t) => self
                .segments_by_type(&t)
                .iter()
                .map(|s| path::descend(s, field, rep, comp, sub))
                .collect(),
        }
    }

    pub fn get_value(
        &self,
        segment: SegmentSelector,
        field: i64,
        rep: i64,
        comp: i64,
        sub: i64,
    ) -> Option<String> {
        self.get_field(segment, field, rep, comp, sub)
            .map(|e| e.value())
    }

    pub fn get_values(
        &self,
        segment: SegmentSelector,
        field: i64,
        rep: i64,
        comp: i64,
        sub: i64,
    ) -> Vec<String> {
        self.get_fields(segment, field, rep, comp, sub)
            .iter()
            .map(|e| e.value())
            .collect()
    }

    /// Resolve a compact string query (`"PID.5.2"`, `"MSH-9-2"`) against
    /// this message's segments, returning the leaf value.
    pub fn query(&self, q: &str) -> Option<String> {
        let query = LocationQuery::new(q).ok()?;
        path::resolve_query(&self.segments(), &query).map(|e| e.value())
    }

    /// Resolve a compact string query to the element itself, rather than
    /// its value.
    pub fn query_element(&self, q: &str) -> Option<Element> {
        let query = LocationQuery::new(q).ok()?;
        path::resolve_query(&self.segments(), &query)
    }

    /// The deepest element containing byte offset `offset` into
    /// [`Message::value`].
    pub fn locate(&self, offset: usize) -> Option<LocatedElement> {
        locate(&self.root, offset)
    }

    fn msh(&self) -> Element {
        self.segment(1)
    }

    /// MSH-10.
    pub fn control_id(&self) -> String {
        self.msh().get(10).value()
    }

    pub fn set_control_id(&self, value: &str) {
        self.msh().get(10).set_value(value);
    }

    /// MSH-11.
    pub fn processing_id(&self) -> String {
        self.msh().get(11).value()
    }

    /// MSH-8.
    pub fn security(&self) -> String {
        self.msh().get(8).value()
    }

    /// MSH-3/MSH-4.
    pub fn sender(&self) -> Party {
        Party {
            application: self.msh().get(3).value(),
            facility: self.msh().get(4).value(),
        }
    }

    /// MSH-5/MSH-6.
    pub fn receiver(&self) -> Party {
        Party {
            application: self.msh().get(5).value(),
            facility: self.msh().get(6).value(),
        }
    }

    /// MSH-7.
    pub fn time(&self) -> String {
        self.msh().get(7).value()
    }

    /// MSH-9-1. Descends field → (first) repetition → component, since a
    /// component index always implies the first repetition unless one is
    /// given explicitly.
    pub fn message_type(&self) -> String {
        self.msh().get(9).get(1).get(1).value()
    }

    /// MSH-9-2.
    pub fn trigger_event(&self) -> String {
        self.msh().get(9).get(1).get(2).value()
    }

    /// MSH-12.
    pub fn version(&self) -> String {
        self.msh().get(12).value()
    }
}

impl Default for Message {
    /// A minimal message: `MSH|^~\&|` with default separators.
    fn default() -> Self {
        Message::new("MSH|^~\\&|").expect("the default message text is always valid")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").field("value", &self.value()).finish()
    }
}

impl PartialEq for Message {
    /// Messages compare equal iff their sanitized text representations are
    /// equal; two semantically equivalent messages that differ in
    /// whitespace compare unequal.
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for Message {}
