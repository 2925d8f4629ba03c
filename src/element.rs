//! The polymorphic element tree: a tagged node wrapping a divider at the
//! right level, with indexed descent, enumeration, and the mutating
//! operations (set, delete, erase) that the rest of the crate builds its
//! typed accessors on top of.

use std::ops::Range;
use std::rc::Rc;

use crate::buffer::new_shared_buffer;
use crate::divider::DividerHandle;
use crate::error::{CoreError, Result};
use crate::separators::{Separators, SEGMENT_TERMINATOR};

/// The kind of node in the element tree. `HeaderField` is a distinguished
/// tag for MSH's first three slots (segment type, field separator, the
/// remaining encoding characters); it shares every capability with `Field`
/// but the divider beneath it silently rejects writes to those slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    Message,
    Segment,
    Field,
    FieldRepetition,
    Component,
    Subcomponent,
    HeaderField,
}

/// A stable, opaque path identifying one element within its message, usable
/// as a map key for the lifetime of the process. Not meaningful across
/// messages or after the message it was derived from is dropped.
pub type ElementKey = Vec<(ElementKind, usize)>;

struct ElementInner {
    kind: ElementKind,
    divider: DividerHandle,
    parent: Option<Element>,
    /// This element's index within `parent`'s divider, in the divider's own
    /// (unshifted) index space. Unused on `Message`.
    index_in_parent: usize,
    key: ElementKey,
    separators: Rc<Separators>,
}

#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

impl Element {
    /// Construct the root `Message` element over an already-validated
    /// buffer. Used by `Message::new`; not part of the public descent API.
    pub(crate) fn new_message(divider: DividerHandle, separators: Rc<Separators>) -> Self {
        Element {
            inner: Rc::new(ElementInner {
                kind: ElementKind::Message,
                divider,
                parent: None,
                index_in_parent: 0,
                key: ElementKey::new(),
                separators,
            }),
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.inner.kind
    }

    pub fn key(&self) -> &ElementKey {
        &self.inner.key
    }

    pub fn ancestor(&self) -> Option<Element> {
        self.inner.parent.clone()
    }

    pub(crate) fn divider(&self) -> &DividerHandle {
        &self.inner.divider
    }

    /// This element's absolute byte range within the message's buffer, used
    /// by the offset-based cursor location lookup in [`crate::location`].
    pub(crate) fn range(&self) -> Range<usize> {
        self.inner.divider.own_range()
    }

    /// The delimiter this kind of element uses to split its own value into
    /// its children.
    fn delimiter_for(kind: ElementKind, separators: &Separators) -> char {
        match kind {
            ElementKind::Message => SEGMENT_TERMINATOR,
            ElementKind::Segment => separators.field,
            ElementKind::Field | ElementKind::HeaderField => separators.repeat,
            ElementKind::FieldRepetition => separators.component,
            ElementKind::Component | ElementKind::Subcomponent => separators.subcomponent,
        }
    }

    fn child_kind(&self, raw_index: usize) -> ElementKind {
        match self.inner.kind {
            ElementKind::Message => ElementKind::Segment,
            ElementKind::Segment => {
                if matches!(self.inner.divider, DividerHandle::Header(_)) && raw_index < 3 {
                    ElementKind::HeaderField
                } else {
                    ElementKind::Field
                }
            }
            ElementKind::Field | ElementKind::HeaderField => ElementKind::FieldRepetition,
            ElementKind::FieldRepetition => ElementKind::Component,
            ElementKind::Component | ElementKind::Subcomponent => ElementKind::Subcomponent,
        }
    }

    fn child_at_raw(&self, raw: usize) -> Element {
        let child_kind = self.child_kind(raw);
        let divider = if child_kind == ElementKind::Segment && raw == 0 {
            DividerHandle::header(self.inner.divider.clone(), raw)
        } else {
            let delim = Self::delimiter_for(child_kind, &self.inner.separators);
            DividerHandle::sub(self.inner.divider.clone(), raw, delim)
        };
        let mut key = self.inner.key.clone();
        key.push((child_kind, raw));
        Element {
            inner: Rc::new(ElementInner {
                kind: child_kind,
                divider,
                parent: Some(self.clone()),
                index_in_parent: raw,
                key,
                separators: self.inner.separators.clone(),
            }),
        }
    }

    /// Descend to the child at `index`. Segment children (fields of a
    /// segment) are addressed directly, since a segment's slot 0 is the
    /// segment type rather than a numbered field; every other level uses
    /// plain one-based indexing. An index past the current child count
    /// still returns a live element: its reads yield the empty string and
    /// a subsequent write materializes the slot through padding.
    pub fn get(&self, index: usize) -> Element {
        let raw = if self.inner.kind == ElementKind::Segment {
            index
        } else {
            index.saturating_sub(1)
        };
        self.child_at_raw(raw)
    }

    pub fn value(&self) -> String {
        self.inner.divider.value()
    }

    pub fn set_value(&self, value: &str) {
        self.inner.divider.set_value(value);
    }

    pub fn on_change(&self, callback: Box<dyn FnMut(&str)>) {
        self.inner.divider.on_change(callback);
    }

    pub fn values(&self) -> Vec<String> {
        let count = self.inner.divider.count();
        (0..count)
            .map(|i| self.inner.divider.get_indexed(i).unwrap_or_default())
            .collect()
    }

    pub fn set_values(&self, values: &[String]) {
        let delim = Self::delimiter_for(self.inner.kind, &self.inner.separators);
        let joined = values.join(&delim.to_string());
        self.set_value(&joined);
    }

    pub fn descendant_count(&self) -> usize {
        self.inner.divider.count()
    }

    pub fn descendant_elements(&self) -> Vec<Element> {
        (0..self.inner.divider.count())
            .map(|raw| self.child_at_raw(raw))
            .collect()
    }

    pub fn has_significant_descendants(&self) -> bool {
        if self.inner.divider.count() > 1 {
            return true;
        }
        self.values().iter().any(|v| !v.is_empty())
    }

    /// A standalone copy of this element's current value, with its own
    /// independent buffer and no ancestor.
    pub fn clone_detached(&self) -> Element {
        let buffer = new_shared_buffer(self.value());
        let delimiter = Self::delimiter_for(self.inner.kind, &self.inner.separators);
        let divider = DividerHandle::root_with_delimiter(buffer, delimiter);
        Element {
            inner: Rc::new(ElementInner {
                kind: self.inner.kind,
                divider,
                parent: None,
                index_in_parent: 0,
                key: ElementKey::new(),
                separators: self.inner.separators.clone(),
            }),
        }
    }

    pub fn delete(&self) -> Result<()> {
        if self.inner.kind == ElementKind::Message {
            return Err(CoreError::RootElementCannotBeDeleted);
        }
        let parent = self
            .inner
            .parent
            .as_ref()
            .expect("non-message elements always have a parent");
        parent.inner.divider.delete_indexed(self.inner.index_in_parent);
        Ok(())
    }

    pub fn erase(&self) -> Result<()> {
        if self.inner.kind == ElementKind::Message {
            return Err(CoreError::RootElementCannotBeErased);
        }
        let parent = self
            .inner
            .parent
            .as_ref()
            .expect("non-message elements always have a parent");
        parent.inner.divider.erase_indexed(self.inner.index_in_parent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divider::DividerHandle;

    fn message(text: &str) -> Element {
        let buffer = new_shared_buffer(text.to_string());
        let divider = DividerHandle::root(buffer);
        let separators = Rc::new(Separators::from_message(text));
        Element::new_message(divider, separators)
    }

    #[test]
    fn segment_index_zero_is_the_type() {
        let m = message("MSH|^~\\&|\rPID|1|2");
        let pid = m.get(2);
        assert_eq!(pid.get(0).value(), "PID");
        assert_eq!(pid.get(1).value(), "1");
        assert_eq!(pid.get(2).value(), "2");
    }

    #[test]
    fn msh_pseudo_fields_read_through_header_kind() {
        let m = message("MSH|^~\\&|APP|FAC");
        let msh = m.get(1);
        assert_eq!(msh.get(0).kind(), ElementKind::HeaderField);
        assert_eq!(msh.get(0).value(), "MSH");
        assert_eq!(msh.get(1).value(), "|");
        assert_eq!(msh.get(2).value(), "^~\\&");
        assert_eq!(msh.get(3).kind(), ElementKind::Field);
        assert_eq!(msh.get(3).value(), "APP");
    }

    #[test]
    fn sparse_write_materializes_a_new_segment() {
        let m = message("MSH|^~\\&|");
        m.get(2).get(5).set_value("x");
        assert_eq!(m.value(), "MSH|^~\\&|\r|||||x");
        assert_eq!(m.get(2).descendant_count(), 6);
        assert_eq!(m.get(2).get(5).value(), "x");
    }

    #[test]
    fn delete_shifts_and_erase_blanks() {
        let m = message("MSH|^~\\&|\rPID|a|b|c");
        let pid = m.get(2);
        pid.get(2).erase().unwrap();
        assert_eq!(pid.get(2).value(), "");
        assert_eq!(pid.descendant_count(), 4);

        pid.get(2).delete().unwrap();
        assert_eq!(pid.get(2).value(), "c");
        assert_eq!(pid.descendant_count(), 3);
    }

    #[test]
    fn message_cannot_be_deleted_or_erased() {
        let m = message("MSH|^~\\&|");
        assert_eq!(m.delete(), Err(CoreError::RootElementCannotBeDeleted));
        assert_eq!(m.erase(), Err(CoreError::RootElementCannotBeErased));
    }

    #[test]
    fn clone_detached_is_independent() {
        let m = message("MSH|^~\\&|\rPID|a|b");
        let pid = m.get(2);
        let clone = pid.clone_detached();
        assert_eq!(clone.value(), pid.value());
        clone.get(1).set_value("CHANGED");
        assert_eq!(clone.get(1).value(), "CHANGED");
        assert_eq!(pid.get(1).value(), "a");
        assert!(m.value().contains("PID|a|b"));
    }

    #[test]
    fn key_is_stable_across_repeated_descent() {
        let m = message("MSH|^~\\&|\rPID|a|b");
        let k1 = m.get(2).get(1).key().clone();
        let k2 = m.get(2).get(1).key().clone();
        assert_eq!(k1, k2);
    }

    #[test]
    fn has_significant_descendants_detects_content_or_multiplicity() {
        let m = message("MSH|^~\\&|\rPID||");
        let pid = m.get(2);
        assert!(!pid.get(1).has_significant_descendants());
        assert!(pid.has_significant_descendants());
    }
}
