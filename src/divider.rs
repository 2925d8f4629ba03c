//! The divider chain: root divider, generic sub-dividers, and the
//! specialized header divider for MSH's two pseudo-fields.
//!
//! Every divider ultimately addresses into the *same* shared buffer by
//! absolute byte range; a sub-divider's own range is computed on demand by
//! asking its parent for the division at its pinned index, recursing up to
//! the root. Division tables are cached per divider instance, keyed by the
//! root buffer's version, so repeated reads through a held divider don't
//! re-split text that hasn't changed underneath it.

use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;

use crate::buffer::{Observers, SharedBuffer};
use crate::division::{divisions, divisions_all, padded, splice, StringDivision};
use crate::separators::SEGMENT_TERMINATOR;

#[derive(Debug, Clone)]
pub struct RootDivider {
    buffer: SharedBuffer,
    /// The delimiter this root splits its own value on. For a message's
    /// root this is always [`SEGMENT_TERMINATOR`]; a detached clone of a
    /// lower-level element becomes its own root using that element's own
    /// delimiter instead (see `Element::clone_detached`).
    delimiter: char,
    cache: Rc<RefCell<Option<(u64, Rc<[StringDivision]>)>>>,
    observers: Rc<Observers>,
}

#[derive(Debug)]
pub struct SubDivider {
    parent: DividerHandle,
    index: usize,
    delimiter: char,
    cache: RefCell<Option<(u64, Rc<[StringDivision]>)>>,
    observers: Observers,
}

/// The MSH segment's divider. Its first two slots (MSH.1 and MSH.2) are the
/// field separator character and the other four encoding characters,
/// respectively; slot 2 onward is a normal field split of whatever follows
/// the encoding block, using the field separator it itself declares.
#[derive(Debug)]
pub struct HeaderDivider {
    parent: DividerHandle,
    index: usize,
    cache: RefCell<Option<(u64, Rc<[StringDivision]>)>>,
    observers: Observers,
}

#[derive(Debug, Clone)]
pub enum DividerHandle {
    Root(RootDivider),
    Sub(Rc<SubDivider>),
    Header(Rc<HeaderDivider>),
}

impl RootDivider {
    pub fn new(buffer: SharedBuffer, delimiter: char) -> Self {
        RootDivider {
            buffer,
            delimiter,
            cache: Rc::new(RefCell::new(None)),
            observers: Rc::new(Observers::default()),
        }
    }
}

impl DividerHandle {
    /// A message's root: the buffer is split into segments on the fixed
    /// segment terminator.
    pub fn root(buffer: SharedBuffer) -> Self {
        DividerHandle::Root(RootDivider::new(buffer, SEGMENT_TERMINATOR))
    }

    /// A standalone root over its own buffer, splitting on `delimiter`.
    /// Used for detached clones of non-message elements, which become their
    /// own root rather than a message's root.
    pub fn root_with_delimiter(buffer: SharedBuffer, delimiter: char) -> Self {
        DividerHandle::Root(RootDivider::new(buffer, delimiter))
    }

    pub fn sub(parent: DividerHandle, index: usize, delimiter: char) -> Self {
        DividerHandle::Sub(Rc::new(SubDivider {
            parent,
            index,
            delimiter,
            cache: RefCell::new(None),
            observers: Observers::default(),
        }))
    }

    pub fn header(parent: DividerHandle, index: usize) -> Self {
        DividerHandle::Header(Rc::new(HeaderDivider {
            parent,
            index,
            cache: RefCell::new(None),
            observers: Observers::default(),
        }))
    }

    fn buffer(&self) -> &SharedBuffer {
        match self {
            DividerHandle::Root(r) => &r.buffer,
            DividerHandle::Sub(s) => s.parent.buffer(),
            DividerHandle::Header(h) => h.parent.buffer(),
        }
    }

    /// The root buffer's current version.
    pub fn version(&self) -> u64 {
        self.buffer().borrow().version()
    }

    fn delimiter(&self) -> char {
        match self {
            DividerHandle::Root(r) => r.delimiter,
            DividerHandle::Sub(s) => s.delimiter,
            // Unused: HeaderDivider dispatches its own indexed reads/writes
            // without going through the generic delimiter-based path.
            DividerHandle::Header(_) => '\0',
        }
    }

    /// This divider's own absolute byte range within the shared buffer. For
    /// a sub-divider whose pinned index no longer exists in its parent
    /// (e.g. the parent shrank), this degrades to an empty range so that
    /// reads see an empty value rather than panicking; writes never rely on
    /// this for positioning (see [`DividerHandle::set_indexed`]).
    pub(crate) fn own_range(&self) -> Range<usize> {
        match self {
            DividerHandle::Root(r) => 0..r.buffer.borrow().text().len(),
            DividerHandle::Sub(s) => match s.parent.divisions().get(s.index) {
                Some(d) => d.range(),
                None => {
                    let end = s.parent.own_range().end;
                    end..end
                }
            },
            DividerHandle::Header(h) => match h.parent.divisions().get(h.index) {
                Some(d) => d.range(),
                None => {
                    let end = h.parent.own_range().end;
                    end..end
                }
            },
        }
    }

    fn cache_cell(&self) -> &RefCell<Option<(u64, Rc<[StringDivision]>)>> {
        match self {
            DividerHandle::Root(r) => &r.cache,
            DividerHandle::Sub(s) => &s.cache,
            DividerHandle::Header(h) => &h.cache,
        }
    }

    /// This divider's child division table, recomputed only if the root
    /// buffer's version has advanced since the table was last cached.
    pub fn divisions(&self) -> Rc<[StringDivision]> {
        let current_version = self.version();
        if let Some((v, divs)) = self.cache_cell().borrow().as_ref() {
            if *v == current_version {
                return divs.clone();
            }
        }
        let computed = self.compute_divisions();
        *self.cache_cell().borrow_mut() = Some((current_version, computed.clone()));
        computed
    }

    fn compute_divisions(&self) -> Rc<[StringDivision]> {
        match self {
            DividerHandle::Header(h) => {
                let buffer = h.parent.buffer().clone();
                let buffer = buffer.borrow();
                let text = buffer.text();
                let range = self.own_range();
                if range.len() < 9 {
                    return Rc::from(vec![StringDivision {
                        offset: range.start,
                        length: range.len(),
                    }]);
                }
                // Slot 0 is the segment type ("MSH"); slots 1 and 2 are the
                // field separator and the four remaining encoding
                // characters respectively, matching HL7's own MSH.1/MSH.2
                // numbering; slot 3 onward is MSH.3, MSH.4, ... from a
                // normal field split of whatever follows the encoding block.
                let mut out = vec![
                    StringDivision {
                        offset: range.start,
                        length: 3,
                    },
                    StringDivision {
                        offset: range.start + 3,
                        length: 1,
                    },
                    StringDivision {
                        offset: range.start + 4,
                        length: 4,
                    },
                ];
                let field_sep = text.as_bytes()[range.start + 3] as char;
                out.extend(divisions(text, field_sep, range.start + 9..range.end));
                Rc::from(out)
            }
            _ => {
                let buffer = self.buffer().clone();
                let buffer = buffer.borrow();
                Rc::from(divisions(buffer.text(), self.delimiter(), self.own_range()))
            }
        }
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.divisions().len()
    }

    /// This divider's whole current value, materialized fresh.
    pub fn value(&self) -> String {
        let range = self.own_range();
        let buffer = self.buffer().borrow();
        buffer.text()[range].to_string()
    }

    /// Read child slot `index` (0-based). Returns `None`, without mutating
    /// anything, if `index` is out of range.
    pub fn get_indexed(&self, index: usize) -> Option<String> {
        let divs = self.divisions();
        let d = divs.get(index)?;
        let buffer = self.buffer().borrow();
        Some(buffer.text()[d.range()].to_string())
    }

    fn observers(&self) -> &Observers {
        match self {
            DividerHandle::Root(r) => &r.observers,
            DividerHandle::Sub(s) => &s.observers,
            DividerHandle::Header(h) => &h.observers,
        }
    }

    pub fn on_change(&self, callback: Box<dyn FnMut(&str)>) {
        self.observers().subscribe(callback);
    }

    /// Replace this divider's entire logical value. For the root this
    /// replaces the whole buffer directly; for anything else it delegates
    /// upward as a single indexed write into the parent, which is how a
    /// leaf write ultimately reaches the buffer through every ancestor.
    pub fn set_value(&self, value: &str) {
        match self {
            DividerHandle::Root(r) => {
                r.buffer.borrow_mut().set_text(value.to_string());
            }
            DividerHandle::Sub(s) => {
                s.parent.set_indexed(s.index, value);
            }
            DividerHandle::Header(h) => {
                h.parent.set_indexed(h.index, value);
            }
        }
        self.observers().fire(value);
    }

    /// Write `value` into child slot `index` (0-based), padding with empty
    /// slots if `index` is beyond the current count.
    pub fn set_indexed(&self, index: usize, value: &str) {
        if let DividerHandle::Header(_) = self {
            self.set_indexed_header(index, value);
            return;
        }
        let current = self.value();
        let delim = self.delimiter();
        let (padded_value, divs) = padded(&current, index, delim);
        let d = divs[index];
        let new_value = splice(&padded_value, d.offset, d.length, value);
        self.set_value(&new_value);
    }

    fn set_indexed_header(&self, index: usize, value: &str) {
        // Slots 0-2 (segment type, field separator, encoding characters)
        // are structural and read-only by convention: writes are silently
        // absorbed rather than cascading a re-encode of the whole message.
        if index < 3 {
            return;
        }
        let whole = self.value();
        if whole.len() < 9 {
            return;
        }
        let field_sep = whole.as_bytes()[3] as char;
        let prefix = &whole[..9];
        let rest = &whole[9..];
        let rest_index = index - 3;
        let (padded_rest, divs) = padded(rest, rest_index, field_sep);
        let d = divs[rest_index];
        let new_rest = splice(&padded_rest, d.offset, d.length, value);
        let new_whole = format!("{prefix}{new_rest}");
        self.set_value(&new_whole);
    }

    /// Remove child slot `index` entirely, shifting later siblings down by
    /// one. Returns `false` without mutating anything if `index` is out of
    /// range.
    pub fn delete_indexed(&self, index: usize) -> bool {
        if let DividerHandle::Header(_) = self {
            return self.delete_indexed_header(index);
        }
        let delim = self.delimiter();
        let current = self.value();
        let mut parts: Vec<&str> = divisions_all(&current, delim)
            .iter()
            .map(|d| &current[d.range()])
            .collect();
        if index >= parts.len() {
            return false;
        }
        parts.remove(index);
        let joined = parts.join(&delim.to_string());
        self.set_value(&joined);
        true
    }

    fn delete_indexed_header(&self, index: usize) -> bool {
        if index < 3 {
            return false;
        }
        let whole = self.value();
        if whole.len() < 9 {
            return false;
        }
        let field_sep = whole.as_bytes()[3] as char;
        let prefix = &whole[..9];
        let rest = &whole[9..];
        let rest_index = index - 3;
        let mut parts: Vec<&str> = divisions_all(rest, field_sep)
            .iter()
            .map(|d| &rest[d.range()])
            .collect();
        if rest_index >= parts.len() {
            return false;
        }
        parts.remove(rest_index);
        let joined = parts.join(&field_sep.to_string());
        let new_whole = format!("{prefix}{joined}");
        self.set_value(&new_whole);
        true
    }

    /// Blank child slot `index`'s content without removing its position.
    /// Returns `false` without mutating anything if `index` is out of
    /// range.
    pub fn erase_indexed(&self, index: usize) -> bool {
        if index >= self.count() {
            return false;
        }
        self.set_indexed(index, "");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::new_shared_buffer;

    fn root(text: &str) -> DividerHandle {
        DividerHandle::root(new_shared_buffer(text.to_string()))
    }

    #[test]
    fn root_splits_on_segment_terminator() {
        let r = root("MSH|^~\\&|\rPID|1");
        assert_eq!(r.count(), 2);
        assert_eq!(r.get_indexed(0).unwrap(), "MSH|^~\\&|");
        assert_eq!(r.get_indexed(1).unwrap(), "PID|1");
    }

    #[test]
    fn out_of_range_read_is_a_silent_nop() {
        let r = root("MSH|^~\\&|");
        assert_eq!(r.get_indexed(5), None);
        assert_eq!(r.version(), 0);
    }

    #[test]
    fn sparse_write_pads_and_bumps_version() {
        let r = root("MSH|^~\\&|");
        let seg1 = DividerHandle::sub(r.clone(), 1, '|');
        seg1.set_indexed(4, "x");
        assert_eq!(r.value(), "MSH|^~\\&|\r||||x");
        assert_eq!(r.version(), 1);
    }

    #[test]
    fn cache_reused_until_version_changes() {
        let r = root("MSH|^~\\&|\rPID|1|2|3");
        let seg = DividerHandle::sub(r.clone(), 1, '|');
        let a = seg.divisions();
        let b = seg.divisions();
        assert!(Rc::ptr_eq(&a, &b));
        seg.set_indexed(0, "XXX");
        let c = seg.divisions();
        assert!(!Rc::ptr_eq(&a, &c));
    }

    #[test]
    fn delete_shifts_siblings_down() {
        let r = root("MSH|^~\\&|");
        let seg1 = DividerHandle::sub(r.clone(), 1, '|');
        seg1.set_indexed(0, "a");
        seg1.set_indexed(1, "b");
        seg1.set_indexed(2, "c");
        assert_eq!(seg1.get_indexed(1).unwrap(), "b");
        assert!(seg1.delete_indexed(1));
        assert_eq!(seg1.get_indexed(1).unwrap(), "c");
        assert_eq!(seg1.count(), 2);
    }

    #[test]
    fn erase_blanks_without_shifting() {
        let r = root("MSH|^~\\&|");
        let seg1 = DividerHandle::sub(r.clone(), 1, '|');
        seg1.set_indexed(0, "a");
        seg1.set_indexed(1, "b");
        assert!(seg1.erase_indexed(0));
        assert_eq!(seg1.get_indexed(0).unwrap(), "");
        assert_eq!(seg1.count(), 2);
    }

    #[test]
    fn header_divider_exposes_pseudo_fields() {
        let r = root("MSH|^~\\&|APP|FAC");
        let msh = DividerHandle::header(r.clone(), 0);
        assert_eq!(msh.get_indexed(0).unwrap(), "MSH");
        assert_eq!(msh.get_indexed(1).unwrap(), "|");
        assert_eq!(msh.get_indexed(2).unwrap(), "^~\\&");
        assert_eq!(msh.get_indexed(3).unwrap(), "APP");
        assert_eq!(msh.get_indexed(4).unwrap(), "FAC");
    }

    #[test]
    fn header_pseudo_field_writes_are_noops() {
        let r = root("MSH|^~\\&|APP");
        let msh = DividerHandle::header(r.clone(), 0);
        msh.set_indexed(0, "XXX");
        msh.set_indexed(1, "#");
        msh.set_indexed(2, "####");
        assert_eq!(msh.get_indexed(0).unwrap(), "MSH");
        assert_eq!(msh.get_indexed(1).unwrap(), "|");
        assert_eq!(msh.get_indexed(2).unwrap(), "^~\\&");
        assert_eq!(r.version(), 0);
    }

    #[test]
    fn header_field_write_updates_rest_and_preserves_prefix() {
        let r = root("MSH|^~\\&|APP|FAC");
        let msh = DividerHandle::header(r.clone(), 0);
        msh.set_indexed(3, "NEWAPP");
        assert_eq!(r.value(), "MSH|^~\\&|NEWAPP|FAC");
    }

    #[test]
    fn observers_fire_only_locally() {
        let r = root("MSH|^~\\&|\rPID|1");
        let seg1 = DividerHandle::sub(r.clone(), 1, '|');
        let root_fired = Rc::new(RefCell::new(false));
        let seg_fired = Rc::new(RefCell::new(false));
        let rf = root_fired.clone();
        r.on_change(Box::new(move |_| *rf.borrow_mut() = true));
        let sf = seg_fired.clone();
        seg1.on_change(Box::new(move |_| *sf.borrow_mut() = true));
        seg1.set_indexed(0, "2");
        assert!(*seg_fired.borrow());
        assert!(!*root_fired.borrow());
    }
}
