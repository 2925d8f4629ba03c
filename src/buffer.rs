//! The single mutable character buffer backing one message, shared by
//! reference among all dividers and elements derived from it.

use std::cell::RefCell;
use std::rc::Rc;

/// Owns the text for one message and the version counter that every
/// divider's cache is checked against.
///
/// Dividers never hold their own copy of the buffer; they hold a clone of
/// this `Rc` and address into `text` through absolute byte ranges. Any write
/// anywhere in the message — however deep — ultimately calls
/// [`Buffer::set_text`] here, which is the single point where `version` is
/// bumped.
#[derive(Debug)]
pub struct Buffer {
    text: String,
    version: u64,
}

impl Buffer {
    pub fn new(text: String) -> Self {
        Buffer { text, version: 0 }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the entire buffer contents and bump the version. This is the
    /// only mutating entry point into the buffer; every divider write
    /// bottoms out here.
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.version += 1;
    }
}

pub type SharedBuffer = Rc<RefCell<Buffer>>;

pub fn new_shared_buffer(text: String) -> SharedBuffer {
    Rc::new(RefCell::new(Buffer::new(text)))
}

/// A list of observers notified synchronously, in registration order, each
/// time the divider that owns this list commits a write through its own
/// `value` setter or indexer. Firing is local: a sub-divider's write does
/// not notify its ancestors' observer lists, only its own.
#[derive(Default)]
pub struct Observers {
    callbacks: RefCell<Vec<Box<dyn FnMut(&str)>>>,
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.callbacks.borrow().len())
            .finish()
    }
}

impl Observers {
    pub fn subscribe(&self, callback: Box<dyn FnMut(&str)>) {
        self.callbacks.borrow_mut().push(callback);
    }

    /// Fire every observer with the new value. Observers that reentrantly
    /// mutate the divider that just fired them are not supported (see the
    /// concurrency model's note on reentrant observers); we don't guard
    /// against it here, matching the core's documented undefined behaviour.
    pub fn fire(&self, new_value: &str) {
        for callback in self.callbacks.borrow_mut().iter_mut() {
            callback(new_value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_bumps_on_every_set_text() {
        let mut buffer = Buffer::new("a".to_string());
        assert_eq!(buffer.version(), 0);
        buffer.set_text("b".to_string());
        assert_eq!(buffer.version(), 1);
        buffer.set_text("c".to_string());
        assert_eq!(buffer.version(), 2);
    }

    #[test]
    fn observers_fire_in_registration_order() {
        let observers = Observers::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let log1 = log.clone();
        observers.subscribe(Box::new(move |v| log1.borrow_mut().push(format!("a:{v}"))));
        let log2 = log.clone();
        observers.subscribe(Box::new(move |v| log2.borrow_mut().push(format!("b:{v}"))));
        observers.fire("x");
        assert_eq!(*log.borrow(), vec!["a:x".to_string(), "b:x".to_string()]);
    }
}
