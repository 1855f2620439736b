//! Synchronous observer lists
//!
//! Components own an [`Observers`] per event they emit and invoke every
//! listener inline, within the same tick that produced the event.

use std::fmt;

use glam::Vec2;

/// The body touched ground after being airborne
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Landed;

/// The latched move input changed value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveInputChanged(pub Vec2);

/// A list of callbacks for one event type
pub struct Observers<E> {
    listeners: Vec<Box<dyn FnMut(&E)>>,
}

impl<E> Observers<E> {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Register a listener, invoked on every future emit
    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Invoke every listener in subscription order
    pub fn emit(&mut self, event: &E) {
        for listener in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of registered listeners
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether nobody is listening
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<E> Default for Observers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Observers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_emit_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::<MoveInputChanged>::new();

        let first = Rc::clone(&log);
        observers.subscribe(move |e| first.borrow_mut().push(("first", e.0)));
        let second = Rc::clone(&log);
        observers.subscribe(move |e| second.borrow_mut().push(("second", e.0)));

        observers.emit(&MoveInputChanged(Vec2::X));
        assert_eq!(observers.len(), 2);
        assert_eq!(*log.borrow(), vec![("first", Vec2::X), ("second", Vec2::X)]);
    }

    #[test]
    fn test_emit_without_listeners() {
        let mut observers = Observers::<Landed>::default();
        assert!(observers.is_empty());
        observers.emit(&Landed);
    }
}
