//! Per-field change notification for plain records
//!
//! Instead of intercepting assignments, a record describes its mutable fields
//! through [`Record`]: a key type and a change type that carries the key plus the
//! new value. Every change goes through [`ReactiveRecord::set`], which calls the
//! observer before applying it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// A record whose fields can be changed one at a time.
pub trait Record {
    /// Field identifier
    type Key: Copy + Eq + Hash + fmt::Debug;
    /// One field's new value, tagged with its field
    type Change: Clone;

    fn key_of(change: &Self::Change) -> Self::Key;

    fn apply(&mut self, change: Self::Change);
}

type SetObserver<T> = Box<dyn FnMut(&T, <T as Record>::Key, &<T as Record>::Change)>;

/// A record that reports every field write to an observer.
pub struct ReactiveRecord<T: Record> {
    state: T,
    on_set: SetObserver<T>,
}

impl<T: Record> ReactiveRecord<T> {
    /// `on_set` receives the record as it was before the change, the key and the change.
    pub fn new(state: T, on_set: impl FnMut(&T, T::Key, &T::Change) + 'static) -> Self {
        ReactiveRecord {
            state,
            on_set: Box::new(on_set),
        }
    }

    pub fn set(&mut self, change: T::Change) {
        let key = T::key_of(&change);
        (self.on_set)(&self.state, key, &change);
        self.state.apply(change);
    }

    pub fn state(&self) -> &T {
        &self.state
    }

    pub fn into_inner(self) -> T {
        self.state
    }
}

type ChangeCallback<T> = Box<dyn FnMut(&<T as Record>::Change)>;

/// Holds a record and at most one change callback per field.
pub struct StateManager<T: Record + 'static> {
    record: ReactiveRecord<T>,
    callbacks: Rc<RefCell<HashMap<T::Key, ChangeCallback<T>>>>,
}

impl<T: Record + 'static> StateManager<T> {
    pub fn new(state: T) -> Self {
        let callbacks: Rc<RefCell<HashMap<T::Key, ChangeCallback<T>>>> =
            Rc::new(RefCell::new(HashMap::new()));
        let dispatch = Rc::clone(&callbacks);
        let record = ReactiveRecord::new(state, move |_previous: &T, key, change| {
            if let Some(callback) = dispatch.borrow_mut().get_mut(&key) {
                callback(change);
            }
        });
        StateManager { record, callbacks }
    }

    /// Register the callback for `key`, replacing any earlier one.
    pub fn on_change(&mut self, key: T::Key, callback: impl FnMut(&T::Change) + 'static) {
        self.callbacks.borrow_mut().insert(key, Box::new(callback));
    }

    pub fn set(&mut self, change: T::Change) {
        self.record.set(change);
    }

    pub fn state(&self) -> &T {
        self.record.state()
    }

    pub fn into_state(self) -> T {
        self.record.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Session {
        title: String,
        count: u32,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum SessionKey {
        Title,
        Count,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum SessionChange {
        Title(String),
        Count(u32),
    }

    impl Record for Session {
        type Key = SessionKey;
        type Change = SessionChange;

        fn key_of(change: &SessionChange) -> SessionKey {
            match change {
                SessionChange::Title(_) => SessionKey::Title,
                SessionChange::Count(_) => SessionKey::Count,
            }
        }

        fn apply(&mut self, change: SessionChange) {
            match change {
                SessionChange::Title(title) => self.title = title,
                SessionChange::Count(count) => self.count = count,
            }
        }
    }

    #[test]
    fn test_reactive_record_sees_state_before_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        let mut record = ReactiveRecord::new(Session::default(), move |before: &Session, key, change| {
            log.borrow_mut().push((before.count, key, change.clone()));
        });

        record.set(SessionChange::Count(3));
        record.set(SessionChange::Count(4));

        assert_eq!(record.state().count, 4);
        assert_eq!(
            *seen.borrow(),
            vec![
                (0, SessionKey::Count, SessionChange::Count(3)),
                (3, SessionKey::Count, SessionChange::Count(4)),
            ]
        );
    }

    #[test]
    fn test_state_manager_dispatches_per_key() {
        let titles = Rc::new(Cell::new(0));
        let counts = Rc::new(Cell::new(0));

        let mut manager = StateManager::new(Session::default());
        let t = Rc::clone(&titles);
        manager.on_change(SessionKey::Title, move |_| t.set(t.get() + 1));
        let c = Rc::clone(&counts);
        manager.on_change(SessionKey::Count, move |_| c.set(c.get() + 1));

        manager.set(SessionChange::Title("hello".into()));
        manager.set(SessionChange::Count(1));
        manager.set(SessionChange::Count(2));

        assert_eq!(titles.get(), 1);
        assert_eq!(counts.get(), 2);
        assert_eq!(
            manager.into_state(),
            Session {
                title: "hello".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_state_manager_replaces_callback() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let mut manager = StateManager::new(Session::default());
        let f = Rc::clone(&first);
        manager.on_change(SessionKey::Count, move |_| f.set(f.get() + 1));
        let s = Rc::clone(&second);
        manager.on_change(SessionKey::Count, move |_| s.set(s.get() + 1));

        manager.set(SessionChange::Count(9));
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
    }

    #[test]
    fn test_state_manager_without_callback_still_applies() {
        let mut manager = StateManager::new(Session::default());
        manager.set(SessionChange::Title("quiet".into()));
        assert_eq!(manager.state().title, "quiet");
    }

    #[test]
    fn test_callback_receives_new_value() {
        let seen = Rc::new(RefCell::new(None));
        let mut manager = StateManager::new(Session::default());
        let slot = Rc::clone(&seen);
        manager.on_change(SessionKey::Title, move |change| {
            if let SessionChange::Title(title) = change {
                *slot.borrow_mut() = Some(title.clone());
            }
        });
        manager.set(SessionChange::Title("new".into()));
        assert_eq!(seen.borrow().as_deref(), Some("new"));
    }
}
