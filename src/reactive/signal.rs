//! Signals and effects
//!
//! A [`Signal`] is a value cell. Reading it with [`Signal::get`] while an effect
//! is executing subscribes that effect; writing it with [`Signal::set`] runs every
//! subscribed effect synchronously before returning.
//!
//! Dependencies are dynamic. Each time an effect runs it first unsubscribes from
//! everything it read last time, so its subscriptions always match its latest run.
//!
//! Everything here is single-threaded (`Rc`/`RefCell` plus a thread-local observer
//! stack). There is no scheduler and no batching.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

type SubscriberList = RefCell<Vec<Rc<EffectNode>>>;

thread_local! {
    /// Stack of running effects. `None` marks an untracked section.
    static OBSERVERS: RefCell<Vec<Option<Rc<EffectNode>>>> = const { RefCell::new(Vec::new()) };
    static NEXT_EFFECT_ID: Cell<u64> = const { Cell::new(0) };
}

/// Identity of an effect, stable for its lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(u64);

struct EffectNode {
    id: EffectId,
    run: RefCell<Box<dyn FnMut()>>,
    /// Subscriber lists this effect joined during its latest run
    sources: RefCell<Vec<Weak<SubscriberList>>>,
}

impl EffectNode {
    fn execute(self: &Rc<Self>) {
        let Ok(mut run) = self.run.try_borrow_mut() else {
            warn!(
                effect_id = self.id.0,
                "Effect triggered itself while running, skipping nested run"
            );
            return;
        };

        self.clear_sources();

        let _observer = ObserverGuard::push(Some(Rc::clone(self)));
        let f: &mut dyn FnMut() = &mut **run;
        f();
    }

    fn clear_sources(&self) {
        for source in self.sources.borrow_mut().drain(..) {
            if let Some(list) = source.upgrade() {
                list.borrow_mut().retain(|effect| effect.id != self.id);
            }
        }
    }
}

/// Pops the observer stack when dropped, so a panicking effect can't leave itself
/// registered as the current observer.
struct ObserverGuard;

impl ObserverGuard {
    fn push(observer: Option<Rc<EffectNode>>) -> Self {
        OBSERVERS.with(|stack| stack.borrow_mut().push(observer));
        ObserverGuard
    }
}

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        OBSERVERS.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

fn current_observer() -> Option<Rc<EffectNode>> {
    OBSERVERS.with(|stack| stack.borrow().last().cloned().flatten())
}

/// Handle to a registered effect.
///
/// Dropping the handle does not stop the effect; the signals it reads keep it alive.
#[derive(Clone)]
pub struct Effect {
    node: Rc<EffectNode>,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.node.id
    }

    /// Number of signals the effect read during its latest run.
    pub fn dependency_count(&self) -> usize {
        self.node
            .sources
            .borrow()
            .iter()
            .filter(|source| source.strong_count() > 0)
            .count()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.node.id)
            .field("dependencies", &self.dependency_count())
            .finish()
    }
}

/// Run `f` now and again after every write to any signal it read on its latest run.
///
/// An effect lives as long as a signal it reads. When `f` captures one of those
/// signals the pair forms an `Rc` cycle and is never freed, which is fine for
/// effects registered once per process.
pub fn create_effect(f: impl FnMut() + 'static) -> Effect {
    let id = NEXT_EFFECT_ID.with(|next| {
        let id = next.get();
        next.set(id.wrapping_add(1));
        EffectId(id)
    });
    let node = Rc::new(EffectNode {
        id,
        run: RefCell::new(Box::new(f)),
        sources: RefCell::new(Vec::new()),
    });
    node.execute();
    Effect { node }
}

/// Run `f` without subscribing the current effect to anything it reads.
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    let _observer = ObserverGuard::push(None);
    f()
}

/// A reactive value cell.
///
/// Cloning a signal yields another handle to the same cell.
pub struct Signal<T> {
    value: Rc<RefCell<T>>,
    subscribers: Rc<SubscriberList>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Signal {
            value: Rc::clone(&self.value),
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.value.borrow())
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        Signal {
            value: Rc::new(RefCell::new(value)),
            subscribers: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Subscribe the running effect, if any.
    fn track(&self) {
        let Some(observer) = current_observer() else {
            return;
        };
        let mut subscribers = self.subscribers.borrow_mut();
        if subscribers.iter().any(|effect| effect.id == observer.id) {
            return;
        }
        subscribers.push(Rc::clone(&observer));
        observer
            .sources
            .borrow_mut()
            .push(Rc::downgrade(&self.subscribers));
    }

    /// Borrow the value, subscribing the running effect.
    ///
    /// Writing the same signal from inside `f` is dropped (see [`Signal::set`]).
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track();
        f(&self.value.borrow())
    }

    /// Borrow the value without subscribing.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Store a new value and run every subscribed effect.
    ///
    /// A write while the value is borrowed by [`Signal::with`] is dropped and logged.
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Mutate the value in place and run every subscribed effect.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        match self.value.try_borrow_mut() {
            Ok(mut current) => f(&mut current),
            Err(_) => {
                warn!("Signal written while its value is borrowed, dropping the write");
                return;
            }
        }
        self.notify();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    fn notify(&self) {
        // Effects may subscribe or unsubscribe while we iterate
        let snapshot: Vec<Rc<EffectNode>> = self.subscribers.borrow().clone();
        for effect in snapshot {
            effect.execute();
        }
    }
}

impl<T: Clone> Signal<T> {
    /// Clone the value out, subscribing the running effect.
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.with_untracked(T::clone)
    }
}

/// A signal kept equal to `f()`, recomputed whenever a signal `f` reads changes.
pub fn create_memo<T: 'static>(f: impl Fn() -> T + 'static) -> Signal<T> {
    let memo = Signal::new(untrack(&f));
    let target = memo.clone();
    let mut first_run = true;
    create_effect(move || {
        let value = f();
        if first_run {
            // Initial value is already in place
            first_run = false;
        } else {
            target.set(value);
        }
    });
    memo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        (Rc::clone(&count), count)
    }

    #[test]
    fn test_write_inside_with_is_dropped() {
        let signal = Signal::new(1);
        signal.with(|_| signal.set(2));
        assert_eq!(signal.get_untracked(), 1);

        signal.set(3);
        assert_eq!(signal.get_untracked(), 3);
    }

    #[test]
    fn test_effect_outlives_dropped_handle() {
        let signal = Signal::new(0);
        let (runs, runs_in_effect) = counter();
        let reader = signal.clone();
        drop(create_effect(move || {
            reader.get();
            runs_in_effect.set(runs_in_effect.get() + 1);
        }));

        signal.set(1);
        assert_eq!(runs.get(), 2);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn test_effect_runs_once_then_once_per_write() {
        let signal = Signal::new(0);
        let (runs, runs_in_effect) = counter();

        let reader = signal.clone();
        create_effect(move || {
            reader.get();
            runs_in_effect.set(runs_in_effect.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        signal.set(1);
        assert_eq!(runs.get(), 2);
        signal.set(2);
        signal.set(3);
        assert_eq!(runs.get(), 4);
    }

    #[test]
    fn test_effect_sees_latest_value() {
        let signal = Signal::new(String::from("a"));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let reader = signal.clone();
        let log = Rc::clone(&seen);
        create_effect(move || log.borrow_mut().push(reader.get()));

        signal.set("b".to_string());
        signal.update(|s| s.push('!'));
        assert_eq!(*seen.borrow(), vec!["a", "b", "b!"]);
    }

    #[test]
    fn test_untracked_read_does_not_subscribe() {
        let signal = Signal::new(1);
        let (runs, runs_in_effect) = counter();

        let reader = signal.clone();
        create_effect(move || {
            reader.get_untracked();
            untrack(|| reader.get());
            runs_in_effect.set(runs_in_effect.get() + 1);
        });

        signal.set(2);
        assert_eq!(runs.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_reading_twice_subscribes_once() {
        let signal = Signal::new(5);
        let (runs, runs_in_effect) = counter();

        let reader = signal.clone();
        let effect = create_effect(move || {
            let _ = reader.get() + reader.get();
            runs_in_effect.set(runs_in_effect.get() + 1);
        });

        assert_eq!(signal.subscriber_count(), 1);
        assert_eq!(effect.dependency_count(), 1);
        signal.set(6);
        assert_eq!(runs.get(), 2);
        assert_eq!(signal.subscriber_count(), 1);
    }

    #[test]
    fn test_dependencies_are_replaced_on_rerun() {
        let use_a = Signal::new(true);
        let a = Signal::new(0);
        let b = Signal::new(0);
        let (runs, runs_in_effect) = counter();

        let (flag, a_reader, b_reader) = (use_a.clone(), a.clone(), b.clone());
        let effect = create_effect(move || {
            if flag.get() {
                a_reader.get();
            } else {
                b_reader.get();
            }
            runs_in_effect.set(runs_in_effect.get() + 1);
        });
        assert_eq!(a.subscriber_count(), 1);
        assert_eq!(b.subscriber_count(), 0);

        use_a.set(false);
        assert_eq!(runs.get(), 2);
        assert_eq!(a.subscriber_count(), 0);
        assert_eq!(b.subscriber_count(), 1);
        assert_eq!(effect.dependency_count(), 2);

        // `a` is no longer a dependency
        a.set(10);
        assert_eq!(runs.get(), 2);
        b.set(10);
        assert_eq!(runs.get(), 3);
    }

    #[test]
    fn test_subscriber_added_during_notification_waits_for_next_write() {
        let signal = Signal::new(0);
        let (late_runs, late_runs_in_effect) = counter();
        let created = Rc::new(Cell::new(false));

        let outer_reader = signal.clone();
        create_effect(move || {
            let value = outer_reader.get();
            if value > 0 && !created.get() {
                created.set(true);
                let inner_reader = outer_reader.clone();
                let late_runs_in_effect = Rc::clone(&late_runs_in_effect);
                // Effect created inside another effect; it runs once right away
                create_effect(move || {
                    inner_reader.get();
                    late_runs_in_effect.set(late_runs_in_effect.get() + 1);
                });
            }
        });

        signal.set(1);
        assert_eq!(late_runs.get(), 1);
        signal.set(2);
        assert_eq!(late_runs.get(), 2);
    }

    #[test]
    fn test_self_triggering_effect_does_not_recurse() {
        let signal = Signal::new(0);
        let (runs, runs_in_effect) = counter();

        let cell = signal.clone();
        create_effect(move || {
            let value = cell.get();
            runs_in_effect.set(runs_in_effect.get() + 1);
            if value < 100 {
                cell.set(value + 1);
            }
        });

        assert_eq!(runs.get(), 1);
        assert_eq!(signal.get_untracked(), 1);
    }

    #[test]
    fn test_memo_tracks_source() {
        let count = Signal::new(2);
        let source = count.clone();
        let doubled = create_memo(move || source.get() * 2);
        assert_eq!(doubled.get_untracked(), 4);

        count.set(5);
        assert_eq!(doubled.get_untracked(), 10);
    }

    #[test]
    fn test_effect_ids_are_distinct() {
        let a = create_effect(|| {});
        let b = create_effect(|| {});
        assert_ne!(a.id(), b.id());
    }
}
