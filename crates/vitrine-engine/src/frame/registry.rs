use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use anyhow::Result;

/// Per-frame callback taking the loop's context.
pub type FrameCallback<C> = dyn FnMut(&mut C) -> Result<()>;

type SharedCallback<C> = Rc<RefCell<Box<FrameCallback<C>>>>;

/// Identity of one registration.
///
/// Two registrations of the same closure get different ids.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct SubscriptionId(u64);

struct Entry<C> {
    id: SubscriptionId,
    callback: SharedCallback<C>,
}

struct Inner<C> {
    entries: RefCell<Vec<Entry<C>>>,
    next_id: Cell<u64>,
}

impl<C> Inner<C> {
    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.iter().position(|e| e.id == id) {
            Some(i) => {
                entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.entries.borrow().iter().any(|e| e.id == id)
    }
}

/// Ordered list of callbacks invoked once per frame.
///
/// `FrameRegistry` is a cheap, clonable handle; clones share the same list so setup
/// code and callbacks can subscribe or unsubscribe while a frame is running.
///
/// Ordering and re-entrancy:
/// - callbacks run in registration order
/// - `run_all` iterates a snapshot, so registrations added during a frame first run
///   on the next frame
/// - an entry removed during a frame is never invoked after its removal
pub struct FrameRegistry<C> {
    inner: Rc<Inner<C>>,
}

impl<C> Clone for FrameRegistry<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<C> Default for FrameRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> FrameRegistry<C> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
            }),
        }
    }

    /// Appends `callback` and returns the handle that removes exactly this registration.
    ///
    /// Dropping the returned [`Subscription`] does not unsubscribe.
    pub fn subscribe<F>(&self, callback: F) -> Subscription<C>
    where
        F: FnMut(&mut C) -> Result<()> + 'static,
    {
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0.wrapping_add(1));

        self.inner.entries.borrow_mut().push(Entry {
            id,
            callback: Rc::new(RefCell::new(Box::new(callback))),
        });

        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Removes the registration with `id`. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.remove(id)
    }

    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner.contains(id)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every registration.
    pub fn clear(&self) {
        // Take the list first so callback destructors run without the borrow held.
        let removed = std::mem::take(&mut *self.inner.entries.borrow_mut());
        drop(removed);
    }

    /// Invokes every registered callback once, in registration order.
    ///
    /// The first error is returned immediately; later callbacks are skipped for
    /// this frame.
    pub fn run_all(&self, ctx: &mut C) -> Result<()> {
        let snapshot: Vec<(SubscriptionId, SharedCallback<C>)> = self
            .inner
            .entries
            .borrow()
            .iter()
            .map(|e| (e.id, Rc::clone(&e.callback)))
            .collect();

        for (id, callback) in snapshot {
            if !self.inner.contains(id) {
                continue;
            }

            // A callback that re-enters `run_all` is still borrowed; skip it in the nested run.
            let Ok(mut callback) = callback.try_borrow_mut() else {
                log::trace!("frame callback {id:?} is already running; skipped");
                continue;
            };

            (&mut **callback)(ctx)?;
        }

        Ok(())
    }
}

/// Removal handle returned by [`FrameRegistry::subscribe`].
pub struct Subscription<C> {
    id: SubscriptionId,
    registry: Weak<Inner<C>>,
}

impl<C> Subscription<C> {
    #[inline]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Removes this registration. Returns `false` if it was already removed or the
    /// registry no longer exists.
    pub fn unsubscribe(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.remove(self.id))
    }

    /// Whether the registration is still in its registry.
    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.contains(self.id))
    }
}

impl<C> std::fmt::Debug for Subscription<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
