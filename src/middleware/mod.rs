//! Middleware queue.
//!
//! The queue decides *what runs in which order*. It never runs anything:
//! the executor reads it front to back with [`MiddlewareQueue::count`] and
//! [`MiddlewareQueue::get`] (or [`MiddlewareQueue::iter`]) and invokes each
//! entry however its call signature dictates.
//!
//! Five ways to place an entry:
//!
//! | Operation | Lands at | Never fails? |
//! |---|---|---|
//! | [`add`](MiddlewareQueue::add) | end | yes |
//! | [`prepend`](MiddlewareQueue::prepend) | front | yes |
//! | [`insert_at`](MiddlewareQueue::insert_at) | clamped index, negatives count from the end | yes |
//! | [`insert_before`](MiddlewareQueue::insert_before) | before first entry of a type | no, `NotFound` |
//! | [`insert_after`](MiddlewareQueue::insert_after) | after first entry of a type, else end | yes |
//!
//! ```rust
//! use tsu_middleware::{Entry, MiddlewareQueue};
//!
//! struct Session;
//! struct Csrf;
//!
//! let mut queue = MiddlewareQueue::new();
//! queue
//!     .add(Entry::typed(Session))
//!     .prepend(Entry::callable(|| "access log"))
//!     .insert_after_type::<Session>(Entry::typed(Csrf));
//!
//! assert_eq!(queue.count(), 3);
//! assert!(queue.get(2).unwrap().is::<Csrf>());
//! assert!(queue.get(3).is_none());
//! ```

use std::any::type_name;
use std::slice;

use tracing::debug;

use crate::entry::Entry;
use crate::error::Error;

/// An ordered, index-addressable sequence of middleware entries.
///
/// Indices are zero-based and always equal the entry's current position.
/// Every insertion shifts the entries behind it; nothing is ever reordered
/// implicitly. Duplicates, of values or of types, are allowed.
///
/// Mutators return `&mut Self` so configuration reads as one chain.
#[derive(Clone, Debug, Default)]
pub struct MiddlewareQueue {
    queue: Vec<Entry>,
}

impl MiddlewareQueue {
    pub fn new() -> Self {
        Self { queue: Vec::new() }
    }

    /// Appends `entry` to the end of the queue.
    pub fn add(&mut self, entry: Entry) -> &mut Self {
        debug!(position = self.queue.len(), type_name = entry.type_name(), "middleware added");
        self.queue.push(entry);
        self
    }

    /// Inserts `entry` at the front of the queue.
    pub fn prepend(&mut self, entry: Entry) -> &mut Self {
        debug!(type_name = entry.type_name(), "middleware prepended");
        self.queue.insert(0, entry);
        self
    }

    /// Returns the entry at `index`, or `None` past the end.
    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.queue.get(index)
    }

    /// Number of queued entries.
    pub fn count(&self) -> usize {
        self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Inserts `entry` so that it ends up at `index`.
    ///
    /// A negative `index` counts from the end: the entry lands at
    /// `max(0, count + index)`, so `-1` makes it the second-to-last entry.
    /// An index at or past the end appends.
    ///
    /// ```rust
    /// use tsu_middleware::{Entry, MiddlewareQueue};
    ///
    /// let a = Entry::callable(|| 'a');
    /// let x = Entry::callable(|| 'x');
    ///
    /// let mut queue = MiddlewareQueue::new();
    /// queue.add(a.clone()).insert_at(-1, x.clone());
    ///
    /// assert!(queue.get(0).unwrap().ptr_eq(&x));
    /// assert!(queue.get(1).unwrap().ptr_eq(&a));
    /// ```
    pub fn insert_at(&mut self, index: isize, entry: Entry) -> &mut Self {
        let position = normalize(index, self.queue.len());
        debug!(index, position, type_name = entry.type_name(), "middleware inserted");
        self.queue.insert(position, entry);
        self
    }

    /// Inserts `entry` immediately before the first entry whose type
    /// identifier is `type_name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] when no entry matches. The queue is left
    /// untouched.
    pub fn insert_before(&mut self, type_name: &str, entry: Entry) -> Result<&mut Self, Error> {
        let position = self.queue.iter().position(|e| e.matches(type_name));
        self.place_before(position, type_name, entry)
    }

    /// Inserts `entry` immediately after the first entry whose type
    /// identifier is `type_name`.
    ///
    /// Unlike [`insert_before`](MiddlewareQueue::insert_before) a missing
    /// match is not an error: the entry is appended instead.
    pub fn insert_after(&mut self, type_name: &str, entry: Entry) -> &mut Self {
        let position = self.queue.iter().position(|e| e.matches(type_name));
        self.place_after(position, type_name, entry)
    }

    /// [`insert_before`](MiddlewareQueue::insert_before) keyed on the unit
    /// type `T` as recorded by [`Entry::typed`] or [`Entry::tagged`].
    ///
    /// Matches by `TypeId`, not by type path.
    pub fn insert_before_type<T: 'static>(&mut self, entry: Entry) -> Result<&mut Self, Error> {
        let position = self.queue.iter().position(Entry::is_type::<T>);
        self.place_before(position, type_name::<T>(), entry)
    }

    /// [`insert_after`](MiddlewareQueue::insert_after) keyed on the unit
    /// type `T`.
    pub fn insert_after_type<T: 'static>(&mut self, entry: Entry) -> &mut Self {
        let position = self.queue.iter().position(Entry::is_type::<T>);
        self.place_after(position, type_name::<T>(), entry)
    }

    /// Entries in execution order.
    pub fn iter(&self) -> slice::Iter<'_, Entry> {
        self.queue.iter()
    }

    fn place_before(
        &mut self,
        position: Option<usize>,
        anchor: &str,
        entry: Entry,
    ) -> Result<&mut Self, Error> {
        let Some(position) = position else {
            debug!(type_name = anchor, "no middleware to insert before");
            return Err(Error::NotFound { type_name: anchor.to_owned() });
        };
        debug!(position, before = anchor, type_name = entry.type_name(), "middleware inserted");
        self.queue.insert(position, entry);
        Ok(self)
    }

    fn place_after(&mut self, position: Option<usize>, anchor: &str, entry: Entry) -> &mut Self {
        match position {
            Some(position) => {
                debug!(
                    position = position + 1,
                    after = anchor,
                    type_name = entry.type_name(),
                    "middleware inserted"
                );
                self.queue.insert(position + 1, entry);
                self
            }
            None => {
                debug!(after = anchor, "no middleware to insert after, appending");
                self.add(entry)
            }
        }
    }
}

/// Maps a possibly negative index onto an insertion position in `0..=len`.
fn normalize(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index.unsigned_abs().min(len)
    }
}

impl From<Vec<Entry>> for MiddlewareQueue {
    fn from(queue: Vec<Entry>) -> Self {
        Self { queue }
    }
}

impl FromIterator<Entry> for MiddlewareQueue {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self { queue: iter.into_iter().collect() }
    }
}

impl Extend<Entry> for MiddlewareQueue {
    fn extend<I: IntoIterator<Item = Entry>>(&mut self, iter: I) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl<'a> IntoIterator for &'a MiddlewareQueue {
    type Item = &'a Entry;
    type IntoIter = slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
