//! Queue entries and type erasure.
//!
//! # How heterogeneous middleware is stored
//!
//! A pipeline mixes plain closures with instances of dedicated middleware
//! types, and the queue has to hold all of them in one `Vec`. Rust
//! collections can only hold one concrete type, so every value is hidden
//! behind `Arc<dyn Any + Send + Sync>` and stored uniformly.
//!
//! ```text
//! struct Timing;                         ← user writes this
//!        ↓ Entry::typed(Timing)
//! Arc::new(Timing)                       ← shared, heap-allocated
//!        ↓ stored as ErasedValue, tagged with Timing's TypeId and type path
//! queue.insert_before_type::<Timing>(…)  ← compares the tag, never the value
//!        ↓
//! entry.downcast_ref::<Timing>()         ← executor recovers the value
//! ```
//!
//! The tags are fixed when the entry is built. Raw callables carry none, so
//! relational insertion never matches them.

use std::any::{Any, TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

// ── Internal types ────────────────────────────────────────────────────────────

/// A shared, type-erased middleware value.
///
/// `Send + Sync` so a finished queue can be handed to a multi-threaded
/// executor behind an `Arc`.
type ErasedValue = Arc<dyn Any + Send + Sync + 'static>;

// ── Entry ─────────────────────────────────────────────────────────────────────

/// One stage of a middleware pipeline.
///
/// The queue treats entries as opaque. The only things it ever inspects are
/// the tags fixed at construction: [`type_name`](Entry::type_name) for
/// string lookups and the unit's `TypeId` for typed lookups.
///
/// ```rust
/// use tsu_middleware::Entry;
///
/// struct Cors;
///
/// let log = Entry::callable(|| println!("request"));
/// let cors = Entry::typed(Cors);
///
/// assert_eq!(log.type_name(), None);
/// assert!(cors.type_name().unwrap().ends_with("Cors"));
/// assert!(cors.is_type::<Cors>());
/// assert!(cors.is::<Cors>());
/// ```
#[derive(Clone)]
pub struct Entry {
    value: ErasedValue,
    type_name: Option<Cow<'static, str>>,
    type_id: Option<TypeId>,
}

impl Entry {
    /// A raw callable. It has no type identifier and never matches a
    /// relational lookup.
    ///
    /// Any value is accepted: what a callable's signature looks like is up
    /// to the executor, which recovers it with
    /// [`downcast_ref`](Entry::downcast_ref).
    pub fn callable<F>(f: F) -> Self
    where
        F: Send + Sync + 'static,
    {
        Self { value: Arc::new(f), type_name: None, type_id: None }
    }

    /// An instance of a middleware type, identified by `T` itself and by its
    /// full type path (`std::any::type_name::<T>()`).
    pub fn typed<T>(unit: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self::from_shared(Arc::new(unit))
    }

    /// Like [`typed`](Entry::typed), for a unit the caller already shares.
    pub fn from_shared<T>(unit: Arc<T>) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self {
            value: unit,
            type_name: Some(Cow::Borrowed(type_name::<T>())),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// Stores `value` under the identity of the middleware type `T`.
    ///
    /// For executors that keep every stage behind one handle type, e.g.
    /// `Arc<dyn Layer>`, while still placing stages relative to their unit
    /// type.
    pub fn tagged<T, V>(value: V) -> Self
    where
        T: 'static,
        V: Send + Sync + 'static,
    {
        Self {
            value: Arc::new(value),
            type_name: Some(Cow::Borrowed(type_name::<T>())),
            type_id: Some(TypeId::of::<T>()),
        }
    }

    /// A value tagged with an explicit type identifier.
    ///
    /// Use this when the identifier callers search for is not the Rust type
    /// path, e.g. a short name read from configuration. Such entries only
    /// match string lookups.
    pub fn named<T>(type_name: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        Self { value: Arc::new(value), type_name: Some(type_name.into()), type_id: None }
    }

    /// The identifier relational insertion compares against, or `None` for
    /// raw callables.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Whether this entry is a typed unit whose identifier is exactly
    /// `type_name`.
    pub fn matches(&self, type_name: &str) -> bool {
        self.type_name() == Some(type_name)
    }

    /// Whether this entry was built as a unit of type `T`.
    ///
    /// Compares `TypeId`s, so distinct types that happen to share a type
    /// path never match.
    pub fn is_type<T: 'static>(&self) -> bool {
        self.type_id == Some(TypeId::of::<T>())
    }

    /// Whether the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the stored value as a `T`, if that is what it is.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Recovers shared ownership of the stored value as a `T`.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Identity comparison: `true` when both entries share the same value.
    pub fn ptr_eq(&self, other: &Entry) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_name() {
            Some(name) => f.debug_tuple("Entry").field(&name).finish(),
            None => f.write_str("Entry(callable)"),
        }
    }
}
