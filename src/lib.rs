//! # tsu-middleware
//!
//! The ordered middleware queue behind a tsu request pipeline.
//!
//! ## The contract
//!
//! The queue owns *order*. Nothing else. It does not know what a request
//! looks like, what a middleware's call signature is, or how `next` gets
//! passed along. The executor that walks the queue decides all of that.
//!
//! What the queue guarantees:
//!
//! - **Stable order** — entries move only when you insert around them
//! - **Contiguous indices** — `get(i)` for `i` in `0..count()` is the pipeline
//! - **Predictable placement** — append, prepend, clamped positional insert,
//!   and insert before/after the first entry of a given type
//!
//! ## Quick start
//!
//! ```rust
//! use tsu_middleware::{Entry, Error, MiddlewareQueue};
//!
//! struct ErrorHandler;
//! struct Routing;
//! struct BodyParser;
//!
//! fn main() -> Result<(), Error> {
//!     let mut queue = MiddlewareQueue::new();
//!     queue
//!         .add(Entry::typed(ErrorHandler))
//!         .add(Entry::typed(Routing))
//!         .insert_before_type::<Routing>(Entry::typed(BodyParser))?
//!         .insert_at(0, Entry::callable(|| "request id"));
//!
//!     // An executor walks it front to back.
//!     for (i, entry) in queue.iter().enumerate() {
//!         println!("{i}: {entry:?}");
//!     }
//!     assert!(queue.get(2).unwrap().is::<BodyParser>());
//!     Ok(())
//! }
//! ```

mod entry;
mod error;

pub mod middleware;

pub use entry::Entry;
pub use error::Error;
pub use middleware::MiddlewareQueue;
