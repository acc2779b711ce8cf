//! Growable vectors with pluggable per-element copy and destroy behavior.
//!
//! The core of this crate is [`RawVec`], a vector that knows nothing about its elements except
//! their [`ElementLayout`]. Elements are copied in with the copy operation of its
//! [`ElementBehavior`] (or byte-for-byte without one) and released with its destroy operation
//! before they are removed. Where the elements live is decided by a [`Storage`]:
//!
//! * [`HeapStorage`] owns a single allocation holding a [`VecHeader`] followed by the elements,
//!   and grows by reallocating it.
//! * [`FixedStorage`] borrows a caller provided buffer and treats running out of room as running
//!   out of memory.
//!
//! [`Vector`] and [`FixedVector`] wrap the erased vector for elements of a concrete type.
//!
//! ```
//! use ev_vec::{ElementLayout, ErasedVecBuilder};
//! use std::ptr::NonNull;
//!
//! let mut vec = ErasedVecBuilder::new(ElementLayout::of::<u32>()).build().unwrap();
//! for value in [10u32, 20, 30] {
//!     unsafe { vec.push(NonNull::from(&value).cast()) }.unwrap();
//! }
//!
//! let values: Vec<u32> = vec
//!     .iter()
//!     .map(|elem| unsafe { elem.cast::<u32>().as_ptr().read() })
//!     .collect();
//! assert_eq!(values, [10, 20, 30]);
//! ```
//!
//! # Logging
//!
//! This crate uses [log] as a logging facade, but does not install a logger.
//!
//! [log]: https://docs.rs/log
#![warn(missing_docs)]

mod builder;
mod element;
mod error;
pub mod header;
mod raw;
mod storage;
mod typed;

pub use builder::ErasedVecBuilder;
pub use element::{CopyFn, DestroyFn, ElementBehavior, ElementLayout, MAX_ELEMENT_ALIGN};
pub use error::VecError;
pub use header::VecHeader;
pub use raw::{ElementIter, ErasedVec, FixedErasedVec, RawVec};
pub use storage::{AllocationKind, FixedStorage, HeapStorage, Storage};
pub use typed::{FixedVector, Vector};
