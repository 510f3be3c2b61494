#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! # Overview
//!
//! `larray` is a typed, rank-polymorphic array bridge: it lets a numerically
//! typed, multi-dimensional array owned by one runtime be allocated,
//! described, and handed to native code as a directly usable pointer without
//! losing shape, type, or ownership information.
//!
//! # Architecture
//!
//! The crate is organized into a small set of components:
//!
//! - **LocalArray**: the opaque, type-erased handle owning (or referencing) a
//!   shape descriptor plus the backing storage, tagged with an element kind
//! - **ShapeDescriptor**: rank, per-dimension counts, inclusive index bounds,
//!   and layout metadata
//! - **ArrayStorage**: the flat storage buffer with an explicit
//!   exclusive-vs-borrowed ownership tag
//! - **Pointer bridge**: [`LocalArray::data_ptr`] and friends, producing a
//!   typed, rank-correct pointer that either aliases the handle's storage
//!   (reference mode) or targets an independent copy (copy mode)
//!
//! # Key properties
//!
//! - **Closed type set**: `i32`, `i64`, `f32`, `f64` elements and ranks 1
//!   through 7; every (type, rank) combination is served by one generic code
//!   path monomorphized at compile time
//! - **Explicit lifetime management**: storage is created by allocate and
//!   released by deallocate; there is no garbage collection and no hidden
//!   sharing between exclusive owners
//! - **Structured results**: every operation reports through
//!   [`ArrayError`]; failures never leave a handle half-initialized
//!
//! # Quick Start
//!
//! ```rust
//! use larray::{CopyFlag, ElementKind, LocalArray};
//!
//! // Allocate a zero-initialized 3x4 float64 array (1-based bounds).
//! let mut array = LocalArray::allocate(ElementKind::Float64, &[3, 4])?;
//!
//! // Reference mode: the pointer aliases the array's storage.
//! let view = array.data_ref::<f64, 2>()?;
//! assert_eq!(view.counts(), [3, 4]);
//! assert_eq!(view.get([1, 1]), Some(&0.0));
//!
//! // Copy mode: an independent buffer the caller releases on drop.
//! let mut copy = array.data_copy::<f64, 2>()?;
//! *copy.get_mut([1, 1]).unwrap() = 1.0;
//! assert_eq!(array.data_ref::<f64, 2>()?.get([1, 1]), Some(&0.0));
//!
//! // Explicit release; a second call reports AlreadyNull.
//! array.deallocate()?;
//! assert!(array.is_null());
//! # Ok::<(), larray::ArrayError>(())
//! ```

/// Allocator module containing storage allocation utilities.
///
/// This module provides the [`ArrayAllocator`] trait and the default
/// [`HostAllocator`] backed by the system allocator.
pub mod allocator;

/// Bridge module containing the typed pointer bridge.
///
/// This module provides [`CopyFlag`], the aliasing-mode views
/// [`ArrayRef`] and [`ArrayCopy`], and the [`DataPointer`] result.
pub mod bridge;

/// Bincode module for binary encoding and decoding.
///
/// Available when the `bincode` feature is enabled.
#[cfg(feature = "bincode")]
pub mod bincode;

/// Element module containing the element kind tag and the sealed element
/// trait.
pub mod element;

/// Error module containing the result protocol for every operation.
pub mod error;

/// Handle module containing the type-erased [`LocalArray`] handle.
pub mod handle;

/// Serde module for serialization and deserialization.
///
/// Available when the `serde` feature is enabled.
#[cfg(feature = "serde")]
pub mod serde;

/// Shape module containing the [`ShapeDescriptor`].
pub mod shape;

/// Storage module containing the type-erased storage buffer and its
/// ownership tag.
pub mod storage;

pub use crate::allocator::{AllocatorError, ArrayAllocator, HostAllocator};
pub use crate::bridge::{ArrayCopy, ArrayRef, CopyFlag, DataPointer};
pub use crate::element::{ArrayElement, ElementKind};
pub use crate::error::ArrayError;
pub use crate::handle::LocalArray;
pub use crate::shape::{ShapeDescriptor, MAX_RANK};
pub use crate::storage::{ArrayStorage, Ownership};

/// Type alias for a rank-1 reference-mode pointer.
pub type ArrayRef1<'a, T> = ArrayRef<'a, T, 1>;

/// Type alias for a rank-2 reference-mode pointer.
pub type ArrayRef2<'a, T> = ArrayRef<'a, T, 2>;

/// Type alias for a rank-3 reference-mode pointer.
pub type ArrayRef3<'a, T> = ArrayRef<'a, T, 3>;

/// Type alias for a rank-4 reference-mode pointer.
pub type ArrayRef4<'a, T> = ArrayRef<'a, T, 4>;

/// Type alias for a rank-1 copy-mode array.
pub type ArrayCopy1<T> = ArrayCopy<T, 1>;

/// Type alias for a rank-2 copy-mode array.
pub type ArrayCopy2<T> = ArrayCopy<T, 2>;

/// Type alias for a rank-3 copy-mode array.
pub type ArrayCopy3<T> = ArrayCopy<T, 3>;

/// Type alias for a rank-4 copy-mode array.
pub type ArrayCopy4<T> = ArrayCopy<T, 4>;
