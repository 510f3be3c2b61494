use thiserror::Error;

use crate::allocator::AllocatorError;
use crate::element::ElementKind;
use crate::shape::MAX_RANK;

/// Error type for local array operations.
///
/// Every fallible operation in this crate reports its outcome through this
/// enum. Failures are surfaced immediately and never partially applied: an
/// operation that fails leaves the handle exactly as it found it.
#[derive(Error, Debug, PartialEq)]
pub enum ArrayError {
    /// The requested rank is outside the supported range.
    ///
    /// Arrays of rank 1 through [`MAX_RANK`] are supported; anything else is
    /// a caller mistake and is rejected before any storage is touched.
    #[error("Invalid rank {rank}: supported ranks are 1 through {MAX_RANK}")]
    InvalidRank {
        /// The rank that was requested.
        rank: usize,
    },

    /// A dimension was given a non-positive element count.
    ///
    /// Every dimension of an array must hold at least one element.
    #[error("Invalid count {count} for dimension {dim}: every dimension must hold at least one element")]
    InvalidCount {
        /// Zero-based index of the offending dimension.
        dim: usize,
        /// The count that was requested.
        count: usize,
    },

    /// The data length does not match the shape.
    ///
    /// Returned when constructing an array from existing data whose element
    /// count differs from the product of the shape's counts.
    #[error("Invalid length: shape expects {expected} elements, but got {actual}")]
    InvalidLength {
        /// Expected number of elements based on the shape.
        expected: usize,
        /// Actual number of elements in the data.
        actual: usize,
    },

    /// Backing storage could not be allocated.
    ///
    /// This is an environment condition, not a caller mistake. No recovery
    /// is attempted; the handle stays null. See [`AllocatorError`] for the
    /// underlying cause.
    #[error("Allocation failed: {0}")]
    AllocationFailed(#[from] AllocatorError),

    /// The handle has no storage attached.
    ///
    /// A handle enters this state at construction via [`LocalArray::null`]
    /// and again after a successful deallocate. Every operation except
    /// allocation fails on a null handle.
    ///
    /// [`LocalArray::null`]: crate::LocalArray::null
    #[error("Null handle: the array has no storage attached")]
    NullHandle,

    /// The handle borrows storage it does not own.
    ///
    /// Deallocation is only permitted on handles with exclusive ownership;
    /// borrowed storage belongs to whatever external component created it.
    #[error("Not the storage owner: the handle borrows external storage")]
    NotOwner,

    /// The handle's storage was previously released.
    ///
    /// A second deallocate on the same handle is rejected instead of
    /// corrupting memory.
    #[error("Already null: the storage was previously released")]
    AlreadyNull,

    /// The requested element type or rank does not match the handle.
    ///
    /// Statically-typed call sites catch this at compile time through the
    /// `<T, const N>` parameters; this runtime check guards the handle's
    /// type-erased tag when the two disagree.
    #[error("Resolution failed: requested {requested_kind} rank {requested_rank}, handle holds {actual_kind} rank {actual_rank}")]
    ResolutionError {
        /// Element kind requested at the call site.
        requested_kind: ElementKind,
        /// Element kind recorded in the handle.
        actual_kind: ElementKind,
        /// Rank requested at the call site.
        requested_rank: usize,
        /// Rank recorded in the handle's shape descriptor.
        actual_rank: usize,
    },
}
