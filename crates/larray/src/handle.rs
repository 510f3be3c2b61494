//! The type-erased local array handle.

use crate::allocator::AllocatorError;
use crate::element::{ArrayElement, ElementKind};
use crate::error::ArrayError;
use crate::shape::ShapeDescriptor;
use crate::storage::{ArrayStorage, Ownership};

/// Shape and storage of a non-null handle. The two always travel together:
/// a handle either has both or is null.
struct Populated {
    shape: ShapeDescriptor,
    storage: ArrayStorage,
}

/// An opaque, type-erased handle to a numerically-typed multi-dimensional
/// array.
///
/// A `LocalArray` owns (or references) a [`ShapeDescriptor`] plus the base
/// address of the backing storage, tagged with an [`ElementKind`]. The
/// element type and rank are erased at the handle level and recovered through
/// the typed pointer bridge ([`data_ref`], [`data_copy`], [`data_ptr`]).
///
/// # Lifecycle
///
/// A handle starts null ([`LocalArray::null`]), becomes populated through
/// [`allocate`] (exclusive ownership), [`from_vec`] (exclusive), or [`wrap`]
/// (borrowed), serves any number of pointer-bridge calls, and returns to the
/// null state through [`deallocate`]. Every operation on a null handle except
/// allocation fails with [`ArrayError::NullHandle`].
///
/// Dropping a populated exclusive handle frees its storage as a leak
/// backstop; [`deallocate`] remains the contract path. Dropping a borrowed
/// handle leaves the external storage untouched.
///
/// Handles are deliberately not `Clone`: storage is never shared between two
/// exclusive owners. They are also not `Send`/`Sync`; the data plane is
/// single-threaded and callers serialize access externally.
///
/// # Examples
///
/// ```
/// use larray::{ElementKind, LocalArray};
///
/// let mut array = LocalArray::allocate(ElementKind::Float64, &[3, 4])?;
/// assert!(!array.is_null());
/// assert_eq!(array.shape()?.counts(), &[3, 4]);
/// assert!(array.as_slice::<f64>()?.iter().all(|&v| v == 0.0));
///
/// array.deallocate()?;
/// assert!(array.is_null());
/// # Ok::<(), larray::ArrayError>(())
/// ```
///
/// [`allocate`]: LocalArray::allocate
/// [`from_vec`]: LocalArray::from_vec
/// [`wrap`]: LocalArray::wrap
/// [`deallocate`]: LocalArray::deallocate
/// [`data_ref`]: LocalArray::data_ref
/// [`data_copy`]: LocalArray::data_copy
/// [`data_ptr`]: LocalArray::data_ptr
pub struct LocalArray {
    kind: ElementKind,
    contents: Option<Populated>,
}

impl LocalArray {
    /// Creates a handle in the null state.
    ///
    /// The handle has no storage; every operation except allocation fails on
    /// it until it is replaced by a populated handle.
    pub fn null(kind: ElementKind) -> Self {
        Self {
            kind,
            contents: None,
        }
    }

    /// Allocates a contiguous, zero-initialized array.
    ///
    /// The rank is `counts.len()`; bounds are 1-based (`lower_bound = 1`,
    /// `upper_bound = counts`), strides and offsets zero, ownership
    /// exclusive. Dispatch over the element kind lands on one generic
    /// allocation path monomorphized per supported type; the rank is carried
    /// in the shape descriptor.
    ///
    /// # Errors
    ///
    /// * [`ArrayError::InvalidRank`]: `counts.len()` outside `[1, 7]`.
    /// * [`ArrayError::InvalidCount`]: any zero count.
    /// * [`ArrayError::AllocationFailed`]: size overflow or the allocator
    ///   failed; no partially-constructed handle is observable.
    ///
    /// # Examples
    ///
    /// ```
    /// use larray::{ArrayError, ElementKind, LocalArray};
    ///
    /// let array = LocalArray::allocate(ElementKind::Int32, &[2, 3, 4])?;
    /// assert_eq!(array.shape()?.rank(), 3);
    ///
    /// let err = LocalArray::allocate(ElementKind::Int32, &[2, 0]).unwrap_err();
    /// assert_eq!(err, ArrayError::InvalidCount { dim: 1, count: 0 });
    /// # Ok::<(), larray::ArrayError>(())
    /// ```
    pub fn allocate(kind: ElementKind, counts: &[usize]) -> Result<Self, ArrayError> {
        let shape = ShapeDescriptor::contiguous(counts)?;
        let numel = shape
            .checked_numel()
            .ok_or(AllocatorError::SizeOverflow)?;
        let storage = match kind {
            ElementKind::Int32 => ArrayStorage::zeroed::<i32>(numel),
            ElementKind::Int64 => ArrayStorage::zeroed::<i64>(numel),
            ElementKind::Float32 => ArrayStorage::zeroed::<f32>(numel),
            ElementKind::Float64 => ArrayStorage::zeroed::<f64>(numel),
        }?;
        log::debug!("allocated {kind} array, {shape}");
        Ok(Self {
            kind,
            contents: Some(Populated { shape, storage }),
        })
    }

    /// Creates an exclusively-owned array from existing data.
    ///
    /// The data length must equal the product of `counts`.
    ///
    /// # Examples
    ///
    /// ```
    /// use larray::LocalArray;
    ///
    /// let array = LocalArray::from_vec::<i64>(&[2, 2], vec![1, 2, 3, 4])?;
    /// assert_eq!(array.as_slice::<i64>()?, &[1, 2, 3, 4]);
    /// # Ok::<(), larray::ArrayError>(())
    /// ```
    pub fn from_vec<T: ArrayElement>(counts: &[usize], data: Vec<T>) -> Result<Self, ArrayError> {
        let shape = ShapeDescriptor::contiguous(counts)?;
        let numel = shape
            .checked_numel()
            .ok_or(AllocatorError::SizeOverflow)?;
        if data.len() != numel {
            return Err(ArrayError::InvalidLength {
                expected: numel,
                actual: data.len(),
            });
        }
        let storage = ArrayStorage::from_vec(data)?;
        Ok(Self {
            kind: T::KIND,
            contents: Some(Populated { shape, storage }),
        })
    }

    /// Adopts externally-owned storage without taking ownership.
    ///
    /// The resulting handle is borrowed: it can serve pointer-bridge calls
    /// but [`deallocate`](Self::deallocate) fails with
    /// [`ArrayError::NotOwner`] and dropping the handle leaves the storage
    /// untouched.
    ///
    /// # Errors
    ///
    /// Fails with [`ArrayError::NullHandle`] on a null address and with
    /// [`ArrayError::AllocationFailed`] if the shape's byte size overflows.
    ///
    /// # Safety
    ///
    /// The caller must ensure the region at `ptr` holds at least
    /// `shape.numel() * kind.size_of()` bytes, is properly aligned for
    /// `kind`, and outlives the handle.
    pub unsafe fn wrap(
        kind: ElementKind,
        ptr: *mut u8,
        shape: ShapeDescriptor,
    ) -> Result<Self, ArrayError> {
        let numel = shape
            .checked_numel()
            .ok_or(AllocatorError::SizeOverflow)?;
        let byte_len = numel
            .checked_mul(kind.size_of())
            .ok_or(AllocatorError::SizeOverflow)?;
        let storage = ArrayStorage::borrow_raw(ptr, byte_len)?;
        log::debug!("wrapped external {kind} array, {shape}");
        Ok(Self {
            kind,
            contents: Some(Populated { shape, storage }),
        })
    }

    /// Releases the handle's storage and returns it to the null state.
    ///
    /// # Errors
    ///
    /// * [`ArrayError::NotOwner`]: the handle borrows external storage; the
    ///   storage is left untouched.
    /// * [`ArrayError::AlreadyNull`]: the handle is already null; the call
    ///   is inert.
    pub fn deallocate(&mut self) -> Result<(), ArrayError> {
        match &self.contents {
            None => Err(ArrayError::AlreadyNull),
            Some(populated) if !populated.storage.is_exclusive() => Err(ArrayError::NotOwner),
            Some(_) => {
                log::debug!("released {} array storage", self.kind);
                self.contents = None;
                Ok(())
            }
        }
    }

    /// Returns true if the handle has no storage attached.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.contents.is_none()
    }

    /// Returns the element kind tag of the handle.
    #[inline]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Returns the shape descriptor of a non-null handle.
    pub fn shape(&self) -> Result<&ShapeDescriptor, ArrayError> {
        self.contents
            .as_ref()
            .map(|populated| &populated.shape)
            .ok_or(ArrayError::NullHandle)
    }

    /// Returns the ownership tag of a non-null handle.
    pub fn ownership(&self) -> Result<Ownership, ArrayError> {
        self.contents
            .as_ref()
            .map(|populated| populated.storage.ownership())
            .ok_or(ArrayError::NullHandle)
    }

    /// Resolves the handle to its typed parts, checking the element kind and
    /// rank against the erased tags.
    pub(crate) fn resolve<T: ArrayElement>(
        &self,
        requested_rank: usize,
    ) -> Result<(&ShapeDescriptor, &ArrayStorage), ArrayError> {
        let populated = self.contents.as_ref().ok_or(ArrayError::NullHandle)?;
        if T::KIND != self.kind || requested_rank != populated.shape.rank() {
            return Err(ArrayError::ResolutionError {
                requested_kind: T::KIND,
                actual_kind: self.kind,
                requested_rank,
                actual_rank: populated.shape.rank(),
            });
        }
        Ok((&populated.shape, &populated.storage))
    }

    /// Mutable variant of [`resolve`](Self::resolve).
    pub(crate) fn resolve_mut<T: ArrayElement>(
        &mut self,
        requested_rank: usize,
    ) -> Result<(&ShapeDescriptor, &mut ArrayStorage), ArrayError> {
        let populated = self.contents.as_mut().ok_or(ArrayError::NullHandle)?;
        if T::KIND != self.kind || requested_rank != populated.shape.rank() {
            return Err(ArrayError::ResolutionError {
                requested_kind: T::KIND,
                actual_kind: self.kind,
                requested_rank,
                actual_rank: populated.shape.rank(),
            });
        }
        Ok((&populated.shape, &mut populated.storage))
    }

    /// Returns the array data as a flat slice.
    ///
    /// # Errors
    ///
    /// Fails with [`ArrayError::NullHandle`] on a null handle and
    /// [`ArrayError::ResolutionError`] if `T` does not match the handle's
    /// element kind.
    pub fn as_slice<T: ArrayElement>(&self) -> Result<&[T], ArrayError> {
        let rank = self.shape()?.rank();
        let (_, storage) = self.resolve::<T>(rank)?;
        // SAFETY: resolve checked that T matches the handle's element kind.
        Ok(unsafe { storage.as_slice::<T>() })
    }

    /// Returns the array data as a flat mutable slice.
    ///
    /// Mutating through a borrowed handle is permitted; the external owner
    /// retains responsibility for the storage's lifetime.
    pub fn as_mut_slice<T: ArrayElement>(&mut self) -> Result<&mut [T], ArrayError> {
        let rank = self.shape()?.rank();
        let (_, storage) = self.resolve_mut::<T>(rank)?;
        // SAFETY: resolve_mut checked that T matches the handle's element kind.
        Ok(unsafe { storage.as_mut_slice::<T>() })
    }
}

impl std::fmt::Debug for LocalArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut dbg = f.debug_struct("LocalArray");
        dbg.field("kind", &self.kind);
        match &self.contents {
            None => dbg.field("state", &"null").finish(),
            Some(populated) => dbg
                .field("shape", &populated.shape)
                .field("ownership", &populated.storage.ownership())
                .finish(),
        }
    }
}
