//! The typed pointer bridge.
//!
//! Retrieving data from a type-erased [`LocalArray`] is a two-step pipeline:
//! first the handle is resolved to its concrete element type and rank
//! (failing with [`ArrayError::ResolutionError`] when the erased tags
//! disagree with the call site), then the data is exposed under the requested
//! aliasing mode: a pointer aliasing the handle's storage, or a freshly
//! allocated independent copy.

use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::element::ArrayElement;
use crate::error::ArrayError;
use crate::handle::LocalArray;
use crate::shape::ShapeDescriptor;
use crate::storage::ArrayStorage;

/// Aliasing mode for a retrieved data pointer.
///
/// The default is [`CopyFlag::Reference`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyFlag {
    /// The retrieved pointer aliases the handle's existing storage.
    #[default]
    Reference,
    /// The retrieved pointer targets a freshly allocated, independent copy.
    Copy,
}

/// A typed, rank-correct pointer aliasing a handle's storage.
///
/// The reference borrows the handle for `'a`, so its validity is bounded by
/// the handle's storage lifetime: the handle cannot be deallocated or
/// mutated while any reference-mode pointer is live.
pub struct ArrayRef<'a, T: ArrayElement, const N: usize> {
    ptr: NonNull<T>,
    shape: &'a ShapeDescriptor,
}

impl<'a, T: ArrayElement, const N: usize> ArrayRef<'a, T, N> {
    /// Returns the raw pointer to the first element.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the shape descriptor the pointer is valid for.
    ///
    /// Shared by reference with the handle's own descriptor.
    #[inline]
    pub fn shape(&self) -> &'a ShapeDescriptor {
        self.shape
    }

    /// Returns the per-dimension element counts.
    pub fn counts(&self) -> [usize; N] {
        let mut counts = [0; N];
        counts.copy_from_slice(self.shape.counts());
        counts
    }

    /// Returns the data as a flat slice.
    #[inline]
    pub fn as_slice(&self) -> &'a [T] {
        // SAFETY: the pointer and element count were validated at resolution
        // and the borrow of the handle keeps the storage alive for 'a.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.shape.numel()) }
    }

    /// Returns the element at a bounds-relative logical index.
    ///
    /// Indices are interpreted against the shape's lower bounds, so the
    /// first element of a freshly allocated (1-based) array sits at
    /// `[1, 1, ..]`. Returns `None` when any component is out of bounds.
    pub fn get(&self, index: [i64; N]) -> Option<&'a T> {
        let offset = self.shape.logical_offset(&index)?;
        // SAFETY: logical_offset returned an in-bounds element offset.
        unsafe { Some(&*self.ptr.as_ptr().add(offset)) }
    }
}

impl<T: ArrayElement, const N: usize> Clone for ArrayRef<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: ArrayElement, const N: usize> Copy for ArrayRef<'_, T, N> {}

/// A typed, rank-correct array holding an independent copy of a handle's
/// data.
///
/// The copy owns its storage: its lifetime is decoupled from the source
/// handle, and the buffer is released when the copy is dropped.
pub struct ArrayCopy<T: ArrayElement, const N: usize> {
    storage: ArrayStorage,
    shape: ShapeDescriptor,
    _marker: PhantomData<T>,
}

impl<T: ArrayElement, const N: usize> ArrayCopy<T, N> {
    /// Builds a copy from a descriptor and element data, revalidating that
    /// both agree with the static rank `N`.
    pub(crate) fn from_descriptor_vec(
        shape: ShapeDescriptor,
        data: Vec<T>,
    ) -> Result<Self, ArrayError> {
        if shape.rank() != N {
            return Err(ArrayError::ResolutionError {
                requested_kind: T::KIND,
                actual_kind: T::KIND,
                requested_rank: N,
                actual_rank: shape.rank(),
            });
        }
        if shape.numel() != data.len() {
            return Err(ArrayError::InvalidLength {
                expected: shape.numel(),
                actual: data.len(),
            });
        }
        let storage = ArrayStorage::from_vec(data)?;
        Ok(Self {
            storage,
            shape,
            _marker: PhantomData,
        })
    }

    /// Returns the raw pointer to the first element of the copy.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.storage.as_ptr().cast()
    }

    /// Returns the shape descriptor of the copy.
    ///
    /// Independent of the source handle's descriptor.
    #[inline]
    pub fn shape(&self) -> &ShapeDescriptor {
        &self.shape
    }

    /// Returns the per-dimension element counts.
    pub fn counts(&self) -> [usize; N] {
        let mut counts = [0; N];
        counts.copy_from_slice(self.shape.counts());
        counts
    }

    /// Returns the data as a flat slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the storage was built from a Vec<T> of matching length.
        unsafe { self.storage.as_slice::<T>() }
    }

    /// Returns the data as a flat mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: the storage was built from a Vec<T> of matching length and
        // the copy owns it exclusively.
        unsafe { self.storage.as_mut_slice::<T>() }
    }

    /// Returns the element at a bounds-relative logical index.
    pub fn get(&self, index: [i64; N]) -> Option<&T> {
        let offset = self.shape.logical_offset(&index)?;
        self.as_slice().get(offset)
    }

    /// Returns the mutable element at a bounds-relative logical index.
    pub fn get_mut(&mut self, index: [i64; N]) -> Option<&mut T> {
        let offset = self.shape.logical_offset(&index)?;
        self.as_mut_slice().get_mut(offset)
    }
}

impl<T: ArrayElement + std::fmt::Debug, const N: usize> std::fmt::Debug for ArrayCopy<T, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayCopy")
            .field("shape", &self.shape)
            .field("data", &self.as_slice())
            .finish()
    }
}

/// Output of the pointer bridge: a typed pointer under one of the two
/// aliasing modes.
pub enum DataPointer<'a, T: ArrayElement, const N: usize> {
    /// Pointer aliasing the handle's storage.
    Reference(ArrayRef<'a, T, N>),
    /// Pointer to an independent copy owned by the caller.
    Copy(ArrayCopy<T, N>),
}

impl<T: ArrayElement, const N: usize> DataPointer<'_, T, N> {
    /// Returns the shape descriptor the pointer is valid for.
    pub fn shape(&self) -> &ShapeDescriptor {
        match self {
            Self::Reference(reference) => reference.shape(),
            Self::Copy(copy) => copy.shape(),
        }
    }

    /// Returns the raw pointer to the first element.
    pub fn as_ptr(&self) -> *const T {
        match self {
            Self::Reference(reference) => reference.as_ptr(),
            Self::Copy(copy) => copy.as_ptr(),
        }
    }

    /// Returns the data as a flat slice.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Reference(reference) => reference.as_slice(),
            Self::Copy(copy) => copy.as_slice(),
        }
    }

    /// Returns the element at a bounds-relative logical index.
    pub fn get(&self, index: [i64; N]) -> Option<&T> {
        match self {
            Self::Reference(reference) => reference.get(index),
            Self::Copy(copy) => copy.get(index),
        }
    }
}

impl LocalArray {
    /// Retrieves a typed, rank-correct data pointer under the requested
    /// aliasing mode.
    ///
    /// Resolution happens first: a null handle fails with
    /// [`ArrayError::NullHandle`], and a `T`/`N` that disagrees with the
    /// handle's erased element kind or rank fails with
    /// [`ArrayError::ResolutionError`]. The aliasing step then either
    /// borrows the handle's storage ([`CopyFlag::Reference`]) or allocates
    /// an independent copy ([`CopyFlag::Copy`]).
    ///
    /// # Examples
    ///
    /// ```
    /// use larray::{CopyFlag, LocalArray};
    ///
    /// let array = LocalArray::from_vec::<f64>(&[2, 2], vec![1.0, 2.0, 3.0, 4.0])?;
    /// let pointer = array.data_ptr::<f64, 2>(CopyFlag::Reference)?;
    /// assert_eq!(pointer.get([2, 1]), Some(&3.0));
    /// # Ok::<(), larray::ArrayError>(())
    /// ```
    pub fn data_ptr<T: ArrayElement, const N: usize>(
        &self,
        flag: CopyFlag,
    ) -> Result<DataPointer<'_, T, N>, ArrayError> {
        match flag {
            CopyFlag::Reference => Ok(DataPointer::Reference(self.data_ref::<T, N>()?)),
            CopyFlag::Copy => Ok(DataPointer::Copy(self.data_copy::<T, N>()?)),
        }
    }

    /// Retrieves a reference-mode pointer aliasing the handle's storage.
    ///
    /// Equivalent to [`data_ptr`](Self::data_ptr) with
    /// [`CopyFlag::Reference`]. The returned reference shares the handle's
    /// shape descriptor and is invalidated, at compile time through the
    /// borrow, by any deallocation or mutation of the handle.
    pub fn data_ref<T: ArrayElement, const N: usize>(
        &self,
    ) -> Result<ArrayRef<'_, T, N>, ArrayError> {
        let (shape, storage) = self.resolve::<T>(N)?;
        let ptr = NonNull::new(storage.as_ptr().cast_mut().cast::<T>())
            .ok_or(ArrayError::NullHandle)?;
        Ok(ArrayRef { ptr, shape })
    }

    /// Retrieves a copy-mode pointer to an independent copy of the data.
    ///
    /// Equivalent to [`data_ptr`](Self::data_ptr) with [`CopyFlag::Copy`].
    /// The copy's storage and shape descriptor are independent of the source
    /// handle and are released when the [`ArrayCopy`] is dropped.
    pub fn data_copy<T: ArrayElement, const N: usize>(
        &self,
    ) -> Result<ArrayCopy<T, N>, ArrayError> {
        let (shape, storage) = self.resolve::<T>(N)?;
        // SAFETY: resolve checked that T matches the handle's element kind.
        let data = unsafe { storage.as_slice::<T>() }.to_vec();
        let storage = ArrayStorage::from_vec(data)?;
        log::trace!("copied {} array data", self.kind());
        Ok(ArrayCopy {
            storage,
            shape: shape.clone(),
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn reference_mode_aliases_storage() -> Result<(), ArrayError> {
        let array = LocalArray::from_vec::<i64>(&[4], vec![1, 2, 3, 4])?;
        let first = array.data_ref::<i64, 1>()?;
        let second = array.data_ref::<i64, 1>()?;
        assert_eq!(first.as_ptr(), second.as_ptr());
        assert_eq!(first.as_ptr(), array.as_slice::<i64>()?.as_ptr());
        assert_eq!(first.as_slice(), second.as_slice());
        Ok(())
    }

    #[test]
    fn copy_mode_is_independent() -> Result<(), ArrayError> {
        let mut array = LocalArray::allocate(ElementKind::Float64, &[3, 4])?;
        let mut copy = array.data_copy::<f64, 2>()?;
        assert_ne!(copy.as_ptr(), array.as_slice::<f64>()?.as_ptr());
        assert!(copy.as_slice().iter().all(|&v| v == 0.0));

        // Writing through the copy leaves the original untouched.
        *copy.get_mut([1, 1]).expect("in bounds") = 1.0;
        assert_eq!(array.data_ref::<f64, 2>()?.get([1, 1]), Some(&0.0));

        // And mutating the original leaves the copy untouched.
        array.as_mut_slice::<f64>()?[0] = 7.0;
        assert_eq!(copy.get([1, 1]), Some(&1.0));
        assert_eq!(copy.as_slice()[0], 1.0);
        Ok(())
    }

    #[test]
    fn data_ptr_dispatches_on_flag() -> Result<(), ArrayError> {
        let array = LocalArray::from_vec::<i32>(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;

        let reference = array.data_ptr::<i32, 2>(CopyFlag::Reference)?;
        assert!(matches!(reference, DataPointer::Reference(_)));
        assert_eq!(reference.as_ptr(), array.as_slice::<i32>()?.as_ptr());
        assert_eq!(reference.get([2, 1]), Some(&4));
        assert_eq!(reference.shape().counts(), &[2, 3]);

        let copy = array.data_ptr::<i32, 2>(CopyFlag::Copy)?;
        assert!(matches!(copy, DataPointer::Copy(_)));
        assert_ne!(copy.as_ptr(), array.as_slice::<i32>()?.as_ptr());
        assert_eq!(copy.as_slice(), array.as_slice::<i32>()?);
        Ok(())
    }

    #[test]
    fn default_flag_is_reference() {
        assert_eq!(CopyFlag::default(), CopyFlag::Reference);
    }

    #[test]
    fn resolution_rejects_wrong_kind_and_rank() -> Result<(), ArrayError> {
        let array = LocalArray::allocate(ElementKind::Float32, &[2, 2])?;
        assert!(matches!(
            array.data_ref::<f64, 2>(),
            Err(ArrayError::ResolutionError { .. })
        ));
        assert!(matches!(
            array.data_ref::<f32, 3>(),
            Err(ArrayError::ResolutionError { .. })
        ));
        assert!(array.data_ref::<f32, 2>().is_ok());
        Ok(())
    }

    #[test]
    fn null_handle_rejected() {
        let null = LocalArray::null(ElementKind::Int64);
        assert!(matches!(
            null.data_ptr::<i64, 1>(CopyFlag::Reference),
            Err(ArrayError::NullHandle)
        ));
        assert!(matches!(
            null.data_ptr::<i64, 1>(CopyFlag::Copy),
            Err(ArrayError::NullHandle)
        ));
    }

    #[test]
    fn logical_indexing_is_one_based() -> Result<(), ArrayError> {
        let array = LocalArray::from_vec::<i32>(&[2, 3], vec![1, 2, 3, 4, 5, 6])?;
        let reference = array.data_ref::<i32, 2>()?;
        assert_eq!(reference.get([1, 1]), Some(&1));
        assert_eq!(reference.get([1, 3]), Some(&3));
        assert_eq!(reference.get([2, 1]), Some(&4));
        assert_eq!(reference.get([2, 3]), Some(&6));
        assert_eq!(reference.get([0, 1]), None);
        assert_eq!(reference.get([3, 1]), None);
        assert_eq!(reference.get([2, 4]), None);
        Ok(())
    }

    #[test]
    fn rank7_round_trip() -> Result<(), ArrayError> {
        let counts = [1, 1, 2, 1, 1, 1, 2];
        let array = LocalArray::allocate(ElementKind::Int32, &counts)?;
        let reference = array.data_ref::<i32, 7>()?;
        assert_eq!(reference.counts(), counts);
        assert_eq!(reference.get([1, 1, 2, 1, 1, 1, 2]), Some(&0));
        assert_eq!(reference.get([1, 1, 3, 1, 1, 1, 1]), None);
        Ok(())
    }

    #[test]
    fn copy_from_wrapped_storage() -> Result<(), ArrayError> {
        let mut backing = vec![1.5f32, 2.5, 3.5, 4.5];
        let shape = ShapeDescriptor::contiguous(&[4])?;
        let array =
            unsafe { LocalArray::wrap(ElementKind::Float32, backing.as_mut_ptr().cast(), shape) }?;
        let copy = array.data_copy::<f32, 1>()?;
        drop(array);
        // The copy outlives the handle and still owns its own buffer.
        assert_eq!(copy.as_slice(), &[1.5, 2.5, 3.5, 4.5]);
        assert_eq!(backing, vec![1.5, 2.5, 3.5, 4.5]);
        Ok(())
    }
}
