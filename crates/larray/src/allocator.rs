use std::alloc;
use std::alloc::Layout;

use thiserror::Error;

/// An error type for array allocator operations.
#[derive(Debug, Error, PartialEq)]
pub enum AllocatorError {
    /// The requested layout is invalid.
    #[error("Invalid storage layout {0}")]
    LayoutError(core::alloc::LayoutError),

    /// The allocator returned a null pointer.
    #[error("Null pointer")]
    NullPointer,

    /// The requested storage size overflows the address space.
    #[error("Storage size overflow")]
    SizeOverflow,
}

/// A trait for allocating and deallocating array storage.
///
/// # Methods
///
/// * `alloc` - Allocates storage for an array with the given layout.
/// * `dealloc` - Deallocates storage for an array with the given layout.
pub trait ArrayAllocator: Clone {
    /// Allocates storage with the given layout.
    ///
    /// The layout must have a non-zero size.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, AllocatorError>;

    /// Deallocates storage with the given layout.
    fn dealloc(&self, ptr: *mut u8, layout: Layout);
}

/// An array allocator backed by the system allocator.
#[derive(Clone, Default)]
pub struct HostAllocator;

impl ArrayAllocator for HostAllocator {
    /// Allocates storage with the given layout.
    ///
    /// # Arguments
    ///
    /// * `layout` - The layout of the storage, with non-zero size.
    ///
    /// # Returns
    ///
    /// A non-null pointer to the allocated storage if successful, otherwise an error.
    fn alloc(&self, layout: Layout) -> Result<*mut u8, AllocatorError> {
        let ptr = unsafe { alloc::alloc(layout) };
        if ptr.is_null() {
            Err(AllocatorError::NullPointer)?
        }
        Ok(ptr)
    }

    /// Deallocates storage with the given layout.
    ///
    /// # Arguments
    ///
    /// * `ptr` - A non-null pointer to the allocated storage.
    /// * `layout` - The layout used for the allocation.
    ///
    /// # Safety
    ///
    /// The pointer must be non-null and the layout must be correct.
    #[allow(clippy::not_unsafe_ptr_arg_deref)]
    fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        if !ptr.is_null() {
            unsafe { alloc::dealloc(ptr, layout) }
        }
    }
}
