//! Element kind tags and the sealed element trait.
//!
//! The bridge supports a closed set of numeric element types: two integer
//! widths and two floating-point widths. The set is closed in both directions:
//! [`ElementKind`] is the runtime tag stored in a type-erased handle, and
//! [`ArrayElement`] is the compile-time side, implemented for exactly the four
//! primitive types the tag can name.

use num_traits::Zero;

/// Runtime tag naming the numeric type of an array's elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// 32-bit signed integer elements (`i32`).
    Int32,
    /// 64-bit signed integer elements (`i64`).
    Int64,
    /// 32-bit floating-point elements (`f32`).
    Float32,
    /// 64-bit floating-point elements (`f64`).
    Float64,
}

impl ElementKind {
    /// Returns the size of one element of this kind in bytes.
    #[inline]
    pub fn size_of(&self) -> usize {
        match self {
            Self::Int32 => std::mem::size_of::<i32>(),
            Self::Int64 => std::mem::size_of::<i64>(),
            Self::Float32 => std::mem::size_of::<f32>(),
            Self::Float64 => std::mem::size_of::<f64>(),
        }
    }

    /// Returns the alignment of one element of this kind in bytes.
    #[inline]
    pub fn align_of(&self) -> usize {
        match self {
            Self::Int32 => std::mem::align_of::<i32>(),
            Self::Int64 => std::mem::align_of::<i64>(),
            Self::Float32 => std::mem::align_of::<f32>(),
            Self::Float64 => std::mem::align_of::<f64>(),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        };
        write!(f, "{name}")
    }
}

mod private {
    /// Seals the ArrayElement trait to the four supported primitives.
    pub trait Sealed {}

    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Marker trait for types usable as array elements.
///
/// This trait is sealed: only `i32`, `i64`, `f32`, and `f64` implement it.
/// Together with a const-generic rank parameter it forms the compile-time
/// half of the dispatch over every supported (type, rank) combination: one
/// generic code path monomorphized per combination instead of hand-expanded
/// bodies.
///
/// # Examples
///
/// ```
/// use larray::{ArrayElement, ElementKind};
///
/// assert_eq!(<f64 as ArrayElement>::KIND, ElementKind::Float64);
/// assert_eq!(ElementKind::Float64.size_of(), 8);
/// ```
pub trait ArrayElement: private::Sealed + Copy + Zero + 'static {
    /// The runtime tag corresponding to this element type.
    const KIND: ElementKind;
}

impl ArrayElement for i32 {
    const KIND: ElementKind = ElementKind::Int32;
}

impl ArrayElement for i64 {
    const KIND: ElementKind = ElementKind::Int64;
}

impl ArrayElement for f32 {
    const KIND: ElementKind = ElementKind::Float32;
}

impl ArrayElement for f64 {
    const KIND: ElementKind = ElementKind::Float64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_sizes() {
        assert_eq!(ElementKind::Int32.size_of(), 4);
        assert_eq!(ElementKind::Int64.size_of(), 8);
        assert_eq!(ElementKind::Float32.size_of(), 4);
        assert_eq!(ElementKind::Float64.size_of(), 8);
    }

    #[test]
    fn kind_tags() {
        assert_eq!(<i32 as ArrayElement>::KIND, ElementKind::Int32);
        assert_eq!(<i64 as ArrayElement>::KIND, ElementKind::Int64);
        assert_eq!(<f32 as ArrayElement>::KIND, ElementKind::Float32);
        assert_eq!(<f64 as ArrayElement>::KIND, ElementKind::Float64);
    }

    #[test]
    fn kind_display() {
        assert_eq!(ElementKind::Float64.to_string(), "float64");
        assert_eq!(ElementKind::Int32.to_string(), "int32");
    }
}
