//! Shape descriptors for rank-polymorphic arrays.

use crate::error::ArrayError;

/// Maximum supported dimensionality.
pub const MAX_RANK: usize = 7;

/// Describes the shape and layout of a local array.
///
/// The descriptor records the rank together with per-dimension element
/// counts, inclusive index bounds, and layout metadata. All per-dimension
/// data lives in fixed [`MAX_RANK`]-length arrays of which only the first
/// `rank` entries are meaningful, so a descriptor for any rank has the same
/// in-memory field set and ordering: rank, counts, lower bound, upper bound,
/// strides, offsets. External code generated against that layout can rely on
/// the ordering.
///
/// # Invariants
///
/// * `1 <= rank <= MAX_RANK`, immutable after creation.
/// * `counts[i] > 0` for every active dimension.
/// * `upper_bound[i] - lower_bound[i] + 1 == counts[i]` for every active
///   dimension.
/// * `strides` and `offsets` are zero when the storage is contiguous and
///   owned by the handle.
///
/// # Examples
///
/// ```
/// use larray::ShapeDescriptor;
///
/// let shape = ShapeDescriptor::contiguous(&[3, 4])?;
/// assert_eq!(shape.rank(), 2);
/// assert_eq!(shape.counts(), &[3, 4]);
/// assert_eq!(shape.lower_bound(), &[1, 1]);
/// assert_eq!(shape.upper_bound(), &[3, 4]);
/// assert_eq!(shape.numel(), 12);
/// # Ok::<(), larray::ArrayError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShapeDescriptor {
    rank: usize,
    counts: [usize; MAX_RANK],
    lower_bound: [i64; MAX_RANK],
    upper_bound: [i64; MAX_RANK],
    strides: [i64; MAX_RANK],
    offsets: [i64; MAX_RANK],
}

impl ShapeDescriptor {
    /// Builds the descriptor of a contiguous, handle-owned array.
    ///
    /// Bounds are 1-based: `lower_bound = 1` and `upper_bound = counts` per
    /// dimension. Strides and offsets are zero, marking the storage as
    /// contiguous.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidRank`] if `counts.len()` is outside
    /// `[1, MAX_RANK]` and [`ArrayError::InvalidCount`] if any dimension has
    /// a zero count.
    pub fn contiguous(counts: &[usize]) -> Result<Self, ArrayError> {
        Self::with_lower_bounds(counts, &[1; MAX_RANK][..counts.len().min(MAX_RANK)])
    }

    /// Builds a descriptor with explicit per-dimension lower bounds.
    ///
    /// The upper bounds follow from `upper = lower + count - 1`. Used when
    /// adopting externally-owned storage whose index origin differs from the
    /// 1-based default.
    ///
    /// # Errors
    ///
    /// Returns [`ArrayError::InvalidRank`] if `counts.len()` is outside
    /// `[1, MAX_RANK]` or `lower.len()` differs from it, and
    /// [`ArrayError::InvalidCount`] if any dimension has a zero count.
    pub fn with_lower_bounds(counts: &[usize], lower: &[i64]) -> Result<Self, ArrayError> {
        let rank = counts.len();
        if rank == 0 || rank > MAX_RANK {
            return Err(ArrayError::InvalidRank { rank });
        }
        if lower.len() != rank {
            return Err(ArrayError::InvalidRank { rank: lower.len() });
        }

        let mut shape = Self {
            rank,
            counts: [0; MAX_RANK],
            lower_bound: [0; MAX_RANK],
            upper_bound: [0; MAX_RANK],
            strides: [0; MAX_RANK],
            offsets: [0; MAX_RANK],
        };
        for dim in 0..rank {
            let count = counts[dim];
            let span = Self::dim_span(dim, count)?;
            let upper = lower[dim]
                .checked_add(span)
                .ok_or(ArrayError::InvalidCount { dim, count })?;
            shape.counts[dim] = count;
            shape.lower_bound[dim] = lower[dim];
            shape.upper_bound[dim] = upper;
        }
        Ok(shape)
    }

    /// Rebuilds a descriptor from its raw field set, revalidating the
    /// invariants. Used when decoding a descriptor from an external encoding.
    pub(crate) fn from_raw_parts(
        rank: usize,
        counts: [usize; MAX_RANK],
        lower_bound: [i64; MAX_RANK],
        upper_bound: [i64; MAX_RANK],
        strides: [i64; MAX_RANK],
        offsets: [i64; MAX_RANK],
    ) -> Result<Self, ArrayError> {
        if rank == 0 || rank > MAX_RANK {
            return Err(ArrayError::InvalidRank { rank });
        }
        for dim in 0..rank {
            let count = counts[dim];
            let span = Self::dim_span(dim, count)?;
            let upper = lower_bound[dim].checked_add(span);
            if upper != Some(upper_bound[dim]) {
                return Err(ArrayError::InvalidCount { dim, count });
            }
        }
        Ok(Self {
            rank,
            counts,
            lower_bound,
            upper_bound,
            strides,
            offsets,
        })
    }

    /// Validates one dimension's count and returns `count - 1` as the
    /// inclusive bound span.
    fn dim_span(dim: usize, count: usize) -> Result<i64, ArrayError> {
        if count == 0 || count > i64::MAX as usize {
            return Err(ArrayError::InvalidCount { dim, count });
        }
        Ok(count as i64 - 1)
    }

    /// Returns the number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the element count of each dimension.
    #[inline]
    pub fn counts(&self) -> &[usize] {
        &self.counts[..self.rank]
    }

    /// Returns the inclusive lower index bound of each dimension.
    #[inline]
    pub fn lower_bound(&self) -> &[i64] {
        &self.lower_bound[..self.rank]
    }

    /// Returns the inclusive upper index bound of each dimension.
    #[inline]
    pub fn upper_bound(&self) -> &[i64] {
        &self.upper_bound[..self.rank]
    }

    /// Returns the per-dimension stride metadata.
    ///
    /// All-zero for contiguous, handle-owned storage.
    #[inline]
    pub fn strides(&self) -> &[i64] {
        &self.strides[..self.rank]
    }

    /// Returns the per-dimension offset metadata.
    ///
    /// All-zero for contiguous, handle-owned storage.
    #[inline]
    pub fn offsets(&self) -> &[i64] {
        &self.offsets[..self.rank]
    }

    /// Returns the total number of elements.
    #[inline]
    pub fn numel(&self) -> usize {
        self.counts().iter().product()
    }

    /// Returns the total number of elements, or `None` on overflow.
    pub(crate) fn checked_numel(&self) -> Option<usize> {
        self.counts()
            .iter()
            .try_fold(1usize, |acc, &count| acc.checked_mul(count))
    }

    /// Raw field access for encoders. Fields come back in wire order.
    #[cfg(feature = "bincode")]
    pub(crate) fn raw_parts(
        &self,
    ) -> (
        usize,
        &[usize; MAX_RANK],
        &[i64; MAX_RANK],
        &[i64; MAX_RANK],
        &[i64; MAX_RANK],
        &[i64; MAX_RANK],
    ) {
        (
            self.rank,
            &self.counts,
            &self.lower_bound,
            &self.upper_bound,
            &self.strides,
            &self.offsets,
        )
    }

    /// Row-major element strides derived from the counts.
    ///
    /// The rightmost dimension varies fastest. Only the first `rank` entries
    /// are meaningful.
    fn element_strides(&self) -> [usize; MAX_RANK] {
        let mut strides = [0usize; MAX_RANK];
        let mut stride = 1;
        for dim in (0..self.rank).rev() {
            strides[dim] = stride;
            stride *= self.counts[dim];
        }
        strides
    }

    /// Maps a bounds-relative logical index to a flat element offset.
    ///
    /// Indices are interpreted against the descriptor's lower bounds, so the
    /// first element of a 1-based array sits at logical index `[1, 1, ..]`.
    /// Returns `None` if the index length differs from the rank or any
    /// component falls outside its `[lower, upper]` range.
    pub(crate) fn logical_offset(&self, index: &[i64]) -> Option<usize> {
        if index.len() != self.rank {
            return None;
        }
        let strides = self.element_strides();
        let mut offset = 0usize;
        for dim in 0..self.rank {
            let idx = index[dim];
            if idx < self.lower_bound[dim] || idx > self.upper_bound[dim] {
                return None;
            }
            offset += (idx - self.lower_bound[dim]) as usize * strides[dim];
        }
        Some(offset)
    }
}

impl std::fmt::Display for ShapeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rank {} {:?}", self.rank, self.counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_rank2() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::contiguous(&[3, 4])?;
        assert_eq!(shape.rank(), 2);
        assert_eq!(shape.counts(), &[3, 4]);
        assert_eq!(shape.lower_bound(), &[1, 1]);
        assert_eq!(shape.upper_bound(), &[3, 4]);
        assert_eq!(shape.strides(), &[0, 0]);
        assert_eq!(shape.offsets(), &[0, 0]);
        assert_eq!(shape.numel(), 12);
        Ok(())
    }

    #[test]
    fn contiguous_rank7() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::contiguous(&[2, 1, 3, 1, 2, 1, 2])?;
        assert_eq!(shape.rank(), 7);
        assert_eq!(shape.numel(), 24);
        Ok(())
    }

    #[test]
    fn rank_zero_rejected() {
        assert_eq!(
            ShapeDescriptor::contiguous(&[]),
            Err(ArrayError::InvalidRank { rank: 0 })
        );
    }

    #[test]
    fn rank_eight_rejected() {
        assert_eq!(
            ShapeDescriptor::contiguous(&[1; 8]),
            Err(ArrayError::InvalidRank { rank: 8 })
        );
    }

    #[test]
    fn zero_count_rejected() {
        assert_eq!(
            ShapeDescriptor::contiguous(&[3, 0, 2]),
            Err(ArrayError::InvalidCount { dim: 1, count: 0 })
        );
    }

    #[test]
    fn custom_lower_bounds() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::with_lower_bounds(&[3, 4], &[0, -2])?;
        assert_eq!(shape.lower_bound(), &[0, -2]);
        assert_eq!(shape.upper_bound(), &[2, 1]);
        Ok(())
    }

    #[test]
    fn bound_count_invariant() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::with_lower_bounds(&[5], &[-10])?;
        for dim in 0..shape.rank() {
            assert_eq!(
                shape.upper_bound()[dim] - shape.lower_bound()[dim] + 1,
                shape.counts()[dim] as i64
            );
        }
        Ok(())
    }

    #[test]
    fn logical_offset_row_major() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::contiguous(&[2, 3])?;
        assert_eq!(shape.logical_offset(&[1, 1]), Some(0));
        assert_eq!(shape.logical_offset(&[1, 3]), Some(2));
        assert_eq!(shape.logical_offset(&[2, 1]), Some(3));
        assert_eq!(shape.logical_offset(&[2, 3]), Some(5));
        assert_eq!(shape.logical_offset(&[0, 1]), None);
        assert_eq!(shape.logical_offset(&[2, 4]), None);
        assert_eq!(shape.logical_offset(&[1]), None);
        Ok(())
    }

    #[test]
    fn logical_offset_honors_origin() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::with_lower_bounds(&[2, 2], &[0, 0])?;
        assert_eq!(shape.logical_offset(&[0, 0]), Some(0));
        assert_eq!(shape.logical_offset(&[1, 1]), Some(3));
        assert_eq!(shape.logical_offset(&[2, 0]), None);
        Ok(())
    }

    #[test]
    fn checked_numel_overflow() -> Result<(), ArrayError> {
        let shape = ShapeDescriptor::contiguous(&[1 << 40, 1 << 40])?;
        assert_eq!(shape.checked_numel(), None);
        Ok(())
    }

    #[test]
    fn from_raw_parts_revalidates() {
        let shape = ShapeDescriptor::contiguous(&[2, 2]).unwrap();
        let rebuilt = ShapeDescriptor::from_raw_parts(
            shape.rank,
            shape.counts,
            shape.lower_bound,
            shape.upper_bound,
            shape.strides,
            shape.offsets,
        )
        .unwrap();
        assert_eq!(rebuilt, shape);

        let mut bad_upper = shape.upper_bound;
        bad_upper[0] = 7;
        assert!(ShapeDescriptor::from_raw_parts(
            shape.rank,
            shape.counts,
            shape.lower_bound,
            bad_upper,
            shape.strides,
            shape.offsets,
        )
        .is_err());
    }
}
