//! The metadata of a vector and the layout of its heap allocation.

use crate::{ElementLayout, VecError};
use std::{alloc::Layout, ptr::NonNull};

/// The metadata of a vector.
///
/// Heap allocated vectors store the header in the same allocation as their elements. The memory
/// of such a vector looks like this:
///
/// ```text
/// allocation ──►┌──────────────┐
///               │ VecHeader    │
///               └─┬────────────┘
///                 │ padding to align elements
/// data ────────►┌─┴────────────┐
///               │ element #0   │
///               └──────────────┘
///                :
///               ┌──────────────┐
///               │ element #n-1 │
///               └──────────────┘
/// ```
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VecHeader {
    /// The number of live elements.
    pub length: usize,
    /// The number of elements that fit in the buffer before it needs to grow.
    pub capacity: usize,
}

/// Creates a layout describing `n` consecutive elements.
fn repeat_layout(elem: ElementLayout, n: usize) -> Result<Layout, VecError> {
    let alloc_size = elem
        .stride()
        .checked_mul(n)
        .ok_or(VecError::OutOfMemory)?;
    Layout::from_size_align(alloc_size, elem.align()).map_err(|_| VecError::OutOfMemory)
}

/// Returns the offset in bytes of the first element relative to the start of the header.
pub fn data_offset(elem: ElementLayout) -> usize {
    Layout::new::<VecHeader>()
        .size()
        .next_multiple_of(elem.align())
}

/// Returns the layout of a single allocation holding a header followed by `capacity` elements,
/// together with the offset of the first element.
pub fn allocation_layout(
    elem: ElementLayout,
    capacity: usize,
) -> Result<(Layout, usize), VecError> {
    let elements = repeat_layout(elem, capacity)?;
    let (layout, offset) = Layout::new::<VecHeader>()
        .extend(elements)
        .map_err(|_| VecError::OutOfMemory)?;
    Ok((layout.pad_to_align(), offset))
}

/// Recovers the header of a heap allocated vector from a pointer to its first element.
///
/// # Safety
///
/// `data` must point to the first element of an allocation laid out by [`allocation_layout`] with
/// the same `elem`.
pub unsafe fn header_from_data(data: NonNull<u8>, elem: ElementLayout) -> NonNull<VecHeader> {
    NonNull::new_unchecked(data.as_ptr().sub(data_offset(elem))).cast()
}

/// Returns a pointer to the first element of the allocation that starts with `header`.
///
/// # Safety
///
/// `header` must point to an allocation laid out by [`allocation_layout`] with the same `elem`.
pub unsafe fn data_from_header(header: NonNull<VecHeader>, elem: ElementLayout) -> NonNull<u8> {
    NonNull::new_unchecked(header.as_ptr().cast::<u8>().add(data_offset(elem)))
}

#[cfg(test)]
mod tests {
    use super::{allocation_layout, data_offset, VecHeader};
    use crate::{ElementLayout, VecError};
    use std::{alloc::Layout, mem};

    #[test]
    fn offset_follows_header() {
        let header_size = mem::size_of::<VecHeader>();
        assert_eq!(data_offset(ElementLayout::from_size(1)), header_size);
        assert_eq!(data_offset(ElementLayout::of::<u64>()), header_size);

        let over_aligned = ElementLayout::from_layout(Layout::from_size_align(64, 64).unwrap());
        assert_eq!(data_offset(over_aligned), 64);
    }

    #[test]
    fn allocation_holds_header_and_elements() {
        let elem = ElementLayout::from_size(4);
        let (layout, offset) = allocation_layout(elem, 8).unwrap();
        assert_eq!(offset, data_offset(elem));
        assert_eq!(layout.size(), offset + 32);
        assert!(layout.align() >= mem::align_of::<VecHeader>());
    }

    #[test]
    fn zero_capacity_still_holds_header() {
        let (layout, offset) = allocation_layout(ElementLayout::from_size(4), 0).unwrap();
        assert_eq!(layout.size(), offset);
        assert!(layout.size() > 0);
    }

    #[test]
    fn overflow_is_out_of_memory() {
        assert_eq!(
            allocation_layout(ElementLayout::from_size(16), usize::MAX / 8),
            Err(VecError::OutOfMemory)
        );
        assert_eq!(
            allocation_layout(ElementLayout::from_size(1), isize::MAX as usize),
            Err(VecError::OutOfMemory)
        );
    }
}
