use super::{AllocationKind, Storage};
use crate::{
    header::{allocation_layout, data_from_header},
    ElementLayout, VecError, VecHeader,
};
use log::{debug, trace};
use std::{
    alloc::{self, Layout},
    ptr::NonNull,
};

/// Owns a single allocation holding the [`VecHeader`] directly followed by the elements.
///
/// Dropping a `HeapStorage` frees its memory but does not destroy the elements it contains.
pub struct HeapStorage {
    header: NonNull<VecHeader>,
    layout: Layout,
    elem: ElementLayout,
}

impl HeapStorage {
    /// Allocates memory for `capacity` elements with the given layout.
    pub fn allocate(elem: ElementLayout, capacity: usize) -> Result<Self, VecError> {
        let (layout, _) = allocation_layout(elem, capacity)?;

        // Safety: the layout always includes the header, so its size is never zero.
        let header = NonNull::new(unsafe { alloc::alloc(layout) })
            .ok_or(VecError::OutOfMemory)?
            .cast::<VecHeader>();
        unsafe {
            header.as_ptr().write(VecHeader {
                length: 0,
                capacity,
            });
        }

        trace!(
            "allocated vector of {capacity} element(s) of {} byte(s)",
            elem.size()
        );
        Ok(Self {
            header,
            layout,
            elem,
        })
    }

    /// Returns the layout of the current allocation.
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

unsafe impl Storage for HeapStorage {
    fn kind(&self) -> AllocationKind {
        AllocationKind::Heap
    }

    fn element_layout(&self) -> ElementLayout {
        self.elem
    }

    fn header(&self) -> &VecHeader {
        // Safety: the header is initialized on allocation and lives as long as `self`.
        unsafe { self.header.as_ref() }
    }

    fn header_mut(&mut self) -> &mut VecHeader {
        // Safety: the header is initialized on allocation and lives as long as `self`.
        unsafe { self.header.as_mut() }
    }

    fn data(&self) -> NonNull<u8> {
        // Safety: the allocation was laid out by `allocation_layout` with `self.elem`.
        unsafe { data_from_header(self.header, self.elem) }
    }

    fn resize(&mut self, capacity: usize) -> Result<(), VecError> {
        let old_capacity = self.header().capacity;
        if capacity == old_capacity {
            return Ok(());
        }

        let (layout, _) = allocation_layout(self.elem, capacity)?;
        debug_assert_eq!(layout.align(), self.layout.align());

        // Safety: `self.header` was allocated with `self.layout` and both layouts share the same
        // alignment. The new size is non-zero and does not overflow `isize`.
        let header =
            unsafe { alloc::realloc(self.header.as_ptr().cast(), self.layout, layout.size()) };
        let header = NonNull::new(header)
            .ok_or(VecError::OutOfMemory)?
            .cast::<VecHeader>();

        self.header = header;
        self.layout = layout;
        self.header_mut().capacity = capacity;

        debug!("reallocated vector from {old_capacity} to {capacity} element(s)");
        Ok(())
    }
}

impl Drop for HeapStorage {
    fn drop(&mut self) {
        // Safety: `self.header` was allocated with `self.layout`.
        unsafe { alloc::dealloc(self.header.as_ptr().cast(), self.layout) }
    }
}
