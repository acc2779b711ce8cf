use super::{AllocationKind, Storage};
use crate::{ElementLayout, VecError, VecHeader};
use log::trace;
use std::{marker::PhantomData, mem::MaybeUninit, ptr::NonNull};

/// Borrows a caller provided buffer of immutable capacity.
///
/// The header lives next to the borrowed pointer instead of inside the buffer; the buffer only
/// holds elements. The buffer is never freed.
pub struct FixedStorage<'a> {
    data: NonNull<u8>,
    header: VecHeader,
    elem: ElementLayout,
    _buffer: PhantomData<&'a mut [MaybeUninit<u8>]>,
}

impl<'a> FixedStorage<'a> {
    /// Wraps `buffer` to hold at most `capacity` elements.
    ///
    /// Fails with [`VecError::InvalidBuffer`] if the buffer is too small for `capacity` elements
    /// or is not aligned to the element alignment.
    pub fn new(
        buffer: &'a mut [MaybeUninit<u8>],
        elem: ElementLayout,
        capacity: usize,
    ) -> Result<Self, VecError> {
        let required = elem
            .stride()
            .checked_mul(capacity)
            .ok_or(VecError::InvalidBuffer)?;
        if buffer.len() < required {
            return Err(VecError::InvalidBuffer);
        }
        if required > 0 && buffer.as_ptr().align_offset(elem.align()) != 0 {
            return Err(VecError::InvalidBuffer);
        }

        trace!("borrowed fixed buffer of {capacity} element(s)");
        Ok(Self {
            data: NonNull::from(buffer).cast(),
            header: VecHeader {
                length: 0,
                capacity,
            },
            elem,
            _buffer: PhantomData,
        })
    }

    /// Wraps a buffer of `T` slots. The capacity equals the number of slots.
    pub fn for_elements<T>(buffer: &'a mut [MaybeUninit<T>]) -> Self {
        let capacity = buffer.len();
        Self {
            data: NonNull::from(buffer).cast(),
            header: VecHeader {
                length: 0,
                capacity,
            },
            elem: ElementLayout::of::<T>(),
            _buffer: PhantomData,
        }
    }
}

unsafe impl Storage for FixedStorage<'_> {
    fn kind(&self) -> AllocationKind {
        AllocationKind::Fixed
    }

    fn element_layout(&self) -> ElementLayout {
        self.elem
    }

    fn header(&self) -> &VecHeader {
        &self.header
    }

    fn header_mut(&mut self) -> &mut VecHeader {
        &mut self.header
    }

    fn data(&self) -> NonNull<u8> {
        self.data
    }

    fn resize(&mut self, capacity: usize) -> Result<(), VecError> {
        if capacity == self.header.capacity {
            Ok(())
        } else {
            Err(VecError::OutOfMemory)
        }
    }
}
