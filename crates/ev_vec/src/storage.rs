mod fixed;
mod heap;

use crate::{ElementLayout, VecError, VecHeader};
use std::ptr::NonNull;

pub use fixed::FixedStorage;
pub use heap::HeapStorage;

/// Describes who owns the memory of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AllocationKind {
    /// The vector owns its buffer and may reallocate it.
    Heap,
    /// The vector borrows a buffer of immutable capacity.
    Fixed,
}

/// The backing memory of a vector.
///
/// A storage keeps the [`VecHeader`] and the element buffer of a vector together and decides
/// whether the buffer can be resized. It never inspects or drops the elements it holds.
///
/// # Safety
///
/// As long as the header is only changed through [`Storage::resize`], [`Storage::data`] must
/// point to a buffer that is valid for reads and writes of `header().capacity` elements of
/// [`Storage::element_layout`] and aligned to its alignment. A successful `resize` must update
/// `header().capacity` to the new capacity.
pub unsafe trait Storage {
    /// Returns who owns the memory.
    fn kind(&self) -> AllocationKind;

    /// Returns the layout of the stored elements.
    fn element_layout(&self) -> ElementLayout;

    /// Returns the metadata of the vector.
    fn header(&self) -> &VecHeader;

    /// Returns the metadata of the vector.
    ///
    /// Raising the capacity through the returned reference breaks the guarantees of the storage;
    /// a vector must not be built from such a storage.
    fn header_mut(&mut self) -> &mut VecHeader;

    /// Returns a pointer to the first element.
    ///
    /// The pointer is invalidated by a successful [`Storage::resize`].
    fn data(&self) -> NonNull<u8>;

    /// Changes the capacity of the buffer to exactly `capacity` elements. Elements beyond the new
    /// capacity are lost; the header's length is left untouched.
    ///
    /// On failure the storage is left unchanged.
    fn resize(&mut self, capacity: usize) -> Result<(), VecError>;
}
