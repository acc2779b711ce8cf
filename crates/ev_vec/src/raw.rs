use crate::{
    AllocationKind, ElementBehavior, ElementLayout, FixedStorage, HeapStorage, Storage, VecError,
};
use log::{trace, warn};
use std::{
    fmt,
    iter::FusedIterator,
    marker::PhantomData,
    mem::{self, MaybeUninit},
    ptr::{self, NonNull},
};

/// A type-erased vector of fixed size elements.
///
/// The vector only knows the [`ElementLayout`] of its elements. Copying an element in or out goes
/// through the copy operation of its [`ElementBehavior`] (or a raw byte copy), removing an element
/// goes through the destroy operation. Where the memory comes from is decided by the [`Storage`].
pub struct RawVec<S: Storage> {
    storage: S,
    behavior: ElementBehavior,
}

/// A type-erased vector that owns a growable heap allocation.
pub type ErasedVec = RawVec<HeapStorage>;

/// A type-erased vector backed by a borrowed buffer that never grows.
pub type FixedErasedVec<'a> = RawVec<FixedStorage<'a>>;

impl ErasedVec {
    /// Constructs an empty vector of `elemsize` byte elements that are copied byte-for-byte and
    /// never destroyed.
    pub fn new(elemsize: usize) -> Result<Self, VecError> {
        Self::with_behavior(ElementLayout::from_size(elemsize), ElementBehavior::new())
    }

    /// Constructs an empty vector with room for [`RawVec::INITIAL_CAPACITY`] elements.
    pub fn with_behavior(
        layout: ElementLayout,
        behavior: ElementBehavior,
    ) -> Result<Self, VecError> {
        let storage = HeapStorage::allocate(layout, Self::INITIAL_CAPACITY)?;
        // Safety: a fresh allocation holds no elements and fits its capacity.
        Ok(unsafe { Self::from_storage(storage, behavior) })
    }
}

impl<'a> FixedErasedVec<'a> {
    /// Constructs an empty vector that stores up to `capacity` elements in `buffer`.
    pub fn new_fixed(
        buffer: &'a mut [MaybeUninit<u8>],
        capacity: usize,
        layout: ElementLayout,
        behavior: ElementBehavior,
    ) -> Result<Self, VecError> {
        let storage = FixedStorage::new(buffer, layout, capacity)?;
        // Safety: the buffer was checked to fit `capacity` elements and holds no live elements.
        Ok(unsafe { Self::from_storage(storage, behavior) })
    }

    /// Constructs a full vector over `buffer`; the first `capacity` elements are live.
    ///
    /// # Safety
    ///
    /// The first `capacity` elements of `buffer` must be initialized values the vector may take
    /// ownership of, i.e. destroying them once is valid.
    pub unsafe fn from_initialized(
        buffer: &'a mut [MaybeUninit<u8>],
        capacity: usize,
        layout: ElementLayout,
        behavior: ElementBehavior,
    ) -> Result<Self, VecError> {
        let mut vec = Self::new_fixed(buffer, capacity, layout, behavior)?;
        vec.storage.header_mut().length = capacity;
        Ok(vec)
    }
}

impl<S: Storage> RawVec<S> {
    /// The capacity of a newly constructed heap vector.
    pub const INITIAL_CAPACITY: usize = 8;

    /// The numerator of the factor by which [`RawVec::grow`] scales the capacity.
    pub const GROWTH_NUMERATOR: usize = 3;

    /// The denominator of the factor by which [`RawVec::grow`] scales the capacity.
    pub const GROWTH_DENOMINATOR: usize = 2;

    /// Constructs a vector from existing storage. The elements already marked live in the
    /// storage's header become owned by the vector.
    ///
    /// # Safety
    ///
    /// The header of `storage` must describe its buffer: `capacity` must not exceed the number
    /// of elements the buffer holds, `length` must not exceed `capacity`, and the first `length`
    /// elements must be initialized values that `behavior` may copy and destroy.
    ///
    /// ```compile_fail
    /// use ev_vec::{ElementBehavior, ElementLayout, HeapStorage, RawVec};
    ///
    /// let storage = HeapStorage::allocate(ElementLayout::of::<u32>(), 2).unwrap();
    /// let vec = RawVec::from_storage(storage, ElementBehavior::new());
    /// ```
    pub unsafe fn from_storage(storage: S, behavior: ElementBehavior) -> Self {
        Self { storage, behavior }
    }

    /// Returns the number of live elements.
    pub fn len(&self) -> usize {
        self.storage.header().length
    }

    /// Returns true if the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements the vector can hold without growing.
    pub fn capacity(&self) -> usize {
        self.storage.header().capacity
    }

    /// Returns who owns the memory of the vector.
    pub fn kind(&self) -> AllocationKind {
        self.storage.kind()
    }

    /// Returns the layout of a single element.
    pub fn element_layout(&self) -> ElementLayout {
        self.storage.element_layout()
    }

    /// Returns the copy and destroy operations of the elements.
    pub fn behavior(&self) -> &ElementBehavior {
        &self.behavior
    }

    /// Returns a pointer to the first element.
    ///
    /// The pointer is invalidated by any operation that may reallocate.
    pub fn as_ptr(&self) -> NonNull<u8> {
        self.storage.data()
    }

    /// Returns the address of the slot at `index`, which must not exceed the capacity.
    fn slot(&self, index: usize) -> NonNull<u8> {
        debug_assert!(index <= self.capacity());
        let offset = index * self.element_layout().stride();
        // Safety: the storage holds `capacity * stride` bytes, so the offset stays in bounds.
        unsafe { NonNull::new_unchecked(self.storage.data().as_ptr().add(offset)) }
    }

    /// Returns the address of the element at `index`, or `None` if it is out of bounds.
    pub fn get(&self, index: usize) -> Option<NonNull<u8>> {
        (index < self.len()).then(|| self.slot(index))
    }

    /// Returns the address of the last element, or `None` if the vector is empty.
    pub fn last(&self) -> Option<NonNull<u8>> {
        self.len().checked_sub(1).map(|index| self.slot(index))
    }

    /// Returns the capacity that follows `capacity` when growing.
    fn grown_capacity(capacity: usize) -> Result<usize, VecError> {
        let scaled = capacity
            .checked_mul(Self::GROWTH_NUMERATOR)
            .ok_or(VecError::OutOfMemory)?
            / Self::GROWTH_DENOMINATOR;
        let next = capacity.checked_add(1).ok_or(VecError::OutOfMemory)?;
        Ok(scaled.max(next))
    }

    /// Reallocates the buffer to hold exactly `capacity` elements.
    ///
    /// Shrinking below the current length discards the elements past the new capacity without
    /// destroying them and clamps the length to the new capacity. A fixed vector only accepts its
    /// current capacity.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), VecError> {
        if capacity == self.capacity() {
            return Ok(());
        }

        self.storage.resize(capacity)?;

        let header = self.storage.header_mut();
        if header.length > capacity {
            warn!(
                "capacity shrunk below length, discarding {} element(s) without destroying them",
                header.length - capacity
            );
            header.length = capacity;
        }
        Ok(())
    }

    /// Scales the capacity by `GROWTH_NUMERATOR / GROWTH_DENOMINATOR`, growing by at least one
    /// element.
    pub fn grow(&mut self) -> Result<(), VecError> {
        let capacity = Self::grown_capacity(self.capacity())?;
        self.set_capacity(capacity)
    }

    /// Sets the number of live elements.
    ///
    /// No element is initialized or destroyed: slots exposed by a larger length hold whatever
    /// bytes they held before, and elements cut off by a smaller length are forgotten. A heap
    /// vector grows as often as needed to fit `length` elements before any change is made; a fixed
    /// vector fails if `length` exceeds its capacity.
    pub fn set_len(&mut self, length: usize) -> Result<(), VecError> {
        if length > self.capacity() {
            if self.kind() == AllocationKind::Fixed {
                return Err(VecError::OutOfMemory);
            }
            let mut capacity = self.capacity();
            while capacity < length {
                capacity = Self::grown_capacity(capacity)?;
            }
            self.set_capacity(capacity)?;
        }

        self.storage.header_mut().length = length;
        Ok(())
    }

    /// Copies the element at `value` to the end of the vector, growing it if needed, and returns
    /// its index.
    ///
    /// # Safety
    ///
    /// `value` must point to an element of this vector's element layout that does not overlap the
    /// vector's buffer.
    pub unsafe fn push(&mut self, value: NonNull<u8>) -> Result<usize, VecError> {
        let index = self.len();
        if index == self.capacity() {
            if self.kind() == AllocationKind::Fixed {
                return Err(VecError::OutOfMemory);
            }
            self.grow()?;
        }

        self.behavior
            .copy(self.element_layout(), self.slot(index), value);
        self.storage.header_mut().length = index + 1;
        Ok(index)
    }

    /// Copies `count` elements starting at `values` to the end of the vector as one block of raw
    /// bytes and returns the index of the first of them.
    ///
    /// The copy operation of the vector is never invoked.
    ///
    /// # Safety
    ///
    /// `values` must point to `count` consecutive elements of this vector's element layout that
    /// do not overlap the vector's buffer.
    pub unsafe fn append(&mut self, values: NonNull<u8>, count: usize) -> Result<usize, VecError> {
        let index = self.len();
        let length = index.checked_add(count).ok_or(VecError::OutOfMemory)?;
        self.set_len(length)?;

        ptr::copy_nonoverlapping(
            values.as_ptr(),
            self.slot(index).as_ptr(),
            count * self.element_layout().stride(),
        );
        Ok(index)
    }

    /// Removes the last element, destroying it.
    pub fn pop(&mut self) -> Result<(), VecError> {
        let index = self.len().checked_sub(1).ok_or(VecError::Underflow)?;
        self.behavior.destroy(self.slot(index));
        self.storage.header_mut().length = index;
        Ok(())
    }

    /// Removes the last element, copying it to `out`. The receiver becomes responsible for the
    /// copied element; the vector does not destroy it.
    ///
    /// # Safety
    ///
    /// `out` must be valid for writing an element of this vector's element layout and must not
    /// overlap the vector's buffer.
    pub unsafe fn pop_into(&mut self, out: NonNull<u8>) -> Result<(), VecError> {
        let index = self.len().checked_sub(1).ok_or(VecError::Underflow)?;
        self.behavior
            .copy(self.element_layout(), out, self.slot(index));
        self.storage.header_mut().length = index;
        Ok(())
    }

    /// Destroys every element in order and sets the length to zero. The capacity is retained.
    ///
    /// The length is reset before the first element is destroyed, so a panicking destroy
    /// operation leaks the remaining elements instead of exposing destroyed ones.
    pub fn clear(&mut self) {
        let length = mem::replace(&mut self.storage.header_mut().length, 0);
        if self.behavior.has_destroy() {
            for index in 0..length {
                self.behavior.destroy(self.slot(index));
            }
        }
    }

    /// Returns an iterator over the addresses of the live elements.
    pub fn iter(&self) -> ElementIter<'_> {
        ElementIter {
            next: self.storage.data(),
            remaining: self.len(),
            stride: self.element_layout().stride(),
            _vec: PhantomData,
        }
    }

    /// Destroys every element and releases the memory owned by the vector.
    ///
    /// This is equivalent to dropping the vector.
    pub fn finalize(self) {
        drop(self);
    }
}

impl<S: Storage> Drop for RawVec<S> {
    fn drop(&mut self) {
        trace!(
            "finalizing {:?} vector with {} element(s)",
            self.kind(),
            self.len()
        );
        self.clear();
    }
}

impl<S: Storage> fmt::Debug for RawVec<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawVec")
            .field("kind", &self.kind())
            .field("length", &self.len())
            .field("capacity", &self.capacity())
            .field("layout", &self.element_layout())
            .field("behavior", &self.behavior)
            .finish()
    }
}

impl<'v, S: Storage> IntoIterator for &'v RawVec<S> {
    type Item = NonNull<u8>;
    type IntoIter = ElementIter<'v>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the element addresses of a [`RawVec`], from the first element up to but not
/// including one past the last.
#[derive(Clone)]
pub struct ElementIter<'v> {
    next: NonNull<u8>,
    remaining: usize,
    stride: usize,
    _vec: PhantomData<&'v ()>,
}

impl Iterator for ElementIter<'_> {
    type Item = NonNull<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining > 0 {
            let element = self.next;
            self.remaining -= 1;
            // Safety: at most one past the last element, which is still within the allocation.
            self.next = unsafe { NonNull::new_unchecked(self.next.as_ptr().add(self.stride)) };
            Some(element)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ElementIter<'_> {}

impl FusedIterator for ElementIter<'_> {}

#[cfg(test)]
mod tests {
    use super::ErasedVec;
    use crate::VecError;

    #[test]
    fn grown_capacity() {
        assert_eq!(ErasedVec::grown_capacity(0), Ok(1));
        assert_eq!(ErasedVec::grown_capacity(1), Ok(2));
        assert_eq!(ErasedVec::grown_capacity(2), Ok(3));
        assert_eq!(ErasedVec::grown_capacity(8), Ok(12));
        assert_eq!(ErasedVec::grown_capacity(12), Ok(18));
        assert_eq!(
            ErasedVec::grown_capacity(usize::MAX / 2),
            Err(VecError::OutOfMemory)
        );
    }

    #[test]
    fn new_vector_is_empty() {
        let vec = ErasedVec::new(4).unwrap();
        assert_eq!(vec.len(), 0);
        assert!(vec.is_empty());
        assert_eq!(vec.capacity(), ErasedVec::INITIAL_CAPACITY);
        assert!(vec.last().is_none());
        assert!(vec.get(0).is_none());
        assert_eq!(vec.iter().count(), 0);
    }

    #[test]
    fn pop_empty_is_underflow() {
        let mut vec = ErasedVec::new(4).unwrap();
        assert_eq!(vec.pop(), Err(VecError::Underflow));

        let mut out = 0u32;
        let out_ptr = std::ptr::NonNull::from(&mut out).cast();
        assert_eq!(unsafe { vec.pop_into(out_ptr) }, Err(VecError::Underflow));
        assert_eq!(vec.len(), 0);
    }
}
