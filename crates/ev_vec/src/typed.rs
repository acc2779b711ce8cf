use crate::{
    ElementBehavior, ElementLayout, ErasedVec, FixedStorage, HeapStorage, RawVec, Storage, VecError,
};
use std::{
    fmt,
    marker::PhantomData,
    mem::{self, ManuallyDrop, MaybeUninit},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
    slice,
};

/// A growable vector of `T`, built on the type-erased [`RawVec`].
///
/// Elements are moved in and out; the destroy operation of the underlying vector drops them in
/// place.
///
/// ```
/// use ev_vec::Vector;
///
/// let mut vec = Vector::new().unwrap();
/// assert_eq!(vec.push(10).unwrap(), 0);
/// assert_eq!(vec.push(20).unwrap(), 1);
/// assert_eq!(vec.as_slice(), &[10, 20]);
/// assert_eq!(vec.pop(), Ok(20));
/// ```
pub struct Vector<T, S: Storage = HeapStorage> {
    raw: RawVec<S>,
    _marker: PhantomData<T>,
}

/// A vector of `T` that lives in a borrowed buffer and never grows.
pub type FixedVector<'a, T> = Vector<T, FixedStorage<'a>>;

/// Drops the `T` at `elem`.
///
/// Only ever installed as the destroy operation of a vector of `T`.
fn drop_element<T>(elem: NonNull<u8>) {
    // Safety: the vector only passes addresses of its live `T` elements.
    unsafe { ptr::drop_in_place(elem.cast::<T>().as_ptr()) }
}

fn behavior_of<T>() -> ElementBehavior {
    if mem::needs_drop::<T>() {
        ElementBehavior::new().with_destroy(drop_element::<T> as fn(NonNull<u8>))
    } else {
        ElementBehavior::new()
    }
}

impl<T> Vector<T> {
    /// Constructs an empty vector with room for [`RawVec::INITIAL_CAPACITY`] elements.
    pub fn new() -> Result<Self, VecError> {
        let raw = ErasedVec::with_behavior(ElementLayout::of::<T>(), behavior_of::<T>())?;
        Ok(Self {
            raw,
            _marker: PhantomData,
        })
    }
}

impl<'a, T> FixedVector<'a, T> {
    /// Constructs an empty vector that stores up to `buffer.len()` elements in `buffer`.
    pub fn fixed(buffer: &'a mut [MaybeUninit<T>]) -> Self {
        let storage = FixedStorage::for_elements(buffer);
        Self {
            // Safety: the storage spans exactly `buffer.len()` slots, none of them live.
            raw: unsafe { RawVec::from_storage(storage, behavior_of::<T>()) },
            _marker: PhantomData,
        }
    }

    /// Moves `values` into `buffer` and constructs a full vector over it.
    pub fn from_array<const N: usize>(
        buffer: &'a mut [MaybeUninit<T>; N],
        values: [T; N],
    ) -> Self {
        for (slot, value) in buffer.iter_mut().zip(values) {
            slot.write(value);
        }

        let mut storage = FixedStorage::for_elements(buffer.as_mut_slice());
        storage.header_mut().length = N;
        Self {
            // Safety: all `N` slots of the buffer were initialized above.
            raw: unsafe { RawVec::from_storage(storage, behavior_of::<T>()) },
            _marker: PhantomData,
        }
    }
}

impl<T, S: Storage> Vector<T, S> {
    /// Returns the number of elements.
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns true if the vector holds no elements.
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of elements the vector can hold without growing.
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    /// Returns the underlying type-erased vector.
    pub fn as_raw(&self) -> &RawVec<S> {
        &self.raw
    }

    /// Appends `value` and returns its index.
    ///
    /// If the vector cannot grow, `value` is dropped and [`VecError::OutOfMemory`] is returned.
    pub fn push(&mut self, value: T) -> Result<usize, VecError> {
        let value = ManuallyDrop::new(value);
        // Safety: `value` is a `T` outside of the vector. On success its bytes are owned by the
        // vector, which is why it is not dropped here.
        match unsafe { self.raw.push(NonNull::from(&*value).cast()) } {
            Ok(index) => Ok(index),
            Err(err) => {
                drop(ManuallyDrop::into_inner(value));
                Err(err)
            }
        }
    }

    /// Appends all `values` and returns the index of the first of them.
    ///
    /// The values are copied as one block of bytes.
    pub fn extend_from_slice(&mut self, values: &[T]) -> Result<usize, VecError>
    where
        T: Copy,
    {
        // Safety: the slice holds `values.len()` consecutive `T`s and cannot alias the vector,
        // which is borrowed mutably.
        unsafe { self.raw.append(NonNull::from(values).cast(), values.len()) }
    }

    /// Appends every value of `iter`, stopping at the first failure.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<(), VecError>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    /// Removes the last element and returns it.
    pub fn pop(&mut self) -> Result<T, VecError> {
        let mut out = MaybeUninit::<T>::uninit();
        // Safety: the vector has no copy operation, so popping moves the bytes of the last `T`
        // into `out` and the vector forgets about them.
        unsafe {
            self.raw.pop_into(NonNull::from(&mut out).cast())?;
            Ok(out.assume_init())
        }
    }

    /// Returns the last element, or `None` if the vector is empty.
    pub fn last(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns the last element, or `None` if the vector is empty.
    pub fn last_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Sets the length of the vector without initializing or dropping any element.
    ///
    /// # Safety
    ///
    /// If `length` is larger than the current length, the newly exposed elements must be
    /// initialized before they are read or the vector is dropped.
    pub unsafe fn set_len(&mut self, length: usize) -> Result<(), VecError> {
        self.raw.set_len(length)
    }

    /// Reallocates the buffer to hold exactly `capacity` elements.
    ///
    /// Elements past a capacity smaller than the length are leaked, not dropped.
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), VecError> {
        self.raw.set_capacity(capacity)
    }

    /// Grows the capacity by the growth factor of [`RawVec`].
    pub fn grow(&mut self) -> Result<(), VecError> {
        self.raw.grow()
    }

    /// Drops every element in order. The capacity is retained.
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        // Safety: the first `len` slots are initialized `T`s aligned to `T`.
        unsafe { slice::from_raw_parts(self.raw.as_ptr().cast::<T>().as_ptr(), self.len()) }
    }

    /// Returns the elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // Safety: the first `len` slots are initialized `T`s aligned to `T`.
        unsafe { slice::from_raw_parts_mut(self.raw.as_ptr().cast::<T>().as_ptr(), self.len()) }
    }

    /// Drops every element and releases the memory owned by the vector.
    pub fn finalize(self) {
        self.raw.finalize();
    }
}

impl<T, S: Storage> Deref for Vector<T, S> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, S: Storage> DerefMut for Vector<T, S> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug, S: Storage> fmt::Debug for Vector<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'v, T, S: Storage> IntoIterator for &'v Vector<T, S> {
    type Item = &'v T;
    type IntoIter = slice::Iter<'v, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}
