//! Exposes the type-erased vector using the C ABI.

use crate::error::{try_deref_mut, vec_try, ErrorHandle};
use ev_vec::{ElementBehavior, ElementLayout, ErasedVec, FixedErasedVec};
use std::{
    ffi::c_void,
    mem::MaybeUninit,
    ptr::{self, NonNull},
    slice,
};

/// Signature of a function that copies the element at `src` to `dst`.
pub type ElemCopy = Option<unsafe extern "C" fn(dst: *mut c_void, src: *const c_void)>;

/// Signature of a function that releases the resources owned by the element at `elem`.
pub type ElemDestr = Option<unsafe extern "C" fn(elem: *mut c_void)>;

/// The vector behind a [`VecHandle`].
pub(crate) enum Vector {
    Heap(ErasedVec),
    Fixed(FixedErasedVec<'static>),
}

/// Evaluates `$body` with `$inner` bound to the vector, whatever its storage.
macro_rules! forward {
    ($vec:expr, $inner:ident => $body:expr) => {
        match $vec {
            $crate::vec::Vector::Heap($inner) => $body,
            $crate::vec::Vector::Fixed($inner) => $body,
        }
    };
}

pub(crate) use forward;

/// A C-style handle to a vector.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct VecHandle(pub *mut c_void);

impl VecHandle {
    /// Returns a handle that does not refer to any vector.
    pub const fn null() -> Self {
        Self(ptr::null_mut())
    }

    /// Returns the vector this handle refers to.
    ///
    /// # Safety
    ///
    /// The handle must be null or obtained from [`ev_vec_init`] or [`ev_vec_init_fixed`] and not
    /// yet finalized.
    pub(crate) unsafe fn inner<'a>(self) -> Result<&'a Vector, ErrorHandle> {
        self.0
            .cast::<Vector>()
            .as_ref()
            .ok_or_else(|| ErrorHandle::null_argument("handle"))
    }

    /// Returns the vector this handle refers to.
    ///
    /// # Safety
    ///
    /// Same as [`VecHandle::inner`]; in addition no other reference to the vector may be alive.
    pub(crate) unsafe fn inner_mut<'a>(self) -> Result<&'a mut Vector, ErrorHandle> {
        self.0
            .cast::<Vector>()
            .as_mut()
            .ok_or_else(|| ErrorHandle::null_argument("handle"))
    }

    fn from_vector(vec: Vector) -> Self {
        Self(Box::into_raw(Box::new(vec)).cast())
    }
}

/// Wraps the C function pointers in an [`ElementBehavior`].
fn element_behavior(copy: ElemCopy, destr: ElemDestr) -> ElementBehavior {
    let mut behavior = ElementBehavior::new();
    if let Some(copy) = copy {
        behavior = behavior.with_copy(move |dst: NonNull<u8>, src: NonNull<u8>| unsafe {
            copy(dst.as_ptr().cast(), src.as_ptr().cast_const().cast());
        });
    }
    if let Some(destr) = destr {
        behavior = behavior.with_destroy(move |elem: NonNull<u8>| unsafe {
            destr(elem.as_ptr().cast());
        });
    }
    behavior
}

/// Constructs an empty heap allocated vector of `elemsize` byte elements. If successful, `handle`
/// is set, otherwise a non-zero error handle is returned.
///
/// `copy` is used to copy elements into and out of the vector; if it is null elements are copied
/// byte-for-byte. `destr` is called on elements that are removed; it may be null.
///
/// If a non-zero error handle is returned, it must be manually destructed using
/// [`ev_error_destroy`](crate::error::ev_error_destroy).
///
/// The vector must be manually destructed using [`ev_vec_fini`].
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned. Passing pointers to invalid data, will lead to undefined behavior.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_init(
    elemsize: usize,
    copy: ElemCopy,
    destr: ElemDestr,
    handle: *mut VecHandle,
) -> ErrorHandle {
    let handle = try_deref_mut!(handle);
    let vec = vec_try!(ErasedVec::with_behavior(
        ElementLayout::from_size(elemsize),
        element_behavior(copy, destr)
    ));

    *handle = VecHandle::from_vector(Vector::Heap(vec));
    ErrorHandle::default()
}

/// Constructs an empty vector that stores up to `capacity` elements of `elemsize` bytes in the
/// caller provided `buffer` of `buffer_size` bytes. If successful, `handle` is set, otherwise a
/// non-zero error handle is returned.
///
/// The vector never grows; operations that need more room than `capacity` fail. `buffer` has no
/// alignment requirement: elements are stored `elemsize` bytes apart starting at `buffer`, and
/// the copy and destroy functions receive those addresses. Finalizing the vector destroys its
/// elements but leaves `buffer` to the caller.
///
/// If a non-zero error handle is returned, it must be manually destructed using
/// [`ev_error_destroy`](crate::error::ev_error_destroy).
///
/// # Safety
///
/// `buffer` must be valid for reads and writes of `buffer_size` bytes until the vector is
/// finalized and must not be accessed through other pointers in the meantime. If any of the
/// pointer arguments is a null pointer, an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_init_fixed(
    buffer: *mut c_void,
    buffer_size: usize,
    capacity: usize,
    elemsize: usize,
    copy: ElemCopy,
    destr: ElemDestr,
    handle: *mut VecHandle,
) -> ErrorHandle {
    if buffer.is_null() {
        return ErrorHandle::null_argument("buffer");
    }
    let handle = try_deref_mut!(handle);

    let buffer = slice::from_raw_parts_mut(buffer.cast::<MaybeUninit<u8>>(), buffer_size);
    let vec = vec_try!(FixedErasedVec::new_fixed(
        buffer,
        capacity,
        ElementLayout::unaligned(elemsize),
        element_behavior(copy, destr)
    ));

    *handle = VecHandle::from_vector(Vector::Fixed(vec));
    ErrorHandle::default()
}

/// Destructs the vector corresponding to `handle`, destroying every element in order.
///
/// # Safety
///
/// The handle must be null or obtained from [`ev_vec_init`] or [`ev_vec_init_fixed`]. Only call
/// this function on a handle once.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_fini(handle: VecHandle) {
    if !handle.0.is_null() {
        let _vec = Box::from_raw(handle.0.cast::<Vector>());
    }
}

/// Copies the element at `val` to the end of the vector that corresponds to `handle`. If
/// successful, `index` is set to the index of the new element, otherwise a non-zero error handle
/// is returned and the vector is left unchanged.
///
/// If a non-zero error handle is returned, it must be manually destructed using
/// [`ev_error_destroy`](crate::error::ev_error_destroy).
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned. `val` must point to an element of the vector's element size.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_push(
    handle: VecHandle,
    val: *const c_void,
    index: *mut usize,
) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());
    let Some(val) = NonNull::new(val.cast_mut()) else {
        return ErrorHandle::null_argument("val");
    };
    let index = try_deref_mut!(index);

    *index = vec_try!(forward!(vec, vec => vec.push(val.cast())));
    ErrorHandle::default()
}

/// Copies `count` consecutive elements starting at `values` to the end of the vector that
/// corresponds to `handle` as a single block of bytes, bypassing the copy function. If
/// successful, `index` is set to the index of the first appended element.
///
/// If a non-zero error handle is returned, it must be manually destructed using
/// [`ev_error_destroy`](crate::error::ev_error_destroy).
///
/// # Safety
///
/// `values` may only be null if `count` is zero. Otherwise it must point to `count` elements of
/// the vector's element size.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_append(
    handle: VecHandle,
    values: *const c_void,
    count: usize,
    index: *mut usize,
) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());
    if count > 0 && values.is_null() {
        return ErrorHandle::null_argument("values");
    }
    let index = try_deref_mut!(index);

    let values = NonNull::new(values.cast_mut().cast::<u8>()).unwrap_or_else(NonNull::dangling);
    *index = vec_try!(forward!(vec, vec => vec.append(values, count)));
    ErrorHandle::default()
}

/// Removes the last element of the vector that corresponds to `handle`.
///
/// If `out` is not null the element is copied to `out` and the caller becomes responsible for
/// destroying it. Otherwise the element is destroyed. Popping from an empty vector returns a
/// non-zero error handle.
///
/// If a non-zero error handle is returned, it must be manually destructed using
/// [`ev_error_destroy`](crate::error::ev_error_destroy).
///
/// # Safety
///
/// A non-null `out` must be valid for writing an element of the vector's element size.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_pop(handle: VecHandle, out: *mut c_void) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());

    vec_try!(match NonNull::new(out) {
        Some(out) => forward!(vec, vec => vec.pop_into(out.cast())),
        None => forward!(vec, vec => vec.pop()),
    });
    ErrorHandle::default()
}

/// Retrieves the address of the last element of the vector that corresponds to `handle`. `last`
/// is set to null if the vector is empty.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_last(handle: VecHandle, last: *mut *mut c_void) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let last = try_deref_mut!(last);

    *last = forward!(vec, vec => vec.last()).map_or(ptr::null_mut(), |elem| elem.as_ptr().cast());
    ErrorHandle::default()
}

/// Retrieves the number of elements of the vector that corresponds to `handle`.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_len(handle: VecHandle, len: *mut usize) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let len = try_deref_mut!(len);

    *len = forward!(vec, vec => vec.len());
    ErrorHandle::default()
}

/// Retrieves the number of elements the vector that corresponds to `handle` can hold without
/// growing.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_capacity(handle: VecHandle, capacity: *mut usize) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let capacity = try_deref_mut!(capacity);

    *capacity = forward!(vec, vec => vec.capacity());
    ErrorHandle::default()
}

/// Destroys every element of the vector that corresponds to `handle` in order and sets its length
/// to zero. The capacity is retained.
///
/// # Safety
///
/// The handle must be null or refer to a live vector.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_clear(handle: VecHandle) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());

    forward!(vec, vec => vec.clear());
    ErrorHandle::default()
}

/// Sets the length of the vector that corresponds to `handle` to `len`, growing it if needed.
/// Elements are neither initialized nor destroyed.
///
/// # Safety
///
/// Slots exposed by a larger length hold arbitrary bytes; the caller must write them before they
/// are read, copied out or destroyed.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_setlen(handle: VecHandle, len: usize) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());

    vec_try!(forward!(vec, vec => vec.set_len(len)));
    ErrorHandle::default()
}

/// Sets the capacity of the vector that corresponds to `handle` to exactly `capacity` elements.
/// Elements past a smaller capacity are discarded without being destroyed.
///
/// # Safety
///
/// The handle must be null or refer to a live vector.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_setcapacity(handle: VecHandle, capacity: usize) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());

    vec_try!(forward!(vec, vec => vec.set_capacity(capacity)));
    ErrorHandle::default()
}

/// Grows the capacity of the vector that corresponds to `handle` by the growth factor.
///
/// # Safety
///
/// The handle must be null or refer to a live vector.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_grow(handle: VecHandle) -> ErrorHandle {
    let vec = vec_try!(handle.inner_mut());

    vec_try!(forward!(vec, vec => vec.grow()));
    ErrorHandle::default()
}
