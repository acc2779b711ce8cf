//! Pointer based iteration over the elements of a vector.
//!
//! A loop over every element looks like this in C:
//!
//! ```c
//! void *begin, *end;
//! ev_vec_iter_begin(handle, &begin);
//! ev_vec_iter_end(handle, &end);
//! for (void *elem = begin; elem < end; ev_vec_iter_next(handle, &elem)) {
//!     /* ... */
//! }
//! ```
//!
//! Any operation that may reallocate the vector invalidates the pointers.

use crate::error::{try_deref_mut, vec_try, ErrorHandle};
use crate::vec::{forward, VecHandle};
use std::ffi::c_void;

/// Retrieves the address of the first element of the vector that corresponds to `handle`.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_iter_begin(
    handle: VecHandle,
    begin: *mut *mut c_void,
) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let begin = try_deref_mut!(begin);

    *begin = forward!(vec, vec => vec.as_ptr()).as_ptr().cast();
    ErrorHandle::default()
}

/// Retrieves the address one past the last element of the vector that corresponds to `handle`.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_iter_end(handle: VecHandle, end: *mut *mut c_void) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let end = try_deref_mut!(end);

    let (data, len, stride) =
        forward!(vec, vec => (vec.as_ptr(), vec.len(), vec.element_layout().stride()));
    *end = data.as_ptr().wrapping_add(len * stride).cast();
    ErrorHandle::default()
}

/// Advances `iter` to the next element of the vector that corresponds to `handle`.
///
/// # Safety
///
/// This function receives raw pointers as parameters. If any of the arguments is a null pointer,
/// an error will be returned.
#[no_mangle]
pub unsafe extern "C" fn ev_vec_iter_next(handle: VecHandle, iter: *mut *mut c_void) -> ErrorHandle {
    let vec = vec_try!(handle.inner());
    let iter = try_deref_mut!(iter);

    let stride = forward!(vec, vec => vec.element_layout().stride());
    *iter = (*iter).cast::<u8>().wrapping_add(stride).cast();
    ErrorHandle::default()
}
