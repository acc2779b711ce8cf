//! Exposes error reporting using the C ABI.

use ev_vec::VecError;
use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    ptr,
};

/// A C-style handle to an error message.
///
/// If the handle contains a non-null pointer, an error occurred. The message must be destructed
/// with [`ev_error_destroy`].
#[repr(C)]
#[derive(Clone, Copy)]
pub struct ErrorHandle(pub *const c_char);

impl ErrorHandle {
    /// Constructs an `ErrorHandle` from the specified error message. Interior nul bytes are
    /// stripped.
    pub fn new<T: Into<Vec<u8>>>(error_message: T) -> Self {
        let mut bytes = error_message.into();
        bytes.retain(|&byte| byte != 0);
        let error_message = CString::new(bytes).unwrap_or_default();
        Self(CString::into_raw(error_message))
    }

    /// Constructs the error reported when the pointer argument `name` is null.
    pub fn null_argument(name: &str) -> Self {
        Self::new(format!("invalid argument '{name}': null pointer"))
    }

    /// Returns true if this handle does not contain an error.
    pub fn is_ok(&self) -> bool {
        self.0.is_null()
    }

    /// Returns true if this handle contains an error.
    pub fn is_err(&self) -> bool {
        !self.0.is_null()
    }

    /// Returns the error message of this handle, or `None` if there is no error.
    ///
    /// # Safety
    ///
    /// The message must not have been destructed yet.
    pub unsafe fn err(&self) -> Option<&CStr> {
        if self.is_err() {
            Some(CStr::from_ptr(self.0))
        } else {
            None
        }
    }
}

impl Default for ErrorHandle {
    fn default() -> Self {
        Self(ptr::null())
    }
}

impl From<VecError> for ErrorHandle {
    fn from(err: VecError) -> Self {
        Self::new(err.to_string())
    }
}

/// Destructs the error message corresponding to the specified handle.
///
/// # Safety
///
/// Only call this function on an `ErrorHandle` once.
#[no_mangle]
pub unsafe extern "C" fn ev_error_destroy(error: ErrorHandle) {
    if !error.0.is_null() {
        let _drop = CString::from_raw(error.0.cast_mut());
    }
}

/// Unwraps a `Result` whose error converts into an [`ErrorHandle`], returning the handle from the
/// enclosing function on failure.
macro_rules! vec_try {
    ($expr:expr $(,)?) => {
        match $expr {
            Ok(val) => val,
            Err(err) => return $crate::error::ErrorHandle::from(err),
        }
    };
}

/// Converts a raw pointer into a mutable reference, returning an [`ErrorHandle`] from the
/// enclosing function if it is null.
macro_rules! try_deref_mut {
    ($expr:ident $(,)?) => {
        match $expr.as_mut() {
            Some(val) => val,
            None => return $crate::error::ErrorHandle::null_argument(stringify!($expr)),
        }
    };
}

pub(crate) use {try_deref_mut, vec_try};
