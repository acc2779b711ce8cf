//! Assertions over functions that report their result through an [`ErrorHandle`].
//!
//! [`ErrorHandle`]: crate::ErrorHandle

/// Calls `$fun` with the input arguments followed by a pointer to each output, asserts that it
/// succeeded, and binds every output to a local variable of the same name.
///
/// ```ignore
/// assert_getter!(ev_vec_append(handle, values, count) => index);
/// ```
macro_rules! assert_getter {
    ($fun:ident ( $($input:expr),* $(,)? ) => $($out:ident),+ $(,)?) => {
        $(
            let mut $out = std::mem::MaybeUninit::uninit();
        )+
        assert!(unsafe { $fun($($input,)* $($out.as_mut_ptr()),+) }.is_ok());
        $(
            let $out = unsafe { $out.assume_init() };
        )+
    };
}

/// Asserts that the expression returned an error and destructs its message.
macro_rules! assert_error {
    ($expr:expr $(,)?) => {
        let error_handle = $expr;
        assert!(error_handle.is_err());
        unsafe { $crate::error::ev_error_destroy(error_handle) };
    };
}

/// Asserts that the expression returned an error whose message matches the inline snapshot, and
/// destructs the message.
macro_rules! assert_error_snapshot {
    ($expr:expr, @$snapshot:literal) => {
        let error_handle = $expr;
        let message = match unsafe { error_handle.err() } {
            Some(err) => err.to_string_lossy().into_owned(),
            None => panic!("expected an error"),
        };
        unsafe { $crate::error::ev_error_destroy(error_handle) };
        insta::assert_ron_snapshot!(message, @$snapshot);
    };
}

pub(crate) use {assert_error, assert_error_snapshot, assert_getter};
