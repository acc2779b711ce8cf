//! The C API of `ev_vec`.
//!
//! Vectors are referred to through an opaque [`VecHandle`]. Every fallible function returns an
//! [`ErrorHandle`]; a non-null handle carries the error message and must be destructed with
//! [`ev_error_destroy`].

pub mod error;
pub mod iter;
pub mod vec;

pub use error::{ev_error_destroy, ErrorHandle};
pub use iter::{ev_vec_iter_begin, ev_vec_iter_end, ev_vec_iter_next};
pub use vec::{
    ev_vec_append, ev_vec_capacity, ev_vec_clear, ev_vec_fini, ev_vec_grow, ev_vec_init,
    ev_vec_init_fixed, ev_vec_last, ev_vec_len, ev_vec_pop, ev_vec_push, ev_vec_setcapacity,
    ev_vec_setlen, ElemCopy, ElemDestr, VecHandle,
};

#[cfg(test)]
mod test_util;
