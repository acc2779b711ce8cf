use crate::{ElementBehavior, ElementLayout, ErasedVec, FixedErasedVec, VecError};
use std::{mem::MaybeUninit, ptr::NonNull};

/// A builder for type-erased vectors.
///
/// ```
/// use ev_vec::{ElementLayout, ErasedVecBuilder};
///
/// let vec = ErasedVecBuilder::new(ElementLayout::of::<u32>())
///     .destroy_with(|_elem| {})
///     .build()
///     .unwrap();
/// assert!(vec.behavior().has_destroy());
/// ```
#[derive(Debug)]
pub struct ErasedVecBuilder {
    layout: ElementLayout,
    behavior: ElementBehavior,
}

impl ErasedVecBuilder {
    /// Constructs a builder for vectors of elements with the given layout.
    pub fn new(layout: ElementLayout) -> Self {
        Self {
            layout,
            behavior: ElementBehavior::new(),
        }
    }

    /// Sets the operation used to copy elements in and out, called as `copy(dst, src)`.
    pub fn copy_with<F>(mut self, copy: F) -> Self
    where
        F: Fn(NonNull<u8>, NonNull<u8>) + 'static,
    {
        self.behavior = self.behavior.with_copy(copy);
        self
    }

    /// Sets the operation used to release elements.
    pub fn destroy_with<F>(mut self, destroy: F) -> Self
    where
        F: Fn(NonNull<u8>) + 'static,
    {
        self.behavior = self.behavior.with_destroy(destroy);
        self
    }

    /// Allocates a heap vector with the builder's options.
    pub fn build(self) -> Result<ErasedVec, VecError> {
        ErasedVec::with_behavior(self.layout, self.behavior)
    }

    /// Constructs a fixed vector over `buffer` with the builder's options.
    pub fn build_fixed(
        self,
        buffer: &mut [MaybeUninit<u8>],
        capacity: usize,
    ) -> Result<FixedErasedVec<'_>, VecError> {
        FixedErasedVec::new_fixed(buffer, capacity, self.layout, self.behavior)
    }
}
