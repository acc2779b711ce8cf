use std::{alloc::Layout, fmt, ptr, ptr::NonNull};

/// The maximum alignment [`ElementLayout::from_size`] derives from an element size.
pub const MAX_ELEMENT_ALIGN: usize = 16;

/// Describes the memory occupied by a single element of a vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementLayout {
    size: usize,
    align: usize,
}

impl ElementLayout {
    /// Constructs a layout for elements of `size` bytes.
    ///
    /// The alignment is the largest power of two that divides `size`, capped at
    /// [`MAX_ELEMENT_ALIGN`]. Consecutive elements are therefore always exactly `size` bytes
    /// apart.
    pub const fn from_size(size: usize) -> Self {
        let align = if size == 0 {
            1
        } else {
            let natural = 1usize << size.trailing_zeros();
            if natural > MAX_ELEMENT_ALIGN {
                MAX_ELEMENT_ALIGN
            } else {
                natural
            }
        };
        Self { size, align }
    }

    /// Constructs a layout for elements of `size` bytes that may be stored at any address.
    ///
    /// Elements are copied byte-for-byte, so byte alignment suffices for buffers whose elements
    /// the vector only moves around, such as caller provided fixed buffers.
    pub const fn unaligned(size: usize) -> Self {
        Self { size, align: 1 }
    }

    /// Constructs a layout from an explicit memory layout.
    pub const fn from_layout(layout: Layout) -> Self {
        Self {
            size: layout.size(),
            align: layout.align(),
        }
    }

    /// Returns the layout of elements of type `T`.
    pub const fn of<T>() -> Self {
        Self::from_layout(Layout::new::<T>())
    }

    /// Returns the number of bytes copied per element.
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Returns the required alignment of an element.
    pub const fn align(&self) -> usize {
        self.align
    }

    /// Returns the distance in bytes between two consecutive elements.
    ///
    /// This is the size rounded up to the alignment.
    pub const fn stride(&self) -> usize {
        (self.size + self.align - 1) & !(self.align - 1)
    }
}

/// Copies the element at `src` to `dst`.
pub type CopyFn = Box<dyn Fn(NonNull<u8>, NonNull<u8>)>;

/// Releases any resources owned by the element at the given address.
pub type DestroyFn = Box<dyn Fn(NonNull<u8>)>;

/// The user supplied copy and destroy operations of a vector's elements.
///
/// Without a copy operation elements are copied byte-for-byte. Without a destroy operation
/// removing an element does not perform any cleanup.
#[derive(Default)]
pub struct ElementBehavior {
    copy: Option<CopyFn>,
    destroy: Option<DestroyFn>,
}

impl ElementBehavior {
    /// Constructs a behavior that copies raw bytes and never destroys.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the operation used to copy an element into or out of a vector. The operation is called
    /// as `copy(dst, src)`.
    pub fn with_copy<F>(mut self, copy: F) -> Self
    where
        F: Fn(NonNull<u8>, NonNull<u8>) + 'static,
    {
        self.copy = Some(Box::new(copy));
        self
    }

    /// Sets the operation used to release an element before it is removed from a vector.
    pub fn with_destroy<F>(mut self, destroy: F) -> Self
    where
        F: Fn(NonNull<u8>) + 'static,
    {
        self.destroy = Some(Box::new(destroy));
        self
    }

    /// Returns true if a copy operation was provided.
    pub fn has_copy(&self) -> bool {
        self.copy.is_some()
    }

    /// Returns true if a destroy operation was provided.
    pub fn has_destroy(&self) -> bool {
        self.destroy.is_some()
    }

    /// Copies a single element from `src` to `dst`.
    ///
    /// # Safety
    ///
    /// Both pointers must be valid for `layout.size()` bytes and must not overlap.
    pub(crate) unsafe fn copy(&self, layout: ElementLayout, dst: NonNull<u8>, src: NonNull<u8>) {
        match &self.copy {
            Some(copy) => copy(dst, src),
            None => ptr::copy_nonoverlapping(src.as_ptr(), dst.as_ptr(), layout.size()),
        }
    }

    /// Destroys the element at `elem`, if a destroy operation was provided.
    pub(crate) fn destroy(&self, elem: NonNull<u8>) {
        if let Some(destroy) = &self.destroy {
            destroy(elem);
        }
    }
}

impl fmt::Debug for ElementBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBehavior")
            .field("copy", &self.has_copy())
            .field("destroy", &self.has_destroy())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementLayout, MAX_ELEMENT_ALIGN};

    #[test]
    fn from_size_alignment() {
        assert_eq!(ElementLayout::from_size(0).align(), 1);
        assert_eq!(ElementLayout::from_size(1).align(), 1);
        assert_eq!(ElementLayout::from_size(4).align(), 4);
        assert_eq!(ElementLayout::from_size(6).align(), 2);
        assert_eq!(ElementLayout::from_size(12).align(), 4);
        assert_eq!(ElementLayout::from_size(64).align(), MAX_ELEMENT_ALIGN);
    }

    #[test]
    fn stride_equals_size_for_sized_elements() {
        for size in [0, 1, 3, 7, 12, 24, 100] {
            assert_eq!(ElementLayout::from_size(size).stride(), size);
            assert_eq!(ElementLayout::unaligned(size).stride(), size);
            assert_eq!(ElementLayout::unaligned(size).align(), 1);
        }
    }

    #[test]
    fn of_matches_type_layout() {
        let layout = ElementLayout::of::<u64>();
        assert_eq!(layout.size(), std::mem::size_of::<u64>());
        assert_eq!(layout.align(), std::mem::align_of::<u64>());
        assert_eq!(ElementLayout::of::<()>().stride(), 0);
    }
}
