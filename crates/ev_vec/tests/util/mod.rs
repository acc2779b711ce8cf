use ev_vec::{ElementBehavior, ElementLayout, ErasedVecBuilder};
use std::{cell::RefCell, ptr::NonNull, rc::Rc};

/// An operation performed on an element by a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Copy(u32),
    Destroy(u32),
}

/// Records the copy and destroy operations a vector invokes on `u32` elements.
#[derive(Clone, Default)]
pub struct Tracker {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Tracker {
    /// Returns a behavior that copies and destroys `u32` elements, recording every call.
    pub fn behavior(&self) -> ElementBehavior {
        let copies = self.events.clone();
        let destroys = self.events.clone();
        ElementBehavior::new()
            .with_copy(move |dst, src| {
                let value = unsafe { read(src) };
                copies.borrow_mut().push(Event::Copy(value));
                unsafe { dst.cast::<u32>().as_ptr().write(value) };
            })
            .with_destroy(move |elem| {
                destroys
                    .borrow_mut()
                    .push(Event::Destroy(unsafe { read(elem) }));
            })
    }

    /// Returns a builder for `u32` vectors that only records destroy calls.
    pub fn destroy_only(&self) -> ErasedVecBuilder {
        let destroys = self.events.clone();
        ErasedVecBuilder::new(ElementLayout::of::<u32>()).destroy_with(move |elem| {
            destroys
                .borrow_mut()
                .push(Event::Destroy(unsafe { read(elem) }));
        })
    }

    /// Removes and returns all events recorded so far.
    pub fn take_all(&self) -> Vec<Event> {
        self.events.take()
    }
}

/// Returns a pointer to `value` suitable for pushing into a vector.
pub fn ptr_of(value: &u32) -> NonNull<u8> {
    NonNull::from(value).cast()
}

/// Reads the `u32` element at `elem`.
///
/// # Safety
///
/// `elem` must point to an initialized `u32`.
pub unsafe fn read(elem: NonNull<u8>) -> u32 {
    elem.cast::<u32>().as_ptr().read()
}
