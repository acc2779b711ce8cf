use ev_vec::{ErasedVec, VecError, Vector};
use std::{cell::RefCell, rc::Rc};

macro_rules! test_growth {
    ($($ty:ident),+) => {
        $(
            paste::item! {
                #[test]
                fn [<growth_preserves_ $ty _values>]() {
                    let mut vec = Vector::<$ty>::new().unwrap();
                    for value in 0..50 {
                        assert_eq!(vec.push(value as $ty).unwrap(), value);
                    }
                    assert_eq!(vec.len(), 50);
                    assert!(vec.capacity() >= vec.len());
                    assert_eq!(
                        vec.as_ptr().align_offset(std::mem::align_of::<$ty>()),
                        0
                    );
                    for (index, value) in vec.iter().enumerate() {
                        assert_eq!(*value, index as $ty);
                    }
                }
            }
        )+
    };
}

test_growth!(u8, u16, u32, u64, u128, f32, f64);

/// Records the order in which values are dropped.
struct Noisy {
    id: u32,
    log: Rc<RefCell<Vec<u32>>>,
}

impl Drop for Noisy {
    fn drop(&mut self) {
        self.log.borrow_mut().push(self.id);
    }
}

fn noisy_vector(log: &Rc<RefCell<Vec<u32>>>, count: u32) -> Vector<Noisy> {
    let mut vec = Vector::new().unwrap();
    vec.try_extend((0..count).map(|id| Noisy {
        id,
        log: log.clone(),
    }))
    .unwrap();
    vec
}

#[test]
fn clear_drops_in_order() {
    let log = Rc::default();
    let mut vec = noisy_vector(&log, 10);
    let capacity = vec.capacity();

    vec.clear();
    assert_eq!(*log.borrow(), (0..10).collect::<Vec<_>>());
    assert!(vec.is_empty());
    assert_eq!(vec.capacity(), capacity);
}

#[test]
fn pop_returns_last() {
    let log = Rc::default();
    let mut vec = noisy_vector(&log, 3);

    assert_eq!(vec.pop().map(|noisy| noisy.id), Ok(2));
    assert_eq!(*log.borrow(), [2]);
    assert_eq!(vec.last().map(|noisy| noisy.id), Some(1));

    drop(vec);
    assert_eq!(*log.borrow(), [2, 0, 1]);
}

#[test]
fn pop_empty_is_underflow() {
    let mut vec = Vector::<String>::new().unwrap();
    assert_eq!(vec.pop(), Err(VecError::Underflow));
    assert!(vec.last().is_none());
}

#[test]
fn extend_from_slice_appends_block() {
    let mut vec = Vector::new().unwrap();
    vec.push(1i32).unwrap();
    vec.push(2).unwrap();

    assert_eq!(vec.extend_from_slice(&[3, 4, 5, 6, 7]), Ok(2));
    assert_eq!(vec.as_slice(), [1, 2, 3, 4, 5, 6, 7]);
    assert_eq!(vec.extend_from_slice(&[]), Ok(7));
}

#[test]
fn shrinking_capacity_leaks_instead_of_dropping() {
    let log = Rc::default();
    let mut vec = noisy_vector(&log, 5);

    vec.set_capacity(2).unwrap();
    assert_eq!(vec.len(), 2);
    assert!(log.borrow().is_empty());

    vec.set_capacity(10).unwrap();
    assert_eq!(vec.len(), 2);
    vec.finalize();
    assert_eq!(*log.borrow(), [0, 1]);
}

#[test]
fn set_len_exposes_written_slots() {
    let mut vec = Vector::<u16>::new().unwrap();
    vec.push(1).unwrap();

    unsafe { vec.set_len(0) }.unwrap();
    assert!(vec.is_empty());

    // The bytes of the forgotten element are still in place.
    unsafe { vec.set_len(1) }.unwrap();
    assert_eq!(vec[0], 1);
}

#[test]
fn mutate_through_slice() {
    let mut vec = Vector::new().unwrap();
    vec.try_extend([1u8, 2, 3]).unwrap();
    *vec.last_mut().unwrap() = 30;
    vec[0] = 10;
    assert_eq!(format!("{vec:?}"), "[10, 2, 30]");
}

#[test]
fn growth_constants() {
    assert_eq!(ErasedVec::INITIAL_CAPACITY, 8);
    assert_eq!(ErasedVec::GROWTH_NUMERATOR, 3);
    assert_eq!(ErasedVec::GROWTH_DENOMINATOR, 2);

    let mut vec = Vector::<u32>::new().unwrap();
    assert_eq!(vec.capacity(), 8);
    vec.grow().unwrap();
    assert_eq!(vec.capacity(), 12);
}
