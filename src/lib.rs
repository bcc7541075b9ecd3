//! Retroactive data structures: containers that accept operations not only
//! at "now" but at any moment of their past, and answer queries as if
//! history had always been that way.
//!
//! Two containers are provided. [`PartialQueue`] is a *partially*
//! retroactive FIFO queue: push and pop can be performed or reverted at any
//! past moment, and the present state is observable. [`FullMap`] is a
//! *fully* retroactive ordered map: insertions and erasures can be placed in
//! the past, and the map can also be *read* as of any past moment.
//!
//! Both are built over [`OrderList`], an order-maintenance list (Bender et
//! al 2002) that hands out stable tokens and compares any two of them in
//! constant time. Time points are such tokens, so "did this operation happen
//! before that one?" is a label comparison, not a walk.
//!
//! ```rust
//! use retro::PartialQueue;
//!
//! let mut q = PartialQueue::new();
//! let t3 = q.push(3);
//! let t2 = q.push_before(&t3, 2);   // there was a 2 before the 3
//! q.push_before(&t2, 1);           // and a 1 before the 2
//! q.push_before(&t2, 4);           // ... and a 4, also before the 2
//! assert_eq!(q.iter().copied().collect::<Vec<_>>(), [1, 4, 2, 3]);
//! ```

mod label;

pub mod map;
pub mod order_list;
pub mod queue;

pub use label::Label;
pub use map::FullMap;
pub use order_list::OrderList;
pub use queue::PartialQueue;
