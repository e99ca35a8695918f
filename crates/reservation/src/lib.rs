//! Stock reservation and order lifecycle workflow.
//!
//! [`ReservationWorkflow`] is the only component that mutates stock. It keeps
//! `product.stock + reserved quantity` constant across cart additions and
//! removals by:
//! 1. applying stock changes as atomic conditional deltas in the store
//! 2. sequencing the stock change before the cart line change
//! 3. reverting the stock change when the cart line change fails
//!
//! Operations on the same user or product are serialized in-process with
//! [`KeyedLocks`], always acquired in user → product order.

pub mod catalog;
pub mod error;
pub mod locks;
pub mod workflow;

pub use error::{ReservationError, Result};
pub use locks::KeyedLocks;
pub use workflow::{CartAddition, CartRemoval, ReservationWorkflow};
