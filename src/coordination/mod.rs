//! Client-side request coordination.
//!
//! - [`single_flight`]: one execution per key for concurrent identical calls
//! - [`debounce`]: only the last call of a burst fires
//! - [`optimistic`]: apply local changes first, reconcile or roll back later
//! - [`optimistic_list`]: create/update/delete over an ordered collection

pub mod debounce;
pub mod optimistic;
pub mod optimistic_list;
pub mod single_flight;

pub use debounce::{Debouncer, debounce};
pub use optimistic::{
    ErrorHandling, OptimisticExecutor, OptimisticUpdate, StateHandle, Transform, UpdateState,
};
pub use optimistic_list::{
    ListEntry, OptimisticList, Record, TEMP_ID_PREFIX, is_temp_id, merge_patch, temp_id,
};
pub use single_flight::SingleFlight;
