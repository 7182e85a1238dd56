//! Two-request progressive delivery.
//!
//! `GET /rows` answers with the fast columns and schedules one background
//! computation per row; `GET /slow-value/{row_id}` is polled until the
//! slow column shows up.

pub mod api;
pub mod scheduler;
pub mod store;

pub use api::{PollState, router};
pub use scheduler::SlowValueScheduler;
pub use store::SlowResultStore;
