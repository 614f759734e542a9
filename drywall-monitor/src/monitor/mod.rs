//! Periodic polling of the backend and the state it produces.
//!
//! A [`PollScheduler`] owns the [`PollState`]. Front ends subscribe to it
//! and trigger manual refreshes; they never write it.

mod scheduler;
mod state;

pub use scheduler::{CycleTrigger, PollScheduler};
pub use state::PollState;
