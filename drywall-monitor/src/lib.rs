//! Polling status client for the DryWall Alert integration backend.
//!
//! The crate fetches the backend's system status and sensor summary,
//! merges them into a [`snapshot::StatusSnapshot`], keeps the latest
//! result in a [`monitor::PollState`] refreshed on a fixed interval, and
//! projects that state into display-ready values for a front end.

pub mod aggregator;
pub mod api_client;
pub mod config;
pub mod error;
pub mod monitor;
pub mod projection;
pub mod snapshot;
pub mod tracing;

#[cfg(test)]
pub(crate) mod test_data;
