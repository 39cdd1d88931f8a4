//! Cache-first acquisition of champion data.
//!
//! [`AcquisitionService`] answers reads from the cached entry while it is
//! fresh, refreshes through the fetch chain when it is stale or missing, and
//! falls back to the previous entry when a refresh fails.

pub mod error;
pub mod service;

pub use error::{AcquisitionError, RefreshError, SetupError};
pub use service::{build_store, AcquisitionService, ServiceState};
