//! Database resource client
//!
//! Two remote operations are all the provisioning workflow needs: create a
//! database under a home, and read back its lifecycle state. They sit behind
//! the [`DatabaseApi`] trait so the poller can be driven by a fake in tests.

pub mod client;
pub mod models;
pub mod params;

pub use client::{DatabaseApi, DatabaseClient};
pub use models::{Database, LifecycleState};
pub use params::{CreateDatabaseRequest, CreationSpec, WorkloadType};
