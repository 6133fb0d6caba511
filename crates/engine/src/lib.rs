#![forbid(unsafe_code)]

//! Client-side synchronization engine for the jobsync application.
//!
//! Layering, leaves first: remote ports ([`ports`]) with HTTP ([`http`]) and
//! in-memory ([`memory`]) implementations, the health and session gates
//! ([`health`], [`session`]), the sync store ([`store`]) and the query
//! composer ([`compose`]) with its persisted filter file ([`filters`]).
//!
//! Sequencing contract: the health gate must pass once per process, then the
//! session gate must report an authenticated organization scope, before the
//! sync store is used.

pub mod compose;
pub mod filters;
pub mod health;
pub mod http;
pub mod memory;
pub mod ports;
pub mod session;
pub mod store;

pub use compose::QueryComposer;
pub use filters::FilterStore;
pub use health::HealthGate;
pub use http::HttpApi;
pub use memory::MemoryApi;
pub use ports::{AuthApi, HealthStatus, JobsApi, WireSession};
pub use session::{Purge, SessionGate, SessionState};
pub use store::SyncStore;
