//! slskd integration - the local daemon that brokers Soulseek search and transfer.
//!
//! # Architecture
//!
//! Same split as the other API integrations:
//! - **Domain models** (`domain.rs`) - what the resolver works with
//! - **API DTOs** (`dto.rs`) - exact JSON shapes of the v0 API
//! - **Adapter** (`adapter.rs`) - DTO to domain conversion
//! - **Client** (`client.rs`) - reqwest-based HTTP client
//! - **Traits** (`traits.rs`) - [`DaemonApi`] seam used by the resolver, plus mocks
//!
//! The daemon keeps running on its own; nothing here needs an explicit teardown.

pub mod adapter;
pub mod client;
pub mod domain;
pub mod dto;
pub mod traits;

pub use client::{DaemonCredentials, SlskdClient};
pub use domain::{
    CandidateFile, CandidateResult, DaemonError, LinkState, ProbeResponse, SearchJob, SearchState,
};
pub use traits::DaemonApi;
