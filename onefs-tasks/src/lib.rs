// SPDX-License-Identifier: GPL-3.0-only

//! Idempotent reconciliation tasks for OneFS resources
//!
//! Each task follows the same shape: deserialize a `Params` struct, fetch
//! observed state through the adapter traits in [`ops`], compute divergence
//! with pure comparison functions, apply the minimal set of mutations,
//! refetch, and return a serializable report carrying a `changed` flag.
//!
//! The traits keep tasks testable against an in-memory array; the real
//! implementation for [`onefs_papi::PapiClient`] lives in [`adapters`].

pub mod adapters;
pub mod error;
pub mod ops;
pub mod tasks;

pub use error::TaskError;
