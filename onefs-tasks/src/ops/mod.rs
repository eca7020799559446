// SPDX-License-Identifier: GPL-3.0-only

//! Adapter traits between tasks and the array
//!
//! Fetch methods returning `Option` map the array's 404 answer to `None`;
//! every other API failure is an error. Tasks never see raw status codes.

pub mod auth;
pub mod cluster;
pub mod namespace;
pub mod nfs;
pub mod protocol;
pub mod quota;
pub mod snapshot;
pub mod zone;

pub use auth::AuthOps;
pub use cluster::ClusterOps;
pub use namespace::NamespaceOps;
pub use nfs::NfsOps;
pub use protocol::ProtocolOps;
pub use quota::QuotaOps;
pub use snapshot::SnapshotOps;
pub use zone::ZoneOps;
