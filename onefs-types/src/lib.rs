// SPDX-License-Identifier: GPL-3.0-only

//! Canonical domain models for OneFS automation
//!
//! This crate defines the single source of truth for all PowerScale/Isilon
//! domain types. These models are used throughout the stack:
//!
//! - **onefs-papi**: Returns these types directly from its public API
//! - **onefs-tasks**: Compares desired parameters against these observed types
//! - **onefs-runner**: Serializes these types into task reports
//!
//! Observed resource types keep a flattened `extra` map so that fields this
//! crate does not model are still carried through to the final report
//! unchanged. Desired-state (playbook-side) types reject unknown fields at
//! deserialization instead, so typos surface before any call to the array.

pub mod acl;
pub mod auth;
pub mod common;
pub mod export;
pub mod protocol;
pub mod quota;
pub mod snapshot;
pub mod zone;

pub use acl::{AccessControl, AclAuthority, NamespaceAcl};
pub use auth::{AuthGroup, AuthProvider, AuthUser, Identity};
pub use common::{
    CapacityUnit, EXPIRY_TOLERANCE_SECS, GracePeriodUnit, RetentionUnit, State,
    bytes_with_unit, expiry_within_tolerance, format_octal, grace_period_seconds, parse_octal,
    parse_expiration_timestamp, retention_expiry, size_to_bytes,
};
pub use export::{NfsExport, NfsExportCreate, NfsExportUpdate};
pub use protocol::{
    NfsExportSettings, NfsExportSettingsUpdate, NfsSettingsUpdate, NfsZoneSettings,
    NfsZoneSettingsUpdate, SmbSettingsApply, SmbSettingsUpdate, SmbShare, SmbShareSettings,
};
pub use quota::{
    FsQuotaParams, Persona, Quota, QuotaCreate, QuotaLimits, QuotaThresholds, QuotaType,
    QuotaUpdate, ThresholdsUpdate,
};
pub use snapshot::{Snapshot, SnapshotCreate, SnapshotUpdate};
pub use zone::{AccessZone, ZoneSummary};
