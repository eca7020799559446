// SPDX-License-Identifier: GPL-3.0-only

//! The task implementations, one module per resource

pub mod accesszone;
pub mod filesystem;
pub mod gatherfacts;
pub mod nfs;
pub mod smartquota;
pub mod snapshot;

/// Task names accepted in a task file, in the order they are listed.
pub const NAMES: &[&str] = &[
    "accesszone",
    "filesystem",
    "gatherfacts",
    "nfs",
    "smartquota",
    "snapshot",
];

/// Standard default for `access_zone` parameters.
pub(crate) fn default_zone() -> String {
    "System".to_string()
}

/// Whether a zone name refers to the built-in System zone. Zone names are
/// case-insensitive on the array.
pub(crate) fn is_system_zone(zone: &str) -> bool {
    zone.eq_ignore_ascii_case("system")
}

/// A desired field diverges only when it is given and differs from what the
/// array reports.
pub(crate) fn given_differs<T: PartialEq>(desired: &Option<T>, observed: &Option<T>) -> bool {
    matches!(desired, Some(d) if observed.as_ref() != Some(d))
}
