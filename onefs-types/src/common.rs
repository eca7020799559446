//! Shared enums and unit conversion helpers
//!
//! Conversions between playbook-side values (octal mode strings, sizes with a
//! capacity unit, retention periods) and the numeric forms the array reports.

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// Idempotence window for snapshot expiration timestamps, in seconds.
///
/// The array stamps `expires` relative to when the request lands, so two runs
/// of the same task compute slightly different epochs. Differences within
/// this window count as "already converged".
pub const EXPIRY_TOLERANCE_SECS: i64 = 120;

/// Desired presence of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    Present,
    Absent,
}

impl State {
    pub fn is_present(self) -> bool {
        matches!(self, State::Present)
    }
}

/// Capacity units accepted in task parameters (1024-based).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CapacityUnit {
    #[serde(rename = "KB", alias = "kb")]
    Kb,

    #[serde(rename = "MB", alias = "mb")]
    Mb,

    #[default]
    #[serde(rename = "GB", alias = "gb")]
    Gb,

    #[serde(rename = "TB", alias = "tb")]
    Tb,
}

impl CapacityUnit {
    /// Bytes per one unit.
    pub fn multiplier(self) -> u64 {
        match self {
            CapacityUnit::Kb => 1024,
            CapacityUnit::Mb => 1024 * 1024,
            CapacityUnit::Gb => 1024 * 1024 * 1024,
            CapacityUnit::Tb => 1024 * 1024 * 1024 * 1024,
        }
    }

    /// Unit label as it appears in reports (e.g. "GB")
    pub fn label(self) -> &'static str {
        match self {
            CapacityUnit::Kb => "KB",
            CapacityUnit::Mb => "MB",
            CapacityUnit::Gb => "GB",
            CapacityUnit::Tb => "TB",
        }
    }
}

/// Units for a quota soft-limit grace period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GracePeriodUnit {
    #[default]
    Days,
    Weeks,
    Months,
}

/// Units for a snapshot retention period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionUnit {
    #[default]
    Hours,
    Days,
}

/// Convert a size expressed in a capacity unit to bytes.
pub fn size_to_bytes(size: u64, unit: CapacityUnit) -> u64 {
    size.saturating_mul(unit.multiplier())
}

/// Convert bytes to the largest fitting unit, e.g. `6442450944` -> `"6.0 GB"`.
///
/// The value is rounded to two decimals and rendered without trailing zeros
/// beyond the first (`"6.0 GB"`, `"6.25 GB"`). Zero renders as `"0B"`.
pub fn bytes_with_unit(bytes: u64) -> String {
    if bytes == 0 {
        return "0B".to_string();
    }

    let mut steps = 0;
    let mut val: f64 = bytes as f64;

    while val >= 1024. && steps < 8 {
        val /= 1024.;
        steps += 1;
    }

    let unit = match steps {
        0 => "B",
        1 => "KB",
        2 => "MB",
        3 => "GB",
        4 => "TB",
        5 => "PB",
        6 => "EB",
        7 => "ZB",
        _ => "YB",
    };

    let rounded = (val * 100.).round() / 100.;
    if rounded == rounded.trunc() {
        format!("{rounded:.1} {unit}")
    } else {
        format!("{rounded} {unit}")
    }
}

/// Parse an octal mode string (e.g. `"700"`) into mode bits.
pub fn parse_octal(text: &str) -> Result<u32> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        bail!("empty octal mode string");
    }
    u32::from_str_radix(trimmed, 8).map_err(|_| anyhow!("invalid octal value: {text}"))
}

/// Render mode bits as an unpadded octal string, e.g. `448` -> `"700"`.
pub fn format_octal(bits: u32) -> String {
    format!("{bits:o}")
}

/// Convert a grace period in the given unit to seconds.
pub fn grace_period_seconds(period: u64, unit: GracePeriodUnit) -> u64 {
    let per_unit = match unit {
        GracePeriodUnit::Days => 86_400,
        GracePeriodUnit::Weeks => 7 * 86_400,
        GracePeriodUnit::Months => 30 * 86_400,
    };
    period.saturating_mul(per_unit)
}

/// Compute an expiration epoch from an anchor epoch plus a retention period.
pub fn retention_expiry(anchor_epoch: i64, retention: u64, unit: RetentionUnit) -> i64 {
    let per_unit = match unit {
        RetentionUnit::Hours => 3_600,
        RetentionUnit::Days => 86_400,
    };
    anchor_epoch.saturating_add(retention as i64 * per_unit)
}

/// Parse an expiration timestamp of the form `2025-01-01T00:00:00Z` (UTC).
pub fn parse_expiration_timestamp(text: &str) -> Result<i64> {
    let parsed = chrono::NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%SZ")
        .map_err(|e| anyhow!("invalid expiration timestamp {text:?}: {e}"))?;
    Ok(parsed.and_utc().timestamp())
}

/// Whether two expiration epochs are close enough to count as unchanged.
pub fn expiry_within_tolerance(desired: i64, observed: i64) -> bool {
    (desired - observed).abs() <= EXPIRY_TOLERANCE_SECS
}
