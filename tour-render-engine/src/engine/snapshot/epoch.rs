//! UTC epoch parsing, stepping and snapshot asset naming.

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const EPOCH_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Error, PartialEq)]
pub enum EpochError {
    #[error("unparseable epoch \"{0}\"")]
    Unparseable(String),

    #[error("stepping {delta} {unit:?} from {from} leaves the supported date range")]
    OutOfRange {
        from: String,
        unit: EpochUnit,
        delta: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EpochUnit {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    #[serde(rename = "ms")]
    Millisecond,
}

/// Parses an epoch as UTC. A missing `Z` suffix is assumed; bare dates are
/// taken as midnight.
pub fn parse_epoch(raw: &str) -> Result<DateTime<Utc>, EpochError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EpochError::Unparseable(raw.to_string()));
    }

    let zoned = if trimmed.ends_with('Z') || trimmed.ends_with('z') {
        trimmed.to_string()
    } else {
        format!("{trimmed}Z")
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&zoned) {
        return Ok(parsed.with_timezone(&Utc));
    }

    // Offsets other than Z, e.g. "+02:00", land here with a bogus suffix.
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    let naive = trimmed.trim_end_matches(['Z', 'z']);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(naive, format) {
            return Ok(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| EpochError::Unparseable(raw.to_string()))
}

/// Canonical `YYYY-MM-DDTHH:MM:SS.sssZ` form.
pub fn format_epoch(epoch: &DateTime<Utc>) -> String {
    epoch.format(EPOCH_FORMAT).to_string()
}

/// Adds `delta` units in UTC. Month and year steps clamp to the last valid
/// day of the resulting month.
pub fn step_epoch(
    epoch: DateTime<Utc>,
    unit: EpochUnit,
    delta: i64,
) -> Result<DateTime<Utc>, EpochError> {
    let out_of_range = || EpochError::OutOfRange {
        from: format_epoch(&epoch),
        unit,
        delta,
    };

    let stepped = match unit {
        EpochUnit::Year => step_months(epoch, delta.checked_mul(12).ok_or_else(out_of_range)?),
        EpochUnit::Month => step_months(epoch, delta),
        EpochUnit::Day => Duration::try_days(delta).and_then(|d| epoch.checked_add_signed(d)),
        EpochUnit::Hour => Duration::try_hours(delta).and_then(|d| epoch.checked_add_signed(d)),
        EpochUnit::Minute => {
            Duration::try_minutes(delta).and_then(|d| epoch.checked_add_signed(d))
        }
        EpochUnit::Second => {
            Duration::try_seconds(delta).and_then(|d| epoch.checked_add_signed(d))
        }
        EpochUnit::Millisecond => {
            Duration::try_milliseconds(delta).and_then(|d| epoch.checked_add_signed(d))
        }
    };

    stepped.ok_or_else(out_of_range)
}

fn step_months(epoch: DateTime<Utc>, months: i64) -> Option<DateTime<Utc>> {
    let magnitude = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        epoch.checked_add_months(magnitude)
    } else {
        epoch.checked_sub_months(magnitude)
    }
}

/// Asset path of the snapshot published for `epoch`. Colons are not portable
/// in file names, so they become dashes.
pub fn snapshot_asset_path(epoch: &DateTime<Utc>) -> String {
    format!("snapshots/{}.snapshot.json", format_epoch(epoch).replace(':', "-"))
}
