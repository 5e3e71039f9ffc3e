//! Build Descriptor Parsing
//!
//! Devices report the firmware they are running as a single header value,
//! `<name>-<Mon D YYYY>-<HH:MM:SS>`: the sketch name plus the compile-time
//! date and time strings the toolchain embeds in the image.

use chrono::NaiveDateTime;
use thiserror::Error;

/// Combined date+time layout of the build stamp, e.g. `May 7 2023 15:26:18`.
pub const BUILD_STAMP_FORMAT: &str = "%b %d %Y %H:%M:%S";

/// Descriptor parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("expected <name>-<date>-<time>, got {0} hyphen-separated fields")]
    FieldCount(usize),
    #[error("unparsable build stamp: {0:?}")]
    BadStamp(String),
}

/// The firmware name and build time a device claims to be running.
///
/// Immutable and scoped to a single request; second resolution, no timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionDescriptor {
    pub artifact: String,
    pub built_at: NaiveDateTime,
}

impl VersionDescriptor {
    /// Parse a raw header value into a descriptor.
    ///
    /// Exactly three hyphen-delimited fields are required. Date and time are
    /// trimmed and joined before parsing; the compiler pads single-digit days
    /// with a second space (`"May  7 2023"`) and chrono's flexible whitespace
    /// matching absorbs it. The format carries no sub-second field, so the
    /// result always has zero fractional seconds.
    pub fn parse(raw: &str) -> Result<Self, DescriptorError> {
        let parts: Vec<&str> = raw.split('-').collect();
        if parts.len() != 3 {
            return Err(DescriptorError::FieldCount(parts.len()));
        }
        let stamp = format!("{} {}", parts[1].trim(), parts[2].trim());
        let built_at = NaiveDateTime::parse_from_str(&stamp, BUILD_STAMP_FORMAT)
            .map_err(|_| DescriptorError::BadStamp(stamp))?;
        Ok(Self {
            artifact: parts[0].to_string(),
            built_at,
        })
    }
}
