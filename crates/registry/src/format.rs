//! Canonical identifier formatting.
//!
//! This module contains pure logic for rendering display identifiers and
//! deriving counter names. No I/O operations - just string building.

use std::fmt;

use sacco_records_common::constants::{
    APPLICATION_PREFIX, LOAN_PAD_WIDTH, LOAN_PREFIX, MEMBERSHIP_PAD_WIDTH, MEMBERSHIP_PREFIX,
};

/// Time bucket scoping a sequence counter.
///
/// Loan and application numbers are bucketed by calendar year; membership
/// IDs are bucketed by enrollment date. The bucket value is always supplied
/// by the caller - for year-bucketed identifiers it comes from policy
/// configuration, never from the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    /// Calendar year, rendered as `YYYY`.
    Year(u16),
    /// Full date, rendered as `YYYYMMDD`.
    Date { year: u16, month: u8, day: u8 },
}

impl fmt::Display for TimeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeBucket::Year(year) => write!(f, "{:04}", year),
            TimeBucket::Date { year, month, day } => {
                write!(f, "{:04}{:02}{:02}", year, month, day)
            }
        }
    }
}

/// Format a canonical display identifier.
///
/// The sequence is zero-padded to `pad_width` digits. A sequence that
/// exceeds the pad width's capacity keeps all of its digits - the
/// identifier grows instead of truncating, which callers must accept.
///
/// # Arguments
/// * `prefix` - Record-type prefix, e.g. `"ZLID"`
/// * `bucket` - Rendered time bucket, e.g. `"2025"` or `"20250115"`
/// * `sequence` - Allocated sequence value
/// * `pad_width` - Minimum digit count for the sequence
pub fn format_identifier(prefix: &str, bucket: &str, sequence: u64, pad_width: usize) -> String {
    format!("{}{}{:0width$}", prefix, bucket, sequence, width = pad_width)
}

/// Naming and formatting policy for one class of record identifier.
#[derive(Debug, Clone)]
pub struct IdentifierScheme {
    /// Counter namespace, e.g. `"loan"`.
    pub kind: String,
    /// Display prefix, e.g. `"ZLID"`.
    pub prefix: String,
    /// Time bucket embedded in both the counter name and the identifier.
    pub bucket: TimeBucket,
    /// Zero-padding width for the sequence.
    pub pad_width: usize,
}

impl IdentifierScheme {
    /// Create a scheme from its parts.
    pub fn new(
        kind: impl Into<String>,
        prefix: impl Into<String>,
        bucket: TimeBucket,
        pad_width: usize,
    ) -> Self {
        Self {
            kind: kind.into(),
            prefix: prefix.into(),
            bucket,
            pad_width,
        }
    }

    /// Scheme for membership IDs, bucketed by enrollment date.
    pub fn membership(year: u16, month: u8, day: u8) -> Self {
        Self::new(
            "membership",
            MEMBERSHIP_PREFIX,
            TimeBucket::Date { year, month, day },
            MEMBERSHIP_PAD_WIDTH,
        )
    }

    /// Scheme for loan account numbers.
    ///
    /// The bucket year is configuration (see `LOAN_BUCKET_YEAR` in
    /// sacco-records-common), not a clock read.
    pub fn loan(year: u16) -> Self {
        Self::new("loan", LOAN_PREFIX, TimeBucket::Year(year), LOAN_PAD_WIDTH)
    }

    /// Scheme for loan application numbers.
    pub fn application(year: u16) -> Self {
        Self::new(
            "application",
            APPLICATION_PREFIX,
            TimeBucket::Year(year),
            LOAN_PAD_WIDTH,
        )
    }

    /// Name of the sequence counter backing this scheme.
    ///
    /// Returns: `"{kind}-{bucket}"`, e.g. `"loan-2025"` or
    /// `"membership-20250115"`.
    pub fn counter_name(&self) -> String {
        format!("{}-{}", self.kind, self.bucket)
    }

    /// Render the canonical identifier for an allocated sequence value.
    pub fn render(&self, sequence: u64) -> String {
        format_identifier(
            &self.prefix,
            &self.bucket.to_string(),
            sequence,
            self.pad_width,
        )
    }
}
