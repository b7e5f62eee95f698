//! Shared constants used across sacco-records crates.

/// Attachment slot for the front of a member's primary identity document.
pub const SLOT_PRIMARY_ID: &str = "primaryId";

/// Attachment slot for the back of a member's primary identity document.
pub const SLOT_PRIMARY_ID_BACK: &str = "primaryIdBack";

/// Attachment slot for a secondary identity document.
pub const SLOT_SECONDARY_ID: &str = "secondaryId";

/// Attachment slot for the member's portrait photo.
pub const SLOT_PORTRAIT: &str = "portrait";

/// The standard document slots required on a membership record.
pub const MEMBER_DOCUMENT_SLOTS: [&str; 4] = [
    SLOT_PRIMARY_ID,
    SLOT_PRIMARY_ID_BACK,
    SLOT_SECONDARY_ID,
    SLOT_PORTRAIT,
];

/// Identifier prefix for membership IDs.
pub const MEMBERSHIP_PREFIX: &str = "ZAR-";

/// Identifier prefix for loan account numbers.
pub const LOAN_PREFIX: &str = "ZLID";

/// Identifier prefix for loan application numbers.
pub const APPLICATION_PREFIX: &str = "ZAPP";

/// Zero-padding width for membership sequence numbers.
pub const MEMBERSHIP_PAD_WIDTH: usize = 4;

/// Zero-padding width for loan and application sequence numbers.
pub const LOAN_PAD_WIDTH: usize = 5;

/// Bucket year used in loan and application identifiers.
///
/// Pinned manually rather than derived from the clock so identifier output
/// stays stable across the year boundary until the rollover procedure runs.
/// TODO: confirm with the registry owner whether this should advance
/// automatically at year end.
pub const LOAN_BUCKET_YEAR: u16 = 2025;

/// Maximum keys per bulk delete request (the store's DeleteObjects limit).
pub const DELETE_BATCH_LIMIT: usize = 1000;

/// Default cap on objects examined per reconciliation run.
pub const DEFAULT_SCAN_OBJECT_CAP: usize = 10_000;
