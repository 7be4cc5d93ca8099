//! Staff Token Records

use bazaar::uuids::TypedUuid;
use jiff::Timestamp;

/// Staff Token UUID
pub type StaffTokenUuid = TypedUuid<StaffTokenRecord>;

/// Staff token metadata. The token itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffTokenRecord {
    pub uuid: StaffTokenUuid,
    pub label: String,
    pub created_at: Timestamp,
    pub last_used_at: Option<Timestamp>,
    pub revoked_at: Option<Timestamp>,
}

/// A freshly issued token. `token` is shown once and cannot be recovered.
#[derive(Debug, Clone)]
pub struct IssuedStaffToken {
    pub token: String,
    pub record: StaffTokenRecord,
}
