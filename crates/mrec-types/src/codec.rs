//! Multicodec tags for record kinds.
//!
//! The tag is carried inside every [`Cid`](crate::Cid) and tells a reader
//! which schema family produced the bytes. Values follow the private-use
//! range of the multicodec table and must never be reassigned.

/// Raw binary block (opaque bytes such as license terms).
pub const RAW: u64 = 0x55;

/// ISCN kernel record.
pub const ISCN: u64 = 0x0264;
/// Rights grouping record.
pub const RIGHTS: u64 = 0x0265;
/// Stakeholders grouping record.
pub const STAKEHOLDERS: u64 = 0x0266;
/// Entity record.
pub const ENTITY: u64 = 0x0267;
/// Content descriptor record.
pub const CONTENT: u64 = 0x0268;
/// Single right, nested inside a rights grouping.
pub const RIGHT: u64 = 0x02BD;
/// Single stakeholder, nested inside a stakeholders grouping.
pub const STAKEHOLDER: u64 = 0x02D1;
/// Time period, nested inside a right.
pub const TIME_PERIOD: u64 = 0x033F;

/// Returns `true` if `codec` belongs to one of the top-level record kinds.
pub fn is_record_codec(codec: u64) -> bool {
    matches!(codec, ISCN | RIGHTS | STAKEHOLDERS | ENTITY | CONTENT)
}

/// Human-readable name for a known codec tag.
pub fn name(codec: u64) -> Option<&'static str> {
    Some(match codec {
        RAW => "raw",
        ISCN => "iscn",
        RIGHTS => "rights",
        STAKEHOLDERS => "stakeholders",
        ENTITY => "entity",
        CONTENT => "content",
        RIGHT => "right",
        STAKEHOLDER => "stakeholder",
        TIME_PERIOD => "timeperiod",
        _ => return None,
    })
}
