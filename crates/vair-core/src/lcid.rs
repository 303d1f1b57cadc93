/// Logical channel identifier, tags the upper-layer destination of a payload
pub type Lcid = u16;

/// SRB0, carries RRC connection setup signalling
pub const LCID_SRB0: Lcid = 0;
/// SRB1, default channel for downlink NAS signalling
pub const LCID_SRB1: Lcid = 1;
pub const LCID_SRB2: Lcid = 2;

/// Channels below this value are signalling radio bearers and go to the
/// signalling sink; channels at or above it are data radio bearers.
pub const LCID_DRB_THRESHOLD: Lcid = 3;

/// ERAB ids map onto data bearers with a fixed offset: ERAB 5 is DRB1 on lcid 3
pub const ERAB_LCID_OFFSET: u8 = 2;

#[inline]
pub fn is_signalling(lcid: Lcid) -> bool {
    lcid < LCID_DRB_THRESHOLD
}

/// Maps an ERAB id to the logical channel of its data bearer.
/// ERAB ids that would land on a signalling channel have no mapping.
pub fn lcid_from_erab_id(erab_id: u8) -> Option<Lcid> {
    let lcid = erab_id.checked_sub(ERAB_LCID_OFFSET)? as Lcid;
    if is_signalling(lcid) { None } else { Some(lcid) }
}

pub fn erab_id_from_lcid(lcid: Lcid) -> Option<u8> {
    if is_signalling(lcid) {
        return None;
    }
    u8::try_from(lcid).ok()?.checked_add(ERAB_LCID_OFFSET)
}

/// Human readable radio bearer name for a logical channel
pub fn rb_name(lcid: Lcid) -> String {
    if is_signalling(lcid) {
        format!("SRB{}", lcid)
    } else {
        format!("DRB{}", lcid - LCID_DRB_THRESHOLD + 1)
    }
}
