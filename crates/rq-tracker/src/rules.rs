//! Status derivation.
//!
//! The two remote observations (availability flag, pending request) are folded
//! into a single [`MediaStatus`] by an ordered rule list; the first rule that
//! matches decides.

use rq_core::{MediaStatus, StatusRecord};

use crate::remote::RemoteAvailability;

/// What the tracking service reported for one title.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Observation {
    /// `None` when the service has no record of the title at all.
    pub availability: Option<RemoteAvailability>,
    /// Id of the open request for the title, if any.
    pub pending_request: Option<u64>,
}

type Predicate = fn(&Observation) -> bool;

fn is_available(obs: &Observation) -> bool {
    obs.availability == Some(RemoteAvailability::Available)
}

fn is_processing(obs: &Observation) -> bool {
    obs.availability == Some(RemoteAvailability::Processing)
}

fn has_pending_request(obs: &Observation) -> bool {
    obs.pending_request.is_some()
}

fn otherwise(_: &Observation) -> bool {
    true
}

/// Evaluated top to bottom. The last rule always matches.
const RULES: &[(Predicate, MediaStatus)] = &[
    (is_available, MediaStatus::Available),
    (is_processing, MediaStatus::Processing),
    (has_pending_request, MediaStatus::Pending),
    (otherwise, MediaStatus::NotAvailable),
];

/// Fold an observation into a status record.
///
/// The request id is carried only when the outcome is `Pending`; an available
/// or processing title is past the point where cancelling makes sense.
pub fn derive_status(obs: &Observation) -> StatusRecord {
    let status = RULES
        .iter()
        .find(|(applies, _)| applies(obs))
        .map_or(MediaStatus::NotAvailable, |(_, status)| *status);

    let request_id = match status {
        MediaStatus::Pending => obs.pending_request,
        _ => None,
    };
    StatusRecord::new(status, request_id)
}
