//! Transition status lifecycle enforcement.
//!
//! Validates status updates per the migration lifecycle:
//!
//! ```text
//! (absent)   -> InProgress | Verified
//! InProgress -> InProgress | Verified | Failed
//! Failed     -> InProgress | Verified | Failed
//! Verified   -> Verified
//! ```
//!
//! `(absent)` is a never-started transition. `Verified` directly from absent
//! covers the empty-secondary short-circuit. A status may always repeat
//! itself because bus delivery is at-least-once.

use quillsync_domain::TransitionStatus;

/// Whether a published status is a legal successor of the stored one.
pub fn is_valid_transition(from: Option<TransitionStatus>, to: TransitionStatus) -> bool {
    match from {
        None => matches!(
            to,
            TransitionStatus::InProgress | TransitionStatus::Verified
        ),
        Some(TransitionStatus::InProgress) | Some(TransitionStatus::Failed) => true,
        Some(TransitionStatus::Verified) => to == TransitionStatus::Verified,
    }
}

/// Returns `true` if the status ends the lifecycle (no re-entry without the
/// scheduler removing the row first).
pub fn is_terminal(status: TransitionStatus) -> bool {
    status == TransitionStatus::Verified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_started_can_begin_or_short_circuit() {
        assert!(is_valid_transition(None, TransitionStatus::InProgress));
        assert!(is_valid_transition(None, TransitionStatus::Verified));
        assert!(!is_valid_transition(None, TransitionStatus::Failed));
    }

    #[test]
    fn in_progress_can_keep_alive_or_finish() {
        for to in [
            TransitionStatus::InProgress,
            TransitionStatus::Verified,
            TransitionStatus::Failed,
        ] {
            assert!(is_valid_transition(Some(TransitionStatus::InProgress), to));
        }
    }

    #[test]
    fn failed_is_re_entrant() {
        assert!(is_valid_transition(
            Some(TransitionStatus::Failed),
            TransitionStatus::InProgress
        ));
        assert!(is_valid_transition(
            Some(TransitionStatus::Failed),
            TransitionStatus::Verified
        ));
        assert!(is_valid_transition(
            Some(TransitionStatus::Failed),
            TransitionStatus::Failed
        ));
    }

    #[test]
    fn verified_only_repeats() {
        assert!(is_valid_transition(
            Some(TransitionStatus::Verified),
            TransitionStatus::Verified
        ));
        assert!(!is_valid_transition(
            Some(TransitionStatus::Verified),
            TransitionStatus::InProgress
        ));
        assert!(!is_valid_transition(
            Some(TransitionStatus::Verified),
            TransitionStatus::Failed
        ));
    }

    #[test]
    fn only_verified_is_terminal() {
        assert!(is_terminal(TransitionStatus::Verified));
        assert!(!is_terminal(TransitionStatus::InProgress));
        assert!(!is_terminal(TransitionStatus::Failed));
    }
}
