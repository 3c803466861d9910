use crate::models::AppointmentStatus;

/// Change to apply to the linked authorization's `used_sessions` counter when
/// an appointment moves between statuses. Entering COMPLETED consumes a
/// session; leaving it refunds one; every other transition is neutral, so a
/// complete-then-revert nets out to zero.
pub fn session_delta(current: AppointmentStatus, next: AppointmentStatus) -> i32 {
    match (current, next) {
        (AppointmentStatus::Completed, AppointmentStatus::Completed) => 0,
        (_, AppointmentStatus::Completed) => 1,
        (AppointmentStatus::Completed, _) => -1,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn completing_consumes_a_session() {
        assert_eq!(session_delta(Scheduled, Completed), 1);
        assert_eq!(session_delta(NoShow, Completed), 1);
        assert_eq!(session_delta(Cancelled, Completed), 1);
    }

    #[test]
    fn reverting_a_completion_refunds_the_session() {
        assert_eq!(session_delta(Completed, Scheduled), -1);
        assert_eq!(session_delta(Completed, Cancelled), -1);
        assert_eq!(session_delta(Completed, NoShow), -1);
    }

    #[test]
    fn neutral_transitions_leave_the_counter_alone() {
        assert_eq!(session_delta(Scheduled, Cancelled), 0);
        assert_eq!(session_delta(Scheduled, NoShow), 0);
        assert_eq!(session_delta(Cancelled, Scheduled), 0);
        assert_eq!(session_delta(Completed, Completed), 0);
    }

    #[test]
    fn complete_then_revert_nets_to_zero() {
        let there = session_delta(Scheduled, Completed);
        let back = session_delta(Completed, Scheduled);
        assert_eq!(there + back, 0);
    }
}
