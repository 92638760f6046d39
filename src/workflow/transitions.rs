use std::collections::HashMap;

use crate::models::candidate::CandidateStatus;

/// Directed adjacency table over the recruiting pipeline. Built once at
/// startup and shared behind an `Arc`; services receive it as a constructor
/// argument instead of reaching for a global.
#[derive(Debug)]
pub struct TransitionTable {
    allowed: HashMap<CandidateStatus, Vec<CandidateStatus>>,
}

impl TransitionTable {
    pub fn new() -> Self {
        use CandidateStatus::*;

        let mut allowed: HashMap<CandidateStatus, Vec<CandidateStatus>> = HashMap::new();
        allowed.insert(CvReviewing, vec![CvApproved, CvRejected]);
        allowed.insert(CvApproved, vec![WaitingReplyFirstInterview, CandidateReject]);
        allowed.insert(WaitingReplyFirstInterview, vec![FirstInterview, CandidateReject]);
        allowed.insert(
            FirstInterview,
            vec![WaitingReplySecondInterview, Offering, InterviewFail],
        );
        allowed.insert(WaitingReplySecondInterview, vec![SecondInterview, CandidateReject]);
        allowed.insert(SecondInterview, vec![Offering, InterviewFail]);
        allowed.insert(Offering, vec![Onboard, NotOnboard]);
        for terminal in [CvRejected, InterviewFail, Onboard, NotOnboard, CandidateReject] {
            allowed.insert(terminal, Vec::new());
        }

        Self { allowed }
    }

    pub fn allowed_next(&self, current: CandidateStatus) -> &[CandidateStatus] {
        self.allowed.get(&current).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_allowed(&self, current: CandidateStatus, next: CandidateStatus) -> bool {
        self.allowed_next(current).contains(&next)
    }

    pub fn is_terminal(&self, status: CandidateStatus) -> bool {
        self.allowed_next(status).is_empty()
    }
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CandidateStatus::*;

    const EXPECTED: [(CandidateStatus, CandidateStatus); 15] = [
        (CvReviewing, CvApproved),
        (CvReviewing, CvRejected),
        (CvApproved, WaitingReplyFirstInterview),
        (CvApproved, CandidateReject),
        (WaitingReplyFirstInterview, FirstInterview),
        (WaitingReplyFirstInterview, CandidateReject),
        (FirstInterview, WaitingReplySecondInterview),
        (FirstInterview, Offering),
        (FirstInterview, InterviewFail),
        (WaitingReplySecondInterview, SecondInterview),
        (WaitingReplySecondInterview, CandidateReject),
        (SecondInterview, Offering),
        (SecondInterview, InterviewFail),
        (Offering, Onboard),
        (Offering, NotOnboard),
    ];

    #[test]
    fn every_pair_outside_the_table_is_rejected() {
        let table = TransitionTable::new();
        for from in CandidateStatus::ALL {
            for to in CandidateStatus::ALL {
                let expected = EXPECTED.contains(&(from, to));
                assert_eq!(
                    table.is_allowed(from, to),
                    expected,
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_stages_have_no_successors() {
        let table = TransitionTable::new();
        for terminal in [CvRejected, InterviewFail, Onboard, NotOnboard, CandidateReject] {
            assert!(table.is_terminal(terminal), "{:?}", terminal);
            assert!(table.allowed_next(terminal).is_empty());
        }
        assert!(!table.is_terminal(CvReviewing));
    }

    #[test]
    fn self_transitions_are_never_allowed() {
        let table = TransitionTable::new();
        for status in CandidateStatus::ALL {
            assert!(!table.is_allowed(status, status), "{:?}", status);
        }
    }
}
