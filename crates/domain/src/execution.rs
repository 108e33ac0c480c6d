use crate::{SetID, Workout};

/// Tracks the progress of one workout execution session: which set is
/// active, which are finished, skipped or snoozed, and whether the session
/// has ended.
///
/// The machine is pure state; persistence writes triggered by transitions
/// are the caller's concern and never block a transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    set_ids: Vec<SetID>,
    phase: Phase,
    current: Option<SetID>,
    finished: Vec<SetID>,
    skipped: Vec<SetID>,
    snoozed: Vec<SetID>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Staging,
    Running,
    Resting,
    Finished,
}

/// Status of a single set within a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetStatus {
    Fresh,
    Finished,
    Skipped,
    Snoozed,
}

impl Execution {
    #[must_use]
    pub fn new(workout: &Workout) -> Self {
        Self {
            set_ids: workout.set_ids(),
            phase: Phase::Staging,
            current: None,
            finished: vec![],
            skipped: vec![],
            snoozed: vec![],
        }
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current(&self) -> Option<&SetID> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn finished(&self) -> &[SetID] {
        &self.finished
    }

    #[must_use]
    pub fn skipped(&self) -> &[SetID] {
        &self.skipped
    }

    #[must_use]
    pub fn snoozed(&self) -> &[SetID] {
        &self.snoozed
    }

    #[must_use]
    pub fn status(&self, set_id: &SetID) -> SetStatus {
        if self.finished.contains(set_id) {
            SetStatus::Finished
        } else if self.skipped.contains(set_id) {
            SetStatus::Skipped
        } else if self.snoozed.contains(set_id) {
            SetStatus::Snoozed
        } else {
            SetStatus::Fresh
        }
    }

    /// Every set is either finished or skipped. Snoozed sets remain eligible
    /// and keep the session alive.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.finished.len() + self.skipped.len() >= self.set_ids.len()
    }

    pub fn start(&mut self) {
        if self.phase != Phase::Staging {
            return;
        }
        self.phase = Phase::Running;
        self.current = self.next_set_id(None);
    }

    pub fn mark_done(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.phase = Phase::Resting;
    }

    pub fn skip(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        self.skipped.push(current);
        self.commit();
    }

    /// Snoozing defers a set without taking it out of contention. It is
    /// rejected when the set is the only remaining eligible one, as snoozing
    /// it would select it again immediately.
    #[must_use]
    pub fn can_snooze(&self) -> bool {
        match (&self.current, self.next_set_id(self.current.as_ref())) {
            (Some(current), Some(next)) => next != *current,
            _ => false,
        }
    }

    pub fn snooze(&mut self) {
        if self.phase != Phase::Running || !self.can_snooze() {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        if !self.snoozed.contains(&current) {
            self.snoozed.push(current);
        }
        self.current = self.next_set_id(None);
    }

    pub fn submit(&mut self) {
        if self.phase != Phase::Resting {
            return;
        }
        let Some(current) = self.current.clone() else {
            return;
        };
        self.finished.push(current);
        self.commit();
    }

    fn commit(&mut self) {
        self.snoozed
            .retain(|id| !self.finished.contains(id) && !self.skipped.contains(id));
        if self.is_complete() {
            self.phase = Phase::Finished;
            self.current = None;
        } else {
            self.phase = Phase::Running;
            self.current = self.next_set_id(None);
        }
    }

    /// Deterministic selection of the next set: the first fresh set in
    /// insertion order, otherwise the snoozed set following `current` in
    /// snooze order (wrapping around). `simulate_snoozed` treats one more
    /// set as snoozed, which is used to decide snooze eligibility.
    fn next_set_id(&self, simulate_snoozed: Option<&SetID>) -> Option<SetID> {
        let fresh = self
            .set_ids
            .iter()
            .find(|id| self.status(id) == SetStatus::Fresh && Some(*id) != simulate_snoozed);
        if let Some(id) = fresh {
            return Some(id.clone());
        }

        let mut snoozed = self.snoozed.clone();
        if let Some(id) = simulate_snoozed {
            if !snoozed.contains(id) {
                snoozed.push(id.clone());
            }
        }
        let position = self
            .current
            .as_ref()
            .and_then(|current| snoozed.iter().position(|id| id == current));
        match position {
            Some(i) if i + 1 < snoozed.len() => Some(snoozed[i + 1].clone()),
            _ => snoozed.first().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use crate::{Name, Reps, RestInterval, Workout, WorkoutSet};

    use super::*;

    fn workout(set_ids: &[&str]) -> Workout {
        Workout {
            id: "w1".into(),
            name: Some(Name::new("Push A").unwrap()),
            sets: set_ids
                .iter()
                .map(|id| {
                    (
                        SetID::from(*id),
                        WorkoutSet {
                            exercise_id: Some("e1".into()),
                            target_reps: Some(Reps::new(10).unwrap()),
                            rest_interval: Some(RestInterval::new(30).unwrap()),
                            notes: None,
                        },
                    )
                })
                .collect(),
            last_accessed: None,
        }
    }

    fn running(set_ids: &[&str]) -> Execution {
        let mut execution = Execution::new(&workout(set_ids));
        execution.start();
        execution
    }

    fn complete_current(execution: &mut Execution) {
        execution.mark_done();
        execution.submit();
    }

    #[test]
    fn test_start_selects_first_set() {
        let mut execution = Execution::new(&workout(&["a", "b", "c"]));
        assert_eq!(execution.phase(), Phase::Staging);
        assert_eq!(execution.current(), None);

        execution.start();

        assert_eq!(execution.phase(), Phase::Running);
        assert_eq!(execution.current(), Some(&"a".into()));
    }

    #[test]
    fn test_completing_every_set_finishes_session() {
        let set_ids = ["a", "b", "c", "d"];
        let mut execution = running(&set_ids);

        for (completed, id) in set_ids.iter().enumerate() {
            assert_eq!(execution.phase(), Phase::Running);
            assert_eq!(execution.current(), Some(&(*id).into()));
            execution.mark_done();
            assert_eq!(execution.phase(), Phase::Resting);
            execution.submit();
            assert_eq!(execution.finished().len(), completed + 1);
        }

        assert_eq!(execution.phase(), Phase::Finished);
        assert_eq!(execution.current(), None);
        assert_eq!(execution.finished().len(), set_ids.len());
        assert!(execution.skipped().is_empty());
        assert!(execution.snoozed().is_empty());
    }

    #[test]
    fn test_skipping_every_set_finishes_session_without_results() {
        let mut execution = running(&["a", "b"]);

        execution.skip();
        assert_eq!(execution.phase(), Phase::Running);
        assert_eq!(execution.current(), Some(&"b".into()));
        execution.skip();

        assert_eq!(execution.phase(), Phase::Finished);
        assert_eq!(execution.skipped(), &[SetID::from("a"), SetID::from("b")]);
        assert!(execution.finished().is_empty());
    }

    #[test]
    fn test_finished_and_skipped_stay_disjoint() {
        let mut execution = running(&["a", "b", "c"]);

        complete_current(&mut execution);
        execution.skip();
        complete_current(&mut execution);

        assert_eq!(execution.finished(), &[SetID::from("a"), SetID::from("c")]);
        assert_eq!(execution.skipped(), &[SetID::from("b")]);
        assert!(
            execution
                .finished()
                .iter()
                .all(|id| !execution.skipped().contains(id))
        );
        assert_eq!(execution.phase(), Phase::Finished);
    }

    #[test]
    fn test_snoozed_set_stays_eligible() {
        let mut execution = running(&["a", "b"]);

        execution.snooze();

        assert_eq!(execution.snoozed(), &[SetID::from("a")]);
        assert!(execution.finished().is_empty());
        assert!(execution.skipped().is_empty());
        assert_eq!(execution.current(), Some(&"b".into()));

        complete_current(&mut execution);

        // the snoozed set comes back once no fresh sets remain
        assert_eq!(execution.phase(), Phase::Running);
        assert_eq!(execution.current(), Some(&"a".into()));

        complete_current(&mut execution);

        assert_eq!(execution.phase(), Phase::Finished);
        assert!(execution.snoozed().is_empty());
    }

    #[test]
    fn test_snooze_rejected_for_sole_remaining_set() {
        let mut execution = running(&["a"]);
        assert!(!execution.can_snooze());

        execution.snooze();

        assert!(execution.snoozed().is_empty());
        assert_eq!(execution.current(), Some(&"a".into()));
    }

    #[test]
    fn test_snooze_rejected_once_other_sets_are_committed() {
        let mut execution = running(&["a", "b"]);

        complete_current(&mut execution);
        assert_eq!(execution.current(), Some(&"b".into()));
        assert!(!execution.can_snooze());
    }

    #[test]
    fn test_snoozed_sets_rotate_in_snooze_order() {
        let mut execution = running(&["a", "b", "c"]);

        execution.snooze();
        assert_eq!(execution.current(), Some(&"b".into()));
        execution.snooze();
        assert_eq!(execution.current(), Some(&"c".into()));
        execution.snooze();

        // all sets snoozed, rotation wraps to the first snoozed
        assert_eq!(execution.current(), Some(&"a".into()));
        execution.snooze();
        assert_eq!(execution.current(), Some(&"b".into()));

        // the completed set leaves the rotation, which restarts at the first
        // snoozed set
        complete_current(&mut execution);
        assert_eq!(execution.current(), Some(&"a".into()));
        assert_eq!(execution.snoozed(), &[SetID::from("a"), SetID::from("c")]);
    }

    #[test]
    fn test_next_set_is_deterministic() {
        let mut execution = running(&["a", "b", "c"]);
        execution.snooze();

        let first = execution.clone();
        let second = execution.clone();
        assert_eq!(first.current(), second.current());
        assert_eq!(
            first.next_set_id(first.current.as_ref()),
            second.next_set_id(second.current.as_ref())
        );
    }

    #[test]
    fn test_two_set_walkthrough() {
        let workout = workout(&["a", "b"]);
        let mut execution = Execution::new(&workout);
        execution.start();
        assert_eq!(execution.current(), Some(&"a".into()));
        assert_eq!(
            workout.sets[&SetID::from("a")].rest_interval,
            Some(RestInterval::new(30).unwrap())
        );

        execution.mark_done();
        assert_eq!(execution.phase(), Phase::Resting);
        execution.submit();
        assert_eq!(execution.finished(), &[SetID::from("a")]);
        assert_eq!(execution.current(), Some(&"b".into()));

        execution.mark_done();
        execution.submit();
        assert_eq!(execution.finished(), &[SetID::from("a"), SetID::from("b")]);
        assert!(execution.is_complete());
        assert_eq!(execution.phase(), Phase::Finished);
    }

    #[rstest]
    #[case(&["a"], "a", SetStatus::Fresh)]
    #[case(&["a", "b"], "b", SetStatus::Fresh)]
    fn test_status_fresh(
        #[case] set_ids: &[&str],
        #[case] set_id: &str,
        #[case] expected: SetStatus,
    ) {
        assert_eq!(running(set_ids).status(&set_id.into()), expected);
    }

    #[test]
    fn test_status_after_transitions() {
        let mut execution = running(&["a", "b", "c"]);
        execution.snooze();
        execution.skip();
        complete_current(&mut execution);

        assert_eq!(execution.status(&"a".into()), SetStatus::Snoozed);
        assert_eq!(execution.status(&"b".into()), SetStatus::Skipped);
        assert_eq!(execution.status(&"c".into()), SetStatus::Finished);
    }

    #[test]
    fn test_transitions_in_wrong_phase_are_ignored() {
        let mut execution = Execution::new(&workout(&["a"]));
        execution.mark_done();
        execution.submit();
        execution.skip();
        assert_eq!(execution.phase(), Phase::Staging);

        execution.start();
        execution.submit();
        assert_eq!(execution.phase(), Phase::Running);
        assert!(execution.finished().is_empty());
    }
}
