/// Session phases and how they behave.
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    /// Trials are presented while in this phase.
    fn runs_trials(&self) -> bool;
    /// The phase waits on the continue key before moving on.
    fn awaits_continue(&self) -> bool;
    fn next(&self) -> Option<Self>;

    fn is_practice(&self) -> bool {
        false
    }
    fn is_experiment(&self) -> bool {
        false
    }

    fn is_welcome(&self) -> bool {
        false
    }

    fn is_debrief(&self) -> bool {
        false
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TaskPhase {
    Welcome,
    Practice,
    PracticeDone,
    Experiment,
    Debrief,
}

impl Default for TaskPhase {
    fn default() -> Self {
        TaskPhase::Welcome
    }
}

impl Phase for TaskPhase {
    fn runs_trials(&self) -> bool {
        matches!(self, Self::Practice | Self::Experiment)
    }
    fn awaits_continue(&self) -> bool {
        matches!(self, Self::Welcome | Self::PracticeDone)
    }
    fn next(&self) -> Option<Self> {
        use TaskPhase::*;
        Some(match self {
            Welcome => Practice,
            Practice => PracticeDone,
            PracticeDone => Experiment,
            Experiment => Debrief,
            Debrief => return None,
        })
    }

    fn is_practice(&self) -> bool {
        matches!(self, TaskPhase::Practice)
    }

    fn is_experiment(&self) -> bool {
        matches!(self, TaskPhase::Experiment)
    }

    fn is_welcome(&self) -> bool {
        matches!(self, TaskPhase::Welcome)
    }

    fn is_debrief(&self) -> bool {
        matches!(self, TaskPhase::Debrief)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_run_in_order() {
        let mut phase = TaskPhase::default();
        let mut seen = vec![phase];
        while let Some(next) = phase.next() {
            phase = next;
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                TaskPhase::Welcome,
                TaskPhase::Practice,
                TaskPhase::PracticeDone,
                TaskPhase::Experiment,
                TaskPhase::Debrief,
            ]
        );
    }

    #[test]
    fn only_instruction_screens_wait_for_space() {
        assert!(TaskPhase::Welcome.awaits_continue());
        assert!(TaskPhase::PracticeDone.awaits_continue());
        assert!(!TaskPhase::Practice.awaits_continue());
        assert!(TaskPhase::Experiment.runs_trials());
        assert!(!TaskPhase::Debrief.runs_trials());
    }
}
