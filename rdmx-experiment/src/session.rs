use crate::config::TaskConfig;
use crate::schedule::{self, Block, TrialPlan};
use rdmx_core::{
    ABORT_KEY, CONTINUE_KEY, DotField, Feedback, Layout, LayoutError, Outcome, Phase, TaskPhase,
    TrialRecord, TrialState, classify,
};
use rdmx_timing::Timer;
use rand::Rng;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseStarted(TaskPhase),
    TrialStarted(TrialPlan),
    StimulusOnset(TrialPlan),
    ResponseRecorded { plan: TrialPlan, feedback: Feedback },
    TrialComplete { block: Block, record: TrialRecord },
    Aborted,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct TrialTimestamps {
    pub start: u64,
    pub stimulus_onset: Option<u64>,
    pub response: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub plan: TrialPlan,
    pub state: TrialState,
    pub timestamps: TrialTimestamps,
    pub response: Option<String>,
    pub feedback: Option<Feedback>,
    feedback_frames_left: u32,
}

/// One participant's run: instructions, practice block, main block, debrief.
///
/// The owner calls `update` once per rendered frame and `handle_key` for
/// every key press; both return what happened so the caller can persist
/// records or shut down.
pub struct TaskSession<T, R>
where
    T: Timer,
    R: Rng,
{
    phase: TaskPhase,
    timer: T,
    rng: R,
    config: TaskConfig,
    layout: Layout,
    practice: Vec<TrialPlan>,
    main: Vec<TrialPlan>,
    phase_trial_number: usize,
    current: Option<ActiveTrial>,
    dots: DotField,
    records: Vec<TrialRecord>,
    status: RunStatus,
    debrief_start: Option<u64>,
}

impl<T, R> TaskSession<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: TaskConfig, timer: T, mut rng: R) -> Result<Self, LayoutError> {
        let layout = Layout::standard(config.target_radius)?;
        let practice =
            schedule::practice_block(config.practice_trials, &config.coherence_levels, &mut rng);
        let main =
            schedule::main_block(&config.coherence_levels, config.main_repetitions, &mut rng);
        let dots = DotField::new(config.dots.clone(), &mut rng);
        info!(
            practice = practice.len(),
            main = main.len(),
            "session scheduled"
        );

        Ok(Self {
            phase: TaskPhase::default(),
            timer,
            rng,
            config,
            layout,
            practice,
            main,
            phase_trial_number: 0,
            current: None,
            dots,
            records: Vec::new(),
            status: RunStatus::Running,
            debrief_start: None,
        })
    }

    /// Advances timed transitions by one frame.
    pub fn update(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.status != RunStatus::Running {
            return events;
        }

        match self.phase {
            phase if phase.runs_trials() => self.update_trial(&mut events),
            phase if phase.is_debrief() => {
                let start = *self.debrief_start.get_or_insert(self.timer.now());
                if self.timer.elapsed(start).as_millis() as u64 >= self.config.debrief_ms {
                    self.status = RunStatus::Completed;
                    info!(trials = self.records.len(), "session finished");
                    events.push(SessionEvent::Finished);
                }
            }
            _ => {}
        }

        events
    }

    /// Feeds one key identifier into the session.
    pub fn handle_key(&mut self, identifier: &str) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.status != RunStatus::Running {
            return events;
        }

        if identifier == ABORT_KEY {
            info!(phase = ?self.phase, trials = self.records.len(), "run aborted");
            self.status = RunStatus::Aborted;
            self.current = None;
            events.push(SessionEvent::Aborted);
            return events;
        }

        if self.phase.awaits_continue() {
            if identifier == CONTINUE_KEY {
                self.advance_phase(&mut events);
            }
            return events;
        }

        if self.phase.runs_trials() {
            self.record_response(identifier, &mut events);
        }
        events
    }

    fn advance_phase(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(next) = self.phase.next() else {
            return;
        };
        info!(from = ?self.phase, to = ?next, "phase change");
        self.phase = next;
        self.phase_trial_number = 0;
        self.current = None;
        events.push(SessionEvent::PhaseStarted(next));

        if next.runs_trials() {
            if self.block_len() == 0 {
                self.advance_phase(events);
            } else {
                self.start_trial(events);
            }
        } else if next.is_debrief() {
            self.debrief_start = Some(self.timer.now());
        }
    }

    fn block(&self) -> &[TrialPlan] {
        if self.phase.is_practice() {
            &self.practice
        } else if self.phase.is_experiment() {
            &self.main
        } else {
            &[]
        }
    }

    fn block_len(&self) -> usize {
        self.block().len()
    }

    fn start_trial(&mut self, events: &mut Vec<SessionEvent>) {
        let Some(plan) = self.block().get(self.phase_trial_number).copied() else {
            return;
        };
        let now = self.timer.now();
        self.current = Some(ActiveTrial {
            plan,
            state: TrialState::Fixation,
            timestamps: TrialTimestamps {
                start: now,
                stimulus_onset: None,
                response: None,
            },
            response: None,
            feedback: None,
            feedback_frames_left: self.config.feedback_frames,
        });
        debug!(
            block = ?plan.block,
            index = plan.index,
            target = plan.target.degrees(),
            coherence = plan.coherence,
            "trial started"
        );
        events.push(SessionEvent::TrialStarted(plan));
    }

    fn update_trial(&mut self, events: &mut Vec<SessionEvent>) {
        let now = self.timer.now();
        let Some(trial) = self.current.as_mut() else {
            return;
        };

        match trial.state {
            TrialState::Fixation => {
                let waited = now.saturating_sub(trial.timestamps.start);
                if waited >= self.config.fixation_ms * 1_000_000 {
                    trial.state = TrialState::Stimulus;
                    trial.timestamps.stimulus_onset = Some(now);
                    self.dots
                        .set_motion(trial.plan.target, trial.plan.coherence, &mut self.rng);
                    events.push(SessionEvent::StimulusOnset(trial.plan));
                }
            }
            TrialState::Stimulus => {
                self.dots.step(&mut self.rng);
            }
            TrialState::Feedback => {
                self.dots.step(&mut self.rng);
                trial.feedback_frames_left = trial.feedback_frames_left.saturating_sub(1);
                if trial.feedback_frames_left == 0 {
                    trial.state = TrialState::Complete;
                    self.complete_current_trial(events);
                }
            }
            TrialState::Complete => {}
        }
    }

    /// Scores a key pressed during the response window. Keys that no target
    /// owns leave the trial waiting.
    fn record_response(&mut self, identifier: &str, events: &mut Vec<SessionEvent>) {
        let now = self.timer.now();
        let Some(trial) = self.current.as_mut() else {
            return;
        };
        if !trial.state.accepts_response() {
            return;
        }

        match classify(&self.layout, trial.plan.target, identifier) {
            Outcome::Unscored => {
                debug!(identifier, "ignoring unrecognized key");
            }
            Outcome::Scored {
                target,
                chosen,
                correct,
            } => {
                let onset = trial.timestamps.stimulus_onset.unwrap_or(now);
                let rt = now.saturating_sub(onset) as f64 / 1e9;
                let feedback = Feedback {
                    target,
                    chosen,
                    correct,
                    rt,
                };
                trial.timestamps.response = Some(now);
                trial.response = Some(identifier.to_string());
                trial.feedback = Some(feedback.clone());
                trial.state = TrialState::Feedback;
                debug!(identifier, rt, correct, "response recorded");
                events.push(SessionEvent::ResponseRecorded {
                    plan: trial.plan,
                    feedback,
                });
            }
        }
    }

    fn complete_current_trial(&mut self, events: &mut Vec<SessionEvent>) {
        if let Some(trial) = self.current.take() {
            if let (Some(response), Some(feedback)) = (trial.response, trial.feedback) {
                let record = TrialRecord {
                    rt: feedback.rt,
                    response,
                    correct: u8::from(feedback.correct),
                    coherence: trial.plan.coherence,
                    target_angle: trial.plan.target,
                };
                if trial.plan.block == Block::Main {
                    self.records.push(record.clone());
                }
                events.push(SessionEvent::TrialComplete {
                    block: trial.plan.block,
                    record,
                });
            }
        }

        self.phase_trial_number += 1;
        if self.phase_trial_number < self.block_len() {
            self.start_trial(events);
        } else {
            self.advance_phase(events);
        }
    }

    pub fn phase(&self) -> &TaskPhase {
        &self.phase
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == RunStatus::Running
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn current_trial(&self) -> Option<&ActiveTrial> {
        self.current.as_ref()
    }

    pub fn current_trial_state(&self) -> Option<TrialState> {
        self.current.as_ref().map(|t| t.state)
    }

    pub fn dot_field(&self) -> &DotField {
        &self.dots
    }

    /// Main-block records collected so far.
    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn practice_trials(&self) -> &[TrialPlan] {
        &self.practice
    }

    pub fn main_trials(&self) -> &[TrialPlan] {
        &self.main
    }

    /// One-based position in the running block and its length.
    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        if self.phase.runs_trials() {
            Some((self.phase_trial_number + 1, self.block_len()))
        } else {
            None
        }
    }
}
