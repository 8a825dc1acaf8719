use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rdmx_core::{Angle, Phase, TaskPhase, TrialState};
use rdmx_experiment::{Block, DataFile, RunStatus, SessionEvent, TaskConfig, TaskSession};
use rdmx_timing::ManualTimer;

type Session = TaskSession<ManualTimer, StdRng>;

fn config() -> TaskConfig {
    TaskConfig {
        practice_trials: 1,
        main_repetitions: 1,
        coherence_levels: vec![0.1],
        feedback_frames: 3,
        ..TaskConfig::default()
    }
}

fn session(seed: u64) -> (Session, ManualTimer) {
    let timer = ManualTimer::new();
    let session = TaskSession::new(config(), timer.clone(), StdRng::seed_from_u64(seed))
        .expect("layout is valid");
    (session, timer)
}

fn key_for(session: &Session, angle: Angle) -> String {
    session.layout().target(angle).keys[0].clone()
}

fn current_target(session: &Session) -> Angle {
    session.current_trial().expect("trial running").plan.target
}

/// Runs the current trial to completion, answering with `answer(target)`.
fn run_trial(
    session: &mut Session,
    timer: &ManualTimer,
    rt_ms: u64,
    answer: impl Fn(Angle) -> Angle,
) -> Vec<SessionEvent> {
    timer.advance_ms(500);
    let onset = session.update();
    assert!(matches!(onset.as_slice(), [SessionEvent::StimulusOnset(_)]));

    timer.advance_ms(rt_ms);
    let key = key_for(session, answer(current_target(session)));
    let response = session.handle_key(&key);
    assert_eq!(response.len(), 1);

    let mut events = Vec::new();
    for _ in 0..3 {
        events.extend(session.update());
    }
    events
}

#[test]
fn full_session_records_only_main_trials() {
    let (mut session, timer) = session(42);
    assert!(session.phase().is_welcome());

    // response keys do nothing on the welcome screen
    assert!(session.handle_key("d").is_empty());
    let started = session.handle_key("space");
    assert_eq!(started[0], SessionEvent::PhaseStarted(TaskPhase::Practice));
    assert!(matches!(started[1], SessionEvent::TrialStarted(_)));
    assert_eq!(session.trial_progress(), Some((1, 1)));

    let events = run_trial(&mut session, &timer, 400, |t| t);
    assert!(matches!(
        events[0],
        SessionEvent::TrialComplete {
            block: Block::Practice,
            ..
        }
    ));
    assert_eq!(events[1], SessionEvent::PhaseStarted(TaskPhase::PracticeDone));
    assert!(session.records().is_empty());

    session.handle_key("space");
    assert!(session.phase().is_experiment());
    assert_eq!(session.main_trials().len(), 6);

    for i in 0..6 {
        assert_eq!(session.trial_progress(), Some((i + 1, 6)));
        run_trial(&mut session, &timer, 300, |t| t);
    }
    assert_eq!(*session.phase(), TaskPhase::Debrief);
    assert_eq!(session.records().len(), 6);
    assert!(session.records().iter().all(|r| r.correct == 1));

    // every target appears once with a single coherence level
    let mut angles: Vec<u16> = session
        .records()
        .iter()
        .map(|r| r.target_angle.degrees())
        .collect();
    angles.sort();
    assert_eq!(angles, vec![0, 60, 120, 180, 240, 300]);

    assert!(session.update().is_empty());
    timer.advance_ms(2000);
    assert_eq!(session.update(), vec![SessionEvent::Finished]);
    assert_eq!(session.status(), RunStatus::Completed);
}

#[test]
fn latency_runs_from_stimulus_onset() {
    let (mut session, timer) = session(7);
    session.handle_key("space");

    timer.advance_ms(500);
    session.update();
    timer.advance_ms(750);
    let target = current_target(&session);
    let events = session.handle_key(&key_for(&session, target));
    match &events[0] {
        SessionEvent::ResponseRecorded { feedback, .. } => {
            assert_abs_diff_eq!(feedback.rt, 0.75, epsilon = 1e-9);
            assert!(feedback.correct);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn unrecognized_keys_keep_the_trial_waiting() {
    let (mut session, timer) = session(3);
    session.handle_key("space");
    timer.advance_ms(500);
    session.update();
    assert_eq!(session.current_trial_state(), Some(TrialState::Stimulus));

    for key in ["k", "space", "left", "num_5"] {
        assert!(session.handle_key(key).is_empty());
    }
    assert_eq!(session.current_trial_state(), Some(TrialState::Stimulus));

    timer.advance_ms(200);
    let target = current_target(&session);
    let wrong = Angle::new(((target.degrees() + 180) % 360) as i64).unwrap();
    let events = session.handle_key(&key_for(&session, wrong));
    match &events[0] {
        SessionEvent::ResponseRecorded { feedback, .. } => {
            assert!(!feedback.correct);
            assert_eq!(feedback.chosen, wrong);
            // latency counts the time spent on ignored keys too
            assert_abs_diff_eq!(feedback.rt, 0.2, epsilon = 1e-9);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn keys_during_fixation_are_not_scored() {
    let (mut session, _timer) = session(5);
    session.handle_key("space");
    assert_eq!(session.current_trial_state(), Some(TrialState::Fixation));
    let target = current_target(&session);
    assert!(session.handle_key(&key_for(&session, target)).is_empty());
    assert_eq!(session.current_trial_state(), Some(TrialState::Fixation));
}

#[test]
fn abort_ends_the_run_and_keeps_finished_trials() {
    let (mut session, timer) = session(11);
    session.handle_key("space");
    run_trial(&mut session, &timer, 300, |t| t);
    session.handle_key("space");
    run_trial(&mut session, &timer, 300, |t| t);
    assert_eq!(session.records().len(), 1);

    timer.advance_ms(500);
    session.update();
    assert_eq!(session.handle_key("escape"), vec![SessionEvent::Aborted]);
    assert_eq!(session.status(), RunStatus::Aborted);
    assert!(session.current_trial().is_none());

    // terminal: nothing moves any more
    timer.advance_ms(10_000);
    assert!(session.update().is_empty());
    assert!(session.handle_key("space").is_empty());
    assert_eq!(session.records().len(), 1);
}

#[test]
fn abort_from_the_welcome_screen() {
    let (mut session, _timer) = session(1);
    assert_eq!(session.handle_key("escape"), vec![SessionEvent::Aborted]);
    assert!(!session.is_running());
}

#[test]
fn main_records_go_to_the_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut file = DataFile::create(dir.path(), "001", "6Choice_DDM").unwrap();
    let (mut session, timer) = session(21);

    session.handle_key("space");
    run_trial(&mut session, &timer, 300, |t| t);
    session.handle_key("space");
    while session.phase().is_experiment() {
        // answer with the neighbour at +60
        let events = run_trial(&mut session, &timer, 600, |t| {
            Angle::new(((t.degrees() + 60) % 360) as i64).unwrap()
        });
        for event in events {
            if let SessionEvent::TrialComplete {
                block: Block::Main,
                record,
            } = event
            {
                file.append(&record).unwrap();
            }
        }
    }

    assert_eq!(file.rows(), 6);
    let text = std::fs::read_to_string(file.path()).unwrap();
    assert_eq!(text.lines().count(), 7);
    assert!(text.lines().skip(1).all(|l| l.contains(",0,0.1,")));
}
