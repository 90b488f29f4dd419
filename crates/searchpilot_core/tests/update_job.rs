use std::collections::BTreeMap;
use std::sync::Once;

use pretty_assertions::assert_eq;
use searchpilot_core::{
    update, AppState, Browser, Effect, EntityProgress, JobRunState, Msg, ProgressSnapshot,
    StartParams, START_ACCEPTED_FALLBACK, START_FAILED_FALLBACK,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(pilot_logging::initialize_for_tests);
}

fn run(state: AppState, msgs: Vec<Msg>) -> (AppState, Vec<Effect>) {
    msgs.into_iter()
        .fold((state, Vec::new()), |(state, _), msg| update(state, msg))
}

fn with_queries(raw: &str) -> AppState {
    let (state, _) = update(AppState::new(), Msg::QueriesEdited(raw.to_string()));
    state
}

fn running_state() -> AppState {
    let state = with_queries("apple pie recipe\n");
    let (state, _) = run(
        state,
        vec![
            Msg::StartClicked,
            Msg::StartAccepted {
                message: "Automation started".to_string(),
            },
        ],
    );
    state
}

fn snapshot(is_running: bool) -> ProgressSnapshot {
    ProgressSnapshot {
        progress_percent: if is_running { 40.0 } else { 100.0 },
        is_running,
        status_message: if is_running {
            "Searching".to_string()
        } else {
            "Automation completed".to_string()
        },
        ..ProgressSnapshot::default()
    }
}

fn polled(generation: u64, is_running: bool) -> Msg {
    Msg::StatusPolled {
        generation,
        snapshot: snapshot(is_running),
    }
}

#[test]
fn start_with_empty_query_list_issues_no_command() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), Msg::StartClicked);

    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Idle);
    assert!(state.view().controls.start);
    assert!(state.take_notice().is_some());
}

#[test]
fn start_request_carries_queries_delay_browser_and_default_flag() {
    init_logging();
    let state = with_queries("apple pie recipe\n\n  banana nutrition  \n");
    let (state, effects) = update(state, Msg::StartClicked);

    assert_eq!(
        effects,
        vec![Effect::StartJob(StartParams {
            queries: vec![
                "apple pie recipe".to_string(),
                "banana nutrition".to_string()
            ],
            delay_secs: 3.0,
            browser: Browser::Edge,
            selected_profiles: Vec::new(),
            use_default_if_no_profile: true,
            mobile_enabled: false,
        })]
    );
    let view = state.view();
    assert_eq!(view.job, JobRunState::Starting);
    assert!(!view.controls.start);
    assert!(view.controls.pause && view.controls.resume && view.controls.stop);
}

#[test]
fn start_is_ignored_while_a_run_is_active() {
    init_logging();
    let (_state, effects) = update(running_state(), Msg::StartClicked);
    assert!(effects.is_empty());
}

#[test]
fn accepted_start_runs_and_activates_poller_once() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = update(state, Msg::StartClicked);
    let (state, effects) = update(
        state,
        Msg::StartAccepted {
            message: "Automation started".to_string(),
        },
    );

    assert_eq!(effects, vec![Effect::StartPolling { generation: 1 }]);
    assert_eq!(state.job(), JobRunState::Running);
    assert_eq!(state.view().status_message, "Automation started");

    // A duplicate acceptance must not double-start the poller.
    let (state, effects) = update(
        state,
        Msg::StartAccepted {
            message: "Automation started".to_string(),
        },
    );
    assert!(effects.is_empty());
    assert!(state.poller().is_active());
    assert_eq!(state.poller().generation(), 1);
}

#[test]
fn acceptance_without_message_shows_generic_text() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = run(
        state,
        vec![
            Msg::StartClicked,
            Msg::StartAccepted {
                message: String::new(),
            },
        ],
    );

    assert_eq!(state.job(), JobRunState::Running);
    assert_eq!(state.view().status_message, START_ACCEPTED_FALLBACK);
}

#[test]
fn rejected_start_reverts_to_idle_with_server_message() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = update(state, Msg::StartClicked);
    let (mut state, effects) = update(
        state,
        Msg::StartRejected {
            message: Some("Automation is already running".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.job, JobRunState::Idle);
    assert!(view.controls.start);
    assert!(!view.controls.pause && !view.controls.resume && !view.controls.stop);
    assert!(!state.poller().is_active());
    assert_eq!(
        state.take_notice().map(|notice| notice.text),
        Some("Automation is already running".to_string())
    );
}

#[test]
fn transport_failure_on_start_uses_generic_fallback() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = update(state, Msg::StartClicked);
    let (mut state, _) = update(state, Msg::StartRejected { message: None });

    assert_eq!(state.job(), JobRunState::Idle);
    assert_eq!(
        state.take_notice().map(|notice| notice.text),
        Some(START_FAILED_FALLBACK.to_string())
    );
}

#[test]
fn pause_and_resume_do_not_change_local_state() {
    init_logging();
    let state = running_state();
    let before = state.view();

    let (state, effects) = update(state, Msg::PauseClicked);
    assert_eq!(effects, vec![Effect::PauseJob]);
    assert_eq!(state.view().job, before.job);
    assert_eq!(state.view().controls, before.controls);

    let (state, effects) = update(state, Msg::ResumeClicked);
    assert_eq!(effects, vec![Effect::ResumeJob]);
    assert_eq!(state.job(), JobRunState::Running);
}

#[test]
fn pause_resume_stop_are_noops_while_idle() {
    init_logging();
    for msg in [Msg::PauseClicked, Msg::ResumeClicked, Msg::StopClicked] {
        let state = AppState::new();
        let (next, effects) = update(state.clone(), msg);
        assert_eq!(state, next);
        assert!(effects.is_empty());
    }
}

#[test]
fn stop_is_advisory_until_a_poll_confirms() {
    init_logging();
    let (state, effects) = update(running_state(), Msg::StopClicked);
    assert_eq!(effects, vec![Effect::StopJob]);
    assert_eq!(state.job(), JobRunState::Stopping);
    assert!(!state.view().controls.start);

    // Server still busy winding down.
    let (state, effects) = update(state, polled(1, true));
    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Stopping);

    let (state, effects) = update(state, polled(1, false));
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    assert_eq!(state.job(), JobRunState::Idle);
    assert!(state.view().controls.start);
}

#[test]
fn finished_poll_resets_controls_from_running() {
    init_logging();
    let (state, effects) = update(running_state(), polled(1, false));

    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    let view = state.view();
    assert_eq!(view.job, JobRunState::Idle);
    assert!(view.controls.start);
    assert!(!view.controls.pause && !view.controls.resume && !view.controls.stop);
    assert!(!state.poller().is_active());
}

#[test]
fn finished_poll_resets_controls_from_starting() {
    init_logging();
    // The attach poll from opening the console is still active when Start is
    // clicked, so its answer can land while the start is in flight.
    let state = with_queries("apple pie recipe\n");
    let (state, _) = run(state, vec![Msg::Opened, Msg::StartClicked]);
    assert_eq!(state.job(), JobRunState::Starting);

    let (state, effects) = update(state, polled(1, false));
    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    let view = state.view();
    assert_eq!(view.job, JobRunState::Idle);
    assert!(view.controls.start);
    assert!(!view.controls.pause && !view.controls.resume && !view.controls.stop);
}

#[test]
fn late_acceptance_after_poll_reset_still_reaches_running() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = run(
        state,
        vec![Msg::Opened, Msg::StartClicked, polled(1, false)],
    );
    let (state, effects) = update(
        state,
        Msg::StartAccepted {
            message: "Automation started".to_string(),
        },
    );

    assert_eq!(state.job(), JobRunState::Running);
    assert_eq!(effects, vec![Effect::StartPolling { generation: 2 }]);
}

#[test]
fn acceptance_retires_the_attach_poller() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = run(state, vec![Msg::Opened, Msg::StartClicked]);
    let (state, effects) = update(
        state,
        Msg::StartAccepted {
            message: "Automation started".to_string(),
        },
    );

    assert_eq!(
        effects,
        vec![
            Effect::StopPolling { generation: 1 },
            Effect::StartPolling { generation: 2 },
        ]
    );

    // The attach poll was answered before the run existed.
    let (state, effects) = update(state, polled(1, false));
    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Running);
    assert!(state.poller().is_active());
    assert!(state.view().controls.stop);

    let (state, _) = update(state, polled(2, true));
    assert_eq!(state.job(), JobRunState::Running);
}

#[test]
fn stop_before_acceptance_leaves_the_run_to_the_server() {
    init_logging();
    let state = with_queries("apple pie recipe\n");
    let (state, _) = update(state, Msg::StartClicked);
    let (state, effects) = update(state, Msg::StopClicked);

    assert_eq!(effects, vec![Effect::StopJob]);
    assert_eq!(state.job(), JobRunState::Starting);

    let (state, _) = update(
        state,
        Msg::StartAccepted {
            message: "Automation started".to_string(),
        },
    );
    let (state, _) = run(state, vec![polled(1, true), polled(1, true)]);
    assert_eq!(state.job(), JobRunState::Running);
    assert!(state.view().controls.stop);

    // A second stop, now that the server owns the run, is tracked as usual.
    let (state, effects) = update(state, Msg::StopClicked);
    assert_eq!(effects, vec![Effect::StopJob]);
    assert_eq!(state.job(), JobRunState::Stopping);
}

#[test]
fn opening_attaches_to_a_run_the_server_already_owns() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::Opened);
    assert_eq!(
        effects,
        vec![
            Effect::CheckHealth,
            Effect::LoadQueries,
            Effect::StartPolling { generation: 1 }
        ]
    );

    let (state, effects) = update(state, polled(1, true));
    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Running);
    assert!(!state.view().controls.start);
}

#[test]
fn opening_while_server_idle_stops_the_attach_poller() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::Opened);
    let (state, effects) = update(state, polled(1, false));

    assert_eq!(effects, vec![Effect::StopPolling { generation: 1 }]);
    assert_eq!(state.job(), JobRunState::Idle);
}

#[test]
fn polls_from_a_stopped_generation_are_discarded() {
    init_logging();
    // First run finishes, second run starts with generation 2.
    let (state, _) = update(running_state(), polled(1, false));
    let (state, _) = run(
        state,
        vec![
            Msg::StartClicked,
            Msg::StartAccepted {
                message: "Automation started".to_string(),
            },
        ],
    );
    assert_eq!(state.poller().generation(), 2);

    // A slow response from the first run's poller must not end the second.
    let (state, effects) = update(state.clone(), polled(1, false));
    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Running);
}

#[test]
fn polls_after_deactivation_do_not_reanimate_the_board() {
    init_logging();
    let (mut state, _) = update(running_state(), polled(1, false));
    state.consume_dirty();

    let mut late = snapshot(true);
    late.desktop.insert(
        "Default".to_string(),
        EntityProgress { done: 1, total: 10 },
    );
    let (mut state, effects) = update(
        state,
        Msg::StatusPolled {
            generation: 1,
            snapshot: late,
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.job(), JobRunState::Idle);
    assert!(state.view().board.is_empty());
    assert!(!state.consume_dirty());
}

#[test]
fn each_poll_replaces_the_board_wholesale() {
    init_logging();
    let mut first = snapshot(true);
    first.desktop = BTreeMap::from([
        ("Default".to_string(), EntityProgress { done: 2, total: 10 }),
        ("Work".to_string(), EntityProgress { done: 1, total: 32 }),
    ]);
    first.mobile = BTreeMap::from([(
        "Work".to_string(),
        EntityProgress { done: 0, total: 20 },
    )]);
    let mut second = snapshot(true);
    second.desktop = BTreeMap::from([(
        "Default".to_string(),
        EntityProgress { done: 3, total: 10 },
    )]);

    let (state, _) = run(
        running_state(),
        vec![
            Msg::StatusPolled {
                generation: 1,
                snapshot: first,
            },
            Msg::StatusPolled {
                generation: 1,
                snapshot: second,
            },
        ],
    );

    let board = state.view().board;
    assert_eq!(board.sections.len(), 1);
    let labels: Vec<_> = board.sections[0]
        .rows
        .iter()
        .map(|row| row.label.as_str())
        .collect();
    assert_eq!(labels, vec!["Default: 3/10"]);
}

#[test]
fn identical_polls_do_not_mark_state_dirty() {
    init_logging();
    let (mut state, _) = update(running_state(), polled(1, true));
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, polled(1, true));
    assert!(!state.consume_dirty());
}
