use std::collections::BTreeMap;

use pretty_assertions::assert_eq;
use searchpilot_core::{
    update, AppState, Browser, CatalogStatus, Effect, Level, Msg, Profile, Severity,
    LOOKING_FOR_PROFILES,
};

fn init_logging() {
    pilot_logging::initialize_for_tests();
}

fn profile(name: &str) -> Profile {
    Profile {
        name: name.to_string(),
        directory: Some(name.to_string()),
        path: Some(format!("/profiles/{name}")),
    }
}

fn catalog_msg(browser: Browser, request: u64, names: &[&str], levels: &[(&str, Level)]) -> Msg {
    Msg::CatalogFetched {
        browser,
        request,
        profiles: names.iter().map(|name| profile(name)).collect(),
        levels: levels
            .iter()
            .map(|(name, level)| (name.to_string(), *level))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Opens the picker and returns the id the catalog fetch was issued with.
fn open_picker(state: AppState) -> (AppState, u64) {
    let (state, effects) = update(state, Msg::ProfilePickerOpened);
    match &effects[..] {
        [Effect::FetchCatalog { request, .. }] => (state, *request),
        other => panic!("unexpected effects {other:?}"),
    }
}

/// Edge catalog with Default (L1), Work (L2) and Travel (unknown to the level map).
fn loaded_state() -> AppState {
    let (state, request) = open_picker(AppState::new());
    let (state, _) = update(
        state,
        catalog_msg(
            Browser::Edge,
            request,
            &["Default", "Work", "Travel"],
            &[("Default", Level::One), ("Work", Level::Two)],
        ),
    );
    state
}

#[test]
fn opening_picker_fetches_catalog_for_current_browser() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::BrowserSelected(Browser::Chrome));
    assert_eq!(effects.len(), 1);
    assert!(matches!(effects[0], Effect::PersistPreferences(_)));

    let (state, effects) = update(state, Msg::ProfilePickerOpened);
    assert_eq!(
        effects,
        vec![Effect::FetchCatalog {
            browser: Browser::Chrome,
            request: 2,
        }]
    );
    assert_eq!(state.view().catalog_status, CatalogStatus::Loading);
    assert_eq!(state.view().catalog_text, LOOKING_FOR_PROFILES);
}

#[test]
fn catalog_commit_exposes_profiles_with_levels() {
    init_logging();
    let view = loaded_state().view();

    assert_eq!(view.catalog_status, CatalogStatus::Ready);
    let rows: Vec<_> = view
        .profiles
        .iter()
        .map(|row| (row.name.as_str(), row.level))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Default", Level::One),
            ("Work", Level::Two),
            ("Travel", Level::One)
        ]
    );
}

#[test]
fn switching_browser_empties_selection_and_marks_catalog_stale() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::SelectAllClicked);
    let (state, _) = update(state, Msg::SelectionApplied);
    assert_eq!(state.selection().len(), 3);

    for browser in [Browser::Chrome, Browser::Edge] {
        let (next, _) = update(state.clone(), Msg::BrowserSelected(browser));
        let view = next.view();
        assert!(view.selected.is_empty());
        assert!(view.applied.is_empty());
        assert!(view.profiles.is_empty());
        assert_eq!(view.catalog_status, CatalogStatus::Stale);
        assert_eq!(view.catalog_text, LOOKING_FOR_PROFILES);
    }
}

#[test]
fn double_toggle_restores_membership() {
    init_logging();
    let state = loaded_state();
    let original = state.selection().clone();

    let (state, _) = update(state, Msg::ProfileToggled("Work".to_string()));
    assert!(state.selection().contains("Work"));
    assert_eq!(
        state.selection().entries()[0].path.as_deref(),
        Some("/profiles/Work")
    );

    let (state, _) = update(state, Msg::ProfileToggled("Work".to_string()));
    assert_eq!(state.selection(), &original);
}

#[test]
fn toggling_unknown_profile_is_ignored() {
    init_logging();
    let state = loaded_state();
    let (next, effects) = update(state.clone(), Msg::ProfileToggled("Ghost".to_string()));
    assert_eq!(next.selection(), state.selection());
    assert!(effects.is_empty());
}

#[test]
fn select_all_and_clear_all_replace_selection() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::ProfileToggled("Travel".to_string()));
    let (state, _) = update(state, Msg::SelectAllClicked);
    assert_eq!(
        state.view().selected,
        vec!["Default".to_string(), "Work".to_string(), "Travel".to_string()]
    );

    let (state, _) = update(state, Msg::ClearAllClicked);
    assert!(state.selection().is_empty());
}

#[test]
fn catalog_for_previous_browser_is_discarded() {
    init_logging();
    let (state, request) = open_picker(AppState::new());
    let (state, _) = update(state, Msg::BrowserSelected(Browser::Chrome));
    let (state, _) = update(
        state,
        catalog_msg(Browser::Edge, request, &["Default"], &[("Default", Level::Two)]),
    );

    let view = state.view();
    assert!(view.profiles.is_empty());
    assert_eq!(view.catalog_status, CatalogStatus::Stale);
    assert_eq!(state.levels().level("Default"), Level::One);
}

#[test]
fn fetch_from_before_a_browser_round_trip_is_discarded() {
    init_logging();
    let (state, first) = open_picker(AppState::new());
    let (state, _) = update(state, Msg::BrowserSelected(Browser::Chrome));
    let (state, _) = update(state, Msg::BrowserSelected(Browser::Edge));
    let (state, latest) = open_picker(state);
    assert_ne!(first, latest);

    let (mut state, _) = update(
        state,
        Msg::CatalogFetchFailed {
            browser: Browser::Edge,
            request: first,
            message: "connection reset".to_string(),
        },
    );
    assert!(state.take_notice().is_none());
    let (state, _) = update(
        state,
        catalog_msg(Browser::Edge, first, &["Old"], &[("Old", Level::Two)]),
    );
    assert_eq!(state.view().catalog_status, CatalogStatus::Loading);
    assert!(state.view().profiles.is_empty());

    let (state, _) = update(
        state,
        catalog_msg(Browser::Edge, latest, &["Default"], &[("Default", Level::One)]),
    );
    let view = state.view();
    assert_eq!(view.catalog_status, CatalogStatus::Ready);
    let names: Vec<_> = view.profiles.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Default"]);
    assert_eq!(state.levels().level("Old"), Level::One);
}

#[test]
fn partial_catalog_failure_keeps_prior_cache() {
    init_logging();
    let before = loaded_state();
    let (state, request) = open_picker(before.clone());
    let (mut state, effects) = update(
        state,
        Msg::CatalogFetchFailed {
            browser: Browser::Edge,
            request,
            message: "levels: network error".to_string(),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().profiles, before.view().profiles);
    assert_eq!(state.view().catalog_status, CatalogStatus::Ready);
    let notice = state.take_notice().expect("error notice");
    assert_eq!(notice.severity, Severity::Error);
    assert!(state.take_notice().is_none());
}

#[test]
fn catalog_refresh_does_not_touch_applied_selection() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::ProfileToggled("Work".to_string()));
    let (state, _) = update(state, Msg::SelectionApplied);
    let (state, request) = open_picker(state);
    let (state, _) = update(
        state,
        catalog_msg(Browser::Edge, request, &["Default"], &[("Default", Level::One)]),
    );

    assert_eq!(state.view().applied, vec!["Work".to_string()]);

    let (state, _) = update(state, Msg::QueriesEdited("q".to_string()));
    let (_, effects) = update(state, Msg::StartClicked);
    match &effects[..] {
        [Effect::StartJob(params)] => {
            assert_eq!(params.selected_profiles, vec![profile("Work")]);
            assert!(!params.use_default_if_no_profile);
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn start_uses_only_the_applied_selection() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::ProfileToggled("Default".to_string()));
    let (state, _) = update(state, Msg::QueriesEdited("q".to_string()));
    let (_, effects) = update(state, Msg::StartClicked);

    match &effects[..] {
        [Effect::StartJob(params)] => {
            assert!(params.selected_profiles.is_empty());
            assert!(params.use_default_if_no_profile);
        }
        other => panic!("unexpected effects {other:?}"),
    }
}

#[test]
fn level_toggle_requests_opposite_level() {
    init_logging();
    let (state, effects) = update(loaded_state(), Msg::LevelToggled("Default".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SetLevel {
            profile: "Default".to_string(),
            level: Level::Two,
            seq: 1,
        }]
    );
    // Badge keeps the confirmed value while the request is in flight.
    let row = state.view().profiles[0].clone();
    assert_eq!(row.level, Level::One);
    assert_eq!(row.pending_level, Some(Level::Two));

    let (_, effects) = update(state, Msg::LevelToggled("Work".to_string()));
    assert_eq!(
        effects,
        vec![Effect::SetLevel {
            profile: "Work".to_string(),
            level: Level::One,
            seq: 2,
        }]
    );
}

#[test]
fn confirmed_level_moves_the_cache() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::LevelToggled("Default".to_string()));
    let (state, _) = update(
        state,
        Msg::LevelSetConfirmed {
            profile: "Default".to_string(),
            level: Level::Two,
            seq: 1,
        },
    );

    assert_eq!(state.levels().level("Default"), Level::Two);
    assert_eq!(state.levels().pending("Default"), None);
}

#[test]
fn failed_level_change_leaves_cache_and_badge() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::LevelToggled("Default".to_string()));
    let (mut state, _) = update(
        state,
        Msg::LevelSetFailed {
            profile: "Default".to_string(),
            seq: 1,
            message: "http status 500".to_string(),
        },
    );

    assert_eq!(state.levels().level("Default"), Level::One);
    let row = state.view().profiles[0].clone();
    assert_eq!(row.level, Level::One);
    assert_eq!(row.pending_level, None);
    assert_eq!(
        state.take_notice().map(|notice| notice.severity),
        Some(Severity::Error)
    );
}

/// Ordering policy: level requests are sequenced per profile, so an older
/// confirmation that arrives after a newer one is ignored instead of winning.
#[test]
fn stale_level_confirmation_does_not_overwrite_newer_one() {
    init_logging();
    let state = loaded_state();
    let (state, _) = update(
        state,
        Msg::LevelSetRequested {
            profile: "Default".to_string(),
            level: Level::Two,
        },
    );
    let (state, _) = update(
        state,
        Msg::LevelSetRequested {
            profile: "Default".to_string(),
            level: Level::One,
        },
    );

    // Request 2 resolves first, request 1 straggles in afterwards.
    let (state, _) = update(
        state,
        Msg::LevelSetConfirmed {
            profile: "Default".to_string(),
            level: Level::One,
            seq: 2,
        },
    );
    let (state, _) = update(
        state,
        Msg::LevelSetConfirmed {
            profile: "Default".to_string(),
            level: Level::Two,
            seq: 1,
        },
    );

    assert_eq!(state.levels().level("Default"), Level::One);
    assert_eq!(state.levels().pending("Default"), None);
}

#[test]
fn older_response_resolving_first_keeps_newer_pending_marker() {
    init_logging();
    let (state, _) = update(loaded_state(), Msg::LevelToggled("Default".to_string()));
    let (state, _) = update(
        state,
        Msg::LevelSetRequested {
            profile: "Default".to_string(),
            level: Level::One,
        },
    );
    let (state, _) = update(
        state,
        Msg::LevelSetConfirmed {
            profile: "Default".to_string(),
            level: Level::Two,
            seq: 1,
        },
    );

    assert_eq!(state.levels().level("Default"), Level::Two);
    assert_eq!(state.levels().pending("Default"), Some(Level::One));
}
