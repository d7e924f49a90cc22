use serde::Serialize;
use std::cell::RefCell;

thread_local! {
    static STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

///
/// OpCounters
///

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct OpCounters {
    pub load_calls: u64,
    pub save_calls: u64,
    pub delete_calls: u64,

    pub rows_loaded: u64,
    pub rows_saved: u64,
    pub rows_deleted: u64,

    /// Stored keys removed because their row shrank away or changed layout.
    pub orphan_keys_removed: u64,

    /// Clone selectors that no longer resolve, dropped during resolution.
    pub dangling_selectors: u64,

    /// Stored rows skipped because their layout tag no longer resolves.
    pub layouts_skipped: u64,

    /// Page fetches discarded because a newer navigation superseded them.
    pub fetches_superseded: u64,
}

///
/// EventState
///

#[derive(Debug, Default)]
pub(crate) struct EventState {
    pub counters: OpCounters,
}

pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    STATE.with(|state| f(&state.borrow()))
}

pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

///
/// EventReport
///

#[derive(Clone, Debug, Serialize)]
pub struct EventReport {
    pub counters: OpCounters,
}

pub(crate) fn report() -> EventReport {
    with_state(|state| EventReport {
        counters: state.counters.clone(),
    })
}

pub(crate) fn reset_all() {
    with_state_mut(|state| *state = EventState::default());
}
