//! Title-refresh debouncing. Rapid successive keystrokes collapse into one
//! request; cosmetic edits wait longer than content edits so re-renders do
//! not distract while typing. Clocks are injected so the policy stays pure.

/// Delay after a content edit (the row's data changed).
pub const CONTENT_DEBOUNCE_MS: u64 = 300;

/// Delay after a cosmetic edit (label, toggle). Intentionally longer.
pub const COSMETIC_DEBOUNCE_MS: u64 = 1_000;

///
/// RefreshKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RefreshKind {
    Content,
    Cosmetic,
}

impl RefreshKind {
    #[must_use]
    pub const fn delay_ms(self) -> u64 {
        match self {
            Self::Content => CONTENT_DEBOUNCE_MS,
            Self::Cosmetic => COSMETIC_DEBOUNCE_MS,
        }
    }
}

///
/// Debounce
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Debounce {
    deadline_ms: Option<u64>,
}

impl Debounce {
    #[must_use]
    pub const fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Schedule (or reschedule) the pending refresh. A new edit replaces
    /// any earlier deadline.
    pub const fn schedule(&mut self, now_ms: u64, kind: RefreshKind) {
        self.deadline_ms = Some(now_ms + kind.delay_ms());
    }

    /// True once the pending deadline has passed; firing clears it.
    pub const fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }
}

///
/// TESTS
///
