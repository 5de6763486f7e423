/// Per-instance display state for an image element
///
/// One `DisplayState` lives exactly as long as one mounted image. It starts
/// in `Loading`, moves to `Loaded` or `Failed` on the first terminal event
/// and never moves again. A failure commits the source to the fallback
/// asset at most once.
use std::sync::atomic::{AtomicU64, Ordering};

use super::source::ImageSource;

/// Identity of one mounted image element.
///
/// Load results carry the id of the instance that requested them, so a
/// result arriving after a re-mount is recognized as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(u64);

impl InstanceId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        InstanceId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Loading,
    Loaded,
    Failed,
}

impl LoadPhase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, LoadPhase::Loading)
    }
}

/// Lifecycle events reported by the image loader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEvent {
    Loaded,
    Failed,
}

/// What applying an event did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Already terminal, nothing changed
    Ignored,
    /// Reached a terminal phase, source untouched
    Settled,
    /// Failed and the source was swapped to the fallback
    FellBack,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    current: ImageSource,
    phase: LoadPhase,
    is_error: bool,
}

impl DisplayState {
    pub fn new(initial: ImageSource) -> Self {
        Self {
            current: initial,
            phase: LoadPhase::Loading,
            is_error: false,
        }
    }

    pub fn current(&self) -> &ImageSource {
        &self.current
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }

    pub fn is_error(&self) -> bool {
        self.is_error
    }

    /// The image is hidden only while loading; a fallback shown after a
    /// failure is visible.
    pub fn is_visible(&self) -> bool {
        !self.is_loading()
    }

    pub fn apply(&mut self, event: LoadEvent) -> Transition {
        if self.phase.is_terminal() {
            return Transition::Ignored;
        }

        match event {
            LoadEvent::Loaded => {
                self.phase = LoadPhase::Loaded;
                Transition::Settled
            }
            LoadEvent::Failed => {
                self.phase = LoadPhase::Failed;
                self.is_error = true;
                if self.current.commit_fallback() {
                    Transition::FellBack
                } else {
                    Transition::Settled
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn primary() -> ImageSource {
        ImageSource::Primary("https://cdn/x/small.png".into())
    }

    #[test]
    fn test_new_state_is_loading() {
        let state = DisplayState::new(primary());
        assert!(state.is_loading());
        assert!(!state.is_error());
        assert!(!state.is_visible());
        assert_eq!(state.current(), &primary());
    }

    #[test]
    fn test_load_success() {
        let mut state = DisplayState::new(primary());
        assert_eq!(state.apply(LoadEvent::Loaded), Transition::Settled);
        assert_eq!(state.phase(), LoadPhase::Loaded);
        assert!(!state.is_error());
        assert!(state.is_visible());
        assert_eq!(state.current(), &primary());
    }

    #[test]
    fn test_load_failure_falls_back() {
        let mut state = DisplayState::new(primary());
        assert_eq!(state.apply(LoadEvent::Failed), Transition::FellBack);
        assert_eq!(state.phase(), LoadPhase::Failed);
        assert!(state.is_error());
        assert!(state.is_visible());
        assert!(state.current().is_fallback());
    }

    #[test]
    fn test_failure_on_fallback_does_not_swap() {
        let mut state = DisplayState::new(ImageSource::Fallback);
        assert_eq!(state.apply(LoadEvent::Failed), Transition::Settled);
        assert!(state.current().is_fallback());
        assert_eq!(state.apply(LoadEvent::Failed), Transition::Ignored);
        assert!(state.is_error());
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        let mut state = DisplayState::new(primary());
        state.apply(LoadEvent::Loaded);
        assert_eq!(state.apply(LoadEvent::Failed), Transition::Ignored);
        assert_eq!(state.phase(), LoadPhase::Loaded);
        assert!(!state.is_error());
        assert_eq!(state.current(), &primary());
    }

    #[test]
    fn test_instance_ids_are_unique() {
        let a = InstanceId::next();
        let b = InstanceId::next();
        assert_ne!(a, b);
    }

    fn event() -> impl Strategy<Value = LoadEvent> {
        prop_oneof![Just(LoadEvent::Loaded), Just(LoadEvent::Failed)]
    }

    proptest! {
        #[test]
        fn prop_fallback_commit_is_monotonic(events in proptest::collection::vec(event(), 1..20)) {
            let mut state = DisplayState::new(primary());
            let mut swaps = 0;
            let mut seen_fallback = false;
            for event in events {
                if state.apply(event) == Transition::FellBack {
                    swaps += 1;
                }
                if seen_fallback {
                    prop_assert!(state.current().is_fallback());
                }
                seen_fallback |= state.current().is_fallback();
            }
            prop_assert!(swaps <= 1);
        }

        #[test]
        fn prop_loading_ends_once(events in proptest::collection::vec(event(), 1..20)) {
            let mut state = DisplayState::new(primary());
            let first = events[0];
            let mut settled = 0;
            for event in &events {
                if state.apply(*event) != Transition::Ignored {
                    settled += 1;
                }
                prop_assert!(!state.is_loading());
            }
            prop_assert_eq!(settled, 1);
            prop_assert_eq!(state.is_error(), first == LoadEvent::Failed);
        }
    }
}
