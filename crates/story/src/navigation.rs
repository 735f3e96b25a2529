//! Step navigation, explore mode and keyboard handling.
//!
//! Every transition goes through `transition`, which re-applies the current
//! step only when the index or explore flag actually changed and explore
//! mode is off.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::StoryEngine;
use crate::step::Mode;
use crate::surface::MapSurface;

/// Keys the story reacts to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    ArrowRight,
    ArrowLeft,
    Escape,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "ArrowRight" => Key::ArrowRight,
            "ArrowLeft" => Key::ArrowLeft,
            "Escape" | "Esc" => Key::Escape,
            _ => Key::Other,
        }
    }
}

/// Phase shown by the pre/post toggle. Always derived from the current
/// step's mode, never stored on its own.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Pre,
    Post,
}

impl From<Mode> for Phase {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Pre => Phase::Pre,
            Mode::Post => Phase::Post,
        }
    }
}

impl From<Phase> for Mode {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Pre => Mode::Pre,
            Phase::Post => Mode::Post,
        }
    }
}

impl<M: MapSurface> StoryEngine<M> {
    pub fn can_go_prev(&self) -> bool {
        self.state.step_index > 0
    }

    pub fn can_go_next(&self) -> bool {
        self.state.step_index < self.steps.last_index()
    }

    pub fn go_next(&mut self) {
        let next = self.state.step_index.saturating_add(1);
        self.transition(next, false);
    }

    pub fn go_prev(&mut self) {
        let prev = self.state.step_index.saturating_sub(1);
        self.transition(prev, false);
    }

    /// Direct jump, e.g. from the step dots. Leaves explore mode.
    pub fn go_to_step(&mut self, index: usize) {
        self.transition(index, false);
    }

    /// Moves the index without touching explore mode. While exploring the
    /// surface is left alone until explore mode ends.
    pub fn set_step_index(&mut self, index: usize) {
        let explore = self.state.explore_mode;
        self.transition(index, explore);
    }

    pub fn toggle_explore(&mut self) {
        let explore = !self.state.explore_mode;
        self.transition(self.state.step_index, explore);
    }

    pub fn phase(&self) -> Phase {
        self.mode().into()
    }

    /// Jumps to the first step authored for `phase`, leaving explore mode.
    /// Does nothing when the current step already shows that phase or no
    /// step has it.
    pub fn select_phase(&mut self, phase: Phase) {
        if self.phase() == phase {
            return;
        }
        if let Some(index) = self.steps.first_with_mode(phase.into()) {
            self.go_to_step(index);
        }
    }

    /// Handles a key press; returns whether the key was used.
    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::ArrowRight => self.go_next(),
            Key::ArrowLeft => self.go_prev(),
            Key::Escape => {
                self.state.toast = None;
                self.state.inspect = None;
            }
            Key::Other => return false,
        }
        true
    }

    pub fn dismiss_toast(&mut self) {
        self.state.toast = None;
    }

    pub fn close_inspect(&mut self) {
        self.state.inspect = None;
    }

    fn transition(&mut self, index: usize, explore: bool) {
        let index = self.steps.clamp(index);
        let changed = index != self.state.step_index || explore != self.state.explore_mode;
        self.state.step_index = index;
        self.state.explore_mode = explore;
        if !changed {
            return;
        }
        debug!(index, explore, "story transition");
        if self.state.ready && !self.state.explore_mode {
            self.apply_step(index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::surface::RecordingSurface;
    use crate::table::StepTable;
    use pretty_assertions::assert_eq;

    fn loaded() -> StoryEngine<RecordingSurface> {
        let mut e = StoryEngine::new(
            RecordingSurface::new(),
            StepTable::khartoum(),
            StoryConfig::default().source,
        );
        e.on_load();
        e.surface_mut().drain();
        e
    }

    fn step_effects(e: &StoryEngine<RecordingSurface>) -> usize {
        e.surface()
            .commands()
            .iter()
            .filter(|c| c.is_step_effect())
            .count()
    }

    #[test]
    fn prev_at_start_stays_at_zero() {
        let mut e = loaded();
        e.go_prev();
        assert_eq!(e.state().step_index, 0);
        assert_eq!(step_effects(&e), 0);
    }

    #[test]
    fn next_at_end_stays_at_last() {
        let mut e = loaded();
        let last = e.steps().last_index();
        e.go_to_step(last);
        e.go_next();
        assert_eq!(e.state().step_index, last);
    }

    #[test]
    fn walks_the_whole_story() {
        let mut e = loaded();
        for _ in 0..6 {
            e.go_next();
        }
        let last = e.steps().last_index();
        assert_eq!(e.state().step_index, last);
        let step = e.current_step();
        assert_eq!(step.mode(), Some(Mode::Post));
        assert!(step.categories().is_empty() && step.statuses().is_empty());
        assert!(step.outline_damaged());
        assert_eq!(
            e.surface()
                .layer(layers::buildings::EXTRUSION_LAYER)
                .and_then(|l| l.filter.clone()),
            None
        );

        e.go_next();
        assert_eq!(e.state().step_index, last);
    }

    #[test]
    fn explore_mode_suspends_step_effects() {
        let mut e = loaded();
        e.toggle_explore();
        assert!(e.state().explore_mode);

        e.set_step_index(4);
        assert_eq!(e.state().step_index, 4);
        assert_eq!(step_effects(&e), 0);

        e.toggle_explore();
        assert!(!e.state().explore_mode);
        assert!(step_effects(&e) > 0);
        assert_eq!(e.surface().camera().map(|c| c.zoom), Some(18.5));
    }

    #[test]
    fn story_navigation_leaves_explore_mode() {
        let mut e = loaded();
        e.toggle_explore();
        e.go_next();
        assert!(!e.state().explore_mode);
        assert_eq!(e.state().step_index, 1);

        e.toggle_explore();
        e.go_to_step(3);
        assert!(!e.state().explore_mode);
        assert_eq!(e.current_step().id, "hospital");
    }

    #[test]
    fn toggle_explore_keeps_index() {
        let mut e = loaded();
        e.go_to_step(2);
        e.toggle_explore();
        assert_eq!(e.state().step_index, 2);
    }

    #[test]
    fn keyboard_drives_navigation() {
        let mut e = loaded();
        assert!(e.handle_key(Key::from_dom("ArrowRight")));
        assert!(e.handle_key(Key::from_dom("ArrowRight")));
        assert!(e.handle_key(Key::from_dom("ArrowLeft")));
        assert_eq!(e.state().step_index, 1);
        assert!(!e.handle_key(Key::from_dom("a")));
    }

    #[test]
    fn escape_clears_panels_only() {
        let mut e = loaded();
        e.go_to_step(3);
        e.toggle_explore();
        e.on_click(Some(&foundation::Feature::new(7)));
        assert!(e.state().toast.is_some() && e.state().inspect.is_some());

        e.handle_key(Key::Escape);
        assert_eq!(e.state().toast, None);
        assert_eq!(e.state().inspect, None);
        assert_eq!(e.state().step_index, 3);
        assert!(e.state().explore_mode);
    }

    #[test]
    fn unchanged_transition_does_not_reapply() {
        let mut e = loaded();
        e.dismiss_toast();
        e.go_prev();
        assert_eq!(e.state().toast, None);
    }

    #[test]
    fn phase_follows_current_step() {
        let mut e = loaded();
        assert_eq!(e.phase(), Phase::Pre);
        e.select_phase(Phase::Post);
        assert_eq!(e.state().step_index, 2);
        assert_eq!(e.phase(), Phase::Post);

        e.go_to_step(5);
        e.select_phase(Phase::Post);
        assert_eq!(e.state().step_index, 5);

        e.select_phase(Phase::Pre);
        assert_eq!(e.state().step_index, 0);
    }

    #[test]
    fn navigation_before_load_only_moves_index() {
        let mut e = StoryEngine::new(
            RecordingSurface::new(),
            StepTable::khartoum(),
            StoryConfig::default().source,
        );
        e.go_next();
        assert_eq!(e.state().step_index, 1);
        assert!(e.surface().commands().is_empty());

        e.on_load();
        assert_eq!(e.surface().camera().map(|c| c.zoom), Some(17.3));
    }
}
