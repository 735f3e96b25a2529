use foundation::{Feature, FeatureId};
use layers::buildings::SELECTION_LAYER;
use layers::filter::selection_filter;
use tracing::trace;

use crate::engine::StoryEngine;
use crate::surface::{Cursor, MapSurface, hover_state};
use crate::ui::InspectPanel;

impl<M: MapSurface> StoryEngine<M> {
    /// Pointer moved over the extrusion layer; `feature` is the top-most hit.
    ///
    /// At most one feature carries the hover highlight.
    pub fn on_pointer_move(&mut self, feature: Option<&Feature>) {
        self.surface.set_cursor(Cursor::Pointer);
        if let Some(previous) = self.state.hovered.take() {
            self.set_hover(&previous, false);
        }
        let id = feature.and_then(|f| f.id.clone());
        if let Some(id) = &id {
            self.set_hover(id, true);
        }
        self.state.hovered = id;
    }

    pub fn on_pointer_leave(&mut self) {
        self.surface.set_cursor(Cursor::Default);
        if let Some(previous) = self.state.hovered.take() {
            self.set_hover(&previous, false);
        }
    }

    /// Click on the extrusion layer. Selects the feature and fills the
    /// inspect panel; a click that hit nothing is ignored.
    pub fn on_click(&mut self, feature: Option<&Feature>) {
        let Some(feature) = feature else {
            return;
        };
        self.state.selected = feature.id.clone();
        self.sync_selection_filter();
        self.state.inspect = Some(InspectPanel::for_feature(feature));
    }

    pub fn reset_selection(&mut self) {
        self.state.selected = None;
        self.sync_selection_filter();
        self.state.inspect = None;
    }

    fn sync_selection_filter(&mut self) {
        if self.surface.has_layer(SELECTION_LAYER) {
            let filter = selection_filter(self.state.selected.as_ref());
            self.surface.set_filter(SELECTION_LAYER, Some(&filter));
        }
    }

    // Highlighting is cosmetic; a feature that left the view is not an error.
    fn set_hover(&mut self, id: &FeatureId, on: bool) {
        if let Err(err) = self
            .surface
            .set_feature_state(&self.source, id, &hover_state(on))
        {
            trace!(%id, %err, "hover state not applied");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoryConfig;
    use crate::surface::RecordingSurface;
    use crate::table::StepTable;
    use layers::Expr;
    use layers::filter::{CATEGORY_KEY, STATUS_KEY};
    use pretty_assertions::assert_eq;

    fn loaded() -> StoryEngine<RecordingSurface> {
        let mut e = StoryEngine::new(
            RecordingSurface::new(),
            StepTable::khartoum(),
            StoryConfig::default().source,
        );
        e.on_load();
        e
    }

    fn selection(e: &StoryEngine<RecordingSurface>) -> Option<Expr> {
        e.surface().layer(SELECTION_LAYER).and_then(|l| l.filter.clone())
    }

    #[test]
    fn hover_moves_between_features() {
        let mut e = loaded();
        let a = Feature::new(1);
        let b = Feature::new(2);

        e.on_pointer_move(Some(&a));
        assert!(e.surface().is_hovered(&FeatureId::Number(1)));
        assert_eq!(e.surface().cursor(), Cursor::Pointer);

        e.on_pointer_move(Some(&b));
        assert!(!e.surface().is_hovered(&FeatureId::Number(1)));
        assert!(e.surface().is_hovered(&FeatureId::Number(2)));
        assert_eq!(e.state().hovered, Some(FeatureId::Number(2)));

        e.on_pointer_leave();
        assert!(!e.surface().is_hovered(&FeatureId::Number(2)));
        assert_eq!(e.state().hovered, None);
        assert_eq!(e.surface().cursor(), Cursor::Default);
    }

    #[test]
    fn hover_failures_are_swallowed() {
        let mut e = loaded();
        e.surface_mut().set_features_in_view([FeatureId::Number(2)]);
        e.on_pointer_move(Some(&Feature::new(1)));
        assert_eq!(e.state().hovered, Some(FeatureId::Number(1)));
        e.on_pointer_move(Some(&Feature::new(2)));
        assert!(e.surface().is_hovered(&FeatureId::Number(2)));
    }

    #[test]
    fn click_selects_and_inspects() {
        let mut e = loaded();
        let f = Feature::new(42)
            .with(CATEGORY_KEY, "health")
            .with(STATUS_KEY, "damaged");
        e.on_click(Some(&f));

        assert_eq!(e.state().selected, Some(FeatureId::Number(42)));
        assert_eq!(selection(&e), Some(selection_filter(Some(&FeatureId::Number(42)))));
        let panel = e.state().inspect.clone().unwrap();
        assert_eq!(
            panel.lines,
            vec!["Category: health", "Status: damaged", "Height: n/a"]
        );
    }

    #[test]
    fn click_on_nothing_is_ignored() {
        let mut e = loaded();
        e.on_click(Some(&Feature::new(5)));
        e.on_click(None);
        assert_eq!(e.state().selected, Some(FeatureId::Number(5)));
    }

    #[test]
    fn click_without_id_uses_sentinel() {
        let mut e = loaded();
        e.on_click(Some(&Feature::anonymous()));
        assert_eq!(e.state().selected, None);
        assert_eq!(selection(&e), Some(selection_filter(None)));
        assert!(e.state().inspect.is_some());
    }

    #[test]
    fn reset_selection_clears_filter_and_panel() {
        let mut e = loaded();
        e.on_click(Some(&Feature::new(42)));
        e.reset_selection();
        assert_eq!(e.state().selected, None);
        assert_eq!(
            selection(&e).map(|f| f.to_json()),
            Some(serde_json::json!(["==", ["id"], -1]))
        );
        assert_eq!(e.state().inspect, None);
    }

    #[test]
    fn selection_survives_step_change() {
        let mut e = loaded();
        e.on_click(Some(&Feature::new(9)));
        e.go_next();
        assert_eq!(e.state().selected, Some(FeatureId::Number(9)));
        assert_eq!(e.state().inspect, None);
    }
}
