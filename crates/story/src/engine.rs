use foundation::FeatureId;
use layers::buildings::{EXTRUSION_LAYER, OUTLINE_LAYER, building_layers};
use layers::filter::{build_filter, outline_filter};
use layers::symbology::{LAYOUT_VISIBILITY, PAINT_EXTRUSION_HEIGHT, height_expression};
use layers::{SourceSpec, Visibility};
use tracing::{debug, warn};

use crate::step::{Mode, Popup, Step};
use crate::surface::{FlyTo, MapSurface};
use crate::table::StepTable;
use crate::ui::{InspectPanel, NarrativeView};

/// Mutable story state. Read-only outside the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoryState {
    pub step_index: usize,
    pub explore_mode: bool,
    /// Set once the surface signalled load and the layers were installed.
    pub ready: bool,
    pub hovered: Option<FeatureId>,
    pub selected: Option<FeatureId>,
    pub toast: Option<Popup>,
    pub inspect: Option<InspectPanel>,
}

/// Drives a [`MapSurface`] through a [`StepTable`].
///
/// Single-threaded: every method runs on the UI event loop and mutates the
/// surface directly. Camera transitions are fire-and-forget.
#[derive(Debug)]
pub struct StoryEngine<M: MapSurface> {
    pub(crate) surface: M,
    pub(crate) steps: StepTable,
    pub(crate) source: SourceSpec,
    pub(crate) state: StoryState,
}

impl<M: MapSurface> StoryEngine<M> {
    pub fn new(surface: M, steps: StepTable, source: SourceSpec) -> Self {
        Self {
            surface,
            steps,
            source,
            state: StoryState::default(),
        }
    }

    pub fn state(&self) -> &StoryState {
        &self.state
    }

    pub fn steps(&self) -> &StepTable {
        &self.steps
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }

    pub fn current_step(&self) -> &Step {
        self.steps.step(self.state.step_index)
    }

    /// Called when the surface finished its initial load.
    ///
    /// Installs the source and building layers that are not there yet, then
    /// applies the current step once.
    pub fn on_load(&mut self) {
        if !self.surface.has_source(&self.source.id) {
            self.surface.add_source(&self.source);
        }
        for spec in building_layers(&self.source) {
            if !self.surface.has_layer(spec.id) {
                self.surface.add_layer(&spec);
            }
        }
        self.state.ready = true;
        debug!(steps = self.steps.len(), "story map loaded");
        self.apply_step(self.state.step_index);
    }

    /// Drives the surface to reflect step `index`.
    ///
    /// Each layer effect is skipped when its layer does not exist yet; the
    /// camera and toast still apply.
    pub fn apply_step(&mut self, index: usize) {
        let clamped = self.steps.clamp(index);
        if clamped != index {
            warn!(index, clamped, "step index out of range");
        }
        let step = self.steps.step(clamped);
        debug!(step = %step.id, index = clamped, "applying step");

        let camera = &step.camera;
        let target = FlyTo {
            center: camera.center,
            zoom: camera.zoom,
            pitch: camera.pitch.unwrap_or_else(|| self.surface.pitch()),
            bearing: camera.bearing.unwrap_or_else(|| self.surface.bearing()),
            duration_ms: camera.duration_ms(),
            essential: true,
        };
        self.surface.fly_to(&target);

        if self.surface.has_layer(EXTRUSION_LAYER) {
            let filter = build_filter(step.categories(), step.statuses());
            self.surface.set_filter(EXTRUSION_LAYER, filter.as_ref());
            self.surface.set_paint_property(
                EXTRUSION_LAYER,
                PAINT_EXTRUSION_HEIGHT,
                &height_expression(step.height_scale()),
            );
        }

        if self.surface.has_layer(OUTLINE_LAYER) {
            self.surface
                .set_filter(OUTLINE_LAYER, Some(&outline_filter(step.categories())));
            self.surface.set_layout_property(
                OUTLINE_LAYER,
                LAYOUT_VISIBILITY,
                Visibility::from_flag(step.outline_damaged()).as_str(),
            );
        }

        self.state.toast = step.popup().cloned();
        self.state.inspect = None;
    }

    /// Mode of the current step; steps without one read as pre-conflict.
    pub fn mode(&self) -> Mode {
        self.current_step().mode().unwrap_or(Mode::Pre)
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode().label()
    }

    pub fn progress_label(&self) -> String {
        format!("Step {}/{}", self.state.step_index + 1, self.steps.len())
    }

    pub fn view(&self) -> NarrativeView {
        let step = self.current_step();
        NarrativeView {
            step_id: step.id.clone(),
            title: step.title.clone(),
            body: step.body.clone(),
            step_index: self.state.step_index,
            step_count: self.steps.len(),
            explore_mode: self.state.explore_mode,
            mode_label: self.mode_label(),
            progress_label: self.progress_label(),
            can_go_prev: self.can_go_prev(),
            can_go_next: self.can_go_next(),
            toast: self.state.toast.clone(),
            inspect: self.state.inspect.clone(),
        }
    }

    /// Removes the map and hands the surface back.
    pub fn teardown(mut self) -> M {
        self.surface.remove();
        self.surface
    }
}
