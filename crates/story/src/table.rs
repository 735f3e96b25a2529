use std::collections::HashSet;
use std::path::Path;

use crate::error::StoryError;
use crate::step::{Mode, Step};

pub const MAX_ZOOM: f64 = 24.0;
pub const MAX_PITCH: f64 = 85.0;

/// Validated, immutable step sequence indexed `0..len()`.
///
/// Never empty: `last_index()` is always a valid index.
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
    steps: Vec<Step>,
}

impl StepTable {
    pub fn new(steps: Vec<Step>) -> Result<Self, StoryError> {
        if steps.is_empty() {
            return Err(StoryError::EmptyStepTable);
        }
        let mut seen = HashSet::new();
        for step in &steps {
            validate_step(step)?;
            if !seen.insert(step.id.as_str()) {
                return Err(StoryError::DuplicateStepId(step.id.clone()));
            }
        }
        Ok(Self { steps })
    }

    /// The built-in Khartoum story.
    pub fn khartoum() -> Self {
        // The built-in table is covered by `builtin_table_is_valid`.
        Self {
            steps: crate::khartoum::steps(),
        }
    }

    /// Parses a JSON array of steps using the authored field names.
    pub fn from_json(json: &str) -> Result<Self, StoryError> {
        let steps: Vec<Step> = serde_json::from_str(json)?;
        Self::new(steps)
    }

    pub fn from_path(path: &Path) -> Result<Self, StoryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, StoryError> {
        Ok(serde_json::to_string_pretty(&self.steps)?)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn last_index(&self) -> usize {
        self.steps.len() - 1
    }

    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.last_index())
    }

    /// Step at `index` clamped into range.
    pub fn step(&self, index: usize) -> &Step {
        &self.steps[self.clamp(index)]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Step> + '_ {
        self.steps.iter()
    }

    /// First step authored with `mode`.
    pub fn first_with_mode(&self, mode: Mode) -> Option<usize> {
        self.steps.iter().position(|s| s.mode() == Some(mode))
    }
}

fn validate_step(step: &Step) -> Result<(), StoryError> {
    if step.id.trim().is_empty() {
        return Err(StoryError::invalid(&step.id, "empty id"));
    }
    let cam = &step.camera;
    if !cam.center.is_valid() {
        return Err(StoryError::invalid(
            &step.id,
            format!("center out of range: [{}, {}]", cam.center.lon, cam.center.lat),
        ));
    }
    if !(0.0..=MAX_ZOOM).contains(&cam.zoom) {
        return Err(StoryError::invalid(&step.id, format!("zoom {} not in [0, {MAX_ZOOM}]", cam.zoom)));
    }
    if let Some(pitch) = cam.pitch
        && !(0.0..=MAX_PITCH).contains(&pitch)
    {
        return Err(StoryError::invalid(&step.id, format!("pitch {pitch} not in [0, {MAX_PITCH}]")));
    }
    if let Some(bearing) = cam.bearing
        && !bearing.is_finite()
    {
        return Err(StoryError::invalid(&step.id, "bearing is not finite"));
    }
    if let Some(scale) = step.actions.as_ref().and_then(|a| a.height_scale)
        && !(scale.is_finite() && scale >= 0.0)
    {
        return Err(StoryError::invalid(&step.id, format!("height scale {scale} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Mode;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_table_is_valid() {
        let table = StepTable::khartoum();
        let revalidated = StepTable::new(crate::khartoum::steps()).unwrap();
        assert_eq!(table, revalidated);
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn builtin_table_starts_pre_and_ends_post() {
        let table = StepTable::khartoum();
        let first = table.step(0);
        assert_eq!(first.mode(), Some(Mode::Pre));
        assert!(first.categories().is_empty() && first.statuses().is_empty());

        let last = table.step(table.last_index());
        assert_eq!(last.mode(), Some(Mode::Post));
        assert!(last.categories().is_empty() && last.statuses().is_empty());
        assert!(last.outline_damaged());
    }

    #[test]
    fn rejects_empty_and_duplicates() {
        assert!(matches!(StepTable::new(Vec::new()), Err(StoryError::EmptyStepTable)));

        let mut steps = crate::khartoum::steps();
        steps[1].id = steps[0].id.clone();
        match StepTable::new(steps) {
            Err(StoryError::DuplicateStepId(id)) => assert_eq!(id, "baseline"),
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_camera_and_scale() {
        let mut steps = crate::khartoum::steps();
        steps[2].camera.pitch = Some(90.0);
        assert!(matches!(StepTable::new(steps), Err(StoryError::InvalidStep { .. })));

        let mut steps = crate::khartoum::steps();
        steps[0].camera.center.lat = 120.0;
        assert!(matches!(StepTable::new(steps), Err(StoryError::InvalidStep { .. })));

        let mut steps = crate::khartoum::steps();
        if let Some(actions) = steps[3].actions.as_mut() {
            actions.height_scale = Some(-0.5);
        }
        assert!(matches!(StepTable::new(steps), Err(StoryError::InvalidStep { .. })));
    }

    #[test]
    fn accepts_flattened_extrusion() {
        let table = StepTable::from_json(
            r#"[{ "id": "flat", "title": "Flat", "body": "",
                  "camera": { "center": [32.55, 15.5], "zoom": 15 },
                  "actions": { "heightScale": 0 } }]"#,
        )
        .unwrap();
        assert_eq!(table.step(0).height_scale(), 0.0);
    }

    #[test]
    fn loads_authored_json() {
        let table = StepTable::from_json(
            r#"[
                { "id": "a", "title": "A", "body": "", "camera": { "center": [10, 20], "zoom": 12 } },
                { "id": "b", "title": "B", "body": "", "camera": { "center": [10, 20], "zoom": 14 },
                  "actions": { "mode": "post", "statuses": ["damaged"] } }
            ]"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.first_with_mode(Mode::Pre), None);
        assert_eq!(table.step(1).statuses(), ["damaged".to_string()]);

        assert!(matches!(StepTable::from_json("{"), Err(StoryError::Json(_))));
    }

    #[test]
    fn clamps_and_looks_up() {
        let table = StepTable::khartoum();
        assert_eq!(table.clamp(99), 6);
        assert_eq!(table.step(99).id, "explore");
        assert_eq!(table.step(3).id, "hospital");
        assert_eq!(table.first_with_mode(Mode::Post), Some(2));
    }
}
