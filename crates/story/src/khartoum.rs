//! Built-in story: building damage in central Khartoum.
//!
//! Seven steps, from a pre-conflict baseline to free exploration.

use foundation::LonLat;

use crate::step::{CameraTarget, Mode, Popup, Step, StepActions};

pub const CITY_CENTER: LonLat = LonLat::new(32.55, 15.516_666_67);

const CRITICAL: &[&str] = &["education", "health", "water", "power"];
const ANY_STATUS: &[&str] = &["damaged", "undamaged", "unknown"];

fn camera(center: LonLat, zoom: f64, pitch: f64, bearing: f64, duration_ms: u32) -> CameraTarget {
    CameraTarget {
        center,
        zoom,
        pitch: Some(pitch),
        bearing: Some(bearing),
        duration_ms: Some(duration_ms),
    }
}

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

struct Directives {
    mode: Mode,
    categories: &'static [&'static str],
    statuses: &'static [&'static str],
    height_scale: f64,
    outline_damaged: bool,
    popup: (&'static str, &'static str),
}

fn step(id: &str, title: &str, body: &str, camera: CameraTarget, d: Directives) -> Step {
    Step {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        camera,
        actions: Some(StepActions {
            mode: Some(d.mode),
            categories: tags(d.categories),
            statuses: tags(d.statuses),
            height_scale: Some(d.height_scale),
            outline_damaged: Some(d.outline_damaged),
            popup: Some(Popup::new(d.popup.0, d.popup.1)),
        }),
    }
}

pub fn steps() -> Vec<Step> {
    vec![
        step(
            "baseline",
            "Establishing the baseline",
            "Overview of the built environment. Use Next/Previous to follow the story.",
            camera(CITY_CENTER, 16.8, 55.0, -15.0, 1500),
            Directives {
                mode: Mode::Pre,
                categories: &[],
                statuses: &[],
                height_scale: 1.0,
                outline_damaged: false,
                popup: (
                    "Step 1 · Baseline",
                    "We start with a broad view before focusing on specific infrastructure.",
                ),
            },
        ),
        step(
            "categories",
            "Critical infrastructure categories",
            "Highlight key categories (education, health, water, power…). This is a baseline classification.",
            camera(CITY_CENTER, 17.3, 60.0, 20.0, 1500),
            Directives {
                mode: Mode::Pre,
                categories: CRITICAL,
                statuses: &[],
                height_scale: 1.0,
                outline_damaged: false,
                popup: (
                    "Step 2 · Categories",
                    "We filter the map to focus on critical infrastructure categories.",
                ),
            },
        ),
        step(
            "damage-overview",
            "Assessing damage (overview)",
            "Switch to a post-conflict lens. Damaged features are emphasized for quick scanning.",
            camera(CITY_CENTER, 17.0, 60.0, -35.0, 1700),
            Directives {
                mode: Mode::Post,
                categories: &[],
                statuses: &["damaged"],
                height_scale: 1.2,
                outline_damaged: true,
                popup: (
                    "Step 3 · Damage overview",
                    "Damaged buildings are filtered and outlined to support rapid assessment.",
                ),
            },
        ),
        step(
            "hospital",
            "Case focus: Hospital",
            "Zoom into a health facility area. Click buildings to inspect attributes.",
            camera(LonLat::new(32.5532, 15.5159), 18.6, 65.0, 10.0, 1700),
            Directives {
                mode: Mode::Post,
                categories: &["health"],
                statuses: ANY_STATUS,
                height_scale: 1.25,
                outline_damaged: true,
                popup: (
                    "Step 4 · Hospital focus",
                    "We focus on health infrastructure for situational awareness.",
                ),
            },
        ),
        step(
            "school",
            "Case focus: School",
            "Zoom into an education facility area. Height scale can be used as emphasis for storytelling.",
            camera(LonLat::new(32.5489, 15.5182), 18.5, 65.0, -20.0, 1700),
            Directives {
                mode: Mode::Post,
                categories: &["education"],
                statuses: ANY_STATUS,
                height_scale: 1.35,
                outline_damaged: true,
                popup: (
                    "Step 5 · School focus",
                    "Education sites can be spotlighted for recovery planning priorities.",
                ),
            },
        ),
        step(
            "recovery-planning",
            "Recovery planning",
            "Return to a broader view to support reconstruction planning and prioritization.",
            camera(CITY_CENTER, 16.9, 55.0, 25.0, 1700),
            Directives {
                mode: Mode::Post,
                categories: &["health", "education", "water", "power"],
                statuses: &[],
                height_scale: 1.1,
                outline_damaged: true,
                popup: (
                    "Step 6 · Recovery planning",
                    "Broader overview helps compare categories and identify priority clusters.",
                ),
            },
        ),
        step(
            "explore",
            "Explore mode",
            "You can now explore freely. Use the toggle to lock back into story mode anytime.",
            camera(CITY_CENTER, 17.2, 58.0, 0.0, 1200),
            Directives {
                mode: Mode::Post,
                categories: &[],
                statuses: &[],
                height_scale: 1.0,
                outline_damaged: true,
                popup: (
                    "Step 7 · Explore",
                    "Story steps are finished, feel free to inspect buildings and navigate freely.",
                ),
            },
        ),
    ]
}
