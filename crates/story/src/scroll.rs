//! Scroll-scrubbed pin/zoom of the map element.
//!
//! The map host stays at a fixed large size and only its scale animates, so
//! the map never reloads tiles during the scroll. Two tweens share one
//! timeline: zoom in over the first half second, then zoom back out from
//! `ZOOM_OUT_AT`. Scroll progress across the pinned distance scrubs it.

use serde::Serialize;

/// Scroll distance, as a percentage of the viewport, the trigger stays pinned.
pub const PIN_DISTANCE_PCT: u32 = 200;

const TWEEN_DURATION: f64 = 0.5;
const ZOOM_OUT_AT: f64 = 0.65;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollFrame {
    pub scale: f64,
    pub border_radius_px: f64,
    pub shadow_offset_px: f64,
    pub shadow_blur_px: f64,
    pub shadow_alpha: f64,
}

impl ScrollFrame {
    const REST: ScrollFrame = ScrollFrame {
        scale: 0.67,
        border_radius_px: 16.0,
        shadow_offset_px: 0.0,
        shadow_blur_px: 0.0,
        shadow_alpha: 0.0,
    };

    const ZOOMED: ScrollFrame = ScrollFrame {
        scale: 1.0,
        border_radius_px: 28.0,
        shadow_offset_px: 30.0,
        shadow_blur_px: 90.0,
        shadow_alpha: 0.25,
    };

    fn lerp(a: ScrollFrame, b: ScrollFrame, t: f64) -> ScrollFrame {
        let mix = |x: f64, y: f64| x + (y - x) * t;
        ScrollFrame {
            scale: mix(a.scale, b.scale),
            border_radius_px: mix(a.border_radius_px, b.border_radius_px),
            shadow_offset_px: mix(a.shadow_offset_px, b.shadow_offset_px),
            shadow_blur_px: mix(a.shadow_blur_px, b.shadow_blur_px),
            shadow_alpha: mix(a.shadow_alpha, b.shadow_alpha),
        }
    }

    /// CSS `box-shadow` value.
    pub fn box_shadow(&self) -> String {
        format!(
            "0 {:.1}px {:.1}px rgba(0,0,0,{:.3})",
            self.shadow_offset_px, self.shadow_blur_px, self.shadow_alpha
        )
    }
}

/// Linear (`ease: none`) scrubbed timeline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScrollZoom {
    total: f64,
}

impl ScrollZoom {
    /// `None` when the user prefers reduced motion: no pinning, no scaling.
    pub fn activate(prefers_reduced_motion: bool) -> Option<Self> {
        if prefers_reduced_motion {
            return None;
        }
        Some(Self {
            total: ZOOM_OUT_AT + TWEEN_DURATION,
        })
    }

    /// Frame before the trigger reaches the top of the viewport.
    pub fn initial(&self) -> ScrollFrame {
        ScrollFrame::REST
    }

    /// Frame for scroll `progress` through the pinned distance, clamped to `[0, 1]`.
    pub fn frame_at(&self, progress: f64) -> ScrollFrame {
        let p = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
        let t = p * self.total;
        if t <= TWEEN_DURATION {
            ScrollFrame::lerp(ScrollFrame::REST, ScrollFrame::ZOOMED, t / TWEEN_DURATION)
        } else if t <= ZOOM_OUT_AT {
            ScrollFrame::ZOOMED
        } else {
            let u = ((t - ZOOM_OUT_AT) / TWEEN_DURATION).min(1.0);
            ScrollFrame::lerp(ScrollFrame::ZOOMED, ScrollFrame::REST, u)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn reduced_motion_disables_timeline() {
        assert!(ScrollZoom::activate(true).is_none());
        assert!(ScrollZoom::activate(false).is_some());
    }

    #[test]
    fn starts_and_ends_at_rest() {
        let z = ScrollZoom::activate(false).unwrap();
        assert_eq!(z.frame_at(0.0), z.initial());
        assert!(close(z.frame_at(1.0).scale, 0.67));
        assert!(close(z.frame_at(1.0).border_radius_px, 16.0));
        assert_eq!(z.frame_at(-3.0), z.frame_at(0.0));
    }

    #[test]
    fn holds_full_scale_between_tweens() {
        let z = ScrollZoom::activate(false).unwrap();
        let total = ZOOM_OUT_AT + TWEEN_DURATION;
        for t in [0.5, 0.55, 0.65] {
            assert!(close(z.frame_at(t / total).scale, 1.0), "t = {t}");
        }
        let mid_in = z.frame_at(0.25 / total);
        assert!(close(mid_in.scale, 0.835));
    }

    #[test]
    fn box_shadow_formats_css() {
        let z = ScrollZoom::activate(false).unwrap();
        assert_eq!(z.initial().box_shadow(), "0 0.0px 0.0px rgba(0,0,0,0.000)");
    }
}
