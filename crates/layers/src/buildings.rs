//! The three style layers drawn over the building footprints.

use crate::expr::Expr;
use crate::filter::{STATUS_DAMAGED, STATUS_KEY, selection_filter};
use crate::layer::{LayerId, LayerKind, LayerSpec, SourceSpec};
use crate::symbology::*;

/// 3D extrusion of every building; carries the step filter and height scale.
pub const EXTRUSION_LAYER: LayerId = LayerId("khartoum-3d");
/// Red outline drawn around damaged buildings.
pub const OUTLINE_LAYER: LayerId = LayerId("khartoum-3d-outline");
/// White outline around the clicked building.
pub const SELECTION_LAYER: LayerId = LayerId("khartoum-3d-selected");

pub const EXTRUSION_MIN_ZOOM: f64 = 13.0;

pub fn extrusion_layer(source: &SourceSpec) -> LayerSpec {
    let mut spec = LayerSpec::new(EXTRUSION_LAYER, LayerKind::FillExtrusion, source)
        .paint(PAINT_EXTRUSION_COLOR, extrusion_color())
        .paint(PAINT_EXTRUSION_HEIGHT, height_expression(1.0))
        .paint(PAINT_EXTRUSION_BASE, Expr::lit(0))
        .paint(PAINT_EXTRUSION_OPACITY, Expr::lit(0.85));
    spec.minzoom = Some(EXTRUSION_MIN_ZOOM);
    spec
}

pub fn outline_layer(source: &SourceSpec) -> LayerSpec {
    let mut spec = LayerSpec::new(OUTLINE_LAYER, LayerKind::Line, source)
        .paint(PAINT_LINE_COLOR, Expr::lit(DAMAGED_OUTLINE_COLOR))
        .paint(PAINT_LINE_WIDTH, Expr::lit(3))
        .paint(PAINT_LINE_OPACITY, Expr::lit(1));
    spec.filter = Some(Expr::equals(Expr::get(STATUS_KEY), Expr::lit(STATUS_DAMAGED)));
    spec
}

pub fn selection_layer(source: &SourceSpec) -> LayerSpec {
    let mut spec = LayerSpec::new(SELECTION_LAYER, LayerKind::Line, source)
        .paint(PAINT_LINE_COLOR, Expr::lit(SELECTION_COLOR))
        .paint(PAINT_LINE_WIDTH, Expr::lit(4))
        .paint(PAINT_LINE_OPACITY, Expr::lit(1));
    spec.filter = Some(selection_filter(None));
    spec
}

/// Layers in insertion order (bottom to top).
pub fn building_layers(source: &SourceSpec) -> [LayerSpec; 3] {
    [
        extrusion_layer(source),
        outline_layer(source),
        selection_layer(source),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn source() -> SourceSpec {
        SourceSpec {
            id: "khartoum".into(),
            url: "mapbox://example.tiles".into(),
            source_layer: "buildings".into(),
        }
    }

    #[test]
    fn layers_stack_in_order() {
        let ids: Vec<&str> = building_layers(&source())
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(ids, vec!["khartoum-3d", "khartoum-3d-outline", "khartoum-3d-selected"]);
    }

    #[test]
    fn selection_layer_starts_cleared() {
        let json = selection_layer(&source()).to_json();
        assert_eq!(json["filter"], json!(["==", ["id"], -1]));
        assert_eq!(json["source-layer"], json!("buildings"));
        assert_eq!(json["type"], json!("line"));
    }

    #[test]
    fn extrusion_layer_has_unit_height_scale() {
        let spec = extrusion_layer(&source());
        assert_eq!(spec.minzoom, Some(13.0));
        assert_eq!(
            spec.paint_value(PAINT_EXTRUSION_HEIGHT).map(Expr::to_json),
            Some(json!([
                "*",
                ["to-number", ["coalesce", ["get", "height"], 0], 0],
                1.0
            ]))
        );
    }
}
