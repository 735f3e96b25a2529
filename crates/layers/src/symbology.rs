use serde_json::Value;

use crate::expr::Expr;
use crate::filter::{CATEGORY_KEY, HEIGHT_KEY, STATUS_KEY};

pub const PAINT_EXTRUSION_COLOR: &str = "fill-extrusion-color";
pub const PAINT_EXTRUSION_HEIGHT: &str = "fill-extrusion-height";
pub const PAINT_EXTRUSION_BASE: &str = "fill-extrusion-base";
pub const PAINT_EXTRUSION_OPACITY: &str = "fill-extrusion-opacity";
pub const PAINT_LINE_COLOR: &str = "line-color";
pub const PAINT_LINE_WIDTH: &str = "line-width";
pub const PAINT_LINE_OPACITY: &str = "line-opacity";
pub const LAYOUT_VISIBILITY: &str = "visibility";

/// Feature-state key set while the pointer is over a feature.
pub const HOVER_STATE: &str = "hover";

pub const HOVER_COLOR: &str = "#95a5a6";
pub const DEFAULT_COLOR: &str = "#95a5a6";
pub const DAMAGED_OUTLINE_COLOR: &str = "#ff2f00";
pub const SELECTION_COLOR: &str = "#ffffff";

/// How one category is coloured by damage status.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CategoryColor {
    /// Same colour whatever the status.
    Flat(&'static str),
    ByStatus {
        damaged: &'static str,
        undamaged: &'static str,
        /// Any other status, including `unknown`.
        other: &'static str,
    },
}

/// Category palette of the damage map, in match order.
pub const PALETTE: &[(&str, CategoryColor)] = &[
    (
        "building",
        CategoryColor::ByStatus {
            damaged: "#ff2f00",
            undamaged: "#ffffff",
            other: "#ededed",
        },
    ),
    (
        "education",
        CategoryColor::ByStatus {
            damaged: "#00a83c",
            undamaged: "#00d24d",
            other: "#00d24d",
        },
    ),
    (
        "health",
        CategoryColor::ByStatus {
            damaged: "#ff7f00",
            undamaged: "#ffd200",
            other: "#ffd200",
        },
    ),
    (
        "power",
        CategoryColor::ByStatus {
            damaged: "#ff9900",
            undamaged: "#ffd640",
            other: "#ffd640",
        },
    ),
    ("waste", CategoryColor::Flat("#b0724f")),
    (
        "water",
        CategoryColor::ByStatus {
            damaged: "#00b7ff",
            undamaged: "#0099ff",
            other: "#0099ff",
        },
    ),
];

impl CategoryColor {
    fn to_expr(self) -> Expr {
        match self {
            CategoryColor::Flat(c) => Expr::lit(c),
            CategoryColor::ByStatus {
                damaged,
                undamaged,
                other,
            } => Expr::Match {
                input: Box::new(Expr::get(STATUS_KEY)),
                arms: vec![
                    (Value::from("damaged"), Expr::lit(damaged)),
                    (Value::from("undamaged"), Expr::lit(undamaged)),
                ],
                fallback: Box::new(Expr::lit(other)),
            },
        }
    }
}

/// Extrusion colour: grey while hovered, otherwise category × status.
pub fn extrusion_color() -> Expr {
    let by_category = Expr::Match {
        input: Box::new(Expr::get(CATEGORY_KEY)),
        arms: PALETTE
            .iter()
            .map(|(category, color)| (Value::from(*category), color.to_expr()))
            .collect(),
        fallback: Box::new(Expr::lit(DEFAULT_COLOR)),
    };
    Expr::Case {
        branches: vec![(
            Expr::Boolean(Box::new(Expr::FeatureState(HOVER_STATE.into())), false),
            Expr::lit(HOVER_COLOR),
        )],
        fallback: Box::new(by_category),
    }
}

/// Authored height times `scale`; a missing or non-numeric height counts as 0.
pub fn height_expression(scale: f64) -> Expr {
    Expr::Mul(vec![
        Expr::ToNumber(vec![
            Expr::Coalesce(vec![Expr::get(HEIGHT_KEY), Expr::lit(0)]),
            Expr::lit(0),
        ]),
        Expr::lit(scale),
    ])
}
