//! Feature filters for the building layers.
//!
//! All builders are pure: the same inputs always produce the same expression.

use foundation::{Feature, FeatureId};

use crate::expr::Expr;

/// Attribute holding the infrastructure category (`education`, `health`, ...).
pub const CATEGORY_KEY: &str = "tor_category";
/// Attribute holding the damage status (`damaged`, `undamaged`, `unknown`).
pub const STATUS_KEY: &str = "status";
/// Attribute holding the authored building height.
pub const HEIGHT_KEY: &str = "height";

pub const STATUS_DAMAGED: &str = "damaged";

/// Builds the extrusion-layer filter for a step.
///
/// Returns `None` when both sets are empty: no filter, every feature shows.
/// This is distinct from a filter that matches nothing.
pub fn build_filter<S: AsRef<str>>(categories: &[S], statuses: &[S]) -> Option<Expr> {
    let mut clauses = Vec::new();
    if !categories.is_empty() {
        clauses.push(Expr::one_of(Expr::get(CATEGORY_KEY), categories));
    }
    if !statuses.is_empty() {
        clauses.push(Expr::one_of(Expr::get(STATUS_KEY), statuses));
    }
    if clauses.is_empty() {
        return None;
    }
    Some(Expr::All(clauses))
}

/// Damaged features, optionally narrowed to `categories`.
pub fn outline_filter<S: AsRef<str>>(categories: &[S]) -> Expr {
    let mut clauses = vec![Expr::equals(Expr::get(STATUS_KEY), Expr::lit(STATUS_DAMAGED))];
    if !categories.is_empty() {
        clauses.push(Expr::one_of(Expr::get(CATEGORY_KEY), categories));
    }
    Expr::All(clauses)
}

/// Matches exactly the selected feature, or nothing when `selected` is `None`.
pub fn selection_filter(selected: Option<&FeatureId>) -> Expr {
    let id = selected.unwrap_or(&FeatureId::SENTINEL);
    Expr::equals(Expr::Id, Expr::Literal(id.to_json()))
}

/// Whether `feature` passes `filter`; `None` passes everything.
pub fn matches(filter: Option<&Expr>, feature: &Feature) -> bool {
    filter.is_none_or(|f| f.test(feature))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NONE: &[&str] = &[];

    fn building(id: i64, category: &str, status: &str) -> Feature {
        Feature::new(id)
            .with(CATEGORY_KEY, category)
            .with(STATUS_KEY, status)
    }

    fn sample() -> Vec<Feature> {
        vec![
            building(1, "health", "damaged"),
            building(2, "health", "undamaged"),
            building(3, "education", "damaged"),
            building(4, "water", "unknown"),
        ]
    }

    fn ids(filter: Option<&Expr>) -> Vec<i64> {
        sample()
            .iter()
            .filter(|f| matches(filter, f))
            .filter_map(|f| match f.id {
                Some(FeatureId::Number(n)) => Some(n),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn no_inputs_means_no_filter() {
        assert_eq!(build_filter(NONE, NONE), None);
        assert_eq!(ids(None), vec![1, 2, 3, 4]);
    }

    #[test]
    fn category_only_ignores_status() {
        let f = build_filter(&["health"], NONE);
        assert_eq!(ids(f.as_ref()), vec![1, 2]);
    }

    #[test]
    fn status_only_ignores_category() {
        let f = build_filter(NONE, &["damaged"]);
        assert_eq!(ids(f.as_ref()), vec![1, 3]);
    }

    #[test]
    fn both_is_the_intersection() {
        let f = build_filter(&["health"], &["damaged"]);
        assert_eq!(ids(f.as_ref()), vec![1]);
    }

    #[test]
    fn rebuilding_yields_identical_expression() {
        let a = build_filter(&["health", "water"], &["damaged"]);
        let b = build_filter(&["health", "water"], &["damaged"]);
        assert_eq!(a, b);
        assert_eq!(
            a.unwrap().to_json(),
            json!([
                "all",
                ["in", ["get", "tor_category"], ["literal", ["health", "water"]]],
                ["in", ["get", "status"], ["literal", ["damaged"]]]
            ])
        );
    }

    #[test]
    fn outline_keeps_damaged_within_categories() {
        let all_damaged = outline_filter(NONE);
        assert_eq!(ids(Some(&all_damaged)), vec![1, 3]);

        let health_damaged = outline_filter(&["health"]);
        assert_eq!(ids(Some(&health_damaged)), vec![1]);
    }

    #[test]
    fn selection_filter_uses_sentinel_when_cleared() {
        assert_eq!(selection_filter(None).to_json(), json!(["==", ["id"], -1]));
        let picked = selection_filter(Some(&FeatureId::Number(2)));
        assert_eq!(ids(Some(&picked)), vec![2]);
        assert_eq!(ids(Some(&selection_filter(None))), Vec::<i64>::new());
    }
}
