pub mod feature;
pub mod geo;
pub mod ids;

// Foundation crate: small, well-tested primitives only.
pub use feature::*;
pub use geo::*;
pub use ids::*;
