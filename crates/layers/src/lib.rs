pub mod buildings;
pub mod expr;
pub mod filter;
pub mod layer;
pub mod symbology;

pub use expr::*;
pub use layer::*;
