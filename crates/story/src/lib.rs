//! Story map step engine.
//!
//! A fixed table of narrative steps drives a map surface: each step moves the
//! camera and restyles the building layers. Navigation, explore mode and
//! feature inspection are handled by [`StoryEngine`].

pub mod config;
pub mod engine;
pub mod error;
pub mod interaction;
pub mod khartoum;
pub mod navigation;
pub mod scroll;
pub mod step;
pub mod surface;
pub mod table;
pub mod ui;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use navigation::{Key, Phase};
pub use step::*;
pub use surface::*;
pub use table::*;
pub use ui::*;
