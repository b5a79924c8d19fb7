//! Multi-mode composition engine.

pub mod composer;
pub mod selection;
pub mod sphere;

pub use composer::{MultiModeSurrogate, mirror_mode, project};
pub use selection::{extend_minus_m, select, sort_modes};
pub use sphere::{HSphere, SphereEvaluation};
