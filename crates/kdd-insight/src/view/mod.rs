//! View layer: turns payloads into renderer-ready view models.
//!
//! - [`color`]: heatmap buckets
//! - [`format`]: label formatting, the only place values are rounded
//! - [`models`]: one [`ViewModel`] variant per unit
//! - [`fallback`]: NSL-KDD reference figures
//! - [`ViewModelAssembler`]: decoding, assembly and fallback substitution

pub mod assembler;
pub mod color;
pub mod fallback;
pub mod format;
pub mod models;
pub mod state;

pub use assembler::ViewModelAssembler;
pub use color::HeatmapBucket;
pub use models::ViewModel;
pub use state::UnitState;
