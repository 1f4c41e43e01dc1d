//! Render pipeline and uniform buffer setup.
//!
//! - `basic` builds the single lighting pipeline from WGSL source
//! - `uniforms` holds the frame and per-draw uniform layouts

pub mod basic;
pub mod uniforms;
