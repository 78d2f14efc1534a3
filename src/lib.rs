//! Smooths a live, irregularly-timed stream of pointer samples into a
//! continuous painted stroke: points are accepted through an adaptive
//! movement threshold, fitted with local Catmull-Rom segments over a
//! 4-point sliding window, and emitted as evenly spaced brush stamps
//! through a minimum-spacing gate. Rendering the stamps is the caller's
//! job, via [`BrushSink`].

pub mod geom;

mod engine;
pub use engine::*;
