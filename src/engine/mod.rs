mod brush;
pub use brush::*;

mod processor;
pub use processor::*;

mod stroke;
pub use stroke::*;
