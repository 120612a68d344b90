// Domain layer: record model, run results, and the ports validators,
// transformers and observers plug into.

pub mod model;
pub mod ports;
