pub mod buffer;
pub mod color;
pub mod error;
pub mod kernel;
pub mod pipeline;
pub mod preset;
pub mod stages;
