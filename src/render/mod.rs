pub mod renderer;

pub use renderer::{Cell, PlayStatus, Renderer};
