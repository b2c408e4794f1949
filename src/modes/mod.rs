pub mod play;
pub mod train;

pub use play::{PlayMode, PlaybackSpeed};
pub use train::{TrainConfig, TrainMode};
