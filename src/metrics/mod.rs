pub mod game_metrics;
pub mod history;
pub mod training_stats;

pub use game_metrics::GameMetrics;
pub use history::{EpisodeRecord, History, HistoryField, moving_max, moving_mean};
pub use training_stats::TrainingStats;
