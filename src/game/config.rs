use serde::{Deserialize, Serialize};

/// Board geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Number of grid rows
    pub rows: usize,
    /// Number of grid columns
    pub columns: usize,
    /// Length of the snake when an episode starts
    pub initial_length: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 8,
            initial_length: 3,
        }
    }
}

impl BoardConfig {
    /// Create a new configuration with custom grid size
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    pub fn with_initial_length(mut self, initial_length: usize) -> Self {
        self.initial_length = initial_length;
        self
    }

    /// Total number of cells
    pub fn cells(&self) -> usize {
        self.rows * self.columns
    }

    /// Check that a random initial snake and a food cell always fit
    pub fn validate(&self) -> Result<(), String> {
        if self.rows < 2 || self.columns < 2 {
            return Err(format!(
                "board must be at least 2x2, got {}x{}",
                self.rows, self.columns
            ));
        }

        if self.rows > i32::MAX as usize || self.columns > i32::MAX as usize {
            return Err("board dimensions do not fit in i32".to_string());
        }

        if self.initial_length == 0 {
            return Err("initial_length must be at least 1".to_string());
        }

        if self.initial_length > self.cells() / 2 {
            return Err(format!(
                "initial_length ({}) cannot exceed half the board ({} cells)",
                self.initial_length,
                self.cells()
            ));
        }

        Ok(())
    }
}
