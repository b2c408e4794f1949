//! Tabular action-value function with an epsilon-greedy policy
//!
//! Rows are created lazily: the first lookup of an unseen state inserts a
//! zero vector, and that insertion is what grows [`QTable::len`].

use std::collections::{BTreeMap, HashMap};

use crate::error::{LearnerError, Result};
use crate::game::{RandomSource, SnakeAction};

use super::observation::StateKey;

/// One action value per [`SnakeAction`], in [`SnakeAction::ALL`] order
pub type ActionValues = [f64; SnakeAction::COUNT];

/// Mapping from state key to action values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a plain key → vector mapping
    ///
    /// Fails on the first vector whose length is not the number of actions or
    /// that holds a non-finite value.
    pub fn from_mapping(mapping: impl IntoIterator<Item = (String, Vec<f64>)>) -> Result<Self> {
        let mut table = Self::new();
        for (state, vector) in mapping {
            let values: ActionValues = vector.as_slice().try_into().map_err(|_| {
                LearnerError::MalformedQTable {
                    state: state.clone(),
                    reason: format!(
                        "expected {} action values, got {}",
                        SnakeAction::COUNT,
                        vector.len()
                    ),
                }
            })?;
            if let Some(value) = values.iter().find(|value| !value.is_finite()) {
                return Err(LearnerError::MalformedQTable {
                    state,
                    reason: format!("non-finite action value {}", value),
                });
            }
            table.values.insert(StateKey::new(state), values);
        }
        Ok(table)
    }

    /// Plain sorted mapping, for export
    pub fn to_mapping(&self) -> BTreeMap<&str, ActionValues> {
        self.values
            .iter()
            .map(|(state, values)| (state.as_str(), *values))
            .collect()
    }

    /// Action values for `state`, inserting a zero vector if unseen
    pub fn entry(&mut self, state: &StateKey) -> &mut ActionValues {
        self.values
            .entry(state.clone())
            .or_insert([0.0; SnakeAction::COUNT])
    }

    /// Action values for `state` without inserting
    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.values.get(state)
    }

    /// Number of known states
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.values.iter()
    }

    /// Epsilon-greedy action probabilities for `state`
    ///
    /// Every action gets `epsilon / |A|`; the greedy action (first index on
    /// ties) gets an extra `1 - epsilon`.
    pub fn policy(&mut self, state: &StateKey, epsilon: f64) -> ActionValues {
        let greedy = argmax(self.entry(state));
        let mut probabilities = [epsilon / SnakeAction::COUNT as f64; SnakeAction::COUNT];
        probabilities[greedy] += 1.0 - epsilon;
        probabilities
    }

    /// Highest-valued action for `state` (first on ties); unseen states
    /// resolve to the first action
    pub fn greedy_action(&self, state: &StateKey) -> SnakeAction {
        let index = self.get(state).map(argmax).unwrap_or(0);
        SnakeAction::ALL[index]
    }

    /// One-step Q-learning update, returns the TD error
    ///
    /// `target = reward + (0 if done else discount * max Q[next_state])` and
    /// `Q[state][action] += alpha * (target - Q[state][action])`.
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        state: &StateKey,
        action: SnakeAction,
        reward: f64,
        next_state: &StateKey,
        done: bool,
        alpha: f64,
        discount_factor: f64,
    ) -> f64 {
        let bootstrap = if done {
            0.0
        } else {
            let next = self.entry(next_state);
            next.iter().copied().fold(f64::NEG_INFINITY, f64::max)
        };
        let target = reward + discount_factor * bootstrap;

        let value = &mut self.entry(state)[action.index()];
        let td_error = target - *value;
        *value += alpha * td_error;
        td_error
    }

    /// Upsert every row of `other`, returns how many existing rows were replaced
    pub fn merge(&mut self, other: QTable) -> usize {
        let mut replaced = 0;
        for (state, values) in other.values {
            if self.values.insert(state, values).is_some() {
                replaced += 1;
            }
        }
        replaced
    }
}

fn argmax(values: &ActionValues) -> usize {
    let mut best = 0;
    for (index, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = index;
        }
    }
    best
}

/// Draw an action from a probability vector (inverse CDF, one uniform draw)
pub fn sample_action(probabilities: &ActionValues, rng: &mut impl RandomSource) -> SnakeAction {
    let draw = rng.unit();
    let mut cumulative = 0.0;
    for (index, probability) in probabilities.iter().enumerate() {
        cumulative += probability;
        if draw < cumulative {
            return SnakeAction::ALL[index];
        }
    }
    // rounding can leave the sum a hair under 1
    let last = probabilities
        .iter()
        .rposition(|&probability| probability > 0.0)
        .unwrap_or(SnakeAction::COUNT - 1);
    SnakeAction::ALL[last]
}
