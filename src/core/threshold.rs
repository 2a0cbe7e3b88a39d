//! Threshold crossing state machine
//!
//! Each tracked item carries one fired flag per threshold level. A level
//! fires once when the observed price reaches it (`>=`) and is re-armed
//! silently when the price is next observed strictly below it (`<`).
//!
//! ```text
//!            price >= level / emit event
//!   ARMED ───────────────────────────────▶ FIRED
//!     ▲                                      │
//!     └──────────────────────────────────────┘
//!            price < level / no event
//! ```
//!
//! The state is a plain value owned by the scheduler. Nothing here is
//! shared or synchronised.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::info;

use crate::config::TrackedItem;
use crate::core::events::NotificationEvent;

/// State/config mismatch detected during evaluation
#[derive(Error, Debug, PartialEq)]
pub enum ThresholdError {
    #[error("State for '{item}' tracks {state_levels} levels but the item has {item_levels}")]
    LevelCountMismatch {
        item: String,
        state_levels: usize,
        item_levels: usize,
    },

    #[error("No threshold state for item '{0}'")]
    UnknownItem(String),
}

/// Fired flags for one item, indexed like `TrackedItem::thresholds`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdState {
    fired: Vec<bool>,
}

impl ThresholdState {
    /// All levels armed
    pub fn new(item: &TrackedItem) -> Self {
        Self {
            fired: vec![false; item.thresholds.len()],
        }
    }

    pub fn is_fired(&self, level_index: usize) -> bool {
        self.fired.get(level_index).copied().unwrap_or(false)
    }

    pub fn fired_count(&self) -> usize {
        self.fired.iter().filter(|f| **f).count()
    }
}

/// Apply one observation to one item
///
/// Levels are visited in ascending price order. Every armed level at or
/// below `observed` fires and yields one event; every fired level above
/// `observed` is re-armed without an event.
pub fn evaluate(
    item: &TrackedItem,
    observed: f64,
    state: &mut ThresholdState,
    observed_at: DateTime<Utc>,
) -> Result<Vec<NotificationEvent>, ThresholdError> {
    if state.fired.len() != item.thresholds.len() {
        return Err(ThresholdError::LevelCountMismatch {
            item: item.id.clone(),
            state_levels: state.fired.len(),
            item_levels: item.thresholds.len(),
        });
    }

    let mut events = Vec::new();

    for (index, level) in item.thresholds.iter().enumerate() {
        let fired = &mut state.fired[index];

        if observed >= level.price {
            if !*fired {
                *fired = true;
                events.push(NotificationEvent::new(item, index, level, observed, observed_at));
            }
        } else if *fired {
            *fired = false;
            info!(
                item = %item.id,
                level = %level.name,
                target = level.price,
                observed = observed,
                "Reset {} threshold for {}", level.name, item.id
            );
        }
    }

    Ok(events)
}

/// Threshold state for a whole watchlist, indexed like the item slice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdBook {
    states: Vec<ThresholdState>,
}

impl ThresholdBook {
    pub fn new(items: &[TrackedItem]) -> Self {
        Self {
            states: items.iter().map(ThresholdState::new).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&ThresholdState> {
        self.states.get(index)
    }

    /// Evaluate `items[index]` against `observed`
    pub fn evaluate(
        &mut self,
        items: &[TrackedItem],
        index: usize,
        observed: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Vec<NotificationEvent>, ThresholdError> {
        let item = items
            .get(index)
            .ok_or_else(|| ThresholdError::UnknownItem(format!("#{}", index)))?;
        let state = self
            .states
            .get_mut(index)
            .ok_or_else(|| ThresholdError::UnknownItem(item.id.clone()))?;
        evaluate(item, observed, state, observed_at)
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
