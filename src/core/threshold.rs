// Pure low-stock crossing detection.
//
// Purpose
// - Turn one inventory snapshot plus the previously observed percentages into
//   the next percentages and the list of downward threshold crossings.
//
// Responsibilities
// - First snapshot against an empty cache only seeds, never alerts.
// - Alert once on ABOVE -> AT_OR_BELOW. Every other transition is silent.
// - Drop cache entries for items missing from the snapshot.
// - Never perform input or output.

use crate::core::inventory_record::{InventoryRecord, ItemId};
use std::collections::BTreeMap;

pub const LOW_STOCK_THRESHOLD_PERCENT: u8 = 20;

/// Prior percentage assumed for an item first seen after the cache was seeded.
const UNSEEN_PERCENT: u8 = 101;

pub type ThresholdCache = BTreeMap<ItemId, u8>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdState {
    Unseen,
    Above,
    AtOrBelow,
}

impl ThresholdState {
    pub fn of(percent: Option<u8>) -> Self {
        match percent {
            None => ThresholdState::Unseen,
            Some(p) if p <= LOW_STOCK_THRESHOLD_PERCENT => ThresholdState::AtOrBelow,
            Some(_) => ThresholdState::Above,
        }
    }
}

/// `round(100 * quantity / capacity)` clamped to 0..=100. Non-positive capacity is 0.
pub fn percent_remaining(quantity: i64, capacity: i64) -> u8 {
    if capacity <= 0 {
        return 0;
    }
    let pct = (quantity as f64 / capacity as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowStockCrossing {
    pub item_id: ItemId,
    pub name: String,
    pub location: String,
    pub percent: u8,
}

impl LowStockCrossing {
    pub fn title(&self) -> &'static str {
        "Low Stock Alert"
    }

    pub fn message(&self) -> String {
        if self.location.trim().is_empty() {
            format!("{} is down to {}% of its capacity.", self.name, self.percent)
        } else {
            format!(
                "{} in {} is down to {}% of its capacity.",
                self.name, self.location, self.percent
            )
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub cache: ThresholdCache,
    pub crossings: Vec<LowStockCrossing>,
}

pub fn observe_snapshot(previous: &ThresholdCache, snapshot: &[InventoryRecord]) -> Observation {
    if previous.is_empty() {
        let cache = snapshot
            .iter()
            .map(|item| (item.id.clone(), percent_remaining(item.quantity, item.capacity)))
            .collect();
        return Observation {
            cache,
            crossings: Vec::new(),
        };
    }

    let mut cache = ThresholdCache::new();
    let mut crossings = Vec::new();
    for item in snapshot {
        let percent = percent_remaining(item.quantity, item.capacity);
        let before = previous.get(&item.id).copied().unwrap_or(UNSEEN_PERCENT);
        let was_above = before > LOW_STOCK_THRESHOLD_PERCENT;
        let now_low = ThresholdState::of(Some(percent)) == ThresholdState::AtOrBelow;
        if was_above && now_low && item.capacity > 0 {
            crossings.push(LowStockCrossing {
                item_id: item.id.clone(),
                name: item.name.clone(),
                location: item.location.clone(),
                percent,
            });
        }
        // Rebuilding from the snapshot also prunes vanished items.
        cache.insert(item.id.clone(), percent);
    }
    Observation { cache, crossings }
}
