use super::simd::{add_assign_i16, sub_assign_i16};
use super::HIDDEN_SIZE;

/// Dense first-layer activation for one perspective.
///
/// Holds the bias vector plus one weight row per active feature, in the
/// network's quantised i16 space. `refresh` rebuilds it from a full feature
/// list; `update` derives it from an earlier accumulator and the rows that
/// were added and removed in between, which is what makes per-move
/// evaluation O(changed features) instead of O(all features).
#[derive(Clone)]
pub struct Accumulator {
    values: [i16; HIDDEN_SIZE],
}

impl Accumulator {
    pub fn zeroed() -> Self {
        Self {
            values: [0; HIDDEN_SIZE],
        }
    }

    #[inline(always)]
    pub fn values(&self) -> &[i16; HIDDEN_SIZE] {
        &self.values
    }

    /// Rebuild from scratch: biases plus one weight row per active feature.
    pub fn refresh(&mut self, weights: &[i16], biases: &[i16], features: &[u16]) {
        debug_assert_eq!(biases.len(), HIDDEN_SIZE);
        self.values.copy_from_slice(biases);
        for &feature in features {
            add_assign_i16(&mut self.values, weight_row(weights, feature));
        }
    }

    /// Derive from `prev` by adding and removing feature rows.
    pub fn update(&mut self, prev: &Accumulator, weights: &[i16], added: &[u16], removed: &[u16]) {
        self.values = prev.values;
        for &feature in added {
            add_assign_i16(&mut self.values, weight_row(weights, feature));
        }
        for &feature in removed {
            sub_assign_i16(&mut self.values, weight_row(weights, feature));
        }
    }
}

impl Default for Accumulator {
    fn default() -> Self {
        Self::zeroed()
    }
}

#[inline(always)]
fn weight_row(weights: &[i16], feature: u16) -> &[i16] {
    let offset = feature as usize * HIDDEN_SIZE;
    &weights[offset..offset + HIDDEN_SIZE]
}
