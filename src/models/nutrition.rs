//! Shared macronutrient totals
//!
//! Used across contributed foods, meals, and daily aggregation.

use serde::{Deserialize, Serialize};

/// Macronutrient totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroTotals {
    pub calories: f64,
    pub protein: f64, // grams
    pub carbs: f64,   // grams
    pub fats: f64,    // grams
}

impl MacroTotals {
    /// Create a new MacroTotals with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add another set of totals to this one
    pub fn add(&self, other: &MacroTotals) -> Self {
        Self {
            calories: self.calories + other.calories,
            protein: self.protein + other.protein,
            carbs: self.carbs + other.carbs,
            fats: self.fats + other.fats,
        }
    }

    /// Replace non-finite fields with 0.
    ///
    /// Catalog and lookup data is heterogeneous; NaN or infinite values
    /// count as "missing" and contribute nothing to a sum.
    pub fn sanitized(&self) -> Self {
        fn clean(v: f64) -> f64 {
            if v.is_finite() {
                v
            } else {
                0.0
            }
        }
        Self {
            calories: clean(self.calories),
            protein: clean(self.protein),
            carbs: clean(self.carbs),
            fats: clean(self.fats),
        }
    }
}

impl std::ops::Add for MacroTotals {
    type Output = MacroTotals;

    fn add(self, other: MacroTotals) -> MacroTotals {
        MacroTotals::add(&self, &other)
    }
}

impl std::iter::Sum for MacroTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(MacroTotals::zero(), |acc, n| acc + n.sanitized())
    }
}
