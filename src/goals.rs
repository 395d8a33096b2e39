//! Goal engine
//!
//! Pure computation of daily calorie and macronutrient targets from a
//! user profile. Nothing here touches storage; callers decide whether to
//! cache the result (see `models::NutritionGoal`).
//!
//! The calorie target is Mifflin-St Jeor BMR, scaled by an activity
//! multiplier, adjusted by the stated fitness goal, and rounded to the
//! nearest whole calorie. Macro targets split the calorie target by a
//! configurable per-goal table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ActivityLevel, FitnessGoal, Sex, UserProfile};

/// Calories per gram of protein and carbohydrate
const KCAL_PER_G_PROTEIN_CARB: f64 = 4.0;
/// Calories per gram of fat
const KCAL_PER_G_FAT: f64 = 9.0;

/// Goal computation error types
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("Profile incomplete: missing {}", .missing.join(", "))]
    IncompleteProfile { missing: Vec<&'static str> },

    #[error("Invalid macro split: {0}")]
    InvalidSplit(String),
}

/// How a calorie target divides into protein/carb/fat calories.
/// Fractions are of total calories and must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl MacroSplit {
    /// Build a split, validating the fractions
    pub fn new(protein: f64, carbs: f64, fats: f64) -> Result<Self, GoalError> {
        let split = Self {
            protein,
            carbs,
            fats,
        };
        for (name, v) in [("protein", protein), ("carbs", carbs), ("fats", fats)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(GoalError::InvalidSplit(format!(
                    "{} fraction {} out of range",
                    name, v
                )));
            }
        }
        let sum = protein + carbs + fats;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(GoalError::InvalidSplit(format!(
                "fractions sum to {}, expected 1",
                sum
            )));
        }
        Ok(split)
    }

    /// Conventional 30% protein / 40% carb / 30% fat split
    pub fn conventional() -> Self {
        Self {
            protein: 0.30,
            carbs: 0.40,
            fats: 0.30,
        }
    }
}

/// Per-goal macro split policy with a fallback default
#[derive(Debug, Clone)]
pub struct SplitTable {
    default: MacroSplit,
    per_goal: HashMap<FitnessGoal, MacroSplit>,
}

impl SplitTable {
    pub fn new(default: MacroSplit) -> Self {
        Self {
            default,
            per_goal: HashMap::new(),
        }
    }

    /// Override the split for one fitness goal
    pub fn with_goal(mut self, goal: FitnessGoal, split: MacroSplit) -> Self {
        self.per_goal.insert(goal, split);
        self
    }

    /// The split to use for a (possibly unstated) fitness goal
    pub fn split_for(&self, goal: Option<FitnessGoal>) -> MacroSplit {
        goal.and_then(|g| self.per_goal.get(&g).copied())
            .unwrap_or(self.default)
    }
}

impl Default for SplitTable {
    fn default() -> Self {
        Self::new(MacroSplit::conventional())
    }
}

/// Computed daily targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComputedGoal {
    /// Rounded to the nearest whole calorie
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Activity multiplier applied to BMR
fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
    }
}

/// Calorie adjustment for the stated goal
fn goal_adjustment(goal: Option<FitnessGoal>) -> f64 {
    match goal {
        Some(FitnessGoal::WeightLoss) => -500.0,
        Some(FitnessGoal::MuscleGain) => 300.0,
        Some(FitnessGoal::Endurance) => 200.0,
        Some(FitnessGoal::Maintenance) | Some(FitnessGoal::GeneralFitness) | None => 0.0,
    }
}

/// Mifflin-St Jeor basal metabolic rate.
/// The sex offset is +5 for male, -161 otherwise (unstated sex included).
fn bmr(weight_kg: f64, height_cm: f64, age_years: f64, sex: Option<Sex>) -> f64 {
    let offset = match sex {
        Some(Sex::Male) => 5.0,
        _ => -161.0,
    };
    10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years + offset
}

/// Compute daily calorie and macro targets for a profile.
///
/// Deterministic: identical profiles and split tables always yield
/// identical output. Fails with `IncompleteProfile` naming every missing
/// required field so the caller can prompt for completion.
pub fn compute_goal(profile: &UserProfile, splits: &SplitTable) -> Result<ComputedGoal, GoalError> {
    let mut missing = Vec::new();
    if profile.weight_kg.is_none() {
        missing.push("weight_kg");
    }
    if profile.height_cm.is_none() {
        missing.push("height_cm");
    }
    if profile.age_years.is_none() {
        missing.push("age_years");
    }
    if profile.activity_level.is_none() {
        missing.push("activity_level");
    }
    if !missing.is_empty() {
        return Err(GoalError::IncompleteProfile { missing });
    }

    let weight = profile.weight_kg.unwrap_or_default();
    let height = profile.height_cm.unwrap_or_default();
    let age = profile.age_years.unwrap_or_default() as f64;
    let activity = profile.activity_level.unwrap_or(ActivityLevel::LightlyActive);

    let tdee = bmr(weight, height, age, profile.sex) * activity_multiplier(activity);
    let calories = (tdee + goal_adjustment(profile.fitness_goal)).round();

    let split = splits.split_for(profile.fitness_goal);
    Ok(ComputedGoal {
        calories,
        protein_g: (calories * split.protein / KCAL_PER_G_PROTEIN_CARB).round(),
        carbs_g: (calories * split.carbs / KCAL_PER_G_PROTEIN_CARB).round(),
        fat_g: (calories * split.fats / KCAL_PER_G_FAT).round(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(goal: Option<FitnessGoal>) -> UserProfile {
        UserProfile {
            user_id: 1,
            weight_kg: Some(70.0),
            height_cm: Some(175.0),
            age_years: Some(30),
            sex: Some(Sex::Male),
            activity_level: Some(ActivityLevel::ModeratelyActive),
            fitness_goal: goal,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_reference_bmr_vector() {
        // 10*70 + 6.25*175 - 5*30 + 5 = 1648.75
        assert!((bmr(70.0, 175.0, 30.0, Some(Sex::Male)) - 1648.75).abs() < 1e-9);
        // Female offset
        assert!((bmr(70.0, 175.0, 30.0, Some(Sex::Female)) - 1482.75).abs() < 1e-9);
        // Unstated sex uses the -161 offset
        assert!((bmr(70.0, 175.0, 30.0, None) - 1482.75).abs() < 1e-9);
    }

    #[test]
    fn test_weight_loss_goal_from_reference_vector() {
        // TDEE = 1648.75 * 1.55 = 2555.5625; -500 -> 2055.5625 -> 2056
        let goal = compute_goal(
            &profile(Some(FitnessGoal::WeightLoss)),
            &SplitTable::default(),
        )
        .unwrap();
        assert_eq!(goal.calories, 2056.0);
        // Conventional split: 30/40/30 at 4/4/9 kcal per gram
        assert_eq!(goal.protein_g, (2056.0 * 0.30 / 4.0_f64).round());
        assert_eq!(goal.carbs_g, (2056.0 * 0.40 / 4.0_f64).round());
        assert_eq!(goal.fat_g, (2056.0 * 0.30 / 9.0_f64).round());
    }

    #[test]
    fn test_goal_adjustments() {
        let table = SplitTable::default();
        let base = compute_goal(&profile(Some(FitnessGoal::Maintenance)), &table)
            .unwrap()
            .calories;

        let gain = compute_goal(&profile(Some(FitnessGoal::MuscleGain)), &table)
            .unwrap()
            .calories;
        assert_eq!(gain, base + 300.0);

        let endurance = compute_goal(&profile(Some(FitnessGoal::Endurance)), &table)
            .unwrap()
            .calories;
        assert_eq!(endurance, base + 200.0);

        // General fitness and unstated goal carry no adjustment
        let general = compute_goal(&profile(Some(FitnessGoal::GeneralFitness)), &table)
            .unwrap()
            .calories;
        assert_eq!(general, base);
        let unstated = compute_goal(&profile(None), &table).unwrap().calories;
        assert_eq!(unstated, base);
    }

    #[test]
    fn test_deterministic() {
        let p = profile(Some(FitnessGoal::WeightLoss));
        let table = SplitTable::default();
        let a = compute_goal(&p, &table).unwrap();
        let b = compute_goal(&p, &table).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_incomplete_profile_names_missing_fields() {
        let mut p = profile(None);
        p.weight_kg = None;
        p.activity_level = None;

        let err = compute_goal(&p, &SplitTable::default()).unwrap_err();
        match err {
            GoalError::IncompleteProfile { missing } => {
                assert_eq!(missing, vec!["weight_kg", "activity_level"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unrecognized_strings_fall_back() {
        // Unknown activity strings decode to lightly_active (x1.375)
        assert_eq!(ActivityLevel::from_str("hyperactive"), ActivityLevel::LightlyActive);
        assert_eq!(activity_multiplier(ActivityLevel::from_str("hyperactive")), 1.375);
        // Unknown goal strings decode to general fitness (no adjustment)
        let goal = FitnessGoal::from_str("bulking");
        assert_eq!(goal, FitnessGoal::GeneralFitness);
        assert_eq!(goal_adjustment(Some(goal)), 0.0);
    }

    #[test]
    fn test_split_table_override_and_validation() {
        let high_protein = MacroSplit::new(0.40, 0.35, 0.25).unwrap();
        let table = SplitTable::default().with_goal(FitnessGoal::MuscleGain, high_protein);

        assert_eq!(
            table.split_for(Some(FitnessGoal::MuscleGain)),
            high_protein
        );
        assert_eq!(
            table.split_for(Some(FitnessGoal::WeightLoss)),
            MacroSplit::conventional()
        );
        assert_eq!(table.split_for(None), MacroSplit::conventional());

        assert!(MacroSplit::new(0.5, 0.5, 0.5).is_err());
        assert!(MacroSplit::new(-0.1, 0.6, 0.5).is_err());
    }
}
