//! Daily aggregator
//!
//! Sums a user's logged meals for one date into nutrition totals and
//! compares them against a stored goal. Totals are never persisted;
//! every read recomputes from the current meal set, so the totals always
//! equal the arithmetic sum of the surviving meals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::{Database, DbResult};
use crate::models::{MacroTotals, Meal, NutritionGoal};

/// Progress toward one nutrient target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientProgress {
    /// Percent of the target reached, capped at 100
    pub percent: f64,
    /// True when the target is zero or unset; percent is 0 rather than a
    /// division against zero, and the caller should render it as
    /// indeterminate instead of "0% achieved"
    pub indeterminate: bool,
}

/// Per-nutrient progress for one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub calories: NutrientProgress,
    pub protein: NutrientProgress,
    pub carbs: NutrientProgress,
    pub fats: NutrientProgress,
}

/// Sum macro totals across a set of meals.
/// Non-finite values count as 0.
pub fn aggregate(meals: &[Meal]) -> MacroTotals {
    meals.iter().map(|m| m.macros).sum()
}

/// Fetch a user's meals for a date and aggregate them
pub fn daily_totals(db: &Database, user_id: i64, date: NaiveDate) -> DbResult<MacroTotals> {
    let date = date.format("%Y-%m-%d").to_string();
    let meals = db.with_conn(|conn| Meal::list_for_date(conn, user_id, &date))?;
    Ok(aggregate(&meals))
}

/// Compare totals against a goal, nutrient by nutrient
pub fn progress(totals: &MacroTotals, goal: &NutritionGoal) -> ProgressReport {
    ProgressReport {
        calories: nutrient_progress(totals.calories, goal.calories),
        protein: nutrient_progress(totals.protein, goal.protein_g),
        carbs: nutrient_progress(totals.carbs, goal.carbs_g),
        fats: nutrient_progress(totals.fats, goal.fat_g),
    }
}

fn nutrient_progress(total: f64, target: f64) -> NutrientProgress {
    if target <= 0.0 || !target.is_finite() {
        return NutrientProgress {
            percent: 0.0,
            indeterminate: true,
        };
    }
    NutrientProgress {
        percent: (100.0 * total / target).min(100.0),
        indeterminate: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, Database};
    use crate::models::MealCreate;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(migrations::run_migrations).unwrap();
        db
    }

    fn meal(user_id: i64, date: &str, name: &str, calories: f64, protein: f64) -> MealCreate {
        MealCreate {
            user_id,
            date: date.to_string(),
            name: name.to_string(),
            calories,
            protein,
            carbs: 0.0,
            fats: 0.0,
            serving: None,
        }
    }

    #[test]
    fn test_totals_track_add_and_remove() {
        let db = test_db();
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();

        let first = db
            .with_conn(|conn| Meal::create(conn, &meal(1, "2025-01-09", "Porridge", 350.0, 12.0)))
            .unwrap();
        db.with_conn(|conn| Meal::create(conn, &meal(1, "2025-01-09", "Salad", 150.0, 4.0)))
            .unwrap();
        // Another user and another date stay out of the sum
        db.with_conn(|conn| Meal::create(conn, &meal(2, "2025-01-09", "Burger", 800.0, 30.0)))
            .unwrap();
        db.with_conn(|conn| Meal::create(conn, &meal(1, "2025-01-10", "Toast", 200.0, 6.0)))
            .unwrap();

        let totals = daily_totals(&db, 1, date).unwrap();
        assert_eq!(totals.calories, 500.0);
        assert_eq!(totals.protein, 16.0);

        // Removing a meal is reflected on the next read; no cached total
        db.with_conn(|conn| Meal::delete(conn, 1, first.id)).unwrap();
        let totals = daily_totals(&db, 1, date).unwrap();
        assert_eq!(totals.calories, 150.0);
        assert_eq!(totals.protein, 4.0);
    }

    #[test]
    fn test_empty_day_sums_to_zero() {
        let db = test_db();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(daily_totals(&db, 1, date).unwrap(), MacroTotals::zero());
    }

    #[test]
    fn test_non_finite_fields_count_as_zero() {
        let meals = vec![
            Meal {
                id: 1,
                user_id: 1,
                date: "2025-01-09".to_string(),
                name: "Odd".to_string(),
                macros: MacroTotals {
                    calories: f64::NAN,
                    protein: f64::INFINITY,
                    carbs: 10.0,
                    fats: 2.0,
                },
                serving: None,
                created_at: String::new(),
            },
            Meal {
                id: 2,
                user_id: 1,
                date: "2025-01-09".to_string(),
                name: "Plain".to_string(),
                macros: MacroTotals {
                    calories: 100.0,
                    protein: 5.0,
                    carbs: 0.0,
                    fats: 0.0,
                },
                serving: None,
                created_at: String::new(),
            },
        ];

        let totals = aggregate(&meals);
        assert_eq!(totals.calories, 100.0);
        assert_eq!(totals.protein, 5.0);
        assert_eq!(totals.carbs, 10.0);
    }

    fn goal(calories: f64, protein: f64, carbs: f64, fats: f64) -> NutritionGoal {
        NutritionGoal {
            user_id: 1,
            calories,
            protein_g: protein,
            carbs_g: carbs,
            fat_g: fats,
            updated_at: String::new(),
        }
    }

    #[test]
    fn test_progress_caps_at_100() {
        let totals = MacroTotals {
            calories: 2500.0,
            protein: 75.0,
            carbs: 100.0,
            fats: 30.0,
        };
        let report = progress(&totals, &goal(2000.0, 150.0, 200.0, 60.0));

        assert_eq!(report.calories.percent, 100.0);
        assert_eq!(report.protein.percent, 50.0);
        assert_eq!(report.carbs.percent, 50.0);
        assert_eq!(report.fats.percent, 50.0);
        assert!(!report.calories.indeterminate);
    }

    #[test]
    fn test_zero_goal_is_indeterminate_not_a_division() {
        let totals = MacroTotals {
            calories: 500.0,
            protein: 20.0,
            carbs: 0.0,
            fats: 0.0,
        };
        let report = progress(&totals, &goal(0.0, 150.0, 200.0, 60.0));

        assert!(report.calories.indeterminate);
        assert_eq!(report.calories.percent, 0.0);
        assert!(!report.protein.indeterminate);
    }

    #[test]
    fn test_progress_against_a_stored_computed_goal() {
        use crate::goals::{compute_goal, SplitTable};
        use crate::models::{ActivityLevel, FitnessGoal, ProfileUpdate, Sex, UserProfile};

        let db = test_db();
        let profile = db
            .with_conn(|conn| {
                UserProfile::upsert(
                    conn,
                    1,
                    &ProfileUpdate {
                        weight_kg: Some(70.0),
                        height_cm: Some(175.0),
                        age_years: Some(30),
                        sex: Some(Sex::Male),
                        activity_level: Some(ActivityLevel::ModeratelyActive),
                        fitness_goal: Some(FitnessGoal::WeightLoss),
                    },
                )
            })
            .unwrap();

        // Caller computes and caches the goal
        let computed = compute_goal(&profile, &SplitTable::default()).unwrap();
        let stored = db
            .with_conn(|conn| {
                NutritionGoal::upsert(
                    conn,
                    1,
                    computed.calories,
                    computed.protein_g,
                    computed.carbs_g,
                    computed.fat_g,
                )
            })
            .unwrap();
        assert_eq!(stored.calories, 2056.0);

        db.with_conn(|conn| Meal::create(conn, &meal(1, "2025-01-09", "Stew", 1028.0, 0.0)))
            .unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        let report = progress(&daily_totals(&db, 1, date).unwrap(), &stored);
        assert_eq!(report.calories.percent, 50.0);
    }

    #[test]
    fn test_approved_contribution_feeds_daily_totals() {
        use crate::moderation::{self, ReviewDecision};
        use crate::models::ContributedFoodCreate;

        let db = test_db();
        let food = moderation::submit_contribution(
            &db,
            ContributedFoodCreate {
                name: "Oat Bar".to_string(),
                brand: None,
                barcode: None,
                calories: 200.0,
                protein: 6.0,
                carbs: 30.0,
                fats: 7.0,
                serving_size: 45.0,
                serving_unit: "g".to_string(),
                contributor_id: 1,
            },
        )
        .unwrap();

        let review = moderation::review_contribution(&db, food.id, ReviewDecision::Approve).unwrap();
        let date =
            NaiveDate::parse_from_str(&review.meal.unwrap().date, "%Y-%m-%d").unwrap();

        let totals = daily_totals(&db, 1, date).unwrap();
        assert_eq!(totals.calories, 200.0);
    }
}
