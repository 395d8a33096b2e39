//! Moderation engine
//!
//! Enacts review decisions on contributed foods and flags. This module is
//! the only writer of `approval_status` and flag `status`: both follow a
//! one-way state machine out of their initial state, enforced with a
//! compare-and-set write so that of two concurrent reviewers only the
//! first wins.
//!
//! Approving a contribution cascades into exactly one meal for the
//! contributor, dated at submission time with the macros copied verbatim.
//! The status flip and the cascade commit or roll back together.
//! Upholding a flag does *not* remove the flagged content; removal is a
//! separate, explicit caller action.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{Database, DbError};
use crate::models::{
    ApprovalStatus, ContributedFood, ContributedFoodCreate, FlagContentType, FlagStatus,
    FlaggedContent, Meal, MealCreate,
};

/// Moderation error types
#[derive(Debug, Error)]
pub enum ModerationError {
    #[error("No such item: {0}")]
    NotFound(i64),

    #[error("Item {0} has already been reviewed")]
    AlreadyReviewed(i64),

    #[error("Invalid submission: {0}")]
    InvalidSubmission(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

/// A reviewer's verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

/// Outcome of reviewing a contribution
#[derive(Debug, Serialize)]
pub struct ContributionReview {
    pub food: ContributedFood,
    /// The meal created by the approval cascade; `None` on rejection
    pub meal: Option<Meal>,
}

/// Submit a new contributed food for review
pub fn submit_contribution(
    db: &Database,
    data: ContributedFoodCreate,
) -> Result<ContributedFood, ModerationError> {
    let name = data.name.trim().to_string();
    if name.is_empty() {
        return Err(ModerationError::InvalidSubmission(
            "name cannot be empty".to_string(),
        ));
    }
    if data.serving_size <= 0.0 {
        return Err(ModerationError::InvalidSubmission(
            "serving_size must be greater than 0".to_string(),
        ));
    }
    if data.serving_unit.trim().is_empty() {
        return Err(ModerationError::InvalidSubmission(
            "serving_unit cannot be empty".to_string(),
        ));
    }
    for (field, value) in [
        ("calories", data.calories),
        ("protein", data.protein),
        ("carbs", data.carbs),
        ("fats", data.fats),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ModerationError::InvalidSubmission(format!(
                "{} must be a non-negative number",
                field
            )));
        }
    }

    let conn = db.get_conn()?;
    let food = ContributedFood::create(&conn, &ContributedFoodCreate { name, ..data })?;

    tracing::debug!(food_id = food.id, "contribution submitted");
    Ok(food)
}

/// Review a pending contribution.
///
/// Approval flips the status and inserts exactly one meal for the
/// contributor in the same transaction; rejection flips the status and
/// nothing else. A second review of the same id fails with
/// `AlreadyReviewed` and performs no write.
pub fn review_contribution(
    db: &Database,
    food_id: i64,
    decision: ReviewDecision,
) -> Result<ContributionReview, ModerationError> {
    let mut conn = db.get_conn()?;
    let tx = conn.transaction().map_err(DbError::from)?;

    let food =
        ContributedFood::get_by_id(&tx, food_id)?.ok_or(ModerationError::NotFound(food_id))?;
    if food.approval_status.is_terminal() {
        return Err(ModerationError::AlreadyReviewed(food_id));
    }

    let to = match decision {
        ReviewDecision::Approve => ApprovalStatus::Approved,
        ReviewDecision::Reject => ApprovalStatus::Rejected,
    };

    // Check-then-write guard; only the first reviewer flips the row
    if !ContributedFood::try_set_status(&tx, food_id, to)? {
        return Err(ModerationError::AlreadyReviewed(food_id));
    }

    let meal = match decision {
        ReviewDecision::Approve => Some(Meal::create(
            &tx,
            &MealCreate {
                user_id: food.contributor_id,
                date: submission_date(&food.created_at),
                name: food.name.clone(),
                calories: food.macros.calories,
                protein: food.macros.protein,
                carbs: food.macros.carbs,
                fats: food.macros.fats,
                serving: Some(format!("{} {}", food.serving_size, food.serving_unit)),
            },
        )?),
        ReviewDecision::Reject => None,
    };

    tx.commit().map_err(DbError::from)?;

    tracing::info!(food_id, decision = ?decision, "contribution reviewed");
    Ok(ContributionReview {
        food: ContributedFood {
            approval_status: to,
            ..food
        },
        meal,
    })
}

/// Resolve an open flag.
///
/// `Approve` judges the flagged content acceptable (it stays live);
/// `Reject` upholds the flag. The flag must be addressed under its own
/// content type; a mismatched type behaves as `NotFound`.
pub fn review_flag(
    db: &Database,
    content_type: FlagContentType,
    flag_id: i64,
    decision: ReviewDecision,
) -> Result<FlaggedContent, ModerationError> {
    let conn = db.get_conn()?;

    let flag =
        FlaggedContent::get_by_id(&conn, flag_id)?.ok_or(ModerationError::NotFound(flag_id))?;
    if flag.content_type != content_type {
        return Err(ModerationError::NotFound(flag_id));
    }
    if flag.status.is_terminal() {
        return Err(ModerationError::AlreadyReviewed(flag_id));
    }

    let to = match decision {
        ReviewDecision::Approve => FlagStatus::ResolvedAccepted,
        ReviewDecision::Reject => FlagStatus::ResolvedUpheld,
    };

    if !FlaggedContent::try_resolve(&conn, content_type, flag_id, to)? {
        return Err(ModerationError::AlreadyReviewed(flag_id));
    }

    tracing::info!(flag_id, decision = ?decision, "flag resolved");
    Ok(FlaggedContent { status: to, ..flag })
}

/// List contributions awaiting review, oldest first
pub fn pending_contributions(db: &Database) -> Result<Vec<ContributedFood>, ModerationError> {
    let conn = db.get_conn()?;
    Ok(ContributedFood::list_pending(&conn)?)
}

/// List open flags, optionally restricted to one content type
pub fn open_flags(
    db: &Database,
    content_type: Option<FlagContentType>,
) -> Result<Vec<FlaggedContent>, ModerationError> {
    let conn = db.get_conn()?;
    Ok(FlaggedContent::list_open(&conn, content_type)?)
}

/// Extract the ISO date from a `datetime('now')` timestamp
fn submission_date(created_at: &str) -> String {
    NaiveDateTime::parse_from_str(created_at, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| created_at.chars().take(10).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{migrations, Database};
    use crate::models::FlagCreate;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(migrations::run_migrations).unwrap();
        db
    }

    fn oat_bar() -> ContributedFoodCreate {
        ContributedFoodCreate {
            name: "Oat Bar".to_string(),
            brand: Some("Granary".to_string()),
            barcode: None,
            calories: 200.0,
            protein: 6.0,
            carbs: 30.0,
            fats: 7.0,
            serving_size: 45.0,
            serving_unit: "g".to_string(),
            contributor_id: 7,
        }
    }

    #[test]
    fn test_approval_creates_one_meal_with_macros_copied() {
        let db = test_db();
        let food = submit_contribution(&db, oat_bar()).unwrap();
        assert_eq!(food.approval_status, ApprovalStatus::Pending);

        let review = review_contribution(&db, food.id, ReviewDecision::Approve).unwrap();
        assert_eq!(review.food.approval_status, ApprovalStatus::Approved);

        let meal = review.meal.expect("approval must create a meal");
        assert_eq!(meal.user_id, 7);
        assert_eq!(meal.name, "Oat Bar");
        assert_eq!(meal.macros.calories, 200.0);
        assert_eq!(meal.macros.protein, 6.0);
        assert_eq!(meal.date, submission_date(&food.created_at));

        // Exactly one meal exists for the contributor on that date
        let meals = db
            .with_conn(|conn| Meal::list_for_date(conn, 7, &meal.date))
            .unwrap();
        assert_eq!(meals.len(), 1);
    }

    #[test]
    fn test_second_review_fails_without_second_cascade() {
        let db = test_db();
        let food = submit_contribution(&db, oat_bar()).unwrap();

        let review = review_contribution(&db, food.id, ReviewDecision::Approve).unwrap();
        let date = review.meal.unwrap().date;

        let err = review_contribution(&db, food.id, ReviewDecision::Approve).unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyReviewed(_)));

        // Re-review with the opposite decision is also refused
        let err = review_contribution(&db, food.id, ReviewDecision::Reject).unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyReviewed(_)));

        let meals = db
            .with_conn(|conn| Meal::list_for_date(conn, 7, &date))
            .unwrap();
        assert_eq!(meals.len(), 1, "cascade must run at most once");
    }

    #[test]
    fn test_rejection_creates_no_meal() {
        let db = test_db();
        let food = submit_contribution(&db, oat_bar()).unwrap();

        let review = review_contribution(&db, food.id, ReviewDecision::Reject).unwrap();
        assert_eq!(review.food.approval_status, ApprovalStatus::Rejected);
        assert!(review.meal.is_none());

        let date = submission_date(&food.created_at);
        let meals = db
            .with_conn(|conn| Meal::list_for_date(conn, 7, &date))
            .unwrap();
        assert!(meals.is_empty());
    }

    #[test]
    fn test_review_unknown_contribution_is_not_found() {
        let db = test_db();
        let err = review_contribution(&db, 999, ReviewDecision::Approve).unwrap_err();
        assert!(matches!(err, ModerationError::NotFound(999)));
    }

    #[test]
    fn test_submission_validation() {
        let db = test_db();

        let mut bad = oat_bar();
        bad.name = "   ".to_string();
        assert!(matches!(
            submit_contribution(&db, bad),
            Err(ModerationError::InvalidSubmission(_))
        ));

        let mut bad = oat_bar();
        bad.calories = -5.0;
        assert!(matches!(
            submit_contribution(&db, bad),
            Err(ModerationError::InvalidSubmission(_))
        ));

        let mut bad = oat_bar();
        bad.serving_size = 0.0;
        assert!(matches!(
            submit_contribution(&db, bad),
            Err(ModerationError::InvalidSubmission(_))
        ));
    }

    #[test]
    fn test_flag_resolution_exactly_once() {
        let db = test_db();
        let flag = db
            .with_conn(|conn| {
                FlaggedContent::create(
                    conn,
                    &FlagCreate {
                        content_type: FlagContentType::Meals,
                        content_id: 42,
                        reason: "duplicate entry".to_string(),
                        reporter_id: 3,
                    },
                )
            })
            .unwrap();

        let resolved =
            review_flag(&db, FlagContentType::Meals, flag.id, ReviewDecision::Reject).unwrap();
        assert_eq!(resolved.status, FlagStatus::ResolvedUpheld);

        let err =
            review_flag(&db, FlagContentType::Meals, flag.id, ReviewDecision::Approve).unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyReviewed(_)));
    }

    #[test]
    fn test_flag_must_match_its_content_type() {
        let db = test_db();
        let flag = db
            .with_conn(|conn| {
                FlaggedContent::create(
                    conn,
                    &FlagCreate {
                        content_type: FlagContentType::Workouts,
                        content_id: 5,
                        reason: "nonsense data".to_string(),
                        reporter_id: 1,
                    },
                )
            })
            .unwrap();

        let err =
            review_flag(&db, FlagContentType::Meals, flag.id, ReviewDecision::Approve).unwrap_err();
        assert!(matches!(err, ModerationError::NotFound(_)));

        // Still open and resolvable under the right type
        let resolved = review_flag(
            &db,
            FlagContentType::Workouts,
            flag.id,
            ReviewDecision::Approve,
        )
        .unwrap();
        assert_eq!(resolved.status, FlagStatus::ResolvedAccepted);
    }

    #[test]
    fn test_queue_listings() {
        let db = test_db();
        let a = submit_contribution(&db, oat_bar()).unwrap();
        let b = submit_contribution(&db, oat_bar()).unwrap();

        let pending = pending_contributions(&db).unwrap();
        assert_eq!(
            pending.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![a.id, b.id]
        );

        review_contribution(&db, a.id, ReviewDecision::Reject).unwrap();
        let pending = pending_contributions(&db).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b.id);

        assert!(open_flags(&db, None).unwrap().is_empty());
    }

    #[test]
    fn test_open_flag_listing_with_and_without_type() {
        let db = test_db();
        let file = |content_type, content_id| {
            db.with_conn(|conn| {
                FlaggedContent::create(
                    conn,
                    &FlagCreate {
                        content_type,
                        content_id,
                        reason: "suspect values".to_string(),
                        reporter_id: 9,
                    },
                )
            })
            .unwrap()
        };
        let meal_flag = file(FlagContentType::Meals, 10);
        let workout_flag = file(FlagContentType::Workouts, 11);

        let all = open_flags(&db, None).unwrap();
        assert_eq!(
            all.iter().map(|f| f.id).collect::<Vec<_>>(),
            vec![meal_flag.id, workout_flag.id]
        );

        let workouts = open_flags(&db, Some(FlagContentType::Workouts)).unwrap();
        assert_eq!(workouts.len(), 1);
        assert_eq!(workouts[0].id, workout_flag.id);

        // Resolved flags leave the queue
        review_flag(
            &db,
            FlagContentType::Meals,
            meal_flag.id,
            ReviewDecision::Approve,
        )
        .unwrap();
        let all = open_flags(&db, None).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, workout_flag.id);
    }
}
