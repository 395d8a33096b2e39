//! Data models
//!
//! Rust structs representing the content registry's database entities.

mod catalog;
mod contributed_food;
mod flag;
mod goal;
mod meal;
mod nutrition;
mod profile;

pub use catalog::{Difficulty, Exercise, ExerciseCreate, Muscle, MuscleGroup};
pub use contributed_food::{ApprovalStatus, ContributedFood, ContributedFoodCreate};
pub use flag::{FlagContentType, FlagCreate, FlagStatus, FlaggedContent};
pub use goal::NutritionGoal;
pub use meal::{Meal, MealCreate};
pub use nutrition::MacroTotals;
pub use profile::{ActivityLevel, FitnessGoal, ProfileUpdate, Sex, UserProfile};
