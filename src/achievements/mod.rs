//! Achievement catalog and award engine

pub mod definitions;
pub mod engine;

pub use definitions::{AchievementDef, AchievementSlug, CATALOG};
pub use engine::{award_if_unearned, evaluate, EvalContext, PageView};
