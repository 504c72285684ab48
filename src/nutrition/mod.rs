//! Nutrition core
//!
//! Pure functions over the records in [`crate::models`]: energy targets,
//! recipe composition, day aggregation and goal evaluation. Nothing here
//! touches the database or logs.

pub mod aggregator;
pub mod composer;
pub mod energy;
pub mod goal;

pub use aggregator::{add_entry, day_breakdown, day_totals, effective_portions, resolve_entry, EntryContribution};
pub use composer::{
    ingredient_breakdown, macros_of, per_serving, recipe_totals, scaled_by_portions, try_macros_of,
    IngredientLine,
};
pub use energy::{basal_metabolic_rate, compute_energy_targets, daily_adjustment, EnergyTargets};
pub use goal::{is_on_target, MacroProgress, Progress};
