//! Titles earned from global values.

use plotline_data::{GlobalValueDef, TitleDef};

use crate::condition::evaluate_conditions;

/// True if every condition of the title holds. A title with no conditions is always earned.
pub fn title_unlocked(title: &TitleDef, values: &[GlobalValueDef]) -> bool {
    evaluate_conditions(&title.conditions, values)
}

/// The titles earned with the given values, in declaration order.
pub fn earned_titles<'a>(titles: &'a [TitleDef], values: &[GlobalValueDef]) -> Vec<&'a TitleDef> {
    titles.iter().filter(|t| title_unlocked(t, values)).collect()
}
