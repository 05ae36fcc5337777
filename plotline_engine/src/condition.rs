//! condition.rs -- global value condition evaluator
//!
//! Tests `(value, operator, target)` triples against a value snapshot. Used by the
//! unlock gate for options and scenes, and by the titles evaluator.

use plotline_data::{ComparisonOp, ConditionDef, GlobalValueDef};

/// Compare a resolved value against a target with the named operator.
#[allow(clippy::float_cmp)]
pub fn compare(op: ComparisonOp, actual: f64, target: f64) -> bool {
    match op {
        ComparisonOp::Gt => actual > target,
        ComparisonOp::Lt => actual < target,
        ComparisonOp::Eq => actual == target,
        ComparisonOp::Gte => actual >= target,
        ComparisonOp::Lte => actual <= target,
        ComparisonOp::Unknown => false,
    }
}

/// Returns true if the condition holds. An unknown value id never satisfies a condition.
pub fn evaluate_condition(cond: &ConditionDef, values: &[GlobalValueDef]) -> bool {
    values
        .iter()
        .find(|v| v.id == cond.value_id)
        .is_some_and(|v| compare(cond.operator, v.effective(), cond.target_value))
}

/// Logical AND over all conditions. An empty list is satisfied.
pub fn evaluate_conditions(conds: &[ConditionDef], values: &[GlobalValueDef]) -> bool {
    conds.iter().all(|cond| evaluate_condition(cond, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(id: &str, initial: f64, current: Option<f64>) -> GlobalValueDef {
        GlobalValueDef {
            id: id.into(),
            name: id.into(),
            initial_value: initial,
            current_value: current,
            value_type: None,
        }
    }

    fn cond(id: &str, operator: ComparisonOp, target: f64) -> ConditionDef {
        ConditionDef {
            value_id: id.into(),
            operator,
            target_value: target,
        }
    }

    #[test]
    fn gt_is_strict_on_initial_value() {
        let values = [value("v", 5.0, None)];
        assert!(!evaluate_condition(&cond("v", ComparisonOp::Gt, 5.0), &values));
    }

    #[test]
    fn current_value_overrides_initial() {
        let values = [value("v", 5.0, Some(6.0))];
        assert!(evaluate_condition(&cond("v", ComparisonOp::Gt, 5.0), &values));
    }

    #[test]
    fn every_operator_compares_as_named() {
        let values = [value("v", 3.0, None)];
        assert!(evaluate_condition(&cond("v", ComparisonOp::Lt, 4.0), &values));
        assert!(evaluate_condition(&cond("v", ComparisonOp::Eq, 3.0), &values));
        assert!(evaluate_condition(&cond("v", ComparisonOp::Gte, 3.0), &values));
        assert!(evaluate_condition(&cond("v", ComparisonOp::Lte, 3.0), &values));
        assert!(!evaluate_condition(&cond("v", ComparisonOp::Lte, 2.0), &values));
        assert!(!evaluate_condition(&cond("v", ComparisonOp::Unknown, 3.0), &values));
    }

    #[test]
    fn unknown_value_is_false_for_all_operators() {
        let values = [value("v", 3.0, None)];
        for op in [
            ComparisonOp::Gt,
            ComparisonOp::Lt,
            ComparisonOp::Eq,
            ComparisonOp::Gte,
            ComparisonOp::Lte,
            ComparisonOp::Unknown,
        ] {
            assert!(!evaluate_condition(&cond("ghost", op, 0.0), &values), "{op:?}");
        }
    }

    #[test]
    fn list_is_a_logical_and() {
        let values = [value("a", 1.0, None), value("b", 10.0, None)];
        let both = [cond("a", ComparisonOp::Eq, 1.0), cond("b", ComparisonOp::Gt, 5.0)];
        let one_fails = [cond("a", ComparisonOp::Eq, 1.0), cond("b", ComparisonOp::Lt, 5.0)];
        assert!(evaluate_conditions(&both, &values));
        assert!(!evaluate_conditions(&one_fails, &values));
        assert!(evaluate_conditions(&[], &values));
    }
}
