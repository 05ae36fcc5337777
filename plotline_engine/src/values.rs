//! Runtime value store.
//!
//! Holds a snapshot of a story's global values. Branches mutate the snapshot
//! through [`ValueChangeDef`]s; the story document itself is never touched.

use log::{debug, warn};
use plotline_data::{GlobalValueDef, ValueChangeDef, ValueOperation};

/// Global values for one playthrough, kept in story order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueStore {
    values: Vec<GlobalValueDef>,
}

impl ValueStore {
    /// Build a store from a story's value definitions, keeping any stored overrides.
    pub fn from_defs(defs: &[GlobalValueDef]) -> Self {
        Self { values: defs.to_vec() }
    }

    /// Values as definitions, suitable for condition evaluation.
    pub fn as_defs(&self) -> &[GlobalValueDef] {
        &self.values
    }

    pub fn get(&self, id: &str) -> Option<&GlobalValueDef> {
        self.values.iter().find(|v| v.id == id)
    }

    /// `currentValue ?? initialValue` for the given id.
    pub fn current(&self, id: &str) -> Option<f64> {
        self.get(id).map(GlobalValueDef::effective)
    }

    /// Apply one change and return the new value, or `None` if the id is unknown.
    pub fn apply(&mut self, change: &ValueChangeDef) -> Option<f64> {
        let Some(value) = self.values.iter_mut().find(|v| v.id == change.value_id) else {
            warn!("value change skipped: unknown value id '{}'", change.value_id);
            return None;
        };
        let before = value.effective();
        let after = match change.operation {
            ValueOperation::Add => before + change.value,
            ValueOperation::Subtract => before - change.value,
            ValueOperation::Set => change.value,
        };
        value.current_value = Some(after);
        debug!("value '{}' {before} -> {after}", value.id);
        Some(after)
    }

    pub fn apply_all(&mut self, changes: &[ValueChangeDef]) {
        for change in changes {
            self.apply(change);
        }
    }

    /// Drop every runtime override so values read their initial value again.
    pub fn reset(&mut self) {
        for value in &mut self.values {
            value.current_value = None;
        }
    }
}
