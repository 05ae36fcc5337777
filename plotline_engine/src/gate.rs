//! Unlock gate for choice options and scenes.
//!
//! A locked option or scene opens when its unlock conditions hold. A lock with no
//! conditions can only be opened by paying its unlock price; the condition
//! evaluator still treats an empty list as satisfied, the gate just never consults it.

use plotline_data::{ChoiceOptionDef, ConditionDef, GlobalValueDef, SceneDef};
use variantly::Variantly;

use crate::condition::evaluate_conditions;

/// How a gated option or scene may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Variantly)]
pub enum Access {
    /// Not locked.
    Open,
    /// Locked, but its conditions hold.
    Unlocked,
    /// Locked; can be bought for the given price.
    Purchasable(f64),
    /// Locked with no way in.
    Locked,
}

impl Access {
    /// Freely selectable without a purchase.
    pub fn is_selectable(self) -> bool {
        matches!(self, Access::Open | Access::Unlocked)
    }
}

/// Anything carrying the `locked` / `unlockPrice` / `unlockConditions` triple.
pub trait Lockable {
    fn locked(&self) -> bool;
    fn unlock_price(&self) -> Option<f64>;
    fn unlock_conditions(&self) -> &[ConditionDef];
}

impl Lockable for ChoiceOptionDef {
    fn locked(&self) -> bool {
        self.locked
    }
    fn unlock_price(&self) -> Option<f64> {
        self.unlock_price
    }
    fn unlock_conditions(&self) -> &[ConditionDef] {
        &self.unlock_conditions
    }
}

impl Lockable for SceneDef {
    fn locked(&self) -> bool {
        self.locked
    }
    fn unlock_price(&self) -> Option<f64> {
        self.unlock_price
    }
    fn unlock_conditions(&self) -> &[ConditionDef] {
        &self.unlock_conditions
    }
}

/// Decide how a gated option or scene can be entered given the current values.
pub fn access<L: Lockable + ?Sized>(gated: &L, values: &[GlobalValueDef]) -> Access {
    if !gated.locked() {
        return Access::Open;
    }
    let conditions = gated.unlock_conditions();
    if !conditions.is_empty() && evaluate_conditions(conditions, values) {
        return Access::Unlocked;
    }
    match gated.unlock_price() {
        Some(price) => Access::Purchasable(price),
        None => Access::Locked,
    }
}

pub fn option_access(option: &ChoiceOptionDef, values: &[GlobalValueDef]) -> Access {
    access(option, values)
}

pub fn scene_access(scene: &SceneDef, values: &[GlobalValueDef]) -> Access {
    access(scene, values)
}
