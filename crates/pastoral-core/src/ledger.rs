//! Global resource ledger.
//!
//! Per-building inventories are the source of truth; the ledger is a running
//! projection of them for the HUD. Every change goes through [`ResourceLedger::credit`]
//! or [`ResourceLedger::debit`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::components::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Commodity {
    Log,
    Stone,
    Iron,
    Salt,
    Wool,
    Barley,
    Flour,
    Malt,
    /// Shown on the HUD; nothing produces it yet.
    Meat,
}

impl Commodity {
    pub const ALL: [Commodity; 9] = [
        Commodity::Log,
        Commodity::Stone,
        Commodity::Iron,
        Commodity::Salt,
        Commodity::Wool,
        Commodity::Barley,
        Commodity::Flour,
        Commodity::Malt,
        Commodity::Meat,
    ];
}

impl From<ResourceKind> for Commodity {
    fn from(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Log => Commodity::Log,
            ResourceKind::Stone => Commodity::Stone,
            ResourceKind::Iron => Commodity::Iron,
            ResourceKind::Salt => Commodity::Salt,
            ResourceKind::Wool => Commodity::Wool,
            ResourceKind::Barley => Commodity::Barley,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceLedger {
    counts: BTreeMap<Commodity, u32>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, commodity: Commodity) -> u32 {
        self.counts.get(&commodity).copied().unwrap_or(0)
    }

    pub fn credit(&mut self, commodity: impl Into<Commodity>, amount: u32) {
        if amount == 0 {
            return;
        }
        *self.counts.entry(commodity.into()).or_insert(0) += amount;
    }

    pub fn debit(&mut self, commodity: impl Into<Commodity>, amount: u32) {
        let entry = self.counts.entry(commodity.into()).or_insert(0);
        *entry = entry.saturating_sub(amount);
    }

    /// Totals for every commodity, including zeros, in HUD order.
    pub fn totals(&self) -> Vec<(Commodity, u32)> {
        Commodity::ALL.iter().map(|c| (*c, self.get(*c))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_and_debit() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Log, 3);
        ledger.credit(Commodity::Flour, 2);
        ledger.debit(ResourceKind::Log, 1);
        ledger.debit(Commodity::Malt, 5);
        assert_eq!(ledger.get(Commodity::Log), 2);
        assert_eq!(ledger.get(Commodity::Flour), 2);
        assert_eq!(ledger.get(Commodity::Malt), 0);
    }

    #[test]
    fn test_totals_include_meat() {
        let totals = ResourceLedger::new().totals();
        assert_eq!(totals.len(), 9);
        assert_eq!(totals.last(), Some(&(Commodity::Meat, 0)));
    }
}
