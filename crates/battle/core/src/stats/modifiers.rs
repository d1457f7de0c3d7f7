//! Per-participant modifier stack.
//!
//! Composition order is fixed:
//!
//! ```text
//! result = (base + Σadditive + Σ(base × percentage)) × Π(1 + multiplicative)
//! ```
//!
//! Percentage contributions always read the original base, never the
//! additive-adjusted value. Multiplicative entries compound over the
//! additive-adjusted base as a single product.

use std::collections::BTreeMap;

use super::Attribute;

/// How a modifier combines with the base value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "SCREAMING_SNAKE_CASE")
)]
pub enum ModifierKind {
    /// Flat amount added to the base.
    Additive,
    /// Factor `1 + value` applied after all additive contributions.
    Multiplicative,
    /// Fraction of the original base added alongside additive entries.
    Percentage,
}

/// One typed numeric contribution owned by a buff instance.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Modifier {
    pub owner: String,
    pub attribute: Attribute,
    pub value: f64,
    pub kind: ModifierKind,
}

/// Modifiers grouped by attribute.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModifierStack {
    entries: BTreeMap<Attribute, Vec<Modifier>>,
}

impl ModifierStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one entry under `owner`.
    pub fn add(
        &mut self,
        owner: impl Into<String>,
        attribute: Attribute,
        value: f64,
        kind: ModifierKind,
    ) {
        self.entries.entry(attribute).or_default().push(Modifier {
            owner: owner.into(),
            attribute,
            value,
            kind,
        });
    }

    /// Deletes every entry owned by `owner` across all attributes.
    ///
    /// Returns the number of removed entries. Attributes left without entries
    /// are dropped entirely.
    pub fn remove_owner(&mut self, owner: &str) -> usize {
        let mut removed = 0;
        self.entries.retain(|_, modifiers| {
            let before = modifiers.len();
            modifiers.retain(|m| m.owner != owner);
            removed += before - modifiers.len();
            !modifiers.is_empty()
        });
        removed
    }

    /// Deletes the entries `owner` registered on one attribute.
    pub fn remove_owner_attribute(&mut self, owner: &str, attribute: Attribute) -> usize {
        let Some(modifiers) = self.entries.get_mut(&attribute) else {
            return 0;
        };
        let before = modifiers.len();
        modifiers.retain(|m| m.owner != owner);
        let removed = before - modifiers.len();
        if modifiers.is_empty() {
            self.entries.remove(&attribute);
        }
        removed
    }

    /// Final value of `attribute` for the given base.
    pub fn calculate(&self, attribute: Attribute, base: f64) -> f64 {
        let Some(modifiers) = self.entries.get(&attribute) else {
            return base;
        };

        let mut additive = 0.0;
        let mut product = 1.0;
        for modifier in modifiers {
            match modifier.kind {
                ModifierKind::Additive => additive += modifier.value,
                ModifierKind::Percentage => additive += base * modifier.value,
                ModifierKind::Multiplicative => product *= 1.0 + modifier.value,
            }
        }

        (base + additive) * product
    }

    pub fn modifiers(&self, attribute: Attribute) -> &[Modifier] {
        self.entries
            .get(&attribute)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> + '_ {
        self.entries.values().flatten()
    }

    pub fn owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.iter().filter(move |m| m.owner == owner)
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composition_order() {
        let mut stack = ModifierStack::new();
        stack.add("a", Attribute::Atk, 10.0, ModifierKind::Additive);
        stack.add("b", Attribute::Atk, 0.2, ModifierKind::Percentage);
        stack.add("c", Attribute::Atk, 0.5, ModifierKind::Multiplicative);

        // (100 + 10 + 20) × 1.5
        assert_eq!(stack.calculate(Attribute::Atk, 100.0), 195.0);
    }

    #[test]
    fn percentage_reads_original_base() {
        let mut stack = ModifierStack::new();
        stack.add("a", Attribute::Def, 50.0, ModifierKind::Additive);
        stack.add("b", Attribute::Def, 0.5, ModifierKind::Percentage);

        // 0.5 of the original 100, not of 150
        assert_eq!(stack.calculate(Attribute::Def, 100.0), 200.0);
    }

    #[test]
    fn multiplicative_entries_compound() {
        let mut stack = ModifierStack::new();
        stack.add("a", Attribute::Spd, 0.5, ModifierKind::Multiplicative);
        stack.add("b", Attribute::Spd, -0.2, ModifierKind::Multiplicative);

        let value = stack.calculate(Attribute::Spd, 100.0);
        assert!((value - 120.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_attribute_returns_base() {
        let stack = ModifierStack::new();
        assert_eq!(stack.calculate(Attribute::CritRate, 0.05), 0.05);
    }

    #[test]
    fn remove_owner_clears_every_attribute() {
        let mut stack = ModifierStack::new();
        stack.add("berserk", Attribute::Atk, 100.0, ModifierKind::Additive);
        stack.add("berserk", Attribute::Def, -0.3, ModifierKind::Multiplicative);
        stack.add("other", Attribute::Atk, 5.0, ModifierKind::Additive);

        assert_eq!(stack.remove_owner("berserk"), 2);
        assert_eq!(stack.len(), 1);
        assert!(stack.modifiers(Attribute::Def).is_empty());
        assert_eq!(stack.calculate(Attribute::Atk, 10.0), 15.0);

        assert_eq!(stack.remove_owner("other"), 1);
        assert!(stack.is_empty());
    }

    #[test]
    fn remove_owner_attribute_is_scoped() {
        let mut stack = ModifierStack::new();
        stack.add("stone", Attribute::Spd, -0.15, ModifierKind::Multiplicative);
        stack.add("stone", Attribute::PhysicalDamageReduction, 0.3, ModifierKind::Multiplicative);

        assert_eq!(stack.remove_owner_attribute("stone", Attribute::Spd), 1);
        assert_eq!(stack.remove_owner_attribute("stone", Attribute::Spd), 0);
        assert_eq!(stack.len(), 1);
    }
}
