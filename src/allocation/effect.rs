//! Additive economic effects and the scopes they are aimed at.

use std::collections::BTreeMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Four additive economic quantities tracked at every level of the hierarchy
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScopedEffect {
    pub output: f64,
    pub stability: f64,
    pub sanitation: f64,
    pub food: f64,
}

impl ScopedEffect {
    pub const ZERO: ScopedEffect = ScopedEffect {
        output: 0.0,
        stability: 0.0,
        sanitation: 0.0,
        food: 0.0,
    };

    pub fn new(output: f64, stability: f64, sanitation: f64, food: f64) -> Self {
        Self {
            output,
            stability,
            sanitation,
            food,
        }
    }

    pub fn with_output(mut self, output: f64) -> Self {
        self.output = output;
        self
    }

    pub fn with_stability(mut self, stability: f64) -> Self {
        self.stability = stability;
        self
    }

    pub fn with_sanitation(mut self, sanitation: f64) -> Self {
        self.sanitation = sanitation;
        self
    }

    pub fn with_food(mut self, food: f64) -> Self {
        self.food = food;
        self
    }

    pub fn get(&self, kind: EffectKind) -> f64 {
        match kind {
            EffectKind::Output => self.output,
            EffectKind::Stability => self.stability,
            EffectKind::Sanitation => self.sanitation,
            EffectKind::Food => self.food,
        }
    }
}

impl Add for ScopedEffect {
    type Output = ScopedEffect;

    fn add(self, rhs: ScopedEffect) -> ScopedEffect {
        ScopedEffect {
            output: self.output + rhs.output,
            stability: self.stability + rhs.stability,
            sanitation: self.sanitation + rhs.sanitation,
            food: self.food + rhs.food,
        }
    }
}

impl AddAssign for ScopedEffect {
    fn add_assign(&mut self, rhs: ScopedEffect) {
        *self = *self + rhs;
    }
}

impl Sum for ScopedEffect {
    fn sum<I: Iterator<Item = ScopedEffect>>(iter: I) -> Self {
        iter.fold(ScopedEffect::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a ScopedEffect> for ScopedEffect {
    fn sum<I: Iterator<Item = &'a ScopedEffect>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// One field of a [`ScopedEffect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Output,
    Stability,
    Sanitation,
    Food,
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EffectKind::Output => write!(f, "output"),
            EffectKind::Stability => write!(f, "stability"),
            EffectKind::Sanitation => write!(f, "sanitation"),
            EffectKind::Food => write!(f, "food"),
        }
    }
}

/// Aggregation level an effect is aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectScope {
    Faction,
    Province,
    Region,
    Building,
}

impl EffectScope {
    pub const ALL: [EffectScope; 4] = [
        EffectScope::Faction,
        EffectScope::Province,
        EffectScope::Region,
        EffectScope::Building,
    ];
}

/// Named effects a building contributes, kept apart per target scope
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectTargets {
    faction: BTreeMap<String, ScopedEffect>,
    province: BTreeMap<String, ScopedEffect>,
    region: BTreeMap<String, ScopedEffect>,
    building: BTreeMap<String, ScopedEffect>,
}

impl EffectTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the named effect aimed at `scope`, replacing any previous value
    pub fn insert(&mut self, scope: EffectScope, key: impl Into<String>, effect: ScopedEffect) {
        self.map_mut(scope).insert(key.into(), effect);
    }

    pub fn get(&self, scope: EffectScope, key: &str) -> Option<&ScopedEffect> {
        self.map(scope).get(key)
    }

    pub fn map(&self, scope: EffectScope) -> &BTreeMap<String, ScopedEffect> {
        match scope {
            EffectScope::Faction => &self.faction,
            EffectScope::Province => &self.province,
            EffectScope::Region => &self.region,
            EffectScope::Building => &self.building,
        }
    }

    fn map_mut(&mut self, scope: EffectScope) -> &mut BTreeMap<String, ScopedEffect> {
        match scope {
            EffectScope::Faction => &mut self.faction,
            EffectScope::Province => &mut self.province,
            EffectScope::Region => &mut self.region,
            EffectScope::Building => &mut self.building,
        }
    }

    /// Sum of every named effect aimed at `scope`
    pub fn total(&self, scope: EffectScope) -> ScopedEffect {
        self.map(scope).values().sum()
    }

    /// Sum over all scopes
    pub fn grand_total(&self) -> ScopedEffect {
        EffectScope::ALL.iter().map(|s| self.total(*s)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effects_add_field_by_field() {
        let a = ScopedEffect::new(1.0, 2.0, 3.0, 4.0);
        let b = ScopedEffect::new(10.0, -2.0, 0.5, 0.0);

        assert_eq!(a + b, ScopedEffect::new(11.0, 0.0, 3.5, 4.0));
        assert_eq!([a, b].iter().sum::<ScopedEffect>(), a + b);
    }

    #[test]
    fn targets_keep_scopes_apart() {
        let mut targets = EffectTargets::new();
        targets.insert(EffectScope::Region, "irrigation", ScopedEffect::ZERO.with_food(5.0));
        targets.insert(EffectScope::Faction, "trade", ScopedEffect::ZERO.with_output(7.0));
        targets.insert(EffectScope::Region, "wells", ScopedEffect::ZERO.with_sanitation(1.0));

        assert_eq!(targets.total(EffectScope::Region).food, 5.0);
        assert_eq!(targets.total(EffectScope::Region).sanitation, 1.0);
        assert_eq!(targets.total(EffectScope::Faction).food, 0.0);
        assert_eq!(targets.total(EffectScope::Province), ScopedEffect::ZERO);
        assert_eq!(targets.grand_total(), ScopedEffect::new(7.0, 0.0, 1.0, 5.0));
    }

    #[test]
    fn inserting_same_key_replaces() {
        let mut targets = EffectTargets::new();
        targets.insert(EffectScope::Building, "base", ScopedEffect::ZERO.with_output(1.0));
        targets.insert(EffectScope::Building, "base", ScopedEffect::ZERO.with_output(3.0));

        assert_eq!(targets.map(EffectScope::Building).len(), 1);
        assert_eq!(targets.get(EffectScope::Building, "base").unwrap().output, 3.0);
    }
}
