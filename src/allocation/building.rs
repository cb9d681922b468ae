use std::fmt;

use super::effect::{EffectScope, EffectTargets, ScopedEffect};
use crate::domain::{OptimizerError, OptimizerResult, VariableHandle};

/// Stable identity of a building; doubles as its variable name in a model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingId(String);

impl BuildingId {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BuildingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Monotonic source of building identities (`B0`, `B1`, ...).
///
/// Owned by whoever constructs the hierarchy; tokens are never reused by
/// the same sequence.
#[derive(Debug, Clone)]
pub struct IdentitySequence {
    prefix: String,
    next: u64,
}

impl IdentitySequence {
    pub fn new() -> Self {
        Self::with_prefix("B")
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    pub fn next_id(&mut self) -> BuildingId {
        let id = BuildingId(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }

    /// Number of identities issued so far
    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl Default for IdentitySequence {
    fn default() -> Self {
        Self::new()
    }
}

/// Where a building sits relative to an aggregation target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// The target is the building's own region (or own province)
    Local,
    /// The target is another region of the building's province
    SameProvince,
    /// The target is outside the building's province
    Elsewhere,
}

/// A constructible building: the unit of choice of an allocation model
#[derive(Debug, Clone)]
pub struct Building {
    name: String,
    display_name: String,
    id: BuildingId,
    chain: Option<String>,
    /// Effect of the building itself
    pub effect: ScopedEffect,
    /// Effects the building contributes to each scope
    pub targets: EffectTargets,
    variable: Option<VariableHandle>,
}

impl Building {
    /// Create a building whose identity is drawn from `sequence`
    pub fn new(sequence: &mut IdentitySequence, name: impl Into<String>) -> Self {
        Self::with_id(sequence.next_id(), name)
    }

    /// Create a building with an explicit identity
    pub fn with_id(id: BuildingId, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            id,
            chain: None,
            effect: ScopedEffect::ZERO,
            targets: EffectTargets::new(),
            variable: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Buildings of one chain are upgrade levels of each other; a region
    /// can hold at most one of them.
    pub fn with_chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn with_effect(mut self, effect: ScopedEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_target_effect(
        mut self,
        scope: EffectScope,
        key: impl Into<String>,
        effect: ScopedEffect,
    ) -> Self {
        self.targets.insert(scope, key, effect);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn id(&self) -> &BuildingId {
        &self.id
    }

    pub fn chain(&self) -> Option<&str> {
        self.chain.as_deref()
    }

    pub fn variable(&self) -> Option<VariableHandle> {
        self.variable
    }

    /// Bind the building to its decision variable; a binding is permanent
    pub(crate) fn attach_variable(&mut self, handle: VariableHandle) -> OptimizerResult<()> {
        if self.variable.is_some() {
            return Err(OptimizerError::model(format!(
                "Building '{}' ({}) already has a decision variable",
                self.name, self.id
            )));
        }
        self.variable = Some(handle);
        Ok(())
    }

    pub(crate) fn detach_variable(&mut self) {
        self.variable = None;
    }

    /// Everything the building contributes, across all scopes
    pub fn aggregate_effect(&self) -> ScopedEffect {
        self.effect + self.targets.grand_total()
    }

    /// Contribution of the building to a target at the given proximity
    pub fn effect_at(&self, proximity: Proximity) -> ScopedEffect {
        let faction = self.targets.total(EffectScope::Faction);
        match proximity {
            Proximity::Local => self.aggregate_effect(),
            Proximity::SameProvince => self.targets.total(EffectScope::Province) + faction,
            Proximity::Elsewhere => faction,
        }
    }
}
