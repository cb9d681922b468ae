//! Region and province containers, and the folds that aggregate building
//! effects over them.
//!
//! A building's contribution to a target depends on where it sits relative
//! to it (see [`Proximity`]). Folds take an `is_active` predicate so the same
//! code serves "what if everything were built" and "what the solver picked".

use super::building::{Building, Proximity};
use super::effect::ScopedEffect;

/// A region: an ordered set of candidate buildings competing for `capacity` slots
#[derive(Debug, Clone)]
pub struct Region {
    name: String,
    capacity: usize,
    /// Base effect of the region, independent of any building
    pub effect: ScopedEffect,
    buildings: Vec<Building>,
}

impl Region {
    pub fn new(name: impl Into<String>, capacity: usize) -> Self {
        Self {
            name: name.into(),
            capacity,
            effect: ScopedEffect::ZERO,
            buildings: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: ScopedEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_building(mut self, building: Building) -> Self {
        self.add_building(building);
        self
    }

    pub fn add_building(&mut self, building: Building) {
        self.buildings.push(building);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of buildings that can stand in the region at once
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn buildings(&self) -> &[Building] {
        &self.buildings
    }

    pub(crate) fn buildings_mut(&mut self) -> &mut [Building] {
        &mut self.buildings
    }
}

/// A province: an ordered set of regions
#[derive(Debug, Clone)]
pub struct Province {
    name: String,
    /// Base effect of the province, applied to each of its regions
    pub effect: ScopedEffect,
    regions: Vec<Region>,
}

impl Province {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            effect: ScopedEffect::ZERO,
            regions: Vec::new(),
        }
    }

    pub fn with_effect(mut self, effect: ScopedEffect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.add_region(region);
        self
    }

    pub fn add_region(&mut self, region: Region) {
        self.regions.push(region);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub(crate) fn regions_mut(&mut self) -> &mut [Region] {
        &mut self.regions
    }

    /// All candidate buildings, region by region in insertion order
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.regions.iter().flat_map(|r| r.buildings().iter())
    }

    /// Province effect plus every region's base effect
    pub fn base_effect(&self) -> ScopedEffect {
        self.effect + self.regions.iter().map(|r| r.effect).sum::<ScopedEffect>()
    }

    /// Base effect seen by one region: its own plus the province's
    pub fn region_base_effect(&self, index: usize) -> Option<ScopedEffect> {
        self.regions.get(index).map(|r| r.effect + self.effect)
    }

    /// Effect on the province from its own active buildings
    pub fn local_effect<F>(&self, is_active: F) -> ScopedEffect
    where
        F: Fn(&Building) -> bool,
    {
        self.base_effect()
            + self
                .buildings()
                .filter(|&b| is_active(b))
                .map(|b| b.effect_at(Proximity::Local))
                .sum::<ScopedEffect>()
    }

    /// Effect on region `index` from the province's own active buildings
    pub fn region_effect<F>(&self, index: usize, is_active: F) -> Option<ScopedEffect>
    where
        F: Fn(&Building) -> bool,
    {
        let base = self.region_base_effect(index)?;
        let contributed: ScopedEffect = self
            .regions
            .iter()
            .enumerate()
            .flat_map(|(j, region)| {
                let proximity = if j == index {
                    Proximity::Local
                } else {
                    Proximity::SameProvince
                };
                region.buildings().iter().map(move |b| (proximity, b))
            })
            .filter(|&(_, b)| is_active(b))
            .map(|(proximity, b)| b.effect_at(proximity))
            .sum();
        Some(base + contributed)
    }

    /// Faction-wide effect the province's active buildings send to other provinces
    pub fn outward_effect<F>(&self, is_active: F) -> ScopedEffect
    where
        F: Fn(&Building) -> bool,
    {
        self.buildings()
            .filter(|&b| is_active(b))
            .map(|b| b.effect_at(Proximity::Elsewhere))
            .sum()
    }
}
