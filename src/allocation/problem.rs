//! Building-allocation model over a province/region hierarchy.
//!
//! The problem walks a fixed lifecycle, one step at a time:
//!
//! ```text
//! Init → ProvincesAdded → BuildingsRegistered → ConstraintsAdded → ObjectiveSet → Solved
//! ```
//!
//! Every building becomes one binary variable ("is it built"). Each region
//! caps the number of active buildings at its capacity and allows at most one
//! building per chain; optional [`AllocationRules`] add effect floors. The
//! objective maximizes the summed output of the active buildings.

use std::fmt;

use super::building::{Building, Proximity};
use super::effect::{EffectKind, ScopedEffect};
use super::hierarchy::{Province, Region};
use crate::domain::{
    LinearExpr, OptimizationType, OptimizerError, OptimizerResult, SolutionStatus, SolverEngine,
    SolverStatistics, VariableHandle, VariableType,
};

/// Lifecycle stage of an [`AllocationProblem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProblemState {
    Init,
    ProvincesAdded,
    BuildingsRegistered,
    ConstraintsAdded,
    ObjectiveSet,
    Solved,
}

impl fmt::Display for ProblemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemState::Init => write!(f, "Init"),
            ProblemState::ProvincesAdded => write!(f, "ProvincesAdded"),
            ProblemState::BuildingsRegistered => write!(f, "BuildingsRegistered"),
            ProblemState::ConstraintsAdded => write!(f, "ConstraintsAdded"),
            ProblemState::ObjectiveSet => write!(f, "ObjectiveSet"),
            ProblemState::Solved => write!(f, "Solved"),
        }
    }
}

/// Optional effect floors enforced by `add_constraints`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationRules {
    /// Every region must end with at least this much sanitation
    pub min_region_sanitation: Option<f64>,
    /// Every province must end with at least this much stability
    pub min_province_stability: Option<f64>,
    /// Every province must end with at least this much food
    pub min_province_food: Option<f64>,
}

impl AllocationRules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_region_sanitation(mut self, floor: f64) -> Self {
        self.min_region_sanitation = Some(floor);
        self
    }

    pub fn with_min_province_stability(mut self, floor: f64) -> Self {
        self.min_province_stability = Some(floor);
        self
    }

    pub fn with_min_province_food(mut self, floor: f64) -> Self {
        self.min_province_food = Some(floor);
        self
    }
}

#[derive(Debug, Clone, Copy)]
enum FloorTarget {
    Region { province: usize, region: usize },
    Province(usize),
}

impl FloorTarget {
    fn proximity(&self, province: usize, region: usize) -> Proximity {
        match *self {
            FloorTarget::Region {
                province: p,
                region: r,
            } => {
                if p != province {
                    Proximity::Elsewhere
                } else if r == region {
                    Proximity::Local
                } else {
                    Proximity::SameProvince
                }
            }
            FloorTarget::Province(p) if p == province => Proximity::Local,
            FloorTarget::Province(_) => Proximity::Elsewhere,
        }
    }
}

/// Integer program choosing which buildings to construct
#[derive(Debug)]
pub struct AllocationProblem {
    engine: SolverEngine,
    provinces: Vec<Province>,
    rules: AllocationRules,
    state: ProblemState,
}

impl AllocationProblem {
    /// The problem takes sole ownership of `engine` for its whole lifetime
    pub fn new(engine: SolverEngine) -> Self {
        Self {
            engine,
            provinces: Vec::new(),
            rules: AllocationRules::default(),
            state: ProblemState::Init,
        }
    }

    pub fn with_rules(mut self, rules: AllocationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn state(&self) -> ProblemState {
        self.state
    }

    pub fn rules(&self) -> &AllocationRules {
        &self.rules
    }

    /// Replace the effect floors; only possible before constraints are emitted
    pub fn set_rules(&mut self, rules: AllocationRules) -> OptimizerResult<()> {
        if self.state >= ProblemState::ConstraintsAdded {
            return Err(self.state_error("Rules cannot change once constraints are added."));
        }
        self.rules = rules;
        Ok(())
    }

    pub fn add_province(&mut self, province: Province) -> OptimizerResult<()> {
        self.expect_state(
            &[ProblemState::Init, ProblemState::ProvincesAdded],
            "Provinces cannot be added after buildings are registered.",
        )?;
        if self.provinces.iter().any(|p| p.name() == province.name()) {
            return Err(OptimizerError::model(format!(
                "Province '{}' is already part of the problem",
                province.name()
            )));
        }
        for (i, region) in province.regions().iter().enumerate() {
            if province.regions()[..i].iter().any(|r| r.name() == region.name()) {
                return Err(OptimizerError::model(format!(
                    "Province '{}' holds two regions named '{}'",
                    province.name(),
                    region.name()
                )));
            }
        }
        tracing::debug!(province = province.name(), "Adding province");
        self.provinces.push(province);
        self.state = ProblemState::ProvincesAdded;
        Ok(())
    }

    pub fn add_provinces<I>(&mut self, provinces: I) -> OptimizerResult<()>
    where
        I: IntoIterator<Item = Province>,
    {
        for province in provinces {
            self.add_province(province)?;
        }
        Ok(())
    }

    /// Mint one binary variable per building, named after its identity
    pub fn register_buildings(&mut self) -> OptimizerResult<()> {
        self.expect_state(
            &[ProblemState::ProvincesAdded],
            "Provinces must be added first.",
        )?;

        if let Err(e) = self.attach_variables() {
            // Leave no half-registered model behind
            self.discard_model();
            return Err(e);
        }

        tracing::debug!(
            variables = self.engine.num_variables(),
            "Registered buildings"
        );
        self.state = ProblemState::BuildingsRegistered;
        Ok(())
    }

    /// Emit region capacity, chain exclusivity and any configured effect floors
    pub fn add_constraints(&mut self) -> OptimizerResult<()> {
        self.expect_state(
            &[ProblemState::BuildingsRegistered],
            "Buildings must be registered first.",
        )?;

        let mut rows: Vec<(String, LinearExpr, f64, f64)> = Vec::new();

        for province in &self.provinces {
            for region in province.regions() {
                if region.buildings().is_empty() {
                    continue;
                }
                let handles = region_handles(region)?;
                rows.push((
                    format!("max_buildings_{}/{}", province.name(), region.name()),
                    LinearExpr::sum(handles.iter().map(|(_, h)| *h)),
                    f64::NEG_INFINITY,
                    region.capacity() as f64,
                ));

                // Buildings of one chain exclude each other, in first-seen order
                let mut chains: Vec<(&str, LinearExpr, usize)> = Vec::new();
                for (building, handle) in &handles {
                    let Some(chain) = building.chain() else {
                        continue;
                    };
                    match chains.iter_mut().find(|(name, _, _)| *name == chain) {
                        Some((_, expr, count)) => {
                            expr.add_term(*handle, 1.0);
                            *count += 1;
                        }
                        None => chains.push((chain, LinearExpr::sum([*handle]), 1)),
                    }
                }
                for (chain, expr, count) in chains {
                    if count > 1 {
                        rows.push((
                            format!("{}/{}_chain_{}", province.name(), region.name(), chain),
                            expr,
                            f64::NEG_INFINITY,
                            1.0,
                        ));
                    }
                }
            }
        }

        if let Some(floor) = self.rules.min_region_sanitation {
            for (p, province) in self.provinces.iter().enumerate() {
                for (r, region) in province.regions().iter().enumerate() {
                    let target = FloorTarget::Region {
                        province: p,
                        region: r,
                    };
                    let (expr, lower) = self.floor_row(target, EffectKind::Sanitation, floor)?;
                    rows.push((
                        format!("{}/{}_sanitation", province.name(), region.name()),
                        expr,
                        lower,
                        f64::INFINITY,
                    ));
                }
            }
        }

        let province_floors = [
            (self.rules.min_province_stability, EffectKind::Stability),
            (self.rules.min_province_food, EffectKind::Food),
        ];
        for (floor, kind) in province_floors {
            let Some(floor) = floor else {
                continue;
            };
            for (p, province) in self.provinces.iter().enumerate() {
                let (expr, lower) = self.floor_row(FloorTarget::Province(p), kind, floor)?;
                rows.push((
                    format!("{}_{}", province.name(), kind),
                    expr,
                    lower,
                    f64::INFINITY,
                ));
            }
        }

        for (name, expr, lower, upper) in rows {
            self.engine.add_constraint(expr, lower, upper, name)?;
        }

        tracing::debug!(
            constraints = self.engine.num_constraints(),
            "Added constraints"
        );
        self.state = ProblemState::ConstraintsAdded;
        Ok(())
    }

    /// Maximize the summed output of the active buildings
    pub fn set_objective(&mut self) -> OptimizerResult<()> {
        self.expect_state(
            &[ProblemState::ConstraintsAdded, ProblemState::BuildingsRegistered],
            "Constraints must be added first.",
        )?;

        for building in self.provinces.iter().flat_map(|p| p.buildings()) {
            let handle = building
                .variable()
                .ok_or_else(|| unregistered(building))?;
            self.engine
                .set_objective_coefficient(handle, building.aggregate_effect().output)?;
        }
        self.engine.set_objective(OptimizationType::Maximize);

        self.state = ProblemState::ObjectiveSet;
        Ok(())
    }

    /// Solve the model.
    ///
    /// On a non-optimal outcome a `verbose` solve fails with
    /// [`OptimizerError::Solve`]; otherwise the status is returned and the
    /// problem stays in `ObjectiveSet`.
    pub fn solve(&mut self, verbose: bool) -> OptimizerResult<SolutionStatus> {
        self.expect_state(&[ProblemState::ObjectiveSet], "Objective must be set first.")?;

        let status = self.engine.solve()?;
        if status.is_optimal() {
            self.state = ProblemState::Solved;
            tracing::info!(
                selected = self.count_selected(),
                candidates = self.engine.num_variables(),
                "Allocation solved"
            );
            return Ok(status);
        }

        let message = self.engine.last_message().unwrap_or_default().to_string();
        if verbose {
            return Err(OptimizerError::Solve { status, message });
        }
        tracing::warn!(%status, %message, "Allocation not solved; model kept for retry");
        Ok(status)
    }

    pub fn objective_value(&self) -> OptimizerResult<f64> {
        self.expect_solved()?;
        self.engine.objective_value()
    }

    /// Buildings picked by the solver, in province/region/insertion order
    pub fn selected_buildings(&self) -> OptimizerResult<Vec<&Building>> {
        Ok(self
            .selected_assignments()?
            .into_iter()
            .map(|(_, building)| building)
            .collect())
    }

    /// Picked buildings paired with their region, in traversal order
    pub fn selected_assignments(&self) -> OptimizerResult<Vec<(&Region, &Building)>> {
        self.expect_solved()?;

        let mut selected = Vec::new();
        for region in self.provinces.iter().flat_map(|p| p.regions()) {
            for building in region.buildings() {
                if self.is_selected(building)? {
                    selected.push((region, building));
                }
            }
        }
        Ok(selected)
    }

    /// Summed aggregate effect of the picked buildings
    pub fn realized_effect(&self) -> OptimizerResult<ScopedEffect> {
        Ok(self
            .selected_buildings()?
            .into_iter()
            .map(Building::aggregate_effect)
            .sum())
    }

    /// Effect landing on one region once the solution is applied
    pub fn realized_region_effect(
        &self,
        province: usize,
        region: usize,
    ) -> OptimizerResult<ScopedEffect> {
        self.expect_solved()?;
        let is_active = |b: &Building| self.is_selected(b).unwrap_or(false);

        let target = self
            .provinces
            .get(province)
            .and_then(|p| p.region_effect(region, is_active))
            .ok_or_else(|| {
                OptimizerError::model(format!("No region {} in province {}", region, province))
            })?;
        let spill: ScopedEffect = self
            .provinces
            .iter()
            .enumerate()
            .filter(|(q, _)| *q != province)
            .map(|(_, p)| p.outward_effect(is_active))
            .sum();
        Ok(target + spill)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    /// Every candidate building in traversal order
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.provinces.iter().flat_map(|p| p.buildings())
    }

    pub fn engine(&self) -> &SolverEngine {
        &self.engine
    }

    pub fn num_variables(&self) -> usize {
        self.engine.num_variables()
    }

    pub fn num_constraints(&self) -> usize {
        self.engine.num_constraints()
    }

    pub fn statistics(&self) -> Option<&SolverStatistics> {
        self.engine.statistics()
    }

    /// Throw the model away and go back to `ProvincesAdded`.
    ///
    /// Provinces are kept; variables, constraints and the objective are
    /// dropped so the model can be rebuilt, e.g. with relaxed rules after a
    /// lenient solve came back non-optimal. A solved problem is read-only.
    pub fn reset(&mut self) -> OptimizerResult<()> {
        self.expect_state(
            &[
                ProblemState::BuildingsRegistered,
                ProblemState::ConstraintsAdded,
                ProblemState::ObjectiveSet,
            ],
            "Only an unsolved model can be reset.",
        )?;
        self.discard_model();
        tracing::debug!(state = %self.state, "Problem reset");
        Ok(())
    }

    fn attach_variables(&mut self) -> OptimizerResult<()> {
        for province in &mut self.provinces {
            for region in province.regions_mut() {
                for building in region.buildings_mut() {
                    let handle = self
                        .engine
                        .create_variable(building.id().as_str(), VariableType::Binary)?;
                    building.attach_variable(handle)?;
                }
            }
        }
        Ok(())
    }

    fn discard_model(&mut self) {
        self.engine.reset();
        for province in &mut self.provinces {
            for region in province.regions_mut() {
                for building in region.buildings_mut() {
                    building.detach_variable();
                }
            }
        }
        self.state = ProblemState::ProvincesAdded;
    }

    /// Row `Σ coefficient·x ≥ floor − base` for one effect floor
    fn floor_row(
        &self,
        target: FloorTarget,
        kind: EffectKind,
        floor: f64,
    ) -> OptimizerResult<(LinearExpr, f64)> {
        let base = match target {
            FloorTarget::Region { province, region } => self.provinces[province]
                .region_base_effect(region)
                .unwrap_or_default(),
            FloorTarget::Province(province) => self.provinces[province].base_effect(),
        };

        let mut expr = LinearExpr::new();
        for (p, province) in self.provinces.iter().enumerate() {
            for (r, region) in province.regions().iter().enumerate() {
                let proximity = target.proximity(p, r);
                for building in region.buildings() {
                    let coefficient = building.effect_at(proximity).get(kind);
                    if coefficient != 0.0 {
                        let handle = building.variable().ok_or_else(|| unregistered(building))?;
                        expr.add_term(handle, coefficient);
                    }
                }
            }
        }
        Ok((expr, floor - base.get(kind)))
    }

    fn is_selected(&self, building: &Building) -> OptimizerResult<bool> {
        let handle = building.variable().ok_or_else(|| unregistered(building))?;
        Ok(self.engine.value(handle)? > 0.5)
    }

    fn count_selected(&self) -> usize {
        self.buildings()
            .filter(|b| self.is_selected(b).unwrap_or(false))
            .count()
    }

    fn expect_solved(&self) -> OptimizerResult<()> {
        self.expect_state(&[ProblemState::Solved], "Problem must be solved first.")
    }

    fn expect_state(&self, allowed: &[ProblemState], message: &str) -> OptimizerResult<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(self.state_error(message))
        }
    }

    fn state_error(&self, message: &str) -> OptimizerError {
        OptimizerError::state(format!("{} (current state: {})", message, self.state))
    }
}

fn region_handles(region: &Region) -> OptimizerResult<Vec<(&Building, VariableHandle)>> {
    let mut handles = Vec::with_capacity(region.buildings().len());
    for building in region.buildings() {
        let handle = building.variable().ok_or_else(|| unregistered(building))?;
        handles.push((building, handle));
    }
    Ok(handles)
}

fn unregistered(building: &Building) -> OptimizerError {
    OptimizerError::state(format!(
        "Building '{}' ({}) has no decision variable",
        building.name(),
        building.id()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::IdentitySequence;
    use crate::solver::MicroLpSolver;
    use std::sync::Arc;

    fn problem() -> AllocationProblem {
        AllocationProblem::new(SolverEngine::new(Arc::new(MicroLpSolver::new())))
    }

    fn one_region(seq: &mut IdentitySequence, outputs: &[f64], capacity: usize) -> Province {
        let region = outputs.iter().fold(Region::new("Roma", capacity), |region, out| {
            region.with_building(
                Building::new(seq, "b").with_effect(ScopedEffect::ZERO.with_output(*out)),
            )
        });
        Province::new("Italia").with_region(region)
    }

    #[test]
    fn starts_in_init() {
        assert_eq!(problem().state(), ProblemState::Init);
    }

    #[test]
    fn empty_province_list_keeps_init() {
        let mut problem = problem();
        problem.add_provinces(Vec::new()).unwrap();

        assert_eq!(problem.state(), ProblemState::Init);
        assert!(matches!(
            problem.register_buildings(),
            Err(OptimizerError::State(_))
        ));
    }

    #[test]
    fn objective_may_skip_constraints() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem.add_province(one_region(&mut seq, &[3.0, 4.0], 5)).unwrap();
        problem.register_buildings().unwrap();
        problem.set_objective().unwrap();

        assert_eq!(problem.state(), ProblemState::ObjectiveSet);
        assert_eq!(problem.num_constraints(), 0);
    }

    #[test]
    fn capacity_limits_selection() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem
            .add_province(one_region(&mut seq, &[5.0, 1.0, 3.0], 2))
            .unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();
        problem.set_objective().unwrap();

        assert_eq!(problem.solve(true).unwrap(), SolutionStatus::Optimal);
        let picked: Vec<_> = problem
            .selected_buildings()
            .unwrap()
            .iter()
            .map(|b| b.id().as_str())
            .collect();
        assert_eq!(picked, vec!["B0", "B2"]);
        assert!((problem.objective_value().unwrap() - 8.0).abs() < 1e-6);
    }

    #[test]
    fn chain_members_exclude_each_other() {
        let mut seq = IdentitySequence::new();
        let region = Region::new("Roma", 3)
            .with_building(
                Building::new(&mut seq, "farm_1")
                    .with_chain("farm")
                    .with_effect(ScopedEffect::ZERO.with_output(2.0)),
            )
            .with_building(
                Building::new(&mut seq, "farm_2")
                    .with_chain("farm")
                    .with_effect(ScopedEffect::ZERO.with_output(4.0)),
            )
            .with_building(
                Building::new(&mut seq, "mine").with_effect(ScopedEffect::ZERO.with_output(1.0)),
            );

        let mut problem = problem();
        problem
            .add_province(Province::new("Italia").with_region(region))
            .unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();
        assert_eq!(problem.num_constraints(), 2);
        problem.set_objective().unwrap();
        problem.solve(true).unwrap();

        let names: Vec<_> = problem
            .selected_buildings()
            .unwrap()
            .iter()
            .map(|b| b.name())
            .collect();
        assert_eq!(names, vec!["farm_2", "mine"]);
    }

    #[test]
    fn rules_are_frozen_after_constraints() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem.add_province(one_region(&mut seq, &[1.0], 1)).unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();

        assert!(problem
            .set_rules(AllocationRules::new().with_min_province_food(0.0))
            .is_err());
    }

    #[test]
    fn reset_returns_to_provinces_added() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem.add_province(one_region(&mut seq, &[1.0, 2.0], 1)).unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();

        problem.reset().unwrap();
        assert_eq!(problem.state(), ProblemState::ProvincesAdded);
        assert_eq!(problem.num_variables(), 0);
        assert!(problem.buildings().all(|b| b.variable().is_none()));

        problem.register_buildings().unwrap();
        assert_eq!(problem.num_variables(), 2);
    }

    #[test]
    fn solved_problem_rejects_reset() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem.add_province(one_region(&mut seq, &[2.0], 1)).unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();
        problem.set_objective().unwrap();
        problem.solve(true).unwrap();

        let err = problem.reset().unwrap_err();
        assert!(matches!(err, OptimizerError::State(_)));
        assert_eq!(problem.state(), ProblemState::Solved);
        assert!((problem.objective_value().unwrap() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn constraint_names_carry_the_province() {
        let mut seq = IdentitySequence::new();
        let mut problem = problem();
        problem.add_province(one_region(&mut seq, &[1.0], 1)).unwrap();
        let gallia = Province::new("Gallia").with_region(
            Region::new("Roma", 1).with_building(
                Building::new(&mut seq, "b").with_effect(ScopedEffect::ZERO.with_output(2.0)),
            ),
        );
        problem.add_province(gallia).unwrap();
        problem.register_buildings().unwrap();
        problem.add_constraints().unwrap();

        let names: Vec<_> = problem
            .engine()
            .to_problem()
            .constraints
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["max_buildings_Italia/Roma", "max_buildings_Gallia/Roma"]);
    }
}
