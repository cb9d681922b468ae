//! Six-slot loadout selection as a binary program.
//!
//! The exact damage metric is not linear in the selection, so the model
//! maximizes a linear proxy (`power + 0.5 × attack_speed` per item) and the
//! exact metric is recomputed on the chosen items afterwards.

use std::sync::Arc;

use super::item::{Item, Target};
use super::loadout::{Loadout, LOADOUT_SLOTS};
use crate::domain::{
    LinearExpr, OptimizationType, OptimizerError, OptimizerResult, SolverConfig, SolverEngine,
    SolverService, VariableHandle, VariableType,
};

/// Weight of attack speed in the linear proxy objective
pub const ATTACK_SPEED_WEIGHT: f64 = 0.5;

/// Proxy objective coefficient of `item` for `target`
pub fn objective_coefficient(target: &Target, item: &Item) -> f64 {
    let stats = item.stats();
    stats.power(target.power_type()) + ATTACK_SPEED_WEIGHT * stats.attack_speed
}

/// Accepted outcome of a loadout optimization
#[derive(Debug, Clone, PartialEq)]
pub struct LoadoutResult<'a> {
    pub loadout: Loadout<'a>,
    /// Exact damage metric of the target with the loadout equipped
    pub metric: f64,
    /// Value of the linear proxy objective; not the metric
    pub objective_value: f64,
}

/// Picks the best six items for a target out of a candidate pool
#[derive(Debug)]
pub struct LoadoutOptimizer<'a> {
    target: &'a Target,
    candidates: &'a [Item],
    engine: SolverEngine,
}

impl<'a> LoadoutOptimizer<'a> {
    /// Fails with `InsufficientCandidates` when the pool cannot fill a loadout
    pub fn new(
        target: &'a Target,
        candidates: &'a [Item],
        backend: Arc<dyn SolverService>,
    ) -> OptimizerResult<Self> {
        if candidates.len() < LOADOUT_SLOTS {
            return Err(OptimizerError::InsufficientCandidates {
                required: LOADOUT_SLOTS,
                available: candidates.len(),
            });
        }

        Ok(Self {
            target,
            candidates,
            engine: SolverEngine::new(backend).with_name(format!("loadout:{}", target.name())),
        })
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.engine = self.engine.with_config(config);
        self
    }

    pub fn target(&self) -> &Target {
        self.target
    }

    pub fn candidates(&self) -> &[Item] {
        self.candidates
    }

    /// Build and solve the model; the optimizer is consumed
    pub fn optimize(mut self) -> OptimizerResult<LoadoutResult<'a>> {
        let handles = self.build_model()?;

        let status = self.engine.solve()?;
        if !status.is_optimal() {
            let message = self.engine.last_message().unwrap_or_default().to_string();
            return Err(OptimizerError::Solve { status, message });
        }

        let mut selected = Vec::with_capacity(LOADOUT_SLOTS);
        for (item, handle) in self.candidates.iter().zip(&handles) {
            if self.engine.value(*handle)? > 0.5 {
                selected.push(item);
            }
        }

        if selected.len() != LOADOUT_SLOTS {
            return Err(OptimizerError::Optimization(format!(
                "Expected {} items, solver selected {}",
                LOADOUT_SLOTS,
                selected.len()
            )));
        }
        let starters = selected.iter().filter(|item| item.is_starter()).count();
        if starters > 1 {
            return Err(OptimizerError::Optimization(format!(
                "Solver selected {} starter items",
                starters
            )));
        }

        let mut loadout = Loadout::new();
        for item in selected {
            loadout.insert(item)?;
        }
        let metric = self.target.metric_with(loadout.items());
        let objective_value = self.engine.objective_value()?;

        tracing::info!(
            target_name = self.target.name(),
            metric,
            objective_value,
            items = ?loadout.items().map(Item::name).collect::<Vec<_>>(),
            "Loadout optimized"
        );

        Ok(LoadoutResult {
            loadout,
            metric,
            objective_value,
        })
    }

    fn build_model(&mut self) -> OptimizerResult<Vec<VariableHandle>> {
        let mut handles = Vec::with_capacity(self.candidates.len());
        for i in 0..self.candidates.len() {
            handles.push(
                self.engine
                    .create_variable(format!("item_{}", i), VariableType::Binary)?,
            );
        }

        self.engine.add_constraint(
            LinearExpr::sum(handles.iter().copied()),
            LOADOUT_SLOTS as f64,
            LOADOUT_SLOTS as f64,
            "exactly_6_items",
        )?;

        let starters: LinearExpr = self
            .candidates
            .iter()
            .zip(&handles)
            .filter(|(item, _)| item.is_starter())
            .map(|(_, handle)| (*handle, 1.0))
            .collect();
        if !starters.is_empty() {
            self.engine
                .add_constraint(starters, 0.0, 1.0, "at_most_1_starter")?;
        }

        for (item, handle) in self.candidates.iter().zip(&handles) {
            self.engine
                .set_objective_coefficient(*handle, objective_coefficient(self.target, item))?;
        }
        self.engine.set_objective(OptimizationType::Maximize);

        tracing::debug!(
            target_name = self.target.name(),
            candidates = self.candidates.len(),
            constraints = self.engine.num_constraints(),
            "Built loadout model"
        );
        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{OptimizationProblem, Solution};
    use crate::domain::solver_service;
    use crate::domain::SolutionStatus;
    use crate::loadout::{PowerType, Stats};
    use crate::solver::MicroLpSolver;

    fn item(power: f64, attack_speed: f64) -> Item {
        Item::new(
            format!("p{}", power),
            Stats {
                power_physical: power,
                attack_speed,
                ..Stats::default()
            },
        )
    }

    fn target() -> Target {
        Target::new(
            "Hunter",
            PowerType::Physical,
            Stats {
                power_physical: 40.0,
                attack_speed: 100.0,
                ..Stats::default()
            },
        )
    }

    #[test]
    fn coefficient_weights_attack_speed_by_half() {
        let target = target();
        assert_eq!(objective_coefficient(&target, &item(20.0, 10.0)), 25.0);
    }

    #[test]
    fn rejects_small_pools() {
        let target = target();
        let pool: Vec<Item> = (0..5).map(|i| item(i as f64, 0.0)).collect();

        let err = LoadoutOptimizer::new(&target, &pool, Arc::new(MicroLpSolver::new())).unwrap_err();
        assert_eq!(
            err,
            OptimizerError::InsufficientCandidates {
                required: 6,
                available: 5
            }
        );
    }

    #[test]
    fn exact_pool_takes_everything() {
        let target = target();
        let pool: Vec<Item> = (0..6).map(|i| item(10.0 + i as f64, 0.0)).collect();

        let result = LoadoutOptimizer::new(&target, &pool, Arc::new(MicroLpSolver::new()))
            .unwrap()
            .optimize()
            .unwrap();

        assert!(result.loadout.is_complete());
        assert!((result.objective_value - 75.0).abs() < 1e-6);
        // (40 + 75) × 2
        assert!((result.metric - 230.0).abs() < 1e-6);
    }

    /// Backend that reports `values` as an optimal solution, whatever the model says
    struct FixedPicks(Vec<f64>);

    impl SolverService for FixedPicks {
        fn solve(&self, _problem: &OptimizationProblem) -> solver_service::Result<Solution> {
            Ok(Solution::optimal(0.0, self.0.clone()))
        }

        fn name(&self) -> &str {
            "fixed"
        }

        fn supports_mip(&self) -> bool {
            true
        }
    }

    fn picks(pattern: &[u8]) -> Arc<dyn SolverService> {
        Arc::new(FixedPicks(pattern.iter().map(|&p| p as f64).collect()))
    }

    #[test]
    fn wrong_item_count_is_rejected() {
        let target = target();
        let pool: Vec<Item> = (0..8).map(|i| item(i as f64, 0.0)).collect();

        for pattern in [[1u8, 1, 1, 1, 1, 0, 0, 0], [1, 1, 1, 1, 1, 1, 1, 0]] {
            let err = LoadoutOptimizer::new(&target, &pool, picks(&pattern))
                .unwrap()
                .optimize()
                .unwrap_err();
            assert!(matches!(err, OptimizerError::Optimization(_)), "{:?}", pattern);
        }
    }

    #[test]
    fn two_starters_are_rejected() {
        let target = target();
        let pool: Vec<Item> = (0..8)
            .map(|i| item(i as f64, 0.0).with_starter(i < 2))
            .collect();

        let err = LoadoutOptimizer::new(&target, &pool, picks(&[1u8, 1, 1, 1, 1, 1, 0, 0]))
            .unwrap()
            .optimize()
            .unwrap_err();
        assert_eq!(
            err,
            OptimizerError::Optimization("Solver selected 2 starter items".to_string())
        );
    }

    #[test]
    fn backend_failure_is_a_solve_error() {
        let target = target();
        let pool: Vec<Item> = (0..6).map(|i| item(i as f64, 0.0)).collect();

        // Too few values for the model: the engine turns this into an error status
        let err = LoadoutOptimizer::new(&target, &pool, picks(&[1u8, 1]))
            .unwrap()
            .optimize()
            .unwrap_err();
        assert!(matches!(
            err,
            OptimizerError::Solve {
                status: SolutionStatus::Error,
                ..
            }
        ));
    }
}
