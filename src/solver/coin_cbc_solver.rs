use super::good_lp_model::solve_with;
use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{Result, SolverService},
};
use good_lp::solvers::coin_cbc;

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        // Validate first
        self.validate(problem)?;

        if problem.solver_config.time_limit.is_some() {
            tracing::warn!(problem = %problem.name, "CBC adapter does not forward time limits; ignoring it");
        }

        solve_with(problem, |vars, objective| {
            vars.minimise(objective).using(coin_cbc::coin_cbc)
        })
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}
