use super::good_lp_model::solve_with;
use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{Result, SolverService},
};
use good_lp::solvers::microlp;

/// Pure-Rust branch-and-bound backend, always compiled in
pub struct MicroLpSolver;

impl MicroLpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicroLpSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for MicroLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        // Validate first
        self.validate(problem)?;

        if problem.solver_config.time_limit.is_some() {
            tracing::warn!(problem = %problem.name, "microlp has no time limit; ignoring it");
        }

        solve_with(problem, |vars, objective| {
            vars.minimise(objective).using(microlp::microlp)
        })
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Constraint, LinearExpr, ObjectiveFunction, OptimizationType, SolutionStatus, Variable,
        VariableHandle,
    };

    fn handle(i: usize) -> VariableHandle {
        VariableHandle::new(i)
    }

    #[test]
    fn solves_small_lp_with_ranged_row() {
        // max x + y, 1 <= x + y <= 3, x <= 2
        let objective = ObjectiveFunction::new(
            OptimizationType::Maximize,
            LinearExpr::sum([handle(0), handle(1)]),
        );
        let problem = OptimizationProblem::new(objective)
            .with_name("lp")
            .with_variables(vec![
                Variable::continuous("x").with_bounds(0.0, Some(2.0)),
                Variable::continuous("y"),
            ])
            .add_constraint(Constraint::new(
                "range",
                LinearExpr::sum([handle(0), handle(1)]),
                1.0,
                3.0,
            ));

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.optimal_value.unwrap() - 3.0).abs() < 1e-6);
        assert_eq!(solution.statistics.num_variables, 2);
    }

    #[test]
    fn reports_unbounded() {
        let objective =
            ObjectiveFunction::new(OptimizationType::Maximize, LinearExpr::sum([handle(0)]));
        let problem =
            OptimizationProblem::new(objective).with_variables(vec![Variable::continuous("x")]);

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn rejects_dangling_handles() {
        let objective =
            ObjectiveFunction::new(OptimizationType::Maximize, LinearExpr::sum([handle(3)]));
        let problem =
            OptimizationProblem::new(objective).with_variables(vec![Variable::binary("x")]);

        assert!(MicroLpSolver::new().solve(&problem).is_err());
    }

    #[test]
    fn empty_constant_row_outside_bounds_is_infeasible() {
        let objective =
            ObjectiveFunction::new(OptimizationType::Maximize, LinearExpr::sum([handle(0)]));
        let problem = OptimizationProblem::new(objective)
            .with_variables(vec![Variable::binary("x")])
            .add_constraint(Constraint::new("never", LinearExpr::new(), 1.0, 2.0));

        let solution = MicroLpSolver::new().solve(&problem).unwrap();
        assert_eq!(solution.status, SolutionStatus::Infeasible);
    }
}
