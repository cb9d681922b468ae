// Outcomes every backend settles the same way before a model is built

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    value_objects::SolutionStatus as DomainSolutionStatus,
};
use std::time::Instant;

/// Settle models whose outcome does not need a solver.
///
/// A row without terms is a constant 0: it either always holds or makes the
/// model infeasible. A model without variables is then trivially optimal.
/// Returns `None` when the backend has to run.
pub(crate) fn settle(problem: &OptimizationProblem, start_time: Instant) -> Option<DomainSolution> {
    let elapsed_ms = || start_time.elapsed().as_secs_f64() * 1000.0;

    let violated = problem.constraints.iter().find(|c| {
        c.expression.is_empty() && !(c.lower_bound <= 0.0 && 0.0 <= c.upper_bound)
    });
    if let Some(constraint) = violated {
        return Some(
            DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                format!("Constraint '{}' cannot hold: it has no terms", constraint.name),
            )
            .with_statistics(problem.statistics(elapsed_ms())),
        );
    }

    if problem.variables.is_empty() {
        return Some(
            DomainSolution::optimal(0.0, Vec::new())
                .with_statistics(problem.statistics(elapsed_ms()))
                .with_message(format!("Empty model '{}' is trivially optimal", problem.name)),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Constraint, LinearExpr, ObjectiveFunction, OptimizationType, Variable, VariableHandle,
    };

    fn empty_objective() -> ObjectiveFunction {
        ObjectiveFunction::new(OptimizationType::Maximize, LinearExpr::new())
    }

    #[test]
    fn empty_model_is_optimal() {
        let problem = OptimizationProblem::new(empty_objective()).with_name("empty");

        let solution = settle(&problem, Instant::now()).unwrap();
        assert_eq!(solution.status, DomainSolutionStatus::Optimal);
        assert_eq!(solution.optimal_value, Some(0.0));
        assert!(solution.variable_values.is_empty());
    }

    #[test]
    fn empty_model_with_an_impossible_row_is_infeasible() {
        let problem = OptimizationProblem::new(empty_objective())
            .add_constraint(Constraint::new("floor", LinearExpr::new(), 5.0, f64::INFINITY));

        let solution = settle(&problem, Instant::now()).unwrap();
        assert_eq!(solution.status, DomainSolutionStatus::Infeasible);
        assert_eq!(solution.statistics.num_constraints, 1);
    }

    #[test]
    fn satisfiable_constant_rows_leave_the_model_to_the_backend() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            LinearExpr::sum([VariableHandle::new(0)]),
        ))
        .with_variables(vec![Variable::binary("x")])
        .add_constraint(Constraint::new("slack", LinearExpr::new(), f64::NEG_INFINITY, 3.0));

        assert!(settle(&problem, Instant::now()).is_none());
    }
}
