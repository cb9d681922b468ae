// Shared translation of a domain model into a good_lp model
// Used by every backend that good_lp wraps (microlp, COIN-OR CBC)

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{Result, SolverError},
    value_objects::{SolutionStatus as DomainSolutionStatus, VariableType},
};
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution as GoodLpSolutionTrait,
    SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

use super::presolve::settle;

/// Build the model with `create_model` and solve it.
///
/// `create_model` receives the variables and a minimisation objective
/// (maximisation is expressed by negating the coefficients) and attaches the
/// backend, e.g. `|vars, obj| vars.minimise(obj).using(coin_cbc)`.
pub(crate) fn solve_with<M, F>(problem: &OptimizationProblem, create_model: F) -> Result<DomainSolution>
where
    F: FnOnce(ProblemVariables, Expression) -> M,
    M: SolverModel<Error = ResolutionError>,
{
    let start_time = Instant::now();
    let elapsed_ms = |start: Instant| start.elapsed().as_secs_f64() * 1000.0;

    if let Some(solution) = settle(problem, start_time) {
        return Ok(solution);
    }

    // Build variables
    let mut vars = ProblemVariables::new();
    let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(problem.num_variables());

    for var_def in &problem.variables {
        let lower = var_def.lower_bound;
        let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

        let definition = match var_def.variable_type {
            VariableType::Binary | VariableType::Integer => variable().integer(),
            VariableType::Continuous => variable(),
        };
        lp_variables.push(vars.add(definition.min(lower).max(upper).name(var_def.name.clone())));
    }

    // Build objective expression
    let is_maximize = problem.objective.is_maximize();
    let mut obj_expr: Expression = 0.into();

    for &(handle, coeff) in problem.objective.expression.terms() {
        if coeff != 0.0 {
            // good_lp minimises, so negate for maximization
            let c = if is_maximize { -coeff } else { coeff };
            obj_expr += c * lp_variables[handle.index()];
        }
    }

    // Build constraints
    let mut lp_model = create_model(vars, obj_expr);

    for constraint in &problem.constraints {
        // Constant rows were settled above
        if constraint.expression.is_empty() {
            continue;
        }

        let mut lhs: Expression = 0.into();
        for &(handle, coeff) in constraint.expression.terms() {
            lhs += coeff * lp_variables[handle.index()];
        }

        if constraint.is_equality() {
            lp_model = lp_model.with(lhs.eq(constraint.lower_bound));
            continue;
        }
        if constraint.has_lower_bound() {
            lp_model = lp_model.with(lhs.clone().geq(constraint.lower_bound));
        }
        if constraint.has_upper_bound() {
            lp_model = lp_model.with(lhs.leq(constraint.upper_bound));
        }
    }

    // Solve the problem
    let solution_result = lp_model.solve();
    let statistics = problem.statistics(elapsed_ms(start_time));

    match solution_result {
        Ok(sol) => {
            let variable_values: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();

            // Objective value in the caller's direction
            let actual_obj = problem.objective.expression.evaluate(&variable_values);

            Ok(DomainSolution::optimal(actual_obj, variable_values)
                .with_statistics(statistics)
                .with_message(format!("Optimal solution found for '{}'", problem.name)))
        }
        Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
            DomainSolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
        .with_statistics(statistics)),
        Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
            DomainSolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
        .with_statistics(statistics)),
        Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    }
}
