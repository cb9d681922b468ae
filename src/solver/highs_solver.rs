// HiGHS Solver Adapter
// Translates the domain model to the HiGHS row-wise API

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution},
    solver_service::{Result, SolverError, SolverService},
    value_objects::{SolutionStatus as DomainSolutionStatus, VariableType},
};
use super::presolve::settle;
use highs::{HighsModelStatus, RowProblem, Sense};
use std::time::Instant;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();
        if let Some(solution) = settle(problem, start_time) {
            return Ok(solution);
        }

        // Dense objective, one entry per column
        let mut obj_coeffs = vec![0.0; problem.num_variables()];
        for &(handle, coeff) in problem.objective.expression.terms() {
            obj_coeffs[handle.index()] += coeff;
        }

        let mut pb = RowProblem::default();
        let mut cols = Vec::with_capacity(problem.num_variables());

        // Add variables
        for (var_def, &obj_coeff) in problem.variables.iter().zip(&obj_coeffs) {
            let lower = var_def.lower_bound;
            let col = match (var_def.variable_type, var_def.upper_bound) {
                (VariableType::Integer | VariableType::Binary, Some(upper)) => {
                    pb.add_integer_column(obj_coeff, lower..=upper)
                }
                (VariableType::Integer | VariableType::Binary, None) => {
                    pb.add_integer_column(obj_coeff, lower..)
                }
                (VariableType::Continuous, Some(upper)) => pb.add_column(obj_coeff, lower..=upper),
                (VariableType::Continuous, None) => pb.add_column(obj_coeff, lower..),
            };
            cols.push(col);
        }

        // Add constraints
        for constraint in &problem.constraints {
            // Constant rows were settled above
            if constraint.expression.is_empty() {
                continue;
            }
            let terms: Vec<_> = constraint
                .expression
                .terms()
                .iter()
                .filter(|(_, coeff)| *coeff != 0.0)
                .map(|&(handle, coeff)| (cols[handle.index()], coeff))
                .collect();

            match (constraint.has_lower_bound(), constraint.has_upper_bound()) {
                (true, true) => {
                    pb.add_row(constraint.lower_bound..=constraint.upper_bound, &terms);
                }
                (true, false) => {
                    pb.add_row(constraint.lower_bound.., &terms);
                }
                (false, true) => {
                    pb.add_row(..=constraint.upper_bound, &terms);
                }
                // A row without bounds constrains nothing
                (false, false) => {}
            }
        }

        let sense = if problem.objective.is_maximize() {
            Sense::Maximise
        } else {
            Sense::Minimise
        };

        let mut model = pb.optimise(sense);
        let config = &problem.solver_config;
        model.set_option("output_flag", config.verbose);
        if let Some(seconds) = config.time_limit {
            model.set_option("time_limit", seconds);
        }
        if let Some(gap) = config.gap_tolerance {
            model.set_option("mip_rel_gap", gap);
        }

        // Solve the problem
        let solved = model.solve();
        let statistics = problem.statistics(start_time.elapsed().as_secs_f64() * 1000.0);

        // Process result
        match solved.status() {
            HighsModelStatus::Optimal => {
                let solution_data = solved.get_solution();
                let variable_values = solution_data.columns().to_vec();
                let actual_obj = problem.objective.expression.evaluate(&variable_values);

                Ok(DomainSolution::optimal(actual_obj, variable_values)
                    .with_statistics(statistics)
                    .with_message(format!("Optimal solution found for '{}'", problem.name)))
            }
            HighsModelStatus::Infeasible => Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                "Problem is infeasible: no solution satisfies all constraints",
            )
            .with_statistics(statistics)),
            HighsModelStatus::Unbounded | HighsModelStatus::UnboundedOrInfeasible => {
                Ok(DomainSolution::new(
                    DomainSolutionStatus::Unbounded,
                    "Problem is unbounded: objective can be improved infinitely",
                )
                .with_statistics(statistics))
            }
            HighsModelStatus::ReachedTimeLimit => Ok(DomainSolution::new(
                DomainSolutionStatus::TimeLimit,
                format!(
                    "Time limit of {:?}s reached before optimality was proven",
                    config.time_limit
                ),
            )
            .with_statistics(statistics)),
            status => Err(SolverError::ExecutionFailed(format!(
                "HiGHS solver returned status: {:?}",
                status
            ))),
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supports_mip(&self) -> bool {
        true
    }

    fn supports_time_limit(&self) -> bool {
        true
    }
}
