// Backend contract for solving optimization models
// Any MIP/LP backend that implements this trait can be plugged under the engine

use super::models::{OptimizationProblem, Solution};

/// Error types for the solver backends
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization backends
///
/// Model builders never talk to a backend directly: the engine records the
/// model and hands the finished `OptimizationProblem` to `solve`. A backend
/// reports infeasible/unbounded/time-limit outcomes through the returned
/// `Solution`; `Err` is reserved for the backend itself failing.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<Vec<String>> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let num_vars = problem.num_variables();

        for (handle, _) in problem.objective.expression.terms() {
            if handle.index() >= num_vars {
                errors.push(format!(
                    "Objective references variable {} but problem has {} variables",
                    handle.index(),
                    num_vars
                ));
            }
        }

        for constraint in &problem.constraints {
            for (handle, _) in constraint.expression.terms() {
                if handle.index() >= num_vars {
                    errors.push(format!(
                        "Constraint '{}' references variable {} but problem has {} variables",
                        constraint.name,
                        handle.index(),
                        num_vars
                    ));
                }
            }
            if constraint.lower_bound > constraint.upper_bound {
                errors.push(format!(
                    "Constraint '{}' has lower bound ({}) > upper bound ({})",
                    constraint.name, constraint.lower_bound, constraint.upper_bound
                ));
            }
            if constraint.expression.is_empty() {
                warnings.push(format!("Constraint '{}' has no terms", constraint.name));
            }
        }

        for (i, var) in problem.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if problem.is_mixed_integer() && !self.supports_mip() {
            errors.push(format!(
                "{} does not support integer variables",
                self.name()
            ));
        }

        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;

    /// Check if this solver honours `SolverConfig::time_limit`
    fn supports_time_limit(&self) -> bool {
        false
    }
}
