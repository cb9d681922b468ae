//! Flat entry points for foreign callers: each returns a success flag and a
//! single number instead of rich Rust types.

use crate::allocation::{AllocationProblem, ProblemState};
use crate::domain::{SolverBackend, SolverEngine};
use crate::loadout::{Item, LoadoutOptimizer, Target};
use crate::solver::SolverFactory;

/// Outcome of an embedding call
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingResult {
    pub success: bool,
    /// Meaningful only when `success` is set
    pub value: f64,
    /// Failure reason, empty on success
    pub message: String,
}

impl EmbeddingResult {
    pub fn ok(value: f64) -> Self {
        Self {
            success: true,
            value,
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            value: 0.0,
            message: message.into(),
        }
    }
}

/// Optimize a loadout for `target`; the value is the exact damage metric
pub fn optimize_loadout(
    target: &Target,
    candidates: &[Item],
    backend: SolverBackend,
) -> EmbeddingResult {
    let solver = match SolverFactory::create_from_backend(backend) {
        Ok(solver) => solver,
        Err(e) => return EmbeddingResult::failure(e.to_string()),
    };

    match LoadoutOptimizer::new(target, candidates, solver).and_then(|o| o.optimize()) {
        Ok(result) => EmbeddingResult::ok(result.metric),
        Err(e) => {
            tracing::warn!(target_name = target.name(), error = %e, "Loadout optimization failed");
            EmbeddingResult::failure(e.to_string())
        }
    }
}

/// Build an empty allocation problem and let the backend validate its model.
///
/// The value is the number of variables in the model, which is zero.
pub fn validate_allocation_problem(backend: SolverBackend) -> EmbeddingResult {
    let solver = match SolverFactory::create_from_backend(backend) {
        Ok(solver) => solver,
        Err(e) => return EmbeddingResult::failure(e.to_string()),
    };

    let problem = AllocationProblem::new(SolverEngine::new(solver).with_name("validation"));
    if problem.state() != ProblemState::Init {
        return EmbeddingResult::failure(format!(
            "Fresh problem is in state {}",
            problem.state()
        ));
    }
    match problem.engine().validate() {
        Ok(warnings) => {
            for warning in &warnings {
                tracing::debug!(%warning, "Validation warning");
            }
            EmbeddingResult::ok(problem.num_variables() as f64)
        }
        Err(e) => EmbeddingResult::failure(e.to_string()),
    }
}
