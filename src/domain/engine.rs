//! Backend-independent model builder.
//!
//! `SolverEngine` is the facade model builders talk to: it mints variables,
//! records ranged constraints and the objective, and hands the finished model
//! to a [`SolverService`] backend on [`SolverEngine::solve`]. Values are only
//! observable after an optimal solve.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use super::error::{OptimizerError, OptimizerResult};
use super::models::{
    Constraint, LinearExpr, ObjectiveFunction, OptimizationProblem, Solution, SolverConfig,
    SolverStatistics, Variable, VariableHandle,
};
use super::solver_service::SolverService;
use super::value_objects::{OptimizationType, SolutionStatus, VariableType};

pub struct SolverEngine {
    name: String,
    backend: Arc<dyn SolverService>,
    config: SolverConfig,
    variables: Vec<Variable>,
    variable_names: HashMap<String, VariableHandle>,
    constraints: Vec<Constraint>,
    constraint_names: HashSet<String>,
    pending_objective: BTreeMap<VariableHandle, f64>,
    objective: Option<ObjectiveFunction>,
    solution: Option<Solution>,
}

impl fmt::Debug for SolverEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolverEngine")
            .field("name", &self.name)
            .field("backend", &self.backend.name())
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("objective_set", &self.objective.is_some())
            .field(
                "status",
                &self.solution.as_ref().map(|s| s.status),
            )
            .finish()
    }
}

impl SolverEngine {
    pub fn new(backend: Arc<dyn SolverService>) -> Self {
        Self {
            name: String::new(),
            backend,
            config: SolverConfig::default(),
            variables: Vec::new(),
            variable_names: HashMap::new(),
            constraints: Vec::new(),
            constraint_names: HashSet::new(),
            pending_objective: BTreeMap::new(),
            objective: None,
            solution: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn backend(&self) -> Arc<dyn SolverService> {
        Arc::clone(&self.backend)
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Mint a decision variable with the default bounds of its category.
    ///
    /// Binary variables live in {0, 1}; integer and continuous ones are
    /// bounded below by 0 and unbounded above.
    pub fn create_variable(
        &mut self,
        name: impl Into<String>,
        variable_type: VariableType,
    ) -> OptimizerResult<VariableHandle> {
        self.push_variable(Variable::new(name, variable_type))
    }

    /// Mint a decision variable with explicit bounds
    pub fn create_variable_with_bounds(
        &mut self,
        name: impl Into<String>,
        variable_type: VariableType,
        lower: f64,
        upper: Option<f64>,
    ) -> OptimizerResult<VariableHandle> {
        let variable = Variable::new(name, variable_type).with_bounds(lower, upper);
        if lower.is_nan() || upper.is_some_and(|u| u.is_nan() || u < lower) {
            return Err(OptimizerError::model(format!(
                "Variable '{}' has invalid bounds [{}, {:?}]",
                variable.name, lower, upper
            )));
        }
        self.push_variable(variable)
    }

    fn push_variable(&mut self, variable: Variable) -> OptimizerResult<VariableHandle> {
        if self.variable_names.contains_key(&variable.name) {
            return Err(OptimizerError::model(format!(
                "Variable '{}' already exists in the model",
                variable.name
            )));
        }
        self.invalidate_solution();

        let handle = VariableHandle::new(self.variables.len());
        tracing::trace!(name = %variable.name, kind = %variable.variable_type, "Created variable");
        self.variable_names.insert(variable.name.clone(), handle);
        self.variables.push(variable);
        Ok(handle)
    }

    pub fn variable(&self, handle: VariableHandle) -> Option<&Variable> {
        self.variables.get(handle.index())
    }

    pub fn lookup(&self, name: &str) -> Option<VariableHandle> {
        self.variable_names.get(name).copied()
    }

    /// Register `lower_bound ≤ expression ≤ upper_bound`.
    ///
    /// Use `f64::NEG_INFINITY` / `f64::INFINITY` for one-sided constraints.
    pub fn add_constraint(
        &mut self,
        expression: LinearExpr,
        lower_bound: f64,
        upper_bound: f64,
        name: impl Into<String>,
    ) -> OptimizerResult<()> {
        let name = name.into();
        if self.constraint_names.contains(&name) {
            return Err(OptimizerError::model(format!(
                "Constraint '{}' already exists in the model",
                name
            )));
        }
        if lower_bound.is_nan() || upper_bound.is_nan() || lower_bound > upper_bound {
            return Err(OptimizerError::model(format!(
                "Constraint '{}' has invalid bounds [{}, {}]",
                name, lower_bound, upper_bound
            )));
        }
        for (handle, coefficient) in expression.terms() {
            self.check_handle(*handle)?;
            if !coefficient.is_finite() {
                return Err(OptimizerError::model(format!(
                    "Constraint '{}' has non-finite coefficient {}",
                    name, coefficient
                )));
            }
        }
        self.invalidate_solution();

        tracing::trace!(%name, terms = expression.terms().len(), "Added constraint");
        self.constraint_names.insert(name.clone());
        self.constraints
            .push(Constraint::new(name, expression, lower_bound, upper_bound));
        Ok(())
    }

    /// Assign the objective coefficient of a variable.
    ///
    /// Assigned coefficients take effect on the next [`set_objective`] call.
    ///
    /// [`set_objective`]: SolverEngine::set_objective
    pub fn set_objective_coefficient(
        &mut self,
        handle: VariableHandle,
        coefficient: f64,
    ) -> OptimizerResult<()> {
        self.check_handle(handle)?;
        if !coefficient.is_finite() {
            return Err(OptimizerError::model(format!(
                "Objective coefficient {} for '{}' is not finite",
                coefficient, self.variables[handle.index()].name
            )));
        }
        self.pending_objective.insert(handle, coefficient);
        Ok(())
    }

    /// Commit the assigned coefficients as the objective.
    ///
    /// A second call replaces the previous objective entirely; coefficients
    /// have to be assigned again before it.
    pub fn set_objective(&mut self, direction: OptimizationType) {
        self.invalidate_solution();

        let expression: LinearExpr = std::mem::take(&mut self.pending_objective)
            .into_iter()
            .collect();
        if self.objective.is_some() {
            tracing::debug!(engine = %self.name, "Replacing existing objective");
        }
        self.objective = Some(ObjectiveFunction::new(direction, expression));
    }

    pub fn objective(&self) -> Option<&ObjectiveFunction> {
        self.objective.as_ref()
    }

    /// Run the backend on the recorded model.
    ///
    /// Non-optimal outcomes are returned as a status, not as an error; only
    /// calling this before an objective exists is an error.
    pub fn solve(&mut self) -> OptimizerResult<SolutionStatus> {
        let objective = self
            .objective
            .clone()
            .ok_or_else(|| OptimizerError::state("Objective must be set before solving."))?;
        let problem = self.build_problem(objective);

        tracing::debug!(
            engine = %self.name,
            backend = self.backend.name(),
            variables = problem.num_variables(),
            constraints = problem.constraints.len(),
            "Solving model"
        );

        let start_time = Instant::now();
        let mut solution = match self.backend.solve(&problem) {
            Ok(solution) => solution,
            Err(e) => {
                tracing::warn!(engine = %self.name, error = %e, "Backend failed");
                let elapsed = start_time.elapsed().as_secs_f64() * 1000.0;
                Solution::new(SolutionStatus::Error, e.to_string())
                    .with_statistics(problem.statistics(elapsed))
            }
        };

        if solution.is_optimal() && solution.variable_values.len() != problem.num_variables() {
            let message = format!(
                "Backend returned {} values for {} variables",
                solution.variable_values.len(),
                problem.num_variables()
            );
            solution = Solution::new(SolutionStatus::Error, message)
                .with_statistics(solution.statistics);
        }

        let status = solution.status;
        if status.is_optimal() {
            tracing::info!(
                engine = %self.name,
                objective = solution.optimal_value.unwrap_or_default(),
                time_ms = solution.statistics.solve_time_ms,
                "Optimal solution found"
            );
        } else {
            tracing::warn!(engine = %self.name, %status, message = %solution.message, "Solve did not reach optimality");
        }
        self.solution = Some(solution);
        Ok(status)
    }

    /// Value of a variable after an optimal solve
    pub fn value(&self, handle: VariableHandle) -> OptimizerResult<f64> {
        self.check_handle(handle)?;
        let solution = self.optimal_solution()?;
        Ok(solution.variable_values[handle.index()])
    }

    /// Objective value after an optimal solve
    pub fn objective_value(&self) -> OptimizerResult<f64> {
        let solution = self.optimal_solution()?;
        solution
            .optimal_value
            .ok_or_else(|| OptimizerError::state("Backend did not report an objective value."))
    }

    /// Status of the last solve, if any
    pub fn status(&self) -> Option<SolutionStatus> {
        self.solution.as_ref().map(|s| s.status)
    }

    /// Backend message of the last solve, if any
    pub fn last_message(&self) -> Option<&str> {
        self.solution.as_ref().map(|s| s.message.as_str())
    }

    pub fn statistics(&self) -> Option<&SolverStatistics> {
        self.solution.as_ref().map(|s| &s.statistics)
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Snapshot of the model as it would be handed to the backend
    pub fn to_problem(&self) -> OptimizationProblem {
        let objective = self.objective.clone().unwrap_or_else(|| {
            ObjectiveFunction::new(OptimizationType::Maximize, LinearExpr::new())
        });
        self.build_problem(objective)
    }

    /// Let the backend check the recorded model without solving it
    pub fn validate(&self) -> OptimizerResult<Vec<String>> {
        self.backend
            .validate(&self.to_problem())
            .map_err(|e| OptimizerError::model(e.to_string()))
    }

    /// Drop every variable, constraint, objective and solution
    pub fn reset(&mut self) {
        self.variables.clear();
        self.variable_names.clear();
        self.constraints.clear();
        self.constraint_names.clear();
        self.pending_objective.clear();
        self.objective = None;
        self.solution = None;
    }

    fn build_problem(&self, objective: ObjectiveFunction) -> OptimizationProblem {
        OptimizationProblem::new(objective)
            .with_name(self.name.clone())
            .with_variables(self.variables.clone())
            .with_config(self.config.clone())
            .with_constraints(self.constraints.clone())
    }

    fn optimal_solution(&self) -> OptimizerResult<&Solution> {
        match &self.solution {
            Some(solution) if solution.is_optimal() => Ok(solution),
            Some(solution) => Err(OptimizerError::state(format!(
                "Values are unavailable: last solve ended with status {}",
                solution.status
            ))),
            None => Err(OptimizerError::state("Model has not been solved.")),
        }
    }

    fn check_handle(&self, handle: VariableHandle) -> OptimizerResult<()> {
        if handle.index() < self.variables.len() {
            Ok(())
        } else {
            Err(OptimizerError::model(format!(
                "Unknown variable handle {}",
                handle.index()
            )))
        }
    }

    fn invalidate_solution(&mut self) {
        self.solution = None;
    }
}
