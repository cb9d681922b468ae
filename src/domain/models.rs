use super::value_objects::{OptimizationType, SolutionStatus, SolverBackend, VariableType};

/// Opaque reference to a decision variable, issued by the engine that owns it.
///
/// Domain entities keep a handle to express "am I selected"; the variable
/// itself and its backend counterpart stay with the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableHandle(usize);

impl VariableHandle {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Column index of the variable inside its model
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, variable_type: VariableType) -> Self {
        match variable_type {
            VariableType::Binary => Self::binary(name),
            VariableType::Integer => Self::integer(name),
            VariableType::Continuous => Self::continuous(name),
        }
    }

    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Integer,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.variable_type,
            VariableType::Integer | VariableType::Binary
        )
    }
}

/// Sparse linear expression `Σ coefficient_i · variable_i`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VariableHandle, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the given variables, each with coefficient 1
    pub fn sum<I>(handles: I) -> Self
    where
        I: IntoIterator<Item = VariableHandle>,
    {
        handles.into_iter().map(|h| (h, 1.0)).collect()
    }

    pub fn add_term(&mut self, variable: VariableHandle, coefficient: f64) {
        self.terms.push((variable, coefficient));
    }

    pub fn with_term(mut self, variable: VariableHandle, coefficient: f64) -> Self {
        self.add_term(variable, coefficient);
        self
    }

    pub fn terms(&self) -> &[(VariableHandle, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Evaluate the expression against dense variable values
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|(h, c)| c * values.get(h.index()).copied().unwrap_or(0.0))
            .sum()
    }
}

impl FromIterator<(VariableHandle, f64)> for LinearExpr {
    fn from_iter<T: IntoIterator<Item = (VariableHandle, f64)>>(iter: T) -> Self {
        Self {
            terms: iter.into_iter().collect(),
        }
    }
}

/// Ranged linear constraint `lower_bound ≤ expression ≤ upper_bound`.
///
/// Either bound may be infinite to express a one-sided inequality.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub expression: LinearExpr,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(
        name: impl Into<String>,
        expression: LinearExpr,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Self {
        Self {
            expression,
            lower_bound,
            upper_bound,
            name: name.into(),
        }
    }

    pub fn is_equality(&self) -> bool {
        self.lower_bound == self.upper_bound
    }

    pub fn has_lower_bound(&self) -> bool {
        self.lower_bound.is_finite()
    }

    pub fn has_upper_bound(&self) -> bool {
        self.upper_bound.is_finite()
    }
}

/// Objective function to minimize or maximize
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub expression: LinearExpr,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, expression: LinearExpr) -> Self {
        Self {
            optimization_type,
            expression,
        }
    }

    pub fn is_maximize(&self) -> bool {
        self.optimization_type == OptimizationType::Maximize
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Wall-clock limit in seconds, honoured by backends that support it
    pub time_limit: Option<f64>,
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_gap_tolerance(mut self, gap: f64) -> Self {
        self.gap_tolerance = Some(gap);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Complete optimization problem, as handed to a backend
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    pub name: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_constraints(mut self, constraints: Vec<Constraint>) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.solver_config = config;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn num_binary_variables(&self) -> usize {
        self.variables
            .iter()
            .filter(|v| v.variable_type == VariableType::Binary)
            .count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_variables() > 0
    }

    pub(crate) fn statistics(&self, solve_time_ms: f64) -> SolverStatistics {
        SolverStatistics {
            solve_time_ms,
            num_variables: self.num_variables() as u32,
            num_constraints: self.constraints.len() as u32,
            num_integer_vars: self.num_integer_variables() as u32,
            num_binary_vars: self.num_binary_variables() as u32,
        }
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_integer_vars: u32,
    pub num_binary_vars: u32,
}

/// Solution to an optimization problem
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}
