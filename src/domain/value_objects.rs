// Domain value objects shared by the engine, the backends and the model builders

use std::fmt;

/// Type of decision variable in the optimization model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    /// Continuous real number (x ∈ ℝ, x ≥ 0 by default)
    Continuous,
    /// Integer number (x ∈ ℤ, x ≥ 0 by default)
    Integer,
    /// Binary variable (x ∈ {0, 1})
    Binary,
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::Continuous => write!(f, "continuous"),
            VariableType::Integer => write!(f, "integer"),
            VariableType::Binary => write!(f, "binary"),
        }
    }
}

/// Direction of optimization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationType {
    /// Minimize the objective function
    Minimize,
    /// Maximize the objective function
    Maximize,
}

/// Outcome of a solve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    /// Found optimal solution
    Optimal,
    /// Problem has no feasible solution
    Infeasible,
    /// Objective can be improved infinitely
    Unbounded,
    /// Time limit reached before optimality was proven
    TimeLimit,
    /// Backend failed or returned a status we do not model
    Error,
}

impl SolutionStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolutionStatus::Optimal)
    }
}

impl fmt::Display for SolutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolutionStatus::Optimal => write!(f, "Optimal"),
            SolutionStatus::Infeasible => write!(f, "Infeasible"),
            SolutionStatus::Unbounded => write!(f, "Unbounded"),
            SolutionStatus::TimeLimit => write!(f, "Time Limit Reached"),
            SolutionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Solver backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverBackend {
    /// Best backend compiled into this build
    #[default]
    Auto,
    /// Pure-Rust microlp through good_lp
    MicroLp,
    /// COIN-OR CBC solver
    CoinCbc,
    /// HiGHS solver
    Highs,
}

impl fmt::Display for SolverBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverBackend::Auto => write!(f, "Auto"),
            SolverBackend::MicroLp => write!(f, "microlp"),
            SolverBackend::CoinCbc => write!(f, "COIN-OR CBC"),
            SolverBackend::Highs => write!(f, "HiGHS"),
        }
    }
}

impl std::str::FromStr for SolverBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SolverBackend::Auto),
            "microlp" => Ok(SolverBackend::MicroLp),
            "cbc" | "coin_cbc" | "coin-cbc" => Ok(SolverBackend::CoinCbc),
            "highs" => Ok(SolverBackend::Highs),
            other => Err(format!("unknown solver backend '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_parses_common_spellings() {
        assert_eq!("HiGHS".parse::<SolverBackend>(), Ok(SolverBackend::Highs));
        assert_eq!("coin-cbc".parse::<SolverBackend>(), Ok(SolverBackend::CoinCbc));
        assert_eq!("microlp".parse::<SolverBackend>(), Ok(SolverBackend::MicroLp));
        assert!("gurobi".parse::<SolverBackend>().is_err());
    }

    #[test]
    fn only_optimal_is_optimal() {
        assert!(SolutionStatus::Optimal.is_optimal());
        assert!(!SolutionStatus::TimeLimit.is_optimal());
        assert_eq!(SolutionStatus::TimeLimit.to_string(), "Time Limit Reached");
    }
}
