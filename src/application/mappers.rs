// Mappers: convert between gRPC protobuf types and domain types
// Keeps protobuf types out of the loadout and allocation layers

use tonic::Status;

use crate::domain::{OptimizerError, SolverBackend, SolverService};
use crate::loadout::{Item, LoadoutResult, PowerType, Stats, Target};

pub mod game_optimizer {
    tonic::include_proto!("game_optimizer");
}

use game_optimizer as proto;

/// Convert protobuf Stats to domain Stats
pub fn proto_to_domain_stats(stats: &proto::Stats) -> Stats {
    Stats {
        power_physical: stats.power_physical,
        power_magical: stats.power_magical,
        attack_speed: stats.attack_speed,
        health: stats.health,
        mana: stats.mana,
        physical_protection: stats.physical_protection,
        magical_protection: stats.magical_protection,
    }
}

/// Convert protobuf Target to domain Target
pub fn proto_to_domain_target(target: &proto::Target) -> Result<Target, Box<Status>> {
    let power_type = match proto::PowerType::try_from(target.power_type) {
        Ok(proto::PowerType::Physical) => PowerType::Physical,
        Ok(proto::PowerType::Magical) => PowerType::Magical,
        Err(_) => return Err(Box::new(Status::invalid_argument("Invalid power type"))),
    };
    let base_stats = target
        .base_stats
        .as_ref()
        .map(proto_to_domain_stats)
        .unwrap_or_default();

    Ok(Target::new(target.name.clone(), power_type, base_stats))
}

/// Convert protobuf Item to domain Item
pub fn proto_to_domain_item(item: &proto::Item) -> Item {
    let stats = item
        .stats
        .as_ref()
        .map(proto_to_domain_stats)
        .unwrap_or_default();
    Item::new(item.name.clone(), stats).with_starter(item.starter)
}

/// Unknown backend values fall back to `Auto`
pub fn proto_to_domain_backend(solver: i32) -> SolverBackend {
    match proto::SolverBackend::try_from(solver) {
        Ok(proto::SolverBackend::Auto) | Err(_) => SolverBackend::Auto,
        Ok(proto::SolverBackend::MicroLp) => SolverBackend::MicroLp,
        Ok(proto::SolverBackend::CoinCbc) => SolverBackend::CoinCbc,
        Ok(proto::SolverBackend::Highs) => SolverBackend::Highs,
    }
}

/// Convert an accepted loadout into a response; empty slots become ""
pub fn domain_to_proto_loadout(
    result: &LoadoutResult<'_>,
    solver_name: &str,
) -> proto::LoadoutResponse {
    proto::LoadoutResponse {
        success: true,
        metric: result.metric,
        objective_value: result.objective_value,
        items: result
            .loadout
            .slots()
            .iter()
            .map(|slot| slot.map(|item| item.name().to_string()).unwrap_or_default())
            .collect(),
        message: String::new(),
        solver_backend: solver_name.to_string(),
    }
}

/// Response for a loadout the backend could not produce
pub fn failed_loadout(message: String, solver_name: &str) -> proto::LoadoutResponse {
    proto::LoadoutResponse {
        success: false,
        message,
        solver_backend: solver_name.to_string(),
        ..Default::default()
    }
}

pub fn domain_to_proto_solver_info(solver: &dyn SolverService) -> proto::SolverInfo {
    let (version, capabilities) = match solver.name() {
        "HiGHS" => (
            "1.7+",
            vec![
                "Mixed-Integer Programming",
                "Primal/Dual Simplex",
                "Interior Point Method",
                "Time Limit",
            ],
        ),
        "COIN-OR CBC" => (
            "2.10+",
            vec!["Mixed-Integer Programming", "Branch and Bound", "Cutting Planes"],
        ),
        _ => ("0.2+", vec!["Mixed-Integer Programming", "Pure Rust"]),
    };

    proto::SolverInfo {
        name: solver.name().to_string(),
        version: version.to_string(),
        supports_mip: solver.supports_mip(),
        supports_time_limit: solver.supports_time_limit(),
        capabilities: capabilities.into_iter().map(String::from).collect(),
    }
}

/// Caller mistakes become client errors; everything else is internal
pub fn optimizer_error_to_status(error: &OptimizerError) -> Status {
    match error {
        OptimizerError::InsufficientCandidates { .. } | OptimizerError::Model(_) => {
            Status::invalid_argument(error.to_string())
        }
        OptimizerError::State(_) => Status::failed_precondition(error.to_string()),
        OptimizerError::Solve { .. } | OptimizerError::Optimization(_) => {
            Status::internal(error.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SolutionStatus;

    #[test]
    fn missing_stats_default_to_zero() {
        let item = proto_to_domain_item(&proto::Item {
            name: "Boots".to_string(),
            stats: None,
            starter: true,
        });
        assert_eq!(item.stats(), &Stats::default());
        assert!(item.is_starter());
    }

    #[test]
    fn rejects_unknown_power_type() {
        let target = proto::Target {
            name: "Odd".to_string(),
            power_type: 7,
            base_stats: None,
        };
        assert!(proto_to_domain_target(&target).is_err());
    }

    #[test]
    fn unknown_backend_is_auto() {
        assert_eq!(proto_to_domain_backend(42), SolverBackend::Auto);
        assert_eq!(
            proto_to_domain_backend(proto::SolverBackend::Highs as i32),
            SolverBackend::Highs
        );
    }

    #[test]
    fn error_codes() {
        let insufficient = OptimizerError::InsufficientCandidates {
            required: 6,
            available: 2,
        };
        assert_eq!(
            optimizer_error_to_status(&insufficient).code(),
            tonic::Code::InvalidArgument
        );

        let solve = OptimizerError::Solve {
            status: SolutionStatus::Infeasible,
            message: String::new(),
        };
        assert_eq!(optimizer_error_to_status(&solve).code(), tonic::Code::Internal);
    }
}
