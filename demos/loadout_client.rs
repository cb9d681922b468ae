// Example: loadout optimization over gRPC
//
// Sends one candidate pool twice: once as a unary request and once streamed
// item by item, then checks an empty allocation problem on the server.
//
// Pool: 10 items with power 20 + 5·i and attack speed 10 + 2·i, two of the
// strongest flagged as starters. Only one starter may be picked, so the
// weaker starter gets swapped for the next-best regular item.

use tonic::Request;

pub mod game_optimizer {
    tonic::include_proto!("game_optimizer");
}

use game_optimizer::{
    game_optimizer_client::GameOptimizerClient, loadout_chunk::Chunk, Empty, Item, LoadoutChunk,
    LoadoutRequest, PowerType, SolverBackend, Stats, Target, ValidateRequest,
};

const NUM_ITEMS: usize = 10;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut client = GameOptimizerClient::connect("http://127.0.0.1:50051").await?;

    println!("=== Loadout Optimization (gRPC) ===\n");

    let solvers = client
        .get_available_solvers(Request::new(Empty {}))
        .await?
        .into_inner()
        .solvers;
    println!("Available solvers:");
    for solver in &solvers {
        println!("  • {} (v{})", solver.name, solver.version);
    }

    let target = hunter();
    let candidates = candidate_pool();

    println!("\nUnary request with {} candidates...", candidates.len());
    let response = client
        .optimize_loadout(Request::new(LoadoutRequest {
            target: Some(target.clone()),
            candidates: candidates.clone(),
            solver: SolverBackend::Auto as i32,
        }))
        .await?
        .into_inner();
    print_loadout(&response);

    println!("\nStreaming the same pool item by item...");
    let mut chunks = vec![
        LoadoutChunk {
            chunk: Some(Chunk::Target(target)),
        },
        LoadoutChunk {
            chunk: Some(Chunk::Solver(SolverBackend::MicroLp as i32)),
        },
    ];
    chunks.extend(candidates.into_iter().map(|item| LoadoutChunk {
        chunk: Some(Chunk::Candidate(item)),
    }));
    let response = client
        .optimize_loadout_stream(Request::new(tokio_stream::iter(chunks)))
        .await?
        .into_inner();
    print_loadout(&response);

    let validation = client
        .validate_allocation_problem(Request::new(ValidateRequest {
            solver: SolverBackend::Auto as i32,
        }))
        .await?
        .into_inner();
    println!(
        "\nEmpty allocation problem valid: {} (variables: {})",
        validation.success, validation.value
    );
    for error in validation.errors {
        println!("  ✗ {}", error);
    }

    Ok(())
}

fn hunter() -> Target {
    Target {
        name: "Hunter".to_string(),
        power_type: PowerType::Physical as i32,
        base_stats: Some(Stats {
            power_physical: 40.0,
            attack_speed: 100.0,
            health: 500.0,
            ..Default::default()
        }),
    }
}

fn candidate_pool() -> Vec<Item> {
    (0..NUM_ITEMS)
        .map(|i| Item {
            name: format!("Item {}", i + 1),
            stats: Some(Stats {
                power_physical: 20.0 + 5.0 * i as f64,
                attack_speed: 10.0 + 2.0 * i as f64,
                ..Default::default()
            }),
            starter: i >= NUM_ITEMS - 2,
        })
        .collect()
}

fn print_loadout(response: &game_optimizer::LoadoutResponse) {
    if !response.success {
        println!("✗ No loadout: {}", response.message);
        return;
    }

    println!("✓ Loadout found with {}", response.solver_backend);
    for (slot, item) in response.items.iter().enumerate() {
        let item = if item.is_empty() { "(empty)" } else { item };
        println!("  {}. {}", slot + 1, item);
    }
    println!("  Metric:          {:.1}", response.metric);
    println!("  Proxy objective: {:.1}", response.objective_value);
}
