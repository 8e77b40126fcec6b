use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use std::path::PathBuf;

use distance_vector::protocol::RoundSnapshot;
use distance_vector::report::{format_round, format_routing_tables};
use distance_vector::{CarryOverMode, ConvergenceOutcome, SimulationConfig, Simulator};

#[derive(Parser)]
#[command(name = "distance-vector", about = "Simulate distance-vector routing convergence")]
struct Cli {
    /// JSON topology and update description
    #[arg(long)]
    config: PathBuf,

    #[arg(long)]
    max_rounds: Option<usize>,

    #[arg(long, value_enum)]
    carry_over: Option<CarryOverMode>,

    /// Print the final routing tables as JSON
    #[arg(long)]
    json: bool,

    /// Skip the per-round distance tables
    #[arg(long)]
    no_trace: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = SimulationConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(max_rounds) = cli.max_rounds {
        config.max_rounds = max_rounds;
    }
    if let Some(carry_over) = cli.carry_over {
        config.carry_over = carry_over;
    }
    config.validate()?;

    let edits = config.edits()?;
    let mut simulator = Simulator::from_config(&config);
    let trace = !cli.no_trace && !cli.json;

    let routers = simulator.graph().routers();
    let mut print_round = |snapshot: &RoundSnapshot| {
        if trace {
            print!("{}", format_round(snapshot, &routers));
        }
    };
    let outcome = simulator.converge(&mut print_round);
    print_outcome(outcome, cli.json)?;

    if edits.is_empty() {
        return Ok(());
    }

    simulator.apply_edits(&edits);
    let routers = simulator.graph().routers();
    let mut print_round = |snapshot: &RoundSnapshot| {
        if trace {
            print!("{}", format_round(snapshot, &routers));
        }
    };
    let outcome = simulator.reconverge(&mut print_round);
    print_outcome(outcome, cli.json)?;

    Ok(())
}

fn print_outcome(outcome: &ConvergenceOutcome, json: bool) -> Result<()> {
    if !outcome.converged {
        warn!("Stopped at the round cap after {} rounds", outcome.rounds);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.state.routing_tables)?);
    } else {
        print!("{}", format_routing_tables(&outcome.state));
    }
    Ok(())
}
