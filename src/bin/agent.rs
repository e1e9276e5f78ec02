//! CLI entry point: connects to a referee and runs one [`Agent`] for a
//! game (spec.md §6, expanded by SPEC_FULL.md §8's CLI section).

use std::net::TcpStream;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::error;

use clue_agent::agent::{Agent, StrongAgent, WeakAgent};
use clue_agent::proto::dispatch;
use clue_agent::proto::messager::{BufferedMessager, LineMessager, Messager};

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum AgentStrength {
    /// Propagator only.
    Weak,
    /// Propagator plus the solution enumerator.
    Strong,
}

impl std::fmt::Display for AgentStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStrength::Weak => write!(f, "weak"),
            AgentStrength::Strong => write!(f, "strong"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Framing {
    Line,
    Buffered,
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Framing::Line => write!(f, "line"),
            Framing::Buffered => write!(f, "buffered"),
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// Name announced to the referee on connect.
    name: String,

    /// Referee address, e.g. 127.0.0.1:4000.
    addr: String,

    #[clap(long, value_enum, default_value_t = AgentStrength::Strong)]
    agent: AgentStrength,

    #[clap(long, value_enum, default_value_t = Framing::Line)]
    framing: Framing,

    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let stream = match TcpStream::connect(&cli.addr) {
        Ok(s) => s,
        Err(e) => {
            error!("failed to connect to {}: {e}", cli.addr);
            return ExitCode::FAILURE;
        }
    };

    let mut agent: Box<dyn Agent> = match cli.agent {
        AgentStrength::Weak => Box::new(WeakAgent::new()),
        AgentStrength::Strong => Box::new(StrongAgent::new()),
    };

    let result = match cli.framing {
        Framing::Line => {
            let mut messager = match LineMessager::connect(stream) {
                Ok(m) => m,
                Err(e) => {
                    error!("failed to set up line framing: {e}");
                    return ExitCode::FAILURE;
                }
            };
            dispatch::run(&cli.name, agent.as_mut(), &mut messager as &mut dyn Messager)
        }
        Framing::Buffered => {
            let mut messager = match BufferedMessager::connect(stream) {
                Ok(m) => m,
                Err(e) => {
                    error!("failed to set up buffered framing: {e}");
                    return ExitCode::FAILURE;
                }
            };
            dispatch::run(&cli.name, agent.as_mut(), &mut messager as &mut dyn Messager)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
