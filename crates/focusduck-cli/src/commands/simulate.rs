use std::path::PathBuf;

use clap::Args;
use focusduck_core::{
    Config, FocusSession, Input, MemoryStore, SessionDriver, SessionSnapshot, SessionStore,
    SqliteStore,
};

use crate::scenario::{Scenario, StepInput};

#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario file (TOML)
    scenario: PathBuf,
    /// Persist counters and events into this SQLite database
    #[arg(long)]
    db: Option<PathBuf>,
    /// Print the animation state after every step (stderr)
    #[arg(long)]
    trace: bool,
}

pub fn run(args: SimulateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let scenario = Scenario::load(&args.scenario)?;
    let config = match scenario.config.clone() {
        Some(config) => config,
        None => Config::load()?,
    };
    config.validate()?;

    let started_at = scenario.started_at()?;
    let params = scenario.params(&config, started_at);
    let steps = scenario
        .steps
        .iter()
        .map(|step| Ok((step.at_ms, step.input, step.to_input(&params.session_id, started_at)?)))
        .collect::<Result<Vec<_>, focusduck_core::ValidationError>>()?;

    let session = FocusSession::new(params, &config);
    let tick_ms = config.session.tick_ms;
    let snapshot = match &args.db {
        Some(path) => {
            let store = SqliteStore::open(path)?;
            replay(SessionDriver::new(session, store, tick_ms), &steps, scenario.end_ms(), args.trace)
        }
        None => replay(
            SessionDriver::new(session, MemoryStore::new(), tick_ms),
            &steps,
            scenario.end_ms(),
            args.trace,
        ),
    };

    tracing::info!(started_at = %started_at, "simulation finished");
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn replay<S: SessionStore>(
    mut driver: SessionDriver<S>,
    steps: &[(u64, StepInput, Input)],
    end_ms: u64,
    trace: bool,
) -> SessionSnapshot {
    for (at_ms, label, input) in steps {
        driver.dispatch_at(*at_ms, input.clone());
        if trace {
            trace_line(*at_ms, label.as_str(), &driver);
        }
    }
    driver.advance_to(end_ms.max(driver.now_ms()));
    if trace {
        trace_line(driver.now_ms(), "end", &driver);
    }
    driver.dispose()
}

fn trace_line<S: SessionStore>(at_ms: u64, label: &str, driver: &SessionDriver<S>) {
    let session = driver.session();
    eprintln!(
        "{at_ms:>9}ms  {label:<15} {:<19} {:>6.2}%",
        session.animation().as_str(),
        session.progress().percent()
    );
}
