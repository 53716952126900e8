//! Headless replay of recorded canvas input.
//!
//! Usage: `wirecanvas-replay <script.json>` (or `-` for stdin). Prints the
//! resulting document and a short summary as JSON. Set `RUST_LOG=debug` to
//! trace state transitions.

mod replay;
mod script;

use std::io::Read;
use std::process::ExitCode;

use thiserror::Error;

use crate::replay::Replay;
use crate::script::Script;

/// Replay errors.
#[derive(Debug, Error)]
enum ReplayError {
    #[error("usage: wirecanvas-replay <script.json | ->")]
    Usage,
    #[error("Failed to read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid script: {0}")]
    Json(#[from] serde_json::Error),
}

fn read_script(path: &str) -> Result<Script, ReplayError> {
    let json = if path == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&json)?)
}

fn run() -> Result<(), ReplayError> {
    let path = std::env::args().nth(1).ok_or(ReplayError::Usage)?;
    let script = read_script(&path)?;
    log::info!("Replaying {} events from {path}", script.events.len());

    let replay = Replay::run(&script);
    log::info!("Rendered {} frames", replay.frames_rendered());
    println!("{}", serde_json::to_string_pretty(&replay.report())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting WireCanvas replay");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
