//! VMSIM command line driver
//!
//! Reads one JSON request per line and writes one JSON response per line.
//! Requests come from the file named by the first argument, or from stdin.
//!
//! ```text
//! $ printf '%s\n' '{"op":"init","refs":"1 2 3 1","frames":2,"algo":"lru"}' '{"op":"run"}' | vmsim-cli
//! ```

mod logger;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::process::ExitCode;

use vmsim_services::{SimulationSession, handle};

use crate::logger::StderrLogger;

/// Feed every request line in `input` to `session`, returning the number handled
fn drive<R: BufRead, W: Write>(session: &SimulationSession, input: R, mut output: W) -> io::Result<usize> {
    let mut handled = 0;
    for line in input.lines() {
        let line = line?;
        let request = line.trim();
        if request.is_empty() || request.starts_with('#') {
            continue;
        }
        writeln!(output, "{}", handle(session, request))?;
        handled += 1;
    }
    output.flush()?;
    Ok(handled)
}

fn main() -> ExitCode {
    if let Err(e) = StderrLogger::from_env().init() {
        eprintln!("vmsim-cli: logger setup failed: {}", e);
    }

    let session = SimulationSession::new();
    let stdout = io::stdout().lock();
    let result = match std::env::args().nth(1) {
        Some(path) => File::open(&path).and_then(|file| drive(&session, BufReader::new(file), stdout)),
        None => drive(&session, io::stdin().lock(), stdout),
    };

    match result {
        Ok(handled) => {
            log::info!("handled {} requests", handled);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("vmsim-cli: {}", e);
            ExitCode::FAILURE
        }
    }
}
