//! `bdp-worker`: ejecuta una partición leída de stdin.
//!
//! Uso:
//! - `bdp-worker` lee un `TaskMessage` JSON de stdin y escribe un
//!   `TaskReply` JSON en stdout. Un fallo del stage o del codec también es una
//!   respuesta (exit 0); sólo un fallo de E/S termina con código distinto.
//! - `bdp-worker --version` imprime la versión de codec aceptada.
//! - `bdp-worker --list-stages` imprime las claves registradas por tipo.
//!
//! Los logs van a stderr (`RUST_LOG`, por defecto `warn`).

use std::io::{self, Read, Write};
use std::process::ExitCode;

use bdp_core::worker::handle_json;
use bdp_core::{CancelToken, StageKind, StageRegistry, CODEC_VERSION};
use log::{debug, error};
use tracing_subscriber::EnvFilter;

const KINDS: [StageKind; 6] = [StageKind::PreProcess,
                               StageKind::Retrieve,
                               StageKind::Filter,
                               StageKind::Map,
                               StageKind::Reduce,
                               StageKind::PostProcess];

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(io::stderr)
                                     .with_target(false)
                                     .try_init();
}

fn list_stages(registry: &StageRegistry) -> String {
    KINDS.iter()
         .map(|kind| format!("{kind}: {}", registry.keys(*kind).join(", ")))
         .collect::<Vec<_>>()
         .join("\n")
}

fn run_task(registry: &StageRegistry) -> io::Result<()> {
    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    debug!("task received ({} bytes)", input.len());
    let reply = handle_json(registry, &input, &CancelToken::new());
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{reply}")?;
    stdout.flush()
}

fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    init_logging();
    let registry = bdp_stages::registry();

    match std::env::args().nth(1).as_deref() {
        Some("--version") => {
            println!("{CODEC_VERSION}");
            ExitCode::SUCCESS
        }
        Some("--list-stages") => {
            println!("{}", list_stages(&registry));
            ExitCode::SUCCESS
        }
        Some(other) => {
            eprintln!("[bdp-worker] unknown argument: {other}");
            ExitCode::from(2)
        }
        None => match run_task(&registry) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("worker i/o failed: {e}");
                ExitCode::from(1)
            }
        },
    }
}
