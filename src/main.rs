//! `bdp-demo`: ejecuta un job de ejemplo sobre la lista `1..=N`.
//!
//! `bdp-demo <sum|even-squares|mean|sorted> [--parts P] [--upto N]`
//!
//! El runner sale de `BDP_RUNNER` (ver `bdp_rust::config`). Imprime el
//! `JobOutput` en JSON por stdout.

use std::process::ExitCode;

use bdp_core::Job;
use bdp_rust::{run_job, AppConfig, AppError};
use bdp_stages::{Even, ListChunk, ListItems, Mean, Sort, Square, Sum, SumCount};
use log::error;
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn demo_job(name: &str) -> Result<Job, AppError> {
    let base = Job::new().pre_process(ListChunk::default()).retrieve(ListItems::default());
    match name {
        "sum" => Ok(base.reduce(Sum, 0)),
        "even-squares" => Ok(base.filter(Even).map(Square).reduce(Sum, 0)),
        "mean" => Ok(base.reduce(SumCount, json!({"sum": 0, "count": 0})).post_process(Mean)),
        "sorted" => Ok(base.post_process(Sort)),
        other => Err(AppError::Config(format!("unknown demo job '{other}'"))),
    }
}

struct Args {
    job: String,
    parts: usize,
    upto: i64,
}

fn parse_args(args: &[String]) -> Result<Args, AppError> {
    let mut parsed = Args { job: "sum".into(),
                            parts: 3,
                            upto: 10 };
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--parts" | "--upto" => {
                let flag = args[i].as_str();
                let value = args.get(i + 1)
                                .ok_or_else(|| AppError::Config(format!("{flag} needs a value")))?;
                let invalid = || AppError::Config(format!("{flag}: invalid number '{value}'"));
                if flag == "--parts" {
                    parsed.parts = value.parse().map_err(|_| invalid())?;
                } else {
                    parsed.upto = value.parse().map_err(|_| invalid())?;
                }
                i += 1;
            }
            job => parsed.job = job.to_string(),
        }
        i += 1;
    }
    Ok(parsed)
}

fn run(args: &[String]) -> Result<(), AppError> {
    let args = parse_args(args)?;
    let config = AppConfig::from_env()?;
    let job = demo_job(&args.job)?;
    let context = json!({ "list": (1..=args.upto).collect::<Vec<i64>>() });
    let output = run_job(&config, &job, context, args.parts)?;
    let text = serde_json::to_string_pretty(&output).map_err(|e| AppError::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter)
                                     .with_writer(std::io::stderr)
                                     .try_init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("[bdp-demo] {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
