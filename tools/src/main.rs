//! dash-runner: headless driver for the sales dashboard pipeline.
//!
//! Usage:
//!   dash-runner --seed 42 --records 25000 --data-dir ./data
//!   dash-runner --ipc-mode --start 2025-01-01
//!
//! IPC mode reads one JSON object per line on stdin:
//!   {"type":"get_state"}
//!   {"type":"command","command":{"cmd":"set_price_shift","percent":10}}
//!   {"type":"quit"}
//! and answers each with the JSON dashboard view (or {"error": ...}).

use anyhow::Result;
use chrono::NaiveDate;
use salesdash_core::{
    command::{DashboardCommand, Session},
    config::DashboardConfig,
    dashboard::{Dashboard, DashboardView},
};
use std::env;
use std::io::{self, BufRead, Write};
use std::path::Path;
use uuid::Uuid;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    Command { command: DashboardCommand },
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let ipc_mode = args.iter().any(|a| a == "--ipc-mode");
    let data_dir = args
        .windows(2)
        .find(|w| w[0] == "--data-dir")
        .map(|w| w[1].as_str())
        .unwrap_or("./data");

    let mut config = if Path::new(data_dir).is_dir() {
        DashboardConfig::load(data_dir)?
    } else {
        log::warn!("data dir {data_dir} not found, using built-in defaults");
        DashboardConfig::default_test()
    };
    config.generation.seed = parse_arg(&args, "--seed", config.generation.seed);
    config.generation.record_count = parse_arg(&args, "--records", config.generation.record_count);
    let start = args
        .windows(2)
        .find(|w| w[0] == "--start")
        .and_then(|w| w[1].parse::<NaiveDate>().ok());
    if let Some(start) = start {
        config.generation.start = start.and_hms_opt(0, 0, 0).unwrap_or(config.generation.start);
    }

    let session_id = Uuid::new_v4();
    if !ipc_mode {
        println!("Sales Dashboard — dash-runner");
        println!("  session:   {session_id}");
        println!("  seed:      {}", config.generation.seed);
        println!("  records:   {}", config.generation.record_count);
        println!("  start:     {}", config.generation.start);
        println!("  data_dir:  {data_dir}");
        println!();
    }

    let mut dashboard = Dashboard::new(config)?;
    let mut session = Session::new(&dashboard)?;

    if ipc_mode {
        log::info!("session {session_id} entering ipc mode");
        run_ipc_loop(&mut dashboard, &mut session)?;
    } else {
        let view = session.view(&mut dashboard)?;
        print_summary(&view);
    }

    Ok(())
}

fn run_ipc_loop(dashboard: &mut Dashboard, session: &mut Session) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Unparseable command: {e}");
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {
                let view = session.view(dashboard)?;
                writeln!(stdout, "{}", serde_json::to_string(&view)?)?;
            }
            IpcCommand::Command { command } => {
                // Rejected commands leave the session as it was.
                if let Err(e) = session.apply(dashboard, command) {
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
                let view = session.view(dashboard)?;
                writeln!(stdout, "{}", serde_json::to_string(&view)?)?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(stdout, "{err_json}")?;
    stdout.flush()?;
    Ok(())
}

fn print_summary(view: &DashboardView) {
    let k = &view.kpis;
    println!("=== EXECUTIVE SUMMARY ===");
    println!("  dataset:            {}", view.dataset_id);
    println!("  records:            {}", k.record_count);
    println!("  revenue forecast:   ${:.2}B", k.revenue_forecast / 1e9);
    println!("  operating margin:   {}", fmt_opt(k.operating_margin_pct, "%"));
    println!("  critical alerts:    {}", k.critical_alerts);
    println!("  inventory velocity: {}", fmt_opt(k.inventory_velocity, "x"));
    println!("  supply points:      {}", view.supply_chain.len());

    println!();
    println!("=== REVENUE BY THEATER ===");
    for (theater, revenue) in &view.revenue_by_theater {
        println!("  {theater:<22} ${revenue:>16.0}");
    }

    println!();
    println!("=== BENFORD (observed vs expected) ===");
    if view.benford.observed.is_empty() {
        println!("  (no data)");
    }
    for (digit, observed) in &view.benford.observed {
        let expected = view.benford.expected.get(digit).copied().unwrap_or(0.0);
        println!("  {digit}: {observed:.4}  vs  {expected:.4}");
    }

    println!();
    println!("=== AUDIT TRAIL (top 10) ===");
    for r in view.audit_trail.iter().take(10) {
        println!(
            "  {} | {:<20} | {:<20} | ${:>10.0} | z={:.2}",
            r.id(),
            r.sale().theater,
            r.sale().model,
            r.gross_revenue(),
            r.revenue_z_score()
        );
    }
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{v:.2}{unit}"))
        .unwrap_or_else(|| "n/a".into())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
