//! desk-runner: line-oriented host for the pension desk tools.
//!
//! Usage:
//!   desk-runner --list
//!   desk-runner --db desk.db --reset
//!   desk-runner --config desk.json
//!
//! Reads one JSON command per line on stdin and writes one JSON reply per
//! line on stdout:
//!   {"type": "call", "tool": "check_fraud_status", "args": {...}}
//!   {"type": "list"}
//!   {"type": "quit"}

use anyhow::Result;
use pension_desk_core::{
    config::DeskConfig,
    registry::{ToolContext, ToolRegistry},
};
use serde_json::{json, Value};
use std::env;
use std::io::{self, BufRead, Write};

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    Call {
        tool: String,
        #[serde(default)]
        args: Value,
    },
    List,
    Quit,
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let list_only = args.iter().any(|a| a == "--list");
    let reset = args.iter().any(|a| a == "--reset");

    let mut config = match parse_arg(&args, "--config") {
        Some(path) => DeskConfig::load(path)?,
        None => DeskConfig::from_env(),
    };
    if let Some(db) = parse_arg(&args, "--db") {
        config.db_path = db.to_string();
    }

    let registry = ToolRegistry::with_desk_tools();

    if list_only {
        println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        return Ok(());
    }

    log::info!("desk-runner using database {}", config.db_path);
    let ctx = ToolContext::system(config);

    if reset {
        let reply = registry.call(&ctx, "initialize_database", &json!({}));
        eprintln!("{reply}");
    }

    run_ipc_loop(&registry, &ctx)
}

fn run_ipc_loop(registry: &ToolRegistry, ctx: &ToolContext) -> Result<()> {
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
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                let err_json = json!({ "success": false, "error": e.to_string() });
                writeln!(stdout, "{err_json}")?;
                stdout.flush()?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::List => {
                writeln!(stdout, "{}", json!({ "tools": registry.definitions() }))?;
            }
            IpcCommand::Call { tool, args } => {
                let args = if args.is_null() { json!({}) } else { args };
                let reply = registry.call(ctx, &tool, &args);
                writeln!(stdout, "{reply}")?;
            }
        }
        stdout.flush()?;
    }
    Ok(())
}

fn parse_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
