//! Headless Sketchboard runner.
//!
//! Usage: `sketchboard [--config <path>] <script.json>`
//!
//! Replays the script's input events and prints the resulting elements as JSON.

mod script;

use script::{load_script, ScriptError, ScriptRunner};
use sketchboard_core::EditorConfig;

struct Args {
    config: Option<String>,
    script: String,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, ScriptError> {
    let mut config = None;
    let mut script = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| ScriptError::Usage("--config needs a path".to_string()))?;
                config = Some(path);
            }
            _ if script.is_none() => script = Some(arg),
            _ => return Err(ScriptError::Usage(format!("unexpected argument {}", arg))),
        }
    }
    let script = script.ok_or_else(|| ScriptError::Usage("sketchboard [--config <path>] <script.json>".to_string()))?;
    Ok(Args { config, script })
}

fn run() -> Result<(), ScriptError> {
    let args = parse_args(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    config.validate()?;

    let events = load_script(&args.script)?;
    let mut runner = ScriptRunner::new(config);
    runner.run(&events)?;
    log::debug!("Visible world: {:?}", runner.visible_world());

    println!("{}", runner.elements_json()?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Starting Sketchboard");

    if let Err(err) = run() {
        log::error!("{}", err);
        eprintln!("sketchboard: {}", err);
        std::process::exit(1);
    }
}
