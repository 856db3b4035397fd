use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "arrayplay", version)]
struct Cli {
    /// Log engine diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play a script step by step, printing every frame.
    Play(PlayArgs),
    /// Play a script without delays and print the final report.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct PlayArgs {
    /// Input script JSON (`initial_arr`, `manipulations`, optional `lines` and `final_arr`).
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Timing configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Playback rate override; 2.0 plays twice as fast.
    #[arg(long)]
    speed: Option<f64>,

    /// Skip all delays.
    #[arg(long)]
    instant: bool,

    /// Print events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input script JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Play(args) => cmd_play(args),
        Command::Check(args) => cmd_check(args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_script(path: &Path) -> anyhow::Result<arrayplay::Script> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("open script '{}'", path.display()))?;
    arrayplay::Script::from_json_str(&text).with_context(|| "parse script JSON")
}

fn load_config(args: &PlayArgs) -> anyhow::Result<arrayplay::PlaybackConfig> {
    let mut cfg = match &args.config {
        Some(path) => arrayplay::PlaybackConfig::from_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => arrayplay::PlaybackConfig::default(),
    };
    if let Some(speed) = args.speed {
        cfg.speed = speed;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let cfg = load_config(&args)?;

    let engine = if args.instant {
        arrayplay::Engine::with_pacer(script.initial.clone(), cfg, arrayplay::NoPause)?
    } else {
        arrayplay::Engine::from_script(&script, cfg)?
    };

    let events = engine.subscribe();
    let Some(handle) = engine.start(&script)?.into_handle() else {
        anyhow::bail!("engine refused to start (bug: fresh engine is never running)");
    };

    for event in events {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            print_event(&event);
        }
        if matches!(event, arrayplay::PlaybackEvent::Finished(_)) {
            break;
        }
    }

    handle.join()?;
    Ok(())
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let script = read_script(&args.in_path)?;
    let engine = arrayplay::Engine::with_pacer(
        script.initial.clone(),
        arrayplay::PlaybackConfig::default(),
        arrayplay::NoPause,
    )?;
    let Some(report) = engine.run(&script) else {
        anyhow::bail!("engine refused to start (bug: fresh engine is never running)");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("steps: {}", report.steps);
    println!("final: {}", format_values(&report.elements));
    println!("variables: {}", format_vars(&report.variables));
    match report.final_matches_expected {
        Some(true) => println!("expected result: match"),
        Some(false) => println!("expected result: MISMATCH"),
        None => {}
    }
    println!("warnings: {}", report.warnings.len());
    for w in &report.warnings {
        println!("  {w}");
    }
    Ok(())
}

fn print_event(event: &arrayplay::PlaybackEvent) {
    match event {
        arrayplay::PlaybackEvent::RunStarted { total, view } => {
            println!("start: {} ({total} steps)", format_values(&view.elements));
        }
        arrayplay::PlaybackEvent::Step(frame) => {
            let line = frame
                .view
                .active_line
                .map_or_else(|| "-".to_string(), |l| l.to_string());
            let mut out = format!(
                "[{:>3} | line {line:>3}] {:<8} {}",
                frame.step,
                frame.command.kind().as_str(),
                format_values(&frame.view.elements)
            );
            if !frame.view.variables.is_empty() {
                out.push_str(&format!("  vars {}", format_vars(&frame.view.variables)));
            }
            for hint in &frame.view.transitions {
                out.push_str(&format!("  {}:{:?}", hint.id, hint.kind));
            }
            if let Some(w) = &frame.warning {
                out.push_str(&format!("  skipped: {}", w.message));
            }
            println!("{out}");
        }
        arrayplay::PlaybackEvent::Finished(report) => {
            println!(
                "done: {} ({} warnings)",
                format_values(&report.elements),
                report.warnings.len()
            );
        }
    }
}

fn format_values(model: &arrayplay::ArrayModel) -> String {
    let items: Vec<String> = model.iter().map(|e| e.value.to_string()).collect();
    format!("[{}]", items.join(", "))
}

fn format_vars(vars: &std::collections::BTreeMap<String, serde_json::Value>) -> String {
    let items: Vec<String> = vars.iter().map(|(k, v)| format!("{k}={v}")).collect();
    format!("{{{}}}", items.join(", "))
}
