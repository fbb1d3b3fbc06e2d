use anyhow::{Context, Result};
use clap::Parser;
use daqinspect::cli::{Cli, Command, DumpArgs, MonitorArgs, OutputFormat, TimewarpArgs};
use daqinspect::config::InspectConfig;
use daqinspect::tree::{SnapshotFile, TreeSource};
use daqinspect::{dump, export, monitor, warp};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run_timewarp(args: &TimewarpArgs, config: &InspectConfig) -> Result<()> {
    println!("Parsing simple dump in {}", args.dump.display());
    let entries = dump::read_dump(&args.dump)?;
    let report = warp::scan(&dump::timestamps(&entries), &config.warp);

    match args.format {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!(
            "{}",
            report.to_json().context("failed to serialize warp report")?
        ),
    }
    Ok(())
}

fn run_dump(args: &DumpArgs, config: &InspectConfig) -> Result<()> {
    let source = SnapshotFile::new(&args.input);
    let root = source.open_root()?;

    println!(
        "Dumping contents as simple text columns in {}",
        args.output.display()
    );
    let lines = export::export(&root, &config.export);
    export::write_lines(&args.output, &lines)?;
    println!("Dumped contents to {}", args.output.display());
    Ok(())
}

fn run_monitor(args: &MonitorArgs, config: &InspectConfig) -> Result<()> {
    let source = SnapshotFile::new(&args.input);
    let mut stdout = std::io::stdout().lock();
    monitor::monitor(&source, &config.monitor, &mut stdout)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let mut config = match &args.config {
        Some(path) => InspectConfig::load(path)?,
        None => InspectConfig::default(),
    };

    match &args.command {
        Command::Timewarp(cmd) => {
            cmd.apply(&mut config);
            run_timewarp(cmd, &config)
        }
        Command::Dump(cmd) => {
            cmd.apply(&mut config);
            run_dump(cmd, &config)
        }
        Command::Monitor(cmd) => {
            cmd.apply(&mut config);
            run_monitor(cmd, &config)
        }
    }
}
