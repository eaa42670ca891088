use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use timerlog::cli::{Cli, Command, FileTimerArgs, OutputFormat};
use timerlog::config::TimerlogConfig;
use timerlog::decoder::decode_files;
use timerlog::deltas::reconstruct;
use timerlog::event::EventKind;
use timerlog::file_store::FileTimers;
use timerlog::log_file::LogFileWriter;
use timerlog::report::TimingReport;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; anomalies are logged at WARN
fn init_tracing(debug: bool) {
    let level = if debug {
        tracing::Level::TRACE
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Decode logs, pair events and print the report
fn run_report(files: &[PathBuf], format: OutputFormat, strict: bool) -> Result<()> {
    let summaries = decode_files(files).context("Failed to decode timer logs")?;
    let deltas = reconstruct(&summaries);
    let report = TimingReport::from_deltas(&deltas);

    match format {
        OutputFormat::Text => print!("{}", report.render_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    if strict && !report.anomalies.is_empty() {
        bail!("{} timer(s) excluded from the report", report.anomalies.len());
    }
    Ok(())
}

/// Parse `start:NAME` / `end:NAME`
fn parse_event_spec(spec: &str) -> Result<(EventKind, &str)> {
    match spec.split_once(':') {
        Some(("start", name)) => Ok((EventKind::Start, name)),
        Some(("end", name)) => Ok((EventKind::End, name)),
        _ => bail!("Invalid event {:?}: expected start:NAME or end:NAME", spec),
    }
}

fn run_emit(log: &Path, append: bool, events: &[String]) -> Result<()> {
    let parsed = events
        .iter()
        .map(|spec| parse_event_spec(spec))
        .collect::<Result<Vec<_>>>()?;

    let mut writer = if append {
        LogFileWriter::append(log)?
    } else {
        LogFileWriter::create(log)?
    };
    for (kind, name) in parsed {
        match kind {
            EventKind::Start => writer.start(name)?,
            EventKind::End => writer.end(name)?,
        }
    }
    writer.close()?;
    Ok(())
}

/// Open the per-file store from `--dir` or the configured directory
fn file_timers(args: &FileTimerArgs, config: &TimerlogConfig) -> Result<FileTimers> {
    let dir = args
        .dir
        .as_ref()
        .or(config.timer_dir.as_ref())
        .context("No timer directory: pass --dir or set timer_dir in the config file")?;
    Ok(FileTimers::new(dir)?)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = match &args.config {
        Some(path) => TimerlogConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TimerlogConfig::default(),
    };

    match args.command {
        Command::Report {
            files,
            format,
            strict,
        } => run_report(&files, format.unwrap_or(config.format), strict)?,
        Command::Emit {
            log,
            append,
            events,
        } => run_emit(&log, append, &events)?,
        Command::Start(timer) => file_timers(&timer, &config)?.start(&timer.name)?,
        Command::End(timer) => file_timers(&timer, &config)?.end(&timer.name)?,
        Command::Poll(timer) => {
            let elapsed = file_timers(&timer, &config)?.poll(&timer.name)?;
            println!("{}", elapsed);
        }
        Command::Delta(timer) => {
            let delta = file_timers(&timer, &config)?.delta(&timer.name)?;
            println!("{}", delta);
        }
        Command::Delete { timer, if_exists } => {
            let timers = file_timers(&timer, &config)?;
            if if_exists {
                timers.delete_if_exists(&timer.name)?;
            } else {
                timers.delete(&timer.name)?;
            }
        }
    }

    Ok(())
}
