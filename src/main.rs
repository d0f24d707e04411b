//! Sidelegend - a terminal pager with a floating section legend.
//!
//! # Usage
//!
//! ```bash
//! sidelegend README.md
//! sidelegend --watch --delay 1000 README.md
//! sidelegend --dump --height 40 README.md
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sidelegend::app::App;
use sidelegend::config::{
    ConfigFlags, clear_config_flags, global_config_path, load_config_flags, local_override_path,
    parse_flag_tokens, save_config_flags,
};

/// A terminal pager that floats a handle for every section at the right edge
#[derive(Parser, Debug)]
#[command(name = "sidelegend", version, about, long_about = None)]
struct Cli {
    /// Markdown file to view
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Watch file for changes and auto-reload
    #[arg(short, long)]
    watch: bool,

    /// Milliseconds a changed file must stay quiet before it is reloaded
    #[arg(long, value_name = "MS")]
    watch_settle: Option<u64>,

    /// Pixels of a resting handle left on screen
    #[arg(long, value_name = "PX")]
    peak: Option<f64>,

    /// Milliseconds before handles slide back after the pointer leaves
    #[arg(long, value_name = "MS")]
    delay: Option<u64>,

    /// Class name for handles (selects their color)
    #[arg(long, value_name = "NAME")]
    class: Option<String>,

    /// Deepest heading level that gets a handle
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u8).range(1..=6))]
    max_level: Option<u8>,

    /// Print the handle layout as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Terminal width assumed by --dump
    #[arg(long, default_value_t = 80)]
    width: u16,

    /// Terminal height assumed by --dump
    #[arg(long, default_value_t = 24)]
    height: u16,

    /// Write log output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

#[derive(Debug, PartialEq, Eq)]
enum LogTarget<'a> {
    File(&'a Path),
    Stderr,
    Discard,
}

/// The pager draws on the alternate screen, so anything written to stderr
/// would land on top of the frame. Without a log file its events are dropped.
fn log_target(log_file: Option<&Path>, interactive: bool) -> LogTarget<'_> {
    match log_file {
        Some(path) => LogTarget::File(path),
        None if interactive => LogTarget::Discard,
        None => LogTarget::Stderr,
    }
}

fn init_logging(target: &LogTarget<'_>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match target {
        LogTarget::File(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        LogTarget::Stderr => builder.with_writer(std::io::stderr).init(),
        LogTarget::Discard => builder.with_writer(std::io::sink).init(),
    }
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(&log_target(effective.log_file.as_deref(), !cli.dump))?;
    tracing::debug!(?effective, "effective flags");

    // Verify file exists
    if !cli.file.exists() {
        anyhow::bail!("File not found: {}", cli.file.display());
    }

    if cli.dump {
        let layout_width = sidelegend::ui::document_content_width(cli.width);
        let document = sidelegend::document::load(&cli.file, layout_width)?;
        let layouts = sidelegend::dump::layout(&document, cli.height, effective.poi_config());
        println!("{}", sidelegend::dump::to_json(&layouts)?);
        return Ok(());
    }

    let mut app = App::new(cli.file)
        .with_watch(effective.watch)
        .with_watch_settle(effective.watch_settle())
        .with_poi_config(effective.poi_config());

    app.run().context("Application error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pager_without_log_file_discards_logs() {
        assert_eq!(log_target(None, true), LogTarget::Discard);
    }

    #[test]
    fn test_dump_logs_to_stderr() {
        assert_eq!(log_target(None, false), LogTarget::Stderr);
    }

    #[test]
    fn test_log_file_wins_in_both_modes() {
        let path = Path::new("trace.log");
        assert_eq!(log_target(Some(path), true), LogTarget::File(path));
        assert_eq!(log_target(Some(path), false), LogTarget::File(path));
    }

    #[test]
    fn test_cli_parses_watch_settle() {
        let cli = Cli::try_parse_from(["sidelegend", "--watch-settle", "50", "doc.md"]).unwrap();
        assert_eq!(cli.watch_settle, Some(50));
    }
}
