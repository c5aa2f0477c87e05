use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;

use deskwm::apps::{NOTEPAD, TERMINAL};
use deskwm::drivers::console::{ConsoleInputDriver, ConsoleOutputDriver};
use deskwm::layout::Size;
use deskwm::lifecycle::ConcurrencyPolicy;
use deskwm::runner::run_shell;
use deskwm::shell::Shell;
use deskwm::snapshot::LayoutSnapshot;
use deskwm::tracing_sub::{self, LogTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    /// Refuse new windows once the ceiling is reached.
    Reject,
    /// Close the least recently focused window to make room.
    Evict,
}

impl From<PolicyArg> for ConcurrencyPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Reject => ConcurrencyPolicy::Reject,
            PolicyArg::Evict => ConcurrencyPolicy::EvictLeastRecentlyFocused,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "deskwm", version, about = "A snapping desktop in your terminal")]
struct ShellCli {
    /// What to do when opening a window would exceed --max-windows.
    #[arg(long, value_enum, default_value_t = PolicyArg::Reject)]
    policy: PolicyArg,

    #[arg(long, default_value_t = 8)]
    max_windows: usize,

    /// Restore the layout from this file on start and save it on exit.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Append logs here. Without it nothing is logged, since the desktop
    /// owns the terminal.
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[arg(long, default_value_t = Level::INFO)]
    log_level: Level,
}

fn main() -> io::Result<()> {
    let cli = ShellCli::parse();
    let target = match &cli.log_file {
        Some(path) => LogTarget::file(path)?,
        None => LogTarget::Sink,
    };
    tracing_sub::init(cli.log_level, target);

    let (cols, rows) = crossterm::terminal::size()?;
    let viewport = Size::new(u32::from(cols), u32::from(rows));
    let mut shell = Shell::new(viewport, cli.policy.into(), cli.max_windows);

    let restored = match cli.layout.as_deref().filter(|path| path.exists()) {
        Some(path) => match LayoutSnapshot::load(path) {
            Ok(snapshot) => {
                let report = shell.restore_layout(&snapshot);
                for (id, err) in &report.failed {
                    tracing::warn!(window_id = %id, %err, "window not restored");
                }
                !report.restored.is_empty()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "layout not loaded");
                false
            }
        },
        None => false,
    };
    if !restored {
        for app in [NOTEPAD, TERMINAL] {
            if let Err(err) = shell.open(app.into()) {
                tracing::warn!(app, %err, "default window not opened");
            }
        }
    }

    let mut output = ConsoleOutputDriver::new()?;
    output.enter()?;
    let mut input = ConsoleInputDriver::new();
    let result = run_shell::<_, _, io::Error>(
        output.terminal_mut(),
        &mut input,
        &mut shell,
        Duration::from_millis(16),
    );
    output.exit()?;

    if let Some(path) = &cli.layout {
        shell
            .wm()
            .snapshot()
            .save(path)
            .map_err(io::Error::other)?;
    }
    let closed = shell.shutdown();
    tracing::info!(closed, "exiting");
    result
}
