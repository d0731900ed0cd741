//! Terminal output for berth.
//!
//! Human output is a stream of status lines on stderr: a right-aligned,
//! optionally colored label followed by the message. With
//! `--message-format json` the status lines disappear and each event is
//! written to stdout as one JSON object per line.

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How the shell renders output. Human and JSON output never mix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMode {
    Human {
        verbosity: Verbosity,
        color: ColorChoice,
    },
    Json,
}

impl Default for ShellMode {
    fn default() -> Self {
        ShellMode::Human {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
        }
    }
}

/// Amount of human output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Warnings only
    Quiet,
    #[default]
    Normal,
    /// Also announces long-running steps when they start
    Verbose,
}

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Only when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            other => Err(format!(
                "unknown color setting `{}` (use auto, always or never)",
                other
            )),
        }
    }
}

/// Label printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Probing,
    Checking,
    Configured,
    Saved,
    Finished,
    Warning,
}

/// Labels are right-aligned to this many columns.
const LABEL_WIDTH: usize = 12;

impl Status {
    fn label(self) -> &'static str {
        match self {
            Status::Probing => "Probing",
            Status::Checking => "Checking",
            Status::Configured => "Configured",
            Status::Saved => "Saved",
            Status::Finished => "Finished",
            Status::Warning => "Warning",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Status::Probing | Status::Checking => "\x1b[1;36m",
            Status::Configured | Status::Saved | Status::Finished => "\x1b[1;32m",
            Status::Warning => "\x1b[1;33m",
        }
    }
}

/// Output sink shared by every command.
#[derive(Debug)]
pub struct Shell {
    mode: ShellMode,
    use_color: bool,
    /// Every JSON event written so far
    events: Mutex<Vec<String>>,
}

impl Shell {
    pub fn new(mode: ShellMode) -> Self {
        let use_color = match &mode {
            ShellMode::Json => false,
            ShellMode::Human { color, .. } => match color {
                ColorChoice::Auto => io::stderr().is_terminal(),
                ColorChoice::Always => true,
                ColorChoice::Never => false,
            },
        };

        Shell {
            mode,
            use_color,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Build a shell from the global command-line flags. `--message-format
    /// json` overrides both `--quiet` and `--verbose`.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice, json: bool) -> Self {
        if json {
            return Shell::new(ShellMode::Json);
        }
        let verbosity = match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Normal,
        };
        Shell::new(ShellMode::Human { verbosity, color })
    }

    fn verbosity(&self) -> Option<Verbosity> {
        match &self.mode {
            ShellMode::Human { verbosity, .. } => Some(*verbosity),
            ShellMode::Json => None,
        }
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity() == Some(Verbosity::Quiet)
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity() == Some(Verbosity::Verbose)
    }

    pub fn is_json(&self) -> bool {
        self.verbosity().is_none()
    }

    /// Whether status labels and diagnostics are colored.
    pub fn use_color(&self) -> bool {
        self.use_color
    }

    /// The line `status` would print, or `None` when the mode hides it.
    fn render(&self, status: Status, msg: impl Display) -> Option<String> {
        match self.verbosity() {
            None => None,
            Some(Verbosity::Quiet) if status != Status::Warning => None,
            Some(_) if self.use_color => Some(format!(
                "{}{:>width$}\x1b[0m {}",
                status.ansi(),
                status.label(),
                msg,
                width = LABEL_WIDTH
            )),
            Some(_) => Some(format!(
                "{:>width$} {}",
                status.label(),
                msg,
                width = LABEL_WIDTH
            )),
        }
    }

    /// Print a status line to stderr.
    pub fn status(&self, status: Status, msg: impl Display) {
        if let Some(line) = self.render(status, msg) {
            eprintln!("{}", line);
        }
    }

    /// Report the result of looking for a compiler or tool, as in
    /// `Checking for 'gcc' (C compiler): /usr/bin/gcc`.
    pub fn check(&self, subject: impl Display, outcome: impl Display) {
        self.status(Status::Checking, format!("for {}: {}", subject, outcome));
    }

    /// Warnings survive `--quiet`.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Write one JSON event line to stdout. Does nothing in human mode.
    pub fn json_event(&self, event: &serde_json::Value) {
        if !self.is_json() {
            return;
        }

        let line = event.to_string();
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{}", line);
        let _ = stdout.flush();

        if let Ok(mut events) = self.events.lock() {
            events.push(line);
        }
    }

    /// JSON events emitted so far, oldest first.
    pub fn json_events(&self) -> Vec<String> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Time a step. Verbose mode announces the step right away; otherwise
    /// only the `Finished` line appears.
    pub fn span(self: &Arc<Self>, status: Status, msg: impl Display) -> Span {
        let message = msg.to_string();
        let announced = self.is_verbose();
        if announced {
            self.status(status, &message);
        }
        Span {
            shell: Arc::clone(self),
            started: Instant::now(),
            announced,
            finished: false,
        }
    }
}

impl Default for Shell {
    fn default() -> Self {
        Shell::new(ShellMode::default())
    }
}

/// A timed step started by [`Shell::span`].
pub struct Span {
    shell: Arc<Shell>,
    started: Instant,
    announced: bool,
    finished: bool,
}

impl Span {
    /// Steps shorter than this end silently unless they were announced.
    const SILENT_BELOW: Duration = Duration::from_millis(200);

    /// Print `Finished {msg} in {duration}`.
    pub fn finish_with_message(mut self, msg: impl Display) {
        self.finished = true;
        let took = format_duration(self.started.elapsed());
        self.shell
            .status(Status::Finished, format!("{} in {}", msg, took));
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let elapsed = self.started.elapsed();
        if self.announced || elapsed > Self::SILENT_BELOW {
            self.shell
                .status(Status::Finished, format!("in {}", format_duration(elapsed)));
        }
    }
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs < 60.0 {
        format!("{:.2}s", secs)
    } else {
        format!("{:.1}m", secs / 60.0)
    }
}
