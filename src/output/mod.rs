//! Terminal output strategies.
//!
//! Presentation only: strategies observe the poll through the retry
//! callback and the final status, and never influence the outcome.
//!
//! # Design Decisions
//! - Animated modes (spinner, sl) need cursor control, so they fall back
//!   to dots when stdout is not a terminal
//! - Animations run on their own timer task between poll events and stop
//!   on the final line or when the strategy is dropped

pub mod spinner;
mod ticker;
pub mod train;

use std::fmt;
use std::io::{self, IsTerminal, Write};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

pub use spinner::Spinner;
pub use train::Train;

pub(crate) const CLEAR_LINE: &str = "\x1b[2K\r";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Dots,
    Spinner,
    /// A steam locomotive crossing the terminal.
    Sl,
    Silent,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputMode::Dots => "dots",
            OutputMode::Spinner => "spinner",
            OutputMode::Sl => "sl",
            OutputMode::Silent => "silent",
        })
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dots" => Ok(OutputMode::Dots),
            "spinner" => Ok(OutputMode::Spinner),
            "sl" => Ok(OutputMode::Sl),
            "silent" => Ok(OutputMode::Silent),
            other => Err(format!(
                "'{}' is not a valid output mode (expected dots, spinner, sl or silent)",
                other
            )),
        }
    }
}

/// Observer of one poll, driven by the binary.
pub trait OutputStrategy: Send {
    /// Called once before the first attempt.
    fn on_start(&mut self, host: &str, port: u16);
    /// Called after a failed attempt, right before the retry delay.
    fn on_retry(&mut self, attempt: u32, elapsed: Duration);
    fn on_success(&mut self, host: &str, port: u16, elapsed: Duration);
    fn on_failure(&mut self, message: &str, elapsed: Duration);
}

/// Strategy writing to the process's stdout and stderr.
pub fn create_output(mode: OutputMode) -> Box<dyn OutputStrategy> {
    let animated = matches!(mode, OutputMode::Spinner | OutputMode::Sl);
    if animated && !io::stdout().is_terminal() {
        tracing::debug!(%mode, "stdout is not a terminal, using dots");
        return Box::new(Dots::new(io::stdout(), io::stderr()));
    }

    match mode {
        OutputMode::Dots => Box::new(Dots::new(io::stdout(), io::stderr())),
        OutputMode::Spinner => Box::new(Spinner::new(io::stdout(), io::stderr())),
        OutputMode::Sl => Box::new(Train::new(io::stdout(), io::stderr(), train::terminal_columns())),
        OutputMode::Silent => Box::new(Silent),
    }
}

/// `123ms` below one second, `1.2s` above.
pub fn format_elapsed(elapsed: Duration) -> String {
    let ms = elapsed.as_millis();
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

pub struct Silent;

impl OutputStrategy for Silent {
    fn on_start(&mut self, _host: &str, _port: u16) {}
    fn on_retry(&mut self, _attempt: u32, _elapsed: Duration) {}
    fn on_success(&mut self, _host: &str, _port: u16, _elapsed: Duration) {}
    fn on_failure(&mut self, _message: &str, _elapsed: Duration) {}
}

/// One dot per retry, then a final line.
pub struct Dots<O, E> {
    out: O,
    err: E,
    dots_printed: bool,
}

impl<O: Write + Send, E: Write + Send> Dots<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            dots_printed: false,
        }
    }

    fn end_dots(&mut self) {
        if self.dots_printed {
            let _ = writeln!(self.out);
            let _ = self.out.flush();
        }
    }
}

impl<O: Write + Send, E: Write + Send> OutputStrategy for Dots<O, E> {
    fn on_start(&mut self, _host: &str, _port: u16) {}

    fn on_retry(&mut self, _attempt: u32, _elapsed: Duration) {
        self.dots_printed = true;
        let _ = write!(self.out, ".");
        let _ = self.out.flush();
    }

    fn on_success(&mut self, host: &str, port: u16, elapsed: Duration) {
        self.end_dots();
        let _ = writeln!(self.out, "✔ Connected to {}:{} ({})", host, port, format_elapsed(elapsed));
        let _ = self.out.flush();
    }

    fn on_failure(&mut self, message: &str, elapsed: Duration) {
        self.end_dots();
        let _ = writeln!(self.err, "✖ {} ({})", message, format_elapsed(elapsed));
        let _ = self.err.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(0)), "0ms");
        assert_eq!(format_elapsed(Duration::from_millis(999)), "999ms");
        assert_eq!(format_elapsed(Duration::from_millis(1000)), "1.0s");
        assert_eq!(format_elapsed(Duration::from_millis(12_345)), "12.3s");
    }

    #[test]
    fn dots_then_success_line() {
        let mut dots = Dots::new(Vec::new(), Vec::new());
        dots.on_start("db", 5432);
        dots.on_retry(1, Duration::from_millis(10));
        dots.on_retry(2, Duration::from_millis(20));
        dots.on_success("db", 5432, Duration::from_millis(1500));
        assert_eq!(String::from_utf8(dots.out).unwrap(), "..\n✔ Connected to db:5432 (1.5s)\n");
        assert!(dots.err.is_empty());
    }

    #[test]
    fn dots_failure_goes_to_stderr() {
        let mut dots = Dots::new(Vec::new(), Vec::new());
        dots.on_failure("Host not found: db", Duration::from_millis(40));
        assert!(dots.out.is_empty());
        assert_eq!(String::from_utf8(dots.err).unwrap(), "✖ Host not found: db (40ms)\n");
    }

    #[test]
    fn parses_modes() {
        assert_eq!("spinner".parse::<OutputMode>().unwrap(), OutputMode::Spinner);
        assert_eq!("sl".parse::<OutputMode>().unwrap(), OutputMode::Sl);
        assert_eq!(OutputMode::Sl.to_string(), "sl");
        assert!("train".parse::<OutputMode>().is_err());
    }

    #[test]
    fn sl_mode_from_config() {
        #[derive(Deserialize)]
        struct Section {
            mode: OutputMode,
        }
        let section: Section = toml::from_str("mode = \"sl\"").unwrap();
        assert_eq!(section.mode, OutputMode::Sl);
    }
}

/// In-memory writer that stays readable after being handed to a strategy.
#[cfg(test)]
pub(crate) mod capture {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        pub fn clear(&self) {
            self.0.lock().unwrap().clear();
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Drop CSI escape sequences and carriage returns.
    pub fn strip_ansi(text: &str) -> String {
        let mut plain = String::with_capacity(text.len());
        let mut chars = text.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\x1b' => {
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() {
                            break;
                        }
                    }
                }
                '\r' => {}
                _ => plain.push(ch),
            }
        }
        plain
    }
}
