//! Braille spinner on a single rewritten line.

use std::io::Write;
use std::time::Duration;

use super::ticker::{Frame, Ticker};
use super::{format_elapsed, OutputStrategy, CLEAR_LINE};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Redraw period between poll events.
pub const SPINNER_PERIOD: Duration = Duration::from_millis(80);

struct Line<O> {
    out: O,
    text: String,
    frame: usize,
}

impl<O: Write + Send + 'static> Frame for Line<O> {
    fn render(&mut self) {
        let frame = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame += 1;
        let _ = write!(self.out, "{}\x1b[33m{}\x1b[0m {}", CLEAR_LINE, frame, self.text);
        let _ = self.out.flush();
    }
}

/// A single status line, animated on its own timer and updated per event.
pub struct Spinner<O, E> {
    line: Ticker<Line<O>>,
    err: E,
}

impl<O: Write + Send + 'static, E: Write + Send> Spinner<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            line: Ticker::new(Line {
                out,
                text: String::new(),
                frame: 0,
            }),
            err,
        }
    }

    fn show(&mut self, text: String) {
        self.line.with(|line| {
            line.text = text;
            line.render();
        });
    }
}

impl<O: Write + Send + 'static, E: Write + Send> OutputStrategy for Spinner<O, E> {
    fn on_start(&mut self, host: &str, port: u16) {
        self.show(format!("Connecting to {}:{}...", host, port));
        self.line.start(SPINNER_PERIOD);
    }

    fn on_retry(&mut self, attempt: u32, elapsed: Duration) {
        self.show(format!(
            "Waiting... (attempt {}, {})",
            attempt,
            format_elapsed(elapsed)
        ));
    }

    fn on_success(&mut self, host: &str, port: u16, elapsed: Duration) {
        self.line.finish(|line| {
            let _ = writeln!(
                line.out,
                "{}\x1b[32m✔\x1b[0m Connected to {}:{} ({})",
                CLEAR_LINE,
                host,
                port,
                format_elapsed(elapsed)
            );
            let _ = line.out.flush();
        });
    }

    fn on_failure(&mut self, message: &str, elapsed: Duration) {
        self.line.finish(|line| {
            let _ = write!(line.out, "{}", CLEAR_LINE);
            let _ = line.out.flush();
        });
        let _ = writeln!(self.err, "\x1b[31m✖\x1b[0m {} ({})", message, format_elapsed(elapsed));
        let _ = self.err.flush();
    }
}
