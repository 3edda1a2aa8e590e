//! `sl` mode: a steam locomotive crossing the terminal while the poll runs.
//!
//! # Frame Layout
//! ```text
//! rows 0-2   smoke rising from the funnel
//! rows 3-8   locomotive and coal tender
//! row  9     status text
//! ```
//!
//! The train enters from the right edge, moves one column left per frame
//! and wraps once it has fully left the screen. Every frame after the
//! first moves the cursor back up to row 0 and redraws in place.

use std::io::Write;
use std::time::Duration;

use super::ticker::{Frame, Ticker};
use super::{format_elapsed, OutputStrategy, CLEAR_LINE};

/// Redraw period, one column of travel per frame.
pub const TRAIN_PERIOD: Duration = Duration::from_millis(20);

const DEFAULT_COLUMNS: usize = 80;

const SMOKE_HEIGHT: usize = 3;
const TRAIN_HEIGHT: usize = 6;
const FRAME_HEIGHT: usize = SMOKE_HEIGHT + TRAIN_HEIGHT + 1;
const TRAIN_WIDTH: i32 = 41;

const FUNNEL_OFFSET: i32 = 6;
const SMOKE_EVERY: u32 = 4;
const SMOKE_LIFETIME: u8 = 3;
const HEAVY_SMOKE: [&str; 3] = ["(@@@)", "(@@)", "(@)"];
const LIGHT_SMOKE: [&str; 3] = ["(   )", "(  )", "( )"];

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Rows above the running gear; they never change.
const BODY: [&str; 4] = [
    "      ++ +------     ____",
    "      || |+-+ |      |  \\@@@@@@@@@@@",
    " /---------|| | |    |   \\@@@@@@@@@@@@@_",
    " + ======== +-+ |    |                  |",
];

/// Connecting rod row and wheel row for each of the six wheel phases.
const WHEELS: [(&str, &str); 6] = [
    ("O========O~\\", "\\_/   \\_/   "),
    ("/O========O\\", "\\_/   \\_/   "),
    ("/~O========O", "\\_/   \\_/   "),
    ("/~\\------/~\\", "\\_O========O"),
    ("/~\\------/~\\", "\\O========O/"),
    ("/~\\------/~\\", "O========O_/"),
];

/// Terminal width from `COLUMNS`, or 80 when unset.
pub fn terminal_columns() -> usize {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|&columns| columns > 0)
        .unwrap_or(DEFAULT_COLUMNS)
}

#[derive(Debug, Clone, Copy)]
struct Puff {
    col: i32,
    row: i32,
    heavy: bool,
    age: u8,
}

impl Puff {
    fn shape(&self) -> &'static str {
        let shapes = if self.heavy { &HEAVY_SMOKE } else { &LIGHT_SMOKE };
        shapes[usize::from(self.age).min(shapes.len() - 1)]
    }
}

struct Scene<O> {
    out: O,
    columns: usize,
    position: i32,
    frames: u32,
    puffs: Vec<Puff>,
    text: String,
    drawn: bool,
    cursor_hidden: bool,
}

impl<O: Write> Scene<O> {
    fn new(out: O, columns: usize) -> Self {
        Self {
            out,
            columns,
            position: columns as i32,
            frames: 0,
            puffs: Vec::new(),
            text: String::new(),
            drawn: false,
            cursor_hidden: false,
        }
    }

    fn hide_cursor(&mut self) {
        let _ = self.out.write_all(HIDE_CURSOR.as_bytes());
        self.cursor_hidden = true;
    }

    fn show_cursor(&mut self) {
        if self.cursor_hidden {
            let _ = self.out.write_all(SHOW_CURSOR.as_bytes());
            let _ = self.out.flush();
            self.cursor_hidden = false;
        }
    }

    /// Erase everything drawn so far and leave the cursor at its origin.
    fn clear(&mut self) {
        if self.drawn {
            let _ = write!(self.out, "\x1b[{}A\r\x1b[J", FRAME_HEIGHT - 1);
            self.drawn = false;
        }
    }

    fn train_rows(&self) -> [String; TRAIN_HEIGHT] {
        let phase = (self.position.unsigned_abs() / 3) as usize % WHEELS.len();
        let (rod, wheels) = WHEELS[phase];
        [
            BODY[0].to_string(),
            BODY[1].to_string(),
            BODY[2].to_string(),
            BODY[3].to_string(),
            format!(" _|--{}-+  |__________________|", rod),
            format!("//// {}       (O)       (O)", wheels),
        ]
    }

    fn advance_smoke(&mut self) {
        for puff in &mut self.puffs {
            puff.age += 1;
            puff.row -= 1;
        }
        self.puffs.retain(|puff| puff.age < SMOKE_LIFETIME);

        if self.frames % SMOKE_EVERY == 0 {
            self.puffs.push(Puff {
                col: self.position + FUNNEL_OFFSET,
                row: SMOKE_HEIGHT as i32 - 1,
                heavy: (self.frames / SMOKE_EVERY) % 2 == 1,
                age: 0,
            });
        }
    }

    fn compose(&self) -> String {
        let mut grid = vec![vec![' '; self.columns]; SMOKE_HEIGHT + TRAIN_HEIGHT];
        for (i, row) in self.train_rows().iter().enumerate() {
            paint(&mut grid[SMOKE_HEIGHT + i], self.position, row);
        }
        for puff in &self.puffs {
            if let Some(row) = usize::try_from(puff.row).ok().and_then(|r| grid.get_mut(r)) {
                paint(row, puff.col, puff.shape());
            }
        }

        let mut frame = String::new();
        if self.drawn {
            frame.push_str(&format!("\x1b[{}A", FRAME_HEIGHT - 1));
        }
        for row in &grid {
            frame.push_str(CLEAR_LINE);
            frame.extend(row.iter());
            frame.push('\n');
        }
        frame.push_str(CLEAR_LINE);
        frame.push_str(&format!("\x1b[33m{}\x1b[0m", self.text));
        frame
    }
}

impl<O: Write + Send + 'static> Frame for Scene<O> {
    fn render(&mut self) {
        self.frames += 1;
        self.advance_smoke();

        let frame = self.compose();
        let _ = self.out.write_all(frame.as_bytes());
        let _ = self.out.flush();
        self.drawn = true;

        self.position -= 1;
        if self.position < -TRAIN_WIDTH {
            self.position = self.columns as i32;
        }
    }
}

/// Copy the non-blank characters of `text` into `row` from column `col`,
/// clipping at both edges.
fn paint(row: &mut [char], col: i32, text: &str) {
    for (i, ch) in text.chars().enumerate() {
        if ch == ' ' {
            continue;
        }
        let Ok(x) = usize::try_from(col + i as i32) else {
            continue;
        };
        if let Some(cell) = row.get_mut(x) {
            *cell = ch;
        }
    }
}

/// Animated train with the status text underneath.
pub struct Train<O: Write + Send + 'static, E> {
    scene: Ticker<Scene<O>>,
    err: E,
}

impl<O: Write + Send + 'static, E: Write + Send> Train<O, E> {
    pub fn new(out: O, err: E, columns: usize) -> Self {
        Self {
            scene: Ticker::new(Scene::new(out, columns)),
            err,
        }
    }
}

impl<O: Write + Send + 'static, E: Write + Send> OutputStrategy for Train<O, E> {
    fn on_start(&mut self, host: &str, port: u16) {
        self.scene.with(|scene| {
            scene.hide_cursor();
            scene.text = format!("Connecting to {}:{}...", host, port);
            scene.render();
        });
        self.scene.start(TRAIN_PERIOD);
    }

    fn on_retry(&mut self, attempt: u32, elapsed: Duration) {
        self.scene.with(|scene| {
            scene.text = format!("Waiting... (attempt {}, {})", attempt, format_elapsed(elapsed));
        });
    }

    fn on_success(&mut self, host: &str, port: u16, elapsed: Duration) {
        self.scene.finish(|scene| {
            scene.clear();
            scene.show_cursor();
            let _ = writeln!(
                scene.out,
                "\x1b[32m✔\x1b[0m Connected to {}:{} ({})",
                host,
                port,
                format_elapsed(elapsed)
            );
            let _ = scene.out.flush();
        });
    }

    fn on_failure(&mut self, message: &str, elapsed: Duration) {
        self.scene.finish(|scene| {
            scene.clear();
            scene.show_cursor();
        });
        let _ = writeln!(self.err, "\x1b[31m✖\x1b[0m {} ({})", message, format_elapsed(elapsed));
        let _ = self.err.flush();
    }
}

impl<O: Write + Send + 'static, E> Drop for Train<O, E> {
    fn drop(&mut self) {
        self.scene.finish(|scene| scene.show_cursor());
    }
}
