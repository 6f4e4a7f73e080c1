//! Progress bar for multi-file operations.
//!
//! Drawn in place on stdout, and only when stdout is a terminal.
//!
//! # Examples
//!
//! ```
//! use pdfmill::output::progress::{ProgressBar, ProgressStyle};
//!
//! let mut progress = ProgressBar::new(10, ProgressStyle::Bar);
//! progress.set_message("Loading");
//! for _ in 0..10 {
//!     progress.increment();
//! }
//! progress.finish();
//! ```

use std::io::{self, IsTerminal, Write};
use std::time::{Duration, Instant};

const BAR_WIDTH: usize = 30;

/// Style of progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStyle {
    /// `[=====>    ] 50% 5/10`
    Bar,
    /// `5/10`
    Counter,
}

/// Progress bar for visual feedback during operations.
#[derive(Debug)]
pub struct ProgressBar {
    total: usize,
    current: usize,
    style: ProgressStyle,
    message: Option<String>,
    start_time: Instant,
    last_update: Option<Instant>,
    update_interval: Duration,
    enabled: bool,
}

impl ProgressBar {
    /// Create a new progress bar over `total` items.
    pub fn new(total: usize, style: ProgressStyle) -> Self {
        Self {
            total,
            current: 0,
            style,
            message: None,
            start_time: Instant::now(),
            last_update: None,
            update_interval: Duration::from_millis(100),
            enabled: io::stdout().is_terminal(),
        }
    }

    /// Create a progress bar that never draws.
    pub fn disabled() -> Self {
        let mut pb = Self::new(0, ProgressStyle::Counter);
        pb.enabled = false;
        pb
    }

    /// Create a progress bar that only draws when `visible` is true.
    pub fn visible_if(total: usize, visible: bool) -> Self {
        if visible {
            Self::new(total, ProgressStyle::Bar)
        } else {
            Self::disabled()
        }
    }

    /// Set the message shown before the bar.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Move to `current` and redraw, at most every 100 ms until the end.
    pub fn update(&mut self, current: usize) {
        self.current = current;

        let due = self
            .last_update
            .is_none_or(|last| last.elapsed() >= self.update_interval);
        if due || self.current >= self.total {
            self.last_update = Some(Instant::now());
            self.render();
        }
    }

    /// Advance by one item.
    pub fn increment(&mut self) {
        self.update(self.current + 1);
    }

    /// Draw the final state and end the line.
    pub fn finish(&mut self) {
        if self.enabled {
            self.current = self.total;
            self.render();
            println!();
        }
    }

    /// Erase the bar from the terminal.
    pub fn clear(&self) {
        if self.enabled {
            print!("\r\x1b[K");
            io::stdout().flush().ok();
        }
    }

    /// Progress in percent (0 when the total is zero).
    pub fn percent(&self) -> f64 {
        if self.total > 0 {
            (self.current as f64 / self.total as f64) * 100.0
        } else {
            0.0
        }
    }

    fn render(&self) {
        if !self.enabled {
            return;
        }

        print!("\r{}", self.line());
        io::stdout().flush().ok();
    }

    fn line(&self) -> String {
        let counter = format!("{}/{}", self.current, self.total);
        let elapsed = format_duration(self.start_time.elapsed());

        let mut parts = Vec::with_capacity(5);
        if let Some(msg) = &self.message {
            parts.push(msg.clone());
        }
        if self.style == ProgressStyle::Bar {
            parts.push(self.bar());
            parts.push(format!("{:.0}%", self.percent()));
        }
        parts.push(counter);
        parts.push(elapsed);

        parts.join(" ")
    }

    fn bar(&self) -> String {
        let filled = (BAR_WIDTH * self.current) / self.total.max(1);
        let filled = filled.min(BAR_WIDTH);
        let head = if filled > 0 && filled < BAR_WIDTH { ">" } else { "" };
        let body = if head.is_empty() { filled } else { filled - 1 };

        format!(
            "[{}{head}{}]",
            "=".repeat(body),
            " ".repeat(BAR_WIDTH - filled)
        )
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    }
}
