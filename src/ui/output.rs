//! Where command results go
//!
//! Results and dry-run notices are printed to stdout so they can be piped;
//! warnings about skipped objects go to stderr.

use std::cell::RefCell;

use colored::Colorize;

/// Trait for output operations
///
/// # Examples
///
/// ```
/// use trailhead::ui::{Console, OutputWriter};
///
/// let console = Console::new();
/// console.write("/");
/// console.success("Removed 2 waypoints");
/// console.warning("Folder \"Trips\" is not empty; skipping.");
/// ```
pub trait OutputWriter {
    /// Plain result text (tables, trees, JSON)
    fn write(&self, message: &str);

    /// Summary of a change that went through
    fn success(&self, message: &str);

    /// Something was skipped or needs attention
    fn warning(&self, message: &str);
}

/// Terminal output
#[derive(Debug, Default, Clone, Copy)]
pub struct Console;

impl Console {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl OutputWriter for Console {
    fn write(&self, message: &str) {
        println!("{message}");
    }

    fn success(&self, message: &str) {
        println!("{}", message.green());
    }

    fn warning(&self, message: &str) {
        eprintln!("{} {message}", "warning:".yellow().bold());
    }
}

/// Message level for categorizing output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Normal,
    Success,
    Warning,
}

/// Collects messages instead of printing them
#[derive(Debug, Default)]
pub struct BufferWriter {
    messages: RefCell<Vec<(MessageLevel, String)>>,
}

impl BufferWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, oldest first
    #[must_use]
    pub fn messages(&self) -> Vec<(MessageLevel, String)> {
        self.messages.borrow().clone()
    }

    /// Message texts only, one per line
    #[must_use]
    pub fn text(&self) -> String {
        self.messages
            .borrow()
            .iter()
            .map(|(_, m)| m.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn push(&self, level: MessageLevel, message: &str) {
        self.messages.borrow_mut().push((level, message.to_string()));
    }
}

impl OutputWriter for BufferWriter {
    fn write(&self, message: &str) {
        self.push(MessageLevel::Normal, message);
    }

    fn success(&self, message: &str) {
        self.push(MessageLevel::Success, message);
    }

    fn warning(&self, message: &str) {
        self.push(MessageLevel::Warning, message);
    }
}
