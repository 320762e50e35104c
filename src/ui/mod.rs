//! User interaction layer
//!
//! Commands never print or prompt directly. They go through
//! [`OutputWriter`] for messages and [`UserInput`] for questions, so the
//! terminal implementations can be swapped for recording ones in tests.

pub mod input;
pub mod output;

pub use input::{DialoguerInput, UserInput};
pub use output::{BufferWriter, Console, MessageLevel, OutputWriter};
