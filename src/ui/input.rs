//! User input abstraction layer

use std::io::{self, IsTerminal};

/// Trait for user input operations
///
/// # Examples
///
/// ```no_run
/// use trailhead::ui::{DialoguerInput, UserInput};
///
/// let input = DialoguerInput::new();
/// if input.is_interactive() && input.confirm("Remove anyway?", false).unwrap() {
///     println!("Removing...");
/// }
/// ```
pub trait UserInput {
    /// Whether there is a person at the other end to answer prompts
    fn is_interactive(&self) -> bool;

    /// Ask a yes/no question
    ///
    /// # Errors
    /// Returns `io::Error` if the terminal cannot be read.
    fn confirm(&self, prompt: &str, default: bool) -> io::Result<bool>;

    /// Read a secret without echoing it
    ///
    /// # Errors
    /// Returns `io::Error` if the terminal cannot be read.
    fn password(&self, prompt: &str) -> io::Result<String>;
}

/// CLI-based user input using dialoguer
pub struct DialoguerInput {
    theme: dialoguer::theme::ColorfulTheme,
}

impl DialoguerInput {
    /// Create a new dialoguer-based input handler
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for DialoguerInput {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInput for DialoguerInput {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn confirm(&self, prompt: &str, default: bool) -> io::Result<bool> {
        use dialoguer::Confirm;

        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(io::Error::other)
    }

    fn password(&self, prompt: &str) -> io::Result<String> {
        use dialoguer::Password;

        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .interact()
            .map_err(io::Error::other)
    }
}

/// Scripted answers for tests
#[cfg(test)]
pub struct ScriptedInput {
    pub interactive: bool,
    pub answers: std::cell::RefCell<Vec<bool>>,
    pub asked: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl ScriptedInput {
    /// Not a terminal; any prompt is a test failure
    #[must_use]
    pub fn batch() -> Self {
        Self {
            interactive: false,
            answers: std::cell::RefCell::new(Vec::new()),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }

    /// A terminal that answers confirmations in order
    #[must_use]
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            interactive: true,
            answers: std::cell::RefCell::new(answers.iter().rev().copied().collect()),
            asked: std::cell::RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl UserInput for ScriptedInput {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn confirm(&self, prompt: &str, _default: bool) -> io::Result<bool> {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop()
            .ok_or_else(|| io::Error::other(format!("unexpected prompt: {prompt}")))
    }

    fn password(&self, prompt: &str) -> io::Result<String> {
        self.asked.borrow_mut().push(prompt.to_string());
        Ok("secret".to_string())
    }
}
