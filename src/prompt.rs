//! Modal prompts the controller blocks on.

/// Parameters for a single-line text prompt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextPrompt {
    pub title: String,
    pub subtitle: String,
    /// Hide the typed characters.
    pub masked: bool,
    /// Shortest accepted input, in characters. `None` accepts anything.
    pub min_length: Option<usize>,
    /// Initial contents of the field.
    pub seed: String,
}

impl TextPrompt {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Masked input with an eight character minimum, as WPA requires.
    pub fn password(title: impl Into<String>) -> Self {
        Self::new(title).masked().min_length(8)
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    pub fn seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Whether `input` may be submitted. Empty input always can; it means the
    /// user left the field blank.
    pub fn accepts(&self, input: &str) -> bool {
        match self.min_length {
            Some(min) => input.is_empty() || input.chars().count() >= min,
            None => true,
        }
    }
}

/// Front-end dialogs.
///
/// Both calls block until the user answers. Only one prompt is ever open at
/// a time because the controller is borrowed for the whole call.
pub trait Prompter {
    /// `None` when the dialog was cancelled.
    fn text(&mut self, prompt: &TextPrompt) -> Option<String>;
    fn confirm(&mut self, message: &str) -> bool;
}

/// Returns the submitted secret, treating cancel, blank input and input the
/// prompt would not have accepted as "no answer".
pub(crate) fn ask_secret<P: Prompter + ?Sized>(prompter: &mut P, prompt: &TextPrompt) -> Option<String> {
    let answer = prompter.text(prompt)?;
    if answer.is_empty() || !prompt.accepts(&answer) {
        return None;
    }
    Some(answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_prompt_enforces_minimum() {
        let prompt = TextPrompt::password("Enter password");
        assert!(prompt.masked);
        assert!(prompt.accepts(""));
        assert!(!prompt.accepts("short"));
        assert!(prompt.accepts("12345678"));
    }

    #[test]
    fn minimum_counts_characters_not_bytes() {
        let prompt = TextPrompt::password("Enter password");
        assert!(!prompt.accepts("ééééééé"));
        assert!(prompt.accepts("éééééééé"));
    }

    #[test]
    fn unbounded_prompt_accepts_anything() {
        let prompt = TextPrompt::new("Enter APN").seed("internet");
        assert!(prompt.accepts("x"));
        assert_eq!(prompt.seed, "internet");
    }
}
