use crate::error::{Error, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// The human side of the conversation.
pub trait Console {
    /// Reads a line of input; `None` when the user closed the input.
    fn ask(&mut self, prompt: &str) -> Option<String>;
    fn confirm(&mut self, prompt: &str) -> bool;
}

pub struct ReadlineConsole {
    editor: DefaultEditor,
}

impl ReadlineConsole {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| Error::Console(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl Console for ReadlineConsole {
    fn ask(&mut self, prompt: &str) -> Option<String> {
        loop {
            match self.editor.readline(&format!("{prompt} ")) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    let _ = self.editor.add_history_entry(line.as_str());
                    return Some(line);
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return None,
                Err(e) => {
                    tracing::error!("Error reading input : {}", e);
                    return None;
                }
            }
        }
    }

    fn confirm(&mut self, prompt: &str) -> bool {
        match self.editor.readline(&format!("{prompt} (Y/n) ")) {
            Ok(answer) => !matches!(answer.trim().to_lowercase().as_str(), "n" | "no"),
            Err(_) => false,
        }
    }
}
