//! Line-oriented operator I/O, passed explicitly to everything that asks a
//! question.

use std::io::{self, BufRead, Read, Write};

use crate::error::Result;

pub struct Prompt<'a> {
    input: Box<dyn BufRead + 'a>,
    output: Box<dyn Write + 'a>,
    diagnostics: Box<dyn Write + 'a>,
}

impl<'a> Prompt<'a> {
    pub fn new(input: impl BufRead + 'a, output: impl Write + 'a) -> Self {
        Self {
            input: Box::new(input),
            output: Box::new(output),
            diagnostics: Box::new(io::stderr()),
        }
    }

    pub fn stdio() -> Prompt<'static> {
        Prompt::new(io::stdin().lock(), io::stdout())
    }

    pub fn with_diagnostics(mut self, diagnostics: impl Write + 'a) -> Self {
        self.diagnostics = Box::new(diagnostics);
        self
    }

    /// Prints `label` and returns the trimmed answer. End of input reads as
    /// an empty answer.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        self.output.write_all(label.as_bytes())?;
        self.output.flush()?;
        self.read_line()
    }

    pub fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    /// Drains the rest of the input, untrimmed. Invalid UTF-8 is replaced
    /// and reported on the diagnostics stream.
    pub fn read_all(&mut self) -> Result<String> {
        let mut buf = Vec::new();
        self.input.read_to_end(&mut buf)?;
        match String::from_utf8(buf) {
            Ok(text) => Ok(text),
            Err(err) => {
                tracing::warn!(error = %err, "input is not valid UTF-8");
                self.warn("Warning: input is not valid UTF-8; invalid bytes were replaced")?;
                Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
            }
        }
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    pub fn warn(&mut self, text: &str) -> Result<()> {
        writeln!(self.diagnostics, "{}", text)?;
        Ok(())
    }
}
