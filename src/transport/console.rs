use std::io::{self, Write};

/// Destination for messages when chat delivery is disabled.
pub trait ConsoleSink {
    fn emit(&mut self, text: &str) -> io::Result<()>;
}

/// Writes each message to standard output followed by a blank line.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        Self
    }
}

impl ConsoleSink for StdoutSink {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{}\n", text)?;
        out.flush()
    }
}

impl ConsoleSink for Vec<String> {
    fn emit(&mut self, text: &str) -> io::Result<()> {
        self.push(text.to_string());
        Ok(())
    }
}
