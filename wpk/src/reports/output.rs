//! Output sinks for reports.

/// Which stream a rendered line belongs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
}

/// Target output for reports.
///
/// Implementations only decide where a finished line goes; the provided
/// methods fix the textual layout, so every sink renders the same text.
pub trait Output {
    fn write(&mut self, stream: Stream, line: String);

    fn section(&mut self, name: &str) {
        self.write(Stream::Out, format!("{name}:"));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.write(Stream::Out, format!("{key}: {value}"));
    }

    fn list_item(&mut self, text: &str) {
        self.write(Stream::Out, format!("  - {text}"));
    }

    /// A written file.
    fn added_item(&mut self, text: &str) {
        self.write(Stream::Out, format!("  + {text}"));
    }

    fn warning(&mut self, msg: &str) {
        self.write(Stream::Err, format!("warning: {msg}"));
    }

    fn divider(&mut self, label: &str) {
        self.write(Stream::Out, format!("── {label} ──"));
    }

    /// Multi-line text such as a file preview, written as-is.
    fn preformatted(&mut self, text: &str) {
        for line in text.lines() {
            self.write(Stream::Out, line.to_string());
        }
    }

    fn newline(&mut self) {
        self.write(Stream::Out, String::new());
    }
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Prints to stdout, warnings to stderr.
#[derive(Default)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for TerminalOutput {
    fn write(&mut self, stream: Stream, line: String) {
        match stream {
            Stream::Out => println!("{line}"),
            Stream::Err => eprintln!("{line}"),
        }
    }
}

/// Records rendered lines, for tests.
#[cfg(test)]
#[derive(Default)]
pub struct BufferOutput {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl Output for BufferOutput {
    fn write(&mut self, _stream: Stream, line: String) {
        self.lines.push(line);
    }
}
