//! Output trait for rendering reports.

/// Target output for reports.
///
/// Reports describe *what* to output using these semantic methods.
/// Implementations decide *how* to render it.
pub trait Output {
    /// Something that worked, e.g. a written file.
    fn success(&mut self, msg: &str);

    /// A problem that did not stop the command.
    fn warning(&mut self, msg: &str);

    /// A failure of one item; the command carried on with the others.
    fn error(&mut self, msg: &str);

    /// Render a bullet list item.
    fn list_item(&mut self, text: &str);

    /// Render a block of preformatted text.
    fn preformatted(&mut self, text: &str);
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Leveled console lines: ` [√] ` on stdout, ` [!] ` and ` [X] ` on stderr.
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TerminalOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Output for TerminalOutput {
    fn success(&mut self, msg: &str) {
        println!(" [√] {msg}");
    }

    fn warning(&mut self, msg: &str) {
        eprintln!(" [!] {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!(" [X] {msg}");
    }

    fn list_item(&mut self, text: &str) {
        println!("     - {text}");
    }

    fn preformatted(&mut self, text: &str) {
        println!("{text}");
    }
}
