/// Tracks the indentation of the most recent text token: its trailing run
/// of non-newline whitespace.
#[derive(Debug, Default, Clone)]
pub struct IndentTracker {
    current: String,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, text: &str) {
        let trimmed = text.trim_end_matches(|c: char| c.is_whitespace() && c != '\n');
        self.current = text[trimmed.len()..].to_string();
    }

    pub fn current(&self) -> &str {
        &self.current
    }
}
