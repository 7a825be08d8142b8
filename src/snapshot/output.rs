// Captured program output

/// Output written by the running program
///
/// Text lands in two places: a window that [`OutputBuffer::trim`] keeps down
/// to a trailing suffix, and a transcript that keeps everything for the final
/// report. Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    window: String,
    transcript: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append text
    pub fn write(&mut self, text: &str) {
        self.window.push_str(text);
        self.transcript.push_str(text);
    }

    /// Drop leading characters until at most `max_chars` remain.
    /// Returns how many characters were dropped.
    pub fn trim(&mut self, max_chars: usize) -> usize {
        let len = self.char_len();
        if len <= max_chars {
            return 0;
        }
        let excess = len - max_chars;
        let cut = self
            .window
            .char_indices()
            .nth(excess)
            .map(|(idx, _)| idx)
            .unwrap_or(self.window.len());
        self.window.drain(..cut);
        excess
    }

    /// Current window (trailing output since the last trim)
    pub fn contents(&self) -> &str {
        &self.window
    }

    /// Everything ever written
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn char_len(&self) -> usize {
        self.window.chars().count()
    }

    pub fn into_transcript(self) -> String {
        self.transcript
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_keeps_trailing_suffix() {
        let mut buffer = OutputBuffer::new();
        buffer.write("0123456789");
        buffer.write("abcdefghij");

        assert_eq!(buffer.trim(5), 15);
        assert_eq!(buffer.contents(), "fghij");
        assert_eq!(buffer.transcript(), "0123456789abcdefghij");

        assert_eq!(buffer.trim(5), 0);
        assert_eq!(buffer.contents(), "fghij");
    }

    #[test]
    fn test_trim_counts_characters() {
        let mut buffer = OutputBuffer::new();
        buffer.write("héllo wörld");
        buffer.trim(5);
        assert_eq!(buffer.contents(), "wörld");
        assert_eq!(buffer.char_len(), 5);
    }

    #[test]
    fn test_trim_to_zero() {
        let mut buffer = OutputBuffer::new();
        buffer.write("abc");
        buffer.trim(0);
        assert_eq!(buffer.contents(), "");
        assert_eq!(buffer.into_transcript(), "abc");
    }
}
