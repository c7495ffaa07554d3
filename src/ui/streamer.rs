use std::io::{self, Write};
use std::thread;
use std::time::Duration;

/// Split `text` into pieces of `chunk_size` chars (the last may be shorter).
///
/// A zero chunk size is treated as one.
pub fn text_chunks(text: &str, chunk_size: usize) -> impl Iterator<Item = String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chunk_size.max(1);
    let count = chars.len().div_ceil(size);
    (0..count).map(move |i| chars[i * size..((i + 1) * size).min(chars.len())].iter().collect())
}

/// Prints text a few characters at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextStreamer {
    pub delay: Duration,
    pub chunk_size: usize,
}

impl TextStreamer {
    pub fn new(delay: Duration, chunk_size: usize) -> Self {
        TextStreamer { delay, chunk_size }
    }

    /// Prints everything at once
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, usize::MAX)
    }

    pub fn stream_to(&self, text: &str, out: &mut impl Write) -> io::Result<()> {
        for chunk in text_chunks(text, self.chunk_size) {
            out.write_all(chunk.as_bytes())?;
            out.flush()?;
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
        Ok(())
    }

    /// Stream `text` to stdout followed by a newline.
    pub fn println(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        self.stream_to(text, &mut stdout)?;
        writeln!(stdout)
    }
}
