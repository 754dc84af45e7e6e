//! Fixed-stride text chunking with character overlap

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Target chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        Self {
            chunk_size,
            overlap,
        }
    }

    /// Split text into overlapping windows of at most `chunk_size` characters.
    ///
    /// Each window after the first starts `chunk_size - overlap` characters
    /// past the previous one, so consecutive full windows share `overlap`
    /// characters. Text no longer than `overlap` yields a single window
    /// holding the whole text. Empty text yields no windows.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let stride = self.chunk_size.saturating_sub(self.overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0usize;

        loop {
            let end = (start + self.chunk_size).min(len);
            chunks.push(chars[start..end].iter().collect());

            if start + self.chunk_size >= len {
                break;
            }
            start += stride;
        }

        chunks
    }
}
