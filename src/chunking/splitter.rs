//! Recursive character splitting with separator fallback.
//!
//! Splits prefer semantic boundaries: paragraph breaks first, then line
//! breaks, sentence ends, word boundaries, and finally raw characters, so
//! splitting always terminates no matter the input.

/// Separator priority list, coarsest first.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Splits text into windows of at most `chunk_size` characters with up to
/// `overlap` characters carried between neighbors.
pub struct RecursiveSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl RecursiveSplitter {
    /// Create a splitter. `overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    /// Split text into chunks. Blank input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        self.split_level(text, 0)
    }

    fn split_level(&self, text: &str, level: usize) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }
        if level >= SEPARATORS.len() {
            return self.split_chars(text);
        }

        // Units small enough to merge; oversized units recurse to a finer
        // separator before merging.
        let mut units = Vec::new();
        for part in split_keeping(text, SEPARATORS[level]) {
            if part.chars().count() > self.chunk_size {
                units.extend(self.split_level(&part, level + 1));
            } else {
                units.push(part);
            }
        }
        self.merge(units)
    }

    /// Greedily accumulate units into chunks of at most `chunk_size`
    /// characters, carrying an overlap tail from each flushed chunk into
    /// the next. The carry is dropped when it would push the next chunk
    /// over the size limit.
    fn merge(&self, units: Vec<String>) -> Vec<String> {
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for unit in units {
            let unit_len = unit.chars().count();

            if current_len > 0 && current_len + unit_len > self.chunk_size {
                let carry = tail_chars(&current, self.overlap);
                push_trimmed(&mut chunks, &current);

                current = if carry.chars().count() + unit_len > self.chunk_size {
                    String::new()
                } else {
                    carry
                };
                current_len = current.chars().count();
            }

            current.push_str(&unit);
            current_len += unit_len;
        }

        push_trimmed(&mut chunks, &current);
        chunks
    }

    /// Last resort: fixed character windows stepping by size minus overlap.
    fn split_chars(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = (self.chunk_size - self.overlap).max(1);

        let mut out = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            out.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        out
    }
}

/// Split on a separator, keeping the separator at the end of each piece so
/// reassembly loses nothing.
fn split_keeping(text: &str, sep: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find(sep) {
        let end = idx + sep.len();
        parts.push(rest[..end].to_string());
        rest = &rest[end..];
    }
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }
    parts
}

/// Last `n` characters of a string, on char boundaries.
fn tail_chars(text: &str, n: usize) -> String {
    let count = text.chars().count();
    text.chars().skip(count.saturating_sub(n)).collect()
}

fn push_trimmed(chunks: &mut Vec<String>, text: &str) {
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_single_chunk() {
        let splitter = RecursiveSplitter::new(800, 160);
        let chunks = splitter.split("Hello, world!");
        assert_eq!(chunks, vec!["Hello, world!".to_string()]);
    }

    #[test]
    fn test_blank_text_no_chunks() {
        let splitter = RecursiveSplitter::new(800, 160);
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let splitter = RecursiveSplitter::new(100, 20);
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(40);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 100,
                "chunk of {} chars exceeds limit",
                chunk.chars().count()
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundaries() {
        let para = "alpha beta gamma delta epsilon zeta".to_string();
        let text = format!("{}\n\n{}\n\n{}", para, para, para);
        let splitter = RecursiveSplitter::new(40, 0);
        let chunks = splitter.split(&text);

        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert_eq!(chunk, &para);
        }
    }

    #[test]
    fn test_adjacent_chunks_overlap() {
        let splitter = RecursiveSplitter::new(100, 30);
        let text = "word ".repeat(200);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 2);
        for pair in chunks.windows(2) {
            // The tail of one chunk reappears at the head of the next.
            let tail = tail_chars(&pair[0], 10);
            assert!(
                pair[1].contains(tail.trim()),
                "no overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_unbroken_text_falls_back_to_characters() {
        let splitter = RecursiveSplitter::new(50, 10);
        let text = "x".repeat(500);
        let chunks = splitter.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_reconstruction_covers_original() {
        // Ignoring overlaps, concatenated chunks must recover the content
        // minus separator trimming.
        let text = "one two three four five six seven eight nine ten. ".repeat(30);
        let splitter = RecursiveSplitter::new(120, 0);
        let chunks = splitter.split(&text);

        let rebuilt: String = chunks.join(" ");
        for word in ["one", "five", "ten."] {
            let original = text.matches(word).count();
            assert!(rebuilt.matches(word).count() >= original);
        }
    }

    #[test]
    fn test_overlap_clamped_below_chunk_size() {
        // Must terminate even with a nonsense overlap request.
        let splitter = RecursiveSplitter::new(10, 10);
        let chunks = splitter.split(&"y".repeat(100));
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
    }
}
