//! Fixed-size overlapping text chunker.
//!
//! Purely positional: no sentence or paragraph awareness. Chunks are counted
//! in characters, not bytes, so multi-byte text never splits mid-codepoint.

/// Split `text` into chunks of at most `chunk_size` characters, each chunk
/// after the first overlapping the previous by `overlap` characters.
///
/// Line endings are normalized (CRLF -> LF) and surrounding whitespace is
/// trimmed before chunking. Empty or whitespace-only input yields no chunks.
/// The step is clamped to at least one character, so the chunker makes
/// forward progress even when `overlap >= chunk_size`.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    let normalized = text.replace("\r\n", "\n");
    let trimmed = normalized.trim();
    if trimmed.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    let total = chars.len();
    let step = chunk_size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < total {
        let end = (start + chunk_size).min(total);
        chunks.push(chars[start..end].iter().collect());
        start += step;
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_input_yield_no_chunks() {
        assert!(chunk_text("", 100, 10).is_empty());
        assert!(chunk_text("   \n\t  ", 100, 10).is_empty());
    }

    #[test]
    fn short_input_is_a_single_chunk() {
        let chunks = chunk_text("hello world", 100, 10);
        assert_eq!(chunks, vec!["hello world".to_string()]);
    }

    #[test]
    fn crlf_is_normalized_and_edges_trimmed() {
        let chunks = chunk_text("  line one\r\nline two\r\n", 100, 0);
        assert_eq!(chunks, vec!["line one\nline two".to_string()]);
    }

    #[test]
    fn consecutive_chunks_overlap() {
        let text: String = ('a'..='z').cycle().take(100).collect();
        let chunks = chunk_text(&text, 40, 10);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let next: Vec<char> = pair[1].chars().collect();
            let tail: String = prev[prev.len() - 10..].iter().collect();
            let head: String = next[..10.min(next.len())].iter().collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn non_overlapping_portions_reconstruct_the_input() {
        let text: String = "The quick brown fox jumps over the lazy dog. ".repeat(30);
        let text = text.trim().to_string();
        let chunk_size = 100;
        let overlap = 25;
        let step = chunk_size - overlap;

        let chunks = chunk_text(&text, chunk_size, overlap);

        let mut rebuilt = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i + 1 < chunks.len() {
                rebuilt.extend(chunk.chars().take(step));
            } else {
                rebuilt.push_str(chunk);
            }
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn chunk_count_matches_the_window_formula() {
        let text: String = "x".repeat(1000);
        let chunk_size = 120;
        let overlap = 20;
        let chunks = chunk_text(&text, chunk_size, overlap);

        let expected = (1000 - overlap).div_ceil(chunk_size - overlap);
        assert_eq!(chunks.len(), expected);
    }

    #[test]
    fn final_chunk_may_be_short() {
        let text: String = "x".repeat(250);
        let chunks = chunk_text(&text, 100, 0);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].chars().count(), 50);
    }

    #[test]
    fn overlap_at_least_chunk_size_still_terminates() {
        let text: String = "y".repeat(50);
        let chunks = chunk_text(&text, 10, 10);
        // step clamps to 1, so one chunk per starting position
        assert_eq!(chunks.len(), 50);
        assert_eq!(chunks[0].chars().count(), 10);
    }

    #[test]
    fn multibyte_text_splits_on_character_boundaries() {
        let text: String = "日本語のテキスト".repeat(20);
        let chunks = chunk_text(&text, 30, 5);
        assert!(!chunks.is_empty());
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 30);
        }
    }
}
