//! Recursive Character Text Splitter
//!
//! Splits document text into chunks of at most `chunk_size` characters with
//! `chunk_overlap` characters carried between adjacent chunks. The splitter
//! prefers paragraph boundaries, then line boundaries, then word boundaries,
//! and falls back to raw character windows for unbroken runs.

use std::collections::VecDeque;

/// Separator hierarchy, most to least preferred. The empty separator means
/// character-window splitting.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Character-based recursive splitter
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// `chunk_overlap` must be smaller than `chunk_size`; config validation
    /// enforces this before a splitter is built.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(chunk_overlap < chunk_size);
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Split `text` into chunks of at most `chunk_size` characters
    pub fn split(&self, text: &str) -> Vec<String> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Vec::new();
        }
        if trimmed.chars().count() <= self.chunk_size {
            return vec![trimmed.to_string()];
        }

        self.split_recursive(trimmed, &SEPARATORS)
            .into_iter()
            .map(|chunk| chunk.trim().to_string())
            .filter(|chunk| !chunk.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (sep, rest) = pick_separator(text, separators);

        if sep.is_empty() {
            return self.split_chars(text);
        }

        let pieces: Vec<&str> = text.split(sep).filter(|p| !p.is_empty()).collect();

        let mut chunks = Vec::new();
        let mut good: Vec<String> = Vec::new();

        for piece in pieces {
            if piece.chars().count() <= self.chunk_size {
                good.push(piece.to_string());
            } else {
                // flush accumulated small pieces, then recurse into the big one
                if !good.is_empty() {
                    chunks.extend(self.merge(&good, sep));
                    good.clear();
                }
                chunks.extend(self.split_recursive(piece, rest));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge(&good, sep));
        }

        chunks
    }

    /// Greedily join pieces with `sep` up to `chunk_size`, carrying up to
    /// `chunk_overlap` characters of trailing pieces into the next chunk.
    fn merge(&self, pieces: &[String], sep: &str) -> Vec<String> {
        let sep_len = sep.chars().count();
        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let piece_len = piece.chars().count();

            // joined length if we add this piece now
            if !window.is_empty() && total + window.len() * sep_len + piece_len > self.chunk_size {
                chunks.push(join_window(&window, sep));

                // shrink the window to the overlap budget, and further until
                // the incoming piece fits
                while !window.is_empty()
                    && (total > self.chunk_overlap
                        || total + window.len() * sep_len + piece_len > self.chunk_size)
                {
                    if let Some((_, dropped)) = window.pop_front() {
                        total -= dropped;
                    }
                }
            }

            window.push_back((piece.as_str(), piece_len));
            total += piece_len;
        }

        if !window.is_empty() {
            chunks.push(join_window(&window, sep));
        }

        chunks
    }

    /// Character windows with overlap, for text with no usable separator
    fn split_chars(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        let step = self.chunk_size - self.chunk_overlap;
        let mut chunks = Vec::new();

        let mut start = 0;
        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

/// First separator that occurs in `text`, with the remaining hierarchy for
/// recursion; falls back to the last entry (character windows).
fn pick_separator<'a>(text: &str, separators: &'a [&'a str]) -> (&'a str, &'a [&'a str]) {
    for (i, sep) in separators.iter().enumerate() {
        if sep.is_empty() || text.contains(sep) {
            return (sep, &separators[i + 1..]);
        }
    }
    ("", &[])
}

fn join_window(window: &VecDeque<(&str, usize)>, sep: &str) -> String {
    window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(sep)
}
