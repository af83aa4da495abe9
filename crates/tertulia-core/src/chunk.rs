//! Paragraph-boundary text splitter with overlap.
//!
//! Splits page text into [`Chunk`]s of at most `chunk_size` characters,
//! carrying up to `chunk_overlap` characters of trailing context from one
//! chunk into the next so a passage cut at a boundary is still retrievable.
//!
//! # Algorithm
//!
//! 1. Split text on `\n\n` paragraph boundaries; drop blank paragraphs.
//! 2. Hard-split any paragraph longer than `chunk_size` at the last
//!    whitespace inside the window, stepping back `chunk_overlap`
//!    characters (snapped to a word start) for the next piece.
//! 3. Merge pieces into chunks joined by `\n\n` while they fit. When a chunk
//!    is emitted, keep its trailing pieces that fit within `chunk_overlap`
//!    as the start of the next chunk.
//!
//! Sizes are counted in `char`s, never bytes, so multi-byte text is never
//! cut inside a code point.
//!
//! # Example
//!
//! ```rust
//! use tertulia_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("Titular.\n\nPrimer párrafo.", 1000, 200);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].index, 0);
//! ```

use std::collections::VecDeque;

use crate::models::Chunk;

const SEPARATOR: &str = "\n\n";
const SEPARATOR_LEN: usize = 2;

/// Split text into overlapping chunks of at most `chunk_size` characters.
///
/// Returns an empty vector when `text` has no non-whitespace content.
/// Indices are contiguous from 0. `chunk_overlap` must be smaller than
/// `chunk_size`; larger values are clamped to `chunk_size - 1`.
pub fn chunk_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<Chunk> {
    let chunk_size = chunk_size.max(1);
    let chunk_overlap = chunk_overlap.min(chunk_size - 1);

    let mut pieces: Vec<&str> = Vec::new();
    for para in text.split(SEPARATOR) {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }
        if char_len(trimmed) > chunk_size {
            pieces.extend(hard_split(trimmed, chunk_size, chunk_overlap));
        } else {
            pieces.push(trimmed);
        }
    }

    merge_pieces(&pieces, chunk_size, chunk_overlap)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk { index, text })
        .collect()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split a single oversized paragraph into overlapping windows.
fn hard_split(para: &str, size: usize, overlap: usize) -> Vec<&str> {
    let chars: Vec<(usize, char)> = para.char_indices().collect();
    let n = chars.len();
    let byte_at = |i: usize| if i < n { chars[i].0 } else { para.len() };

    let mut out = Vec::new();
    let mut start = 0;
    while start < n {
        if n - start <= size {
            out.push(para[byte_at(start)..].trim());
            break;
        }

        let mut end = start + size;
        // Prefer breaking at whitespace inside the window.
        if let Some(ws) = (start + 1..end).rev().find(|&i| chars[i].1.is_whitespace()) {
            end = ws;
        }
        let piece = para[byte_at(start)..byte_at(end)].trim();
        if !piece.is_empty() {
            out.push(piece);
        }

        let mut next = end.saturating_sub(overlap).max(start + 1);
        while next < end && !chars[next - 1].1.is_whitespace() {
            next += 1;
        }
        while next < n && chars[next].1.is_whitespace() {
            next += 1;
        }
        start = next;
    }
    out
}

/// Greedily join pieces into chunks, carrying trailing pieces as overlap.
fn merge_pieces(pieces: &[&str], size: usize, overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut window_len = 0usize;

    for &piece in pieces {
        let len = char_len(piece);
        let sep = if window.is_empty() { 0 } else { SEPARATOR_LEN };

        if !window.is_empty() && window_len + sep + len > size {
            chunks.push(join(&window));
            while let Some(&first) = window.front() {
                let fits_overlap = window_len <= overlap;
                let fits_next = window_len + SEPARATOR_LEN + len <= size;
                if fits_overlap && fits_next {
                    break;
                }
                window.pop_front();
                window_len -= char_len(first);
                if !window.is_empty() {
                    window_len -= SEPARATOR_LEN;
                }
            }
        }

        if !window.is_empty() {
            window_len += SEPARATOR_LEN;
        }
        window.push_back(piece);
        window_len += len;
    }

    if !window.is_empty() {
        chunks.push(join(&window));
    }
    chunks
}

fn join(window: &VecDeque<&str>) -> String {
    window.iter().copied().collect::<Vec<_>>().join(SEPARATOR)
}
