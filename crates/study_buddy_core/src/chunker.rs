//! crates/study_buddy_core/src/chunker.rs
//!
//! Splits extracted document text into overlapping chunks for embedding.
//!
//! The strategy is recursive: split at paragraph breaks first, then line
//! breaks, then sentence ends, then word boundaries, and hard-cut anything
//! that still will not fit. The output is fully deterministic for a given
//! input and configuration.

/// Separators in preference order. Earlier entries keep more structure intact.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// A configured text splitter.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    overlap: usize,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CHUNK_SIZE, Self::DEFAULT_OVERLAP)
    }
}

impl TextSplitter {
    pub const DEFAULT_CHUNK_SIZE: usize = 1000;
    pub const DEFAULT_OVERLAP: usize = 200;

    /// Creates a splitter. `overlap` is clamped below `chunk_size` so the
    /// hard-cut fallback always makes forward progress.
    pub fn new(chunk_size: usize, overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            overlap: overlap.min(chunk_size - 1),
        }
    }

    /// Splits `text` into chunks of at most `chunk_size` characters, where
    /// every chunk after the first is prefixed with the last `overlap`
    /// characters of its predecessor. Whitespace-only input yields no chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        let mut pieces = split_by_separators(text, &SEPARATORS, self.chunk_size);
        pieces.retain(|p| !p.trim().is_empty());
        apply_overlap(&pieces, self.overlap)
    }
}

/// Splits `text` with the first separator that applies, accumulating parts
/// into pieces of at most `max_size` and recursing with the remaining
/// separators on anything oversized.
fn split_by_separators(text: &str, separators: &[&str], max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let (sep, remaining) = match separators.split_first() {
        Some((first, rest)) => (*first, rest),
        None => return hard_split(text, max_size),
    };

    let mut pieces = Vec::new();
    let mut current = String::new();

    for part in text.split(sep) {
        let candidate = if current.is_empty() {
            part.to_string()
        } else {
            format!("{}{}{}", current, sep, part)
        };

        if candidate.len() > max_size && !current.is_empty() {
            if current.len() > max_size {
                pieces.extend(split_by_separators(&current, remaining, max_size));
            } else {
                pieces.push(current);
            }
            current = part.to_string();
        } else {
            current = candidate;
        }
    }

    if !current.is_empty() {
        if current.len() > max_size {
            pieces.extend(split_by_separators(&current, remaining, max_size));
        } else {
            pieces.push(current);
        }
    }

    pieces
}

/// Last-resort splitting for a fragment with no usable separators: cut it
/// into windows of `max_size` characters.
fn hard_split(text: &str, max_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + max_size).min(chars.len());
        pieces.push(chars[start..end].iter().collect());
        start = end;
    }

    pieces
}

/// Prefixes every piece after the first with the last `overlap` characters of
/// the piece before it, so adjacent chunks share context.
fn apply_overlap(pieces: &[String], overlap: usize) -> Vec<String> {
    if overlap == 0 || pieces.len() <= 1 {
        return pieces.to_vec();
    }

    let mut chunks = Vec::with_capacity(pieces.len());
    for (i, piece) in pieces.iter().enumerate() {
        if i == 0 {
            chunks.push(piece.clone());
        } else {
            let prev = &pieces[i - 1];
            let skip = prev.chars().count().saturating_sub(overlap);
            let tail: String = prev.chars().skip(skip).collect();
            chunks.push(format!("{}{}", tail, piece));
        }
    }
    chunks
}
