//! Byte-level tokenizer
//!
//! Maps each byte of the UTF-8 text to a token id, truncated to the
//! configured maximum length. Deterministic and vocabulary-free, which keeps
//! checkpoint lineage independent of any tokenizer training artifact; a
//! learned subword tokenizer can replace this behind the same interface.

/// Number of byte tokens.
pub const BYTE_VOCAB: usize = 256;
/// Padding token id, used for empty documents.
pub const PAD_ID: u32 = BYTE_VOCAB as u32;
/// Full vocabulary size including the pad token.
pub const VOCAB_SIZE: usize = BYTE_VOCAB + 1;

/// Byte-level encoder with a fixed maximum length.
#[derive(Debug, Clone, Copy)]
pub struct ByteTokenizer {
    max_len: usize,
    /// Pad-first model families keep the tail of over-long documents;
    /// everything else keeps the head.
    keep_tail: bool,
}

impl ByteTokenizer {
    #[must_use]
    pub fn new(max_len: usize, keep_tail: bool) -> Self {
        Self { max_len, keep_tail }
    }

    /// Encode text to token ids, truncated to `max_len`.
    ///
    /// An empty document encodes to a single pad token so every sequence has
    /// at least one position.
    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let bytes = text.as_bytes();
        let window = if bytes.len() > self.max_len {
            if self.keep_tail {
                &bytes[bytes.len() - self.max_len..]
            } else {
                &bytes[..self.max_len]
            }
        } else {
            bytes
        };
        if window.is_empty() {
            return vec![PAD_ID];
        }
        window.iter().map(|&b| u32::from(b)).collect()
    }

    #[must_use]
    pub fn max_len(&self) -> usize {
        self.max_len
    }
}
