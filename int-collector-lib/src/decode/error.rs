use thiserror::Error;

/// Errors produced while decoding an INT report payload.
///
/// Every variant is local to the payload being decoded: the caller drops the
/// payload and moves on to the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A header or hop stride does not fit in what is left of the payload.
    #[error("{what} needs {needed} bytes at offset {offset}, only {available} available")]
    BufferUnderrun { what: &'static str, offset: usize, needed: usize, available: usize },

    /// A bit read ran past the end of the cursor's buffer.
    #[error("read of {width} bits at bit {position} overruns buffer ({remaining} bits left)")]
    BitUnderrun { position: usize, width: u32, remaining: usize },

    /// Requested bit width is zero or wider than the target integer.
    #[error("invalid bit width {0}")]
    InvalidWidth(u32),
}

impl DecodeError {
    /// True for both byte-span and bit-level underruns.
    pub fn is_underrun(&self) -> bool {
        matches!(self, Self::BufferUnderrun { .. } | Self::BitUnderrun { .. })
    }
}
