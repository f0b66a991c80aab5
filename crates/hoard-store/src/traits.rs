use hoard_types::ByteView;

/// A value whose memory footprint can be accounted in bytes.
pub trait ByteSize {
    /// Number of bytes this value contributes to a store's budget.
    fn byte_size(&self) -> usize;
}

impl ByteSize for ByteView {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for Vec<u8> {
    fn byte_size(&self) -> usize {
        self.len()
    }
}

impl ByteSize for String {
    fn byte_size(&self) -> usize {
        self.len()
    }
}
