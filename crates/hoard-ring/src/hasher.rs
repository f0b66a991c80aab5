use std::sync::Arc;

/// Hash function mapping bytes to a point on the ring.
pub type HashFn = Arc<dyn Fn(&[u8]) -> u32 + Send + Sync>;

/// CRC-32 (IEEE) checksum; the ring's default hash.
pub fn crc32(data: &[u8]) -> u32 {
    crc32fast::hash(data)
}

/// The default [`HashFn`].
pub fn default_hash() -> HashFn {
    Arc::new(crc32)
}
