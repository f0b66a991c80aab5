use async_trait::async_trait;
use hoard_types::CacheResult;

/// Backing source consulted when a key is missing from the whole fleet.
///
/// Errors are surfaced to the caller as-is; the cache never retries.
#[async_trait]
pub trait Getter: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>>;
}

/// Adapts a plain function or closure into a [`Getter`].
pub struct GetterFn<F>(pub F);

#[async_trait]
impl<F> Getter for GetterFn<F>
where
    F: Fn(&str) -> CacheResult<Vec<u8>> + Send + Sync,
{
    async fn get(&self, key: &str) -> CacheResult<Vec<u8>> {
        (self.0)(key)
    }
}
