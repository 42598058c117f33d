/// Returns the cached value for `$key`, or awaits `$block`, queues its result for
/// caching with a `$ttl`-second expiry, and returns it.
///
/// Must be used inside a function returning `AppResult`; errors from the cache read
/// or from `$block` are propagated with `?`.
///
/// ```rust,ignore
/// async fn app_details(&self, app_id: i64) -> AppResult<AppMetadata> {
///     cached!(self.cache, CacheKey::AppDetails(app_id), TTL, self.fetch(app_id))
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await? {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
