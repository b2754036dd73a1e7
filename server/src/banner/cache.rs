use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Mutex;

/// One finished render.
#[derive(Debug, Clone)]
pub struct CachedBanner {
    pub png: Arc<Vec<u8>>,
    /// Unix milliseconds at which the render finished, not when the
    /// request that triggered it arrived. The TTL window starts here.
    pub rendered_at: i64,
}

impl CachedBanner {
    pub fn is_fresh(&self, now_ms: i64, ttl_secs: u64) -> bool {
        let ttl_ms = i64::try_from(ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        now_ms.saturating_sub(self.rendered_at) < ttl_ms
    }
}

/// Single-slot banner cache with a render gate.
///
/// The slot is swapped as a whole under a short sync lock. Renders on a
/// cache miss go through an async mutex so a request that waited behind
/// another render picks up its result instead of rendering again.
#[derive(Debug)]
pub struct RenderCache {
    ttl_secs: u64,
    slot: RwLock<Option<CachedBanner>>,
    gate: Mutex<()>,
}

impl RenderCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            slot: RwLock::new(None),
            gate: Mutex::new(()),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// The cached bytes if they are younger than the TTL at `now_ms`.
    pub fn fresh_at(&self, now_ms: i64) -> Option<Arc<Vec<u8>>> {
        self.slot
            .read()
            .as_ref()
            .filter(|entry| entry.is_fresh(now_ms, self.ttl_secs))
            .map(|entry| entry.png.clone())
    }

    pub fn fresh(&self) -> Option<Arc<Vec<u8>>> {
        self.fresh_at(Utc::now().timestamp_millis())
    }

    /// Replace the slot, stamped with the current time.
    pub fn store(&self, png: Arc<Vec<u8>>) {
        let entry = CachedBanner {
            png,
            rendered_at: Utc::now().timestamp_millis(),
        };
        *self.slot.write() = Some(entry);
    }

    pub fn current(&self) -> Option<CachedBanner> {
        self.slot.read().clone()
    }

    /// Return the fresh entry, or run `render` and cache its output.
    ///
    /// An error from `render` is passed through and the previous entry
    /// stays in place.
    pub async fn get_or_render<F, Fut, E>(&self, render: F) -> Result<Arc<Vec<u8>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<u8>, E>>,
    {
        if let Some(png) = self.fresh() {
            return Ok(png);
        }

        let _guard = self.gate.lock().await;
        if let Some(png) = self.fresh() {
            return Ok(png);
        }

        let png = Arc::new(render().await?);
        self.store(png.clone());
        Ok(png)
    }
}
