use crate::domain::model::{QueryKey, SkipOption};
use crate::domain::ports::{Clock, SkipSource, SystemClock};
use crate::utils::error::{Result, SkipError};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone)]
struct Fetched {
    options: Arc<[SkipOption]>,
    fetched_at: Instant,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Fetched>>>;

struct CacheEntry {
    generation: u64,
    fetch: SharedFetch,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    next_generation: u64,
}

/// 依地點查詢 skip 清單，並在新鮮期內重複使用結果
///
/// 同一個 `(postcode, area)` 在新鮮期內只會發出一次請求；請求進行中時，
/// 其他呼叫者等待同一個結果。請求在背景 task 中執行，呼叫者放棄等待不會取消它。
/// 失敗的結果不會被當成新鮮資料保留，下一次呼叫會重新請求。
pub struct LocationQueryService<S: SkipSource + 'static> {
    source: Arc<S>,
    clock: Arc<dyn Clock>,
    stale_time: Duration,
    cache: Mutex<CacheState>,
}

impl<S: SkipSource + 'static> LocationQueryService<S> {
    pub fn new(source: S) -> Self {
        Self::with_clock(source, DEFAULT_STALE_TIME, Arc::new(SystemClock))
    }

    pub fn with_stale_time(source: S, stale_time: Duration) -> Self {
        Self::with_clock(source, stale_time, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, stale_time: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source: Arc::new(source),
            clock,
            stale_time,
            cache: Mutex::new(CacheState::default()),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// 取得某地點的 skip 清單；postcode 或 area 為空時直接回傳空清單，不發請求
    pub async fn fetch_options(&self, postcode: &str, area: &str) -> Result<Arc<[SkipOption]>> {
        match QueryKey::new(postcode, area) {
            Some(key) => self.fetch_key(&key).await,
            None => {
                tracing::debug!("No query: postcode or area missing");
                Ok(Arc::from(Vec::new()))
            }
        }
    }

    pub async fn fetch_key(&self, key: &QueryKey) -> Result<Arc<[SkipOption]>> {
        let (generation, fetch) = self.lookup_or_start(key);
        let fetched = fetch.await?;

        if self.is_fresh(&fetched) {
            return Ok(fetched.options);
        }

        // 背景請求完成後無人讀取，等到被讀取時已超過新鮮期
        tracing::debug!("Cached result for {} settled past freshness window, refetching", key);
        let fetch = self.restart(key, generation);
        let fetched = fetch.await?;
        Ok(fetched.options)
    }

    /// 該查詢鍵是否有仍在新鮮期內的成功結果
    pub fn is_cached(&self, postcode: &str, area: &str) -> bool {
        let Some(key) = QueryKey::new(postcode, area) else {
            return false;
        };
        let state = self.lock();
        match state.entries.get(&key).and_then(|entry| settled(&entry.fetch)) {
            Some(Ok(fetched)) => self.is_fresh(&fetched),
            _ => false,
        }
    }

    pub fn invalidate(&self, postcode: &str, area: &str) -> bool {
        let Some(key) = QueryKey::new(postcode, area) else {
            return false;
        };
        let removed = self.lock().entries.remove(&key).is_some();
        if removed {
            tracing::debug!("Invalidated cache entry for {}", key);
        }
        removed
    }

    pub fn clear(&self) {
        self.lock().entries.clear();
    }

    fn lookup_or_start(&self, key: &QueryKey) -> (u64, SharedFetch) {
        let mut state = self.lock();

        if let Some(entry) = state.entries.get(key) {
            match settled(&entry.fetch) {
                None => {
                    tracing::debug!("Joining in-flight fetch for {}", key);
                    return (entry.generation, entry.fetch.clone());
                }
                Some(Ok(fetched)) if self.is_fresh(&fetched) => {
                    tracing::debug!("Cache hit for {}", key);
                    return (entry.generation, entry.fetch.clone());
                }
                Some(Ok(_)) => tracing::debug!("Cache entry for {} is stale", key),
                Some(Err(e)) => tracing::debug!("Previous fetch for {} failed ({}), retrying", key, e),
            }
        } else {
            tracing::debug!("Cache miss for {}", key);
        }

        self.insert_fetch(&mut state, key)
    }

    fn restart(&self, key: &QueryKey, generation: u64) -> SharedFetch {
        let mut state = self.lock();
        let current = state
            .entries
            .get(key)
            .map(|entry| (entry.generation, entry.fetch.clone()));
        match current {
            // 其他呼叫者已經重新請求過
            Some((current_generation, fetch)) if current_generation != generation => fetch,
            _ => self.insert_fetch(&mut state, key).1,
        }
    }

    fn insert_fetch(&self, state: &mut CacheState, key: &QueryKey) -> (u64, SharedFetch) {
        self.prune(state);

        let generation = state.next_generation;
        state.next_generation += 1;

        let fetch = self.spawn_fetch(key.clone());
        state.entries.insert(
            key.clone(),
            CacheEntry {
                generation,
                fetch: fetch.clone(),
            },
        );
        (generation, fetch)
    }

    fn spawn_fetch(&self, key: QueryKey) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let clock = Arc::clone(&self.clock);

        let handle = tokio::spawn(async move {
            tracing::info!("🔄 Fetching skips for {}", key);
            match source.fetch_by_location(&key).await {
                Ok(options) => {
                    tracing::info!("✅ Loaded {} skip options for {}", options.len(), key);
                    Ok(Fetched {
                        options: options.into(),
                        fetched_at: clock.now(),
                    })
                }
                Err(e) => {
                    tracing::warn!("❌ Fetch for {} failed: {}", key, e);
                    Err(e)
                }
            }
        });

        async move {
            handle.await.unwrap_or_else(|e| {
                Err(SkipError::TaskError {
                    message: e.to_string(),
                })
            })
        }
        .boxed()
        .shared()
    }

    /// 移除已完成但過期或失敗的項目；進行中的請求保留
    fn prune(&self, state: &mut CacheState) {
        let before = state.entries.len();
        state.entries.retain(|_, entry| match settled(&entry.fetch) {
            None => true,
            Some(Ok(fetched)) => self.is_fresh(&fetched),
            Some(Err(_)) => false,
        });
        let pruned = before - state.entries.len();
        if pruned > 0 {
            tracing::debug!("Pruned {} stale cache entries", pruned);
        }
    }

    fn is_fresh(&self, fetched: &Fetched) -> bool {
        self.clock.now().saturating_duration_since(fetched.fetched_at) < self.stale_time
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 背景請求的結果；尚未完成時為 `None`
///
/// 只靠 `peek` 看不到無人等待時完成的 task，所以在這裡不阻塞地輪詢一次。
fn settled(fetch: &SharedFetch) -> Option<Result<Fetched>> {
    fetch.peek().cloned().or_else(|| fetch.clone().now_or_never())
}
