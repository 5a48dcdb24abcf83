//! Background validation and prefetch of the games cache.
//!
//! At startup the coordinator checks every platform listing (and, when
//! enabled, every collection) against the server, records the answer, and
//! re-downloads anything stale. The UI asks [`RefreshCoordinator`] for the
//! pre-validated answer instead of hitting the network itself.
//!
//! A listing being downloaded has a completion handle in `in_progress`.
//! Foreground code that needs that listing waits on the handle rather than
//! issuing a second request. The handle closes and its entry disappears in
//! one step, so a waiter never sees a closed handle that is still listed.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use romdeck_client::{RomLibrary, RomQuery, fetch_all_roms};
use romdeck_core::{CacheKey, Collection, CollectionKind, Platform, Rom, time};
use romdeck_lib::{Config, WorkerPool};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::CacheError;
use crate::games::GamesCache;

/// Collections are fetched in one request with this cap.
const COLLECTION_LIMIT: u32 = 10_000;

static GLOBAL: OnceLock<Arc<RefreshCoordinator>> = OnceLock::new();

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Shared between the coordinator and the games cache. Each map has its
/// own lock and no lock is held across an await.
#[derive(Default)]
pub struct RefreshState {
    freshness: RwLock<HashMap<CacheKey, bool>>,
    bios: RwLock<HashMap<i64, bool>>,
    in_progress: RwLock<HashMap<CacheKey, watch::Receiver<bool>>>,
    collections: RwLock<Vec<Collection>>,
}

/// Outcome of trying to claim a listing for download.
pub enum PrefetchSlot {
    /// This caller downloads; dropping the guard closes the handle.
    Owner(PrefetchGuard),
    /// Someone else is already downloading.
    Waiter(watch::Receiver<bool>),
}

pub struct PrefetchGuard {
    state: Arc<RefreshState>,
    key: CacheKey,
    done: watch::Sender<bool>,
}

impl Drop for PrefetchGuard {
    fn drop(&mut self) {
        let mut in_progress = write(&self.state.in_progress);
        self.done.send_replace(true);
        in_progress.remove(&self.key);
    }
}

async fn wait_done(mut rx: watch::Receiver<bool>) {
    // Err means the sender is gone, which also means done
    let _ = rx.wait_for(|done| *done).await;
}

impl RefreshState {
    pub fn freshness(&self, key: &CacheKey) -> Option<bool> {
        read(&self.freshness).get(key).copied()
    }

    pub fn set_fresh(&self, key: &CacheKey, fresh: bool) {
        write(&self.freshness).insert(key.clone(), fresh);
    }

    pub fn clear_freshness(&self) {
        write(&self.freshness).clear();
    }

    pub fn bios(&self, platform_id: i64) -> Option<bool> {
        read(&self.bios).get(&platform_id).copied()
    }

    pub fn set_bios(&self, platform_id: i64, has_bios: bool) {
        write(&self.bios).insert(platform_id, has_bios);
    }

    pub fn collections(&self) -> Vec<Collection> {
        read(&self.collections).clone()
    }

    pub fn set_collections(&self, collections: Vec<Collection>) {
        *write(&self.collections) = collections;
    }

    pub fn handle(&self, key: &CacheKey) -> Option<watch::Receiver<bool>> {
        read(&self.in_progress).get(key).cloned()
    }

    /// Publish a completion handle for `key`, or hand back the existing one.
    pub fn begin_prefetch(self: &Arc<Self>, key: &CacheKey) -> PrefetchSlot {
        let mut in_progress = write(&self.in_progress);
        if let Some(rx) = in_progress.get(key) {
            return PrefetchSlot::Waiter(rx.clone());
        }
        let (done, rx) = watch::channel(false);
        in_progress.insert(key.clone(), rx);
        PrefetchSlot::Owner(PrefetchGuard {
            state: Arc::clone(self),
            key: key.clone(),
            done,
        })
    }
}

/// Which startup work runs and how wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Upper bound on startup requests in flight
    pub workers: usize,
    /// A startup task still running after this long is abandoned
    pub task_timeout: Option<Duration>,
    pub show_collections: bool,
    pub show_smart_collections: bool,
    pub show_virtual_collections: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            workers: 8,
            task_timeout: None,
            show_collections: true,
            show_smart_collections: false,
            show_virtual_collections: false,
        }
    }
}

impl RefreshOptions {
    /// Tasks are bounded by the download timeout, the longest a single
    /// listing fetch may legitimately take.
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.refresh_workers,
            task_timeout: Some(config.download_timeout()),
            show_collections: config.show_collections,
            show_smart_collections: config.show_smart_collections,
            show_virtual_collections: config.show_virtual_collections,
        }
    }

    pub fn collection_kinds(&self) -> Vec<CollectionKind> {
        [
            (self.show_collections, CollectionKind::Regular),
            (self.show_smart_collections, CollectionKind::Smart),
            (self.show_virtual_collections, CollectionKind::Virtual),
        ]
        .into_iter()
        .filter_map(|(enabled, kind)| enabled.then_some(kind))
        .collect()
    }
}

enum StartupTask {
    Bios(Platform),
    Platform(Platform),
    CollectionList(CollectionKind),
    Collection(Collection),
}

pub struct RefreshCoordinator {
    remote: Arc<dyn RomLibrary>,
    games: Arc<GamesCache>,
    state: Arc<RefreshState>,
    options: RefreshOptions,
    platforms: Vec<Platform>,
    running: watch::Sender<bool>,
}

impl RefreshCoordinator {
    /// Build a coordinator sharing `games`' refresh state. A cache without
    /// one gets a private state, so its writes are not reflected here.
    pub fn new(
        remote: Arc<dyn RomLibrary>,
        games: Arc<GamesCache>,
        options: RefreshOptions,
        platforms: Vec<Platform>,
    ) -> Self {
        let state = games.refresh_state().cloned().unwrap_or_default();
        let (running, _) = watch::channel(false);
        Self {
            remote,
            games,
            state,
            options,
            platforms,
            running,
        }
    }

    /// Install the process-wide coordinator. Later calls return the first
    /// instance and ignore their arguments.
    pub fn init(
        remote: Arc<dyn RomLibrary>,
        games: Arc<GamesCache>,
        options: RefreshOptions,
        platforms: Vec<Platform>,
    ) -> Arc<Self> {
        GLOBAL
            .get_or_init(|| Arc::new(Self::new(remote, games, options, platforms)))
            .clone()
    }

    pub fn global() -> Option<Arc<Self>> {
        GLOBAL.get().cloned()
    }

    pub fn games(&self) -> &Arc<GamesCache> {
        &self.games
    }

    pub fn state(&self) -> &Arc<RefreshState> {
        &self.state
    }

    /// Kick off startup validation in the background. Returns `None` if a
    /// run is already in progress.
    pub fn start(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.running.send_replace(true) {
            return None;
        }
        let this = Arc::clone(self);
        Some(tokio::spawn(async move {
            this.run_startup().await;
            this.running.send_replace(false);
        }))
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    pub async fn wait_until_idle(&self) {
        let mut rx = self.running.subscribe();
        let _ = rx.wait_for(|running| !*running).await;
    }

    /// Run every startup task on the worker pool and wait for all of them.
    ///
    /// Platforms, BIOS lookups and the collection listings share the first
    /// pass; the collections found there are validated in a second pass on
    /// a pool of the same width.
    pub async fn run_startup(self: &Arc<Self>) {
        let mut tasks: Vec<StartupTask> = Vec::with_capacity(self.platforms.len() * 2 + 3);
        for p in &self.platforms {
            tasks.push(StartupTask::Bios(p.clone()));
            tasks.push(StartupTask::Platform(p.clone()));
        }
        tasks.extend(
            self.options
                .collection_kinds()
                .into_iter()
                .map(StartupTask::CollectionList),
        );

        log::debug!(
            "Cache refresh: {} platform(s) on {} worker(s)",
            self.platforms.len(),
            self.options.workers
        );
        let found = self.run_pool(tasks).await;
        self.validate_collections(found).await;
        log::debug!("Cache refresh finished");
    }

    /// Fetch the enabled collection listings, store their union and
    /// validate each one.
    pub async fn fetch_and_prefetch_collections(self: &Arc<Self>) {
        let tasks = self
            .options
            .collection_kinds()
            .into_iter()
            .map(StartupTask::CollectionList)
            .collect();
        let found = self.run_pool(tasks).await;
        self.validate_collections(found).await;
    }

    async fn validate_collections(self: &Arc<Self>, mut found: Vec<Collection>) {
        // Pool results arrive in completion order
        found.sort_by_key(|c| c.kind);
        self.state.set_collections(found.clone());
        self.run_pool(found.into_iter().map(StartupTask::Collection).collect())
            .await;
    }

    /// Run `tasks` at the configured width. Returns any collections the
    /// tasks discovered.
    async fn run_pool(self: &Arc<Self>, tasks: Vec<StartupTask>) -> Vec<Collection> {
        if tasks.is_empty() {
            return Vec::new();
        }
        let this = Arc::clone(self);
        let pool = WorkerPool::start(
            self.options.workers,
            tasks,
            self.options.task_timeout,
            move |task| {
                let this = Arc::clone(&this);
                async move { this.run_task(task).await }
            },
        );
        pool.collect().await.into_iter().flatten().collect()
    }

    async fn run_task(&self, task: StartupTask) -> Vec<Collection> {
        match task {
            StartupTask::Bios(p) => self.fetch_bios_availability(&p).await,
            StartupTask::Platform(p) => self.validate_and_prefetch_platform(&p).await,
            StartupTask::CollectionList(kind) => return self.fetch_collection_list(kind).await,
            StartupTask::Collection(c) => self.validate_and_prefetch_collection(&c).await,
        }
        Vec::new()
    }

    async fn fetch_bios_availability(&self, platform: &Platform) {
        match self.remote.get_firmware(platform.id).await {
            Ok(firmware) => self.state.set_bios(platform.id, !firmware.is_empty()),
            Err(e) => log::debug!("BIOS lookup for {} failed: {e}", platform.slug),
        }
    }

    async fn fetch_collection_list(&self, kind: CollectionKind) -> Vec<Collection> {
        let result = match kind {
            CollectionKind::Regular => self.remote.get_collections().await,
            CollectionKind::Smart => self.remote.get_smart_collections().await,
            CollectionKind::Virtual => self.remote.get_virtual_collections().await,
        };
        result.unwrap_or_else(|e| {
            log::debug!("Fetching {kind:?} collections failed: {e}");
            Vec::new()
        })
    }

    /// Strict-check a platform's listing and record the answer.
    async fn validate_platform(&self, platform: &Platform) -> bool {
        let key = platform.cache_key();
        let listing = RomQuery::platform(platform.id);
        let fresh = match self
            .games
            .strict_check(self.remote.as_ref(), &key, &listing)
            .await
        {
            Ok(fresh) => fresh,
            Err(e) => {
                log::debug!("Freshness check for {key} failed: {e}");
                false
            }
        };
        self.state.set_fresh(&key, fresh);
        fresh
    }

    pub async fn validate_and_prefetch_platform(&self, platform: &Platform) {
        if !self.validate_platform(platform).await {
            if let Err(e) = self.prefetch_platform(platform).await {
                log::debug!("Prefetch of {} failed: {e}", platform.cache_key());
            }
        }
    }

    pub async fn validate_and_prefetch_collection(&self, collection: &Collection) {
        let key = collection.cache_key();
        let entry = self.games.entry(&key);
        let fresh = match entry {
            None => false,
            Some(_) if !self.games.has_payload(&key) => false,
            Some(_) if collection.is_virtual() => {
                let listing = RomQuery::for_collection(collection);
                match self
                    .games
                    .strict_check(self.remote.as_ref(), &key, &listing)
                    .await
                {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        log::debug!("Freshness check for {key} failed: {e}");
                        false
                    }
                }
            }
            Some(entry) => collection.updated_at.is_some_and(|t| {
                time::cmp_seconds(t, entry.last_updated_at) != Ordering::Greater
            }),
        };
        self.state.set_fresh(&key, fresh);
        if !fresh {
            if let Err(e) = self.prefetch_collection(collection).await {
                log::debug!("Prefetch of {key} failed: {e}");
            }
        }
    }

    /// Download a platform's full listing into the cache. If a download is
    /// already running, wait for it instead.
    pub async fn prefetch_platform(&self, platform: &Platform) -> Result<(), CacheError> {
        let key = platform.cache_key();
        let _guard = match self.state.begin_prefetch(&key) {
            PrefetchSlot::Owner(guard) => guard,
            PrefetchSlot::Waiter(rx) => {
                wait_done(rx).await;
                return Ok(());
            }
        };
        let roms = fetch_all_roms(self.remote.as_ref(), &RomQuery::platform(platform.id)).await?;
        self.games.save_platform(&key, &roms)?;
        self.state.set_fresh(&key, true);
        Ok(())
    }

    pub async fn prefetch_collection(&self, collection: &Collection) -> Result<(), CacheError> {
        let key = collection.cache_key();
        let _guard = match self.state.begin_prefetch(&key) {
            PrefetchSlot::Owner(guard) => guard,
            PrefetchSlot::Waiter(rx) => {
                wait_done(rx).await;
                return Ok(());
            }
        };
        let query = RomQuery::for_collection(collection).limit(COLLECTION_LIMIT);
        let page = self.remote.get_roms(&query).await?;
        self.games
            .save_collection(&key, &page.items, collection.updated_at)?;
        self.state.set_fresh(&key, true);
        Ok(())
    }

    /// A platform's listing for foreground use.
    ///
    /// Waits out a download already running for it, validates the slot if
    /// startup has not reached it yet, and refetches a stale one. When that
    /// refetch fails the cached copy, if any, is returned instead.
    pub async fn platform_games(&self, platform: &Platform) -> Result<Vec<Rom>, CacheError> {
        let key = platform.cache_key();
        if self.wait_for_prefetch(&key).await {
            log::debug!("Waited for the running download of {key}");
        }
        let fresh = match self.is_cache_fresh(&key) {
            (fresh, true) => fresh,
            (_, false) => self.validate_platform(platform).await,
        };
        if !fresh {
            if let Err(e) = self.prefetch_platform(platform).await {
                return match self.games.load(&key) {
                    Some(stale) => {
                        log::warn!("Refreshing {key} failed, using cached listing: {e}");
                        Ok(stale)
                    }
                    None => Err(e),
                };
            }
        }
        self.games
            .load(&key)
            .ok_or_else(|| CacheError::cache(format!("no cached listing for {key}")))
    }

    /// `(fresh, validated)`. Unvalidated keys report `(false, false)`.
    pub fn is_cache_fresh(&self, key: &CacheKey) -> (bool, bool) {
        match self.state.freshness(key) {
            Some(fresh) => (fresh, true),
            None => (false, false),
        }
    }

    /// `(has_bios, fetched)`.
    pub fn has_bios(&self, platform_id: i64) -> (bool, bool) {
        match self.state.bios(platform_id) {
            Some(has) => (has, true),
            None => (false, false),
        }
    }

    /// Block until an in-flight download of `key` completes. Returns
    /// whether there was one to wait for.
    pub async fn wait_for_prefetch(&self, key: &CacheKey) -> bool {
        let handle = self.state.handle(key);
        match handle {
            Some(rx) => {
                wait_done(rx).await;
                true
            }
            None => false,
        }
    }

    pub fn is_prefetch_in_progress(&self, key: &CacheKey) -> bool {
        self.state.handle(key).is_some()
    }

    /// Flag only; the payload stays on disk.
    pub fn mark_cache_stale(&self, key: &CacheKey) {
        self.state.set_fresh(key, false);
    }

    pub fn mark_cache_fresh(&self, key: &CacheKey) {
        self.state.set_fresh(key, true);
    }

    /// Collections discovered at startup.
    pub fn collections(&self) -> Vec<Collection> {
        self.state.collections()
    }
}

#[cfg(test)]
#[path = "tests/refresh_tests.rs"]
mod tests;
