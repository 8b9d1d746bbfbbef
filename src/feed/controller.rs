use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::page::PageRequest;

use super::cache::TtlCache;
use super::fetcher::{FetchError, PageFetcher};
use super::types::{Fingerprint, ImageRecord, PageResult};

/// 按页缓存的拉取结果
pub type PageCache = TtlCache<Fingerprint, PageResult>;

/// 加载状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Idle,
    Loading,
    Exhausted,
    Failed,
}

/// 一次 `load_more` 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Appended {
        page: u32,
        /// 本页返回的记录数
        received: usize,
        /// 去重后实际追加的记录数
        appended: usize,
        from_cache: bool,
    },
    /// 正在加载、已加载完或处于失败状态，未发起请求
    Skipped,
    /// 请求期间发生了 reset，结果被丢弃
    Discarded,
}

/// 当前 feed 状态的只读快照
#[derive(Debug, Clone)]
pub struct FeedSnapshot {
    pub items: Vec<ImageRecord>,
    pub next_page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub status: FeedStatus,
    pub last_error: Option<FetchError>,
}

struct FeedState {
    items: Vec<ImageRecord>,
    seen: HashSet<i64>,
    next_page: u32,
    has_more: bool,
    is_loading: bool,
    status: FeedStatus,
    last_error: Option<FetchError>,
    /// 每次 reset 递增，用于丢弃过期请求的结果
    generation: u64,
}

impl FeedState {
    fn new(generation: u64) -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            next_page: 1,
            has_more: true,
            is_loading: false,
            status: FeedStatus::Idle,
            last_error: None,
            generation,
        }
    }

    /// 追加记录，已出现过的 id 直接丢弃
    fn append(&mut self, records: Vec<ImageRecord>) -> usize {
        let before = self.items.len();
        for record in records {
            if self.seen.insert(record.id) {
                self.items.push(record);
            }
        }
        self.items.len() - before
    }
}

struct LoadTicket {
    page: u32,
    generation: u64,
}

/// `load_more` 的 future 在请求途中被丢弃时，把状态退回 `Idle`
struct LoadingGuard<'a> {
    controller: &'a FeedController,
    generation: u64,
    armed: bool,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.controller.lock();
        if state.generation == self.generation && state.is_loading {
            tracing::debug!("Load of page {} dropped before completion", state.next_page);
            state.is_loading = false;
            state.status = FeedStatus::Idle;
        }
    }
}

/// 无限滚动 feed 控制器
///
/// 同一时间最多只有一个请求在进行：`load_more` 在 `Loading` 状态下直接返回 [`LoadOutcome::Skipped`]。
/// 状态锁只在同步步骤中持有，不会跨越 await。
pub struct FeedController {
    fetcher: Arc<dyn PageFetcher>,
    cache: Arc<PageCache>,
    page_size: u32,
    state: Mutex<FeedState>,
}

impl FeedController {
    pub fn new(fetcher: Arc<dyn PageFetcher>, cache: Arc<PageCache>, page_size: u32) -> Self {
        Self {
            fetcher,
            cache,
            page_size: PageRequest::new(1, page_size as i64).per_page(),
            state: Mutex::new(FeedState::new(0)),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn items(&self) -> Vec<ImageRecord> {
        self.lock().items.clone()
    }

    pub fn next_page(&self) -> u32 {
        self.lock().next_page
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.lock().is_loading
    }

    pub fn status(&self) -> FeedStatus {
        self.lock().status
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        let state = self.lock();
        FeedSnapshot {
            items: state.items.clone(),
            next_page: state.next_page,
            has_more: state.has_more,
            is_loading: state.is_loading,
            status: state.status,
            last_error: state.last_error.clone(),
        }
    }

    /// 加载下一页
    ///
    /// 命中缓存时跳过网络请求，但仍会让出一次执行权，调用方看到的始终是异步完成。
    pub async fn load_more(&self) -> Result<LoadOutcome, FetchError> {
        let Some(ticket) = self.begin() else {
            return Ok(LoadOutcome::Skipped);
        };

        let mut guard = LoadingGuard {
            controller: self,
            generation: ticket.generation,
            armed: true,
        };

        let fingerprint = Fingerprint::new(ticket.page, self.page_size);
        let (result, from_cache) = match self.cache.get(&fingerprint) {
            Some(cached) => {
                tracing::debug!("Cache hit for page {} ({})", ticket.page, fingerprint);
                tokio::task::yield_now().await;
                (Ok(cached), true)
            }
            None => {
                let result = self.fetcher.fetch_page(ticket.page, self.page_size).await;
                (result, false)
            }
        };

        guard.armed = false;
        self.finish(ticket, fingerprint, result, from_cache)
    }

    /// 从 `Failed` 恢复并重新加载同一页
    pub async fn retry(&self) -> Result<LoadOutcome, FetchError> {
        {
            let mut state = self.lock();
            if state.status == FeedStatus::Failed {
                state.status = FeedStatus::Idle;
                state.last_error = None;
            }
        }
        self.load_more().await
    }

    /// 清空 feed，回到初始状态；进行中的请求结果会被丢弃
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = FeedState::new(generation);
        tracing::debug!("Feed reset (generation {})", generation);
    }

    fn begin(&self) -> Option<LoadTicket> {
        let mut state = self.lock();
        if state.status != FeedStatus::Idle || state.is_loading || !state.has_more {
            return None;
        }
        state.is_loading = true;
        state.status = FeedStatus::Loading;
        Some(LoadTicket {
            page: state.next_page,
            generation: state.generation,
        })
    }

    fn finish(
        &self,
        ticket: LoadTicket,
        fingerprint: Fingerprint,
        result: Result<PageResult, FetchError>,
        from_cache: bool,
    ) -> Result<LoadOutcome, FetchError> {
        if let (Ok(page), false) = (&result, from_cache) {
            self.cache.set(fingerprint, page.clone());
        }

        let mut state = self.lock();
        if state.generation != ticket.generation {
            tracing::debug!("Discarding page {} loaded before reset", ticket.page);
            return Ok(LoadOutcome::Discarded);
        }

        state.is_loading = false;
        match result {
            Ok(page) => {
                let received = page.records.len();
                let appended = state.append(page.records);
                state.next_page += 1;
                state.has_more = received == self.page_size as usize
                    && state.next_page as u64 <= page.total_pages;
                state.status = if state.has_more {
                    FeedStatus::Idle
                } else {
                    FeedStatus::Exhausted
                };
                tracing::debug!(
                    "Page {} merged: {} received, {} appended, has_more={}",
                    ticket.page,
                    received,
                    appended,
                    state.has_more
                );
                Ok(LoadOutcome::Appended {
                    page: ticket.page,
                    received,
                    appended,
                    from_cache,
                })
            }
            Err(e) => {
                tracing::warn!("Failed to load page {}: {}", ticket.page, e);
                state.status = FeedStatus::Failed;
                state.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
