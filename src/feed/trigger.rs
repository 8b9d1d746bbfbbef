use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::controller::{FeedController, LoadOutcome};
use super::fetcher::FetchError;

/// 默认节流窗口
pub const DEFAULT_THROTTLE_WINDOW: Duration = Duration::from_millis(500);

/// 滚动触发的加载目标
#[async_trait]
pub trait LoadTarget: Send + Sync {
    async fn load_more(&self) -> Result<LoadOutcome, FetchError>;
}

#[async_trait]
impl LoadTarget for FeedController {
    async fn load_more(&self) -> Result<LoadOutcome, FetchError> {
        FeedController::load_more(self).await
    }
}

/// 已排期调用的凭据
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingCall(u64);

/// 节流状态：同一时间最多一个待执行的调用
#[derive(Debug, Default)]
pub struct Throttle {
    pending: Option<PendingCall>,
    issued: u64,
}

impl Throttle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 没有待执行调用时发放新凭据，否则返回 None
    pub fn schedule(&mut self) -> Option<PendingCall> {
        if self.pending.is_some() {
            return None;
        }
        self.issued += 1;
        let call = PendingCall(self.issued);
        self.pending = Some(call);
        Some(call)
    }

    /// 调用到期；凭据已被取消时返回 false
    pub fn fire(&mut self, call: PendingCall) -> bool {
        if self.pending == Some(call) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// 哨兵元素可见性触发器
///
/// 哨兵变为可见时，在节流窗口之后调用一次 `load_more`；窗口内的其余可见事件全部忽略。
/// 触发器被释放时取消尚未执行的调用。
pub struct ScrollTrigger {
    target: Arc<dyn LoadTarget>,
    window: Duration,
    throttle: Arc<Mutex<Throttle>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ScrollTrigger {
    pub fn new(target: Arc<dyn LoadTarget>, window: Duration) -> Self {
        Self {
            target,
            window,
            throttle: Arc::new(Mutex::new(Throttle::new())),
            task: Mutex::new(None),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// 处理一次可见性变化，返回是否新排期了调用
    pub fn on_visibility(&self, visible: bool) -> bool {
        if !visible {
            return false;
        }

        let Some(call) = lock(&self.throttle).schedule() else {
            return false;
        };

        // 窗口从可见事件发生时开始计算
        let deadline = tokio::time::Instant::now() + self.window;
        let target = self.target.clone();
        let throttle = self.throttle.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if !lock(&throttle).fire(call) {
                return;
            }
            match target.load_more().await {
                Ok(outcome) => tracing::debug!("Scroll-triggered load: {:?}", outcome),
                Err(e) => tracing::warn!("Scroll-triggered load failed: {}", e),
            }
        });

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.throttle).is_pending()
    }

    /// 取消尚未执行的调用
    ///
    /// 只撤回还在节流窗口内等待的调用；已经开始的 `load_more` 会继续执行到结束。
    pub fn cancel(&self) {
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        let mut throttle = lock(&self.throttle);
        if !throttle.is_pending() {
            return;
        }
        throttle.cancel();
        if let Some(handle) = handle {
            handle.abort();
        }
    }
}

impl Drop for ScrollTrigger {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn lock(throttle: &Mutex<Throttle>) -> MutexGuard<'_, Throttle> {
    throttle.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::controller::{FeedStatus, PageCache};
    use crate::feed::fetcher::PageFetcher;
    use crate::feed::types::{ImageRecord, PageResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingTarget {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LoadTarget for CountingTarget {
        async fn load_more(&self) -> Result<LoadOutcome, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LoadOutcome::Skipped)
        }
    }

    #[test]
    fn test_throttle_token() {
        let mut throttle = Throttle::new();
        let call = throttle.schedule().unwrap();
        assert!(throttle.is_pending());
        assert_eq!(throttle.schedule(), None);

        assert!(throttle.fire(call));
        assert!(!throttle.is_pending());
        // 重复 fire 无效
        assert!(!throttle.fire(call));

        let next = throttle.schedule().unwrap();
        assert_ne!(next, call);
        throttle.cancel();
        assert!(!throttle.fire(next));
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_events_schedules_once() {
        let target = Arc::new(CountingTarget::default());
        let trigger = ScrollTrigger::new(target.clone(), DEFAULT_THROTTLE_WINDOW);

        let mut scheduled = 0;
        for _ in 0..10 {
            if trigger.on_visibility(true) {
                scheduled += 1;
            }
            tokio::time::advance(Duration::from_millis(40)).await;
        }
        assert_eq!(scheduled, 1);
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 1);
        assert!(!trigger.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedules_again_after_fire() {
        let target = Arc::new(CountingTarget::default());
        let trigger = ScrollTrigger::new(target.clone(), DEFAULT_THROTTLE_WINDOW);

        assert!(trigger.on_visibility(true));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(trigger.on_visibility(true));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(target.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_events_ignored() {
        let target = Arc::new(CountingTarget::default());
        let trigger = ScrollTrigger::new(target.clone(), DEFAULT_THROTTLE_WINDOW);

        for _ in 0..5 {
            assert!(!trigger.on_visibility(false));
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let target = Arc::new(CountingTarget::default());
        let trigger = ScrollTrigger::new(target.clone(), DEFAULT_THROTTLE_WINDOW);

        assert!(trigger.on_visibility(true));
        drop(trigger);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(target.calls.load(Ordering::SeqCst), 0);
    }

    struct SinglePage;

    #[async_trait]
    impl PageFetcher for SinglePage {
        async fn fetch_page(&self, _page: u32, _per_page: u32) -> Result<PageResult, FetchError> {
            Ok(PageResult {
                records: Vec::new(),
                total: 0,
                total_pages: 0,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drives_feed_controller() {
        let cache = Arc::new(PageCache::new(PageCache::DEFAULT_MAX_AGE));
        let controller = Arc::new(FeedController::new(Arc::new(SinglePage), cache, 12));
        let trigger = ScrollTrigger::new(controller.clone(), DEFAULT_THROTTLE_WINDOW);

        trigger.on_visibility(true);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(controller.next_page(), 2);
        assert!(!controller.has_more());
    }

    /// 每页一条记录，请求耗时 2 秒
    #[derive(Default)]
    struct SlowFeed {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for SlowFeed {
        async fn fetch_page(&self, page: u32, _per_page: u32) -> Result<PageResult, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_secs(2)).await;
            let record: ImageRecord = serde_json::from_value(serde_json::json!({
                "id": page,
                "generation_timestamp": "2024-06-01T12:00:00",
                "generation_width": 512,
                "generation_height": 512,
                "generation_steps": 20,
                "imgbb_url": format!("https://i.ibb.co/{}.png", page),
                "imgbb_display_url": format!("https://i.ibb.co/{}_display.png", page),
                "imgbb_width": 512,
                "imgbb_height": 512,
                "imgbb_size": 1024
            }))
            .unwrap();
            Ok(PageResult {
                records: vec![record],
                total: 10,
                total_pages: 10,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_mid_fetch_lets_load_finish() {
        let api = Arc::new(SlowFeed::default());
        let cache = Arc::new(PageCache::new(PageCache::DEFAULT_MAX_AGE));
        let controller = Arc::new(FeedController::new(api.clone(), cache, 1));
        let trigger = ScrollTrigger::new(controller.clone(), DEFAULT_THROTTLE_WINDOW);

        assert!(trigger.on_visibility(true));
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(controller.is_loading());
        assert!(!trigger.is_pending());

        // 请求已经发出，取消不影响它完成
        trigger.cancel();
        drop(trigger);
        tokio::time::sleep(Duration::from_secs(3)).await;

        assert!(!controller.is_loading());
        assert_eq!(controller.status(), FeedStatus::Idle);
        assert_eq!(controller.next_page(), 2);
        assert_eq!(controller.items().len(), 1);

        let outcome = controller.load_more().await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Appended { page: 2, .. }));
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
