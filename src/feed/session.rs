use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::FeedConfig;

use super::controller::{FeedController, PageCache};
use super::fetcher::{ImagesApi, PageFetcher};
use super::trigger::ScrollTrigger;

/// 一个浏览页面的 feed 生命周期
///
/// 创建时启动缓存定期清理，释放时停止清理并取消尚未执行的滚动加载。
/// 需要在 tokio 运行时内创建。
pub struct FeedSession {
    controller: Arc<FeedController>,
    trigger: ScrollTrigger,
    cache: Arc<PageCache>,
    cleanup: JoinHandle<()>,
}

impl FeedSession {
    pub fn new(config: &FeedConfig) -> anyhow::Result<Self> {
        let api = ImagesApi::from_config(config)?;
        Ok(Self::with_fetcher(config, Arc::new(api)))
    }

    pub fn with_fetcher(config: &FeedConfig, fetcher: Arc<dyn PageFetcher>) -> Self {
        let cache = Arc::new(PageCache::new(config.cache_max_age));
        Self::with_parts(config, fetcher, cache)
    }

    /// 多个 session 可以共用同一个缓存
    pub fn with_parts(config: &FeedConfig, fetcher: Arc<dyn PageFetcher>, cache: Arc<PageCache>) -> Self {
        let cleanup = cache.spawn_cleanup(config.cleanup_interval);
        let controller = Arc::new(FeedController::new(fetcher, cache.clone(), config.page_size));
        let trigger = ScrollTrigger::new(controller.clone(), config.throttle_window);

        Self {
            controller,
            trigger,
            cache,
            cleanup,
        }
    }

    pub fn controller(&self) -> &Arc<FeedController> {
        &self.controller
    }

    pub fn cache(&self) -> &Arc<PageCache> {
        &self.cache
    }

    /// 哨兵元素可见性变化
    pub fn on_sentinel_visibility(&self, visible: bool) -> bool {
        self.trigger.on_visibility(visible)
    }
}

impl Drop for FeedSession {
    fn drop(&mut self) {
        self.cleanup.abort();
    }
}
