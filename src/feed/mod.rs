//! 客户端 feed：缓存、拉取、无限滚动控制
pub mod cache;
pub mod controller;
pub mod fetcher;
pub mod session;
pub mod trigger;
pub mod types;

pub use cache::{Clock, SystemClock, TtlCache};
pub use controller::{FeedController, FeedSnapshot, FeedStatus, LoadOutcome, PageCache};
pub use fetcher::{FetchError, ImagesApi, PageFetcher};
pub use session::FeedSession;
pub use trigger::{LoadTarget, ScrollTrigger, Throttle};
pub use types::{Fingerprint, ImageRecord, PageResult};
