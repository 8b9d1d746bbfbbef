use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 图片记录（客户端只读副本）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub id: i64,
    pub generation_timestamp: NaiveDateTime,
    pub generation_width: i32,
    pub generation_height: i32,
    pub generation_steps: i32,
    #[serde(default)]
    pub generation_prompt: Option<String>,
    pub imgbb_url: String,
    pub imgbb_display_url: String,
    #[serde(default)]
    pub imgbb_title: Option<String>,
    pub imgbb_width: i32,
    pub imgbb_height: i32,
    pub imgbb_size: i64,
}

/// 单页结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub records: Vec<ImageRecord>,
    pub total: u64,
    pub total_pages: u64,
}

/// 缓存键，由页码和每页数量确定
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(page: u32, per_page: u32) -> Self {
        let digest = md5::compute(format!("images:{}:{}", page, per_page));
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
