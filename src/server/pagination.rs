use crate::page::{PageRequest, DEFAULT_PAGE, DEFAULT_PER_PAGE};

/// `/api/images` 的原始查询参数
///
/// 按字符串接收，非数字的值回落到默认值而不是返回 400。
#[derive(Debug, Clone, Default)]
pub struct PageParams {
    pub page: Option<String>,
    pub per_page: Option<String>,
}

impl PageParams {
    /// 从查询键值对构造；同名参数重复出现时取第一个
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "page" => &mut params.page,
                "per_page" => &mut params.per_page,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }

    pub fn to_request(&self) -> PageRequest {
        let page = self
            .page
            .as_deref()
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_PAGE as i64);
        let per_page = self
            .per_page
            .as_deref()
            .and_then(parse_leading_int)
            .unwrap_or(DEFAULT_PER_PAGE as i64);
        PageRequest::new(page, per_page)
    }
}

/// 解析字符串开头的整数，例如 `"12abc"` -> 12，`"1.9"` -> 1；没有数字时返回 None
pub fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    let digits: &str = &digits[..digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len())];
    if digits.is_empty() {
        return None;
    }

    // 超出范围时饱和
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
