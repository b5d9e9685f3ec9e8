use serde::{Deserialize, Serialize};

use crate::error::AppError;

const DEFAULT_SIZE: i64 = 10;
const MAX_SIZE: i64 = 100;

/// 分页查询参数（原始字符串形式）
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub page: Option<String>,
    pub size: Option<String>,
    #[serde(rename = "orderBy")]
    pub order_by: Option<String>,
}

/// 分页查询
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationQuery {
    pub size: i64,
    pub page: i64,
    pub order_by: String,
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            page: 1,
            order_by: String::new(),
        }
    }
}

impl PaginationQuery {
    pub fn from_params(params: &PaginationParams) -> Result<Self, AppError> {
        let size = match params.size.as_deref().map(str::trim) {
            None | Some("") => DEFAULT_SIZE,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| AppError::bad_request(format!("无效的分页大小: {raw}")))?
                .min(MAX_SIZE),
        };
        let page = match params.page.as_deref().map(str::trim) {
            None | Some("") => 1,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|p| *p > 0)
                .ok_or_else(|| AppError::bad_request(format!("无效的页码: {raw}")))?,
        };
        // 偏移量必须能用 i64 表示
        if (page - 1).checked_mul(size).is_none() {
            return Err(AppError::bad_request(format!("页码过大: {page}")));
        }

        Ok(Self {
            size,
            page,
            order_by: params.order_by.clone().unwrap_or_default(),
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    pub fn limit(&self) -> i64 {
        self.size
    }

    /// 将排序参数映射到白名单中的列，未知参数使用默认列
    pub fn order_column(&self, allowed: &[(&str, &'static str)], default: &'static str) -> &'static str {
        allowed
            .iter()
            .find(|(name, _)| *name == self.order_by)
            .map(|(_, column)| *column)
            .unwrap_or(default)
    }

    pub fn page_info(&self, total_count: i64) -> PageInfo {
        PageInfo {
            total_count,
            total_pages: total_pages(total_count, self.size),
            page: self.page,
            size: self.size,
            has_more: has_more(self.page, total_count, self.size),
        }
    }
}

/// 分页信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub total_count: i64,
    pub total_pages: i64,
    pub page: i64,
    pub size: i64,
    pub has_more: bool,
}

pub fn total_pages(total_count: i64, size: i64) -> i64 {
    if size <= 0 {
        return 0;
    }
    (total_count + size - 1) / size
}

pub fn has_more(page: i64, total_count: i64, size: i64) -> bool {
    page < total_pages(total_count, size)
}
