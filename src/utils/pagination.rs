use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

const DEFAULT_PER_PAGE: u32 = 20;
const MAX_PER_PAGE: u32 = 100;

/// `?page=&per_page=` 查询参数，页码从 1 开始
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub current_page: u32,
    pub per_page: u32,
    pub total: i64,
    pub total_pages: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

impl PaginationParams {
    pub fn new(page: Option<u32>, per_page: Option<u32>) -> Self {
        Self { page, per_page }
    }

    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    // page 来自查询串且没有上限，乘法需饱和
    fn skip(&self) -> usize {
        (self.page() as usize - 1).saturating_mul(self.per_page() as usize)
    }
}

impl<T> PaginatedResponse<T> {
    /// 集合整体在内存中，按页切片
    pub fn from_all(all: Vec<T>, params: &PaginationParams) -> Self {
        let total = all.len();
        let per_page = params.per_page();
        // 空集合也算一页
        let total_pages = total.div_ceil(per_page as usize).max(1) as u32;

        let items = all
            .into_iter()
            .skip(params.skip())
            .take(per_page as usize)
            .collect();

        Self {
            items,
            pagination: PaginationInfo {
                current_page: params.page(),
                per_page,
                total: total as i64,
                total_pages,
            },
        }
    }
}
