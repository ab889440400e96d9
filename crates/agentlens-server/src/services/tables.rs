//! Paged table listing.

use crate::dto::{Pagination, TablesParams, TablesResponse};
use crate::error::AppError;
use crate::ServerState;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Validated paging window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Page {
    pub fn from_params(params: &TablesParams) -> Result<Self, AppError> {
        let page = params.page.unwrap_or(1);
        let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE as i64);

        if page < 1 || page > u32::MAX as i64 {
            return Err(AppError::BadRequest("page must be >= 1".into()));
        }
        if !(1..=MAX_PAGE_SIZE as i64).contains(&page_size) {
            return Err(AppError::BadRequest(format!(
                "page_size must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }

        Ok(Self {
            page: page as u32,
            page_size: page_size as u32,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    pub fn pagination(&self, total_count: i64) -> Pagination {
        let size = self.page_size as i64;
        Pagination {
            page: self.page,
            page_size: self.page_size,
            total_count,
            total_pages: (total_count + size - 1) / size,
        }
    }
}

pub async fn list(state: &ServerState, params: &TablesParams) -> Result<TablesResponse, AppError> {
    let page = Page::from_params(params)?;
    let result = state
        .catalog
        .list_tables(page.page_size as i64, page.offset())
        .await
        .map_err(|e| AppError::from_db("Error fetching tables", e))?;

    Ok(TablesResponse {
        tables: result.tables,
        pagination: page.pagination(result.total_count),
    })
}
