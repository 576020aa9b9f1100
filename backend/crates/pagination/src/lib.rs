//! Page-number pagination shared by the SkillSwap list endpoints.
//!
//! Endpoints accept `page` (1-based) and `limit` query parameters and answer
//! with a [`Paginated`] envelope carrying the page items together with the
//! total match count, the current page, and the derived page count.

use serde::{Deserialize, Serialize};

/// Page returned when the client omits `page`.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `limit`.
pub const DEFAULT_LIMIT: u32 = 10;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Validation failures for page parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageParamsError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `limit` was zero or above [`MAX_LIMIT`].
    #[error("limit must be between 1 and {max}, got {limit}")]
    LimitOutOfRange {
        /// The rejected limit.
        limit: u32,
        /// The maximum accepted limit.
        max: u32,
    },
}

/// Validated page selection.
///
/// # Examples
/// ```
/// use pagination::PageParams;
///
/// let params = PageParams::new(Some(3), Some(20)).expect("valid params");
/// assert_eq!(params.offset(), 40);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    page: u32,
    limit: u32,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    /// Validate optional client-supplied values, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PageParamsError`] when `page` is zero or `limit` falls
    /// outside `1..=MAX_LIMIT`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, PageParamsError> {
        let page_number = page.unwrap_or(DEFAULT_PAGE);
        let page_size = limit.unwrap_or(DEFAULT_LIMIT);
        if page_number == 0 {
            return Err(PageParamsError::PageOutOfRange);
        }
        if page_size == 0 || page_size > MAX_LIMIT {
            return Err(PageParamsError::LimitOutOfRange {
                limit: page_size,
                max: MAX_LIMIT,
            });
        }
        Ok(Self {
            page: page_number,
            limit: page_size,
        })
    }

    /// The 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The page size.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of items preceding this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

/// Number of pages needed to show `total` items at `limit` per page.
///
/// # Examples
/// ```
/// assert_eq!(pagination::total_pages(21, 10), 3);
/// assert_eq!(pagination::total_pages(0, 10), 0);
/// ```
#[must_use]
pub fn total_pages(total: u64, limit: u32) -> u64 {
    total.div_ceil(u64::from(limit.max(1)))
}

/// Paged response envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// Total number of matching items across all pages.
    pub total: u64,
    /// The requested page number.
    pub current_page: u32,
    /// Total number of pages at the requested page size.
    pub total_pages: u64,
}

impl<T> Paginated<T> {
    /// Wrap one page of items already selected by the caller.
    #[must_use]
    pub fn new(items: Vec<T>, total: u64, params: PageParams) -> Self {
        Self {
            items,
            total,
            current_page: params.page(),
            total_pages: total_pages(total, params.limit()),
        }
    }

    /// Select the requested page out of a fully materialised result set.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageParams, Paginated};
    ///
    /// let params = PageParams::new(Some(2), Some(2)).expect("valid params");
    /// let page = Paginated::from_all(vec![1, 2, 3, 4, 5], params);
    /// assert_eq!(page.items, vec![3, 4]);
    /// assert_eq!(page.total_pages, 3);
    /// ```
    #[must_use]
    pub fn from_all(all: Vec<T>, params: PageParams) -> Self {
        let total = u64::try_from(all.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(params.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(params.limit()).unwrap_or(usize::MAX);
        let items = all.into_iter().skip(skip).take(take).collect();
        Self::new(items, total, params)
    }

    /// Transform every item while keeping the paging metadata.
    #[must_use]
    pub fn map<U, F>(self, f: F) -> Paginated<U>
    where
        F: FnMut(T) -> U,
    {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            current_page: self.current_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page parameter validation and envelope maths.

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_apply_when_values_missing() {
        let params = PageParams::new(None, None).expect("defaults are valid");
        assert_eq!(params, PageParams::default());
        assert_eq!(params.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), Some(10), PageParamsError::PageOutOfRange)]
    #[case(Some(1), Some(0), PageParamsError::LimitOutOfRange { limit: 0, max: MAX_LIMIT })]
    #[case(Some(1), Some(101), PageParamsError::LimitOutOfRange { limit: 101, max: MAX_LIMIT })]
    fn rejects_out_of_range_values(
        #[case] page: Option<u32>,
        #[case] limit: Option<u32>,
        #[case] expected: PageParamsError,
    ) {
        assert_eq!(PageParams::new(page, limit), Err(expected));
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        assert_eq!(total_pages(total, limit), expected);
    }

    #[rstest]
    fn from_all_past_the_end_is_empty() {
        let params = PageParams::new(Some(4), Some(2)).expect("valid params");
        let page = Paginated::from_all(vec!['a', 'b', 'c'], params);
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.current_page, 4);
    }

    #[rstest]
    fn envelope_serialises_in_camel_case() {
        let page = Paginated::new(vec![1_u8], 1, PageParams::default());
        let value = serde_json::to_value(&page).expect("serialise envelope");
        assert_eq!(value["currentPage"], 1);
        assert_eq!(value["totalPages"], 1);
        assert_eq!(value["items"][0], 1);
    }
}
