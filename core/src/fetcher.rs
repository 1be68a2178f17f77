//! Bounded pagination over the Record Store.
//!
//! Pages are requested as `[offset, offset + page_size)` windows until an
//! empty page, a short page, or the fetch ceiling. A store error discards
//! everything fetched so far and aborts the collection.

use crate::{
    error::{AnalyticsError, AnalyticsResult},
    record_store::{Collection, PageWindow},
};

/// Every row of one collection, plus whether the ceiling cut it short.
#[derive(Debug, Clone, PartialEq)]
pub struct Paged<T> {
    pub rows: Vec<T>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PagedFetcher {
    page_size: usize,
    ceiling: usize,
}

impl PagedFetcher {
    pub fn new(page_size: usize, ceiling: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ceiling,
        }
    }

    /// Drain `fetch_page` until the collection is exhausted.
    ///
    /// Reaching the ceiling is a capacity condition, not silent truncation:
    /// it is logged and reported through `Paged::truncated`.
    pub fn fetch_all<T, F>(&self, collection: Collection, mut fetch_page: F) -> AnalyticsResult<Paged<T>>
    where
        F: FnMut(PageWindow) -> AnalyticsResult<Vec<T>>,
    {
        let mut rows: Vec<T> = Vec::new();
        let mut offset = 0usize;

        loop {
            let remaining = self.ceiling.saturating_sub(rows.len());
            if remaining == 0 {
                // Probe for one more row so a collection that is exactly
                // ceiling-sized is not reported as truncated.
                let probe = fetch_page(PageWindow { offset, limit: 1 })
                    .map_err(|e| AnalyticsError::fetch(collection, e))?;
                let truncated = !probe.is_empty();
                if truncated {
                    self.warn_truncated(collection);
                }
                return Ok(Paged { rows, truncated });
            }

            let window = PageWindow {
                offset,
                limit: self.page_size,
            };
            let mut page = fetch_page(window)
                .map_err(|e| AnalyticsError::fetch(collection, e))?;
            let page_len = page.len();
            log::debug!("{collection}: fetched {page_len} rows at offset {offset}");

            if page_len > remaining {
                page.truncate(remaining);
                rows.extend(page);
                self.warn_truncated(collection);
                return Ok(Paged { rows, truncated: true });
            }
            rows.extend(page);

            if page_len < self.page_size {
                // Short or empty page: the store has nothing further.
                return Ok(Paged { rows, truncated: false });
            }
            offset += page_len;
        }
    }

    fn warn_truncated(&self, collection: Collection) {
        log::warn!(
            "fetch of {collection} stopped at the {} row ceiling; results are truncated",
            self.ceiling
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(total: usize) -> impl FnMut(PageWindow) -> AnalyticsResult<Vec<usize>> {
        move |w: PageWindow| Ok((w.offset..(w.offset + w.limit).min(total)).collect())
    }

    #[test]
    fn stops_on_short_page() {
        let mut calls = 0;
        let mut inner = numbered(25);
        let paged = PagedFetcher::new(10, 1_000)
            .fetch_all(Collection::Quotes, |w| {
                calls += 1;
                inner(w)
            })
            .unwrap();
        assert_eq!(paged.rows, (0..25).collect::<Vec<_>>());
        assert!(!paged.truncated);
        assert_eq!(calls, 3);
    }

    #[test]
    fn exact_multiple_needs_one_empty_page() {
        let mut calls = 0;
        let mut inner = numbered(20);
        let paged = PagedFetcher::new(10, 1_000)
            .fetch_all(Collection::Sales, |w| {
                calls += 1;
                inner(w)
            })
            .unwrap();
        assert_eq!(paged.rows.len(), 20);
        assert_eq!(calls, 3, "third call returns the empty page");
    }

    #[test]
    fn ceiling_flags_truncation() {
        let paged = PagedFetcher::new(10, 30)
            .fetch_all(Collection::Households, numbered(95))
            .unwrap();
        assert_eq!(paged.rows.len(), 30);
        assert!(paged.truncated);
    }

    #[test]
    fn collection_exactly_at_ceiling_is_not_truncated() {
        let paged = PagedFetcher::new(10, 30)
            .fetch_all(Collection::Quotes, numbered(30))
            .unwrap();
        assert_eq!(paged.rows.len(), 30);
        assert!(!paged.truncated, "probe found no further rows");
    }

    #[test]
    fn short_page_past_the_ceiling_is_truncated() {
        let paged = PagedFetcher::new(10, 25)
            .fetch_all(Collection::Quotes, numbered(28))
            .unwrap();
        assert_eq!(paged.rows.len(), 25);
        assert!(paged.truncated);
    }

    #[test]
    fn collection_under_ceiling_ending_in_short_page() {
        let paged = PagedFetcher::new(10, 25)
            .fetch_all(Collection::Households, numbered(25))
            .unwrap();
        assert_eq!(paged.rows.len(), 25);
        assert!(!paged.truncated);
    }

    #[test]
    fn store_error_discards_partial_pages() {
        let result: AnalyticsResult<Paged<usize>> = PagedFetcher::new(10, 1_000)
            .fetch_all(Collection::SpendLedger, |w| {
                if w.offset == 0 {
                    Ok((0..10).collect())
                } else {
                    Err(AnalyticsError::Other(anyhow::anyhow!("permission denied")))
                }
            });
        match result {
            Err(AnalyticsError::Fetch { collection, .. }) => {
                assert_eq!(collection, Collection::SpendLedger)
            }
            other => panic!("expected fetch error, got {other:?}"),
        }
    }
}
