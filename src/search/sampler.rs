use crate::search::permutation::{derive_key, Permutation};
use crate::search::query::SearchQuery;
use crate::{Error, Result};
use async_trait::async_trait;
use rand::Rng;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Largest seed handed out, so it survives a round-trip through JSON numbers
pub const MAX_SEED: u64 = (1 << 53) - 1;

const PAGE_ORDER_TAG: u64 = 0x7061_6765;
const ITEM_ORDER_TAG: u64 = 0x6974_656d;

/// One page as served by the upstream, in its native order
#[derive(Debug, Clone)]
pub struct UpstreamPage<T> {
    pub total_count: u64,
    pub items: Vec<T>,
}

/// A paged search backend
#[async_trait]
pub trait UpstreamSearch: Send + Sync {
    type Item: Clone + Send;

    /// Fetch upstream page `page` (1-indexed) with `per_page` items
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
        per_page: u32,
    ) -> Result<UpstreamPage<Self::Item>>;
}

/// Draw a fresh session seed
pub fn generate_seed() -> u64 {
    rand::rng().random_range(0..=MAX_SEED)
}

/// One output page of a sampled search
#[derive(Debug, Clone)]
pub struct SampledPage<T> {
    pub items: Vec<T>,
    pub seed: u64,
    pub page: u32,
    pub has_more: bool,
    /// Match count as reported upstream, before the result cap
    pub total_count: u64,
}

/// Maps stream positions to upstream `(page index, offset)` pairs.
///
/// Full upstream pages are visited in a seeded order and the partial tail
/// page always comes last, so every block but the last is exactly one
/// upstream page long.
#[derive(Debug, Clone)]
struct StreamLayout {
    seed: u64,
    len: u64,
    page_size: u64,
    full_pages: u64,
    page_order: Permutation,
}

impl StreamLayout {
    fn new(seed: u64, len: u64, page_size: u64) -> Self {
        let full_pages = len / page_size;
        Self {
            seed,
            len,
            page_size,
            full_pages,
            page_order: Permutation::new(derive_key(seed, &[PAGE_ORDER_TAG, len]), full_pages),
        }
    }

    fn locate(&self, position: u64) -> (u64, u64) {
        let block = position / self.page_size;
        let within = position % self.page_size;

        let (upstream_index, block_len) = if block < self.full_pages {
            (self.page_order.apply(block), self.page_size)
        } else {
            (self.full_pages, self.len - self.full_pages * self.page_size)
        };

        let items = Permutation::new(
            derive_key(self.seed, &[ITEM_ORDER_TAG, self.len, upstream_index]),
            block_len,
        );
        (upstream_index, items.apply(within))
    }
}

/// Stateless seeded sampler over a paged upstream
#[derive(Debug, Clone, Copy)]
pub struct SamplingPaginator {
    result_cap: u64,
    upstream_page_size: u32,
}

impl SamplingPaginator {
    pub fn new(result_cap: u64, upstream_page_size: u32) -> Self {
        Self {
            result_cap,
            upstream_page_size: upstream_page_size.max(1),
        }
    }

    /// Produce output page `page` (1-indexed) of `page_size` items.
    ///
    /// Upstream page 1 is fetched first to learn the total count;
    /// fetched pages are reused within this call only.
    pub async fn sample_page<U>(
        &self,
        upstream: &U,
        query: &SearchQuery,
        seed: u64,
        page: u32,
        page_size: u32,
    ) -> Result<SampledPage<U::Item>>
    where
        U: UpstreamSearch,
    {
        self.sample_page_with_total(upstream, query, seed, page, page_size, None)
            .await
    }

    /// Like [`sample_page`](Self::sample_page), but lays the stream out from
    /// `known_total`, the `total_count` an earlier page of the same search
    /// reported, so upstream page 1 is only fetched when the page needs it.
    ///
    /// The first fetched upstream page checks the hint. On a mismatch the page
    /// is laid out again from the total upstream reported.
    pub async fn sample_page_with_total<U>(
        &self,
        upstream: &U,
        query: &SearchQuery,
        seed: u64,
        page: u32,
        page_size: u32,
        known_total: Option<u64>,
    ) -> Result<SampledPage<U::Item>>
    where
        U: UpstreamSearch,
    {
        if page == 0 {
            return Err(Error::Validation("page must be at least 1".to_string()));
        }
        if page_size == 0 {
            return Err(Error::Validation("page size must be at least 1".to_string()));
        }

        let per_page = self.upstream_page_size;
        let page_size = u64::from(page_size);
        let start = u64::from(page - 1).saturating_mul(page_size);
        let end = u64::from(page).saturating_mul(page_size);

        let mut fetched: BTreeMap<u64, Vec<U::Item>> = BTreeMap::new();
        let mut total_hint = known_total;
        let mut verified = known_total.is_none();

        let (total_count, len) = loop {
            let total_count = match total_hint {
                Some(total) => total,
                None => {
                    let probe = upstream.fetch_page(query, 1, per_page).await?;
                    fetched.insert(0, probe.items);
                    verified = true;
                    probe.total_count
                }
            };
            let len = total_count.min(self.result_cap);

            let needed: BTreeSet<u64> = if start < len {
                let layout = StreamLayout::new(seed, len, u64::from(per_page));
                (start..end.min(len)).map(|p| layout.locate(p).0).collect()
            } else {
                BTreeSet::new()
            };

            if !verified && needed.is_empty() {
                // Nothing to fetch would confirm the hint
                total_hint = None;
                continue;
            }

            let mut reported = None;
            for index in needed {
                if fetched.contains_key(&index) {
                    continue;
                }
                let upstream_page = self.fetch_upstream(upstream, query, index).await?;
                let page_total = upstream_page.total_count;
                fetched.insert(index, upstream_page.items);

                if !verified {
                    verified = true;
                    if page_total != total_count {
                        reported = Some(page_total);
                        break;
                    }
                }
            }

            match reported {
                Some(actual) => {
                    debug!(
                        "Stale total count {} for seed {}, upstream reports {}",
                        total_count, seed, actual
                    );
                    total_hint = Some(actual);
                }
                None => break (total_count, len),
            }
        };

        let has_more = end < len;

        debug!(
            "Sampling page {} (seed {}): positions {}..{} of {} (upstream total {})",
            page,
            seed,
            start,
            end.min(len),
            len,
            total_count
        );

        let mut items = Vec::new();
        if start < len {
            let layout = StreamLayout::new(seed, len, u64::from(per_page));

            for position in start..end.min(len) {
                let (upstream_index, offset) = layout.locate(position);
                let page_items = fetched.get(&upstream_index).ok_or_else(|| {
                    Error::Internal(format!("Upstream page {} was not fetched", upstream_index + 1))
                })?;

                match usize::try_from(offset).ok().and_then(|o| page_items.get(o)) {
                    Some(item) => items.push(item.clone()),
                    None => warn!(
                        "Upstream page {} is short ({} items), skipping offset {}",
                        upstream_index + 1,
                        page_items.len(),
                        offset
                    ),
                }
            }
        }

        Ok(SampledPage {
            items,
            seed,
            page,
            has_more,
            total_count,
        })
    }

    async fn fetch_upstream<U>(
        &self,
        upstream: &U,
        query: &SearchQuery,
        index: u64,
    ) -> Result<UpstreamPage<U::Item>>
    where
        U: UpstreamSearch,
    {
        let page = u32::try_from(index + 1)
            .map_err(|_| Error::Internal(format!("Upstream page {index} out of range")))?;
        upstream.fetch_page(query, page, self.upstream_page_size).await
    }
}
