use crate::error::ProviderError;
use crate::retry::{CancelToken, RetryPolicy, with_retry};
use crate::{DescribeRequest, ListRequest, PageEntry, ResourceProvider};
use cloudaudit_domain::ServiceKind;
use std::collections::{BTreeSet, VecDeque};

/// Everything a region worker needs to talk to the provider.
#[derive(Clone, Copy)]
pub struct EnumerationContext<'a> {
    pub provider: &'a dyn ResourceProvider,
    pub profile: &'a str,
    pub retry: &'a RetryPolicy,
    pub cancel: &'a CancelToken,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnumerationError {
    #[error("enumeration failed in {region}: {source}")]
    Provider {
        region: String,
        #[source]
        source: ProviderError,
    },

    #[error("pagination loop in {region}: continuation token '{token}' was returned twice")]
    PaginationLoop { region: String, token: String },

    #[error("enumeration cancelled in {region}")]
    Cancelled { region: String },
}

impl EnumerationError {
    fn from_provider(region: &str, err: ProviderError) -> Self {
        match err {
            ProviderError::Cancelled => EnumerationError::Cancelled {
                region: region.to_string(),
            },
            source => EnumerationError::Provider {
                region: region.to_string(),
                source,
            },
        }
    }

    pub fn region(&self) -> &str {
        match self {
            EnumerationError::Provider { region, .. }
            | EnumerationError::PaginationLoop { region, .. }
            | EnumerationError::Cancelled { region } => region,
        }
    }

    /// Authorization failures end the scan; everything else ends only the region.
    pub fn is_fatal(&self) -> bool {
        matches!(self, EnumerationError::Provider { source, .. } if source.is_fatal())
    }
}

/// Lazily walks every page of one service in one region.
///
/// Pages are fetched on demand. The iterator yields each distinct physical id once and stops
/// for good after the first error.
pub struct RegionEnumerator<'a> {
    ctx: EnumerationContext<'a>,
    service: ServiceKind,
    region: &'a str,
    buffer: VecDeque<PageEntry>,
    next_token: Option<String>,
    seen_tokens: BTreeSet<String>,
    seen_ids: BTreeSet<String>,
    pages: usize,
    exhausted: bool,
}

impl<'a> RegionEnumerator<'a> {
    pub fn new(ctx: EnumerationContext<'a>, service: ServiceKind, region: &'a str) -> Self {
        Self {
            ctx,
            service,
            region,
            buffer: VecDeque::new(),
            next_token: None,
            seen_tokens: BTreeSet::new(),
            seen_ids: BTreeSet::new(),
            pages: 0,
            exhausted: false,
        }
    }

    /// Pages fetched so far.
    pub fn pages(&self) -> usize {
        self.pages
    }

    fn fetch_page(&mut self) -> Result<(), EnumerationError> {
        let token = self.next_token.take();
        let request = ListRequest {
            service: self.service,
            region: self.region,
            profile: self.ctx.profile,
            token: token.as_deref(),
        };
        let provider = self.ctx.provider;
        let page = with_retry(self.ctx.retry, self.ctx.cancel, "list_page", || {
            provider.list_page(&request)
        })
        .map_err(|err| EnumerationError::from_provider(self.region, err))?;

        self.pages += 1;
        tracing::debug!(
            region = self.region,
            service = %self.service,
            page = self.pages,
            entries = page.entries.len(),
            more = page.next_token.is_some(),
            "fetched page"
        );

        if let Some(next) = &page.next_token {
            if !self.seen_tokens.insert(next.clone()) {
                return Err(EnumerationError::PaginationLoop {
                    region: self.region.to_string(),
                    token: next.clone(),
                });
            }
        }

        self.buffer.extend(page.entries);
        match page.next_token {
            Some(next) => self.next_token = Some(next),
            None => self.exhausted = true,
        }
        Ok(())
    }
}

impl Iterator for RegionEnumerator<'_> {
    type Item = Result<PageEntry, EnumerationError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(entry) = self.buffer.pop_front() {
                if self.seen_ids.insert(entry.physical_id().to_string()) {
                    return Some(Ok(entry));
                }
                tracing::debug!(
                    region = self.region,
                    physical_id = entry.physical_id(),
                    "skipping repeated resource"
                );
            }

            if self.exhausted {
                return None;
            }

            if let Err(err) = self.fetch_page() {
                self.exhausted = true;
                self.buffer.clear();
                return Some(Err(err));
            }
        }
    }
}

impl std::iter::FusedIterator for RegionEnumerator<'_> {}

/// Describe one resource by id in one region.
pub fn lookup_resource(
    ctx: EnumerationContext<'_>,
    service: ServiceKind,
    region: &str,
    physical_id: &str,
) -> Result<Option<PageEntry>, EnumerationError> {
    let request = DescribeRequest {
        service,
        region,
        profile: ctx.profile,
        physical_id,
    };
    with_retry(ctx.retry, ctx.cancel, "describe", || {
        ctx.provider.describe(&request)
    })
    .map_err(|err| EnumerationError::from_provider(region, err))
}
