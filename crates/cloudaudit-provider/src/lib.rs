//! Provider adapters: the seam behind which cloud SDK clients live, plus paginated
//! enumeration and retry on top of it.
//!
//! This crate is allowed to do I/O. Rule evaluation and record building stay in
//! `cloudaudit-domain`.

#![forbid(unsafe_code)]

mod enumerate;
mod error;
pub mod inventory;
mod retry;

use cloudaudit_domain::{Domain, ResourceDescriptor, ServiceKind};

pub use enumerate::{EnumerationContext, EnumerationError, RegionEnumerator, lookup_resource};
pub use error::ProviderError;
pub use inventory::InventoryProvider;
pub use retry::{CancelToken, RetryPolicy, with_retry};

/// One `List*` call for a service in a region.
#[derive(Clone, Copy, Debug)]
pub struct ListRequest<'a> {
    pub service: ServiceKind,
    pub region: &'a str,
    pub profile: &'a str,
    /// Continuation token from the previous page, `None` for the first page.
    pub token: Option<&'a str>,
}

/// One `Describe*` call for a single resource.
#[derive(Clone, Copy, Debug)]
pub struct DescribeRequest<'a> {
    pub service: ServiceKind,
    pub region: &'a str,
    pub profile: &'a str,
    pub physical_id: &'a str,
}

/// A listed entry whose attributes could not be read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnreadableResource {
    pub physical_id: String,
    pub region: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageEntry {
    Resource(ResourceDescriptor),
    Unreadable(UnreadableResource),
}

impl PageEntry {
    pub fn physical_id(&self) -> &str {
        match self {
            PageEntry::Resource(r) => &r.physical_id,
            PageEntry::Unreadable(u) => &u.physical_id,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub entries: Vec<PageEntry>,
    pub next_token: Option<String>,
}

/// Read-only access to a cloud account.
///
/// Implementations must be shareable across the region worker pool.
pub trait ResourceProvider: Send + Sync {
    /// Regions enabled for the account, in the account's order.
    fn enabled_regions(&self, domain: Domain, profile: &str) -> Result<Vec<String>, ProviderError>;

    fn list_page(&self, request: &ListRequest<'_>) -> Result<Page, ProviderError>;

    /// `Ok(None)` when the id does not exist in the region. A resource that exists but
    /// cannot be read comes back as `PageEntry::Unreadable`.
    fn describe(&self, request: &DescribeRequest<'_>) -> Result<Option<PageEntry>, ProviderError>;
}
