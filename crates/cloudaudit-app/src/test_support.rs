use cloudaudit_domain::{Clock, Domain, ResourceDescriptor};
use cloudaudit_provider::{
    DescribeRequest, ListRequest, Page, PageEntry, ProviderError, ResourceProvider,
    UnreadableResource,
};
use serde_json::{Value, json};
use std::cell::Cell;
use std::collections::BTreeMap;
use std::sync::Mutex;
use time::{Duration, OffsetDateTime, macros::datetime};

pub fn table(name: &str, sse_status: &str) -> Value {
    json!({
        "TableName": name,
        "SSEDescription": { "Status": sse_status },
        "ContinuousBackupsDescription": {
            "PointInTimeRecoveryDescription": { "PointInTimeRecoveryStatus": "ENABLED" }
        }
    })
}

struct Fault {
    error: ProviderError,
    remaining: Option<u32>,
}

/// In-memory provider with per-region faults and call recording.
pub struct ScriptedProvider {
    regions: Vec<String>,
    page_size: usize,
    entries: BTreeMap<String, Vec<PageEntry>>,
    faults: Mutex<BTreeMap<String, Fault>>,
    list_calls: Mutex<Vec<String>>,
    describe_calls: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(regions: &[&str]) -> Self {
        Self {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            page_size: 100,
            entries: BTreeMap::new(),
            faults: Mutex::new(BTreeMap::new()),
            list_calls: Mutex::new(Vec::new()),
            describe_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_resources(mut self, region: &str, raws: Vec<Value>) -> Self {
        let list = self.entries.entry(region.to_string()).or_default();
        for raw in raws {
            let id = raw["TableName"].as_str().unwrap_or_default().to_string();
            list.push(PageEntry::Resource(ResourceDescriptor {
                physical_id: id,
                friendly_name: None,
                region: region.to_string(),
                raw,
            }));
        }
        self
    }

    pub fn with_unreadable(mut self, region: &str, id: &str, message: &str) -> Self {
        self.entries
            .entry(region.to_string())
            .or_default()
            .push(PageEntry::Unreadable(UnreadableResource {
                physical_id: id.to_string(),
                region: region.to_string(),
                message: message.to_string(),
            }));
        self
    }

    /// Fail the next `times` list/describe calls in `region` (every call when `None`).
    pub fn with_fault(self, region: &str, error: ProviderError, times: Option<u32>) -> Self {
        self.faults.lock().unwrap().insert(
            region.to_string(),
            Fault {
                error,
                remaining: times,
            },
        );
        self
    }

    pub fn list_calls(&self, region: &str) -> usize {
        self.list_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|r| *r == region)
            .count()
    }

    pub fn describe_calls(&self) -> Vec<String> {
        self.describe_calls.lock().unwrap().clone()
    }

    fn fault(&self, region: &str) -> Result<(), ProviderError> {
        let mut faults = self.faults.lock().unwrap();
        let Some(fault) = faults.get_mut(region) else {
            return Ok(());
        };
        match &mut fault.remaining {
            Some(0) => Ok(()),
            Some(n) => {
                *n -= 1;
                Err(fault.error.clone())
            }
            None => Err(fault.error.clone()),
        }
    }
}

impl ResourceProvider for ScriptedProvider {
    fn enabled_regions(&self, _: Domain, _: &str) -> Result<Vec<String>, ProviderError> {
        Ok(self.regions.clone())
    }

    fn list_page(&self, request: &ListRequest<'_>) -> Result<Page, ProviderError> {
        self.list_calls
            .lock()
            .unwrap()
            .push(request.region.to_string());
        self.fault(request.region)?;

        let all = self
            .entries
            .get(request.region)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        let start: usize = request.token.map_or(0, |t| t.parse().unwrap());
        let end = (start + self.page_size).min(all.len());
        Ok(Page {
            entries: all[start..end].to_vec(),
            next_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    fn describe(&self, request: &DescribeRequest<'_>) -> Result<Option<PageEntry>, ProviderError> {
        self.describe_calls
            .lock()
            .unwrap()
            .push(request.region.to_string());
        self.fault(request.region)?;

        Ok(self.entries.get(request.region).and_then(|list| {
            list.iter()
                .find(|e| e.physical_id() == request.physical_id)
                .cloned()
        }))
    }
}

/// Clock that jumps forward and back, to exercise timestamp clamping.
pub struct SteppingClock {
    calls: Cell<i64>,
}

impl SteppingClock {
    pub fn new() -> Self {
        Self { calls: Cell::new(0) }
    }
}

impl Clock for SteppingClock {
    fn now_utc(&self) -> OffsetDateTime {
        let n = self.calls.get();
        self.calls.set(n + 1);
        let offset = if n % 2 == 0 { n * 5 } else { n * 5 - 8 };
        datetime!(2024-03-01 12:00:00 UTC) + Duration::seconds(offset)
    }
}
