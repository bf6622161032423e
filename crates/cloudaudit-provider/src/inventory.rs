//! Offline provider backed by a JSON inventory document.
//!
//! The document describes one account snapshot:
//!
//! ```json
//! {
//!   "profiles": ["default"],
//!   "regions": { "public": ["us-east-1", "eu-west-1"] },
//!   "page_size": 2,
//!   "resources": {
//!     "us-east-1": { "dynamodb": [{ "TableName": "orders", "SSEDescription": { "Status": "ENABLED" } }] }
//!   },
//!   "faults": { "eu-west-1": { "kind": "throttled", "times": 1 } }
//! }
//! ```
//!
//! `profiles` is optional; when present, any other profile is rejected as unauthorized.
//! A domain without a `regions` entry falls back to the built-in catalogue for that domain.
//! A resource entry carrying an `_error` string is served as unreadable.

use crate::error::ProviderError;
use crate::{DescribeRequest, ListRequest, Page, PageEntry, ResourceProvider, UnreadableResource};
use anyhow::Context;
use camino::Utf8Path;
use cloudaudit_domain::{Domain, ResourceDescriptor, ServiceKind};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Mutex;

const DEFAULT_PAGE_SIZE: usize = 50;
const ERROR_KEY: &str = "_error";

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct InventoryFile {
    #[serde(default)]
    profiles: Option<Vec<String>>,
    #[serde(default)]
    regions: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    page_size: Option<usize>,
    #[serde(default)]
    resources: BTreeMap<String, BTreeMap<String, Vec<Value>>>,
    #[serde(default)]
    faults: BTreeMap<String, FaultSpec>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum FaultKind {
    Throttled,
    Timeout,
    Unauthorized,
    Unavailable,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FaultSpec {
    kind: FaultKind,
    /// How many calls fail before the region recovers. Absent means every call.
    #[serde(default)]
    times: Option<u32>,
}

impl FaultKind {
    fn to_error(self, region: &str) -> ProviderError {
        match self {
            FaultKind::Throttled => ProviderError::Throttled(format!("rate exceeded in {region}")),
            FaultKind::Timeout => ProviderError::Timeout(format!("no response from {region}")),
            FaultKind::Unauthorized => {
                ProviderError::Unauthorized(format!("credentials rejected in {region}"))
            }
            FaultKind::Unavailable => {
                ProviderError::Unavailable(format!("endpoint unavailable in {region}"))
            }
        }
    }
}

/// Serves an inventory document through [`ResourceProvider`].
#[derive(Debug)]
pub struct InventoryProvider {
    profiles: Option<Vec<String>>,
    regions: BTreeMap<Domain, Vec<String>>,
    page_size: usize,
    entries: BTreeMap<(String, ServiceKind), Vec<PageEntry>>,
    faults: BTreeMap<String, FaultSpec>,
    fault_calls: Mutex<BTreeMap<String, u32>>,
}

impl InventoryProvider {
    pub fn from_path(path: &Utf8Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
        Self::from_json_str(&text).with_context(|| format!("load inventory {path}"))
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let file: InventoryFile = serde_json::from_str(text).context("parse inventory JSON")?;
        Self::from_file(file)
    }

    fn from_file(file: InventoryFile) -> anyhow::Result<Self> {
        let page_size = file.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }

        let mut regions = BTreeMap::new();
        for (key, list) in file.regions {
            let domain: Domain = key.parse().context("regions")?;
            regions.insert(domain, list);
        }

        let mut entries = BTreeMap::new();
        for (region, services) in file.resources {
            for (service_key, raws) in services {
                let service: ServiceKind = service_key
                    .parse()
                    .with_context(|| format!("resources.{region}"))?;
                let list = raws
                    .into_iter()
                    .enumerate()
                    .map(|(idx, raw)| to_entry(service, &region, idx + 1, raw))
                    .collect();
                entries.insert((region.clone(), service), list);
            }
        }

        Ok(Self {
            profiles: file.profiles,
            regions,
            page_size,
            entries,
            faults: file.faults,
            fault_calls: Mutex::new(BTreeMap::new()),
        })
    }

    fn check_profile(&self, profile: &str) -> Result<(), ProviderError> {
        match &self.profiles {
            Some(known) if !known.iter().any(|p| p == profile) => Err(
                ProviderError::Unauthorized(format!("no credentials for profile '{profile}'")),
            ),
            _ => Ok(()),
        }
    }

    /// Apply the region's injected fault, if it still has failures left.
    fn check_fault(&self, region: &str) -> Result<(), ProviderError> {
        let Some(fault) = self.faults.get(region) else {
            return Ok(());
        };
        let mut calls = self
            .fault_calls
            .lock()
            .map_err(|_| ProviderError::Unavailable("inventory state poisoned".to_string()))?;
        let seen = calls.entry(region.to_string()).or_insert(0);
        *seen += 1;
        match fault.times {
            Some(times) if *seen > times => Ok(()),
            _ => Err(fault.kind.to_error(region)),
        }
    }

    fn entries(&self, region: &str, service: ServiceKind) -> &[PageEntry] {
        self.entries
            .get(&(region.to_string(), service))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl ResourceProvider for InventoryProvider {
    fn enabled_regions(&self, domain: Domain, profile: &str) -> Result<Vec<String>, ProviderError> {
        self.check_profile(profile)?;
        Ok(match self.regions.get(&domain) {
            Some(list) => list.clone(),
            None => domain.regions().iter().map(|r| r.to_string()).collect(),
        })
    }

    fn list_page(&self, request: &ListRequest<'_>) -> Result<Page, ProviderError> {
        self.check_profile(request.profile)?;
        self.check_fault(request.region)?;

        let all = self.entries(request.region, request.service);
        let start = match request.token {
            None => 0,
            Some(token) => token
                .parse::<usize>()
                .ok()
                .filter(|offset| *offset <= all.len())
                .ok_or_else(|| ProviderError::InvalidToken(token.to_string()))?,
        };
        let end = (start + self.page_size).min(all.len());

        Ok(Page {
            entries: all[start..end].to_vec(),
            next_token: (end < all.len()).then(|| end.to_string()),
        })
    }

    fn describe(&self, request: &DescribeRequest<'_>) -> Result<Option<PageEntry>, ProviderError> {
        self.check_profile(request.profile)?;
        self.check_fault(request.region)?;

        Ok(self
            .entries(request.region, request.service)
            .iter()
            .find(|e| e.physical_id() == request.physical_id)
            .cloned())
    }
}

fn to_entry(service: ServiceKind, region: &str, ordinal: usize, raw: Value) -> PageEntry {
    let physical_id = physical_id_of(service, &raw)
        .unwrap_or_else(|| format!("{service}/{region}#{ordinal}"));

    if let Some(message) = raw.get(ERROR_KEY).and_then(Value::as_str) {
        return PageEntry::Unreadable(UnreadableResource {
            physical_id,
            region: region.to_string(),
            message: message.to_string(),
        });
    }

    PageEntry::Resource(ResourceDescriptor {
        friendly_name: name_tag(&raw),
        physical_id,
        region: region.to_string(),
        raw,
    })
}

fn physical_id_of(service: ServiceKind, raw: &Value) -> Option<String> {
    std::iter::once(service.id_attribute())
        .chain(service.arn_attribute())
        .filter_map(|key| raw.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Value of the `Name` tag in the provider's `[{Key, Value}]` shape.
fn name_tag(raw: &Value) -> Option<String> {
    raw.get("Tags")?
        .as_array()?
        .iter()
        .find(|tag| tag.get("Key").and_then(Value::as_str) == Some("Name"))
        .and_then(|tag| tag.get("Value"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use serde_json::json;

    fn provider(doc: Value) -> InventoryProvider {
        InventoryProvider::from_json_str(&doc.to_string()).expect("valid inventory")
    }

    fn list<'a>(region: &'a str, token: Option<&'a str>) -> ListRequest<'a> {
        ListRequest {
            service: ServiceKind::DynamoDb,
            region,
            profile: "default",
            token,
        }
    }

    #[test]
    fn pages_by_offset_token() {
        let p = provider(json!({
            "page_size": 2,
            "resources": { "us-east-1": { "dynamodb": [
                { "TableName": "a" }, { "TableName": "b" }, { "TableName": "c" }
            ]}}
        }));

        let first = p.list_page(&list("us-east-1", None)).unwrap();
        assert_eq!(first.entries.len(), 2);
        assert_eq!(first.next_token.as_deref(), Some("2"));

        let second = p.list_page(&list("us-east-1", Some("2"))).unwrap();
        assert_eq!(second.entries.len(), 1);
        assert_eq!(second.entries[0].physical_id(), "c");
        assert!(second.next_token.is_none());

        assert!(matches!(
            p.list_page(&list("us-east-1", Some("bogus"))),
            Err(ProviderError::InvalidToken(_))
        ));
    }

    #[test]
    fn ids_fall_back_to_arn_then_ordinal() {
        let p = provider(json!({
            "resources": { "us-east-1": { "dynamodb": [
                { "TableArn": "arn:aws:dynamodb:us-east-1:1:table/x" },
                { "TableName": "  " },
                { "TableName": "named", "Tags": [{ "Key": "Name", "Value": "Orders" }] }
            ]}}
        }));

        let page = p.list_page(&list("us-east-1", None)).unwrap();
        let ids: Vec<_> = page.entries.iter().map(PageEntry::physical_id).collect();
        assert_eq!(
            ids,
            vec![
                "arn:aws:dynamodb:us-east-1:1:table/x",
                "dynamodb/us-east-1#2",
                "named"
            ]
        );
        match &page.entries[2] {
            PageEntry::Resource(r) => assert_eq!(r.friendly_name.as_deref(), Some("Orders")),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[test]
    fn error_marker_yields_unreadable_entry() {
        let p = provider(json!({
            "resources": { "us-east-1": { "dynamodb": [
                { "TableName": "locked", "_error": "AccessDenied on DescribeTable" }
            ]}}
        }));

        let page = p.list_page(&list("us-east-1", None)).unwrap();
        assert_eq!(
            page.entries,
            vec![PageEntry::Unreadable(UnreadableResource {
                physical_id: "locked".to_string(),
                region: "us-east-1".to_string(),
                message: "AccessDenied on DescribeTable".to_string(),
            })]
        );
    }

    #[test]
    fn faults_recover_after_configured_times() {
        let p = provider(json!({
            "faults": { "us-east-1": { "kind": "throttled", "times": 2 } }
        }));

        assert!(matches!(
            p.list_page(&list("us-east-1", None)),
            Err(ProviderError::Throttled(_))
        ));
        assert!(p.list_page(&list("us-east-1", None)).is_err());
        assert!(p.list_page(&list("us-east-1", None)).is_ok());
    }

    #[test]
    fn unknown_profile_is_unauthorized() {
        let p = provider(json!({ "profiles": ["prod"] }));
        assert!(matches!(
            p.enabled_regions(Domain::Public, "default"),
            Err(ProviderError::Unauthorized(_))
        ));
        assert!(p.enabled_regions(Domain::Public, "prod").is_ok());
    }

    #[test]
    fn regions_default_to_domain_catalogue() {
        let p = provider(json!({ "regions": { "public": ["eu-west-1", "us-east-1"] } }));
        assert_eq!(
            p.enabled_regions(Domain::Public, "default").unwrap(),
            vec!["eu-west-1", "us-east-1"]
        );
        assert_eq!(
            p.enabled_regions(Domain::Government, "default").unwrap(),
            vec!["us-gov-west-1", "us-gov-east-1"]
        );
    }

    #[test]
    fn describe_finds_by_physical_id() {
        let p = provider(json!({
            "resources": { "us-east-1": { "dynamodb": [
                { "TableName": "orders" },
                { "TableName": "locked", "_error": "AccessDenied on DescribeTable" }
            ] } }
        }));
        let req = |id| DescribeRequest {
            service: ServiceKind::DynamoDb,
            region: "us-east-1",
            profile: "default",
            physical_id: id,
        };
        assert!(matches!(
            p.describe(&req("orders")).unwrap(),
            Some(PageEntry::Resource(ref r)) if r.physical_id == "orders"
        ));
        assert!(matches!(
            p.describe(&req("locked")).unwrap(),
            Some(PageEntry::Unreadable(ref u)) if u.message.contains("AccessDenied")
        ));
        assert!(p.describe(&req("missing")).unwrap().is_none());
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(InventoryProvider::from_json_str(r#"{"page_size": 0}"#).is_err());
        assert!(InventoryProvider::from_json_str(r#"{"surprise": 1}"#).is_err());
        let err = InventoryProvider::from_json_str(
            r#"{"resources": {"us-east-1": {"dynamo": []}}}"#,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("dynamodb"));
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("inventory.json")).unwrap();
        std::fs::write(&path, r#"{"profiles": ["default"]}"#).unwrap();
        assert!(InventoryProvider::from_path(&path).is_ok());

        let missing = path.with_file_name("absent.json");
        let err = InventoryProvider::from_path(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
