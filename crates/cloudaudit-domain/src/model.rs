use cloudaudit_types::ids;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Errors raised while turning user-supplied strings into scope values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unknown service: {given}{}", hint_suffix(.hint))]
    UnknownService { given: String, hint: Option<String> },

    #[error("unknown domain: {0} (expected 'public' or 'government')")]
    UnknownDomain(String),

    #[error("region must not be empty")]
    EmptyRegion,
}

fn hint_suffix(hint: &Option<String>) -> String {
    match hint {
        Some(h) => format!(" (did you mean '{h}'?)"),
        None => String::new(),
    }
}

/// Account partition the scan runs against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Domain {
    #[default]
    Public,
    Government,
}

impl Domain {
    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Public => "public",
            Domain::Government => "government",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Domain::Public),
            "government" => Ok(Domain::Government),
            other => Err(ParseError::UnknownDomain(other.to_string())),
        }
    }
}

/// Either one named region or every region enabled for the account.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum RegionSelector {
    All,
    Named(String),
}

impl fmt::Display for RegionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionSelector::All => f.write_str(ids::REGION_ALL),
            RegionSelector::Named(name) => f.write_str(name),
        }
    }
}

impl FromStr for RegionSelector {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::EmptyRegion);
        }
        if s.eq_ignore_ascii_case(ids::REGION_ALL) {
            return Ok(RegionSelector::All);
        }
        Ok(RegionSelector::Named(s.to_string()))
    }
}

/// What to scan. Built once by the caller and only ever borrowed afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanScope {
    region: RegionSelector,
    profile: String,
    domain: Domain,
    resource_id: Option<String>,
}

impl ScanScope {
    pub fn new(region: RegionSelector, profile: impl Into<String>, domain: Domain) -> Self {
        Self {
            region,
            profile: profile.into(),
            domain,
            resource_id: None,
        }
    }

    /// Restrict the scan to a single resource looked up directly by id.
    pub fn with_resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn region(&self) -> &RegionSelector {
        &self.region
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.resource_id.as_deref()
    }
}

/// Identity of an observed resource, independent of its provider attributes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub physical_id: String,
    pub friendly_name: Option<String>,
    pub region: String,
}

/// A resource as returned by the provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceDescriptor {
    pub physical_id: String,
    pub friendly_name: Option<String>,
    pub region: String,
    /// Provider-specific attributes, shaped like the provider's describe output.
    pub raw: Value,
}

impl ResourceDescriptor {
    pub fn identity(&self) -> ResourceIdentity {
        ResourceIdentity {
            physical_id: self.physical_id.clone(),
            friendly_name: self.friendly_name.clone(),
            region: self.region.clone(),
        }
    }
}
