//! Region catalogue per account domain.
//!
//! The catalogue is the set of names a scope may mention. Which of them are enabled for a
//! given account is the provider's answer, not ours.

use crate::model::Domain;

pub const PUBLIC_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "eu-central-1",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "eu-north-1",
    "eu-south-1",
    "ap-south-1",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-east-1",
    "sa-east-1",
    "me-south-1",
    "af-south-1",
];

pub const GOVERNMENT_REGIONS: &[&str] = &["us-gov-west-1", "us-gov-east-1"];

impl Domain {
    pub fn regions(self) -> &'static [&'static str] {
        match self {
            Domain::Public => PUBLIC_REGIONS,
            Domain::Government => GOVERNMENT_REGIONS,
        }
    }

    pub fn contains_region(self, region: &str) -> bool {
        self.regions().contains(&region)
    }
}
