use crate::model::ParseError;
use cloudaudit_types::ids;
use std::fmt;
use std::str::FromStr;

/// Services the scanner knows how to enumerate.
///
/// Each service has exactly one entry; aliases are not accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ServiceKind {
    DynamoDb,
    S3,
    Ec2,
    Rds,
    Lambda,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 5] = [
        ServiceKind::DynamoDb,
        ServiceKind::S3,
        ServiceKind::Ec2,
        ServiceKind::Rds,
        ServiceKind::Lambda,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceKind::DynamoDb => ids::SERVICE_DYNAMODB,
            ServiceKind::S3 => ids::SERVICE_S3,
            ServiceKind::Ec2 => ids::SERVICE_EC2,
            ServiceKind::Rds => ids::SERVICE_RDS,
            ServiceKind::Lambda => ids::SERVICE_LAMBDA,
        }
    }

    /// Attribute of the describe output that carries the resource's physical id.
    pub fn id_attribute(self) -> &'static str {
        match self {
            ServiceKind::DynamoDb => "TableName",
            ServiceKind::S3 => "Name",
            ServiceKind::Ec2 => "VolumeId",
            ServiceKind::Rds => "DBInstanceIdentifier",
            ServiceKind::Lambda => "FunctionName",
        }
    }

    /// Attribute holding the resource ARN, used when the id attribute is missing.
    pub fn arn_attribute(self) -> Option<&'static str> {
        match self {
            ServiceKind::DynamoDb => Some("TableArn"),
            ServiceKind::S3 => None,
            ServiceKind::Ec2 => None,
            ServiceKind::Rds => Some("DBInstanceArn"),
            ServiceKind::Lambda => Some("FunctionArn"),
        }
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some(kind) = ServiceKind::ALL.into_iter().find(|k| k.as_str() == lowered) {
            return Ok(kind);
        }

        let hint = ServiceKind::ALL
            .into_iter()
            .find(|k| !lowered.is_empty() && k.as_str().starts_with(&lowered))
            .map(|k| k.as_str().to_string());
        Err(ParseError::UnknownService {
            given: s.to_string(),
            hint,
        })
    }
}
