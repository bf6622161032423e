//! Stable identifiers for services and rules.
//!
//! Service ids are the lowercase names accepted on the command line. Rule names are
//! PascalCase and only need to be unique within a service.

// Services
pub const SERVICE_DYNAMODB: &str = "dynamodb";
pub const SERVICE_S3: &str = "s3";
pub const SERVICE_EC2: &str = "ec2";
pub const SERVICE_RDS: &str = "rds";
pub const SERVICE_LAMBDA: &str = "lambda";

// Rules: shared names
pub const RULE_ENCRYPTION_AT_REST: &str = "EncryptionAtRest";

// Rules: dynamodb
pub const RULE_POINT_IN_TIME_RECOVERY: &str = "PointInTimeRecovery";

// Rules: s3
pub const RULE_PUBLIC_ACCESS_BLOCK: &str = "PublicAccessBlock";

// Rules: ec2
pub const RULE_EBS_ENCRYPTION: &str = "EbsEncryption";

// Rules: rds
pub const RULE_PUBLIC_ACCESS: &str = "PublicAccess";

// Rules: lambda
pub const RULE_SUPPORTED_RUNTIME: &str = "SupportedRuntime";

// Region selector meaning "every enabled region".
pub const REGION_ALL: &str = "all";
