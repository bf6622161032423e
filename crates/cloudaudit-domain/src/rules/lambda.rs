use super::utils::str_attr;
use super::{RuleDefinition, RuleOutcome};
use crate::model::ResourceDescriptor;
use crate::services::ServiceKind;
use cloudaudit_types::ids;

pub const SUPPORTED_RUNTIME: RuleDefinition = RuleDefinition {
    name: ids::RULE_SUPPORTED_RUNTIME,
    service: ServiceKind::Lambda,
    title: "Lambda functions run on a supported runtime",
    description: "\
Flags functions whose managed runtime has reached end of support. Deprecated runtimes stop
receiving security patches and eventually block function updates.",
    remediation: "\
Move the function to a supported runtime version and redeploy:
  aws lambda update-function-configuration --function-name <fn> --runtime <runtime>",
    evaluate: supported_runtime,
};

const DEPRECATED_RUNTIMES: &[&str] = &[
    "python2.7",
    "python3.6",
    "python3.7",
    "python3.8",
    "nodejs",
    "nodejs4.3",
    "nodejs6.10",
    "nodejs8.10",
    "nodejs10.x",
    "nodejs12.x",
    "nodejs14.x",
    "nodejs16.x",
    "java8",
    "dotnetcore1.0",
    "dotnetcore2.0",
    "dotnetcore2.1",
    "dotnetcore3.1",
    "dotnet6",
    "ruby2.5",
    "ruby2.7",
    "go1.x",
    "provided",
];

fn supported_runtime(resource: &ResourceDescriptor) -> RuleOutcome {
    match str_attr(&resource.raw, &["Runtime"]) {
        Some(runtime) if DEPRECATED_RUNTIMES.contains(&runtime) => {
            RuleOutcome::warning(format!("runtime {runtime} is deprecated"))
        }
        Some(_) => RuleOutcome::ok(),
        None if str_attr(&resource.raw, &["PackageType"]) == Some("Image") => {
            RuleOutcome::ok_with("container image function; no managed runtime")
        }
        None => RuleOutcome::warning("function runtime was not reported"),
    }
}
