//! Audit record construction.

use crate::model::{ResourceIdentity, ScanScope};
use crate::rules::{RuleDefinition, RuleOutcome};
use cloudaudit_types::{AuditRecord, Provider};
use time::OffsetDateTime;

/// Source of capture timestamps.
pub trait Clock {
    fn now_utc(&self) -> OffsetDateTime;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Builds one record per (resource, rule) pair.
///
/// The clock is read on every call. A reading earlier than the previous record's time is
/// clamped to it, so times never decrease across records from one builder.
#[derive(Debug, Default)]
pub struct AuditRecordBuilder<C = SystemClock> {
    clock: C,
    last: Option<OffsetDateTime>,
}

impl AuditRecordBuilder<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> AuditRecordBuilder<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, last: None }
    }

    pub fn build(
        &mut self,
        scope: &ScanScope,
        resource: &ResourceIdentity,
        rule: &RuleDefinition,
        outcome: RuleOutcome,
    ) -> AuditRecord {
        debug_assert!(!resource.physical_id.is_empty(), "physical id must be set");
        debug_assert!(!resource.region.is_empty(), "region must be set");

        let now = self.clock.now_utc().to_offset(time::UtcOffset::UTC);
        let time = match self.last {
            Some(last) if now < last => last,
            _ => now,
        };
        self.last = Some(time);

        let profile = scope.profile();
        AuditRecord {
            name: resource.friendly_name.clone(),
            provider: Provider::Aws,
            comment: outcome.comment,
            physical_id: resource.physical_id.clone(),
            region: resource.region.clone(),
            service: rule.service.as_str().to_string(),
            time,
            rule: rule.name.to_string(),
            state: outcome.state,
            profile: (!profile.is_empty()).then(|| profile.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules;
    use crate::services::ServiceKind;
    use crate::test_support::{descriptor, scope};
    use cloudaudit_types::{AuditState, ids};
    use serde_json::Value;
    use std::cell::RefCell;
    use time::macros::datetime;

    struct ScriptedClock(RefCell<Vec<OffsetDateTime>>);

    impl Clock for ScriptedClock {
        fn now_utc(&self) -> OffsetDateTime {
            self.0.borrow_mut().remove(0)
        }
    }

    fn rule() -> &'static RuleDefinition {
        rules::lookup(ServiceKind::DynamoDb, ids::RULE_ENCRYPTION_AT_REST).expect("rule")
    }

    #[test]
    fn build_fills_identity_scope_and_rule() {
        let mut builder = AuditRecordBuilder::new();
        let mut resource = descriptor("orders", "us-east-1", Value::Null).identity();
        resource.friendly_name = Some("Orders table".to_string());

        let record = builder.build(
            &scope("us-east-1"),
            &resource,
            rule(),
            RuleOutcome::fail("not encrypted"),
        );

        assert_eq!(record.name.as_deref(), Some("Orders table"));
        assert_eq!(record.provider, Provider::Aws);
        assert_eq!(record.physical_id, "orders");
        assert_eq!(record.region, "us-east-1");
        assert_eq!(record.service, "dynamodb");
        assert_eq!(record.rule, "EncryptionAtRest");
        assert_eq!(record.state, AuditState::Fail);
        assert_eq!(record.comment.as_deref(), Some("not encrypted"));
        assert_eq!(record.profile.as_deref(), Some("default"));
        assert_eq!(record.time.offset(), time::UtcOffset::UTC);
    }

    #[test]
    fn clock_is_read_per_record_and_clamped_when_it_steps_back() {
        let clock = ScriptedClock(RefCell::new(vec![
            datetime!(2024-01-01 10:00:00 UTC),
            datetime!(2024-01-01 10:00:05 UTC),
            datetime!(2024-01-01 09:59:00 UTC),
            datetime!(2024-01-01 10:00:07 UTC),
        ]));
        let mut builder = AuditRecordBuilder::with_clock(clock);
        let scope = scope("us-east-1");
        let resource = descriptor("t", "us-east-1", Value::Null).identity();

        let times: Vec<_> = (0..4)
            .map(|_| builder.build(&scope, &resource, rule(), RuleOutcome::ok()).time)
            .collect();

        assert_eq!(
            times,
            vec![
                datetime!(2024-01-01 10:00:00 UTC),
                datetime!(2024-01-01 10:00:05 UTC),
                datetime!(2024-01-01 10:00:05 UTC),
                datetime!(2024-01-01 10:00:07 UTC),
            ]
        );
    }

    #[test]
    fn empty_profile_is_omitted() {
        let scope = crate::model::ScanScope::new(
            crate::model::RegionSelector::All,
            "",
            crate::model::Domain::Public,
        );
        let resource = descriptor("t", "us-east-1", Value::Null).identity();
        let record = AuditRecordBuilder::new().build(&scope, &resource, rule(), RuleOutcome::ok());
        assert!(record.profile.is_none());
    }
}
