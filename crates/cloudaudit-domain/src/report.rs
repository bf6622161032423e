use cloudaudit_types::{AuditRecord, AuditState};

/// When the overall verdict turns into a failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailOn {
    #[default]
    Fail,
    Warning,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub ok: u32,
    pub fail: u32,
    pub unknown: u32,
    pub warning: u32,
}

impl StateCounts {
    pub fn from_records(records: &[AuditRecord]) -> Self {
        let mut counts = StateCounts::default();
        for r in records {
            match r.state {
                AuditState::Ok => counts.ok += 1,
                AuditState::Fail => counts.fail += 1,
                AuditState::Unknown => counts.unknown += 1,
                AuditState::Warning => counts.warning += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> u32 {
        self.ok + self.fail + self.unknown + self.warning
    }

    pub fn get(&self, state: AuditState) -> u32 {
        match state {
            AuditState::Ok => self.ok,
            AuditState::Fail => self.fail,
            AuditState::Unknown => self.unknown,
            AuditState::Warning => self.warning,
        }
    }
}

/// `FAIL` always fails. `WARNING` fails only under `FailOn::Warning`.
/// `UNKNOWN` and partial scans never fail on their own but downgrade a pass to a warning.
pub fn compute_verdict(counts: &StateCounts, partial: bool, fail_on: FailOn) -> Verdict {
    if counts.fail > 0 {
        return Verdict::Fail;
    }
    if counts.warning > 0 {
        return match fail_on {
            FailOn::Warning => Verdict::Fail,
            FailOn::Fail => Verdict::Warn,
        };
    }
    if counts.unknown > 0 || partial {
        return Verdict::Warn;
    }
    Verdict::Pass
}
