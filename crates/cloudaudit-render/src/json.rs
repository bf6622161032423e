use cloudaudit_types::AuditRecord;

/// Pretty JSON array of records, in the order given, with a trailing newline.
pub fn render_json(records: &[AuditRecord]) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(records)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::tests::record;
    use cloudaudit_types::AuditState;

    #[test]
    fn empty_input_is_an_empty_array() {
        assert_eq!(render_json(&[]).unwrap(), "[]\n");
    }

    #[test]
    fn reproduces_every_record_in_order() {
        let records = vec![
            record("b", AuditState::Ok, None),
            record("a", AuditState::Fail, Some("SSE disabled")),
        ];
        let out = render_json(&records).unwrap();

        let back: Vec<AuditRecord> = serde_json::from_str(&out).unwrap();
        assert_eq!(back, records);
        assert!(out.find("\"b\"").unwrap() < out.find("\"a\"").unwrap());
    }
}
