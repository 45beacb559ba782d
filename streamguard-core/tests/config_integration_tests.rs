// streamguard-core/tests/config_integration_tests.rs
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

use streamguard_core::config::{self, PatternRule, RuleTable, UnsafeCutPolicy};
use streamguard_core::{headless_redact_string, EngineKind, StreamSession};

fn write_yaml(content: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(content.as_bytes())?;
    Ok(file)
}

fn rule(name: &str, pattern: &str, replace_with: &str) -> PatternRule {
    PatternRule {
        name: name.to_string(),
        pattern: pattern.to_string(),
        replace_with: replace_with.to_string(),
        ..Default::default()
    }
}

#[test]
fn test_load_default_rules() -> Result<()> {
    let table = RuleTable::load_default_rules()?;
    let names: Vec<&str> = table.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names.first(), Some(&"credit_card"));
    assert!(names.contains(&"ssn"));
    assert!(!names.iter().any(|n| n.contains("email") || n.contains("phone")));
    assert!(!table.partials.is_empty());
    config::validate_rules(&table.rules)?;
    config::validate_partials(&table.partials)?;
    Ok(())
}

#[test]
fn test_load_from_file() -> Result<()> {
    let file = write_yaml(
        r#"
rules:
  - name: employee_id
    pattern: "EMP-(\\d{6})"
    replace_with: "EMP-[ID]"
    description: "Internal employee numbers"
    severity: medium
    tags: [internal]
partials:
  - name: employee_id
    pattern: "EMP-\\d{0,5}$"
stream:
  buffer_size: 40
  safety_margin: 10
  on_unsafe_cut: fallback
"#,
    )?;
    let table = RuleTable::load_from_file(file.path())?;
    assert_eq!(table.rules.len(), 1);
    assert!(table.rules[0].case_insensitive);
    assert!(!table.rules[0].programmatic_validation);
    assert_eq!(table.rules[0].tags, Some(vec!["internal".to_string()]));

    let session = table.stream.to_session_config();
    assert_eq!(session.buffer_size, 40);
    assert_eq!(session.safety_margin, 10);
    assert_eq!(session.boundary_window, 20);
    assert_eq!(session.on_unsafe_cut, UnsafeCutPolicy::Fallback);

    assert_eq!(
        headless_redact_string(&table, EngineKind::Regex, "badge emp-123456 issued")?,
        "badge EMP-[ID] issued"
    );
    Ok(())
}

#[test]
fn test_load_from_file_rejects_bad_rules() -> Result<()> {
    let bad_regex = write_yaml("rules:\n  - name: broken\n    pattern: \"(unclosed\"\n")?;
    let err = RuleTable::load_from_file(bad_regex.path()).unwrap_err();
    assert!(err.to_string().contains("broken"), "{err}");

    let bad_group = write_yaml("rules:\n  - name: groups\n    pattern: \"a(b)\"\n    replace_with: \"$2\"\n")?;
    let err = RuleTable::load_from_file(bad_group.path()).unwrap_err();
    assert!(err.to_string().contains("$2"), "{err}");

    let unanchored = write_yaml(
        "rules: []\npartials:\n  - name: loose\n    pattern: \"\\\\d{3}-\"\n",
    )?;
    assert!(RuleTable::load_from_file(unanchored.path()).is_err());
    Ok(())
}

#[test]
fn test_merge_rules_no_user_config() {
    let defaults = RuleTable {
        rules: vec![rule("ssn", r"\d{3}-\d{2}-\d{4}", "[SSN]")],
        ..Default::default()
    };
    let merged = config::merge_rules(defaults.clone(), None);
    assert_eq!(merged, defaults);
}

#[test]
fn test_merge_rules_override_keeps_position() {
    let defaults = RuleTable {
        rules: vec![
            rule("credit_card", r"\d{4} \d{4} \d{4} \d{4}", "[CARD]"),
            rule("ssn", r"\d{3}-\d{2}-\d{4}", "[SSN]"),
        ],
        ..Default::default()
    };
    let user = RuleTable {
        rules: vec![
            rule("ssn", r"\d{3}-\d{2}-\d{4}", "[TAX-ID]"),
            rule("ticket", r"TCK-\d+", "[TICKET]"),
        ],
        ..Default::default()
    };
    let merged = config::merge_rules(defaults, Some(user));
    let names: Vec<&str> = merged.rules.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["credit_card", "ssn", "ticket"]);
    assert_eq!(merged.rules[1].replace_with, "[TAX-ID]");
}

#[test]
fn test_merge_rules_settings_field_by_field() -> Result<()> {
    let defaults = RuleTable::load_default_rules()?;
    let user_file = write_yaml(
        r#"
engines:
  entity:
    threshold: 0.9
stream:
  safety_margin: 5
"#,
    )?;
    let user = RuleTable::load_from_file(user_file.path())?;
    let merged = config::merge_rules(defaults.clone(), Some(user));

    assert_eq!(merged.rules, defaults.rules);
    assert_eq!(merged.engines.entity.threshold, Some(0.9));
    assert_eq!(merged.engines.entity.context_window, defaults.engines.entity.context_window);
    assert_eq!(merged.stream.safety_margin, Some(5));
    assert_eq!(merged.stream.buffer_size, defaults.stream.buffer_size);
    Ok(())
}

#[test]
fn test_opt_in_rules_need_enabling() -> Result<()> {
    let mut table = RuleTable {
        rules: vec![
            rule("ssn", r"\d{3}-\d{2}-\d{4}", "[SSN]"),
            PatternRule { opt_in: true, ..rule("ticket", r"TCK-\d+", "[TICKET]") },
        ],
        ..Default::default()
    };
    let mut enabled = table.clone();
    enabled.set_active_rules(&["ticket".to_string()], &["ssn".to_string()]);
    assert_eq!(headless_redact_string(&enabled, EngineKind::Regex, "TCK-42 234-56-7890")?, "[TICKET] 234-56-7890");

    table.set_active_rules(&[], &[]);
    assert_eq!(headless_redact_string(&table, EngineKind::Regex, "TCK-42 234-56-7890")?, "TCK-42 [SSN]");
    Ok(())
}

#[test]
fn test_session_settings_from_file_are_validated() -> Result<()> {
    let file = write_yaml("stream:\n  buffer_size: 10\n  safety_margin: 10\n")?;
    let table = config::merge_rules(RuleTable::load_default_rules()?, Some(RuleTable::load_from_file(file.path())?));
    assert!(StreamSession::from_rule_table(&table, EngineKind::Regex).is_err());
    Ok(())
}
