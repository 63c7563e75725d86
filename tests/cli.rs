use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fieldcrm(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fieldcrm").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

const RULES: &str = r#"
workflows:
  - name: Overdue follow-up
    status: active
    trigger:
      type: invoice_status
      pipeline: invoices
      status: overdue
    filters:
      - field: amount
        operator: greater_than
        value: 500
    actions:
      - type: send_text_message
        config:
          textMessage: "Hi {{customer_name}}, your invoice is overdue"
"#;

#[test]
fn test_filter_match_prints_result() {
    let home = TempDir::new().unwrap();
    let record = write(home.path(), "job.json", r#"{"status": "open", "priority": "High"}"#);

    fieldcrm(home.path())
        .args(["filter"])
        .arg(&record)
        .args(["--where", "status = open AND priority equals high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("record matches"));
}

#[test]
fn test_filter_miss_still_succeeds() {
    let home = TempDir::new().unwrap();
    let record = write(home.path(), "job.json", r#"{"status": "closed"}"#);

    fieldcrm(home.path())
        .args(["-o", "json", "filter"])
        .arg(&record)
        .args(["--where", "status = open"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": false"));
}

#[test]
fn test_filter_reads_record_from_stdin() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["-o", "json", "filter", "-", "--where", "tags has_label vip"])
        .write_stdin(r#"{"tags": ["VIP", "Repeat"]}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": true"));
}

#[test]
fn test_filter_multiline_query_splits_on_joiners() {
    let home = TempDir::new().unwrap();
    let record = write(home.path(), "job.json", r#"{"status": "open", "priority": "low"}"#);

    fieldcrm(home.path())
        .args(["-o", "json", "filter"])
        .arg(&record)
        .args(["--where", "status = open\nAND\tpriority = high"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"matched\": false"));
}

#[test]
fn test_filter_bad_query_fails() {
    let home = TempDir::new().unwrap();
    let record = write(home.path(), "job.json", "{}");

    fieldcrm(home.path())
        .arg("filter")
        .arg(&record)
        .args(["--where", "(status = open)"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_record_file_fails() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["filter", "nope.json", "--where", "status = open"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot read"));
}

#[test]
fn test_automation_check_previews_eligible_actions() {
    let home = TempDir::new().unwrap();
    let rules = write(home.path(), "rules.yaml", RULES);
    let record = write(
        home.path(),
        "invoice.json",
        r#"{"amount": 750, "customer_name": "Ana"}"#,
    );

    fieldcrm(home.path())
        .args(["auto", "check"])
        .arg(&rules)
        .arg(&record)
        .args(["--trigger", "invoice_status", "--pipeline", "invoices", "--status", "overdue"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1/1 workflows eligible"))
        .stdout(predicate::str::contains("Hi Ana, your invoice is overdue"));
}

#[test]
fn test_automation_check_wrong_status_is_not_eligible() {
    let home = TempDir::new().unwrap();
    let rules = write(home.path(), "rules.yaml", RULES);
    let record = write(home.path(), "invoice.json", r#"{"amount": 750}"#);

    fieldcrm(home.path())
        .args(["auto", "check"])
        .arg(&rules)
        .arg(&record)
        .args(["--trigger", "invoice_status", "--status", "paid"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0/1 workflows eligible"));
}

#[test]
fn test_automation_validate_flags_unknown_field() {
    let home = TempDir::new().unwrap();
    let rules = write(
        home.path(),
        "rules.yaml",
        r"
- name: Colour check
  trigger:
    type: job_status
    pipeline: jobs
  filters:
    - field: colour
      operator: equals
      value: red
",
    );

    fieldcrm(home.path())
        .args(["-o", "json", "automation", "validate"])
        .arg(&rules)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\": false"));
}

#[test]
fn test_automation_fields_lists_operators() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["automation", "fields", "invoices"])
        .assert()
        .success()
        .stdout(predicate::str::contains("greater_than"));
}

#[test]
fn test_template_show_prints_body() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["-o", "json", "template", "show", "invoice_sms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"type\": \"invoice_sms\""));
}

#[test]
fn test_template_show_unknown_type_is_rejected() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["template", "show", "fax_message"])
        .assert()
        .failure();
}

#[test]
fn test_template_render_from_stdin() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args([
            "template",
            "render",
            "-",
            "--channel",
            "sms",
            "--var",
            "contact.firstName=Ana",
            "--link",
            "pay-invoice=https://pay.test/7",
        ])
        .write_stdin("Hi {{contact.firstName}}, pay at {{pay-invoice}}. {{unknown.key}}")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Hi Ana, pay at https://pay.test/7. {{unknown.key}}",
        ));
}

#[test]
fn test_template_render_uses_configured_preview_href() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join(".fieldcrm")).unwrap();
    write(
        &home.path().join(".fieldcrm"),
        "config.yaml",
        "preview:\n  action_href: https://preview.test\n",
    );

    fieldcrm(home.path())
        .args(["template", "render", "-", "--channel", "sms", "--preview"])
        .write_stdin("Open {{view-invoice}}")
        .assert()
        .success()
        .stdout(predicate::str::contains("Open https://preview.test"));
}

#[test]
fn test_config_default_output_json() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join(".fieldcrm")).unwrap();
    write(
        &home.path().join(".fieldcrm"),
        "config.yaml",
        "general:\n  default_output: json\n",
    );

    fieldcrm(home.path())
        .args(["terms", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"isDefault\": true"));
}

#[test]
fn test_malformed_config_fails() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join(".fieldcrm")).unwrap();
    write(&home.path().join(".fieldcrm"), "config.yaml", "general: [1, 2\n");

    fieldcrm(home.path())
        .args(["terms", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_template_validate_reports_unknown_keyword() {
    let home = TempDir::new().unwrap();
    let body = write(home.path(), "body.txt", "Hi {{contact.firstName}} {{proposal.number}}");

    fieldcrm(home.path())
        .args(["-o", "json", "template", "validate"])
        .arg(&body)
        .args(["--type", "invoice_sms"])
        .assert()
        .success()
        .stdout(predicate::str::contains("proposal.number"));
}

#[test]
fn test_completions_generate_for_bash() {
    let home = TempDir::new().unwrap();

    fieldcrm(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fieldcrm"));
}
