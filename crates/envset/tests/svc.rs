//! Dump renderer shapes and flag wiring (requires the `svc` feature).

use std::io::Write;

use clap::Parser;
use envset::svc::{self, Flags};
use envset::{MapLookup, process};
use serial_test::serial;

fn fixture() -> MapLookup {
    [("TEST_NAME", "svc"), ("TEST_PORT", "8080")]
        .into_iter()
        .collect()
}

fn declare_pair() {
    process::reset_for_testing();
    process::string("NAME", "service name");
    process::int("PORT", "listen port");
}

#[test]
#[serial]
fn export_dump_shape() {
    declare_pair();

    let mut out = Vec::new();
    svc::dump_exports(&mut out, &fixture()).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# service name\nexport TEST_NAME=\"svc\"\n\n# listen port\nexport TEST_PORT=\"8080\"\n"
    );
}

#[test]
#[serial]
fn json_dump_is_valid_and_ordered() {
    declare_pair();

    let mut out = Vec::new();
    svc::dump_json(&mut out, &fixture()).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert_eq!(
        text,
        "{\n    \"TEST_NAME\": \"svc\",\n    \"TEST_PORT\": \"8080\"\n}\n"
    );

    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["TEST_NAME"], "svc");
    assert_eq!(parsed["TEST_PORT"], "8080");
}

#[test]
#[serial]
fn yaml_dump_lists_name_value_pairs() {
    declare_pair();

    let mut out = Vec::new();
    svc::dump_yaml(&mut out, &fixture()).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "- name: TEST_NAME\n  value: \"svc\"\n- name: TEST_PORT\n  value: \"8080\"\n"
    );
}

#[test]
#[serial]
fn cue_dump_declares_a_schema() {
    declare_pair();

    let mut out = Vec::new();
    svc::dump_cue(&mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "package test\n\n#Env: [string]: string\n\n#Env: \"TEST_NAME\": string\n\n#Env: \"TEST_PORT\": string\n"
    );
}

#[test]
#[serial]
fn missing_value_dumps_as_empty() {
    process::reset_for_testing();
    process::string("ABSENT", "not in the lookup");

    let mut out = Vec::new();
    svc::dump_yaml(&mut out, &MapLookup::default()).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "- name: TEST_ABSENT\n  value: \"\"\n"
    );
}

#[test]
fn flags_parse_their_long_names() {
    let flags = Flags::try_parse_from([
        "svc",
        "--env-check",
        "--env-dump-yaml",
        "--env-pod-spec",
        "pod.yaml",
        "--env-pod-spec-container-name",
        "api",
    ])
    .unwrap();

    assert!(flags.env_check);
    assert!(flags.env_dump_yaml);
    assert!(!flags.env_dump);
    assert_eq!(flags.env_pod_spec.as_deref().unwrap().to_str(), Some("pod.yaml"));
    assert_eq!(flags.env_pod_spec_container_name.as_deref(), Some("api"));
}

#[test]
#[serial]
fn env_check_exits_zero_after_a_clean_parse() {
    process::reset_for_testing();
    let name = process::string("NAME", "service name");

    let pod = write_pod_spec(
        "\
spec:
  containers:
    - name: api
      env:
        - name: TEST_NAME
          value: from-pod
",
    );

    let flags = Flags {
        env_check: true,
        env_pod_spec: Some(pod.path().to_owned()),
        ..Flags::default()
    };

    let mut code = None;
    svc::parse_with_exit_fn(&flags, |c| code = Some(c));

    assert_eq!(code, Some(0));
    assert_eq!(name.get(), "from-pod");
}

#[test]
#[serial]
fn parse_failure_exits_one() {
    process::reset_for_testing();
    process::string("DOES_NOT_EXIST_ANYWHERE", "never set");

    let flags = Flags {
        env_check: true,
        ..Flags::default()
    };

    let mut code = None;
    svc::parse_with_exit_fn(&flags, |c| code = Some(c));
    assert_eq!(code, Some(1));
}

#[test]
#[serial]
fn unreadable_pod_spec_exits_one() {
    process::reset_for_testing();

    let flags = Flags {
        env_pod_spec: Some("does-not-exist.yaml".into()),
        ..Flags::default()
    };

    let mut code = None;
    svc::parse_with_exit_fn(&flags, |c| code = Some(c));
    assert_eq!(code, Some(1));
}

#[test]
#[serial]
fn plain_invocation_returns_after_a_clean_parse() {
    process::reset_for_testing();

    let pod = write_pod_spec(
        "\
spec:
  containers:
    - name: api
      env:
        - name: TEST_MODE
          value: replay
",
    );
    let mode = process::string("MODE", "run mode");

    let flags = Flags {
        env_pod_spec: Some(pod.path().to_owned()),
        ..Flags::default()
    };

    let mut code = None;
    svc::parse_with_exit_fn(&flags, |c| code = Some(c));

    assert_eq!(code, None);
    assert_eq!(mode.get(), "replay");
}

fn write_pod_spec(yaml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
