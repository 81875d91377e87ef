mod common;
use common::TestEnv;
use predicates::prelude::*;

#[test]
fn selects_first_rows_in_display_order() {
    let t = TestEnv::new();
    let fixture = t.sample_fixture();
    t.offline(&fixture)
        .args(["select", "--count", "3"])
        .assert()
        .success()
        .stdout("27992\n28560\n111628\n");
}

#[test]
fn count_larger_than_page_selects_whole_page() {
    let t = TestEnv::new();
    let catalog = t.write_catalog(100);
    let out = t
        .offline(&catalog)
        .args(["select", "--count", "50", "--index", "2", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let ids: Vec<u64> = v
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, (25..=36).collect::<Vec<u64>>());
}

#[test]
fn invalid_counts_select_nothing() {
    let t = TestEnv::new();
    let fixture = t.sample_fixture();
    for count in ["0", "-2", "abc", "2.5", ""] {
        t.offline(&fixture)
            .args(["select", "--count", count])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }
}

#[test]
fn json_keeps_record_fields() {
    let t = TestEnv::new();
    let fixture = t.sample_fixture();
    let out = t
        .offline(&fixture)
        .args(["select", "--count", "2", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v.as_array().unwrap().len(), 2);
    assert_eq!(v[1]["title"], "The Bedroom");
    assert_eq!(v[1]["date_start"], 1889);
    assert!(v[0]["inscriptions"].is_null());
}
