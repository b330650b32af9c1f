//! MOOD metrics integration tests.
//!
//! Collect classes from files on disk and check the computed factors.

use std::fs;

use flowmood::mood;

const BASE_HPP: &str = r#"
class Account {
public:
    int getBalance() const;
    void setBalance(int amount);
    void post(int amount);
private:
    void audit();
    int history;
};
"#;

const DERIVED_HPP: &str = r#"
class Savings : public Account {
public:
    void post(int amount);
    void accrue();
private:
    Account *linked;
};
"#;

fn write_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("account.hpp"), BASE_HPP).expect("write base");
    fs::write(dir.path().join("savings.hpp"), DERIVED_HPP).expect("write derived");
    dir
}

#[test]
fn test_directory_collection() {
    let dir = write_tree();
    let classes = mood::collect_path(dir.path()).expect("collect");
    assert_eq!(classes.len(), 2);
    let account = classes.iter().find(|c| c.name == "Account").expect("Account");
    // getBalance/setBalance folded into one public attribute.
    assert!(account.attributes.iter().any(|a| a.name == "Balance"));
    assert!(!account.methods.iter().any(|m| m.name == "getBalance"));
}

#[test]
fn test_report_over_directory() {
    let dir = write_tree();
    let classes = mood::collect_path(dir.path()).expect("collect");
    let report = mood::compute(&classes);
    assert_eq!(report.classes, 2);

    // Account: post (public), audit (private). Savings: post, accrue.
    assert!((report.mhf - 0.25).abs() < 1e-9);
    // Attributes: Balance (public), history (private), linked (private).
    assert!((report.ahf - 2.0 / 3.0).abs() < 1e-9);
    // Savings overrides post, so no method survives inheritance intact.
    assert!((report.mif - 0.0).abs() < 1e-9);
    // Balance is inherited untouched by Savings: 1 of 4 available
    // attribute slots across both classes.
    assert!((report.aif - 0.25).abs() < 1e-9);
    // One override over Account's two new methods times one subclass.
    assert!((report.pof - 0.5).abs() < 1e-9);
    // Savings holds an Account pointer: one reference over 2*1 pairs.
    assert!((report.cof - 0.5).abs() < 1e-9);
}

#[test]
fn test_single_file_collection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("account.hpp");
    fs::write(&file, BASE_HPP).expect("write");
    let classes = mood::collect_path(&file).expect("collect");
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "Account");
}

#[test]
fn test_classless_tree_reports_zeroes() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("util.cpp"), "int helper() { return 0; }").expect("write");
    let classes = mood::collect_path(dir.path()).expect("collect");
    let report = mood::compute(&classes);
    assert_eq!(report.classes, 0);
    assert_eq!(report.mhf, 0.0);
    assert!(!report.cof.is_nan());
}
