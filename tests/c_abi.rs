//! Drives the dump handle through the exported C functions only

use std::ffi::CString;
use std::fs;
use std::path::Path;

use verilated_shim::ffi::*;

fn c_path(path: &Path) -> CString {
    CString::new(path.to_str().unwrap()).unwrap()
}

fn time_records(text: &str) -> usize {
    text.lines().filter(|l| l.starts_with('#')).count()
}

#[test]
fn handle_lifecycle_and_record_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("life.vcd");
    let name = c_path(&path);

    unsafe {
        let vcd = verilatedvcdc_new();
        assert!(!vcd.is_null());
        assert_eq!(verilatedvcdc_is_open(vcd), 0);

        verilatedvcdc_open(vcd, name.as_ptr());
        assert_eq!(verilatedvcdc_is_open(vcd), 1);

        for t in 1..=10u64 {
            verilatedvcdc_dump(vcd, t);
        }
        verilatedvcdc_flush(vcd);
        assert_eq!(time_records(&fs::read_to_string(&path).unwrap()), 10);

        verilatedvcdc_close(vcd);
        assert_eq!(verilatedvcdc_is_open(vcd), 0);

        // Dumps after close are dropped
        verilatedvcdc_dump(vcd, 11);
        verilatedvcdc_delete(vcd);
    }

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(time_records(&text), 10);
    assert_eq!(text.matches("$enddefinitions").count(), 1);
}

#[test]
fn delete_closes_open_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dropped.vcd");
    let name = c_path(&path);

    unsafe {
        let vcd = verilatedvcdc_new();
        verilatedvcdc_open(vcd, name.as_ptr());
        verilatedvcdc_dump(vcd, 0);
        verilatedvcdc_delete(vcd);
    }

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.ends_with("#0\n"));
}

#[test]
fn open_next_rotates_to_distinct_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("wave.vcd");
    let name = c_path(&first);

    unsafe {
        let vcd = verilatedvcdc_new();
        verilatedvcdc_open(vcd, name.as_ptr());
        verilatedvcdc_dump(vcd, 0);
        verilatedvcdc_open_next(vcd, 1);
        verilatedvcdc_dump(vcd, 1);
        verilatedvcdc_open_next(vcd, 1);
        verilatedvcdc_dump(vcd, 2);
        verilatedvcdc_close(vcd);
        verilatedvcdc_delete(vcd);
    }

    let files = [
        first.clone(),
        dir.path().join("wave_cat0000.vcd"),
        dir.path().join("wave_cat0001.vcd"),
    ];
    let combined: String = files.iter().map(|f| fs::read_to_string(f).unwrap()).collect();
    assert_eq!(combined.matches("$enddefinitions").count(), 1);
    assert_eq!(time_records(&combined), 3);
}

#[test]
fn bad_tokens_and_paths_are_absorbed() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scale.vcd");
    let name = c_path(&path);
    let bad_path = c_path(&dir.path().join("no/such/dir.vcd"));
    let us = CString::new("1us").unwrap();
    let bogus = CString::new("bogus").unwrap();

    unsafe {
        let vcd = verilatedvcdc_new();

        verilatedvcdc_open(vcd, bad_path.as_ptr());
        assert_eq!(verilatedvcdc_is_open(vcd), 0);

        verilatedvcdc_set_time_unit(vcd, us.as_ptr());
        verilatedvcdc_set_time_unit(vcd, bogus.as_ptr());
        verilatedvcdc_set_time_resolution(vcd, bogus.as_ptr());
        verilatedvcdc_rollover_mb(vcd, 0);

        verilatedvcdc_open(vcd, name.as_ptr());
        assert_eq!(verilatedvcdc_is_open(vcd), 1);
        verilatedvcdc_dump(vcd, 3);
        verilatedvcdc_delete(vcd);
    }

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.contains("$timescale 1ns $end"));
    assert!(text.lines().any(|l| l == "#3"));
}

#[test]
fn dump_times_written_as_given() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ps.vcd");
    let name = c_path(&path);
    let ps = CString::new("1ps").unwrap();

    unsafe {
        let vcd = verilatedvcdc_new();
        verilatedvcdc_set_time_unit(vcd, ps.as_ptr());
        verilatedvcdc_open(vcd, name.as_ptr());
        for t in [500, 7400, 7600] {
            verilatedvcdc_dump(vcd, t);
        }
        verilatedvcdc_delete(vcd);
    }

    let text = fs::read_to_string(&path).unwrap();
    let records: Vec<&str> = text.lines().filter(|l| l.starts_with('#')).collect();
    assert_eq!(records, vec!["#500", "#7400", "#7600"]);
}
