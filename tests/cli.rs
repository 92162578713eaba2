mod common;

use assert_cmd::Command;
use predicates::str::contains;

use common::TestWorkspace;

fn cmd() -> Command {
    Command::cargo_bin("csv-ingest").expect("binary exists")
}

#[test]
fn import_then_query_round_trip() {
    let ws = TestWorkspace::new();
    let input = ws.write("orders_1.csv", "id,item\n1,anvil\n2,rope\n");
    let db = ws.db_path();

    cmd()
        .args([
            "import",
            "-d",
            db.to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-p",
            r"(.+)_\d+\.csv",
            "--header",
        ])
        .assert()
        .success();

    cmd()
        .args([
            "query",
            "-d",
            db.to_str().unwrap(),
            "-s",
            "SELECT item FROM orders ORDER BY id",
        ])
        .assert()
        .success()
        .stdout(contains("item\nanvil\nrope\n"));
}

#[test]
fn strict_policy_mismatch_sets_failure_exit_status() {
    let ws = TestWorkspace::new();
    let seed = ws.write("stock_1.csv", "a,b,c\n");
    let db = ws.db_path();
    cmd()
        .args([
            "import",
            "-d",
            db.to_str().unwrap(),
            "-i",
            seed.to_str().unwrap(),
            "-t",
            "stock",
        ])
        .assert()
        .success();

    let wider = ws.write("stock_2.csv", "a,b,c,d\n");
    cmd()
        .args([
            "import",
            "-d",
            db.to_str().unwrap(),
            "-i",
            wider.to_str().unwrap(),
            "-t",
            "stock",
            "--field-count-policy",
            "strict",
        ])
        .assert()
        .failure()
        .stderr(contains("file(s) failed to import"));
}

#[test]
fn row_level_skips_do_not_change_exit_status() {
    let ws = TestWorkspace::new();
    // second record is ragged and gets skipped under the default policy
    let input = ws.write("logs_1.csv", "a,b,c\nd,e\nf,g,h\n");
    let db = ws.db_path();

    cmd()
        .args([
            "import",
            "-d",
            db.to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-t",
            "logs",
        ])
        .assert()
        .success();

    cmd()
        .args([
            "query",
            "-d",
            db.to_str().unwrap(),
            "-s",
            "SELECT count(*) AS n FROM logs",
        ])
        .assert()
        .success()
        .stdout(contains("n\n2\n"));
}

#[test]
fn tables_lists_columns_and_rows() {
    let ws = TestWorkspace::new();
    let input = ws.write("trips_1.csv", "x,y\nu,v\n");
    let db = ws.db_path();
    cmd()
        .args([
            "import",
            "-d",
            db.to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-t",
            "trips",
        ])
        .assert()
        .success();

    cmd()
        .args(["tables", "-d", db.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("trips: 2 column(s), 2 row(s)"));
}

#[test]
fn naming_and_table_options_are_mutually_exclusive() {
    let ws = TestWorkspace::new();
    let input = ws.write("a.csv", "1,2\n");
    cmd()
        .args([
            "import",
            "-d",
            ws.db_path().to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-p",
            "(.+).csv",
            "-t",
            "a",
        ])
        .assert()
        .failure();
}

#[test]
fn memory_import_surfaces_only_through_sql_output() {
    let ws = TestWorkspace::new();
    let input = ws.write("mem_1.csv", "1,2\n3,4\n");
    cmd()
        .args([
            "import",
            "-d",
            ws.db_path().to_str().unwrap(),
            "-i",
            input.to_str().unwrap(),
            "-t",
            "mem",
            "--memory",
            "--sql",
            "SELECT count(*) AS n FROM mem",
        ])
        .assert()
        .success()
        .stdout(contains("n\n2\n"));

    assert!(!ws.db_path().exists());
}
