// End-to-end tests for `mapbyapn` against the SQLite inventory backend.
// Run with: cargo test -p parcelmap-cli --test mapbyapn_tests -- --nocapture

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use rusqlite::Connection;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

use parcelmap_io::gpkg;

const INVENTORY: &str = "
    CREATE TABLE tblInventory (DocNo INTEGER PRIMARY KEY, Voided INTEGER, CitTitle TEXT);
    CREATE TABLE tblInventoryAddr (DocNo INTEGER, APN TEXT);
    CREATE TABLE tblInventoryCnty (DocNo INTEGER, CountyName TEXT);
    CREATE TABLE tblResource (PrimCo INTEGER, PrimNo INTEGER, Voided INTEGER,
                              ResourceName TEXT, TrinNo INTEGER, TrinH TEXT);
    CREATE TABLE tblResourceAddr (PrimCo INTEGER, PrimNo INTEGER, APN TEXT);

    INSERT INTO tblInventory VALUES
        (123, 0, 'Cultural Resources Study'),
        (124, 1, 'Voided Study'),
        (125, 0, 'No Parcels'),
        (126, 0, 'Marin Survey');
    INSERT INTO tblInventoryAddr VALUES
        (123, '007-123-45'), (123, '007-456-78'),
        (126, '012-345-67');
    INSERT INTO tblInventoryCnty VALUES
        (123, 'Contra Costa'), (124, 'Contra Costa'), (125, 'Sonoma'), (126, 'Marin');

    INSERT INTO tblResource VALUES
        (7, 45, 1, 'Voided site', NULL, NULL),
        (49, 1200, 0, 'Mill site', 3310, 'CA-SON-003310H'),
        (49, 1201, 0, NULL, 0, '');
    INSERT INTO tblResourceAddr VALUES
        (7, 45, '007-123-456-000'),
        (49, 1200, '123-456-789'),
        (49, 1201, '123-456-780');
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// Inventory, basemap (CCO_APN and SON_APN only) and settings in a temp dir.
    fn new() -> Self {
        let dir = TempDir::new().unwrap();

        let inv = Connection::open(dir.path().join("icdb.sqlite")).unwrap();
        inv.execute_batch(INVENTORY).unwrap();

        let base = Connection::open(dir.path().join("basemap.gpkg")).unwrap();
        gpkg::init_core(&base).unwrap();
        base.execute_batch(
            "INSERT INTO gpkg_spatial_ref_sys VALUES
                ('NAD83 / California zone 2 (ftUS)', 2226, 'EPSG', 2226, 'PROJCS[\"NAD83 / California zone 2 (ftUS)\"]', NULL);
             CREATE TABLE CCO_APN (fid INTEGER PRIMARY KEY, geom BLOB, APN TEXT);
             INSERT INTO gpkg_contents (table_name, data_type, srs_id) VALUES ('CCO_APN', 'features', 2226);
             INSERT INTO gpkg_geometry_columns VALUES ('CCO_APN', 'geom', 'MULTIPOLYGON', 2226, 0, 0);
             INSERT INTO CCO_APN (geom, APN) VALUES (X'4750000101', '007-123-45');
             CREATE TABLE SON_APN (fid INTEGER PRIMARY KEY, geom BLOB, APN TEXT);
             INSERT INTO gpkg_contents (table_name, data_type, srs_id) VALUES ('SON_APN', 'features', 2226);
             INSERT INTO gpkg_geometry_columns VALUES ('SON_APN', 'geom', 'MULTIPOLYGON', 2226, 0, 0);
             INSERT INTO SON_APN (geom, APN) VALUES
                (X'4750000201', '123-456-789'),
                (X'4750000202', '123-456-789'),
                (X'4750000203', '123-456-780');",
        )
        .unwrap();

        std::fs::write(
            dir.path().join("settings.toml"),
            "[inventory]\nbackend = \"sqlite\"\n\n[output]\noperator = \"tester\"\n",
        )
        .unwrap();

        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn workbook(&self, name: &str, sheet: &str, headers: [&str; 2], rows: &[(f64, f64)]) -> PathBuf {
        let path = self.path(name);
        let mut wb = Workbook::new();
        let ws = wb.add_worksheet();
        ws.set_name(sheet).unwrap();
        ws.write_string(0, 0, headers[0]).unwrap();
        ws.write_string(0, 1, headers[1]).unwrap();
        for (i, (a, b)) in rows.iter().enumerate() {
            ws.write_number(i as u32 + 1, 0, *a).unwrap();
            ws.write_number(i as u32 + 1, 1, *b).unwrap();
        }
        wb.save(&path).unwrap();
        path
    }

    fn mapbyapn(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mapbyapn"));
        cmd.current_dir(self.dir.path())
            .env("ICDB_sqldb", self.path("icdb.sqlite"))
            .env_remove("RUST_LOG")
            .env_remove("PARCELMAP_PARCELS")
            .arg("--config")
            .arg(self.path("settings.toml"));
        cmd
    }

    fn run(&self, workbook: &Path, extra: &[&str]) -> Output {
        self.mapbyapn()
            .arg("run")
            .arg(workbook)
            .arg("--parcels")
            .arg(self.path("basemap.gpkg"))
            .args(extra)
            .output()
            .expect("mapbyapn run")
    }

    fn output_db(&self) -> Connection {
        Connection::open(self.path("mapByAPN.gpkg")).unwrap()
    }
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ---------------------------------------------------------------------------
// reports
// ---------------------------------------------------------------------------

#[test]
fn reports_selection_maps_found_parcels() {
    let fx = Fixture::new();
    let wb = fx.workbook(
        "my survey.xlsx",
        "tblInvSelect",
        ["DocCo", "DocNo"],
        &[(7.0, 123.0), (7.0, 124.0), (49.0, 125.0)],
    );

    let out = fx.run(&wb, &["--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).expect("valid JSON");
    assert_eq!(report["kind"], "reports");
    assert!(report["feature_class"].as_str().unwrap().ends_with("mapByAPN.gpkg/my_survey_APN_1"));
    assert_eq!(report["tally"]["processed"], 3);
    assert_eq!(report["tally"]["voided"], 1);
    assert_eq!(report["tally"]["no_apn"], 1);
    assert_eq!(report["tally"]["no_parcel"], 0);
    assert_eq!(report["tally"]["multi_parcel"], 0);
    assert_eq!(report["tally"]["shapes_written"], 1);

    let db = fx.output_db();
    let (co, no, other, notes, by, org, src): (i64, i64, String, String, String, String, String) = db
        .query_row(
            "SELECT DocCo, DocNo, OtherID, Notes, DigBy, DigOrg, DigSource FROM my_survey_APN_1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?, r.get(6)?)),
        )
        .unwrap();
    assert_eq!((co, no), (7, 123));
    assert_eq!(other, "Cultural Resources Study");
    assert_eq!(notes, "automap APN:007-123-45");
    assert_eq!(by, "tester");
    assert_eq!(org, "NWIC");
    assert_eq!(src, "p");

    let srs: i64 = db
        .query_row(
            "SELECT srs_id FROM gpkg_geometry_columns WHERE table_name = 'my_survey_APN_1'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(srs, 2226);

    let summary = stderr(&out);
    assert!(summary.contains("3 Reports processed"), "{summary}");
    assert!(summary.contains("1 parcel shapes copied"), "{summary}");
}

#[test]
fn second_run_gets_next_name() {
    let fx = Fixture::new();
    let wb = fx.workbook("sel.xlsx", "tblInvSelect", ["DocCo", "DocNo"], &[(7.0, 123.0)]);

    assert!(fx.run(&wb, &[]).status.success());
    assert!(fx.run(&wb, &[]).status.success());

    let db = fx.output_db();
    let count = |t: &str| -> i64 {
        db.query_row(&format!("SELECT COUNT(*) FROM {t}"), [], |r| r.get(0)).unwrap()
    };
    assert_eq!(count("sel_APN_1"), 1);
    assert_eq!(count("sel_APN_2"), 1);
}

// ---------------------------------------------------------------------------
// resources
// ---------------------------------------------------------------------------

#[test]
fn resources_selection_writes_trinomials() {
    let fx = Fixture::new();
    let wb = fx.workbook(
        "res.xlsx",
        "tblResSelect",
        ["PrimCo", "PrimNo"],
        &[(7.0, 45.0), (49.0, 1200.0), (49.0, 1201.0)],
    );

    let out = fx.run(&wb, &["--json"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["tally"]["voided"], 1);
    assert_eq!(report["tally"]["multi_parcel"], 1);
    assert_eq!(report["tally"]["shapes_written"], 3);

    let db = fx.output_db();
    let mut stmt = db
        .prepare("SELECT PrimCo, PrimNo, TrinNo, OtherID, Notes FROM res_APN_1 ORDER BY fid")
        .unwrap();
    let rows: Vec<(i64, i64, Option<i64>, String, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        (
            49,
            1200,
            Some(3310),
            "Mill site".to_string(),
            "CA-SON-003310H; automap APN:123-456-789".to_string()
        )
    );
    assert_eq!(rows[1].1, 1200);
    assert_eq!(
        rows[2],
        (49, 1201, None, "[none]".to_string(), "automap APN:123-456-780".to_string())
    );
}

// ---------------------------------------------------------------------------
// failures and exit codes
// ---------------------------------------------------------------------------

#[test]
fn unrecognized_sheet_exits_3() {
    let fx = Fixture::new();
    let wb = fx.workbook("bad.xlsx", "Sheet1", ["DocCo", "DocNo"], &[(7.0, 123.0)]);
    let out = fx.run(&wb, &[]);
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("tblInvSelect"));
    assert!(!fx.path("mapByAPN.gpkg").exists());
}

#[test]
fn bad_selection_wins_over_missing_basemap() {
    let fx = Fixture::new();
    let wb = fx.workbook("bad.xlsx", "Sheet1", ["DocCo", "DocNo"], &[(7.0, 123.0)]);
    let out = fx.mapbyapn().arg("run").arg(&wb).output().unwrap();
    assert_eq!(out.status.code(), Some(3), "stderr: {}", stderr(&out));
    assert!(!stderr(&out).contains("basemap"));
}

#[test]
fn header_mismatch_exits_3() {
    let fx = Fixture::new();
    let wb = fx.workbook("bad.xlsx", "tblResSelect", ["DocCo", "DocNo"], &[(7.0, 45.0)]);
    let out = fx.run(&wb, &[]);
    assert_eq!(out.status.code(), Some(3));
    assert!(stderr(&out).contains("A1"));
}

#[test]
fn missing_inventory_env_exits_4() {
    let fx = Fixture::new();
    let wb = fx.workbook("sel.xlsx", "tblInvSelect", ["DocCo", "DocNo"], &[(7.0, 123.0)]);
    let out = fx
        .mapbyapn()
        .env_remove("ICDB_sqldb")
        .args(["run"])
        .arg(&wb)
        .arg("--parcels")
        .arg(fx.path("basemap.gpkg"))
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(4), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("ICDB_sqldb"));
}

#[test]
fn missing_county_layer_exits_6() {
    let fx = Fixture::new();
    let wb = fx.workbook("sel.xlsx", "tblInvSelect", ["DocCo", "DocNo"], &[(21.0, 126.0)]);
    let out = fx.run(&wb, &[]);
    assert_eq!(out.status.code(), Some(6), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("MRN_APN"));
}

#[test]
fn layers_on_different_spatial_refs_exit_6() {
    let fx = Fixture::new();
    Connection::open(fx.path("basemap.gpkg"))
        .unwrap()
        .execute_batch(
            "INSERT INTO gpkg_spatial_ref_sys VALUES
                ('NAD83 / California zone 3 (ftUS)', 2227, 'EPSG', 2227, 'PROJCS[\"NAD83 / California zone 3 (ftUS)\"]', NULL);
             CREATE TABLE ALA_APN (fid INTEGER PRIMARY KEY, geom BLOB, APN TEXT);
             INSERT INTO gpkg_contents (table_name, data_type, srs_id) VALUES ('ALA_APN', 'features', 2227);
             INSERT INTO gpkg_geometry_columns VALUES ('ALA_APN', 'geom', 'MULTIPOLYGON', 2227, 0, 0);",
        )
        .unwrap();

    let wb = fx.workbook("sel.xlsx", "tblInvSelect", ["DocCo", "DocNo"], &[(7.0, 123.0)]);
    let out = fx.run(&wb, &[]);
    assert_eq!(out.status.code(), Some(6), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("ALA_APN (2227)"), "stderr: {}", stderr(&out));
    assert!(!fx.path("mapByAPN.gpkg").exists());
}

#[test]
fn missing_workbook_exits_2() {
    let fx = Fixture::new();
    let out = fx.run(&fx.path("nope.xlsx"), &[]);
    assert_eq!(out.status.code(), Some(2));
}

// ---------------------------------------------------------------------------
// check / counties
// ---------------------------------------------------------------------------

#[test]
fn check_lists_identifiers() {
    let fx = Fixture::new();
    let wb = fx.workbook("res.xlsx", "tblResSelect", ["PrimCo", "PrimNo"], &[(7.0, 45.0), (49.0, 1200.0)]);

    let out = fx.mapbyapn().arg("check").arg(&wb).output().unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("P-07-000045"), "{stdout}");
    assert!(stdout.contains("P-49-001200"), "{stdout}");

    let out = fx.mapbyapn().arg("check").arg(&wb).arg("--json").output().unwrap();
    let sel: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(sel["kind"], "resources");
    assert_eq!(sel["entries"].as_array().unwrap().len(), 2);
}

#[test]
fn counties_reflect_overrides() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("settings.toml"),
        "[parcels.layers]\n\"7\" = \"contra_costa\"\n",
    )
    .unwrap();

    let out = fx.mapbyapn().args(["counties", "--json"]).output().unwrap();
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    let rows: Vec<serde_json::Value> = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(rows.len(), 18);
    let cco = rows.iter().find(|r| r["code"] == 7).unwrap();
    assert_eq!(cco["name"], "Contra Costa");
    assert_eq!(cco["layer"], "contra_costa");
}

#[test]
fn bad_pattern_override_exits_4() {
    let fx = Fixture::new();
    std::fs::write(fx.path("settings.toml"), "[parcels.patterns]\n\"49\" = \"^(\"\n").unwrap();
    let out = fx.mapbyapn().arg("counties").output().unwrap();
    assert_eq!(out.status.code(), Some(4));
}
