use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};

struct Fixture {
    dir: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        Self { dir: tempfile::tempdir().expect("temp dir should be created") }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn prefs_dir(&self) -> PathBuf {
        self.path("prefs")
    }

    fn image(&self, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height)
            .save(self.path(name))
            .expect("fixture image should be written");
    }

    fn payload(&self, sources: &[&str]) -> PathBuf {
        let images: Vec<Value> = sources
            .iter()
            .enumerate()
            .map(|(index, src)| json!({ "id": format!("p{index}"), "src": src, "label": src }))
            .collect();
        let path = self.path("payload.json");
        fs::write(&path, json!({ "title": "Fixture", "images": images }).to_string())
            .expect("payload should be written");
        path
    }

    fn local_pages(&self, count: usize) -> PathBuf {
        let names: Vec<String> = (0..count).map(|index| format!("page-{index}.png")).collect();
        for name in &names {
            self.image(name, 40, 60);
        }
        let sources: Vec<&str> = names.iter().map(String::as_str).collect();
        self.payload(&sources)
    }

    fn replay(&self, payload: &Path, script: &str, extra: &[&str]) -> Value {
        let script_path = self.path("script.txt");
        fs::write(&script_path, script).expect("script should be written");

        let output = cargo_bin_cmd!("folio")
            .arg("--prefs-dir")
            .arg(self.prefs_dir())
            .arg("replay")
            .arg(payload)
            .arg("--script")
            .arg(&script_path)
            .args(extra)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        serde_json::from_slice(&output).expect("stdout should contain valid json")
    }

    fn stored_preferences(&self) -> Value {
        let output = cargo_bin_cmd!("folio")
            .arg("--prefs-dir")
            .arg(self.prefs_dir())
            .args(["prefs", "show"])
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        serde_json::from_slice(&output).expect("stdout should contain valid json")
    }
}

fn number(value: &Value) -> f64 {
    value.as_f64().expect("value should be a number")
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("folio")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn info_reports_pages_and_local_dimensions() {
    let fixture = Fixture::new();
    fixture.image("a.png", 40, 60);
    let payload = fixture.payload(&["a.png", "https://img.test/b.jpg"]);

    let output = cargo_bin_cmd!("folio")
        .arg("info")
        .arg(&payload)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("stdout should contain valid json");

    assert_eq!(value["title"], "Fixture");
    assert_eq!(value["page_count"], 2);
    assert_eq!(value["pages"][0]["kind"], "file");
    assert_eq!(number(&value["pages"][0]["size"]["width"]), 40.0);
    assert_eq!(number(&value["pages"][0]["size"]["height"]), 60.0);
    assert_eq!(value["pages"][1]["kind"], "remote");
    assert!(value["pages"][1]["size"].is_null());
}

#[test]
fn info_fails_for_missing_payload() {
    let fixture = Fixture::new();

    cargo_bin_cmd!("folio")
        .arg("info")
        .arg(fixture.path("missing.json"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("file does not exist"));
}

#[test]
fn replay_rejects_empty_payload() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&[]);
    let script = fixture.path("script.txt");
    fs::write(&script, "next\n").expect("script should be written");

    cargo_bin_cmd!("folio")
        .arg("--prefs-dir")
        .arg(fixture.prefs_dir())
        .arg("replay")
        .arg(&payload)
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No images found. Please try again."));
}

#[test]
fn replay_reports_bad_script_line() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(2);
    let script = fixture.path("script.txt");
    fs::write(&script, "# setup\nnext\nteleport 4\n").expect("script should be written");

    cargo_bin_cmd!("folio")
        .arg("--prefs-dir")
        .arg(fixture.prefs_dir())
        .arg("replay")
        .arg(&payload)
        .arg("--script")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("script line 3"));
}

#[test]
fn replay_navigates_and_loads_local_pages() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(5);

    let value = fixture.replay(&payload, "next\nnext\nprev\njump 4\njump 9\n", &[]);

    assert_eq!(value["current_page"], 4);
    assert_eq!(value["counter"], "4/5");
    assert_eq!(value["mode"], "paged");
    assert_eq!(value["image_src"], "page-3.png");
    assert!(value["loading"].is_null());
    assert_eq!(value["thumbnail_in_view"], 3);
}

#[test]
fn replay_click_halves_turn_pages() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(3);

    let value = fixture.replay(&payload, "click 900 400\nclick 900 400\nclick 100 400\n", &[]);

    assert_eq!(value["current_page"], 2);
}

#[test]
fn replay_missing_image_shows_raw_source() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&["absent.png"]);

    let value = fixture.replay(&payload, "", &[]);

    assert_eq!(value["image_src"], "absent.png");
    assert!(value["loading"].is_null());
}

#[test]
fn remote_page_stays_loading_until_timeout() {
    let fixture = Fixture::new();
    let payload = fixture.payload(&["https://img.test/0.jpg", "https://img.test/1.jpg"]);

    let pending = fixture.replay(&payload, "wait 500\n", &["--load-timeout-ms", "1000"]);
    assert_eq!(pending["loading"], "Page 1 / 2");
    assert!(pending["image_src"].is_null());
    assert_eq!(pending["pending_timers"], 1);

    let resolved = fixture.replay(&payload, "wait 1000\n", &["--load-timeout-ms", "1000"]);
    assert!(resolved["loading"].is_null());
    assert_eq!(resolved["image_src"], "https://img.test/0.jpg");
    assert_eq!(resolved["pending_timers"], 0);
}

#[test]
fn ctrl_wheel_zooms_around_cursor() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(2);

    let value = fixture.replay(&payload, "wheel 600 450 -1 ctrl\n", &[]);

    assert!((number(&value["zoom"]) - 1.15).abs() < 1e-9);
    assert!((number(&value["pan"][0]) + 15.0).abs() < 1e-9);
    assert!((number(&value["pan"][1]) + 7.5).abs() < 1e-9);
    assert_eq!(value["cursor"], "grab");

    let reset = fixture.replay(&payload, "wheel 600 450 -1 ctrl\nkey Escape\n", &[]);
    assert_eq!(number(&reset["zoom"]), 1.0);
    assert_eq!(reset["cursor"], "pointer");
}

#[test]
fn toggles_persist_and_restore_next_session() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(3);

    let script = "fit-width on\nlock-zoom on\ncontinuous on\nsidebar\n";
    let first = fixture.replay(&payload, script, &[]);
    assert_eq!(first["mode"], "continuous");
    assert_eq!(first["lock_zoom"], true);
    assert_eq!(first["fit_width"], false);
    assert_eq!(first["sidebar_glyph"], "←");
    assert_eq!(first["preference_writes"], 4);

    let stored = fixture.stored_preferences();
    assert_eq!(
        stored,
        json!({ "continuous": true, "fitWidth": false, "lockZoom": true, "sidebarCollapsed": true })
    );

    let second = fixture.replay(&payload, "", &[]);
    assert_eq!(second["mode"], "continuous");
    assert_eq!(second["lock_zoom"], true);
    assert_eq!(second["sidebar_collapsed"], true);
    assert_eq!(second["preference_writes"], 0);
}

#[test]
fn prefs_reset_restores_defaults() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(2);
    fixture.replay(&payload, "continuous on\n", &[]);

    cargo_bin_cmd!("folio")
        .arg("--prefs-dir")
        .arg(fixture.prefs_dir())
        .args(["prefs", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("reset"));

    assert_eq!(fixture.stored_preferences()["continuous"], false);
}

#[test]
fn continuous_scroll_follows_most_visible_page_after_settle() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(4);
    let strip = ["--viewport", "1000x800", "--page-height", "1000"];

    let suppressed = fixture.replay(&payload, "continuous on\nscroll 2100\n", &strip);
    assert_eq!(suppressed["current_page"], 1);

    let script = "continuous off\ncontinuous on\nwait 100\nscroll 2100\n";
    let settled = fixture.replay(&payload, script, &strip);
    assert_eq!(settled["current_page"], 3);
    assert_eq!(number(&settled["strip_scroll"]), 2100.0);

    let jumped = fixture.replay(&payload, "continuous off\ncontinuous on\njump 4\n", &strip);
    assert_eq!(jumped["current_page"], 4);
    assert!(number(&jumped["strip_scroll"]) > 2100.0);
}

#[test]
fn page_list_resize_keeps_minimum_height() {
    let fixture = Fixture::new();
    let payload = fixture.local_pages(2);

    let value = fixture.replay(&payload, "resize-list 200 300 100\n", &[]);

    assert_eq!(number(&value["page_list_height"]), 60.0);
}
