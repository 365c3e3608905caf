// ABOUTME: End-to-end tests for the compendium binary against a local mock wiki.
// ABOUTME: Runs the stages in sequence on a temp root and checks files, stdout and request counts.

use std::path::Path;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn demo_page(image_base: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<div class="mw-parser-output">
<h2><span class="mw-headline">List of Boons</span></h2>
<table class="boonTableSB">
<tbody>
<tr><th>Boon</th><th>Description</th><th>Rarity</th><th>Notes</th><th>Prerequisites</th></tr>
<tr>
<td class="boonTableName"><img alt="Alpha Strike I" src="data:image/gif;base64,R0lGODlhAQABAIABAAAAAP" data-src="{base}/images/alpha.png?cb=7"><br><b>Alpha Strike</b></td>
<td>Your <b>Attack</b> deals more damage.</td>
<td>Common</td>
<td>Tier 1 Attack boon.</td>
<td>None</td>
</tr>
<tr><td colspan="5">Special boons</td></tr>
<tr>
<td class="boonTableName"><img alt="Beta's Ward I" src="{base}/images/beta.png"><br><b>Beta's Ward</b></td>
<td>Gain a shield.</td>
<td>Duo</td>
<td>Tier 2 Defense boon.</td>
<td>One of: <b>Alpha Strike</b></td>
</tr>
</tbody>
</table>
</div>
</body></html>"#,
        base = image_base
    )
}

fn compendium(root: &Path, server: &MockServer) -> Command {
    let mut cmd = Command::cargo_bin("compendium").unwrap();
    cmd.env_remove("RUST_LOG")
        .arg("--root")
        .arg(root)
        .arg("--sources")
        .arg("Demo")
        .arg("--url-template")
        .arg(format!("{}/wiki/{{name}}/Boons", server.base_url()));
    cmd
}

#[test]
fn test_help_lists_stages() {
    Command::cargo_bin("compendium")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed"))
        .stdout(predicate::str::contains("normalize-icons"));
}

#[test]
fn test_stages_end_to_end() {
    let server = MockServer::start();
    let page = server.mock(|when, then| {
        when.method(GET).path("/wiki/Demo/Boons");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(demo_page(&server.base_url()));
    });
    let alpha = server.mock(|when, then| {
        when.method(GET).path("/images/alpha.png");
        then.status(200)
            .header("content-type", "image/png")
            .body(b"\x89PNG alpha");
    });
    let beta = server.mock(|when, then| {
        when.method(GET).path("/images/beta.png");
        then.status(404);
    });

    let dir = TempDir::new().unwrap();
    let root = dir.path();

    compendium(root, &server)
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch: processed 1, imported 1, skipped 0"));
    page.assert();
    assert!(root.join("boons/Demo.html").is_file());
    assert!(!root.join("boons/Demo-full.html").exists());

    compendium(root, &server)
        .arg("seed")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed: processed 2, imported 2, skipped 0"));

    compendium(root, &server)
        .arg("images")
        .assert()
        .success()
        .stdout(predicate::str::contains("images: processed 2, imported 1, skipped 1"));
    compendium(root, &server).arg("images").assert().success();
    assert_eq!(alpha.calls(), 1);
    assert_eq!(beta.calls(), 2);
    assert_eq!(
        std::fs::read(root.join("public/images/icons/demo_alpha_strike_i.png")).unwrap(),
        b"\x89PNG alpha"
    );

    compendium(root, &server).arg("export").assert().success();
    let json = std::fs::read_to_string(root.join("public/data/boons.json")).unwrap();
    let rows: serde_json::Value = serde_json::from_str(&json).unwrap();
    let slugs: Vec<&str> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["alpha_strike", "betas_ward"]);
    assert_eq!(rows[0]["id"], 1);
    assert!(rows[0]["boon_html"]
        .as_str()
        .unwrap()
        .contains(r#"<img src="/images/icons/demo_alpha_strike_i.png" alt="Alpha Strike I">"#));
    assert!(rows[1]["boon_html"]
        .as_str()
        .unwrap()
        .contains("/images/beta.png"));

    compendium(root, &server).arg("combine").assert().success();
    let combined = std::fs::read_to_string(root.join("combined-boons.html")).unwrap();
    assert!(combined.contains("<td>Demo</td>"));
    assert!(combined.find("Alpha Strike").unwrap() < combined.find("Beta's Ward").unwrap());

    compendium(root, &server)
        .args(["query", "shield"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[DEMO] Beta's Ward"))
        .stdout(predicate::str::contains("Prerequisites: One of: Alpha Strike"))
        .stdout(predicate::str::contains("Found 1 boons"))
        .stdout(predicate::str::contains("Alpha Strike\nDescription").not());

    compendium(root, &server)
        .arg("missing")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "[DEMO] Beta's Ward: {}/images/beta.png",
            server.base_url()
        )))
        .stdout(predicate::str::contains("1 of 2 boons have no local image"));
}

#[test]
fn test_page_without_table_is_saved_whole() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Demo/Boons");
        then.status(200).body("<html><body><p>Nothing here.</p></body></html>");
    });
    let dir = TempDir::new().unwrap();

    compendium(dir.path(), &server)
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("fetch: processed 1, imported 0, skipped 1"));
    assert!(dir.path().join("boons/Demo-full.html").is_file());
    assert!(!dir.path().join("boons/Demo.html").exists());
}

#[test]
fn test_normalize_icons_renames_and_repoints() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/wiki/Demo/Boons");
        then.status(200).body(demo_page(&server.base_url()));
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/alpha.png");
        then.status(200).body("png");
    });
    server.mock(|when, then| {
        when.method(GET).path("/images/beta.png");
        then.status(200).body("png");
    });
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    compendium(root, &server).arg("run").assert().success();
    assert!(root.join("public/images/icons/demo_alpha_strike_i.png").is_file());

    compendium(root, &server)
        .arg("normalize-icons")
        .assert()
        .success()
        .stdout(predicate::str::contains("normalize-icons: processed 2, imported 2, skipped 0"));
    assert!(root.join("public/images/icons/demo_alpha_strike_icon.png").is_file());
    assert!(root.join("public/images/icons/demo_betas_ward_icon.png").is_file());
    assert!(!root.join("public/images/icons/demo_alpha_strike_i.png").exists());

    compendium(root, &server).arg("export").assert().success();
    let json = std::fs::read_to_string(root.join("public/data/boons.json")).unwrap();
    assert!(json.contains("/images/icons/demo_alpha_strike_icon.png"));

    compendium(root, &server)
        .arg("missing")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 of 2 boons have no local image"));
}
