use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn stagehand() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stagehand"));
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Site layout: `site.yaml`, `templates/`, `shared/` and `static/`.
fn make_site() -> (TempDir, PathBuf) {
    let site = TempDir::new().expect("site dir");
    let root = site.path();
    fs::create_dir_all(root.join("templates/blog")).unwrap();
    fs::create_dir_all(root.join("shared")).unwrap();
    fs::create_dir_all(root.join("static")).unwrap();

    fs::write(
        root.join("templates/blog/post.html"),
        "<h1>{{ title }}</h1><a href=\"{{ STATIC_URL }}\">{{ author }}</a>",
    )
    .unwrap();
    fs::write(root.join("shared/greeting.txt"), "Hello, {{ who }}!").unwrap();

    let settings = root.join("site.yaml");
    fs::write(
        &settings,
        "\
template_dirs: [templates, shared]
assets_root: static
assets_url: /assets/
media_url: /media/
static_url: /static/
template_autoescape: true
urls:
  home: /
",
    )
    .unwrap();
    (site, settings)
}

fn write_json(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

#[test]
fn render_flattens_context_layers_in_order() {
    let (site, settings) = make_site();
    let outer = write_json(site.path(), "outer.json", r#"{"title": "Outer", "author": "ann"}"#);
    let inner = write_json(site.path(), "inner.json", r#"{"title": "Inner <3"}"#);

    stagehand()
        .arg("render")
        .arg("blog/post.html")
        .arg("--settings")
        .arg(&settings)
        .arg("-c")
        .arg(&outer)
        .arg("-c")
        .arg(&inner)
        .assert()
        .success()
        .stdout("<h1>Inner &lt;3</h1><a href=\"&#x2F;static&#x2F;\">ann</a>");
}

#[test]
fn render_searches_later_dirs() {
    let (site, settings) = make_site();
    let ctx = write_json(site.path(), "who.json", r#"{"who": "world"}"#);

    stagehand()
        .args(["render", "greeting.txt", "-s"])
        .arg(&settings)
        .arg("--context")
        .arg(&ctx)
        .assert()
        .success()
        .stdout("Hello, world!");
}

#[test]
fn render_missing_template_fails_with_name() {
    let (_site, settings) = make_site();

    stagehand()
        .args(["render", "missing.html", "--settings"])
        .arg(&settings)
        .assert()
        .failure()
        .stderr(contains("could not load 'missing.html'"))
        .stderr(contains("template does not exist: missing.html"));
}

#[test]
fn broken_neighbour_does_not_block_render() {
    let (site, settings) = make_site();
    fs::write(site.path().join("templates/notes.md"), "use {{ like this").unwrap();
    let ctx = write_json(site.path(), "who.json", r#"{"who": "world"}"#);

    stagehand()
        .args(["render", "greeting.txt", "--settings"])
        .arg(&settings)
        .arg("--context")
        .arg(&ctx)
        .assert()
        .success()
        .stdout("Hello, world!");

    stagehand()
        .args(["render", "notes.md", "--settings"])
        .arg(&settings)
        .assert()
        .failure()
        .stderr(contains("could not load 'notes.md'"));
}

#[test]
fn render_rejects_non_object_context() {
    let (site, settings) = make_site();
    let bad = write_json(site.path(), "list.json", "[1, 2]");

    stagehand()
        .args(["render", "greeting.txt", "--settings"])
        .arg(&settings)
        .arg("--context")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("must hold a JSON object"));
}

#[test]
fn debug_flag_reports_render_on_stderr() {
    let (site, settings) = make_site();
    let ctx = write_json(site.path(), "who.json", r#"{"who": "debug"}"#);

    stagehand()
        .args(["render", "greeting.txt", "--debug", "--settings"])
        .arg(&settings)
        .arg("--context")
        .arg(&ctx)
        .assert()
        .success()
        .stdout("Hello, debug!")
        .stderr(contains("[debug] rendered greeting.txt").and(contains("1 context layer(s)")));
}

#[test]
fn list_prints_names_and_paths() {
    let (site, settings) = make_site();

    stagehand()
        .args(["list", "--settings"])
        .arg(&settings)
        .assert()
        .success()
        .stdout("blog/post.html\ngreeting.txt\n");

    let expected = site.path().join("shared").join("greeting.txt");
    stagehand()
        .args(["list", "--paths", "--settings"])
        .arg(&settings)
        .assert()
        .success()
        .stdout(contains(format!("greeting.txt\t{}", expected.display())));
}

#[test]
fn missing_settings_file_is_reported() {
    let dir = TempDir::new().unwrap();

    stagehand()
        .args(["list", "--settings"])
        .arg(dir.path().join("nope.yaml"))
        .assert()
        .failure()
        .stderr(contains("could not load settings"));
}
