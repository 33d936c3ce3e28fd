use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn sketchbook(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sketchbook"))
        .env("SKETCHBOOK_CONFIG_DIR", config_dir)
        .env_remove("SKETCHBOOK_CONFIG")
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .expect("failed to run sketchbook")
}

#[test]
fn list_shows_builtin_sketches() {
    let root = TempDir::new().unwrap();
    let output = sketchbook(root.path(), &["list"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for id in ["default", "dawn-1", "flare-1", "mesh-1", "genuary-1", "genuary-30"] {
        assert!(stdout.contains(id), "missing {id} in:\n{stdout}");
    }
}

#[test]
fn list_json_is_parseable() {
    let root = TempDir::new().unwrap();
    let output = sketchbook(root.path(), &["list", "--json"]);
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(6));
    assert_eq!(rows[1]["id"], "dawn-1");
}

#[test]
fn render_writes_png_of_requested_size() {
    let root = TempDir::new().unwrap();
    let png = root.path().join("frames/dawn.png");

    let output = sketchbook(
        root.path(),
        &[
            "render",
            "dawn-1",
            "--output",
            png.to_str().unwrap(),
            "--size",
            "12x8",
            "--time",
            "1.5s",
            "--post",
            "vignette",
        ],
    );
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let image = image::open(&png).unwrap();
    assert_eq!((image.width(), image.height()), (12, 8));
}

#[test]
fn render_uses_config_file_defaults() {
    let root = TempDir::new().unwrap();
    fs::write(
        root.path().join("sketchbook.toml"),
        r#"
version = 1

[defaults]
sketch = "genuary-1"
size = "6x4"
"#,
    )
    .unwrap();
    let png = root.path().join("out.png");

    let output = sketchbook(root.path(), &["render", "-o", png.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let image = image::open(&png).unwrap();
    assert_eq!((image.width(), image.height()), (6, 4));
}

#[test]
fn invalid_config_fails() {
    let root = TempDir::new().unwrap();
    let config = root.path().join("broken.toml");
    fs::write(&config, "version = 7").unwrap();

    let output = sketchbook(
        root.path(),
        &["--config", config.to_str().unwrap(), "wgsl", "dawn-1"],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported config version"), "{stderr}");
}

#[test]
fn wgsl_prints_entry_points() {
    let root = TempDir::new().unwrap();
    let output = sketchbook(root.path(), &["wgsl", "genuary-1"]);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("fn vs_main"));
    assert!(stdout.contains("fn fs_main"));
}

#[test]
fn graph_dump_is_json() {
    let root = TempDir::new().unwrap();
    let output = sketchbook(root.path(), &["graph", "default"]);
    assert!(output.status.success());

    let dump: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(dump["nodes"].as_array().is_some_and(|nodes| !nodes.is_empty()));
}

#[test]
fn unknown_sketch_renders_nothing() {
    let root = TempDir::new().unwrap();
    let png = root.path().join("none.png");

    let output = sketchbook(
        root.path(),
        &["render", "sunset-9", "--output", png.to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(!png.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown sketch"), "{stderr}");
}

#[test]
fn random_pick_is_reproducible() {
    let root = TempDir::new().unwrap();
    let first = sketchbook(root.path(), &["random", "--seed", "42"]);
    let second = sketchbook(root.path(), &["random", "--seed", "42"]);
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
    assert!(!first.stdout.is_empty());
}
