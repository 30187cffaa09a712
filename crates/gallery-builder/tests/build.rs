//! End-to-end page builds against temporary asset trees.
#![expect(
    clippy::expect_used,
    reason = "integration tests use expect for concise failure reporting"
)]

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use gallery_builder::{BuildOptions, BuildOutcome, GalleryConfig, run_build};
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct Workspace {
    _tmp: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    fn options(&self, output: &str) -> BuildOptions {
        BuildOptions {
            assets_dir: self.root.join("assets"),
            output: self.root.join(output),
        }
    }

    fn add_image(&self, theme: &str, file: &str) {
        let dir = self.root.join("assets").join(theme);
        fs::create_dir_all(&dir).expect("create theme dir");
        fs::write(dir.join(file), b"png").expect("write image");
    }
}

#[fixture]
fn workspace() -> Workspace {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 temp path");
    Workspace { _tmp: tmp, root }
}

fn fixture_config() -> GalleryConfig {
    let path = Utf8Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/gallery.json");
    GalleryConfig::from_file(&path).expect("fixture config parses")
}

#[rstest]
fn identical_inputs_produce_identical_pages(workspace: Workspace) {
    workspace.add_image("theme2", "night-mode.png");
    workspace.add_image("theme1", "b_layout.jpg");
    workspace.add_image("theme1", "a-layout.png");
    let config = fixture_config();

    let first = run_build(&workspace.options("first.html"), &config).expect("first build");
    let second = run_build(&workspace.options("second.html"), &config).expect("second build");

    let BuildOutcome::Written(report) = first else {
        panic!("expected a written page, got {first:?}");
    };
    assert_eq!(report.themes, 2);
    assert_eq!(report.designs, 3);
    assert!(matches!(second, BuildOutcome::Written(_)));

    let a = fs::read(workspace.root.join("first.html")).expect("read first");
    let b = fs::read(workspace.root.join("second.html")).expect("read second");
    assert_eq!(a, b);

    let page = String::from_utf8(a).expect("utf-8 page");
    let first_theme = page.find("<h2>Theme 1</h2>").expect("theme 1 rendered");
    let second_theme = page.find("<h2>Theme 2</h2>").expect("theme 2 rendered");
    assert!(first_theme < second_theme);
    assert!(page.contains("Dark mode variant with high-contrast typography"));
    let a_pos = page.find("A Layout").expect("a label");
    let b_pos = page.find("B Layout").expect("b label");
    assert!(a_pos < b_pos);
}

#[rstest]
fn missing_assets_directory_writes_nothing(workspace: Workspace) {
    let options = workspace.options("index.html");

    let outcome = run_build(&options, &GalleryConfig::default()).expect("non-fatal");

    assert_eq!(
        outcome,
        BuildOutcome::AssetsMissing {
            path: options.assets_dir.clone()
        }
    );
    assert!(!options.output.exists());
}

#[rstest]
fn themes_without_images_write_nothing(workspace: Workspace) {
    workspace.add_image("theme1", "notes.txt");
    fs::create_dir_all(workspace.root.join("assets/empty")).expect("empty theme");
    let options = workspace.options("index.html");

    let outcome = run_build(&options, &GalleryConfig::default()).expect("non-fatal");

    assert_eq!(outcome, BuildOutcome::NoThemes);
    assert!(!options.output.exists());
}

#[rstest]
fn rebuild_replaces_previous_page(workspace: Workspace) {
    workspace.add_image("theme1", "one.png");
    let options = workspace.options("index.html");
    fs::write(&options.output, "stale").expect("seed stale page");

    run_build(&options, &GalleryConfig::default()).expect("build succeeds");

    let page = fs::read_to_string(&options.output).expect("read page");
    assert!(page.starts_with("<!DOCTYPE html>"));
}

#[rstest]
fn missing_config_file_uses_defaults(workspace: Workspace) {
    let config = GalleryConfig::load_or_default(&workspace.root.join("gallery.json"))
        .expect("defaults apply");

    assert_eq!(config.page_title(), "Design Review Board");
}
