//! Command tests against archives written to temporary directories

use guide_archive::Archive;
use guide_cli::commands;
use guide_core::GuideConfig;
use guide_test_utils::{cat_project, FailingModel, FixedModel, CAT_TUTORIAL};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_cat(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, cat_project().build()).unwrap();
    path
}

fn text(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap()
}

#[tokio::test]
async fn test_inspect_prints_scripts_and_assets() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let mut out = Vec::new();

    commands::inspect(&file, false, None, &mut out).await.unwrap();

    let text = text(out);
    assert!(text.contains("Project: cat"));
    assert!(text.contains("== Cat (sprite) =="));
    assert!(text.contains("when flag clicked\nmove (10) steps"));
    assert!(text.contains("abc123.svg"));
    assert!(text.contains("meow01.wav"));
}

#[tokio::test]
async fn test_inspect_json_uses_wire_names() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let mut out = Vec::new();

    commands::inspect(&file, true, None, &mut out).await.unwrap();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["name"], "cat");
    assert_eq!(json["catalog"].as_array().unwrap().len(), 2);
    assert_eq!(json["catalog"][0]["type"], "image");
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_non_sb3_input_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.zip");

    let err = commands::inspect(&file, false, None, &mut Vec::new()).await.unwrap_err();
    assert!(err.to_string().contains("not a .sb3 file"));
}

#[tokio::test]
async fn test_tutorial_writes_validated_json() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let out_path = dir.path().join("tutorial.json");

    commands::tutorial(
        &file,
        GuideConfig::default(),
        FixedModel::shared(CAT_TUTORIAL),
        Some(&out_path),
        true,
        &mut Vec::new(),
    )
    .await
    .unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(json["steps"][0]["target"]["targetName"], "Cat");
    assert_eq!(json["steps"][0]["target"]["targetType"], "sprite");
}

#[tokio::test]
async fn test_tutorial_to_stdout() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let mut out = Vec::new();

    commands::tutorial(
        &file,
        GuideConfig::default(),
        FixedModel::shared(CAT_TUTORIAL),
        None,
        false,
        &mut out,
    )
    .await
    .unwrap();

    let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(json["steps"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tutorial_fails_when_model_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let mut out = Vec::new();

    let err = commands::tutorial(
        &file,
        GuideConfig::default(),
        Arc::new(FailingModel::new(500)),
        None,
        false,
        &mut out,
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("tutorial synthesis failed"));
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_extract_writes_single_asset() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let out_path = dir.path().join("meow.wav");

    commands::extract(&file, "meow01.wav", &out_path).await.unwrap();

    assert_eq!(std::fs::read(&out_path).unwrap(), b"RIFF....WAVEfmt ");
}

#[tokio::test]
async fn test_extract_unknown_asset_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let out_path = dir.path().join("nothing.png");

    assert!(commands::extract(&file, "nothing.png", &out_path).await.is_err());
    assert!(!out_path.exists());
}

#[tokio::test]
async fn test_extract_all_writes_package() {
    let dir = TempDir::new().unwrap();
    let file = write_cat(&dir, "cat.sb3");
    let out_path = dir.path().join("assets.zip");

    commands::extract_all(&file, &out_path).await.unwrap();

    let package = Archive::open(std::fs::read(&out_path).unwrap()).unwrap();
    assert_eq!(package.entry_names(), vec!["Meow.wav", "backdrop1.svg"]);
}

#[tokio::test]
async fn test_validate_accepts_good_response() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "response.json", CAT_TUTORIAL);
    let mut out = Vec::new();

    commands::validate(&path, &mut out).await.unwrap();

    assert_eq!(text(out), "valid tutorial with 1 steps\n");
}

#[tokio::test]
async fn test_validate_lists_violations() {
    let dir = TempDir::new().unwrap();
    let path = write_text(dir.path(), "response.json", r#"{"description": "x", "steps": []}"#);
    let mut out = Vec::new();

    let err = commands::validate(&path, &mut out).await.unwrap_err();

    assert!(err.to_string().contains("does not match the tutorial schema"));
    assert!(text(out).starts_with("/steps: "));
}

fn write_text(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
