//! Testing utilities for the Scratch Guide workspace
//!
//! In-memory `.sb3` builders and scripted generative models.

#![allow(missing_docs)]

use guide_tutorial::{GenerationRequest, GenerativeModel, ModelError};
use serde_json::{json, Map, Value};
use std::io::{Cursor, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use zip::write::FileOptions;
use zip::ZipWriter;

/// Minimal serialized sprite target
#[derive(Debug, Clone)]
pub struct TargetFixture {
    name: String,
    is_stage: bool,
    costumes: Vec<Value>,
    sounds: Vec<Value>,
    blocks: Map<String, Value>,
}

impl TargetFixture {
    pub fn stage() -> Self {
        Self::new("Stage", true)
    }

    pub fn sprite(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, is_stage: bool) -> Self {
        Self {
            name: name.to_string(),
            is_stage,
            costumes: Vec::new(),
            sounds: Vec::new(),
            blocks: Map::new(),
        }
    }

    pub fn costume(mut self, name: &str, md5ext: &str) -> Self {
        self.costumes.push(asset_json(name, md5ext));
        self
    }

    pub fn sound(mut self, name: &str, md5ext: &str) -> Self {
        self.sounds.push(asset_json(name, md5ext));
        self
    }

    pub fn block(mut self, id: &str, block: Value) -> Self {
        self.blocks.insert(id.to_string(), block);
        self
    }

    /// `when flag clicked` followed by `move (steps) steps`
    pub fn flag_move(self, steps: i64) -> Self {
        self.block(
            "hat",
            json!({
                "opcode": "event_whenflagclicked",
                "next": "move",
                "parent": null,
                "inputs": {},
                "fields": {},
                "topLevel": true,
                "shadow": false
            }),
        )
        .block(
            "move",
            json!({
                "opcode": "motion_movesteps",
                "next": null,
                "parent": "hat",
                "inputs": { "STEPS": [1, [4, steps.to_string()]] },
                "fields": {},
                "topLevel": false,
                "shadow": false
            }),
        )
    }

    pub fn to_json(&self) -> Value {
        json!({
            "isStage": self.is_stage,
            "name": self.name,
            "variables": {},
            "lists": {},
            "broadcasts": {},
            "blocks": self.blocks,
            "comments": {},
            "currentCostume": 0,
            "costumes": self.costumes,
            "sounds": self.sounds,
            "volume": 100,
            "layerOrder": if self.is_stage { 0 } else { 1 }
        })
    }
}

fn asset_json(name: &str, md5ext: &str) -> Value {
    let (asset_id, data_format) = md5ext.rsplit_once('.').unwrap_or((md5ext, ""));
    json!({
        "name": name,
        "assetId": asset_id,
        "md5ext": md5ext,
        "dataFormat": data_format
    })
}

/// In-memory `.sb3` archive builder
#[derive(Debug, Clone, Default)]
pub struct Sb3Builder {
    targets: Vec<TargetFixture>,
    extensions: Vec<String>,
    assets: Vec<(String, Vec<u8>)>,
    manifest: Option<Vec<u8>>,
    omit_manifest: bool,
}

impl Sb3Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(mut self, target: TargetFixture) -> Self {
        self.targets.push(target);
        self
    }

    pub fn extension(mut self, id: &str) -> Self {
        self.extensions.push(id.to_string());
        self
    }

    /// Add an asset entry to the archive
    pub fn asset(mut self, md5ext: &str, bytes: &[u8]) -> Self {
        self.assets.push((md5ext.to_string(), bytes.to_vec()));
        self
    }

    /// Use these bytes verbatim as `project.json`
    pub fn raw_manifest(mut self, bytes: &[u8]) -> Self {
        self.manifest = Some(bytes.to_vec());
        self
    }

    pub fn without_manifest(mut self) -> Self {
        self.omit_manifest = true;
        self
    }

    pub fn manifest_json(&self) -> Value {
        json!({
            "targets": self.targets.iter().map(TargetFixture::to_json).collect::<Vec<_>>(),
            "monitors": [],
            "extensions": self.extensions,
            "meta": { "semver": "3.0.0", "vm": "0.2.0", "agent": "guide-test-utils" }
        })
    }

    pub fn build(&self) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        if !self.omit_manifest {
            let manifest = match &self.manifest {
                Some(raw) => raw.clone(),
                None => serde_json::to_vec(&self.manifest_json()).unwrap(),
            };
            writer.start_file("project.json", options).unwrap();
            writer.write_all(&manifest).unwrap();
        }

        for (name, bytes) in &self.assets {
            writer.start_file(name.as_str(), options).unwrap();
            writer.write_all(bytes).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }
}

/// Stage with one backdrop, and a Cat sprite that moves on green flag
///
/// The Cat's costume shares its image with the backdrop.
pub fn cat_project() -> Sb3Builder {
    Sb3Builder::new()
        .target(TargetFixture::stage().costume("backdrop1", "abc123.svg"))
        .target(
            TargetFixture::sprite("Cat")
                .costume("costume1", "abc123.svg")
                .sound("Meow", "meow01.wav")
                .flag_move(10),
        )
        .asset("abc123.svg", b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>")
        .asset("meow01.wav", b"RIFF....WAVEfmt ")
}

/// Schema-valid model response for [`cat_project`]
pub const CAT_TUTORIAL: &str = r#"{
  "description": "A cat walks across the stage when the green flag is clicked.",
  "sprites": [{ "name": "Cat", "description": "The walking hero" }],
  "steps": [{
    "title": "Make the cat move",
    "target": { "targetType": "sprite", "targetName": "Cat" },
    "code": "when flag clicked\nmove (10) steps",
    "explanation": "The cat moves 10 steps when you click the green flag."
  }],
  "extensions": ["Make the cat meow"]
}"#;

/// Model that always returns the same text and records requests
#[derive(Debug, Default)]
pub struct FixedModel {
    reply: String,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl FixedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            ..Self::default()
        }
    }

    pub fn shared(reply: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(reply))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerativeModel for FixedModel {
    async fn generate(&self, request: GenerationRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        Ok(self.reply.clone())
    }
}

/// Model that always fails with an HTTP status
#[derive(Debug)]
pub struct FailingModel {
    pub status: u16,
    calls: AtomicUsize,
}

impl FailingModel {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GenerativeModel for FailingModel {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ModelError::Status {
            status: self.status,
            body: "scripted failure".to_string(),
        })
    }
}

/// Model that sleeps before replying
#[derive(Debug)]
pub struct DelayedModel {
    pub delay: Duration,
    reply: String,
}

impl DelayedModel {
    pub fn new(delay: Duration, reply: impl Into<String>) -> Self {
        Self {
            delay,
            reply: reply.into(),
        }
    }
}

#[async_trait::async_trait]
impl GenerativeModel for DelayedModel {
    async fn generate(&self, _request: GenerationRequest) -> Result<String, ModelError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.reply.clone())
    }
}
