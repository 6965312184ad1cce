use guide_project::blocks::BlockArena;
use guide_project::hats::is_hat_opcode;
use guide_project::{AssetCatalog, AssetRef, ProjectBuilder, RenderOptions, ScriptRenderer, Target};
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

const OPCODES: &[&str] = &[
    "event_whenflagclicked",
    "procedures_definition",
    "control_start_as_clone",
    "control_forever",
    "control_if_else",
    "control_repeat",
    "motion_movesteps",
    "looks_say",
    "operator_add",
    "procedures_call",
    "mystery_opcode",
];

fn block_strategy(size: usize) -> impl Strategy<Value = Value> {
    (
        proptest::sample::select(OPCODES),
        proptest::option::of(0..size),
        any::<bool>(),
        proptest::option::of(0..size),
        proptest::option::of(0..size),
        proptest::option::of("[a-z0-9 ]{0,6}"),
    )
        .prop_map(|(opcode, next, top_level, sub, sub2, literal)| {
            let mut inputs = Map::new();
            if let Some(sub) = sub {
                inputs.insert("SUBSTACK".into(), json!([2, format!("b{sub}")]));
            }
            if let Some(sub2) = sub2 {
                inputs.insert("CONDITION".into(), json!([2, format!("b{sub2}")]));
            }
            if let Some(text) = literal {
                inputs.insert("MESSAGE".into(), json!([1, [10, text]]));
            }
            json!({
                "opcode": opcode,
                "next": next.map(|n| format!("b{n}")),
                "topLevel": top_level,
                "inputs": inputs,
                "fields": {}
            })
        })
}

fn blocks_strategy() -> impl Strategy<Value = Value> {
    (1usize..12).prop_flat_map(|size| {
        proptest::collection::vec(block_strategy(size), size).prop_map(|blocks| {
            let map: Map<String, Value> = blocks
                .into_iter()
                .enumerate()
                .map(|(i, b)| (format!("b{i}"), b))
                .collect();
            Value::Object(map)
        })
    })
}

fn expected_hats(blocks: &Value) -> usize {
    blocks
        .as_object()
        .unwrap()
        .values()
        .filter(|b| {
            b["topLevel"] == true
                && !b["next"].is_null()
                && is_hat_opcode(b["opcode"].as_str().unwrap())
        })
        .count()
}

fn asset_strategy() -> impl Strategy<Value = AssetRef> {
    ("[a-c]{1,2}", prop_oneof![Just("svg"), Just("png"), Just("wav")])
        .prop_map(|(stem, ext)| AssetRef::from_md5ext(format!("{stem}.{ext}")))
}

fn target_strategy() -> impl Strategy<Value = Target> {
    (
        "[A-Z][a-z]{0,4}",
        proptest::collection::vec(asset_strategy(), 0..4),
        proptest::collection::vec(asset_strategy(), 0..3),
    )
        .prop_map(|(name, costumes, sounds)| {
            let mut target = Target::new(name, false);
            target.costumes = costumes;
            target.sounds = sounds;
            target
        })
}

proptest! {
    #[test]
    fn prop_renderer_is_total(blocks in blocks_strategy()) {
        let arena = BlockArena::from_value(Some(&blocks));
        let options = RenderOptions::default();
        let renderer = ScriptRenderer::new(&arena, &options);

        for (id, _) in arena.iter() {
            let _ = renderer.render(id);
        }
        let scripts = renderer.render_all();
        prop_assert!(scripts.iter().all(|s| !s.is_empty()));
    }

    #[test]
    fn prop_script_count_matches_hat_count(blocks in blocks_strategy()) {
        let expected = expected_hats(&blocks);
        let project = ProjectBuilder::new()
            .build(&json!({ "targets": [{ "name": "Sprite1", "blocks": blocks }] }))
            .unwrap();
        prop_assert_eq!(project.sprites[0].scripts.len(), expected);
    }

    #[test]
    fn prop_catalog_is_idempotent(targets in proptest::collection::vec(target_strategy(), 0..5)) {
        let first = AssetCatalog::build(&targets);
        let second = AssetCatalog::build(&targets);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn prop_catalog_keys_are_unique_and_complete(
        targets in proptest::collection::vec(target_strategy(), 0..5),
    ) {
        let catalog = AssetCatalog::build(&targets);

        let mut seen = HashSet::new();
        for entry in &catalog {
            prop_assert!(seen.insert(entry.md5ext.clone()));
        }

        let all: HashSet<_> = targets
            .iter()
            .flat_map(|t| t.costumes.iter().chain(t.sounds.iter()))
            .map(|a| a.md5ext.clone())
            .collect();
        prop_assert_eq!(seen, all);
    }
}
