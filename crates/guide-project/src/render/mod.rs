//! Script renderer
//!
//! Walks a block graph from a hat along `next` links, recursing into every
//! branch of C-shaped blocks, and emits scratchblocks-style text.
//!
//! Rendering never fails. Unknown opcodes fall back to their raw token,
//! missing references end the chain they appear in, and a visited set local
//! to each call cuts cycles. Nesting deeper than
//! [`RenderOptions::max_depth`] is elided as `...`.

mod opcodes;

use crate::blocks::{Block, BlockArena, InputValue, Primitive};
use crate::hats::hat_ids;
use std::collections::HashSet;

/// Default limit on combined branch and reporter nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Rendering options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Indentation for one nesting level
    pub indent: String,
    /// Nesting levels rendered before the rest is elided
    pub max_depth: usize,
}

impl RenderOptions {
    /// Set indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set nesting limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent: "  ".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Renders the scripts of one target
#[derive(Debug, Clone, Copy)]
pub struct ScriptRenderer<'a> {
    arena: &'a BlockArena,
    options: &'a RenderOptions,
}

impl<'a> ScriptRenderer<'a> {
    /// Create renderer over a block arena
    #[inline]
    #[must_use]
    pub fn new(arena: &'a BlockArena, options: &'a RenderOptions) -> Self {
        Self { arena, options }
    }

    /// Render every script hat in manifest order
    #[must_use]
    pub fn render_all(&self) -> Vec<String> {
        hat_ids(self.arena)
            .into_iter()
            .map(|id| self.render(id))
            .collect()
    }

    /// Render the chain starting at `hat_id`
    ///
    /// Returns an empty string if the id is unknown.
    #[must_use]
    pub fn render(&self, hat_id: &str) -> String {
        let mut walk = Walk {
            renderer: *self,
            visited: HashSet::new(),
            lines: Vec::new(),
            nesting: 0,
            elided: false,
        };
        walk.stack(Some(hat_id), 0);
        walk.lines.join("\n")
    }
}

/// Transient traversal state for one script
struct Walk<'a> {
    renderer: ScriptRenderer<'a>,
    visited: HashSet<String>,
    lines: Vec<String>,
    nesting: usize,
    elided: bool,
}

impl<'a> Walk<'a> {
    fn arena(&self) -> &'a BlockArena {
        self.renderer.arena
    }

    fn push(&mut self, depth: usize, text: &str) {
        let indent = self.renderer.options.indent.repeat(depth);
        self.lines.push(format!("{indent}{text}"));
    }

    /// Enter one nesting level, or return false once the limit is reached
    fn descend(&mut self) -> bool {
        if self.nesting < self.renderer.options.max_depth {
            self.nesting += 1;
            return true;
        }
        if !self.elided {
            self.elided = true;
            tracing::warn!(
                max_depth = self.renderer.options.max_depth,
                "script nesting too deep, eliding"
            );
        }
        false
    }

    fn ascend(&mut self) {
        self.nesting = self.nesting.saturating_sub(1);
    }

    fn stack(&mut self, start: Option<&str>, depth: usize) {
        let arena = self.arena();
        let mut cursor = start;

        while let Some(id) = cursor {
            if !self.visited.insert(id.to_string()) {
                tracing::debug!(block = id, "cycle in block chain, stopping");
                break;
            }
            let Some(block) = arena.get(id) else {
                tracing::debug!(block = id, "dangling block reference");
                break;
            };

            let line = self.inline(block);
            self.push(depth, &line);

            let branches = branch_inputs(block);
            if !branches.is_empty() {
                for (i, name) in branches.iter().enumerate() {
                    if i > 0 {
                        self.push(depth, "else");
                    }
                    let Some(child) = block.input(name).and_then(|input| input.block_id()) else {
                        continue;
                    };
                    if self.descend() {
                        self.stack(Some(child), depth + 1);
                        self.ascend();
                    } else {
                        self.push(depth + 1, "...");
                    }
                }
                self.push(depth, "end");
            }

            cursor = block.next.as_deref();
        }
    }

    /// Text of a block without its reporter wrapper
    fn inline(&mut self, block: &'a Block) -> String {
        match block.opcode.as_str() {
            "procedures_definition" => return self.definition(block),
            "procedures_call" => return self.call(block),
            "argument_reporter_string_number" | "argument_reporter_boolean" => {
                return block.field("VALUE").unwrap_or_default().to_string();
            }
            "data_variable" => return block.field("VARIABLE").unwrap_or_default().to_string(),
            "data_listcontents" => {
                return format!("{} :: list", block.field("LIST").unwrap_or_default());
            }
            _ => {}
        }

        match opcodes::template(&block.opcode) {
            Some(template) => self.fill(block, template),
            None => self.fallback(block),
        }
    }

    fn fill(&mut self, block: &'a Block, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let after = &rest[start + 1..];
            let Some(end) = after.find('}') else {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            };
            let name = &after[..end];
            out.push_str(&self.slot(block, name));
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        out
    }

    fn fallback(&mut self, block: &'a Block) -> String {
        tracing::warn!(opcode = %block.opcode, "unknown opcode, rendering raw token");

        let mut parts = vec![block.opcode.clone()];
        for name in block.inputs.keys() {
            if name.starts_with("SUBSTACK") {
                continue;
            }
            parts.push(self.slot(block, name));
        }
        for value in block.fields.values() {
            parts.push(format!("[{} v]", opcodes::menu_label(value)));
        }
        parts.join(" ")
    }

    /// Render the input or field called `name`
    fn slot(&mut self, block: &'a Block, name: &str) -> String {
        let boolean = opcodes::is_boolean_slot(&block.opcode, name);
        if let Some(input) = block.input(name) {
            return self.value(input.effective(), boolean);
        }
        if let Some(field) = block.field(name) {
            return format!("[{} v]", opcodes::menu_label(field));
        }
        empty_slot(boolean)
    }

    fn value(&mut self, value: Option<&'a InputValue>, boolean: bool) -> String {
        match value {
            None => empty_slot(boolean),
            Some(InputValue::Primitive(p)) => primitive(p),
            Some(InputValue::Block(id)) => self.reporter(id, boolean),
        }
    }

    fn reporter(&mut self, id: &str, boolean: bool) -> String {
        let arena = self.arena();
        if !self.visited.insert(id.to_string()) {
            return empty_slot(boolean);
        }
        let Some(block) = arena.get(id) else {
            return empty_slot(boolean);
        };

        if let Some(text) = shadow_literal(block) {
            return text;
        }

        let text = if self.descend() {
            let text = self.inline(block);
            self.ascend();
            text
        } else {
            "...".to_string()
        };
        if opcodes::is_boolean(&block.opcode) {
            format!("<{text}>")
        } else {
            format!("({text})")
        }
    }

    fn definition(&mut self, block: &'a Block) -> String {
        let arena = self.arena();
        let prototype = block
            .input("custom_block")
            .and_then(|input| input.block_id())
            .and_then(|id| arena.get(id));
        let Some(mutation) = prototype.and_then(|p| p.mutation.as_ref()) else {
            return "define".to_string();
        };

        let text = fill_proccode(&mutation.proccode, |index, boolean| {
            match mutation.argument_names.get(index) {
                Some(name) if boolean => format!("<{name}>"),
                Some(name) => format!("({name})"),
                None => empty_slot(boolean),
            }
        });
        format!("define {text}").trim_end().to_string()
    }

    fn call(&mut self, block: &'a Block) -> String {
        let Some(mutation) = block.mutation.as_ref() else {
            return block.opcode.clone();
        };

        fill_proccode(&mutation.proccode, |index, boolean| {
            let input = mutation
                .argument_ids
                .get(index)
                .and_then(|arg| block.input(arg));
            match input {
                Some(input) => self.value(input.effective(), boolean),
                None => empty_slot(boolean),
            }
        })
    }
}

/// Branch input names of a C-shaped block
///
/// Known opcodes use the fixed table; anything else contributes its own
/// `SUBSTACK`, `SUBSTACK2`, ... inputs in numeric order.
fn branch_inputs(block: &Block) -> Vec<&str> {
    let known = opcodes::branches(&block.opcode);
    if !known.is_empty() {
        return known.to_vec();
    }

    let mut found: Vec<(u32, &str)> = block
        .inputs
        .keys()
        .filter_map(|name| {
            let suffix = name.strip_prefix("SUBSTACK")?;
            if suffix.is_empty() {
                return Some((1, name.as_str()));
            }
            suffix.parse::<u32>().ok().map(|n| (n, name.as_str()))
        })
        .collect();
    found.sort_unstable();
    found.into_iter().map(|(_, name)| name).collect()
}

fn empty_slot(boolean: bool) -> String {
    let slot = if boolean { "<>" } else { "()" };
    slot.to_string()
}

fn primitive(p: &Primitive) -> String {
    match p {
        Primitive::Number(n) => format!("({n})"),
        Primitive::Color(c) | Primitive::Text(c) => format!("[{c}]"),
        Primitive::Broadcast(b) => format!("[{b} v]"),
        Primitive::Variable(v) => format!("({v})"),
        Primitive::List(l) => format!("({l} :: list)"),
    }
}

/// Literal text of uncompressed shadow blocks and dropdown menus
fn shadow_literal(block: &Block) -> Option<String> {
    let literal = match block.opcode.as_str() {
        "math_number" | "math_positive_number" | "math_whole_number" | "math_integer"
        | "math_angle" => format!("({})", block.field("NUM").unwrap_or_default()),
        "text" => format!("[{}]", block.field("TEXT").unwrap_or_default()),
        "colour_picker" => format!("[{}]", block.field("COLOUR").unwrap_or_default()),
        _ if block.shadow && block.inputs.is_empty() && block.fields.len() == 1 => {
            let value = block.fields.values().next()?;
            format!("[{} v]", opcodes::menu_label(value))
        }
        _ => return None,
    };
    Some(literal)
}

/// Substitute `%s`, `%n`, `%b` placeholders in a custom-block proccode
fn fill_proccode(proccode: &str, mut arg: impl FnMut(usize, bool) -> String) -> String {
    let mut out = String::with_capacity(proccode.len());
    let mut chars = proccode.chars().peekable();
    let mut index = 0;

    while let Some(c) = chars.next() {
        if c == '%' {
            let boolean = match chars.peek() {
                Some('s' | 'n') => Some(false),
                Some('b') => Some(true),
                _ => None,
            };
            if let Some(boolean) = boolean {
                chars.next();
                out.push_str(&arg(index, boolean));
                index += 1;
                continue;
            }
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn render_first(blocks: &Value) -> Vec<String> {
        let arena = BlockArena::from_value(Some(blocks));
        let options = RenderOptions::default();
        ScriptRenderer::new(&arena, &options).render_all()
    }

    #[test]
    fn flag_and_move() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "move", "topLevel": true },
            "move": {
                "opcode": "motion_movesteps",
                "next": null,
                "parent": "hat",
                "topLevel": false,
                "inputs": { "STEPS": [1, [4, "10"]] }
            }
        }));
        assert_eq!(scripts, vec!["when flag clicked\nmove (10) steps"]);
    }

    #[test]
    fn if_else_with_condition_and_branches() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "if", "topLevel": true },
            "if": {
                "opcode": "control_if_else",
                "next": "hide",
                "topLevel": false,
                "inputs": {
                    "CONDITION": [2, "touch"],
                    "SUBSTACK": [2, "say"],
                    "SUBSTACK2": [2, "turn"]
                }
            },
            "touch": {
                "opcode": "sensing_touchingobject",
                "topLevel": false,
                "inputs": { "TOUCHINGOBJECTMENU": [1, "menu"] }
            },
            "menu": {
                "opcode": "sensing_touchingobjectmenu",
                "shadow": true,
                "topLevel": false,
                "fields": { "TOUCHINGOBJECTMENU": ["_edge_", null] }
            },
            "say": {
                "opcode": "looks_say",
                "topLevel": false,
                "inputs": { "MESSAGE": [1, [10, "Ouch"]] }
            },
            "turn": {
                "opcode": "motion_turnright",
                "topLevel": false,
                "inputs": { "DEGREES": [1, [4, "15"]] }
            },
            "hide": { "opcode": "looks_hide", "topLevel": false }
        }));

        let expected = "when flag clicked\n\
                        if <touching [edge v]?> then\n\
                        \x20\x20say [Ouch]\n\
                        else\n\
                        \x20\x20turn right (15) degrees\n\
                        end\n\
                        hide";
        assert_eq!(scripts, vec![expected]);
    }

    #[test]
    fn forever_with_nested_reporter() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenkeypressed", "next": "loop", "topLevel": true,
                     "fields": { "KEY_OPTION": ["space", null] } },
            "loop": {
                "opcode": "control_forever",
                "topLevel": false,
                "inputs": { "SUBSTACK": [2, "change"] }
            },
            "change": {
                "opcode": "data_changevariableby",
                "topLevel": false,
                "inputs": { "VALUE": [3, "add", [4, "1"]] },
                "fields": { "VARIABLE": ["score", "var1"] }
            },
            "add": {
                "opcode": "operator_add",
                "topLevel": false,
                "inputs": { "NUM1": [1, [4, "1"]], "NUM2": [3, [12, "bonus", "var2"], [4, ""]] }
            }
        }));

        assert_eq!(
            scripts,
            vec!["when [space v] key pressed\nforever\n  change [score v] by ((1) + (bonus))\nend"]
        );
    }

    #[test]
    fn custom_block_definition_and_call() {
        let scripts = render_first(&json!({
            "def": {
                "opcode": "procedures_definition",
                "next": "call",
                "topLevel": true,
                "inputs": { "custom_block": [1, "proto"] }
            },
            "proto": {
                "opcode": "procedures_prototype",
                "shadow": true,
                "topLevel": false,
                "mutation": {
                    "proccode": "jump %s if %b",
                    "argumentids": "[\"a1\",\"a2\"]",
                    "argumentnames": "[\"height\",\"ready\"]"
                }
            },
            "call": {
                "opcode": "procedures_call",
                "topLevel": false,
                "inputs": { "a1": [1, [10, "5"]] },
                "mutation": { "proccode": "jump %s if %b", "argumentids": "[\"a1\",\"a2\"]" }
            }
        }));

        assert_eq!(scripts, vec!["define jump (height) if <ready>\njump [5] if <>"]);
    }

    #[test]
    fn unknown_opcode_falls_back_to_token() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "x", "topLevel": true },
            "x": {
                "opcode": "videoSensing_videoToggle",
                "topLevel": false,
                "inputs": { "VIDEO_STATE": [1, "m"] }
            },
            "m": {
                "opcode": "videoSensing_menu_VIDEO_STATE",
                "shadow": true,
                "topLevel": false,
                "fields": { "VIDEO_STATE": ["on", null] }
            }
        }));
        assert_eq!(scripts, vec!["when flag clicked\nvideoSensing_videoToggle [on v]"]);
    }

    #[test]
    fn unknown_c_block_renders_its_body() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "loop", "topLevel": true },
            "loop": {
                "opcode": "ext_loopUntilDone",
                "next": "hide",
                "topLevel": false,
                "inputs": { "SUBSTACK": [2, "body"] }
            },
            "body": { "opcode": "looks_show", "topLevel": false },
            "hide": { "opcode": "looks_hide", "topLevel": false }
        }));
        assert_eq!(scripts, vec!["when flag clicked\next_loopUntilDone\n  show\nend\nhide"]);
    }

    #[test]
    fn unknown_c_block_branches_follow_numeric_order() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "fork", "topLevel": true },
            "fork": {
                "opcode": "ext_fork",
                "topLevel": false,
                "inputs": { "SUBSTACK2": [2, "second"], "SUBSTACK": [2, "first"] }
            },
            "first": { "opcode": "looks_show", "topLevel": false },
            "second": { "opcode": "looks_hide", "topLevel": false }
        }));
        assert_eq!(
            scripts,
            vec!["when flag clicked\next_fork\n  show\nelse\n  hide\nend"]
        );
    }

    #[test]
    fn deep_reporter_nesting_is_elided() {
        const DEPTH: usize = 10_000;
        let mut blocks = serde_json::Map::new();
        blocks.insert(
            "hat".into(),
            json!({ "opcode": "event_whenflagclicked", "next": "say", "topLevel": true }),
        );
        blocks.insert(
            "say".into(),
            json!({
                "opcode": "looks_say",
                "topLevel": false,
                "inputs": { "MESSAGE": [3, "j0", [10, ""]] }
            }),
        );
        for i in 0..DEPTH {
            let first = if i + 1 < DEPTH {
                json!([3, format!("j{}", i + 1), [10, ""]])
            } else {
                json!([1, [10, "innermost"]])
            };
            blocks.insert(
                format!("j{i}"),
                json!({
                    "opcode": "operator_join",
                    "topLevel": false,
                    "inputs": { "STRING1": first, "STRING2": [1, [10, "x"]] }
                }),
            );
        }

        let scripts = render_first(&Value::Object(blocks));
        assert_eq!(scripts.len(), 1);
        let script = &scripts[0];
        assert!(script.starts_with("when flag clicked\nsay (join (join "));
        assert!(script.contains("(...)"));
        assert!(!script.contains("innermost"));
        assert_eq!(script.matches("join").count(), DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn deep_branch_nesting_is_elided() {
        let mut blocks = serde_json::Map::new();
        blocks.insert(
            "hat".into(),
            json!({ "opcode": "event_whenflagclicked", "next": "f0", "topLevel": true }),
        );
        for i in 0..50 {
            blocks.insert(
                format!("f{i}"),
                json!({
                    "opcode": "control_forever",
                    "topLevel": false,
                    "inputs": { "SUBSTACK": [2, format!("f{}", i + 1)] }
                }),
            );
        }
        let arena = BlockArena::from_value(Some(&Value::Object(blocks)));
        let options = RenderOptions::default().with_max_depth(2);
        let script = ScriptRenderer::new(&arena, &options).render("hat");

        let expected = "when flag clicked\n\
                        forever\n\
                        \x20\x20forever\n\
                        \x20\x20\x20\x20forever\n\
                        \x20\x20\x20\x20\x20\x20...\n\
                        \x20\x20\x20\x20end\n\
                        \x20\x20end\n\
                        end";
        assert_eq!(script, expected);
    }

    #[test]
    fn cycle_is_cut() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "a", "topLevel": true },
            "a": { "opcode": "looks_show", "next": "b", "topLevel": false },
            "b": { "opcode": "looks_hide", "next": "a", "topLevel": false }
        }));
        assert_eq!(scripts, vec!["when flag clicked\nshow\nhide"]);
    }

    #[test]
    fn dangling_next_ends_chain() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "gone", "topLevel": true }
        }));
        assert_eq!(scripts, vec!["when flag clicked"]);
    }

    #[test]
    fn orphans_are_not_rendered() {
        let scripts = render_first(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "a", "topLevel": true },
            "a": { "opcode": "looks_show", "topLevel": false },
            "orphan": { "opcode": "looks_hide", "topLevel": true }
        }));
        assert_eq!(scripts, vec!["when flag clicked\nshow"]);
    }

    #[test]
    fn custom_indent() {
        let arena = BlockArena::from_value(Some(&json!({
            "hat": { "opcode": "event_whenflagclicked", "next": "r", "topLevel": true },
            "r": {
                "opcode": "control_repeat",
                "topLevel": false,
                "inputs": { "TIMES": [1, [6, "3"]], "SUBSTACK": [2, "s"] }
            },
            "s": { "opcode": "looks_nextcostume", "topLevel": false }
        })));
        let options = RenderOptions::default().with_indent("\t");
        let script = ScriptRenderer::new(&arena, &options).render("hat");
        assert_eq!(script, "when flag clicked\nrepeat (3)\n\tnext costume\nend");
    }

    #[test]
    fn proccode_placeholders() {
        let filled = fill_proccode("say %s and %n or %b 100%", |i, b| {
            format!("{}{i}", if b { "b" } else { "v" })
        });
        assert_eq!(filled, "say v0 and v1 or b2 100%");
    }
}
