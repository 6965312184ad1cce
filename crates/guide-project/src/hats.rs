//! Hat block detection
//!
//! A hat starts a script. A block counts as a rendered hat only when its
//! opcode is in [`HAT_OPCODES`], it is top-level, and it has a body.

use crate::blocks::{Block, BlockArena};

/// Trigger and definition opcodes that start a script
pub const HAT_OPCODES: &[&str] = &[
    "event_whenflagclicked",
    "event_whenkeypressed",
    "event_whengreaterthan",
    "event_whenthisspriteclicked",
    "event_whenstageclicked",
    "event_whenbackdropswitchesto",
    "event_whenbroadcastreceived",
    "control_start_as_clone",
    "procedures_definition",
    "boost_whenColor",
    "boost_whenTilted",
    "ev3_whenButtonPressed",
    "ev3_whenDistanceLessThan",
    "ev3_whenBrightnessLessThan",
    "gdxfor_whenGesture",
    "gdxfor_whenForcePushedOrPulled",
    "gdxfor_whenTilted",
    "makeymakey_whenMakeyKeyPressed",
    "makeymakey_whenCodePressed",
    "microbit_whenButtonPressed",
    "microbit_whenGesture",
    "microbit_whenTilted",
    "microbit_whenPinConnected",
    "wedo2_whenDistance",
    "wedo2_whenTilted",
];

/// Check if an opcode is a hat opcode
#[inline]
#[must_use]
pub fn is_hat_opcode(opcode: &str) -> bool {
    HAT_OPCODES.contains(&opcode)
}

/// Check if a block starts a renderable script
#[inline]
#[must_use]
pub fn is_script_hat(block: &Block) -> bool {
    block.top_level && block.next.is_some() && is_hat_opcode(&block.opcode)
}

/// Ids of renderable hats, in manifest order
#[must_use]
pub fn hat_ids(arena: &BlockArena) -> Vec<&str> {
    arena
        .iter()
        .filter(|(_, block)| is_script_hat(block))
        .map(|(id, _)| id)
        .collect()
}
