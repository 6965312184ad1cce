//! Opcode notation table
//!
//! Maps opcodes to scratchblocks-style templates. `{NAME}` placeholders are
//! filled from the block's input or field of that name.

/// Branch inputs of C-shaped blocks, in render order
#[must_use]
pub(crate) fn branches(opcode: &str) -> &'static [&'static str] {
    match opcode {
        "control_repeat"
        | "control_forever"
        | "control_if"
        | "control_repeat_until"
        | "control_while"
        | "control_for_each"
        | "control_all_at_once" => &["SUBSTACK"],
        "control_if_else" => &["SUBSTACK", "SUBSTACK2"],
        _ => &[],
    }
}

/// Check if a reporter opcode yields a boolean
#[must_use]
pub(crate) fn is_boolean(opcode: &str) -> bool {
    matches!(
        opcode,
        "operator_gt"
            | "operator_lt"
            | "operator_equals"
            | "operator_and"
            | "operator_or"
            | "operator_not"
            | "operator_contains"
            | "sensing_touchingobject"
            | "sensing_touchingcolor"
            | "sensing_coloristouchingcolor"
            | "sensing_keypressed"
            | "sensing_mousedown"
            | "data_listcontainsitem"
            | "argument_reporter_boolean"
    )
}

/// Check if an input slot expects a boolean
#[must_use]
pub(crate) fn is_boolean_slot(opcode: &str, input: &str) -> bool {
    input == "CONDITION"
        || (matches!(opcode, "operator_and" | "operator_or" | "operator_not")
            && input.starts_with("OPERAND"))
}

/// Readable label for special menu values
#[must_use]
pub(crate) fn menu_label(value: &str) -> &str {
    match value {
        "_random_" => "random position",
        "_mouse_" => "mouse-pointer",
        "_edge_" => "edge",
        "_myself_" => "myself",
        "_stage_" => "Stage",
        other => other,
    }
}

/// Template for an opcode
#[must_use]
pub(crate) fn template(opcode: &str) -> Option<&'static str> {
    let text = match opcode {
        // Motion
        "motion_movesteps" => "move {STEPS} steps",
        "motion_turnright" => "turn right {DEGREES} degrees",
        "motion_turnleft" => "turn left {DEGREES} degrees",
        "motion_goto" => "go to {TO}",
        "motion_gotoxy" => "go to x: {X} y: {Y}",
        "motion_glideto" => "glide {SECS} secs to {TO}",
        "motion_glidesecstoxy" => "glide {SECS} secs to x: {X} y: {Y}",
        "motion_pointindirection" => "point in direction {DIRECTION}",
        "motion_pointtowards" => "point towards {TOWARDS}",
        "motion_changexby" => "change x by {DX}",
        "motion_setx" => "set x to {X}",
        "motion_changeyby" => "change y by {DY}",
        "motion_sety" => "set y to {Y}",
        "motion_ifonedgebounce" => "if on edge, bounce",
        "motion_setrotationstyle" => "set rotation style {STYLE}",
        "motion_xposition" => "x position",
        "motion_yposition" => "y position",
        "motion_direction" => "direction",

        // Looks
        "looks_sayforsecs" => "say {MESSAGE} for {SECS} seconds",
        "looks_say" => "say {MESSAGE}",
        "looks_thinkforsecs" => "think {MESSAGE} for {SECS} seconds",
        "looks_think" => "think {MESSAGE}",
        "looks_switchcostumeto" => "switch costume to {COSTUME}",
        "looks_nextcostume" => "next costume",
        "looks_switchbackdropto" => "switch backdrop to {BACKDROP}",
        "looks_switchbackdroptoandwait" => "switch backdrop to {BACKDROP} and wait",
        "looks_nextbackdrop" => "next backdrop",
        "looks_changesizeby" => "change size by {CHANGE}",
        "looks_setsizeto" => "set size to {SIZE} %",
        "looks_changeeffectby" => "change {EFFECT} effect by {CHANGE}",
        "looks_seteffectto" => "set {EFFECT} effect to {VALUE}",
        "looks_cleargraphiceffects" => "clear graphic effects",
        "looks_show" => "show",
        "looks_hide" => "hide",
        "looks_gotofrontback" => "go to {FRONT_BACK} layer",
        "looks_goforwardbackwardlayers" => "go {FORWARD_BACKWARD} {NUM} layers",
        "looks_costumenumbername" => "costume {NUMBER_NAME}",
        "looks_backdropnumbername" => "backdrop {NUMBER_NAME}",
        "looks_size" => "size",

        // Sound
        "sound_playuntildone" => "play sound {SOUND_MENU} until done",
        "sound_play" => "start sound {SOUND_MENU}",
        "sound_stopallsounds" => "stop all sounds",
        "sound_changeeffectby" => "change {EFFECT} effect by {VALUE}",
        "sound_seteffectto" => "set {EFFECT} effect to {VALUE}",
        "sound_cleareffects" => "clear sound effects",
        "sound_changevolumeby" => "change volume by {VOLUME}",
        "sound_setvolumeto" => "set volume to {VOLUME} %",
        "sound_volume" => "volume",

        // Events
        "event_whenflagclicked" => "when flag clicked",
        "event_whenkeypressed" => "when {KEY_OPTION} key pressed",
        "event_whenthisspriteclicked" => "when this sprite clicked",
        "event_whenstageclicked" => "when stage clicked",
        "event_whenbackdropswitchesto" => "when backdrop switches to {BACKDROP}",
        "event_whengreaterthan" => "when {WHENGREATERTHANMENU} > {VALUE}",
        "event_whenbroadcastreceived" => "when I receive {BROADCAST_OPTION}",
        "event_broadcast" => "broadcast {BROADCAST_INPUT}",
        "event_broadcastandwait" => "broadcast {BROADCAST_INPUT} and wait",

        // Control
        "control_wait" => "wait {DURATION} seconds",
        "control_repeat" => "repeat {TIMES}",
        "control_forever" => "forever",
        "control_if" | "control_if_else" => "if {CONDITION} then",
        "control_wait_until" => "wait until {CONDITION}",
        "control_repeat_until" => "repeat until {CONDITION}",
        "control_while" => "while {CONDITION}",
        "control_for_each" => "for each {VARIABLE} in {VALUE}",
        "control_all_at_once" => "all at once",
        "control_stop" => "stop {STOP_OPTION}",
        "control_start_as_clone" => "when I start as a clone",
        "control_create_clone_of" => "create clone of {CLONE_OPTION}",
        "control_delete_this_clone" => "delete this clone",

        // Sensing
        "sensing_touchingobject" => "touching {TOUCHINGOBJECTMENU}?",
        "sensing_touchingcolor" => "touching {COLOR}?",
        "sensing_coloristouchingcolor" => "color {COLOR} is touching {COLOR2}?",
        "sensing_distanceto" => "distance to {DISTANCETOMENU}",
        "sensing_askandwait" => "ask {QUESTION} and wait",
        "sensing_answer" => "answer",
        "sensing_keypressed" => "key {KEY_OPTION} pressed?",
        "sensing_mousedown" => "mouse down?",
        "sensing_mousex" => "mouse x",
        "sensing_mousey" => "mouse y",
        "sensing_setdragmode" => "set drag mode {DRAG_MODE}",
        "sensing_loudness" => "loudness",
        "sensing_timer" => "timer",
        "sensing_resettimer" => "reset timer",
        "sensing_of" => "{PROPERTY} of {OBJECT}",
        "sensing_current" => "current {CURRENTMENU}",
        "sensing_dayssince2000" => "days since 2000",
        "sensing_username" => "username",

        // Operators
        "operator_add" => "{NUM1} + {NUM2}",
        "operator_subtract" => "{NUM1} - {NUM2}",
        "operator_multiply" => "{NUM1} * {NUM2}",
        "operator_divide" => "{NUM1} / {NUM2}",
        "operator_random" => "pick random {FROM} to {TO}",
        "operator_gt" => "{OPERAND1} > {OPERAND2}",
        "operator_lt" => "{OPERAND1} < {OPERAND2}",
        "operator_equals" => "{OPERAND1} = {OPERAND2}",
        "operator_and" => "{OPERAND1} and {OPERAND2}",
        "operator_or" => "{OPERAND1} or {OPERAND2}",
        "operator_not" => "not {OPERAND}",
        "operator_join" => "join {STRING1} {STRING2}",
        "operator_letter_of" => "letter {LETTER} of {STRING}",
        "operator_length" => "length of {STRING}",
        "operator_contains" => "{STRING1} contains {STRING2}?",
        "operator_mod" => "{NUM1} mod {NUM2}",
        "operator_round" => "round {NUM}",
        "operator_mathop" => "{OPERATOR} of {NUM}",

        // Variables and lists
        "data_setvariableto" => "set {VARIABLE} to {VALUE}",
        "data_changevariableby" => "change {VARIABLE} by {VALUE}",
        "data_showvariable" => "show variable {VARIABLE}",
        "data_hidevariable" => "hide variable {VARIABLE}",
        "data_addtolist" => "add {ITEM} to {LIST}",
        "data_deleteoflist" => "delete {INDEX} of {LIST}",
        "data_deletealloflist" => "delete all of {LIST}",
        "data_insertatlist" => "insert {ITEM} at {INDEX} of {LIST}",
        "data_replaceitemoflist" => "replace item {INDEX} of {LIST} with {ITEM}",
        "data_itemoflist" => "item {INDEX} of {LIST}",
        "data_itemnumoflist" => "item # of {ITEM} in {LIST}",
        "data_lengthoflist" => "length of {LIST}",
        "data_listcontainsitem" => "{LIST} contains {ITEM}?",
        "data_showlist" => "show list {LIST}",
        "data_hidelist" => "hide list {LIST}",

        // Pen
        "pen_clear" => "erase all",
        "pen_stamp" => "stamp",
        "pen_penDown" => "pen down",
        "pen_penUp" => "pen up",
        "pen_setPenColorToColor" => "set pen color to {COLOR}",
        "pen_changePenColorParamBy" => "change pen {COLOR_PARAM} by {VALUE}",
        "pen_setPenColorParamTo" => "set pen {COLOR_PARAM} to {VALUE}",
        "pen_changePenSizeBy" => "change pen size by {SIZE}",
        "pen_setPenSizeTo" => "set pen size to {SIZE}",

        // Music
        "music_playDrumForBeats" => "play drum {DRUM} for {BEATS} beats",
        "music_restForBeats" => "rest for {BEATS} beats",
        "music_playNoteForBeats" => "play note {NOTE} for {BEATS} beats",
        "music_setInstrument" => "set instrument to {INSTRUMENT}",
        "music_setTempo" => "set tempo to {TEMPO}",
        "music_changeTempo" => "change tempo by {TEMPO}",
        "music_getTempo" => "tempo",

        _ => return None,
    };
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn if_else_has_two_branches() {
        assert_eq!(branches("control_if_else"), &["SUBSTACK", "SUBSTACK2"]);
        assert!(branches("motion_movesteps").is_empty());
    }

    #[test]
    fn every_c_block_has_a_template() {
        for opcode in [
            "control_repeat",
            "control_forever",
            "control_if",
            "control_if_else",
            "control_repeat_until",
            "control_while",
            "control_for_each",
            "control_all_at_once",
        ] {
            assert!(!branches(opcode).is_empty(), "{opcode}");
            assert!(template(opcode).is_some(), "{opcode}");
        }
    }

    #[test]
    fn boolean_slots() {
        assert!(is_boolean_slot("control_if", "CONDITION"));
        assert!(is_boolean_slot("operator_not", "OPERAND"));
        assert!(!is_boolean_slot("operator_equals", "OPERAND1"));
    }

    #[test]
    fn menu_labels() {
        assert_eq!(menu_label("_mouse_"), "mouse-pointer");
        assert_eq!(menu_label("Cat"), "Cat");
    }
}
