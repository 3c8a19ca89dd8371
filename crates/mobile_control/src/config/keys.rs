//! Named Android key codes accepted by `input keyevent`

use phf::phf_map;

pub static KEYCODES: phf::Map<&'static str, u32> = phf_map! {
    "HOME" => 3,
    "BACK" => 4,
    "CALL" => 5,
    "ENDCALL" => 6,
    "VOLUME_UP" => 24,
    "VOLUME_DOWN" => 25,
    "POWER" => 26,
    "CAMERA" => 27,
    "ENTER" => 66,
    "DEL" => 67,
    "MENU" => 82,
    "SEARCH" => 84,
    "MEDIA_PLAY_PAUSE" => 85,
    "MUTE" => 91,
    "APP_SWITCH" => 187,
    "SLEEP" => 223,
    "WAKEUP" => 224,
};

/// Look up a key code by name, accepting an optional `KEYCODE_` prefix in any case
pub fn keycode_for(name: &str) -> Option<u32> {
    let upper = name.trim().to_uppercase();
    let bare = upper.strip_prefix("KEYCODE_").unwrap_or(&upper);
    KEYCODES.get(bare).copied()
}

/// Get a list of all named keys
pub fn list_key_names() -> Vec<&'static str> {
    let mut names: Vec<_> = KEYCODES.keys().copied().collect();
    names.sort_unstable();
    names
}
