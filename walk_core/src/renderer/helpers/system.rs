// The controller doesn't talk to SDL2 (or a browser) directly: hosts translate
// their native events into this subset of system abstractions.

use keycode::{KeyMap, KeyMappingId, KeyModifiers};

use crate::navigation::MoveDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemMouseButton {
    Left,
    Middle,
    Right,
}

pub type SystemKeycode = KeyMappingId;
pub type SystemMod = KeyModifiers;

/// Identifies one finger for the lifetime of a touch.
pub type TouchId = u64;

#[allow(clippy::result_unit_err)]
pub fn parse_keymap_from_usb(scancode: u16) -> Result<KeyMap, ()> {
    // Override the non-USB keys, which are broken in this crate.
    //
    // Reference:
    // https://chromium.googlesource.com/chromium/src/+/dff16958029d9a8fb9004351f72e961ed4143e83/ui/events/keycodes/dom/keycode_converter_data.inc
    // https://github.com/dfrankland/keycode/issues/12
    let id = match scancode {
        0x0010 => KeyMappingId::UsM,
        0x0011 => KeyMappingId::UsN,
        0x0012 => KeyMappingId::UsO,
        0x0013 => KeyMappingId::UsP,
        0x0014 => KeyMappingId::UsQ,
        0x0015 => KeyMappingId::UsR,
        0x0016 => KeyMappingId::UsS,
        _ => return KeyMap::from_key_mapping(keycode::KeyMapping::Usb(scancode)),
    };

    Ok(KeyMap::from(id))
}

/// Pointer and touch coordinates are physical pixels from the top-left of
/// the surface.
pub enum SystemEvent {
    KeyDown {
        keycode: SystemKeycode,
        mods: SystemMod,
    },
    KeyUp {
        keycode: SystemKeycode,
        mods: SystemMod,
    },
    MouseMotion {
        x: f32,
        y: f32,
    },
    MouseButtonDown {
        mouse_btn: SystemMouseButton,
        x: f32,
        y: f32,
    },
    MouseButtonUp {
        mouse_btn: SystemMouseButton,
    },
    TouchStart {
        id: TouchId,
        x: f32,
        y: f32,
    },
    TouchMove {
        id: TouchId,
        x: f32,
        y: f32,
    },
    TouchEnd {
        id: TouchId,
    },
    /// A host-drawn arrow button was pressed or released.
    JoystickButton {
        direction: MoveDirection,
        pressed: bool,
    },
    /// The window (or page) lost keyboard focus.
    FocusLost,
    /// The host's display mode changed, whoever asked for it.
    FullscreenChanged {
        fullscreen: bool,
    },
    SizeChanged {
        width: u32,
        height: u32,
    },
}

impl SystemEvent {
    /// Which input listener an event is routed through. Fullscreen changes
    /// report host state rather than input, so they have none.
    pub fn kind(&self) -> Option<SystemEventKind> {
        Some(match self {
            SystemEvent::KeyDown { .. } | SystemEvent::KeyUp { .. } | SystemEvent::FocusLost => {
                SystemEventKind::Keyboard
            }
            SystemEvent::MouseMotion { .. }
            | SystemEvent::MouseButtonDown { .. }
            | SystemEvent::MouseButtonUp { .. } => SystemEventKind::Pointer,
            SystemEvent::TouchStart { .. }
            | SystemEvent::TouchMove { .. }
            | SystemEvent::TouchEnd { .. }
            | SystemEvent::JoystickButton { .. } => SystemEventKind::Touch,
            SystemEvent::SizeChanged { .. } => SystemEventKind::Resize,
            SystemEvent::FullscreenChanged { .. } => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemEventKind {
    Keyboard,
    Pointer,
    Touch,
    Resize,
}

impl SystemEventKind {
    pub const ALL: [SystemEventKind; 4] = [
        SystemEventKind::Keyboard,
        SystemEventKind::Pointer,
        SystemEventKind::Touch,
        SystemEventKind::Resize,
    ];
}
