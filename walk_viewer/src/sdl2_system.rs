// The walkthrough controller doesn't know about SDL2 (so it can be hosted
// elsewhere, e.g. a browser); this turns SDL2 events into its system events.
//
// This tracks system.rs in "walk_core".

use walk_core::renderer::system::{
    parse_keymap_from_usb, SystemEvent, SystemMod, SystemMouseButton, TouchId,
};

use sdl2::{
    event::{Event, WindowEvent},
    mouse::MouseButton,
    video::Window,
};

/// SDL reports mouse events it synthesized from touches with this id. The
/// touches themselves arrive as finger events too.
const TOUCH_MOUSE_ID: u32 = u32::MAX;

pub trait ToSystemMouseButtonExt {
    fn to_system_mouse_button(&self) -> Option<SystemMouseButton>;
}

impl ToSystemMouseButtonExt for MouseButton {
    fn to_system_mouse_button(&self) -> Option<SystemMouseButton> {
        match self {
            MouseButton::Left => Some(SystemMouseButton::Left),
            MouseButton::Middle => Some(SystemMouseButton::Middle),
            MouseButton::Right => Some(SystemMouseButton::Right),
            _ => None,
        }
    }
}

/// Physical pixels per window coordinate; above 1 on high-DPI displays.
pub fn scale_factor(sdl_window: &Window) -> f32 {
    let (width, _) = sdl_window.size();
    let (drawable_width, _) = sdl_window.drawable_size();

    if width == 0 {
        1.
    } else {
        drawable_width as f32 / width as f32
    }
}

fn _touch_id(finger_id: i64) -> TouchId {
    finger_id as TouchId
}

pub trait ToSystemEventExt {
    fn to_system_event(&self, sdl_window: &Window) -> Option<SystemEvent>;
}

impl ToSystemEventExt for Event {
    fn to_system_event(&self, sdl_window: &Window) -> Option<SystemEvent> {
        let scale = scale_factor(sdl_window);
        let (drawable_width, drawable_height) = sdl_window.drawable_size();

        match self {
            Event::KeyDown {
                scancode: Some(scancode),
                ..
            } => {
                let keymap = parse_keymap_from_usb(*scancode as i32 as u16).ok()?;
                return Some(SystemEvent::KeyDown {
                    keycode: keymap.id,
                    mods: keymap.modifier.unwrap_or(SystemMod::empty()),
                });
            }
            Event::KeyUp {
                scancode: Some(scancode),
                ..
            } => {
                let keymap = parse_keymap_from_usb(*scancode as i32 as u16).ok()?;
                return Some(SystemEvent::KeyUp {
                    keycode: keymap.id,
                    mods: keymap.modifier.unwrap_or(SystemMod::empty()),
                });
            }
            Event::MouseMotion { which, x, y, .. } if *which != TOUCH_MOUSE_ID => {
                return Some(SystemEvent::MouseMotion {
                    x: *x as f32 * scale,
                    y: *y as f32 * scale,
                });
            }
            Event::MouseButtonDown {
                which,
                mouse_btn,
                x,
                y,
                ..
            } if *which != TOUCH_MOUSE_ID => {
                if let Some(mouse_btn) = mouse_btn.to_system_mouse_button() {
                    return Some(SystemEvent::MouseButtonDown {
                        mouse_btn,
                        x: *x as f32 * scale,
                        y: *y as f32 * scale,
                    });
                }
            }
            Event::MouseButtonUp {
                which, mouse_btn, ..
            } if *which != TOUCH_MOUSE_ID => {
                if let Some(mouse_btn) = mouse_btn.to_system_mouse_button() {
                    return Some(SystemEvent::MouseButtonUp { mouse_btn });
                }
            }
            // Finger positions are normalized to the window.
            Event::FingerDown {
                finger_id, x, y, ..
            } => {
                return Some(SystemEvent::TouchStart {
                    id: _touch_id(*finger_id),
                    x: x * drawable_width as f32,
                    y: y * drawable_height as f32,
                });
            }
            Event::FingerMotion {
                finger_id, x, y, ..
            } => {
                return Some(SystemEvent::TouchMove {
                    id: _touch_id(*finger_id),
                    x: x * drawable_width as f32,
                    y: y * drawable_height as f32,
                });
            }
            Event::FingerUp { finger_id, .. } => {
                return Some(SystemEvent::TouchEnd {
                    id: _touch_id(*finger_id),
                });
            }
            Event::Window {
                window_id,
                win_event: WindowEvent::FocusLost,
                ..
            } if *window_id == sdl_window.id() => {
                return Some(SystemEvent::FocusLost);
            }
            Event::Window {
                window_id,
                win_event: WindowEvent::SizeChanged(..),
                ..
            } if *window_id == sdl_window.id() => {
                // The event carries window coordinates; the surface wants pixels.
                if drawable_width == 0 || drawable_height == 0 {
                    return None;
                }

                return Some(SystemEvent::SizeChanged {
                    width: drawable_width,
                    height: drawable_height,
                });
            }
            _ => {}
        }
        None
    }
}
