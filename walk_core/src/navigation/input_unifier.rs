use ultraviolet::{UVec2, Vec2};

use super::{InputState, MoveDirection, VirtualJoystick};
use crate::cvars::Tuning;
use crate::renderer::system::{SystemEvent, SystemKeycode, TouchId};

fn key_direction(keycode: &SystemKeycode) -> Option<MoveDirection> {
    Some(match keycode {
        SystemKeycode::UsW | SystemKeycode::ArrowUp => MoveDirection::Forward,
        SystemKeycode::UsS | SystemKeycode::ArrowDown => MoveDirection::Backward,
        SystemKeycode::UsA | SystemKeycode::ArrowLeft => MoveDirection::Left,
        SystemKeycode::UsD | SystemKeycode::ArrowRight => MoveDirection::Right,
        _ => return None,
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// A drag or a joystick press started with this event.
    pub interaction: bool,
}

impl InputResponse {
    fn interaction() -> Self {
        Self { interaction: true }
    }
}

/// Folds keyboard, pointer drag, touch drag and joystick events into a
/// single [InputState].
///
/// Only one pointer drag and one touch look drag are tracked at a time;
/// extra presses while one is active are ignored. Touches starting on the
/// left part of the surface drive the arrow pad instead of looking around.
pub struct InputUnifier {
    look_sensitivity: f32,
    touch_look_scale: f32,
    touch_look_area: f32,
    scale_factor: f32,

    surface_size: UVec2,
    joystick: VirtualJoystick,

    drag: Option<Vec2>,
    touch_look: Option<(TouchId, Vec2)>,
    joystick_touches: Vec<(TouchId, MoveDirection)>,
}

impl InputUnifier {
    pub fn new(tuning: &Tuning, surface_size: UVec2, scale_factor: f32) -> Self {
        Self {
            look_sensitivity: tuning.look_sensitivity,
            touch_look_scale: tuning.touch_look_scale,
            touch_look_area: tuning.touch_look_area,
            scale_factor,

            surface_size,
            joystick: VirtualJoystick::new(surface_size, scale_factor),

            drag: None,
            touch_look: None,
            joystick_touches: Vec::new(),
        }
    }

    pub fn resize(&mut self, surface_size: UVec2) {
        self.surface_size = surface_size;
        self.joystick = VirtualJoystick::new(surface_size, self.scale_factor);
    }

    /// Lays the arrow pad out again for a new display density.
    pub fn set_scale_factor(&mut self, scale_factor: f32) {
        self.scale_factor = scale_factor;
        self.joystick = VirtualJoystick::new(self.surface_size, scale_factor);
    }

    pub fn joystick(&self) -> &VirtualJoystick {
        &self.joystick
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some() || self.touch_look.is_some()
    }

    /// Ends every drag and lets go of the arrows held by touches. Arrows the
    /// host reports through [SystemEvent::JoystickButton] stay as they are.
    pub fn release_all(&mut self, input: &mut InputState) {
        self.drag = None;
        self.touch_look = None;

        for (_, direction) in self.joystick_touches.drain(..) {
            input.set_joystick_direction(direction, false);
        }
    }

    pub fn handle_event(&mut self, input: &mut InputState, event: &SystemEvent) -> InputResponse {
        match event {
            SystemEvent::KeyDown { keycode, .. } => {
                if let Some(direction) = key_direction(keycode) {
                    input.set_key_direction(direction, true);
                }
            }
            SystemEvent::KeyUp { keycode, .. } => {
                if let Some(direction) = key_direction(keycode) {
                    input.set_key_direction(direction, false);
                }
            }
            SystemEvent::FocusLost => {
                // Key-up and touch-end events won't arrive while unfocused.
                input.clear_keyboard();
                self.release_all(input);
            }

            SystemEvent::MouseButtonDown { x, y, .. } => {
                if self.drag.is_none() {
                    self.drag = Some(Vec2::new(*x, *y));
                    return InputResponse::interaction();
                }
            }
            SystemEvent::MouseMotion { x, y } => {
                if let Some(last) = self.drag.as_mut() {
                    let position = Vec2::new(*x, *y);
                    let delta = (position - *last) * self.look_sensitivity;
                    *last = position;

                    input.add_look(delta.x, delta.y);
                }
            }
            SystemEvent::MouseButtonUp { .. } => {
                self.drag = None;
            }

            SystemEvent::TouchStart { id, x, y } => {
                let position = Vec2::new(*x, *y);

                if *x > self.surface_size.x as f32 * self.touch_look_area {
                    if self.touch_look.is_none() {
                        self.touch_look = Some((*id, position));
                        return InputResponse::interaction();
                    }
                } else if let Some(direction) = self.joystick.hit(position) {
                    self.joystick_touches.push((*id, direction));
                    input.set_joystick_direction(direction, true);
                    return InputResponse::interaction();
                }
            }
            SystemEvent::TouchMove { id, x, y } => {
                if let Some((look_id, last)) = self.touch_look.as_mut() {
                    if *look_id == *id {
                        let position = Vec2::new(*x, *y);
                        let delta = (position - *last)
                            * (self.look_sensitivity * self.touch_look_scale);
                        *last = position;

                        input.add_look(delta.x, delta.y);
                    }
                }
            }
            SystemEvent::TouchEnd { id } => {
                if matches!(self.touch_look, Some((look_id, _)) if look_id == *id) {
                    self.touch_look = None;
                }

                if let Some(index) = self.joystick_touches.iter().position(|(t, _)| t == id) {
                    let (_, direction) = self.joystick_touches.swap_remove(index);

                    // Another finger may still hold the same arrow.
                    if !self.joystick_touches.iter().any(|(_, d)| *d == direction) {
                        input.set_joystick_direction(direction, false);
                    }
                }
            }
            SystemEvent::JoystickButton { direction, pressed } => {
                input.set_joystick_direction(*direction, *pressed);
                if *pressed {
                    return InputResponse::interaction();
                }
            }

            SystemEvent::SizeChanged { width, height } => {
                self.resize(UVec2::new(*width, *height));
            }
            SystemEvent::FullscreenChanged { .. } => {}
        }

        InputResponse::default()
    }
}

#[cfg(test)]
mod tests {
    use crate::navigation::MoveFlags;
    use crate::renderer::system::{SystemMod, SystemMouseButton};

    use super::*;

    fn unifier() -> InputUnifier {
        InputUnifier::new(&Tuning::default(), UVec2::new(800, 600), 1.)
    }

    fn key_down(keycode: SystemKeycode) -> SystemEvent {
        SystemEvent::KeyDown {
            keycode,
            mods: SystemMod::empty(),
        }
    }

    fn key_up(keycode: SystemKeycode) -> SystemEvent {
        SystemEvent::KeyUp {
            keycode,
            mods: SystemMod::empty(),
        }
    }

    #[test]
    fn letters_and_arrows_are_the_same_direction() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        unifier.handle_event(&mut input, &key_down(SystemKeycode::UsW));
        unifier.handle_event(&mut input, &key_down(SystemKeycode::ArrowLeft));
        unifier.handle_event(&mut input, &key_down(SystemKeycode::UsQ));

        assert_eq!(input.moves(), MoveFlags::FORWARD | MoveFlags::LEFT);

        unifier.handle_event(&mut input, &key_up(SystemKeycode::ArrowUp));
        assert_eq!(input.moves(), MoveFlags::LEFT);
    }

    #[test]
    fn focus_loss_releases_keys() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        unifier.handle_event(&mut input, &key_down(SystemKeycode::UsD));
        unifier.handle_event(
            &mut input,
            &SystemEvent::JoystickButton {
                direction: MoveDirection::Forward,
                pressed: true,
            },
        );
        unifier.handle_event(&mut input, &SystemEvent::FocusLost);

        assert_eq!(input.moves(), MoveFlags::FORWARD);
    }

    #[test]
    fn focus_loss_ends_touches() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 7,
                x: 700.,
                y: 300.,
            },
        );
        // Up arrow.
        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 8,
                x: 104.,
                y: 420.,
            },
        );
        assert_eq!(input.moves(), MoveFlags::FORWARD);

        unifier.handle_event(&mut input, &SystemEvent::FocusLost);
        assert!(!unifier.is_dragging());
        assert!(input.moves().is_empty());

        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchMove {
                id: 7,
                x: 800.,
                y: 300.,
            },
        );
        assert!(input.look().is_zero());

        // A stale touch end must not release anything new.
        unifier.handle_event(
            &mut input,
            &SystemEvent::JoystickButton {
                direction: MoveDirection::Forward,
                pressed: true,
            },
        );
        unifier.handle_event(&mut input, &SystemEvent::TouchEnd { id: 8 });
        assert_eq!(input.moves(), MoveFlags::FORWARD);
    }

    #[test]
    fn pointer_drag_scales_by_sensitivity() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        // Motion before a press doesn't look around.
        unifier.handle_event(&mut input, &SystemEvent::MouseMotion { x: 50., y: 50. });
        assert!(input.look().is_zero());

        let response = unifier.handle_event(
            &mut input,
            &SystemEvent::MouseButtonDown {
                mouse_btn: SystemMouseButton::Left,
                x: 100.,
                y: 100.,
            },
        );
        assert!(response.interaction);

        unifier.handle_event(&mut input, &SystemEvent::MouseMotion { x: 110., y: 100. });
        unifier.handle_event(&mut input, &SystemEvent::MouseMotion { x: 130., y: 90. });

        let look = input.take_look();
        assert!((look.x - 30. * 0.003).abs() < 1e-6);
        assert!((look.y + 10. * 0.003).abs() < 1e-6);

        unifier.handle_event(
            &mut input,
            &SystemEvent::MouseButtonUp {
                mouse_btn: SystemMouseButton::Left,
            },
        );
        unifier.handle_event(&mut input, &SystemEvent::MouseMotion { x: 300., y: 300. });
        assert!(input.look().is_zero());
        assert!(!unifier.is_dragging());
    }

    #[test]
    fn second_press_does_not_restart_drag() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        let press = |x: f32| SystemEvent::MouseButtonDown {
            mouse_btn: SystemMouseButton::Left,
            x,
            y: 0.,
        };

        assert!(unifier.handle_event(&mut input, &press(0.)).interaction);
        assert!(!unifier.handle_event(&mut input, &press(500.)).interaction);

        unifier.handle_event(&mut input, &SystemEvent::MouseMotion { x: 10., y: 0. });
        assert!((input.take_look().x - 10. * 0.003).abs() < 1e-6);
    }

    #[test]
    fn touch_look_on_the_right_uses_touch_scale() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        let response = unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 1,
                x: 600.,
                y: 300.,
            },
        );
        assert!(response.interaction);

        // A different finger moving doesn't count.
        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchMove {
                id: 2,
                x: 700.,
                y: 300.,
            },
        );
        assert!(input.look().is_zero());

        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchMove {
                id: 1,
                x: 620.,
                y: 300.,
            },
        );
        assert!((input.take_look().x - 20. * 0.003 * 1.5).abs() < 1e-6);

        unifier.handle_event(&mut input, &SystemEvent::TouchEnd { id: 1 });
        assert!(!unifier.is_dragging());
    }

    #[test]
    fn touches_on_the_pad_walk() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        // Center of the up arrow on an 800x600 surface.
        let response = unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 3,
                x: 104.,
                y: 420.,
            },
        );
        assert!(response.interaction);
        assert_eq!(input.moves(), MoveFlags::FORWARD);

        // Dragging on the left never looks around.
        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchMove {
                id: 3,
                x: 200.,
                y: 420.,
            },
        );
        assert!(input.look().is_zero());

        unifier.handle_event(&mut input, &SystemEvent::TouchEnd { id: 3 });
        assert!(input.moves().is_empty());
    }

    #[test]
    fn two_fingers_on_one_arrow() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        for id in [1, 2] {
            unifier.handle_event(
                &mut input,
                &SystemEvent::TouchStart {
                    id,
                    x: 44.,
                    y: 480.,
                },
            );
        }

        unifier.handle_event(&mut input, &SystemEvent::TouchEnd { id: 1 });
        assert_eq!(input.moves(), MoveFlags::LEFT);

        unifier.handle_event(&mut input, &SystemEvent::TouchEnd { id: 2 });
        assert!(input.moves().is_empty());
    }

    #[test]
    fn resize_moves_the_pad() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        unifier.handle_event(
            &mut input,
            &SystemEvent::SizeChanged {
                width: 800,
                height: 1000,
            },
        );

        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 1,
                x: 104.,
                y: 420.,
            },
        );
        assert!(input.moves().is_empty());

        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 2,
                x: 104.,
                y: 820.,
            },
        );
        assert_eq!(input.moves(), MoveFlags::FORWARD);
    }

    #[test]
    fn density_change_rescales_the_pad() {
        let mut unifier = unifier();
        let mut input = InputState::default();

        unifier.set_scale_factor(2.);

        let (direction, rect) = *unifier.joystick().buttons().next().unwrap();
        assert_eq!(direction, MoveDirection::Forward);
        assert_eq!(rect.max.x - rect.min.x, 112.);

        // Where the up arrow used to be is now a gap.
        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 1,
                x: 104.,
                y: 420.,
            },
        );
        assert!(input.moves().is_empty());

        let center = rect.center();
        unifier.handle_event(
            &mut input,
            &SystemEvent::TouchStart {
                id: 2,
                x: center.x,
                y: center.y,
            },
        );
        assert_eq!(input.moves(), MoveFlags::FORWARD);
    }
}
