//! Turns raw egui events into canvas-relative gesture events.

use eframe::egui;

use fractoscope_core::{CanvasBounds, GestureEvent, PointerSample, ScreenPos};

/// Tracks touch contacts across frames.
///
/// egui also synthesises pointer events for the first touch; those are
/// dropped while any contact is down so a finger is never seen twice.
#[derive(Debug, Default)]
pub(crate) struct InputTranslator {
    contacts: Vec<(egui::TouchId, egui::Pos2)>,
    /// Latest mouse position or primary contact, while it is over the canvas.
    pointer: Option<PointerSample>,
}

impl InputTranslator {
    pub(crate) fn has_contacts(&self) -> bool {
        !self.contacts.is_empty()
    }

    pub(crate) fn pointer(&self) -> Option<PointerSample> {
        self.pointer
    }

    /// Translate this frame's events. Sessions only start on the canvas;
    /// moves and releases are delivered wherever they happen.
    pub(crate) fn translate(
        &mut self,
        events: &[egui::Event],
        bounds: &CanvasBounds,
    ) -> Vec<GestureEvent> {
        let mut out = Vec::new();
        for event in events {
            match event {
                egui::Event::Touch { id, phase, pos, .. } => {
                    self.touch(*id, *phase, *pos, bounds, &mut out);
                }
                _ if self.has_contacts() => {}
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        let sample = self.track_mouse(bounds, *pos);
                        if let Some(sample) = sample {
                            out.push(GestureEvent::PointerDown(sample.pos()));
                        }
                    } else {
                        out.push(GestureEvent::PointerUp);
                    }
                }
                egui::Event::PointerMoved(pos) => {
                    self.track_mouse(bounds, *pos);
                    out.push(GestureEvent::PointerMove(relative(bounds, *pos)));
                }
                egui::Event::PointerGone => {
                    self.pointer = None;
                    out.push(GestureEvent::PointerLeave);
                }
                _ => {}
            }
        }
        out
    }

    fn touch(
        &mut self,
        id: egui::TouchId,
        phase: egui::TouchPhase,
        pos: egui::Pos2,
        bounds: &CanvasBounds,
        out: &mut Vec<GestureEvent>,
    ) {
        let index = self.contacts.iter().position(|(t, _)| *t == id);
        match (phase, index) {
            (egui::TouchPhase::Start, None) => {
                if !bounds.contains(relative(bounds, pos)) {
                    return;
                }
                self.contacts.push((id, pos));
                out.push(GestureEvent::TouchStart(self.positions(bounds)));
            }
            (egui::TouchPhase::Move, Some(i)) => {
                self.contacts[i].1 = pos;
                out.push(GestureEvent::TouchMove(self.positions(bounds)));
            }
            (egui::TouchPhase::End | egui::TouchPhase::Cancel, Some(i)) => {
                self.contacts.remove(i);
                out.push(GestureEvent::TouchEnd(self.positions(bounds)));
            }
            // Contacts that began off the canvas, or a repeated start.
            _ => return,
        }
        let positions = self.positions(bounds);
        self.pointer = PointerSample::from_touches(&positions, 0)
            .filter(|sample| bounds.contains(sample.pos()));
    }

    /// Record a mouse sample; `None` when it is off the canvas.
    fn track_mouse(&mut self, bounds: &CanvasBounds, pos: egui::Pos2) -> Option<PointerSample> {
        let p = relative(bounds, pos);
        self.pointer = bounds.contains(p).then_some(PointerSample::Mouse(p));
        self.pointer
    }

    fn positions(&self, bounds: &CanvasBounds) -> Vec<ScreenPos> {
        self.contacts
            .iter()
            .map(|(_, pos)| relative(bounds, *pos))
            .collect()
    }
}

fn relative(bounds: &CanvasBounds, pos: egui::Pos2) -> ScreenPos {
    bounds.relative(pos.x as f64, pos.y as f64)
}

/// Wheel event for this frame's scroll, if any.
///
/// egui reports scrolling up as positive; the controller zooms in on a
/// negative delta.
pub(crate) fn wheel_event(
    scroll_y: f32,
    hover: Option<egui::Pos2>,
    bounds: &CanvasBounds,
) -> Option<GestureEvent> {
    if scroll_y == 0.0 {
        return None;
    }
    let pos = relative(bounds, hover?);
    bounds.contains(pos).then(|| GestureEvent::Wheel {
        pos,
        delta: -(scroll_y as f64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> CanvasBounds {
        CanvasBounds::new(10.0, 20.0, 100.0)
    }

    fn touch(id: u64, phase: egui::TouchPhase, x: f32, y: f32) -> egui::Event {
        egui::Event::Touch {
            device_id: egui::TouchDeviceId(0),
            id: egui::TouchId(id),
            phase,
            pos: egui::pos2(x, y),
            force: None,
        }
    }

    fn press(x: f32, y: f32, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos: egui::pos2(x, y),
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn mouse_drag_is_canvas_relative() {
        let mut t = InputTranslator::default();
        let events = [
            press(60.0, 70.0, true),
            egui::Event::PointerMoved(egui::pos2(80.0, 75.0)),
            press(80.0, 75.0, false),
        ];
        assert_eq!(
            t.translate(&events, &bounds()),
            vec![
                GestureEvent::PointerDown(ScreenPos::new(50.0, 50.0)),
                GestureEvent::PointerMove(ScreenPos::new(70.0, 55.0)),
                GestureEvent::PointerUp,
            ]
        );
    }

    #[test]
    fn press_off_canvas_does_not_start() {
        let mut t = InputTranslator::default();
        assert!(t.translate(&[press(5.0, 5.0, true)], &bounds()).is_empty());
    }

    #[test]
    fn second_finger_carries_both_contacts() {
        let mut t = InputTranslator::default();
        let events = [
            touch(1, egui::TouchPhase::Start, 20.0, 30.0),
            touch(2, egui::TouchPhase::Start, 40.0, 30.0),
            touch(1, egui::TouchPhase::End, 20.0, 30.0),
        ];
        assert_eq!(
            t.translate(&events, &bounds()),
            vec![
                GestureEvent::TouchStart(vec![ScreenPos::new(10.0, 10.0)]),
                GestureEvent::TouchStart(vec![
                    ScreenPos::new(10.0, 10.0),
                    ScreenPos::new(30.0, 10.0)
                ]),
                GestureEvent::TouchEnd(vec![ScreenPos::new(30.0, 10.0)]),
            ]
        );
    }

    #[test]
    fn emulated_pointer_is_dropped_during_touch() {
        let mut t = InputTranslator::default();
        let events = [
            touch(7, egui::TouchPhase::Start, 20.0, 30.0),
            press(20.0, 30.0, true),
            egui::Event::PointerMoved(egui::pos2(25.0, 30.0)),
            touch(7, egui::TouchPhase::Move, 25.0, 30.0),
        ];
        let out = t.translate(&events, &bounds());
        assert_eq!(out.len(), 2);
        assert!(matches!(out[1], GestureEvent::TouchMove(_)));
        assert!(t.has_contacts());
    }

    #[test]
    fn pointer_follows_mouse_then_primary_contact() {
        let mut t = InputTranslator::default();
        t.translate(&[egui::Event::PointerMoved(egui::pos2(60.0, 70.0))], &bounds());
        assert_eq!(
            t.pointer(),
            Some(PointerSample::Mouse(ScreenPos::new(50.0, 50.0)))
        );

        t.translate(&[egui::Event::PointerMoved(egui::pos2(500.0, 70.0))], &bounds());
        assert_eq!(t.pointer(), None);

        let events = [
            touch(1, egui::TouchPhase::Start, 20.0, 30.0),
            touch(2, egui::TouchPhase::Start, 40.0, 30.0),
        ];
        t.translate(&events, &bounds());
        assert_eq!(
            t.pointer(),
            Some(PointerSample::Touch {
                pos: ScreenPos::new(10.0, 10.0),
                index: 0
            })
        );

        let events = [
            touch(1, egui::TouchPhase::End, 20.0, 30.0),
            touch(2, egui::TouchPhase::End, 40.0, 30.0),
        ];
        t.translate(&events, &bounds());
        assert_eq!(t.pointer(), None);
    }

    #[test]
    fn unknown_touch_moves_are_ignored() {
        let mut t = InputTranslator::default();
        let events = [touch(3, egui::TouchPhase::Move, 20.0, 30.0)];
        assert!(t.translate(&events, &bounds()).is_empty());
    }

    #[test]
    fn scrolling_up_zooms_in() {
        let hover = Some(egui::pos2(60.0, 70.0));
        match wheel_event(50.0, hover, &bounds()) {
            Some(GestureEvent::Wheel { pos, delta }) => {
                assert_eq!(pos, ScreenPos::new(50.0, 50.0));
                assert!(delta < 0.0);
            }
            other => panic!("expected wheel event, got {other:?}"),
        }
        assert_eq!(wheel_event(0.0, hover, &bounds()), None);
        assert_eq!(wheel_event(10.0, None, &bounds()), None);
    }
}
