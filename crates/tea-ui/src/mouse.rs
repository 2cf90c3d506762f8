// SPDX-License-Identifier: MIT
//
// Mouse routing.
//
// Views register rectangles (in absolute coordinates) and the event
// categories they care about while they render. An incoming terminal event
// goes to the topmost matching region: the last one registered that
// contains the point and subscribes to the event's category. Later
// registrations paint over earlier ones, so last-registered is topmost.
//
// On top of that raw table the manager keeps two pieces of state across
// frames and turns them into the higher-level events views actually want:
//
//   hover  the MOVE target under the pointer, diffed into Enter/Exit
//   press  the view and button that got the last Down, for Drag and Click
//
// A click is a Down and an Up on the same view. Releasing elsewhere still
// tells the pressed view its button came up, so it can clear its state.

use tea_term::geometry::{Point, Rect};
use tracing::trace;

use crate::events::{
    MouseButton, MouseEvent, MouseEventName, MouseEvents, SystemMouseEvent, SystemMouseKind,
};
use crate::tree::ViewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Region {
    view: ViewId,
    rect: Rect,
    events: MouseEvents,
}

/// One event for one view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    pub view: ViewId,
    pub event: MouseEvent,
}

#[derive(Debug, Default)]
pub struct MouseManager {
    regions: Vec<Region>,
    hover: Option<ViewId>,
    press: Option<(ViewId, MouseButton)>,
    last_position: Option<Point>,
    dirty: bool,
}

impl MouseManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget this frame's regions. Hover and press carry over.
    pub fn reset(&mut self) {
        self.regions.clear();
    }

    pub fn register(&mut self, view: ViewId, rect: Rect, events: MouseEvents) {
        if rect.is_empty() || events.is_empty() {
            return;
        }
        self.regions.push(Region { view, rect, events });
    }

    /// Turn a terminal mouse event into view events, in delivery order.
    pub fn route(&mut self, event: &SystemMouseEvent) -> Vec<Delivery> {
        let at = event.position;
        self.last_position = Some(at);
        let mut out = Vec::new();

        match event.kind {
            SystemMouseKind::Move | SystemMouseKind::Drag(_) => {
                self.update_hover(at, &mut out);
                if let Some((view, button)) = self.press {
                    self.push(&mut out, view, MouseEventName::Drag, Some(button), at);
                } else if let Some(view) = self.target(at, MouseEvents::MOVE) {
                    self.push(&mut out, view, MouseEventName::Move, None, at);
                }
            }
            SystemMouseKind::Down(button) => {
                self.press = self
                    .target(at, MouseEvents::for_button(button))
                    .map(|view| (view, button));
                if let Some((view, _)) = self.press {
                    self.push(&mut out, view, MouseEventName::Down, Some(button), at);
                }
            }
            SystemMouseKind::Up(button) => {
                let under = self.target(at, MouseEvents::for_button(button));
                let pressed = self.press.take().map(|(view, _)| view);
                if let Some(view) = under {
                    self.push(&mut out, view, MouseEventName::Up, Some(button), at);
                    if pressed == Some(view) {
                        self.push(&mut out, view, MouseEventName::Click, Some(button), at);
                    }
                }
                if let Some(view) = pressed.filter(|&view| Some(view) != under) {
                    self.push(&mut out, view, MouseEventName::Up, Some(button), at);
                }
            }
            SystemMouseKind::WheelUp | SystemMouseKind::WheelDown => {
                let name = if event.kind == SystemMouseKind::WheelUp {
                    MouseEventName::WheelUp
                } else {
                    MouseEventName::WheelDown
                };
                if let Some(view) = self.target(at, MouseEvents::WHEEL) {
                    self.push(&mut out, view, name, None, at);
                }
            }
        }

        for delivery in &out {
            trace!(view = ?delivery.view, event = ?delivery.event.name, "mouse");
        }
        out
    }

    /// Re-resolve the last pointer position against the regions the latest
    /// render registered. Yields Enter/Exit if the hover target moved.
    pub fn check_hover(&mut self) -> Vec<Delivery> {
        let mut out = Vec::new();
        if let Some(at) = self.last_position {
            self.update_hover(at, &mut out);
        }
        out
    }

    /// Whether the hover target changed since the last call.
    pub fn needs_render(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Whether `view` owns the topmost region at `point`.
    #[must_use]
    pub fn check_mouse(&self, view: ViewId, point: Point) -> bool {
        self.regions
            .iter()
            .rev()
            .find(|region| region.rect.contains(point))
            .is_some_and(|region| region.view == view)
    }

    #[inline]
    #[must_use]
    pub const fn hover(&self) -> Option<ViewId> {
        self.hover
    }

    /// The view holding the current press, if a button is down.
    #[inline]
    #[must_use]
    pub fn pressed(&self) -> Option<ViewId> {
        self.press.map(|(view, _)| view)
    }

    fn target(&self, at: Point, events: MouseEvents) -> Option<ViewId> {
        self.regions
            .iter()
            .rev()
            .find(|region| region.rect.contains(at) && region.events.intersects(events))
            .map(|region| region.view)
    }

    fn update_hover(&mut self, at: Point, out: &mut Vec<Delivery>) {
        let next = self.target(at, MouseEvents::MOVE);
        if next == self.hover {
            return;
        }
        if let Some(old) = self.hover {
            self.push(out, old, MouseEventName::Exit, None, at);
        }
        if let Some(new) = next {
            self.push(out, new, MouseEventName::Enter, None, at);
        }
        self.hover = next;
        self.dirty = true;
    }

    fn push(
        &self,
        out: &mut Vec<Delivery>,
        view: ViewId,
        name: MouseEventName,
        button: Option<MouseButton>,
        position: Point,
    ) {
        // Local coordinates are relative to the view's topmost region; a
        // view that no longer registers gets absolute ones.
        let origin = self
            .regions
            .iter()
            .rev()
            .find(|region| region.view == view)
            .map_or(Point::ZERO, |region| region.rect.origin);
        out.push(Delivery {
            view,
            event: MouseEvent {
                name,
                button,
                position,
                local: position.sub(origin),
            },
        });
    }
}
