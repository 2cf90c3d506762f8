// SPDX-License-Identifier: MIT
//
// tea-ui: the retained-mode half of teaui.
//
// Applications build a tree of views once and keep it. Each frame the
// Screen walks it: sizes come from `intrinsic_size`, drawing happens in
// `render` through a Viewport that clips and translates, and while drawing
// views register for focus, mouse regions, hotkeys and ticks. Those
// registrations live exactly one frame; input that arrives before the next
// frame is routed against them.
//
//   tree      arena of views with stable ids, mount bookkeeping
//   view      the View trait and the box model around it
//   viewport  what `render` draws through
//   focus     tab order, hotkeys, the focused view
//   mouse     region table, hover and press tracking
//   modal     the stack of overlays
//   tick      the animation timer
//   screen    the frame loop tying it together
//
// Bytes and terminal state are tea-term's business. This crate never
// touches stdout; it hands the buffer to whatever Driver the Screen owns.

pub mod error;
pub mod events;
pub mod focus;
pub mod modal;
pub mod mouse;
pub mod screen;
pub mod system;
pub mod theme;
pub mod tick;
pub mod tree;
pub mod view;
pub mod viewport;

pub use error::{Error, Result};
pub use events::{
    Event, HotKey, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventName,
    MouseEvents, SystemMouseEvent, SystemMouseKind,
};
pub use screen::{Action, EventSource, Poll, Screen, ScreenOptions};
pub use system::System;
pub use theme::Theme;
pub use tree::{ViewId, ViewTree};
pub use view::{Edges, Layout, LayoutCx, ScreenId, View};
pub use viewport::{Viewport, Writer};
