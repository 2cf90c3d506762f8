// SPDX-License-Identifier: MIT
//
// teaui: a retained-mode terminal UI engine.
//
// The workspace splits along the one boundary that matters:
//
//   tea-term → cells, geometry, the diffing buffer, and the Driver that
//              bytes leave through
//   tea-ui   → views, the tree they live in, the per-frame managers
//              (focus, mouse, modal, tick), and the Screen running frames
//
// This crate re-exports both so an application depends on one name.

//! A retained-mode terminal UI engine.
//!
//! ```
//! use teaui::term::{MemoryDriver, Point, Size};
//! use teaui::{LayoutCx, Screen, ScreenOptions, View, Viewport};
//!
//! struct Hello;
//!
//! impl View for Hello {
//!     fn intrinsic_size(&self, _cx: &LayoutCx<'_>, _available: Size) -> Size {
//!         Size::new(5, 1)
//!     }
//!
//!     fn render(&mut self, viewport: &mut Viewport<'_>) {
//!         let style = viewport.theme().text;
//!         viewport.write("hello", Point::ZERO, style);
//!     }
//! }
//!
//! let driver = MemoryDriver::new(Size::new(20, 2));
//! let screen = Screen::start(driver, ScreenOptions::default(), |tree| tree.insert(Hello))?;
//! assert!(screen.driver().output_str().contains("hello"));
//! # Ok::<(), teaui::Error>(())
//! ```

pub use tea_term as term;
pub use tea_ui::*;
