// SPDX-License-Identifier: MIT
//
// Screen: owns the driver, the tree, and every manager, and runs frames.
//
// One render pass:
//
//   1. prepare the buffer at the driver's current size
//   2. mount pass: everything reachable from the root or a modal is
//      mounted on this screen, everything else that was is unmounted
//   3. reset per-frame tables (focus, mouse, ticks, modal bookkeeping)
//   4. render the root at max(natural size, screen size), then the modals
//   5. re-resolve hover against the fresh mouse table
//   6. if focus or hover changed, render the topmost target once more so
//      it can show the new state (never more than once)
//   7. start or stop the tick timer, flush the diff
//
// Input never renders directly. `trigger` routes an event to views
// (keys through focus, mouse through the region table), lets them mutate
// state through `System`, then renders once. `run` is the cooperative
// loop: block on the event source until the next tick deadline, trigger
// or tick, repeat until something quits or the source closes.

use std::io;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use tea_term::ansi::MouseMode;
use tea_term::diff::FlushStats;
use tea_term::driver::Driver;
use tea_term::geometry::{Point, Rect, Size};
use tracing::debug;

use crate::error::Result;
use crate::events::{Event, HotKey, KeyCode, KeyEvent, MouseEvents};
use crate::modal::ModalManager;
use crate::mouse::Delivery;
use crate::system::System;
use crate::tick::{DEFAULT_TICK_INTERVAL, TickManager};
use crate::tree::{ViewId, ViewTree};
use crate::view::ScreenId;
use crate::viewport::{Frame, render_view};

// ─── Options ─────────────────────────────────────────────────────────────────

/// Screen configuration.
///
/// ```
/// use std::time::Duration;
/// use tea_ui::screen::ScreenOptions;
///
/// let options = ScreenOptions::default()
///     .tick_interval(Duration::from_millis(33))
///     .quit_char(Some('q'));
/// assert!(options.exit_on_ctrl_c);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenOptions {
    /// Period of the animation timer.
    pub tick_interval: Duration,
    /// Treat Ctrl-C as quit before any view sees it.
    pub exit_on_ctrl_c: bool,
    /// An unmodified character that quits, like `q`.
    pub quit_char: Option<char>,
    pub mouse_mode: MouseMode,
    /// Keys rewritten before routing, `(from, to)`.
    pub key_aliases: Vec<(KeyEvent, KeyEvent)>,
}

impl Default for ScreenOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            exit_on_ctrl_c: true,
            quit_char: None,
            mouse_mode: MouseMode::Motion,
            // Terminals send M-b / M-f for Alt+arrows.
            key_aliases: vec![
                (KeyEvent::alt(KeyCode::Char('b')), KeyEvent::alt(KeyCode::Left)),
                (KeyEvent::alt(KeyCode::Char('f')), KeyEvent::alt(KeyCode::Right)),
            ],
        }
    }
}

impl ScreenOptions {
    #[must_use]
    pub const fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    #[must_use]
    pub const fn exit_on_ctrl_c(mut self, enabled: bool) -> Self {
        self.exit_on_ctrl_c = enabled;
        self
    }

    #[must_use]
    pub const fn quit_char(mut self, ch: Option<char>) -> Self {
        self.quit_char = ch;
        self
    }

    #[must_use]
    pub const fn mouse_mode(mut self, mode: MouseMode) -> Self {
        self.mouse_mode = mode;
        self
    }

    /// Add an alias. Later aliases for the same key are ignored.
    #[must_use]
    pub fn key_alias(mut self, from: KeyEvent, to: KeyEvent) -> Self {
        self.key_aliases.push((from, to));
        self
    }

    /// Replace all aliases, defaults included.
    #[must_use]
    pub fn key_aliases(mut self, aliases: Vec<(KeyEvent, KeyEvent)>) -> Self {
        self.key_aliases = aliases;
        self
    }

    /// Apply the first matching alias.
    #[must_use]
    pub fn translate(&self, key: KeyEvent) -> KeyEvent {
        self.key_aliases
            .iter()
            .find(|(from, _)| *from == key)
            .map_or(key, |&(_, to)| to)
    }

    fn is_quit_key(&self, key: &KeyEvent) -> bool {
        (self.exit_on_ctrl_c && *key == KeyEvent::ctrl('c'))
            || self.quit_char.is_some_and(|ch| *key == KeyEvent::char(ch))
    }
}

// ─── Events In ───────────────────────────────────────────────────────────────

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// One wait on an event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    Event(Event),
    /// The timeout elapsed first.
    Timeout,
    /// No more events will come.
    Closed,
}

/// Where `Screen::run` gets its events from. Decoding terminal input is up
/// to the implementor.
pub trait EventSource {
    /// Wait for the next event, at most `timeout` (`None`: indefinitely).
    ///
    /// # Errors
    ///
    /// An I/O error reading input ends the loop.
    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Poll>;
}

impl EventSource for Receiver<Event> {
    fn next_event(&mut self, timeout: Option<Duration>) -> io::Result<Poll> {
        let Some(timeout) = timeout else {
            return Ok(self.recv().map_or(Poll::Closed, Poll::Event));
        };
        Ok(match self.recv_timeout(timeout) {
            Ok(event) => Poll::Event(event),
            Err(RecvTimeoutError::Timeout) => Poll::Timeout,
            Err(RecvTimeoutError::Disconnected) => Poll::Closed,
        })
    }
}

// ─── Screen ──────────────────────────────────────────────────────────────────

pub struct Screen<D: Driver> {
    driver: D,
    tree: ViewTree,
    frame: Frame,
    modal: ModalManager,
    root: ViewId,
    options: ScreenOptions,
    id: ScreenId,
    quit: bool,
    /// The terminal is set up and not yet restored.
    active: bool,
}

impl<D: Driver> Screen<D> {
    /// Take over the terminal, build the root view, and draw the first
    /// frame.
    ///
    /// # Errors
    ///
    /// Driver I/O while setting up or flushing.
    pub fn start(
        mut driver: D,
        options: ScreenOptions,
        build: impl FnOnce(&mut ViewTree) -> ViewId,
    ) -> Result<Self> {
        driver.enter_alternate_buffer()?;
        driver.enable_mouse(options.mouse_mode)?;
        driver.hide_cursor()?;
        driver.clear()?;

        let mut tree = ViewTree::new();
        let root = build(&mut tree);
        let id = ScreenId::next();
        tree.move_to_screen(root, Some(id));

        let mut screen = Self {
            driver,
            tree,
            frame: Frame::new(TickManager::new(options.tick_interval)),
            modal: ModalManager::new(),
            root,
            options,
            id,
            quit: false,
            active: true,
        };
        debug!(screen = ?id, size = %screen.driver.size(), "screen started");
        screen.render()?;
        Ok(screen)
    }

    // ── Rendering ──────────────────────────────────────────────────────

    /// Draw a frame and flush what changed.
    ///
    /// # Errors
    ///
    /// The driver rejected the output. The buffer keeps its baseline, so
    /// the next render retries the same changes.
    pub fn render(&mut self) -> Result<FlushStats> {
        let size = self.driver.size();
        self.frame.buffer.prepare(size);

        let mut roots = vec![self.root];
        roots.extend(self.modal.roots());
        self.tree.mount_pass(self.id, &roots);

        let target = self.render_pass(size);
        let hover = self.frame.mouse.check_hover();
        self.dispatch_mouse(hover);

        let focus_changed = self.frame.focus.needs_rerender();
        let hover_changed = self.frame.mouse.needs_render();
        if focus_changed || hover_changed {
            self.rerender(target, size);
            let hover = self.frame.mouse.check_hover();
            self.dispatch_mouse(hover);
            self.frame.focus.needs_rerender();
            self.frame.mouse.needs_render();
        }

        self.frame.tick.end_render(Instant::now());
        Ok(self.frame.buffer.flush(&mut self.driver)?)
    }

    /// Root then modals. Returns the topmost thing drawn.
    fn render_pass(&mut self, size: Size) -> ViewId {
        self.frame.reset();
        self.modal.reset();

        let screen = Rect::from_size(size);
        let root_size = self.tree.intrinsic_size(self.root, size).max(size);
        render_view(
            &mut self.frame,
            &mut self.tree,
            self.root,
            Rect::from_size(root_size),
            screen,
        );
        self.modal
            .render_modals(&mut self.frame, &mut self.tree, screen)
            .unwrap_or(self.root)
    }

    fn rerender(&mut self, target: ViewId, size: Size) {
        if target == self.root {
            self.frame.buffer.prepare(size);
            self.render_pass(size);
            return;
        }
        let Some(rect) = self.modal.rect(target) else {
            return;
        };
        self.frame.reset_input();
        render_view(
            &mut self.frame,
            &mut self.tree,
            target,
            rect,
            Rect::from_size(size),
        );
    }

    // ── Input ──────────────────────────────────────────────────────────

    /// Route one event to the views, then render.
    ///
    /// # Errors
    ///
    /// Driver I/O during the render.
    pub fn trigger(&mut self, event: Event) -> Result<Action> {
        match event {
            Event::Resize => self.frame.buffer.force_redraw(),
            Event::Focus | Event::Blur => {}
            Event::Key(key) => {
                let key = self.options.translate(key);
                if self.options.is_quit_key(&key) {
                    debug!(key = %key, "quit key");
                    return Ok(Action::Quit);
                }
                if let Some(view) = self.frame.focus.trigger(&key) {
                    self.dispatch_key(view, &key);
                }
            }
            Event::Mouse(mouse) => {
                let deliveries = self.frame.mouse.route(&mouse);
                self.dispatch_mouse(deliveries);
            }
        }
        self.render()?;
        Ok(if self.quit { Action::Quit } else { Action::Continue })
    }

    /// Fire the tick timer if it is due, then render.
    /// Returns whether a tick fired.
    ///
    /// # Errors
    ///
    /// Driver I/O during the render.
    pub fn tick(&mut self, now: Instant) -> Result<bool> {
        let Some((dt, targets)) = self.frame.tick.begin_fire(now) else {
            return Ok(false);
        };
        let declined: Vec<ViewId> = targets
            .into_iter()
            .filter(|&view| self.tree.with_view(view, |v, _| v.receive_tick(dt)) != Some(true))
            .collect();
        self.frame.tick.finish_fire(declined);
        self.render()?;
        Ok(true)
    }

    fn dispatch_key(&mut self, view: ViewId, key: &KeyEvent) {
        self.tree.with_view(view, |target, tree| {
            let mut system = System {
                view,
                tree,
                focus: &mut self.frame.focus,
                modal: &mut self.modal,
                quit: &mut self.quit,
            };
            target.receive_key(key, &mut system);
        });
    }

    fn dispatch_mouse(&mut self, deliveries: Vec<Delivery>) {
        for Delivery { view, event } in deliveries {
            self.tree.with_view(view, |target, tree| {
                let mut system = System {
                    view,
                    tree,
                    focus: &mut self.frame.focus,
                    modal: &mut self.modal,
                    quit: &mut self.quit,
                };
                target.receive_mouse(&event, &mut system);
            });
        }
    }

    // ── Loop ───────────────────────────────────────────────────────────

    /// Trigger events from `source` and fire ticks until a view quits, a
    /// quit key arrives, or the source closes. Restores the terminal on the
    /// way out, error or not.
    ///
    /// # Errors
    ///
    /// Source or driver I/O.
    pub fn run<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        let result = self.run_inner(source);
        self.exit()?;
        result
    }

    fn run_inner<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<()> {
        loop {
            let timeout = self
                .frame
                .tick
                .deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()));

            match source.next_event(timeout)? {
                Poll::Event(event) => {
                    if self.trigger(event)? == Action::Quit {
                        return Ok(());
                    }
                }
                Poll::Timeout => {}
                Poll::Closed => return Ok(()),
            }

            self.tick(Instant::now())?;
        }
    }

    /// Stop ticking, unmount everything, and give the terminal back.
    /// Does nothing the second time.
    ///
    /// # Errors
    ///
    /// Driver I/O while restoring the terminal.
    pub fn exit(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        self.frame.tick.stop();
        for root in std::iter::once(self.root).chain(self.modal.roots()) {
            self.tree.move_to_screen(root, None);
        }

        self.driver.disable_mouse()?;
        self.driver.show_cursor()?;
        self.driver.exit_alternate_buffer()?;
        debug!(screen = ?self.id, "screen exited");
        Ok(())
    }

    // ── Managers ───────────────────────────────────────────────────────

    /// Open `modal` on behalf of `parent`. A refused request changes
    /// nothing; `modal` stays wherever the caller put it.
    pub fn request_modal(
        &mut self,
        parent: ViewId,
        modal: ViewId,
        on_close: impl FnOnce() + 'static,
        rect: Rect,
    ) -> bool {
        self.modal
            .request_modal(&self.tree, parent, modal, on_close, rect)
    }

    /// Close `modal` and everything above it, dropping their subtrees.
    pub fn dismiss_modal(&mut self, modal: ViewId) -> Vec<ViewId> {
        let closed = self.modal.dismiss_modal(modal);
        for &id in &closed {
            self.tree.remove(id).ok();
        }
        closed
    }

    /// Stack of open modals, bottom first.
    #[must_use]
    pub fn modals(&self) -> Vec<ViewId> {
        self.modal.roots()
    }

    pub fn register_focus(&mut self, view: ViewId) -> bool {
        self.frame.focus.register(view)
    }

    pub fn register_hotkey(&mut self, view: ViewId, key: HotKey) {
        self.frame.focus.register_hotkey(view, key);
    }

    /// Register a mouse region (absolute) outside of a render pass. It
    /// lasts until the next render.
    pub fn register_mouse(&mut self, view: ViewId, rect: Rect, events: MouseEvents) {
        self.frame.mouse.register(view, rect, events);
    }

    #[must_use]
    pub fn check_mouse(&self, view: ViewId, point: Point) -> bool {
        self.frame.mouse.check_mouse(view, point)
    }

    pub fn register_tick(&mut self, view: ViewId) {
        self.frame.tick.register(view);
    }

    pub fn focus_next(&mut self) -> Option<ViewId> {
        self.frame.focus.focus_next()
    }

    pub fn focus_previous(&mut self) -> Option<ViewId> {
        self.frame.focus.focus_previous()
    }

    pub fn request_focus(&mut self, view: ViewId) {
        self.frame.focus.request_focus(view);
    }

    #[must_use]
    pub const fn focused(&self) -> Option<ViewId> {
        self.frame.focus.focused()
    }

    // ── Accessors ──────────────────────────────────────────────────────

    #[inline]
    #[must_use]
    pub const fn root(&self) -> ViewId {
        self.root
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> ScreenId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn tree(&self) -> &ViewTree {
        &self.tree
    }

    #[inline]
    pub const fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }

    #[inline]
    #[must_use]
    pub const fn driver(&self) -> &D {
        &self.driver
    }

    #[inline]
    pub const fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// The last frame: buffer contents and registration tables.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> &Frame {
        &self.frame
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &ScreenOptions {
        &self.options
    }

    /// Whether the terminal is still held (not yet `exit`ed).
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }
}
