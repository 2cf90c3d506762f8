// SPDX-License-Identifier: MIT
//
// The view tree: an arena of nodes addressed by stable `ViewId`s.
//
// Each node owns its view, its box model, an optional theme, and its
// parent/children links. Parents are looked up, never borrowed, so a view
// can be reparented or dropped while other ids to it are still held; stale
// ids resolve to nothing instead of dangling.
//
// Mounting: a node knows which Screen (if any) it is attached to. Attaching
// a subtree under a mounted parent mounts it; detaching it unmounts it; the
// Screen's mount pass reconciles everything against what it can reach.
// Every transition fires the matching view hook exactly once.

use std::collections::HashSet;
use std::fmt;

use slotmap::{SlotMap, new_key_type};
use tea_term::geometry::Size;
use tracing::trace;

use crate::error::{Error, Result};
use crate::theme::Theme;
use crate::view::{Layout, LayoutCx, ScreenId, View};

new_key_type! {
    /// Stable handle to a node. Survives reparenting; goes stale on removal.
    pub struct ViewId;
}

struct Node {
    /// `None` only while the view is lent out by `with_view`.
    view: Option<Box<dyn View>>,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    layout: Layout,
    theme: Option<Theme>,
    screen: Option<ScreenId>,
}

#[derive(Default)]
pub struct ViewTree {
    nodes: SlotMap<ViewId, Node>,
}

impl ViewTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Nodes ───────────────────────────────────────────────────────────────

    /// Add a detached root node with the default layout.
    pub fn insert(&mut self, view: impl View) -> ViewId {
        self.insert_with(view, Layout::new())
    }

    pub fn insert_with(&mut self, view: impl View, layout: Layout) -> ViewId {
        self.nodes.insert(Node {
            view: Some(Box::new(view)),
            parent: None,
            children: Vec::new(),
            layout,
            theme: None,
            screen: None,
        })
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop `id` and its whole subtree. Mounted nodes are unmounted first.
    ///
    /// # Errors
    ///
    /// `UnknownView` if `id` is stale.
    pub fn remove(&mut self, id: ViewId) -> Result<()> {
        if !self.contains(id) {
            return Err(Error::UnknownView(id));
        }
        self.detach(id);
        self.move_to_screen(id, None);
        for node in self.subtree(id) {
            self.nodes.remove(node);
        }
        Ok(())
    }

    // ─── Structure ───────────────────────────────────────────────────────────

    #[must_use]
    pub fn parent(&self, id: ViewId) -> Option<ViewId> {
        self.nodes.get(id)?.parent
    }

    /// Children in render order. Empty for stale ids.
    #[must_use]
    pub fn children(&self, id: ViewId) -> &[ViewId] {
        self.nodes
            .get(id)
            .map_or(&[][..], |node| node.children.as_slice())
    }

    /// Append `child` under `parent`, detaching it from any previous parent.
    ///
    /// # Errors
    ///
    /// `UnknownView` for stale ids, `Cycle` if `parent` lies inside
    /// `child`'s subtree.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) -> Result<()> {
        let index = self.children(parent).len();
        self.insert_child_at(parent, index, child)
    }

    /// Insert `child` under `parent` at `index` (clamped to the end).
    ///
    /// # Errors
    ///
    /// Same as [`add_child`](Self::add_child).
    pub fn insert_child_at(&mut self, parent: ViewId, index: usize, child: ViewId) -> Result<()> {
        for id in [parent, child] {
            if !self.contains(id) {
                return Err(Error::UnknownView(id));
            }
        }
        if self.is_in_subtree(parent, child) {
            return Err(Error::Cycle { parent, child });
        }

        self.with_node_view(child, |view| view.will_move_to(Some(parent)));
        let previous = self.detach(child);

        // Clamp after detaching: a move within the same parent shortened the list.
        let Some(node) = self.nodes.get_mut(parent) else {
            return Err(Error::UnknownView(parent));
        };
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        if let Some(node) = self.nodes.get_mut(child) {
            node.parent = Some(parent);
        }

        self.with_node_view(child, |view| view.did_move_from(previous));
        let screen = self.screen(parent);
        self.move_to_screen(child, screen);
        trace!(?parent, ?child, index, "attach");
        Ok(())
    }

    /// Detach `child` from `parent`. The node stays in the tree as an
    /// unmounted root.
    ///
    /// # Errors
    ///
    /// `UnknownView` if either id is stale or `child` isn't a child of
    /// `parent`.
    pub fn remove_child(&mut self, parent: ViewId, child: ViewId) -> Result<()> {
        if !self.contains(parent) {
            return Err(Error::UnknownView(parent));
        }
        if self.parent(child) != Some(parent) {
            return Err(Error::UnknownView(child));
        }
        self.with_node_view(child, |view| view.will_move_to(None));
        self.detach(child);
        self.with_node_view(child, |view| view.did_move_from(Some(parent)));
        self.move_to_screen(child, None);
        Ok(())
    }

    /// Whether `id` is `root` or lies below it.
    #[must_use]
    pub fn is_in_subtree(&self, id: ViewId, root: ViewId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// `id` followed by all its descendants, depth first.
    #[must_use]
    pub fn subtree(&self, id: ViewId) -> Vec<ViewId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev());
        }
        out
    }

    /// Unlink from the parent. Returns the previous parent.
    fn detach(&mut self, id: ViewId) -> Option<ViewId> {
        let parent = self.nodes.get_mut(id)?.parent.take()?;
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != id);
        }
        Some(parent)
    }

    // ─── Layout & Theme ──────────────────────────────────────────────────────

    #[must_use]
    pub fn layout(&self, id: ViewId) -> Layout {
        self.nodes.get(id).map(|node| node.layout).unwrap_or_default()
    }

    pub fn set_layout(&mut self, id: ViewId, layout: Layout) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.layout = layout;
        }
    }

    /// Set or clear a node's own theme.
    pub fn set_theme(&mut self, id: ViewId, theme: Option<Theme>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.theme = theme;
        }
    }

    /// The nearest theme up the parent chain, or the default.
    #[must_use]
    pub fn theme(&self, id: ViewId) -> Theme {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(node) = self.nodes.get(current) else {
                break;
            };
            if let Some(theme) = node.theme {
                return theme;
            }
            cursor = node.parent;
        }
        Theme::default()
    }

    /// Full size of `id` (box model included) given `available` room.
    /// Zero for stale ids and for a view that is currently lent out.
    #[must_use]
    pub fn intrinsic_size(&self, id: ViewId, available: Size) -> Size {
        let Some(node) = self.nodes.get(id) else {
            return Size::ZERO;
        };
        let Some(view) = node.view.as_deref() else {
            return Size::ZERO;
        };
        let cx = LayoutCx { tree: self, view: id };
        node.layout
            .outer_size(available, |room| view.intrinsic_size(&cx, room))
    }

    // ─── Views ───────────────────────────────────────────────────────────────

    /// Lend the view at `id` out of the tree for the duration of `f`.
    ///
    /// While lent, the node is still in the tree (its id, links and layout
    /// stay valid) but its view is absent: a nested `with_view` on the same
    /// id returns `None`. If `f` removes the node, the view is dropped.
    pub fn with_view<R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut dyn View, &mut Self) -> R,
    ) -> Option<R> {
        let mut view = self.nodes.get_mut(id)?.view.take()?;
        let result = f(view.as_mut(), self);
        if let Some(node) = self.nodes.get_mut(id) {
            node.view = Some(view);
        }
        Some(result)
    }

    /// Borrow the view at `id`. `None` while it is lent out.
    #[must_use]
    pub fn view(&self, id: ViewId) -> Option<&dyn View> {
        self.nodes.get(id)?.view.as_deref()
    }

    fn with_node_view(&mut self, id: ViewId, f: impl FnOnce(&mut dyn View)) {
        if let Some(view) = self.nodes.get_mut(id).and_then(|n| n.view.as_deref_mut()) {
            f(view);
        }
    }

    // ─── Mounting ────────────────────────────────────────────────────────────

    #[must_use]
    pub fn screen(&self, id: ViewId) -> Option<ScreenId> {
        self.nodes.get(id)?.screen
    }

    #[must_use]
    pub fn is_mounted(&self, id: ViewId) -> bool {
        self.screen(id).is_some()
    }

    /// Attach `id` and its subtree to `screen` (or detach with `None`).
    /// Nodes already in the target state are left alone.
    pub fn move_to_screen(&mut self, id: ViewId, screen: Option<ScreenId>) {
        for node in self.subtree(id) {
            self.transition(node, screen);
        }
    }

    /// Mount everything reachable from `roots` on `screen` and unmount every
    /// other node that was on it.
    pub fn mount_pass(&mut self, screen: ScreenId, roots: &[ViewId]) {
        let reachable: HashSet<ViewId> = roots.iter().flat_map(|&r| self.subtree(r)).collect();
        let stale: Vec<ViewId> = self
            .nodes
            .iter()
            .filter(|(id, node)| node.screen == Some(screen) && !reachable.contains(id))
            .map(|(id, _)| id)
            .collect();

        for id in stale {
            self.transition(id, None);
        }
        for root in roots {
            self.move_to_screen(*root, Some(screen));
        }
    }

    fn transition(&mut self, id: ViewId, screen: Option<ScreenId>) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        if node.screen == screen {
            return;
        }
        let previous = std::mem::replace(&mut node.screen, screen);
        let Some(view) = node.view.as_deref_mut() else {
            return;
        };
        if let Some(old) = previous {
            view.did_unmount(old);
        }
        if let Some(new) = screen {
            view.did_mount(new);
        }
    }
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("nodes", &self.nodes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use crate::viewport::Viewport;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every hook call as a string.
    struct Logged {
        name: &'static str,
        log: Log,
        size: Size,
    }

    impl Logged {
        fn new(name: &'static str, log: &Log) -> Self {
            Self {
                name,
                log: Rc::clone(log),
                size: Size::new(2, 1),
            }
        }

        fn push(&self, event: &str) {
            self.log.borrow_mut().push(format!("{}:{event}", self.name));
        }
    }

    impl View for Logged {
        fn intrinsic_size(&self, _cx: &LayoutCx<'_>, _available: Size) -> Size {
            self.size
        }

        fn render(&mut self, _viewport: &mut Viewport<'_>) {}

        fn will_move_to(&mut self, parent: Option<ViewId>) {
            self.push(if parent.is_some() { "will_move(some)" } else { "will_move(none)" });
        }

        fn did_move_from(&mut self, parent: Option<ViewId>) {
            self.push(if parent.is_some() { "did_move(some)" } else { "did_move(none)" });
        }

        fn did_mount(&mut self, _screen: ScreenId) {
            self.push("mount");
        }

        fn did_unmount(&mut self, _screen: ScreenId) {
            self.push("unmount");
        }
    }

    /// Sums its children horizontally.
    struct Row;

    impl View for Row {
        fn intrinsic_size(&self, cx: &LayoutCx<'_>, available: Size) -> Size {
            cx.children().iter().fold(Size::ZERO, |acc, &child| {
                let size = cx.size_of(child, available);
                Size::new(acc.width + size.width, acc.height.max(size.height))
            })
        }

        fn render(&mut self, _viewport: &mut Viewport<'_>) {}
    }

    fn log() -> Log {
        Rc::new(RefCell::new(Vec::new()))
    }

    fn drain(log: &Log) -> Vec<String> {
        std::mem::take(&mut *log.borrow_mut())
    }

    // ── Structure ──────────────────────────────────────────────────────

    #[test]
    fn add_child_links_both_ways() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        tree.add_child(a, b).unwrap();

        assert_eq!(tree.parent(b), Some(a));
        assert_eq!(tree.children(a), &[b]);
        assert_eq!(drain(&log), ["b:will_move(some)", "b:did_move(none)"]);
    }

    #[test]
    fn reparenting_detaches_from_old_parent() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        let c = tree.insert(Logged::new("c", &log));
        tree.add_child(a, c).unwrap();
        drain(&log);

        tree.add_child(b, c).unwrap();
        assert!(tree.children(a).is_empty());
        assert_eq!(tree.children(b), &[c]);
        assert_eq!(drain(&log), ["c:will_move(some)", "c:did_move(some)"]);
    }

    #[test]
    fn insert_child_at_orders_children() {
        let log = log();
        let mut tree = ViewTree::new();
        let p = tree.insert(Logged::new("p", &log));
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        let c = tree.insert(Logged::new("c", &log));
        tree.add_child(p, a).unwrap();
        tree.add_child(p, b).unwrap();
        tree.insert_child_at(p, 0, c).unwrap();
        assert_eq!(tree.children(p), &[c, a, b]);

        tree.insert_child_at(p, 99, c).unwrap();
        assert_eq!(tree.children(p), &[a, b, c]);
    }

    #[test]
    fn cycles_are_rejected() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        tree.add_child(a, b).unwrap();

        assert!(matches!(tree.add_child(b, a), Err(Error::Cycle { .. })));
        assert!(matches!(tree.add_child(a, a), Err(Error::Cycle { .. })));
        assert_eq!(tree.parent(a), None);
    }

    #[test]
    fn stale_ids_are_errors() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        tree.remove(b).unwrap();

        assert!(matches!(tree.add_child(a, b), Err(Error::UnknownView(id)) if id == b));
        assert!(matches!(tree.remove(b), Err(Error::UnknownView(_))));
        assert!(tree.children(b).is_empty());
    }

    #[test]
    fn remove_drops_subtree() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        let c = tree.insert(Logged::new("c", &log));
        tree.add_child(a, b).unwrap();
        tree.add_child(b, c).unwrap();

        tree.remove(b).unwrap();
        assert_eq!(tree.len(), 1);
        assert!(tree.children(a).is_empty());
        assert!(!tree.contains(c));
    }

    #[test]
    fn remove_child_keeps_node_as_root() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        tree.add_child(a, b).unwrap();
        drain(&log);

        tree.remove_child(a, b).unwrap();
        assert!(tree.contains(b));
        assert_eq!(tree.parent(b), None);
        assert_eq!(drain(&log), ["b:will_move(none)", "b:did_move(some)"]);
        assert!(tree.remove_child(a, b).is_err());
    }

    // ── Mounting ───────────────────────────────────────────────────────

    #[test]
    fn screen_transitions_fire_once() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let (s1, s2) = (ScreenId::next(), ScreenId::next());

        tree.move_to_screen(a, Some(s1));
        tree.move_to_screen(a, Some(s1));
        tree.move_to_screen(a, Some(s2));
        tree.move_to_screen(a, None);
        tree.move_to_screen(a, None);
        assert_eq!(drain(&log), ["a:mount", "a:unmount", "a:mount", "a:unmount"]);
    }

    #[test]
    fn children_inherit_parent_screen() {
        let log = log();
        let mut tree = ViewTree::new();
        let root = tree.insert(Logged::new("root", &log));
        let child = tree.insert(Logged::new("child", &log));
        let screen = ScreenId::next();
        tree.move_to_screen(root, Some(screen));
        drain(&log);

        tree.add_child(root, child).unwrap();
        assert_eq!(tree.screen(child), Some(screen));
        assert_eq!(
            drain(&log),
            ["child:will_move(some)", "child:did_move(none)", "child:mount"]
        );

        tree.remove_child(root, child).unwrap();
        assert!(!tree.is_mounted(child));
    }

    #[test]
    fn mount_pass_reconciles_reachability() {
        let log = log();
        let mut tree = ViewTree::new();
        let root = tree.insert(Logged::new("root", &log));
        let modal = tree.insert(Logged::new("modal", &log));
        let child = tree.insert(Logged::new("child", &log));
        tree.add_child(root, child).unwrap();
        let screen = ScreenId::next();

        tree.mount_pass(screen, &[root, modal]);
        assert!(tree.is_mounted(root) && tree.is_mounted(child) && tree.is_mounted(modal));
        drain(&log);

        tree.mount_pass(screen, &[root]);
        assert!(!tree.is_mounted(modal));
        assert_eq!(drain(&log), ["modal:unmount"]);
    }

    #[test]
    fn remove_unmounts_before_dropping() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        tree.move_to_screen(a, Some(ScreenId::next()));
        drain(&log);
        tree.remove(a).unwrap();
        assert_eq!(drain(&log), ["a:unmount"]);
    }

    // ── Layout ─────────────────────────────────────────────────────────

    #[test]
    fn intrinsic_size_applies_box_model() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert_with(Logged::new("a", &log), Layout::new().min_width(5));
        assert_eq!(tree.intrinsic_size(a, Size::new(80, 24)), Size::new(5, 1));
    }

    #[test]
    fn containers_measure_children() {
        let log = log();
        let mut tree = ViewTree::new();
        let row = tree.insert(Row);
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert_with(Logged::new("b", &log), Layout::new().width(4).height(3));
        tree.add_child(row, a).unwrap();
        tree.add_child(row, b).unwrap();
        assert_eq!(tree.intrinsic_size(row, Size::new(80, 24)), Size::new(6, 3));
    }

    #[test]
    fn theme_is_inherited() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));
        let b = tree.insert(Logged::new("b", &log));
        tree.add_child(a, b).unwrap();
        let mut custom = Theme::default();
        custom.text = custom.text_pressed;
        tree.set_theme(a, Some(custom));

        assert_eq!(tree.theme(b), custom);
        tree.set_theme(a, None);
        assert_eq!(tree.theme(b), Theme::default());
    }

    #[test]
    fn with_view_lends_and_returns() {
        let log = log();
        let mut tree = ViewTree::new();
        let a = tree.insert(Logged::new("a", &log));

        let nested = tree.with_view(a, |_, tree| tree.with_view(a, |_, _| ()).is_none());
        assert_eq!(nested, Some(true));
        assert!(tree.view(a).is_some());

        // Removing itself while lent: the view is dropped, not reinserted.
        tree.with_view(a, |_, tree| tree.remove(a).unwrap());
        assert!(!tree.contains(a));
    }
}
