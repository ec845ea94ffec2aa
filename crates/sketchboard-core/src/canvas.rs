//! The element store: document, selection, viewport and tool options.

use crate::clipboard::{ClipboardError, ClipboardPayload};
use crate::config::EditorConfig;
use crate::history::HistoryManager;
use crate::shapes::{
    union_bounds, Element, ElementDraft, ElementId, ElementPatch, ElementStyle, GroupId,
};
use crate::snap::{snap_point, GridConfig, SnapContext, SnapOperation, MIN_GRID_SIZE};
use crate::tools::{ToolKind, ToolOptions};
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use std::collections::HashMap;
use uuid::Uuid;

/// Whether a mutation records a history snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Snapshot after the change.
    Commit,
    /// Live-preview change; a later commit captures it.
    Silent,
}

/// Alignment of several elements against their common bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    CenterHorizontal,
    Right,
    Top,
    CenterVertical,
    Bottom,
}

/// Runtime canvas state.
#[derive(Debug, Clone)]
pub struct Canvas {
    elements: Vec<Element>,
    selection: Vec<ElementId>,
    history: HistoryManager,
    /// View transform.
    pub viewport: Viewport,
    /// Style applied to new elements.
    pub tool_options: ToolOptions,
    active_tool: ToolKind,
    grid: GridConfig,
    properties_panel_visible: bool,
    clipboard: Option<ClipboardPayload>,
    paste_count: u32,
    style_clipboard: Option<ElementStyle>,
    config: EditorConfig,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create an empty canvas with the default configuration.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self::with_elements(config, Vec::new())
    }

    /// Create a canvas around an existing document; it becomes the first snapshot.
    pub fn with_elements(config: EditorConfig, elements: Vec<Element>) -> Self {
        let mut elements = elements;
        for element in &mut elements {
            element.normalize();
        }
        Self {
            history: HistoryManager::with_initial(elements.clone(), config.history_limit),
            elements,
            selection: Vec::new(),
            viewport: Viewport::with_zoom_limits(config.min_zoom, config.max_zoom),
            tool_options: config.tool_options.clone(),
            active_tool: ToolKind::default(),
            grid: config.grid,
            properties_panel_visible: false,
            clipboard: None,
            paste_count: 0,
            style_clipboard: None,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    // --- Reads ---

    /// All elements in z-order (last is topmost).
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id() == id)
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn properties_panel_visible(&self) -> bool {
        self.properties_panel_visible
    }

    /// Bounds of every element, rotation included.
    pub fn bounds(&self) -> Option<Rect> {
        union_bounds(&self.elements)
    }

    // --- Mutation primitives ---

    /// Snapshot the current document.
    pub fn commit(&mut self) {
        self.history.commit(&self.elements);
    }

    fn finish(&mut self, mutation: Mutation) {
        if mutation == Mutation::Commit {
            self.commit();
        }
    }

    /// Insert a new element built from `draft`.
    pub fn insert_element(&mut self, draft: ElementDraft, mutation: Mutation) -> Element {
        let mut element = draft.into_element(&self.tool_options.style);
        // Committed geometry never keeps negative extents
        if mutation == Mutation::Commit {
            element.normalize();
        }
        self.elements.push(element.clone());
        self.finish(mutation);
        element
    }

    pub fn add_element(&mut self, draft: ElementDraft) -> Element {
        self.insert_element(draft, Mutation::Commit)
    }

    pub fn add_element_silent(&mut self, draft: ElementDraft) -> Element {
        self.insert_element(draft, Mutation::Silent)
    }

    /// Merge `patch` into an element. Unknown ids are ignored.
    pub fn patch_element(
        &mut self,
        id: ElementId,
        patch: &ElementPatch,
        mutation: Mutation,
    ) -> Option<Element> {
        let element = self.elements.iter_mut().find(|e| e.id() == id)?;
        patch.apply(element);
        if mutation == Mutation::Commit {
            element.normalize();
        }
        let updated = element.clone();
        self.finish(mutation);
        Some(updated)
    }

    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Option<Element> {
        self.patch_element(id, patch, Mutation::Commit)
    }

    pub fn update_element_silent(&mut self, id: ElementId, patch: &ElementPatch) -> Option<Element> {
        self.patch_element(id, patch, Mutation::Silent)
    }

    /// Edit an element in place without recording history (gesture previews).
    pub(crate) fn modify_silent(&mut self, id: ElementId, edit: impl FnOnce(&mut Element)) -> bool {
        match self.elements.iter_mut().find(|e| e.id() == id) {
            Some(element) => {
                edit(element);
                true
            }
            None => false,
        }
    }

    /// Put back element values captured before a gesture, in place.
    pub(crate) fn restore_silent(&mut self, originals: &[Element]) {
        for original in originals {
            if let Some(element) = self.elements.iter_mut().find(|e| e.id() == original.id()) {
                *element = original.clone();
            }
        }
    }

    /// Remove elements by id, dropping them from the selection too.
    pub fn remove_elements(&mut self, ids: &[ElementId], mutation: Mutation) -> usize {
        let before = self.elements.len();
        self.elements.retain(|e| !ids.contains(&e.id()));
        let removed = before - self.elements.len();
        self.selection.retain(|id| !ids.contains(id));
        self.sync_panel();
        if removed > 0 {
            self.finish(mutation);
        }
        removed
    }

    pub fn delete_element(&mut self, id: ElementId) -> bool {
        self.remove_elements(&[id], Mutation::Commit) > 0
    }

    pub fn delete_element_silent(&mut self, id: ElementId) -> bool {
        self.remove_elements(&[id], Mutation::Silent) > 0
    }

    pub fn delete_selected_elements(&mut self) -> usize {
        let ids = self.selection.clone();
        self.remove_elements(&ids, Mutation::Commit)
    }

    // --- Selection ---

    /// Selected ids, possibly including stale ones.
    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selection
    }

    /// Selected elements that still exist, in selection order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.selection
            .iter()
            .filter_map(|id| self.get_element(*id))
            .collect()
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    fn sync_panel(&mut self) {
        self.properties_panel_visible = !self.selection.is_empty();
    }

    pub fn select_element(&mut self, id: ElementId) {
        self.selection.clear();
        self.selection.push(id);
        self.sync_panel();
    }

    /// Replace the selection wholesale, dropping duplicates.
    pub fn select_elements(&mut self, ids: &[ElementId]) {
        self.selection.clear();
        for &id in ids {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        }
        self.sync_panel();
    }

    pub fn toggle_selection(&mut self, id: ElementId) {
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
        self.sync_panel();
    }

    pub fn add_to_selection(&mut self, id: ElementId) {
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        self.sync_panel();
    }

    pub fn remove_from_selection(&mut self, id: ElementId) {
        self.selection.retain(|s| *s != id);
        self.sync_panel();
    }

    pub fn select_all(&mut self) {
        self.selection = self.elements.iter().map(Element::id).collect();
        self.sync_panel();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.sync_panel();
    }

    /// Select the element after the current one, wrapping around.
    pub fn select_next(&mut self) -> Option<ElementId> {
        let len = self.elements.len();
        if len == 0 {
            return None;
        }
        let next = match self.current_index() {
            Some(i) => (i + 1) % len,
            None => 0,
        };
        let id = self.elements[next].id();
        self.select_element(id);
        Some(id)
    }

    /// Select the element before the current one, wrapping around.
    pub fn select_previous(&mut self) -> Option<ElementId> {
        let len = self.elements.len();
        if len == 0 {
            return None;
        }
        let previous = match self.current_index() {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        let id = self.elements[previous].id();
        self.select_element(id);
        Some(id)
    }

    /// Index of the most recently selected element that still exists.
    fn current_index(&self) -> Option<usize> {
        self.selection.iter().rev().find_map(|id| self.index_of(*id))
    }

    fn prune_selection(&mut self) {
        let elements = &self.elements;
        self.selection
            .retain(|id| elements.iter().any(|e| e.id() == *id));
        self.sync_panel();
    }

    /// Snap a world point for `operation`, ignoring the `exclude`d elements.
    pub fn snap(&self, point: Point, operation: SnapOperation, exclude: &[ElementId]) -> Point {
        let context = SnapContext {
            operation,
            config: &self.grid,
            viewport: &self.viewport,
            elements: &self.elements,
            exclude,
        };
        snap_point(point, &context)
    }

    // --- Hit testing ---

    /// Hit tolerance converted to world units at the current zoom.
    pub fn hit_tolerance(&self) -> f64 {
        self.config.hit_tolerance / self.viewport.zoom
    }

    /// Unlocked elements under `point`, topmost first.
    pub fn elements_at_point(&self, point: Point, tolerance: f64) -> Vec<ElementId> {
        self.elements
            .iter()
            .rev()
            .filter(|e| !e.locked && e.hit_test(point, tolerance))
            .map(Element::id)
            .collect()
    }

    /// Topmost unlocked element under `point`.
    pub fn element_at_point(&self, point: Point, tolerance: f64) -> Option<ElementId> {
        self.elements
            .iter()
            .rev()
            .find(|e| !e.locked && e.hit_test(point, tolerance))
            .map(Element::id)
    }

    /// Unlocked elements overlapping `rect`, in z-order.
    pub fn elements_in_rect(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.elements
            .iter()
            .filter(|e| !e.locked && e.intersects_rect(rect))
            .map(Element::id)
            .collect()
    }

    /// The element plus every other member of its group.
    pub fn group_members(&self, id: ElementId) -> Vec<ElementId> {
        match self.get_element(id).and_then(|e| e.group_id) {
            Some(group) => self
                .elements
                .iter()
                .filter(|e| e.group_id == Some(group))
                .map(Element::id)
                .collect(),
            None => vec![id],
        }
    }

    // --- History ---

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(elements) => {
                self.elements = elements;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(elements) => {
                self.elements = elements;
                self.prune_selection();
                true
            }
            None => false,
        }
    }

    // --- Duplicate and clipboard ---

    /// Append copies of `sources` shifted by `offset`, with fresh ids and
    /// group ids, select them and commit.
    fn insert_copies(&mut self, sources: &[Element], offset: Vec2) -> Vec<ElementId> {
        let mut groups: HashMap<GroupId, GroupId> = HashMap::new();
        let mut ids = Vec::with_capacity(sources.len());

        for source in sources {
            let mut copy = source.clone();
            copy.regenerate_id();
            copy.translate(offset);
            copy.group_id = source
                .group_id
                .map(|g| *groups.entry(g).or_insert_with(Uuid::new_v4));
            ids.push(copy.id());
            self.elements.push(copy);
        }

        if !ids.is_empty() {
            self.select_elements(&ids);
            self.commit();
        }
        ids
    }

    /// Selected elements that still exist, in z-order.
    fn selected_in_z_order(&self) -> Vec<Element> {
        self.elements
            .iter()
            .filter(|e| self.selection.contains(&e.id()))
            .cloned()
            .collect()
    }

    pub fn duplicate_selected_elements(&mut self) -> Vec<ElementId> {
        let sources = self.selected_in_z_order();
        let offset = self.config.paste_offset;
        let ids = self.insert_copies(&sources, Vec2::new(offset, offset));
        if !ids.is_empty() {
            log::info!("Duplicated {} elements", ids.len());
        }
        ids
    }

    /// Copy the selection to the internal clipboard.
    pub fn copy(&mut self) -> bool {
        let elements = self.selected_in_z_order();
        if elements.is_empty() {
            return false;
        }
        self.clipboard = Some(ClipboardPayload::new(elements));
        self.paste_count = 0;
        true
    }

    pub fn cut(&mut self) -> bool {
        if !self.copy() {
            return false;
        }
        self.delete_selected_elements();
        true
    }

    /// Paste the internal clipboard; repeated pastes cascade by the paste offset.
    pub fn paste(&mut self) -> Vec<ElementId> {
        let Some(payload) = self.clipboard.clone() else {
            return Vec::new();
        };
        self.paste_count += 1;
        let offset = self.config.paste_offset * self.paste_count as f64;
        let ids = self.insert_copies(&payload.elements, Vec2::new(offset, offset));
        log::info!("Pasted {} elements", ids.len());
        ids
    }

    /// Serialized clipboard contents for the system clipboard.
    pub fn clipboard_json(&self) -> Option<Result<String, ClipboardError>> {
        self.clipboard.as_ref().map(ClipboardPayload::to_json)
    }

    /// Paste a payload read from the system clipboard.
    pub fn paste_json(&mut self, json: &str) -> Result<Vec<ElementId>, ClipboardError> {
        let payload = ClipboardPayload::from_json(json)?;
        if self.clipboard.as_ref() != Some(&payload) {
            self.clipboard = Some(payload);
            self.paste_count = 0;
        }
        Ok(self.paste())
    }

    pub fn copy_style(&mut self) -> bool {
        let style = self.selected_elements().first().map(|e| e.style.clone());
        match style {
            Some(style) => {
                self.style_clipboard = Some(style);
                true
            }
            None => false,
        }
    }

    pub fn paste_style(&mut self) -> bool {
        let Some(style) = self.style_clipboard.clone() else {
            return false;
        };
        let mut changed = false;
        for element in self.elements.iter_mut() {
            if self.selection.contains(&element.id()) {
                element.style.paste_from(&style);
                changed = true;
            }
        }
        if changed {
            self.commit();
        }
        changed
    }

    // --- Tools and view ---

    pub fn set_active_tool(&mut self, tool: ToolKind) {
        if self.active_tool != tool {
            log::debug!("Active tool: {:?}", tool);
            self.active_tool = tool;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.viewport.set_zoom(zoom);
    }

    pub fn set_pan(&mut self, pan: Vec2) {
        self.viewport.set_pan(pan);
    }

    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.viewport.zoom_at(screen_point, factor);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport.reset();
    }

    /// Fit every element into view; resets the view on an empty canvas.
    pub fn zoom_to_fit(&mut self) {
        match self.bounds() {
            Some(bounds) => self.viewport.fit_to_bounds(bounds, self.config.fit_padding),
            None => self.viewport.reset(),
        }
    }

    pub fn set_viewport_bounds(&mut self, bounds: Rect) {
        self.viewport.set_bounds(bounds);
    }

    // --- Grid and magnetism ---

    pub fn set_grid_config(&mut self, grid: GridConfig) {
        self.grid = grid;
    }

    pub fn toggle_grid(&mut self) {
        self.grid.enabled = !self.grid.enabled;
    }

    pub fn toggle_snap_to_grid(&mut self) {
        self.grid.snap_to_grid = !self.grid.snap_to_grid;
    }

    pub fn toggle_magnetic(&mut self) {
        self.grid.magnetic_enabled = !self.grid.magnetic_enabled;
        log::debug!("Magnetic snapping: {}", self.grid.magnetic_enabled);
    }

    /// Ignored below the minimum grid size.
    pub fn set_grid_size(&mut self, size: f64) {
        if size >= MIN_GRID_SIZE && size.is_finite() {
            self.grid.size = size;
        }
    }

    pub fn set_magnetic_strength(&mut self, strength: f64) {
        if strength.is_finite() {
            self.grid.magnetic_strength = strength.max(0.0);
        }
    }

    pub fn set_magnetic_radius(&mut self, radius: f64) {
        if radius.is_finite() {
            self.grid.magnetic_radius = radius.max(0.0);
        }
    }

    // --- Arrangement ---

    /// Move each selected element one step up, keeping their relative order.
    pub fn bring_forward(&mut self) -> bool {
        let mut changed = false;
        for i in (0..self.elements.len().saturating_sub(1)).rev() {
            if self.is_selected(self.elements[i].id()) && !self.is_selected(self.elements[i + 1].id()) {
                self.elements.swap(i, i + 1);
                changed = true;
            }
        }
        if changed {
            self.commit();
        }
        changed
    }

    /// Move each selected element one step down, keeping their relative order.
    pub fn send_backward(&mut self) -> bool {
        let mut changed = false;
        for i in 1..self.elements.len() {
            if self.is_selected(self.elements[i].id()) && !self.is_selected(self.elements[i - 1].id()) {
                self.elements.swap(i, i - 1);
                changed = true;
            }
        }
        if changed {
            self.commit();
        }
        changed
    }

    pub fn bring_to_front(&mut self) -> bool {
        self.partition_selected(false)
    }

    pub fn send_to_back(&mut self) -> bool {
        self.partition_selected(true)
    }

    fn partition_selected(&mut self, selected_first: bool) -> bool {
        let (selected, rest): (Vec<Element>, Vec<Element>) = self
            .elements
            .iter()
            .cloned()
            .partition(|e| self.selection.contains(&e.id()));
        let reordered: Vec<Element> = if selected_first {
            selected.into_iter().chain(rest).collect()
        } else {
            rest.into_iter().chain(selected).collect()
        };
        if reordered == self.elements {
            return false;
        }
        self.elements = reordered;
        self.commit();
        true
    }

    /// Put two or more selected elements into a new group.
    pub fn group_selected(&mut self) -> Option<GroupId> {
        let ids: Vec<ElementId> = self.selected_elements().iter().map(|e| e.id()).collect();
        if ids.len() < 2 {
            return None;
        }
        let group = Uuid::new_v4();
        for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id())) {
            element.group_id = Some(group);
        }
        self.commit();
        Some(group)
    }

    /// Dissolve the groups of the selected elements.
    pub fn ungroup_selected(&mut self) -> bool {
        let mut changed = false;
        for element in self.elements.iter_mut() {
            if self.selection.contains(&element.id()) && element.group_id.is_some() {
                element.group_id = None;
                changed = true;
            }
        }
        if changed {
            self.commit();
        }
        changed
    }

    /// Lock the selection, or unlock it when every member is already locked.
    pub fn toggle_lock_selected(&mut self) -> bool {
        let selected = self.selected_elements();
        if selected.is_empty() {
            return false;
        }
        let lock = selected.iter().any(|e| !e.locked);
        for element in self.elements.iter_mut() {
            if self.selection.contains(&element.id()) {
                element.locked = lock;
            }
        }
        self.commit();
        true
    }

    /// Align the selected elements against their common bounds.
    pub fn align_selected(&mut self, alignment: Alignment) -> bool {
        let selected = self.selected_elements();
        if selected.len() < 2 {
            return false;
        }
        let Some(target) = union_bounds(selected) else {
            return false;
        };

        for element in self.elements.iter_mut() {
            if !self.selection.contains(&element.id()) {
                continue;
            }
            let b = element.rotated_bounds();
            let delta = match alignment {
                Alignment::Left => Vec2::new(target.x0 - b.x0, 0.0),
                Alignment::CenterHorizontal => Vec2::new(target.center().x - b.center().x, 0.0),
                Alignment::Right => Vec2::new(target.x1 - b.x1, 0.0),
                Alignment::Top => Vec2::new(0.0, target.y0 - b.y0),
                Alignment::CenterVertical => Vec2::new(0.0, target.center().y - b.center().y),
                Alignment::Bottom => Vec2::new(0.0, target.y1 - b.y1),
            };
            element.translate(delta);
        }
        self.commit();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ElementKind, ElementType};

    fn rect_draft(x: f64, y: f64, w: f64, h: f64) -> ElementDraft {
        ElementDraft::new(ElementKind::Rectangle, x, y, w, h)
    }

    fn canvas_with(n: usize) -> (Canvas, Vec<ElementId>) {
        let mut canvas = Canvas::new();
        let ids = (0..n)
            .map(|i| canvas.add_element(rect_draft(i as f64 * 100.0, 0.0, 50.0, 50.0)).id())
            .collect();
        (canvas, ids)
    }

    #[test]
    fn test_add_commits_and_silent_does_not() {
        let mut canvas = Canvas::new();
        let el = canvas.add_element(rect_draft(0.0, 0.0, 10.0, 10.0));
        assert_eq!(el.element_type(), ElementType::Rectangle);
        assert_eq!(canvas.history().len(), 2);

        canvas.add_element_silent(rect_draft(20.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.len(), 2);
        assert_eq!(canvas.history().len(), 2);
    }

    #[test]
    fn test_returned_values_are_detached() {
        let mut canvas = Canvas::new();
        let mut el = canvas.add_element(rect_draft(0.0, 0.0, 10.0, 10.0));
        el.x = 500.0;
        assert!((canvas.elements()[0].x).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_element_merges_patch() {
        let (mut canvas, ids) = canvas_with(1);
        let updated = canvas
            .update_element(ids[0], &ElementPatch::new().size(80.0, 40.0))
            .unwrap();
        assert!((updated.width - 80.0).abs() < f64::EPSILON);
        assert!((updated.x).abs() < f64::EPSILON);
        assert!(canvas.update_element(Uuid::new_v4(), &ElementPatch::new()).is_none());
    }

    #[test]
    fn test_commit_normalizes_negative_size() {
        let mut canvas = Canvas::new();
        let el = canvas.add_element(rect_draft(100.0, 100.0, -50.0, -20.0));
        assert!((el.x - 50.0).abs() < f64::EPSILON);
        assert!((el.y - 80.0).abs() < f64::EPSILON);
        assert!((el.width - 50.0).abs() < f64::EPSILON);
        assert!((el.height - 20.0).abs() < f64::EPSILON);
        assert_eq!(canvas.elements()[0], el);

        let updated = canvas
            .update_element(el.id(), &ElementPatch::new().size(-30.0, -30.0))
            .unwrap();
        assert!(updated.width >= 0.0 && updated.height >= 0.0);
        assert!((updated.x - 20.0).abs() < f64::EPSILON);
        assert_eq!(canvas.history().current(), canvas.elements());
    }

    #[test]
    fn test_silent_mutations_keep_raw_size() {
        let mut canvas = Canvas::new();
        let el = canvas.add_element_silent(rect_draft(100.0, 100.0, -50.0, -20.0));
        assert!((el.width + 50.0).abs() < f64::EPSILON);
        let updated = canvas
            .update_element_silent(el.id(), &ElementPatch::new().size(-10.0, 5.0))
            .unwrap();
        assert!((updated.width + 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_moved_line_hits_at_new_position() {
        let mut canvas = Canvas::new();
        let line = canvas.add_element(ElementDraft::new(
            ElementKind::Line {
                points: vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            },
            0.0,
            0.0,
            100.0,
            0.0,
        ));
        let moved = canvas
            .update_element(line.id(), &ElementPatch::new().position(500.0, 500.0))
            .unwrap();
        assert_eq!(
            moved.kind.points(),
            Some(&[Point::new(500.0, 500.0), Point::new(600.0, 500.0)][..])
        );
        assert_eq!(canvas.element_at_point(Point::new(550.0, 500.0), 2.0), Some(line.id()));
        assert_eq!(canvas.element_at_point(Point::new(50.0, 0.0), 2.0), None);
    }

    #[test]
    fn test_delete_removes_from_selection() {
        let (mut canvas, ids) = canvas_with(3);
        canvas.select_elements(&[ids[0], ids[1]]);
        assert!(canvas.delete_element(ids[0]));
        assert_eq!(canvas.selected_ids(), &[ids[1]]);
        assert_eq!(canvas.delete_selected_elements(), 1);
        assert!(canvas.selected_ids().is_empty());
        assert!(!canvas.properties_panel_visible());
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_select_elements_replaces() {
        let (mut canvas, ids) = canvas_with(2);
        canvas.select_elements(&[ids[1]]);
        canvas.select_elements(&[ids[0]]);
        assert_eq!(canvas.selected_ids(), &[ids[0]]);
        assert!(canvas.properties_panel_visible());
    }

    #[test]
    fn test_toggle_selection_is_involution() {
        let (mut canvas, ids) = canvas_with(3);
        canvas.select_elements(&[ids[0], ids[2]]);
        let start = canvas.selected_ids().to_vec();
        canvas.toggle_selection(ids[1]);
        canvas.toggle_selection(ids[1]);
        assert_eq!(canvas.selected_ids(), &start[..]);
        canvas.toggle_selection(ids[0]);
        canvas.toggle_selection(ids[0]);
        let mut sorted = canvas.selected_ids().to_vec();
        sorted.sort();
        let mut expected = start.clone();
        expected.sort();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn test_select_next_previous_wrap() {
        let (mut canvas, ids) = canvas_with(3);
        assert_eq!(canvas.select_next(), Some(ids[0]));
        assert_eq!(canvas.select_previous(), Some(ids[2]));
        assert_eq!(canvas.select_next(), Some(ids[0]));
        canvas.clear_selection();
        assert_eq!(canvas.select_previous(), Some(ids[2]));
        assert!(Canvas::new().select_next().is_none());
    }

    #[test]
    fn test_stale_selection_is_harmless() {
        let (mut canvas, ids) = canvas_with(1);
        canvas.select_elements(&[Uuid::new_v4(), ids[0]]);
        assert_eq!(canvas.selected_elements().len(), 1);
        assert_eq!(canvas.select_next(), Some(ids[0]));
    }

    #[test]
    fn test_undo_redo_prunes_selection() {
        let (mut canvas, ids) = canvas_with(2);
        canvas.select_element(ids[1]);
        assert!(canvas.undo());
        assert_eq!(canvas.len(), 1);
        assert!(canvas.selected_ids().is_empty());
        assert!(!canvas.properties_panel_visible());
        assert!(canvas.redo());
        assert_eq!(canvas.len(), 2);
        assert!(!canvas.redo());
    }

    #[test]
    fn test_hit_test_topmost_first_and_skips_locked() {
        let mut canvas = Canvas::new();
        let a = canvas.add_element(rect_draft(0.0, 0.0, 100.0, 100.0)).id();
        let b = canvas.add_element(rect_draft(50.0, 50.0, 100.0, 100.0)).id();
        assert_eq!(canvas.elements_at_point(Point::new(75.0, 75.0), 0.0), vec![b, a]);

        canvas.select_element(b);
        canvas.toggle_lock_selected();
        assert_eq!(canvas.element_at_point(Point::new(75.0, 75.0), 0.0), Some(a));
        assert_eq!(canvas.elements_in_rect(Rect::new(0.0, 0.0, 200.0, 200.0)), vec![a]);
    }

    #[test]
    fn test_duplicate_offsets_and_selects() {
        let (mut canvas, ids) = canvas_with(1);
        canvas.select_element(ids[0]);
        let copies = canvas.duplicate_selected_elements();
        assert_eq!(copies.len(), 1);
        assert_ne!(copies[0], ids[0]);
        assert_eq!(canvas.selected_ids(), &copies[..]);
        let copy = canvas.get_element(copies[0]).unwrap();
        assert!((copy.x - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_paste_cascades() {
        let (mut canvas, ids) = canvas_with(1);
        canvas.select_element(ids[0]);
        assert!(canvas.copy());
        let first = canvas.paste();
        let second = canvas.paste();
        assert!((canvas.get_element(first[0]).unwrap().x - 10.0).abs() < f64::EPSILON);
        assert!((canvas.get_element(second[0]).unwrap().x - 20.0).abs() < f64::EPSILON);
        assert_eq!(canvas.len(), 3);
    }

    #[test]
    fn test_cut_and_paste_json() {
        let (mut canvas, ids) = canvas_with(2);
        canvas.select_element(ids[0]);
        assert!(canvas.cut());
        assert_eq!(canvas.len(), 1);
        let json = canvas.clipboard_json().unwrap().unwrap();

        let mut other = Canvas::new();
        let pasted = other.paste_json(&json).unwrap();
        assert_eq!(pasted.len(), 1);
        assert!(other.paste_json("{}").is_err());
    }

    #[test]
    fn test_paste_remaps_groups() {
        let (mut canvas, ids) = canvas_with(2);
        canvas.select_all();
        let group = canvas.group_selected().unwrap();
        canvas.copy();
        let pasted = canvas.paste();
        let new_group = canvas.get_element(pasted[0]).unwrap().group_id;
        assert!(new_group.is_some());
        assert_ne!(new_group, Some(group));
        assert_eq!(canvas.get_element(pasted[1]).unwrap().group_id, new_group);
        assert_eq!(canvas.group_members(ids[0]), ids);
    }

    #[test]
    fn test_copy_paste_style() {
        let (mut canvas, ids) = canvas_with(2);
        assert!(!canvas.paste_style());
        canvas
            .update_element(ids[0], &ElementPatch::new().style(ElementStyle {
                stroke_width: 7.0,
                ..ElementStyle::default()
            }))
            .unwrap();
        canvas.select_element(ids[0]);
        assert!(canvas.copy_style());
        canvas.select_element(ids[1]);
        let seed = canvas.get_element(ids[1]).unwrap().style.seed;
        assert!(canvas.paste_style());
        let target = canvas.get_element(ids[1]).unwrap();
        assert!((target.style.stroke_width - 7.0).abs() < f64::EPSILON);
        assert_eq!(target.style.seed, seed);
    }

    #[test]
    fn test_z_order() {
        let (mut canvas, ids) = canvas_with(4);
        canvas.select_elements(&[ids[0], ids[1]]);
        assert!(canvas.bring_forward());
        let order: Vec<_> = canvas.elements().iter().map(Element::id).collect();
        assert_eq!(order, vec![ids[2], ids[0], ids[1], ids[3]]);

        assert!(canvas.bring_to_front());
        let order: Vec<_> = canvas.elements().iter().map(Element::id).collect();
        assert_eq!(order, vec![ids[2], ids[3], ids[0], ids[1]]);
        assert!(!canvas.bring_to_front());

        assert!(canvas.send_to_back());
        let order: Vec<_> = canvas.elements().iter().map(Element::id).collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[2], ids[3]]);
        assert!(!canvas.send_backward());
    }

    #[test]
    fn test_group_and_ungroup() {
        let (mut canvas, ids) = canvas_with(3);
        canvas.select_element(ids[0]);
        assert!(canvas.group_selected().is_none());
        canvas.select_elements(&[ids[0], ids[2]]);
        canvas.group_selected().unwrap();
        assert_eq!(canvas.group_members(ids[2]), vec![ids[0], ids[2]]);
        assert_eq!(canvas.group_members(ids[1]), vec![ids[1]]);
        assert!(canvas.ungroup_selected());
        assert_eq!(canvas.group_members(ids[0]), vec![ids[0]]);
    }

    #[test]
    fn test_align_left_and_bottom() {
        let mut canvas = Canvas::new();
        let a = canvas.add_element(rect_draft(10.0, 0.0, 50.0, 50.0)).id();
        let b = canvas.add_element(rect_draft(100.0, 20.0, 50.0, 80.0)).id();
        canvas.select_element(a);
        assert!(!canvas.align_selected(Alignment::Left));
        canvas.select_elements(&[a, b]);
        let before = canvas.history().len();
        assert!(canvas.align_selected(Alignment::Left));
        assert!((canvas.get_element(b).unwrap().x - 10.0).abs() < f64::EPSILON);
        assert!(canvas.align_selected(Alignment::Bottom));
        assert!((canvas.get_element(a).unwrap().y - 50.0).abs() < f64::EPSILON);
        assert_eq!(canvas.history().len(), before + 2);
    }

    #[test]
    fn test_grid_setters() {
        let mut canvas = Canvas::new();
        canvas.set_grid_size(-5.0);
        canvas.set_grid_size(0.001);
        assert!((canvas.grid().size - 20.0).abs() < f64::EPSILON);
        canvas.set_grid_size(40.0);
        canvas.set_magnetic_strength(-3.0);
        canvas.toggle_magnetic();
        canvas.toggle_snap_to_grid();
        canvas.toggle_grid();
        let grid = canvas.grid();
        assert!((grid.size - 40.0).abs() < f64::EPSILON);
        assert!(grid.magnetic_strength.abs() < f64::EPSILON);
        assert!(grid.magnetic_enabled && grid.snap_to_grid && !grid.enabled);
    }

    #[test]
    fn test_zoom_to_fit_and_reset() {
        let mut canvas = Canvas::new();
        canvas.zoom_to_fit();
        assert!((canvas.viewport.zoom - 1.0).abs() < f64::EPSILON);
        canvas.add_element(rect_draft(0.0, 0.0, 350.0, 250.0));
        canvas.zoom_to_fit();
        assert!((canvas.viewport.zoom - 2.0).abs() < 1e-9);
        canvas.set_zoom(50.0);
        assert!((canvas.viewport.zoom - 10.0).abs() < f64::EPSILON);
        canvas.reset_zoom();
        assert!((canvas.viewport.zoom - 1.0).abs() < f64::EPSILON);
        assert_eq!(canvas.viewport.pan, Vec2::ZERO);
    }

    #[test]
    fn test_history_limit_from_config() {
        let config = EditorConfig {
            history_limit: 3,
            ..EditorConfig::default()
        };
        let mut canvas = Canvas::with_config(config);
        for i in 0..5 {
            canvas.add_element(rect_draft(i as f64, 0.0, 10.0, 10.0));
        }
        assert_eq!(canvas.history().len(), 3);
        assert!(canvas.undo());
        assert!(canvas.undo());
        assert!(!canvas.undo());
        assert_eq!(canvas.len(), 3);
    }
}
