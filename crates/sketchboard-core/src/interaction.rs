//! Routes pointer and keyboard input to tools, selection gestures and actions.

use crate::actions::{Action, ActionQueue};
use crate::canvas::Canvas;
use crate::input::{InputState, KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::keymap::Keymap;
use crate::selection::{
    hit_test_handles, selection_handles, HandleKind, MoveState, ResizeState, RotateState,
    SelectionRect, HANDLE_HIT_TOLERANCE,
};
use crate::shapes::{ElementId, ElementType};
use crate::tools::{TextKey, TextSession, ToolKind, ToolMachine};
use kurbo::{Point, Rect, Vec2};

/// Zoom factor for one wheel notch or one zoom action.
pub const ZOOM_STEP: f64 = 1.1;

/// In-flight pointer gesture owned by the coordinator.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    None,
    Move(MoveState),
    Resize(ResizeState),
    Rotate(RotateState),
    Marquee(SelectionRect),
    Pan,
}

/// Owns per-session interaction state; the canvas is passed into every call.
#[derive(Debug, Clone, Default)]
pub struct Coordinator {
    tools: ToolMachine,
    text: TextSession,
    input: InputState,
    gesture: Gesture,
    queue: ActionQueue,
    keymap: Keymap,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keymap(keymap: Keymap) -> Self {
        Self {
            keymap,
            ..Self::default()
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn tools(&self) -> &ToolMachine {
        &self.tools
    }

    pub fn text_session(&self) -> &TextSession {
        &self.text
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    /// Marquee rectangle in world coordinates, while one is being dragged.
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Marquee(marquee) => Some(marquee.to_rect()),
            _ => None,
        }
    }

    /// Whether a drag of any kind is in progress.
    pub fn is_busy(&self) -> bool {
        !matches!(self.gesture, Gesture::None) || self.tools.is_active()
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    fn modifiers(&self) -> Modifiers {
        self.input.modifiers
    }

    // --- Pointer ---

    /// Process a pointer event given in screen coordinates.
    pub fn handle_pointer(&mut self, canvas: &mut Canvas, event: PointerEvent) {
        self.input.handle_pointer_event(event);
        match event {
            PointerEvent::Down { position, button, .. } => self.pointer_down(canvas, position, button),
            PointerEvent::Move { position } => self.pointer_move(canvas, position),
            PointerEvent::Up { position, button } => self.pointer_up(canvas, position, button),
            PointerEvent::Scroll { position, delta } => self.scroll(canvas, position, delta),
        }
    }

    fn space_held(&self) -> bool {
        self.input.is_key_pressed(" ") || self.input.is_key_pressed("Space")
    }

    fn pointer_down(&mut self, canvas: &mut Canvas, screen: Point, button: MouseButton) {
        // A release we never saw leaves a stale gesture behind
        if !matches!(self.gesture, Gesture::None) {
            self.finish_gesture(canvas, None);
        }

        let pan = button == MouseButton::Middle
            || (button == MouseButton::Left
                && (canvas.active_tool() == ToolKind::Pan || self.space_held()));
        if pan {
            self.gesture = Gesture::Pan;
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        let world = canvas.viewport.screen_to_world(screen);
        let hit = canvas.element_at_point(world, canvas.hit_tolerance());

        if let Some(editing) = self.text.editing_id() {
            if hit == Some(editing) {
                return;
            }
            self.text.finish(canvas);
        }

        match canvas.active_tool() {
            ToolKind::Select => self.select_down(canvas, world, hit),
            ToolKind::Text => {
                let existing_text = hit.filter(|id| is_text(canvas, *id));
                match existing_text {
                    Some(id) => {
                        self.text.edit_existing(canvas, id);
                    }
                    None => {
                        self.text.begin(canvas, world);
                    }
                }
            }
            ToolKind::Pan => {}
            tool => {
                self.tools.pointer_down(canvas, tool, world);
            }
        }
    }

    fn select_down(&mut self, canvas: &mut Canvas, world: Point, hit: Option<ElementId>) {
        if self.input.is_double_click() {
            if let Some(id) = hit.filter(|id| is_text(canvas, *id)) {
                self.text.edit_existing(canvas, id);
                return;
            }
        }

        let handle_tolerance = HANDLE_HIT_TOLERANCE / canvas.viewport.zoom;
        let movable = movable_selection(canvas);
        if !movable.is_empty() {
            let handles = selection_handles(canvas);
            if let Some(kind) = hit_test_handles(&handles, world, handle_tolerance) {
                self.gesture = match kind {
                    HandleKind::Corner(corner) => ResizeState::new(canvas, &movable, corner)
                        .map_or(Gesture::None, Gesture::Resize),
                    HandleKind::Rotate => RotateState::new(canvas, movable[0])
                        .map_or(Gesture::None, Gesture::Rotate),
                };
                return;
            }
        }

        let shift = self.modifiers().shift;
        let Some(id) = hit else {
            if !shift {
                canvas.clear_selection();
            }
            self.gesture = Gesture::Marquee(SelectionRect::new(world, shift));
            return;
        };

        let members = canvas.group_members(id);
        if shift {
            let selected = canvas.is_selected(id);
            for member in members {
                if selected {
                    canvas.remove_from_selection(member);
                } else {
                    canvas.add_to_selection(member);
                }
            }
        } else if !canvas.is_selected(id) {
            canvas.select_elements(&members);
        }

        if canvas.is_selected(id) {
            let ids = movable_selection(canvas);
            if let Some(state) = MoveState::new(canvas, &ids, id, world) {
                self.gesture = Gesture::Move(state);
            }
        }
    }

    fn pointer_move(&mut self, canvas: &mut Canvas, screen: Point) {
        let world = canvas.viewport.screen_to_world(screen);
        let modifiers = self.modifiers();
        match &mut self.gesture {
            Gesture::None => {
                if self.tools.is_active() {
                    self.tools.pointer_move(canvas, world, modifiers);
                }
            }
            Gesture::Pan => canvas.viewport.pan_by(self.input.pointer_delta()),
            Gesture::Move(state) => state.update(canvas, world),
            Gesture::Resize(state) => state.update(canvas, world, modifiers.shift),
            Gesture::Rotate(state) => state.update(canvas, world, modifiers.shift),
            Gesture::Marquee(marquee) => marquee.current = world,
        }
    }

    fn pointer_up(&mut self, canvas: &mut Canvas, screen: Point, button: MouseButton) {
        let panning = matches!(self.gesture, Gesture::Pan);
        if button != MouseButton::Left && !panning {
            return;
        }
        if panning {
            self.pointer_move(canvas, screen);
            self.gesture = Gesture::None;
            return;
        }

        let world = canvas.viewport.screen_to_world(screen);
        if !matches!(self.gesture, Gesture::None) {
            self.pointer_move(canvas, screen);
            self.finish_gesture(canvas, Some(world));
        } else if self.tools.is_active() {
            let modifiers = self.modifiers();
            self.tools.pointer_up(canvas, world, modifiers);
        }
    }

    fn finish_gesture(&mut self, canvas: &mut Canvas, release: Option<Point>) {
        match std::mem::take(&mut self.gesture) {
            Gesture::None | Gesture::Pan => {}
            Gesture::Move(state) => {
                state.finish(canvas);
            }
            Gesture::Resize(state) => {
                state.finish(canvas);
            }
            Gesture::Rotate(state) => {
                state.finish(canvas);
            }
            Gesture::Marquee(mut marquee) => {
                if let Some(point) = release {
                    marquee.current = point;
                }
                let selected = marquee.finish(canvas);
                log::debug!("Marquee selected {} elements", selected.len());
            }
        }
    }

    /// Roll back the active gesture or drawing without a history entry.
    fn abort_gesture(&mut self, canvas: &mut Canvas) -> bool {
        let aborted = match std::mem::take(&mut self.gesture) {
            Gesture::None => false,
            Gesture::Pan | Gesture::Marquee(_) => true,
            Gesture::Move(state) => {
                state.cancel(canvas);
                true
            }
            Gesture::Resize(state) => {
                state.cancel(canvas);
                true
            }
            Gesture::Rotate(state) => {
                state.cancel(canvas);
                true
            }
        };
        if self.tools.is_active() {
            self.tools.cancel(canvas);
            return true;
        }
        aborted
    }

    fn scroll(&mut self, canvas: &mut Canvas, screen: Point, delta: Vec2) {
        if self.modifiers().command() {
            if delta.y == 0.0 {
                return;
            }
            let factor = if delta.y > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
            canvas.zoom_at(screen, factor);
        } else {
            canvas.viewport.pan_by(delta);
        }
    }

    // --- Keyboard ---

    /// Process a key press. Returns whether anything consumed it.
    pub fn key_down(&mut self, canvas: &mut Canvas, key: &str) -> bool {
        self.input.handle_key_event(KeyEvent::Pressed(key.to_string()));
        let modifiers = self.modifiers();

        if self.text.is_editing() {
            if modifiers.command() {
                return match self.keymap.resolve(key, modifiers) {
                    Some(action) => self.dispatch(canvas, action),
                    None => false,
                };
            }
            return match text_key(key) {
                Some(text_key) => self.text.handle_key(canvas, &text_key, modifiers),
                None => false,
            };
        }

        match self.keymap.resolve(key, modifiers) {
            Some(action) => {
                self.dispatch(canvas, action);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        self.input.handle_key_event(KeyEvent::Released(key.to_string()));
    }

    /// Type a string into the active text session.
    pub fn type_text(&mut self, canvas: &mut Canvas, text: &str) -> bool {
        if !self.text.is_editing() || self.text.release_if_missing(canvas) {
            return false;
        }
        let modifiers = self.modifiers();
        for c in text.chars() {
            let key = if c == '\n' { TextKey::Enter } else { TextKey::Char(c) };
            // A typed newline stays inside the text
            let modifiers = Modifiers {
                shift: modifiers.shift || c == '\n',
                ..modifiers
            };
            self.text.handle_key(canvas, &key, modifiers);
        }
        true
    }

    // --- Actions ---

    pub fn enqueue(&mut self, action: Action) {
        self.queue.push(action);
    }

    pub fn queue_mut(&mut self) -> &mut ActionQueue {
        &mut self.queue
    }

    /// Drain the action queue in order; returns how many actions had an effect.
    pub fn process_queue(&mut self, canvas: &mut Canvas) -> usize {
        let mut applied = 0;
        while let Some(action) = self.queue.pop() {
            if self.dispatch(canvas, action) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply a single action. Returns whether it changed anything.
    pub fn dispatch(&mut self, canvas: &mut Canvas, action: Action) -> bool {
        if self.text.is_editing() && !action.allowed_while_editing() {
            log::debug!("Ignoring {} while editing text", action);
            return false;
        }
        if interrupts_gesture(action) {
            self.abort_gesture(canvas);
        }
        log::trace!("Dispatch {}", action);

        match action {
            Action::SetTool(tool) => {
                canvas.set_active_tool(tool);
                true
            }
            Action::Undo | Action::Redo => {
                let changed = if action == Action::Undo { canvas.undo() } else { canvas.redo() };
                self.text.release_if_missing(canvas);
                changed
            }
            Action::Copy => canvas.copy(),
            Action::Cut => canvas.cut(),
            Action::Paste => !canvas.paste().is_empty(),
            Action::CopyStyle => canvas.copy_style(),
            Action::PasteStyle => canvas.paste_style(),
            Action::SelectAll => {
                canvas.select_all();
                !canvas.is_empty()
            }
            Action::Duplicate => !canvas.duplicate_selected_elements().is_empty(),
            Action::Delete => canvas.delete_selected_elements() > 0,
            Action::ResetZoom => {
                canvas.reset_zoom();
                true
            }
            Action::ZoomToFit => {
                canvas.zoom_to_fit();
                true
            }
            Action::ZoomIn | Action::ZoomOut => {
                let factor = if action == Action::ZoomIn { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                let center = canvas.viewport.bounds.center();
                canvas.zoom_at(center, factor);
                true
            }
            Action::SelectNext => canvas.select_next().is_some(),
            Action::SelectPrevious => canvas.select_previous().is_some(),
            Action::ToggleMagnetic => {
                canvas.toggle_magnetic();
                true
            }
            Action::ToggleGrid => {
                canvas.toggle_grid();
                true
            }
            Action::ToggleSnapToGrid => {
                canvas.toggle_snap_to_grid();
                true
            }
            Action::BringForward => canvas.bring_forward(),
            Action::SendBackward => canvas.send_backward(),
            Action::BringToFront => canvas.bring_to_front(),
            Action::SendToBack => canvas.send_to_back(),
            Action::Group => canvas.group_selected().is_some(),
            Action::Ungroup => canvas.ungroup_selected(),
            Action::ToggleLock => canvas.toggle_lock_selected(),
            Action::Align(alignment) => canvas.align_selected(alignment),
            Action::Cancel => self.cancel(canvas),
        }
    }

    /// Escape: abort a drag, then a text session, then drop the selection.
    pub fn cancel(&mut self, canvas: &mut Canvas) -> bool {
        if self.abort_gesture(canvas) {
            return true;
        }
        if self.text.is_editing() {
            self.text.cancel(canvas);
            return true;
        }
        if !canvas.selected_ids().is_empty() {
            canvas.clear_selection();
            return true;
        }
        false
    }

    /// Window resize from the host, in screen pixels.
    pub fn resize(&mut self, canvas: &mut Canvas, width: f64, height: f64) {
        canvas.set_viewport_bounds(Rect::new(0.0, 0.0, width, height));
    }
}

fn is_text(canvas: &Canvas, id: ElementId) -> bool {
    canvas
        .get_element(id)
        .is_some_and(|e| e.element_type() == ElementType::Text)
}

/// Selected ids that are not locked.
fn movable_selection(canvas: &Canvas) -> Vec<ElementId> {
    canvas
        .selected_elements()
        .into_iter()
        .filter(|e| !e.locked)
        .map(|e| e.id())
        .collect()
}

/// View-only actions leave an in-flight drag alone.
fn interrupts_gesture(action: Action) -> bool {
    !matches!(
        action,
        Action::ResetZoom
            | Action::ZoomToFit
            | Action::ZoomIn
            | Action::ZoomOut
            | Action::ToggleGrid
            | Action::ToggleMagnetic
            | Action::ToggleSnapToGrid
            | Action::Copy
            | Action::CopyStyle
            | Action::Cancel
    )
}

fn text_key(key: &str) -> Option<TextKey> {
    match key {
        "Enter" => Some(TextKey::Enter),
        "Escape" => Some(TextKey::Escape),
        "Backspace" => Some(TextKey::Backspace),
        "Space" => Some(TextKey::Char(' ')),
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(TextKey::Char(c)),
                _ => None,
            }
        }
    }
}
