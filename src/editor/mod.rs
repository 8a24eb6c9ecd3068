//! The editing session: owns the pixel buffer, its history and the view, and routes
//! pointer, touch and keyboard input to the active tool.

pub mod tools;

use image::DynamicImage;

use crate::canvas::PixelBuffer;
use crate::config::{EditorConfiguration, FeatureFlags};
use crate::error::{EditorError, EditorResult};
use crate::export::encode_data_url;
use crate::geometry::{Color, ScreenPoint, ScreenRect, ToolBounds};
use crate::history::HistoryStack;
use crate::input::{
    resolve_shortcut, InputContext, KeyPhase, ShortcutAction, ShortcutKey, ShortcutModifiers,
};
use crate::ops::{
    composite_text_box, infer_background, remove_color_region, ColorRemoval, TextBoxSpec,
    TextBoxStyle,
};
use crate::source::{PageRasterizer, SourceDocument};
use crate::state::{PhaseMachine, SessionEvent, SessionPhase};
use crate::text::TextRenderer;
use crate::viewport::{TouchMode, TouchTracker, TouchUpdate, ViewTransform, WheelInput, WheelOutcome};
use tools::{EraseFill, PointerInput, ToolCommand, ToolController, ToolKind};

/// Result of feeding one input event to the session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditOutcome {
    Ignored,
    /// Pixels changed and a history snapshot was recorded.
    Committed,
    /// Pixels changed mid-stroke; the snapshot is recorded on release.
    Painted,
    ColorPicked(Color),
    /// The host should now collect text and style for this rectangle.
    TextBoxRequested(ToolBounds),
    ViewChanged,
}

pub struct EditorSession {
    config: EditorConfiguration,
    phase: PhaseMachine,
    buffer: Option<PixelBuffer>,
    history: HistoryStack<PixelBuffer>,
    view: ViewTransform,
    tools: ToolController,
    touch: TouchTracker,
    manual_color: Option<Color>,
    manual_mode: bool,
    pending_text_box: Option<ToolBounds>,
    text_style: TextBoxStyle,
    renderer: Box<dyn TextRenderer>,
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("phase", &self.phase.phase())
            .field("active_tool", &self.tools.active_tool())
            .field("history_len", &self.history.len())
            .field("history_index", &self.history.index())
            .field("view", &self.view.state())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    pub fn new(
        config: EditorConfiguration,
        container: ScreenRect,
        renderer: Box<dyn TextRenderer>,
    ) -> Self {
        let config = config.sanitized();
        Self {
            phase: PhaseMachine::new(),
            buffer: None,
            history: HistoryStack::new(),
            view: ViewTransform::new(container, config.auto_rotate_enabled),
            tools: ToolController::new(config.features, config.brush_radius),
            touch: TouchTracker::new(),
            manual_color: None,
            manual_mode: false,
            pending_text_box: None,
            text_style: config.text_box,
            renderer,
            config,
        }
    }

    pub fn config(&self) -> &EditorConfiguration {
        &self.config
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase.phase()
    }

    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.buffer.as_ref()
    }

    pub fn history(&self) -> &HistoryStack<PixelBuffer> {
        &self.history
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    /// Replaces the pixel buffer with a decoded image and records the baseline snapshot.
    ///
    /// On failure the previous buffer (if any) and phase are left untouched.
    pub fn load_image(&mut self, image: &DynamicImage) -> EditorResult<()> {
        let buffer = PixelBuffer::from_image(image).map_err(|err| {
            tracing::warn!(?err, "decoded image rejected");
            err
        })?;

        self.tools.cancel_gesture();
        self.touch.end();
        self.pending_text_box = None;
        self.view.set_buffer_size(buffer.width(), buffer.height());
        self.history.clear();
        self.history.push(buffer.clone());
        tracing::info!(
            width = buffer.width(),
            height = buffer.height(),
            rotated = self.view.is_rotated(),
            "image loaded"
        );
        self.buffer = Some(buffer);
        self.phase.transition(SessionEvent::ImageDecoded)?;
        Ok(())
    }

    /// Detects the upload kind, decodes it, and loads the result.
    pub fn load_source(
        &mut self,
        bytes: &[u8],
        rasterizer: &dyn PageRasterizer,
    ) -> EditorResult<()> {
        let image = SourceDocument::detect(bytes)
            .and_then(|document| document.decode(rasterizer))
            .map_err(|err| {
                tracing::warn!(?err, phase = ?self.phase.phase(), "source failed to decode");
                err
            })?;
        self.load_image(&image)
    }

    pub fn features(&self) -> &FeatureFlags {
        &self.config.features
    }

    /// Applies new feature switches. A stroke cut short by a disabled brush is committed.
    pub fn set_features(&mut self, features: FeatureFlags) -> EditOutcome {
        self.config.features = features;
        let pending = self.tools.set_features(features);
        self.apply(pending)
    }

    pub fn active_tool(&self) -> ToolKind {
        self.tools.active_tool()
    }

    pub fn available_tools(&self) -> Vec<ToolKind> {
        tools::available_tools(&self.config.features)
    }

    pub fn select_tool(&mut self, tool: ToolKind) -> EditorResult<()> {
        self.tools.select(tool)?;
        Ok(())
    }

    pub fn brush_radius(&self) -> u32 {
        self.tools.brush_radius()
    }

    pub fn set_brush_radius(&mut self, radius: u32) {
        self.tools.set_brush_radius(radius);
        self.config.brush_radius = self.tools.brush_radius();
    }

    /// Rectangle being dragged by a rectangle tool, for preview drawing.
    pub fn drag_bounds(&self) -> Option<ToolBounds> {
        self.tools.drag_bounds()
    }

    pub fn manual_color(&self) -> Option<Color> {
        self.manual_color
    }

    pub fn is_manual_color_mode(&self) -> bool {
        self.manual_mode && self.manual_color.is_some()
    }

    pub fn set_manual_color_mode(&mut self, enabled: bool) {
        self.manual_mode = enabled;
    }

    pub fn pointer_down(&mut self, screen: ScreenPoint) -> EditOutcome {
        if !self.accepts_pointer("down") {
            return EditOutcome::Ignored;
        }
        let input = self.pointer_input(screen);
        let command = self.tools.pointer_down(input);
        self.apply(command)
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint) -> EditOutcome {
        if !self.accepts_pointer("move") {
            return EditOutcome::Ignored;
        }
        let input = self.pointer_input(screen);
        let command = self.tools.pointer_move(input);
        self.apply(command)
    }

    pub fn pointer_up(&mut self, screen: ScreenPoint) -> EditOutcome {
        if !self.accepts_pointer("up") {
            return EditOutcome::Ignored;
        }
        let input = self.pointer_input(screen);
        let command = self.tools.pointer_up(input);
        self.apply(command)
    }

    /// Pointer left the surface or the gesture was interrupted.
    pub fn pointer_cancel(&mut self) -> EditOutcome {
        let command = self.tools.cancel_gesture();
        self.apply(command)
    }

    pub fn wheel(&mut self, input: WheelInput) -> WheelOutcome {
        if self.buffer.is_none() {
            return WheelOutcome::Ignored;
        }
        self.view.apply_wheel(input, self.config.features.zoom)
    }

    pub fn touch_start(&mut self, points: &[ScreenPoint]) -> EditOutcome {
        match (self.touch.begin(points), points.first()) {
            (Some(TouchMode::Draw), Some(&point)) => self.pointer_down(point),
            _ => EditOutcome::Ignored,
        }
    }

    pub fn touch_move(&mut self, points: &[ScreenPoint]) -> EditOutcome {
        match self
            .touch
            .update(points, &mut self.view, self.config.features.zoom)
        {
            TouchUpdate::Draw(point) => self.pointer_move(point),
            TouchUpdate::Navigated => EditOutcome::ViewChanged,
            TouchUpdate::Ignored => EditOutcome::Ignored,
        }
    }

    /// Ends the touch gesture. `last` is the final position of a drawing finger.
    pub fn touch_end(&mut self, last: Option<ScreenPoint>) -> EditOutcome {
        match (self.touch.end(), last) {
            (Some(TouchMode::Draw), Some(point)) => self.pointer_up(point),
            (Some(TouchMode::Draw), None) => self.pointer_cancel(),
            _ => EditOutcome::Ignored,
        }
    }

    pub fn set_container(&mut self, container: ScreenRect) {
        self.view.set_container(container);
    }

    pub fn toggle_rotation(&mut self) {
        self.view.toggle_rotation();
        tracing::debug!(rotated = self.view.is_rotated(), "rotation toggled");
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_with(ViewTransform::zoom_in)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_with(ViewTransform::zoom_out)
    }

    pub fn reset_view(&mut self) -> bool {
        self.zoom_with(ViewTransform::reset)
    }

    fn zoom_with(&mut self, op: fn(&mut ViewTransform)) -> bool {
        if !self.config.features.zoom || self.buffer.is_none() {
            return false;
        }
        op(&mut self.view);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history_available() && self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history_available() && self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        if !self.history_available() {
            return false;
        }
        let Some(snapshot) = self.history.undo().cloned() else {
            tracing::debug!("nothing to undo");
            return false;
        };
        self.buffer = Some(snapshot);
        tracing::info!(index = self.history.index(), len = self.history.len(), "undo");
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.history_available() {
            return false;
        }
        let Some(snapshot) = self.history.redo().cloned() else {
            tracing::debug!("nothing to redo");
            return false;
        };
        self.buffer = Some(snapshot);
        tracing::info!(index = self.history.index(), len = self.history.len(), "redo");
        true
    }

    pub fn pending_text_box(&self) -> Option<ToolBounds> {
        self.pending_text_box
    }

    /// Style the host should pre-fill: the last committed one, or the configured default.
    pub fn text_box_style(&self) -> TextBoxStyle {
        if self.uses_simplified_text_box() {
            self.text_style.simplified()
        } else {
            self.text_style
        }
    }

    /// Composites the pending text box. Blank content cancels instead and returns `false`.
    pub fn commit_text_box(&mut self, content: &str, style: TextBoxStyle) -> EditorResult<bool> {
        let bounds = self.pending_text_box.ok_or(EditorError::NoPendingTextBox)?;
        if content.trim().is_empty() {
            self.cancel_text_box()?;
            return Ok(false);
        }
        let style = if self.uses_simplified_text_box() {
            style.simplified()
        } else {
            style
        }
        .sanitized();

        let Some(buffer) = self.buffer.as_mut() else {
            return Err(EditorError::NotLoaded);
        };
        self.phase.transition(SessionEvent::TextBoxCommitted)?;
        let spec = TextBoxSpec {
            bounds,
            content: content.to_string(),
            style,
        };
        let lines = composite_text_box(buffer, self.renderer.as_ref(), &spec);
        self.pending_text_box = None;
        self.text_style = style;
        self.commit("text box");
        tracing::info!(lines, ?bounds, "text box committed");
        Ok(true)
    }

    pub fn cancel_text_box(&mut self) -> EditorResult<()> {
        if self.pending_text_box.is_none() {
            return Err(EditorError::NoPendingTextBox);
        }
        self.phase.transition(SessionEvent::TextBoxCancelled)?;
        self.pending_text_box = None;
        tracing::debug!("text box cancelled");
        Ok(())
    }

    /// Resolves and performs a keyboard shortcut. Returns the action when it took effect.
    ///
    /// [`ShortcutAction::CommitTextBox`] is only reported; the host supplies the content.
    pub fn handle_key(
        &mut self,
        key: ShortcutKey,
        key_phase: KeyPhase,
        modifiers: ShortcutModifiers,
        text_input_focused: bool,
    ) -> Option<ShortcutAction> {
        let context = InputContext {
            features: self.config.features,
            text_input_focused,
            composing_text: self.phase.phase() == SessionPhase::ComposingText,
        };
        let action = resolve_shortcut(key, key_phase, modifiers, context)?;
        let handled = match action {
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.reset_view(),
            ShortcutAction::SelectTool(tool) => self.select_tool(tool).is_ok(),
            ShortcutAction::BeginMomentaryPan => self.tools.begin_momentary_pan(),
            ShortcutAction::EndMomentaryPan => self.tools.end_momentary_pan(),
            ShortcutAction::CancelTextBox => self.cancel_text_box().is_ok(),
            ShortcutAction::CommitTextBox => self.pending_text_box.is_some(),
        };
        handled.then_some(action)
    }

    pub fn export_png(&self) -> EditorResult<Vec<u8>> {
        let buffer = self.buffer.as_ref().ok_or(EditorError::NotLoaded)?;
        buffer.to_png().map_err(EditorError::Save)
    }

    pub fn export_data_url(&self) -> EditorResult<String> {
        let buffer = self.buffer.as_ref().ok_or(EditorError::NotLoaded)?;
        encode_data_url(buffer).map_err(EditorError::Save)
    }

    /// Encodes the current buffer and hands the PNG data URL to `on_save`.
    pub fn save<F>(&self, on_save: F) -> EditorResult<()>
    where
        F: FnOnce(String),
    {
        let url = self.export_data_url().map_err(|err| {
            tracing::warn!(?err, "save failed");
            err
        })?;
        tracing::info!(bytes = url.len(), "saving edited image");
        on_save(url);
        Ok(())
    }

    fn uses_simplified_text_box(&self) -> bool {
        let features = &self.config.features;
        features.word_box_simplified && !features.word_box
    }

    fn history_available(&self) -> bool {
        self.config.features.undo_redo
            && self.phase.phase() == SessionPhase::Editing
            && !self.tools.is_gesture_active()
    }

    fn accepts_pointer(&self, event: &'static str) -> bool {
        let phase = self.phase.phase();
        if phase.accepts_pointer_input() && self.buffer.is_some() {
            return true;
        }
        tracing::debug!(event, ?phase, "pointer input refused");
        false
    }

    fn pointer_input(&self, screen: ScreenPoint) -> PointerInput {
        PointerInput::new(screen, self.view.screen_to_pixel(screen))
            .with_corner(self.view.screen_to_corner(screen))
    }

    fn apply(&mut self, command: ToolCommand) -> EditOutcome {
        match command {
            ToolCommand::None => EditOutcome::Ignored,
            ToolCommand::RemoveColor { seed } => {
                let Some(buffer) = self.buffer.as_mut() else {
                    return EditOutcome::Ignored;
                };
                match remove_color_region(buffer, seed) {
                    ColorRemoval::Removed { pixels, seed } if pixels > 0 => {
                        tracing::debug!(pixels, ?seed, "color region removed");
                        self.commit("color wand")
                    }
                    _ => EditOutcome::Ignored,
                }
            }
            ToolCommand::PickColor { at } => {
                let Some(buffer) = self.buffer.as_ref() else {
                    return EditOutcome::Ignored;
                };
                match buffer.get(at.x, at.y) {
                    Ok(color) => {
                        let color = color.opaque();
                        self.manual_color = Some(color);
                        self.manual_mode = true;
                        tracing::debug!(?color, "manual background color picked");
                        EditOutcome::ColorPicked(color)
                    }
                    Err(err) => {
                        tracing::warn!(?err, "color pick outside buffer");
                        EditOutcome::Ignored
                    }
                }
            }
            ToolCommand::EraseRect { bounds, fill } => {
                let Some(buffer) = self.buffer.as_mut() else {
                    return EditOutcome::Ignored;
                };
                let Some(bounds) = bounds.clamp_to(buffer.bounds()) else {
                    return EditOutcome::Ignored;
                };
                let color = match (fill, self.manual_mode, self.manual_color) {
                    (EraseFill::White, _, _) => Color::WHITE,
                    (EraseFill::Background, true, Some(manual)) => manual,
                    (EraseFill::Background, _, _) => infer_background(buffer, bounds),
                };
                buffer.set_rect(bounds, color);
                tracing::debug!(?bounds, ?color, ?fill, "rectangle erased");
                self.commit("erase rectangle")
            }
            ToolCommand::PaintStroke { from, to, radius } => {
                let Some(buffer) = self.buffer.as_mut() else {
                    return EditOutcome::Ignored;
                };
                buffer.paint_segment(from, to, radius as f32, Color::WHITE);
                EditOutcome::Painted
            }
            ToolCommand::CommitStroke => self.commit("brush stroke"),
            ToolCommand::RequestTextBox { bounds } => {
                if let Err(err) = self.phase.transition(SessionEvent::TextBoxRequested) {
                    tracing::warn!(?err, "text box request refused");
                    return EditOutcome::Ignored;
                }
                self.pending_text_box = Some(bounds);
                EditOutcome::TextBoxRequested(bounds)
            }
            ToolCommand::Pan { dx, dy } => {
                self.view.pan_by_display(dx, dy);
                EditOutcome::ViewChanged
            }
        }
    }

    fn commit(&mut self, reason: &'static str) -> EditOutcome {
        let Some(buffer) = self.buffer.as_ref() else {
            return EditOutcome::Ignored;
        };
        self.history.push(buffer.clone());
        tracing::debug!(
            reason,
            index = self.history.index(),
            len = self.history.len(),
            "snapshot committed"
        );
        EditOutcome::Committed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::TextAlign;
    use crate::source::NoPdfSupport;
    use crate::text::test_support::FixedAdvanceRenderer;
    use image::{Rgba, RgbaImage};

    const PAPER: Color = Color::new(240, 240, 235);
    const WIDTH: u32 = 100;
    const HEIGHT: u32 = 50;

    fn config() -> EditorConfiguration {
        EditorConfiguration {
            auto_rotate_enabled: false,
            ..EditorConfiguration::default()
        }
    }

    fn session_with(config: EditorConfiguration) -> EditorSession {
        EditorSession::new(
            config,
            ScreenRect::new(0.0, 0.0, 100.0, 100.0),
            Box::new(FixedAdvanceRenderer { advance: 4.0 }),
        )
    }

    fn timetable() -> DynamicImage {
        let mut image = RgbaImage::from_pixel(WIDTH, HEIGHT, Rgba(PAPER.to_array()));
        for y in 10..20 {
            for x in 10..30 {
                image.put_pixel(x, y, Rgba([120, 120, 200, 255]));
            }
        }
        for x in 50..60 {
            image.put_pixel(x, 30, Rgba([20, 20, 20, 255]));
        }
        DynamicImage::ImageRgba8(image)
    }

    fn loaded_session() -> EditorSession {
        let mut session = session_with(config());
        session
            .load_image(&timetable())
            .expect("fixture image should load");
        session
    }

    fn screen(session: &EditorSession, x: i32, y: i32) -> ScreenPoint {
        session
            .view()
            .buffer_to_screen(f64::from(x) + 0.5, f64::from(y) + 0.5)
    }

    fn drag(session: &mut EditorSession, from: (i32, i32), to: (i32, i32)) -> EditOutcome {
        let start = screen(session, from.0, from.1);
        let end = screen(session, to.0, to.1);
        session.pointer_down(start);
        session.pointer_move(end);
        session.pointer_up(end)
    }

    fn click(session: &mut EditorSession, x: i32, y: i32) -> EditOutcome {
        let point = screen(session, x, y);
        let outcome = session.pointer_down(point);
        session.pointer_up(point);
        outcome
    }

    fn pixel(session: &EditorSession, x: i32, y: i32) -> Color {
        session
            .buffer()
            .expect("buffer should be loaded")
            .get(x, y)
            .expect("pixel should be in range")
    }

    #[test]
    fn pointer_input_is_refused_before_load() {
        let mut session = session_with(config());
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert_eq!(
            session.pointer_down(ScreenPoint::new(10.0, 10.0)),
            EditOutcome::Ignored
        );
        assert!(!session.can_undo());
        assert!(matches!(session.export_png(), Err(EditorError::NotLoaded)));
    }

    #[test]
    fn load_records_baseline_and_enters_editing() {
        let session = loaded_session();
        assert_eq!(session.phase(), SessionPhase::Editing);
        assert_eq!(session.history().len(), 1);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.view().scale(), 1.0);
    }

    #[test]
    fn failed_decode_leaves_session_loading() {
        let mut session = session_with(config());
        let err = session
            .load_source(b"definitely not a png", &NoPdfSupport)
            .expect_err("garbage should not decode");
        assert!(matches!(err, EditorError::Source(_)));
        assert_eq!(session.phase(), SessionPhase::Loading);
        assert!(session.buffer().is_none());
    }

    #[test]
    fn load_source_accepts_encoded_png() {
        let png = loaded_session().export_png().expect("png should encode");
        let mut session = session_with(config());
        session
            .load_source(&png, &NoPdfSupport)
            .expect("png should load");
        assert_eq!(pixel(&session, 15, 15), Color::new(120, 120, 200));
    }

    #[test]
    fn color_wand_whitens_region_and_commits_once() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::ColorWand)
            .expect("wand should be enabled");

        assert_eq!(click(&mut session, 15, 15), EditOutcome::Committed);
        assert_eq!(pixel(&session, 15, 15), Color::WHITE);
        assert_eq!(pixel(&session, 5, 5), PAPER);
        assert_eq!(session.history().len(), 2);
        assert_eq!(session.active_tool(), ToolKind::ColorWand);
    }

    #[test]
    fn color_wand_on_ink_is_a_silent_no_op() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::ColorWand)
            .expect("wand should be enabled");
        assert_eq!(click(&mut session, 55, 30), EditOutcome::Ignored);
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn n_commits_then_n_undos_restore_baseline() {
        let mut session = loaded_session();
        let baseline = session.buffer().cloned().expect("buffer should be loaded");

        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        drag(&mut session, (0, 0), (20, 20));
        session
            .select_tool(ToolKind::ColorWand)
            .expect("wand should be enabled");
        click(&mut session, 25, 15);
        session
            .select_tool(ToolKind::FreehandBrush)
            .expect("brush should be enabled");
        drag(&mut session, (50, 30), (60, 30));
        assert_eq!(session.history().len(), 4);

        for _ in 0..3 {
            assert!(session.undo());
        }
        assert!(!session.undo());
        assert_eq!(session.buffer(), Some(&baseline));
    }

    #[test]
    fn undo_then_redo_restores_pre_undo_state() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        drag(&mut session, (40, 5), (70, 25));
        let edited = session.buffer().cloned().expect("buffer should be loaded");

        assert!(session.undo());
        assert_ne!(session.buffer(), Some(&edited));
        assert!(session.can_redo());
        assert!(session.redo());
        assert_eq!(session.buffer(), Some(&edited));
        assert!(!session.can_redo());
    }

    #[test]
    fn new_commit_after_undo_discards_redo() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        drag(&mut session, (0, 0), (10, 10));
        drag(&mut session, (20, 20), (30, 30));
        assert!(session.undo());
        drag(&mut session, (40, 40), (45, 45));

        assert!(!session.can_redo());
        assert_eq!(session.history().len(), 3);
    }

    #[test]
    fn zero_height_drag_records_nothing() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        let before = session.buffer().cloned();

        assert_eq!(drag(&mut session, (10, 12), (40, 12)), EditOutcome::Ignored);
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.buffer().cloned(), before);
    }

    #[test]
    fn text_eraser_fills_with_inferred_paper() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::TextEraser)
            .expect("text eraser should be enabled");
        assert_eq!(drag(&mut session, (48, 28), (62, 33)), EditOutcome::Committed);
        assert_eq!(pixel(&session, 55, 30), PAPER);
    }

    #[test]
    fn picked_color_overrides_inference_and_switches_tool() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::ColorPicker)
            .expect("picker should be enabled");

        assert_eq!(
            click(&mut session, 15, 15),
            EditOutcome::ColorPicked(Color::new(120, 120, 200))
        );
        assert_eq!(session.active_tool(), ToolKind::TextEraser);
        assert!(session.is_manual_color_mode());

        drag(&mut session, (50, 29), (60, 32));
        assert_eq!(pixel(&session, 55, 30), Color::new(120, 120, 200));

        session.set_manual_color_mode(false);
        drag(&mut session, (50, 29), (60, 32));
        assert_eq!(pixel(&session, 55, 30), PAPER);
    }

    #[test]
    fn brush_stroke_paints_while_moving_and_commits_on_release() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::FreehandBrush)
            .expect("brush should be enabled");
        session.set_brush_radius(5);

        assert_eq!(
            session.pointer_down(screen(&session, 15, 15)),
            EditOutcome::Painted
        );
        assert_eq!(pixel(&session, 15, 15), Color::WHITE);
        assert!(!session.can_undo());
        assert_eq!(
            session.pointer_move(screen(&session, 25, 15)),
            EditOutcome::Painted
        );
        assert_eq!(
            session.pointer_up(screen(&session, 25, 15)),
            EditOutcome::Committed
        );
        assert_eq!(pixel(&session, 20, 15), Color::WHITE);
        assert_eq!(session.history().len(), 2);
    }

    #[test]
    fn disabling_brush_mid_stroke_commits_the_painted_stroke() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::FreehandBrush)
            .expect("brush should be enabled");
        session.set_brush_radius(5);
        session.pointer_down(screen(&session, 20, 20));
        assert_eq!(pixel(&session, 20, 20), Color::WHITE);

        let features = FeatureFlags {
            eraser: false,
            ..*session.features()
        };
        let outcome = session.set_features(features);
        assert_eq!(outcome, EditOutcome::Committed);
        assert_eq!(session.active_tool(), ToolKind::TextEraser);
        assert_eq!(session.history().len(), 2);
        assert!(session.can_undo());
        assert_eq!(
            session.pointer_up(screen(&session, 20, 20)),
            EditOutcome::Ignored
        );

        assert!(session.undo());
        assert_eq!(pixel(&session, 20, 20), PAPER);
    }

    #[test]
    fn rect_drag_past_the_canvas_covers_last_row_and_column() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        let rect = session.view().canvas_rect();
        session.pointer_down(ScreenPoint::new(rect.left - 5.0, rect.top - 5.0));
        session.pointer_move(ScreenPoint::new(rect.right() + 5.0, rect.bottom() + 5.0));
        assert_eq!(
            session.drag_bounds(),
            Some(ToolBounds::new(0, 0, WIDTH, HEIGHT))
        );
        assert_eq!(
            session.pointer_up(ScreenPoint::new(rect.right() + 5.0, rect.bottom() + 5.0)),
            EditOutcome::Committed
        );
        for (x, y) in [(0, 0), (99, 0), (0, 49), (99, 49), (55, 30)] {
            assert_eq!(pixel(&session, x, y), Color::WHITE, "({x}, {y})");
        }
    }

    #[test]
    fn text_box_flow_composites_on_commit() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::TextBox)
            .expect("text box should be enabled");

        let outcome = drag(&mut session, (40, 5), (90, 45));
        assert_eq!(
            outcome,
            EditOutcome::TextBoxRequested(ToolBounds::new(40, 5, 50, 40))
        );
        assert_eq!(session.phase(), SessionPhase::ComposingText);
        assert_eq!(
            session.pointer_down(screen(&session, 1, 1)),
            EditOutcome::Ignored
        );
        assert_eq!(session.history().len(), 1);

        let style = TextBoxStyle {
            font_size: 8.0,
            text_color: Color::new(200, 0, 0),
            background_color: Color::new(255, 255, 0),
            padding: 2.0,
            align: TextAlign::Left,
            ..TextBoxStyle::default()
        };
        assert!(session
            .commit_text_box("Art", style)
            .expect("commit should succeed"));

        assert_eq!(session.phase(), SessionPhase::Editing);
        assert_eq!(session.history().len(), 2);
        assert_eq!(pixel(&session, 43, 8), Color::new(200, 0, 0));
        assert_eq!(pixel(&session, 85, 40), Color::new(255, 255, 0));
        assert_eq!(session.pending_text_box(), None);
        assert_eq!(session.text_box_style().font_size, 8.0);
    }

    #[test]
    fn blank_text_box_content_cancels() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::TextBox)
            .expect("text box should be enabled");
        drag(&mut session, (10, 10), (30, 30));

        assert!(!session
            .commit_text_box("  \n ", TextBoxStyle::default())
            .expect("blank commit should cancel"));
        assert_eq!(session.phase(), SessionPhase::Editing);
        assert_eq!(session.history().len(), 1);
        assert!(matches!(
            session.cancel_text_box(),
            Err(EditorError::NoPendingTextBox)
        ));
    }

    #[test]
    fn escape_cancels_pending_text_box() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::TextBox)
            .expect("text box should be enabled");
        drag(&mut session, (10, 10), (30, 30));

        let action = session.handle_key(
            ShortcutKey::Escape,
            KeyPhase::Pressed,
            ShortcutModifiers::default(),
            true,
        );
        assert_eq!(action, Some(ShortcutAction::CancelTextBox));
        assert_eq!(session.phase(), SessionPhase::Editing);
    }

    #[test]
    fn simplified_text_box_ignores_decorations() {
        let mut cfg = config();
        cfg.features.word_box = false;
        cfg.features.word_box_simplified = true;
        let mut session = session_with(cfg);
        session
            .load_image(&timetable())
            .expect("fixture image should load");
        session
            .select_tool(ToolKind::TextBox)
            .expect("text box should be enabled");
        drag(&mut session, (40, 5), (90, 45));

        let style = TextBoxStyle {
            background_color: Color::new(0, 255, 0),
            border_width: 3.0,
            ..TextBoxStyle::default()
        };
        session
            .commit_text_box("x", style)
            .expect("commit should succeed");
        assert_eq!(pixel(&session, 40, 5), Color::WHITE);
    }

    #[test]
    fn undo_shortcut_respects_feature_flag() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        drag(&mut session, (0, 0), (10, 10));

        let mut features = *session.features();
        features.undo_redo = false;
        session.set_features(features);
        assert!(!session.can_undo());
        assert_eq!(
            session.handle_key(
                ShortcutKey::Character('z'),
                KeyPhase::Pressed,
                ShortcutModifiers::new(true, false),
                false
            ),
            None
        );

        features.undo_redo = true;
        session.set_features(features);
        assert_eq!(
            session.handle_key(
                ShortcutKey::Character('z'),
                KeyPhase::Pressed,
                ShortcutModifiers::new(true, false),
                false
            ),
            Some(ShortcutAction::Undo)
        );
    }

    #[test]
    fn space_hold_pans_then_restores_tool() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        let modifiers = ShortcutModifiers::default();
        session.handle_key(ShortcutKey::Space, KeyPhase::Pressed, modifiers, false);
        assert_eq!(session.active_tool(), ToolKind::Pan);

        let start = ScreenPoint::new(50.0, 50.0);
        session.pointer_down(start);
        assert_eq!(
            session.pointer_move(ScreenPoint::new(60.0, 45.0)),
            EditOutcome::ViewChanged
        );
        session.pointer_up(ScreenPoint::new(60.0, 45.0));
        assert_eq!(session.view().pan(), ScreenPoint::new(10.0, -5.0));
        assert_eq!(session.history().len(), 1);

        session.handle_key(ShortcutKey::Space, KeyPhase::Released, modifiers, false);
        assert_eq!(session.active_tool(), ToolKind::RectEraser);
    }

    #[test]
    fn zoom_is_disabled_by_feature_flag() {
        let mut cfg = config();
        cfg.features.zoom = false;
        let mut session = session_with(cfg);
        session
            .load_image(&timetable())
            .expect("fixture image should load");

        assert!(!session.zoom_in());
        let outcome = session.wheel(WheelInput {
            delta_y: -10.0,
            zoom_modifier: true,
            pointer: ScreenPoint::new(50.0, 50.0),
            ..WheelInput::default()
        });
        assert_eq!(outcome, WheelOutcome::Ignored);
        assert_eq!(session.view().scale(), 1.0);
    }

    #[test]
    fn single_finger_touch_draws_two_fingers_navigate() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::FreehandBrush)
            .expect("brush should be enabled");
        let point = screen(&session, 15, 15);
        assert_eq!(session.touch_start(&[point]), EditOutcome::Painted);
        assert_eq!(session.touch_end(Some(point)), EditOutcome::Committed);

        let before = session.buffer().cloned();
        let fingers = [ScreenPoint::new(40.0, 50.0), ScreenPoint::new(60.0, 50.0)];
        assert_eq!(session.touch_start(&fingers), EditOutcome::Ignored);
        let spread = [ScreenPoint::new(30.0, 50.0), ScreenPoint::new(70.0, 50.0)];
        assert_eq!(session.touch_move(&spread), EditOutcome::ViewChanged);
        session.touch_end(None);

        assert_eq!(session.view().scale(), 2.0);
        assert_eq!(session.buffer().cloned(), before);
    }

    #[test]
    fn out_of_bounds_pointer_is_clamped() {
        let mut session = loaded_session();
        session
            .select_tool(ToolKind::RectEraser)
            .expect("rect eraser should be enabled");
        let outside = ScreenPoint::new(-500.0, -500.0);
        let inside = screen(&session, 5, 5);
        session.pointer_down(outside);
        assert_eq!(session.pointer_up(inside), EditOutcome::Committed);
        assert_eq!(pixel(&session, 0, 0), Color::WHITE);
        assert_eq!(pixel(&session, 4, 4), Color::WHITE);
        assert_eq!(pixel(&session, 5, 5), PAPER);
        assert_eq!(session.drag_bounds(), None);
    }

    #[test]
    fn save_hands_png_data_url_to_callback() {
        let session = loaded_session();
        let mut saved = None;
        session
            .save(|url| saved = Some(url))
            .expect("save should succeed");
        let url = saved.expect("callback should run");
        assert!(url.starts_with("data:image/png;base64,"));
        assert_eq!(
            url,
            session.export_data_url().expect("export should succeed")
        );
    }
}
