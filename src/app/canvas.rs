use std::collections::HashSet;

use eframe::egui::{self, Align2, FontId, PointerButton, Rect, Response, Sense, Stroke, Ui, Vec2};
use hop_radar::layout::Point;
use hop_radar::render::{Cue, CueAction, DrawInstruction};

use super::render_utils::{
    HIGHLIGHT_COLOR, LINE_COLOR, RING_COLOR, TEXT_COLOR, circle_visible, draw_background,
    fill_color, screen_to_world, world_to_screen,
};

/// Node picked on the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) struct PickedNode {
    pub id: String,
    pub label: String,
}

pub(super) struct CanvasState {
    pub pan: Vec2,
    pub zoom: f32,
    pub selected: Option<PickedNode>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            selected: None,
        }
    }
}

impl CanvasState {
    fn handle_zoom(&mut self, ui: &Ui, rect: Rect, center: Point, response: &Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, center, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 12.0);
        let offset = Vec2::new(
            (world_before.x - center.x) as f32,
            (world_before.y - center.y) as f32,
        );
        self.pan = pointer - rect.center() - (offset * self.zoom);
    }

    fn handle_pan(&mut self, response: &Response) {
        if response.dragged_by(PointerButton::Primary)
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }
}

/// Paints every due draw cue in order and handles pan, zoom and picking.
pub(super) fn draw_radar(
    ui: &mut Ui,
    state: &mut CanvasState,
    cues: &[Cue],
    center: Point,
    highlighted: &HashSet<&str>,
) {
    let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
    let painter = ui.painter_at(rect);
    draw_background(&painter, rect);

    state.handle_zoom(ui, rect, center, &response);
    state.handle_pan(&response);

    let zoom = state.zoom;
    let pan = state.pan;
    let to_screen = |point: Point| world_to_screen(rect, pan, zoom, center, point);
    let stroke_width = zoom.clamp(0.5, 2.0);
    let font = FontId::proportional((8.0 * zoom).clamp(6.0, 22.0));

    let pointer = response.hover_pos();
    let mut hovered: Option<(f32, PickedNode)> = None;

    for cue in cues {
        let CueAction::Draw(instruction) = &cue.action else {
            continue;
        };

        match instruction {
            DrawInstruction::Ring { center: ring_center, radius } => {
                painter.circle_stroke(
                    to_screen(*ring_center),
                    *radius as f32 * zoom,
                    Stroke::new(stroke_width, RING_COLOR),
                );
            }
            DrawInstruction::Connect { from, to } => {
                painter.line_segment(
                    [to_screen(*from), to_screen(*to)],
                    Stroke::new(stroke_width, LINE_COLOR),
                );
            }
            DrawInstruction::PlaceNode {
                id,
                position,
                radius,
                fill,
                label,
            } => {
                let screen = to_screen(*position);
                let screen_radius = (*radius as f32 * zoom.powf(0.5)).clamp(2.0, 14.0);
                if !circle_visible(rect, screen, screen_radius + 200.0) {
                    continue;
                }

                let is_selected = state
                    .selected
                    .as_ref()
                    .is_some_and(|selected| &selected.id == id);
                let outline = if is_selected || highlighted.contains(id.as_str()) {
                    Stroke::new(2.0, HIGHLIGHT_COLOR)
                } else {
                    Stroke::new(1.0, egui::Color32::WHITE)
                };
                painter.circle(screen, screen_radius, fill_color(*fill), outline);
                painter.text(
                    screen + Vec2::new(5.0, -5.0),
                    Align2::LEFT_BOTTOM,
                    label,
                    font.clone(),
                    TEXT_COLOR,
                );

                if let Some(pointer) = pointer {
                    let distance = screen.distance(pointer);
                    if distance <= screen_radius + 4.0
                        && hovered.as_ref().is_none_or(|(best, _)| distance < *best)
                    {
                        hovered = Some((
                            distance,
                            PickedNode {
                                id: id.clone(),
                                label: label.clone(),
                            },
                        ));
                    }
                }
            }
        }
    }

    if let Some((_, node)) = &hovered {
        response.clone().on_hover_text(node.label.as_str());
    }

    if response.clicked() {
        state.selected = hovered.map(|(_, node)| node);
    }
}
