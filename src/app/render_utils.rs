use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2, vec2};
use hop_radar::layout::Point;
use hop_radar::render::FillKind;

pub(super) const RING_COLOR: Color32 = Color32::from_rgb(0x88, 0x88, 0x88);
pub(super) const LINE_COLOR: Color32 = Color32::from_rgb(0x99, 0x99, 0x99);
pub(super) const TEXT_COLOR: Color32 = Color32::from_rgb(0x22, 0x22, 0x22);
pub(super) const HIGHLIGHT_COLOR: Color32 = Color32::from_rgb(0xff, 0xb0, 0x20);

pub(super) fn fill_color(fill: FillKind) -> Color32 {
    let [r, g, b] = fill.rgb();
    Color32::from_rgb(r, g, b)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect) {
    painter.rect_filled(rect, 0.0, Color32::WHITE);
}

/// Surface coordinates are pinned so that `center` sits in the middle of `rect`.
pub(super) fn world_to_screen(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    center: Point,
    world: Point,
) -> Pos2 {
    let offset = vec2((world.x - center.x) as f32, (world.y - center.y) as f32);
    rect.center() + pan + offset * zoom
}

pub(super) fn screen_to_world(
    rect: Rect,
    pan: Vec2,
    zoom: f32,
    center: Point,
    screen: Pos2,
) -> Point {
    let offset = (screen - rect.center() - pan) / zoom;
    Point::new(center.x + offset.x as f64, center.y + offset.y as f64)
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}
