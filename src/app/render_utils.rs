use eframe::egui::{Color32, Painter, Pos2, Rect, Shape, Stroke, Vec2, epaint, vec2};

pub(super) fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(12, 14, 18));

    let step = (80.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(60, 70, 80, 50));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(position)
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    Rect::from_two_pos(start, end).expand(padding).intersects(rect)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

/// Control point bending the segment to its left, so opposite synapses between
/// the same pair of cells stay apart.
fn curve_control(start: Pos2, end: Pos2) -> Pos2 {
    let delta = end - start;
    let normal = vec2(-delta.y, delta.x) * 0.18;
    start + delta * 0.5 + normal
}

fn arrow_head(tip: Pos2, from: Pos2, size: f32, color: Color32) -> Shape {
    let direction = (tip - from).normalized();
    let side = vec2(-direction.y, direction.x) * (size * 0.5);
    let base = tip - direction * size;
    Shape::convex_polygon(vec![tip, base + side, base - side], color, Stroke::NONE)
}

/// Draws a synapse. `tip_inset` keeps the arrow tip outside the target circle.
pub(super) fn draw_edge(
    painter: &Painter,
    start: Pos2,
    end: Pos2,
    stroke: Stroke,
    curved: bool,
    tip_inset: f32,
) {
    if !curved {
        painter.line_segment([start, end], stroke);
        return;
    }

    let control = curve_control(start, end);
    let tip = end - (end - control).normalized() * tip_inset;
    painter.add(epaint::QuadraticBezierShape::from_points_stroke(
        [start, control, tip],
        false,
        Color32::TRANSPARENT,
        stroke,
    ));
    let head = (stroke.width * 4.0).clamp(4.0, 12.0);
    painter.add(arrow_head(tip, control, head, stroke.color));
}

/// Pan and zoom that fit `bounds` (world space) into `rect` with a margin.
pub(super) fn fit_view(rect: Rect, bounds: Rect) -> (Vec2, f32) {
    let size = bounds.size().max(vec2(1.0, 1.0));
    let zoom = ((rect.width() * 0.9) / size.x)
        .min((rect.height() * 0.9) / size.y)
        .clamp(0.02, 6.0);
    (-bounds.center().to_vec2() * zoom, zoom)
}
