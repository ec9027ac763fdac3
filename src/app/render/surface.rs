use eframe::egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, Vec2};

/// The drawing operations the renderer needs, small enough to fake in
/// tests. All coordinates are local to the graph canvas.
pub(in crate::app) trait DrawSurface {
    fn size(&self) -> Vec2;
    fn clear(&mut self, color: Color32);
    fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32);
    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32);
    fn circle_stroke(&mut self, center: Pos2, radius: f32, width: f32, color: Color32);
    fn triangle(&mut self, corners: [Pos2; 3], color: Color32);
    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32);
}

/// egui-backed surface. Translates canvas-local coordinates into the
/// panel rect, so the renderer never sees the panel offset; pixel density
/// is the backend's business.
pub(in crate::app) struct PainterSurface<'a> {
    painter: &'a Painter,
    rect: Rect,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, rect: Rect) -> Self {
        Self { painter, rect }
    }

    fn global(&self, pos: Pos2) -> Pos2 {
        pos + self.rect.min.to_vec2()
    }
}

impl DrawSurface for PainterSurface<'_> {
    fn size(&self) -> Vec2 {
        self.rect.size()
    }

    fn clear(&mut self, color: Color32) {
        self.painter.rect_filled(self.rect, 0.0, color);
    }

    fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        self.painter
            .line_segment([self.global(from), self.global(to)], Stroke::new(width, color));
    }

    fn circle_filled(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.painter.circle_filled(self.global(center), radius, color);
    }

    fn circle_stroke(&mut self, center: Pos2, radius: f32, width: f32, color: Color32) {
        self.painter
            .circle_stroke(self.global(center), radius, Stroke::new(width, color));
    }

    fn triangle(&mut self, corners: [Pos2; 3], color: Color32) {
        let points = corners.iter().map(|p| self.global(*p)).collect();
        self.painter
            .add(Shape::convex_polygon(points, color, Stroke::NONE));
    }

    fn text(&mut self, pos: Pos2, anchor: Align2, text: &str, size: f32, color: Color32) {
        self.painter.text(
            self.global(pos),
            anchor,
            text,
            FontId::proportional(size),
            color,
        );
    }
}
