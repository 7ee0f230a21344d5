use crate::Message;
use iced::{
    alignment, mouse, touch,
    widget::canvas::{self, Frame, Geometry, Path, Stroke, Text},
    Color, Pixels, Point, Rectangle, Renderer, Size, Theme,
};
use tubecore::markers::MarkerGlyph;

/// Largest box the photo is scaled into.
pub const VIEW_BOX: Size = Size::new(560.0, 420.0);

/// Pointer press on the overlay, relative to its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapEvent {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scales `natural` down to fit `VIEW_BOX`, never up.
pub fn fit_to_view(natural_width: u32, natural_height: u32) -> Size {
    let width = natural_width.max(1) as f32;
    let height = natural_height.max(1) as f32;
    let scale = (VIEW_BOX.width / width)
        .min(VIEW_BOX.height / height)
        .min(1.0);
    Size::new(width * scale, height * scale)
}

/// Sequence number centered on the circle at `center`.
fn label_text(glyph: &MarkerGlyph, center: Point) -> Text {
    Text {
        content: glyph.label.to_string(),
        position: center,
        color: Color::WHITE,
        size: Pixels(glyph.font_size),
        align_x: alignment::Horizontal::Center.into(),
        align_y: alignment::Vertical::Center,
        ..Text::default()
    }
}

/// Numbered circles drawn over the rendered photo.
pub struct MarkerOverlay {
    glyphs: Vec<MarkerGlyph>,
}

impl MarkerOverlay {
    pub fn new(glyphs: Vec<MarkerGlyph>) -> Self {
        Self { glyphs }
    }
}

impl canvas::Program<Message> for MarkerOverlay {
    type State = ();

    fn update(
        &self,
        _state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        let position = match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                cursor.position_in(bounds)?
            }
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. })
                if bounds.contains(*position) =>
            {
                Point::new(position.x - bounds.x, position.y - bounds.y)
            }
            _ => return None,
        };

        Some(
            canvas::Action::publish(Message::Tapped(TapEvent {
                x: position.x,
                y: position.y,
                width: bounds.width,
                height: bounds.height,
            }))
            .and_capture(),
        )
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        for glyph in &self.glyphs {
            let center = Point::new(
                glyph.center.x as f32 / 100.0 * bounds.width,
                glyph.center.y as f32 / 100.0 * bounds.height,
            );
            let circle = Path::circle(center, glyph.diameter / 2.0);
            let fill = Color::from_rgba8(glyph.color.r, glyph.color.g, glyph.color.b, glyph.color.a);
            frame.fill(&circle, fill);
            frame.stroke(
                &circle,
                Stroke::default().with_width(2.0).with_color(Color::WHITE),
            );

            frame.fill_text(label_text(glyph, center));
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn large_photo_is_scaled_into_view_box() {
        let size = fit_to_view(4000, 3000);
        assert_eq!(size, Size::new(560.0, 420.0));
    }

    #[test]
    fn small_photo_keeps_natural_size() {
        assert_eq!(fit_to_view(200, 100), Size::new(200.0, 100.0));
    }

    #[test]
    fn label_is_anchored_at_circle_center() {
        let glyph = tubecore::markers::glyphs(
            &[tubecore::geometry::Marker::new(50.0, 50.0)],
            &tubecore::markers::Palette::default(),
            20,
            24,
        )[0];
        let center = Point::new(120.0, 80.0);
        let label = label_text(&glyph, center);
        assert_eq!(label.content, "1");
        assert_eq!(label.position, center);
        assert_eq!(label.size, Pixels(12.0));
        assert!(matches!(label.align_y, alignment::Vertical::Center));
    }

    #[test]
    fn portrait_photo_is_limited_by_height() {
        let size = fit_to_view(1000, 2000);
        assert_eq!(size.height, 420.0);
        assert_eq!(size.width, 210.0);
    }
}
