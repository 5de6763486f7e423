/// Loading spinner
/// Draws a rotating arc over a faint track. The owner advances `rotation`.
use iced::widget::canvas::{self, path, LineCap, Path, Stroke};
use iced::widget::Canvas;
use iced::{mouse, Color, Element, Radians, Rectangle, Renderer, Theme};

/// Length of the moving arc, in radians
const ARC_LENGTH: f32 = 4.2;
const STROKE_WIDTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct Spinner {
    pub rotation: f32,
}

impl<Message> canvas::Program<Message> for Spinner {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let center = frame.center();
        let radius = (bounds.width.min(bounds.height) / 2.0 - STROKE_WIDTH).max(1.0);
        let palette = theme.palette();

        let track = Path::circle(center, radius);
        frame.stroke(
            &track,
            Stroke::default()
                .with_color(Color { a: 0.2, ..palette.text })
                .with_width(STROKE_WIDTH),
        );

        let arc = Path::new(|builder| {
            builder.arc(path::Arc {
                center,
                radius,
                start_angle: Radians(self.rotation),
                end_angle: Radians(self.rotation + ARC_LENGTH),
            });
        });
        frame.stroke(
            &arc,
            Stroke::default()
                .with_color(palette.primary)
                .with_width(STROKE_WIDTH)
                .with_line_cap(LineCap::Round),
        );

        vec![frame.into_geometry()]
    }
}

/// A square spinner of `size` pixels
pub fn spinner<'a, Message: 'a>(rotation: f32, size: f32) -> Element<'a, Message> {
    Canvas::new(Spinner { rotation })
        .width(size)
        .height(size)
        .into()
}
