/// Generic exercise icon (a dumbbell), scaled to whatever bounds it gets
use iced::widget::canvas::{self, Path};
use iced::widget::Canvas;
use iced::{mouse, Color, Element, Length, Point, Rectangle, Renderer, Size, Theme};

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExerciseIcon;

impl<Message> canvas::Program<Message> for DefaultExerciseIcon {
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

        // Work in a 64x64 box centered in the bounds
        let side = bounds.width.min(bounds.height);
        let unit = side / 64.0;
        let origin = Point::new(
            (bounds.width - side) / 2.0,
            (bounds.height - side) / 2.0,
        );
        let rect = |x: f32, y: f32, w: f32, h: f32| {
            Path::rectangle(
                Point::new(origin.x + x * unit, origin.y + y * unit),
                Size::new(w * unit, h * unit),
            )
        };

        let palette = theme.extended_palette();
        let background = palette.background.weak.color;
        let plate = palette.background.strong.text;
        let bar = Color { a: 0.6, ..plate };

        frame.fill(&rect(0.0, 0.0, 64.0, 64.0), background);
        frame.fill(&rect(14.0, 30.0, 36.0, 4.0), bar);
        for (x, y, w, h) in [
            (10.0, 22.0, 6.0, 20.0),
            (48.0, 22.0, 6.0, 20.0),
            (5.0, 26.0, 5.0, 12.0),
            (54.0, 26.0, 5.0, 12.0),
        ] {
            frame.fill(&rect(x, y, w, h), plate);
        }

        vec![frame.into_geometry()]
    }
}

/// Icon that fills its parent
pub fn default_exercise_icon<'a, Message: 'a>() -> Element<'a, Message> {
    Canvas::new(DefaultExerciseIcon)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
