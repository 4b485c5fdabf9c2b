use iced::mouse::Cursor;
use iced::widget::{canvas, column, row, text};
use iced::{Element, Font, Point, Rectangle, Renderer, Size, Theme};

use ferrochip_driver::{self as driver, DrawList, Raster, RegisterSnapshot, Surface};

use crate::Message;

/// A canvas that replays the draw commands of the last frame
pub struct Screen<'a> {
    frame: &'a DrawList,
    raster: &'a Raster,
}

impl<'a> Screen<'a> {
    pub fn new(frame: &'a DrawList, raster: &'a Raster) -> Self {
        Self { frame, raster }
    }

    /// A canvas of exactly the surface size, so one host pixel is one canvas unit
    pub fn view(self) -> Element<'a, Message> {
        let (width, height) = self.raster.surface_size();
        canvas::Canvas::new(self)
            .width(width as f32)
            .height(height as f32)
            .into()
    }
}

impl canvas::Program<Message> for Screen<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &(),
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        // Fill frames background with the off color until the first frame arrives
        let background = canvas::Path::rectangle(Point::ORIGIN, bounds.size());
        frame.fill(&background, color(self.raster.palette.off));

        self.frame.replay(&mut CanvasSurface { frame: &mut frame });

        vec![frame.into_geometry()]
    }
}

struct CanvasSurface<'a> {
    frame: &'a mut canvas::Frame,
}

impl Surface for CanvasSurface<'_> {
    fn line(&mut self, from: driver::Point, to: driver::Point, rgb: driver::Color) {
        let path = canvas::Path::line(Point::new(from.x, from.y), Point::new(to.x, to.y));
        let stroke = canvas::Stroke::default()
            .with_color(color(rgb))
            .with_width(1.0);
        self.frame.stroke(&path, stroke);
    }

    fn fill_rect(&mut self, origin: driver::Point, side: f32, rgb: driver::Color) {
        self.frame.fill_rectangle(
            Point::new(origin.x, origin.y),
            Size::new(side, side),
            color(rgb),
        );
    }
}

fn color(rgb: driver::Color) -> iced::Color {
    iced::Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

/// The sixteen general purpose registers in two columns
pub fn registers<'a>(snapshot: &RegisterSnapshot) -> Element<'a, Message> {
    let values = snapshot.values();
    let (low, high) = values.split_at(values.len() / 2);
    let offset = low.len();

    row![
        column(low.iter().enumerate().map(|(i, &value)| register(i, value))),
        column(
            high.iter()
                .enumerate()
                .map(|(i, &value)| register(i + offset, value))
        ),
    ]
    .spacing(15)
    .into()
}

fn register<'a>(index: usize, value: u8) -> Element<'a, Message> {
    text(format!("V{index:X} {value:02X}"))
        .font(Font::MONOSPACE)
        .into()
}
