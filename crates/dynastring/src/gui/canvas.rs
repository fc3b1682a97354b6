//! Waveform canvas: renders the two string segments.

use super::app::Message;
use iced::mouse;
use iced::widget::canvas::{self, event, Cache, Event, Geometry, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

/// Canvas for visualizing the string displacement.
///
/// Segment 1 is drawn point by point from the left end; at the junction
/// the x coordinate steps back by one spacing and forward by the
/// fractional offset, so segment 2 starts at its true physical position.
pub struct StringCanvas {
    cache: Cache,
    u: Vec<f64>,
    w: Vec<f64>,
    n: f64,
    alpha: f64,
    /// Adaptive amplitude scale (largest recent displacement).
    scale: f64,
}

impl StringCanvas {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self {
            cache: Cache::new(),
            u: Vec::new(),
            w: Vec::new(),
            n: 0.0,
            alpha: 0.0,
            scale: 1.0,
        }
    }

    /// Update the displayed waveform and invalidate the cache.
    pub fn update_waveform(&mut self, u: &[f64], w: &[f64], n: f64, alpha: f64) {
        self.u.clear();
        self.u.extend_from_slice(u);
        self.w.clear();
        self.w.extend_from_slice(w);
        self.n = n;
        self.alpha = alpha;

        let peak = self
            .u
            .iter()
            .chain(self.w.iter())
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        self.scale = peak.max(0.15);

        self.cache.clear();
    }
}

impl Default for StringCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl canvas::Program<Message> for StringCanvas {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(
                Point::ORIGIN,
                bounds.size(),
                Color::from_rgb(0.05, 0.05, 0.05),
            );

            if self.u.is_empty() || self.w.is_empty() {
                return;
            }

            let mid = bounds.height / 2.0;
            let spacing = bounds.width / (self.n as f32 + 1.0);
            let amplitude = bounds.height * 0.4;
            let to_y = |value: f64| mid - (value / self.scale) as f32 * amplitude;

            let path = Path::new(|builder| {
                builder.move_to(Point::new(0.0, mid));
                let mut x = 0.0f32;
                for &value in &self.u {
                    builder.line_to(Point::new(x, to_y(value)));
                    x += spacing;
                }
                // The junction sits a fractional spacing past segment 1's
                // last point.
                x -= spacing;
                x += self.alpha as f32 * spacing;
                for &value in &self.w {
                    builder.line_to(Point::new(x, to_y(value)));
                    x += spacing;
                }
                builder.line_to(Point::new(bounds.width, mid));
            });

            frame.stroke(
                &path,
                Stroke::default()
                    .with_color(Color::from_rgb(0.0, 0.9, 0.9))
                    .with_width(2.0),
            );

            // Junction marker.
            let junction_x = (self.u.len() as f32 - 1.0 + self.alpha as f32) * spacing;
            let marker = Path::new(|builder| {
                builder.move_to(Point::new(junction_x, 0.0));
                builder.line_to(Point::new(junction_x, bounds.height));
            });
            frame.stroke(
                &marker,
                Stroke::default()
                    .with_color(Color::from_rgba(1.0, 1.0, 1.0, 0.15))
                    .with_width(1.0),
            );
        });

        vec![geometry]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (event::Status, Option<Message>) {
        if let Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if let Some(position) = cursor.position_in(bounds) {
                let ratio = (position.x / bounds.width) as f64;
                return (
                    event::Status::Captured,
                    Some(Message::CanvasClick(ratio)),
                );
            }
        }
        (event::Status::Ignored, None)
    }
}
