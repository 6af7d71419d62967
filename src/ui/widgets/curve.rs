//! Temperature curve widget drawn on a braille canvas

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, Widget,
    },
};

use crate::chart::{CurveGeometry, Tooltip};
use crate::theme::Theme;

/// Polyline points per cubic segment
const STEPS_PER_SEGMENT: usize = 8;

/// Horizontal offset of the tooltip label from its sample
const TOOLTIP_OFFSET: f64 = 6.0;

/// Widget painting a [`CurveGeometry`] with a filled area, sample dots,
/// value labels and an optional tooltip
pub struct TemperatureCurve<'a> {
    geometry: &'a CurveGeometry,
    samples: &'a [f64],
    tooltip: Option<Tooltip>,
    theme: Theme,
    block: Option<Block<'a>>,
}

impl<'a> TemperatureCurve<'a> {
    pub fn new(geometry: &'a CurveGeometry, samples: &'a [f64], theme: Theme) -> Self {
        Self {
            geometry,
            samples,
            tooltip: None,
            theme,
            block: None,
        }
    }

    pub fn tooltip(mut self, tooltip: Option<Tooltip>) -> Self {
        self.tooltip = tooltip;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Canvas y grows upwards, the geometry's grows downwards
    fn flip(&self, y: f64) -> f64 {
        self.geometry.height - y
    }

    fn paint(&self, ctx: &mut Context) {
        let polyline = self.geometry.sample(STEPS_PER_SEGMENT);

        for point in &polyline {
            ctx.draw(&CanvasLine::new(
                point.x,
                0.0,
                point.x,
                self.flip(point.y),
                self.theme.curve_fill,
            ));
        }
        ctx.layer();

        for pair in polyline.windows(2) {
            ctx.draw(&CanvasLine::new(
                pair[0].x,
                self.flip(pair[0].y),
                pair[1].x,
                self.flip(pair[1].y),
                self.theme.curve,
            ));
        }

        let dots: Vec<(f64, f64)> = self
            .geometry
            .points
            .iter()
            .map(|p| (p.x, self.flip(p.y)))
            .collect();
        ctx.draw(&Points {
            coords: &dots,
            color: self.theme.accent,
        });
        ctx.layer();

        let label_style = Style::default().fg(self.theme.curve);
        for label in self.geometry.labels(self.samples) {
            ctx.print(
                label.anchor.x,
                self.flip(label.anchor.y),
                Span::styled(label.text, label_style),
            );
        }

        if let Some(tooltip) = self.tooltip {
            let position = tooltip.position;
            ctx.draw(&CanvasLine::new(
                position.x,
                0.0,
                position.x,
                self.geometry.height,
                self.theme.accent,
            ));
            ctx.layer();

            // Keep the label inside the box near the right edge
            let x = if position.x > self.geometry.width * 0.75 {
                position.x - TOOLTIP_OFFSET * 4.0
            } else {
                position.x + TOOLTIP_OFFSET
            };
            ctx.print(
                x,
                self.flip(position.y),
                Span::styled(format!(" {}° ", tooltip.value), self.theme.tooltip),
            );
        }
    }
}

impl<'a> Widget for TemperatureCurve<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let mut canvas = Canvas::default()
            .marker(Marker::Braille)
            .x_bounds([0.0, self.geometry.width])
            .y_bounds([0.0, self.geometry.height])
            .background_color(self.theme.background)
            .paint(|ctx| self.paint(ctx));
        if let Some(block) = self.block.clone() {
            canvas = canvas.block(block);
        }
        canvas.render(area, buf);
    }
}
