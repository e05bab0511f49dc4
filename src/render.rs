use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use tracing::{info, warn};

use crate::color::{self, Rgb};
use crate::config::{EngineConfig, RenderConfig};
use crate::data::load_data;
use crate::error::{ConfigError, Error, Result};
use crate::layout::{format_value, Bar, Label, LayoutElement};
use crate::plan::ChartPlan;
use crate::text::TextRenderer;

const MARGIN_TOP: f32 = 36.0;
const MARGIN_RIGHT: f32 = 70.0;
const MARGIN_BOTTOM: f32 = 44.0;
const MARGIN_LEFT_BARE: f32 = 20.0;
const TITLE_SIZE: f32 = 16.0;
const AXIS_SIZE: f32 = 12.0;
const LABEL_SIZE: f32 = 11.0;
const PILL_PAD: f32 = 4.0;

fn skia(c: Rgb) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn skia_alpha(c: Rgb, alpha: f64) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn fill_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let Some(rect) = Rect::from_xywh(x, y, w.max(0.5), h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color);
    pixmap.fill_rect(rect, &paint, Transform::identity(), None);
}

fn stroke_rect(pixmap: &mut Pixmap, x: f32, y: f32, w: f32, h: f32, color: Color) {
    let Some(rect) = Rect::from_xywh(x, y, w.max(0.5), h) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    let path = PathBuilder::from_rect(rect);
    pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
}

fn draw_line(pixmap: &mut Pixmap, x1: f32, y1: f32, x2: f32, y2: f32, color: Color, width: f32) {
    let mut paint = Paint::default();
    paint.set_color(color);
    paint.anti_alias = true;
    let stroke = Stroke {
        width,
        ..Stroke::default()
    };
    let mut pb = PathBuilder::new();
    pb.move_to(x1, y1);
    pb.line_to(x2, y2);
    if let Some(path) = pb.finish() {
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }
}

/// Upper bound on grid lines, whatever the extent.
const MAX_TICKS: usize = 50;

/// Step between grid lines: 1, 2 or 5 times a power of ten, aiming for
/// about five intervals. Falls back to `max` itself when the range is too
/// small for a power of ten to be represented.
fn tick_step(max: f64) -> f64 {
    let raw = max / 5.0;
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };
    let step = nice * magnitude;
    if step > 0.0 && step.is_finite() {
        step
    } else if max > 0.0 && max.is_finite() {
        max
    } else {
        1.0
    }
}

/// Number of grid intervals drawn for `max` at `step`.
fn tick_count(max: f64, step: f64) -> usize {
    let count = (max / step).floor();
    if count.is_finite() && count >= 0.0 {
        (count as usize).min(MAX_TICKS)
    } else {
        0
    }
}

/// Maps data coordinates (time on x, slots on y) onto the plot area.
struct Frame {
    left: f32,
    right: f32,
    top: f32,
    bottom: f32,
    x_max: f64,
    rows: usize,
}

impl Frame {
    /// Plot area of a `width` x `height` chart. Row names need a wider left
    /// margin when they are drawn.
    fn for_plan(plan: &ChartPlan, text: Option<&TextRenderer>, width: u32, height: u32) -> Self {
        let left = text.map_or(MARGIN_LEFT_BARE, |text| {
            let widest = plan
                .elements
                .iter()
                .map(|e| text.measure_text(&e.row_name, AXIS_SIZE))
                .fold(0.0, f32::max);
            (widest + 16.0).min(width as f32 / 3.0)
        });
        let extent = plan.extent();
        Frame {
            left,
            right: (width as f32 - MARGIN_RIGHT).max(left + 1.0),
            top: MARGIN_TOP,
            bottom: (height as f32 - MARGIN_BOTTOM).max(MARGIN_TOP + 1.0),
            x_max: if extent > 0.0 { extent } else { 1.0 },
            rows: plan.rows(),
        }
    }

    fn x(&self, value: f64) -> f32 {
        self.left + (value / self.x_max) as f32 * (self.right - self.left)
    }

    fn slot_height(&self) -> f32 {
        (self.bottom - self.top) / self.rows.max(1) as f32
    }

    /// Vertical center of `slot`; slot 0 is the bottom row.
    fn y_center(&self, slot: usize) -> f32 {
        self.bottom - (slot as f32 + 0.5) * self.slot_height()
    }

    fn bar_rect(&self, bar: &Bar, slot: usize) -> (f32, f32, f32, f32) {
        let h = bar.height as f32 * self.slot_height();
        let x = self.x(bar.offset);
        (x, self.y_center(slot) - h / 2.0, self.x(bar.offset + bar.width) - x, h)
    }
}

fn draw_grid(pixmap: &mut Pixmap, frame: &Frame, text: Option<&TextRenderer>, axis_label: &str) {
    let grid = skia(color::WHITE);
    let step = tick_step(frame.x_max);
    let ticks = tick_count(frame.x_max, step);

    for i in 0..=ticks {
        let value = i as f64 * step;
        let x = frame.x(value);
        draw_line(pixmap, x, frame.top, x, frame.bottom, grid, 1.0);
        if let Some(text) = text {
            text.draw_centered(
                pixmap,
                &format_value(value),
                x,
                frame.bottom + 16.0,
                AXIS_SIZE,
                skia(color::TEXT_DARK),
            );
        }
    }
    for slot in 0..frame.rows {
        let y = frame.y_center(slot);
        draw_line(pixmap, frame.left, y, frame.right, y, grid, 1.0);
    }

    if let Some(text) = text {
        let cx = (frame.left + frame.right) / 2.0;
        text.draw_centered(
            pixmap,
            axis_label,
            cx,
            frame.bottom + 36.0,
            AXIS_SIZE,
            skia(color::TEXT_DARK),
        );
    }
}

/// Colored box with white text, anchored at `left`.
fn draw_pill(
    pixmap: &mut Pixmap,
    text: &TextRenderer,
    label: &Label,
    left: f32,
    center_y: f32,
    height: f32,
) {
    let size = LABEL_SIZE.min(height * 0.8);
    let w = text.measure_text(&label.text, size) + 2.0 * PILL_PAD;
    let top = center_y - height / 2.0;
    fill_rect(pixmap, left, top, w, height, skia(label.color));
    stroke_rect(pixmap, left, top, w, height, skia(color::mute(label.color)));
    text.draw_text(
        pixmap,
        &label.text,
        left + PILL_PAD,
        center_y + size / 3.0,
        size,
        skia(color::WHITE),
    );
}

fn draw_element(
    pixmap: &mut Pixmap,
    frame: &Frame,
    text: Option<&TextRenderer>,
    element: &LayoutElement,
) {
    let outline = skia(element.outline_color);

    let (x, y, w, h) = frame.bar_rect(&element.bar_outer, element.slot);
    fill_rect(pixmap, x, y, w, h, skia_alpha(element.outer_color, element.outer_opacity));
    stroke_rect(pixmap, x, y, w, h, outline);

    if element.bar_inner.width > 0.0 {
        let (x, y, w, h) = frame.bar_rect(&element.bar_inner, element.slot);
        fill_rect(pixmap, x, y, w, h, skia(element.inner_color));
        stroke_rect(pixmap, x, y, w, h, outline);
    }

    let Some(text) = text else {
        return;
    };
    let cy = frame.y_center(element.slot);
    let pill_h = element.bar_inner.height as f32 * frame.slot_height();

    if let Some(label) = &element.label_left {
        draw_pill(pixmap, text, label, frame.x(label.x) + PILL_PAD, cy, pill_h);
    }
    if let Some(label) = &element.label_right {
        draw_pill(pixmap, text, label, frame.x(label.x) + PILL_PAD, cy, pill_h);
    }
    if let Some(caption) = &element.caption {
        let size = LABEL_SIZE.min(pill_h * 0.8);
        text.draw_centered(
            pixmap,
            &caption.text,
            frame.x(caption.x),
            cy + size / 3.0,
            size,
            skia(caption.color),
        );
    }

    let name_size = text.fit_size(&element.row_name, frame.left - 8.0, AXIS_SIZE);
    let name_w = text.measure_text(&element.row_name, name_size);
    text.draw_text(
        pixmap,
        &element.row_name,
        frame.left - 6.0 - name_w,
        cy + name_size / 3.0,
        name_size,
        skia(color::TEXT_DARK),
    );
}

/// Draws `plan` into a new `width` x `height` pixmap. Without a font only
/// the grid and bars are drawn.
pub fn render_chart(
    plan: &ChartPlan,
    text: Option<&TextRenderer>,
    width: u32,
    height: u32,
) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(width, height)
        .ok_or(Error::Config(ConfigError::InvalidDimensions { width, height }))?;
    pixmap.fill(skia(color::WHITE));
    let frame = Frame::for_plan(plan, text, width, height);

    fill_rect(
        &mut pixmap,
        frame.left,
        frame.top,
        frame.right - frame.left,
        frame.bottom - frame.top,
        skia(color::LAVENDER),
    );
    draw_grid(&mut pixmap, &frame, text, plan.unit.label());

    for element in &plan.elements {
        draw_element(&mut pixmap, &frame, text, element);
    }

    if let Some(text) = text {
        text.draw_text(
            &mut pixmap,
            &plan.title,
            frame.left,
            24.0,
            TITLE_SIZE,
            skia(color::TEXT_DARK),
        );
    }

    Ok(pixmap)
}

pub fn render_png(
    plan: &ChartPlan,
    text: Option<&TextRenderer>,
    width: u32,
    height: u32,
    path: &Path,
) -> Result<()> {
    let pixmap = render_chart(plan, text, width, height)?;
    pixmap.save_png(path).map_err(|e| Error::Encode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn render_input(
    input: &Path,
    config: &RenderConfig,
    engine: &EngineConfig,
    font: Option<&[u8]>,
) -> Result<PathBuf> {
    let dataset = load_data(input)?;
    info!(input = %input.display(), tasks = dataset.len(), "loaded tasks");
    if dataset.is_empty() {
        warn!(input = %input.display(), "no task records, chart shows only the rollup");
    }

    let plan = ChartPlan::build(&dataset, config.title_for(input), engine);

    if config.plan {
        let plan_path = config.plan_path(input);
        plan.write_json(&plan_path)?;
        info!(path = %plan_path.display(), "wrote layout plan");
    }

    // Each chart gets its own TextRenderer since they run in parallel threads
    let text = font
        .map(TextRenderer::from_bytes)
        .transpose()
        .map_err(|reason| Error::Font {
            path: config.font.clone().unwrap_or_default(),
            reason: reason.to_string(),
        })?;

    let png_path = config.png_path(input);
    render_png(&plan, text.as_ref(), config.width, config.height, &png_path)?;
    info!(path = %png_path.display(), "wrote chart");
    Ok(png_path)
}

/// Renders every input to its own PNG in parallel. Fails early only when the
/// output directory or font cannot be used; per-input failures are returned
/// alongside their input, in input order.
pub fn render_all(
    config: &RenderConfig,
    engine: &EngineConfig,
) -> Result<Vec<(PathBuf, Result<PathBuf>)>> {
    std::fs::create_dir_all(&config.output_dir).map_err(|e| Error::io(&config.output_dir, e))?;

    let font = match &config.font {
        Some(path) => Some(TextRenderer::read_font(path)?),
        None => {
            warn!("no --font given, labels will not be drawn");
            None
        }
    };

    Ok(config
        .inputs
        .par_iter()
        .map(|input| {
            let result = render_input(input, config, engine, font.as_deref());
            (input.clone(), result)
        })
        .collect())
}
