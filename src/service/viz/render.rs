//! PNG rasteriser for [`ChartSpec`]s, used for Discord attachments.

use std::f32::consts::PI;
use std::io::Cursor;

use ab_glyph::{FontArc, PxScale};
use font_kit::family_name::FamilyName;
use font_kit::properties::{Properties, Weight};
use font_kit::source::SystemSource;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_polygon_mut, draw_text_mut, text_size,
};
use imageproc::point::Point;
use imageproc::rect::Rect;
use thiserror::Error;

use super::{ChartKind, ChartSpec};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const TEXT: Rgba<u8> = Rgba([40, 40, 40, 255]);
const MUTED: Rgba<u8> = Rgba([110, 110, 110, 255]);
const BAR: Rgba<u8> = Rgba([76, 120, 168, 255]);
const GRID: Rgba<u8> = Rgba([230, 230, 230, 255]);

// Set2-style palette for pie slices.
const PALETTE: [Rgba<u8>; 8] = [
    Rgba([102, 194, 165, 255]),
    Rgba([252, 141, 98, 255]),
    Rgba([141, 160, 203, 255]),
    Rgba([231, 138, 195, 255]),
    Rgba([166, 216, 84, 255]),
    Rgba([255, 217, 47, 255]),
    Rgba([229, 196, 148, 255]),
    Rgba([179, 179, 179, 255]),
];

const WIDTH: u32 = 960;
const TITLE_HEIGHT: u32 = 70;
const ROW_HEIGHT: u32 = 34;
const LABEL_WIDTH: u32 = 260;
const MARGIN: u32 = 30;
const PIE_HEIGHT: u32 = 520;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font unavailable: {0}")]
    Font(String),
    #[error("chart has no data")]
    Empty,
    #[error("failed to encode png: {0}")]
    Encode(String),
}

pub fn render_png(chart: &ChartSpec) -> Result<Vec<u8>, RenderError> {
    if chart.values.is_empty() || chart.total() == 0 {
        return Err(RenderError::Empty);
    }
    let font = load_font()?;

    let canvas = match chart.kind {
        ChartKind::Bar => draw_bar(chart, &font),
        ChartKind::Pie => draw_pie(chart, &font),
    };

    let image = DynamicImage::ImageRgba8(canvas);
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(buffer)
}

fn load_font() -> Result<FontArc, RenderError> {
    let handle = SystemSource::new()
        .select_best_match(&[FamilyName::SansSerif], &Properties::new().weight(Weight::BOLD))
        .map_err(|e| RenderError::Font(format!("failed to find system font: {e}")))?;

    let font = handle
        .load()
        .map_err(|e| RenderError::Font(format!("failed to load font: {e}")))?;

    let data = font
        .copy_font_data()
        .ok_or_else(|| RenderError::Font("failed to copy font data".to_string()))?
        .to_vec();

    FontArc::try_from_vec(data).map_err(|_| RenderError::Font("invalid font data".to_string()))
}

/// Horizontal bars so long bigram labels stay readable.
fn draw_bar(chart: &ChartSpec, font: &FontArc) -> RgbaImage {
    let rows = chart.values.len() as u32;
    let height = TITLE_HEIGHT + rows * ROW_HEIGHT + MARGIN * 2;
    let mut img = RgbaImage::from_pixel(WIDTH, height, BACKGROUND);

    draw_centered_text(&mut img, font, &chart.title, PxScale::from(30.0), 0, WIDTH, 18, TEXT);

    let max = chart.values.iter().copied().max().unwrap_or(1).max(1);
    let plot_x = MARGIN + LABEL_WIDTH;
    let plot_width = WIDTH - plot_x - MARGIN - 60;
    let label_scale = PxScale::from(20.0);

    draw_filled_rect_mut(
        &mut img,
        Rect::at(plot_x as i32 - 1, TITLE_HEIGHT as i32).of_size(1, rows * ROW_HEIGHT),
        GRID,
    );

    for (i, (category, value)) in chart.categories.iter().zip(&chart.values).enumerate() {
        let y = TITLE_HEIGHT + i as u32 * ROW_HEIGHT;
        let label = fit_label(category, font, label_scale, LABEL_WIDTH - 12);
        let (lw, _) = text_size(label_scale, font, &label);
        draw_text_mut(
            &mut img,
            TEXT,
            (plot_x - 12 - lw) as i32,
            (y + 6) as i32,
            label_scale,
            font,
            &label,
        );

        let bar_width = ((*value as f32 / max as f32) * plot_width as f32).round().max(1.0) as u32;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(plot_x as i32, (y + 5) as i32).of_size(bar_width, ROW_HEIGHT - 10),
            BAR,
        );
        draw_text_mut(
            &mut img,
            MUTED,
            (plot_x + bar_width + 8) as i32,
            (y + 6) as i32,
            label_scale,
            font,
            &value.to_string(),
        );
    }

    let axis = format!("{} / {}", chart.y_label, chart.x_label);
    draw_text_mut(
        &mut img,
        MUTED,
        MARGIN as i32,
        (height - MARGIN) as i32,
        PxScale::from(18.0),
        font,
        &axis,
    );

    img
}

fn draw_pie(chart: &ChartSpec, font: &FontArc) -> RgbaImage {
    let mut img = RgbaImage::from_pixel(WIDTH, PIE_HEIGHT, BACKGROUND);
    draw_centered_text(&mut img, font, &chart.title, PxScale::from(30.0), 0, WIDTH, 18, TEXT);

    let radius = ((PIE_HEIGHT - TITLE_HEIGHT - MARGIN * 2) / 2) as i32;
    let cx = (MARGIN as i32) + radius + 40;
    let cy = TITLE_HEIGHT as i32 + MARGIN as i32 + radius;
    let total = chart.total() as f32;

    let mut start = -PI / 2.0;
    for (i, value) in chart.values.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        let sweep = *value as f32 / total * 2.0 * PI;
        if *value as f32 >= total {
            draw_filled_circle_mut(&mut img, (cx, cy), radius, color);
        } else if sweep > 0.0 {
            let poly = slice_polygon(cx, cy, radius as f32, start, sweep);
            if poly.len() >= 3 {
                draw_polygon_mut(&mut img, &poly, color);
            }
        }
        start += sweep;
    }

    if let Some(hole) = chart.hole.filter(|h| *h > 0.0) {
        let inner = (radius as f32 * hole).round() as i32;
        draw_filled_circle_mut(&mut img, (cx, cy), inner, BACKGROUND);
    }

    // legend
    let legend_x = cx + radius + 60;
    let scale = PxScale::from(22.0);
    for (i, (category, value)) in chart.categories.iter().zip(&chart.values).enumerate() {
        let y = TITLE_HEIGHT as i32 + MARGIN as i32 + i as i32 * 40;
        draw_filled_rect_mut(
            &mut img,
            Rect::at(legend_x, y + 2).of_size(22, 22),
            PALETTE[i % PALETTE.len()],
        );
        let pct = *value as f32 / total * 100.0;
        let text = format!("{category}  {value} ({pct:.1}%)");
        draw_text_mut(&mut img, TEXT, legend_x + 32, y, scale, font, &text);
    }

    img
}

/// Centre point plus points along the arc. Consecutive duplicates are removed.
fn slice_polygon(cx: i32, cy: i32, radius: f32, start: f32, sweep: f32) -> Vec<Point<i32>> {
    let steps = ((sweep / (2.0 * PI)) * 180.0).ceil().max(2.0) as usize;
    let mut poly = vec![Point::new(cx, cy)];
    for step in 0..=steps {
        let angle = start + sweep * step as f32 / steps as f32;
        let p = Point::new(
            cx + (radius * angle.cos()).round() as i32,
            cy + (radius * angle.sin()).round() as i32,
        );
        if poly.last() != Some(&p) {
            poly.push(p);
        }
    }
    if poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    poly
}

fn fit_label(label: &str, font: &FontArc, scale: PxScale, max_width: u32) -> String {
    if text_size(scale, font, label).0 <= max_width {
        return label.to_string();
    }
    let mut chars: Vec<char> = label.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate = format!("{}…", chars.iter().collect::<String>());
        if text_size(scale, font, &candidate).0 <= max_width {
            return candidate;
        }
    }
    String::new()
}

#[allow(clippy::too_many_arguments)]
fn draw_centered_text(
    img: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    scale: PxScale,
    x: u32,
    width: u32,
    y: u32,
    color: Rgba<u8>,
) {
    let (tw, _) = text_size(scale, font, text);
    let offset_x = x as i32 + ((width as i32 - tw as i32) / 2);
    draw_text_mut(img, color, offset_x, y as i32, scale, font, text);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_polygon_is_open() {
        let poly = slice_polygon(100, 100, 50.0, 0.0, PI / 2.0);
        assert_eq!(poly[0], Point::new(100, 100));
        assert_ne!(poly.first(), poly.last());
        assert!(poly.len() > 3);
    }

    #[test]
    fn empty_chart_is_rejected() {
        let chart = ChartSpec {
            kind: ChartKind::Bar,
            title: "t".into(),
            x_label: "x".into(),
            y_label: "y".into(),
            categories: vec![],
            values: vec![],
            hole: None,
            tick_angle: None,
        };
        assert!(matches!(render_png(&chart), Err(RenderError::Empty)));
    }
}
