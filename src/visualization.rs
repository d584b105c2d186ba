//! Training-progress artifacts: a PNG line chart, an ASCII fallback plot for
//! terminals, and CSV/JSON exports of the recorded history.

use image::{ImageBuffer, Rgb};
use std::io::Write;

use crate::error::{DqnError, Result};
use crate::metrics::TrainingHistory;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([96, 96, 96]);
const SERIES: Rgb<u8> = Rgb([30, 90, 200]);
const MARGIN: u32 = 10;

/// Render a series as a polyline and write it to `path` as a PNG image.
pub fn save_line_chart(values: &[f32], path: &str, width: u32, height: u32) -> Result<()> {
    if values.is_empty() {
        return Err(DqnError::EmptyBuffer("no values to plot".to_string()));
    }
    if width < 4 * MARGIN || height < 4 * MARGIN {
        return Err(DqnError::invalid_parameter(
            "width/height",
            "chart dimensions too small",
        ));
    }

    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);

    // Axes along the left and bottom margins.
    for y in MARGIN..height - MARGIN {
        img.put_pixel(MARGIN, y, AXIS);
    }
    for x in MARGIN..width - MARGIN {
        img.put_pixel(x, height - MARGIN, AXIS);
    }

    let min_val = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let span = if (max_val - min_val).abs() < f32::EPSILON {
        1.0
    } else {
        max_val - min_val
    };

    let plot_width = (width - 2 * MARGIN - 1) as f32;
    let plot_height = (height - 2 * MARGIN - 1) as f32;

    let to_pixel = |i: usize, value: f32| -> (i64, i64) {
        let x = if values.len() == 1 {
            0.0
        } else {
            i as f32 / (values.len() - 1) as f32 * plot_width
        };
        let y = (value - min_val) / span * plot_height;
        (
            (MARGIN + 1) as i64 + x as i64,
            (height - MARGIN - 1) as i64 - y as i64,
        )
    };

    let mut prev = to_pixel(0, values[0]);
    for (i, &value) in values.iter().enumerate().skip(1) {
        let next = to_pixel(i, value);
        draw_line(&mut img, prev, next, SERIES);
        prev = next;
    }
    if values.len() == 1 {
        let (x, y) = prev;
        put_pixel_clamped(&mut img, x, y, SERIES);
    }

    img.save(path)?;
    Ok(())
}

fn put_pixel_clamped(img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
        img.put_pixel(x as u32, y as u32, color);
    }
}

// Bresenham line rasterization.
fn draw_line(
    img: &mut ImageBuffer<Rgb<u8>, Vec<u8>>,
    (x0, y0): (i64, i64),
    (x1, y1): (i64, i64),
    color: Rgb<u8>,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);

    loop {
        put_pixel_clamped(img, x, y, color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Plot a series as ASCII art for terminal output.
pub fn plot_series(values: &[f32], title: &str, width: usize, height: usize) -> String {
    if values.is_empty() || width < 10 || height < 5 {
        return format!("{}: Invalid data or dimensions", title);
    }

    let min_val = values.iter().copied().fold(f32::INFINITY, f32::min);
    let max_val = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if (max_val - min_val).abs() < f32::EPSILON {
        return format!("{}: All values are {:.4}", title, min_val);
    }

    let mut plot = vec![vec![' '; width]; height];

    for row in plot.iter_mut() {
        row[0] = '|';
    }
    for j in 0..width {
        plot[height - 1][j] = '-';
    }
    plot[height - 1][0] = '+';

    let x_scale = (values.len() - 1).max(1) as f32 / (width - 3) as f32;
    let y_scale = (height - 3) as f32 / (max_val - min_val);

    for (i, &value) in values.iter().enumerate() {
        let x = ((i as f32 / x_scale) as usize + 2).min(width - 1);
        let y = (height - 3).saturating_sub(((value - min_val) * y_scale) as usize).min(height - 2);
        plot[y][x] = '*';
    }

    let mut output = format!("{}\n", title);
    output.push_str(&format!("Max: {:.4}\n", max_val));
    for row in plot.iter() {
        output.push_str(&row.iter().collect::<String>());
        output.push('\n');
    }
    output.push_str(&format!("Min: {:.4}\n", min_val));
    output.push_str(&format!("Points: {}\n", values.len()));

    output
}

/// Export the training history to CSV, one row per index across the series.
pub fn export_history_csv(history: &TrainingHistory, path: &str) -> Result<()> {
    let mut file = std::fs::File::create(path)?;

    writeln!(file, "index,loss,episode_reward,episode_length,epsilon")?;

    let max_len = [
        history.losses.len(),
        history.episode_rewards.len(),
        history.episode_lengths.len(),
        history.epsilons.len(),
    ]
    .iter()
    .max()
    .copied()
    .unwrap_or(0);

    for i in 0..max_len {
        let loss = history.losses.get(i).copied().unwrap_or(f32::NAN);
        let reward = history.episode_rewards.get(i).copied().unwrap_or(f32::NAN);
        let length = history.episode_lengths.get(i).copied().unwrap_or(0);
        let epsilon = history.epsilons.get(i).copied().unwrap_or(f32::NAN);

        writeln!(file, "{},{},{},{},{}", i, loss, reward, length, epsilon)?;
    }

    Ok(())
}

/// Export the training history as pretty-printed JSON.
pub fn export_history_json(history: &TrainingHistory, path: &str) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, history)?;
    Ok(())
}
