/* ------------------------------------------------------------------ */
/* Console renderings of the loss curve and the confusion matrix      */
/* ------------------------------------------------------------------ */
//
// These are the crate's "plots": deterministic terminal output, no
// image files.

use std::time::Duration;

const CHART_HEIGHT: usize = 12;
const CHART_WIDTH: usize = 72;

// Sparse to dense; index scaled by cell value in [0,1].
const SHADE_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}

/// Fixed-height ASCII line chart of the averaged loss history.
pub fn render_loss_history(history: &[f32]) -> String {
    if history.len() < 2 {
        return "loss history too short to chart".to_string();
    }

    // Downsample to the chart width by bucket averaging.
    let series: Vec<f32> = if history.len() <= CHART_WIDTH {
        history.to_vec()
    } else {
        (0..CHART_WIDTH)
            .map(|col| {
                let lo = col * history.len() / CHART_WIDTH;
                let hi = ((col + 1) * history.len() / CHART_WIDTH).max(lo + 1);
                history[lo..hi].iter().sum::<f32>() / (hi - lo) as f32
            })
            .collect()
    };

    let max = series.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let min = series.iter().fold(f32::INFINITY, |a, &b| a.min(b));
    let span = (max - min).max(1e-6);

    let mut out = String::new();
    out.push_str(&format!("avg loss, {} windows (max {:.4})\n", history.len(), max));
    for row in 0..CHART_HEIGHT {
        let threshold = max - span * row as f32 / (CHART_HEIGHT - 1) as f32;
        out.push_str("  |");
        for &v in &series {
            out.push(if v >= threshold { '*' } else { ' ' });
        }
        out.push('\n');
    }
    out.push_str("  +");
    out.push_str(&"-".repeat(series.len()));
    out.push_str(&format!("\n   (min {:.4})", min));
    out
}

/// Shaded grid of a row-normalized confusion matrix. Rows are true
/// categories, columns predicted; the legend maps column numbers back
/// to names.
pub fn render_confusion(matrix: &[Vec<f32>], categories: &[String]) -> String {
    let mut out = String::new();
    let label_width = categories
        .iter()
        .map(|c| c.chars().count())
        .max()
        .unwrap_or(0)
        .min(14);

    out.push_str(&format!("{:>width$}  ", "", width = label_width));
    for col in 0..categories.len() {
        out.push_str(&format!("{:>3}", col));
    }
    out.push('\n');

    for (row, values) in matrix.iter().enumerate() {
        // Cut on characters, not bytes; stems are arbitrary UTF-8.
        let label: String = categories[row].chars().take(label_width).collect();
        out.push_str(&format!("{:>width$}  ", label, width = label_width));
        for &v in values {
            out.push_str(&format!("  {}", shade(v)));
        }
        out.push_str(&format!("   {:.2}\n", values[row]));
    }

    out.push('\n');
    for (col, category) in categories.iter().enumerate() {
        out.push_str(&format!("  {:>3} = {}\n", col, category));
    }
    out.push_str("(trailing number: fraction guessed correctly)");
    out
}

fn shade(value: f32) -> char {
    let idx = (value.clamp(0.0, 1.0) * (SHADE_RAMP.len() - 1) as f32).round() as usize;
    SHADE_RAMP[idx]
}
