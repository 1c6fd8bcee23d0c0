//! Block-character histogram for the final value distribution.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use stocksim_core::charts::{BREAK_EVEN, HistogramBin, Outcome};

/// Block characters for sub-character precision (from empty to full)
const BIN_CHARS: [&str; 9] = [" ", "▁", "▂", "▃", "▄", "▅", "▆", "▇", "█"];

/// One drawn column: summed count and the outcome used for its colour.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Column {
    count: usize,
    outcome: Outcome,
}

/// Spread bins over `width` columns.
///
/// Wide areas repeat each bin; narrow areas merge neighbouring bins, keeping the
/// outcome of the first bin in each group.
fn fit_columns(bins: &[HistogramBin], width: usize) -> Vec<Column> {
    if bins.is_empty() || width == 0 {
        return Vec::new();
    }

    if width >= bins.len() {
        let repeat = width / bins.len();
        return bins
            .iter()
            .flat_map(|bin| {
                std::iter::repeat_n(
                    Column {
                        count: bin.count,
                        outcome: bin.outcome,
                    },
                    repeat,
                )
            })
            .collect();
    }

    let group = bins.len().div_ceil(width);
    bins.chunks(group)
        .map(|chunk| Column {
            count: chunk.iter().map(|b| b.count).sum(),
            outcome: chunk[0].outcome,
        })
        .collect()
}

fn outcome_color(outcome: Outcome) -> Color {
    match outcome {
        Outcome::GainOrBreakeven => Color::Green,
        Outcome::Loss => Color::Red,
    }
}

/// Render the histogram with an axis row showing the range and break-even point.
pub fn render_histogram(frame: &mut Frame, area: Rect, bins: &[HistogramBin]) {
    let height = area.height.saturating_sub(1) as usize;

    if height < 3 || area.width < 20 {
        let msg = Paragraph::new("Area too small").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    let columns = fit_columns(bins, area.width as usize);
    let max_count = columns.iter().map(|c| c.count).max().unwrap_or(0);
    if max_count == 0 {
        let msg = Paragraph::new("No data").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(msg, area);
        return;
    }

    let height_units = height * 8;
    let bar_heights: Vec<usize> = columns
        .iter()
        .map(|c| ((c.count as f64 / max_count as f64) * height_units as f64).round() as usize)
        .collect();

    let x_offset = (area.width as usize).saturating_sub(columns.len()) / 2;

    for row in 0..height {
        let row_base = (height - 1 - row) * 8;
        let row_top = row_base + 8;
        let mut spans = Vec::with_capacity(columns.len() + 1);

        if x_offset > 0 {
            spans.push(Span::raw(" ".repeat(x_offset)));
        }

        for (column, &bar_h) in columns.iter().zip(&bar_heights) {
            let glyph = if bar_h >= row_top {
                "█"
            } else if bar_h > row_base {
                BIN_CHARS[(bar_h - row_base).min(8)]
            } else {
                " "
            };
            spans.push(Span::styled(
                glyph,
                Style::default().fg(outcome_color(column.outcome)),
            ));
        }

        let row_area = Rect::new(area.x, area.y + row as u16, area.width, 1);
        frame.render_widget(Paragraph::new(Line::from(spans)), row_area);
    }

    let (lo, hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => return,
    };
    let gap = (area.width as usize).saturating_sub(30) / 2;
    let label_line = Line::from(vec![
        Span::styled(format!("{lo:>6.2}x"), Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(gap)),
        Span::styled(
            format!("break even {BREAK_EVEN:.1}x"),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" ".repeat(gap)),
        Span::styled(format!("{hi:.2}x"), Style::default().fg(Color::DarkGray)),
    ]);
    let label_area = Rect::new(area.x, area.y + height as u16, area.width, 1);
    frame.render_widget(Paragraph::new(label_line), label_area);
}
