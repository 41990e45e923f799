use crate::session::{RoundSummary, Session};
use crate::shape::{Shape, ShapeColor, ShapeKind, ARENA_HEIGHT, ARENA_WIDTH};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Circle, Context, Line as CanvasLine, Rectangle},
        Block, Borders, Clear, Paragraph,
    },
    Frame,
};
use std::time::SystemTime;

/// End-of-round overlay contents: the figures plus an optional notice about
/// where the results went (or why they didn't)
#[derive(Clone, Debug)]
pub struct SummaryView {
    pub summary: RoundSummary,
    pub notice: Option<String>,
}

/// Render the whole screen and return the arena's inner area so the event
/// loop can map click cells back into arena coordinates.
pub fn draw(
    f: &mut Frame,
    session: &Session,
    overlay: Option<&SummaryView>,
    now: SystemTime,
) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(5),    // Arena
            Constraint::Length(1), // Score
            Constraint::Length(1), // Status / keys
        ])
        .split(f.area());

    let block = Block::default().borders(Borders::ALL).title("blip");
    let arena = block.inner(chunks[0]);

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, ARENA_WIDTH])
        .y_bounds([0.0, ARENA_HEIGHT])
        .paint(|ctx| {
            for shape in session.live.values() {
                paint_shape(ctx, shape);
            }
        });
    f.render_widget(canvas, chunks[0]);

    let score = Paragraph::new(format!("Score: {}", session.score))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(score, chunks[1]);

    let status = if overlay.is_some() {
        "press any key for a new round, (q)uit".to_string()
    } else if session.is_running() {
        format!(
            "{:.0}s left, click the blue squares",
            session.seconds_left(now).ceil()
        )
    } else {
        "press (s) to start a round, (q) to quit".to_string()
    };
    let status = Paragraph::new(status)
        .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
        .alignment(Alignment::Center);
    f.render_widget(status, chunks[2]);

    if let Some(view) = overlay {
        render_summary(f, view, chunks[0]);
    }

    arena
}

/// Convert a clicked terminal cell inside the arena into arena coordinates.
/// Rows grow downward while the arena's y axis points up, so y is inverted.
pub fn map_click(area: Rect, column: u16, row: u16) -> Option<(f64, f64)> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if !area.contains(Position { x: column, y: row }) {
        return None;
    }
    let fx = ((column - area.x) as f64 + 0.5) / area.width as f64;
    let fy = ((row - area.y) as f64 + 0.5) / area.height as f64;
    Some((fx * ARENA_WIDTH, (1.0 - fy) * ARENA_HEIGHT))
}

fn palette_color(color: ShapeColor) -> Color {
    match color {
        ShapeColor::Blue => Color::Blue,
        ShapeColor::Red => Color::Red,
        ShapeColor::Green => Color::Green,
        ShapeColor::Yellow => Color::Yellow,
    }
}

fn paint_shape(ctx: &mut Context, shape: &Shape) {
    let color = palette_color(shape.color);
    match shape.kind {
        ShapeKind::Square => ctx.draw(&Rectangle {
            x: shape.x - shape.size,
            y: shape.y - shape.size,
            width: shape.size * 2.0,
            height: shape.size * 2.0,
            color,
        }),
        ShapeKind::Circle => ctx.draw(&Circle {
            x: shape.x,
            y: shape.y,
            radius: shape.size,
            color,
        }),
        ShapeKind::Triangle => {
            let apex = (shape.x, shape.y + shape.size);
            let left = (shape.x - shape.size, shape.y - shape.size);
            let right = (shape.x + shape.size, shape.y - shape.size);
            for (from, to) in [(apex, left), (left, right), (right, apex)] {
                ctx.draw(&CanvasLine {
                    x1: from.0,
                    y1: from.1,
                    x2: to.0,
                    y2: to.1,
                    color,
                });
            }
        }
    }
}

fn render_summary(f: &mut Frame, view: &SummaryView, area: Rect) {
    let popup = centered_rect(46, 8, area);
    let mut lines = vec![
        format!("Final score: {}", view.summary.score),
        format!(
            "clicks: {} ({:.0}% on target)",
            view.summary.total_clicks, view.summary.accuracy
        ),
    ];
    if view.summary.total_clicks > 0 {
        lines.push(format!(
            "reaction: mean {:.0}ms, median {:.0}ms, sd {:.0}ms",
            view.summary.mean_reaction_ms,
            view.summary.median_reaction_ms,
            view.summary.std_dev_ms
        ));
    }
    if let Some(notice) = &view.notice {
        lines.push(notice.clone());
    }

    let paragraph = Paragraph::new(lines.join("\n"))
        .block(Block::default().borders(Borders::ALL).title("Round over"))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Center);
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}
