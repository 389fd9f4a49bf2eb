use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::games::slot::assets::{Sprite, Sprites};
use crate::games::slot::layout::SceneLayout;
use crate::games::slot::round::{Outcome, SymbolId, MAX_PICKS};

/// What the result window shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultView {
    Mystery,
    Reel(SymbolId),
    Drawn(Outcome),
}

/// Snapshot of everything the renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct SceneView<'a> {
    pub result: ResultView,
    pub picks: &'a [SymbolId],
    pub accepts_picks: bool,
    pub button_shown: bool,
    pub indicator: Option<Outcome>,
}

pub struct SlotRenderer;

impl SlotRenderer {
    pub fn render(frame: &mut Frame, layout: &SceneLayout, view: &SceneView, sprites: &Sprites) {
        // Banner
        let banner = sprites.background.lines().first().cloned().unwrap_or_default();
        frame.render_widget(
            Paragraph::new(banner)
                .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
                .alignment(Alignment::Center),
            layout.banner,
        );

        Self::render_result(frame, layout.result, view.result, sprites);

        for id in SymbolId::all() {
            let picked = view.picks.iter().filter(|p| **p == id).count();
            Self::render_symbol(frame, layout.symbol(id), id, picked, view.accepts_picks, sprites);
        }

        if view.button_shown {
            draw_sprite(
                frame,
                &sprites.button,
                layout.button,
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            );
        }

        let picks = view.picks.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(" ");
        let status = format!(
            "Picks: [{}] ({}/{})   1-9 pick · Enter spin/continue · click works too · Esc quit",
            picks,
            view.picks.len(),
            MAX_PICKS
        );
        frame.render_widget(
            Paragraph::new(status).style(Style::default().fg(Color::Gray)),
            layout.status,
        );

        if let Some(outcome) = view.indicator {
            Self::render_indicator(frame, layout.indicator, outcome, sprites);
        }
    }

    fn render_result(frame: &mut Frame, area: Rect, result: ResultView, sprites: &Sprites) {
        let (title, border) = match result {
            ResultView::Mystery => (" ? ", Color::White),
            ResultView::Reel(_) => (" spinning ", Color::Magenta),
            ResultView::Drawn(outcome) if outcome.won => (" match! ", Color::Green),
            ResultView::Drawn(_) => (" no match ", Color::Red),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        match result {
            ResultView::Mystery => {
                draw_sprite(frame, &sprites.blank, inner, Style::default().fg(Color::DarkGray));
                draw_sprite(frame, &sprites.mystery, inner, Style::default().fg(Color::White));
            }
            ResultView::Reel(id) => {
                let [top, middle, bottom] = Layout::vertical([
                    Constraint::Length(1),
                    Constraint::Fill(1),
                    Constraint::Length(1),
                ])
                .areas(inner);
                let streak = Style::default().fg(Color::Magenta);
                let lines = sprites.spritesheet.lines();
                if let (Some(first), Some(last)) = (lines.first(), lines.last()) {
                    frame.render_widget(Paragraph::new(first.as_str()).style(streak).alignment(Alignment::Center), top);
                    frame.render_widget(Paragraph::new(last.as_str()).style(streak).alignment(Alignment::Center), bottom);
                }
                draw_sprite(frame, sprites.symbol(id), middle, Style::default().fg(Color::White));
            }
            ResultView::Drawn(outcome) => {
                let color = if outcome.won { Color::Green } else { Color::Red };
                draw_sprite(
                    frame,
                    sprites.symbol(outcome.drawn),
                    inner,
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                );
            }
        }
    }

    fn render_symbol(
        frame: &mut Frame,
        area: Rect,
        id: SymbolId,
        picked: usize,
        accepts_picks: bool,
        sprites: &Sprites,
    ) {
        // Inactive symbols are drawn dimmed.
        let (style, border_type) = if picked > 0 {
            (Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD), BorderType::Double)
        } else if accepts_picks {
            (Style::default().fg(Color::Gray), BorderType::Plain)
        } else {
            (Style::default().fg(Color::DarkGray), BorderType::Plain)
        };
        let title = match picked {
            0 | 1 => format!(" {id} "),
            n => format!(" {id} x{n} "),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(border_type)
            .border_style(style)
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        draw_sprite(frame, sprites.symbol(id), inner, style);
    }

    fn render_indicator(frame: &mut Frame, area: Rect, outcome: Outcome, sprites: &Sprites) {
        let (sprite, color) = if outcome.won {
            (&sprites.win, Color::Green)
        } else {
            (&sprites.lose, Color::Red)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Thick)
            .border_style(Style::default().fg(color))
            .title(format!(" drawn: {} ", outcome.drawn));
        let inner = block.inner(area);
        frame.render_widget(Clear, area);
        frame.render_widget(block, area);
        draw_sprite(frame, sprite, inner, Style::default().fg(color).add_modifier(Modifier::BOLD));
    }
}

/// Draw `sprite` centered in `area`, cropping whatever does not fit.
fn draw_sprite(frame: &mut Frame, sprite: &Sprite, area: Rect, style: Style) {
    let width = sprite.width().min(area.width);
    let height = sprite.height().min(area.height);
    let target = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let lines = sprite.lines().iter().map(|l| Line::raw(l.as_str())).collect::<Vec<_>>();
    frame.render_widget(Paragraph::new(lines).style(style), target);
}
