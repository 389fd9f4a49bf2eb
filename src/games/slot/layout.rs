/// Screen regions for the slot scene.
///
/// Drawing and click hit-testing share the same regions, so a resize moves
/// both together.
use ratatui::layout::{Constraint, Layout, Position, Rect};

use crate::games::slot::round::SymbolId;

const BUTTON_WIDTH: u16 = 12;
const BUTTON_HEIGHT: u16 = 5;
const INDICATOR_WIDTH: u16 = 44;
const INDICATOR_HEIGHT: u16 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Symbol(SymbolId),
    Spin,
    Indicator,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SceneLayout {
    pub banner: Rect,
    pub result: Rect,
    /// Symbol cells in id order, laid out as a 3x3 grid.
    pub symbols: [Rect; 9],
    pub button: Rect,
    pub indicator: Rect,
    pub status: Rect,
}

impl SceneLayout {
    pub fn new(area: Rect) -> Self {
        let [banner, result_row, panel, button_row, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Percentage(30),
            Constraint::Fill(1),
            Constraint::Length(BUTTON_HEIGHT),
            Constraint::Length(1),
        ])
        .areas(area);

        let result = centered(result_row, result_row.width.min(result_row.height.saturating_mul(3)), result_row.height);

        let rows: [Rect; 3] = Layout::vertical([Constraint::Ratio(1, 3); 3]).areas(panel);
        let mut symbols = [Rect::default(); 9];
        for (r, row) in rows.iter().enumerate() {
            let cells: [Rect; 3] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(*row);
            symbols[r * 3..r * 3 + 3].copy_from_slice(&cells);
        }

        Self {
            banner,
            result,
            symbols,
            button: centered(button_row, BUTTON_WIDTH, BUTTON_HEIGHT),
            indicator: centered(area, INDICATOR_WIDTH, INDICATOR_HEIGHT),
            status,
        }
    }

    pub fn symbol(&self, id: SymbolId) -> Rect {
        self.symbols[id.index()]
    }

    /// What a click at (`column`, `row`) lands on. The indicator sits on top
    /// of everything while shown; hidden controls are never hit.
    pub fn hit(&self, column: u16, row: u16, button_shown: bool, indicator_shown: bool) -> Option<Target> {
        let pos = Position::new(column, row);
        if indicator_shown && self.indicator.contains(pos) {
            return Some(Target::Indicator);
        }
        if button_shown && self.button.contains(pos) {
            return Some(Target::Spin);
        }
        SymbolId::all()
            .find(|id| self.symbol(*id).contains(pos))
            .map(Target::Symbol)
    }
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(id: u8) -> SymbolId {
        SymbolId::new(id).unwrap()
    }

    fn center(rect: Rect) -> (u16, u16) {
        (rect.x + rect.width / 2, rect.y + rect.height / 2)
    }

    #[test]
    fn symbol_cells_form_a_grid() {
        let layout = SceneLayout::new(Rect::new(0, 0, 90, 40));
        assert_eq!(layout.symbol(sym(1)).y, layout.symbol(sym(3)).y);
        assert!(layout.symbol(sym(4)).y > layout.symbol(sym(1)).y);
        assert!(layout.symbol(sym(2)).x > layout.symbol(sym(1)).x);
        assert!(layout.symbols.iter().all(|r| r.area() > 0));
    }

    #[test]
    fn clicks_map_to_targets() {
        let layout = SceneLayout::new(Rect::new(0, 0, 90, 40));
        let (x, y) = center(layout.symbol(sym(5)));
        assert_eq!(layout.hit(x, y, false, false), Some(Target::Symbol(sym(5))));

        let (x, y) = center(layout.button);
        assert_eq!(layout.hit(x, y, true, false), Some(Target::Spin));
        assert_eq!(layout.hit(x, y, false, false), None);
    }

    #[test]
    fn indicator_covers_the_panel() {
        let layout = SceneLayout::new(Rect::new(0, 0, 90, 40));
        let (x, y) = center(layout.indicator);
        assert_eq!(layout.hit(x, y, true, true), Some(Target::Indicator));
        assert_ne!(layout.hit(x, y, true, false), Some(Target::Indicator));
    }

    #[test]
    fn layout_follows_viewport() {
        let small = SceneLayout::new(Rect::new(0, 0, 60, 30));
        let large = SceneLayout::new(Rect::new(0, 0, 120, 60));
        assert!(large.symbol(sym(9)).width > small.symbol(sym(9)).width);
        assert!(small.indicator.width <= 60);
    }

    #[test]
    fn tiny_viewport_does_not_panic() {
        let layout = SceneLayout::new(Rect::new(0, 0, 3, 2));
        assert_eq!(layout.indicator, Rect::new(0, 0, 3, 2));
        assert_eq!(layout.hit(1, 1, true, true), Some(Target::Indicator));
    }
}
