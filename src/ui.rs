use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{
        Block, Cell, Clear, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState, Tabs,
    },
};

use crate::catalog::Category;
use crate::model::{Model, UIData};
use crate::surface::Surface;

pub const HERO_HEIGHT: usize = 5;
pub const CATEGORY_BAR_HEIGHT: usize = 3;
pub const FILTER_FORM_HEIGHT: usize = 3;
// Two borders and the header row.
pub const TABLE_CHROME_HEIGHT: usize = 3;
pub const STATUSLINE_HEIGHT: usize = 1;
pub const COLUMN_SPACING: u16 = 1;

const HERO_TEXT: &str = "UFO Sightings\nThe truth is out there";

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let hero_height = if uidata.page.hero_visible {
            HERO_HEIGHT as u16
        } else {
            0
        };

        let [hero_area, tabs_area, form_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(hero_height),
            Constraint::Length(CATEGORY_BAR_HEIGHT as u16),
            Constraint::Length(FILTER_FORM_HEIGHT as u16),
            Constraint::Min(TABLE_CHROME_HEIGHT as u16),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        if uidata.page.hero_visible {
            Self::render_hero(frame, hero_area);
        }
        Self::render_categories(&uidata, frame, tabs_area);
        Self::render_filter_form(&uidata, frame, form_area);
        Self::render_table(&uidata, frame, table_area);
        Self::render_statusline(&uidata, frame, status_area);

        if uidata.show_popup {
            Self::render_popup(uidata.popup_message, frame);
        }
    }

    fn render_hero(frame: &mut Frame, area: Rect) {
        let text = Text::from(
            HERO_TEXT
                .lines()
                .map(|l| Line::from(l.green().bold()))
                .collect::<Vec<Line>>(),
        );
        let hero = Paragraph::new(text)
            .centered()
            .block(Block::bordered().border_set(border::DOUBLE));
        frame.render_widget(hero, area);
    }

    fn render_categories(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let titles = Category::ALL
            .iter()
            .zip(uidata.page.controls())
            .map(|(c, active)| {
                let title = format!("{} {}", c.index() + 1, c.name());
                if active {
                    Line::from(title.bold())
                } else {
                    Line::from(title)
                }
            });
        let tabs = Tabs::new(titles)
            .select(uidata.page.active().index())
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Yellow))
            .block(Block::bordered().title(" Filter by "));
        frame.render_widget(tabs, area);
    }

    fn render_filter_form(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let page = uidata.page;
        let content = if page.value.is_empty() {
            Line::from(page.placeholder.as_str().dark_gray().italic())
        } else {
            Line::from(page.value.as_str())
        };

        let mut block = Block::bordered().title(format!(" {} ", page.label));
        if uidata.active_cmdinput {
            block = block
                .border_style(Style::default().fg(Color::Yellow))
                .title_bottom(Line::from(" <Enter> filter  <Esc> leave ").centered());
        }
        frame.render_widget(Paragraph::new(content).block(block), area);

        if uidata.active_cmdinput {
            let curser_pos = std::cmp::min(uidata.cmdinput.curser_pos, u16::MAX as usize) as u16;
            let x = area.x.saturating_add(1).saturating_add(curser_pos);
            frame.set_cursor_position(Position::new(
                std::cmp::min(x, area.right().saturating_sub(2)),
                area.y.saturating_add(1),
            ));
        }
    }

    fn render_table(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let page = uidata.page;
        let height = area.height.saturating_sub(TABLE_CHROME_HEIGHT as u16) as usize;
        let rbegin = std::cmp::min(page.offset_row, page.rows.len());
        let rend = std::cmp::min(rbegin + height, page.rows.len());

        let widths = page
            .widths
            .iter()
            .map(|&w| Constraint::Length(std::cmp::min(w, uidata.max_column_width) as u16));
        let header = Row::new(page.header.iter().map(|h| Cell::from(h.as_str())))
            .style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED));
        let rows = page.rows[rbegin..rend]
            .iter()
            .map(|row| Row::new(row.iter().map(|c| Cell::from(c.as_str()))));

        let title = Line::from(format!(" {} ", uidata.name).bold());
        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .row_highlight_style(Style::default().bg(Color::DarkGray))
            .block(Block::bordered().title(title.centered()));

        let mut state = TableState::default();
        if rend > rbegin {
            state.select(Some(page.curser_row));
        }
        frame.render_stateful_widget(table, area, &mut state);

        let mut scrollbar_state =
            ScrollbarState::new(page.rows.len()).position(page.selected_row());
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }

    fn render_statusline(uidata: &UIData, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(
                format!(" {} ", uidata.name),
                Style::default().bg(Color::Blue).fg(Color::White),
            ),
            Span::raw(format!(" {} ", uidata.status_message)),
        ];
        if uidata.nrecords == 0 {
            spans.push(" no sightings loaded ".red());
        }
        spans.push(Span::styled(
            " ? help  q quit ",
            Style::default().fg(Color::DarkGray),
        ));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_popup(message: &str, frame: &mut Frame) {
        let area = Self::centered_rect(frame.area(), 60, 16);
        let popup = Paragraph::new(message).block(
            Block::bordered()
                .title(" Help ".bold())
                .title_bottom(Line::from(" <Esc> close ").centered())
                .border_set(border::THICK),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }

    fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
        let width = std::cmp::min(width, area.width);
        let height = std::cmp::min(height, area.height);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}
