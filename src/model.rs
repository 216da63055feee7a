use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

use crate::catalog::Category;
use crate::dashboard::Dashboard;
use crate::domain::{Config, HELP_TEXT, Message, SightingsError};
use crate::engine::FilterState;
use crate::inputter::{InputResult, Inputter};
use crate::surface::{Page, Surface};
use crate::table::Dataset;
use crate::ui::{
    CATEGORY_BAR_HEIGHT, FILTER_FORM_HEIGHT, HERO_HEIGHT, STATUSLINE_HEIGHT, TABLE_CHROME_HEIGHT,
};

#[derive(Debug, PartialEq)]
pub enum Status {
    EMPTY,
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    INPUT,
    POPUP,
}

/// Everything the UI needs for one frame.
pub struct UIData<'a> {
    pub name: &'a str,
    pub page: &'a Page,
    pub nrecords: usize,
    pub max_column_width: usize,
    pub cmdinput: &'a InputResult,
    pub active_cmdinput: bool,
    pub show_popup: bool,
    pub popup_message: &'a str,
    pub status_message: &'a str,
}

pub struct Model {
    config: Config,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    name: String,
    dashboard: Dashboard<Page>,
    ui_width: usize,
    ui_height: usize,
    table_height: usize,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    status_message: String,
}

impl Model {
    pub fn init(config: &Config, dataset: Dataset, ui_width: usize, ui_height: usize) -> Self {
        let status = if dataset.records.is_empty() {
            Status::EMPTY
        } else {
            Status::READY
        };
        let page = Page::new(dataset.header, dataset.widths);
        let dashboard = Dashboard::mount(Arc::new(dataset.records), page, config.initial_category);

        let mut model = Self {
            config: config.clone(),
            status,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            name: dataset.name,
            dashboard,
            ui_width: 0,
            ui_height: 0,
            table_height: 0,
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            status_message: String::new(),
        };
        model.ui_resize(ui_width, ui_height);
        model.report(&FilterState::new(config.initial_category, ""));
        model
    }

    pub fn get_uidata(&self) -> UIData<'_> {
        UIData {
            name: &self.name,
            page: self.page(),
            nrecords: self.dashboard.records().len(),
            max_column_width: self.config.max_column_width,
            cmdinput: &self.last_input,
            active_cmdinput: self.modus == Modus::INPUT,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT,
            status_message: self.status_message(),
        }
    }

    pub fn page(&self) -> &Page {
        self.dashboard.surface()
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::INPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    /// Types `value` into the filter form and submits it.
    pub fn apply_filter(&mut self, value: &str) -> FilterState {
        self.dashboard.surface_mut().set_value(value);
        self.input.set(value);
        self.last_input = self.input.get();
        let state = self.dashboard.submit();
        self.recalculate_table_height();
        self.report(&state);
        state
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), SightingsError> {
        if let Some(msg) = message {
            trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveDown => self.move_selection_down(1),
                    Message::MoveUp => self.move_selection_up(1),
                    Message::MovePageDown => self.move_selection_down(self.table_height),
                    Message::MovePageUp => self.move_selection_up(self.table_height),
                    Message::MoveBeginning => self.move_selection_up(usize::MAX),
                    Message::MoveEnd => self.move_selection_down(usize::MAX),
                    Message::SelectCategory(category) => self.select_category(category),
                    Message::NextCategory => {
                        self.select_category(self.dashboard.surface().active().next())
                    }
                    Message::PreviousCategory => {
                        self.select_category(self.dashboard.surface().active().previous())
                    }
                    Message::FocusFilter => self.enter_input_mode(),
                    Message::CopyRow => self.copy_table_row(),
                    Message::Help => self.show_help(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    Message::Exit | Message::Help => self.exit_popup(),
                    _ => (),
                },
                Modus::INPUT => match msg {
                    Message::Quit => self.quit(),
                    Message::RawKey(key) => self.raw_input(key),
                    Message::Resize(width, height) => self.ui_resize(width, height),
                    _ => (),
                },
            }
        }
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn select_category(&mut self, category: Category) {
        let state = self.dashboard.click_category(category);
        self.input.clear();
        self.last_input = self.input.get();
        // The hero banner is gone now, the table has more room.
        self.recalculate_table_height();
        self.report(&state);
    }

    fn enter_input_mode(&mut self) {
        trace!("Entering filter input ...");
        self.previous_modus = self.modus;
        self.modus = Modus::INPUT;
        let value = self.dashboard.surface().value().to_string();
        self.input.set(&value);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        self.dashboard
            .surface_mut()
            .set_value(&self.last_input.input);

        if self.last_input.finished {
            self.modus = Modus::TABLE;
            self.previous_modus = Modus::INPUT;
            if self.last_input.canceled {
                debug!("Filter input left without submitting");
            } else {
                let state = self.dashboard.submit();
                self.recalculate_table_height();
                self.report(&state);
            }
            // Keep the text but start a fresh edit next time.
            let value = self.last_input.input.clone();
            self.input.set(&value);
            self.last_input = self.input.get();
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn exit_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn report(&mut self, state: &FilterState) {
        let shown = self.dashboard.surface().rows.len();
        let total = self.dashboard.records().len();
        let message = if state.is_filtered() {
            format!(
                "Showing {shown} of {total} sightings ({}: {})",
                state.category, state.value
            )
        } else {
            format!("Showing {shown} of {total} sightings")
        };
        self.set_status_message(message);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        trace!("Status: {}", self.status_message);
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.ui_width, width, self.ui_height, height
        );
        self.ui_width = width;
        self.ui_height = height;
        self.recalculate_table_height();
    }

    fn recalculate_table_height(&mut self) {
        let page = self.dashboard.surface();
        let mut chrome =
            CATEGORY_BAR_HEIGHT + FILTER_FORM_HEIGHT + TABLE_CHROME_HEIGHT + STATUSLINE_HEIGHT;
        if page.hero_visible {
            chrome += HERO_HEIGHT;
        }
        self.table_height = std::cmp::max(self.ui_height.saturating_sub(chrome), 1);
        self.clamp_viewport();
    }

    fn clamp_viewport(&mut self) {
        let height = self.table_height;
        let page = self.dashboard.surface_mut();
        let selected = page.selected_row();
        if page.curser_row >= height {
            page.offset_row = selected + 1 - height;
            page.curser_row = height - 1;
        }
    }

    fn move_selection_up(&mut self, size: usize) {
        let page = self.dashboard.surface_mut();
        let target = page.selected_row().saturating_sub(size);
        Self::select_row(page, target, self.table_height);
    }

    fn move_selection_down(&mut self, size: usize) {
        let page = self.dashboard.surface_mut();
        if page.rows.is_empty() {
            return;
        }
        let target = std::cmp::min(page.selected_row().saturating_add(size), page.rows.len() - 1);
        Self::select_row(page, target, self.table_height);
    }

    fn select_row(page: &mut Page, row: usize, height: usize) {
        if row < page.offset_row {
            page.offset_row = row;
        } else if row >= page.offset_row + height {
            page.offset_row = row + 1 - height;
        }
        page.curser_row = row - page.offset_row;
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_escaping = c.contains('"');
        let needs_wrapping = c.chars().any(|c| c == ' ' || c == '\t' || c == ',');
        let mut out = String::from(c);

        if needs_escaping {
            out = out.replace('"', "\"\"");
        }
        if needs_wrapping || needs_escaping {
            out = format!("\"{out}\"");
        }
        out
    }

    fn selected_row_as_csv(&self) -> Option<String> {
        let page = self.dashboard.surface();
        page.rows.get(page.selected_row()).map(|row| {
            row.iter()
                .map(|cell| Self::wrap_cell_content(cell))
                .collect::<Vec<String>>()
                .join(",")
        })
    }

    fn copy_table_row(&mut self) {
        let Some(row_content) = self.selected_row_as_csv() else {
            self.set_status_message("Nothing to copy");
            return;
        };

        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    warn!("Clipboard unavailable: {:?}", e);
                    self.set_status_message("Clipboard unavailable");
                    return;
                }
            }
        }

        if let Some(clipboard) = self.clipboard.as_mut() {
            match clipboard.set_text(row_content) {
                Ok(_) => {
                    info!("Copied row to clipboard.");
                    self.set_status_message("Copied row to clipboard");
                }
                Err(e) => {
                    warn!("Error copying to clipboard: {:?}", e);
                    self.set_status_message("Could not copy row");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Record;
    use ratatui::crossterm::event::KeyCode;

    fn dataset(n: usize) -> Dataset {
        let states = ["NV", "CA", "AZ"];
        let records = (0..n)
            .map(|i| {
                Record::from_pairs([
                    ("datetime", format!("1/{}/2020", i % 28 + 1)),
                    ("city", format!("city {i}")),
                    ("state", states[i % 3].to_string()),
                    ("country", "us".to_string()),
                    ("shape", "light".to_string()),
                ])
            })
            .collect();
        let header = ["datetime", "city", "state", "country", "shape"]
            .map(String::from)
            .to_vec();
        Dataset::new("test", header, records)
    }

    fn model(n: usize) -> Model {
        Model::init(&Config::default(), dataset(n), 120, 40)
    }

    fn type_keys(model: &mut Model, s: &str) {
        for c in s.chars() {
            model
                .update(Some(Message::RawKey(KeyCode::Char(c).into())))
                .unwrap();
        }
    }

    #[test]
    fn test_init_shows_everything() {
        let model = model(9);
        assert_eq!(model.status, Status::READY);
        assert_eq!(model.page().rows.len(), 9);
        assert_eq!(model.page().active(), Category::Date);
        assert_eq!(model.status_message(), "Showing 9 of 9 sightings");
    }

    #[test]
    fn test_empty_dataset() {
        let model = model(0);
        assert_eq!(model.status, Status::EMPTY);
        assert!(model.page().rows.is_empty());
    }

    #[test]
    fn test_filter_input_submits_on_enter() {
        let mut model = model(9);
        model.update(Some(Message::SelectCategory(Category::State))).unwrap();
        model.update(Some(Message::FocusFilter)).unwrap();
        assert!(model.raw_keyevents());

        type_keys(&mut model, "ca");
        assert_eq!(model.page().value, "ca");
        // Nothing is filtered before submitting.
        assert_eq!(model.page().rows.len(), 9);

        model
            .update(Some(Message::RawKey(KeyCode::Enter.into())))
            .unwrap();
        assert!(!model.raw_keyevents());
        assert_eq!(model.page().rows.len(), 3);
        assert!(model.page().rows.iter().all(|r| r[2] == "CA"));
        assert_eq!(model.status_message(), "Showing 3 of 9 sightings (State: ca)");
    }

    #[test]
    fn test_escape_leaves_input_without_render() {
        let mut model = model(9);
        model.update(Some(Message::FocusFilter)).unwrap();
        type_keys(&mut model, "1/2/2020");
        model.update(Some(Message::RawKey(KeyCode::Esc.into()))).unwrap();
        assert!(!model.raw_keyevents());
        assert_eq!(model.page().rows.len(), 9);
        assert_eq!(model.page().value, "1/2/2020");
    }

    #[test]
    fn test_category_switch_resets_filter() {
        let mut model = model(9);
        model.update(Some(Message::SelectCategory(Category::State))).unwrap();
        model.apply_filter("NV");
        assert_eq!(model.page().rows.len(), 3);

        model.update(Some(Message::NextCategory)).unwrap();
        let page = model.page();
        assert_eq!(page.active(), Category::Country);
        assert_eq!(page.value, "");
        assert_eq!(page.placeholder, "US");
        assert_eq!(page.rows.len(), 9);
        assert!(!page.hero_visible);
    }

    #[test]
    fn test_selection_scrolls_viewport() {
        let mut model = model(100);
        let height = model.table_height;
        assert!(height > 1);

        model.update(Some(Message::MovePageDown)).unwrap();
        assert_eq!(model.page().selected_row(), height);
        assert_eq!(model.page().curser_row, height - 1);

        model.update(Some(Message::MoveEnd)).unwrap();
        assert_eq!(model.page().selected_row(), 99);

        model.update(Some(Message::MoveBeginning)).unwrap();
        assert_eq!(model.page().selected_row(), 0);
        assert_eq!(model.page().offset_row, 0);

        model.update(Some(Message::MoveUp)).unwrap();
        assert_eq!(model.page().selected_row(), 0);
    }

    #[test]
    fn test_submit_scrolls_to_top() {
        let mut model = model(100);
        model.update(Some(Message::MoveEnd)).unwrap();
        model.apply_filter("1/3/2020");
        assert_eq!(model.page().selected_row(), 0);
        assert_eq!(model.page().rows.len(), 4);
    }

    #[test]
    fn test_help_popup_toggles() {
        let mut model = model(3);
        model.update(Some(Message::Help)).unwrap();
        assert!(model.get_uidata().show_popup);
        // Table keys are ignored while the popup is open.
        model.update(Some(Message::MoveDown)).unwrap();
        assert_eq!(model.page().selected_row(), 0);
        model.update(Some(Message::Exit)).unwrap();
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn test_quit_while_editing_filter() {
        let mut model = model(3);
        model.update(Some(Message::FocusFilter)).unwrap();
        type_keys(&mut model, "nv");
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn test_quit() {
        let mut model = model(3);
        model.update(Some(Message::Quit)).unwrap();
        assert_eq!(model.status, Status::QUITTING);
    }

    #[test]
    fn test_row_as_csv() {
        let mut model = model(3);
        model.update(Some(Message::MoveDown)).unwrap();
        assert_eq!(
            model.selected_row_as_csv().unwrap(),
            "1/2/2020,\"city 1\",CA,us,light"
        );
        assert_eq!(Model::wrap_cell_content("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
