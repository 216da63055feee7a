use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog::Category;
use crate::engine::{self, FilterState};
use crate::surface::Surface;
use crate::table::Record;

/// The category and submit handlers, mounted on a surface.
///
/// The surface is owned while mounted; `unmount` hands it back and with it
/// ends the handlers' lifetime.
pub struct Dashboard<S: Surface> {
    records: Arc<Vec<Record>>,
    surface: S,
}

impl<S: Surface> Dashboard<S> {
    /// Wires the handlers to `surface` and shows the unfiltered table for
    /// `category`, normally `Category::default()`.
    pub fn mount(records: Arc<Vec<Record>>, surface: S, category: Category) -> Self {
        let mut dashboard = Self { records, surface };
        dashboard.select_category(category);
        dashboard
    }

    pub fn unmount(self) -> S {
        debug!("Unmounting dashboard");
        self.surface
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Switches the active category, resets the filter form to match it and
    /// shows the full table.
    pub fn select_category(&mut self, category: Category) -> FilterState {
        let entry = category.entry();
        debug!("Selecting category {category}");

        self.surface.set_placeholder(entry.placeholder);
        self.surface.set_value("");
        self.surface.set_label(entry.label);
        self.surface.set_active(category);

        self.render_table(None, category);
        FilterState::new(category, "")
    }

    /// Click on a category control: select it and bring the table into view.
    pub fn click_category(&mut self, category: Category) -> FilterState {
        let state = self.select_category(category);
        self.page_top();
        state
    }

    /// Redraws the table body with the records matching `filter_value` in the
    /// field of `category`. Returns the number of rows drawn.
    pub fn render_table(&mut self, filter_value: Option<&str>, category: Category) -> usize {
        let rows = engine::filter_records(&self.records, filter_value, category);
        engine::draw_rows(&mut self.surface, &rows);
        info!(
            "Rendered {} of {} records ({category}: {:?})",
            rows.len(),
            self.records.len(),
            filter_value.unwrap_or_default()
        );
        rows.len()
    }

    /// Form submission: filter by the current input in the active category.
    pub fn submit(&mut self) -> FilterState {
        let state = FilterState::new(self.surface.active(), self.surface.value());
        self.render_table(Some(&state.value), state.category);
        self.page_top();
        state
    }

    fn page_top(&mut self) {
        self.surface.hide_hero();
        self.surface.scroll_to_top();
    }
}
