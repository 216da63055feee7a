use crate::catalog::Category;

/// The widget capabilities the filter handlers need from their host.
///
/// Handlers only talk to the screen through this trait, so they run the same
/// against the terminal `Page` and against anything a test provides.
pub trait Surface {
    fn set_placeholder(&mut self, placeholder: &str);
    fn set_value(&mut self, value: &str);
    fn value(&self) -> &str;
    fn set_label(&mut self, label: &str);
    /// Marks `category` as the active control and every other control inactive.
    fn set_active(&mut self, category: Category);
    fn active(&self) -> Category;
    fn clear_rows(&mut self);
    fn append_row(&mut self, cells: Vec<String>);
    fn hide_hero(&mut self);
    fn scroll_to_top(&mut self);
}

/// In-memory widget tree that the terminal UI draws from.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub header: Vec<String>,
    pub widths: Vec<usize>,
    pub placeholder: String,
    pub value: String,
    pub label: String,
    controls: [bool; 5],
    pub rows: Vec<Vec<String>>,
    pub hero_visible: bool,
    pub offset_row: usize,
    pub curser_row: usize,
}

impl Page {
    pub fn new(header: Vec<String>, widths: Vec<usize>) -> Self {
        Self {
            header,
            widths,
            hero_visible: true,
            ..Default::default()
        }
    }

    /// Activity flag per control, in `Category::ALL` order.
    pub fn controls(&self) -> [bool; 5] {
        self.controls
    }

    /// Absolute index of the selected row.
    pub fn selected_row(&self) -> usize {
        self.offset_row + self.curser_row
    }
}

impl Surface for Page {
    fn set_placeholder(&mut self, placeholder: &str) {
        self.placeholder = placeholder.to_string();
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn set_active(&mut self, category: Category) {
        self.controls = [false; 5];
        self.controls[category.index()] = true;
    }

    fn active(&self) -> Category {
        self.controls
            .iter()
            .position(|&active| active)
            .map(|idx| Category::ALL[idx])
            .unwrap_or_default()
    }

    fn clear_rows(&mut self) {
        self.rows.clear();
        self.offset_row = 0;
        self.curser_row = 0;
    }

    fn append_row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn hide_hero(&mut self) {
        self.hero_visible = false;
    }

    fn scroll_to_top(&mut self) {
        self.offset_row = 0;
        self.curser_row = 0;
    }
}
