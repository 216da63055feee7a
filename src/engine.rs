use chrono::{NaiveDate, NaiveDateTime};
use tracing::trace;

use crate::catalog::{Category, Comparison};
use crate::surface::Surface;
use crate::table::Record;

const DATE_FORMATS: [&str; 2] = ["%m/%d/%Y", "%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 6] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// The category and input value a render was made with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub category: Category,
    pub value: String,
}

impl FilterState {
    pub fn new(category: Category, value: impl Into<String>) -> Self {
        Self {
            category,
            value: value.into(),
        }
    }

    pub fn is_filtered(&self) -> bool {
        !self.value.is_empty()
    }
}

/// Parses a calendar date, dropping any time of day.
///
/// Accepts `mm/dd/yyyy` and `yyyy-mm-dd`, each optionally followed by
/// `HH:MM` or `HH:MM:SS`. Month and day need not be zero padded.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[derive(Debug)]
enum Matcher {
    // `None` when the filter itself is not a date, nothing can match it.
    Date(Option<NaiveDate>),
    Text(String),
}

impl Matcher {
    fn new(comparison: Comparison, filter_value: &str) -> Self {
        match comparison {
            Comparison::Date => Matcher::Date(parse_date(filter_value)),
            Comparison::Text => Matcher::Text(filter_value.to_lowercase()),
        }
    }

    fn matches(&self, value: &str) -> bool {
        match self {
            Matcher::Date(Some(date)) => parse_date(value) == Some(*date),
            Matcher::Date(None) => false,
            Matcher::Text(term) => value.to_lowercase() == *term,
        }
    }
}

/// Selects the records a table render shows, in their original order.
///
/// An absent or empty filter selects everything. Records missing the
/// category's field never match a filter.
pub fn filter_records<'a>(
    records: &'a [Record],
    filter_value: Option<&str>,
    category: Category,
) -> Vec<&'a Record> {
    let data_key = category.entry().data_key;
    let Some(filter_value) = filter_value.filter(|v| !v.is_empty()) else {
        return records.iter().collect();
    };

    let matcher = Matcher::new(category.comparison(), filter_value);
    trace!("Filtering {} records on {data_key} with {matcher:?}", records.len());
    records
        .iter()
        .filter(|record| record.get(data_key).is_some_and(|v| matcher.matches(v)))
        .collect()
}

/// Replaces the table body with one row per record, one cell per field.
pub fn draw_rows<S: Surface>(surface: &mut S, rows: &[&Record]) {
    surface.clear_rows();
    for record in rows {
        surface.append_row(record.values().to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sighting(datetime: &str, city: &str, state: &str, country: &str, shape: &str) -> Record {
        Record::from_pairs([
            ("datetime", datetime),
            ("city", city),
            ("state", state),
            ("country", country),
            ("shape", shape),
            ("comments", "bright light"),
        ])
    }

    fn nevada() -> Vec<Record> {
        vec![
            sighting("1/1/2020", "Reno", "NV", "US", "Circle"),
            sighting("1/1/2020", "Elko", "NV", "US", "Disk"),
        ]
    }

    fn cities(rows: &[&Record]) -> Vec<String> {
        rows.iter()
            .map(|r| r.get("city").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2011, 1, 11);
        assert_eq!(parse_date("1/11/2011"), expected);
        assert_eq!(parse_date("01/11/2011"), expected);
        assert_eq!(parse_date(" 2011-01-11 "), expected);
        assert_eq!(parse_date("1/11/2011 21:30"), expected);
        assert_eq!(parse_date("2011-01-11T08:15:00"), expected);
        assert_eq!(parse_date("11th of January"), None);
        assert_eq!(parse_date("13/40/2011"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_state_filter_keeps_order() {
        let records = nevada();
        let rows = filter_records(&records, Some("NV"), Category::State);
        assert_eq!(cities(&rows), ["Reno", "Elko"]);
    }

    #[test]
    fn test_state_filter_case_insensitive() {
        let records = nevada();
        let upper = filter_records(&records, Some("NV"), Category::State);
        let lower = filter_records(&records, Some("nv"), Category::State);
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_shape_filter_single_match() {
        let records = nevada();
        let rows = filter_records(&records, Some("circle"), Category::Shape);
        assert_eq!(cities(&rows), ["Reno"]);
    }

    #[test]
    fn test_text_filter_is_exact_not_substring() {
        let records = nevada();
        assert!(filter_records(&records, Some("Ren"), Category::City).is_empty());
        assert!(filter_records(&records, Some("N"), Category::State).is_empty());
    }

    #[test]
    fn test_no_filter_returns_everything() {
        let records = nevada();
        for category in Category::ALL {
            for filter in [None, Some("")] {
                let rows = filter_records(&records, filter, category);
                assert_eq!(rows, records.iter().collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn test_whitespace_is_not_trimmed() {
        let records = vec![
            sighting("1/1/2020", " Reno ", "NV", "US", "Circle"),
            sighting("1/1/2020", "Elko", "NV", "US", "Disk"),
        ];
        assert!(filter_records(&records, Some("Reno"), Category::City).is_empty());
        assert_eq!(
            cities(&filter_records(&records, Some(" reno "), Category::City)),
            [" Reno "]
        );
        assert!(filter_records(&records, Some("  nv  "), Category::State).is_empty());
        // A filter of only spaces is a real filter and matches nothing here.
        assert!(filter_records(&records, Some("   "), Category::Shape).is_empty());
    }

    #[test]
    fn test_date_filter_ignores_time_of_day() {
        let records = vec![
            sighting("6/3/2012 21:30", "Reno", "NV", "US", "Circle"),
            sighting("6/3/2012 04:05:00", "Elko", "NV", "US", "Disk"),
            sighting("6/4/2012 00:00", "Ely", "NV", "US", "Light"),
        ];
        let rows = filter_records(&records, Some("6/3/2012"), Category::Date);
        assert_eq!(cities(&rows), ["Reno", "Elko"]);
        let rows = filter_records(&records, Some("2012-06-04"), Category::Date);
        assert_eq!(cities(&rows), ["Ely"]);
    }

    #[test]
    fn test_unparseable_dates_are_excluded() {
        let records = vec![
            sighting("unknown", "Reno", "NV", "US", "Circle"),
            sighting("1/1/2020", "Elko", "NV", "US", "Disk"),
        ];
        let rows = filter_records(&records, Some("1/1/2020"), Category::Date);
        assert_eq!(cities(&rows), ["Elko"]);
        assert!(filter_records(&records, Some("unknown"), Category::Date).is_empty());
    }

    #[test]
    fn test_zero_matches_is_empty() {
        let records = nevada();
        assert!(filter_records(&records, Some("Mars"), Category::Country).is_empty());
        assert!(filter_records(&records, Some("2/2/1999"), Category::Date).is_empty());
    }

    #[test]
    fn test_missing_field_never_matches() {
        let records = vec![Record::from_pairs([("city", "Reno")])];
        assert!(filter_records(&records, Some("Circle"), Category::Shape).is_empty());
        assert_eq!(filter_records(&records, None, Category::Shape).len(), 1);
    }

    #[test]
    fn test_draw_rows_rebuilds_body() {
        let records = nevada();
        let mut page = crate::surface::Page::new(Vec::new(), Vec::new());
        page.append_row(vec!["stale".into()]);

        draw_rows(&mut page, &filter_records(&records, Some("disk"), Category::Shape));
        assert_eq!(page.rows.len(), 1);
        assert_eq!(
            page.rows[0],
            ["1/1/2020", "Elko", "NV", "US", "Disk", "bright light"]
        );

        draw_rows(&mut page, &filter_records(&records, Some("oval"), Category::Shape));
        assert!(page.rows.is_empty());
    }

    #[test]
    fn test_filter_state() {
        assert!(!FilterState::default().is_filtered());
        assert!(FilterState::new(Category::City, "  ").is_filtered());
        assert!(FilterState::new(Category::City, "Reno").is_filtered());
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            (1u32..=12, 1u32..=28, 1950i32..2030, 0u32..24, 0u32..60),
            "[A-Za-z ]{1,12}",
            "[A-Za-z]{2}",
            "[a-z]{2}",
            "[A-Za-z]{3,8}",
        )
            .prop_map(|((m, d, y, hh, mm), city, state, country, shape)| {
                sighting(
                    &format!("{m}/{d}/{y} {hh:02}:{mm:02}"),
                    &city,
                    &state,
                    &country,
                    &shape,
                )
            })
    }

    proptest! {
        #[test]
        fn prop_own_value_matches_itself(
            records in prop::collection::vec(arb_record(), 1..20),
            pick in any::<prop::sample::Index>(),
            cidx in 0usize..5,
        ) {
            let category = Category::ALL[cidx];
            let record = pick.get(&records);
            let value = record.get(category.entry().data_key).unwrap().to_string();
            let rows = filter_records(&records, Some(&value), category);
            prop_assert!(rows.contains(&record));
        }

        #[test]
        fn prop_filter_is_stable_subsequence(
            records in prop::collection::vec(arb_record(), 0..20),
            value in "[A-Za-z]{2}",
        ) {
            let rows = filter_records(&records, Some(&value), Category::State);
            let positions: Vec<usize> = rows
                .iter()
                .map(|r| records.iter().position(|x| std::ptr::eq(x, *r)).unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn prop_case_does_not_matter(
            records in prop::collection::vec(arb_record(), 0..20),
            value in "[A-Za-z]{3,8}",
        ) {
            let upper = filter_records(&records, Some(&value.to_uppercase()), Category::Shape);
            let lower = filter_records(&records, Some(&value.to_lowercase()), Category::Shape);
            prop_assert_eq!(upper, lower);
        }
    }
}
