//! Summary table rows for research records.

use crate::{locale::Locale, model::ResearchRecord, options::Column};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryTable {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    pub fn header(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.heading()).collect()
    }
}

/// Text of one cell.
pub fn cell(record: &ResearchRecord, column: Column, locale: &Locale) -> String {
    match column {
        Column::Title => record.title.clone(),
        Column::Author => record.author.clone(),
        Column::DatePublished => record
            .date_published
            .map(|published| locale.format_published(published))
            .unwrap_or_default(),
        Column::Category => record.category.clone(),
        Column::Coordinates => record
            .coordinates()
            .map(|(latitude, longitude)| format!("{latitude}, {longitude}"))
            .unwrap_or_default(),
    }
}

/// One row per record, cells in the order of `columns`.
pub fn summary_table(records: &[ResearchRecord], columns: &[Column], locale: &Locale) -> SummaryTable {
    SummaryTable {
        columns: columns.to_vec(),
        rows: records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| cell(record, *column, locale))
                    .collect()
            })
            .collect(),
    }
}
