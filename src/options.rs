//! Inclusion options shared by the on-screen table and the exported document.

use serde::{Deserialize, Serialize};

/// Summary table column. Variant order is the canonical left-to-right order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    Title,
    Author,
    DatePublished,
    Category,
    Coordinates,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Title,
        Column::Author,
        Column::DatePublished,
        Column::Category,
        Column::Coordinates,
    ];

    pub fn heading(self) -> &'static str {
        match self {
            Column::Title => "Title",
            Column::Author => "Author",
            Column::DatePublished => "Date Published",
            Column::Category => "Category",
            Column::Coordinates => "Coordinates",
        }
    }
}

/// Per-record detail section appended after the summary table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Section {
    Images,
    Feedback,
}

/// Names every flag of [`ReportOptions`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReportOption {
    Title,
    Author,
    Date,
    Category,
    Coordinates,
    Images,
    Feedback,
}

impl ReportOption {
    pub const ALL: [ReportOption; 7] = [
        ReportOption::Title,
        ReportOption::Author,
        ReportOption::Date,
        ReportOption::Category,
        ReportOption::Coordinates,
        ReportOption::Images,
        ReportOption::Feedback,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportOption::Title => "Include Title",
            ReportOption::Author => "Include Author",
            ReportOption::Date => "Include Date Published",
            ReportOption::Category => "Include Category",
            ReportOption::Coordinates => "Include Coordinates",
            ReportOption::Images => "Include Images",
            ReportOption::Feedback => "Include Feedback",
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown report option: {0}")]
pub struct UnknownOption(String);

impl std::str::FromStr for ReportOption {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let name = normalized.strip_prefix("include").unwrap_or(&normalized);
        match name {
            "title" => Ok(ReportOption::Title),
            "author" => Ok(ReportOption::Author),
            "date" | "datepublished" => Ok(ReportOption::Date),
            "category" => Ok(ReportOption::Category),
            "coordinates" => Ok(ReportOption::Coordinates),
            "images" => Ok(ReportOption::Images),
            "feedback" => Ok(ReportOption::Feedback),
            _ => Err(UnknownOption(s.to_owned())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    #[serde(rename = "includeTitle", default = "default_true")]
    pub title: bool,
    #[serde(rename = "includeAuthor", default = "default_true")]
    pub author: bool,
    #[serde(rename = "includeDate", default = "default_true")]
    pub date: bool,
    #[serde(rename = "includeCategory", default = "default_true")]
    pub category: bool,
    #[serde(rename = "includeCoordinates", default = "default_true")]
    pub coordinates: bool,
    #[serde(rename = "includeImages", default = "default_true")]
    pub images: bool,
    #[serde(rename = "includeFeedback", default = "default_true")]
    pub feedback: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: true,
            author: true,
            date: true,
            category: true,
            coordinates: true,
            images: true,
            feedback: true,
        }
    }
}

impl ReportOptions {
    pub fn get(&self, option: ReportOption) -> bool {
        match option {
            ReportOption::Title => self.title,
            ReportOption::Author => self.author,
            ReportOption::Date => self.date,
            ReportOption::Category => self.category,
            ReportOption::Coordinates => self.coordinates,
            ReportOption::Images => self.images,
            ReportOption::Feedback => self.feedback,
        }
    }

    pub fn set(&mut self, option: ReportOption, enabled: bool) {
        let flag = match option {
            ReportOption::Title => &mut self.title,
            ReportOption::Author => &mut self.author,
            ReportOption::Date => &mut self.date,
            ReportOption::Category => &mut self.category,
            ReportOption::Coordinates => &mut self.coordinates,
            ReportOption::Images => &mut self.images,
            ReportOption::Feedback => &mut self.feedback,
        };
        *flag = enabled;
    }

    pub fn includes_column(&self, column: Column) -> bool {
        match column {
            Column::Title => self.title,
            Column::Author => self.author,
            Column::DatePublished => self.date,
            Column::Category => self.category,
            Column::Coordinates => self.coordinates,
        }
    }

    pub fn includes(&self, section: Section) -> bool {
        match section {
            Section::Images => self.images,
            Section::Feedback => self.feedback,
        }
    }

    /// Active columns in canonical order.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|column| self.includes_column(*column))
            .collect()
    }

    pub fn has_detail_sections(&self) -> bool {
        self.images || self.feedback
    }
}
