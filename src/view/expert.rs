use tracing::debug;

use super::{RequestToken, TokenIssuer};
use crate::{
    model::{Expert, ExpertId, ResearchId, ResearchRecord},
    options::{Column, ReportOption, ReportOptions},
    report::{Document, Generator, Metadata},
    source::DataSource,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Message {
    Init,
    ExpertsLoaded(Result<Vec<Expert>, String>),
    SelectExpert(ExpertId),
    ResearchLoaded {
        token: RequestToken,
        result: Result<Vec<ResearchRecord>, String>,
    },
    SetOption(ReportOption, bool),
    ToggleExpand(ResearchId),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    FetchExperts,
    FetchResearch {
        token: RequestToken,
        expert: ExpertId,
    },
}

/// Expert research browser state.
#[derive(Debug, Default)]
pub struct ExpertView {
    pub experts: Vec<Expert>,
    pub selected: Option<ExpertId>,
    pub records: Vec<ResearchRecord>,
    pub options: ReportOptions,
    pub loading: bool,
    /// Failure of the expert list fetch.
    pub experts_error: Option<String>,
    /// Failure of the research fetch for the selected expert.
    pub research_error: Option<String>,
    /// At most one row is expanded at a time.
    pub expanded: Option<ResearchId>,
    research: TokenIssuer,
}

impl ExpertView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, message: Message) -> Option<Command> {
        match message {
            Message::Init => {
                self.experts_error = None;
                Some(Command::FetchExperts)
            }
            Message::ExpertsLoaded(Ok(experts)) => {
                self.experts = experts;
                None
            }
            Message::ExpertsLoaded(Err(error)) => {
                self.experts_error = Some(error);
                None
            }
            Message::SelectExpert(expert) => {
                let token = self.research.issue();
                self.selected = Some(expert.clone());
                self.records.clear();
                self.expanded = None;
                self.loading = true;
                self.research_error = None;
                Some(Command::FetchResearch { token, expert })
            }
            Message::ResearchLoaded { token, result } => {
                if !self.research.is_current(token) {
                    debug!(%token, "dropping stale research response");
                    return None;
                }
                self.loading = false;
                match result {
                    Ok(records) => self.records = records,
                    Err(error) => self.research_error = Some(error),
                }
                None
            }
            Message::SetOption(option, enabled) => {
                self.options.set(option, enabled);
                None
            }
            Message::ToggleExpand(id) => {
                if self.expanded.as_ref() == Some(&id) {
                    self.expanded = None;
                } else {
                    self.expanded = Some(id);
                }
                None
            }
        }
    }

    /// The first outstanding failure, expert list before research.
    pub fn error(&self) -> Option<&str> {
        self.experts_error
            .as_deref()
            .or(self.research_error.as_deref())
    }

    /// Columns of the on-screen table; the exported table uses the same set.
    pub fn visible_columns(&self) -> Vec<Column> {
        self.options.columns()
    }

    pub fn expanded_record(&self) -> Option<&ResearchRecord> {
        let id = self.expanded.as_ref()?;
        self.records.iter().find(|record| &record.id == id)
    }

    pub fn export(&self, generator: &Generator<'_>, metadata: &Metadata) -> Document {
        generator.expert_research(&self.records, &self.options, metadata)
    }
}

/// Run `command` against `source` and wrap the outcome as the message to feed back.
pub async fn execute<S: DataSource>(source: &S, command: Command) -> Message {
    match command {
        Command::FetchExperts => Message::ExpertsLoaded(
            source
                .list_experts()
                .await
                .map_err(|error| error.to_string()),
        ),
        Command::FetchResearch { token, expert } => Message::ResearchLoaded {
            token,
            result: source
                .list_research_by_expert(&expert)
                .await
                .map_err(|error| error.to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Identifier;

    fn record(id: &str, title: &str) -> ResearchRecord {
        ResearchRecord {
            id: Identifier::new(id),
            title: title.into(),
            author: String::new(),
            date_published: None,
            category: String::new(),
            latitude: None,
            longitude: None,
            content: String::new(),
            images: Vec::new(),
            feedbacks: Vec::new(),
        }
    }

    fn fetch_token(command: Option<Command>) -> RequestToken {
        match command {
            Some(Command::FetchResearch { token, .. }) => token,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_double_toggle_collapses() {
        let mut view = ExpertView::new();
        let id = Identifier::new("3");
        view.update(Message::ToggleExpand(id.clone()));
        assert_eq!(view.expanded, Some(id.clone()));
        view.update(Message::ToggleExpand(Identifier::new("4")));
        assert_eq!(view.expanded, Some(Identifier::new("4")));
        view.update(Message::ToggleExpand(Identifier::new("4")));
        assert_eq!(view.expanded, None);
    }

    #[test]
    fn test_late_response_for_previous_expert_is_ignored() {
        let mut view = ExpertView::new();
        let e1 = fetch_token(view.update(Message::SelectExpert(Identifier::new("E1"))));
        let e2 = fetch_token(view.update(Message::SelectExpert(Identifier::new("E2"))));

        view.update(Message::ResearchLoaded {
            token: e2,
            result: Ok(vec![record("20", "from E2")]),
        });
        view.update(Message::ResearchLoaded {
            token: e1,
            result: Ok(vec![record("10", "from E1")]),
        });

        assert_eq!(view.selected, Some(Identifier::new("E2")));
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].title, "from E2");
        assert!(!view.loading);
    }

    #[test]
    fn test_fetch_failure_stops_loading_and_keeps_message() {
        let mut view = ExpertView::new();
        let token = fetch_token(view.update(Message::SelectExpert(Identifier::new("1"))));
        assert!(view.loading);
        view.update(Message::ResearchLoaded {
            token,
            result: Err("request failed. status: 500".into()),
        });
        assert!(!view.loading);
        assert_eq!(view.error(), Some("request failed. status: 500"));
        assert!(view.records.is_empty());
    }

    #[test]
    fn test_selecting_an_expert_keeps_list_failure() {
        let mut view = ExpertView::new();
        view.update(Message::ExpertsLoaded(Err("experts unavailable".into())));
        let token = fetch_token(view.update(Message::SelectExpert(Identifier::new("1"))));
        assert_eq!(view.error(), Some("experts unavailable"));

        view.update(Message::ResearchLoaded {
            token,
            result: Err("research unavailable".into()),
        });
        assert_eq!(view.experts_error.as_deref(), Some("experts unavailable"));
        assert_eq!(view.research_error.as_deref(), Some("research unavailable"));

        // A new selection clears only its own slot.
        view.update(Message::SelectExpert(Identifier::new("2")));
        assert_eq!(view.research_error, None);
        assert_eq!(view.error(), Some("experts unavailable"));

        view.update(Message::Init);
        assert_eq!(view.error(), None);
    }

    #[test]
    fn test_options_drive_visible_columns() {
        let mut view = ExpertView::new();
        view.update(Message::SetOption(ReportOption::Coordinates, false));
        view.update(Message::SetOption(ReportOption::Title, false));
        view.update(Message::SetOption(ReportOption::Title, true));
        assert_eq!(
            view.visible_columns(),
            vec![
                Column::Title,
                Column::Author,
                Column::DatePublished,
                Column::Category
            ]
        );
    }
}
