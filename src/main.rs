use std::{path::PathBuf, sync::Arc};

use admin_reports::{
    config::Config,
    model::{ExpertId, ResearchId},
    options::ReportOption,
    progress::{Phase, ProgressReporter, create_reporter},
    render,
    report::{Document, Generator, Metadata, Template},
    source::{DataSource, http},
    view::{
        ExpertView, MetricsView,
        expert::{self, Message},
        metrics::{self, Message as MetricsMessage},
    },
};
use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use futures::future::join_all;
use tracing::{error, info};

#[derive(Parser)]
#[clap(version, about = "Browse admin reports and export them as PDF")]
struct Opts {
    #[clap(short, long, env = "ADMIN_REPORTS_CONFIG")]
    config: PathBuf,
    /// Overrides `api.token` from the config file.
    #[clap(long, env = "ADMIN_REPORTS_TOKEN", hide_env_values = true)]
    token: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List experts.
    Experts,
    /// Show the research of one expert.
    Research {
        #[clap(long)]
        expert: ExpertId,
        /// Show the detail block of this research.
        #[clap(long)]
        expand: Option<ResearchId>,
        /// Hide a column (title, author, date, category, coordinates).
        #[clap(long)]
        exclude: Vec<ReportOption>,
    },
    /// Export the research of one expert.
    ExpertReport {
        #[clap(long)]
        expert: ExpertId,
        /// Leave out a column or detail section (images, feedback).
        #[clap(long)]
        exclude: Vec<ReportOption>,
    },
    /// Export the system totals.
    SystemReport,
    /// Export comments and feedback per day.
    ActivityReport {
        /// Restrict the series to one day (YYYY-MM-DD).
        #[clap(long)]
        date: Option<NaiveDate>,
    },
    /// Show the system totals and the per-day series.
    Metrics {
        /// Restrict the series to one day (YYYY-MM-DD).
        #[clap(long)]
        date: Option<NaiveDate>,
    },
    /// Print the dashboard charts as JSON.
    Charts {
        #[clap(long)]
        date: Option<NaiveDate>,
    },
}

/// Feed `message` to the view and run commands until it settles.
async fn drive_expert<S: DataSource>(source: &S, view: &mut ExpertView, message: Message) {
    let mut next = view.update(message);
    while let Some(command) = next {
        let message = expert::execute(source, command).await;
        next = view.update(message);
    }
}

async fn drive_metrics<S: DataSource>(
    source: &S,
    view: &mut MetricsView,
    message: MetricsMessage,
) {
    let mut commands = view.update(message);
    while !commands.is_empty() {
        let messages = join_all(
            commands
                .into_iter()
                .map(|command| metrics::execute(source, command)),
        )
        .await;
        commands = messages
            .into_iter()
            .flat_map(|message| view.update(message))
            .collect();
    }
}

fn surface(error: Option<&str>) -> anyhow::Result<()> {
    match error {
        Some(error) => bail!("{error}"),
        None => Ok(()),
    }
}

async fn load_metrics<S: DataSource>(
    source: &S,
    today: NaiveDate,
    date: Option<NaiveDate>,
) -> anyhow::Result<MetricsView> {
    let mut view = MetricsView::new(today);
    drive_metrics(source, &mut view, MetricsMessage::Init).await;
    surface(view.error())?;
    if let Some(date) = date {
        drive_metrics(source, &mut view, MetricsMessage::PickDate(date)).await;
        surface(view.error())?;
    }
    Ok(view)
}

async fn load_research<S: DataSource>(
    source: &S,
    reporter: &dyn ProgressReporter,
    expert: ExpertId,
    exclude: Vec<ReportOption>,
) -> anyhow::Result<ExpertView> {
    let mut view = ExpertView::new();
    for option in exclude {
        view.update(Message::SetOption(option, false));
    }
    drive_expert(source, &mut view, Message::SelectExpert(expert.clone())).await;
    surface(view.error())?;
    reporter.log_info(&format!(
        "{} research records for expert {expert}",
        view.records.len()
    ));
    Ok(view)
}

async fn write(
    reporter: &dyn ProgressReporter,
    config: &Config,
    doc: Document,
) -> anyhow::Result<()> {
    for warning in &doc.warnings {
        reporter.log_warn(&warning.to_string());
    }
    reporter.set_phase(Phase::Writing);
    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("create {}", config.output_dir.display()))?;
    let path = doc
        .save(&config.output_dir)
        .await
        .with_context(|| format!("write {}", doc.file_name))?;
    info!(path = %path.display(), pages = doc.page_count, "document written");
    reporter.document_written(&path, doc.page_count);
    Ok(())
}

async fn run(opts: Opts, reporter: Arc<dyn ProgressReporter>) -> anyhow::Result<()> {
    reporter.set_phase(Phase::LoadingConfig);
    let config = Config::load(&opts.config)
        .await
        .with_context(|| format!("load config from {}", opts.config.display()))?;
    let template: Template = config.template().await.context("load branding")?;
    let token = opts.token.or_else(|| config.api.token.clone());
    let source = http::Client::new(config.api.base_url.clone(), token);
    let generator = Generator::new(&template);
    let metadata = Metadata::now(config.operator.clone());
    let today = template.locale.today(Utc::now());

    match opts.command {
        Command::Experts => {
            reporter.set_phase(Phase::Fetching("experts"));
            let mut view = ExpertView::new();
            drive_expert(&source, &mut view, Message::Init).await;
            surface(view.error())?;
            reporter.log_info(&format!("{} experts", view.experts.len()));
            println!("{}", render::experts(&view.experts));
        }
        Command::Research {
            expert,
            expand,
            exclude,
        } => {
            reporter.set_phase(Phase::Fetching("research"));
            let mut view = load_research(&source, &*reporter, expert, exclude).await?;
            if let Some(id) = expand {
                view.update(Message::ToggleExpand(id));
            }
            println!("{}", render::expert_page(&view, &template.locale));
        }
        Command::ExpertReport { expert, exclude } => {
            reporter.set_phase(Phase::Fetching("research"));
            let view = load_research(&source, &*reporter, expert, exclude).await?;
            reporter.set_phase(Phase::Generating);
            write(&*reporter, &config, view.export(&generator, &metadata)).await?;
        }
        Command::SystemReport => {
            reporter.set_phase(Phase::Fetching("system totals"));
            let view = load_metrics(&source, today, None).await?;
            reporter.set_phase(Phase::Generating);
            let doc = view.export_system(&generator, &metadata)?;
            write(&*reporter, &config, doc).await?;
        }
        Command::ActivityReport { date } => {
            reporter.set_phase(Phase::Fetching("comments and feedback"));
            let view = load_metrics(&source, today, date).await?;
            reporter.set_phase(Phase::Generating);
            write(&*reporter, &config, view.export_activity(&generator, &metadata)).await?;
        }
        Command::Metrics { date } => {
            reporter.set_phase(Phase::Fetching("dashboard data"));
            let view = load_metrics(&source, today, date).await?;
            println!("{}", render::metrics_page(&view));
        }
        Command::Charts { date } => {
            reporter.set_phase(Phase::Fetching("dashboard data"));
            let view = load_metrics(&source, today, date).await?;
            println!("{}", serde_json::to_string_pretty(&view.charts())?);
        }
    }
    reporter.set_phase(Phase::Completed);
    Ok(())
}

fn main() {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let reporter = create_reporter();
    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start runtime")
        .and_then(|runtime| runtime.block_on(run(opts, reporter.clone())));
    if let Err(e) = &result {
        error!(?e, "critical error");
        reporter.log_error(&format!("{e:#}"));
        reporter.set_phase(Phase::Failed(e.to_string()));
    }
    reporter.finish();
    if result.is_err() {
        std::process::exit(1);
    }
}
