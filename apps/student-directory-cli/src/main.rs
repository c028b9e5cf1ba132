mod config;
mod logging;
mod shell;
mod terminal;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use student_directory::{
    Collaborators, CommandOutcome, ControllerSettings, DirectoryController, FormField,
    HttpStudentGateway, PageSize, StudentForm, StudentId, SubmitOutcome,
};

use crate::config::CliOverrides;
use crate::terminal::{
    TableObserver, TerminalConfirmer, TerminalInput, TerminalNotifier, TerminalViewer,
    render_table,
};

/// Browse and maintain the student directory
#[derive(Parser)]
#[command(name = "student-directory")]
#[command(about = "Browse and maintain the student directory")]
#[command(version)]
struct Cli {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Record store base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Print effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of the listing
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,
        /// Page size: 5, 10, 25 or 50
        #[arg(long)]
        limit: Option<PageSize>,
    },
    /// Look up by id, or filter by name
    Search { query: String },
    /// Show one record in detail
    View { id: StudentId },
    /// Add a student
    Add(FieldArgs),
    /// Update a student; omitted fields keep their current values
    Edit {
        id: StudentId,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete a student
    Delete {
        id: StudentId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Interactive session
    Shell,
}

#[derive(Args)]
struct FieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    marks: Option<String>,
}

impl FieldArgs {
    fn apply(self, form: &mut StudentForm<'_>) {
        let values = [
            (FormField::Name, self.name),
            (FormField::Email, self.email),
            (FormField::Age, self.age),
            (FormField::AverageMarks, self.marks),
        ];
        for (field, value) in values {
            if let Some(value) = value {
                form.set(field, value);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let overrides = CliOverrides {
        base_url: cli.base_url.clone(),
    };
    let config = config::load(cli.config.as_deref(), &overrides)?;
    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }
    tracing::info!(base_url = %config.base_url, "student directory starting");

    let gateway = HttpStudentGateway::from_config(&config).context("invalid record store settings")?;
    let mut settings = ControllerSettings::try_from(&config)?;
    if let Some(Commands::List {
        limit: Some(limit), ..
    }) = &cli.command
    {
        settings.page_size = *limit;
    }

    let assume_yes = matches!(cli.command, Some(Commands::Delete { yes: true, .. }));
    let input = Arc::new(TerminalInput::default());
    let directory = DirectoryController::new(
        Arc::new(gateway),
        Collaborators {
            confirmer: Arc::new(TerminalConfirmer::new(input.clone(), assume_yes)),
            notifier: Arc::new(TerminalNotifier),
            viewer: Arc::new(TerminalViewer),
        },
        settings,
    );

    match cli.command.unwrap_or(Commands::List {
        page: 1,
        limit: None,
    }) {
        Commands::List { page, .. } => {
            let outcome = directory.open_page(page).await;
            show(&directory, outcome)
        }
        Commands::Search { query } => {
            let outcome = directory.search(&query).await;
            show(&directory, outcome)
        }
        Commands::View { id } => {
            directory.view_record(id).await?;
            Ok(())
        }
        Commands::Add(fields) => {
            let mut form = directory.request_create();
            fields.apply(&mut form);
            submit(&mut form).await
        }
        Commands::Edit { id, fields } => {
            let mut form = directory.request_edit_by_id(id).await?;
            fields.apply(&mut form);
            submit(&mut form).await
        }
        Commands::Delete { id, .. } => match directory.delete_record(id).await {
            CommandOutcome::Failed(kind) => bail!("delete failed: {kind}"),
            CommandOutcome::Cancelled => {
                eprintln!("Nothing deleted");
                Ok(())
            }
            outcome => show(&directory, outcome),
        },
        Commands::Shell => {
            directory.subscribe(Arc::new(TableObserver));
            shell::run(&directory, &input).await
        }
    }
}

fn show(directory: &DirectoryController, outcome: CommandOutcome) -> Result<()> {
    println!("{}", render_table(&directory.state()));
    if let CommandOutcome::Failed(kind) = outcome {
        bail!("request failed: {kind}");
    }
    Ok(())
}

async fn submit(form: &mut StudentForm<'_>) -> Result<()> {
    match form.submit().await {
        SubmitOutcome::Saved(student) => {
            println!("{}", terminal::render_record(&student));
            Ok(())
        }
        SubmitOutcome::Invalid(err) => bail!(err),
        SubmitOutcome::Failed(err) => Err(err).context("the record store rejected the request"),
        SubmitOutcome::Closed => bail!("form is closed"),
    }
}
