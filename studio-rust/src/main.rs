use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use copyfunnel_studio::{
    backup::{backup_file_name, parse_backup},
    render,
    storage::{FileStorage, PersistenceStore},
    templates::{TemplateField, TemplateLibrary},
    AdminSettings, FunnelGenerator, FunnelInput, GenerationError, Language, Studio, StudioConfig,
    StudioError, Tone, API_KEY_VARS,
};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "copyfunnel")]
#[command(
    author,
    version,
    about = "Generate a landing page, email sequence and ad copy from a product brief"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding settings, templates and history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Gemini model id
    #[arg(long, global = true)]
    model: Option<String>,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a funnel and record it in the history
    Generate(GenerateArgs),
    /// Settings, templates, history and backups (PIN protected)
    Admin(AdminArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Start from a saved template; other flags override its fields
    #[arg(long)]
    template: Option<String>,

    #[arg(long)]
    product: Option<String>,

    #[arg(long)]
    audience: Option<String>,

    #[arg(long)]
    pain_points: Option<String>,

    #[arg(long)]
    benefits: Option<String>,

    /// professional, urgent, friendly or luxury
    #[arg(long)]
    tone: Option<Tone>,

    /// es or en
    #[arg(long)]
    language: Option<Language>,

    /// Print the funnel as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct AdminArgs {
    #[arg(long)]
    pin: String,

    #[command(subcommand)]
    command: AdminCommands,
}

#[derive(Subcommand, Debug)]
enum AdminCommands {
    #[command(subcommand)]
    Settings(SettingsCommands),
    #[command(subcommand)]
    Templates(TemplateCommands),
    #[command(subcommand)]
    History(HistoryCommands),
    #[command(subcommand)]
    Backup(BackupCommands),
    /// Generation and template counts
    Stats,
}

#[derive(Subcommand, Debug)]
enum SettingsCommands {
    Show,
    Set {
        #[arg(long)]
        system_instruction: Option<String>,
        #[arg(long)]
        base_prompt: Option<String>,
        /// Between 0.0 and 1.0
        #[arg(long)]
        temperature: Option<f64>,
    },
    /// Restore the factory defaults
    Reset,
}

#[derive(Subcommand, Debug)]
enum TemplateCommands {
    List,
    Show {
        id: String,
    },
    Create {
        #[command(flatten)]
        fields: TemplateFieldArgs,
    },
    Edit {
        id: String,
        #[command(flatten)]
        fields: TemplateFieldArgs,
    },
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug)]
struct TemplateFieldArgs {
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    product: Option<String>,
    #[arg(long)]
    audience: Option<String>,
    #[arg(long)]
    pain_points: Option<String>,
    #[arg(long)]
    benefits: Option<String>,
    #[arg(long)]
    tone: Option<String>,
    #[arg(long)]
    language: Option<String>,
}

impl TemplateFieldArgs {
    fn updates(&self) -> Vec<(TemplateField, &str)> {
        [
            (TemplateField::Name, &self.name),
            (TemplateField::Description, &self.description),
            (TemplateField::ProductName, &self.product),
            (TemplateField::TargetAudience, &self.audience),
            (TemplateField::PainPoints, &self.pain_points),
            (TemplateField::Benefits, &self.benefits),
            (TemplateField::Tone, &self.tone),
            (TemplateField::Language, &self.language),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }
}

#[derive(Subcommand, Debug)]
enum HistoryCommands {
    List,
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    Clear {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum BackupCommands {
    /// Write every record to one JSON file
    Export { path: Option<PathBuf> },
    /// Restore the records present in a backup file
    Import {
        path: PathBuf,
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut config = StudioConfig::from_env();
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    debug!(data_dir = %config.data_dir.display(), model = %config.model, "configuration loaded");

    let result = run(cli.command, &config).await;
    if let Err(error) = &result {
        if let Some(StudioError::Generation(GenerationError::Configuration(provider))) =
            error.downcast_ref::<StudioError>()
        {
            eprintln!(
                "No API key found for {provider}. Set one of {} (a .env file works too) and \
                 try again.",
                API_KEY_VARS.join(", ")
            );
        }
    }
    result
}

fn open_studio(config: &StudioConfig) -> Result<Studio> {
    let storage = FileStorage::open(&config.data_dir).with_context(|| {
        format!("Failed to open data directory {}", config.data_dir.display())
    })?;
    let store = PersistenceStore::new(Arc::new(storage));
    let studio = Studio::open(store, FunnelGenerator::new(config.language_model()));

    for (key, reason) in studio.load_report().corrupt_entries() {
        eprintln!("warning: stored {key} was unreadable and has been reset ({reason})");
    }
    Ok(studio)
}

async fn run(command: Commands, config: &StudioConfig) -> Result<()> {
    match command {
        Commands::Generate(args) => {
            let mut studio = open_studio(config)?;
            generate(&mut studio, args).await
        }
        Commands::Admin(args) => {
            if !config.admin_gate().verify(&args.pin) {
                bail!("Incorrect PIN");
            }
            let mut studio = open_studio(config)?;
            admin(&mut studio, args.command)
        }
    }
}

async fn generate(studio: &mut Studio, args: GenerateArgs) -> Result<()> {
    let mut input = match &args.template {
        Some(id) => studio
            .templates()
            .get(id)
            .map(|template| template.data.clone())
            .ok_or_else(|| anyhow!("Template not found: {id}"))?,
        None => FunnelInput::default(),
    };
    if let Some(product) = args.product {
        input.product_name = product;
    }
    if let Some(audience) = args.audience {
        input.target_audience = audience;
    }
    if let Some(pain_points) = args.pain_points {
        input.pain_points = pain_points;
    }
    if let Some(benefits) = args.benefits {
        input.benefits = benefits;
    }
    if let Some(tone) = args.tone {
        input.tone = tone;
    }
    if let Some(language) = args.language {
        input.language = language;
    }
    if input.product_name.trim().is_empty() {
        bail!("--product is required unless --template is given");
    }

    let funnel = studio.generate(&input).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&funnel)?);
    } else {
        println!("{}", render::funnel_text(&funnel));
    }
    Ok(())
}

fn admin(studio: &mut Studio, command: AdminCommands) -> Result<()> {
    match command {
        AdminCommands::Settings(command) => settings(studio, command),
        AdminCommands::Templates(command) => templates(studio, command),
        AdminCommands::History(command) => history(studio, command),
        AdminCommands::Backup(command) => backup(studio, command),
        AdminCommands::Stats => {
            let stats = studio.stats();
            println!("Total generations: {}", stats.total_generations);
            println!("Templates: {}", stats.templates);
            Ok(())
        }
    }
}

fn settings(studio: &mut Studio, command: SettingsCommands) -> Result<()> {
    match command {
        SettingsCommands::Show => print_settings(studio.settings()),
        SettingsCommands::Set {
            system_instruction,
            base_prompt,
            temperature,
        } => {
            let mut next = studio.settings().clone();
            if let Some(system_instruction) = system_instruction {
                next.system_instruction = system_instruction;
            }
            if let Some(base_prompt) = base_prompt {
                next.base_prompt_template = base_prompt;
            }
            if let Some(temperature) = temperature {
                next.model_temperature = temperature;
            }
            studio.save_settings(next)?;
            print_settings(studio.settings());
        }
        SettingsCommands::Reset => {
            studio.reset_settings()?;
            print_settings(studio.settings());
        }
    }
    Ok(())
}

fn print_settings(settings: &AdminSettings) {
    println!("System instruction:\n{}\n", settings.system_instruction);
    println!("Base prompt:\n{}\n", settings.base_prompt_template);
    println!("Temperature: {}", settings.model_temperature);
}

fn templates(studio: &mut Studio, command: TemplateCommands) -> Result<()> {
    match command {
        TemplateCommands::List => {
            for template in studio.templates().list() {
                println!("{}", render::template_row(template));
            }
        }
        TemplateCommands::Show { id } => {
            let template = studio
                .templates()
                .get(&id)
                .ok_or_else(|| anyhow!("Template not found: {id}"))?;
            println!("{}", render::template_text(template));
        }
        TemplateCommands::Create { fields } => {
            let library = studio.templates_mut();
            library.create();
            save_with_fields(library, &fields)?;
        }
        TemplateCommands::Edit { id, fields } => {
            let library = studio.templates_mut();
            library.edit(&id)?;
            save_with_fields(library, &fields)?;
        }
        TemplateCommands::Delete { id, yes } => {
            if yes || confirm(&format!("Delete template {id}?"))? {
                let removed = studio.templates_mut().delete(&id)?;
                println!("Deleted {}", removed.name);
            }
        }
    }
    Ok(())
}

fn save_with_fields(library: &mut TemplateLibrary, fields: &TemplateFieldArgs) -> Result<()> {
    for (field, value) in fields.updates() {
        if let Err(error) = library.update_field(field, value) {
            library.discard_draft();
            return Err(error.into());
        }
    }
    let saved = library.save_draft()?;
    println!("{}", render::template_text(&saved));
    Ok(())
}

fn history(studio: &mut Studio, command: HistoryCommands) -> Result<()> {
    match command {
        HistoryCommands::List => {
            for summary in studio.history().summaries() {
                println!("{}", render::history_row(&summary));
            }
        }
        HistoryCommands::Show { id, json } => {
            let funnel = studio
                .history()
                .get(&id)
                .ok_or_else(|| anyhow!("No funnel with id {id} in history"))?;
            if json {
                println!("{}", serde_json::to_string_pretty(funnel)?);
            } else {
                println!("{}", render::funnel_text(funnel));
            }
        }
        HistoryCommands::Clear { yes } => {
            let count = studio.history().len();
            if yes || confirm(&format!("Delete all {count} history entries?"))? {
                studio.clear_history()?;
                println!("History cleared");
            }
        }
    }
    Ok(())
}

fn backup(studio: &mut Studio, command: BackupCommands) -> Result<()> {
    match command {
        BackupCommands::Export { path } => {
            let path =
                path.unwrap_or_else(|| PathBuf::from(backup_file_name(Utc::now().date_naive())));
            let json = studio.export_backup().to_pretty_json()?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Backup written to {}", path.display());
        }
        BackupCommands::Import { path, yes } => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let backup = parse_backup(&text)?;
            println!("Found:\n{}", backup.summary());
            if yes || confirm("Restore this data? Current data will be overwritten.")? {
                studio.import_backup(backup)?;
                println!("Data restored");
            }
        }
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
