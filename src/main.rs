use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use paper_feed::config::{default_config_path, find_config_file, get_config, load_config, Config};
use paper_feed::models::{find_category, Paper, PapersResponse};
use paper_feed::utils::{format_date, terminal_width, truncate_with_ellipsis};
use paper_feed::{FeedError, PaperFeed};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Paper Feed - Browse new and trending research papers from arXiv
#[derive(Parser, Debug)]
#[command(name = "paper-feed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse new and trending research papers from arXiv", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds, 0 for none (overrides the configured value)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

impl OutputFormat {
    fn resolve(self) -> Self {
        match self {
            OutputFormat::Auto if std::io::stdout().is_terminal() => OutputFormat::Table,
            OutputFormat::Auto => OutputFormat::Json,
            other => other,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the newest papers in a category
    #[command(alias = "ls")]
    List {
        /// Category code (default: configured default category)
        category: Option<String>,

        /// Zero-based page number
        #[arg(long, short, default_value_t = 0)]
        page: usize,

        /// Papers per page, 1-50 (default: configured page size)
        #[arg(long, short = 'n')]
        page_size: Option<usize>,
    },

    /// Search papers by free text, most relevant first
    #[command(alias = "s")]
    Search {
        /// Search text
        query: String,

        /// Zero-based page number
        #[arg(long, short, default_value_t = 0)]
        page: usize,

        /// Papers per page, 1-50 (default: configured page size)
        #[arg(long, short = 'n')]
        page_size: Option<usize>,
    },

    /// Show a single paper by arXiv id
    Get {
        /// Paper id (e.g., "2301.12345")
        id: String,
    },

    /// Show today's trending papers
    #[command(alias = "t")]
    Trending {
        /// Show at most this many papers
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// List supported categories
    Categories,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a configuration file with default values
    Init {
        /// Where to write (default: user config directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = match &config_path {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => get_config()?,
    };
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let format = cli.output.resolve();

    match cli.command {
        Some(Commands::List {
            category,
            page,
            page_size,
        }) => {
            let feed = PaperFeed::from_config(&config)?;
            let category = category.unwrap_or_else(|| config.feed.default_category.clone());
            let page_size = page_size.unwrap_or(config.feed.page_size);

            let response = feed
                .list_page(&category, page, page_size)
                .await
                .map_err(feed_error)?;
            output_listing(&response, page, format, cli.quiet)?;
        }

        Some(Commands::Search {
            query,
            page,
            page_size,
        }) => {
            let feed = PaperFeed::from_config(&config)?;
            let page_size = page_size.unwrap_or(config.feed.page_size);

            let response = feed
                .search_page(&query, page, page_size)
                .await
                .map_err(feed_error)?;
            output_listing(&response, page, format, cli.quiet)?;
        }

        Some(Commands::Get { id }) => {
            let feed = PaperFeed::from_config(&config)?;
            match feed.get_by_id(&id).await.map_err(feed_error)? {
                Some(paper) => output_paper(&paper, format)?,
                None => anyhow::bail!("No paper found with id {}", id.trim()),
            }
        }

        Some(Commands::Trending { limit }) => {
            let feed = PaperFeed::from_config(&config)?;
            let mut papers = feed.list_trending().await;
            if let Some(limit) = limit {
                papers.truncate(limit);
            }

            if papers.is_empty() && !cli.quiet {
                eprintln!("No trending papers available right now");
            }
            output_papers(&papers, format)?;
        }

        Some(Commands::Categories) => {
            output_categories(&config, format)?;
        }

        Some(Commands::Config {
            command: ConfigCommands::Init { path, force },
        }) => {
            let path = path
                .or_else(default_config_path)
                .unwrap_or_else(|| PathBuf::from("paper-feed.toml"));
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file {} already exists (use --force to overwrite)",
                    path.display()
                );
            }

            Config::default().save(&path)?;
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
        }

        None => {
            println!("Paper Feed v{}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Use --help for usage information.");
            println!();
            println!("Commands:");
            println!("  list [category]  - Newest papers in a category");
            println!("  search <query>   - Search papers");
            println!("  get <id>         - Show one paper");
            println!("  trending         - Today's trending papers");
            println!("  categories       - Supported categories");
            println!("  config init      - Write a default config file");
        }
    }

    Ok(())
}

/// Initialize tracing from flags, `RUST_LOG` or the configured level
fn init_tracing(cli: &Cli, config: &Config) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("paper_feed={}", level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Turn a feed error into a message fit for the terminal
fn feed_error(err: FeedError) -> anyhow::Error {
    if err.is_upstream_failure() {
        anyhow::anyhow!("{} (the upstream API is unavailable, try again later)", err)
    } else {
        anyhow::Error::new(err)
    }
}

fn output_listing(
    response: &PapersResponse,
    page: usize,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(response)?);
        return Ok(());
    }

    output_papers(&response.papers, format)?;

    if !quiet {
        if response.is_empty() {
            eprintln!("No papers found");
        } else {
            eprintln!(
                "Showing {}-{} of {}",
                response.start_index + 1,
                response.next_start(),
                response.total_results
            );
            if response.has_more {
                eprintln!("Next page: --page {}", page + 1);
            }
        }
    }

    Ok(())
}

fn output_papers(papers: &[Paper], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(papers)?);
        }
        OutputFormat::Plain => {
            for paper in papers {
                println!("{} - {} ({})", paper.title, paper.author_line(), paper.id);
                println!("  Published: {}", format_date(&paper.published_date));
                println!("  URL: {}", paper.arxiv_url);
                println!("  PDF: {}", paper.pdf_url);
                println!();
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let title_width = terminal_width().saturating_sub(70).max(30);

            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Title", "Authors", "Category", "Published"]);

            for paper in papers {
                table.add_row(vec![
                    Cell::new(&paper.id),
                    Cell::new(truncate_with_ellipsis(&paper.title, title_width))
                        .add_attribute(Attribute::Bold),
                    Cell::new(truncate_with_ellipsis(&paper.author_line(), 25)),
                    Cell::new(&paper.primary_category),
                    Cell::new(format_date(&paper.published_date)),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn output_paper(paper: &Paper, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(paper)?);
        }
        OutputFormat::Plain => {
            println!("{}", paper.title);
            println!("{}", paper.authors.join(", "));
            println!();
            println!("ID:         {}", paper.id);
            println!("Published:  {}", format_date(&paper.published_date));
            println!("Updated:    {}", format_date(&paper.updated_date));
            println!("Categories: {}", paper.categories.join(", "));
            println!("URL:        {}", paper.arxiv_url);
            println!("PDF:        {}", paper.pdf_url);
            println!();
            println!("{}", paper.r#abstract);
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_content_arrangement(ContentArrangement::Dynamic);
            table.set_width(terminal_width().min(u16::MAX as usize) as u16);

            let rows = [
                ("Title", paper.title.clone()),
                ("Authors", paper.authors.join(", ")),
                ("ID", paper.id.clone()),
                ("Published", format_date(&paper.published_date)),
                ("Updated", format_date(&paper.updated_date)),
                ("Categories", paper.categories.join(", ")),
                ("URL", paper.arxiv_url.clone()),
                ("PDF", paper.pdf_url.clone()),
                ("Abstract", paper.r#abstract.clone()),
            ];
            for (field, value) in rows {
                table.add_row(vec![Cell::new(field).add_attribute(Attribute::Bold), Cell::new(value)]);
            }
            println!("{table}");
        }
    }

    Ok(())
}

fn output_categories(config: &Config, format: OutputFormat) -> Result<()> {
    let categories = paper_feed::models::ARXIV_CATEGORIES;
    let default = find_category(&config.feed.default_category).map(|c| c.id);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(categories)?);
        }
        OutputFormat::Plain => {
            for category in categories {
                println!("{}\t{}", category.id, category.name);
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["ID", "Name", ""]);
            for category in categories {
                let marker = if Some(category.id) == default { "default" } else { "" };
                table.add_row(vec![
                    Cell::new(category.id).add_attribute(Attribute::Bold),
                    Cell::new(category.name),
                    Cell::new(marker),
                ]);
            }
            println!("{table}");
        }
    }

    Ok(())
}
