mod transport;

use std::path::{Path, PathBuf};
use std::{fs, process};

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use markdown_docwriter_config::{Config, FeishuConfig};
use markdown_docwriter_engine::{
    Block, DocumentClient, DocumentStore, Permission, RecordingStore, ScanOptions, WireBlock,
    WriterOptions, parse_document_with, translate,
};
use serde_json::{Value, json};

use transport::HttpStore;

#[derive(Parser)]
#[command(
    name = "docwriter",
    version,
    about = "Write markdown into Feishu cloud documents"
)]
struct Cli {
    /// Config file (default: ~/.config/markdown-docwriter/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Record requests in memory instead of calling the API
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a config file with app credentials
    Init(InitArgs),

    /// Print the scanned blocks as JSON
    Parse(ContentArgs),

    /// Print the wire blocks that would be written
    Render(ContentArgs),

    /// Create a document and write content into it
    Create {
        #[arg(long)]
        title: String,

        /// Target folder token (default: feishu.default_folder)
        #[arg(long)]
        folder: Option<String>,

        #[command(flatten)]
        content: ContentArgs,
    },

    /// Append content to an existing document
    Append {
        document_id: String,

        #[command(flatten)]
        content: ContentArgs,
    },

    /// Show file metadata
    Info { token: String },

    /// Search documents
    Search {
        query: String,

        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Delete a document
    Delete { token: String },

    /// Open public link access and print the share URL
    Share {
        token: String,

        /// view or edit
        #[arg(long, default_value = "view")]
        permission: Permission,
    },
}

#[derive(Args)]
struct InitArgs {
    #[arg(long)]
    app_id: String,

    /// Secret, or an environment variable reference such as '$FEISHU_APP_SECRET'
    #[arg(long)]
    app_secret: String,

    /// Default folder token for new documents
    #[arg(long)]
    folder: Option<String>,

    /// Overwrite an existing config file
    #[arg(long)]
    force: bool,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct ContentArgs {
    /// Markdown text
    #[arg(long)]
    content: Option<String>,

    /// Markdown file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl ContentArgs {
    fn read(&self) -> Result<String> {
        match (&self.content, &self.file) {
            (Some(content), _) => Ok(content.clone()),
            (None, Some(path)) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            (None, None) => Err(anyhow!("Either --content or --file is required")),
        }
    }
}

fn init_config(path: Option<&Path>, args: &InitArgs, dry_run: bool) -> Result<Value> {
    let target = path.map_or_else(Config::config_path, Path::to_path_buf);
    if target.exists() && !args.force {
        bail!(
            "Config file already exists at {} (use --force to overwrite)",
            target.display()
        );
    }

    let mut feishu = FeishuConfig::new(&args.app_id, &args.app_secret);
    feishu.default_folder = args.folder.clone();
    let config = Config::new(feishu);

    if !dry_run {
        match path {
            Some(path) => config.save_to_path(path)?,
            None => config.save()?,
        }
        log::info!("Wrote config to {}", target.display());
    }
    Ok(json!({ "config": target, "written": !dry_run }))
}

fn load_config(path: Option<&Path>) -> Result<Option<Config>> {
    let config = match path {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn writer_options(config: Option<&Config>) -> WriterOptions {
    match config {
        Some(config) => WriterOptions {
            batch_size: config.writer.batch_size,
            scan: ScanOptions {
                ordered_list_max_start: config.writer.ordered_list_max_start,
                detect_subsections: config.writer.detect_subsections,
            },
        },
        None => WriterOptions::default(),
    }
}

/// Wire blocks for preview; tables show their empty shell.
fn render(blocks: &[Block]) -> Vec<WireBlock> {
    blocks
        .iter()
        .flat_map(|block| match block {
            Block::Table(table) => vec![WireBlock::table_shell(
                table.row_count(),
                table.col_count(),
            )],
            other => translate(other),
        })
        .collect()
}

/// Runs one command. Returns the JSON result and whether the command
/// fully succeeded. Only document commands touch the store.
fn execute<S: DocumentStore>(
    store: &S,
    command: &Command,
    options: WriterOptions,
    default_folder: Option<&str>,
) -> Result<(Value, bool)> {
    let client = DocumentClient::new(store, options);

    let outcome = match command {
        Command::Init(_) => bail!("init does not talk to the document store"),
        Command::Parse(content) => {
            let blocks = parse_document_with(&content.read()?, options.scan);
            (serde_json::to_value(blocks)?, true)
        }
        Command::Render(content) => {
            let blocks = parse_document_with(&content.read()?, options.scan);
            (serde_json::to_value(render(&blocks))?, true)
        }
        Command::Create {
            title,
            folder,
            content,
        } => {
            let folder = folder.as_deref().or(default_folder);
            let info = client.create_document(title, &content.read()?, folder)?;
            let ok = info.content_written;
            (serde_json::to_value(info)?, ok)
        }
        Command::Append {
            document_id,
            content,
        } => {
            let summary = client.append_content(document_id, &content.read()?)?;
            let ok = summary.is_success();
            (serde_json::to_value(summary)?, ok)
        }
        Command::Info { token } => match client.document_info(token)? {
            Some(info) => (serde_json::to_value(info)?, true),
            None => (Value::Null, false),
        },
        Command::Search { query, limit } => {
            (serde_json::to_value(client.search_documents(query, *limit)?)?, true)
        }
        Command::Delete { token } => {
            let deleted = client.delete_document(token)?;
            (json!({ "deleted": deleted }), deleted)
        }
        Command::Share { token, permission } => {
            let url = client.share_document(token, *permission)?;
            let ok = url.is_some();
            (json!({ "url": url }), ok)
        }
    };
    Ok(outcome)
}

fn run(cli: &Cli) -> Result<bool> {
    // before loading, so a broken config can be replaced
    if let Command::Init(args) = &cli.command {
        let result = init_config(cli.config.as_deref(), args, cli.dry_run)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(true);
    }

    let config = load_config(cli.config.as_deref())?;
    let options = writer_options(config.as_ref());
    let default_folder = config
        .as_ref()
        .and_then(|c| c.feishu.default_folder.as_deref());
    let offline = matches!(cli.command, Command::Parse(_) | Command::Render(_));

    let (result, ok) = if cli.dry_run {
        let store = RecordingStore::new();
        let (result, ok) = execute(&store, &cli.command, options, default_folder)?;
        (json!({ "result": result, "requests": store.requests() }), ok)
    } else if offline {
        execute(&RecordingStore::new(), &cli.command, options, default_folder)?
    } else {
        let config = config.as_ref().with_context(|| {
            format!(
                "No config file found at {}",
                cli.config.clone().unwrap_or_else(Config::config_path).display()
            )
        })?;
        let store = HttpStore::new(&config.feishu)?;
        execute(&store, &cli.command, options, default_folder)?
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ok)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if !run(&cli)? {
        log::warn!("Command did not fully succeed");
        process::exit(1);
    }
    Ok(())
}
