//! papers CLI — local repository manager for bibliographic paper records
//!
//! Commands: init, add, list, show, docdir, completions

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use papers_core::{Config, Paper, PaperRecord};
use papers_repo::Repository;

#[derive(Parser)]
#[command(name = "papers")]
#[command(version)]
#[command(about = "Local repository manager for bibliographic paper records")]
struct Cli {
    /// Repository root (defaults to papers-directory from the config, then ".")
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Initialize a new repository
    Init {
        /// Directory to initialize (defaults to the repository root)
        dir: Option<PathBuf>,
    },
    /// Add a paper from a bibliography file
    Add {
        /// Bibliography file (.bibyaml) holding a single entry
        bib: PathBuf,
        /// Document to attach (e.g. the PDF)
        #[arg(long)]
        doc: Option<PathBuf>,
        /// Base citekey; a suffix is appended if it is taken
        #[arg(long)]
        citekey: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// List papers with their reference numbers
    #[command(alias = "ls")]
    List {
        /// Print JSON instead of one line per paper
        #[arg(long)]
        json: bool,
    },
    /// Show a paper by citekey or reference number
    Show {
        reference: String,
    },
    /// Print the document directory
    Docdir,
    /// Generate shell completions
    Completions {
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "papers={level},papers_cli={level},papers_core={level},papers_repo={level}"
        ))
    });
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    let root = cli
        .root
        .clone()
        .or_else(|| config.papers_directory().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."));

    match cli.command {
        Some(Commands::Init { dir }) => {
            let dir = dir.unwrap_or(root);
            let repo = Repository::init(&dir)?;
            println!("Initialized papers repository in {}", repo.root().display());
        }
        Some(Commands::Add {
            bib,
            doc,
            citekey,
            tags,
        }) => {
            let mut repo = open_repo(&root)?;
            let mut paper = Paper::load(&bib, None)
                .with_context(|| format!("cannot read {}", bib.display()))?;

            let base = citekey.or_else(|| paper.citekey().map(str::to_string));
            let key = repo.generate_unique_citekey(&paper, base.as_deref());
            paper.set_citekey(key);
            paper.metadata.added = Some(Utc::now());
            paper.metadata.tags = tags;
            if let Some(doc) = doc {
                paper.set_document(&std::path::absolute(&doc)?);
            }

            repo.add(&paper)?;
            println!("{}", serde_json::to_string_pretty(&paper)?);
        }
        Some(Commands::List { json }) => {
            let repo = open_repo(&root)?;
            let mut listed = Vec::with_capacity(repo.len());
            for (number, paper) in repo.all_papers::<Paper>().enumerate() {
                let paper = paper?;
                if json {
                    listed.push(serde_json::json!({ "ref": number, "paper": paper }));
                } else {
                    println!(
                        "{number}: [{}] {}",
                        paper.citekey().unwrap_or_default(),
                        paper.title().unwrap_or_default()
                    );
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&listed)?);
            }
        }
        Some(Commands::Show { reference }) => {
            let repo = open_repo(&root)?;
            let citekey = repo.citekey_from_ref(&reference)?;
            let paper: Paper = repo.paper_from_citekey(&citekey)?;
            println!("{}", serde_json::to_string_pretty(&paper)?);
        }
        Some(Commands::Docdir) => {
            let repo = open_repo(&root)?;
            println!("{}", repo.document_directory(&config).display());
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(shell, &mut Cli::command(), "papers", &mut io::stdout());
        }
        None => {
            println!(
                "papers v{} — local repository manager for bibliographic records",
                env!("CARGO_PKG_VERSION")
            );
            println!("Run `papers --help` for usage.");
        }
    }

    Ok(())
}

fn open_repo(root: &Path) -> Result<Repository> {
    Repository::open(root)
        .with_context(|| format!("no papers repository at {}", root.display()))
}
