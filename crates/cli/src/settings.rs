// ABOUTME: Global command-line options and the resolved Settings every stage reads.
// ABOUTME: Each flag can also come from a COMPENDIUM_* environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use compendium_extract::image_utils::ICONS_DIR;
use compendium_extract::{builtin_overrides, parse_overrides, ImageOverride, Source, TableProfile, DEFAULT_SOURCES};
use compendium_fetch::{Client, DEFAULT_CONCURRENCY, DEFAULT_USER_AGENT};

/// Page URL pattern; `{name}` becomes the source display name.
pub const DEFAULT_URL_TEMPLATE: &str = "https://hades.fandom.com/wiki/{name}/Boons_(Hades)";

/// Options shared by every stage.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Working directory holding boons/, public/ and the database
    #[arg(long, env = "COMPENDIUM_ROOT", default_value = ".", global = true)]
    pub root: PathBuf,

    /// Database path (default: <root>/boons.db)
    #[arg(long, env = "COMPENDIUM_DB", global = true)]
    pub db: Option<PathBuf>,

    /// Comma-separated source names, in processing order
    #[arg(long, env = "COMPENDIUM_SOURCES", value_delimiter = ',', global = true)]
    pub sources: Vec<String>,

    /// Page URL template; {name} is replaced by the source name
    #[arg(long, env = "COMPENDIUM_URL_TEMPLATE", default_value = DEFAULT_URL_TEMPLATE, global = true)]
    pub url_template: String,

    /// Maximum concurrent requests
    #[arg(long, env = "COMPENDIUM_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY, global = true)]
    pub concurrency: usize,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// User-Agent header for requests
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// JSON file of image overrides replacing the built-in table
    #[arg(long, global = true)]
    pub overrides: Option<PathBuf>,
}

/// Resolved configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub db_path: PathBuf,
    pub sources: Vec<Source>,
    pub url_template: String,
    pub concurrency: usize,
    pub timeout: Duration,
    pub user_agent: String,
    pub overrides_path: Option<PathBuf>,
    pub profile: TableProfile,
}

impl Settings {
    pub fn from_args(args: GlobalArgs) -> Result<Self> {
        let names: Vec<String> = args
            .sources
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let sources = if names.is_empty() {
            DEFAULT_SOURCES.iter().map(|n| Source::new(*n)).collect()
        } else {
            names.into_iter().map(Source::new).collect()
        };

        if args.concurrency == 0 {
            bail!("--concurrency must be at least 1");
        }

        let db_path = args.db.unwrap_or_else(|| args.root.join("boons.db"));

        Ok(Self {
            root: args.root,
            db_path,
            sources,
            url_template: args.url_template,
            concurrency: args.concurrency,
            timeout: Duration::from_secs(args.timeout_secs),
            user_agent: args
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            overrides_path: args.overrides,
            profile: TableProfile::default(),
        })
    }

    pub fn boons_dir(&self) -> PathBuf {
        self.root.join("boons")
    }

    /// Saved table of one source.
    pub fn snapshot_path(&self, source: &Source) -> PathBuf {
        self.boons_dir().join(format!("{}.html", source.name))
    }

    /// Whole page saved when no table could be located.
    pub fn full_page_path(&self, source: &Source) -> PathBuf {
        self.boons_dir().join(format!("{}-full.html", source.name))
    }

    pub fn public_dir(&self) -> PathBuf {
        self.root.join("public")
    }

    pub fn icons_dir(&self) -> PathBuf {
        self.public_dir().join(ICONS_DIR)
    }

    /// Absolute location of a public-relative path such as `images/icons/x.png`.
    pub fn public_file(&self, local_path: &str) -> PathBuf {
        self.public_dir().join(local_path.trim_start_matches('/'))
    }

    pub fn export_path(&self) -> PathBuf {
        self.public_dir().join("data").join("boons.json")
    }

    pub fn combined_path(&self) -> PathBuf {
        self.root.join("combined-boons.html")
    }

    pub fn client(&self) -> Result<Client> {
        Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.clone())
            .build()
            .context("building HTTP client")
    }

    /// The override table: the configured file if any, else the built-in one.
    pub fn image_overrides(&self) -> Result<Vec<ImageOverride>> {
        match &self.overrides_path {
            Some(path) => load_overrides(path),
            None => Ok(builtin_overrides()),
        }
    }
}

fn load_overrides(path: &Path) -> Result<Vec<ImageOverride>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading overrides from {}", path.display()))?;
    parse_overrides(&json).with_context(|| format!("parsing overrides in {}", path.display()))
}
