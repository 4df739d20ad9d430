use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Chapter-by-chapter reading server for pre-parsed ebooks.
#[derive(Parser, Debug, Clone)]
#[command(name = "ebook-reader")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Path to config file.
    #[arg(short, long, env = "EBOOK_READER_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Address to bind the server to.
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,

    /// Number of books kept in the in-memory cache.
    #[arg(long)]
    pub cache_size: Option<usize>,

    /// Directories containing book data folders (default: current directory).
    pub dirs: Vec<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
}

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Library roots.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Title shown on the library page.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            title: default_title(),
        }
    }
}

fn default_bind() -> SocketAddr {
    SocketAddr::new(
        std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        8123,
    )
}

fn default_title() -> String {
    "Library".to_string()
}

/// Library configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Root directories, in lookup order.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of books (or cached misses) held in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

fn default_cache_capacity() -> usize {
    10
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> crate::error::Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the file configuration.
    pub fn apply_cli(&mut self, cli: &Cli) -> crate::error::Result<()> {
        if let Some(addr) = cli.bind {
            self.server.bind = addr;
        }
        if let Some(size) = cli.cache_size {
            self.cache.capacity = size;
        }
        if !cli.dirs.is_empty() {
            self.library.roots = cli.dirs.clone();
        }
        self.validate()
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.cache.capacity == 0 {
            return Err(crate::error::AppError::Config(
                "cache capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Root directory list built from this configuration.
    pub fn root_dirs(&self) -> RootDirs {
        RootDirs::new(self.library.roots.clone())
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("ebook-reader.toml"),
            dirs::config_dir()
                .map(|p| p.join("ebook-reader").join("config.toml"))
                .unwrap_or_default(),
            PathBuf::from("/etc/ebook-reader/config.toml"),
        ];

        candidates
            .into_iter()
            .find(|p| !p.as_os_str().is_empty() && p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# ebook-reader configuration

[server]
bind = "127.0.0.1:8123"
title = "Library"

[library]
# Directories containing "<name>_data" book folders, searched in order.
# Book links use the position in this list, so keep it stable.
roots = ["."]

[cache]
# Number of books kept deserialized in memory
capacity = 10
"#
        .to_string()
    }
}

/// Ordered, immutable list of library root directories.
///
/// Scoped book identifiers refer to roots by position, so the list never
/// changes once built.
#[derive(Debug, Clone)]
pub struct RootDirs(Arc<[PathBuf]>);

impl RootDirs {
    /// Build the list, falling back to the current directory when empty.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        if roots.is_empty() {
            Self(Arc::from(vec![PathBuf::from(".")]))
        } else {
            Self(Arc::from(roots))
        }
    }

    /// Root at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Path> {
        self.0.get(index).map(PathBuf::as_path)
    }

    /// Number of configured roots.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no roots are configured (never true once built).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate roots in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.0.iter().map(PathBuf::as_path)
    }
}
