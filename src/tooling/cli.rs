//! CLI Tooling
//!
//! Browse, resolve and search the hierarchy from a terminal. Navigation state
//! (selection and expanded rows) persists between invocations like it does
//! between UI sessions.

use crate::config::{ConfigLoader, NavConfig};
use crate::error::ApiError;
use crate::level::Level;
use crate::navigator::{NavigationOutcome, Navigator};
use crate::node::{HierarchyNode, SearchResult};
use crate::source::{MemoryRecordSource, RecordSource, RestRecordSource};
use crate::state::{HierarchySelection, NavigationState, SledStatePersistence, StatePersistence};
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::Table;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Infranav CLI - hierarchical IT-asset navigation
#[derive(Parser)]
#[command(name = "infranav")]
#[command(about = "Browse, resolve and search the site > datacenter > cluster > node > domain > vm hierarchy")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides the global config file)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Read records from a JSON seed file instead of the REST backend
    #[arg(long, global = true)]
    pub seed: Option<PathBuf>,

    /// Navigation state directory (overrides state.path)
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Pin this site as the tree root when listing sites
    #[arg(long, global = true)]
    pub scope: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the direct children at LEVEL of a parent (sites need no parent)
    Children {
        level: Level,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Print the root-first path to a node
    Path { level: Level, id: String },
    /// Search every level for names containing QUERY
    Search { query: String },
    /// Navigate to a node: select it and open the tree down to it
    Select { level: Level, id: String },
    /// Expand a row and list its children
    Expand { level: Level, id: String },
    /// Collapse a row
    Collapse { id: String },
    /// Flip a row between expanded and collapsed
    Toggle { id: String },
    /// Collapse every row
    CollapseAll,
    /// Show persisted selection, expanded rows and the selection breadcrumb
    State,
    /// Print the effective configuration
    Config,
}

/// Load configuration honouring `--config` and apply CLI logging overrides.
pub fn load_config(cli: &Cli) -> Result<NavConfig, ApiError> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    if let Some(output) = &cli.log_output {
        config.logging.output = output.clone();
    }
    if let Some(state) = &cli.state {
        config.state.path = Some(state.clone());
    }
    Ok(config)
}

pub struct CliContext {
    navigator: Navigator,
    config: NavConfig,
    scope: Option<String>,
    format: OutputFormat,
}

impl CliContext {
    /// Wire the record source and durable state described by `cli` and `config`.
    pub fn new(cli: &Cli, config: NavConfig) -> Result<Self, ApiError> {
        let source: Arc<dyn RecordSource> = match &cli.seed {
            Some(seed) => Arc::new(MemoryRecordSource::from_seed_file(seed)?),
            None => Arc::new(RestRecordSource::new(&config.backend)?),
        };
        let state_path = config.state.resolve_path()?;
        let persistence: Arc<dyn StatePersistence> =
            Arc::new(SledStatePersistence::open(&state_path)?);
        info!(state = %state_path.display(), "Opened navigation state");

        Ok(Self::from_parts(
            source,
            persistence,
            config,
            cli.scope.clone(),
            cli.format,
        ))
    }

    pub fn from_parts(
        source: Arc<dyn RecordSource>,
        persistence: Arc<dyn StatePersistence>,
        config: NavConfig,
        scope: Option<String>,
        format: OutputFormat,
    ) -> Self {
        let state = Arc::new(NavigationState::load(persistence));
        let navigator = Navigator::new(source, state, config.search.clone());
        Self {
            navigator,
            config,
            scope,
            format,
        }
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub async fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Children { level, parent } => {
                if *level == Level::Site {
                    self.apply_scope().await?;
                }
                let nodes = self
                    .navigator
                    .fetch_children(parent.as_deref(), *level)
                    .await;
                Ok(self.render_nodes(&nodes))
            }
            Commands::Path { level, id } => {
                let path = self.navigator.fetch_path_to_node(id, *level).await;
                Ok(self.render_path(&path))
            }
            Commands::Search { query } => {
                let results = self.navigator.search(query).await;
                Ok(self.render_results(&results))
            }
            Commands::Select { level, id } => match self.navigator.navigate_to(id, *level).await {
                NavigationOutcome::Applied(path) if path.is_empty() => Err(ApiError::NotFound(
                    format!("{} '{}' could not be resolved", level, id),
                )),
                NavigationOutcome::Applied(path) => Ok(self.render_path(&path)),
                NavigationOutcome::Superseded => Ok("Navigation superseded".to_string()),
            },
            Commands::Expand { level, id } => {
                let children = self.navigator.expand_row(id, *level).await;
                Ok(self.render_nodes(&children))
            }
            Commands::Collapse { id } => {
                self.navigator.collapse_row(id);
                Ok(self.render_toggle(id, false))
            }
            Commands::Toggle { id } => {
                let expanded = self.navigator.toggle_row(id);
                Ok(self.render_toggle(id, expanded))
            }
            Commands::CollapseAll => {
                self.navigator.collapse_all();
                Ok(self.render_toggle("*", false))
            }
            Commands::State => self.render_state().await,
            Commands::Config => self.render_config(),
        }
    }

    async fn apply_scope(&self) -> Result<(), ApiError> {
        let site_id = match &self.scope {
            Some(site_id) => site_id,
            None => return Ok(()),
        };
        let path = self.navigator.fetch_path_to_node(site_id, Level::Site).await;
        let site = path
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("site '{}' for --scope", site_id)))?;
        self.navigator.pin_scope(site)
    }

    fn render_nodes(&self, nodes: &[HierarchyNode]) -> String {
        if self.format == OutputFormat::Json {
            return json!(nodes).to_string();
        }
        if nodes.is_empty() {
            return "(none)".to_string();
        }
        let mut table = Table::new();
        table.set_header(vec!["Level", "Name", "Id", "Parent", "Status"]);
        for node in nodes {
            table.add_row(vec![
                node.level.to_string(),
                node.name.clone(),
                node.id.clone(),
                node.parent_id.clone().unwrap_or_default(),
                node.metadata.get("status").cloned().unwrap_or_default(),
            ]);
        }
        table.to_string()
    }

    fn render_path(&self, path: &[HierarchyNode]) -> String {
        if self.format == OutputFormat::Json {
            return json!(path).to_string();
        }
        if path.is_empty() {
            return "(unresolved)".to_string();
        }
        breadcrumb(path)
    }

    fn render_results(&self, results: &[SearchResult]) -> String {
        if self.format == OutputFormat::Json {
            return json!(results).to_string();
        }
        if results.is_empty() {
            return "(no matches)".to_string();
        }
        results
            .iter()
            .map(|r| format!("[{}] {} ({})", r.level(), r.name(), r.id()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn render_toggle(&self, id: &str, expanded: bool) -> String {
        let state = if expanded { "expanded" } else { "collapsed" };
        match self.format {
            OutputFormat::Json => json!({ "id": id, "state": state }).to_string(),
            OutputFormat::Text => format!("{} {}", id, state),
        }
    }

    async fn render_state(&self) -> Result<String, ApiError> {
        let selection = self.navigator.state().selection();
        let expanded = self.navigator.state().expanded();
        let path = match selection.deepest() {
            Some((level, id)) => self.navigator.fetch_path_to_node(id, level).await,
            None => Vec::new(),
        };

        if self.format == OutputFormat::Json {
            return Ok(json!({
                "selection": selection,
                "expanded": expanded,
                "breadcrumb": path,
            })
            .to_string());
        }

        let mut lines = Vec::new();
        lines.push(format!("Selection: {}", describe_selection(&selection)));
        lines.push(format!(
            "Expanded ({}): {}",
            expanded.len(),
            expanded.iter().cloned().collect::<Vec<_>>().join(", ")
        ));
        if !path.is_empty() {
            lines.push(format!("Breadcrumb: {}", breadcrumb(&path)));
        }
        Ok(lines.join("\n"))
    }

    fn render_config(&self) -> Result<String, ApiError> {
        let mut config = self.config.clone();
        if config.backend.api_key.is_some() {
            config.backend.api_key = Some("********".to_string());
        }
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
            OutputFormat::Text => toml::to_string_pretty(&config)
                .map_err(|e| ApiError::ConfigError(format!("Failed to render config: {}", e))),
        }
    }
}

fn breadcrumb(path: &[HierarchyNode]) -> String {
    path.iter()
        .map(|node| node.name.as_str())
        .collect::<Vec<_>>()
        .join(" > ")
}

fn describe_selection(selection: &HierarchySelection) -> String {
    let parts: Vec<String> = Level::ALL
        .iter()
        .filter_map(|level| selection.get(*level).map(|id| format!("{}={}", level, id)))
        .collect();
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(" ")
    }
}
