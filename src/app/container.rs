//! Dependency injection container for the solver application.
//!
//! The container owns the environment registry and the table repository and
//! wires them into solve runs.

use std::{path::Path, sync::Arc, time::Duration};

use super::config::SolveConfig;
use crate::{
    Result,
    adapters::MsgPackRepository,
    dictionary::{Table, timed_solve},
    exact::SolverStats,
    mouselab::{MouselabEnv, Registry},
    ports::{TableObserver, TableRepository},
};

/// Owned outcome of [`App::solve`].
#[derive(Debug, Clone)]
pub struct SolveSummary {
    pub env_name: String,
    pub value: f64,
    pub solve_time: Duration,
    pub total_time: Duration,
    pub stats: SolverStats,
    pub table: Option<Table>,
}

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use mouselab::app::{App, SolveConfig};
///
/// let app = App::new()?;
/// let env = app.create_env("high_increasing", &SolveConfig::new())?;
/// assert_eq!(env.n_nodes(), 13);
/// # Ok::<(), mouselab::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use mouselab::app::App;
/// use mouselab::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .build()?;
/// # Ok::<(), mouselab::Error>(())
/// ```
pub struct App {
    registry: Registry,
    table_repository: Arc<dyn TableRepository + Send + Sync>,
}

impl App {
    /// Create an app with the standard registry and `MsgPackRepository`.
    pub fn new() -> Result<Self> {
        AppBuilder::new().build()
    }

    /// Create a builder for constructing an app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Get the table repository.
    pub fn table_repository(&self) -> Arc<dyn TableRepository + Send + Sync> {
        Arc::clone(&self.table_repository)
    }

    /// Build the registered environment `name` with the options `config`
    /// implies.
    pub fn create_env(&self, name: &str, config: &SolveConfig) -> Result<MouselabEnv> {
        MouselabEnv::new_symmetric_registered(name, &self.registry, config.env_options())
    }

    /// Solve the registered environment `name`.
    ///
    /// With `ground_truths` any requested table is restricted to the states
    /// they can reach.
    pub fn solve(
        &self,
        name: &str,
        config: &SolveConfig,
        ground_truths: Option<&[Vec<f64>]>,
        observer: &mut dyn TableObserver,
    ) -> Result<SolveSummary> {
        let env = self.create_env(name, config)?;
        let report = timed_solve(&env, config, ground_truths, observer)?;
        Ok(SolveSummary {
            env_name: name.to_string(),
            value: report.value,
            solve_time: report.solve_time,
            total_time: report.total_time,
            stats: report.stats,
            table: report.table,
        })
    }

    /// Persist `table` through the configured repository.
    pub fn save_table(&self, table: &Table, path: &Path) -> Result<()> {
        self.table_repository.save(table, path)
    }

    /// Load a table through the configured repository.
    pub fn load_table(&self, path: &Path) -> Result<Table> {
        self.table_repository.load(path)
    }
}

/// Builder for constructing an app with custom dependencies.
///
/// ```
/// use mouselab::app::AppBuilder;
/// use mouselab::adapters::InMemoryRepository;
/// use mouselab::mouselab::Registry;
///
/// let app = AppBuilder::new()
///     .with_repository(InMemoryRepository::new())
///     .with_registry(Registry::new())
///     .build()?;
/// assert!(app.registry().is_empty());
/// # Ok::<(), mouselab::Error>(())
/// ```
pub struct AppBuilder {
    registry: Option<Registry>,
    table_repository: Option<Arc<dyn TableRepository + Send + Sync>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            table_repository: None,
        }
    }

    /// Set a custom table repository.
    pub fn with_repository<R: TableRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.table_repository = Some(Arc::new(repo));
        self
    }

    /// Replace the standard registry.
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Build the app, falling back to the standard registry and
    /// `MsgPackRepository`.
    pub fn build(self) -> Result<App> {
        let registry = match self.registry {
            Some(registry) => registry,
            None => Registry::standard()?,
        };
        Ok(App {
            registry,
            table_repository: self
                .table_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
