//! One-time client initialization.
//!
//! [`Initializer::run`] is the whole sequence as a function of an
//! [`ExecutionContext`], a configuration source and a registry:
//!
//! ```text
//! NotStarted -> Skipped                                   (context not initializable)
//! NotStarted -> Loading -> Validating -> Failed           (missing fields)
//!                                     -> Guarding -> Failed   (app construction rejected)
//!                                                 -> Deriving -> Ready
//! ```
//!
//! `Skipped`, `Failed` and `Ready` are terminal. [`FirebaseClient`] pins one
//! terminal result for its lifetime, and [`firebase`] is the process-wide
//! client driven by the process environment.
//!
//! # Examples
//!
//! ```rust
//! use std::collections::HashMap;
//! use firebase_bootstrap::{AppRegistry, ExecutionContext, InitSettings, Initializer};
//!
//! let env: HashMap<&str, &str> = HashMap::new();
//! let registry = AppRegistry::new();
//! let initializer = Initializer::new(ExecutionContext::Server, InitSettings::default());
//!
//! let outcome = initializer.run(&env, &registry).unwrap();
//! assert!(outcome.db().is_none());
//! assert!(outcome.auth().is_none());
//! ```


use crate::app::{AppError, AppRegistry, FirebaseApp};
use crate::auth::{FirebaseAuth, GoogleAuthProvider};
use crate::config::validate::log_diagnostics;
use crate::config::{EnvSource, FirebaseOptions, MissingConfigurationError, OptionField, ProcessEnv, DEFAULT_ENV_PREFIX};
use crate::context::ExecutionContext;
use crate::firestore::FirebaseFirestore;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Environment key that turns on redacted configuration diagnostics.
pub const DIAGNOSTICS_ENV_KEY: &str = "FIREBASE_DIAGNOSTICS";

static PROCESS_CLIENT: OnceLock<FirebaseClient> = OnceLock::new();

#[derive(Error, Debug)]
pub enum InitError {
    /// Required configuration was absent; nothing was constructed.
    #[error(transparent)]
    MissingConfiguration(#[from] MissingConfigurationError),
    /// The configuration was complete but Firebase could not be set up with it.
    #[error("Firebase initialization failed: {0}")]
    Initialization(#[from] AppError),
}

/// Knobs for [`Initializer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitSettings {
    /// Fields that must be present. Checked only when `strict_validation` is set.
    pub required: Vec<OptionField>,
    /// Check `required` before constructing the app. When off, incomplete
    /// configuration is only caught by app construction.
    pub strict_validation: bool,
    /// Log a redacted summary of the loaded configuration.
    pub diagnostics: bool,
    /// Prefix of the configuration keys.
    pub env_prefix: String,
}

impl Default for InitSettings {
    fn default() -> Self {
        Self {
            required: OptionField::REQUIRED.to_vec(),
            strict_validation: true,
            diagnostics: false,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }
}

impl InitSettings {
    /// Defaults, with `diagnostics` enabled when [`DIAGNOSTICS_ENV_KEY`] is `1`, `true` or `yes`.
    pub fn from_source(source: &impl EnvSource) -> Self {
        let diagnostics = source
            .get(DIAGNOSTICS_ENV_KEY)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            diagnostics,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitPhase {
    NotStarted,
    Skipped,
    Loading,
    Validating,
    Guarding,
    Deriving,
    Ready,
    Failed,
}

impl InitPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, InitPhase::Skipped | InitPhase::Ready | InitPhase::Failed)
    }
}

impl fmt::Display for InitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InitPhase::NotStarted => "not_started",
            InitPhase::Skipped => "skipped",
            InitPhase::Loading => "loading",
            InitPhase::Validating => "validating",
            InitPhase::Guarding => "guarding",
            InitPhase::Deriving => "deriving",
            InitPhase::Ready => "ready",
            InitPhase::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The three service handles of an initialized app.
#[derive(Debug, Clone)]
pub struct FirebaseHandles {
    app: Arc<FirebaseApp>,
}

impl FirebaseHandles {
    fn derive(app: Arc<FirebaseApp>) -> Self {
        app.auth();
        app.firestore();
        app.google_provider();
        Self { app }
    }

    pub fn app(&self) -> &Arc<FirebaseApp> {
        &self.app
    }

    pub fn auth(&self) -> &FirebaseAuth {
        self.app.auth()
    }

    pub fn db(&self) -> &FirebaseFirestore {
        self.app.firestore()
    }

    pub fn google_provider(&self) -> &GoogleAuthProvider {
        self.app.google_provider()
    }
}

/// Result of a successful run: either every handle, or none because the
/// context does not initialize Firebase.
#[derive(Debug, Clone)]
pub enum InitOutcome {
    Ready(FirebaseHandles),
    Skipped,
}

impl InitOutcome {
    pub fn handles(&self) -> Option<&FirebaseHandles> {
        match self {
            InitOutcome::Ready(handles) => Some(handles),
            InitOutcome::Skipped => None,
        }
    }

    pub fn app(&self) -> Option<&Arc<FirebaseApp>> {
        self.handles().map(FirebaseHandles::app)
    }

    pub fn auth(&self) -> Option<&FirebaseAuth> {
        self.handles().map(FirebaseHandles::auth)
    }

    pub fn db(&self) -> Option<&FirebaseFirestore> {
        self.handles().map(FirebaseHandles::db)
    }

    pub fn google_provider(&self) -> Option<&GoogleAuthProvider> {
        self.handles().map(FirebaseHandles::google_provider)
    }

    pub fn phase(&self) -> InitPhase {
        match self {
            InitOutcome::Ready(_) => InitPhase::Ready,
            InitOutcome::Skipped => InitPhase::Skipped,
        }
    }
}

/// Runs the initialization sequence for one execution context.
#[derive(Debug, Clone)]
pub struct Initializer {
    context: ExecutionContext,
    settings: InitSettings,
}

impl Initializer {
    pub fn new(context: ExecutionContext, settings: InitSettings) -> Self {
        Self { context, settings }
    }

    pub fn context(&self) -> ExecutionContext {
        self.context
    }

    pub fn settings(&self) -> &InitSettings {
        &self.settings
    }

    pub fn run(&self, source: &impl EnvSource, registry: &AppRegistry) -> Result<InitOutcome, InitError> {
        self.run_observed(source, registry, |_| {})
    }

    /// Like [`run`](Self::run), calling `observe` with every phase entered.
    pub fn run_observed(
        &self,
        source: &impl EnvSource,
        registry: &AppRegistry,
        mut observe: impl FnMut(InitPhase),
    ) -> Result<InitOutcome, InitError> {
        let mut enter = |phase: InitPhase| {
            debug!(%phase, context = %self.context, "Firebase initialization phase");
            observe(phase);
        };

        if !self.context.is_initializable() {
            enter(InitPhase::Skipped);
            return Ok(InitOutcome::Skipped);
        }

        enter(InitPhase::Loading);
        let options = FirebaseOptions::from_source_with_prefix(source, &self.settings.env_prefix);

        if self.settings.strict_validation {
            enter(InitPhase::Validating);
            if self.settings.diagnostics {
                log_diagnostics(&options, &self.settings.required);
            }
            if let Err(e) = options.validate(&self.settings.required) {
                warn!(missing = ?e.names(), "Firebase configuration incomplete");
                enter(InitPhase::Failed);
                return Err(e.into());
            }
            debug!("Firebase configuration validated");
        } else if self.settings.diagnostics {
            log_diagnostics(&options, &self.settings.required);
        }

        enter(InitPhase::Guarding);
        let app = match registry.get_or_create(&options) {
            Ok(app) => app,
            Err(e) => {
                error!(error = %e, "Firebase app construction failed");
                enter(InitPhase::Failed);
                return Err(e.into());
            }
        };

        enter(InitPhase::Deriving);
        let handles = FirebaseHandles::derive(app);

        enter(InitPhase::Ready);
        info!(project_id = handles.app().project_id(), "Firebase client ready");
        Ok(InitOutcome::Ready(handles))
    }
}

/// Holds the single terminal result of an [`Initializer`].
///
/// The first [`initialize`](Self::initialize) runs the sequence; every later call,
/// from any thread, returns the same result without re-reading configuration.
#[derive(Debug)]
pub struct FirebaseClient {
    initializer: Initializer,
    phase: Mutex<InitPhase>,
    result: OnceLock<Result<InitOutcome, InitError>>,
}

impl FirebaseClient {
    pub fn new(initializer: Initializer) -> Self {
        Self {
            initializer,
            phase: Mutex::new(InitPhase::NotStarted),
            result: OnceLock::new(),
        }
    }

    pub fn initialize(&self, source: &impl EnvSource, registry: &AppRegistry) -> Result<&InitOutcome, &InitError> {
        self.result
            .get_or_init(|| {
                self.initializer
                    .run_observed(source, registry, |phase| self.set_phase(phase))
            })
            .as_ref()
    }

    /// The terminal result, or `None` before [`initialize`](Self::initialize) finished.
    pub fn outcome(&self) -> Option<Result<&InitOutcome, &InitError>> {
        self.result.get().map(Result::as_ref)
    }

    pub fn phase(&self) -> InitPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: InitPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }
}

/// The process-wide Firebase client.
///
/// On first call the execution context and settings are read from the process
/// environment, and the app is registered in [`AppRegistry::global`]. The result
/// is fixed from then on: a failed process must be restarted to retry.
pub fn firebase() -> Result<&'static InitOutcome, &'static InitError> {
    let client = PROCESS_CLIENT.get_or_init(|| {
        let context = ExecutionContext::from_source(&ProcessEnv);
        FirebaseClient::new(Initializer::new(context, InitSettings::from_source(&ProcessEnv)))
    });
    client.initialize(&ProcessEnv, AppRegistry::global())
}
