use super::{AppError, FirebaseApp};
use crate::config::FirebaseOptions;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

static GLOBAL_REGISTRY: AppRegistry = AppRegistry::new();

/// Holds the one [`FirebaseApp`] of a process (or of a test).
///
/// The first successful [`get_or_create`](Self::get_or_create) wins. Later calls
/// return that app and ignore the options they were given: no comparison, no
/// update and no error, so re-running initialization code is always safe.
#[derive(Debug, Default)]
pub struct AppRegistry {
    slot: Mutex<Option<Arc<FirebaseApp>>>,
}

impl AppRegistry {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// The registry shared by the whole process.
    pub fn global() -> &'static AppRegistry {
        &GLOBAL_REGISTRY
    }

    /// Returns the registered app, creating it from `options` if there is none.
    ///
    /// The check and the creation happen under one lock, so concurrent callers
    /// observe a single construction. A failed construction leaves the registry
    /// empty.
    pub fn get_or_create(&self, options: &FirebaseOptions) -> Result<Arc<FirebaseApp>, AppError> {
        let mut slot = self.lock();

        if let Some(app) = slot.as_ref() {
            debug!(app = app.name(), "Firebase app already registered; supplied options ignored");
            return Ok(Arc::clone(app));
        }

        let app = Arc::new(FirebaseApp::new(options.clone())?);
        info!(app = app.name(), project_id = app.project_id(), "Firebase app created");
        *slot = Some(Arc::clone(&app));
        Ok(app)
    }

    /// The registered app, if any.
    pub fn get(&self) -> Option<Arc<FirebaseApp>> {
        self.lock().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    // The slot is only ever replaced wholesale, so a poisoned lock still holds a
    // consistent value.
    fn lock(&self) -> MutexGuard<'_, Option<Arc<FirebaseApp>>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
