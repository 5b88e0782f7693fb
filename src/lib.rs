//! One-time Firebase web-client initialization.
//!
//! A process registers itself with Firebase once and shares three handles with
//! the rest of the application: Authentication, the default Firestore database,
//! and the Google sign-in provider.
//!
//! # Examples
//!
//! ```rust,no_run
//! // FIREBASE_API_KEY, FIREBASE_AUTH_DOMAIN, FIREBASE_PROJECT_ID and
//! // FIREBASE_APP_ID come from the environment.
//! let firebase = firebase_bootstrap::firebase().expect("Firebase configuration");
//!
//! match firebase.db() {
//!     Some(db) => println!("using project {}", db.project_id()),
//!     None => println!("Firebase is not used in this context"),
//! }
//! ```
//!
//! Hosts that own their startup sequence (and tests) build the pieces explicitly:
//!
//! ```rust,no_run
//! use firebase_bootstrap::{AppRegistry, ExecutionContext, InitSettings, Initializer, ProcessEnv};
//!
//! let registry = AppRegistry::new();
//! let outcome = Initializer::new(ExecutionContext::InteractiveClient, InitSettings::default())
//!     .run(&ProcessEnv, &registry)
//!     .unwrap();
//! let auth = outcome.auth().unwrap();
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod context;
pub mod core;
pub mod firestore;
pub mod init;

pub use app::{AppError, AppRegistry, FirebaseApp};
pub use auth::{FirebaseAuth, GoogleAuthProvider};
pub use config::{EnvSource, FirebaseOptions, MissingConfigurationError, OptionField, ProcessEnv};
pub use context::ExecutionContext;
pub use firestore::FirebaseFirestore;
pub use init::{
    firebase, FirebaseClient, FirebaseHandles, InitError, InitOutcome, InitPhase, InitSettings, Initializer,
};
