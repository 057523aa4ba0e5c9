//! GitLab variable custom resource handler
//!
//! Handles CloudFormation lifecycle events for `Custom::GitlabVariable`:
//! reads a value and a GitLab access token from the secrets store and
//! creates, updates or deletes a protected project variable.
//!
//! The physical resource identifier `<server url>#<project id>#<variable name>`
//! ([`VariableRef`]) is the only state kept between invocations, and
//! CloudFormation keeps it.
//!
//! ```ignore
//! let reconciler = Reconciler::new(SecretResolver::new(store), Arc::new(HttpConnector::default()));
//! let outcome = reconciler.handle_event(&event).await?;
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod physical_id;
pub mod properties;
pub mod reconcile;
pub mod response;
pub mod runtime;

pub use config::HandlerConfig;
pub use error::{HandlerError, Result};
pub use event::{CustomResourceEvent, LifecycleEvent, RequestKind};
pub use physical_id::VariableRef;
pub use properties::VariableProperties;
pub use reconcile::{ReconcileOutcome, Reconciler};
pub use response::{CloudFormationResponse, ResponseSender, ResponseStatus};
pub use runtime::HandlerState;
