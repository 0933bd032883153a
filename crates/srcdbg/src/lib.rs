#![forbid(unsafe_code)]

//! srcdbg public facade crate.
//!
//! Re-exports the model types of `srcdbg-core` and, with the default
//! `runtime` feature, the controllers of `srcdbg-runtime`, plus a small
//! prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use srcdbg_core::{
    Breakpoint, BreakpointOptions, BreakpointStore, CallSite, CompleteAddOutcome, ConfigError,
    DebuggerConfig, EditorPosition, Location, MarkerStyle, OptionField, Rejection,
    ResolvedCallSite, Source, SourceId, SourceRegistry, Span, Tab, TabStore, resolve,
};

// --- Runtime re-exports ----------------------------------------------------

#[cfg(feature = "runtime")]
pub use srcdbg_runtime::{
    AutocompleteClient, AutocompleteRequest, BreakpointClient, ConditionPanel, Editor, EditorId,
    KeyOutcome, LineTextFn, MarkerId, MarkerReconciler, PanelCommit, PanelKey, ScrollParentId,
    SourceDebugger, ToggleOutcome, WidgetId,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for srcdbg hosts.
#[derive(Debug)]
pub enum Error {
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// An operation was refused.
    Rejected(Rejection),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<Rejection> for Error {
    fn from(reason: Rejection) -> Self {
        Self::Rejected(reason)
    }
}

/// Standard result type for srcdbg APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Load configuration from `path` when given, else from the environment.
#[cfg(feature = "config-file")]
pub fn load_config(path: Option<&std::path::Path>) -> Result<DebuggerConfig> {
    match path {
        Some(path) => Ok(DebuggerConfig::from_toml_file(path)?),
        None => Ok(DebuggerConfig::from_env()),
    }
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BreakpointOptions, CallSite, DebuggerConfig, Error, Location, Rejection, Result, SourceId,
        Span,
    };

    #[cfg(feature = "runtime")]
    pub use crate::{
        AutocompleteClient, BreakpointClient, Editor, KeyOutcome, PanelKey, SourceDebugger,
        ToggleOutcome,
    };

    pub use crate::core;
    #[cfg(feature = "runtime")]
    pub use crate::runtime;
}

pub use srcdbg_core as core;
#[cfg(feature = "runtime")]
pub use srcdbg_runtime as runtime;
