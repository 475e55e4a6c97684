//! Error types for outpost reconciliation.
//!
//! Every error ends up as one or more [`Diagnostic`]s attached to the
//! instance being reconciled; nothing here aborts sibling instances.
//! A record that vanished remotely is not an error at all, see
//! [`crate::drift`].

use crate::model::ProviderKind;
use declarative::{Diagnostic, Diagnostics, StateError};

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reconciling an outpost.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network or HTTP failure, or an envelope that could not be decoded.
    #[error("transport error: {0}")]
    Transport(#[from] gqlkit::Error),

    /// The envelope carried GraphQL errors and the record still exists.
    #[error("remote API error: {}", .messages.join("; "))]
    RemoteApi {
        /// Remote error messages, verbatim and in order.
        messages: Vec<String>,
    },

    /// The local state store rejected a value.
    #[error("local state error: {0}")]
    LocalState(#[from] StateError),

    /// Provider kind and provider config disagree.
    #[error("invalid provider config: {0}")]
    InvalidVariant(String),

    /// Well-formed envelope without the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Build a `RemoteApi` error from envelope errors.
    pub fn remote(errors: &[gqlkit::GraphQlError]) -> Self {
        Self::RemoteApi {
            messages: errors.iter().map(ToString::to_string).collect(),
        }
    }

    /// Field `field` was declared for an outpost of kind `kind`.
    pub fn wrong_field(kind: ProviderKind, field: &str) -> Self {
        match ProviderKind::owning(field) {
            Some(owner) if owner != kind => Self::InvalidVariant(format!(
                "\"{field}\" belongs to {owner} config, but the outpost provider is {kind}"
            )),
            _ => Self::InvalidVariant(format!("\"{field}\" is not a field of {kind} config")),
        }
    }

    /// Convert into diagnostics; remote errors yield one diagnostic each.
    pub fn into_diagnostics(self) -> Diagnostics {
        match self {
            Self::RemoteApi { messages } => messages
                .into_iter()
                .map(|m| Diagnostic::error("Remote API error").with_detail(m))
                .collect(),
            other => Diagnostics::from(Diagnostic::from(other)),
        }
    }
}

impl From<Error> for Diagnostic {
    fn from(err: Error) -> Self {
        match err {
            Error::Transport(e) => {
                let category = e.category();
                Self::error(format!("{category}: {e}")).with_detail(category.advice())
            }
            Error::RemoteApi { messages } => {
                Self::error("Remote API error").with_detail(messages.join("\n"))
            }
            Error::LocalState(e) => e.into(),
            Error::InvalidVariant(message) => {
                Self::error("Invalid provider config").with_detail(message)
            }
            Error::UnexpectedResponse(message) => {
                Self::error("Unexpected response from remote service").with_detail(message)
            }
        }
    }
}
