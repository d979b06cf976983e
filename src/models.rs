//! Opaque server handles.
//!
//! The ETB server hands out string tokens for uploaded files and submitted
//! queries. The client never looks inside them; it only passes them back.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Server-assigned reference to an uploaded file.
///
/// The ETB server returns a JSON-encoded `{"file": .., "sha1": ..}` handle,
/// but the token is treated as opaque and sent back verbatim to `get_file`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(String);

/// Server-assigned identifier of a submitted query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryId(String);

macro_rules! opaque_token {
    ($name:ident) => {
        impl $name {
            /// Wrap a token received from the server or from the user.
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(token: String) -> Self {
                Self(token)
            }
        }

        impl From<&str> for $name {
            fn from(token: &str) -> Self {
                Self(token.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

opaque_token!(FileRef);
opaque_token!(QueryId);
