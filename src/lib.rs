//! Evidential Tool Bus client library.
//!
//! This library talks to an ETB server over XML-RPC:
//!
//! - `session` - [`EtbSession`], the facade for files, queries and results
//! - `results` - decoding of answer substitutions and claims
//! - `rpc` - the XML-RPC transport and reply payload helpers
//! - `config` - server address and timeouts
//! - `models` - opaque server handles (`FileRef`, `QueryId`)
//! - `error` - error types
//!
//! # Example
//!
//! ```ignore
//! use etb_client::{EtbConfig, EtbSession};
//!
//! let session = EtbSession::connect(&EtbConfig::from_env()?)?;
//! let (qid, answers) = session.run_query("in_range(1,4,X)", None)?;
//! for answer in &answers {
//!     println!("X = {}", answer.get("X").unwrap_or("?"));
//! }
//! let claims = session.get_claims(&qid)?;
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod results;
pub mod rpc;
pub mod session;

pub use config::EtbConfig;
pub use error::{DecodeError, EtbError, TransportFault};
pub use models::{FileRef, QueryId};
pub use results::{Answer, AnswerSet, Binding, ClaimSet};
pub use session::EtbSession;
