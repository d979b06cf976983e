//! Remote call layer for the Evidential Tool Bus.
//!
//! The ETB server speaks XML-RPC over HTTP. Every method takes positional
//! string arguments and answers with a single value:
//!
//! ```text
//! ┌─────────────────┐        HTTP POST /           ┌─────────────────────┐
//! │   EtbSession    │  ◄──────────────────────────►│     ETB server      │
//! │ (RpcTransport)  │     XML-RPC methodCall       │      (etbd)         │
//! └─────────────────┘                              └─────────────────────┘
//! ```
//!
//! File contents are base64 text; query results are JSON text carried in
//! XML-RPC strings (see [`crate::results`]).
//!
//! # Usage
//!
//! ```ignore
//! use etb_client::rpc::{RpcTransport, XmlRpcTransport};
//!
//! let transport = XmlRpcTransport::new("http://localhost:26532".parse()?)?;
//! let qid = transport.call("query", &["in_range(1,4,X)"], None)?;
//! ```

pub mod payload;
mod transport;

pub use transport::{RpcTransport, XmlRpcTransport};
pub use xmlrpc::Value;
