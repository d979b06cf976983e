//! XML-RPC over HTTP transport for the ETB server.
//!
//! This module provides the [`RpcTransport`] seam the session talks through,
//! and [`XmlRpcTransport`], the production implementation that POSTs
//! `xmlrpc`-encoded requests with a blocking `reqwest` client.

use std::io::Cursor;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use url::Url;
use xmlrpc::{Request, Transport, Value};

use crate::error::{EtbError, TransportFault};

/// User agent sent with every request.
const USER_AGENT: &str = concat!("etb-client/", env!("CARGO_PKG_VERSION"));

/// A synchronous remote procedure call.
///
/// Implementations send `method` with positional string arguments and
/// return the reply value, or a [`TransportFault`] when the call fails or
/// the server answers with a fault. `timeout` of `None` waits indefinitely.
///
/// The session is written against this trait so it can be driven by a mock
/// in tests.
pub trait RpcTransport {
    fn call(
        &self,
        method: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<Value, TransportFault>;
}

impl<T: RpcTransport + ?Sized> RpcTransport for Box<T> {
    fn call(
        &self,
        method: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<Value, TransportFault> {
        (**self).call(method, args, timeout)
    }
}

/// Hands an already-received HTTP body to `xmlrpc` for parsing.
///
/// The HTTP exchange happens in [`XmlRpcTransport::call`] so that timeouts
/// and connection failures can be classified before `xmlrpc` wraps them.
struct ReceivedBody(Vec<u8>);

impl Transport for ReceivedBody {
    type Stream = Cursor<Vec<u8>>;

    fn transmit(
        self,
        _request: &Request<'_>,
    ) -> Result<Self::Stream, Box<dyn std::error::Error + Send + Sync>> {
        Ok(Cursor::new(self.0))
    }
}

/// XML-RPC client bound to one ETB endpoint.
///
/// The underlying HTTP client has no global timeout; each call carries its
/// own, so `query_wait` can block for as long as the caller allows while
/// ordinary calls stay bounded.
#[derive(Debug, Clone)]
pub struct XmlRpcTransport {
    url: Url,
    http: Client,
}

impl XmlRpcTransport {
    /// Create a transport for the given endpoint.
    ///
    /// No connection is made until the first call.
    pub fn new(url: Url) -> Result<Self, EtbError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| EtbError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Send the encoded request and return the raw response body.
    fn exchange(&self, body: Vec<u8>, timeout: Option<Duration>) -> Result<Vec<u8>, TransportFault> {
        let mut request = self
            .http
            .post(self.url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(body);
        if let Some(limit) = timeout {
            request = request.timeout(limit);
        }

        let classify = |e: reqwest::Error| match timeout {
            Some(limit) if e.is_timeout() => TransportFault::Timeout(limit),
            _ => TransportFault::Connection(e.to_string()),
        };

        let response = request.send().map_err(classify)?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportFault::Connection(format!(
                "HTTP {} from {}",
                status, self.url
            )));
        }

        response
            .bytes()
            .map(|bytes| bytes.to_vec())
            .map_err(classify)
    }
}

impl RpcTransport for XmlRpcTransport {
    fn call(
        &self,
        method: &str,
        args: &[&str],
        timeout: Option<Duration>,
    ) -> Result<Value, TransportFault> {
        let request = args
            .iter()
            .fold(Request::new(method), |request, arg| request.arg(*arg));

        let mut body = Vec::new();
        request
            .write_as_xml(&mut body)
            .map_err(|e| TransportFault::Protocol(format!("Failed to encode request: {}", e)))?;

        tracing::debug!(method, args = args.len(), bytes = body.len(), "ETB call");
        let reply = self.exchange(body, timeout)?;

        request.call(ReceivedBody(reply)).map_err(|e| match e.fault() {
            Some(fault) => {
                tracing::warn!(method, code = fault.fault_code, "ETB fault: {}", fault.fault_string);
                TransportFault::Fault {
                    code: fault.fault_code,
                    message: fault.fault_string.clone(),
                }
            }
            None => TransportFault::Protocol(format!("Failed to parse {} reply: {}", method, e)),
        })
    }
}
