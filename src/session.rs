//! Session facade over an ETB server.
//!
//! [`EtbSession`] owns a transport and maps each client operation onto one
//! remote method, adding the base64 step for files and the result decoding
//! for answers and claims. Every call is synchronous; a failed call returns
//! immediately and nothing is retried.
//!
//! ```ignore
//! use etb_client::{EtbConfig, EtbSession};
//! use std::time::Duration;
//!
//! let session = EtbSession::connect(&EtbConfig::from_env()?)?;
//! let fileref = session.upload_file("tests/short.sal", "sal.in")?;
//! let qid = session.submit_query("in_range(1,4,X)")?;
//! session.wait_query(&qid, Some(Duration::from_secs(60)))?;
//! for answer in &session.get_answers(&qid)? {
//!     for binding in answer {
//!         println!("{}: {}", binding.name(), binding.value());
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use walkdir::WalkDir;

use crate::config::{EtbConfig, DEFAULT_CALL_TIMEOUT_SECS};
use crate::error::{EtbError, Result};
use crate::models::{FileRef, QueryId};
use crate::results::{AnswerSet, ClaimSet};
use crate::rpc::payload::{self, decode_file, encode_file};
use crate::rpc::{RpcTransport, Value, XmlRpcTransport};

/// Directories never sent by [`EtbSession::upload_dir`].
const SKIPPED_DIRS: &[&str] = &[".git"];

/// A client session bound to one ETB server.
///
/// The session holds nothing but its transport and call timeout, so it can
/// be shared by reference; callers that use one session from several
/// threads must serialise access themselves.
pub struct EtbSession<T: RpcTransport = XmlRpcTransport> {
    transport: T,
    call_timeout: Duration,
}

impl EtbSession<XmlRpcTransport> {
    /// Open a session to the configured server and check that it answers.
    ///
    /// # Errors
    ///
    /// Returns `EtbError::Config` for an unusable address and
    /// `EtbError::Transport` if the server does not respond to `test`.
    pub fn connect(config: &EtbConfig) -> Result<Self> {
        let url = config.url()?;
        tracing::info!("Connecting to ETB at {}", url);
        let session =
            Self::new(XmlRpcTransport::new(url)?).with_call_timeout(config.call_timeout);
        session.ping()?;
        Ok(session)
    }
}

impl<T: RpcTransport> EtbSession<T> {
    /// Wrap an existing transport without contacting the server.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            call_timeout: Duration::from_secs(DEFAULT_CALL_TIMEOUT_SECS),
        }
    }

    /// Set the timeout used for every call except `query_wait`.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn call(&self, method: &'static str, args: &[&str]) -> Result<Value> {
        Ok(self.transport.call(method, args, Some(self.call_timeout))?)
    }

    fn call_string(&self, method: &'static str, args: &[&str]) -> Result<String> {
        Ok(payload::expect_string(method, self.call(method, args)?)?)
    }

    fn call_json(&self, method: &'static str, args: &[&str]) -> Result<String> {
        Ok(payload::expect_json_text(method, self.call(method, args)?)?)
    }

    /// Check that the server is alive.
    pub fn ping(&self) -> Result<()> {
        self.call("test", &[])?;
        Ok(())
    }

    // =========================================================================
    // Files
    // =========================================================================

    /// Upload in-memory content as `remote_name`.
    pub fn upload_bytes(&self, content: &[u8], remote_name: &str) -> Result<FileRef> {
        let encoded = encode_file(content);
        let fileref = self.call_string("put_file", &[&encoded, remote_name])?;
        tracing::info!("Uploaded {} bytes as {}", content.len(), remote_name);
        Ok(FileRef::new(fileref))
    }

    /// Read a local file and upload it as `remote_name`.
    pub fn upload_file(&self, local_path: impl AsRef<Path>, remote_name: &str) -> Result<FileRef> {
        let local_path = local_path.as_ref();
        let content =
            std::fs::read(local_path).map_err(|e| EtbError::local_io(local_path, e))?;
        self.upload_bytes(&content, remote_name)
    }

    /// Upload every file under `local_dir`, recursively.
    ///
    /// Each file is stored remotely as `remote_dir/<relative path>`. `.git`
    /// directories are skipped. The returned map is keyed by path relative
    /// to `local_dir`. The first failure aborts the upload; files already
    /// sent stay on the server.
    pub fn upload_dir(
        &self,
        local_dir: impl AsRef<Path>,
        remote_dir: &str,
    ) -> Result<BTreeMap<PathBuf, FileRef>> {
        let local_dir = local_dir.as_ref();
        let mut refs = BTreeMap::new();

        let walker = WalkDir::new(local_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                !(entry.file_type().is_dir()
                    && SKIPPED_DIRS.iter().any(|skip| entry.file_name() == *skip))
            });

        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(local_dir).to_path_buf();
                EtbError::local_io(path, e.into())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(local_dir)
                .unwrap_or(entry.path())
                .to_path_buf();
            let remote_name = remote_path(remote_dir, &relative);
            let fileref = self.upload_file(entry.path(), &remote_name)?;
            refs.insert(relative, fileref);
        }

        tracing::info!("Uploaded {} files from {}", refs.len(), local_dir.display());
        Ok(refs)
    }

    /// Download a file's content into memory.
    pub fn download_bytes(&self, fileref: &FileRef) -> Result<Vec<u8>> {
        let encoded = self.call_string("get_file", &[fileref.as_str()])?;
        Ok(decode_file(&encoded)?)
    }

    /// Download a file and write it to `local_path`, replacing any existing
    /// file. Missing parent directories are created.
    pub fn download_file(&self, fileref: &FileRef, local_path: impl AsRef<Path>) -> Result<()> {
        let local_path = local_path.as_ref();
        let content = self.download_bytes(fileref)?;

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EtbError::local_io(parent, e))?;
        }
        std::fs::write(local_path, &content).map_err(|e| EtbError::local_io(local_path, e))?;

        tracing::info!("Downloaded {} bytes to {}", content.len(), local_path.display());
        Ok(())
    }

    /// Handle to the current version of a file in the server's working tree.
    pub fn file_handle(&self, remote_path: &str) -> Result<FileRef> {
        Ok(FileRef::new(
            self.call_string("get_filehandle", &[remote_path])?,
        ))
    }

    /// Download the working-tree version of `remote_path`.
    ///
    /// Resolves the path with [`EtbSession::file_handle`] and then fetches
    /// it like [`EtbSession::download_file`].
    pub fn download_path(
        &self,
        remote_path: &str,
        local_path: impl AsRef<Path>,
    ) -> Result<FileRef> {
        let handle = self.file_handle(remote_path)?;
        self.download_file(&handle, local_path)?;
        Ok(handle)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Submit a query and return its id. The query runs on the server.
    pub fn submit_query(&self, query: &str) -> Result<QueryId> {
        let qid = QueryId::new(self.call_string("query", &[query])?);
        tracing::info!("Submitted query {}: {}", qid, query);
        Ok(qid)
    }

    /// Whether the server has finished the query.
    ///
    /// `Ok(false)` means still running; it is not an error.
    pub fn is_query_done(&self, qid: &QueryId) -> Result<bool> {
        Ok(payload::expect_bool(
            "query_done",
            self.call("query_done", &[qid.as_str()])?,
        )?)
    }

    /// Block until the server reports the query complete.
    ///
    /// With `timeout` set, gives up with `TransportFault::Timeout` once it
    /// elapses; with `None` the wait is bounded only by the server.
    pub fn wait_query(&self, qid: &QueryId, timeout: Option<Duration>) -> Result<()> {
        tracing::debug!("Waiting for query {} (timeout {:?})", qid, timeout);
        self.transport
            .call("query_wait", &[qid.as_str()], timeout)?;
        Ok(())
    }

    /// Poll `query_done` every `interval` until it reports completion.
    ///
    /// Returns `Ok(false)` if `deadline` passes first. Unlike
    /// [`EtbSession::wait_query`] no single request stays open for long.
    pub fn poll_until_done(
        &self,
        qid: &QueryId,
        interval: Duration,
        deadline: Duration,
    ) -> Result<bool> {
        let started = Instant::now();
        loop {
            if self.is_query_done(qid)? {
                return Ok(true);
            }
            if started.elapsed().saturating_add(interval) > deadline {
                tracing::debug!("Query {} not done after {:?}", qid, started.elapsed());
                return Ok(false);
            }
            std::thread::sleep(interval);
        }
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Current answers (substitutions) of the query.
    pub fn get_answers(&self, qid: &QueryId) -> Result<AnswerSet> {
        let reply = self.call_json("query_answers", &[qid.as_str()])?;
        Ok(AnswerSet::decode(&reply)?)
    }

    /// Claims matching the query's goals.
    pub fn get_claims(&self, qid: &QueryId) -> Result<ClaimSet> {
        let reply = self.call_json("query_claims", &[qid.as_str()])?;
        Ok(ClaimSet::decode(&reply)?)
    }

    /// All claims produced while answering the query.
    pub fn get_all_claims(&self, qid: &QueryId) -> Result<ClaimSet> {
        let reply = self.call_json("query_all_claims", &[qid.as_str()])?;
        Ok(ClaimSet::decode(&reply)?)
    }

    /// Every claim the server holds, across all queries.
    pub fn all_claims(&self) -> Result<ClaimSet> {
        let reply = self.call_json("all_claims", &[])?;
        Ok(ClaimSet::decode(&reply)?)
    }

    /// Submit, wait for completion, and fetch the answers.
    pub fn run_query(
        &self,
        query: &str,
        timeout: Option<Duration>,
    ) -> Result<(QueryId, AnswerSet)> {
        let qid = self.submit_query(query)?;
        self.wait_query(&qid, timeout)?;
        let answers = self.get_answers(&qid)?;
        Ok((qid, answers))
    }
}

impl<T: RpcTransport> Drop for EtbSession<T> {
    fn drop(&mut self) {
        tracing::debug!("ETB session closed");
    }
}

/// Remote name of an uploaded file: `remote_dir/relative` with `/`
/// separators regardless of platform.
fn remote_path(remote_dir: &str, relative: &Path) -> String {
    let mut parts: Vec<String> = remote_dir
        .split('/')
        .filter(|p| !p.is_empty() && *p != ".")
        .map(str::to_string)
        .collect();
    parts.extend(
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DecodeError, TransportFault};
    use pretty_assertions::assert_eq;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// A recorded call: method, arguments, timeout.
    type Call = (String, Vec<String>, Option<Duration>);

    /// Mock transport with scripted replies.
    ///
    /// Replies are queued per method; a call with nothing queued is a
    /// fault so tests notice unexpected traffic.
    #[derive(Default)]
    struct MockTransport {
        calls: Mutex<Vec<Call>>,
        replies: Mutex<HashMap<String, VecDeque<std::result::Result<Value, TransportFault>>>>,
    }

    impl MockTransport {
        fn reply(self, method: &str, value: Value) -> Self {
            self.push(method, Ok(value))
        }

        fn fail(self, method: &str, fault: TransportFault) -> Self {
            self.push(method, Err(fault))
        }

        fn push(self, method: &str, reply: std::result::Result<Value, TransportFault>) -> Self {
            self.replies
                .lock()
                .unwrap()
                .entry(method.to_string())
                .or_default()
                .push_back(reply);
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn methods(&self) -> Vec<String> {
            self.calls().into_iter().map(|(m, _, _)| m).collect()
        }
    }

    impl RpcTransport for MockTransport {
        fn call(
            &self,
            method: &str,
            args: &[&str],
            timeout: Option<Duration>,
        ) -> std::result::Result<Value, TransportFault> {
            self.calls.lock().unwrap().push((
                method.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
                timeout,
            ));
            self.replies
                .lock()
                .unwrap()
                .get_mut(method)
                .and_then(|queue| queue.pop_front())
                .unwrap_or_else(|| {
                    Err(TransportFault::Fault {
                        code: -1,
                        message: format!("no scripted reply for {}", method),
                    })
                })
        }
    }

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn session(transport: MockTransport) -> EtbSession<MockTransport> {
        EtbSession::new(transport)
    }

    #[test]
    fn test_submit_query_returns_id() {
        let etb = session(MockTransport::default().reply("query", string("q-1")));
        let qid = etb.submit_query("in_range(1,4,X)").unwrap();

        assert_eq!(qid.as_str(), "q-1");
        assert_eq!(
            etb.transport().calls(),
            vec![(
                "query".to_string(),
                vec!["in_range(1,4,X)".to_string()],
                Some(Duration::from_secs(30))
            )]
        );
    }

    #[test]
    fn test_query_done_false_is_not_an_error() {
        let etb = session(
            MockTransport::default()
                .reply("query_done", Value::Bool(false))
                .reply("query_done", Value::Bool(true)),
        );
        let qid = QueryId::new("q-1");

        assert!(!etb.is_query_done(&qid).unwrap());
        assert!(etb.is_query_done(&qid).unwrap());
    }

    #[test]
    fn test_query_done_wrong_type_is_decode_error() {
        let etb = session(MockTransport::default().reply("query_done", string("maybe")));
        let err = etb.is_query_done(&QueryId::new("q-1")).unwrap_err();
        assert!(matches!(
            err,
            EtbError::Decode(DecodeError::UnexpectedReply { method: "query_done", .. })
        ));
    }

    #[test]
    fn test_wait_query_passes_caller_timeout() {
        let etb = session(
            MockTransport::default()
                .reply("query_wait", Value::Bool(true))
                .reply("query_wait", Value::Bool(true)),
        )
        .with_call_timeout(Duration::from_secs(5));
        let qid = QueryId::new("q-1");

        etb.wait_query(&qid, None).unwrap();
        etb.wait_query(&qid, Some(Duration::from_secs(90))).unwrap();

        let timeouts: Vec<Option<Duration>> =
            etb.transport().calls().into_iter().map(|(_, _, t)| t).collect();
        assert_eq!(timeouts, vec![None, Some(Duration::from_secs(90))]);
    }

    #[test]
    fn test_wait_query_timeout_surfaces() {
        let etb = session(
            MockTransport::default()
                .fail("query_wait", TransportFault::Timeout(Duration::from_secs(1))),
        );
        let err = etb
            .wait_query(&QueryId::new("q-1"), Some(Duration::from_secs(1)))
            .unwrap_err();
        assert!(matches!(err, EtbError::Transport(TransportFault::Timeout(_))));
    }

    #[test]
    fn test_get_answers_decodes_double_encoding() {
        let reply = r#"["{\"__Subst\":[[{\"__Var\":\"X\"},1]]}"]"#;
        let etb = session(MockTransport::default().reply("query_answers", string(reply)));

        let answers = etb.get_answers(&QueryId::new("q-1")).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].get("X"), Some("1"));
    }

    #[test]
    fn test_get_answers_blank_reply_is_empty() {
        let etb = session(MockTransport::default().reply("query_answers", string("")));
        assert!(etb.get_answers(&QueryId::new("q-1")).unwrap().is_empty());
    }

    #[test]
    fn test_get_answers_malformed_is_decode_error() {
        let etb = session(
            MockTransport::default().reply("query_answers", string(r#"["{\"x\":1}"]"#)),
        );
        let err = etb.get_answers(&QueryId::new("q-1")).unwrap_err();
        assert!(matches!(
            err,
            EtbError::Decode(DecodeError::Substitution { index: 0, .. })
        ));
    }

    #[test]
    fn test_claims_and_all_claims_use_their_methods() {
        let etb = session(
            MockTransport::default()
                .reply("query_claims", string(r#"["p(a)","q(b)"]"#))
                .reply("query_all_claims", Value::Array(vec![])),
        );
        let qid = QueryId::new("q-1");

        let claims = etb.get_claims(&qid).unwrap();
        assert_eq!(
            claims.iter().cloned().collect::<Vec<_>>(),
            vec!["p(a)".to_string(), "q(b)".to_string()]
        );
        assert!(etb.get_all_claims(&qid).unwrap().is_empty());
        assert_eq!(
            etb.transport().methods(),
            vec!["query_claims".to_string(), "query_all_claims".to_string()]
        );
    }

    #[test]
    fn test_all_claims_takes_no_arguments() {
        let etb = session(
            MockTransport::default()
                .reply("all_claims", string(r#"["in_range(1,4,1)","p(a)"]"#)),
        );

        let claims = etb.all_claims().unwrap();
        assert_eq!(
            claims.as_slice().to_vec(),
            vec!["in_range(1,4,1)".to_string(), "p(a)".to_string()]
        );
        assert_eq!(
            etb.transport().calls(),
            vec![("all_claims".to_string(), vec![], Some(Duration::from_secs(30)))]
        );
    }

    #[test]
    fn test_fault_short_circuits_run_query() {
        let etb = session(
            MockTransport::default()
                .reply("query", string("q-1"))
                .fail(
                    "query_wait",
                    TransportFault::Fault {
                        code: 1,
                        message: "Query id q-1 not known".to_string(),
                    },
                ),
        );

        let err = etb.run_query("p(X)", None).unwrap_err();
        assert_eq!(err.fault(), Some((1, "Query id q-1 not known")));
        // No answers were requested after the fault.
        assert_eq!(
            etb.transport().methods(),
            vec!["query".to_string(), "query_wait".to_string()]
        );
    }

    #[test]
    fn test_run_query_composes_calls() {
        let etb = session(
            MockTransport::default()
                .reply("query", string("q-7"))
                .reply("query_wait", Value::Bool(true))
                .reply(
                    "query_answers",
                    string(r#"["{\"__Subst\":[[{\"__Var\":\"Y\"},\"b\"]]}"]"#),
                ),
        );

        let (qid, answers) = etb.run_query("p(Y)", Some(Duration::from_secs(10))).unwrap();
        assert_eq!(qid, QueryId::new("q-7"));
        assert_eq!(answers[0].get("Y"), Some(r#""b""#));
    }

    #[test]
    fn test_poll_until_done_stops_when_done() {
        let etb = session(
            MockTransport::default()
                .reply("query_done", Value::Bool(false))
                .reply("query_done", Value::Bool(false))
                .reply("query_done", Value::Bool(true)),
        );
        let done = etb
            .poll_until_done(
                &QueryId::new("q-1"),
                Duration::from_millis(1),
                Duration::from_secs(5),
            )
            .unwrap();
        assert!(done);
        assert_eq!(etb.transport().calls().len(), 3);
    }

    #[test]
    fn test_poll_until_done_gives_up_at_deadline() {
        let etb = session(MockTransport::default().reply("query_done", Value::Bool(false)));
        let done = etb
            .poll_until_done(
                &QueryId::new("q-1"),
                Duration::from_millis(50),
                Duration::from_millis(10),
            )
            .unwrap();
        assert!(!done);
        assert_eq!(etb.transport().calls().len(), 1);
    }

    #[test]
    fn test_poll_until_done_with_huge_interval_polls_once() {
        let etb = session(MockTransport::default().reply("query_done", Value::Bool(false)));
        let done = etb
            .poll_until_done(&QueryId::new("q-1"), Duration::MAX, Duration::from_secs(1))
            .unwrap();
        assert!(!done);
        assert_eq!(etb.transport().calls().len(), 1);
    }

    #[test]
    fn test_upload_file_sends_base64() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("short.sal");
        std::fs::write(&src, b"abc\x00def").unwrap();

        let etb = session(
            MockTransport::default().reply("put_file", string(r#"{"file":"sal.in"}"#)),
        );
        let fileref = etb.upload_file(&src, "sal.in").unwrap();

        assert_eq!(fileref.as_str(), r#"{"file":"sal.in"}"#);
        let (method, args, _) = etb.transport().calls().remove(0);
        assert_eq!(method, "put_file");
        assert_eq!(args, vec![encode_file(b"abc\x00def"), "sal.in".to_string()]);
    }

    #[test]
    fn test_upload_missing_file_is_local_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let etb = session(MockTransport::default());

        let err = etb
            .upload_file(dir.path().join("missing.sal"), "sal.in")
            .unwrap_err();
        assert!(matches!(err, EtbError::LocalIo { .. }));
        assert!(etb.transport().calls().is_empty());
    }

    #[test]
    fn test_download_file_writes_decoded_bytes() {
        let content = b"\x00\x01binary\x00tail".to_vec();
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("out").join("back.sal");
        std::fs::create_dir_all(dst.parent().unwrap()).unwrap();
        std::fs::write(&dst, b"old content that is longer than the new one").unwrap();

        let etb = session(
            MockTransport::default().reply("get_file", string(&encode_file(&content))),
        );
        etb.download_file(&FileRef::new("ref"), &dst).unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), content);
    }

    #[test]
    fn test_download_path_resolves_handle_first() {
        let handle = r#"{"file":"out/a.sal","sha1":"00"}"#;
        let etb = session(
            MockTransport::default()
                .reply("get_filehandle", string(handle))
                .reply("get_file", string("aGVsbG8=")),
        );
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("a.sal");

        let fileref = etb.download_path("out/a.sal", &dst).unwrap();
        assert_eq!(fileref.as_str(), handle);
        assert_eq!(std::fs::read(&dst).unwrap(), b"hello");
        let calls = etb.transport().calls();
        assert_eq!(calls[0].1, vec!["out/a.sal".to_string()]);
        assert_eq!(calls[1].1, vec![handle.to_string()]);
    }

    #[test]
    fn test_download_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("a").join("b").join("c.txt");

        let etb = session(MockTransport::default().reply("get_file", string("aGk=")));
        etb.download_file(&FileRef::new("ref"), &dst).unwrap();

        assert_eq!(std::fs::read(&dst).unwrap(), b"hi");
    }

    #[test]
    fn test_download_fault_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("never.txt");

        let etb = session(MockTransport::default().fail(
            "get_file",
            TransportFault::Connection("refused".to_string()),
        ));
        let err = etb.download_file(&FileRef::new("ref"), &dst).unwrap_err();

        assert!(matches!(err, EtbError::Transport(TransportFault::Connection(_))));
        assert!(!dst.exists());
    }

    #[test]
    fn test_upload_dir_skips_git_and_keys_by_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("sub")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("a.sal"), b"a").unwrap();
        std::fs::write(root.join("sub").join("b.sal"), b"b").unwrap();
        std::fs::write(root.join(".git").join("HEAD"), b"ref").unwrap();

        let etb = session(
            MockTransport::default()
                .reply("put_file", string("ref-a"))
                .reply("put_file", string("ref-b")),
        );
        let refs = etb.upload_dir(root, "proj/").unwrap();

        assert_eq!(refs.len(), 2);
        assert_eq!(refs[Path::new("a.sal")], FileRef::new("ref-a"));
        assert_eq!(refs[&Path::new("sub").join("b.sal")], FileRef::new("ref-b"));

        let remote_names: Vec<String> = etb
            .transport()
            .calls()
            .into_iter()
            .map(|(_, args, _)| args[1].clone())
            .collect();
        assert_eq!(
            remote_names,
            vec!["proj/a.sal".to_string(), "proj/sub/b.sal".to_string()]
        );
    }

    #[test]
    fn test_remote_path_joins_with_slashes() {
        assert_eq!(remote_path("", Path::new("a.sal")), "a.sal");
        assert_eq!(remote_path("./out/", Path::new("a.sal")), "out/a.sal");
        assert_eq!(
            remote_path("x/y", &Path::new("sub").join("b.sal")),
            "x/y/sub/b.sal"
        );
    }

    #[test]
    fn test_file_handle_and_ping() {
        let etb = session(
            MockTransport::default()
                .reply("test", Value::Bool(true))
                .reply("get_filehandle", string(r#"{"file":"a.sal","sha1":"00"}"#)),
        );
        etb.ping().unwrap();
        let handle = etb.file_handle("a.sal").unwrap();
        assert_eq!(handle.as_str(), r#"{"file":"a.sal","sha1":"00"}"#);
    }
}
