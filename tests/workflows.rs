//! Workflow tests against in-memory backends.
//!
//! These drive the ask, search, upload and retrieval workflows through a
//! `Session` and check what ends up in the view state.

use aide_client::error::ApiError;
use aide_client::models::{
    AskResponse, FetchedDocument, SearchResult, UploadFile, UploadReceipt,
};
use aide_client::query::{ASK_ERROR, SEARCH_ERROR};
use aide_client::retrieve::DOWNLOAD_ERROR;
use aide_client::session::Session;
use aide_client::render::query_status;
use aide_client::state::{Notice, Outcome, QueryKind};
use aide_client::traits::{Backend, DownloadSink};
use aide_client::upload::{UPLOAD_ERROR, UPLOAD_PROMPT};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

// ─── Test Backend ───────────────────────────────────────────────────

fn boom() -> ApiError {
    ApiError::Status {
        status: 500,
        message: "boom".to_string(),
    }
}

/// Canned responses; `None` means the call fails.
#[derive(Default)]
struct MockBackend {
    answer: Option<String>,
    results: Option<Vec<SearchResult>>,
    receipt: Option<Option<UploadReceipt>>,
    document: Option<FetchedDocument>,
    /// Fail every call regardless of canned responses.
    down: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MockBackend {
    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.down.load(Ordering::SeqCst) {
            return Err(boom());
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn ask(&self, question: &str, project: &str) -> Result<AskResponse, ApiError> {
        self.record(format!("ask:{}:{}", question, project))?;
        match &self.answer {
            Some(answer) => Ok(AskResponse {
                answer: answer.clone(),
            }),
            None => Err(boom()),
        }
    }

    async fn search(&self, query: &str, project: &str) -> Result<Vec<SearchResult>, ApiError> {
        self.record(format!("search:{}:{}", query, project))?;
        self.results.clone().ok_or_else(boom)
    }

    async fn upload(
        &self,
        file: &UploadFile,
        project: &str,
    ) -> Result<Option<UploadReceipt>, ApiError> {
        self.record(format!("upload:{}:{}", file.name, project))?;
        self.receipt.clone().ok_or_else(boom)
    }

    async fn fetch_document(&self, document_id: i64) -> Result<FetchedDocument, ApiError> {
        self.record(format!("fetch:{}", document_id))?;
        self.document.clone().ok_or_else(boom)
    }
}

/// Records saves instead of touching the filesystem.
#[derive(Default)]
struct RecordingSink {
    saved: Mutex<Vec<(String, Vec<u8>)>>,
    fail: bool,
}

impl RecordingSink {
    fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn save(&self, bytes: &[u8], file_name: &str) -> anyhow::Result<PathBuf> {
        if self.fail {
            anyhow::bail!("disk full");
        }
        self.saved
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/downloads").join(file_name))
    }
}

/// Each `ask` waits for the next queued reply, so tests control completion order.
struct GatedBackend {
    replies: Mutex<VecDeque<oneshot::Receiver<Result<String, ApiError>>>>,
}

#[async_trait]
impl Backend for GatedBackend {
    async fn ask(&self, _question: &str, _project: &str) -> Result<AskResponse, ApiError> {
        let rx = self.replies.lock().unwrap().pop_front().expect("unexpected ask");
        let answer = rx.await.expect("reply sender dropped")?;
        Ok(AskResponse { answer })
    }

    async fn search(&self, _: &str, _: &str) -> Result<Vec<SearchResult>, ApiError> {
        Ok(Vec::new())
    }

    async fn upload(&self, _: &UploadFile, _: &str) -> Result<Option<UploadReceipt>, ApiError> {
        Ok(None)
    }

    async fn fetch_document(&self, _: i64) -> Result<FetchedDocument, ApiError> {
        Err(boom())
    }
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Collects formatted log output for the current thread's subscriber.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn session_with(backend: Arc<MockBackend>) -> (Session, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let session = Session::new(
        "http://localhost:8080".to_string(),
        "backend",
        backend,
        sink.clone(),
    );
    (session, sink)
}

fn doc_result() -> SearchResult {
    SearchResult {
        document_id: 1,
        document_name: "doc.pdf".to_string(),
        document_path: "/doc.pdf".to_string(),
        chunk_id: 3,
        content: "...".to_string(),
        score: 0.5,
    }
}

// ─── Query workflow ─────────────────────────────────────────────────

#[tokio::test]
async fn test_ask_sets_answer_and_clears_sources() {
    let backend = Arc::new(MockBackend {
        answer: Some("X is Y".to_string()),
        results: Some(vec![doc_result()]),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());
    session.set_question("What is X?");

    assert_eq!(session.submit_search().await, Outcome::Applied);
    assert_eq!(session.snapshot().sources.len(), 1);

    assert_eq!(session.submit_ask().await, Outcome::Applied);
    let state = session.snapshot();
    assert_eq!(state.answer, "X is Y");
    assert!(state.sources.is_empty());
    assert!(!state.loading);
    assert_eq!(state.question, "What is X?", "question is kept");
    assert_eq!(
        backend.calls(),
        vec!["search:What is X?:backend", "ask:What is X?:backend"]
    );
}

#[tokio::test]
async fn test_search_sets_sources_and_clears_answer() {
    let backend = Arc::new(MockBackend {
        answer: Some("X is Y".to_string()),
        results: Some(vec![doc_result()]),
        ..Default::default()
    });
    let (session, _) = session_with(backend);
    session.set_question("What is X?");

    session.submit_ask().await;
    assert_eq!(session.snapshot().answer, "X is Y");

    assert_eq!(session.submit_search().await, Outcome::Applied);
    let state = session.snapshot();
    assert_eq!(state.sources, vec![doc_result()]);
    assert_eq!(state.answer, "");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_search_preserves_backend_order() {
    let mut low = doc_result();
    low.score = 0.1;
    low.chunk_id = 9;
    let high = doc_result();
    let backend = Arc::new(MockBackend {
        results: Some(vec![low.clone(), high.clone()]),
        ..Default::default()
    });
    let (session, _) = session_with(backend);
    session.set_question("order");
    session.submit_search().await;
    assert_eq!(session.snapshot().sources, vec![low, high]);
}

#[tokio::test]
async fn test_ask_failure_sets_error_and_resets_loading() {
    let backend = Arc::new(MockBackend::default());
    let (session, _) = session_with(backend);
    session.set_question("What is X?");

    assert_eq!(session.submit_ask().await, Outcome::Failed);
    let state = session.snapshot();
    assert_eq!(state.answer, ASK_ERROR);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_search_failure_keeps_sources() {
    let backend = Arc::new(MockBackend {
        results: Some(vec![doc_result()]),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());
    session.set_question("What is X?");
    assert_eq!(session.submit_search().await, Outcome::Applied);

    backend.down.store(true, Ordering::SeqCst);
    assert_eq!(session.submit_search().await, Outcome::Failed);
    let state = session.snapshot();
    assert_eq!(state.answer, SEARCH_ERROR);
    assert_eq!(state.sources, vec![doc_result()]);
    assert!(!state.loading);
}

#[tokio::test]
async fn test_empty_question_is_a_no_op() {
    let backend = Arc::new(MockBackend {
        answer: Some("never".to_string()),
        results: Some(vec![doc_result()]),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());

    for question in ["", "   ", "\n\t"] {
        session.set_question(question);
        let before = session.snapshot();
        assert_eq!(session.submit_ask().await, Outcome::Skipped);
        assert_eq!(session.submit_search().await, Outcome::Skipped);
        assert_eq!(session.snapshot(), before);
    }
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_project_is_sent_with_query() {
    let backend = Arc::new(MockBackend {
        answer: Some("ok".to_string()),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());
    session.set_project("payments");
    session.set_question("refunds?");
    session.submit_ask().await;
    assert_eq!(backend.calls(), vec!["ask:refunds?:payments"]);
}

// ─── Request fencing ────────────────────────────────────────────────

#[tokio::test]
async fn test_superseded_ask_is_discarded() {
    let (tx1, rx1) = oneshot::channel();
    let (tx2, rx2) = oneshot::channel();
    let backend = Arc::new(GatedBackend {
        replies: Mutex::new(VecDeque::from([rx1, rx2])),
    });
    let session = Session::new(
        "http://localhost:8080".to_string(),
        "backend",
        backend,
        Arc::new(RecordingSink::default()),
    );
    session.set_question("q");

    let driver = async {
        tokio::task::yield_now().await;
        tx2.send(Ok("second".to_string())).unwrap();
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
        // First request is still outstanding.
        assert!(session.snapshot().loading);
        tx1.send(Ok("first".to_string())).unwrap();
    };

    let (first, second, ()) = tokio::join!(session.submit_ask(), session.submit_ask(), driver);

    assert_eq!(first, Outcome::Stale);
    assert_eq!(second, Outcome::Applied);
    let state = session.snapshot();
    assert_eq!(state.answer, "second");
    assert!(!state.loading);
}

#[tokio::test]
async fn test_stale_failure_does_not_overwrite_answer() {
    let (tx1, rx1) = oneshot::channel();
    let (tx2, rx2) = oneshot::channel();
    let backend = Arc::new(GatedBackend {
        replies: Mutex::new(VecDeque::from([rx1, rx2])),
    });
    let session = Session::new(
        "http://localhost:8080".to_string(),
        "backend",
        backend,
        Arc::new(RecordingSink::default()),
    );
    session.set_question("q");

    let driver = async {
        tokio::task::yield_now().await;
        tx2.send(Ok("fresh".to_string())).unwrap();
        tokio::task::yield_now().await;
        tx1.send(Err(boom())).unwrap();
    };

    let (first, _, ()) = tokio::join!(session.submit_ask(), session.submit_ask(), driver);
    assert_eq!(first, Outcome::Stale);
    assert_eq!(session.snapshot().answer, "fresh");
}

#[tokio::test]
async fn test_stale_failure_is_still_logged() {
    let logs = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (tx1, rx1) = oneshot::channel();
    let (tx2, rx2) = oneshot::channel();
    let backend = Arc::new(GatedBackend {
        replies: Mutex::new(VecDeque::from([rx1, rx2])),
    });
    let session = Session::new(
        "http://localhost:8080".to_string(),
        "backend",
        backend,
        Arc::new(RecordingSink::default()),
    );
    session.set_question("q");

    let driver = async {
        tokio::task::yield_now().await;
        tx2.send(Ok("fresh".to_string())).unwrap();
        tokio::task::yield_now().await;
        tx1.send(Err(boom())).unwrap();
    };

    let (first, second, ()) = tokio::join!(session.submit_ask(), session.submit_ask(), driver);
    assert_eq!(first, Outcome::Stale);
    assert_eq!(second, Outcome::Applied);

    let output = logs.contents();
    assert!(output.contains("ask failed"), "logs: {}", output);
    assert!(output.contains("boom"), "logs: {}", output);
}

#[tokio::test]
async fn test_status_label_follows_query_kind() {
    let (tx, rx) = oneshot::channel();
    let backend = Arc::new(GatedBackend {
        replies: Mutex::new(VecDeque::from([rx])),
    });
    let session = Session::new(
        "http://localhost:8080".to_string(),
        "backend",
        backend,
        Arc::new(RecordingSink::default()),
    );
    session.set_question("q");

    let driver = async {
        tokio::task::yield_now().await;
        let state = session.snapshot();
        assert_eq!(state.query_kind, Some(QueryKind::Ask));
        assert_eq!(query_status(&state), "Asking...");
        tx.send(Ok("done".to_string())).unwrap();
    };
    let (outcome, ()) = tokio::join!(session.submit_ask(), driver);
    assert_eq!(outcome, Outcome::Applied);
    assert_eq!(query_status(&session.snapshot()), "Ready");

    assert_eq!(session.submit_search().await, Outcome::Applied);
    assert_eq!(session.snapshot().query_kind, Some(QueryKind::Search));
}

// ─── Upload workflow ────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_success_clears_file() {
    let backend = Arc::new(MockBackend {
        receipt: Some(None),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());
    session.select_file(UploadFile::new("guide.md", b"# Guide".to_vec()));

    assert_eq!(session.submit_upload().await, Outcome::Applied);
    let state = session.snapshot();
    let notice = state.upload_message.unwrap();
    assert!(notice.is_success());
    assert!(notice.message().contains("successfully"));
    assert!(state.upload_file.is_none());
    assert!(!state.upload_loading);
    assert_eq!(backend.calls(), vec!["upload:guide.md:backend"]);
}

#[tokio::test]
async fn test_upload_receipt_in_message() {
    let backend = Arc::new(MockBackend {
        receipt: Some(Some(UploadReceipt {
            document_id: 100,
            chunk_count: 2,
        })),
        ..Default::default()
    });
    let (session, _) = session_with(backend);
    session.select_file(UploadFile::new("guide.md", b"# Guide".to_vec()));
    session.submit_upload().await;

    assert_eq!(
        session.snapshot().upload_message,
        Some(Notice::Success(
            "File uploaded successfully! (document 100, 2 chunks)".to_string()
        ))
    );
}

#[tokio::test]
async fn test_upload_failure_keeps_file_for_retry() {
    let backend = Arc::new(MockBackend::default());
    let (session, _) = session_with(backend);
    let file = UploadFile::new("guide.pdf", b"%PDF".to_vec());
    session.select_file(file.clone());

    assert_eq!(session.submit_upload().await, Outcome::Failed);
    let state = session.snapshot();
    assert_eq!(
        state.upload_message,
        Some(Notice::Error(UPLOAD_ERROR.to_string()))
    );
    assert_eq!(state.upload_file, Some(file));
    assert!(!state.upload_loading);
}

#[tokio::test]
async fn test_upload_without_file_prompts() {
    let backend = Arc::new(MockBackend {
        receipt: Some(None),
        ..Default::default()
    });
    let (session, _) = session_with(backend.clone());

    assert_eq!(session.submit_upload().await, Outcome::Skipped);
    let state = session.snapshot();
    assert_eq!(
        state.upload_message,
        Some(Notice::Error(UPLOAD_PROMPT.to_string()))
    );
    assert!(!state.upload_loading);
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_upload_does_not_touch_query_state() {
    let backend = Arc::new(MockBackend {
        answer: Some("X is Y".to_string()),
        receipt: Some(None),
        ..Default::default()
    });
    let (session, _) = session_with(backend);
    session.set_question("What is X?");
    session.submit_ask().await;
    session.select_file(UploadFile::new("a.txt", b"a".to_vec()));
    session.submit_upload().await;
    assert_eq!(session.snapshot().answer, "X is Y");
}

// ─── Retrieval workflow ─────────────────────────────────────────────

#[tokio::test]
async fn test_retrieve_uses_header_name() {
    let backend = Arc::new(MockBackend {
        document: Some(FetchedDocument {
            bytes: b"%PDF-1.4".to_vec(),
            suggested_name: Some("report.pdf".to_string()),
        }),
        ..Default::default()
    });
    let (session, sink) = session_with(backend.clone());

    assert_eq!(session.retrieve_and_save(7, "doc.pdf").await, Outcome::Applied);
    assert_eq!(
        sink.saved(),
        vec![("report.pdf".to_string(), b"%PDF-1.4".to_vec())]
    );
    assert_eq!(backend.calls(), vec!["fetch:7"]);
    let state = session.snapshot();
    assert!(state.download_message.unwrap().is_success());
    assert!(!state.download_loading);
}

#[tokio::test]
async fn test_retrieve_falls_back_to_display_name() {
    let backend = Arc::new(MockBackend {
        document: Some(FetchedDocument {
            bytes: b"text".to_vec(),
            suggested_name: None,
        }),
        ..Default::default()
    });
    let (session, sink) = session_with(backend);

    session.retrieve_and_save(1, "doc.pdf").await;
    assert_eq!(sink.saved()[0].0, "doc.pdf");
}

#[tokio::test]
async fn test_retrieve_failure_saves_nothing() {
    let backend = Arc::new(MockBackend::default());
    let (session, sink) = session_with(backend);

    assert_eq!(session.retrieve_and_save(1, "doc.pdf").await, Outcome::Failed);
    assert!(sink.saved().is_empty());
    let state = session.snapshot();
    assert_eq!(
        state.download_message,
        Some(Notice::Error(DOWNLOAD_ERROR.to_string()))
    );
    assert!(!state.download_loading);
}

#[tokio::test]
async fn test_retrieve_sink_failure_is_reported() {
    let backend = Arc::new(MockBackend {
        document: Some(FetchedDocument {
            bytes: b"x".to_vec(),
            suggested_name: Some("x.txt".to_string()),
        }),
        ..Default::default()
    });
    let sink = Arc::new(RecordingSink {
        fail: true,
        ..Default::default()
    });
    let session = Session::new("http://localhost:8080".to_string(), "backend", backend, sink);

    assert_eq!(session.retrieve_and_save(1, "x.txt").await, Outcome::Failed);
    assert!(!session.snapshot().download_message.unwrap().is_success());
}
