//! A client session: view state plus the collaborators the workflows use.
//!
//! The base URL is resolved once, before the session exists, and stored in
//! the state by value. State sits behind a `std::sync::Mutex` that is only
//! held for short synchronous sections, never across an `.await`, so a
//! `Session` can be shared through an `Arc` and driven from several tasks.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::ApiClient;
use crate::config::Config;
use crate::download::DirectorySink;
use crate::endpoint::{resolve_base_url, HostContext};
use crate::models::UploadFile;
use crate::state::{RequestTracker, SessionState};
use crate::traits::{Backend, DownloadSink};

/// Which loading flag a request drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activity {
    Query,
    Upload,
    Download,
}

impl Activity {
    fn index(self) -> usize {
        match self {
            Activity::Query => 0,
            Activity::Upload => 1,
            Activity::Download => 2,
        }
    }
}

struct Inner {
    view: SessionState,
    // Outstanding requests per activity; a loading flag is `pending > 0`.
    pending: [usize; 3],
}

impl Inner {
    fn set_flag(&mut self, activity: Activity) {
        let busy = self.pending[activity.index()] > 0;
        match activity {
            Activity::Query => self.view.loading = busy,
            Activity::Upload => self.view.upload_loading = busy,
            Activity::Download => self.view.download_loading = busy,
        }
    }
}

pub struct Session {
    inner: Mutex<Inner>,
    backend: Arc<dyn Backend>,
    sink: Arc<dyn DownloadSink>,
    pub(crate) query_requests: RequestTracker,
    pub(crate) upload_requests: RequestTracker,
    pub(crate) download_requests: RequestTracker,
}

impl Session {
    pub fn new(
        api_base_url: String,
        project: impl Into<String>,
        backend: Arc<dyn Backend>,
        sink: Arc<dyn DownloadSink>,
    ) -> Self {
        Self {
            inner: Mutex::new(Inner {
                view: SessionState::new(api_base_url, project),
                pending: [0; 3],
            }),
            backend,
            sink,
            query_requests: RequestTracker::new(),
            upload_requests: RequestTracker::new(),
            download_requests: RequestTracker::new(),
        }
    }

    /// Start a session against the real backend.
    ///
    /// Resolves the base URL from `config` exactly once; later changes to
    /// the environment do not affect this session.
    pub fn connect(config: &Config, host: HostContext) -> Self {
        let base_url = resolve_base_url(host, config.api.base_url.as_deref());
        tracing::info!(%base_url, project = %config.session.project, "session started");

        let backend = Arc::new(ApiClient::new(base_url.clone()));
        let sink = Arc::new(DirectorySink::new(config.downloads.dir.clone()));
        Self::new(base_url, config.session.project.clone(), backend, sink)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current view state.
    pub fn snapshot(&self) -> SessionState {
        self.lock().view.clone()
    }

    pub fn api_base_url(&self) -> String {
        self.lock().view.api_base_url().to_string()
    }

    pub fn set_project(&self, project: impl Into<String>) {
        self.lock().view.project = project.into();
    }

    pub fn set_question(&self, question: impl Into<String>) {
        self.lock().view.question = question.into();
    }

    pub fn select_file(&self, file: UploadFile) {
        self.lock().view.upload_file = Some(file);
    }

    pub fn clear_file(&self) {
        self.lock().view.upload_file = None;
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.lock().view)
    }

    pub(crate) fn backend(&self) -> &dyn Backend {
        self.backend.as_ref()
    }

    pub(crate) fn sink(&self) -> &dyn DownloadSink {
        self.sink.as_ref()
    }

    /// Mark one request of `activity` as outstanding until the guard drops.
    pub(crate) fn begin(&self, activity: Activity) -> LoadingGuard<'_> {
        let mut inner = self.lock();
        inner.pending[activity.index()] += 1;
        inner.set_flag(activity);
        LoadingGuard {
            session: self,
            activity,
        }
    }
}

/// Clears a loading flag on every exit path, including a dropped future.
pub(crate) struct LoadingGuard<'a> {
    session: &'a Session,
    activity: Activity,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.session.lock();
        let slot = &mut inner.pending[self.activity.index()];
        *slot = slot.saturating_sub(1);
        inner.set_flag(self.activity);
    }
}
