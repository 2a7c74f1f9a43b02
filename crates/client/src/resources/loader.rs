//! Generic resource loader.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use super::{ResourceSource, ResourceState};
use crate::api::{ApiClient, ValidationError};
use crate::session::SessionHandle;

/// Holds the `{data, loading, error}` snapshot of one resource.
///
/// Overlapping refreshes are not coalesced; the last one to finish wins.
/// After [`dispose`](Self::dispose) in-flight results are dropped, `loading`
/// is cleared, and further refreshes do nothing.
pub struct ResourceLoader<S: ResourceSource> {
    source: S,
    client: ApiClient,
    session: SessionHandle,
    state: watch::Sender<ResourceState<S::Output>>,
    disposed: AtomicBool,
}

impl<S: ResourceSource> std::fmt::Debug for ResourceLoader<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ResourceLoader")
            .field("resource", &S::NAME)
            .field("loading", &state.loading)
            .field("error", &state.error)
            .field("disposed", &self.is_disposed())
            .finish_non_exhaustive()
    }
}

impl<S: ResourceSource> ResourceLoader<S> {
    /// Create an idle loader. Nothing is fetched until [`start`](Self::start).
    #[must_use]
    pub fn new(client: ApiClient, session: SessionHandle, source: S) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        Self {
            source,
            client,
            session,
            state,
            disposed: AtomicBool::new(false),
        }
    }

    /// Initial fetch.
    pub async fn start(&self) {
        self.refresh().await;
    }

    /// Fetch again, keeping the current data until the new result arrives.
    ///
    /// Without an authenticated session the error is set and no request is
    /// made.
    #[instrument(skip(self), fields(resource = S::NAME))]
    pub async fn refresh(&self) {
        if self.is_disposed() {
            return;
        }

        let session = self.session.current();
        if !session.is_authenticated() {
            self.state.send_modify(|state| {
                state.loading = false;
                state.error = Some(ValidationError::NotSignedIn.to_string());
            });
            return;
        }

        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.source.fetch(&self.client, &session).await;

        if self.is_disposed() {
            debug!("loader disposed, dropping result");
            self.state.send_if_modified(|state| std::mem::replace(&mut state.loading, false));
            return;
        }

        self.state.send_modify(|state| {
            state.loading = false;
            match result {
                Ok(data) => {
                    state.data = Some(data);
                    state.error = None;
                }
                Err(e) => {
                    warn!(error = %e, "fetch failed");
                    state.error = Some(e.user_message());
                }
            }
        });
    }

    /// Stop publishing results.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> ResourceState<S::Output> {
        self.state.borrow().clone()
    }

    /// Receive every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<S::Output>> {
        self.state.subscribe()
    }

    pub(crate) const fn source(&self) -> &S {
        &self.source
    }

    pub(crate) const fn client(&self) -> &ApiClient {
        &self.client
    }

    #[cfg(test)]
    pub(crate) fn set_data(&self, data: S::Output) {
        self.state.send_modify(|state| state.data = Some(data));
    }

    /// Edit the loaded data in place. Returns `None` when nothing is loaded.
    pub(crate) fn update<R>(&self, edit: impl FnOnce(&mut S::Output) -> R) -> Option<R> {
        let mut out = None;
        self.state.send_if_modified(|state| {
            let Some(data) = state.data.as_mut() else {
                return false;
            };
            out = Some(edit(data));
            true
        });
        out
    }
}
