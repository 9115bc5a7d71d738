// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Render lifecycle of a mounted diagram: `idle → rendering → rendered | errored`.
//!
//! Every request gets a monotonically increasing request id. A result is applied only when
//! its ticket still carries the latest id, so a slow render can never overwrite a newer one.
//! Instance ids for the engine come from an injected [`IdGenerator`].

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use thiserror::Error;

use crate::model::{IdGenerator, InstanceId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderEngineError {
    #[error("diagram engine rejected the source: {0}")]
    Rejected(String),
    #[error("diagram engine is unavailable")]
    Unavailable,
}

/// The external engine that turns diagram source into rendered output (e.g. SVG).
pub trait DiagramEngine {
    fn render(
        &self,
        id: &InstanceId,
        source: &str,
    ) -> impl Future<Output = Result<String, RenderEngineError>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "kebab-case")]
pub enum RenderPhase {
    Idle,
    Rendering { request_id: u64 },
    Rendered { output: String },
    Errored { message: String },
}

/// One issued render request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTicket {
    request_id: u64,
    instance_id: InstanceId,
    source: String,
}

impl RenderTicket {
    pub fn request_id(&self) -> u64 {
        self.request_id
    }

    pub fn instance_id(&self) -> &InstanceId {
        &self.instance_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

pub struct DiagramView {
    ids: Arc<dyn IdGenerator>,
    latest: u64,
    source: Option<String>,
    phase: RenderPhase,
}

impl DiagramView {
    pub fn new(ids: Arc<dyn IdGenerator>) -> Self {
        Self { ids, latest: 0, source: None, phase: RenderPhase::Idle }
    }

    pub fn phase(&self) -> &RenderPhase {
        &self.phase
    }

    /// Source of the current request; kept while errored for a "view source" fallback.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn output(&self) -> Option<&str> {
        match &self.phase {
            RenderPhase::Rendered { output } => Some(output),
            _ => None,
        }
    }

    /// Starts a render, superseding any request still in flight.
    pub fn request(&mut self, source: impl Into<String>) -> RenderTicket {
        self.latest += 1;
        let source = source.into();
        let instance_id = self.ids.next_instance_id();
        tracing::debug!(request_id = self.latest, instance = %instance_id, "render requested");
        self.source = Some(source.clone());
        self.phase = RenderPhase::Rendering { request_id: self.latest };
        RenderTicket { request_id: self.latest, instance_id, source }
    }

    /// Re-enters `rendering` with the same source. Only valid from `errored`.
    pub fn retry(&mut self) -> Option<RenderTicket> {
        if !matches!(self.phase, RenderPhase::Errored { .. }) {
            return None;
        }
        let source = self.source.clone()?;
        Some(self.request(source))
    }

    /// Applies a result. Returns `false` when the ticket was superseded or the view unmounted.
    pub fn complete(
        &mut self,
        ticket: &RenderTicket,
        result: Result<String, RenderEngineError>,
    ) -> bool {
        let current = matches!(
            self.phase,
            RenderPhase::Rendering { request_id } if request_id == ticket.request_id
        );
        if !current {
            tracing::warn!(
                request_id = ticket.request_id,
                latest = self.latest,
                "discarding stale render result"
            );
            return false;
        }
        self.phase = match result {
            Ok(output) => RenderPhase::Rendered { output },
            Err(err) => RenderPhase::Errored { message: err.to_string() },
        };
        true
    }

    /// Drops owned output and invalidates every pending request.
    pub fn unmount(&mut self) {
        self.latest += 1;
        self.source = None;
        self.phase = RenderPhase::Idle;
        tracing::debug!(latest = self.latest, "diagram view unmounted");
    }
}

fn lock(view: &Mutex<DiagramView>) -> MutexGuard<'_, DiagramView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Requests a render of `source` and applies the engine's result unless it went stale.
///
/// The view is only locked around the state transitions, never across the engine call.
pub async fn render_latest<E: DiagramEngine>(
    view: &Mutex<DiagramView>,
    engine: &E,
    source: impl Into<String>,
) -> bool {
    let ticket = lock(view).request(source);
    run(view, engine, ticket).await
}

/// Retries an errored view; `false` when there was nothing to retry or the retry went stale.
pub async fn retry_latest<E: DiagramEngine>(view: &Mutex<DiagramView>, engine: &E) -> bool {
    let Some(ticket) = lock(view).retry() else {
        return false;
    };
    run(view, engine, ticket).await
}

async fn run<E: DiagramEngine>(
    view: &Mutex<DiagramView>,
    engine: &E,
    ticket: RenderTicket,
) -> bool {
    let result = engine.render(ticket.instance_id(), ticket.source()).await;
    if let Err(err) = &result {
        tracing::warn!(instance = %ticket.instance_id(), error = %err, "diagram render failed");
    }
    lock(view).complete(&ticket, result)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use tokio::sync::oneshot;

    use super::{
        render_latest, retry_latest, DiagramEngine, DiagramView, RenderEngineError, RenderPhase,
    };
    use crate::model::{InstanceId, SequentialIds};

    type Reply = Result<String, RenderEngineError>;

    /// Resolves each instance id when the test sends on its channel.
    struct ChannelEngine {
        pending: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    }

    impl ChannelEngine {
        fn new(
            pending: impl IntoIterator<Item = (&'static str, oneshot::Receiver<Reply>)>,
        ) -> Self {
            let pending = pending.into_iter().map(|(id, rx)| (id.to_owned(), rx)).collect();
            Self { pending: Mutex::new(pending) }
        }
    }

    impl DiagramEngine for ChannelEngine {
        async fn render(&self, id: &InstanceId, _source: &str) -> Reply {
            let rx = self.pending.lock().expect("engine lock").remove(id.as_str());
            match rx {
                Some(rx) => rx.await.unwrap_or(Err(RenderEngineError::Unavailable)),
                None => Err(RenderEngineError::Unavailable),
            }
        }
    }

    /// Echoes the source, failing on anything that does not start with a keyword.
    struct EchoEngine;

    impl DiagramEngine for EchoEngine {
        async fn render(&self, id: &InstanceId, source: &str) -> Reply {
            if source.starts_with("graph") {
                Ok(format!("<svg id=\"{id}\">{source}</svg>"))
            } else {
                Err(RenderEngineError::Rejected("unknown diagram type".to_owned()))
            }
        }
    }

    fn view() -> DiagramView {
        DiagramView::new(Arc::new(SequentialIds::default()))
    }

    #[tokio::test]
    async fn stale_render_does_not_overwrite_newer_one() {
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        let engine = ChannelEngine::new([("diagram-0", rx1), ("diagram-1", rx2)]);
        let view = Mutex::new(view());

        let first = render_latest(&view, &engine, "graph TD\nA-->B");
        let second = render_latest(&view, &engine, "graph TD\nA-->C");
        let driver = async {
            tokio::task::yield_now().await;
            tx2.send(Ok("<svg>A-->C</svg>".to_owned())).expect("second pending");
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            tx1.send(Ok("<svg>A-->B</svg>".to_owned())).expect("first pending");
        };
        let (first_applied, second_applied, ()) = tokio::join!(first, second, driver);

        assert!(!first_applied);
        assert!(second_applied);
        let view = view.lock().expect("view lock");
        assert_eq!(view.output(), Some("<svg>A-->C</svg>"));
        assert_eq!(view.source(), Some("graph TD\nA-->C"));
    }

    #[tokio::test]
    async fn errored_view_retries_with_same_source() {
        let view = Mutex::new(view());
        assert!(render_latest(&view, &EchoEngine, "pie\n\"a\": 1").await);
        assert_eq!(
            view.lock().expect("view lock").phase(),
            &RenderPhase::Errored {
                message: "diagram engine rejected the source: unknown diagram type".to_owned()
            }
        );
        assert_eq!(view.lock().expect("view lock").source(), Some("pie\n\"a\": 1"));

        // Still rejected, but the retry went through the engine again with a fresh instance.
        assert!(retry_latest(&view, &EchoEngine).await);
        assert!(matches!(view.lock().expect("view lock").phase(), RenderPhase::Errored { .. }));

        assert!(render_latest(&view, &EchoEngine, "graph LR\nA-->B").await);
        assert_eq!(
            view.lock().expect("view lock").output(),
            Some("<svg id=\"diagram-2\">graph LR\nA-->B</svg>")
        );
        assert!(!retry_latest(&view, &EchoEngine).await);
    }

    #[test]
    fn unmount_invalidates_pending_requests() {
        let mut view = view();
        let ticket = view.request("graph TD\nA-->B");
        assert_eq!(view.phase(), &RenderPhase::Rendering { request_id: 1 });
        view.unmount();
        assert!(!view.complete(&ticket, Ok("<svg/>".to_owned())));
        assert_eq!(view.phase(), &RenderPhase::Idle);
        assert_eq!(view.source(), None);
        assert_eq!(view.retry(), None);
    }

    #[test]
    fn instance_ids_come_from_the_injected_generator() {
        let ids = Arc::new(SequentialIds::new("chat-7").expect("prefix"));
        let mut view = DiagramView::new(ids);
        assert_eq!(view.request("graph TD").instance_id().as_str(), "chat-7-0");
        assert_eq!(view.request("graph TD").instance_id().as_str(), "chat-7-1");
    }
}
