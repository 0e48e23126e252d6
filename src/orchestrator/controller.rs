//! Request controller.
//!
//! Runs gateway calls off the UI thread and reports each outcome tagged with its request id.
//! At most one request task is kept alive; a newer submission aborts the older task.

use crate::error::GatewayError;
use crate::gateway::AnalysisBackend;
use crate::lifecycle::{RequestId, RequestTicket};
use crate::model::ResultModel;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Commands emitted by UI layers.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Submit(RequestTicket),
    /// Drop the outstanding request, if any.
    Abandon,
    Quit,
}

/// Events sent back to presentation layers.
#[derive(Debug)]
pub(crate) enum AppEvent {
    Resolved {
        id: RequestId,
        outcome: Result<ResultModel, GatewayError>,
    },
    Info(String),
}

/// Internal handle for a running request task.
struct RunCtx {
    id: RequestId,
    handle: Option<tokio::task::JoinHandle<Result<ResultModel, GatewayError>>>,
}

impl RunCtx {
    fn abort(mut self) {
        if let Some(h) = self.handle.take() {
            h.abort();
        }
    }
}

/// Spawn the gateway call for one ticket.
fn start_request(
    backend: &Arc<dyn AnalysisBackend>,
    ticket: RequestTicket,
    timeout: Duration,
) -> RunCtx {
    tracing::info!(
        request = %ticket.id,
        location = %ticket.query.location,
        query_len = ticket.query.text.len(),
        "submitting query"
    );
    let backend = backend.clone();
    let id = ticket.id;
    let handle = tokio::spawn(async move { backend.send(&ticket.query, timeout).await });
    RunCtx {
        id,
        handle: Some(handle),
    }
}

/// Execute submissions from the UI and emit their outcomes.
pub(crate) async fn run_controller(
    backend: Arc<dyn AnalysisBackend>,
    timeout: Duration,
    event_tx: UnboundedSender<AppEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    let mut run_ctx: Option<RunCtx> = None;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UiCommand::Submit(ticket)) => {
                        // Aborting is advisory; the lifecycle drops stale ids regardless.
                        if let Some(prev) = run_ctx.take() {
                            tracing::info!(superseded = %prev.id, by = %ticket.id, "superseding in-flight request");
                            prev.abort();
                            let _ = event_tx.send(AppEvent::Info(
                                "Previous request superseded by the new submission".into(),
                            ));
                        }
                        run_ctx = Some(start_request(&backend, ticket, timeout));
                    }
                    Some(UiCommand::Abandon) => {
                        if let Some(prev) = run_ctx.take() {
                            tracing::info!(request = %prev.id, "abandoning request");
                            prev.abort();
                            let _ = event_tx.send(AppEvent::Info("Request cancelled".into()));
                        }
                    }
                    Some(UiCommand::Quit) | None => {
                        if let Some(prev) = run_ctx.take() {
                            prev.abort();
                        }
                        break Ok(());
                    }
                }
            }
            // Do not take the JoinHandle before this branch wins; otherwise it can be dropped
            // if another select branch is chosen, and we'll never observe completion.
            maybe_done = async {
                if let Some(ctx) = &mut run_ctx {
                    if let Some(h) = ctx.handle.as_mut() {
                        return Some(h.await);
                    }
                }
                futures::future::pending().await
            } => {
                let Some(join_res) = maybe_done else { continue };
                let Some(ctx) = run_ctx.take() else { continue };
                match join_res {
                    Ok(outcome) => {
                        let _ = event_tx.send(AppEvent::Resolved { id: ctx.id, outcome });
                    }
                    Err(e) if e.is_cancelled() => {}
                    Err(e) => {
                        let _ = event_tx.send(AppEvent::Resolved {
                            id: ctx.id,
                            outcome: Err(GatewayError::Unknown {
                                message: format!("request task failed: {e}"),
                            }),
                        });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{RequestGateway, DEFAULT_TIMEOUT};
    use crate::lifecycle::{LifecycleState, QueryLifecycle, Resolution};
    use crate::model::{Query, RightsSection, RunConfig};
    use crate::presenter::{ResultPresenter, Tab};
    use crate::test_support::{spawn_stub, StubResponse};
    use crate::triage::AlertVariant;
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    /// Answers with the query text as the rights explanation; "slow" queries take 30s.
    struct EchoBackend;

    #[async_trait]
    impl AnalysisBackend for EchoBackend {
        async fn send(
            &self,
            query: &Query,
            _timeout: Duration,
        ) -> Result<ResultModel, GatewayError> {
            if query.text.starts_with("slow") {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok(ResultModel {
                rights: Some(RightsSection {
                    explanation: Some(query.text.clone()),
                    sources: vec![],
                }),
                ..Default::default()
            })
        }
    }

    fn spawn_controller(
        backend: Arc<dyn AnalysisBackend>,
    ) -> (
        UnboundedSender<UiCommand>,
        UnboundedReceiver<AppEvent>,
        tokio::task::JoinHandle<Result<()>>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(backend, DEFAULT_TIMEOUT, event_tx, cmd_rx));
        (cmd_tx, event_rx, handle)
    }

    /// Skip informational events until the next resolution.
    async fn next_resolution(
        rx: &mut UnboundedReceiver<AppEvent>,
    ) -> Option<(RequestId, Result<ResultModel, GatewayError>)> {
        while let Some(ev) = rx.recv().await {
            if let AppEvent::Resolved { id, outcome } = ev {
                return Some((id, outcome));
            }
        }
        None
    }

    fn explanation(lc: &QueryLifecycle) -> Option<String> {
        lc.result()?.rights.as_ref()?.explanation.clone()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_resubmission_only_resolves_latest() {
        let (cmd_tx, mut event_rx, handle) = spawn_controller(Arc::new(EchoBackend));
        let mut lc = QueryLifecycle::default();

        let first = lc.submit("slow first", "Boston, MA").unwrap();
        let first_id = first.id;
        cmd_tx.send(UiCommand::Submit(first)).unwrap();
        let second = lc.submit("second", "Boston, MA").unwrap();
        cmd_tx.send(UiCommand::Submit(second)).unwrap();

        let (id, outcome) = next_resolution(&mut event_rx)
            .await
            .expect("expected a resolution");
        assert_ne!(id, first_id);
        assert_eq!(lc.resolve(id, outcome), Resolution::Applied);
        assert_eq!(explanation(&lc).as_deref(), Some("second"));

        // Even if the superseded request somehow answered, it could not win.
        let late = EchoBackend
            .send(
                &Query {
                    text: "slow first".into(),
                    location: String::new(),
                },
                DEFAULT_TIMEOUT,
            )
            .await;
        assert_eq!(lc.resolve(first_id, late), Resolution::Stale);
        assert_eq!(explanation(&lc).as_deref(), Some("second"));

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
        assert!(next_resolution(&mut event_rx).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_never_resolves() {
        let (cmd_tx, mut event_rx, handle) = spawn_controller(Arc::new(EchoBackend));
        let mut lc = QueryLifecycle::default();
        cmd_tx
            .send(UiCommand::Submit(lc.submit("slow", "").unwrap()))
            .unwrap();
        cmd_tx.send(UiCommand::Abandon).unwrap();
        lc.reset();
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(cmd_tx);
        handle.await.unwrap().unwrap();
        assert!(next_resolution(&mut event_rx).await.is_none());
    }

    async fn run_against_stub(body: &str) -> (QueryLifecycle, ResultPresenter) {
        let stub = spawn_stub(vec![StubResponse::json(200, body)]).await;
        let gateway = RequestGateway::new(&RunConfig {
            base_url: stub.base_url.clone(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: "objection-cli/test".into(),
        })
        .unwrap();
        let (cmd_tx, mut event_rx, handle) = spawn_controller(Arc::new(gateway));

        let mut lc = QueryLifecycle::default();
        let ticket = lc
            .submit("My boss hasn't paid overtime", "Boston, MA")
            .unwrap();
        let location = ticket.query.location.clone();
        cmd_tx.send(UiCommand::Submit(ticket)).unwrap();
        let (id, outcome) = next_resolution(&mut event_rx).await.expect("resolution");
        assert_eq!(lc.resolve(id, outcome), Resolution::Applied);
        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();

        let result = lc.result().cloned().expect("succeeded");
        (lc, ResultPresenter::new(result, &location))
    }

    #[tokio::test]
    async fn wage_dispute_end_to_end() {
        let (lc, presenter) = run_against_stub(
            r#"{"triage":{"situation_type":"wage_dispute","urgency":"medium","category":"employment"},
                "rights":{"explanation":"Massachusetts requires overtime at 1.5x your regular rate."},
                "actions":{"action_plan":"Keep a log of hours."}}"#,
        )
        .await;
        assert!(matches!(lc.state(), LifecycleState::Succeeded { .. }));
        assert_eq!(presenter.alert(), AlertVariant::None);
        assert_eq!(presenter.active(), Tab::Rights);
        let composition = presenter.compose();
        assert!(composition.alert_copy.is_none());
        assert!(composition
            .reading_order()
            .contains(&"Massachusetts requires overtime at 1.5x your regular rate.".to_string()));
    }

    #[tokio::test]
    async fn active_violence_end_to_end() {
        let (_lc, presenter) = run_against_stub(
            r#"{"triage":{"situation_type":"active_violence","urgency":"critical"}}"#,
        )
        .await;
        let composition = presenter.compose();
        assert_eq!(composition.alert, AlertVariant::ActiveViolence);
        let lines = composition.reading_order();
        let alert_at = lines.iter().position(|l| l.contains("911")).unwrap();
        let tabs_at = lines.iter().position(|l| l.contains(" | ")).unwrap();
        assert!(alert_at < tabs_at);
        // Fallback content still renders under the alert.
        assert!(lines.contains(&"No rights information available".to_string()));
    }
}
