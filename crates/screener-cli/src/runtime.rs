// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use screener_app::{DetailResponse, FetchTicket, ResultRow, RetrievalFailure};
use screener_client::Client;
use screener_testkit::{ResumeFaker, not_found_response};
use screener_tui::{AppRuntime, InternalEvent};
use std::collections::BTreeMap;
use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Resolves lookups against the screening server, one worker thread per
/// request so the UI keeps running while responses are outstanding.
pub struct ClientRuntime {
    client: Client,
}

impl ClientRuntime {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl AppRuntime for ClientRuntime {
    fn fetch_detail(&mut self, key: &str) -> Result<DetailResponse, RetrievalFailure> {
        self.client.fetch_detail(key)
    }

    fn spawn_detail_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let client = self.client.clone();
        thread::Builder::new()
            .name(format!("detail-{}", ticket.seq.get()))
            .spawn(move || {
                let outcome = client.fetch_detail(&ticket.key);
                if tx
                    .send(InternalEvent::DetailResolved { ticket, outcome })
                    .is_err()
                {
                    debug!("detail result dropped; ui already closed");
                }
            })
            .map_err(|error| anyhow!("spawn detail worker: {error}"))?;
        Ok(())
    }
}

const DEMO_MIN_LATENCY_MS: u64 = 40;
const DEMO_LATENCY_SPREAD_MS: usize = 460;

/// Offline stand-in for the server. Latency varies per request so
/// overlapping lookups can resolve out of order, and a few rows have no
/// detail at all.
pub struct DemoRuntime {
    details: BTreeMap<String, DetailResponse>,
    faker: ResumeFaker,
}

impl DemoRuntime {
    pub fn new(rows: &[ResultRow], seed: u64) -> Self {
        let mut faker = ResumeFaker::new(seed);
        let mut details = BTreeMap::new();
        for row in rows {
            if faker.int_n(8) == 0 {
                continue;
            }
            details.insert(row.filename.clone(), faker.detail_for(row));
        }
        Self { details, faker }
    }

    fn latency(&mut self) -> Duration {
        Duration::from_millis(DEMO_MIN_LATENCY_MS + self.faker.int_n(DEMO_LATENCY_SPREAD_MS) as u64)
    }
}

impl AppRuntime for DemoRuntime {
    fn fetch_detail(&mut self, key: &str) -> Result<DetailResponse, RetrievalFailure> {
        Ok(self
            .details
            .get(key)
            .cloned()
            .unwrap_or_else(not_found_response))
    }

    fn spawn_detail_fetch(&mut self, ticket: FetchTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let outcome = self.fetch_detail(&ticket.key);
        let delay = self.latency();
        thread::spawn(move || {
            thread::sleep(delay);
            let _ = tx.send(InternalEvent::DetailResolved { ticket, outcome });
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientRuntime, DemoRuntime};
    use anyhow::{Result, anyhow};
    use screener_app::{DetailOverlayController, FetchOrdering, RequestSeq};
    use screener_client::{Client, DEFAULT_DETAIL_PATH};
    use screener_testkit::ResumeFaker;
    use screener_tui::{AppRuntime, InternalEvent};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Response, Server};

    fn recv_resolution(rx: &mpsc::Receiver<InternalEvent>) -> Result<InternalEvent> {
        rx.recv_timeout(Duration::from_secs(5))
            .map_err(|error| anyhow!("no resolution: {error}"))
    }

    #[test]
    fn client_runtime_resolves_on_worker_thread() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let addr = format!("http://{}", server.server_addr());
        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            let url = request.url().to_owned();
            request
                .respond(Response::from_string(
                    r#"{"ok": true, "filename": "a.pdf", "email": "a@example.com"}"#,
                ))
                .expect("response should succeed");
            url
        });

        let client = Client::new(&addr, DEFAULT_DETAIL_PATH, Duration::from_secs(2))?;
        let mut runtime = ClientRuntime::new(client);
        let mut controller = DetailOverlayController::new(FetchOrdering::LastResolved);
        let ticket = controller.on_trigger_activated("a.pdf");

        let (tx, rx) = mpsc::channel();
        runtime.spawn_detail_fetch(ticket.clone(), tx)?;

        let InternalEvent::DetailResolved {
            ticket: resolved,
            outcome,
        } = recv_resolution(&rx)?
        else {
            return Err(anyhow!("unexpected event"));
        };
        assert_eq!(resolved, ticket);
        let response = outcome.map_err(|error| anyhow!("{error}"))?;
        assert_eq!(response.email.as_deref(), Some("a@example.com"));

        assert_eq!(handle.join().expect("server thread"), "/api/resume_detail?file=a.pdf");
        Ok(())
    }

    #[test]
    fn demo_runtime_serves_every_known_row_or_rejects() -> Result<()> {
        let rows = ResumeFaker::new(5).ranked_results(24);
        let mut runtime = DemoRuntime::new(&rows, 5);
        let mut rejected = 0;
        for row in &rows {
            let response = runtime
                .fetch_detail(&row.filename)
                .map_err(|error| anyhow!("{error}"))?;
            if response.ok {
                assert_eq!(response.filename.as_deref(), Some(row.filename.as_str()));
            } else {
                rejected += 1;
            }
        }
        assert!(rejected < rows.len());

        let unknown = runtime
            .fetch_detail("nobody.pdf")
            .map_err(|error| anyhow!("{error}"))?;
        assert!(!unknown.ok);
        Ok(())
    }

    #[test]
    fn demo_runtime_resolves_asynchronously() -> Result<()> {
        let rows = ResumeFaker::new(8).ranked_results(3);
        let mut runtime = DemoRuntime::new(&rows, 8);
        let mut controller = DetailOverlayController::new(FetchOrdering::LastResolved);
        let first = controller.on_trigger_activated(&rows[0].filename);
        let second = controller.on_trigger_activated(&rows[1].filename);
        assert_eq!(second.seq, RequestSeq::new(2));

        let (tx, rx) = mpsc::channel();
        runtime.spawn_detail_fetch(first, tx.clone())?;
        runtime.spawn_detail_fetch(second, tx)?;

        let mut seqs = [recv_resolution(&rx)?, recv_resolution(&rx)?]
            .into_iter()
            .map(|event| match event {
                InternalEvent::DetailResolved { ticket, .. } => ticket.seq.get(),
                InternalEvent::ClearNotification { .. } => 0,
            })
            .collect::<Vec<_>>();
        seqs.sort_unstable();
        assert_eq!(seqs, vec![1, 2]);
        Ok(())
    }
}
