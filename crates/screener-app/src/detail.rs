// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{DetailRecord, DetailResponse, RequestSeq, RetrievalFailure};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

pub const RETRIEVAL_FAILURE_MESSAGE: &str = "unable to load resume detail";

/// How resolutions that arrive out of order are treated.
///
/// `LastResolved` keeps the historical behavior: whichever response lands last
/// wins, and a response that lands after the overlay was dismissed still opens
/// it. `Sequenced` drops responses older than the one on screen and responses
/// for requests issued before the latest dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrdering {
    #[default]
    LastResolved,
    Sequenced,
}

impl FetchOrdering {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::LastResolved => "last-resolved",
            Self::Sequenced => "sequenced",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "last-resolved" => Some(Self::LastResolved),
            "sequenced" => Some(Self::Sequenced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: RequestSeq,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OverlayState {
    #[default]
    Closed,
    Open(DetailRecord),
}

impl OverlayState {
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub const fn record(&self) -> Option<&DetailRecord> {
        match self {
            Self::Open(record) => Some(record),
            Self::Closed => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CloseControl,
    Backdrop,
    Escape,
}

impl DismissTrigger {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CloseControl => "close control",
            Self::Backdrop => "backdrop",
            Self::Escape => "escape",
        }
    }
}

/// Where a pointer press landed while the overlay is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Backdrop,
    Content,
    CloseControl,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    Opened,
    Failed { message: String },
    Discarded,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailOverlayController {
    state: OverlayState,
    ordering: FetchOrdering,
    last_issued: RequestSeq,
    last_applied: RequestSeq,
    dismissed_through: RequestSeq,
    in_flight: BTreeSet<RequestSeq>,
}

impl DetailOverlayController {
    pub fn new(ordering: FetchOrdering) -> Self {
        Self {
            ordering,
            ..Self::default()
        }
    }

    pub const fn state(&self) -> &OverlayState {
        &self.state
    }

    pub const fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Registers one outbound lookup. Every activation gets its own ticket,
    /// identical keys included.
    pub fn on_trigger_activated(&mut self, key: &str) -> FetchTicket {
        self.last_issued = self.last_issued.next();
        self.in_flight.insert(self.last_issued);
        debug!(seq = self.last_issued.get(), key, "detail lookup issued");
        FetchTicket {
            seq: self.last_issued,
            key: key.to_owned(),
        }
    }

    pub fn on_fetch_resolved(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<DetailResponse, RetrievalFailure>,
    ) -> DetailOutcome {
        self.in_flight.remove(&ticket.seq);

        if self.is_stale(ticket.seq) {
            debug!(
                seq = ticket.seq.get(),
                key = ticket.key.as_str(),
                "stale detail response dropped"
            );
            return DetailOutcome::Discarded;
        }

        let record = outcome.and_then(|response| DetailRecord::from_response(&ticket.key, response));
        match record {
            Ok(record) => {
                info!(seq = ticket.seq.get(), key = ticket.key.as_str(), "detail overlay opened");
                self.state = OverlayState::Open(record);
                self.last_applied = ticket.seq;
                DetailOutcome::Opened
            }
            Err(error) => {
                warn!(
                    seq = ticket.seq.get(),
                    key = ticket.key.as_str(),
                    %error,
                    "detail lookup failed"
                );
                DetailOutcome::Failed {
                    message: RETRIEVAL_FAILURE_MESSAGE.to_owned(),
                }
            }
        }
    }

    fn is_stale(&self, seq: RequestSeq) -> bool {
        match self.ordering {
            FetchOrdering::LastResolved => false,
            FetchOrdering::Sequenced => seq < self.last_applied || seq <= self.dismissed_through,
        }
    }

    /// Returns whether the overlay was open. Closing a closed overlay is a
    /// no-op, so lookups still in flight are unaffected by it.
    pub fn close(&mut self) -> bool {
        if !self.state.is_open() {
            return false;
        }
        self.dismissed_through = self.last_issued;
        self.state = OverlayState::Closed;
        info!("detail overlay closed");
        true
    }

    pub fn dismiss(&mut self, trigger: DismissTrigger) -> bool {
        debug!(trigger = trigger.label(), "dismiss requested");
        self.close()
    }

    pub fn on_overlay_click(&mut self, target: ClickTarget) -> bool {
        match target {
            ClickTarget::Backdrop => self.dismiss(DismissTrigger::Backdrop),
            ClickTarget::CloseControl => self.dismiss(DismissTrigger::CloseControl),
            ClickTarget::Content => false,
        }
    }
}
