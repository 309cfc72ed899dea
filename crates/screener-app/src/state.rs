// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{
    ClickTarget, DEFAULT_NOTIFICATION_DURATION, DetailOutcome, DetailOverlayController,
    DetailResponse, DismissTrigger, FetchOrdering, FetchTicket, ListTruncationController,
    Notification, NotificationKind, NotificationToken, Notifier, RequestSeq, ResultRow,
    RetrievalFailure, RowHandle, TruncationState, ViewKind,
};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppSettings {
    pub initial_top_n: String,
    pub ordering: FetchOrdering,
    pub notification_duration: Duration,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            initial_top_n: String::new(),
            ordering: FetchOrdering::default(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub view: ViewKind,
    pub truncation: ListTruncationController,
    pub overlay: DetailOverlayController,
    pub notifier: Notifier,
    pub selected: Option<usize>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Vec::new(), &AppSettings::default())
    }
}

/// Named interaction events. Terminal input is translated into these before it
/// reaches any controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    NumericInputChanged(String),
    DetailTriggerActivated(String),
    ActivateSelected,
    DetailResolved {
        ticket: FetchTicket,
        outcome: Result<DetailResponse, RetrievalFailure>,
    },
    DismissRequested(DismissTrigger),
    OverlayClicked(ClickTarget),
    MoveSelection(isize),
    SelectRow(usize),
    ToggleView,
    Notify {
        message: String,
        kind: NotificationKind,
    },
    ExpireNotification(NotificationToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    VisibilityChanged(TruncationState),
    SelectionChanged(Option<usize>),
    FetchRequested(FetchTicket),
    OverlayOpened { key: String },
    OverlayClosed,
    ResolutionDiscarded(RequestSeq),
    Notified(Notification),
    NotificationExpired(NotificationToken),
    ViewChanged(ViewKind),
}

impl AppState {
    pub fn new(rows: Vec<ResultRow>, settings: &AppSettings) -> Self {
        let truncation = ListTruncationController::with_input(rows, &settings.initial_top_n);
        let selected = (truncation.visible_count() > 0).then_some(0);
        Self {
            view: ViewKind::Results,
            truncation,
            overlay: DetailOverlayController::new(settings.ordering),
            notifier: Notifier::new(settings.notification_duration),
            selected,
        }
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::NumericInputChanged(raw) => {
                let state = self.truncation.on_input_changed(&raw);
                let mut events = vec![AppEvent::VisibilityChanged(state)];
                events.extend(self.clamp_selection());
                events
            }
            AppCommand::DetailTriggerActivated(key) => {
                let ticket = self.overlay.on_trigger_activated(&key);
                vec![AppEvent::FetchRequested(ticket)]
            }
            AppCommand::ActivateSelected => {
                let key = self
                    .selected_row()
                    .map(|row| row.row.filename.clone());
                match key {
                    Some(key) => self.dispatch(AppCommand::DetailTriggerActivated(key)),
                    None => vec![self.notify("no row selected", NotificationKind::Info)],
                }
            }
            AppCommand::DetailResolved { ticket, outcome } => {
                match self.overlay.on_fetch_resolved(&ticket, outcome) {
                    DetailOutcome::Opened => vec![AppEvent::OverlayOpened { key: ticket.key }],
                    DetailOutcome::Failed { message } => {
                        vec![self.notify(message, NotificationKind::Error)]
                    }
                    DetailOutcome::Discarded => vec![AppEvent::ResolutionDiscarded(ticket.seq)],
                }
            }
            AppCommand::DismissRequested(trigger) => {
                if self.overlay.dismiss(trigger) {
                    vec![AppEvent::OverlayClosed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::OverlayClicked(target) => {
                if self.overlay.on_overlay_click(target) {
                    vec![AppEvent::OverlayClosed]
                } else {
                    Vec::new()
                }
            }
            AppCommand::MoveSelection(delta) => self.move_selection(delta),
            AppCommand::SelectRow(ordinal) => {
                if ordinal < self.truncation.visible_count() && self.selected != Some(ordinal) {
                    self.selected = Some(ordinal);
                    vec![AppEvent::SelectionChanged(self.selected)]
                } else {
                    Vec::new()
                }
            }
            AppCommand::ToggleView => {
                self.view = self.view.toggled();
                vec![AppEvent::ViewChanged(self.view)]
            }
            AppCommand::Notify { message, kind } => vec![self.notify(message, kind)],
            AppCommand::ExpireNotification(token) => {
                if self.notifier.expire(token) {
                    vec![AppEvent::NotificationExpired(token)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    pub fn selected_row(&self) -> Option<&RowHandle> {
        self.selected
            .and_then(|ordinal| self.truncation.row(ordinal))
            .filter(|row| row.visible)
    }

    fn move_selection(&mut self, delta: isize) -> Vec<AppEvent> {
        let visible = self.truncation.visible_count();
        if visible == 0 {
            return Vec::new();
        }
        let current = self.selected.unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, visible as isize - 1) as usize;
        if self.selected == Some(next) {
            return Vec::new();
        }
        self.selected = Some(next);
        vec![AppEvent::SelectionChanged(self.selected)]
    }

    fn clamp_selection(&mut self) -> Option<AppEvent> {
        let visible = self.truncation.visible_count();
        let clamped = match self.selected {
            _ if visible == 0 => None,
            Some(ordinal) if ordinal >= visible => Some(visible - 1),
            Some(ordinal) => Some(ordinal),
            None => Some(0),
        };
        if clamped == self.selected {
            return None;
        }
        self.selected = clamped;
        Some(AppEvent::SelectionChanged(clamped))
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) -> AppEvent {
        AppEvent::Notified(self.notifier.notify(message, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppCommand, AppEvent, AppSettings, AppState};
    use crate::{
        ClickTarget, DETAIL_PLACEHOLDER, DetailField, DetailResponse, DismissTrigger,
        FetchOrdering, FetchTicket, NotificationKind, OverlayState, ResultRow, ViewKind,
    };

    fn rows(count: usize) -> Vec<ResultRow> {
        (0..count)
            .map(|index| ResultRow {
                filename: format!("cv-{index}.pdf"),
                score: 0.9 - (index as f64) * 0.1,
                display_name: None,
            })
            .collect()
    }

    fn state_with_rows(count: usize) -> AppState {
        AppState::new(rows(count), &AppSettings::default())
    }

    fn issue(state: &mut AppState, key: &str) -> FetchTicket {
        let events = state.dispatch(AppCommand::DetailTriggerActivated(key.to_owned()));
        match events.as_slice() {
            [AppEvent::FetchRequested(ticket)] => ticket.clone(),
            other => panic!("expected fetch request, got {other:?}"),
        }
    }

    fn resolve_ok(state: &mut AppState, ticket: FetchTicket, filename: &str) -> Vec<AppEvent> {
        state.dispatch(AppCommand::DetailResolved {
            ticket,
            outcome: Ok(DetailResponse {
                ok: true,
                filename: Some(filename.to_owned()),
                ..DetailResponse::default()
            }),
        })
    }

    fn open_key(state: &AppState) -> Option<&str> {
        state
            .overlay
            .state()
            .record()
            .map(|record| record.key.as_str())
    }

    #[test]
    fn initial_top_n_is_applied_at_construction() {
        let settings = AppSettings {
            initial_top_n: "2".to_owned(),
            ..AppSettings::default()
        };
        let state = AppState::new(rows(5), &settings);
        assert_eq!(state.truncation.visible_count(), 2);
        assert_eq!(state.selected, Some(0));
    }

    #[test]
    fn shrinking_top_n_clamps_selection() {
        let mut state = state_with_rows(5);
        state.dispatch(AppCommand::MoveSelection(4));
        assert_eq!(state.selected, Some(4));

        let events = state.dispatch(AppCommand::NumericInputChanged("2".to_owned()));
        assert_eq!(state.selected, Some(1));
        assert!(events.contains(&AppEvent::SelectionChanged(Some(1))));
        assert!(matches!(events[0], AppEvent::VisibilityChanged(_)));
    }

    #[test]
    fn selection_stays_within_visible_rows() {
        let mut state = state_with_rows(3);
        state.dispatch(AppCommand::MoveSelection(-5));
        assert_eq!(state.selected, Some(0));
        state.dispatch(AppCommand::MoveSelection(10));
        assert_eq!(state.selected, Some(2));
        assert!(state.dispatch(AppCommand::SelectRow(7)).is_empty());
    }

    #[test]
    fn empty_result_set_has_no_selection() {
        let mut state = AppState::default();
        assert_eq!(state.selected, None);
        let events = state.dispatch(AppCommand::ActivateSelected);
        assert!(matches!(events.as_slice(), [AppEvent::Notified(_)]));
        assert!(!state.overlay.is_loading());
    }

    #[test]
    fn activate_selected_requests_detail_for_row_key() {
        let mut state = state_with_rows(3);
        state.dispatch(AppCommand::MoveSelection(1));
        let events = state.dispatch(AppCommand::ActivateSelected);
        match events.as_slice() {
            [AppEvent::FetchRequested(ticket)] => assert_eq!(ticket.key, "cv-1.pdf"),
            other => panic!("unexpected events {other:?}"),
        }
        assert!(state.overlay.is_loading());
    }

    #[test]
    fn filename_only_success_opens_overlay() {
        let mut state = state_with_rows(1);
        let ticket = issue(&mut state, "a.pdf");
        let events = resolve_ok(&mut state, ticket, "a.pdf");
        assert_eq!(
            events,
            vec![AppEvent::OverlayOpened {
                key: "a.pdf".to_owned()
            }]
        );
        let record = state.overlay.state().record().expect("open overlay");
        assert_eq!(record.display(DetailField::Filename), "a.pdf");
        assert_eq!(record.display(DetailField::Email), DETAIL_PLACEHOLDER);
        assert_eq!(record.display(DetailField::Text), DETAIL_PLACEHOLDER);
    }

    #[test]
    fn rejected_lookup_notifies_error_and_keeps_state() {
        let mut state = state_with_rows(1);
        let ticket = issue(&mut state, "missing.pdf");
        let events = state.dispatch(AppCommand::DetailResolved {
            ticket,
            outcome: Ok(DetailResponse {
                ok: false,
                error: Some("not found".to_owned()),
                ..DetailResponse::default()
            }),
        });
        match events.as_slice() {
            [AppEvent::Notified(note)] => {
                assert_eq!(note.kind, NotificationKind::Error);
                assert_eq!(note.message, "unable to load resume detail");
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert_eq!(state.overlay.state(), &OverlayState::Closed);
    }

    #[test]
    fn dismissal_triggers_converge_on_close() {
        for command in [
            AppCommand::DismissRequested(DismissTrigger::CloseControl),
            AppCommand::DismissRequested(DismissTrigger::Escape),
            AppCommand::OverlayClicked(ClickTarget::Backdrop),
        ] {
            let mut state = state_with_rows(1);
            let ticket = issue(&mut state, "a.pdf");
            resolve_ok(&mut state, ticket, "a.pdf");

            assert!(
                state
                    .dispatch(AppCommand::OverlayClicked(ClickTarget::Content))
                    .is_empty()
            );
            assert!(state.overlay.is_open());

            assert_eq!(state.dispatch(command.clone()), vec![AppEvent::OverlayClosed]);
            assert!(!state.overlay.is_open());
            assert!(state.dispatch(command).is_empty());
        }
    }

    #[test]
    fn last_resolved_fetch_wins_race() {
        let mut state = state_with_rows(2);
        let x = issue(&mut state, "x");
        let y = issue(&mut state, "y");

        resolve_ok(&mut state, y, "y");
        assert_eq!(open_key(&state), Some("y"));
        resolve_ok(&mut state, x, "x");
        assert_eq!(open_key(&state), Some("x"));
    }

    #[test]
    fn sequenced_settings_discard_superseded_fetch() {
        let settings = AppSettings {
            ordering: FetchOrdering::Sequenced,
            ..AppSettings::default()
        };
        let mut state = AppState::new(rows(2), &settings);
        let x = issue(&mut state, "x");
        let y = issue(&mut state, "y");
        resolve_ok(&mut state, y, "y");
        let x_seq = x.seq;
        let events = resolve_ok(&mut state, x, "x");
        assert_eq!(events, vec![AppEvent::ResolutionDiscarded(x_seq)]);
        assert_eq!(open_key(&state), Some("y"));
    }

    #[test]
    fn notification_expiry_matches_token() {
        let mut state = AppState::default();
        let events = state.dispatch(AppCommand::Notify {
            message: "saved".to_owned(),
            kind: NotificationKind::Info,
        });
        let token = match events.as_slice() {
            [AppEvent::Notified(note)] => note.token,
            other => panic!("unexpected events {other:?}"),
        };
        assert_eq!(
            state.dispatch(AppCommand::ExpireNotification(token)),
            vec![AppEvent::NotificationExpired(token)]
        );
        assert!(state.notifier.current().is_none());
    }

    #[test]
    fn toggle_view_alternates() {
        let mut state = AppState::default();
        assert_eq!(
            state.dispatch(AppCommand::ToggleView),
            vec![AppEvent::ViewChanged(ViewKind::About)]
        );
        state.dispatch(AppCommand::ToggleView);
        assert_eq!(state.view, ViewKind::Results);
    }
}
