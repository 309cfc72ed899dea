// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Shown wherever a detail field is absent.
pub const DETAIL_PLACEHOLDER: &str = "—";
pub const DETAIL_TITLE_FALLBACK: &str = "Resume";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Results,
    About,
}

impl ViewKind {
    pub const ALL: [Self; 2] = [Self::Results, Self::About];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Results => "results",
            Self::About => "about",
        }
    }

    pub const fn toggled(self) -> Self {
        match self {
            Self::Results => Self::About,
            Self::About => Self::Results,
        }
    }
}

/// One ranked resume as produced by a screening run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub filename: String,
    pub score: f64,
    #[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl ResultRow {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.filename)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub generated_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub results: Vec<ResultRow>,
}

impl ResultSet {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailField {
    Filename,
    Email,
    Phone,
    LinkedIn,
    Text,
}

impl DetailField {
    pub const ALL: [Self; 5] = [
        Self::Filename,
        Self::Email,
        Self::Phone,
        Self::LinkedIn,
        Self::Text,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Filename => "file",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::LinkedIn => "linkedin",
            Self::Text => "text",
        }
    }
}

/// Wire shape of the detail lookup endpoint. Everything except `ok` may be
/// missing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DetailResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DetailResponse {
    fn field(&self, field: DetailField) -> Option<&str> {
        let value = match field {
            DetailField::Filename => self.filename.as_deref(),
            DetailField::Email => self.email.as_deref(),
            DetailField::Phone => self.phone.as_deref(),
            DetailField::LinkedIn => self.linkedin.as_deref(),
            DetailField::Text => self.text.as_deref(),
        };
        value.filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalFailure {
    Transport(String),
    Timeout,
    Status(u16),
    Decode(String),
    Rejected(Option<String>),
}

impl fmt::Display for RetrievalFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(reason) => write!(f, "request failed: {reason}"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Status(code) => write!(f, "server returned {code}"),
            Self::Decode(reason) => write!(f, "decode detail response: {reason}"),
            Self::Rejected(Some(reason)) => write!(f, "server rejected lookup: {reason}"),
            Self::Rejected(None) => f.write_str("server rejected lookup"),
        }
    }
}

impl std::error::Error for RetrievalFailure {}

/// A successfully fetched detail payload. A field missing from `fields` is
/// absent, never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub key: String,
    pub fields: BTreeMap<DetailField, String>,
}

impl DetailRecord {
    pub fn from_response(key: &str, response: DetailResponse) -> Result<Self, RetrievalFailure> {
        if !response.ok {
            return Err(RetrievalFailure::Rejected(response.error));
        }

        let fields = DetailField::ALL
            .iter()
            .filter_map(|field| {
                response
                    .field(*field)
                    .map(|value| (*field, value.to_owned()))
            })
            .collect();
        Ok(Self {
            key: key.to_owned(),
            fields,
        })
    }

    pub fn field(&self, field: DetailField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn display(&self, field: DetailField) -> &str {
        self.field(field).unwrap_or(DETAIL_PLACEHOLDER)
    }

    pub fn title(&self) -> &str {
        self.field(DetailField::Filename)
            .unwrap_or(DETAIL_TITLE_FALLBACK)
    }

    pub fn linkedin_href(&self) -> Option<String> {
        self.field(DetailField::LinkedIn).map(|raw| {
            if raw.starts_with("http") {
                raw.to_owned()
            } else {
                format!("https://{raw}")
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DETAIL_PLACEHOLDER, DetailField, DetailRecord, DetailResponse, ResultRow, ResultSet,
        RetrievalFailure, ViewKind,
    };

    #[test]
    fn filename_only_response_fills_placeholders() {
        let response: DetailResponse =
            serde_json::from_str(r#"{"ok": true, "filename": "a.pdf"}"#).expect("valid json");
        let record = DetailRecord::from_response("a.pdf", response).expect("ok response");

        assert_eq!(record.display(DetailField::Filename), "a.pdf");
        for field in [
            DetailField::Email,
            DetailField::Phone,
            DetailField::LinkedIn,
            DetailField::Text,
        ] {
            assert_eq!(record.display(field), DETAIL_PLACEHOLDER, "{field:?}");
        }
        assert_eq!(record.title(), "a.pdf");
        assert!(record.linkedin_href().is_none());
    }

    #[test]
    fn rejected_response_carries_server_message() {
        let response: DetailResponse =
            serde_json::from_str(r#"{"ok": false, "error": "not found"}"#).expect("valid json");
        let error = DetailRecord::from_response("x.pdf", response).expect_err("rejected");
        assert_eq!(
            error,
            RetrievalFailure::Rejected(Some("not found".to_owned()))
        );
        assert!(error.to_string().contains("not found"));
    }

    #[test]
    fn missing_ok_flag_fails_to_decode() {
        let parsed = serde_json::from_str::<DetailResponse>(r#"{"filename": "a.pdf"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn blank_fields_count_as_absent() {
        let record = DetailRecord::from_response(
            "b.pdf",
            DetailResponse {
                ok: true,
                email: Some("   ".to_owned()),
                ..DetailResponse::default()
            },
        )
        .expect("ok response");
        assert_eq!(record.display(DetailField::Email), DETAIL_PLACEHOLDER);
        assert_eq!(record.title(), "Resume");
    }

    #[test]
    fn linkedin_href_gets_scheme_when_missing() {
        let record = DetailRecord::from_response(
            "c.pdf",
            DetailResponse {
                ok: true,
                linkedin: Some("linkedin.com/in/avery".to_owned()),
                ..DetailResponse::default()
            },
        )
        .expect("ok response");
        assert_eq!(
            record.linkedin_href().as_deref(),
            Some("https://linkedin.com/in/avery")
        );

        let record = DetailRecord::from_response(
            "d.pdf",
            DetailResponse {
                ok: true,
                linkedin: Some("http://linkedin.com/in/drew".to_owned()),
                ..DetailResponse::default()
            },
        )
        .expect("ok response");
        assert_eq!(
            record.linkedin_href().as_deref(),
            Some("http://linkedin.com/in/drew")
        );
    }

    #[test]
    fn result_set_parses_optional_header_fields() {
        let set = ResultSet::from_json(
            r#"{"generated_at": "2026-02-19T12:34:56Z", "results": [{"filename": "a.pdf", "score": 0.9, "name": "Avery Walker"}, {"filename": "b.pdf", "score": 0.4}]}"#,
        )
        .expect("valid result set");
        assert!(set.generated_at.is_some());
        assert!(set.job_description.is_none());
        assert_eq!(set.results.len(), 2);
        assert_eq!(set.results[0].label(), "Avery Walker");
        assert_eq!(set.results[1].label(), "b.pdf");
    }

    #[test]
    fn result_row_label_ignores_blank_names() {
        let row = ResultRow {
            filename: "z.pdf".to_owned(),
            score: 0.1,
            display_name: Some(" ".to_owned()),
        };
        assert_eq!(row.label(), "z.pdf");
    }

    #[test]
    fn view_toggle_alternates() {
        assert_eq!(ViewKind::Results.toggled(), ViewKind::About);
        assert_eq!(ViewKind::About.toggled(), ViewKind::Results);
    }
}
