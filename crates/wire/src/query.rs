// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Slipway Contributors

//! Container index query encoding.
//!
//! Filters are a conjunction: every parameter present must match. The
//! attempt path travels as a JSON-encoded integer array.

use slipway_core::Attempt;

use crate::error::ProtocolError;

/// Conjunctive filter over the container index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerFilter {
    pub build_id: Option<u64>,
    pub pipeline_name: Option<String>,
    pub job_name: Option<String>,
    pub build_name: Option<String>,
    pub step_name: Option<String>,
    pub step_type: Option<String>,
    pub resource_name: Option<String>,
    pub attempt: Option<Attempt>,
}

impl ContainerFilter {
    /// Render as a URL query string (no leading `?`). Empty filter
    /// renders empty.
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();
        if let Some(id) = self.build_id {
            pairs.push(("build-id", id.to_string()));
        }
        if let Some(v) = &self.pipeline_name {
            pairs.push(("pipeline_name", v.clone()));
        }
        if let Some(v) = &self.job_name {
            pairs.push(("job_name", v.clone()));
        }
        if let Some(v) = &self.build_name {
            pairs.push(("build_name", v.clone()));
        }
        if let Some(v) = &self.step_name {
            pairs.push(("step_name", v.clone()));
        }
        if let Some(v) = &self.step_type {
            pairs.push(("type", v.clone()));
        }
        if let Some(v) = &self.resource_name {
            pairs.push(("resource_name", v.clone()));
        }
        if let Some(attempt) = &self.attempt {
            // JSON integer array, e.g. [1,1,2]
            let json = serde_json::to_string(&attempt.0).unwrap_or_default();
            pairs.push(("attempt", json));
        }
        pairs
            .iter()
            .map(|(k, v)| format!("{}={}", k, percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse a query string produced by [`Self::to_query_string`].
    pub fn from_query_string(query: &str) -> Result<Self, ProtocolError> {
        let mut filter = Self::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, raw) = pair.split_once('=').unwrap_or((pair, ""));
            let value = percent_decode(raw)
                .ok_or_else(|| ProtocolError::MalformedEvent(format!("bad escape in {}", pair)))?;
            match key {
                "build-id" => {
                    let id = value.parse().map_err(|_| {
                        ProtocolError::MalformedEvent(format!("bad build-id {}", value))
                    })?;
                    filter.build_id = Some(id);
                }
                "pipeline_name" => filter.pipeline_name = Some(value),
                "job_name" => filter.job_name = Some(value),
                "build_name" => filter.build_name = Some(value),
                "step_name" => filter.step_name = Some(value),
                "type" => filter.step_type = Some(value),
                "resource_name" => filter.resource_name = Some(value),
                "attempt" => {
                    let path: Vec<u32> = serde_json::from_str(&value)?;
                    filter.attempt = Some(Attempt(path));
                }
                // Conjunctive contract: an unknown filter key cannot be
                // honored, so it is a protocol violation rather than a
                // silently widened match.
                other => {
                    return Err(ProtocolError::MalformedEvent(format!(
                        "unknown filter key {}",
                        other
                    )))
                }
            }
        }
        Ok(filter)
    }

    /// True when a matching container must belong to this record's build.
    pub fn matches(&self, record: &slipway_core::ContainerRecord) -> bool {
        self.build_id.map_or(true, |id| record.build_id == id)
            && matches_str(&self.pipeline_name, &record.pipeline_name)
            && matches_str(&self.job_name, &record.job_name)
            && matches_str(&self.build_name, &record.build_name)
            && matches_str(&self.step_name, &record.step_name)
            && self
                .step_type
                .as_ref()
                .map_or(true, |t| record.step_type.to_string() == *t)
            && self.resource_name.as_ref().map_or(true, |r| {
                record.resource_name.as_deref() == Some(r.as_str())
            })
            && self.attempt.as_ref().map_or(true, |a| record.attempt == *a)
    }
}

fn matches_str(filter: &Option<String>, value: &str) -> bool {
    filter.as_ref().map_or(true, |f| f == value)
}

fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

fn percent_decode(s: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(s.len());
    let raw = s.as_bytes();
    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            b'%' => {
                let hex = raw.get(i + 1..i + 3)?;
                let hex = std::str::from_utf8(hex).ok()?;
                bytes.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            }
            b'+' => {
                bytes.push(b' ');
                i += 1;
            }
            b => {
                bytes.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
#[path = "query_tests.rs"]
mod tests;
