//! Boundary decoding of protocol response payloads.
//!
//! Responses arrive as raw JSON. Every shape-tolerant branch lives here, so
//! the render paths only ever see one normalized form per response kind.
//! Hover contents in particular collapse from
//! string / markup object / marked string / array / null into a single
//! `{ text, is_markup }` value before any rendering logic runs.

use serde::Deserialize;
use serde_json::Value;
use tether_core::Range;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
  #[error("response payload missing params")]
  MissingParams,
  #[error("unrecognized response shape")]
  InvalidShape,
  #[error("response decode failed: {0}")]
  Decode(#[from] serde_json::Error),
}

// --- Hover ---

/// Hover contents resolved to a single renderable value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverInfo {
  pub text:      String,
  pub is_markup: bool,
  /// Range the hover applies to, when the server reports one. Used to
  /// re-validate the response against the pointer position at render time.
  pub range:     Option<Range>,
}

pub fn parse_hover(result: &Value) -> Result<Option<HoverInfo>, DecodeError> {
  if result.is_null() {
    return Ok(None);
  }
  let contents = result.get("contents").ok_or(DecodeError::InvalidShape)?;
  let Some((text, is_markup)) = normalize_contents(contents) else {
    return Ok(None);
  };
  let range = match result.get("range") {
    Some(value) if !value.is_null() => Some(serde_json::from_value(value.clone())?),
    _ => None,
  };
  Ok(Some(HoverInfo {
    text,
    is_markup,
    range,
  }))
}

fn normalize_contents(value: &Value) -> Option<(String, bool)> {
  if let Some(text) = value.as_str() {
    if text.trim().is_empty() {
      return None;
    }
    return Some((text.to_string(), false));
  }

  if let Some(parts) = value.as_array() {
    let mut texts = Vec::new();
    let mut is_markup = false;
    for part in parts.iter().filter_map(normalize_contents_ref) {
      is_markup |= part.1;
      texts.push(part.0);
    }
    if texts.is_empty() {
      return None;
    }
    return Some((texts.join("\n\n"), is_markup));
  }

  let object = value.as_object()?;
  let text = object.get("value").and_then(Value::as_str)?;
  if text.trim().is_empty() {
    return None;
  }
  if let Some(language) = object.get("language").and_then(Value::as_str) {
    // MarkedString: keep the language context via a fenced block.
    return Some((format!("```{language}\n{text}\n```"), true));
  }
  let is_markup = object
    .get("kind")
    .and_then(Value::as_str)
    .is_some_and(|kind| kind.eq_ignore_ascii_case("markdown"));
  Some((text.to_string(), is_markup))
}

fn normalize_contents_ref(value: &Value) -> Option<(String, bool)> {
  normalize_contents(value)
}

// --- Completion ---

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionCandidate {
  pub label:       String,
  #[serde(default)]
  pub filter_text: Option<String>,
  #[serde(default)]
  pub insert_text: Option<String>,
  #[serde(default)]
  pub detail:      Option<String>,
  #[serde(default)]
  pub kind:        Option<u32>,
}

impl tether_core::ranking::Candidate for CompletionCandidate {
  fn label(&self) -> &str {
    &self.label
  }

  fn filter_text(&self) -> Option<&str> {
    self.filter_text.as_deref()
  }
}

pub fn parse_completions(result: &Value) -> Result<Vec<CompletionCandidate>, DecodeError> {
  if result.is_null() {
    return Ok(Vec::new());
  }

  if result.is_array() {
    return Ok(serde_json::from_value(result.clone())?);
  }

  if let Some(items) = result.get("items") {
    return Ok(serde_json::from_value(items.clone())?);
  }

  Err(DecodeError::InvalidShape)
}

// --- Signature help ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureInfo {
  pub label:              String,
  pub documentation:      Option<String>,
  /// Byte range of the active parameter inside `label`, for highlighting.
  pub active_param_range: Option<(usize, usize)>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureHelpPayload {
  #[serde(default)]
  signatures:       Vec<SignaturePayload>,
  active_signature: Option<u32>,
  active_parameter: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignaturePayload {
  label:            String,
  #[serde(default)]
  documentation:    Option<DocumentationPayload>,
  #[serde(default)]
  parameters:       Option<Vec<ParameterPayload>>,
  active_parameter: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentationPayload {
  Plain(String),
  Markup { value: String },
}

#[derive(Debug, Deserialize)]
struct ParameterPayload {
  label: ParameterLabelPayload,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ParameterLabelPayload {
  Simple(String),
  Offsets([u32; 2]),
}

pub fn parse_signature_help(result: &Value) -> Result<Option<SignatureInfo>, DecodeError> {
  if result.is_null() {
    return Ok(None);
  }

  let payload: SignatureHelpPayload = serde_json::from_value(result.clone())?;
  if payload.signatures.is_empty() {
    return Ok(None);
  }

  let index = payload
    .active_signature
    .map(|index| index as usize)
    .filter(|index| *index < payload.signatures.len())
    .unwrap_or(0);
  let signature = &payload.signatures[index];

  let active_param_range = active_param_range(signature, payload.active_parameter);

  let documentation = signature.documentation.as_ref().map(|doc| {
    match doc {
      DocumentationPayload::Plain(value) | DocumentationPayload::Markup { value } => value.clone(),
    }
  });

  Ok(Some(SignatureInfo {
    label: signature.label.clone(),
    documentation,
    active_param_range,
  }))
}

/// Byte range of the active parameter inside the signature label.
fn active_param_range(
  signature: &SignaturePayload,
  response_active_parameter: Option<u32>,
) -> Option<(usize, usize)> {
  let param_idx = signature
    .active_parameter
    .or(response_active_parameter)
    .unwrap_or(0) as usize;

  let param = signature.parameters.as_ref()?.get(param_idx)?;

  match &param.label {
    ParameterLabelPayload::Simple(text) => {
      let start = signature.label.find(text.as_str())?;
      Some((start, start + text.len()))
    },
    ParameterLabelPayload::Offsets([start, end]) => {
      // The wire carries UTF-16 offsets; map them to byte offsets.
      let from = signature
        .label
        .char_indices()
        .nth(*start as usize)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
      let to = signature
        .label
        .char_indices()
        .nth(*end as usize)
        .map(|(idx, _)| idx)
        .unwrap_or(signature.label.len());
      Some((from, to))
    },
  }
}

// --- Navigation ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
  pub uri:   String,
  pub range: Range,
}

#[derive(Debug, Deserialize)]
struct LocationPayload {
  uri:   String,
  range: Range,
}

impl LocationPayload {
  fn into_location(self) -> Location {
    Location {
      uri:   self.uri,
      range: self.range,
    }
  }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LocationLinkPayload {
  target_uri:             String,
  #[serde(default)]
  target_selection_range: Option<Range>,
  #[serde(default)]
  target_range:           Option<Range>,
}

impl LocationLinkPayload {
  fn into_location(self) -> Option<Location> {
    let range = self.target_selection_range.or(self.target_range)?;
    Some(Location {
      uri: self.target_uri,
      range,
    })
  }
}

pub fn parse_locations(result: &Value) -> Result<Vec<Location>, DecodeError> {
  if result.is_null() {
    return Ok(Vec::new());
  }

  if let Ok(location) = serde_json::from_value::<LocationPayload>(result.clone()) {
    return Ok(vec![location.into_location()]);
  }

  if let Ok(locations) = serde_json::from_value::<Vec<LocationPayload>>(result.clone()) {
    return Ok(
      locations
        .into_iter()
        .map(LocationPayload::into_location)
        .collect(),
    );
  }

  if let Ok(links) = serde_json::from_value::<Vec<LocationLinkPayload>>(result.clone()) {
    return Ok(
      links
        .into_iter()
        .filter_map(LocationLinkPayload::into_location)
        .collect(),
    );
  }

  Err(DecodeError::InvalidShape)
}

// --- Diagnostics ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
  Error,
  Warning,
  Information,
  Hint,
}

impl Severity {
  pub fn from_code(code: u8) -> Option<Self> {
    match code {
      1 => Some(Self::Error),
      2 => Some(Self::Warning),
      3 => Some(Self::Information),
      4 => Some(Self::Hint),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
  pub range:    Range,
  pub severity: Option<Severity>,
  pub source:   Option<String>,
  pub message:  String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedDiagnostics {
  pub uri:         String,
  pub version:     Option<i32>,
  pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishDiagnosticsPayload {
  uri:         String,
  version:     Option<i32>,
  #[serde(default)]
  diagnostics: Vec<DiagnosticPayload>,
}

#[derive(Debug, Deserialize)]
struct DiagnosticPayload {
  range:    Range,
  severity: Option<u8>,
  source:   Option<String>,
  message:  String,
}

impl DiagnosticPayload {
  fn into_diagnostic(self) -> Diagnostic {
    Diagnostic {
      range:    self.range,
      severity: self.severity.and_then(Severity::from_code),
      source:   self.source,
      message:  self.message,
    }
  }
}

pub fn parse_publish_diagnostics(
  params: Option<&Value>,
) -> Result<PublishedDiagnostics, DecodeError> {
  let Some(params) = params else {
    return Err(DecodeError::MissingParams);
  };
  let payload: PublishDiagnosticsPayload = serde_json::from_value(params.clone())?;
  Ok(PublishedDiagnostics {
    uri:         payload.uri,
    version:     payload.version,
    diagnostics: payload
      .diagnostics
      .into_iter()
      .map(DiagnosticPayload::into_diagnostic)
      .collect(),
  })
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use tether_core::Position;

  use super::*;

  #[test]
  fn hover_plain_string_contents() {
    let hover = parse_hover(&json!({ "contents": "a plain string" }))
      .expect("valid hover")
      .expect("present");
    assert_eq!(hover.text, "a plain string");
    assert!(!hover.is_markup);
    assert!(hover.range.is_none());
  }

  #[test]
  fn hover_markup_object_with_range() {
    let hover = parse_hover(&json!({
      "contents": { "kind": "markdown", "value": "**bold**" },
      "range": {
        "start": { "line": 1, "character": 2 },
        "end": { "line": 1, "character": 5 }
      }
    }))
    .expect("valid hover")
    .expect("present");
    assert!(hover.is_markup);
    assert_eq!(
      hover.range,
      Some(Range::new(Position::new(1, 2), Position::new(1, 5)))
    );
  }

  #[test]
  fn hover_marked_string_becomes_fenced_markup() {
    let hover = parse_hover(&json!({
      "contents": { "language": "rust", "value": "fn main()" }
    }))
    .expect("valid hover")
    .expect("present");
    assert_eq!(hover.text, "```rust\nfn main()\n```");
    assert!(hover.is_markup);
  }

  #[test]
  fn hover_array_joins_parts() {
    let hover = parse_hover(&json!({
      "contents": ["first", { "kind": "markdown", "value": "second" }]
    }))
    .expect("valid hover")
    .expect("present");
    assert_eq!(hover.text, "first\n\nsecond");
    assert!(hover.is_markup);
  }

  #[test]
  fn hover_null_and_empty_degrade_to_none() {
    assert!(parse_hover(&Value::Null).expect("valid").is_none());
    assert!(
      parse_hover(&json!({ "contents": "  " }))
        .expect("valid")
        .is_none()
    );
    assert!(parse_hover(&json!({ "contents": [] })).expect("valid").is_none());
  }

  #[test]
  fn completions_from_bare_array_and_list() {
    let bare = parse_completions(&json!([
      { "label": "len", "kind": 2 },
      { "label": "map", "filterText": "map" }
    ]))
    .expect("valid completions");
    assert_eq!(bare.len(), 2);
    assert_eq!(bare[1].filter_text.as_deref(), Some("map"));

    let listed = parse_completions(&json!({
      "isIncomplete": false,
      "items": [{ "label": "push" }]
    }))
    .expect("valid completions");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].label, "push");

    assert!(parse_completions(&Value::Null).expect("valid").is_empty());
  }

  #[test]
  fn signature_active_param_by_simple_label() {
    let info = parse_signature_help(&json!({
      "signatures": [{
        "label": "fn get(index: usize) -> T",
        "parameters": [{ "label": "index: usize" }]
      }],
      "activeParameter": 0
    }))
    .expect("valid signature")
    .expect("present");
    assert_eq!(info.active_param_range, Some((7, 19)));
  }

  #[test]
  fn signature_active_param_by_offsets() {
    let info = parse_signature_help(&json!({
      "signatures": [{
        "label": "get(a, b)",
        "parameters": [
          { "label": [4, 5] },
          { "label": [7, 8] }
        ]
      }],
      "activeParameter": 1
    }))
    .expect("valid signature")
    .expect("present");
    assert_eq!(info.active_param_range, Some((7, 8)));
  }

  #[test]
  fn signature_empty_list_is_none() {
    assert!(
      parse_signature_help(&json!({ "signatures": [] }))
        .expect("valid")
        .is_none()
    );
    assert!(parse_signature_help(&Value::Null).expect("valid").is_none());
  }

  #[test]
  fn locations_single_array_and_links() {
    let range = json!({
      "start": { "line": 0, "character": 1 },
      "end": { "line": 0, "character": 4 }
    });

    let single =
      parse_locations(&json!({ "uri": "file:///a.rs", "range": range })).expect("valid");
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].uri, "file:///a.rs");

    let many = parse_locations(&json!([
      { "uri": "file:///a.rs", "range": range },
      { "uri": "file:///b.rs", "range": range }
    ]))
    .expect("valid");
    assert_eq!(many.len(), 2);

    let links = parse_locations(&json!([{
      "targetUri": "file:///c.rs",
      "targetSelectionRange": range,
      "targetRange": range
    }]))
    .expect("valid");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].uri, "file:///c.rs");

    assert!(parse_locations(&Value::Null).expect("valid").is_empty());
  }

  #[test]
  fn publish_diagnostics_payload() {
    let params = json!({
      "uri": "file:///tmp/a.rs",
      "version": 4,
      "diagnostics": [{
        "range": {
          "start": { "line": 1, "character": 0 },
          "end": { "line": 1, "character": 3 }
        },
        "severity": 2,
        "source": "rustc",
        "message": "unused variable"
      }]
    });

    let published = parse_publish_diagnostics(Some(&params)).expect("valid diagnostics");
    assert_eq!(published.uri, "file:///tmp/a.rs");
    assert_eq!(published.version, Some(4));
    assert_eq!(published.diagnostics.len(), 1);
    assert_eq!(published.diagnostics[0].severity, Some(Severity::Warning));
    assert_eq!(published.diagnostics[0].source.as_deref(), Some("rustc"));

    assert!(matches!(
      parse_publish_diagnostics(None),
      Err(DecodeError::MissingParams)
    ));
  }
}
