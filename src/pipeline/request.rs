//! Request surface of the edit pipeline.

use bytes::Bytes;
use serde::Deserialize;

use crate::edits::EditSet;
use crate::error::EditError;
use crate::imaging::OutputFormat;

/// One edit request: the original image plus what to do with it.
#[derive(Debug, Clone)]
pub struct ImageRequest {
    pub original: Bytes,
    pub edits: Option<EditSet>,
    pub output_format: Option<OutputFormat>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestBody {
    #[serde(default)]
    edits: Option<EditSet>,
    #[serde(default)]
    output_format: Option<OutputFormat>,
}

impl ImageRequest {
    pub fn new(original: impl Into<Bytes>) -> Self {
        Self {
            original: original.into(),
            edits: None,
            output_format: None,
        }
    }

    /// Build a request from the original bytes and a JSON body of the form
    /// `{"edits": {...}, "outputFormat": "webp"}`. Both keys are optional.
    pub fn from_json(original: impl Into<Bytes>, body: &str) -> Result<Self, EditError> {
        let body: RequestBody = serde_json::from_str(body)
            .map_err(|e| EditError::invalid_param("request", e.to_string()))?;

        Ok(Self {
            original: original.into(),
            edits: body.edits,
            output_format: body.output_format,
        })
    }

    pub fn with_edits(mut self, edits: EditSet) -> Self {
        self.edits = Some(edits);
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Edits to run, or `None` when the original is returned as is.
    pub fn applicable_edits(&self) -> Option<&EditSet> {
        self.edits.as_ref().filter(|edits| !edits.is_empty())
    }
}
