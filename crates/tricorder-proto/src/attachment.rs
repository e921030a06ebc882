// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Attachments: auxiliary artifacts (screenshots, logs, files) correlated
//! to the execution that produced them.

use serde::{Deserialize, Serialize};

/// How an attachment body is encoded on the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentEncoding {
    /// Body is the content itself, UTF-8 text.
    Identity,
    /// Body is base64-encoded binary content.
    Base64,
}

/// An artifact captured during execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment content, encoded per `content_encoding`.
    pub body: String,
    /// Encoding of `body`.
    pub content_encoding: ContentEncoding,
    /// Suggested file name for consumers that materialize the artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// IANA media type of the decoded content.
    pub media_type: String,
    /// Attempt the artifact belongs to, when captured inside a test case.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_case_started_id: Option<String>,
    /// Planned step the artifact belongs to, when captured inside a step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_step_id: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn encoding_uses_wire_names() {
        assert_eq!(
            serde_json::to_string(&ContentEncoding::Base64).expect("serialize"),
            r#""BASE64""#
        );
        assert_eq!(
            serde_json::to_string(&ContentEncoding::Identity).expect("serialize"),
            r#""IDENTITY""#
        );
    }

    #[test]
    fn correlation_ids_are_optional_on_the_wire() {
        let json = r#"{"body":"hello","contentEncoding":"IDENTITY","mediaType":"text/x-log"}"#;
        let attachment: Attachment = serde_json::from_str(json).expect("decode");
        assert!(attachment.test_case_started_id.is_none());
        assert!(attachment.test_step_id.is_none());
    }
}
