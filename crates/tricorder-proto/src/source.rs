// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Raw source documents, carried verbatim for tooling that re-renders them.

use serde::{Deserialize, Serialize};

/// The raw text of one source document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    /// URI the document was read from.
    pub uri: String,
    /// Full document text.
    pub data: String,
    /// Media type of `data`.
    pub media_type: String,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    use super::*;

    #[test]
    fn source_round_trips() {
        let source = Source {
            uri: "features/math.feature".into(),
            data: "Feature: math\n".into(),
            media_type: "text/x.cucumber.gherkin+plain".into(),
        };
        let json = serde_json::to_string(&source).expect("serialize");
        let back: Source = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, source);
    }
}
