//! Backend wire format
//!
//! Every field is optional here; required-ness is checked while converting
//! into the typed envelope so a missing field becomes `MalformedEnvelope`
//! instead of an opaque serde error.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct WirePartial {
    pub arguments: Option<Vec<WireArgument>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireArgument {
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WireMessage {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub suggested_responses: Option<Vec<WireSuggestion>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireSuggestion {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireFinal {
    pub item: Option<WireItem>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireItem {
    #[serde(default)]
    pub messages: Option<Vec<WireMessage>>,
    pub result: Option<WireResult>,
    #[serde(default)]
    pub throttling: Option<WireThrottling>,
}

#[derive(Debug, Deserialize)]
pub(super) struct WireResult {
    pub value: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(clippy::struct_field_names)] // names mirror the backend payload
pub(super) struct WireThrottling {
    #[serde(default)]
    pub num_user_messages_in_conversation: Option<u32>,
    #[serde(default)]
    pub max_num_user_messages_in_conversation: Option<u32>,
}
