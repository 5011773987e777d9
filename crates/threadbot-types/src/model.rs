//! Supported inference model identifiers.
//!
//! The set of models is closed: a session is bound to one of these at
//! creation and the binding is immutable. Parsing an unknown identifier
//! fails rather than passing arbitrary strings to the inference endpoint.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a supported text-generation model.
///
/// Serialized as the full provider path (e.g.
/// `@cf/meta/llama-2-7b-chat-fp16`), which is also the URL segment the
/// inference endpoint expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelId {
    Llama2Fp16,
    Llama2Int8,
    Mistral7bInstruct,
    Codellama7bInstruct,
}

impl ModelId {
    /// Full provider identifier, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelId::Llama2Fp16 => "@cf/meta/llama-2-7b-chat-fp16",
            ModelId::Llama2Int8 => "@cf/meta/llama-2-7b-chat-int8",
            ModelId::Mistral7bInstruct => "@cf/mistral/mistral-7b-instruct-v0.1",
            ModelId::Codellama7bInstruct => "@hf/thebloke/codellama-7b-instruct-awq",
        }
    }

    /// Short human-readable name (last path segment of the identifier).
    pub fn short_name(&self) -> &'static str {
        self.as_str()
            .rsplit('/')
            .next()
            .expect("model identifiers contain at least one segment")
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "@cf/meta/llama-2-7b-chat-fp16" => Ok(ModelId::Llama2Fp16),
            "@cf/meta/llama-2-7b-chat-int8" => Ok(ModelId::Llama2Int8),
            "@cf/mistral/mistral-7b-instruct-v0.1" => Ok(ModelId::Mistral7bInstruct),
            "@hf/thebloke/codellama-7b-instruct-awq" => Ok(ModelId::Codellama7bInstruct),
            other => Err(format!("unsupported model: '{other}'")),
        }
    }
}

impl TryFrom<String> for ModelId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ModelId> for String {
    fn from(id: ModelId) -> Self {
        id.as_str().to_string()
    }
}
