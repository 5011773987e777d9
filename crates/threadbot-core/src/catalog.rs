//! Static registry of supported models.
//!
//! Pure data: maps a [`ModelId`] to a short display name and description
//! for the model-selection menu, and resolves raw identifier strings during
//! session creation.

use serde::Serialize;

use threadbot_types::model::ModelId;

/// Catalog entry for one supported model.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModelEntry {
    pub id: ModelId,
    pub name: &'static str,
    pub description: &'static str,
}

const MODELS: &[ModelEntry] = &[
    ModelEntry {
        id: ModelId::Llama2Fp16,
        name: "llama-2-7b-chat-fp16",
        description:
            "Full precision (fp16) generative text model with 7 billion parameters from Meta",
    },
    ModelEntry {
        id: ModelId::Llama2Int8,
        name: "llama-2-7b-chat-int8",
        description:
            "Quantized (int8) generative text model with 7 billion parameters from Meta",
    },
    ModelEntry {
        id: ModelId::Mistral7bInstruct,
        name: "mistral-7b-instruct-v0.1",
        description:
            "Instruct fine-tuned version of the Mistral-7b generative text model with 7 billion parameters",
    },
    ModelEntry {
        id: ModelId::Codellama7bInstruct,
        name: "codellama-7b-instruct-awq",
        description:
            "Instruct fine-tuned version of the Codellama-7b generative text model with 7 billion parameters",
    },
];

/// Read-only model registry.
pub struct ModelCatalog;

impl ModelCatalog {
    /// All supported models, in menu order.
    pub fn all() -> &'static [ModelEntry] {
        MODELS
    }

    /// Look up the catalog entry for a model.
    pub fn get(id: ModelId) -> &'static ModelEntry {
        MODELS
            .iter()
            .find(|m| m.id == id)
            .expect("every ModelId variant has a catalog entry")
    }

    /// Resolve a raw identifier string to a supported model.
    pub fn resolve(raw: &str) -> Option<ModelId> {
        raw.parse().ok()
    }
}
