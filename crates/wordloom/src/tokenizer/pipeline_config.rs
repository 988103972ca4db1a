//! # Pipeline Descriptors

use crate::{
    WLError,
    WLResult,
    pretokenizers::ByteLevelPreTokenizer,
    vocab::io::{ComponentJson, TokenizerJson},
};

/// The supported normalizers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Normalizer {
    /// No normalizer configured.
    #[default]
    Identity,

    /// Unicode NFC; currently a pass-through.
    Nfc,
}

impl Normalizer {
    /// Normalize text.
    pub fn normalize<'a>(
        &self,
        text: &'a str,
    ) -> &'a str {
        match self {
            Normalizer::Identity | Normalizer::Nfc => text,
        }
    }
}

/// Validated pipeline descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    /// The normalizer.
    pub normalizer: Normalizer,

    /// The pre-tokenizer.
    pub pre_tokenizer: ByteLevelPreTokenizer,
}

const BYTE_LEVEL: &str = "ByteLevel";

fn unsupported(
    component: &'static str,
    kind: &str,
) -> WLError {
    WLError::Configuration {
        component,
        kind: kind.to_string(),
    }
}

fn check_optional_byte_level(
    component: &'static str,
    desc: &Option<ComponentJson>,
) -> WLResult<()> {
    match desc {
        Some(desc) if desc.kind != BYTE_LEVEL => Err(unsupported(component, &desc.kind)),
        _ => Ok(()),
    }
}

impl PipelineConfig {
    /// Validate the descriptors of a vocabulary file.
    ///
    /// ## Errors
    /// [`WLError::Configuration`] for any unsupported component type:
    /// * normalizer: ``"NFC"`` or absent;
    /// * pre-tokenizer: ``"ByteLevel"`` (required);
    /// * model: ``"BPE"``;
    /// * post-processor, decoder: ``"ByteLevel"`` or absent.
    pub fn from_tokenizer_json(doc: &TokenizerJson) -> WLResult<Self> {
        let normalizer = match &doc.normalizer {
            None => Normalizer::Identity,
            Some(desc) if desc.kind == "NFC" => Normalizer::Nfc,
            Some(desc) => return Err(unsupported("normalizer", &desc.kind)),
        };

        let pre_tokenizer = match &doc.pre_tokenizer {
            Some(desc) if desc.kind == BYTE_LEVEL => {
                ByteLevelPreTokenizer::new(desc.add_prefix_space.unwrap_or(false))
            }
            Some(desc) => return Err(unsupported("pre_tokenizer", &desc.kind)),
            None => return Err(unsupported("pre_tokenizer", "<none>")),
        };

        if doc.model.kind != "BPE" {
            return Err(unsupported("model", &doc.model.kind));
        }

        check_optional_byte_level("post_processor", &doc.post_processor)?;
        check_optional_byte_level("decoder", &doc.decoder)?;

        Ok(Self {
            normalizer,
            pre_tokenizer,
        })
    }
}
