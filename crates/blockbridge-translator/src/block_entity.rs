//! Block entity tag translation.
//!
//! Java and Bedrock store block entity data (signs, banners, jigsaws, ...)
//! as tag trees with different key names. Each block entity type gets a
//! [`BlockEntityTranslator`] that copies the Java tag into the Bedrock one,
//! and the [`BlockEntityRegistry`] picks the translator by Bedrock id.

use std::collections::HashMap;
use std::sync::Arc;

use blockbridge_nbt::{NbtMap, NbtMapBuilder, TagValue};
use blockbridge_protocol::{NegotiatedProtocol, ProtocolError};

use crate::{BlockStateValues, TranslatorError};

/// Rewrites one block entity type's Java tag into its Bedrock tag.
pub trait BlockEntityTranslator: Send + Sync {
    /// Writes Bedrock keys into `builder`.
    ///
    /// `tag` is `None` when the Java server sent no data for the block.
    ///
    /// # Errors
    /// Fails when the Java tag is missing data the Bedrock client needs.
    fn translate_tag(
        &self,
        session: &dyn NegotiatedProtocol,
        builder: &mut NbtMapBuilder,
        tag: Option<&NbtMap>,
        block_state: i32,
    ) -> Result<(), TranslatorError>;
}

// ---------------------------------------------------------------------------
// Jigsaw
// ---------------------------------------------------------------------------

/// Translates jigsaw blocks.
pub struct JigsawBlockEntityTranslator {
    block_states: Arc<BlockStateValues>,
}

impl JigsawBlockEntityTranslator {
    pub const BEDROCK_ID: &'static str = "JigsawBlock";

    pub fn new(block_states: Arc<BlockStateValues>) -> Self {
        Self { block_states }
    }
}

impl BlockEntityTranslator for JigsawBlockEntityTranslator {
    fn translate_tag(
        &self,
        _session: &dyn NegotiatedProtocol,
        builder: &mut NbtMapBuilder,
        tag: Option<&NbtMap>,
        block_state: i32,
    ) -> Result<(), TranslatorError> {
        let Some(tag) = tag else {
            return Ok(());
        };
        let final_state = tag.get_string("final_state").ok_or_else(|| {
            ProtocolError::Violation("jigsaw block entity without a final_state".into())
        })?;

        // Older servers omit the joint; only horizontal jigsaws are aligned.
        let joint = match tag.get_string("joint") {
            Some(joint) => joint,
            None if self.block_states.is_horizontal_facing_jigsaw(block_state) => "aligned",
            None => "rollable",
        };
        builder
            .put_string("joint", joint)
            .put_string("name", string_or_empty(tag, "name"))
            .put_string("target_pool", string_or_empty(tag, "pool"))
            .put_string("final_state", final_state)
            .put_string("target", string_or_empty(tag, "target"));
        Ok(())
    }
}

fn string_or_empty<'a>(tag: &'a NbtMap, key: &str) -> &'a str {
    tag.get_string(key).unwrap_or("")
}

// ---------------------------------------------------------------------------
// BlockEntityRegistry
// ---------------------------------------------------------------------------

/// Block entity translators keyed by Bedrock block entity id.
#[derive(Default)]
pub struct BlockEntityRegistry {
    translators: HashMap<String, Box<dyn BlockEntityTranslator>>,
}

impl BlockEntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every built-in translator.
    pub fn with_defaults(block_states: Arc<BlockStateValues>) -> Self {
        let mut registry = Self::new();
        registry.register(
            JigsawBlockEntityTranslator::BEDROCK_ID,
            JigsawBlockEntityTranslator::new(block_states),
        );
        registry
    }

    pub fn register(
        &mut self,
        bedrock_id: impl Into<String>,
        translator: impl BlockEntityTranslator + 'static,
    ) {
        self.translators
            .insert(bedrock_id.into(), Box::new(translator));
    }

    pub fn get(&self, bedrock_id: &str) -> Option<&dyn BlockEntityTranslator> {
        self.translators.get(bedrock_id).map(Box::as_ref)
    }

    /// Builds the complete Bedrock tag for a block entity at `(x, y, z)`.
    ///
    /// The common keys are always written; type-specific keys come from the
    /// registered translator. Ids with no translator get only the common
    /// keys.
    pub fn block_entity_tag(
        &self,
        session: &dyn NegotiatedProtocol,
        bedrock_id: &str,
        position: (i32, i32, i32),
        tag: Option<&NbtMap>,
        block_state: i32,
    ) -> Result<NbtMap, TranslatorError> {
        let (x, y, z) = position;
        let mut builder = NbtMap::builder();
        builder
            .put_string("id", bedrock_id)
            .put_int("x", x)
            .put_int("y", y)
            .put_int("z", z)
            .put("isMovable", TagValue::Byte(1));

        match self.get(bedrock_id) {
            Some(translator) => translator.translate_tag(session, &mut builder, tag, block_state)?,
            None => tracing::debug!(bedrock_id, "no block entity translator"),
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HORIZONTAL: i32 = 19_403;
    const UPWARD: i32 = 19_399;

    fn translator() -> JigsawBlockEntityTranslator {
        let states = BlockStateValues::new().with_horizontal_facing_jigsaws([HORIZONTAL]);
        JigsawBlockEntityTranslator::new(Arc::new(states))
    }

    fn translate(tag: Option<&NbtMap>, block_state: i32) -> Result<NbtMap, TranslatorError> {
        let mut builder = NbtMap::builder();
        translator().translate_tag(&671, &mut builder, tag, block_state)?;
        Ok(builder.build())
    }

    #[test]
    fn test_absent_tag_writes_nothing() {
        assert!(translate(None, HORIZONTAL).unwrap().is_empty());
    }

    #[test]
    fn test_non_string_joint_falls_back() {
        let tag = NbtMap::builder()
            .put_int("joint", 1)
            .put_string("final_state", "minecraft:air")
            .build();
        assert_eq!(translate(Some(&tag), UPWARD).unwrap().get_string("joint"), Some("rollable"));
    }

    #[test]
    fn test_missing_final_state_writes_nothing() {
        let tag = NbtMap::builder().put_string("joint", "aligned").build();
        let mut builder = NbtMap::builder();
        let err = translator()
            .translate_tag(&671, &mut builder, Some(&tag), UPWARD)
            .unwrap_err();
        assert!(matches!(
            err,
            TranslatorError::Protocol(ProtocolError::Violation(_))
        ));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_output_key_order() {
        let tag = NbtMap::builder()
            .put_string("final_state", "minecraft:air")
            .build();
        let out = translate(Some(&tag), HORIZONTAL).unwrap();
        assert_eq!(
            out.keys().collect::<Vec<_>>(),
            vec!["joint", "name", "target_pool", "final_state", "target"]
        );
    }

    #[test]
    fn test_registry_common_keys() {
        let registry = BlockEntityRegistry::new();
        let out = registry
            .block_entity_tag(&671, "Sign", (1, 64, -3), None, 0)
            .unwrap();
        assert_eq!(out.get_string("id"), Some("Sign"));
        assert_eq!(out.get_int("z"), Some(-3));
        assert_eq!(out.len(), 5);
    }
}
