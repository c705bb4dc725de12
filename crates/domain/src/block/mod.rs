//! Tagged content blocks stored in a page's layout field.
//!
//! Each block record carries a `blockType` discriminator plus type specific
//! fields and a shared set of style overrides. Records whose discriminator is
//! unknown, or whose fields do not match the declared type, degrade to
//! [`UnknownBlock`] instead of failing the whole layout.

pub mod records;
pub mod style;

use serde::{Deserialize, Serialize};

pub use records::{
    AccordionItem, AccordionVariant, BlockHeight, ButtonSize, ButtonVariant, CardItem,
    CardVariant, CtaButton, Feature, FormDefinition, FormFieldDef, GridSpacing, HeroAction,
    ImageAsset, ImageSize, InputType, ProductAction, ProductFeature, ProductGridVariant,
    ProductSummary, Relationship, SelectOption, SpacerHeight, TextAlign,
};
pub use style::{ImageRef, MaxWidth, Spacing, StyleProps};

/// One block record from a page layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Block {
    Known(KnownBlock),
    Unknown(UnknownBlock),
}

impl Block {
    /// Stable key for this block within a layout, falling back to the index
    /// when the record carries no identifier.
    #[must_use]
    pub fn key(&self, index: usize) -> String {
        let id = match self {
            Self::Known(block) => block.style.id.as_deref(),
            Self::Unknown(block) => block.id.as_deref(),
        };
        match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => format!("block-{index}"),
        }
    }
}

/// A block whose type and fields were recognized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnownBlock {
    #[serde(flatten)]
    pub body: BlockBody,
    #[serde(flatten)]
    pub style: StyleProps,
}

/// A block that failed to parse as any known type. Only the discriminator
/// and identifier are retained, for diagnostics and keying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnknownBlock {
    #[serde(rename = "blockType", default)]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Type specific fields of each supported block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "blockType", rename_all = "camelCase")]
pub enum BlockBody {
    #[serde(rename_all = "camelCase")]
    Hero {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_align: Option<TextAlign>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_height: Option<BlockHeight>,
        #[serde(default)]
        actions: Vec<HeroAction>,
    },
    #[serde(rename_all = "camelCase")]
    TextSection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        /// Rich-text tree.
        #[serde(default)]
        content: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_align: Option<TextAlign>,
    },
    #[serde(rename_all = "camelCase")]
    Markdown {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_align: Option<TextAlign>,
    },
    #[serde(rename_all = "camelCase")]
    FeatureGrid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default)]
        features: Vec<Feature>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spacing: Option<GridSpacing>,
    },
    #[serde(rename_all = "camelCase")]
    CtaSection {
        heading: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default)]
        buttons: Vec<CtaButton>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text_align: Option<TextAlign>,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        image: Relationship<ImageAsset>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<ImageSize>,
    },
    #[serde(rename_all = "camelCase")]
    Spacer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        height: Option<SpacerHeight>,
    },
    #[serde(rename_all = "camelCase")]
    Code {
        code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        show_copy: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        show_line_numbers: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wrap_lines: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    ProductGrid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default)]
        products: Vec<Relationship<ProductSummary>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<ProductGridVariant>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spacing: Option<GridSpacing>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        equal_height: Option<bool>,
    },
    #[serde(rename_all = "camelCase")]
    Accordion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default)]
        items: Vec<AccordionItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        allow_multiple: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        variant: Option<AccordionVariant>,
    },
    #[serde(rename_all = "camelCase")]
    CardGrid {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default)]
        cards: Vec<CardItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        columns: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        spacing: Option<GridSpacing>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        card_variant: Option<CardVariant>,
    },
    #[serde(rename_all = "camelCase")]
    Form {
        form: Relationship<FormDefinition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        override_heading: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        override_description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        override_submit_button_text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        override_success_message: Option<String>,
    },
}

impl BlockBody {
    /// The `blockType` discriminator of this body.
    #[must_use]
    pub fn block_type(&self) -> &'static str {
        match self {
            Self::Hero { .. } => "hero",
            Self::TextSection { .. } => "textSection",
            Self::Markdown { .. } => "markdown",
            Self::FeatureGrid { .. } => "featureGrid",
            Self::CtaSection { .. } => "ctaSection",
            Self::Image { .. } => "image",
            Self::Spacer { .. } => "spacer",
            Self::Code { .. } => "code",
            Self::ProductGrid { .. } => "productGrid",
            Self::Accordion { .. } => "accordion",
            Self::CardGrid { .. } => "cardGrid",
            Self::Form { .. } => "form",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_deserialize_hero_block_with_style_props() {
        let block: Block = serde_json::from_value(json!({
            "blockType": "hero",
            "id": "b1",
            "title": "Welcome",
            "subtitle": "Build faster",
            "blockHeight": "large",
            "actions": [{"label": "Start", "href": "/start", "variant": "outlined"}],
            "background": "#101010",
            "paddingTop": "large"
        }))
        .unwrap();
        let Block::Known(known) = block else {
            panic!("expected a known block");
        };
        assert_eq!(known.body.block_type(), "hero");
        assert_eq!(known.style.id.as_deref(), Some("b1"));
        assert_eq!(known.style.background.as_deref(), Some("#101010"));
        let BlockBody::Hero { actions, .. } = known.body else {
            panic!("expected hero body");
        };
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].variant, Some(ButtonVariant::Outlined));
    }

    #[test]
    fn should_fall_back_to_unknown_for_unrecognized_type() {
        let block: Block = serde_json::from_value(json!({
            "blockType": "carousel",
            "id": "b9",
            "slides": []
        }))
        .unwrap();
        let Block::Unknown(unknown) = block else {
            panic!("expected an unknown block");
        };
        assert_eq!(unknown.block_type, "carousel");
        assert_eq!(unknown.id.as_deref(), Some("b9"));
    }

    #[test]
    fn should_fall_back_to_unknown_for_malformed_known_type() {
        // A hero block without its required title cannot be a KnownBlock.
        let block: Block = serde_json::from_value(json!({
            "blockType": "hero",
            "subtitle": "no title here"
        }))
        .unwrap();
        assert!(matches!(block, Block::Unknown(_)));
    }

    #[test]
    fn should_key_blocks_by_id_or_index() {
        let with_id: Block = serde_json::from_value(json!({
            "blockType": "spacer",
            "id": "sp-1",
            "height": "small"
        }))
        .unwrap();
        assert_eq!(with_id.key(4), "sp-1");

        let without_id: Block =
            serde_json::from_value(json!({"blockType": "spacer"})).unwrap();
        assert_eq!(without_id.key(4), "block-4");
    }

    #[test]
    fn should_accept_form_block_with_unresolved_relationship() {
        let block: Block = serde_json::from_value(json!({
            "blockType": "form",
            "form": "form-abc"
        }))
        .unwrap();
        let Block::Known(known) = block else {
            panic!("expected a known block");
        };
        let BlockBody::Form { form, .. } = known.body else {
            panic!("expected form body");
        };
        assert!(form.resolved().is_none());
    }

    #[test]
    fn should_round_trip_product_grid_block() {
        let value = json!({
            "blockType": "productGrid",
            "heading": "Apps",
            "products": [{
                "id": "p1",
                "name": "Forge",
                "slug": "forge",
                "status": "active",
                "description": {"root": {"children": []}}
            }],
            "variant": "detailed",
            "columns": 2
        });
        let block: Block = serde_json::from_value(value).unwrap();
        let back = serde_json::to_value(&block).unwrap();
        assert_eq!(back["blockType"], "productGrid");
        assert_eq!(back["products"][0]["slug"], "forge");
    }
}
