//! Visual render tree produced from a page's block layout.
//!
//! Render nodes are fully resolved: defaults applied, relationships flattened
//! and rich text reduced to plain strings. They serialize to a stable JSON
//! shape that front ends can paint without further lookups.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::block::{
    AccordionVariant, BlockHeight, ButtonSize, ButtonVariant, CardVariant, Feature,
    FormFieldDef, GridSpacing, ProductGridVariant, TextAlign,
};

/// A full page render: the container class plus one node per block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub nodes: Vec<RenderedBlock>,
}

/// One rendered entry per input block, keyed for stable list rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedBlock {
    pub key: String,
    #[serde(flatten)]
    pub node: RenderNode,
}

/// Style attributes resolved onto a render node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_bottom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    /// Extra style overrides parsed from the record's raw `sx` field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sx: Option<Value>,
}

/// Resolved button ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonSpec {
    pub label: String,
    pub href: String,
    pub variant: ButtonVariant,
    pub size: ButtonSize,
}

/// Product card ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub status: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub technologies: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ProductActionView>,
}

/// Resolved product action button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductActionView {
    pub label: String,
    pub url: String,
    pub variant: ButtonVariant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub disabled: bool,
    pub open_in_new_tab: bool,
}

/// Accordion entry with its body flattened to plain text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccordionItemView {
    pub title: String,
    pub content: String,
    pub default_expanded: bool,
}

/// Card ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardView {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub link_text: String,
}

/// Resolved form view with override fields already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormView {
    pub form_id: String,
    pub form_name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FormFieldDef>,
    pub submit_button_text: String,
    pub success_message: String,
    pub enable_captcha: bool,
}

/// One node of the render tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    #[serde(rename_all = "camelCase")]
    Hero {
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        subtitle: Option<String>,
        text_align: TextAlign,
        block_height: BlockHeight,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        actions: Vec<ButtonSpec>,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    TextSection {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        content: String,
        text_align: TextAlign,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    Markdown {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        content: String,
        text_align: TextAlign,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    FeatureGrid {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        features: Vec<Feature>,
        columns: u8,
        spacing: GridSpacing,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    CtaSection {
        heading: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        buttons: Vec<ButtonSpec>,
        text_align: TextAlign,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    Image {
        url: String,
        alt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        width: String,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    Spacer { height_px: u32 },
    #[serde(rename_all = "camelCase")]
    Code {
        code: String,
        language: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        show_copy: bool,
        show_line_numbers: bool,
        wrap_lines: bool,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    ProductGrid {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        products: Vec<ProductView>,
        variant: ProductGridVariant,
        columns: u8,
        spacing: GridSpacing,
        equal_height: bool,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    Accordion {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        items: Vec<AccordionItemView>,
        allow_multiple: bool,
        variant: AccordionVariant,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    CardGrid {
        #[serde(skip_serializing_if = "Option::is_none")]
        heading: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        cards: Vec<CardView>,
        columns: u8,
        spacing: GridSpacing,
        card_variant: CardVariant,
        style: StyleAttrs,
    },
    #[serde(rename_all = "camelCase")]
    Form { form: FormView, style: StyleAttrs },
    /// Placeholder for a form whose relationship was never resolved.
    #[serde(rename_all = "camelCase")]
    Empty {},
    /// Visible placeholder for a block that could not be interpreted.
    #[serde(rename_all = "camelCase")]
    Fallback { block_type: String },
}
