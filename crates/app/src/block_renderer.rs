//! Block renderer — maps stored block records to a resolved render tree.
//!
//! Rendering is total: every input block yields exactly one output node.
//! Blocks that cannot be interpreted degrade to a visible fallback, and a
//! form block whose relationship was never resolved renders as empty.

use pageforge_domain::block::{
    Block, BlockBody, BlockHeight, ButtonSize, ButtonVariant, CtaButton, HeroAction, ImageSize,
    Relationship, SpacerHeight, StyleProps, TextAlign,
};
use pageforge_domain::render::{
    AccordionItemView, ButtonSpec, CardView, FormView, ProductActionView, ProductView,
    RenderNode, RenderedBlock, RenderedPage, StyleAttrs,
};
use pageforge_domain::richtext;

/// Container-level options for one render pass.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Class the host should apply to the container wrapping the nodes.
    pub class_name: Option<String>,
}

/// Render a full page layout, carrying the container class through.
#[must_use]
pub fn render_page(blocks: &[Block], options: RenderOptions) -> RenderedPage {
    RenderedPage {
        class_name: options.class_name,
        nodes: render_blocks(blocks),
    }
}

/// Render a page layout. The output always has one entry per input block,
/// in order.
#[must_use]
pub fn render_blocks(blocks: &[Block]) -> Vec<RenderedBlock> {
    blocks
        .iter()
        .enumerate()
        .map(|(index, block)| RenderedBlock {
            key: block.key(index),
            node: render_block(block),
        })
        .collect()
}

fn render_block(block: &Block) -> RenderNode {
    match block {
        Block::Known(known) => render_body(&known.body, &known.style),
        Block::Unknown(unknown) => {
            tracing::warn!(block_type = %unknown.block_type, "unknown block type, rendering fallback");
            RenderNode::Fallback {
                block_type: unknown.block_type.clone(),
            }
        }
    }
}

#[allow(clippy::too_many_lines)]
fn render_body(body: &BlockBody, props: &StyleProps) -> RenderNode {
    let style = resolve_style(props);
    match body {
        BlockBody::Hero {
            title,
            subtitle,
            text_align,
            block_height,
            actions,
        } => RenderNode::Hero {
            title: title.clone(),
            subtitle: subtitle.clone(),
            text_align: text_align.unwrap_or(TextAlign::Center),
            block_height: block_height.unwrap_or(BlockHeight::Medium),
            actions: actions.iter().map(hero_button).collect(),
            style,
        },
        BlockBody::TextSection {
            heading,
            content,
            text_align,
        } => RenderNode::TextSection {
            heading: heading.clone(),
            content: richtext::plain_text(content),
            text_align: text_align.unwrap_or(TextAlign::Left),
            style,
        },
        BlockBody::Markdown {
            heading,
            content,
            text_align,
        } => RenderNode::Markdown {
            heading: heading.clone(),
            content: content.clone(),
            text_align: text_align.unwrap_or(TextAlign::Left),
            style,
        },
        BlockBody::FeatureGrid {
            heading,
            features,
            columns,
            spacing,
        } => RenderNode::FeatureGrid {
            heading: heading.clone(),
            features: features.clone(),
            columns: columns.unwrap_or(3),
            spacing: spacing.unwrap_or(pageforge_domain::block::GridSpacing::Medium),
            style,
        },
        BlockBody::CtaSection {
            heading,
            description,
            buttons,
            text_align,
        } => RenderNode::CtaSection {
            heading: heading.clone(),
            description: description.clone(),
            buttons: buttons.iter().map(cta_button).collect(),
            text_align: text_align.unwrap_or(TextAlign::Center),
            style,
        },
        BlockBody::Image {
            image,
            alt,
            caption,
            size,
        } => RenderNode::Image {
            // An unresolved upload keeps the container but paints nothing.
            url: image
                .resolved()
                .map(|asset| asset.url.clone())
                .unwrap_or_default(),
            alt: alt.clone().unwrap_or_default(),
            caption: caption.clone(),
            width: size.unwrap_or(ImageSize::Large).css_width().to_string(),
            style,
        },
        BlockBody::Spacer { height } => RenderNode::Spacer {
            height_px: height.unwrap_or(SpacerHeight::Medium).px(),
        },
        BlockBody::Code {
            code,
            language,
            title,
            show_copy,
            show_line_numbers,
            wrap_lines,
        } => RenderNode::Code {
            code: code.clone(),
            language: language.clone().unwrap_or_default(),
            title: title.clone(),
            show_copy: show_copy.unwrap_or(false),
            show_line_numbers: show_line_numbers.unwrap_or(false),
            wrap_lines: wrap_lines.unwrap_or(false),
            style,
        },
        BlockBody::ProductGrid {
            heading,
            products,
            variant,
            columns,
            spacing,
            equal_height,
        } => RenderNode::ProductGrid {
            heading: heading.clone(),
            products: products
                .iter()
                .filter_map(Relationship::resolved)
                .map(product_view)
                .collect(),
            variant: variant.unwrap_or_default(),
            columns: columns.unwrap_or(3),
            spacing: spacing.unwrap_or(pageforge_domain::block::GridSpacing::Medium),
            equal_height: equal_height.unwrap_or(true),
            style,
        },
        BlockBody::Accordion {
            heading,
            items,
            allow_multiple,
            variant,
        } => RenderNode::Accordion {
            heading: heading.clone(),
            items: items
                .iter()
                .map(|item| AccordionItemView {
                    title: item.title.clone(),
                    content: richtext::plain_text(&item.content),
                    default_expanded: item.default_expanded,
                })
                .collect(),
            allow_multiple: allow_multiple.unwrap_or(false),
            variant: variant.unwrap_or_default(),
            style,
        },
        BlockBody::CardGrid {
            heading,
            cards,
            columns,
            spacing,
            card_variant,
        } => RenderNode::CardGrid {
            heading: heading.clone(),
            cards: cards
                .iter()
                .map(|card| CardView {
                    title: card.title.clone(),
                    description: card.description.clone(),
                    image_url: card
                        .image
                        .as_ref()
                        .map(|image| image.url().to_string())
                        .or_else(|| card.image_url.clone()),
                    icon: card.icon.clone(),
                    link: card.link.clone(),
                    link_text: card
                        .link_text
                        .clone()
                        .unwrap_or_else(|| "Learn More".to_string()),
                })
                .collect(),
            columns: columns.unwrap_or(3),
            spacing: spacing.unwrap_or(pageforge_domain::block::GridSpacing::Medium),
            card_variant: card_variant.unwrap_or_default(),
            style,
        },
        BlockBody::Form {
            form,
            override_heading,
            override_description,
            override_submit_button_text,
            override_success_message,
        } => match form.resolved() {
            Some(definition) => RenderNode::Form {
                form: FormView {
                    form_id: definition.id.clone(),
                    form_name: definition.form_name.clone(),
                    title: override_heading
                        .clone()
                        .unwrap_or_else(|| definition.title.clone()),
                    description: override_description
                        .clone()
                        .or_else(|| definition.description.clone()),
                    fields: definition.fields.clone(),
                    submit_button_text: override_submit_button_text
                        .clone()
                        .or_else(|| definition.submit_button_text.clone())
                        .unwrap_or_else(|| "Submit".to_string()),
                    success_message: override_success_message
                        .clone()
                        .or_else(|| definition.success_message.clone())
                        .unwrap_or_else(|| "Thank you for your submission!".to_string()),
                    enable_captcha: definition.enable_captcha,
                },
                style,
            },
            None => {
                tracing::warn!("form relationship not resolved, rendering empty");
                RenderNode::Empty {}
            }
        },
    }
}

fn hero_button(action: &HeroAction) -> ButtonSpec {
    ButtonSpec {
        label: action.label.clone(),
        href: action.href.clone(),
        variant: action.variant.unwrap_or(ButtonVariant::Contained),
        size: action.button_size.unwrap_or(ButtonSize::Medium),
    }
}

fn cta_button(button: &CtaButton) -> ButtonSpec {
    ButtonSpec {
        label: button.label.clone(),
        href: button.href.clone(),
        variant: button.variant.unwrap_or(ButtonVariant::Contained),
        size: button.size.unwrap_or(ButtonSize::Large),
    }
}

fn product_view(product: &pageforge_domain::block::ProductSummary) -> ProductView {
    ProductView {
        id: product.id.clone(),
        name: product.name.clone(),
        slug: product.slug.clone(),
        category: product.category.clone(),
        tagline: product.tagline.clone(),
        description: richtext::plain_text(&product.description)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" "),
        image_url: product.image.as_ref().map(|image| image.url().to_string()),
        status: map_product_status(&product.status).to_string(),
        features: product
            .features
            .iter()
            .map(|feature| feature.title.clone())
            .collect(),
        technologies: product
            .technologies
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(ToString::to_string)
            .collect(),
        actions: product
            .actions
            .iter()
            .map(|action| ProductActionView {
                label: action.label.clone(),
                url: action.url.clone(),
                variant: action.variant.unwrap_or(ButtonVariant::Contained),
                color: action.color.clone(),
                disabled: action.disabled,
                open_in_new_tab: action.open_in_new_tab,
            })
            .collect(),
    }
}

/// Map the stored product status to its public display status.
fn map_product_status(status: &str) -> &'static str {
    match status {
        "active" => "launched",
        "beta" => "beta",
        _ => "coming-soon",
    }
}

fn resolve_style(props: &StyleProps) -> StyleAttrs {
    StyleAttrs {
        padding: props.padding.map(|s| s.css().to_string()),
        margin_top: props.margin_top.map(|s| s.css().to_string()),
        margin_bottom: props.margin_bottom.map(|s| s.css().to_string()),
        width: props.width.clone(),
        max_width: props
            .max_width
            .and_then(|mw| mw.css())
            .map(ToString::to_string),
        background: props.background.clone(),
        color: props.color.clone(),
        background_image: props
            .background_image
            .as_ref()
            .map(|image| image.url().to_string()),
        background_gradient: props.background_gradient.clone(),
        class_name: props.class_name.clone(),
        sx: resolve_sx(props.sx.as_ref()),
    }
}

/// The admin UI stores `sx` as a JSON string; newer records store it as an
/// object. Strings that fail to parse are dropped with a warning.
fn resolve_sx(sx: Option<&serde_json::Value>) -> Option<serde_json::Value> {
    match sx? {
        serde_json::Value::String(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => Some(parsed),
            Err(error) => {
                tracing::warn!(%error, "dropping unparseable sx style override");
                None
            }
        },
        value => Some(value.clone()),
    }
}
