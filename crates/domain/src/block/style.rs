//! Common style fields attachable to every block.
//!
//! Pure data — the renderer passes these through to the visual container
//! after resolving the image reference and the raw `sx` object.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Spacing scale shared by padding and margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    None,
    Tiny,
    Small,
    Medium,
    Large,
    ExtraLarge,
}

impl Spacing {
    /// CSS length for this step of the scale.
    #[must_use]
    pub fn css(self) -> &'static str {
        match self {
            Self::None => "0",
            Self::Tiny => "8px",
            Self::Small => "16px",
            Self::Medium => "32px",
            Self::Large => "64px",
            Self::ExtraLarge => "96px",
        }
    }
}

/// Container max-width scale. `"false"` disables the constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaxWidth {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
    #[serde(rename = "false")]
    Unconstrained,
}

impl MaxWidth {
    /// CSS max-width for this breakpoint, `None` when unconstrained.
    #[must_use]
    pub fn css(self) -> Option<&'static str> {
        match self {
            Self::Xs => Some("444px"),
            Self::Sm => Some("600px"),
            Self::Md => Some("900px"),
            Self::Lg => Some("1200px"),
            Self::Xl => Some("1536px"),
            Self::Unconstrained => None,
        }
    }
}

/// A media reference that may arrive as a bare URL string or as an
/// uploaded-asset object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageRef {
    Url(String),
    Asset {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

impl ImageRef {
    /// The underlying URL, whichever form the reference took.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) | Self::Asset { url, .. } => url,
        }
    }
}

/// Optional styling attributes present on every block type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleProps {
    pub padding: Option<Spacing>,
    pub margin_top: Option<Spacing>,
    pub margin_bottom: Option<Spacing>,
    pub width: Option<String>,
    pub max_width: Option<MaxWidth>,
    pub background: Option<String>,
    pub color: Option<String>,
    pub background_image: Option<ImageRef>,
    pub background_gradient: Option<String>,
    pub class_name: Option<String>,
    /// Raw style object. May arrive as a JSON string from the admin UI;
    /// the renderer parses it and drops it with a warning if malformed.
    pub sx: Option<Value>,
    /// DOM id, also used as the rendered node's identity key.
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_deserialize_full_style_props() {
        let props: StyleProps = serde_json::from_value(json!({
            "padding": "medium",
            "marginTop": "extra-large",
            "maxWidth": "lg",
            "background": "#112233",
            "backgroundImage": {"url": "/media/bg.jpg", "alt": "bg"},
            "backgroundGradient": "linear-gradient(#000, #fff)",
            "className": "intro",
            "sx": {"borderRadius": 2},
            "id": "intro-section"
        }))
        .unwrap();

        assert_eq!(props.padding, Some(Spacing::Medium));
        assert_eq!(props.margin_top, Some(Spacing::ExtraLarge));
        assert_eq!(props.max_width, Some(MaxWidth::Lg));
        assert_eq!(
            props.background_image.as_ref().map(ImageRef::url),
            Some("/media/bg.jpg")
        );
        assert_eq!(props.id.as_deref(), Some("intro-section"));
    }

    #[test]
    fn should_default_every_field_to_none() {
        let props: StyleProps = serde_json::from_value(json!({})).unwrap();
        assert_eq!(props, StyleProps::default());
    }

    #[test]
    fn should_accept_background_image_as_bare_string() {
        let props: StyleProps = serde_json::from_value(json!({
            "backgroundImage": "/media/bg.jpg"
        }))
        .unwrap();
        assert_eq!(
            props.background_image.as_ref().map(ImageRef::url),
            Some("/media/bg.jpg")
        );
    }

    #[test]
    fn should_deserialize_false_max_width_as_unconstrained() {
        let mw: MaxWidth = serde_json::from_value(json!("false")).unwrap();
        assert_eq!(mw, MaxWidth::Unconstrained);
    }

    #[test]
    fn should_map_scales_to_css_lengths() {
        assert_eq!(Spacing::None.css(), "0");
        assert_eq!(Spacing::Medium.css(), "32px");
        assert_eq!(MaxWidth::Lg.css(), Some("1200px"));
        assert_eq!(MaxWidth::Unconstrained.css(), None);
    }
}
