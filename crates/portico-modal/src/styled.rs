//! Pre-styled modal wrappers.
//!
//! A [`StyleTemplate`] is CSS declaration text with `${prop}` placeholders.
//! Placeholders are resolved against the modal's pass-through props every
//! time the wrapper renders:
//!
//! ```
//! use portico_core::Props;
//! use portico_modal::StyleTemplate;
//!
//! let template: StyleTemplate = "padding: ${pad}; color: red;".parse().unwrap();
//! let props = Props::new().with("pad", "8px");
//! assert_eq!(template.render(&props), "padding: 8px; color: red;");
//! ```

use crate::env::Component;
use crate::modal::{Modal, ModalBuilder};
use portico_core::{Element, Node, Props};
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of generated wrapper class names.
pub const CLASS_PREFIX: &str = "portico-";

/// Invalid style template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StyleError {
    /// `${` without a closing `}`
    #[error("unterminated interpolation starting at byte {0}")]
    Unterminated(usize),
    /// `${}`
    #[error("empty interpolation at byte {0}")]
    EmptyName(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Prop(String),
}

/// CSS declarations with `${prop}` interpolation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl StyleTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns an error for an unterminated or empty `${...}`.
    pub fn parse(source: &str) -> Result<Self, StyleError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;
        while let Some(start) = rest.find("${") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let end = after
                .find('}')
                .ok_or(StyleError::Unterminated(offset + start))?;
            let name = after[..end].trim();
            if name.is_empty() {
                return Err(StyleError::EmptyName(offset + start));
            }
            segments.push(Segment::Prop(name.to_string()));
            let consumed = start + 2 + end + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Template text as written.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Names of the props the template reads.
    pub fn prop_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Prop(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Resolve placeholders. Missing props resolve to nothing; runs of
    /// whitespace collapse to a single space.
    #[must_use]
    pub fn render(&self, props: &Props) -> String {
        let raw: String = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Prop(name) => props.get(name).unwrap_or_default(),
            })
            .collect();
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Stable class name derived from the template text.
    #[must_use]
    pub fn class_name(&self) -> String {
        // FNV-1a, 32 bit
        let hash = self
            .source
            .bytes()
            .fold(0x811c_9dc5_u32, |hash, byte| {
                (hash ^ u32::from(byte)).wrapping_mul(0x0100_0193)
            });
        format!("{CLASS_PREFIX}{hash:08x}")
    }
}

impl FromStr for StyleTemplate {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for StyleTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Wrapper element styled by a template.
#[derive(Debug, Clone)]
pub struct StyledWrapper {
    template: StyleTemplate,
    class_name: String,
    tag: String,
}

impl StyledWrapper {
    /// `div` wrapper for `template`.
    #[must_use]
    pub fn new(template: StyleTemplate) -> Self {
        let class_name = template.class_name();
        Self {
            template,
            class_name,
            tag: "div".to_string(),
        }
    }

    /// Use another element tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    /// Template backing this wrapper.
    #[must_use]
    pub const fn template(&self) -> &StyleTemplate {
        &self.template
    }

    /// Generated class name.
    #[must_use]
    pub fn class_name(&self) -> &str {
        &self.class_name
    }
}

impl Component for StyledWrapper {
    fn render(&self, props: &Props, children: Vec<Node>) -> Node {
        let mut attrs = props.clone();
        let class = match props.get("class") {
            Some(extra) if !extra.is_empty() => format!("{} {extra}", self.class_name),
            _ => self.class_name.clone(),
        };
        attrs.insert("class", class);
        let mut style = self.template.render(props);
        if let Some(extra) = props.get("style").filter(|s| !s.trim().is_empty()) {
            if !style.is_empty() {
                style.push(' ');
            }
            style.push_str(extra.trim());
        }
        if style.is_empty() {
            attrs.remove("style");
        } else {
            attrs.insert("style", style);
        }
        Element::new(self.tag.as_str())
            .with_attrs(&attrs)
            .with_children(children)
            .into()
    }
}

/// A reusable modal with a styled wrapper already set.
#[derive(Debug, Clone)]
pub struct ModalPreset {
    wrapper: Rc<StyledWrapper>,
}

impl ModalPreset {
    /// Preset around an existing wrapper.
    #[must_use]
    pub fn new(wrapper: StyledWrapper) -> Self {
        Self {
            wrapper: Rc::new(wrapper),
        }
    }

    /// Builder with the styled wrapper installed.
    #[must_use]
    pub fn builder(&self) -> ModalBuilder {
        ModalBuilder::new().wrapper_rc(self.wrapper.clone())
    }

    /// The wrapper shared by every modal built from this preset.
    #[must_use]
    pub fn wrapper(&self) -> &StyledWrapper {
        &self.wrapper
    }
}

impl Modal {
    /// Build a modal preset whose wrapper is styled by `template`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template does not parse.
    pub fn styled(template: &str) -> Result<ModalPreset, StyleError> {
        Ok(ModalPreset::new(StyledWrapper::new(template.parse()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // =========================================================================
    // Template parsing
    // =========================================================================

    #[test]
    fn test_parse_literal_only() {
        let t = StyleTemplate::parse("color: red;").unwrap();
        assert_eq!(t.prop_names().count(), 0);
        assert_eq!(t.render(&Props::new()), "color: red;");
    }

    #[test]
    fn test_parse_placeholders() {
        let t = StyleTemplate::parse("width: ${ width }; height: ${height};").unwrap();
        assert_eq!(t.prop_names().collect::<Vec<_>>(), vec!["width", "height"]);
        let props = Props::new().with("width", "10px").with("height", "20px");
        assert_eq!(t.render(&props), "width: 10px; height: 20px;");
    }

    #[test]
    fn test_missing_prop_renders_empty() {
        let t = StyleTemplate::parse("opacity: ${opacity};").unwrap();
        assert_eq!(t.render(&Props::new()), "opacity: ;");
    }

    #[test]
    fn test_whitespace_collapses() {
        let t = StyleTemplate::parse("\n  background: white;\n  padding: 1rem;\n").unwrap();
        assert_eq!(t.render(&Props::new()), "background: white; padding: 1rem;");
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(
            StyleTemplate::parse("color: red; width: ${w").unwrap_err(),
            StyleError::Unterminated(19)
        );
    }

    #[test]
    fn test_empty_name() {
        assert_eq!(
            "a: ${};".parse::<StyleTemplate>().unwrap_err(),
            StyleError::EmptyName(3)
        );
    }

    #[test]
    fn test_class_name_stable() {
        let a = StyleTemplate::parse("color: red;").unwrap();
        let b = StyleTemplate::parse("color: red;").unwrap();
        let c = StyleTemplate::parse("color: blue;").unwrap();
        assert_eq!(a.class_name(), b.class_name());
        assert_ne!(a.class_name(), c.class_name());
        assert!(a.class_name().starts_with(CLASS_PREFIX));
        assert_eq!(a.class_name().len(), CLASS_PREFIX.len() + 8);
    }

    // =========================================================================
    // Styled wrapper
    // =========================================================================

    #[test]
    fn test_wrapper_renders_div_with_class_and_style() {
        let wrapper = StyledWrapper::new("padding: ${pad};".parse().unwrap());
        let props = Props::new().with("pad", "4px").with("role", "dialog");
        let node = wrapper.render(&props, vec!["body".into()]);
        let el = node.as_element().unwrap();
        assert_eq!(el.tag(), "div");
        assert_eq!(el.attr("class"), Some(wrapper.class_name()));
        assert_eq!(el.attr("style"), Some("padding: 4px;"));
        assert_eq!(el.attr("role"), Some("dialog"));
        assert_eq!(node.text_content(), "body");
    }

    #[test]
    fn test_wrapper_merges_class_and_style_props() {
        let wrapper = StyledWrapper::new("color: red;".parse().unwrap()).tag("section");
        let props = Props::new().with("class", "extra").with("style", "margin: 0;");
        let node = wrapper.render(&props, Vec::new());
        let el = node.as_element().unwrap();
        assert_eq!(el.tag(), "section");
        let expected_class = format!("{} extra", wrapper.class_name());
        assert_eq!(el.attr("class"), Some(expected_class.as_str()));
        assert_eq!(el.attr("style"), Some("color: red; margin: 0;"));
    }

    #[test]
    fn test_styled_preset_installs_wrapper() {
        let preset = Modal::styled("background: white;").unwrap();
        let builder = preset.builder().prop("role", "dialog");
        assert!(builder.peek().wrapper.is_some());
        assert_eq!(builder.peek().props.get("role"), Some("dialog"));
        assert_eq!(preset.wrapper().template().source(), "background: white;");
    }

    #[test]
    fn test_styled_rejects_bad_template() {
        assert!(Modal::styled("width: ${").is_err());
    }

    proptest! {
        #[test]
        fn prop_interpolation_inserts_value(name in "[a-z]{1,8}", value in "[a-z0-9]{0,8}") {
            let t = StyleTemplate::parse(&format!("x: ${{{name}}};")).unwrap();
            let props = Props::new().with(name, value.clone());
            let expected = if value.is_empty() { "x: ;".to_string() } else { format!("x: {value};") };
            prop_assert_eq!(t.render(&props), expected);
        }

        #[test]
        fn prop_literal_templates_never_fail(s in "[a-z:; ]{0,32}") {
            prop_assert!(StyleTemplate::parse(&s).is_ok());
        }
    }
}
