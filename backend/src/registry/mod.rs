//! # Template Registry
//!
//! Catalog of template modules keyed by document-type slug. Each module
//! declares the placeholder names it uses and one HTML template per theme;
//! `generate` fills every `{{name}}` token of every theme from a map of values.
//!
//! The catalog is independent of the stored document types. A placeholder with
//! no submitted value renders as an empty string, so drift between the two
//! never fails a render.

mod resignation_letter;

use common::model::template::{RawTemplates, TemplateDescriptor};
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").expect("placeholder pattern is valid"));

/// Escapes text for insertion into HTML element content or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Replaces every placeholder token of `template`, escaping the inserted values.
pub fn substitute(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            values.get(&caps[1]).map(|v| escape_html(v)).unwrap_or_default()
        })
        .into_owned()
}

#[derive(Debug, Clone, Copy)]
pub struct TemplateModule {
    pub slug: &'static str,
    pub fields: &'static [&'static str],
    /// `(theme name, html)` in presentation order.
    pub themes: &'static [(&'static str, &'static str)],
}

impl TemplateModule {
    /// Populated HTML for every theme. Never fails; unknown or missing values
    /// become empty strings.
    pub fn generate(&self, values: &HashMap<String, String>) -> BTreeMap<String, String> {
        self.themes
            .iter()
            .map(|(name, html)| (name.to_string(), substitute(html, values)))
            .collect()
    }

    pub fn theme_names(&self) -> Vec<String> {
        self.themes.iter().map(|(name, _)| name.to_string()).collect()
    }

    pub fn raw_templates(&self) -> RawTemplates {
        RawTemplates {
            slug: self.slug.to_string(),
            fields: self.fields.iter().map(|f| f.to_string()).collect(),
            templates: self
                .themes
                .iter()
                .map(|(name, html)| (name.to_string(), html.to_string()))
                .collect(),
        }
    }

    pub fn descriptor(&self) -> TemplateDescriptor {
        TemplateDescriptor {
            slug: self.slug.to_string(),
            fields: self.fields.iter().map(|f| f.to_string()).collect(),
            themes: self.theme_names(),
        }
    }
}

/// Read-only after construction.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    modules: BTreeMap<&'static str, TemplateModule>,
}

impl TemplateRegistry {
    pub fn new(modules: impl IntoIterator<Item = TemplateModule>) -> Self {
        Self {
            modules: modules.into_iter().map(|m| (m.slug, m)).collect(),
        }
    }

    /// The modules shipped with the server.
    pub fn builtin() -> Self {
        Self::new([resignation_letter::MODULE])
    }

    pub fn get(&self, slug: &str) -> Option<&TemplateModule> {
        self.modules.get(slug)
    }

    /// Descriptors ordered by slug.
    pub fn descriptors(&self) -> Vec<TemplateDescriptor> {
        self.modules.values().map(TemplateModule::descriptor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GREETING: TemplateModule = TemplateModule {
        slug: "greeting",
        fields: &["name", "city"],
        themes: &[
            ("plain", "<p>Hello {{name}} from {{ city }}! Bye {{name}}.</p>"),
            ("loud", "<h1>{{name}}!!! {{unlisted}}</h1>"),
        ],
    };

    fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn every_occurrence_is_replaced() {
        let out = GREETING.generate(&values(&[("name", "Ada"), ("city", "London")]));
        assert_eq!(out["plain"], "<p>Hello Ada from London! Bye Ada.</p>");
        assert_eq!(out["loud"], "<h1>Ada!!! </h1>");
    }

    #[test]
    fn missing_values_render_empty() {
        let out = GREETING.generate(&HashMap::new());
        assert_eq!(out["plain"], "<p>Hello  from ! Bye .</p>");
        assert!(!out.values().any(|html| html.contains("{{")));
    }

    #[test]
    fn values_are_escaped() {
        let out = GREETING.generate(&values(&[("name", "<script>alert('x')</script> & co")]));
        assert!(out["loud"].starts_with("<h1>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co!!!"));
    }

    #[test]
    fn builtin_resignation_letter_round_trip() {
        let registry = TemplateRegistry::builtin();
        let module = registry.get("resignation-letter").expect("registered");
        assert_eq!(module.fields.len(), 14);
        assert_eq!(module.theme_names(), vec!["classic", "modern", "minimal", "traditional"]);

        let submitted: HashMap<String, String> = module
            .fields
            .iter()
            .map(|f| (f.to_string(), format!("value-of-{}", f)))
            .collect();
        let out = module.generate(&submitted);
        assert_eq!(out.len(), 4);
        for html in out.values() {
            for field in module.fields {
                assert!(html.contains(&format!("value-of-{}", field)), "{field} not rendered");
                assert!(!html.contains(&format!("{{{{{}}}}}", field)));
            }
        }
    }

    #[test]
    fn raw_templates_keep_placeholders() {
        let raw = TemplateRegistry::builtin().get("resignation-letter").unwrap().raw_templates();
        assert_eq!(raw.templates.len(), 4);
        assert!(raw.templates["classic"].contains("{{authorName}}"));
        assert_eq!(raw.fields[0], "authorName");
    }

    #[test]
    fn unknown_slug_is_absent() {
        let registry = TemplateRegistry::new([GREETING]);
        assert!(registry.get("resignation-letter").is_none());
        assert_eq!(registry.descriptors()[0].themes, vec!["plain", "loud"]);
    }
}
