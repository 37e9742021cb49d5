//! Extraction strategies.
//!
//! A strategy is plain data: a tier, an extraction mode and a locator saying
//! where the value lives. Chains of strategies are static tables (see
//! `crate::selector`), so the order a field is tried in is visible in one
//! place and never depends on runtime type inspection.

use std::collections::HashSet;

use url::Url;

use super::field::{ExtractMode, Field, FieldValue, Tier};
use super::price::parse_price;
use super::view::PayloadView;
use crate::dom;
use crate::patterns;
use crate::structured::{lookup, value_list, value_text};
use crate::url_utils;

/// Where a strategy looks for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locator {
    /// Structured data: key paths into an embedded JSON item (tried in
    /// order), or, for markup payloads, a key path into the page's best
    /// schema.org Product node.
    Structured {
        paths: &'static [&'static [&'static str]],
        ld: &'static [&'static str],
    },
    /// First element matching `selector`; its text, or `attr` when set.
    Css {
        selector: &'static str,
        attr: Option<&'static str>,
    },
    /// Every element matching each selector in turn, collecting `attrs`.
    /// `srcset` values contribute their first URL.
    CssList {
        selectors: &'static [&'static str],
        attrs: &'static [&'static str],
    },
    /// First element matching `selector` whose text contains `needle`
    /// (case-insensitive).
    TextContaining {
        selector: &'static str,
        needle: &'static str,
    },
}

/// One entry in a field's strategy chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strategy {
    pub tier: Tier,
    pub mode: ExtractMode,
    pub locator: Locator,
}

/// Raw value a locator produced, before field normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    One(String),
    Many(Vec<String>),
}

impl Strategy {
    /// Scalar from structured data.
    #[must_use]
    pub const fn structured(
        paths: &'static [&'static [&'static str]],
        ld: &'static [&'static str],
    ) -> Self {
        Self {
            tier: Tier::StructuredData,
            mode: ExtractMode::Text,
            locator: Locator::Structured { paths, ld },
        }
    }

    /// List from structured data.
    #[must_use]
    pub const fn structured_list(
        paths: &'static [&'static [&'static str]],
        ld: &'static [&'static str],
    ) -> Self {
        Self {
            tier: Tier::StructuredData,
            mode: ExtractMode::AttributeList,
            locator: Locator::Structured { paths, ld },
        }
    }

    /// Element text.
    #[must_use]
    pub const fn text(selector: &'static str) -> Self {
        Self {
            tier: Tier::Selector,
            mode: ExtractMode::Text,
            locator: Locator::Css { selector, attr: None },
        }
    }

    /// Element attribute.
    #[must_use]
    pub const fn attr(selector: &'static str, attr: &'static str) -> Self {
        Self {
            tier: Tier::Selector,
            mode: ExtractMode::Attribute,
            locator: Locator::Css {
                selector,
                attr: Some(attr),
            },
        }
    }

    /// Attribute collected across all matches of several selectors.
    #[must_use]
    pub const fn attr_list(selectors: &'static [&'static str], attrs: &'static [&'static str]) -> Self {
        Self {
            tier: Tier::Selector,
            mode: ExtractMode::AttributeList,
            locator: Locator::CssList { selectors, attrs },
        }
    }

    /// Text of the first element mentioning `needle`.
    #[must_use]
    pub const fn text_containing(selector: &'static str, needle: &'static str) -> Self {
        Self {
            tier: Tier::Selector,
            mode: ExtractMode::Text,
            locator: Locator::TextContaining { selector, needle },
        }
    }

    /// Same strategy, run against a detail page.
    #[must_use]
    pub const fn on_detail_page(self) -> Self {
        Self {
            tier: Tier::DetailPage,
            mode: self.mode,
            locator: self.locator,
        }
    }

    /// Human-readable locator for attempt records.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.locator {
            Locator::Structured { paths, ld } => {
                let mut parts: Vec<String> = paths.iter().map(|p| p.join(".")).collect();
                if !ld.is_empty() {
                    parts.push(format!("ld+json:{}", ld.join(".")));
                }
                format!("structured:{}", parts.join("|"))
            }
            Locator::Css { selector, attr: None } => format!("css:{selector}"),
            Locator::Css {
                selector,
                attr: Some(attr),
            } => format!("css:{selector}@{attr}"),
            Locator::CssList { selectors, attrs } => {
                format!("css*:{}@{}", selectors.join(", "), attrs.join("|"))
            }
            Locator::TextContaining { selector, needle } => {
                format!("css:{selector}~\"{needle}\"")
            }
        }
    }

    /// Run the locator against a payload. `Err` carries the failure reason.
    pub fn probe(&self, view: &PayloadView) -> Result<RawValue, String> {
        match self.locator {
            Locator::Structured { paths, ld } => self.probe_structured(view, paths, ld),
            Locator::Css { selector, attr } => {
                let doc = view.doc().ok_or("payload carries no markup")?;
                let matches = dom::select_all(doc, selector);
                if matches.is_empty() {
                    return Err(format!("selector `{selector}` matched nothing"));
                }
                let found = match attr {
                    None => matches.iter().find_map(dom::clean_text),
                    Some(name) => matches.iter().find_map(|m| dom::get_attribute(m, name)),
                };
                found.map(RawValue::One).ok_or_else(|| match attr {
                    None => format!("{} match(es) for `{selector}` have no text", matches.len()),
                    Some(name) => format!("{} match(es) for `{selector}` have no `{name}`", matches.len()),
                })
            }
            Locator::CssList { selectors, attrs } => {
                let doc = view.doc().ok_or("payload carries no markup")?;
                let mut values = Vec::new();
                for selector in selectors {
                    for element in dom::select_all(doc, selector) {
                        for name in attrs {
                            let Some(value) = dom::get_attribute(&element, name) else {
                                continue;
                            };
                            if *name == "srcset" {
                                values.extend(dom::first_srcset_url(&value));
                            } else {
                                values.push(value);
                            }
                        }
                    }
                }
                if values.is_empty() {
                    Err("no matching element carried a usable attribute".to_string())
                } else {
                    Ok(RawValue::Many(values))
                }
            }
            Locator::TextContaining { selector, needle } => {
                let doc = view.doc().ok_or("payload carries no markup")?;
                let needle_lower = needle.to_lowercase();
                dom::select_all(doc, selector)
                    .iter()
                    .filter_map(dom::clean_text)
                    .find(|text| text.to_lowercase().contains(&needle_lower))
                    .map(RawValue::One)
                    .ok_or_else(|| format!("no `{selector}` mentions \"{needle}\""))
            }
        }
    }

    fn probe_structured(
        &self,
        view: &PayloadView,
        paths: &[&[&str]],
        ld: &[&str],
    ) -> Result<RawValue, String> {
        let list = self.mode == ExtractMode::AttributeList;
        let read = |value: &serde_json::Value| -> Option<RawValue> {
            if list {
                let items = value_list(value);
                (!items.is_empty()).then_some(RawValue::Many(items))
            } else {
                value_text(value).map(RawValue::One)
            }
        };

        if let Some(item) = view.item() {
            return paths
                .iter()
                .find_map(|path| lookup(item, path).and_then(read))
                .ok_or_else(|| "no value at any structured path in embedded item".to_string());
        }
        if let Some(error) = view.item_error() {
            return Err(error.to_string());
        }
        if ld.is_empty() {
            return Err("no structured source configured for markup payloads".to_string());
        }
        if view.ld_products().is_empty() {
            return Err("payload carries no structured product data".to_string());
        }
        view.ld_products()
            .iter()
            .find_map(|node| lookup(node, ld).and_then(read))
            .ok_or_else(|| format!("no `{}` on any ld+json product", ld.join(".")))
    }
}

/// Turn a raw locator value into a typed field value.
///
/// This is where a field's own validity rules apply: prices must be numeric,
/// links and images must resolve to absolute http(s) URLs.
pub fn normalize(field: Field, raw: RawValue, base: Option<&Url>) -> Result<FieldValue, String> {
    match field {
        Field::Name | Field::Shipping | Field::Description => {
            let text = match raw {
                RawValue::One(s) => s,
                RawValue::Many(v) => v.into_iter().next().unwrap_or_default(),
            };
            patterns::clean_text(&text)
                .map(FieldValue::Text)
                .ok_or_else(|| "value is blank".to_string())
        }
        Field::Price => {
            let text = match raw {
                RawValue::One(s) => s,
                RawValue::Many(v) => v.into_iter().next().unwrap_or_default(),
            };
            parse_price(&text)
                .map(FieldValue::Price)
                .ok_or_else(|| format!("not a numeric price: {text:?}"))
        }
        Field::Image | Field::Link => {
            let text = match raw {
                RawValue::One(s) => s,
                RawValue::Many(v) => v.into_iter().next().unwrap_or_default(),
            };
            url_utils::resolve_url(&text, base)
                .map(|u| FieldValue::Url(u.to_string()))
                .ok_or_else(|| format!("not a resolvable http(s) URL: {text:?}"))
        }
        Field::Images => {
            let items = match raw {
                RawValue::One(s) => vec![s],
                RawValue::Many(v) => v,
            };
            let mut seen = HashSet::new();
            let urls: Vec<String> = items
                .iter()
                .filter_map(|s| url_utils::resolve_url(s, base))
                .map(|u| u.to_string())
                .filter(|u| seen.insert(u.clone()))
                .collect();
            if urls.is_empty() {
                Err(format!("none of {} image value(s) resolved to a URL", items.len()))
            } else {
                Ok(FieldValue::Urls(urls))
            }
        }
    }
}
