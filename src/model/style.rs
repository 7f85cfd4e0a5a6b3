//! Style registry and linear style resolution.
//!
//! Each style belongs to a family (text / block / page) and may name a
//! parent style. Resolution folds, in order: the family defaults, each
//! ancestor's own attributes (root first), then the style's own
//! attributes; per-element overrides are applied on top by the renderer.

use crate::error::{Error, Result};
use crate::objects::{ObjectId, ObjectKind};
use crate::tags::{AttrValue, is_block_attr, is_page_attr, is_text_attr};

/// An ordered name -> value attribute bundle. Duplicate names resolve
/// most-recent-wins while keeping the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttrMap {
    entries: Vec<(String, AttrValue)>,
}

impl AttrMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn remove(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn merge_from(&mut self, other: &AttrMap) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }
}

/// Read an attribute as an integer, accepting textual integers.
pub(crate) fn attr_as_int(value: Option<&AttrValue>) -> Option<i64> {
    match value {
        Some(AttrValue::Int(v)) => Some(*v),
        Some(AttrValue::Str(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Style family: which attribute catalogue and default set apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFamily {
    Text,
    Block,
    Page,
}

impl StyleFamily {
    pub(crate) fn object_kind(self) -> ObjectKind {
        match self {
            StyleFamily::Text => ObjectKind::TextAttr,
            StyleFamily::Block => ObjectKind::BlockAttr,
            StyleFamily::Page => ObjectKind::PageAttr,
        }
    }

    fn accepts(self, name: &str) -> bool {
        match self {
            StyleFamily::Text => is_text_attr(name),
            StyleFamily::Block => is_block_attr(name),
            StyleFamily::Page => is_page_attr(name),
        }
    }
}

/// A named style definition, built detached and registered on a book.
#[derive(Debug, Clone, Default)]
pub struct Style {
    pub(crate) name: String,
    pub(crate) parent: Option<String>,
    pub(crate) attrs: AttrMap,
}

impl Style {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attrs: AttrMap::new(),
        }
    }

    /// Inherit from another registered style of the same family.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }
}

/// Opaque handle to a registered style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleRef {
    pub(crate) index: usize,
    pub(crate) family: StyleFamily,
}

#[derive(Debug)]
pub(crate) struct StyleEntry {
    pub(crate) name: String,
    pub(crate) family: StyleFamily,
    pub(crate) parent: Option<String>,
    pub(crate) attrs: AttrMap,
    pub(crate) object_id: ObjectId,
}

/// All registered styles of a book plus the per-family default sets.
#[derive(Debug)]
pub(crate) struct StyleRegistry {
    entries: Vec<StyleEntry>,
    text_defaults: AttrMap,
    block_defaults: AttrMap,
    page_defaults: AttrMap,
    default_text: Option<StyleRef>,
    default_block: Option<StyleRef>,
}

impl StyleRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            text_defaults: text_defaults(),
            block_defaults: block_defaults(),
            page_defaults: page_defaults(),
            default_text: None,
            default_block: None,
        }
    }

    pub(crate) fn defaults(&self, family: StyleFamily) -> &AttrMap {
        match family {
            StyleFamily::Text => &self.text_defaults,
            StyleFamily::Block => &self.block_defaults,
            StyleFamily::Page => &self.page_defaults,
        }
    }

    /// Register a style; clashing names are renamed with an `M` prefix.
    pub(crate) fn register(
        &mut self,
        family: StyleFamily,
        style: Style,
        object_id: ObjectId,
    ) -> Result<StyleRef> {
        for (name, _) in style.attrs.iter() {
            crate::tags::attr_def(name)?;
            if !family.accepts(name) {
                return Err(Error::BadArgument(format!(
                    "'{name}' is not a {} attribute",
                    family_name(family)
                )));
            }
        }

        let mut name = style.name;
        while self.entries.iter().any(|e| e.name == name) {
            name = format!("M{name}");
        }

        let index = self.entries.len();
        self.entries.push(StyleEntry {
            name,
            family,
            parent: style.parent,
            attrs: style.attrs,
            object_id,
        });
        Ok(StyleRef { index, family })
    }

    /// The lazily-created default style of a family: empty own attributes,
    /// so it resolves to exactly the family defaults.
    pub(crate) fn ensure_default(
        &mut self,
        family: StyleFamily,
        next_id: &mut u32,
    ) -> Result<StyleRef> {
        let (slot, name) = match family {
            StyleFamily::Text => (self.default_text, "defaulttext"),
            StyleFamily::Block => (self.default_block, "defaultblock"),
            StyleFamily::Page => unreachable!("pages have no implicit default style"),
        };
        if let Some(re) = slot {
            return Ok(re);
        }
        let object_id = ObjectId(*next_id);
        *next_id += 1;
        let re = self.register(family, Style::new(name), object_id)?;
        match family {
            StyleFamily::Text => self.default_text = Some(re),
            StyleFamily::Block => self.default_block = Some(re),
            StyleFamily::Page => {}
        }
        Ok(re)
    }

    pub(crate) fn object_id(&self, re: StyleRef) -> ObjectId {
        self.entries[re.index].object_id
    }

    pub(crate) fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn entry(&self, index: usize) -> &StyleEntry {
        &self.entries[index]
    }

    /// Resolved attribute map: defaults, then each ancestor's own map
    /// (root first), then the style's own map.
    pub(crate) fn resolve(&self, re: StyleRef) -> Result<AttrMap> {
        self.resolve_index(re.index)
    }

    pub(crate) fn resolve_index(&self, index: usize) -> Result<AttrMap> {
        let entry = &self.entries[index];
        let mut attrs = self.defaults(entry.family).clone();
        for idx in self.ancestor_chain(index)? {
            attrs.merge_from(&self.entries[idx].attrs);
        }
        Ok(attrs)
    }

    /// The style's own declared value for an attribute, searching up the
    /// parent chain but never the family defaults.
    pub(crate) fn declared(&self, re: StyleRef, name: &str) -> Option<&AttrValue> {
        let chain = self.ancestor_chain(re.index).ok()?;
        chain
            .iter()
            .rev()
            .find_map(|idx| self.entries[*idx].attrs.get(name))
    }

    fn ancestor_chain(&self, index: usize) -> Result<Vec<usize>> {
        let mut chain = vec![index];
        let mut current = index;
        while let Some(parent_name) = &self.entries[current].parent {
            let family = self.entries[current].family;
            let parent = self
                .entries
                .iter()
                .position(|e| e.family == family && e.name == *parent_name)
                .ok_or_else(|| {
                    Error::BadArgument(format!("unknown parent style: {parent_name}"))
                })?;
            if chain.contains(&parent) {
                return Err(Error::StyleCycle(parent_name.clone()));
            }
            chain.push(parent);
            current = parent;
        }
        chain.reverse();
        Ok(chain)
    }

    /// Multiply declared fontsize/baselineskip on all text styles by `k`.
    pub(crate) fn rescale_font_sizes(&mut self, k: f64) {
        for entry in &mut self.entries {
            if entry.family != StyleFamily::Text {
                continue;
            }
            for name in ["fontsize", "baselineskip"] {
                if let Some(v) = attr_as_int(entry.attrs.get(name)) {
                    entry.attrs.set(name, (v as f64 * k).round() as i64);
                }
            }
        }
    }
}

fn family_name(family: StyleFamily) -> &'static str {
    match family {
        StyleFamily::Text => "text",
        StyleFamily::Block => "block",
        StyleFamily::Page => "page",
    }
}

fn text_defaults() -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.set("fontsize", 100);
    attrs.set("fontwidth", -10);
    attrs.set("fontescapement", 0);
    attrs.set("fontorientation", 0);
    attrs.set("fontweight", 400);
    attrs.set("fontfacename", "Dutch801 Rm BT Roman");
    attrs.set("textcolor", "0x00000000");
    attrs.set("textbgcolor", "0xFF000000");
    attrs.set("wordspace", 25);
    attrs.set("letterspace", 0);
    attrs.set("baselineskip", 120);
    attrs.set("linespace", 10);
    attrs.set("parindent", 0);
    attrs.set("parskip", 0);
    attrs
}

fn block_defaults() -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.set("blockwidth", 560);
    attrs.set("blockheight", 100);
    attrs.set("blockrule", "horz-fixed");
    attrs.set("layout", "LrTb");
    attrs.set("bgcolor", "0xFF000000");
    attrs.set("framecolor", "0x00000000");
    attrs.set("framemode", "square");
    attrs.set("framewidth", 0);
    attrs.set("topskip", 0);
    attrs.set("sidemargin", 0);
    attrs.set("footskip", 0);
    attrs
}

fn page_defaults() -> AttrMap {
    let mut attrs = AttrMap::new();
    attrs.set("pagewidth", 600);
    attrs.set("pageheight", 800);
    attrs.set("topmargin", 0);
    attrs.set("headheight", 0);
    attrs.set("headsep", 0);
    attrs.set("oddsidemargin", 25);
    attrs.set("evensidemargin", 25);
    attrs.set("textwidth", 575);
    attrs.set("textheight", 750);
    attrs.set("footspace", 0);
    attrs.set("footheight", 0);
    attrs.set("pageposition", "any");
    attrs.set("setemptyview", "show");
    attrs.set("setwaitprop", "noreplay");
    attrs
}
