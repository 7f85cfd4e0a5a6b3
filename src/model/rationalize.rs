//! Font-size rationalisation: rescale every declared font size so the
//! dominant effective size lands on a requested base.

use std::collections::HashMap;

use super::style::attr_as_int;
use super::{Book, Inline, PageContent, PlacedContent, TextBlock, TextBlockContent};
use crate::tags::Text;

impl Book {
    /// Rescale declared `fontsize` and `baselineskip` values so that the
    /// most common effective font size (weighted by character count)
    /// becomes `base` (points x 10).
    ///
    /// The effective size of a text run is the innermost declaration
    /// found walking span, then text-block override, then the text
    /// style's own chain; `base` stands in where nothing declares one.
    pub fn rationalize_font_sizes(&mut self, base: i64) {
        let mut weights: HashMap<i64, u64> = HashMap::new();
        for page in &self.pages {
            for content in &page.content {
                self.weigh_content(content, base, &mut weights);
            }
        }
        for decor in &self.decors {
            for item in &decor.items {
                self.weigh_content(&item.content, base, &mut weights);
            }
        }

        // Most-weighted size wins; ties break towards the larger size so
        // the result is deterministic.
        let Some((&old_base, _)) = weights
            .iter()
            .max_by_key(|(size, weight)| (**weight, **size))
        else {
            return;
        };
        if old_base == base || old_base <= 0 {
            return;
        }
        let k = base as f64 / old_base as f64;
        log::debug!("rationalizing font sizes: {old_base} -> {base} (x{k:.3})");

        self.styles.rescale_font_sizes(k);
        for page in &mut self.pages {
            for content in &mut page.content {
                rescale_content(content, k);
            }
        }
        for decor in &mut self.decors {
            for item in &mut decor.items {
                rescale_content(&mut item.content, k);
            }
        }
    }

    fn weigh_content(&self, content: &PageContent, base: i64, weights: &mut HashMap<i64, u64>) {
        match content {
            PageContent::TextBlock(tb) => self.weigh_text_block(tb, base, weights),
            PageContent::Canvas(canvas) => {
                for PlacedContent { content, .. } in &canvas.items {
                    self.weigh_content(content, base, weights);
                }
            }
            _ => {}
        }
    }

    fn weigh_text_block(&self, tb: &TextBlock, base: i64, weights: &mut HashMap<i64, u64>) {
        let block_size = attr_as_int(tb.attrs.get("fontsize"))
            .or_else(|| {
                tb.text_style
                    .and_then(|style| attr_as_int(self.styles.declared(style, "fontsize")))
            })
            .unwrap_or(base);
        for item in &tb.content {
            if let TextBlockContent::Paragraph(para) = item {
                for inline in &para.content {
                    weigh_inline(inline, block_size, weights);
                }
            }
        }
    }
}

fn weigh_inline(inline: &Inline, current: i64, weights: &mut HashMap<i64, u64>) {
    match inline {
        Inline::Text(Text::Str(s)) => {
            *weights.entry(current).or_insert(0) += s.chars().count() as u64;
        }
        Inline::Text(Text::Bytes(b)) => {
            *weights.entry(current).or_insert(0) += b.len() as u64;
        }
        Inline::Span(span) => {
            let size = attr_as_int(span.attrs.get("fontsize")).unwrap_or(current);
            for child in &span.content {
                weigh_inline(child, size, weights);
            }
        }
        Inline::CharButton(cb) => {
            for child in &cb.content {
                weigh_inline(child, current, weights);
            }
        }
        Inline::DropCaps(dc) => {
            for child in &dc.content {
                weigh_inline(child, current, weights);
            }
        }
        Inline::Emphasis(emphasis) => {
            for child in &emphasis.content {
                weigh_inline(child, current, weights);
            }
        }
        _ => {}
    }
}

fn rescale_content(content: &mut PageContent, k: f64) {
    match content {
        PageContent::TextBlock(tb) => {
            rescale_attrs(&mut tb.attrs, k);
            for item in &mut tb.content {
                if let TextBlockContent::Paragraph(para) = item {
                    for inline in &mut para.content {
                        rescale_inline(inline, k);
                    }
                }
            }
        }
        PageContent::Canvas(canvas) => {
            for item in &mut canvas.items {
                rescale_content(&mut item.content, k);
            }
        }
        _ => {}
    }
}

fn rescale_inline(inline: &mut Inline, k: f64) {
    match inline {
        Inline::Span(span) => {
            rescale_attrs(&mut span.attrs, k);
            for child in &mut span.content {
                rescale_inline(child, k);
            }
        }
        Inline::CharButton(cb) => {
            for child in &mut cb.content {
                rescale_inline(child, k);
            }
        }
        Inline::DropCaps(dc) => {
            for child in &mut dc.content {
                rescale_inline(child, k);
            }
        }
        Inline::Emphasis(emphasis) => {
            for child in &mut emphasis.content {
                rescale_inline(child, k);
            }
        }
        _ => {}
    }
}

fn rescale_attrs(attrs: &mut super::AttrMap, k: f64) {
    for name in ["fontsize", "baselineskip"] {
        if let Some(v) = attr_as_int(attrs.get(name)) {
            attrs.set(name, (v as f64 * k).round() as i64);
        }
    }
}
