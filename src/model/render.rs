//! Lowering of the document model to objects and tags.
//!
//! Rendering walks the tree once, emitting objects into an
//! [`ObjectStore`] and finishing with the file header and object table.
//! The model is not mutated, so a book can be rendered repeatedly.

use std::fs;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

use crate::docinfo::docinfo_bytes;
use crate::error::{Error, Result};
use crate::media::detect_image_kind;
use crate::objects::{FileHeader, LrfObject, ObjectId, ObjectKind, ObjectStore};
use crate::stream::{
    FLAG_COMPRESSED, FLAG_FORCE_COMPRESSED, StreamOptions, StreamPayload, TOC_STREAM_FLAGS,
    build_stream,
};
use crate::tags::{
    AttrValue, EncodeCtx, Tag, Text, encode_string, is_block_attr, is_page_attr, is_text_attr,
};

use super::style::{AttrMap, attr_as_int};
use super::{
    Book, DecorEntry, Emphasis, EmphasisKind, FontEntry, ImageBlock, ImageStreamEntry, Inline,
    Page, PageContent, PlacedContent, TextBlock, TextBlockContent,
};

/// Write a [`Book`] to an LRF file on disk.
///
/// # Example
///
/// ```no_run
/// use bbeb::{Book, BookConfig, BookInfo, Page, Paragraph, TextBlock, write_lrf};
///
/// let mut book = Book::new(BookInfo::new("My Book"), BookConfig::default());
/// let mut page = Page::new();
/// let mut block = TextBlock::new();
/// block.append(Paragraph::with_text("Hello, world."));
/// page.append(block);
/// book.append_page(page)?;
/// write_lrf(&book, "output.lrf")?;
/// # Ok::<(), bbeb::Error>(())
/// ```
pub fn write_lrf<P: AsRef<Path>>(book: &Book, path: P) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    book.render(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write a [`Book`] to any [`Write`] + [`Seek`] destination.
///
/// The sink is written sequentially apart from two seek-backs that patch
/// the object-table and TOC offsets into the header.
pub fn write_lrf_to<W: Write + Seek>(book: &Book, sink: &mut W) -> Result<()> {
    book.render(sink)
}

impl Book {
    /// Lower the model and write the complete LRF container.
    pub fn render<W: Write + Seek>(&self, sink: &mut W) -> Result<()> {
        let ctx = self.encode_ctx()?;
        let opts = StreamOptions {
            optimize_tags: self.config.optimize_tags,
            optimize_compression: self.config.optimize_compression,
        };
        let mut store = ObjectStore::new();

        // The root BookAttr doubles as the page tree: it lists the pages
        // and every page points back at it.
        let mut root = LrfObject::new(ObjectId::ROOT, ObjectKind::BookAttr);
        root.push(Tag::PageList(
            self.pages.iter().map(|p| require_id(p.id)).collect::<Result<_>>()?,
        ));
        store.set_root(root);

        for font in &self.fonts {
            store.append(self.lower_font(font, &ctx, &opts)?);
            store.register_font(font.id)?;
        }
        for entry in &self.image_streams {
            store.append(self.lower_image_stream(entry, &ctx, &opts)?);
        }
        for button in &self.buttons {
            let mut obj = LrfObject::new(button.id, ObjectKind::Button);
            obj.push(Tag::ButtonFlags(0x10));
            obj.push(Tag::JumpTo {
                page: button.page,
                block: button.block,
            });
            store.append(obj);
        }
        for decor in &self.decors {
            self.lower_decor(decor, &mut store, &ctx, &opts)?;
        }

        for index in 0..self.styles.entry_count() {
            let entry = self.styles.entry(index);
            let mut obj = LrfObject::new(entry.object_id, entry.family.object_kind());
            let resolved = self.styles.resolve_index(index)?;
            for (name, value) in resolved.iter() {
                obj.push(Tag::attr(name, value.clone()));
            }
            store.append(obj);
        }

        for page in &self.pages {
            self.lower_page(page, &mut store, &ctx, &opts)?;
        }

        if !self.toc.is_empty() {
            let toc = self.lower_toc(&ctx, &opts)?;
            let toc_id = toc.id;
            store.append(toc);
            store.set_toc(toc_id);
        }

        let header = FileHeader {
            binding: self.config.binding.code(),
            dpi: self.config.dpi,
            width: self.config.screen_width,
            height: self.config.screen_height,
            color_depth: self.config.color_depth,
            docinfo: docinfo_bytes(&self.info, self.pages.len()),
            thumbnail: self
                .thumbnail
                .as_ref()
                .map(|(kind, data)| (kind.code(), data.clone())),
        };
        log::debug!(
            "rendering {} pages, {} objects",
            self.pages.len(),
            store.len()
        );
        store.write(sink, &header, &ctx)
    }

    /// Render into a fresh byte buffer.
    pub fn render_to_vec(&self) -> Result<Vec<u8>> {
        let mut sink = Cursor::new(Vec::new());
        self.render(&mut sink)?;
        Ok(sink.into_inner())
    }

    fn encode_ctx(&self) -> Result<EncodeCtx> {
        let encoding = match &self.config.source_encoding {
            Some(label) => Some(
                encoding_rs::Encoding::for_label(label.as_bytes()).ok_or_else(|| {
                    Error::BadArgument(format!("unknown encoding label: {label}"))
                })?,
            ),
            None => None,
        };
        Ok(EncodeCtx { encoding })
    }

    fn lower_page(
        &self,
        page: &Page,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<()> {
        let mut obj = LrfObject::new(require_id(page.id)?, ObjectKind::Page);
        if let Some(style) = page.style {
            obj.push(Tag::Link(self.styles.object_id(style)));
        }
        obj.push(Tag::ParentPageTree(ObjectId::ROOT));
        for (name, value) in page.attrs.iter() {
            if !is_page_attr(name) {
                crate::tags::attr_def(name)?;
                return Err(Error::BadArgument(format!(
                    "'{name}' is not a page attribute"
                )));
            }
            obj.push(Tag::attr(name, value.clone()));
        }

        let mut content_tags = Vec::with_capacity(page.content.len());
        for content in &page.content {
            content_tags.push(self.page_child_tag(content, store, ctx, opts)?);
        }
        obj.extend(build_stream(
            FLAG_COMPRESSED,
            StreamPayload::Tags(content_tags),
            ctx,
            opts,
        )?);
        store.append(obj);
        Ok(())
    }

    fn page_child_tag(
        &self,
        content: &PageContent,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<Tag> {
        match content {
            PageContent::RuledLine(line) => Ok(Tag::RuledLine {
                length: line.length,
                kind: line.kind,
                width: line.width,
                color: line.color,
            }),
            PageContent::BlockSpace(space) => Ok(Tag::BlockSpace {
                x: space.x,
                y: space.y,
            }),
            other => Ok(Tag::Link(self.lower_object_content(other, store, ctx, opts)?)),
        }
    }

    fn placed_child_tag(
        &self,
        item: &PlacedContent,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<Tag> {
        let id = self.lower_object_content(&item.content, store, ctx, opts)?;
        Ok(Tag::PutObj {
            x: item.x,
            y: item.y,
            id,
        })
    }

    /// Lower object-bearing content, appending its objects, and return
    /// the id the parent should reference.
    fn lower_object_content(
        &self,
        content: &PageContent,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<ObjectId> {
        match content {
            PageContent::TextBlock(tb) => self.lower_text_block(tb, store, ctx, opts),
            PageContent::ImageBlock(ib) => self.lower_image_block(ib, store, ctx, opts),
            PageContent::Canvas(canvas) => {
                let id = require_id(canvas.id)?;
                let mut obj = LrfObject::new(id, ObjectKind::Canvas);
                obj.push(Tag::CanvasWidth(canvas.width));
                obj.push(Tag::CanvasHeight(canvas.height));
                for (name, value) in canvas.attrs.iter() {
                    if !is_block_attr(name) {
                        crate::tags::attr_def(name)?;
                        return Err(Error::BadArgument(format!(
                            "'{name}' is not a canvas framing attribute"
                        )));
                    }
                    obj.push(Tag::attr(name, value.clone()));
                }
                let mut tags = Vec::with_capacity(canvas.items.len());
                for item in &canvas.items {
                    tags.push(self.placed_child_tag(item, store, ctx, opts)?);
                }
                obj.extend(build_stream(
                    FLAG_COMPRESSED,
                    StreamPayload::Tags(tags),
                    ctx,
                    opts,
                )?);
                store.append(obj);
                Ok(id)
            }
            PageContent::Button(id) => Ok(*id),
            PageContent::RuledLine(_) | PageContent::BlockSpace(_) => {
                Err(Error::GrammarViolation {
                    parent: "Canvas",
                    child: content.kind_name(),
                })
            }
        }
    }

    /// TextBlock lowering: an outer Block linking the block style and the
    /// inner object, plus an inner TextBlock whose compressed stream
    /// carries the text-style link, the overrides, and the paragraphs.
    fn lower_text_block(
        &self,
        tb: &TextBlock,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<ObjectId> {
        let ids = tb
            .ids
            .ok_or_else(|| Error::BadArgument("text block was never appended".into()))?;
        let text_style = tb
            .text_style
            .ok_or_else(|| Error::BadArgument("text block has no text style".into()))?;
        let block_style = tb
            .block_style
            .ok_or_else(|| Error::BadArgument("text block has no block style".into()))?;

        let mut text_overrides = AttrMap::new();
        let mut block_overrides = AttrMap::new();
        for (name, value) in tb.attrs.iter() {
            if is_text_attr(name) {
                text_overrides.set(name, value.clone());
            } else if is_block_attr(name) {
                block_overrides.set(name, value.clone());
            } else {
                crate::tags::attr_def(name)?;
                return Err(Error::BadArgument(format!(
                    "'{name}' is not a text or block attribute"
                )));
            }
        }

        // Outer block object.
        let mut outer = LrfObject::new(ids.outer, ObjectKind::Block);
        outer.push(Tag::Link(self.styles.object_id(block_style)));
        for (name, value) in block_overrides.iter() {
            outer.push(Tag::attr(name, value.clone()));
        }
        outer.extend(build_stream(
            0,
            StreamPayload::Tags(vec![Tag::Link(ids.inner)]),
            ctx,
            opts,
        )?);
        store.append(outer);

        // Inner text block object.
        let mut effective = self.styles.resolve(text_style)?;
        effective.merge_from(&text_overrides);

        let mut tags = vec![Tag::Link(self.styles.object_id(text_style))];
        for (name, value) in text_overrides.iter() {
            tags.push(Tag::attr(name, value.clone()));
        }
        for item in &tb.content {
            match item {
                TextBlockContent::Paragraph(para) => {
                    tags.push(Tag::PStart(0));
                    for inline in &para.content {
                        self.lower_inline(inline, &mut effective, &mut tags)?;
                    }
                    tags.push(Tag::PEnd);
                }
                TextBlockContent::Cr => tags.push(Tag::Cr),
            }
        }

        let mut inner = LrfObject::new(ids.inner, ObjectKind::TextBlock);
        inner.extend(build_stream(
            FLAG_COMPRESSED,
            StreamPayload::Tags(tags),
            ctx,
            opts,
        )?);
        store.append(inner);

        Ok(ids.outer)
    }

    fn lower_inline(
        &self,
        inline: &Inline,
        effective: &mut AttrMap,
        out: &mut Vec<Tag>,
    ) -> Result<()> {
        match inline {
            Inline::Text(Text::Str(s)) => out.push(Tag::TextString(Text::Str(s.clone()))),
            Inline::Text(Text::Bytes(b)) => out.push(Tag::RawText(Text::Bytes(b.clone()))),
            Inline::Cr => out.push(Tag::Cr),
            Inline::Space(x) => {
                if *x != 0 {
                    out.push(Tag::Space(*x));
                }
            }
            Inline::Plot(plot) => out.push(Tag::Plot {
                xsize: plot.xsize,
                ysize: plot.ysize,
                id: plot.object,
                adjustment: plot.adjustment,
            }),
            Inline::CharButton(cb) => {
                out.push(Tag::CharButton(cb.button));
                for child in &cb.content {
                    self.lower_inline(child, effective, out)?;
                }
                out.push(Tag::CharButtonEnd);
            }
            Inline::DropCaps(dc) => {
                out.push(Tag::DrawChar { line: dc.line });
                for child in &dc.content {
                    self.lower_inline(child, effective, out)?;
                }
                out.push(Tag::DrawCharEnd);
            }
            Inline::Emphasis(emphasis) => self.lower_emphasis(emphasis, effective, out)?,
            Inline::Span(span) => {
                // Diff against the enclosing effective style; emit only
                // what changes and restore it on close.
                let mut restores = Vec::new();
                for (name, value) in span.attrs.iter() {
                    if !is_text_attr(name) {
                        crate::tags::attr_def(name)?;
                        return Err(Error::BadArgument(format!(
                            "'{name}' is not a text attribute"
                        )));
                    }
                    let prior = effective.get(name).cloned();
                    if !loose_eq(prior.as_ref(), Some(value)) {
                        out.push(Tag::attr(name, value.clone()));
                        effective.set(name, value.clone());
                        restores.push((name.to_string(), prior));
                    }
                }
                for child in &span.content {
                    self.lower_inline(child, effective, out)?;
                }
                for (name, prior) in restores {
                    match prior {
                        Some(value) => {
                            out.push(Tag::attr(name.clone(), value.clone()));
                            effective.set(name, value);
                        }
                        None => effective.remove(&name),
                    }
                }
            }
        }
        Ok(())
    }

    fn lower_emphasis(
        &self,
        emphasis: &Emphasis,
        effective: &mut AttrMap,
        out: &mut Vec<Tag>,
    ) -> Result<()> {
        let (open, close) = match emphasis.kind {
            EmphasisKind::Italic => (Tag::Italic, Tag::ItalicEnd),
            EmphasisKind::Sup => (Tag::Sup, Tag::SupEnd),
            EmphasisKind::Sub => (Tag::Sub, Tag::SubEnd),
            EmphasisKind::NoBr => (Tag::NoBr, Tag::NoBrEnd),
            EmphasisKind::EmpLine => (Tag::EmpLine, Tag::EmpLineEnd),
            EmphasisKind::Boxed(kind) => (Tag::Box(kind), Tag::BoxEnd),
        };
        out.push(open);
        for child in &emphasis.content {
            self.lower_inline(child, effective, out)?;
        }
        out.push(close);
        Ok(())
    }

    fn lower_image_block(
        &self,
        ib: &ImageBlock,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<ObjectId> {
        let ids = ib
            .ids
            .ok_or_else(|| Error::BadArgument("image block was never appended".into()))?;

        let mut outer = LrfObject::new(ids.outer, ObjectKind::Block);
        outer.extend(build_stream(
            0,
            StreamPayload::Tags(vec![Tag::Link(ids.inner)]),
            ctx,
            opts,
        )?);
        store.append(outer);

        let (x0, y0, x1, y1) = ib.rect;
        let mut inner = LrfObject::new(ids.inner, ObjectKind::ImageBlock);
        inner.push(Tag::ImageRect { x0, y0, x1, y1 });
        inner.push(Tag::ImageSize {
            width: ib.width,
            height: ib.height,
        });
        inner.push(Tag::RefObjId(ib.stream));
        if let Some(alt) = &ib.alt {
            inner.push(Tag::Comment(alt.clone()));
        }
        store.append(inner);

        Ok(ids.outer)
    }

    fn lower_decor(
        &self,
        decor: &DecorEntry,
        store: &mut ObjectStore,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<()> {
        let mut tags = Vec::with_capacity(decor.items.len());
        for item in &decor.items {
            tags.push(self.placed_child_tag(item, store, ctx, opts)?);
        }
        let mut obj = LrfObject::new(decor.id, decor.kind);
        obj.extend(build_stream(
            FLAG_COMPRESSED,
            StreamPayload::Tags(tags),
            ctx,
            opts,
        )?);
        store.append(obj);
        Ok(())
    }

    fn lower_font(
        &self,
        font: &FontEntry,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<LrfObject> {
        let data = fs::read(&font.path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FontNotFound(font.path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;
        let filename = font
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut obj = LrfObject::new(font.id, ObjectKind::Font);
        obj.push(Tag::FontFilename(filename));
        obj.push(Tag::FontFacename(font.facename.clone()));
        obj.extend(build_stream(
            FLAG_FORCE_COMPRESSED,
            StreamPayload::Bytes(data),
            ctx,
            opts,
        )?);
        Ok(obj)
    }

    fn lower_image_stream(
        &self,
        entry: &ImageStreamEntry,
        ctx: &EncodeCtx,
        opts: &StreamOptions,
    ) -> Result<LrfObject> {
        let stream = &entry.stream;
        let data = match (&stream.path, &stream.data) {
            (Some(path), _) => fs::read(path)?,
            (None, Some(data)) => data.clone(),
            (None, None) => return Err(Error::MissingExtensionData),
        };
        let path_hint = stream
            .path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = stream
            .kind
            .or_else(|| detect_image_kind(&path_hint, &data))
            .ok_or_else(|| {
                Error::BadArgument(format!("cannot determine image encoding: {path_hint}"))
            })?;

        let mut obj = LrfObject::new(entry.id, ObjectKind::ImageStream);
        // Image payloads are already compressed; the stream flags carry
        // the image type code instead of the compression bit.
        obj.extend(build_stream(
            kind.code(),
            StreamPayload::Bytes(data),
            ctx,
            opts,
        )?);
        Ok(obj)
    }

    /// TOC payload: entry count, cumulative offsets, then
    /// (page id, block id, length-prefixed UTF-16LE label) per entry.
    fn lower_toc(&self, ctx: &EncodeCtx, opts: &StreamOptions) -> Result<LrfObject> {
        let toc_id = self
            .toc_id
            .ok_or_else(|| Error::BadArgument("TOC has entries but no object id".into()))?;

        let mut encoded_entries = Vec::with_capacity(self.toc.len());
        for entry in &self.toc {
            if entry.page.0 == 0 || entry.block.0 == 0 {
                return Err(Error::BadArgument(format!(
                    "TOC entry '{}' references object id 0",
                    entry.label
                )));
            }
            let mut bytes = Vec::new();
            bytes.extend_from_slice(&entry.page.0.to_le_bytes());
            bytes.extend_from_slice(&entry.block.0.to_le_bytes());
            bytes.extend_from_slice(&encode_string(&entry.label)?);
            encoded_entries.push(bytes);
        }

        let mut payload = Vec::new();
        payload.extend_from_slice(&(encoded_entries.len() as u32).to_le_bytes());
        let mut offset = 0u32;
        for bytes in &encoded_entries {
            payload.extend_from_slice(&offset.to_le_bytes());
            offset += bytes.len() as u32;
        }
        for bytes in &encoded_entries {
            payload.extend_from_slice(bytes);
        }

        let mut obj = LrfObject::new(toc_id, ObjectKind::Toc);
        obj.extend(build_stream(
            TOC_STREAM_FLAGS,
            StreamPayload::Bytes(payload),
            ctx,
            opts,
        )?);
        Ok(obj)
    }
}

fn require_id(id: Option<ObjectId>) -> Result<ObjectId> {
    id.ok_or_else(|| Error::BadArgument("node was never appended".into()))
}

/// Attribute equality that treats `Int(100)` and `Str("100")` as equal.
fn loose_eq(a: Option<&AttrValue>, b: Option<&AttrValue>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a == b {
                return true;
            }
            match (attr_as_int(Some(a)), attr_as_int(Some(b))) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            }
        }
        (None, None) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docinfo::BookInfo;
    use crate::model::{BookConfig, Paragraph, Span};

    fn book() -> Book {
        Book::new(BookInfo::new("Test"), BookConfig::default())
    }

    fn simple_book() -> Book {
        let mut book = book();
        let mut page = Page::new();
        let mut tb = TextBlock::new();
        tb.append(Paragraph::with_text("Hello, world."));
        page.append(tb);
        book.append_page(page).unwrap();
        book
    }

    #[test]
    fn test_render_is_repeatable() {
        let book = simple_book();
        let first = book.render_to_vec().unwrap();
        let second = book.render_to_vec().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unknown_encoding_label_is_rejected() {
        let mut config = BookConfig::default();
        config.source_encoding = Some("klingon-8".to_string());
        let book = Book::new(BookInfo::new("T"), config);
        assert!(matches!(
            book.render_to_vec(),
            Err(Error::BadArgument(_))
        ));
    }

    #[test]
    fn test_missing_font_file_maps_to_font_not_found() {
        let mut book = simple_book();
        book.add_font("/nonexistent/font.ttf", "Ghost");
        assert!(matches!(
            book.render_to_vec(),
            Err(Error::FontNotFound(_))
        ));
    }

    #[test]
    fn test_span_restores_prior_value() {
        let mut effective = AttrMap::new();
        effective.set("fontsize", 100);

        let book = book();
        let mut span = Span::new().with("fontsize", 200);
        span.append(Inline::text("b"));
        let mut out = Vec::new();
        book.lower_inline(&Inline::Span(span), &mut effective, &mut out)
            .unwrap();

        assert_eq!(
            out,
            vec![
                Tag::attr("fontsize", 200),
                Tag::TextString(Text::Str("b".into())),
                Tag::attr("fontsize", 100),
            ]
        );
        assert_eq!(effective.get("fontsize"), Some(&AttrValue::Int(100)));
    }

    #[test]
    fn test_span_equal_value_emits_nothing() {
        let mut effective = AttrMap::new();
        effective.set("fontsize", 100);

        let book = book();
        let mut span = Span::new().with("fontsize", 100);
        span.append(Inline::text("b"));
        let mut out = Vec::new();
        book.lower_inline(&Inline::Span(span), &mut effective, &mut out)
            .unwrap();
        assert_eq!(out, vec![Tag::TextString(Text::Str("b".into()))]);
    }

    #[test]
    fn test_nested_spans_restore_in_order() {
        let mut effective = AttrMap::new();
        effective.set("fontsize", 100);

        let book = book();
        let mut inner = Span::new().with("fontsize", 300);
        inner.append(Inline::text("deep"));
        let mut outer_span = Span::new().with("fontsize", 200);
        outer_span.append(inner);
        let mut out = Vec::new();
        book.lower_inline(&Inline::Span(outer_span), &mut effective, &mut out)
            .unwrap();

        assert_eq!(
            out,
            vec![
                Tag::attr("fontsize", 200),
                Tag::attr("fontsize", 300),
                Tag::TextString(Text::Str("deep".into())),
                Tag::attr("fontsize", 200),
                Tag::attr("fontsize", 100),
            ]
        );
    }

    #[test]
    fn test_zero_space_is_dropped() {
        let book = book();
        let mut effective = AttrMap::new();
        let mut out = Vec::new();
        book.lower_inline(&Inline::Space(0), &mut effective, &mut out)
            .unwrap();
        assert!(out.is_empty());
        book.lower_inline(&Inline::Space(12), &mut effective, &mut out)
            .unwrap();
        assert_eq!(out, vec![Tag::Space(12)]);
    }

    #[test]
    fn test_loose_eq() {
        assert!(loose_eq(
            Some(&AttrValue::Int(100)),
            Some(&AttrValue::Str("100".into()))
        ));
        assert!(!loose_eq(
            Some(&AttrValue::Int(100)),
            Some(&AttrValue::Int(200))
        ));
        assert!(loose_eq(None, None));
        assert!(!loose_eq(Some(&AttrValue::Int(1)), None));
    }
}
