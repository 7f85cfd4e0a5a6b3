//! High-level document model for LRF books.
//!
//! This module contains:
//! - The [`Book`] root: configuration, metadata, pages, styles, fonts,
//!   free objects (image streams, jump buttons), and TOC entries
//! - Node types for page and inline content, modelled as tagged unions
//! - Append-time grammar checks and eager object-id assignment
//!
//! Ownership is strictly child-from-parent: nodes are constructed
//! detached and moved into their parent on append. Appending assigns
//! object ids to every id-bearing node in the subtree, so rendering
//! never mutates the model and a book can be rendered repeatedly.

mod rationalize;
pub mod render;
mod style;

use std::path::{Path, PathBuf};

use crate::docinfo::BookInfo;
use crate::error::{Error, Result};
use crate::media::{ImageKind, detect_image_kind};
use crate::objects::{ObjectId, ObjectKind};
use crate::tags::{Color, LineKind, PlotAdjustment, Text};

pub use crate::tags::AttrValue;
pub use render::{write_lrf, write_lrf_to};
pub use style::{AttrMap, Style, StyleFamily, StyleRef};

pub(crate) use style::StyleRegistry;

/// Page binding direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    FrontToBack,
    BackToFront,
}

impl Binding {
    pub(crate) fn code(self) -> u16 {
        match self {
            Binding::FrontToBack => 1,
            Binding::BackToFront => 16,
        }
    }
}

/// Book-level configuration, fixed at construction time.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Encoding label for caller-supplied byte text (e.g. "utf-8",
    /// "cp1252"). `None` makes byte text fail with `EncodingRequired`.
    pub source_encoding: Option<String>,
    pub binding: Binding,
    pub dpi: u32,
    pub screen_width: u16,
    pub screen_height: u16,
    pub color_depth: u16,
    /// Drop dead and redundant per-text setting tags from streams.
    pub optimize_tags: bool,
    /// Store stream payloads uncompressed when deflate does not pay.
    pub optimize_compression: bool,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            source_encoding: Some("utf-8".to_string()),
            binding: Binding::FrontToBack,
            dpi: 1660,
            screen_width: 600,
            screen_height: 800,
            color_depth: 24,
            optimize_tags: true,
            optimize_compression: true,
        }
    }
}

/// Object ids assigned to a page and its object-bearing content, in
/// content order. TOC entries reference the inner text-block ids.
#[derive(Debug, Clone)]
pub struct PageIds {
    pub page: ObjectId,
    pub blocks: Vec<ObjectId>,
}

/// One table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub page: ObjectId,
    pub block: ObjectId,
    pub label: String,
}

pub(crate) struct FontEntry {
    pub(crate) id: ObjectId,
    pub(crate) path: PathBuf,
    pub(crate) facename: String,
}

pub(crate) struct ImageStreamEntry {
    pub(crate) id: ObjectId,
    pub(crate) stream: ImageStream,
}

pub(crate) struct ButtonEntry {
    pub(crate) id: ObjectId,
    pub(crate) page: ObjectId,
    pub(crate) block: ObjectId,
}

pub(crate) struct DecorEntry {
    pub(crate) id: ObjectId,
    pub(crate) kind: ObjectKind,
    pub(crate) items: Vec<PlacedContent>,
}

/// The root of the document model.
///
/// Owns the object-id counter, so two books can be built side by side
/// without interference.
pub struct Book {
    pub info: BookInfo,
    pub(crate) config: BookConfig,
    pub(crate) thumbnail: Option<(ImageKind, Vec<u8>)>,
    pub(crate) next_id: u32,
    pub(crate) pages: Vec<Page>,
    pub(crate) styles: StyleRegistry,
    pub(crate) fonts: Vec<FontEntry>,
    pub(crate) image_streams: Vec<ImageStreamEntry>,
    pub(crate) buttons: Vec<ButtonEntry>,
    pub(crate) decors: Vec<DecorEntry>,
    pub(crate) toc: Vec<TocEntry>,
    pub(crate) toc_id: Option<ObjectId>,
}

impl Book {
    pub fn new(info: BookInfo, config: BookConfig) -> Self {
        Self {
            info,
            config,
            thumbnail: None,
            // Id 1 is reserved for the root BookAttr object.
            next_id: 2,
            pages: Vec::new(),
            styles: StyleRegistry::new(),
            fonts: Vec::new(),
            image_streams: Vec::new(),
            buttons: Vec::new(),
            decors: Vec::new(),
            toc: Vec::new(),
            toc_id: None,
        }
    }

    pub fn config(&self) -> &BookConfig {
        &self.config
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn alloc_id(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Set the cover thumbnail. The image kind is guessed from the bytes
    /// when not supplied.
    pub fn set_thumbnail(&mut self, data: Vec<u8>, kind: Option<ImageKind>) -> Result<()> {
        let kind = kind
            .or_else(|| detect_image_kind("", &data))
            .ok_or_else(|| Error::BadArgument("cannot determine thumbnail image kind".into()))?;
        self.thumbnail = Some((kind, data));
        Ok(())
    }

    /// Register a text style. Returns a handle for use on text blocks and
    /// as a parent of later styles.
    pub fn add_text_style(&mut self, style: Style) -> Result<StyleRef> {
        let id = self.alloc_id();
        self.styles.register(StyleFamily::Text, style, id)
    }

    pub fn add_block_style(&mut self, style: Style) -> Result<StyleRef> {
        let id = self.alloc_id();
        self.styles.register(StyleFamily::Block, style, id)
    }

    pub fn add_page_style(&mut self, style: Style) -> Result<StyleRef> {
        let id = self.alloc_id();
        self.styles.register(StyleFamily::Page, style, id)
    }

    /// Resolved attribute map of a registered style: family defaults,
    /// ancestors root-first, then the style's own attributes.
    pub fn resolve_style(&self, style: StyleRef) -> Result<AttrMap> {
        self.styles.resolve(style)
    }

    /// Register a TrueType font to embed. The file is read at render time.
    pub fn add_font(&mut self, path: impl Into<PathBuf>, facename: impl Into<String>) -> ObjectId {
        let id = self.alloc_id();
        self.fonts.push(FontEntry {
            id,
            path: path.into(),
            facename: facename.into(),
        });
        id
    }

    /// Register an image stream, returning the id image blocks and plots
    /// refer to.
    pub fn add_image_stream(&mut self, stream: ImageStream) -> Result<ObjectId> {
        if stream.path.is_none() && stream.data.is_none() {
            return Err(Error::MissingExtensionData);
        }
        let id = self.alloc_id();
        self.image_streams.push(ImageStreamEntry { id, stream });
        Ok(id)
    }

    /// Register a jump button targeting a block on an appended page.
    pub fn add_jump_button(&mut self, page: ObjectId, block: ObjectId) -> Result<ObjectId> {
        self.require_block_on_page(page, block)?;
        let id = self.alloc_id();
        self.buttons.push(ButtonEntry { id, page, block });
        Ok(id)
    }

    /// Register a header object referenced from page styles through the
    /// `oddheaderid` / `evenheaderid` attributes. One header may be shared
    /// by any number of page styles.
    pub fn add_header(&mut self, decor: HeaderFooter) -> Result<ObjectId> {
        self.add_decor(decor, ObjectKind::Header)
    }

    /// Register a footer object; the footer analogue of [`Self::add_header`].
    pub fn add_footer(&mut self, decor: HeaderFooter) -> Result<ObjectId> {
        self.add_decor(decor, ObjectKind::Footer)
    }

    fn add_decor(&mut self, mut decor: HeaderFooter, kind: ObjectKind) -> Result<ObjectId> {
        if decor.id.is_some() {
            return Err(Error::AlreadyParented);
        }
        let id = self.alloc_id();
        decor.id = Some(id);
        let mut ignored = Vec::new();
        for item in &mut decor.items {
            self.assign_content_ids(&mut item.content, &mut ignored)?;
        }
        self.decors.push(DecorEntry {
            id,
            kind,
            items: decor.items,
        });
        Ok(id)
    }

    /// Append a page, assigning object ids through its whole subtree.
    /// Text blocks carrying a TOC label are added to the TOC here.
    pub fn append_page(&mut self, mut page: Page) -> Result<PageIds> {
        if page.id.is_some() {
            return Err(Error::AlreadyParented);
        }
        let page_id = self.alloc_id();
        page.id = Some(page_id);

        let mut blocks = Vec::new();
        for content in &mut page.content {
            self.assign_content_ids(content, &mut blocks)?;
        }

        // Register labelled text blocks with the TOC.
        for content in &page.content {
            if let PageContent::TextBlock(tb) = content
                && let (Some(label), Some(ids)) = (&tb.toc_label, &tb.ids)
            {
                self.push_toc_entry(TocEntry {
                    page: page_id,
                    block: ids.inner,
                    label: label.clone(),
                });
            }
        }

        self.pages.push(page);
        Ok(PageIds {
            page: page_id,
            blocks,
        })
    }

    /// Add an explicit TOC entry pointing at a block already appended to
    /// a page.
    pub fn add_toc_entry(
        &mut self,
        label: impl Into<String>,
        page: ObjectId,
        block: ObjectId,
    ) -> Result<()> {
        self.require_block_on_page(page, block)?;
        self.push_toc_entry(TocEntry {
            page,
            block,
            label: label.into(),
        });
        Ok(())
    }

    fn push_toc_entry(&mut self, entry: TocEntry) {
        if self.toc_id.is_none() {
            self.toc_id = Some(self.alloc_id());
        }
        self.toc.push(entry);
    }

    fn require_block_on_page(&self, page: ObjectId, block: ObjectId) -> Result<()> {
        let found = self
            .pages
            .iter()
            .find(|p| p.id == Some(page))
            .ok_or_else(|| Error::BadArgument(format!("page {page} has not been appended")))?;
        if !found.content.iter().any(|c| content_has_block(c, block)) {
            return Err(Error::BadArgument(format!(
                "block {block} is not on page {page}"
            )));
        }
        Ok(())
    }

    fn assign_content_ids(
        &mut self,
        content: &mut PageContent,
        blocks: &mut Vec<ObjectId>,
    ) -> Result<()> {
        match content {
            PageContent::TextBlock(tb) => {
                if tb.ids.is_some() {
                    return Err(Error::AlreadyParented);
                }
                if tb.text_style.is_none() {
                    tb.text_style =
                        Some(self.styles.ensure_default(StyleFamily::Text, &mut self.next_id)?);
                }
                if tb.block_style.is_none() {
                    tb.block_style =
                        Some(self.styles.ensure_default(StyleFamily::Block, &mut self.next_id)?);
                }
                let outer = self.alloc_id();
                let inner = self.alloc_id();
                tb.ids = Some(BlockIds { outer, inner });
                blocks.push(inner);
            }
            PageContent::ImageBlock(ib) => {
                if ib.ids.is_some() {
                    return Err(Error::AlreadyParented);
                }
                let outer = self.alloc_id();
                let inner = self.alloc_id();
                ib.ids = Some(BlockIds { outer, inner });
                blocks.push(inner);
            }
            PageContent::Canvas(canvas) => {
                if canvas.id.is_some() {
                    return Err(Error::AlreadyParented);
                }
                let id = self.alloc_id();
                canvas.id = Some(id);
                blocks.push(id);
                let mut nested = Vec::new();
                for item in &mut canvas.items {
                    self.assign_content_ids(&mut item.content, &mut nested)?;
                }
            }
            PageContent::Button(id) => {
                if !self.buttons.iter().any(|b| b.id == *id) {
                    return Err(Error::BadArgument(format!("button {id} is not registered")));
                }
            }
            PageContent::RuledLine(_) | PageContent::BlockSpace(_) => {}
        }
        Ok(())
    }
}

fn content_has_block(content: &PageContent, block: ObjectId) -> bool {
    match content {
        PageContent::TextBlock(tb) => tb.ids.as_ref().is_some_and(|ids| ids.inner == block),
        PageContent::ImageBlock(ib) => ib.ids.as_ref().is_some_and(|ids| ids.inner == block),
        PageContent::Canvas(canvas) => {
            canvas.id == Some(block)
                || canvas
                    .items
                    .iter()
                    .any(|item| content_has_block(&item.content, block))
        }
        PageContent::Button(id) => *id == block,
        PageContent::RuledLine(_) | PageContent::BlockSpace(_) => false,
    }
}

// ============================================================================
// Page-level content
// ============================================================================

/// An unstyled page. A page style, when set, must come from
/// [`Book::add_page_style`].
#[derive(Default)]
pub struct Page {
    pub(crate) id: Option<ObjectId>,
    pub(crate) style: Option<StyleRef>,
    pub(crate) attrs: AttrMap,
    pub(crate) content: Vec<PageContent>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: StyleRef) -> Self {
        self.style = Some(style);
        self
    }

    /// Set a per-page override of a page-family attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(name, value);
    }

    pub fn append(&mut self, content: impl Into<PageContent>) {
        self.content.push(content.into());
    }
}

/// Content a page (or canvas, header, footer) can hold.
pub enum PageContent {
    TextBlock(TextBlock),
    ImageBlock(ImageBlock),
    RuledLine(RuledLine),
    BlockSpace(BlockSpace),
    Canvas(Canvas),
    /// A page-level placement of a registered jump button.
    Button(ObjectId),
}

impl From<TextBlock> for PageContent {
    fn from(tb: TextBlock) -> Self {
        PageContent::TextBlock(tb)
    }
}

impl From<ImageBlock> for PageContent {
    fn from(ib: ImageBlock) -> Self {
        PageContent::ImageBlock(ib)
    }
}

impl From<RuledLine> for PageContent {
    fn from(r: RuledLine) -> Self {
        PageContent::RuledLine(r)
    }
}

impl From<BlockSpace> for PageContent {
    fn from(s: BlockSpace) -> Self {
        PageContent::BlockSpace(s)
    }
}

impl From<Canvas> for PageContent {
    fn from(c: Canvas) -> Self {
        PageContent::Canvas(c)
    }
}

impl PageContent {
    fn kind_name(&self) -> &'static str {
        match self {
            PageContent::TextBlock(_) => "TextBlock",
            PageContent::ImageBlock(_) => "ImageBlock",
            PageContent::RuledLine(_) => "RuledLine",
            PageContent::BlockSpace(_) => "BlockSpace",
            PageContent::Canvas(_) => "Canvas",
            PageContent::Button(_) => "Button",
        }
    }
}

/// Object ids of the outer Block / inner content pair a block lowers to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BlockIds {
    pub(crate) outer: ObjectId,
    pub(crate) inner: ObjectId,
}

/// A block of flowed text. Lowers to an outer Block object plus an inner
/// TextBlock object carrying the paragraph stream.
#[derive(Default)]
pub struct TextBlock {
    pub(crate) ids: Option<BlockIds>,
    pub(crate) text_style: Option<StyleRef>,
    pub(crate) block_style: Option<StyleRef>,
    pub(crate) attrs: AttrMap,
    pub(crate) toc_label: Option<String>,
    pub(crate) content: Vec<TextBlockContent>,
}

pub(crate) enum TextBlockContent {
    Paragraph(Paragraph),
    Cr,
}

impl TextBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text_style(mut self, style: StyleRef) -> Self {
        self.text_style = Some(style);
        self
    }

    pub fn with_block_style(mut self, style: StyleRef) -> Self {
        self.block_style = Some(style);
        self
    }

    /// Label this block for the table of contents; the entry is created
    /// when the owning page is appended.
    pub fn with_toc_label(mut self, label: impl Into<String>) -> Self {
        self.toc_label = Some(label.into());
        self
    }

    /// Set a per-instance override of a text- or block-family attribute.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(name, value);
    }

    pub fn append(&mut self, paragraph: Paragraph) {
        self.content.push(TextBlockContent::Paragraph(paragraph));
    }

    /// A bare line break between paragraphs.
    pub fn append_cr(&mut self) {
        self.content.push(TextBlockContent::Cr);
    }
}

// ============================================================================
// Inline content
// ============================================================================

/// A paragraph of inline content, terminated by an implicit `pend`.
#[derive(Default)]
pub struct Paragraph {
    pub(crate) content: Vec<Inline>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut p = Self::default();
        p.append(Inline::text(text));
        p
    }

    pub fn append(&mut self, inline: impl Into<Inline>) {
        self.content.push(inline.into());
    }
}

/// Inline content of paragraphs and spans.
pub enum Inline {
    Text(Text),
    Cr,
    Span(Span),
    CharButton(CharButton),
    Plot(Plot),
    DropCaps(DropCaps),
    Emphasis(Emphasis),
    /// Horizontal space; emitted only when non-zero.
    Space(i16),
}

impl Inline {
    /// Unicode text, emitted as a `textstring` tag.
    pub fn text(text: impl Into<String>) -> Inline {
        Inline::Text(Text::Str(text.into()))
    }

    /// Byte text in the book's source encoding, emitted as raw text.
    pub fn bytes(bytes: Vec<u8>) -> Inline {
        Inline::Text(Text::Bytes(bytes))
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Inline::Text(_) => "Text",
            Inline::Cr => "CR",
            Inline::Span(_) => "Span",
            Inline::CharButton(_) => "CharButton",
            Inline::Plot(_) => "Plot",
            Inline::DropCaps(_) => "DropCaps",
            Inline::Emphasis(_) => "Emphasis",
            Inline::Space(_) => "Space",
        }
    }
}

impl From<Span> for Inline {
    fn from(s: Span) -> Self {
        Inline::Span(s)
    }
}

impl From<CharButton> for Inline {
    fn from(b: CharButton) -> Self {
        Inline::CharButton(b)
    }
}

impl From<Plot> for Inline {
    fn from(p: Plot) -> Self {
        Inline::Plot(p)
    }
}

impl From<DropCaps> for Inline {
    fn from(d: DropCaps) -> Self {
        Inline::DropCaps(d)
    }
}

impl From<Emphasis> for Inline {
    fn from(e: Emphasis) -> Self {
        Inline::Emphasis(e)
    }
}

/// A run with text-style attribute overrides. On render, only attributes
/// that differ from the enclosing effective style are emitted, and each
/// is restored to its prior value when the span closes.
#[derive(Default)]
pub struct Span {
    pub(crate) attrs: AttrMap,
    pub(crate) content: Vec<Inline>,
}

impl Span {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.set(name, value);
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(name, value);
    }

    pub fn append(&mut self, inline: impl Into<Inline>) {
        self.content.push(inline.into());
    }
}

/// An inline run that jumps through a registered button when activated.
pub struct CharButton {
    pub(crate) button: ObjectId,
    pub(crate) content: Vec<Inline>,
}

impl CharButton {
    pub fn new(button: ObjectId) -> Self {
        Self {
            button,
            content: Vec::new(),
        }
    }

    /// Append inline text content. Nested buttons, plots, and drop caps
    /// are not part of the button grammar.
    pub fn append(&mut self, inline: impl Into<Inline>) -> Result<()> {
        let inline = inline.into();
        match inline {
            Inline::CharButton(_) | Inline::Plot(_) | Inline::DropCaps(_) => {
                Err(Error::GrammarViolation {
                    parent: "CharButton",
                    child: inline.kind_name(),
                })
            }
            other => {
                self.content.push(other);
                Ok(())
            }
        }
    }
}

/// An inline image or button plot.
#[derive(Debug)]
pub struct Plot {
    pub(crate) xsize: u16,
    pub(crate) ysize: u16,
    pub(crate) object: ObjectId,
    pub(crate) adjustment: PlotAdjustment,
}

impl Plot {
    /// Sizes must be non-negative and fit a 16-bit word.
    pub fn new(
        xsize: i32,
        ysize: i32,
        object: ObjectId,
        adjustment: PlotAdjustment,
    ) -> Result<Self> {
        if xsize < 0 || ysize < 0 {
            return Err(Error::BadArgument(format!(
                "plot size must be non-negative: {xsize}x{ysize}"
            )));
        }
        Ok(Self {
            xsize: crate::tags::encode_word(xsize as i64)?,
            ysize: crate::tags::encode_word(ysize as i64)?,
            object,
            adjustment,
        })
    }
}

/// A dropped capital spanning the given number of lines.
pub struct DropCaps {
    pub(crate) line: u16,
    pub(crate) content: Vec<Inline>,
}

impl DropCaps {
    pub fn new(line: u16) -> Self {
        Self {
            line,
            content: Vec::new(),
        }
    }

    pub fn append(&mut self, inline: impl Into<Inline>) -> Result<()> {
        let inline = inline.into();
        match inline {
            Inline::Text(_) | Inline::Span(_) | Inline::Emphasis(_) | Inline::Space(_) => {
                self.content.push(inline);
                Ok(())
            }
            other => Err(Error::GrammarViolation {
                parent: "DropCaps",
                child: other.kind_name(),
            }),
        }
    }
}

/// Kinds of inline emphasis wrappers.
pub enum EmphasisKind {
    Italic,
    Sup,
    Sub,
    NoBr,
    EmpLine,
    Boxed(LineKind),
}

/// An inline open/close emphasis pair.
pub struct Emphasis {
    pub(crate) kind: EmphasisKind,
    pub(crate) content: Vec<Inline>,
}

impl Emphasis {
    pub fn new(kind: EmphasisKind) -> Self {
        Self {
            kind,
            content: Vec::new(),
        }
    }

    pub fn italic() -> Self {
        Self::new(EmphasisKind::Italic)
    }

    pub fn append(&mut self, inline: impl Into<Inline>) {
        self.content.push(inline.into());
    }
}

// ============================================================================
// Non-text page content
// ============================================================================

/// A horizontal rule drawn directly in the page flow.
pub struct RuledLine {
    pub(crate) length: u16,
    pub(crate) kind: LineKind,
    pub(crate) width: u16,
    pub(crate) color: Color,
}

impl RuledLine {
    pub fn new(length: u16, kind: LineKind, width: u16, color: Color) -> Self {
        Self {
            length,
            kind,
            width,
            color,
        }
    }
}

/// Fixed spacing between blocks.
pub struct BlockSpace {
    pub(crate) x: u16,
    pub(crate) y: u16,
}

impl BlockSpace {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Absolutely-positioned content inside a canvas, header, or footer.
pub(crate) struct PlacedContent {
    pub(crate) x: u16,
    pub(crate) y: u16,
    pub(crate) content: PageContent,
}

/// A fixed-size surface holding absolutely-positioned children.
#[derive(Default)]
pub struct Canvas {
    pub(crate) id: Option<ObjectId>,
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) attrs: AttrMap,
    pub(crate) items: Vec<PlacedContent>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Set a framing attribute (block family: framemode, framewidth, ...).
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.set(name, value);
    }

    /// Place object-bearing content at (x, y). Rules and spaces have no
    /// object identity and cannot be placed.
    pub fn append(&mut self, x: u16, y: u16, content: impl Into<PageContent>) -> Result<()> {
        let content = content.into();
        match content {
            PageContent::RuledLine(_) | PageContent::BlockSpace(_) => {
                Err(Error::GrammarViolation {
                    parent: "Canvas",
                    child: content.kind_name(),
                })
            }
            other => {
                self.items.push(PlacedContent { x, y, content: other });
                Ok(())
            }
        }
    }
}

/// A page header or footer: absolutely-positioned content referenced
/// from page styles.
#[derive(Default)]
pub struct HeaderFooter {
    pub(crate) id: Option<ObjectId>,
    pub(crate) items: Vec<PlacedContent>,
}

impl HeaderFooter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, x: u16, y: u16, content: impl Into<PageContent>) -> Result<()> {
        let content = content.into();
        match content {
            PageContent::RuledLine(_) | PageContent::BlockSpace(_) => {
                Err(Error::GrammarViolation {
                    parent: "HeaderFooter",
                    child: content.kind_name(),
                })
            }
            other => {
                self.items.push(PlacedContent { x, y, content: other });
                Ok(())
            }
        }
    }
}

/// An image stream: file path or in-memory bytes plus an optional
/// encoding. The encoding is guessed from the extension (or magic bytes)
/// when not supplied.
#[derive(Default)]
pub struct ImageStream {
    pub(crate) path: Option<PathBuf>,
    pub(crate) data: Option<Vec<u8>>,
    pub(crate) kind: Option<ImageKind>,
}

impl ImageStream {
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
            data: None,
            kind: None,
        }
    }

    pub fn from_data(data: Vec<u8>) -> Self {
        Self {
            path: None,
            data: Some(data),
            kind: None,
        }
    }

    pub fn with_kind(mut self, kind: ImageKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// A block-level image placement referencing an image stream.
pub struct ImageBlock {
    pub(crate) ids: Option<BlockIds>,
    pub(crate) stream: ObjectId,
    pub(crate) rect: (u16, u16, u16, u16),
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) alt: Option<String>,
}

impl ImageBlock {
    /// `rect` is the source rectangle (x0, y0, x1, y1); `width`/`height`
    /// the target size.
    pub fn new(stream: ObjectId, rect: (u16, u16, u16, u16), width: u16, height: u16) -> Self {
        Self {
            ids: None,
            stream,
            rect,
            width,
            height,
            alt: None,
        }
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book() -> Book {
        Book::new(BookInfo::new("Test"), BookConfig::default())
    }

    #[test]
    fn test_ids_are_assigned_eagerly_on_append() {
        let mut book = book();
        let mut page = Page::new();
        let mut tb = TextBlock::new();
        tb.append(Paragraph::with_text("hi"));
        page.append(tb);
        let ids = book.append_page(page).unwrap();
        assert!(ids.page.0 >= 2);
        assert_eq!(ids.blocks.len(), 1);
        assert!(ids.blocks[0].0 > ids.page.0);
    }

    #[test]
    fn test_id_counter_is_monotonic_across_subtrees() {
        let mut book = book();
        let first = book.append_page(Page::new()).unwrap();
        let second = book.append_page(Page::new()).unwrap();
        assert!(second.page.0 > first.page.0);
    }

    #[test]
    fn test_two_books_do_not_interfere() {
        let mut a = book();
        let mut b = book();
        let pa = a.append_page(Page::new()).unwrap();
        let pb = b.append_page(Page::new()).unwrap();
        assert_eq!(pa.page, pb.page);
    }

    #[test]
    fn test_append_twice_fails() {
        let mut book = book();
        let mut page = Page::new();
        page.id = Some(ObjectId(99));
        assert!(matches!(
            book.append_page(page),
            Err(Error::AlreadyParented)
        ));
    }

    #[test]
    fn test_char_button_grammar() {
        let mut cb = CharButton::new(ObjectId(5));
        cb.append(Inline::text("go")).unwrap();
        let err = cb.append(CharButton::new(ObjectId(6))).unwrap_err();
        assert!(matches!(
            err,
            Error::GrammarViolation {
                parent: "CharButton",
                child: "CharButton"
            }
        ));
    }

    #[test]
    fn test_canvas_rejects_unplaceable_content() {
        let mut canvas = Canvas::new(600, 200);
        let err = canvas.append(0, 0, BlockSpace::new(0, 10)).unwrap_err();
        assert!(matches!(
            err,
            Error::GrammarViolation {
                parent: "Canvas",
                child: "BlockSpace"
            }
        ));
    }

    #[test]
    fn test_plot_rejects_negative_size() {
        let err = Plot::new(-1, 10, ObjectId(3), PlotAdjustment::Center).unwrap_err();
        assert!(matches!(err, Error::BadArgument(_)));
        let err = Plot::new(100_000, 10, ObjectId(3), PlotAdjustment::Center).unwrap_err();
        assert!(matches!(err, Error::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_image_stream_requires_a_source() {
        let mut book = book();
        let err = book.add_image_stream(ImageStream::default()).unwrap_err();
        assert!(matches!(err, Error::MissingExtensionData));
    }

    #[test]
    fn test_toc_entry_requires_appended_block() {
        let mut book = book();
        let err = book
            .add_toc_entry("A", ObjectId(2), ObjectId(3))
            .unwrap_err();
        assert!(matches!(err, Error::BadArgument(_)));

        let mut page = Page::new();
        let mut tb = TextBlock::new();
        tb.append(Paragraph::with_text("x"));
        page.append(tb);
        let ids = book.append_page(page).unwrap();
        book.add_toc_entry("A", ids.page, ids.blocks[0]).unwrap();
    }

    #[test]
    fn test_jump_button_target_must_exist() {
        let mut book = book();
        assert!(book.add_jump_button(ObjectId(7), ObjectId(8)).is_err());

        let mut page = Page::new();
        let mut tb = TextBlock::new();
        tb.append(Paragraph::with_text("target"));
        page.append(tb);
        let ids = book.append_page(page).unwrap();
        let button = book.add_jump_button(ids.page, ids.blocks[0]).unwrap();
        assert!(button.0 > ids.blocks[0].0);
    }

    #[test]
    fn test_toc_label_registers_entry() {
        let mut book = book();
        let mut page = Page::new();
        let mut tb = TextBlock::new().with_toc_label("Chapter 1");
        tb.append(Paragraph::with_text("text"));
        page.append(tb);
        let ids = book.append_page(page).unwrap();
        assert_eq!(book.toc.len(), 1);
        assert_eq!(book.toc[0].block, ids.blocks[0]);
        assert_eq!(book.toc[0].label, "Chapter 1");
    }
}
