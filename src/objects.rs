//! Flat object store and LRF container output.
//!
//! Owns the set of typed objects, emits each as
//! `ObjectStart || tags || ObjectEnd`, and writes the file header, the
//! objects, and the trailing object table, back-patching the header
//! offsets that cannot be known up front.

use std::io::{Seek, SeekFrom, Write};

use crate::error::{Error, Result};
use crate::stream::deflate;
use crate::tags::{EncodeCtx, Tag};

/// File signature: "L\0R\0F\0\0\0".
const SIGNATURE: [u8; 8] = [0x4C, 0x00, 0x52, 0x00, 0x46, 0x00, 0x00, 0x00];
const VERSION: u16 = 1000;
/// Undocumented constant; emitted verbatim, never depended on.
const XOR_KEY: u16 = 65024;

/// Fixed-size portion of the header, before doc-info and thumbnail.
const HEADER_SIZE: u64 = 0x58;
const OBJECT_TABLE_OFFSET_FIELD: u64 = 0x18;
const TOC_OFFSET_FIELD: u64 = 0x48;

/// Unique identifier of a persistent object within one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The root BookAttr object, reserved at document construction time.
    pub const ROOT: ObjectId = ObjectId(1);
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Object type codes from the BBeB container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    PageTree,
    Page,
    Header,
    Footer,
    PageAttr,
    Block,
    BlockAttr,
    MiniPage,
    TextBlock,
    TextAttr,
    ImageBlock,
    Canvas,
    ESound,
    ImageStream,
    Import,
    Button,
    Window,
    PopUpWindow,
    Sound,
    SoundStream,
    Font,
    ObjectInfo,
    BookAttr,
    SimpleTextBlock,
    Toc,
}

impl ObjectKind {
    pub fn code(self) -> u16 {
        match self {
            ObjectKind::PageTree => 0x01,
            ObjectKind::Page => 0x02,
            ObjectKind::Header => 0x03,
            ObjectKind::Footer => 0x04,
            ObjectKind::PageAttr => 0x05,
            ObjectKind::Block => 0x06,
            ObjectKind::BlockAttr => 0x07,
            ObjectKind::MiniPage => 0x08,
            ObjectKind::TextBlock => 0x0A,
            ObjectKind::TextAttr => 0x0B,
            ObjectKind::ImageBlock => 0x0C,
            ObjectKind::Canvas => 0x0D,
            ObjectKind::ESound => 0x0E,
            ObjectKind::ImageStream => 0x11,
            ObjectKind::Import => 0x12,
            ObjectKind::Button => 0x13,
            ObjectKind::Window => 0x14,
            ObjectKind::PopUpWindow => 0x15,
            ObjectKind::Sound => 0x16,
            ObjectKind::SoundStream => 0x17,
            ObjectKind::Font => 0x19,
            ObjectKind::ObjectInfo => 0x1A,
            ObjectKind::BookAttr => 0x1C,
            ObjectKind::SimpleTextBlock => 0x1D,
            ObjectKind::Toc => 0x1E,
        }
    }
}

/// One typed object: id, kind, and the ordered tag list of its body.
#[derive(Debug, Clone)]
pub struct LrfObject {
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub tags: Vec<Tag>,
}

impl LrfObject {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self {
            id,
            kind,
            tags: Vec::new(),
        }
    }

    pub fn push(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    pub fn extend(&mut self, tags: impl IntoIterator<Item = Tag>) {
        self.tags.extend(tags);
    }

    /// `ObjectStart || tags || ObjectEnd`.
    fn encode(&self, ctx: &EncodeCtx) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        Tag::ObjectStart(self.id, self.kind).encode(ctx, &mut out)?;
        for tag in &self.tags {
            tag.encode(ctx, &mut out)?;
        }
        Tag::ObjectEnd.encode(ctx, &mut out)?;
        Ok(out)
    }
}

/// Book-level fields that land in the file header.
#[derive(Debug, Clone)]
pub struct FileHeader {
    /// 1 for front-to-back, 16 for back-to-front.
    pub binding: u16,
    pub dpi: u32,
    pub width: u16,
    pub height: u16,
    pub color_depth: u16,
    /// Uncompressed doc-info XML, UTF-8 with BOM.
    pub docinfo: Vec<u8>,
    /// Image type code and bytes of the optional cover thumbnail.
    pub thumbnail: Option<(u16, Vec<u8>)>,
}

/// Insertion-ordered collection of objects plus the root/TOC bookkeeping.
#[derive(Debug, Default)]
pub struct ObjectStore {
    objects: Vec<LrfObject>,
    root: Option<ObjectId>,
    toc: Option<ObjectId>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an object; ids need not be dense or sorted.
    pub fn append(&mut self, obj: LrfObject) {
        self.objects.push(obj);
    }

    /// Append the root BookAttr object. Exactly one per book.
    pub fn set_root(&mut self, obj: LrfObject) {
        self.root = Some(obj.id);
        self.objects.push(obj);
    }

    /// Mark an already-appended object as the TOC.
    pub fn set_toc(&mut self, id: ObjectId) {
        self.toc = Some(id);
    }

    /// Append a RegisterFont tag to the root object.
    pub fn register_font(&mut self, id: ObjectId) -> Result<()> {
        let root = self.root.ok_or(Error::NoRoot)?;
        let obj = self
            .objects
            .iter_mut()
            .find(|o| o.id == root)
            .ok_or(Error::NoRoot)?;
        obj.push(Tag::RegisterFont(id));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Emit header, objects, and object table, patching the table offset
    /// and the TOC offset back into the header.
    pub fn write<W: Write + Seek>(
        &self,
        sink: &mut W,
        header: &FileHeader,
        ctx: &EncodeCtx,
    ) -> Result<()> {
        let root = self.root.ok_or(Error::NoRoot)?;
        if let Some(toc) = self.toc
            && !self.objects.iter().any(|o| o.id == toc)
        {
            return Err(Error::TocNotFound(toc.0));
        }

        self.write_header(sink, header, root)?;

        // Objects in insertion order, recording (id, offset, size).
        let mut entries = Vec::with_capacity(self.objects.len());
        let mut toc_offset = None;
        for obj in &self.objects {
            let offset = sink.stream_position()?;
            let bytes = obj.encode(ctx)?;
            sink.write_all(&bytes)?;
            if Some(obj.id) == self.toc {
                toc_offset = Some(offset as u32);
            }
            entries.push((obj.id.0, offset as u32, bytes.len() as u32));
        }

        let table_offset = sink.stream_position()?;
        sink.seek(SeekFrom::Start(OBJECT_TABLE_OFFSET_FIELD))?;
        sink.write_all(&table_offset.to_le_bytes())?;
        if let Some(offset) = toc_offset {
            sink.seek(SeekFrom::Start(TOC_OFFSET_FIELD))?;
            sink.write_all(&offset.to_le_bytes())?;
        }
        sink.seek(SeekFrom::Start(table_offset))?;

        for (id, offset, size) in &entries {
            sink.write_all(&id.to_le_bytes())?;
            sink.write_all(&offset.to_le_bytes())?;
            sink.write_all(&size.to_le_bytes())?;
            sink.write_all(&0u32.to_le_bytes())?;
        }
        sink.flush()?;

        log::debug!(
            "wrote {} objects, object table at {table_offset:#x}",
            self.objects.len()
        );
        Ok(())
    }

    fn write_header<W: Write + Seek>(
        &self,
        sink: &mut W,
        header: &FileHeader,
        root: ObjectId,
    ) -> Result<()> {
        let compressed_docinfo = deflate(&header.docinfo)?;
        let (thumb_kind, thumb_bytes) = match &header.thumbnail {
            Some((kind, bytes)) => (*kind, bytes.as_slice()),
            None => (0, &[][..]),
        };

        let mut buf = Vec::with_capacity(HEADER_SIZE as usize + compressed_docinfo.len());
        buf.extend_from_slice(&SIGNATURE);
        buf.extend_from_slice(&VERSION.to_le_bytes());
        buf.extend_from_slice(&XOR_KEY.to_le_bytes());
        buf.extend_from_slice(&root.0.to_le_bytes());
        buf.extend_from_slice(&(self.objects.len() as u64).to_le_bytes());
        buf.extend_from_slice(&0u64.to_le_bytes()); // object table offset, patched
        buf.extend_from_slice(&[0u8; 4]);
        buf.extend_from_slice(&header.binding.to_le_bytes());
        buf.extend_from_slice(&header.dpi.to_le_bytes());
        buf.extend_from_slice(&header.width.to_le_bytes());
        buf.extend_from_slice(&header.height.to_le_bytes());
        buf.extend_from_slice(&header.color_depth.to_le_bytes());
        buf.extend_from_slice(&[0u8; 20]);
        buf.extend_from_slice(&self.toc.map_or(0, |id| id.0).to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes()); // TOC offset, patched
        buf.extend_from_slice(&((compressed_docinfo.len() as u16 + 4).to_le_bytes()));
        buf.extend_from_slice(&thumb_kind.to_le_bytes());
        buf.extend_from_slice(&(thumb_bytes.len() as u32).to_le_bytes());
        buf.extend_from_slice(&(header.docinfo.len() as u32).to_le_bytes());
        debug_assert_eq!(buf.len() as u64, HEADER_SIZE);

        buf.extend_from_slice(&compressed_docinfo);
        buf.extend_from_slice(thumb_bytes);
        sink.write_all(&buf)?;
        Ok(())
    }
}
