//! LRF tag catalogue and byte-level tag encoding.
//!
//! A tag is a 16-bit id plus a typed payload; tags are the unit of
//! composition for object bodies and stream contents. Structural tags are
//! modelled as enum variants; the open-ended style-attribute family goes
//! through [`Tag::Attr`] and the static attribute catalogue.

use crate::error::{Error, Result};
use crate::objects::{ObjectId, ObjectKind};

/// Context shared by all tag encoders within one render.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodeCtx {
    /// Source encoding for caller-supplied byte text. `None` means byte
    /// text cannot be encoded and fails with `EncodingRequired`.
    pub encoding: Option<&'static encoding_rs::Encoding>,
}

/// Body text: either an owned Unicode string or raw bytes in the book's
/// source encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    Str(String),
    Bytes(Vec<u8>),
}

impl Text {
    fn to_utf16le(&self, ctx: &EncodeCtx) -> Result<Vec<u8>> {
        match self {
            Text::Str(s) => Ok(encode_utf16le(s)),
            Text::Bytes(b) => {
                let encoding = ctx.encoding.ok_or(Error::EncodingRequired)?;
                let (decoded, _, _) = encoding.decode(b);
                Ok(encode_utf16le(&decoded))
            }
        }
    }
}

/// Line style for boxes, ruled lines, and emphasis lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    None,
    Solid,
    Dashed,
    Double,
    Dotted,
}

impl LineKind {
    pub fn code(self) -> u16 {
        match self {
            LineKind::None => 0x00,
            LineKind::Solid => 0x10,
            LineKind::Dashed => 0x20,
            LineKind::Double => 0x30,
            LineKind::Dotted => 0x40,
        }
    }
}

/// Vertical adjustment of an inline plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotAdjustment {
    Center,
    Baseline,
    Top,
    Bottom,
}

impl PlotAdjustment {
    pub fn code(self) -> u16 {
        match self {
            PlotAdjustment::Center => 0x01,
            PlotAdjustment::Baseline => 0x02,
            PlotAdjustment::Top => 0x03,
            PlotAdjustment::Bottom => 0x04,
        }
    }
}

/// A 32-bit (alpha, R, G, B) colour, stored big-endian on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color(pub u32);

impl Color {
    /// Parse a textual integer or hex literal ("0x00FF0000" or "255").
    pub fn parse(s: &str) -> Result<Color> {
        let s = s.trim();
        let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16)
                .map_err(|_| Error::BadArgument(format!("invalid colour literal: {s}")))?
        } else {
            s.parse::<i64>()
                .map_err(|_| Error::BadArgument(format!("invalid colour literal: {s}")))?
        };
        if !(0..=0xFFFF_FFFF).contains(&value) {
            return Err(Error::ValueOutOfRange {
                tag: "colour".into(),
                value,
            });
        }
        Ok(Color(value as u32))
    }
}

/// Value of a style attribute as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Int(i64),
    Str(String),
    /// Composite values such as a background image (mode, stream id).
    Pair(String, i64),
}

impl From<i64> for AttrValue {
    fn from(v: i64) -> Self {
        AttrValue::Int(v)
    }
}

impl From<i32> for AttrValue {
    fn from(v: i32) -> Self {
        AttrValue::Int(v as i64)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Str(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Str(v)
    }
}

impl From<(&str, i64)> for AttrValue {
    fn from((a, b): (&str, i64)) -> Self {
        AttrValue::Pair(a.to_string(), b)
    }
}

// ============================================================================
// Attribute catalogue
// ============================================================================

/// Payload grammar of one attribute tag.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AttrFmt {
    Word,
    SignedWord,
    DWord,
    Str,
    Color,
    Enum(&'static [(&'static str, u16)]),
    /// Ruby align + adjust, ORed into a single word.
    RubyAa,
    /// Background image: mode word followed by stream object id.
    BgImage,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct AttrDef {
    pub name: &'static str,
    pub id: u16,
    pub fmt: AttrFmt,
}

const fn def(name: &'static str, id: u16, fmt: AttrFmt) -> AttrDef {
    AttrDef { name, id, fmt }
}

pub(crate) static LINE_TYPES: &[(&str, u16)] = &[
    ("none", 0x00),
    ("solid", 0x10),
    ("dashed", 0x20),
    ("double", 0x30),
    ("dotted", 0x40),
];

static LAYOUTS: &[(&str, u16)] = &[("TbRl", 0x41), ("LrTb", 0x34)];

static BLOCK_RULES: &[(&str, u16)] = &[
    ("horz-fixed", 0x14),
    ("horz-adjustable", 0x12),
    ("vert-fixed", 0x41),
    ("vert-adjustable", 0x21),
    ("block-fixed", 0x44),
    ("block-adjustable", 0x22),
];

static FRAME_MODES: &[(&str, u16)] = &[("none", 0), ("square", 1), ("curve", 2)];

static ALIGNS: &[(&str, u16)] = &[("head", 1), ("center", 4), ("foot", 8)];

static EMP_POSITIONS: &[(&str, u16)] = &[("before", 1), ("after", 2)];

static PAGE_POSITIONS: &[(&str, u16)] = &[("any", 0), ("upper", 1), ("lower", 2)];

static EMPTY_VIEWS: &[(&str, u16)] = &[("empty", 0), ("show", 1)];

static WAIT_PROPS: &[(&str, u16)] = &[("replay", 1), ("noreplay", 2)];

static BG_IMAGE_MODES: &[(&str, u16)] =
    &[("fix", 0), ("scale", 1), ("tile", 2), ("centering", 3)];

static RUBY_ALIGNS: &[(&str, u16)] = &[("start", 1), ("center", 2)];

static RUBY_ADJUSTS: &[(&str, u16)] = &[("none", 0x00), ("line-edge", 0x10)];

/// Text-family attributes (TextAttr objects, text-block overrides, spans).
pub(crate) static TEXT_ATTRS: &[AttrDef] = &[
    def("fontsize", 0xF511, AttrFmt::SignedWord),
    def("fontwidth", 0xF512, AttrFmt::SignedWord),
    def("fontescapement", 0xF513, AttrFmt::SignedWord),
    def("fontorientation", 0xF514, AttrFmt::SignedWord),
    def("fontweight", 0xF515, AttrFmt::Word),
    def("fontfacename", 0xF516, AttrFmt::Str),
    def("textcolor", 0xF517, AttrFmt::Color),
    def("textbgcolor", 0xF518, AttrFmt::Color),
    def("wordspace", 0xF519, AttrFmt::SignedWord),
    def("letterspace", 0xF51A, AttrFmt::SignedWord),
    def("baselineskip", 0xF51B, AttrFmt::SignedWord),
    def("linespace", 0xF51C, AttrFmt::SignedWord),
    def("parindent", 0xF51D, AttrFmt::SignedWord),
    def("parskip", 0xF51E, AttrFmt::SignedWord),
    def("rubyalignandadjust", 0xF575, AttrFmt::RubyAa),
    def("align", 0xF584, AttrFmt::Enum(ALIGNS)),
    def("emplinetype", 0xF5D9, AttrFmt::Enum(LINE_TYPES)),
    def("emplineposition", 0xF5DA, AttrFmt::Enum(EMP_POSITIONS)),
];

/// Block-family attributes (BlockAttr objects, block overrides, canvases).
pub(crate) static BLOCK_ATTRS: &[AttrDef] = &[
    def("minipagewidth", 0xF521, AttrFmt::Word),
    def("minipageheight", 0xF522, AttrFmt::Word),
    def("blockwidth", 0xF523, AttrFmt::Word),
    def("blockheight", 0xF524, AttrFmt::Word),
    def("blockrule", 0xF525, AttrFmt::Enum(BLOCK_RULES)),
    def("bgcolor", 0xF526, AttrFmt::Color),
    def("layout", 0xF527, AttrFmt::Enum(LAYOUTS)),
    def("framewidth", 0xF528, AttrFmt::Word),
    def("framecolor", 0xF529, AttrFmt::Color),
    def("framemode", 0xF52A, AttrFmt::Enum(FRAME_MODES)),
    def("topskip", 0xF52B, AttrFmt::Word),
    def("sidemargin", 0xF52C, AttrFmt::Word),
    def("footskip", 0xF52D, AttrFmt::Word),
];

/// Page-family attributes (PageAttr objects, per-page overrides).
pub(crate) static PAGE_ATTRS: &[AttrDef] = &[
    def("oddheaderid", 0xF507, AttrFmt::DWord),
    def("evenheaderid", 0xF508, AttrFmt::DWord),
    def("oddfooterid", 0xF509, AttrFmt::DWord),
    def("evenfooterid", 0xF50A, AttrFmt::DWord),
    def("topmargin", 0xF531, AttrFmt::Word),
    def("headheight", 0xF532, AttrFmt::Word),
    def("headsep", 0xF533, AttrFmt::Word),
    def("oddsidemargin", 0xF534, AttrFmt::Word),
    def("textheight", 0xF535, AttrFmt::Word),
    def("textwidth", 0xF536, AttrFmt::Word),
    def("footspace", 0xF537, AttrFmt::Word),
    def("evensidemargin", 0xF538, AttrFmt::Word),
    def("footheight", 0xF539, AttrFmt::Word),
    def("pageheight", 0xF53A, AttrFmt::Word),
    def("pagewidth", 0xF53B, AttrFmt::Word),
    def("pageposition", 0xF53C, AttrFmt::Enum(PAGE_POSITIONS)),
    def("setemptyview", 0xF53D, AttrFmt::Enum(EMPTY_VIEWS)),
    def("bgimage", 0xF53E, AttrFmt::BgImage),
    def("setwaitprop", 0xF53F, AttrFmt::Enum(WAIT_PROPS)),
];

pub(crate) fn attr_def(name: &str) -> Result<&'static AttrDef> {
    TEXT_ATTRS
        .iter()
        .chain(BLOCK_ATTRS)
        .chain(PAGE_ATTRS)
        .find(|d| d.name == name)
        .ok_or_else(|| Error::UnknownTag(name.to_string()))
}

pub(crate) fn is_text_attr(name: &str) -> bool {
    TEXT_ATTRS.iter().any(|d| d.name == name)
}

pub(crate) fn is_block_attr(name: &str) -> bool {
    BLOCK_ATTRS.iter().any(|d| d.name == name)
}

pub(crate) fn is_page_attr(name: &str) -> bool {
    PAGE_ATTRS.iter().any(|d| d.name == name)
}

// ============================================================================
// Integer and string packers
// ============================================================================

/// Range-check a value destined for an unsigned 16-bit payload.
pub fn encode_word(value: i64) -> Result<u16> {
    if !(0..=0xFFFF).contains(&value) {
        return Err(Error::ValueOutOfRange {
            tag: "word".into(),
            value,
        });
    }
    Ok(value as u16)
}

/// Range-check a value destined for a signed 16-bit payload.
pub fn encode_signed_word(value: i64) -> Result<i16> {
    if !(-32768..=32767).contains(&value) {
        return Err(Error::ValueOutOfRange {
            tag: "signed word".into(),
            value,
        });
    }
    Ok(value as i16)
}

fn encode_dword(value: i64) -> Result<u32> {
    if !(0..=0xFFFF_FFFF).contains(&value) {
        return Err(Error::ValueOutOfRange {
            tag: "dword".into(),
            value,
        });
    }
    Ok(value as u32)
}

/// UTF-16LE code units of a string, no length prefix.
pub(crate) fn encode_utf16le(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len() * 2);
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out
}

/// Word-length-prefixed UTF-16LE string payload.
pub fn encode_string(s: &str) -> Result<Vec<u8>> {
    let encoded = encode_utf16le(s);
    if encoded.len() > 0xFFFF {
        return Err(Error::StringTooLong(encoded.len()));
    }
    let mut out = Vec::with_capacity(2 + encoded.len());
    out.extend_from_slice(&(encoded.len() as u16).to_le_bytes());
    out.extend_from_slice(&encoded);
    Ok(out)
}

fn enum_code(map: &[(&str, u16)], tag: &str, value: &str) -> Result<u16> {
    map.iter()
        .find(|(name, _)| *name == value)
        .map(|(_, code)| *code)
        .ok_or_else(|| Error::BadEnumValue {
            tag: tag.to_string(),
            value: value.to_string(),
        })
}

// ============================================================================
// Tags
// ============================================================================

/// One typed LRF tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    ObjectStart(ObjectId, ObjectKind),
    ObjectEnd,
    Link(ObjectId),
    StreamSize(u32),
    StreamData(Vec<u8>),
    StreamEnd,
    ObjectList(Vec<ObjectId>),
    BlockSpace { x: u16, y: u16 },
    ImageRect { x0: u16, y0: u16, x1: u16, y1: u16 },
    ImageSize { width: u16, height: u16 },
    RefObjId(ObjectId),
    CanvasWidth(u16),
    CanvasHeight(u16),
    PutObj { x: u16, y: u16, id: ObjectId },
    StreamFlags(u16),
    Comment(String),
    FontFilename(String),
    PageList(Vec<ObjectId>),
    FontFacename(String),
    ButtonFlags(u16),
    JumpTo { page: ObjectId, block: ObjectId },
    RuledLine { length: u16, kind: LineKind, width: u16, color: Color },
    ParentPageTree(ObjectId),
    PStart(u32),
    PEnd,
    CharButton(ObjectId),
    CharButtonEnd,
    Italic,
    ItalicEnd,
    Sup,
    SupEnd,
    Sub,
    SubEnd,
    NoBr,
    NoBrEnd,
    EmpLine,
    EmpLineEnd,
    DrawChar { line: u16 },
    DrawCharEnd,
    Box(LineKind),
    BoxEnd,
    Space(i16),
    EmpDots { font: ObjectId, face: String, code: u16 },
    TextString(Text),
    Plot { xsize: u16, ysize: u16, id: ObjectId, adjustment: PlotAdjustment },
    Cr,
    RegisterFont(ObjectId),
    /// Raw body text; tag id zero means the payload is emitted bare.
    RawText(Text),
    /// A style attribute from the catalogue.
    Attr { name: String, value: AttrValue },
}

impl Tag {
    /// Convenience constructor for catalogue attributes.
    pub fn attr(name: impl Into<String>, value: impl Into<AttrValue>) -> Tag {
        Tag::Attr {
            name: name.into(),
            value: value.into(),
        }
    }

    /// The 16-bit tag id; zero for `RawText`.
    pub fn id(&self) -> Result<u16> {
        Ok(match self {
            Tag::ObjectStart(..) => 0xF500,
            Tag::ObjectEnd => 0xF501,
            Tag::Link(_) => 0xF503,
            Tag::StreamSize(_) => 0xF504,
            Tag::StreamData(_) => 0xF505,
            Tag::StreamEnd => 0xF506,
            Tag::ObjectList(_) => 0xF50B,
            Tag::BlockSpace { .. } => 0xF546,
            Tag::ImageRect { .. } => 0xF549,
            Tag::ImageSize { .. } => 0xF54A,
            Tag::RefObjId(_) => 0xF54B,
            Tag::CanvasWidth(_) => 0xF551,
            Tag::CanvasHeight(_) => 0xF552,
            Tag::PutObj { .. } => 0xF553,
            Tag::StreamFlags(_) => 0xF554,
            Tag::Comment(_) => 0xF555,
            Tag::FontFilename(_) => 0xF559,
            Tag::PageList(_) => 0xF55C,
            Tag::FontFacename(_) => 0xF55D,
            Tag::ButtonFlags(_) => 0xF561,
            Tag::JumpTo { .. } => 0xF56A,
            Tag::RuledLine { .. } => 0xF573,
            Tag::ParentPageTree(_) => 0xF57C,
            Tag::PStart(_) => 0xF5A1,
            Tag::PEnd => 0xF5A2,
            Tag::CharButton(_) => 0xF5A7,
            Tag::CharButtonEnd => 0xF5A8,
            Tag::Italic => 0xF5A9,
            Tag::ItalicEnd => 0xF5AA,
            Tag::Sup => 0xF5B1,
            Tag::SupEnd => 0xF5B2,
            Tag::Sub => 0xF5B3,
            Tag::SubEnd => 0xF5B4,
            Tag::NoBr => 0xF5B5,
            Tag::NoBrEnd => 0xF5B6,
            Tag::EmpLine => 0xF5C1,
            Tag::EmpLineEnd => 0xF5C2,
            Tag::DrawChar { .. } => 0xF5C3,
            Tag::DrawCharEnd => 0xF5C4,
            Tag::Box(_) => 0xF5C6,
            Tag::BoxEnd => 0xF5C7,
            Tag::Space(_) => 0xF5C8,
            Tag::EmpDots { .. } => 0xF5CB,
            Tag::TextString(_) => 0xF5CC,
            Tag::Plot { .. } => 0xF5D1,
            Tag::Cr => 0xF5D2,
            Tag::RegisterFont(_) => 0xF5D4,
            Tag::RawText(_) => 0,
            Tag::Attr { name, .. } => attr_def(name)?.id,
        })
    }

    /// Append the encoded bytes of this tag to `out`.
    pub fn encode(&self, ctx: &EncodeCtx, out: &mut Vec<u8>) -> Result<()> {
        let id = self.id()?;
        if id != 0 {
            out.extend_from_slice(&id.to_le_bytes());
        }
        match self {
            Tag::ObjectStart(id, kind) => {
                out.extend_from_slice(&id.0.to_le_bytes());
                out.extend_from_slice(&kind.code().to_le_bytes());
            }
            Tag::ObjectEnd
            | Tag::StreamEnd
            | Tag::PEnd
            | Tag::CharButtonEnd
            | Tag::Italic
            | Tag::ItalicEnd
            | Tag::Sup
            | Tag::SupEnd
            | Tag::Sub
            | Tag::SubEnd
            | Tag::NoBr
            | Tag::NoBrEnd
            | Tag::EmpLine
            | Tag::EmpLineEnd
            | Tag::DrawCharEnd
            | Tag::BoxEnd
            | Tag::Cr => {}
            Tag::Link(id)
            | Tag::RefObjId(id)
            | Tag::ParentPageTree(id)
            | Tag::CharButton(id)
            | Tag::RegisterFont(id) => {
                out.extend_from_slice(&id.0.to_le_bytes());
            }
            Tag::StreamSize(n) => out.extend_from_slice(&n.to_le_bytes()),
            Tag::StreamData(data) => out.extend_from_slice(data),
            Tag::ObjectList(ids) | Tag::PageList(ids) => {
                out.extend_from_slice(&encode_word(ids.len() as i64)?.to_le_bytes());
                for id in ids {
                    out.extend_from_slice(&id.0.to_le_bytes());
                }
            }
            Tag::BlockSpace { x, y } => {
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
            }
            Tag::ImageRect { x0, y0, x1, y1 } => {
                for v in [x0, y0, x1, y1] {
                    out.extend_from_slice(&v.to_le_bytes());
                }
            }
            Tag::ImageSize { width, height } => {
                out.extend_from_slice(&width.to_le_bytes());
                out.extend_from_slice(&height.to_le_bytes());
            }
            Tag::CanvasWidth(v) | Tag::CanvasHeight(v) | Tag::StreamFlags(v) | Tag::ButtonFlags(v) => {
                out.extend_from_slice(&v.to_le_bytes());
            }
            Tag::PutObj { x, y, id } => {
                out.extend_from_slice(&x.to_le_bytes());
                out.extend_from_slice(&y.to_le_bytes());
                out.extend_from_slice(&id.0.to_le_bytes());
            }
            Tag::Comment(s) | Tag::FontFilename(s) | Tag::FontFacename(s) => {
                out.extend_from_slice(&encode_string(s)?);
            }
            Tag::JumpTo { page, block } => {
                out.extend_from_slice(&page.0.to_le_bytes());
                out.extend_from_slice(&block.0.to_le_bytes());
            }
            Tag::RuledLine {
                length,
                kind,
                width,
                color,
            } => {
                out.extend_from_slice(&length.to_le_bytes());
                out.extend_from_slice(&kind.code().to_le_bytes());
                out.extend_from_slice(&width.to_le_bytes());
                out.extend_from_slice(&color.0.to_be_bytes());
            }
            Tag::PStart(n) => out.extend_from_slice(&n.to_le_bytes()),
            Tag::DrawChar { line } => out.extend_from_slice(&line.to_le_bytes()),
            Tag::Box(kind) => out.extend_from_slice(&kind.code().to_le_bytes()),
            Tag::Space(n) => out.extend_from_slice(&n.to_le_bytes()),
            Tag::EmpDots { font, face, code } => {
                out.extend_from_slice(&font.0.to_le_bytes());
                out.extend_from_slice(&encode_string(face)?);
                out.extend_from_slice(&code.to_le_bytes());
            }
            Tag::TextString(text) => {
                let encoded = text.to_utf16le(ctx)?;
                if encoded.len() > 0xFFFF {
                    return Err(Error::StringTooLong(encoded.len()));
                }
                out.extend_from_slice(&(encoded.len() as u16).to_le_bytes());
                out.extend_from_slice(&encoded);
            }
            Tag::Plot {
                xsize,
                ysize,
                id,
                adjustment,
            } => {
                out.extend_from_slice(&xsize.to_le_bytes());
                out.extend_from_slice(&ysize.to_le_bytes());
                out.extend_from_slice(&id.0.to_le_bytes());
                out.extend_from_slice(&adjustment.code().to_le_bytes());
            }
            Tag::RawText(text) => {
                out.extend_from_slice(&text.to_utf16le(ctx)?);
            }
            Tag::Attr { name, value } => {
                encode_attr(attr_def(name)?, value, out)?;
            }
        }
        Ok(())
    }
}

fn attr_int(def: &AttrDef, value: &AttrValue) -> Result<i64> {
    match value {
        AttrValue::Int(v) => Ok(*v),
        AttrValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::BadArgument(format!("{}: expected integer, got '{s}'", def.name))),
        AttrValue::Pair(..) => Err(Error::BadArgument(format!(
            "{}: expected integer value",
            def.name
        ))),
    }
}

fn encode_attr(def: &AttrDef, value: &AttrValue, out: &mut Vec<u8>) -> Result<()> {
    match def.fmt {
        AttrFmt::Word => {
            let v = encode_word(attr_int(def, value)?).map_err(|e| retag(e, def.name))?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        AttrFmt::SignedWord => {
            let v = encode_signed_word(attr_int(def, value)?).map_err(|e| retag(e, def.name))?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        AttrFmt::DWord => {
            let v = encode_dword(attr_int(def, value)?).map_err(|e| retag(e, def.name))?;
            out.extend_from_slice(&v.to_le_bytes());
        }
        AttrFmt::Str => match value {
            AttrValue::Str(s) => out.extend_from_slice(&encode_string(s)?),
            _ => {
                return Err(Error::BadArgument(format!(
                    "{}: expected string value",
                    def.name
                )));
            }
        },
        AttrFmt::Color => {
            let color = match value {
                AttrValue::Int(v) => {
                    if !(0..=0xFFFF_FFFF).contains(v) {
                        return Err(Error::ValueOutOfRange {
                            tag: def.name.into(),
                            value: *v,
                        });
                    }
                    Color(*v as u32)
                }
                AttrValue::Str(s) => Color::parse(s).map_err(|e| retag(e, def.name))?,
                AttrValue::Pair(..) => {
                    return Err(Error::BadArgument(format!(
                        "{}: expected colour value",
                        def.name
                    )));
                }
            };
            out.extend_from_slice(&color.0.to_be_bytes());
        }
        AttrFmt::Enum(map) => match value {
            AttrValue::Str(s) => {
                let code = enum_code(map, def.name, s)?;
                out.extend_from_slice(&code.to_le_bytes());
            }
            other => {
                return Err(Error::BadEnumValue {
                    tag: def.name.to_string(),
                    value: format!("{other:?}"),
                });
            }
        },
        AttrFmt::RubyAa => match value {
            AttrValue::Str(s) => {
                let mut parts = s.split_whitespace();
                let align = parts.next().unwrap_or("");
                let adjust = parts.next().unwrap_or("none");
                let code =
                    enum_code(RUBY_ALIGNS, def.name, align)? | enum_code(RUBY_ADJUSTS, def.name, adjust)?;
                out.extend_from_slice(&code.to_le_bytes());
            }
            other => {
                return Err(Error::BadEnumValue {
                    tag: def.name.to_string(),
                    value: format!("{other:?}"),
                });
            }
        },
        AttrFmt::BgImage => match value {
            AttrValue::Pair(mode, id) => {
                let code = enum_code(BG_IMAGE_MODES, def.name, mode)?;
                out.extend_from_slice(&code.to_le_bytes());
                let id = encode_dword(*id).map_err(|e| retag(e, def.name))?;
                out.extend_from_slice(&id.to_le_bytes());
            }
            _ => {
                return Err(Error::BadArgument(format!(
                    "{}: expected (mode, stream id) pair",
                    def.name
                )));
            }
        },
    }
    Ok(())
}

/// Attach the attribute name to a range error raised by a shared packer.
fn retag(err: Error, name: &str) -> Error {
    match err {
        Error::ValueOutOfRange { value, .. } => Error::ValueOutOfRange {
            tag: name.to_string(),
            value,
        },
        other => other,
    }
}

/// Encode a whole tag list into one buffer.
pub fn encode_tags(tags: &[Tag], ctx: &EncodeCtx) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for tag in tags {
        tag.encode(ctx, &mut out)?;
    }
    Ok(out)
}

// ============================================================================
// Tests
// ============================================================================
