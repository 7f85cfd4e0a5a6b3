//! A small reference decoder for LRF output, independent of the writer's
//! encoding tables. Knows just enough of the container and tag grammar to
//! verify round-trips.

use std::io::Read;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableEntry {
    pub id: u32,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug)]
pub struct LrfFile {
    pub version: u16,
    pub xor_key: u16,
    pub root_id: u32,
    pub object_count: u64,
    pub table_offset: u64,
    pub binding: u16,
    pub dpi: u32,
    pub width: u16,
    pub height: u16,
    pub color_depth: u16,
    pub toc_id: u32,
    pub toc_offset: u32,
    pub compressed_info_len: u16,
    pub thumb_kind: u16,
    pub thumb_len: u32,
    pub docinfo_len: u32,
    pub entries: Vec<TableEntry>,
    pub data: Vec<u8>,
}

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(data[at..at + 2].try_into().unwrap())
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(data[at..at + 4].try_into().unwrap())
}

fn u64_at(data: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(data[at..at + 8].try_into().unwrap())
}

pub fn parse_lrf(data: &[u8]) -> LrfFile {
    assert_eq!(&data[0..8], b"L\0R\0F\0\0\0", "bad signature");
    let object_count = u64_at(data, 0x10);
    let table_offset = u64_at(data, 0x18);

    let mut entries = Vec::new();
    let mut at = table_offset as usize;
    for _ in 0..object_count {
        entries.push(TableEntry {
            id: u32_at(data, at),
            offset: u32_at(data, at + 4),
            size: u32_at(data, at + 8),
        });
        assert_eq!(u32_at(data, at + 12), 0, "reserved table field");
        at += 16;
    }

    LrfFile {
        version: u16_at(data, 0x08),
        xor_key: u16_at(data, 0x0A),
        root_id: u32_at(data, 0x0C),
        object_count,
        table_offset,
        binding: u16_at(data, 0x24),
        dpi: u32_at(data, 0x26),
        width: u16_at(data, 0x2A),
        height: u16_at(data, 0x2C),
        color_depth: u16_at(data, 0x2E),
        toc_id: u32_at(data, 0x44),
        toc_offset: u32_at(data, 0x48),
        compressed_info_len: u16_at(data, 0x4C),
        thumb_kind: u16_at(data, 0x4E),
        thumb_len: u32_at(data, 0x50),
        docinfo_len: u32_at(data, 0x54),
        entries,
        data: data.to_vec(),
    }
}

impl LrfFile {
    pub fn entry(&self, id: u32) -> &TableEntry {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .unwrap_or_else(|| panic!("object {id} missing from table"))
    }

    pub fn object_bytes(&self, id: u32) -> &[u8] {
        let entry = self.entry(id);
        &self.data[entry.offset as usize..(entry.offset + entry.size) as usize]
    }

    /// Decoded tag list of an object, asserting the start/end framing.
    pub fn object_tags(&self, id: u32) -> Vec<DTag> {
        let tags = decode_tags(self.object_bytes(id));
        match tags.first() {
            Some(DTag::Tag { id: 0xF500, payload }) => {
                assert_eq!(u32_at(payload, 0), id, "ObjectStart id mismatch");
            }
            other => panic!("object {id} does not start with ObjectStart: {other:?}"),
        }
        assert_eq!(
            tags.last(),
            Some(&DTag::Tag {
                id: 0xF501,
                payload: vec![]
            }),
            "object {id} does not end with ObjectEnd"
        );
        tags
    }

    /// Object type code from the ObjectStart payload.
    pub fn object_kind(&self, id: u32) -> u16 {
        match &self.object_tags(id)[0] {
            DTag::Tag { payload, .. } => u16_at(payload, 4),
            DTag::Text(_) => unreachable!(),
        }
    }

    pub fn objects_of_kind(&self, kind: u16) -> Vec<u32> {
        self.entries
            .iter()
            .map(|e| e.id)
            .filter(|id| self.object_kind(*id) == kind)
            .collect()
    }
}

/// A decoded tag, or a run of raw UTF-16LE body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DTag {
    Tag { id: u16, payload: Vec<u8> },
    Text(Vec<u8>),
}

impl DTag {
    pub fn tag_id(&self) -> Option<u16> {
        match self {
            DTag::Tag { id, .. } => Some(*id),
            DTag::Text(_) => None,
        }
    }

    pub fn payload(&self) -> &[u8] {
        match self {
            DTag::Tag { payload, .. } => payload,
            DTag::Text(bytes) => bytes,
        }
    }
}

/// Fixed payload length for tags with static layouts, `None` for
/// variable-length ones handled specially.
fn fixed_payload_len(id: u16) -> Option<usize> {
    Some(match id {
        0xF500 => 6,
        0xF501 | 0xF506 | 0xF5A2 | 0xF5A8 | 0xF5A9 | 0xF5AA => 0,
        0xF5B1..=0xF5B6 | 0xF5C1 | 0xF5C2 | 0xF5C4 | 0xF5C7 | 0xF5D2 => 0,
        0xF503 | 0xF504 | 0xF507..=0xF50A | 0xF54B | 0xF57C | 0xF5A1 | 0xF5A7 | 0xF5D4 => 4,
        // Text attributes: signed/unsigned words except facename and colours.
        0xF511..=0xF515 | 0xF519..=0xF51E => 2,
        0xF517 | 0xF518 => 4,
        // Block attributes.
        0xF521..=0xF525 | 0xF527 | 0xF528 | 0xF52A..=0xF52D => 2,
        0xF526 | 0xF529 => 4,
        // Page attributes.
        0xF531..=0xF53D | 0xF53F => 2,
        0xF53E => 6,
        0xF546 | 0xF54A => 4,
        0xF549 => 8,
        0xF551 | 0xF552 | 0xF554 | 0xF561 | 0xF575 | 0xF584 | 0xF5C3 | 0xF5C6 | 0xF5C8 => 2,
        0xF5D9 | 0xF5DA => 2,
        0xF553 | 0xF56A => 8,
        0xF573 | 0xF5D1 => 10,
        _ => return None,
    })
}

fn is_string_tag(id: u16) -> bool {
    matches!(id, 0xF516 | 0xF555 | 0xF559 | 0xF55D | 0xF5CC)
}

/// Decode a tag sequence. Any 16-bit word whose high byte is 0xF5 starts
/// a tag; everything else is a UTF-16LE code unit of body text.
pub fn decode_tags(data: &[u8]) -> Vec<DTag> {
    let mut out = Vec::new();
    let mut at = 0usize;
    let mut stream_size: Option<usize> = None;
    let mut text_run: Vec<u8> = Vec::new();

    while at + 1 < data.len() {
        let word = u16_at(data, at);
        if word & 0xFF00 != 0xF500 {
            text_run.extend_from_slice(&data[at..at + 2]);
            at += 2;
            continue;
        }
        if !text_run.is_empty() {
            out.push(DTag::Text(std::mem::take(&mut text_run)));
        }
        at += 2;

        let payload = if let Some(len) = fixed_payload_len(word) {
            let p = data[at..at + len].to_vec();
            at += len;
            p
        } else if is_string_tag(word) {
            let len = u16_at(data, at) as usize;
            let p = data[at..at + 2 + len].to_vec();
            at += 2 + len;
            p
        } else {
            match word {
                // StreamData: sized by the preceding StreamSize.
                0xF505 => {
                    let len = stream_size.expect("StreamData without StreamSize");
                    let p = data[at..at + len].to_vec();
                    at += len;
                    p
                }
                // Object/page lists: word count then dwords.
                0xF50B | 0xF55C => {
                    let count = u16_at(data, at) as usize;
                    let p = data[at..at + 2 + 4 * count].to_vec();
                    at += 2 + 4 * count;
                    p
                }
                // Emphasis dots: font id, face string, code point.
                0xF5CB => {
                    let str_len = u16_at(data, at + 4) as usize;
                    let total = 4 + 2 + str_len + 2;
                    let p = data[at..at + total].to_vec();
                    at += total;
                    p
                }
                other => panic!("reference decoder: unknown tag {other:#06X}"),
            }
        };

        if word == 0xF504 {
            stream_size = Some(u32_at(&payload, 0) as usize);
        }
        out.push(DTag::Tag { id: word, payload });
    }
    if !text_run.is_empty() {
        out.push(DTag::Text(text_run));
    }
    assert_eq!(at, data.len(), "trailing bytes after tag decode");
    out
}

/// Extract and (if flagged) inflate the first stream in a tag list.
pub fn stream_payload(tags: &[DTag]) -> Vec<u8> {
    let flags_at = tags
        .iter()
        .position(|t| t.tag_id() == Some(0xF554))
        .expect("no StreamFlags tag");
    let flags = u16_at(tags[flags_at].payload(), 0);
    let size = match &tags[flags_at + 1] {
        DTag::Tag { id: 0xF504, payload } => u32_at(payload, 0) as usize,
        other => panic!("StreamFlags not followed by StreamSize: {other:?}"),
    };
    let data = match &tags[flags_at + 2] {
        DTag::Tag { id: 0xF505, payload } => payload.clone(),
        other => panic!("StreamSize not followed by StreamData: {other:?}"),
    };
    assert_eq!(data.len(), size, "StreamSize disagrees with StreamData");
    assert_eq!(
        tags[flags_at + 3].tag_id(),
        Some(0xF506),
        "StreamData not followed by StreamEnd"
    );

    if flags & 0x0100 != 0 {
        let uncompressed_len = u32_at(&data, 0) as usize;
        let mut out = Vec::new();
        flate2::read::ZlibDecoder::new(&data[4..])
            .read_to_end(&mut out)
            .expect("stream payload does not inflate");
        assert_eq!(out.len(), uncompressed_len, "bad uncompressed length prefix");
        out
    } else {
        data
    }
}

pub fn utf16le(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

/// Recursively collect every object id referenced from an object's tags,
/// descending into stream payloads.
pub fn collect_references(tags: &[DTag], out: &mut Vec<u32>) {
    for (i, tag) in tags.iter().enumerate() {
        match tag {
            DTag::Tag { id: 0xF503, payload }
            | DTag::Tag { id: 0xF54B, payload }
            | DTag::Tag { id: 0xF57C, payload }
            | DTag::Tag { id: 0xF5A7, payload }
            | DTag::Tag { id: 0xF5D4, payload } => out.push(u32_at(payload, 0)),
            DTag::Tag { id: 0xF553, payload } => out.push(u32_at(payload, 4)),
            DTag::Tag { id: 0xF56A, payload } => {
                out.push(u32_at(payload, 0));
                out.push(u32_at(payload, 4));
            }
            DTag::Tag { id: 0xF5D1, payload } => out.push(u32_at(payload, 6)),
            DTag::Tag { id: 0xF50B, payload } | DTag::Tag { id: 0xF55C, payload } => {
                let count = u16_at(payload, 0) as usize;
                for n in 0..count {
                    out.push(u32_at(payload, 2 + 4 * n));
                }
            }
            DTag::Tag { id: 0xF554, .. } => {
                // Follow the stream: tag-shaped payloads are decoded and
                // scanned too. Streams of raw bytes (images, fonts, TOC)
                // intentionally do not decode as tags.
                let flags = u16_at(tag.payload(), 0);
                let looks_binary = flags & 0x00FF != 0;
                if !looks_binary && i + 2 < tags.len() {
                    let payload = stream_payload(&tags[i..]);
                    if !payload.is_empty() {
                        let inner = decode_tags(&payload);
                        collect_references(&inner, out);
                    }
                }
            }
            _ => {}
        }
    }
}
