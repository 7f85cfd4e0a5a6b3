//! Stream encoding: wraps tag sequences or raw bytes into the
//! self-describing StreamFlags/StreamSize/StreamData/StreamEnd quad,
//! with optional zlib compression and tag-level optimisation passes.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::error::Result;
use crate::tags::{AttrValue, EncodeCtx, Tag, encode_tags};

/// Stream is zlib-compressed; the payload carries a 4-byte uncompressed
/// length prefix.
pub const FLAG_COMPRESSED: u16 = 0x0100;

/// Compress even when the compression optimiser is enabled.
pub const FLAG_FORCE_COMPRESSED: u16 = 0x8100;

/// Recognised but never produced; masked off on emit.
pub const FLAG_SCRAMBLED: u16 = 0x0200;

/// Flag set used by TOC streams.
pub const TOC_STREAM_FLAGS: u16 = 0x0051;

/// Only the low nine bits survive into the output file.
const EMITTED_FLAG_MASK: u16 = 0x01FF;

/// Per-render stream options.
#[derive(Debug, Clone, Copy)]
pub struct StreamOptions {
    /// Run the tag optimiser over tag payloads before serializing.
    pub optimize_tags: bool,
    /// Fall back to the uncompressed payload when deflate does not pay.
    pub optimize_compression: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            optimize_tags: true,
            optimize_compression: true,
        }
    }
}

/// Payload of a stream before wrapping.
#[derive(Debug, Clone)]
pub enum StreamPayload {
    Tags(Vec<Tag>),
    Bytes(Vec<u8>),
}

/// Wrap a payload into the four stream tags.
///
/// The scramble bit and the force-compression marker are cleared from the
/// emitted flags; compression is applied when requested and, unless forced,
/// undone again when it fails to save at least four bytes.
pub fn build_stream(
    flags: u16,
    payload: StreamPayload,
    ctx: &EncodeCtx,
    opts: &StreamOptions,
) -> Result<Vec<Tag>> {
    let buf = match payload {
        StreamPayload::Tags(tags) => {
            let tags = if opts.optimize_tags {
                let before = tags.len();
                let (tags, removed) = optimize_tags(tags);
                if removed > 0 {
                    log::debug!("tag optimiser removed {removed} of {before} tags");
                }
                tags
            } else {
                tags
            };
            encode_tags(&tags, ctx)?
        }
        StreamPayload::Bytes(bytes) => bytes,
    };

    let mut flags = flags;
    let mut buf = buf;
    if flags & FLAG_COMPRESSED != 0 {
        let compressed = deflate(&buf)?;
        let mut framed = Vec::with_capacity(4 + compressed.len());
        framed.extend_from_slice(&(buf.len() as u32).to_le_bytes());
        framed.extend_from_slice(&compressed);

        let forced = flags & 0x8000 != 0;
        if opts.optimize_compression && !forced && framed.len() + 4 > buf.len() {
            log::trace!(
                "compression skipped: {} -> {} bytes",
                buf.len(),
                framed.len()
            );
            flags &= !FLAG_COMPRESSED;
        } else {
            buf = framed;
        }
    }

    Ok(vec![
        Tag::StreamFlags(flags & EMITTED_FLAG_MASK),
        Tag::StreamSize(buf.len() as u32),
        Tag::StreamData(buf),
        Tag::StreamEnd,
    ])
}

/// zlib-deflate at the default balance level.
pub(crate) fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::new(6));
    encoder.write_all(data)?;
    encoder.finish()
}

// ============================================================================
// Tag optimiser
// ============================================================================

/// Per-text setting tags the optimiser knows how to drop.
const OPTIMIZED_ATTRS: [&str; 2] = ["fontsize", "fontweight"];

fn target_index(name: &str) -> Option<usize> {
    OPTIMIZED_ATTRS.iter().position(|t| *t == name)
}

fn is_text_marker(tag: &Tag) -> bool {
    matches!(tag, Tag::RawText(_) | Tag::TextString(_))
}

/// Remove dead and redundant per-text setting tags.
///
/// For each target attribute: consecutive settings with no text between
/// them collapse to the last one; a setting equal to the value already in
/// effect across text is dropped; trailing settings with no text after
/// them are dropped. The surviving list is a subsequence of the input and
/// replays to the same effective style at every text run. Returns the
/// optimised list and the number of tags removed.
pub fn optimize_tags(tags: Vec<Tag>) -> (Vec<Tag>, usize) {
    let mut remove = vec![false; tags.len()];

    for target in 0..OPTIMIZED_ATTRS.len() {
        // Value in effect for text already seen, and the latest setting
        // not yet covered by any text.
        let mut in_effect: Option<&AttrValue> = None;
        let mut pending: Option<usize> = None;

        for (i, tag) in tags.iter().enumerate() {
            match tag {
                Tag::Attr { name, .. } if target_index(name) == Some(target) => {
                    if let Some(prev) = pending {
                        remove[prev] = true;
                    }
                    pending = Some(i);
                }
                t if is_text_marker(t) => {
                    if let Some(idx) = pending.take() {
                        let value = match &tags[idx] {
                            Tag::Attr { value, .. } => value,
                            _ => unreachable!("pending index always holds an attr"),
                        };
                        if in_effect == Some(value) {
                            remove[idx] = true;
                        } else {
                            in_effect = Some(value);
                        }
                    }
                }
                _ => {}
            }
        }

        if let Some(idx) = pending {
            remove[idx] = true;
        }
    }

    let removed = remove.iter().filter(|r| **r).count();
    let out = tags
        .into_iter()
        .zip(remove)
        .filter_map(|(tag, dead)| (!dead).then_some(tag))
        .collect();
    (out, removed)
}

// ============================================================================
// Tests
// ============================================================================
