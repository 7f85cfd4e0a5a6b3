//! Property-based invariant tests for the tag codec, stream encoder,
//! tag optimiser, and style resolution.
//!
//! Invariants covered:
//! 1. Word/signed-word/colour payloads round-trip through the reference
//!    decoder; out-of-range values are rejected.
//! 2. Length-prefixed strings round-trip for arbitrary Unicode input.
//! 3. Streams are always StreamFlags/StreamSize(N)/StreamData(N bytes)/
//!    StreamEnd, and compressed payloads inflate to the prefixed length.
//! 4. The tag optimiser output is a subsequence of its input and replays
//!    to identical per-text effective-style snapshots.
//! 5. Style resolution equals the left fold of defaults and ancestor
//!    attribute maps; cycles always error.

use proptest::prelude::*;

use bbeb::stream::{FLAG_COMPRESSED, StreamOptions, StreamPayload, build_stream, optimize_tags};
use bbeb::tags::{
    AttrValue, Color, EncodeCtx, Tag, Text, encode_signed_word, encode_string, encode_word,
};
use bbeb::{Book, BookConfig, BookInfo, Style};

// ── Strategies ────────────────────────────────────────────────────────────

/// Tag lists made of optimiser targets, text markers, and bystanders.
fn optimizer_tag_strategy() -> impl Strategy<Value = Vec<Tag>> {
    let tag = prop_oneof![
        (50i64..=60).prop_map(|v| Tag::attr("fontsize", v)),
        (400i64..=410).prop_map(|v| Tag::attr("fontweight", v)),
        "[a-z]{1,4}".prop_map(|s| Tag::RawText(Text::Str(s))),
        "[a-z]{1,4}".prop_map(|s| Tag::TextString(Text::Str(s))),
        Just(Tag::Cr),
        Just(Tag::PStart(0)),
        Just(Tag::PEnd),
    ];
    proptest::collection::vec(tag, 0..40)
}

/// (value in effect for fontsize, for fontweight) at one text marker.
type StyleSnapshot = (Option<i64>, Option<i64>);

fn replay_snapshots(tags: &[Tag]) -> Vec<StyleSnapshot> {
    let mut current: StyleSnapshot = (None, None);
    let mut snapshots = Vec::new();
    for tag in tags {
        match tag {
            Tag::Attr { name, value } => {
                let v = match value {
                    AttrValue::Int(v) => Some(*v),
                    _ => None,
                };
                match name.as_str() {
                    "fontsize" => current.0 = v,
                    "fontweight" => current.1 = v,
                    _ => {}
                }
            }
            Tag::RawText(_) | Tag::TextString(_) => snapshots.push(current),
            _ => {}
        }
    }
    snapshots
}

fn is_subsequence(needle: &[Tag], haystack: &[Tag]) -> bool {
    let mut it = haystack.iter();
    needle.iter().all(|tag| it.any(|h| h == tag))
}

// ── Properties ────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn word_round_trips(value in 0i64..=0xFFFF) {
        let encoded = encode_word(value).unwrap();
        prop_assert_eq!(encoded as i64, value);
    }

    #[test]
    fn word_rejects_out_of_range(value in 0x1_0000i64..) {
        prop_assert!(encode_word(value).is_err());
        prop_assert!(encode_word(-value).is_err());
    }

    #[test]
    fn signed_word_round_trips(value in -32768i64..=32767) {
        let encoded = encode_signed_word(value).unwrap();
        prop_assert_eq!(encoded as i64, value);
    }

    #[test]
    fn signed_word_rejects_out_of_range(value in 32768i64..) {
        prop_assert!(encode_signed_word(value).is_err());
        prop_assert!(encode_signed_word(-value - 1).is_err());
    }

    #[test]
    fn colour_literal_round_trips(value: u32) {
        let hex = format!("{value:#010X}");
        prop_assert_eq!(Color::parse(&hex).unwrap(), Color(value));
        let dec = format!("{value}");
        prop_assert_eq!(Color::parse(&dec).unwrap(), Color(value));
    }

    #[test]
    fn string_payload_round_trips(s in "\\PC{0,200}") {
        let encoded = encode_string(&s).unwrap();
        let len = u16::from_le_bytes([encoded[0], encoded[1]]) as usize;
        prop_assert_eq!(len, encoded.len() - 2);
        let units: Vec<u16> = encoded[2..]
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        prop_assert_eq!(String::from_utf16(&units).unwrap(), s);
    }

    #[test]
    fn streams_are_well_framed(payload in proptest::collection::vec(any::<u8>(), 0..2000),
                               compress in any::<bool>()) {
        let flags = if compress { FLAG_COMPRESSED } else { 0 };
        let tags = build_stream(
            flags,
            StreamPayload::Bytes(payload.clone()),
            &EncodeCtx::default(),
            &StreamOptions::default(),
        ).unwrap();

        prop_assert_eq!(tags.len(), 4);
        let (Tag::StreamFlags(out_flags), Tag::StreamSize(size), Tag::StreamData(data), Tag::StreamEnd) =
            (&tags[0], &tags[1], &tags[2], &tags[3])
        else {
            panic!("bad stream shape: {tags:?}");
        };
        let (out_flags, size, data) = (*out_flags, *size, data.clone());
        prop_assert_eq!(size as usize, data.len());
        prop_assert_eq!(out_flags & !0x01FF, 0, "only low nine bits emitted");

        if out_flags & FLAG_COMPRESSED != 0 {
            let prefixed = u32::from_le_bytes(data[0..4].try_into().unwrap()) as usize;
            prop_assert_eq!(prefixed, payload.len());
            let mut inflated = Vec::new();
            use std::io::Read;
            flate2::read::ZlibDecoder::new(&data[4..]).read_to_end(&mut inflated).unwrap();
            prop_assert_eq!(&inflated, &payload);
            // Compression must have paid for itself.
            prop_assert!(data.len() + 4 <= payload.len());
        } else {
            prop_assert_eq!(data, payload);
        }
    }

    #[test]
    fn optimizer_output_is_subsequence_with_same_semantics(tags in optimizer_tag_strategy()) {
        let (optimized, removed) = optimize_tags(tags.clone());
        prop_assert_eq!(removed, tags.len() - optimized.len());
        prop_assert!(is_subsequence(&optimized, &tags));
        prop_assert_eq!(replay_snapshots(&optimized), replay_snapshots(&tags));
    }

    #[test]
    fn optimizer_is_idempotent(tags in optimizer_tag_strategy()) {
        let (once, _) = optimize_tags(tags);
        let (twice, removed) = optimize_tags(once.clone());
        prop_assert_eq!(removed, 0);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn style_resolution_is_a_left_fold(sizes in proptest::collection::vec(50i64..300, 1..6)) {
        let mut book = Book::new(BookInfo::new("P"), BookConfig::default());
        let mut parent: Option<String> = None;
        let mut refs = Vec::new();
        for (i, size) in sizes.iter().enumerate() {
            let name = format!("s{i}");
            let mut style = Style::new(&name).with("fontsize", *size);
            if let Some(p) = &parent {
                style = style.with_parent(p.clone());
            }
            refs.push(book.add_text_style(style).unwrap());
            parent = Some(name);
        }

        // The deepest style resolves to its own declaration, and every
        // link in the chain sees exactly its own override of the fold.
        for (re, size) in refs.iter().zip(&sizes) {
            let resolved = book.resolve_style(*re).unwrap();
            prop_assert_eq!(resolved.get("fontsize"), Some(&AttrValue::Int(*size)));
            // An attribute declared by no ancestor falls through to the
            // family default.
            prop_assert_eq!(resolved.get("wordspace"), Some(&AttrValue::Int(25)));
        }
    }
}

#[test]
fn style_cycles_always_error() {
    let mut book = Book::new(BookInfo::new("C"), BookConfig::default());
    book.add_text_style(Style::new("a").with_parent("b")).unwrap();
    let b = book.add_text_style(Style::new("b").with_parent("a")).unwrap();
    assert!(matches!(
        book.resolve_style(b),
        Err(bbeb::Error::StyleCycle(_))
    ));
}
