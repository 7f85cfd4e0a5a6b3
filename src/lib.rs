//! # bbeb
//!
//! A fast, lightweight library for building and writing Sony BBeB (LRF)
//! ebooks.
//!
//! ## Features
//!
//! - High-level document model: pages, text blocks, spans, images,
//!   canvases, buttons, headers/footers, and a table of contents
//! - Named styles with inheritance and per-element overrides
//! - Embedded TrueType fonts and JPEG/PNG/GIF/BMP image streams
//! - Bit-exact LRF output: tag encoding, zlib-compressed streams,
//!   object table, and compressed doc-info header
//!
//! ## Quick Start
//!
//! ```no_run
//! use bbeb::{Book, BookConfig, BookInfo, Page, Paragraph, TextBlock, write_lrf};
//!
//! let info = BookInfo::new("My Book").with_author("Author Name");
//! let mut book = Book::new(info, BookConfig::default());
//!
//! let mut page = Page::new();
//! let mut block = TextBlock::new().with_toc_label("Chapter 1");
//! block.append(Paragraph::with_text("Hello, world."));
//! page.append(block);
//! book.append_page(page).unwrap();
//!
//! write_lrf(&book, "output.lrf").unwrap();
//! ```
//!
//! ## Working with styles
//!
//! Styles are registered on the book and referenced by handle; spans
//! override individual attributes inline:
//!
//! ```
//! use bbeb::{Book, BookConfig, BookInfo, Inline, Page, Paragraph, Span, Style, TextBlock};
//!
//! let mut book = Book::new(BookInfo::new("Styled"), BookConfig::default());
//! let body = book
//!     .add_text_style(Style::new("body").with("fontsize", 100))
//!     .unwrap();
//!
//! let mut para = Paragraph::with_text("plain ");
//! let mut large = Span::new().with("fontsize", 140);
//! large.append(Inline::text("large"));
//! para.append(large);
//!
//! let mut block = TextBlock::new().with_text_style(body);
//! block.append(para);
//! let mut page = Page::new();
//! page.append(block);
//! book.append_page(page).unwrap();
//! let bytes = book.render_to_vec().unwrap();
//! assert!(bytes.starts_with(b"L\0R\0F\0\0\0"));
//! ```

pub mod docinfo;
pub mod error;
pub mod media;
pub mod model;
pub mod objects;
pub mod stream;
pub mod tags;

pub use docinfo::BookInfo;
pub use error::{Error, Result};
pub use media::ImageKind;
pub use model::{
    AttrMap, AttrValue, Binding, BlockSpace, Book, BookConfig, Canvas, CharButton, DropCaps,
    Emphasis, EmphasisKind, HeaderFooter, ImageBlock, ImageStream, Inline, Page, PageContent,
    PageIds, Paragraph, Plot, RuledLine, Span, Style, StyleFamily, StyleRef, TextBlock, TocEntry,
    write_lrf, write_lrf_to,
};
pub use objects::{ObjectId, ObjectKind};
pub use tags::{Color, LineKind, PlotAdjustment};
