//! posterkit overlays short captions onto background images and bundles the results.
//!
//! The public API is session-oriented:
//!
//! - Load a [`PosterConfig`] (template catalog, font catalog, layout policy)
//! - Create a [`PosterSession`], select templates, add uploads and set captions
//! - [`PosterSession::build`] decodes every source concurrently and renders one poster per
//!   captioned source; [`PosterSession::export`] packs them into a ZIP [`Archive`]
//!
//! The text-layout pieces ([`chunk`], [`tokenize`], [`estimate_font_size`]) are usable on their
//! own.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod export;
mod foundation;
mod layout;
mod render;
mod session;
mod text;

pub use crate::foundation::config::{
    FontFace, LayoutPolicy, PosterConfig, Template, parse_hex_rgb,
};
pub use crate::foundation::error::{PosterError, PosterResult};

pub use crate::assets::blob::{BlobRegistry, BlobUrl};
pub use crate::assets::data_url::{DataUrl, decode_data_url, encode_data_url, is_data_url};
pub use crate::assets::decode::{DecodedBitmap, decode_image};
pub use crate::assets::loader::{CancelToken, ImageLoader, normalize_rel_path};
pub use crate::assets::source::{
    SelectedTemplates, Source, SourceKind, SourceLocator, TemplateLibrary, UploadFile,
    resolve_sources, shuffle_sources,
};
pub use crate::export::archive::{Archive, ArchivePacker, PackedFile, ZipPacker};
pub use crate::export::exporter::{
    BlobEncoder, ExportSettings, PngBlobEncoder, entry_base_name, export_entries,
    sanitize_base_name,
};
pub use crate::layout::font_size::{FontMetrics, estimate_font_size, fit_canvas_to_image};
pub use crate::render::canvas::PosterCanvas;
pub use crate::render::entry::Entry;
pub use crate::render::poster::{CaptionLayout, PosterRenderer};
pub use crate::session::captions::{has_any_caption, parse_captions};
pub use crate::session::preview::{BuildJob, LoadedBuild, PosterSession, StatusSummary};
pub use crate::text::chunk::{LINE_BUDGET, chunk, chunk_with};
pub use crate::text::segment::{
    CodePointSegmenter, GraphemeSegmenter, UnicodeSegmenter, default_segmenter,
};
pub use crate::text::tokenize::{PUNCTUATION, Token, is_punctuation, tokenize, tokenize_with};
