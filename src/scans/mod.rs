//! Reader-side helpers built on the relay.
//!
//! # Data Flow
//! ```text
//! <mount>/get_nb_chap_et_img.php?oeuvre=<title>
//!     → client.rs (fetch chapter map through the relay)
//!     → chapters.rs (count chapters, page counts, page paths)
//!     → <mount>/<title>/<chapter>/<page>.jpg, fetched through the relay
//! ```

pub mod chapters;
pub mod client;

pub use chapters::{
    chapter_page_paths, count_chapters, display_chapter_number, page_path, pages_in_chapter,
    ChapterMap,
};
pub use client::{ClientError, ScanClient};
