//! Data model shared by the reelmeta crates.
#![allow(missing_docs)]

pub mod descriptor;
pub mod error;
pub mod media_kind;
pub mod record;

pub use descriptor::{ANIMATION_GENRE_ID, MediaDescriptor, is_all_cjk, is_cjk};
pub use error::{ModelError, Result as ModelResult};
pub use media_kind::{MediaKind, ProviderKind};
pub use record::{ProviderRecord, ResolvedMedia, SeasonSummary};
