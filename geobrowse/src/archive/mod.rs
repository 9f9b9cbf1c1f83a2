//! Archive unwrapping.
//!
//! Detects when a location denotes a compressed or archived container,
//! rewrites it into a virtual location a backend can open through the
//! archive layer, and enumerates the recognized entries inside.

mod entries;
mod wrapper;

pub use entries::{enumerate_entries, list_entry_names, resolve_archive, ArchiveError};
pub use wrapper::{
    detect_wrapper, is_virtual, strip_marker, virtual_location, WrapperKind, VSIGZIP, VSITAR,
    VSIZIP,
};
