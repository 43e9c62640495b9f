//! Portal module: adjacency detection between cull regions and the
//! portal quads that link them.

mod portal;
mod portal_detector;

pub use portal::Portal;
pub use portal_detector::{detect_portals, FaceLinks, PortalGraph};
