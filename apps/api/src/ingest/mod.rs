// Ingestion: the plumbing between an HTTP upload and the layout core.
// Parses the CSV manifest, extracts the image archive into per-run scoped
// storage, and exposes the extracted files as a RasterResolver.

pub mod archive;
pub mod handlers;
pub mod manifest;
