//! Public library API for decoding Unreal `.uasset`/`.umap` packages.

/// Package parsing, property decoding, reference resolution, and inheritance helpers.
pub mod pkg;
