//! Output writing for finished segments

pub mod writer;

pub use writer::SegmentWriter;
