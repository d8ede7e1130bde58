//! Per-file analysis helpers (decoding, framing, descriptor extraction).

pub mod audio;
pub mod descriptor;
pub(crate) mod frames;
pub(crate) mod frequency_domain;
pub(crate) mod tempo;
pub(crate) mod time_domain;

pub use audio::{AudioDecoder, DecodeError, DecodedAudio, SymphoniaDecoder};
pub use descriptor::{
    AudioDescriptor, DESCRIPTOR_COLUMNS, DESCRIPTOR_COUNT, DescriptorColumn, DescriptorExtractor,
    ExtractError, descriptor_names,
};
