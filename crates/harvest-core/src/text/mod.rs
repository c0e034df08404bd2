//! Text normalization: byte decoding, sentence segmentation, corpus assembly.

mod corpus;
mod decode;
mod segment;

pub use corpus::{build_corpus, CorpusStats, DOCUMENT_SEPARATOR};
pub use decode::decode;
pub use segment::segment;
