//! Pipeline stages for one validation pass

pub mod bucket_writer;
pub mod classifier;
pub mod lookup_client;
pub mod record_parser;
pub mod scheduler;
pub mod tag_extractor;

pub use bucket_writer::BucketWriter;
pub use classifier::Classifier;
pub use lookup_client::{DictionaryClient, LexicalLookup, LookupError, LookupSettings};
pub use record_parser::{LineOutcome, ParserConfig, RecordParser};
pub use scheduler::{Scheduler, SchedulerConfig};
pub use tag_extractor::{DefinitionHeuristics, TagExtractor};
