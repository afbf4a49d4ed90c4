pub mod assembler;
pub mod config;
pub mod json_extractor;
pub mod logging;

pub use assembler::{assemble, ChatChunk, ChatGenerationResult, MarkerPair};
pub use config::{AppConfig, AssemblerConfig, ConfigError, ConfigResult, ExtractorConfig};
pub use json_extractor::{
    extract_json_object_string, extract_json_string, fix_json_string, json_parse_dirty,
    DirtyJsonParser, DirtyJsonStream,
};
