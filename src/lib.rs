//! Builds an influencer persona profile and a content blueprint from a batch
//! of social posts.

pub mod claims;
pub mod cluster;
pub mod consolidate;
pub mod error;
pub mod evolution;
pub mod export;
pub mod ingest;
pub mod lang;
pub mod lexicon;
pub mod models;
pub mod orchestrator;
pub mod out_models;
pub mod render;
pub mod sponsored;
pub mod stylometry;
pub mod text;

pub use error::{ConfigError, IngestError};
pub use lexicon::Lexicon;
pub use models::Document;
pub use orchestrator::{Pipeline, PipelineConfig, RunOptions};
pub use out_models::{ContentBlueprint, PersonaProfile, PipelineResult};
