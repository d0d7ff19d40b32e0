// src/export.rs
use anyhow::{Context, Result};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::debug;

use crate::out_models::PipelineResult;
use crate::render::render_persona_markdown;

pub const PROFILE_FILE: &str = "persona_profile.json";
pub const BLUEPRINT_FILE: &str = "content_blueprint.json";
pub const DOCUMENTS_FILE: &str = "annotated_documents.json";
pub const MARKDOWN_FILE: &str = "persona.md";

/// Write the run artifacts into `out_dir`, creating it if needed.
pub fn write_all(out_dir: &Path, result: &PipelineResult, markdown: bool) -> Result<()> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {:?}", out_dir))?;

    write_json(out_dir.join(PROFILE_FILE), &result.persona_profile)?;
    debug!("Wrote {}", PROFILE_FILE);

    write_json(out_dir.join(BLUEPRINT_FILE), &result.content_blueprint)?;
    debug!("Wrote {}", BLUEPRINT_FILE);

    write_json(out_dir.join(DOCUMENTS_FILE), &result.annotated_documents)?;
    debug!("Wrote {}", DOCUMENTS_FILE);

    if markdown {
        let md = render_persona_markdown(&result.persona_profile, &result.content_blueprint);
        fs::write(out_dir.join(MARKDOWN_FILE), md.as_bytes())
            .with_context(|| format!("write {}", MARKDOWN_FILE))?;
        debug!("Wrote {}", MARKDOWN_FILE);
    }
    Ok(())
}

fn write_json<P: AsRef<Path>, T: ?Sized + Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, serde_json::to_vec_pretty(value)?).with_context(|| format!("write {:?}", path))
}
