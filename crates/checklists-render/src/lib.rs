//! Turns a validated checklist config into a typeset PDF.
//!
//! Rendering is a single walk over the config: [`emit`] flattens checklists
//! into [`Instruction`]s, [`LatexDocument`] serialises them behind the
//! document header, and [`render`] writes the `.tex` file and hands it to the
//! configured LaTeX engine.

pub mod compile;
pub mod emit;
pub mod error;
pub mod fs;
pub mod latex;

use std::env;
use std::path::{Path, PathBuf};

use checklists_config::ChecklistConfig;
use tracing::info;

pub use emit::{emit, Instruction};
pub use error::{RenderError, RenderResult};
pub use latex::{escape, DocumentHeader, LatexDocument};

/// Options controlling where rendering reads and writes files.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Directory receiving the `.tex`/`.pdf` files; relative preamble paths
    /// are resolved against it.
    pub output_dir: PathBuf,
}

impl RenderOptions {
    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            output_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Files produced by a successful render.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledDocument {
    pub tex_path: PathBuf,
    pub pdf_path: PathBuf,
}

/// Builds the in-memory document for `config`, reading the preamble from disk.
pub fn build_document(
    config: &ChecklistConfig,
    options: &RenderOptions,
) -> RenderResult<LatexDocument> {
    let preamble_path = resolve(&config.document.preamble, &options.output_dir);
    let preamble =
        std::fs::read_to_string(&preamble_path).map_err(|source| RenderError::Preamble {
            path: preamble_path.clone(),
            source,
        })?;

    let header = DocumentHeader {
        papersize: config.document.papersize,
        preamble,
        title: config.document.title.clone(),
    };
    Ok(LatexDocument::new(header).extend(emit(config)))
}

/// Writes `<name>.tex` and compiles it with the configured engine.
///
/// The `.tex` file is left on disk whether or not compilation succeeds.
pub fn render(config: &ChecklistConfig, options: &RenderOptions) -> RenderResult<CompiledDocument> {
    let document = build_document(config, options)?;
    let name = &config.document.name;

    let tex_path = options.output_dir.join(format!("{name}.tex"));
    fs::write_atomic(&tex_path, &document.to_tex()).map_err(|source| RenderError::Io {
        path: tex_path.clone(),
        source,
    })?;
    info!(path = %tex_path.display(), "wrote latex source");

    compile::compile(&config.document.compiler, &options.output_dir, name)?;

    let pdf_path = options.output_dir.join(format!("{name}.pdf"));
    info!(path = %pdf_path.display(), compiler = %config.document.compiler, "compiled document");
    Ok(CompiledDocument { tex_path, pdf_path })
}

fn resolve(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
