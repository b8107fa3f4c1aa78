//! Invocation of the external LaTeX engine.

use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{RenderError, RenderResult};

/// Upper bound on engine passes when the log keeps requesting a rerun.
const MAX_PASSES: usize = 4;

const AUX_EXTENSIONS: &[&str] = &["aux", "log", "out", "fls", "fdb_latexmk"];

static RERUN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(Rerun to get|Please \(re\)run|Rerun LaTeX\.)")
        .expect("BUG: invalid RERUN_RE regex literal")
});

/// Runs `compiler` on `<name>.tex` inside `working_dir` until the output is stable.
pub fn compile(compiler: &str, working_dir: &Path, name: &str) -> RenderResult<()> {
    let tex_file = format!("{name}.tex");

    for pass in 1..=MAX_PASSES {
        debug!(compiler, pass, file = %tex_file, "running latex compiler");
        let output = run_once(compiler, working_dir, &tex_file)?;
        let combined = combined_output(&output);

        if !output.status.success() {
            return Err(RenderError::CompilerFailed {
                compiler: compiler.to_owned(),
                status: output.status,
                output: combined,
            });
        }

        if !needs_rerun(&combined) {
            break;
        }
    }

    remove_aux_files(working_dir, name);
    Ok(())
}

fn run_once(compiler: &str, working_dir: &Path, tex_file: &str) -> RenderResult<Output> {
    Command::new(compiler)
        .arg("--interaction=nonstopmode")
        .arg(tex_file)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => RenderError::CompilerNotFound {
                compiler: compiler.to_owned(),
                source,
            },
            _ => RenderError::CompilerSpawn {
                compiler: compiler.to_owned(),
                source,
            },
        })
}

fn combined_output(output: &Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.is_empty() {
        stdout.into_owned()
    } else {
        format!("{stdout}\n{stderr}")
    }
}

pub(crate) fn needs_rerun(output: &str) -> bool {
    RERUN_RE.is_match(output)
}

fn remove_aux_files(working_dir: &Path, name: &str) {
    for extension in AUX_EXTENSIONS {
        let path = working_dir.join(format!("{name}.{extension}"));
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(path = %path.display(), error = %err, "could not remove aux file"),
        }
    }
}
