use std::fs;
use std::path::Path;

use checklists_config::{ChecklistConfig, ConfigFormat};
use checklists_render::{build_document, render, Instruction, RenderError, RenderOptions};
use checklists_test_support::{preflight, write_file, PREAMBLE, PREFLIGHT_TOML};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn preflight_config(preamble: &Path, compiler: &str) -> ChecklistConfig {
    ChecklistConfig::from_str(
        &preflight(PREFLIGHT_TOML, preamble, compiler),
        ConfigFormat::Toml,
    )
    .expect("valid preflight config")
}

#[test]
fn builds_document_with_preamble_and_body() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), "preamble.inc", PREAMBLE);
    let config = preflight_config(Path::new("preamble.inc"), "xelatex");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let document = build_document(&config, &options).expect("build document");

    assert_eq!(
        document.instructions().first(),
        Some(&Instruction::OpenChecklist {
            title: "Preflight".into()
        })
    );
    let tex = document.to_tex();
    assert!(tex.contains("\\def\\papersize{4}%"));
    assert!(tex.contains(PREAMBLE));
    assert!(tex.contains("\\title{Preflight Checks}%"));
    assert!(tex.contains(
        "\\begin{checklist}{Preflight}%\n\
         \\item{Battery}{charged}%\n\
         \\hint{check voltage}%\n\
         \\decision{Launch?}%\n\
         \\step{verify weather}%\n\
         \\step{verify fuel}%\n\
         \\end{checklist}%\n"
    ));
}

#[test]
fn missing_preamble_is_reported() {
    let temp = TempDir::new().expect("tempdir");
    let config = preflight_config(Path::new("absent.inc"), "xelatex");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let err = render(&config, &options).unwrap_err();

    assert!(matches!(err, RenderError::Preamble { .. }), "{err}");
    assert!(!temp.path().join("preflight.tex").exists());
}

#[test]
fn absolute_preamble_path_is_used_as_is() {
    let temp = TempDir::new().expect("tempdir");
    let preamble = write_file(temp.path(), "shared/preamble.inc", PREAMBLE);
    let output = temp.path().join("out");
    let config = preflight_config(&preamble, "xelatex");
    let options = RenderOptions::default().with_output_dir(&output);

    let document = build_document(&config, &options).expect("build document");
    assert!(document.to_tex().contains(PREAMBLE));
}

#[test]
fn missing_compiler_keeps_tex_source() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), "preamble.inc", PREAMBLE);
    let config = preflight_config(Path::new("preamble.inc"), "checklists-missing-engine");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let err = render(&config, &options).unwrap_err();

    assert!(matches!(err, RenderError::CompilerNotFound { .. }), "{err}");
    let tex = fs::read_to_string(temp.path().join("preflight.tex")).expect("tex retained");
    assert!(tex.ends_with("\\end{document}"));
}

#[cfg(unix)]
#[test]
fn successful_compile_returns_output_paths() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), "preamble.inc", PREAMBLE);
    let config = preflight_config(Path::new("preamble.inc"), "true");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let compiled = render(&config, &options).expect("render");

    assert_eq!(compiled.tex_path, temp.path().join("preflight.tex"));
    assert_eq!(compiled.pdf_path, temp.path().join("preflight.pdf"));
    assert!(compiled.tex_path.exists());
}

#[cfg(unix)]
#[test]
fn compiler_failure_is_propagated_and_tex_retained() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), "preamble.inc", PREAMBLE);
    let config = preflight_config(Path::new("preamble.inc"), "false");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let err = render(&config, &options).unwrap_err();

    match err {
        RenderError::CompilerFailed {
            compiler, status, ..
        } => {
            assert_eq!(compiler, "false");
            assert!(!status.success());
        }
        other => panic!("expected compiler failure, got {other}"),
    }
    assert!(temp.path().join("preflight.tex").exists());
}

#[test]
fn same_config_renders_identical_source() {
    let temp = TempDir::new().expect("tempdir");
    write_file(temp.path(), "preamble.inc", PREAMBLE);
    let config = preflight_config(Path::new("preamble.inc"), "xelatex");
    let options = RenderOptions::default().with_output_dir(temp.path());

    let first = build_document(&config, &options).expect("first").to_tex();
    let second = build_document(&config, &options).expect("second").to_tex();
    assert_eq!(first, second);
}
