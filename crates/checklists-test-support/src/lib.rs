//! Shared test harness utilities for checklist crates.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Preamble stub defining the commands the generated document uses.
pub const PREAMBLE: &str = r"\newenvironment{checklist}[1]{\section*{#1}}{}
\newcommand{\decision}[1]{\textbf{#1}}
\newcommand{\step}[1]{#1}
\newcommand{\hint}[1]{\emph{#1}}";

/// The "Preflight" document as TOML. `{preamble}` is replaced by [`preflight`].
pub const PREFLIGHT_TOML: &str = r#"
[document]
preamble = "{preamble}"
name = "preflight"
title = "Preflight Checks"
papersize = "4"
compiler = "{compiler}"

[checklists.preflight]
title = "Preflight"

[[checklists.preflight.items]]
type = "item"
title = "Battery"
value = "charged"
hints = ["check voltage"]

[[checklists.preflight.items]]
type = "decision"
title = "Launch?"
steps = ["verify weather", "verify fuel"]
"#;

/// The same document as YAML.
pub const PREFLIGHT_YAML: &str = r#"
document:
  preamble: "{preamble}"
  name: preflight
  title: Preflight Checks
  papersize: "4"
  compiler: "{compiler}"
checklists:
  preflight:
    title: Preflight
    items:
      - type: item
        title: Battery
        value: charged
        hints:
          - check voltage
      - type: decision
        title: Launch?
        steps:
          - verify weather
          - verify fuel
"#;

/// The same document as JSON.
pub const PREFLIGHT_JSON: &str = r#"{
  "document": {
    "preamble": "{preamble}",
    "name": "preflight",
    "title": "Preflight Checks",
    "papersize": "4",
    "compiler": "{compiler}"
  },
  "checklists": {
    "preflight": {
      "title": "Preflight",
      "items": [
        {"type": "item", "title": "Battery", "value": "charged", "hints": ["check voltage"]},
        {"type": "decision", "title": "Launch?", "steps": ["verify weather", "verify fuel"]}
      ]
    }
  }
}"#;

/// Fills the `{preamble}` and `{compiler}` placeholders of a fixture.
pub fn preflight(template: &str, preamble: &Path, compiler: &str) -> String {
    // Forward slashes keep the path valid inside TOML/JSON strings on Windows.
    let preamble = preamble.display().to_string().replace('\\', "/");
    template
        .replace("{preamble}", &preamble)
        .replace("{compiler}", compiler)
}

/// Writes `contents` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent directory");
    }
    let mut file = fs::File::create(&path).expect("create file");
    file.write_all(contents.as_bytes()).expect("write file");
    path
}
