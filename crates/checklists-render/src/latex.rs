//! LaTeX serialisation of checklist documents.

use std::fmt::Write as _;

use checklists_config::PaperSize;

use crate::emit::Instruction;

const PACKAGES: &[(&str, Option<&str>)] = &[
    ("fontenc", Some("T1")),
    ("inputenc", Some("utf8")),
    ("lmodern", None),
    ("textcomp", None),
    ("lastpage", None),
];

/// Values placed before the document body.
#[derive(Clone, Debug)]
pub struct DocumentHeader {
    pub papersize: PaperSize,
    /// Raw preamble markup, included without escaping.
    pub preamble: String,
    pub title: String,
}

/// In-memory LaTeX document assembled from a header and body instructions.
#[derive(Clone, Debug)]
pub struct LatexDocument {
    header: DocumentHeader,
    body: Vec<Instruction>,
}

impl LatexDocument {
    pub fn new(header: DocumentHeader) -> Self {
        Self {
            header,
            body: Vec::new(),
        }
    }

    pub fn push(&mut self, instruction: Instruction) {
        self.body.push(instruction);
    }

    pub fn extend(mut self, instructions: impl IntoIterator<Item = Instruction>) -> Self {
        self.body.extend(instructions);
        self
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.body
    }

    /// Renders the complete `.tex` source.
    pub fn to_tex(&self) -> String {
        let mut out = String::new();

        out.push_str("\\documentclass[10pt]{article}%\n");
        for (package, option) in PACKAGES {
            match option {
                Some(option) => {
                    let _ = writeln!(out, "\\usepackage[{option}]{{{package}}}%");
                }
                None => {
                    let _ = writeln!(out, "\\usepackage{{{package}}}%");
                }
            }
        }
        out.push_str("%\n");
        let _ = writeln!(out, "\\def\\papersize{{{}}}%", self.header.papersize);
        out.push_str(&self.header.preamble);
        out.push_str("%\n%\n");

        out.push_str("\\begin{document}%\n");
        out.push_str("\\normalsize%\n");
        let _ = writeln!(out, "\\title{{{}}}%", escape(&self.header.title));

        for instruction in &self.body {
            write_instruction(&mut out, instruction);
        }

        out.push_str("\\end{document}");
        out
    }
}

fn write_instruction(out: &mut String, instruction: &Instruction) {
    let _ = match instruction {
        Instruction::OpenChecklist { title } => {
            writeln!(out, "\\begin{{checklist}}{{{}}}%", escape(title))
        }
        Instruction::Item { title, value } => {
            writeln!(out, "\\item{{{}}}{{{}}}%", escape(title), escape(value))
        }
        Instruction::Hint { text } => writeln!(out, "\\hint{{{}}}%", escape(text)),
        Instruction::Decision { title } => writeln!(out, "\\decision{{{}}}%", escape(title)),
        Instruction::Step { text } => writeln!(out, "\\step{{{}}}%", escape(text)),
        Instruction::CloseChecklist => writeln!(out, "\\end{{checklist}}%"),
    };
}

/// Escapes characters that LaTeX would otherwise interpret.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            '~' => escaped.push_str("\\textasciitilde{}"),
            '^' => escaped.push_str("\\^{}"),
            '\\' => escaped.push_str("\\textbackslash{}"),
            '[' => escaped.push_str("{[}"),
            ']' => escaped.push_str("{]}"),
            '\n' => escaped.push_str("\\newline%\n"),
            '-' => escaped.push_str("{-}"),
            '\u{a0}' => escaped.push('~'),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header() -> DocumentHeader {
        DocumentHeader {
            papersize: PaperSize::A5,
            preamble: "\\usepackage{checklist}".into(),
            title: "Preflight Checks".into(),
        }
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape("50% & $5"), "50\\% \\& \\$5");
        assert_eq!(escape("a_b#c"), "a\\_b\\#c");
        assert_eq!(escape("{x}"), "\\{x\\}");
        assert_eq!(escape("~^\\"), "\\textasciitilde{}\\^{}\\textbackslash{}");
        assert_eq!(escape("[opt]"), "{[}opt{]}");
        assert_eq!(escape("one\ntwo"), "one\\newline%\ntwo");
        assert_eq!(escape("Pre--flight"), "Pre{-}{-}flight");
        assert_eq!(escape("A---B"), "A{-}{-}{-}B");
        assert_eq!(escape("10\u{a0}V"), "10~V");
        assert_eq!(escape("Launch? ok."), "Launch? ok.");
    }

    #[test]
    fn renders_full_document() {
        let document = LatexDocument::new(header()).extend([
            Instruction::OpenChecklist {
                title: "Preflight".into(),
            },
            Instruction::Item {
                title: "Battery".into(),
                value: "charged".into(),
            },
            Instruction::Hint {
                text: "check voltage".into(),
            },
            Instruction::Decision {
                title: "Launch?".into(),
            },
            Instruction::Step {
                text: "verify weather".into(),
            },
            Instruction::CloseChecklist,
        ]);

        let expected = "\\documentclass[10pt]{article}%
\\usepackage[T1]{fontenc}%
\\usepackage[utf8]{inputenc}%
\\usepackage{lmodern}%
\\usepackage{textcomp}%
\\usepackage{lastpage}%
%
\\def\\papersize{5}%
\\usepackage{checklist}%
%
\\begin{document}%
\\normalsize%
\\title{Preflight Checks}%
\\begin{checklist}{Preflight}%
\\item{Battery}{charged}%
\\hint{check voltage}%
\\decision{Launch?}%
\\step{verify weather}%
\\end{checklist}%
\\end{document}";

        assert_eq!(document.to_tex(), expected);
    }

    #[test]
    fn preamble_is_not_escaped() {
        let mut header = header();
        header.preamble = "\\newcommand{\\pct}{50\\%}".into();
        let tex = LatexDocument::new(header).to_tex();
        assert!(tex.contains("\\newcommand{\\pct}{50\\%}%\n"));
    }

    #[test]
    fn push_appends_in_order() {
        let mut document = LatexDocument::new(header());
        document.push(Instruction::OpenChecklist { title: "A".into() });
        document.push(Instruction::CloseChecklist);
        assert_eq!(document.instructions().len(), 2);
        assert!(document
            .to_tex()
            .ends_with("\\begin{checklist}{A}%\n\\end{checklist}%\n\\end{document}"));
    }
}
