//! Flattening of a validated config into markup instructions.

use checklists_config::{ChecklistConfig, ChecklistElement};

/// One markup command of the checklist body, in output order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    OpenChecklist { title: String },
    Item { title: String, value: String },
    Hint { text: String },
    Decision { title: String },
    Step { text: String },
    CloseChecklist,
}

/// Walks checklists and their elements in declaration order.
pub fn emit(config: &ChecklistConfig) -> Vec<Instruction> {
    let mut instructions = Vec::new();

    for data in config.checklists.values() {
        instructions.push(Instruction::OpenChecklist {
            title: data.title.clone(),
        });

        for element in &data.items {
            match element {
                ChecklistElement::Item { title, value, hints } => {
                    instructions.push(Instruction::Item {
                        title: title.clone(),
                        value: value.clone(),
                    });
                    instructions.extend(hints.iter().map(|hint| Instruction::Hint {
                        text: hint.clone(),
                    }));
                }
                ChecklistElement::Decision { title, steps } => {
                    instructions.push(Instruction::Decision {
                        title: title.clone(),
                    });
                    instructions.extend(steps.iter().map(|step| Instruction::Step {
                        text: step.clone(),
                    }));
                }
            }
        }

        instructions.push(Instruction::CloseChecklist);
    }

    instructions
}
