//! The `nomodia answer` command.

use anyhow::Result;

use nomodia_core::AnswerOutcome;

use super::{open_engine, print_current, GlobalArgs};

pub fn execute(global: &GlobalArgs, answer: bool) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;

    match engine.record_answer(answer) {
        AnswerOutcome::Advanced { .. } => {
            println!("Recorded: {}", if answer { "yes" } else { "no" });
            print_current(&engine);
        }
        AnswerOutcome::Completed => {
            println!("Recorded: {}", if answer { "yes" } else { "no" });
            println!("Assessment complete.\n");
            let report = nomodia_core::report::AssessmentReport::from_session(engine.session());
            print!("{}", report.to_text());
        }
        AnswerOutcome::Ignored => {
            println!("Assessment already completed; run `nomodia reset` to start over.");
        }
    }

    Ok(())
}
