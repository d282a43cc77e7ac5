//! The `nomodia take` command: an interactive pass over stdin.

use std::io::{self, BufRead, Write};

use anyhow::Result;

use nomodia_core::report::AssessmentReport;
use nomodia_core::AnswerOutcome;

use super::{describe_question, open_engine, GlobalArgs};

enum Reply {
    Answer(bool),
    Quit,
    Unknown,
}

fn parse_reply(line: &str) -> Reply {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" => Reply::Answer(true),
        "n" | "no" => Reply::Answer(false),
        "q" | "quit" | "exit" => Reply::Quit,
        _ => Reply::Unknown,
    }
}

pub fn execute(global: &GlobalArgs) -> Result<()> {
    let (_, mut engine) = open_engine(global)?;

    if engine.is_resumed() && engine.current_question().is_some() {
        let progress = engine.progress();
        println!(
            "Resuming your assessment ({}/{} answered).",
            progress.answered, progress.total
        );
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        let progress = engine.progress();
        let (Some(question), Some(number)) = (engine.current_question(), progress.current_number)
        else {
            break;
        };
        println!("\n{}", describe_question(question, number, progress.total));
        print!("[y/n/q] > ");
        io::stdout().flush()?;

        let Some(line) = lines.next().transpose()? else {
            println!("\nProgress saved. Run `nomodia take` to continue.");
            return Ok(());
        };

        match parse_reply(&line) {
            Reply::Answer(answer) => {
                if engine.record_answer(answer) == AnswerOutcome::Completed {
                    break;
                }
            }
            Reply::Quit => {
                println!("Progress saved. Run `nomodia take` to continue.");
                return Ok(());
            }
            Reply::Unknown => println!("Please answer y, n or q."),
        }
    }

    println!("\nAssessment complete.\n");
    print!("{}", AssessmentReport::from_session(engine.session()).to_text());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_are_case_insensitive() {
        assert!(matches!(parse_reply(" Y "), Reply::Answer(true)));
        assert!(matches!(parse_reply("No"), Reply::Answer(false)));
        assert!(matches!(parse_reply("QUIT"), Reply::Quit));
        assert!(matches!(parse_reply("maybe"), Reply::Unknown));
    }
}
