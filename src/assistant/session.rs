//! Interactive question loop.

use std::io::{self, BufRead, Write};

use tracing::debug;

use super::DocumentAssistant;

const SEPARATOR_WIDTH: usize = 60;

/// One line of user input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// `sair`, `exit` or `quit`.
    Exit,
    /// `processar` or `process`.
    Process,
    /// Anything else that is not blank.
    Ask(String),
    /// A blank line.
    Empty,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The user asked to leave.
    Exited,
    /// The user ran the pipeline, which ends the session.
    Processed,
    /// Input was exhausted.
    EndOfInput,
}

/// Interprets one input line. Commands are case-insensitive.
pub fn parse_command(line: &str) -> SessionCommand {
    let line = line.trim();
    match line.to_lowercase().as_str() {
        "" => SessionCommand::Empty,
        "sair" | "exit" | "quit" => SessionCommand::Exit,
        "processar" | "process" => SessionCommand::Process,
        _ => SessionCommand::Ask(line.to_string()),
    }
}

/// Reads questions from `input` until the user leaves, runs the pipeline,
/// or input ends.
///
/// Answers and their source count are written to `output`. `process` is
/// invoked for the process command and its output goes to the same writer.
pub fn run_session<R, W, F>(
    input: R,
    output: &mut W,
    assistant: Option<&dyn DocumentAssistant>,
    mut process: F,
) -> io::Result<SessionOutcome>
where
    R: BufRead,
    W: Write,
    F: FnMut(&mut W) -> io::Result<()>,
{
    let rule = "=".repeat(SEPARATOR_WIDTH);
    writeln!(output, "{}", rule)?;
    writeln!(output, "MODO INTERATIVO - CONSULTAS")?;
    writeln!(output, "{}", rule)?;
    writeln!(output, "Digite suas perguntas sobre o processamento de VR/VA.")?;
    writeln!(
        output,
        "Digite 'sair' para encerrar ou 'processar' para processar os dados."
    )?;
    writeln!(output, "{}", "-".repeat(SEPARATOR_WIDTH))?;

    let mut lines = input.lines();
    loop {
        write!(output, "\nSua pergunta: ")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output, "\nEncerrando...")?;
            return Ok(SessionOutcome::EndOfInput);
        };

        match parse_command(&line?) {
            SessionCommand::Empty => continue,
            SessionCommand::Exit => {
                writeln!(output, "\nEncerrando...")?;
                return Ok(SessionOutcome::Exited);
            }
            SessionCommand::Process => {
                process(output)?;
                return Ok(SessionOutcome::Processed);
            }
            SessionCommand::Ask(question) => {
                debug!(question = %question, "Session question");
                match assistant.and_then(|a| a.ask(&question)) {
                    Some(answer) => {
                        writeln!(output, "\nResposta: {}", answer.answer)?;
                        writeln!(output, "Documentos fonte: {}", answer.sources.len())?;
                    }
                    None => writeln!(output, "\nAssistente não disponível.")?,
                }
                writeln!(output, "{}", "-".repeat(SEPARATOR_WIDTH))?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::{Answer, AnswerSource};
    use crate::error::EngineResult;
    use std::io::Cursor;
    use std::path::Path;

    struct Canned;

    impl DocumentAssistant for Canned {
        fn build_index(&mut self, _document: &Path) -> EngineResult<usize> {
            Ok(0)
        }

        fn load_index(&mut self, _path: &Path) -> EngineResult<()> {
            Ok(())
        }

        fn configure(&mut self, _prompt_template: Option<&str>) {}

        fn ask(&self, question: &str) -> Option<Answer> {
            Some(Answer {
                answer: format!("eco: {}", question),
                sources: vec![AnswerSource {
                    chunk: 0,
                    page: 1,
                    excerpt: String::new(),
                }],
            })
        }
    }

    fn session(input: &str, assistant: Option<&dyn DocumentAssistant>) -> (SessionOutcome, String, usize) {
        let mut output = Vec::new();
        let mut runs = 0;
        let outcome = run_session(Cursor::new(input), &mut output, assistant, |out| {
            runs += 1;
            writeln!(out, "processado")
        })
        .unwrap();
        (outcome, String::from_utf8(output).unwrap(), runs)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_command(" SAIR "), SessionCommand::Exit);
        assert_eq!(parse_command("quit"), SessionCommand::Exit);
        assert_eq!(parse_command("Processar"), SessionCommand::Process);
        assert_eq!(parse_command("   "), SessionCommand::Empty);
        assert_eq!(
            parse_command(" Quem recebe VR? "),
            SessionCommand::Ask("Quem recebe VR?".to_string())
        );
    }

    #[test]
    fn test_questions_then_exit() {
        let (outcome, output, runs) = session("Quem recebe?\n\nsair\nignored\n", Some(&Canned));

        assert_eq!(outcome, SessionOutcome::Exited);
        assert!(output.contains("Resposta: eco: Quem recebe?"));
        assert!(output.contains("Documentos fonte: 1"));
        assert!(!output.contains("ignored"));
        assert_eq!(runs, 0);
    }

    #[test]
    fn test_process_ends_session() {
        let (outcome, output, runs) = session("process\nsair\n", Some(&Canned));

        assert_eq!(outcome, SessionOutcome::Processed);
        assert!(output.contains("processado"));
        assert_eq!(runs, 1);
    }

    #[test]
    fn test_end_of_input_without_assistant() {
        let (outcome, output, _) = session("Quem recebe?\n", None);

        assert_eq!(outcome, SessionOutcome::EndOfInput);
        assert!(output.contains("Assistente não disponível."));
    }
}
