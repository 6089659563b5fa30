//! Line-oriented quiz front end over any reader/writer pair.

use std::collections::BTreeSet;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use quiz_core::model::{ChoiceLetter, LetterError, Question};
use services::quiz::{Outcome, QuizSession, QuizSummary};
use services::{Lifecycle, QuizError};

/// How an interactive run ended.
#[derive(Debug)]
pub enum Exit {
    Finished(QuizSummary),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    Toggle(Vec<ChoiceLetter>),
    Submit,
    Advance,
    Next,
    Previous,
    Goto(usize),
    First,
    Last,
    Finish,
    Restart,
    Review,
    Help,
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
enum InputError {
    Unknown(String),
    MissingArgument(&'static str),
    BadLetters(LetterError),
    BadNumber(String),
}

impl std::fmt::Display for InputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputError::Unknown(raw) => write!(f, "unknown command: {raw} (type h for help)"),
            InputError::MissingArgument(cmd) => write!(f, "{cmd} needs an argument"),
            InputError::BadLetters(err) => write!(f, "{err}"),
            InputError::BadNumber(raw) => write!(f, "not a question number: {raw}"),
        }
    }
}

fn parse_input(line: &str) -> Result<Input, InputError> {
    let line = line.trim();
    let (cmd, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(cmd, rest)| (cmd, rest.trim()));

    let input = match cmd.to_ascii_lowercase().as_str() {
        "" => Input::Advance,
        "t" | "toggle" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("toggle"));
            }
            Input::Toggle(ChoiceLetter::parse_many(rest).map_err(InputError::BadLetters)?)
        }
        "s" | "submit" => Input::Submit,
        "n" | "next" => Input::Next,
        "p" | "prev" | "previous" => Input::Previous,
        "g" | "goto" => {
            if rest.is_empty() {
                return Err(InputError::MissingArgument("goto"));
            }
            let number: usize = rest
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| InputError::BadNumber(rest.to_owned()))?;
            Input::Goto(number - 1)
        }
        "first" => Input::First,
        "last" => Input::Last,
        "f" | "finish" => Input::Finish,
        "r" | "restart" => Input::Restart,
        "review" => Input::Review,
        "h" | "help" | "?" => Input::Help,
        "q" | "quit" | "exit" => Input::Quit,
        _ => return Err(InputError::Unknown(line.to_owned())),
    };
    Ok(input)
}

fn join_letters(letters: &BTreeSet<ChoiceLetter>) -> String {
    if letters.is_empty() {
        return "-".to_owned();
    }
    letters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Drives a started `QuizSession` from text commands.
pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Run until the user quits, input ends, or a completed quiz is not restarted.
    ///
    /// Quiz rule violations are printed and the loop continues; only I/O
    /// failures end it with an error.
    pub fn run(&mut self, session: &mut QuizSession) -> io::Result<Exit> {
        let roster: Vec<Arc<Question>> = session.roster().to_vec();
        self.print_help()?;

        loop {
            if session.lifecycle() == Lifecycle::Completed {
                let summary = self.finish(session)?;
                if !self.confirm("Restart quiz? [y/N]")? {
                    return Ok(Exit::Finished(summary));
                }
                if let Err(err) = session.restart().and_then(|()| session.start(roster.clone())) {
                    writeln!(self.output, "! {err}")?;
                    return Ok(Exit::Finished(summary));
                }
                continue;
            }
            self.render(session)?;

            let Some(line) = self.read_line()? else {
                return Ok(Exit::Quit);
            };
            let input = match parse_input(&line) {
                Ok(input) => input,
                Err(err) => {
                    writeln!(self.output, "! {err}")?;
                    continue;
                }
            };

            let result = match input {
                Input::Quit => return Ok(Exit::Quit),
                Input::Help => self.print_help().map(|()| Ok(())),
                Input::Review => self.print_review(session).map(|()| Ok(())),
                Input::Toggle(letters) => Ok(Self::toggle(session, &letters)),
                Input::Submit => self.submit(session),
                Input::Advance => Ok(session.advance().map(drop)),
                Input::Next => Ok(session.next().map(drop)),
                Input::Previous => Ok(session.previous().map(drop)),
                Input::Goto(index) => Ok(session.seek(index).map(drop)),
                Input::First => Ok(session.first().map(drop)),
                Input::Last => Ok(session.last().map(drop)),
                Input::Finish => self.confirm_finish(session),
                Input::Restart => Ok(session
                    .restart()
                    .and_then(|()| session.start(roster.clone()))),
            }?;

            if let Err(err) = result {
                writeln!(self.output, "! {err}")?;
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        write!(self.output, "> ")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn toggle(session: &mut QuizSession, letters: &[ChoiceLetter]) -> Result<(), QuizError> {
        let index = session.position();
        // Validate every letter before flipping any of them.
        if let Some(question) = session.current_question() {
            let choices = question.choices().len();
            if let Some(&letter) = letters.iter().find(|l| !question.has_choice(**l)) {
                return Err(QuizError::ChoiceOutOfRange { letter, choices });
            }
        }
        for &letter in letters {
            session.toggle_choice(index, letter)?;
        }
        Ok(())
    }

    fn submit(&mut self, session: &mut QuizSession) -> io::Result<Result<(), QuizError>> {
        let index = session.position();
        let result = match session.submit(index) {
            Ok(result) => result,
            Err(err) => return Ok(Err(err)),
        };
        match result.outcome {
            Outcome::Correct => writeln!(self.output, "Correct!")?,
            Outcome::Incorrect if result.answer_key.is_empty() => {
                writeln!(self.output, "Incorrect. This question has no accepted answer.")?;
            }
            Outcome::Incorrect => {
                writeln!(
                    self.output,
                    "Incorrect. Accepted answer: {}",
                    result.answer_key
                )?;
            }
        }
        Ok(Ok(()))
    }

    fn confirm_finish(&mut self, session: &mut QuizSession) -> io::Result<Result<(), QuizError>> {
        let force = session.requires_confirmation();
        if force {
            let progress = session.progress();
            let unvisited = progress.total - progress.visited;
            let remaining = progress.total - progress.position - 1;
            let prompt = if unvisited > 0 {
                format!(
                    "Finish now? {unvisited} of {} questions not yet visited. [y/N]",
                    progress.total
                )
            } else {
                format!("Finish now? {remaining} questions remain after this one. [y/N]")
            };
            if !self.confirm(&prompt)? {
                return Ok(Ok(()));
            }
        }
        Ok(session.complete(force).map(drop))
    }

    /// Ask a yes/no question; anything but `y`/`yes` (or end of input) is no.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        writeln!(self.output, "{prompt}")?;
        let answer = self.read_line()?.unwrap_or_default();
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    fn render(&mut self, session: &QuizSession) -> io::Result<()> {
        let Some(question) = session.current_question() else {
            return Ok(());
        };
        let progress = session.progress();
        let selection = session.selection(progress.position);

        writeln!(self.output)?;
        writeln!(
            self.output,
            "Question {}/{}  (correct {}, attempts {})",
            progress.position + 1,
            progress.total,
            progress.correct,
            progress.attempts
        )?;
        writeln!(self.output, "{}", question.prompt())?;
        for (letter, text) in question.lettered_choices() {
            let mark = if selection.contains(letter) { 'x' } else { ' ' };
            writeln!(self.output, "  [{mark}] {letter}  {text}")?;
        }
        Ok(())
    }

    fn finish(&mut self, session: &QuizSession) -> io::Result<QuizSummary> {
        let summary = session
            .summary()
            .map_err(io::Error::other)?;
        writeln!(self.output)?;
        writeln!(
            self.output,
            "Quiz complete: {}/{} correct after {} submissions.",
            summary.score.correct, summary.score.total, summary.attempts
        )?;
        if let Some(accuracy) = summary.accuracy {
            writeln!(self.output, "Accuracy: {:.0}%", accuracy * 100.0)?;
        }
        if summary.ended_early {
            writeln!(self.output, "(ended early)")?;
        }
        self.print_review(session)?;
        Ok(summary)
    }

    fn print_review(&mut self, session: &QuizSession) -> io::Result<()> {
        for line in session.review() {
            let verdict = match line.outcome {
                Some(Outcome::Correct) => "correct",
                Some(Outcome::Incorrect) => "incorrect",
                None if session.is_visited(line.index) => "not submitted",
                None => "not visited",
            };
            writeln!(
                self.output,
                "  {:>3}. {}  selected: {}  accepted: {}  {verdict}",
                line.index + 1,
                line.question_id,
                join_letters(line.selection.letters()),
                join_letters(line.answer_key.letters()),
            )?;
        }
        Ok(())
    }

    fn print_help(&mut self) -> io::Result<()> {
        writeln!(self.output, "Commands:")?;
        writeln!(self.output, "  t <letters>   toggle choices, e.g. `t a c`")?;
        writeln!(self.output, "  s             submit the current question")?;
        writeln!(self.output, "  <enter>       move on (finishes on the last question)")?;
        writeln!(self.output, "  n / p         next / previous question")?;
        writeln!(self.output, "  g <n>         go to question n")?;
        writeln!(self.output, "  first / last  jump to either end")?;
        writeln!(self.output, "  review        list answers so far")?;
        writeln!(self.output, "  f             finish the quiz")?;
        writeln!(self.output, "  r             restart with the same questions")?;
        writeln!(self.output, "  q             quit without finishing")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{QuestionId, VoteRecord};
    use std::io::Cursor;

    fn letter(c: char) -> ChoiceLetter {
        ChoiceLetter::from_char(c).unwrap()
    }

    fn started_session(n: usize) -> QuizSession {
        let roster = (1..=n)
            .map(|i| {
                Arc::new(
                    Question::new(
                        QuestionId::ordinal(i),
                        format!("Q{i}"),
                        vec!["yes".into(), "no".into()],
                        vec![VoteRecord::new([letter('A')], 3)],
                    )
                    .unwrap(),
                )
            })
            .collect();
        let mut session = QuizSession::new();
        session.start(roster).unwrap();
        session
    }

    fn run_script(session: &mut QuizSession, script: &str) -> (Exit, String) {
        let mut terminal = Terminal::new(Cursor::new(script.to_owned()), Vec::new());
        let exit = terminal.run(session).unwrap();
        let output = String::from_utf8(terminal.into_output()).unwrap();
        (exit, output)
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_input("\n"), Ok(Input::Advance));
        assert_eq!(
            parse_input("t a,c"),
            Ok(Input::Toggle(vec![letter('A'), letter('C')]))
        );
        assert_eq!(parse_input("G 3"), Ok(Input::Goto(2)));
        assert_eq!(parse_input("g 0"), Err(InputError::BadNumber("0".into())));
        assert_eq!(parse_input("toggle"), Err(InputError::MissingArgument("toggle")));
        assert!(matches!(parse_input("dance"), Err(InputError::Unknown(_))));
    }

    #[test]
    fn linear_run_to_completion() {
        let mut session = started_session(2);
        let (exit, output) = run_script(&mut session, "t a\ns\n\nt b\ns\n\n");

        let Exit::Finished(summary) = exit else {
            panic!("quiz should have finished");
        };
        assert_eq!(summary.score.correct, 1);
        assert_eq!(summary.score.total, 2);
        assert!(output.contains("Correct!"));
        assert!(output.contains("Incorrect. Accepted answer: A"));
        assert!(output.contains("Quiz complete: 1/2"));
    }

    #[test]
    fn declined_finish_keeps_quiz_running() {
        let mut session = started_session(3);
        let (exit, output) = run_script(&mut session, "f\nn\nq\n");

        assert!(matches!(exit, Exit::Quit));
        assert_eq!(session.lifecycle(), Lifecycle::InProgress);
        assert!(output.contains("2 of 3 questions not yet visited"));
    }

    #[test]
    fn rule_violations_are_reported_not_fatal() {
        let mut session = started_session(3);
        let (exit, output) = run_script(&mut session, "t z\ns\nn\nlast\nf\n");

        assert!(matches!(exit, Exit::Finished(_)));
        assert!(output.contains("! choice Z is out of range"));
        assert!(session.selection(0).is_empty());
        assert_eq!(session.attempts(), 1);
    }

    #[test]
    fn finish_prompt_counts_remaining_questions_once_all_visited() {
        let mut session = started_session(3);
        let (exit, output) = run_script(&mut session, "n\nn\nfirst\nf\nn\nq\n");

        assert!(matches!(exit, Exit::Quit));
        assert!(output.contains("2 questions remain after this one"));
        assert!(!output.contains("not yet visited"));
    }

    #[test]
    fn completion_offers_restart() {
        let mut session = started_session(2);
        let (exit, output) = run_script(&mut session, "t a\ns\n\n\ny\nq\n");

        assert!(matches!(exit, Exit::Quit));
        assert!(output.contains("Quiz complete: 1/2"));
        assert!(output.contains("Restart quiz?"));
        assert_eq!(session.lifecycle(), Lifecycle::InProgress);
        assert_eq!(session.attempts(), 0);
        assert_eq!(session.roster().len(), 2);
    }

    #[test]
    fn early_finish_review_marks_unvisited_questions() {
        let mut session = started_session(3);
        let (exit, output) = run_script(&mut session, "f\ny\n");

        assert!(matches!(exit, Exit::Finished(summary) if summary.ended_early));
        assert!(output.contains("not visited"));
    }

    #[test]
    fn restart_replays_the_same_roster() {
        let mut session = started_session(2);
        let (exit, _) = run_script(&mut session, "t a\ns\nr\n");

        assert!(matches!(exit, Exit::Quit));
        assert_eq!(session.lifecycle(), Lifecycle::InProgress);
        assert_eq!(session.roster().len(), 2);
        assert_eq!(session.attempts(), 0);
    }
}
