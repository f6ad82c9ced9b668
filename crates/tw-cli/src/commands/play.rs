use std::io::{self, BufRead, Write};

use colored::Colorize;
use tokio::runtime::Runtime;

use tw_core::{Character, ChoiceInput, Language, StepView, StoryError};
use tw_session::{SessionError, SessionState, StorySession};

use super::{Backend, Source};

const HELP: &str = "\
  <number>       take one of the offered choices
  do <action>    describe your own action
  prev / next    step through earlier pages of the story
  goto <n>       jump to page n
  history        list every page so far
  export [fmt]   print the story as markdown (default), text or json
  retry          resend your last choice after a failure
  restart        pick a new language and character
  quit           leave the game";

pub fn run(source: &Source, language: Option<&str>, character: Option<&str>) -> Result<(), String> {
    let backend = source.connect()?;
    let rt = super::runtime()?;
    let stdin = io::stdin();
    let mut game = Game {
        rt: &rt,
        backend: &backend,
        reader: stdin.lock(),
        line: String::new(),
    };
    game.run(language, character)
}

/// One parsed line of input during play.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PlayCommand {
    Empty,
    Choose(i64),
    Custom(String),
    Prev,
    Next,
    GoTo(usize),
    History,
    Export(ExportFormat),
    Retry,
    Restart,
    Help,
    Quit,
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Markdown,
    Text,
    Json,
}

fn parse_command(line: &str) -> PlayCommand {
    let input = line.trim();
    if input.is_empty() {
        return PlayCommand::Empty;
    }
    if let Ok(id) = input.parse::<i64>() {
        return PlayCommand::Choose(id);
    }

    let (word, rest) = match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    };

    match word.to_lowercase().as_str() {
        "do" => {
            if rest.is_empty() {
                PlayCommand::Invalid("usage: do <your action>".into())
            } else {
                PlayCommand::Custom(rest.to_string())
            }
        }
        "prev" | "back" | "p" => PlayCommand::Prev,
        "next" | "n" => PlayCommand::Next,
        "goto" | "go" => match rest.parse::<usize>() {
            Ok(page) if page > 0 => PlayCommand::GoTo(page),
            _ => PlayCommand::Invalid("usage: goto <page number>".into()),
        },
        "history" | "h" => PlayCommand::History,
        "export" => match rest.to_lowercase().as_str() {
            "" | "md" | "markdown" => PlayCommand::Export(ExportFormat::Markdown),
            "txt" | "text" => PlayCommand::Export(ExportFormat::Text),
            "json" => PlayCommand::Export(ExportFormat::Json),
            other => PlayCommand::Invalid(format!(
                "unknown format '{other}', use: markdown, text, json"
            )),
        },
        "retry" => PlayCommand::Retry,
        "restart" => PlayCommand::Restart,
        "help" | "?" => PlayCommand::Help,
        "quit" | "q" | "exit" => PlayCommand::Quit,
        _ => PlayCommand::Invalid(format!(
            "unknown command '{word}' (type 'help' for commands)"
        )),
    }
}

/// How one story ended.
enum Outcome {
    Quit,
    Restart,
}

struct Game<'a, R> {
    rt: &'a Runtime,
    backend: &'a Backend,
    reader: R,
    line: String,
}

impl<R: BufRead> Game<'_, R> {
    fn run(&mut self, language: Option<&str>, character: Option<&str>) -> Result<(), String> {
        let mut language = language.map(str::to_string);
        let mut character = character.map(str::to_string);

        loop {
            let code = match language.take() {
                Some(code) => code,
                None => match self.pick_language()? {
                    Some(language) => language.code,
                    None => return Ok(()),
                },
            };
            let hero = match character.take() {
                Some(name) => self.find_character(&code, &name)?,
                None => match self.pick_character(&code)? {
                    Some(hero) => hero,
                    None => return Ok(()),
                },
            };

            println!("\n  {} the story of {}...\n", "Starting".bold(), hero.name);
            let session = self
                .rt
                .block_on(StorySession::start(
                    self.backend.generator.clone(),
                    hero,
                    code,
                ))
                .map_err(|e| format!("failed to start story: {e}"))?;
            tracing::debug!(session_id = %session.id(), "story started");
            println!("  Type 'help' for commands, 'quit' to exit.\n");

            match self.play(&session)? {
                Outcome::Quit => return Ok(()),
                Outcome::Restart => println!(),
            }
        }
    }

    fn play(&mut self, session: &StorySession) -> Result<Outcome, String> {
        self.show(session);

        loop {
            let Some(input) = self.prompt("> ")? else {
                return Ok(Outcome::Quit);
            };

            match parse_command(&input) {
                PlayCommand::Empty => {}
                PlayCommand::Choose(id) => self.submit(session, ChoiceInput::ById(id)),
                PlayCommand::Custom(text) => self.submit(session, ChoiceInput::Custom(text)),
                PlayCommand::Prev => self.navigate(session, session.prev()),
                PlayCommand::Next => self.navigate(session, session.next()),
                PlayCommand::GoTo(page) => self.navigate(session, session.go_to(page - 1)),
                PlayCommand::History => println!("{}\n", history(session)),
                PlayCommand::Export(format) => match export(session, format) {
                    Ok(text) => println!("{text}"),
                    Err(e) => println!("{}\n", e.yellow()),
                },
                PlayCommand::Retry => {
                    println!("  {}", "Retrying...".dimmed());
                    let result = self.rt.block_on(session.retry());
                    self.report(session, result);
                }
                PlayCommand::Restart => return Ok(Outcome::Restart),
                PlayCommand::Help => println!("{HELP}\n"),
                PlayCommand::Quit => {
                    println!("  Farewell, {}.", session.character().name);
                    return Ok(Outcome::Quit);
                }
                PlayCommand::Invalid(message) => println!("{}\n", message.yellow()),
            }
        }
    }

    fn submit(&self, session: &StorySession, input: ChoiceInput) {
        if matches!(session.state(), SessionState::Failed { .. }) {
            println!(
                "{}\n",
                "Your last choice is still waiting; type 'retry' or 'restart'.".yellow()
            );
            return;
        }
        println!("  {}", "The story continues...".dimmed());
        let result = self.rt.block_on(session.submit(input));
        self.report(session, result);
    }

    fn report(&self, session: &StorySession, result: Result<(), SessionError>) {
        match result {
            Ok(()) => self.show(session),
            Err(SessionError::Generator(e)) => {
                println!("{}", format!("The story could not continue: {e}").red());
                println!("  Type 'retry' to try again, or 'restart' for a new story.\n");
            }
            Err(SessionError::Story(StoryError::AlreadyAnswered(_))) => {
                println!(
                    "{}\n",
                    "You already chose on this page; use 'next' to read on.".yellow()
                );
            }
            Err(e) => println!("{}\n", e.to_string().yellow()),
        }
    }

    fn navigate(&self, session: &StorySession, moved: Result<usize, SessionError>) {
        match moved {
            Ok(_) => self.show(session),
            Err(SessionError::Story(StoryError::OutOfRange { .. })) => {
                println!("{}\n", "There is no page there.".yellow());
            }
            Err(e) => println!("{}\n", e.to_string().yellow()),
        }
    }

    fn show(&self, session: &StorySession) {
        let page = session.with_store(|store| render_step(&StepView::current(store)));
        println!("{page}");
    }

    fn pick_language(&mut self) -> Result<Option<Language>, String> {
        let languages = self
            .rt
            .block_on(self.backend.catalog.languages())
            .map_err(|e| format!("failed to fetch languages: {e}"))?;
        if languages.is_empty() {
            return Err("the story backend offers no languages".into());
        }

        println!("  {}", "Choose a language:".bold());
        for (i, language) in languages.iter().enumerate() {
            println!("  {}. {language}", i + 1);
        }

        loop {
            let Some(input) = self.prompt("language> ")? else {
                return Ok(None);
            };
            match pick(&languages, &input, |l| l.code.as_str()) {
                Some(language) => return Ok(Some(language.clone())),
                None => println!("{}", "Invalid choice. Please try again.".yellow()),
            }
        }
    }

    fn pick_character(&mut self, language: &str) -> Result<Option<Character>, String> {
        let characters = self.characters(language)?;

        println!("\n  {}", "Choose your character:".bold());
        for (i, character) in characters.iter().enumerate() {
            println!("  {}. {character}", i + 1);
        }

        loop {
            let Some(input) = self.prompt("character> ")? else {
                return Ok(None);
            };
            match pick(&characters, &input, |c| c.name.as_str()) {
                Some(character) => return Ok(Some(character.clone())),
                None => println!("{}", "Invalid choice. Please try again.".yellow()),
            }
        }
    }

    fn find_character(&self, language: &str, name: &str) -> Result<Character, String> {
        self.characters(language)?
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| format!("no character named '{name}' for language '{language}'"))
    }

    fn characters(&self, language: &str) -> Result<Vec<Character>, String> {
        let characters = self
            .rt
            .block_on(self.backend.catalog.characters(language))
            .map_err(|e| format!("failed to fetch characters: {e}"))?;
        if characters.is_empty() {
            return Err(format!("no characters available for '{language}'"));
        }
        Ok(characters)
    }

    /// Read one trimmed line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> Result<Option<String>, String> {
        print!("{label}");
        io::stdout().flush().map_err(|e| e.to_string())?;

        self.line.clear();
        match self.reader.read_line(&mut self.line) {
            Ok(0) => {
                println!();
                Ok(None)
            }
            Ok(_) => Ok(Some(self.line.trim().to_string())),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// Resolve picker input: a 1-based position or a key, ignoring case.
fn pick<'a, T>(items: &'a [T], input: &str, key: impl Fn(&T) -> &str) -> Option<&'a T> {
    let input = input.trim();
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| items.get(i));
    }
    items.iter().find(|item| key(item).eq_ignore_ascii_case(input))
}

fn render_step(view: &StepView<'_>) -> String {
    let mut out = format!(
        "{}\n\n{}\n",
        format!("--- Page {} of {} ---", view.index + 1, view.total).bold(),
        view.story_text
    );

    if let Some(choice) = view.selected_choice {
        if choice.is_custom {
            out.push_str(&format!("\n  You did: {}\n", choice.text.italic()));
        } else {
            out.push_str(&format!("\n  You chose: {}\n", choice.text.italic()));
        }
    } else if view.live_choices.is_empty() {
        if !view.has_next() {
            out.push_str(&format!("\n  {}\n", "THE END".bold()));
            out.push_str("  Type 'export' to keep the story, 'restart' to play again.\n");
        }
    } else {
        out.push('\n');
        for choice in view.live_choices {
            out.push_str(&format!("  {}\n", choice.to_string().cyan()));
        }
        out.push_str(&format!("  {}\n", "or: do <your own action>".dimmed()));
    }

    let mut hints = Vec::new();
    if view.has_prev() {
        hints.push("prev");
    }
    if view.has_next() {
        hints.push("next");
    }
    if !hints.is_empty() {
        out.push_str(&format!("  ({})\n", hints.join(" / ")).dimmed().to_string());
    }
    out
}

fn history(session: &StorySession) -> String {
    session.with_store(|store| {
        let current = store.current_index();
        let lines: Vec<String> = store
            .steps()
            .iter()
            .enumerate()
            .map(|(i, step)| {
                let marker = if i == current { "*" } else { " " };
                let action = match &step.selected_choice {
                    Some(choice) => format!(" -> {}", choice.text),
                    None => String::new(),
                };
                format!("{marker} {:>3}. {}{action}", i + 1, excerpt(&step.story_text, 50))
            })
            .collect();
        lines.join("\n")
    })
}

fn excerpt(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or_default();
    if first_line.chars().count() <= max_chars {
        first_line.to_string()
    } else {
        let cut: String = first_line.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

fn export(session: &StorySession, format: ExportFormat) -> Result<String, String> {
    let transcript = session.transcript();
    match format {
        ExportFormat::Markdown => Ok(transcript.export_markdown()),
        ExportFormat::Text => Ok(transcript.export_text()),
        ExportFormat::Json => transcript
            .to_json()
            .map_err(|e| format!("export failed: {e}")),
    }
}
