use std::borrow::Cow;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;

use clap::Parser;
use colored::*;
use gemini_chat::attachment::Attachment;
use gemini_chat::builder::GeminiBuilder;
use gemini_chat::credential::MISSING_KEY_WARNING;
use gemini_chat::dispatcher::{Outcome, Session};
use gemini_chat::preset::Preset;
use gemini_chat::render::Renderer;
use rustyline::completion::Completer;
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{ColorMode, DefaultEditor, Editor, Helper};
use spinners::{Spinner, Spinners};

/// Command line arguments for the Gemini chat CLI
#[derive(Parser)]
#[clap(
    name = "gemini-chat",
    about = "Ask Google Gemini from the terminal, as a math tutor or a plain assistant"
)]
struct CliArgs {
    /// Prompt to answer once before exiting; piped stdin is appended to it
    #[arg(index = 1)]
    prompt: Option<String>,

    /// Front-end preset: tutor or basic
    #[arg(long, default_value = "tutor")]
    preset: Preset,

    /// Google API key; asked for with a masked prompt when absent
    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model name, overriding the preset's
    #[arg(long)]
    model: Option<String>,

    /// System instruction, overriding the preset's
    #[arg(long)]
    system: Option<String>,

    /// Base URL for the API
    #[arg(long)]
    base_url: Option<String>,

    /// Temperature setting (0.0-1.0)
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum tokens in the response
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Give up on a request after this many seconds; no limit by default
    #[arg(long)]
    timeout_seconds: Option<u64>,

    /// Text file sent with every prompt; repeat to attach several
    #[arg(long = "file", value_name = "PATH")]
    files: Vec<PathBuf>,
}

/// Draws every typed character as `*`.
struct MaskingHelper;

impl Highlighter for MaskingHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned("*".repeat(line.chars().count()))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Completer for MaskingHelper {
    type Candidate = String;
}

impl Hinter for MaskingHelper {
    type Hint = String;
}

impl Validator for MaskingHelper {}

impl Helper for MaskingHelper {}

/// Reads a line without echoing it. Ctrl-C and Ctrl-D count as an empty answer.
fn read_masked(prompt: &str) -> rustyline::Result<String> {
    let mut rl: Editor<MaskingHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(MaskingHelper));
    rl.set_color_mode(ColorMode::Forced);
    rl.set_auto_add_history(false);

    match rl.readline(prompt) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(String::new()),
        Err(err) => Err(err),
    }
}

fn builder_from_args(args: &CliArgs) -> GeminiBuilder {
    let mut builder = GeminiBuilder::new().preset(args.preset);

    if let Some(model) = args.model.clone() {
        builder = builder.model(model);
    }
    if let Some(system) = args.system.clone() {
        builder = builder.system(system);
    }
    if let Some(url) = args.base_url.clone() {
        builder = builder.base_url(url);
    }
    if let Some(temp) = args.temperature {
        builder = builder.temperature(temp);
    }
    if let Some(mt) = args.max_tokens {
        builder = builder.max_tokens(mt);
    }
    if let Some(secs) = args.timeout_seconds {
        builder = builder.timeout_seconds(secs);
    }

    builder
}

/// Prompts for a key until one is entered or the user gives up.
fn ask_for_key(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let raw = read_masked("Enter Google API Key: ")?;
    session.set_api_key(&raw)?;
    if !session.has_key() {
        println!("{}", MISSING_KEY_WARNING.bright_yellow());
    }
    Ok(())
}

async fn submit_with_spinner(session: &Session, prompt: &str) -> Outcome {
    let mut sp = Spinner::new(Spinners::Dots12, "Thinking...".bright_magenta().to_string());
    let outcome = session.submit(prompt).await;
    sp.stop();
    print!("\r\x1B[K");
    outcome
}

fn print_outcome(outcome: &Outcome, renderer: Renderer, labelled: bool) {
    match outcome {
        Outcome::Answer(text) if labelled => {
            println!("{}", "> Assistant:".bright_green());
            println!("{}", renderer.render(text));
        }
        Outcome::Answer(text) => println!("{}", renderer.render(text)),
        Outcome::Failure(msg) => eprintln!("{} {}", "Error:".bright_red(), msg),
        Outcome::Warning(msg) => println!("{}", msg.bright_yellow()),
        Outcome::Skipped => {}
    }
}

/// Main entry point for the Gemini chat CLI
///
/// Answers a single prompt when one is given on the command line or piped in,
/// otherwise runs an interactive loop until `exit` or Ctrl-D.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    gemini_chat::init_logging();
    let args = CliArgs::parse();
    let preset = args.preset;

    let mut session = Session::gemini(preset, builder_from_args(&args));
    for path in &args.files {
        session.attach(Attachment::read(path)?);
    }
    let is_pipe = !io::stdin().is_terminal();

    match args.api_key.as_deref() {
        Some(key) => session.set_api_key(key)?,
        None if !is_pipe => ask_for_key(&mut session)?,
        None => {}
    }

    if is_pipe || args.prompt.is_some() {
        let mut input = String::new();
        if is_pipe {
            io::stdin().read_to_string(&mut input)?;
        }
        let prompt = match args.prompt {
            Some(p) if !input.trim().is_empty() => format!("{}\n\n{}", p, input),
            Some(p) => p,
            None => input,
        };

        let renderer = if io::stdout().is_terminal() {
            preset.renderer()
        } else {
            Renderer::Plain
        };
        let outcome = session.submit(&prompt).await;
        print_outcome(&outcome, renderer, false);
        return Ok(());
    }

    println!("{}", preset.title().bright_cyan());
    if let Some(greeting) = preset.greeting() {
        println!("{}", greeting);
    }
    if let Some(dispatcher) = session.dispatcher() {
        println!("Model: {}", dispatcher.model().bright_green());
    }
    for attachment in session.attachments() {
        println!("Attached: {}", attachment.name().bright_blue());
    }
    println!("{}", preset.prompt_label());
    println!("{}", "Type '/key' to change the API key, 'exit' to quit".bright_black());
    println!("{}", "─".repeat(50).bright_black());

    let mut rl = DefaultEditor::new()?;

    loop {
        io::stdout().flush()?;
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.eq_ignore_ascii_case("exit") {
                    println!("{}", "Goodbye!".bright_cyan());
                    break;
                }
                if trimmed == "/key" {
                    ask_for_key(&mut session)?;
                    continue;
                }
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let outcome = if session.has_key() {
                    submit_with_spinner(&session, &line).await
                } else {
                    session.submit(&line).await
                };
                print_outcome(&outcome, preset.renderer(), true);
                println!("{}", "─".repeat(50).bright_black());
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}", "Goodbye!".bright_cyan());
                break;
            }
            Err(err) => {
                eprintln!("{} {:?}", "Error:".bright_red(), err);
                break;
            }
        }
    }

    Ok(())
}
