use esorun::debugger::{StepController, TerminalPrompt};
use esorun::languages::{Befunge93, Brainfuck, False, Language, LanguageKind};
use esorun::{
    display, Breakpoint, EngineConfig, EngineError, Environment, Interpreter, SourceBuffer, StackDump,
};
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use thiserror::Error;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Error, Debug, PartialEq, Eq)]
pub(crate) enum CliError {
    #[error("No language given")]
    MissingLanguage,
    #[error("{0}")]
    UnknownLanguage(String),
    #[error("Unknown option {0}")]
    UnknownOption(String),
    #[error("Not enough arguments for {0}")]
    NotEnoughArguments(String),
    #[error("Option {option} expects an integer, got {value}")]
    InvalidNumber { option: String, value: String },
    #[error("No source files given")]
    NoFiles,
}

/// Options in effect for one source file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunOptions {
    pub(crate) step: bool,
    pub(crate) debug: bool,
    pub(crate) show_stack: bool,
    pub(crate) show_stack_deep: bool,
    pub(crate) seek_cache: bool,
    /// Transient: cleared once a file has taken it
    pub(crate) breakpoint: Option<(i64, i64)>,
}

impl RunOptions {
    fn stack_depth(&self) -> Option<StackDump> {
        if self.show_stack_deep {
            Some(StackDump::Deep)
        } else if self.show_stack {
            Some(StackDump::Top)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Job {
    pub(crate) path: PathBuf,
    pub(crate) options: RunOptions,
}

/// Parsed command-line arguments
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct CliArgs {
    pub(crate) language: Option<LanguageKind>,
    pub(crate) jobs: Vec<Job>,
    pub(crate) banner: bool,
    pub(crate) help: bool,
    pub(crate) version: bool,
}

/// Parse command-line arguments
///
/// Each option flips its setting and applies to every following file,
/// except `-bps`, which applies to the next file only.
pub(crate) fn parse_args(args: &[String]) -> Result<CliArgs, CliError> {
    let mut cli = CliArgs {
        banner: true,
        ..CliArgs::default()
    };

    match args.get(1).map(|s| s.as_str()) {
        None => return Err(CliError::MissingLanguage),
        Some("-h") | Some("--help") => {
            cli.help = true;
            return Ok(cli);
        }
        Some("-V") | Some("--version") => {
            cli.version = true;
            return Ok(cli);
        }
        Some(name) => cli.language = Some(name.parse().map_err(CliError::UnknownLanguage)?),
    }

    let args: Vec<&str> = args.iter().skip(2).map(|s| s.as_str()).collect();
    let mut options = RunOptions::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i];
        let operands = match arg {
            "-bps" => 2,
            "-s" | "-d" | "-t" | "-tr" | "-esc" | "-n" => 0,
            "-h" | "--help" => {
                cli.help = true;
                i += 1;
                continue;
            }
            _ if arg.starts_with('-') => return Err(CliError::UnknownOption(arg.to_string())),
            path => {
                cli.jobs.push(Job {
                    path: PathBuf::from(path),
                    options: options.clone(),
                });
                options.breakpoint = None;
                i += 1;
                continue;
            }
        };
        if i + 1 + operands >= args.len() {
            return Err(CliError::NotEnoughArguments(arg.to_string()));
        }
        match arg {
            "-s" => options.step = !options.step,
            "-d" => options.debug = !options.debug,
            "-t" => options.show_stack = !options.show_stack,
            "-tr" => options.show_stack_deep = !options.show_stack_deep,
            "-esc" => options.seek_cache = !options.seek_cache,
            "-n" => cli.banner = !cli.banner,
            _ => {
                let col = parse_number(arg, args[i + 1])?;
                let row = parse_number(arg, args[i + 2])?;
                options.breakpoint = match options.breakpoint {
                    Some(_) => None,
                    None => Some((col, row)),
                };
            }
        }
        i += 1 + operands;
    }

    if cli.jobs.is_empty() && !cli.help {
        return Err(CliError::NoFiles);
    }
    Ok(cli)
}

fn parse_number(option: &str, value: &str) -> Result<i64, CliError> {
    value.parse().map_err(|_| CliError::InvalidNumber {
        option: option.to_string(),
        value: value.to_string(),
    })
}

pub(crate) fn print_help() {
    let languages: Vec<&str> = LanguageKind::ALL.iter().map(|l| l.name()).collect();
    println!(
        r#"esorun-{} Esoteric language interpreter

USAGE:
    esorun <language> [options] {{file}}+
    esorun --help               Show this help message
    esorun --version            Show version

LANGUAGES:
    {}

OPTIONS (each occurrence toggles; applies to the files that follow):
    -s                      Step mode
    -d                      Write a debug transcript to debug.<file>.txt
    -t                      Show the top of stack when stepping
    -tr                     Show the whole stack when stepping
    -bps X Y                Break at source position (X,Y), next file only
    -esc                    Enable the seek cache
    -n                      Suppress the startup banner

STEP PROMPT:
    [ENTER]                 Execute one step
    c                       Continue, dropping breakpoints
    n                       Run to the next breakpoint

ENVIRONMENT:
    RUST_LOG                Log filter for stderr (default warn)
    ESORUN_RETAIN_EOL       Keep line endings in linear sources (default true)
    ESORUN_TRUE_VALUE       Value of true (default -1)
    ESORUN_FALSE_VALUE      Value of false (default 0)
    ESORUN_TAPE_MAX         Tape ceiling, overriding the language default"#,
        VERSION,
        languages.join(", ")
    );
}

pub(crate) fn print_version() {
    println!("esorun-{}", VERSION);
}

/// First failure of a batch, with what the interpreter looked like
pub(crate) struct Failure {
    pub(crate) path: PathBuf,
    pub(crate) error: EngineError,
    pub(crate) context: Option<String>,
}

impl Failure {
    pub(crate) fn report(&self) {
        eprintln!("Exception during execution -> {}", self.error);
        eprintln!("In {}", self.path.display());
        if let Some(context) = &self.context {
            if std::io::stderr().is_terminal() {
                eprintln!("{}", context);
            } else {
                eprintln!("{}", display::strip_ansi(context));
            }
        }
    }
}

/// Run every file of the batch; the first failure ends the whole batch
pub(crate) fn run(cli: &CliArgs, config: &EngineConfig) -> ExitCode {
    let Some(language) = cli.language else {
        return ExitCode::FAILURE;
    };
    let result = match language {
        LanguageKind::Befunge93 => run_batch::<Befunge93>(cli, config),
        LanguageKind::Brainfuck => run_batch::<Brainfuck>(cli, config),
        LanguageKind::False => run_batch::<False>(cli, config),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            failure.report();
            ExitCode::FAILURE
        }
    }
}

fn run_batch<L: Language>(cli: &CliArgs, config: &EngineConfig) -> Result<(), Failure> {
    if cli.banner {
        println!("esorun-{} {}", VERSION, L::banner());
    }
    for job in &cli.jobs {
        run_file::<L>(job, config)?;
    }
    Ok(())
}

fn run_file<L: Language>(job: &Job, config: &EngineConfig) -> Result<(), Failure> {
    let config = EngineConfig {
        seek_cache: job.options.seek_cache,
        ..config.clone()
    };
    let mut interpreter = L::interpreter(&config);
    let fail = |error: EngineError, context: Option<String>| Failure {
        path: job.path.clone(),
        error,
        context,
    };

    interpreter.accept(&job.path).map_err(|e| fail(e, None))?;
    if let Some((col, row)) = job.options.breakpoint {
        interpreter.set_breakpoints([Breakpoint::at(col, row)]);
    }
    tracing::info!(language = L::NAME, path = %job.path.display(), "run started");

    let result = if job.options.debug {
        with_transcript(&job.path, || drive(&mut interpreter, &job.options))
    } else {
        drive(&mut interpreter, &job.options)
    };

    match result {
        Ok(()) => {
            tracing::info!(path = %job.path.display(), "run finished: {}", interpreter.statistics());
            Ok(())
        }
        Err(error) => {
            let state = interpreter.state();
            let context = format!(
                "{}\n{}",
                display::render_source(&state.source),
                state.environment().dump(StackDump::Deep)
            );
            Err(fail(error, Some(context)))
        }
    }
}

fn drive<S: SourceBuffer, E: Environment>(
    interpreter: &mut Interpreter<S, E>,
    options: &RunOptions,
) -> Result<(), EngineError> {
    if !options.step && !interpreter.has_breakpoints() {
        interpreter.execute()?;
        return Ok(());
    }
    let prompt = TerminalPrompt::new().map_err(|e| EngineError::Io(std::io::Error::other(e.to_string())))?;
    let depth = options.stack_depth();
    let mut controller = StepController::new(prompt)
        .stepping(options.step)
        .with_observer(move |state| {
            println!("{}", display::render_step(&state.source, state.environment(), depth));
        });
    controller.run(interpreter)
}

/// Name of the transcript written for `source`
pub(crate) fn transcript_name(source: &Path) -> PathBuf {
    let base = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "source".to_string());
    PathBuf::from(format!("debug.{}.txt", base))
}

/// Run `f` with every engine event appended to the source's transcript
fn with_transcript<T>(
    source: &Path,
    f: impl FnOnce() -> Result<T, EngineError>,
) -> Result<T, EngineError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(transcript_name(source))?;
    writeln!(
        file,
        "==== {} {} ====",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        source.display()
    )?;
    let subscriber = tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}
