// brainpix: tape-machine programs hidden in PNG pixels

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::filter::EnvFilter;

use brainpix::alphabet::to_source;
use brainpix::carrier::Carrier;
use brainpix::codec::{expand_runs, Codec, CodecError, DeltaTable};
use brainpix::config::{load_config, Config};
use brainpix::interpreter::{Engine, EngineConfig, LoadError, Program};
use brainpix::repl::{run_prompt, ReplOptions};
use brainpix::snapshot::History;
use brainpix::ui::App;

/// sysexits.h EX_DATAERR
const EXIT_DATA_ERROR: u8 = 65;

#[derive(Parser)]
#[command(
    name = "brainpix",
    version,
    about = "Hide tape-machine programs in PNG pixels, then run or debug them"
)]
struct Cli {
    /// Config file (default: search for brainpix.toml upwards from the cwd)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pixel index the embedded stream starts at
    #[arg(long, global = true)]
    origin: Option<usize>,

    /// Abort after this many executed instructions
    #[arg(long, global = true)]
    step_limit: Option<u64>,

    /// Print the final tape, pointers and step count after running
    #[arg(long, global = true)]
    dump_state: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Subcommand; without one, brainpix starts the interactive prompt
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a program's source into a carrier image
    Inject {
        program: PathBuf,
        carrier: PathBuf,
        /// Output PNG
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Run the program embedded in an image
    Run {
        image: PathBuf,
        /// Read program input from a file instead of stdin
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Run a program straight from its source file
    Exec {
        program: PathBuf,
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the program embedded in an image as source text
    Extract { image: PathBuf },
    /// Step through an embedded or source program in the time-travel debugger
    Debug {
        /// PNG image or program source file
        target: PathBuf,
        /// Program input (the debugger cannot read stdin)
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Read programs line by line from stdin and run each one
    Repl,
}

/// Settings merged from the config file and command-line overrides
struct Settings {
    table: DeltaTable,
    origin: usize,
    engine: EngineConfig,
    snapshot_limit: usize,
    dump_state: bool,
}

impl Settings {
    fn resolve(cli: &Cli, config: &Config) -> Result<Self> {
        let mut engine = config.engine.to_engine_config();
        if cli.step_limit.is_some() {
            engine.step_limit = cli.step_limit;
        }
        Ok(Settings {
            table: config.delta_table()?,
            origin: cli.origin.unwrap_or(config.codec.origin),
            engine,
            snapshot_limit: config.debugger.snapshot_limit,
            dump_state: cli.dump_state,
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run_cli(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {:#}", err);
            if is_data_error(&err) {
                ExitCode::from(EXIT_DATA_ERROR)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn is_data_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(err) = cause.downcast_ref::<brainpix::Error>() {
            return err.is_data_error();
        }
        cause.downcast_ref::<LoadError>().is_some()
            || matches!(
                cause.downcast_ref::<CodecError>(),
                Some(
                    CodecError::CorruptStream { .. }
                        | CodecError::UnknownDelta(_)
                        | CodecError::UnterminatedStream { .. }
                )
            )
    })
}

fn run_cli(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &config)?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Inject {
            program,
            carrier,
            output,
        } => inject(&settings, &program, &carrier, &output),
        Commands::Run { image, input } => {
            let program = load_image_program(&settings, &image)?;
            execute_program(&settings, &program, input.as_deref())
        }
        Commands::Exec { program, input } => {
            let program = load_source_program(&program)?;
            execute_program(&settings, &program, input.as_deref())
        }
        Commands::Extract { image } => extract(&settings, &image),
        Commands::Debug { target, input } => debug(&settings, &target, input.as_deref()),
        Commands::Repl => repl(&settings),
    }
}

fn inject(settings: &Settings, program: &Path, carrier: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(program)
        .with_context(|| format!("failed to read program {}", program.display()))?;
    // Refuse to embed anything `run` could not load back
    let loaded = brainpix::load_source(&source)
        .with_context(|| format!("cannot load {}", program.display()))?;

    let mut image = Carrier::open(carrier)
        .with_context(|| format!("failed to open carrier {}", carrier.display()))?;
    let written = Codec::new(&settings.table)
        .inject(&mut image, settings.origin, loaded.instructions())
        .with_context(|| format!("cannot embed {} into {}", program.display(), carrier.display()))?;
    image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    info!(
        pixels = written,
        origin = settings.origin,
        output = %output.display(),
        "program embedded"
    );
    Ok(())
}

fn load_image_program(settings: &Settings, image: &Path) -> Result<Program> {
    let carrier =
        Carrier::open(image).with_context(|| format!("failed to open {}", image.display()))?;
    let program = brainpix::load_embedded_program(&settings.table, &carrier, settings.origin)
        .with_context(|| format!("no valid program embedded in {}", image.display()))?;
    info!(instructions = program.len(), "loaded embedded program");
    Ok(program)
}

fn load_source_program(path: &Path) -> Result<Program> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read program {}", path.display()))?;
    brainpix::load_source(&source).with_context(|| format!("cannot load {}", path.display()))
}

fn execute_program(settings: &Settings, program: &Program, input: Option<&Path>) -> Result<()> {
    let mut source: Box<dyn Read> = match input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open input {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let mut sink = BufWriter::new(io::stdout().lock());

    let mut engine = Engine::new(program, settings.engine);
    let result = engine.run(&mut source, &mut sink);
    sink.flush()?;
    if settings.dump_state {
        eprint!("{}", engine.state());
    }
    let summary = result?;

    info!(
        steps = summary.steps,
        output_bytes = summary.output_bytes,
        halted_by = ?summary.halted_by,
        "execution finished"
    );
    Ok(())
}

fn extract(settings: &Settings, image: &Path) -> Result<()> {
    let carrier =
        Carrier::open(image).with_context(|| format!("failed to open {}", image.display()))?;
    let runs = Codec::new(&settings.table)
        .extract(&carrier, settings.origin)
        .with_context(|| format!("no valid program embedded in {}", image.display()))?;
    let instructions = expand_runs(&runs);

    println!("{}", to_source(&instructions));
    eprintln!(
        "{} instructions in {} runs, {} pixels starting at pixel {} of {}x{}",
        instructions.len().saturating_sub(1),
        runs.len(),
        instructions.len(),
        settings.origin,
        carrier.width(),
        carrier.height()
    );
    Ok(())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

fn debug(settings: &Settings, target: &Path, input: Option<&Path>) -> Result<()> {
    let program = if is_png(target) {
        load_image_program(settings, target)?
    } else {
        load_source_program(target)?
    };
    let input = match input {
        Some(path) => fs::read(path)
            .with_context(|| format!("failed to read input {}", path.display()))?,
        None => Vec::new(),
    };

    eprintln!("Recording execution...");
    let history = History::record(program, settings.engine, &input, settings.snapshot_limit);
    eprintln!("Recorded {} snapshots.", history.total_snapshots());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(history);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("debugger UI failed")
}

fn repl(settings: &Settings) -> Result<()> {
    let options = ReplOptions {
        engine: settings.engine,
        dump_state: settings.dump_state,
    };
    let completed = run_prompt(&mut io::stdin().lock(), &mut io::stdout().lock(), options)?;
    info!(lines = completed, "prompt closed");
    Ok(())
}
