use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lathesim::{
    gcode::GCodeFile,
    machine::{interpret, MachineState, Session, StepOutcome},
    render::{Render, Svg},
    MachineConfig, SimError,
};
use std::{
    io::Write,
    path::{Path, PathBuf},
};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

#[derive(Parser)]
#[command(name = "lathesim")]
#[command(about = "Lathe G-code simulator", long_about = None)]
struct Cli {
    /// Machine configuration (JSON). Built-in defaults if omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a program up to a statement and print the machine state
    Run {
        program: PathBuf,
        /// Statement index to stop at (default: last)
        #[arg(short, long)]
        line: Option<usize>,
        /// Write the tool path as SVG
        #[arg(long)]
        svg: Option<PathBuf>,
        /// Print the state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a whole program for unsupported codes
    Check { program: PathBuf },
    /// Step through a program, pausing on tool changes
    Step {
        program: PathBuf,
        /// Confirm tool changes without asking
        #[arg(long)]
        auto_confirm: bool,
    },
    /// Write the effective machine configuration as JSON
    Config { output: PathBuf },
}

/// Outcome that should end the process with a failure after reporting
enum Failure {
    Sim(SimError),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Other(e)
    }
}

fn load_config(path: Option<&Path>) -> Result<MachineConfig> {
    match path {
        Some(p) => MachineConfig::load(p).with_context(|| format!("config '{}'", p.display())),
        None => Ok(MachineConfig::default()),
    }
}

fn load_program(path: &Path) -> Result<GCodeFile> {
    GCodeFile::load(path).with_context(|| format!("Can't read program '{}'", path.display()))
}

fn run(cli: Cli) -> Result<(), Failure> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            program,
            line,
            svg,
            json,
        } => {
            let file = load_program(&program)?;
            let upto = line.unwrap_or(usize::MAX);
            let replay = interpret(file.statements(), upto, &config.tools, config.home)
                .map_err(Failure::Sim)?;

            if json {
                let out = serde_json::to_string_pretty(&replay).context("Can't encode state")?;
                println!("{out}");
            } else {
                print_state(&replay.state);
            }

            if let Some(svg) = svg {
                let mut render = Box::new(Svg::new(&svg));
                render.draw_path(config.home.into(), &replay.state.path);
                render
                    .finalize()
                    .with_context(|| format!("Can't write output file '{}'", svg.display()))?;
            }
        }
        Commands::Check { program } => {
            let file = load_program(&program)?;
            interpret(file.statements(), usize::MAX, &config.tools, config.home)
                .map_err(Failure::Sim)?;
            println!("{}: {} statements OK", program.display(), file.statements().len());
        }
        Commands::Step {
            program,
            auto_confirm,
        } => {
            let file = load_program(&program)?;
            let mut session = Session::new(file, &config);
            session.start();
            step_all(&mut session, auto_confirm)?;
            print_state(&session.snapshot());
            for tool in session.tools().iter() {
                println!("T{:02} wear {:5.1} %", tool.id, tool.wear_percent);
            }
        }
        Commands::Config { output } => {
            config
                .save(&output)
                .with_context(|| format!("Can't write config '{}'", output.display()))?;
            println!("Configuration written to {}", output.display());
        }
    }

    Ok(())
}

fn step_all(session: &mut Session, auto_confirm: bool) -> Result<(), Failure> {
    loop {
        match session.step() {
            StepOutcome::Advanced { index, .. } => {
                if let Some(stmt) = session.statements().get(index) {
                    println!("{:>5}  {}", stmt.source_line, stmt.raw_text.trim());
                }
            }
            StepOutcome::ToolChange(tc) => {
                println!("Tool change to T{} at line {}", tc.tool, tc.line);
                if !auto_confirm && !ask("Confirm tool change?")? {
                    return Ok(());
                }
                session.confirm_tool_change();
            }
            StepOutcome::Alarm(e) => return Err(Failure::Sim(e)),
            StepOutcome::Finished | StepOutcome::Idle => return Ok(()),
        }
    }
}

fn ask(question: &str) -> Result<bool> {
    print!("{question} [Y/n] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(!answer.trim().eq_ignore_ascii_case("n"))
}

fn print_state(st: &MachineState) {
    println!("X{:.3} Z{:.3}", st.x, st.z);
    println!(
        "Spindle {} {} rpm{}",
        st.spindle_direction,
        st.spindle_speed,
        st.max_spindle_speed
            .map(|m| format!(" (max {m})"))
            .unwrap_or_default()
    );
    println!(
        "Tool T{:02} offset {:.3}, {}",
        st.active_tool, st.tool_length_offset, st.radius_compensation
    );
    println!("{}, {}, coolant {}", st.positioning_mode, st.units, st.coolant);
    println!("Feed {} {}, {}", st.feed_rate, st.feed_mode, st.speed_mode);
    if let Some(cycle) = st.active_cycle {
        println!("Cycle {cycle}");
    }
    println!("{} path points", st.path.len());
}

/// Colored label, plain message
fn report(label: &str, color: Color, message: &str) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    stderr
        .set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))
        .ok();
    write!(stderr, "{label}:").ok();
    stderr.reset().ok();
    writeln!(stderr, " {message}").ok();
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => (),
        Err(Failure::Sim(e)) => {
            report("program alarm", Color::Yellow, &e.to_string());
            std::process::exit(2);
        }
        Err(Failure::Other(e)) => {
            report("lathesim", Color::Red, &format!("{e:#}"));
            std::process::exit(1);
        }
    }
}
