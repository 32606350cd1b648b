use anyhow::Result;
use civet_vm::Machine;
use clap::{Parser, Subcommand};
use tracing_subscriber::filter::EnvFilter;

mod demos;

#[derive(Parser)]
#[command(name = "civet", version, about = "civet 16-bit virtual CPU")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a built-in demo program
    Run {
        /// Demo name (see `civet list`)
        name: String,
    },
    /// List the built-in demo programs
    List,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { name } => run_demo(&name),
        Commands::List => {
            list_demos();
            Ok(())
        }
    }
}

fn run_demo(name: &str) -> Result<()> {
    let demo = demos::find(name)
        .ok_or_else(|| anyhow::anyhow!("unknown demo: {name} (try `civet list`)"))?;

    println!("===============================");
    println!("Running Program: {}", demo.title);
    println!("===============================");

    let mut machine = Machine::new();
    machine.load_program(&(demo.program)())?;

    // Faults are fatal here: report and exit nonzero. Embedders that want
    // the report-and-continue mode can loop on `Machine::step` instead.
    let report = machine.run()?;
    print!("{report}");
    Ok(())
}

fn list_demos() {
    for demo in demos::DEMOS {
        println!("{:<8} {}", demo.name, demo.title);
    }
}
