use anyhow::{Context, Result};
use flight_crew_xlsx::{
    cli::{Cli, Commands},
    model::Solution,
    parser::read_with_ui,
    schema::ALL_SHEETS,
    ui::{ConsoleUi, SilentUi, Ui},
    writer::write_with_ui,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // Export to stdout must stay parseable JSON
    let quiet = cli.quiet || matches!(cli.command, Commands::Export { output: None, .. });
    if quiet {
        run(cli.command, &mut SilentUi::new())
    } else {
        run(cli.command, &mut ConsoleUi::new())
    }
}

fn run<U: Ui>(command: Commands, ui: &mut U) -> Result<()> {
    match command {
        Commands::Validate { input } => {
            let start = Instant::now();
            let solution = read_with_ui(&input, ui)?;

            ui.log(format!("{} skills", solution.skills.len()));
            ui.log(format!("{} airports", solution.airports.len()));
            ui.log(format!("{} employees", solution.employees.len()));
            ui.log(format!(
                "{} flights with {} flight assignments",
                solution.flights.len(),
                solution.flight_assignments.len()
            ));
            ui.log(format!(
                "Read {:?} in {:.1}s",
                input,
                start.elapsed().as_secs_f64()
            ));
        }

        Commands::Convert { input, output } => {
            let start = Instant::now();
            let solution = read_with_ui(&input, ui)?;
            write_with_ui(&solution, &output, ui)?;

            ui.log(format!(
                "Converted {:?} to {:?} ({} flights) in {:.1}s",
                input,
                output,
                solution.flights.len(),
                start.elapsed().as_secs_f64()
            ));
        }

        Commands::Export { input, output } => {
            let solution = read_with_ui(&input, ui)?;
            match output {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("Failed to create {:?}", path))?;
                    let mut writer = BufWriter::new(file);
                    serde_json::to_writer_pretty(&mut writer, &solution)?;
                    writer.flush()?;
                    ui.log(format!("Exported {:?} to {:?}", input, path));
                }
                None => {
                    let stdout = io::stdout();
                    let mut writer = stdout.lock();
                    serde_json::to_writer_pretty(&mut writer, &solution)?;
                    writeln!(writer)?;
                }
            }
        }

        Commands::Import { input, output } => {
            let start = Instant::now();
            let file = File::open(&input).with_context(|| format!("Failed to open {:?}", input))?;
            let solution: Solution = serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse solution {:?}", input))?;
            solution
                .validate()
                .with_context(|| format!("Inconsistent solution {:?}", input))?;

            write_with_ui(&solution, &output, ui)?;

            let score = solution
                .score
                .as_ref()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "not yet solved".to_string());
            ui.log(format!(
                "Created {:?} (score {}) in {:.1}s",
                output,
                score,
                start.elapsed().as_secs_f64()
            ));
        }

        Commands::ListSheets => {
            println!("Workbook sheets:\n");
            for schema in ALL_SHEETS {
                let suffix = if schema.write_only { " (written only)" } else { "" };
                println!("  {}{}", schema.name, suffix);
                println!("    {}", schema.describe_columns().join(" | "));
            }
        }
    }

    Ok(())
}
