/// CLI argument parsing and command handling.
use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colorid::{AllocationSet, Color, DimRamp, Palette};
use crossterm::style::Stylize;
use rand::RngExt;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(
    name = "colorid",
    version,
    about = "colorid - Distinct, stable colors for dynamically appearing identifiers"
)]
pub struct Cli {
    /// Seed for the random first point, for reproducible output.
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Place the first identifier at this point instead of a random one.
    #[arg(long, global = true, value_parser = parse_point)]
    pub start: Option<f64>,
    /// YAML file with custom red/green/blue curves.
    #[arg(long, global = true)]
    pub palette: Option<PathBuf>,
    /// How the dim band is rendered.
    #[arg(long, global = true, value_enum)]
    pub dim_ramp: Option<DimRampArg>,
    /// Print plain text even when stdout is a terminal.
    #[arg(long, global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assign colors to identifiers in order. Reads one per line from stdin
    /// when none are given.
    Assign { ids: Vec<String> },
    /// Print the palette at evenly spaced points from 0 to 1.
    Sample {
        #[arg(short = 's', long = "steps", default_value_t = 12,
              value_parser = clap::value_parser!(u32).range(2..))]
        steps: u32,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum DimRampArg {
    Descending,
    Wrapping,
}

impl From<DimRampArg> for DimRamp {
    fn from(value: DimRampArg) -> DimRamp {
        match value {
            DimRampArg::Descending => DimRamp::Descending,
            DimRampArg::Wrapping => DimRamp::Wrapping,
        }
    }
}

fn parse_point(value: &str) -> Result<f64, String> {
    let point: f64 = value.parse().map_err(|_| format!("'{value}' is not a number"))?;
    if !(0.0..=1.0).contains(&point) {
        return Err(format!("{point} is outside [0, 1]"));
    }
    Ok(point)
}

/// Execute a CLI command, defaulting to `assign` with ids from `input`.
pub fn run(cli: Cli, out: &mut impl Write, input: impl BufRead) -> Result<()> {
    let styled = !cli.no_color && std::io::stdout().is_terminal();
    let palette = load_palette(&cli)?;

    match cli.command {
        Some(Command::Sample { steps }) => handle_sample(&palette, steps, styled, out),
        Some(Command::Assign { ids }) if !ids.is_empty() => {
            handle_assign(cli.seed, cli.start, palette, ids, styled, out)
        }
        Some(Command::Assign { .. }) | None => {
            let ids = input
                .lines()
                .collect::<std::io::Result<Vec<_>>>()
                .context("Reading identifiers from stdin")?
                .into_iter()
                .filter(|line| !line.is_empty())
                .collect();
            handle_assign(cli.seed, cli.start, palette, ids, styled, out)
        }
    }
}

fn load_palette(cli: &Cli) -> Result<Palette> {
    let mut palette = match &cli.palette {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Loading palette {}", path.display()))?;
            Palette::from_yaml_str(&source)
                .with_context(|| format!("Parsing palette {}", path.display()))?
        }
        None => Palette::new(),
    };
    if let Some(dim_ramp) = cli.dim_ramp {
        palette = palette.with_dim_ramp(dim_ramp.into());
    }
    Ok(palette)
}

fn handle_assign(
    seed: Option<u64>,
    start: Option<f64>,
    palette: Palette,
    ids: Vec<String>,
    styled: bool,
    out: &mut impl Write,
) -> Result<()> {
    match seed {
        Some(seed) => {
            let set = AllocationSet::with_rng(palette, StdRng::seed_from_u64(seed));
            assign_all(set, start, ids, styled, out)
        }
        None => assign_all(AllocationSet::with_palette(palette), start, ids, styled, out),
    }
}

fn assign_all<R: RngExt>(
    mut set: AllocationSet<R>,
    start: Option<f64>,
    ids: Vec<String>,
    styled: bool,
    out: &mut impl Write,
) -> Result<()> {
    if let Some(start) = start {
        set = set.starting_at(start);
    }
    for id in &ids {
        let color = set.color_for(id);
        print_line(out, color, id, styled)?;
    }
    Ok(())
}

fn handle_sample(palette: &Palette, steps: u32, styled: bool, out: &mut impl Write) -> Result<()> {
    for step in 0..steps {
        let point = f64::from(step) / f64::from(steps - 1);
        let color = palette.map_point(point);
        print_line(out, color, &format!("{point:.3}"), styled)?;
    }
    Ok(())
}

fn print_line(out: &mut impl Write, color: Color, label: &str, styled: bool) -> Result<()> {
    if styled {
        writeln!(out, "{} {color}  {label}", "██".with(color.into()))?;
    } else {
        writeln!(out, "{color}  {label}")?;
    }
    Ok(())
}
