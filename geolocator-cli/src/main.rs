use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use geolocator::{
    write_catalog, Color, FitOptions, KmlOutcome, KmlReader, MapView, MarkerEmitter,
    ParseOutcome, RecordParser, StaticMapProfile,
};
use std::{
    fs::File,
    io::{self, BufReader, Write},
    path::PathBuf,
};
use url::Url;

/// Turn WWDB location exports into map marker files and static map requests
#[derive(Parser, Debug)]
#[command(name = "geolocator", version, long_about = None)]
struct Cli {
    /// Log parsing and fitting decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the interactive map's marker list as JSON
    Markers {
        /// Export file, or `-` for stdin
        input: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit a viewport around every location and print the static map request
    Static(StaticArgs),

    /// Report how many lines parsed and why the others were skipped
    Check {
        /// Export file, or `-` for stdin
        input: String,
    },

    /// Read a WWDB KML export and write a CSV catalog or a line export
    Import(ImportArgs),
}

#[derive(Args, Debug)]
struct ImportArgs {
    /// KML file, or `-` for stdin
    input: String,

    /// Prefix for catalog ids, usually the state code (CA, OR, WA)
    #[arg(long, default_value = "WWDB")]
    id_prefix: String,

    /// URL the KML was downloaded from; relative detail links resolve against it
    #[arg(long)]
    base_url: Option<Url>,

    #[arg(long, value_enum, default_value_t = ImportFormat::Csv)]
    format: ImportFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ImportFormat {
    /// `id,name,latitude,longitude,wwd_url` with a header
    Csv,
    /// Tab-separated lines the other subcommands read
    Text,
}

#[derive(Args, Debug)]
struct StaticArgs {
    /// Export file, or `-` for stdin
    input: String,

    /// Preset image size and margin: thumbnail, standard or poster
    #[arg(long, default_value = "standard")]
    profile: String,

    /// JSON file with fit options; fields left out take their defaults
    #[arg(long, conflicts_with = "profile")]
    config: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Padding as a fraction of the markers' span (0.1 = 10%)
    #[arg(long)]
    margin: Option<f64>,

    #[arg(long)]
    min_zoom: Option<u8>,

    #[arg(long)]
    max_zoom: Option<u8>,

    /// Tile edge length in pixels
    #[arg(long)]
    tile_size: Option<u32>,

    /// Marker color as RRGGBB
    #[arg(long)]
    color: Option<String>,

    /// Leave names off the overlay
    #[arg(long)]
    no_labels: bool,

    /// Static map endpoint; prints the request URL instead of JSON
    #[arg(long, requires = "api_key")]
    endpoint: Option<String>,

    /// API key for the static map endpoint
    #[arg(long)]
    api_key: Option<String>,
}

impl StaticArgs {
    fn fit_options(&self) -> Result<FitOptions> {
        let mut options = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                FitOptions::from_json(&json)
                    .with_context(|| format!("loading config {}", path.display()))?
            }
            None => StaticMapProfile::from_name(&self.profile)
                .with_context(|| format!("unknown profile `{}`", self.profile))?
                .resolve(),
        };

        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(height) = self.height {
            options.height = height;
        }
        if let Some(margin) = self.margin {
            options.margin = margin;
        }
        if let Some(min_zoom) = self.min_zoom {
            options.min_zoom = min_zoom;
        }
        if let Some(max_zoom) = self.max_zoom {
            options.max_zoom = max_zoom;
        }
        if let Some(tile_size) = self.tile_size {
            options.tile_size = tile_size;
        }

        options.validate()?;
        Ok(options)
    }

    fn emitter(&self) -> Result<MarkerEmitter> {
        let mut emitter = MarkerEmitter::new();
        if let Some(hex) = &self.color {
            match Color::from_hex(hex) {
                Some(color) => emitter = emitter.with_color(color),
                None => bail!("invalid color `{}`, expected RRGGBB", hex),
            }
        }
        if self.no_labels {
            emitter = emitter.without_labels();
        }
        Ok(emitter)
    }
}

fn read_records(input: &str) -> Result<ParseOutcome> {
    let parser = RecordParser::new();
    let outcome = if input == "-" {
        parser.parse_reader(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("opening {}", input))?;
        parser.parse_reader(BufReader::new(file))
    }
    .with_context(|| format!("parsing {}", input))?;

    if outcome.skipped_count() > 0 {
        log::warn!(
            "{}: skipped {} of {} lines",
            input,
            outcome.skipped_count(),
            outcome.skipped_count() + outcome.records.len()
        );
    }
    Ok(outcome)
}

fn read_placemarks(args: &ImportArgs) -> Result<KmlOutcome> {
    let mut reader = KmlReader::new();
    if let Some(base) = &args.base_url {
        reader = reader.with_base_url(base.clone());
    }

    let outcome = if args.input == "-" {
        reader.read_from(io::stdin().lock())
    } else {
        let file = File::open(&args.input).with_context(|| format!("opening {}", args.input))?;
        reader.read_from(BufReader::new(file))
    }
    .with_context(|| format!("reading {}", args.input))?;

    if outcome.skipped_count() > 0 {
        log::warn!(
            "{}: skipped {} of {} placemarks",
            args.input,
            outcome.skipped_count(),
            outcome.skipped_count() + outcome.placemarks.len()
        );
    }
    Ok(outcome)
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Markers { input, output } => {
            let records = read_records(&input)?.into_records();
            let json = MarkerEmitter::new().to_json(&records)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, format!("{}\n", json))
                        .with_context(|| format!("writing {}", path.display()))?;
                    log::info!("wrote {} markers to {}", records.len(), path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Static(args) => {
            let options = args.fit_options()?;
            let emitter = args.emitter()?;
            let records = read_records(&args.input)?.into_records();
            let request = MapView::from_records(&records, options, emitter).static_request()?;

            match (&args.endpoint, &args.api_key) {
                (Some(endpoint), Some(api_key)) => {
                    println!("{}", request.to_url(endpoint, api_key)?)
                }
                _ => println!("{}", request.to_json()?),
            }
        }
        Command::Check { input } => {
            let outcome = read_records(&input)?;
            println!("records: {}", outcome.records.len());
            println!("skipped: {}", outcome.skipped_count());
            for skipped in &outcome.skipped {
                println!("line {}: {}", skipped.line_number, skipped.reason);
            }
        }
        Command::Import(args) => {
            let outcome = read_placemarks(&args)?;
            let mut out: Box<dyn Write> = match &args.output {
                Some(path) => Box::new(
                    File::create(path).with_context(|| format!("creating {}", path.display()))?,
                ),
                None => Box::new(io::stdout().lock()),
            };

            match args.format {
                ImportFormat::Csv => write_catalog(&mut out, &outcome.placemarks, &args.id_prefix)?,
                ImportFormat::Text => {
                    let text = MarkerEmitter::new().to_source_text(&outcome.records());
                    out.write_all(text.as_bytes())?;
                }
            }
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    run(cli)
}
