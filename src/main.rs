use clap::{Parser, Subcommand, ValueEnum};
use media_catalog::catalog::{DeleteOutcome, MediaCatalog};
use media_catalog::types::MediaType;
use media_catalog::{config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "media-catalog")]
#[command(about = "Local media store with fixed-size image renditions")]
#[command(long_about = "\
Local media store with fixed-size image renditions

Images and audio are copied into a store under <root>/uploads and referenced
by an opaque id. Every image is rendered once into each configured size,
letterboxed on white to exact dimensions.

Store layout:

  <root>/
  ├── media.toml                       # Optional config (renditions, quality, formats)
  └── uploads/
      ├── media_database.json          # The catalog
      ├── images/<id>_original.jpg     # Untouched upload
      ├── images/tile/<id>_tile.jpg    # One folder per configured rendition
      ├── thumbnails/<id>_thumb.jpg    # Aspect-preserving management thumbnail
      └── audio/<id>.mp3

Set RUST_LOG=info (or debug) for progress logging on stderr.

Run 'media-catalog gen-config' to generate a documented media.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding media.toml and the uploads/ store
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum TypeFilter {
    Image,
    Audio,
}

impl From<TypeFilter> for MediaType {
    fn from(filter: TypeFilter) -> Self {
        match filter {
            TypeFilter::Image => MediaType::Image,
            TypeFilter::Audio => MediaType::Audio,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Ingest an image and render every configured size
    AddImage {
        path: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Ingest an audio file as-is
    AddAudio {
        path: PathBuf,
        #[arg(long)]
        description: Option<String>,
    },
    /// Show one record
    Show { id: String },
    /// Print the path of a rendition ("original", "thumb", or a configured size)
    Path { id: String, rendition: String },
    /// Set or clear a description
    Describe { id: String, text: Option<String> },
    /// Delete a record and its files
    Delete { id: String },
    /// List records, oldest first
    List {
        #[arg(long = "type", value_enum)]
        media_type: Option<TypeFilter>,
    },
    /// Show item counts and total size
    Stats,
    /// Remove files no record refers to
    Gc,
    /// Report record files missing from disk
    Check,
    /// Print a stock media.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut catalog = MediaCatalog::open(&cli.root)?;

    match cli.command {
        Command::AddImage { path, description } => {
            let id = catalog.add_image(&path, description)?;
            println!("{}", id);
        }
        Command::AddAudio { path, description } => {
            let id = catalog.add_audio(&path, description)?;
            println!("{}", id);
        }
        Command::Show { id } => match catalog.get_record(&id) {
            Some(record) => output::print_record(record),
            None => return Err(format!("No media with id {id}").into()),
        },
        Command::Path { id, rendition } => match catalog.rendition_path(&id, &rendition) {
            Some(path) => println!("{}", path.display()),
            None => return Err(format!("No {rendition} file for {id}").into()),
        },
        Command::Describe { id, text } => {
            catalog.update_description(&id, text)?;
        }
        Command::Delete { id } => {
            let outcome = catalog.delete(&id)?;
            output::print_delete(&id, &outcome);
            if outcome == DeleteOutcome::NotFound {
                std::process::exit(1);
            }
        }
        Command::List { media_type } => {
            let records = catalog.list_all(media_type.map(MediaType::from));
            output::print_record_list(&records, &catalog.storage_stats());
        }
        Command::Stats => {
            output::print_stats(&catalog.storage_stats());
        }
        Command::Gc => {
            output::print_gc(&catalog.collect_orphans());
        }
        Command::Check => {
            let issues = catalog.validate_integrity();
            output::print_integrity(&issues);
            if !issues.is_empty() {
                std::process::exit(1);
            }
        }
        Command::GenConfig => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for ids and paths.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
