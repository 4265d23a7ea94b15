use clap::{Parser, Subcommand};
use quill::config::{self, BuildConfig};
use quill::{generate, output};
use quill::staleness::Force;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Static site generator for blogs")]
#[command(long_about = "\
Static site generator for blogs

Markdown and HTML files are rendered through Jinja-style templates; every
other file is copied as-is. Files are only rebuilt when their source is newer
than their output.

Site structure:

  site/
  ├── config.yaml                  # Site config, available as {{ site.<key> }}
  ├── templates/                   # Layouts; markdown pages extend base.html
  │   └── base.html
  ├── index.html                   # Template page → build/index.html
  ├── about.md                     # Markdown page → build/about.html
  ├── css/site.css                 # Asset → build/css/site.css
  ├── posts/                       # Dated posts, linked previous/next
  │   └── hello.md                 # → build/<category>/<yyyy>/<mm>/<dd>/hello.html
  └── _drafts/                     # Leading '_' or '.' = ignored

Front matter (markdown only):

  ---
  title: Hello
  date: 2020-04-04
  category: Programming
  tags: [rust, blogging]
  publish: true                    # false = never built or indexed
  extends: post.html               # base template, default base.html
  ---

Run 'quill gen-config' to generate a starter config.yaml.")]
#[command(version)]
struct Cli {
    /// Site root
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Output directory, relative to the root
    #[arg(short, long, default_value = "build", global = true)]
    build_dir: PathBuf,

    /// Templates directory, relative to the root
    #[arg(long, default_value = "templates", global = true)]
    templates_dir: PathBuf,

    /// Rebuild the given source files, or everything when none are given
    #[arg(short, long, num_args = 0.., value_name = "FILES", global = true)]
    force: Option<Vec<PathBuf>>,

    /// Log level: error, warn, info, debug or trace
    #[arg(short, long, default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Discover, aggregate and build everything that is out of date
    Build,
    /// Discover and aggregate without writing anything; list posts, categories and tags
    Check,
    /// Print a starter config.yaml
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level)?;

    let build_config = BuildConfig {
        build_dir: cli.build_dir.clone(),
        templates_dir: cli.templates_dir.clone(),
        ..BuildConfig::default()
    };

    match cli.command {
        Command::Build => {
            let force = Force::from_cli(&cli.root, cli.force);
            println!("==> Building {}", cli.root.display());
            let report = generate::build_site(&cli.root, &build_config, &force)?;
            output::print_build_output(&report, &build_config.build_path(&cli.root));
        }
        Command::Check => {
            let site = generate::load_site(&cli.root, &build_config)?;
            output::print_check_output(&site.info);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_yaml());
        }
    }

    Ok(())
}

/// Log to stderr so command output on stdout stays clean.
fn init_logging(level: Level) -> Result<(), Box<dyn std::error::Error>> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
