use clap::{Parser, Subcommand};
use folio::types::BuildMode;
use folio::{config, content, feed, output, render};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Build the RSS feed for a portfolio blog")]
#[command(long_about = "\
Build the RSS feed for a portfolio blog

Blog posts are markdown files with TOML front matter under the content
directory's blog/ folder.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  └── blog/
      ├── hello-world.md           # Local post → <site>/blog/hello-world
      ├── 2024/rust-notes.md       # Nested post → <site>/blog/2024/rust-notes
      ├── kafka-at-work.md         # external = true → links to its url
      └── _template.md             # Leading underscore = ignored

Front matter:

  +++
  title = \"Hello, World\"
  date = 2024-01-01
  description = \"First post\"
  draft = false
  +++

Drafts are hidden from production builds and shown in development builds.

Run 'folio gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the feed and write it to the output directory
    Build {
        /// Build mode: production hides drafts and links to the live URL
        #[arg(long, value_enum, default_value_t = BuildMode::Production)]
        mode: BuildMode,
    },
    /// Build the feed in memory and print it without writing anything
    Check {
        /// Build mode: development keeps drafts and links to the dev URL
        #[arg(long, value_enum, default_value_t = BuildMode::Development)]
        mode: BuildMode,
        /// Print the feed document as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build { mode } => {
            println!("==> Building feed from {} ({:?})", cli.source.display(), mode);
            let built = build(&cli.source, mode)?;
            let path = render::write_feed(&built.document, &built.config.feed, &cli.output)?;
            output::print_feed_output(&built.document, mode, built.hidden_drafts);
            println!("==> Wrote {}", path.display());
        }
        Command::Check { mode, json } => {
            let built = build(&cli.source, mode)?;
            // Render once so channel validation errors surface here too.
            render::render_rss(&built.document, built.config.feed.language.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&built.document)?);
            } else {
                output::print_feed_output(&built.document, mode, built.hidden_drafts);
                println!("==> Feed is valid");
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

struct Built {
    config: config::SiteConfig,
    document: feed::FeedDocument,
    hidden_drafts: usize,
}

/// Load config and posts from `source` and build the feed document.
fn build(source: &Path, mode: BuildMode) -> Result<Built, Box<dyn std::error::Error>> {
    let site_config = config::load_config(source)?;
    let feed_config = site_config.feed_config(mode)?;
    let entries = content::load_entries(source)?;
    tracing::debug!(entries = entries.len(), "loaded blog entries");

    let document = feed::build_feed(&entries, &feed_config, mode)?;
    let hidden_drafts = entries.iter().filter(|e| !feed::is_visible(e, mode)).count();

    Ok(Built {
        config: site_config,
        document,
        hidden_drafts,
    })
}

/// Diagnostics go to stderr at `warn` unless `RUST_LOG` says otherwise.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
