use clap::{Parser, Subcommand};

use scan_relay::scans::{display_chapter_number, ScanClient};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Query chapters and pages through a running scan relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Mount prefix the relay serves scans under.
    #[arg(short, long, default_value = "/api/anime-sama")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay status
    Status,
    /// Count the chapters listed by a chapter map
    Chapters {
        /// Chapter map path, e.g. /api/anime-sama/get_nb_chap_et_img.php?oeuvre=One%20Piece
        map: String,
    },
    /// List page URLs of one chapter
    Pages {
        /// Chapter map path
        map: String,
        /// Title as displayed, e.g. "One Piece"
        title: String,
        /// Chapter number as used by the scan host
        chapter: u32,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = ScanClient::new(&cli.url)?.with_mount_prefix(cli.prefix);

    match cli.command {
        Commands::Status => {
            let status = client.status().await?;
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        Commands::Chapters { map } => {
            let count = client.chapter_count(&map).await?;
            println!("{count}");
        }
        Commands::Pages { map, title, chapter } => {
            let pages = client.chapter_pages(&map, &title, chapter).await?;
            if pages.is_empty() {
                eprintln!("No pages listed for chapter {chapter}");
                return Ok(());
            }
            eprintln!(
                "{title} - chapter {} ({} pages)",
                display_chapter_number(&title, chapter),
                pages.len()
            );
            for page in pages {
                println!("{page}");
            }
        }
    }

    Ok(())
}
