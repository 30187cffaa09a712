//! Administrative commands against the hosted review board backend.
//!
//! Settings come from `REVIEW_BOARD_*` variables. Commands acting as a user
//! (selection changes, claiming votes) need `REVIEW_BOARD_ACCESS_TOKEN`.

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use camino::Utf8PathBuf;
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use gallery_builder::{GalleryConfig, format_theme_name, scan_assets};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use board::domain::ports::AuthSession;
use board::domain::{
    DesignId, DesignTally, FeedbackService, Gallery, Identity, SelectionChange, SelectionService,
    theme_stats,
};
use board::outbound::supabase::{
    SupabaseAuthSession, SupabaseClient, SupabaseFeedbackRepository, SupabaseSelectionRepository,
};
use board::settings::BoardSettings;

/// `review-admin` command line.
#[derive(Debug, Parser)]
#[command(
    name = "review-admin",
    about = "Inspect and curate design review feedback",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Most liked and most disliked design per theme.
    Stats {
        /// Directory containing one folder per theme.
        #[arg(long, value_name = "dir", default_value = gallery_builder::DEFAULT_ASSETS_DIR)]
        assets: Utf8PathBuf,
        /// Page configuration JSON.
        #[arg(long, value_name = "path", default_value = "gallery.json")]
        config: Utf8PathBuf,
    },
    /// Designs selected for the next iteration, newest first.
    Selections,
    /// Select a design (admins only).
    Select {
        /// Design id, `<theme>/<file>`.
        design: String,
    },
    /// Unselect a design (admins only).
    Unselect {
        /// Design id, `<theme>/<file>`.
        design: String,
    },
    /// Who liked and disliked a design.
    Voters {
        /// Design id, `<theme>/<file>`.
        design: String,
    },
    /// Attach the signed-in user's name to their anonymous votes.
    ClaimVotes,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();

    let settings = BoardSettings::load_from_iter([OsString::from("review-admin")])
        .map_err(|err| eyre!("failed to load settings: {err}"))?;
    let client = settings.connect().wrap_err("backend is not configured")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build runtime")?;
    runtime.block_on(run(cli.command, &settings, client))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn run(command: Command, settings: &BoardSettings, client: SupabaseClient) -> Result<()> {
    let feedback = FeedbackService::new(Arc::new(SupabaseFeedbackRepository::new(client.clone())));
    let selections = SelectionService::new(
        Arc::new(SupabaseSelectionRepository::new(client.clone())),
        settings.admin_policy(),
        Arc::new(DefaultClock),
    );
    let auth = SupabaseAuthSession::new(client);
    let mut out = io::stdout().lock();

    match command {
        Command::Stats { assets, config } => {
            let page = GalleryConfig::load_or_default(&config)?;
            let gallery = load_gallery(&assets, &page)?;
            let aggregates = feedback.fetch_all(None).await?;
            for theme in gallery.themes() {
                let tallies: Vec<DesignTally> = theme
                    .designs()
                    .iter()
                    .map(|design| DesignTally {
                        design: design.clone(),
                        counts: aggregates
                            .get(design)
                            .map(|entry| entry.counts)
                            .unwrap_or_default(),
                    })
                    .collect();
                let Some(stats) = theme_stats(&tallies) else {
                    continue;
                };
                writeln!(
                    out,
                    "{}\tmost liked: {}\tmost disliked: {}",
                    format_theme_name(theme.folder(), page.theme_name_format()),
                    stats.most_liked.as_ref().map_or_else(|| "-".to_owned(), DesignId::label),
                    stats
                        .most_disliked
                        .as_ref()
                        .map_or_else(|| "-".to_owned(), DesignId::label),
                )?;
            }
        }
        Command::Selections => {
            for selection in selections.list().await? {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    selection.design,
                    selection.selected_by,
                    selection.selected_at.to_rfc3339()
                )?;
            }
        }
        Command::Select { design } => {
            let who = signed_in(&auth).await?;
            let design = DesignId::parse(&design)?;
            let change = selections.select(Some(&who), &design, None).await?;
            report_selection(&mut out, &design, "selected", change)?;
        }
        Command::Unselect { design } => {
            let who = signed_in(&auth).await?;
            let design = DesignId::parse(&design)?;
            let change = selections.unselect(Some(&who), &design).await?;
            report_selection(&mut out, &design, "unselected", change)?;
        }
        Command::Voters { design } => {
            let design = DesignId::parse(&design)?;
            let voters = feedback.voters(&design).await?;
            for (heading, list) in [("likes", &voters.likes), ("dislikes", &voters.dislikes)] {
                writeln!(out, "{heading} ({})", list.len())?;
                for voter in list {
                    writeln!(out, "  {}\t{}", voter.username, voter.created_at.to_rfc3339())?;
                }
            }
        }
        Command::ClaimVotes => {
            let who = signed_in(&auth).await?;
            let updated = feedback.claim_anonymous_votes(&who).await?;
            writeln!(out, "claimed {updated} vote(s) as {}", who.vote_username())?;
        }
    }
    Ok(())
}

fn load_gallery(assets: &Utf8PathBuf, page: &GalleryConfig) -> Result<Gallery> {
    let dir = Dir::open_ambient_dir(assets.as_std_path(), ambient_authority())
        .with_context(|| format!("failed to open assets directory {assets}"))?;
    let folders = scan_assets(&dir, assets, page)?;
    info!(themes = folders.len(), "assets scanned");
    Ok(Gallery::from_folders(&folders)?)
}

async fn signed_in(auth: &SupabaseAuthSession) -> Result<Identity> {
    auth.current_identity()
        .await?
        .ok_or_else(|| eyre!("no signed-in user; set REVIEW_BOARD_ACCESS_TOKEN"))
}

fn report_selection(
    out: &mut impl Write,
    design: &DesignId,
    verb: &str,
    change: SelectionChange,
) -> Result<()> {
    match change {
        SelectionChange::Changed => writeln!(out, "{design} {verb}")?,
        SelectionChange::Unchanged => writeln!(out, "{design} already {verb}")?,
    }
    Ok(())
}
