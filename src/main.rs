mod cli;

use cnvrt::{
    config,
    events::{Event, EventPayload},
    notifications::NotificationCenter,
    queue::{ConversionQueue, FileItem},
};
use cnvrt_common::formats;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

async fn convert_files(
    files: &[PathBuf],
    to: &str,
    out: Option<PathBuf>,
    no_transparency: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let events = Arc::new(cnvrt::events::EventBus::default());
    let notifications = NotificationCenter::new(config.notifications.clone(), events.clone());
    let engine = cnvrt::LocalEngine::new().with_ffmpeg_path(config.tools.ffmpeg_path.clone());
    let queue = ConversionQueue::new(&config, Arc::new(engine), notifications.clone(), events);

    for path in files {
        let item = FileItem::from_path(path)
            .with_context(|| format!("Cannot queue {:?}", path))?
            .with_target(to.trim_start_matches('.').to_lowercase());
        queue.add_file(item);
    }

    let destination = resolve_destination(out, config.queue.default_destination.as_deref());
    match destination {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
            tracing::info!("Writing converted files to {:?}", dir);
        }
        None => tracing::warn!("No destination folder, writing next to the working directory"),
    }
    let keep_transparency = config.queue.keep_transparency && !no_transparency;

    let mut rx = queue.subscribe();
    let batch = queue.start_conversion(destination.as_deref(), keep_transparency);
    tokio::pin!(batch);

    let result = loop {
        tokio::select! {
            result = &mut batch => break result,
            event = rx.recv() => {
                if let Ok(event) = event {
                    report_event(&event, &notifications);
                }
            }
        }
    };
    while let Ok(event) = rx.try_recv() {
        report_event(&event, &notifications);
    }

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => anyhow::bail!("{}: {}", e.title(), e),
    };

    println!("\nHistory:");
    for entry in queue.history().iter().rev() {
        let status = if entry.success { "✓" } else { "✗" };
        println!(
            "  {} {} -> {}  {}  ({})",
            status,
            entry.from_format,
            entry.to_format,
            entry.id,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }

    if summary.failed > 0 {
        anyhow::bail!("{} of {} file(s) failed to convert", summary.failed, summary.total());
    }
    Ok(())
}

/// `--out`, then the configured destination, then the user's download folder.
fn resolve_destination(out: Option<PathBuf>, configured: Option<&Path>) -> Option<PathBuf> {
    out.or_else(|| {
        configured.map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).as_ref()))
    })
    .or_else(dirs::download_dir)
}

fn report_event(event: &Event, notifications: &NotificationCenter) {
    match &event.payload {
        EventPayload::ProgressChanged {
            percentage,
            message,
        } if *percentage > 0 => println!("{}", message),
        EventPayload::NotificationAdded {
            notification_id,
            title,
        } => {
            let notification = notifications.get(*notification_id);
            let kind = notification
                .as_ref()
                .map(|n| n.kind.as_str())
                .unwrap_or("info");
            match notification.and_then(|n| n.description) {
                Some(description) => println!("[{}] {}: {}", kind, title, description),
                None => println!("[{}] {}", kind, title),
            }
        }
        _ => {}
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "cnvrt=trace,cnvrt_engine=debug,cnvrt_common=debug".to_string()
        } else {
            "cnvrt=info,cnvrt_engine=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Convert {
            files,
            to,
            out,
            no_transparency,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_files(
                &files,
                &to,
                out,
                no_transparency,
                cli.config.as_deref(),
            ))
        }
        Commands::Formats { format } => list_formats(&format),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("cnvrt {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn list_formats(format: &str) -> Result<()> {
    let format = format.trim_start_matches('.').to_lowercase();
    let kind = match formats::MediaKind::of(&format) {
        Some(kind) => kind,
        None => anyhow::bail!("Unsupported format: {}", format),
    };
    println!("{} ({}, {}) converts to:", format, kind, formats::mime_label(&format));
    for target in formats::supported_targets(&format)
        .iter()
        .filter(|t| **t != format)
    {
        println!("  {}", target);
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking external tools...\n");

    let config = config::load_config_or_default(config_path)?;
    let tools = cnvrt_engine::check_tools(config.tools.ffmpeg_path.as_deref());
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Video conversion needs ffmpeg.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    println!("  History limit: {}", config.queue.history_limit);
    match config.queue.default_destination {
        Some(ref dir) => println!("  Destination: {}", dir.display()),
        None => println!("  Destination: (download folder)"),
    }
    println!("  Keep transparency: {}", config.queue.keep_transparency);
    println!(
        "  Progress: every {}ms, up to {}%",
        config.progress.simulator_interval_ms, config.progress.simulator_ceiling
    );
    println!(
        "  Notifications: success {}ms, error {}ms",
        config.notifications.success_ms, config.notifications.error_ms
    );

    Ok(())
}
