mod app;
mod convert;
mod messages;
mod panels;
mod state;
mod worker;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use folio_core::attachment::AttachmentDescriptor;
use folio_core::config::ViewerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "folio-gui", about = "View attachments in a window")]
#[command(version)]
struct GuiArgs {
    /// Config file (defaults to $FOLIO_CONFIG, then the user config dir)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Send the session credential with remote sources
    #[arg(long)]
    auth: bool,

    /// Files or URLs to open
    sources: Vec<String>,
}

impl GuiArgs {
    fn attachments(&self) -> Vec<AttachmentDescriptor> {
        self.sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                AttachmentDescriptor::from_source((i + 1).to_string(), source, self.auth)
            })
            .collect()
    }
}

fn main() -> anyhow::Result<()> {
    let args = GuiArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let attachments = args.attachments();

    let config =
        ViewerConfig::load(args.config.as_deref()).context("Failed to load configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Folio"),
        ..Default::default()
    };

    eframe::run_native(
        "Folio",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::FolioApp::new(&cc.egui_ctx, config, attachments)?))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_and_flags() {
        let args =
            GuiArgs::try_parse_from(["folio-gui", "--auth", "a.png", "https://x.example/b.pdf"])
                .unwrap();
        assert!(args.auth);
        assert!(args.config.is_none());
        let attachments = args.attachments();
        assert_eq!(attachments.len(), 2);
        assert_eq!(attachments[1].id.to_string(), "2");
    }

    #[test]
    fn test_config_requires_a_value() {
        assert!(GuiArgs::try_parse_from(["folio-gui", "--config"]).is_err());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(GuiArgs::try_parse_from(["folio-gui", "--bogus", "a.png"]).is_err());
    }

    #[test]
    fn test_help_is_not_a_source() {
        let err = GuiArgs::try_parse_from(["folio-gui", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
