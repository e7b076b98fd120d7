use anyhow::{bail, Result};
use clap::Args;
use folio_core::config::ViewerConfig;
use folio_core::transform::{Overlay, Rotation, Size, TransformState};

use crate::summary;

#[derive(Args)]
pub struct FitArgs {
    /// Natural content size, e.g. 1920x1080
    #[arg(long, value_parser = parse_size)]
    pub natural: Size,

    /// Viewport size, e.g. 1280x800
    #[arg(long, value_parser = parse_size)]
    pub container: Size,

    /// Overlay strip heights as TOP,BOTTOM
    #[arg(long, value_parser = parse_overlay, default_value = "0,0")]
    pub overlay: Overlay,

    /// Rotation in degrees, snapped to a quarter turn
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rotate: i32,

    /// Zoom in percent (25-400)
    #[arg(long, default_value = "100")]
    pub zoom: f32,
}

pub fn run(args: &FitArgs, config: &ViewerConfig) -> Result<()> {
    let mut t = TransformState::new(config.viewer.transform_settings());
    t.set_container_size(args.container);
    t.set_overlay(args.overlay);
    t.set_natural_size(args.natural);
    t.rotate_by(Rotation::from_degrees(args.rotate).quarter_turns());
    t.set_zoom(args.zoom);

    summary::print_geometry(&t);
    Ok(())
}

fn parse_size(s: &str) -> Result<Size> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("expected WIDTHxHEIGHT, got '{s}'");
    };
    let size = Size::new(w.trim().parse()?, h.trim().parse()?);
    if !size.is_measurable() {
        bail!("both extents must be positive, got '{s}'");
    }
    Ok(size)
}

fn parse_overlay(s: &str) -> Result<Overlay> {
    let Some((top, bottom)) = s.split_once(',') else {
        bail!("expected TOP,BOTTOM, got '{s}'");
    };
    Ok(Overlay::new(top.trim().parse()?, bottom.trim().parse()?))
}
