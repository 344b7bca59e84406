//! Interactive check of the region selector: cargo run -p picfly-capture --bin pick_region

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::Context;
    use picfly_capture::{RegionSelector, WinOverlay, XcapCapturer, enable_dpi_awareness};
    use picfly_config::selector::SelectorConfig;
    use tokio_util::sync::CancellationToken;

    enable_dpi_awareness();
    let selector = RegionSelector::new(
        Arc::new(XcapCapturer),
        Arc::new(WinOverlay),
        SelectorConfig::default(),
    );

    println!("Drag a rectangle, Esc or right-click to cancel");
    let start = Instant::now();
    let Some(region) = selector.select(&CancellationToken::new())? else {
        println!("Cancelled after {:?}", start.elapsed());
        return Ok(());
    };

    let png = region.to_png()?;
    std::fs::write("pick_region.png", &png).context("Failed to write pick_region.png")?;
    println!(
        "{}x{} at ({}, {}), {} bytes in {:?}, saved to pick_region.png",
        region.rect.width(),
        region.rect.height(),
        region.rect.x0,
        region.rect.y0,
        png.len(),
        start.elapsed()
    );
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("pick_region needs a Windows desktop");
}
