use std::sync::Arc;

use graffio_canvas::{
    CanvasSession, Config, GridPoint, InMemoryLedger, PngDecoder, Result, StaticImageSource,
    StrokeConfig,
    canvas::compositor,
    source::refresh_once,
    utils::telemetry::init_tracing,
};

/// Offline walkthrough of the edit engine: draw a stroke, submit it to the
/// in-memory ledger, then feed the rendered frame back through the image
/// source as if the backend had caught up.
#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    let config = Config::from_env()?;
    config.validate()?;
    tracing::info!("Configuration loaded");

    let mut session = CanvasSession::new(Arc::new(config.clone()));
    let ledger = InMemoryLedger::new(&config.ledger.module_id);
    tracing::info!("Session initialized");

    session.enter_draw_mode();
    session.set_stroke_color(StrokeConfig::PALETTE[2]);
    session.set_stroke_width(2);

    let reach = (config.canvas.pixels_per_side as i64 - 1).min(24);
    let written = session.apply_stroke(GridPoint::new(0, 0), GridPoint::new(reach, reach))?;
    tracing::info!(pixels = written, "Stroke applied");

    let handle = session.submit(&ledger).await?;
    tracing::info!(txn = %handle, "Draw batch committed");

    // Simulate the authoritative endpoint serving the confirmed state.
    let frame = session.render();
    let image_source = StaticImageSource::new(compositor::encode_png(&frame)?);
    let decoder = PngDecoder::new(config.canvas.pixels_per_side);

    let fresh = refresh_once(&image_source, &decoder).await?;
    session.replace_base(fresh)?;
    tracing::info!("Authoritative image refreshed");

    let expired = session.expire_optimistic();
    tracing::info!(
        expired,
        remaining = session.optimistic_updates().len(),
        "Optimistic sweep complete"
    );

    let output = "canvas.png";
    std::fs::write(output, compositor::encode_png(&session.render())?)?;
    tracing::info!(output, "Rendered canvas written");

    Ok(())
}
