use std::sync::Arc;

use crate::{
    canvas::{
        buffer::{PixelBuffer, Rgb},
        compositor,
        optimistic::{self, OptimisticUpdate},
        pending::PendingEdits,
        raster,
        types::GridPoint,
        viewport::{DRAW_MODE_ZOOM, VIEW_MODE_ZOOM, Viewport},
    },
    config::Config,
    error::{EngineError, Result},
    ledger::{DrawBatch, LedgerClient, TransactionHandle},
    utils::time::current_time_ms,
};

pub mod types;

pub use types::{SessionMode, StrokeConfig};

/// One canvas-editing session. Owns the pending edits, the optimistic
/// overlay, the viewport and the stroke tool state; constructed when the
/// user opens a canvas and dropped when they leave. All operations go
/// through this context, so there is no global store to reset between
/// sessions.
pub struct CanvasSession {
    config: Arc<Config>,
    base: PixelBuffer,
    pending: PendingEdits,
    optimistic_updates: Vec<OptimisticUpdate>,
    viewport: Viewport,
    stroke: StrokeConfig,
    mode: SessionMode,
}

impl CanvasSession {
    /// Starts a view-only session on a blank white canvas. The first poll
    /// refresh swaps in the real image via `replace_base`.
    pub fn new(config: Arc<Config>) -> Self {
        let base = PixelBuffer::blank(config.canvas.pixels_per_side);
        Self {
            config,
            base,
            pending: PendingEdits::new(),
            optimistic_updates: Vec::new(),
            viewport: Viewport::default(),
            stroke: StrokeConfig::default(),
            mode: SessionMode::ViewOnly,
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn stroke(&self) -> StrokeConfig {
        self.stroke
    }

    pub fn set_stroke_color(&mut self, color: Rgb) {
        self.stroke.color = color;
    }

    /// Clamps to the configured width bounds rather than rejecting, the
    /// way a slider control behaves.
    pub fn set_stroke_width(&mut self, width: u32) {
        self.stroke.width = width.clamp(
            self.config.canvas.stroke_width_min,
            self.config.canvas.stroke_width_max,
        );
    }

    pub fn pending(&self) -> &PendingEdits {
        &self.pending
    }

    pub fn has_unsaved_edits(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn optimistic_updates(&self) -> &[OptimisticUpdate] {
        &self.optimistic_updates
    }

    pub fn enter_draw_mode(&mut self) {
        if self.mode == SessionMode::ViewOnly {
            self.mode = SessionMode::Drawing;
            self.viewport.set_zoom(DRAW_MODE_ZOOM);
        }
    }

    /// Cancels drawing and discards pending edits. Hosts that want a
    /// confirmation prompt check `has_unsaved_edits` first.
    pub fn exit_draw_mode(&mut self) -> Result<()> {
        match self.mode {
            SessionMode::Submitting => Err(EngineError::SubmissionInFlight),
            SessionMode::ViewOnly => Ok(()),
            SessionMode::Drawing => {
                self.pending.clear();
                self.mode = SessionMode::ViewOnly;
                self.viewport.set_zoom(VIEW_MODE_ZOOM);
                Ok(())
            }
        }
    }

    /// Discards pending edits but stays in draw mode.
    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// Rasterizes one stroke segment into pending edits using the current
    /// brush. Screen points are mapped through the viewport first; pass
    /// the same point twice for a single click. Returns how many cells
    /// were written after clipping.
    pub fn apply_stroke_screen(&mut self, from: (f64, f64), to: (f64, f64)) -> Result<usize> {
        let p1 = self.viewport.screen_to_grid(from.0, from.1);
        let p2 = self.viewport.screen_to_grid(to.0, to.1);
        self.apply_stroke(p1, p2)
    }

    /// Grid-space variant of `apply_stroke_screen`.
    pub fn apply_stroke(&mut self, p1: GridPoint, p2: GridPoint) -> Result<usize> {
        match self.mode {
            SessionMode::ViewOnly => return Err(EngineError::NotInDrawMode),
            SessionMode::Submitting => {
                // Mid-gesture input during a submit is dropped, not an error.
                tracing::debug!("Ignoring stroke while a submission is in flight");
                return Ok(0);
            }
            SessionMode::Drawing => {}
        }

        let points = raster::stroke_points(
            p1,
            p2,
            self.stroke.width,
            self.config.canvas.pixels_per_side,
        );
        for &(x, y) in &points {
            self.pending.insert(x, y, self.stroke.color);
        }
        Ok(points.len())
    }

    /// Installs a freshly polled authoritative image. Only the base layer
    /// changes; pending edits and optimistic updates stay overlaid so a
    /// stale poll can never clobber local work.
    pub fn replace_base(&mut self, buffer: PixelBuffer) -> Result<()> {
        if buffer.side() != self.config.canvas.pixels_per_side {
            return Err(EngineError::CanvasSizeMismatch {
                expected: self.config.canvas.pixels_per_side,
                actual: buffer.side(),
            });
        }
        self.base = buffer;
        tracing::debug!("Authoritative canvas image refreshed");
        Ok(())
    }

    /// Composites the current frame: base, then optimistic patches oldest
    /// first, then pending edits on top.
    pub fn render(&self) -> PixelBuffer {
        compositor::composite(&self.base, &self.optimistic_updates, &self.pending)
    }

    /// Submits the pending edits as one draw transaction and waits for
    /// confirmation. On success the edits move into an optimistic update
    /// stamped with the confirmation time and the pending set empties. On
    /// failure the pending set is retained so the user can retry without
    /// redrawing.
    pub async fn submit(&mut self, ledger: &dyn LedgerClient) -> Result<TransactionHandle> {
        match self.mode {
            SessionMode::ViewOnly => return Err(EngineError::NotInDrawMode),
            SessionMode::Submitting => return Err(EngineError::SubmissionInFlight),
            SessionMode::Drawing => {}
        }

        if self.pending.is_empty() {
            return Err(EngineError::EmptyBatch);
        }

        let count = self.pending.len();
        let max = self.config.canvas.max_pixels_per_txn;
        if count > max {
            return Err(EngineError::OversizedBatch { count, max });
        }

        self.mode = SessionMode::Submitting;
        tracing::info!(pixels = count, "Submitting draw batch");

        let batch = DrawBatch::from_pending(&self.pending);
        let canvas_address = self.config.ledger.canvas_address.clone();
        let result = async {
            let handle = ledger.submit_draw(&canvas_address, batch).await?;
            ledger.wait_for_confirmation(handle.clone()).await?;
            Ok(handle)
        }
        .await;

        self.mode = SessionMode::Drawing;

        match result {
            Ok(handle) => {
                self.optimistic_updates.push(OptimisticUpdate {
                    image_patch: self.pending.snapshot(),
                    committed_at_ms: current_time_ms(),
                });
                self.pending.clear();
                tracing::info!(txn = %handle, pixels = count, "Draw batch confirmed");
                Ok(handle)
            }
            Err(error) => {
                tracing::warn!(error = %error, "Draw submission failed, pending edits retained");
                Err(error)
            }
        }
    }

    /// Sweeps expired optimistic updates. Hosts run this on a timer
    /// independent of polling.
    pub fn expire_optimistic(&mut self) -> usize {
        self.expire_optimistic_at(current_time_ms())
    }

    pub fn expire_optimistic_at(&mut self, now_ms: u64) -> usize {
        optimistic::expire(
            &mut self.optimistic_updates,
            self.config.canvas.optimistic_ttl_ms,
            now_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{CanvasConfig, LedgerConfig, PollConfig},
        ledger::InMemoryLedger,
    };
    use std::time::Duration;

    fn test_config(side: u32, max_pixels_per_txn: usize) -> Arc<Config> {
        Arc::new(Config {
            canvas: CanvasConfig {
                pixels_per_side: side,
                max_pixels_per_txn,
                stroke_width_min: 1,
                stroke_width_max: 8,
                optimistic_ttl_ms: 30_000,
            },
            ledger: LedgerConfig {
                node_url: "http://127.0.0.1:8080/v1".into(),
                module_id: "0x1::canvas_token".into(),
                canvas_address: "0xabc".into(),
            },
            poll: PollConfig {
                interval: Duration::from_millis(6000),
            },
        })
    }

    fn drawing_session(side: u32, max_pixels_per_txn: usize) -> CanvasSession {
        let mut session = CanvasSession::new(test_config(side, max_pixels_per_txn));
        session.enter_draw_mode();
        session.viewport_mut().set_zoom(1.0);
        session
    }

    #[test]
    fn single_click_writes_exactly_one_pending_pixel() {
        let mut session = drawing_session(32, 800);
        session.set_stroke_color(Rgb::BLACK);

        let written = session
            .apply_stroke_screen((10.0, 10.0), (10.0, 10.0))
            .unwrap();

        assert_eq!(written, 1);
        assert_eq!(session.pending().len(), 1);
        assert_eq!(session.pending().get(10, 10), Some(Rgb::BLACK));
    }

    #[test]
    fn straight_drag_covers_all_six_cells() {
        let mut session = drawing_session(32, 800);

        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(5, 0))
            .unwrap();

        assert_eq!(session.pending().len(), 6);
        for x in 0..=5 {
            assert!(session.pending().get(x, 0).is_some());
        }
    }

    #[test]
    fn second_stroke_overwrites_shared_cells() {
        let mut session = drawing_session(32, 800);

        session.set_stroke_color(Rgb::new(255, 0, 0));
        session
            .apply_stroke(GridPoint::new(3, 3), GridPoint::new(3, 3))
            .unwrap();
        session.set_stroke_color(Rgb::new(0, 0, 255));
        session
            .apply_stroke(GridPoint::new(3, 3), GridPoint::new(3, 3))
            .unwrap();

        assert_eq!(session.pending().len(), 1);
        assert_eq!(session.pending().get(3, 3), Some(Rgb::new(0, 0, 255)));
    }

    #[test]
    fn strokes_near_the_edge_clip_to_the_canvas() {
        let mut session = drawing_session(16, 800);
        session.set_stroke_width(3);

        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(0, 0))
            .unwrap();

        // 3x3 block centered on the corner keeps only the in-bounds quadrant.
        assert_eq!(session.pending().len(), 4);
    }

    #[test]
    fn stroke_width_clamps_to_configured_bounds() {
        let mut session = drawing_session(16, 800);
        session.set_stroke_width(99);
        assert_eq!(session.stroke().width, 8);
        session.set_stroke_width(0);
        assert_eq!(session.stroke().width, 1);
    }

    #[test]
    fn view_only_sessions_reject_strokes() {
        let mut session = CanvasSession::new(test_config(16, 800));
        let result = session.apply_stroke(GridPoint::new(0, 0), GridPoint::new(1, 0));
        assert!(matches!(result, Err(EngineError::NotInDrawMode)));
    }

    #[tokio::test]
    async fn successful_submit_moves_pending_into_an_optimistic_update() {
        let mut session = drawing_session(16, 800);
        let ledger = InMemoryLedger::new("0x1::canvas_token");

        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(2, 0))
            .unwrap();
        let patch_before = session.pending().snapshot();
        assert_eq!(patch_before.len(), 3);

        session.submit(&ledger).await.unwrap();

        assert!(session.pending().is_empty());
        assert_eq!(session.optimistic_updates().len(), 1);
        assert_eq!(session.optimistic_updates()[0].image_patch, patch_before);
        assert_eq!(session.mode(), SessionMode::Drawing);
        assert_eq!(ledger.committed().len(), 1);
    }

    #[tokio::test]
    async fn failed_submit_retains_pending_edits() {
        let mut session = drawing_session(16, 800);
        let ledger = InMemoryLedger::new("0x1::canvas_token");
        ledger.fail_submissions(true);

        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(2, 0))
            .unwrap();

        let result = session.submit(&ledger).await;

        assert!(matches!(result, Err(EngineError::SubmissionFailed(_))));
        assert_eq!(session.pending().len(), 3);
        assert!(session.optimistic_updates().is_empty());
        assert_eq!(session.mode(), SessionMode::Drawing);
    }

    #[tokio::test]
    async fn oversized_batches_are_rejected_before_submission() {
        let mut session = drawing_session(16, 4);
        let ledger = InMemoryLedger::new("0x1::canvas_token");

        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(4, 0))
            .unwrap();

        let result = session.submit(&ledger).await;

        assert!(matches!(
            result,
            Err(EngineError::OversizedBatch { count: 5, max: 4 })
        ));
        assert_eq!(session.pending().len(), 5);
        assert!(ledger.committed().is_empty());
    }

    #[tokio::test]
    async fn empty_submissions_are_rejected() {
        let mut session = drawing_session(16, 800);
        let ledger = InMemoryLedger::new("0x1::canvas_token");

        let result = session.submit(&ledger).await;

        assert!(matches!(result, Err(EngineError::EmptyBatch)));
    }

    #[test]
    fn poll_refresh_never_clobbers_local_layers() {
        let mut session = drawing_session(16, 800);
        session.set_stroke_color(Rgb::new(0, 0, 255));
        session
            .apply_stroke(GridPoint::new(1, 1), GridPoint::new(1, 1))
            .unwrap();
        session.optimistic_updates.push(OptimisticUpdate {
            image_patch: {
                let mut patch = crate::canvas::pending::ImagePatch::new();
                patch.insert((2, 2), Rgb::new(0, 255, 0));
                patch
            },
            committed_at_ms: current_time_ms(),
        });

        let mut fresh = PixelBuffer::blank(16);
        fresh.set(0, 0, Rgb::new(255, 0, 0));
        session.replace_base(fresh).unwrap();

        let frame = session.render();
        assert_eq!(frame.get(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(frame.get(1, 1), Some(Rgb::new(0, 0, 255)));
        assert_eq!(frame.get(2, 2), Some(Rgb::new(0, 255, 0)));
    }

    #[test]
    fn replace_base_rejects_mismatched_sizes() {
        let mut session = drawing_session(16, 800);
        let result = session.replace_base(PixelBuffer::blank(8));
        assert!(matches!(
            result,
            Err(EngineError::CanvasSizeMismatch { .. })
        ));
    }

    #[test]
    fn expiry_sweep_uses_the_configured_window() {
        let mut session = drawing_session(16, 800);
        let now_ms = 1_000_000;
        let ttl_ms = session.config.canvas.optimistic_ttl_ms;

        session.optimistic_updates.push(OptimisticUpdate {
            image_patch: crate::canvas::pending::ImagePatch::new(),
            committed_at_ms: now_ms - ttl_ms - 1,
        });
        session.optimistic_updates.push(OptimisticUpdate {
            image_patch: crate::canvas::pending::ImagePatch::new(),
            committed_at_ms: now_ms,
        });

        assert_eq!(session.expire_optimistic_at(now_ms), 1);
        assert_eq!(session.optimistic_updates().len(), 1);
    }

    #[test]
    fn clear_discards_edits_but_stays_in_draw_mode() {
        let mut session = drawing_session(16, 800);
        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(3, 0))
            .unwrap();

        session.clear_pending();

        assert!(session.pending().is_empty());
        assert_eq!(session.mode(), SessionMode::Drawing);
    }

    #[test]
    fn cancel_discards_edits_and_returns_to_view_only() {
        let mut session = drawing_session(16, 800);
        session
            .apply_stroke(GridPoint::new(0, 0), GridPoint::new(3, 0))
            .unwrap();
        assert!(session.has_unsaved_edits());

        session.exit_draw_mode().unwrap();

        assert_eq!(session.mode(), SessionMode::ViewOnly);
        assert!(!session.has_unsaved_edits());
    }
}
