//! Chart instance lifecycle and pointer-event resolution.
//!
//! The rendering library is a black box behind `ChartBackend`: it takes a
//! prepared view, draws it on its fixed surface, and reports the geometry
//! of every plotted point. `ChartSession` owns at most one live instance
//! and replaces it wholesale on every recompute; a clicked point comes back
//! as an explicit `NavigationCursor`, never through shared mutable state.

use anyhow::Result;

use crate::axis::DateAxis;
use crate::dataset::PlotDataset;
use crate::logging::{log, obj, v_num, Domain, Level};
use crate::state::NavigationCursor;

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone)]
pub struct ChartView {
    pub labels: Vec<String>,
    pub series: Vec<SeriesView>,
}

#[derive(Debug, Clone)]
pub struct SeriesView {
    pub label: String,
    pub color: String,
    pub scores: Vec<Option<f64>>,
}

impl ChartView {
    pub fn new(dataset: &PlotDataset, axis: &DateAxis) -> Self {
        Self {
            labels: axis.labels(),
            series: dataset
                .series
                .iter()
                .map(|s| SeriesView {
                    label: s.label.clone(),
                    color: s.color.clone(),
                    scores: s.scores(),
                })
                .collect(),
        }
    }
}

/// Surface position of one plotted point, addressed by series and axis slot.
#[derive(Debug, Clone, Copy)]
pub struct PlottedPoint {
    pub series: usize,
    pub slot: usize,
    pub x: f64,
    pub y: f64,
}

/// A live chart as the backend reports it after drawing.
#[derive(Debug)]
pub struct ChartInstance {
    pub points: Vec<PlottedPoint>,
}

/// The rendering library seam. `destroy` must release the instance's event
/// handlers; the session never holds two instances at once.
pub trait ChartBackend {
    fn create(&mut self, view: &ChartView) -> Result<ChartInstance>;
    fn destroy(&mut self, instance: ChartInstance);
}

#[derive(Debug, Clone, Copy)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

/// Per-point tooltip, derived on demand from the backing snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip {
    pub header: String,
    pub body: Vec<String>,
}

struct Rendered {
    dataset: PlotDataset,
    instance: ChartInstance,
}

/// Owns the lifecycle of the single chart bound to one drawing surface.
pub struct ChartSession<B: ChartBackend> {
    backend: B,
    click_radius: f64,
    rendered: Option<Rendered>,
}

impl<B: ChartBackend> ChartSession<B> {
    pub fn new(backend: B, click_radius: f64) -> Self {
        Self { backend, click_radius, rendered: None }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Replace the current chart with one drawn from `dataset` and `axis`.
    ///
    /// The previous instance is always destroyed first; a surviving
    /// instance would keep its event handlers and duplicate tooltips. The
    /// dataset is owned from here on and is the immutable record of this
    /// render.
    pub fn render(&mut self, dataset: PlotDataset, axis: &DateAxis) -> Result<()> {
        if let Some(prev) = self.rendered.take() {
            self.backend.destroy(prev.instance);
        }
        let view = ChartView::new(&dataset, axis);
        let instance = self.backend.create(&view)?;
        log(
            Level::Debug,
            Domain::Chart,
            "chart_rendered",
            obj(&[
                ("series", v_num(dataset.series.len() as f64)),
                ("points", v_num(instance.points.len() as f64)),
            ]),
        );
        self.rendered = Some(Rendered { dataset, instance });
        Ok(())
    }

    /// Map a pointer event to the nearest plotted point within the click
    /// radius and return the identity it represents, or `None` when the
    /// click did not land on data.
    pub fn resolve_click(&self, event: PointerEvent) -> Option<NavigationCursor> {
        let rendered = self.rendered.as_ref()?;
        let point = rendered
            .instance
            .points
            .iter()
            .map(|p| {
                let dx = p.x - event.x;
                let dy = p.y - event.y;
                (p, (dx * dx + dy * dy).sqrt())
            })
            .filter(|(_, dist)| *dist <= self.click_radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(p, _)| p)?;

        let snapshot = rendered
            .dataset
            .series
            .get(point.series)?
            .series
            .get(point.slot)?
            .as_ref()?;
        Some(NavigationCursor { account_id: snapshot.account_id, snapshot_id: snapshot.id })
    }

    /// Tooltip for one plotted point: screen name and display name on the
    /// header, then the score and every feature pair in stored
    /// most-important-first order.
    pub fn tooltip_at(&self, series: usize, slot: usize) -> Option<Tooltip> {
        let rendered = self.rendered.as_ref()?;
        let snapshot = rendered.dataset.series.get(series)?.series.get(slot)?.as_ref()?;

        let mut body = Vec::new();
        body.push(format!("score: {:.4}", snapshot.score));
        body.push("features:".to_string());
        for (name, value) in &snapshot.features {
            let shown = value.as_f64().map(|v| v.to_string()).unwrap_or_else(|| value.to_string());
            body.push(format!("  - {}: {}", name, shown));
        }

        Some(Tooltip {
            header: format!("{} - {}", snapshot.screen_name, snapshot.name),
            body,
        })
    }
}

/// Plain-text renderer used by the binary and the tests. Points are laid
/// out on a `width` x `height` surface with scores clamped to [0, 1].
pub struct TextSurface {
    width: u32,
    height: u32,
    created: u64,
    destroyed: u64,
}

impl TextSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height, created: 0, destroyed: 0 }
    }

    pub fn live_instances(&self) -> u64 {
        self.created - self.destroyed
    }

    /// Total charts drawn on this surface since creation.
    pub fn renders(&self) -> u64 {
        self.created
    }

    fn x_for(&self, slot: usize, slots: usize) -> f64 {
        if slots <= 1 {
            return self.width as f64 / 2.0;
        }
        slot as f64 / (slots - 1) as f64 * self.width as f64
    }

    fn y_for(&self, score: f64) -> f64 {
        (1.0 - score.clamp(0.0, 1.0)) * self.height as f64
    }
}

impl ChartBackend for TextSurface {
    fn create(&mut self, view: &ChartView) -> Result<ChartInstance> {
        let slots = view.labels.len();
        let mut points = Vec::new();
        for (si, series) in view.series.iter().enumerate() {
            for (slot, score) in series.scores.iter().enumerate() {
                if let Some(score) = score {
                    points.push(PlottedPoint {
                        series: si,
                        slot,
                        x: self.x_for(slot, slots),
                        y: self.y_for(*score),
                    });
                }
            }
        }
        self.created += 1;
        Ok(ChartInstance { points })
    }

    fn destroy(&mut self, _instance: ChartInstance) {
        self.destroyed += 1;
    }
}
