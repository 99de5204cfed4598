// Plot orchestrator: owns the data, the derived plot and the brush

use crate::brush::{base_highlights, classify, BrushController, Extent, PixelRect, Transition};
use crate::compiler::compile_scene;
use crate::data::{DataSource, Dataset, Row};
use crate::error::{ConfigurationError, DrawError, LoadError};
use crate::graph::Canvas;
use crate::ir::{ColumnConfig, Highlight, Panel, PlotState, ResolvedColumns, SceneGraph};
use crate::layout::build_panels;
use crate::resolve::resolve_and_prepare;
use crate::scale::{build_scales, PanelGeometry};
use crate::{OutputFormat, RenderOptions, ScatterVectorConfig};
use tracing::{debug, info, warn};

/// Where the orchestrator is in its data lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No data requested yet.
    Unloaded,
    /// The first draw is waiting for the host to deliver the dataset.
    Loading,
    /// The dataset is cached; draws are synchronous.
    Ready,
}

/// What the host must do after `begin_draw`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawRequest {
    /// Load `url` and hand the result to `complete_load`.
    Load { url: String },
    /// The plot was redrawn from the cached dataset.
    Drawn,
}

enum Lifecycle {
    Unloaded,
    Loading { primary: String },
    Ready {
        dataset: Dataset,
        plot: Option<PlotState>,
    },
}

type SelectionListener = Box<dyn FnMut(bool)>;

/// Small-multiples scatter grid: one primary column against every value
/// column, with a brush linked across all panels.
pub struct ScatterVector {
    url: String,
    geometry: PanelGeometry,
    columns: ColumnConfig,
    lifecycle: Lifecycle,
    brush: BrushController,
    listener: Option<SelectionListener>,
}

impl std::fmt::Debug for ScatterVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScatterVector")
            .field("url", &self.url)
            .field("geometry", &self.geometry)
            .field("columns", &self.columns)
            .field("phase", &self.phase())
            .field("brush", &self.brush)
            .finish()
    }
}

impl ScatterVector {
    pub fn new(config: ScatterVectorConfig) -> Result<Self, ConfigurationError> {
        if config.url.trim().is_empty() {
            return Err(ConfigurationError::MissingSource);
        }
        if config.factors.is_empty() && config.values.is_empty() {
            return Err(ConfigurationError::NoColumnRoles);
        }
        if config.size <= config.padding {
            return Err(ConfigurationError::InvalidGeometry {
                size: config.size,
                padding: config.padding,
            });
        }

        Ok(Self {
            url: config.url,
            geometry: PanelGeometry {
                size: config.size,
                padding: config.padding,
            },
            columns: ColumnConfig {
                factors: config.factors,
                values: config.values,
            },
            lifecycle: Lifecycle::Unloaded,
            brush: BrushController::new(),
            listener: None,
        })
    }

    /// Register the host toggle for "selection usable".
    pub fn on_selection_usable(&mut self, listener: impl FnMut(bool) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    pub fn phase(&self) -> Phase {
        match self.lifecycle {
            Lifecycle::Unloaded => Phase::Unloaded,
            Lifecycle::Loading { .. } => Phase::Loading,
            Lifecycle::Ready { .. } => Phase::Ready,
        }
    }

    pub fn geometry(&self) -> PanelGeometry {
        self.geometry
    }

    /// Draw with `primary` on the shared vertical axis.
    ///
    /// The first call asks the host to load the data; later calls redraw from
    /// the cached dataset. A second draw while the first load is outstanding
    /// is rejected.
    pub fn begin_draw(&mut self, primary: &str) -> Result<DrawRequest, DrawError> {
        match &mut self.lifecycle {
            Lifecycle::Unloaded => {
                debug!(url = %self.url, primary, "loading plot data");
                self.lifecycle = Lifecycle::Loading {
                    primary: primary.to_string(),
                };
                Ok(DrawRequest::Load {
                    url: self.url.clone(),
                })
            }
            Lifecycle::Loading { primary: pending } => {
                warn!(primary, pending = %pending, "draw rejected while data load is pending");
                Err(DrawError::LoadPending)
            }
            Lifecycle::Ready { dataset, plot } => {
                debug!(primary, "redrawing from cached data");
                let next = build_plot(&self.columns, dataset, primary, self.geometry)?;
                *plot = Some(next);
                self.brush.reset();
                Ok(DrawRequest::Drawn)
            }
        }
    }

    /// Resolve the load started by `begin_draw`.
    pub fn complete_load(&mut self, result: Result<Dataset, LoadError>) -> Result<(), DrawError> {
        let primary = match std::mem::replace(&mut self.lifecycle, Lifecycle::Unloaded) {
            Lifecycle::Loading { primary } => primary,
            other => {
                self.lifecycle = other;
                return Err(DrawError::NoLoadPending);
            }
        };

        let mut dataset = match result {
            Ok(dataset) => dataset,
            Err(e) => {
                warn!(url = %self.url, error = %e, "data load failed");
                return Err(e.into());
            }
        };
        debug!(rows = dataset.len(), columns = dataset.columns().len(), "plot data loaded");

        let built = build_plot(&self.columns, &mut dataset, &primary, self.geometry);
        self.brush.reset();
        match built {
            Ok(plot) => {
                self.lifecycle = Lifecycle::Ready {
                    dataset,
                    plot: Some(plot),
                };
                Ok(())
            }
            Err(e) => {
                // The data stays cached for the next draw
                self.lifecycle = Lifecycle::Ready {
                    dataset,
                    plot: None,
                };
                Err(e.into())
            }
        }
    }

    /// Draw with `primary`, loading synchronously from `source` if needed.
    pub fn draw(&mut self, primary: &str, source: &dyn DataSource) -> Result<(), DrawError> {
        match self.begin_draw(primary)? {
            DrawRequest::Drawn => Ok(()),
            DrawRequest::Load { url } => self.complete_load(source.load(&url)),
        }
    }

    pub fn has_plot(&self) -> bool {
        self.plot().is_some()
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.lifecycle {
            Lifecycle::Ready { dataset, .. } => Some(dataset),
            _ => None,
        }
    }

    fn plot(&self) -> Option<&PlotState> {
        match &self.lifecycle {
            Lifecycle::Ready { plot, .. } => plot.as_ref(),
            _ => None,
        }
    }

    /// Column roles of the current plot.
    pub fn columns(&self) -> Option<&ResolvedColumns> {
        self.plot().map(|p| &p.columns)
    }

    /// Sorted group keys of the current plot.
    pub fn groups(&self) -> &[String] {
        self.plot().map_or(&[], |p| p.columns.groups.as_slice())
    }

    pub fn panels(&self) -> &[Panel] {
        self.plot().map_or(&[], |p| p.panels.as_slice())
    }

    /// Per-row highlight, parallel to the dataset rows.
    pub fn highlights(&self) -> &[Highlight] {
        self.plot().map_or(&[], |p| p.highlights.as_slice())
    }

    pub fn active_panel(&self) -> Option<&Panel> {
        self.brush.active_panel()
    }

    /// Data-space extent of the active brush, if non-empty.
    pub fn brush_extent(&self) -> Option<Extent> {
        self.brush.extent()
    }

    /// Pointer pressed on a panel.
    pub fn brush_start(&mut self, panel: usize) -> Result<Transition, DrawError> {
        let (_, plot) = ready_mut(&mut self.lifecycle)?;
        let target = panel_at(plot, panel)?;
        let x = plot.scales.values[target.index];
        let y = plot.scales.primary;

        if let Some(listener) = self.listener.as_mut() {
            listener(false);
        }
        Ok(self.brush.start(&target, x, y))
    }

    /// Pointer dragged to `rect` (panel-local pixels).
    pub fn brush_move(&mut self, panel: usize, rect: PixelRect) -> Result<Transition, DrawError> {
        let (dataset, plot) = ready_mut(&mut self.lifecycle)?;
        let target = panel_at(plot, panel)?;

        let transition = self.brush.update(&target, rect);
        if let Transition::Updated { extent } = &transition {
            plot.highlights = classify(dataset, &plot.columns, &target, extent);
        }
        Ok(transition)
    }

    /// Pointer released on a panel.
    pub fn brush_end(&mut self, panel: usize) -> Result<Transition, DrawError> {
        let (dataset, plot) = ready_mut(&mut self.lifecycle)?;
        let target = panel_at(plot, panel)?;

        let transition = self.brush.end(&target);
        match &transition {
            Transition::Cleared => {
                plot.highlights = base_highlights(dataset, &plot.columns);
            }
            Transition::Selected { .. } => {
                if let Some(listener) = self.listener.as_mut() {
                    listener(true);
                }
            }
            _ => {}
        }
        Ok(transition)
    }

    /// Rows currently highlighted by a non-empty brush, each once.
    pub fn selected_rows(&self) -> Vec<&Row> {
        let (Some(dataset), Some(plot)) = (self.dataset(), self.plot()) else {
            return Vec::new();
        };
        if self.brush.extent().is_none() {
            return Vec::new();
        }
        dataset
            .rows()
            .iter()
            .zip(&plot.highlights)
            .filter(|(_, highlight)| highlight.is_some())
            .map(|(row, _)| row)
            .collect()
    }

    /// Hand the selected rows to `f` and return its result. `R::default()`
    /// when nothing is plotted, the brush is empty, or no row is highlighted.
    pub fn selected<'a, R, F>(&'a self, f: F) -> R
    where
        R: Default,
        F: FnOnce(&[&'a Row], &'a Self) -> R,
    {
        let rows = self.selected_rows();
        if rows.is_empty() {
            return R::default();
        }
        f(&rows, self)
    }

    /// Scene graph of the current plot.
    pub fn scene(&self, options: &RenderOptions) -> Option<SceneGraph> {
        let dataset = self.dataset()?;
        let plot = self.plot()?;
        let brush = self
            .brush
            .active_panel()
            .zip(self.brush.rect());
        Some(compile_scene(dataset, plot, brush, self.geometry, options))
    }

    /// Render the current plot in the requested format.
    pub fn render(&self, options: &RenderOptions) -> Result<Vec<u8>, DrawError> {
        let scene = self.scene(options).ok_or(DrawError::NotReady)?;
        let canvas = Canvas::default();
        match options.format {
            OutputFormat::Png => canvas.render_png(&scene),
            OutputFormat::Svg => canvas.render_svg(&scene).map(String::into_bytes),
        }
    }
}

/// Run the draw pipeline: resolve columns, scale, lay out, base coloring.
fn build_plot(
    config: &ColumnConfig,
    dataset: &mut Dataset,
    primary: &str,
    geometry: PanelGeometry,
) -> Result<PlotState, ConfigurationError> {
    let columns = resolve_and_prepare(config, dataset, primary)?;
    let scales = build_scales(dataset, &columns, geometry);
    let panels = build_panels(&columns);
    let highlights = base_highlights(dataset, &columns);
    info!(
        primary,
        panels = panels.len(),
        groups = columns.groups.len(),
        rows = dataset.len(),
        "plot drawn"
    );
    Ok(PlotState {
        columns,
        scales,
        panels,
        highlights,
    })
}

fn ready_mut(lifecycle: &mut Lifecycle) -> Result<(&Dataset, &mut PlotState), DrawError> {
    match lifecycle {
        Lifecycle::Ready {
            dataset,
            plot: Some(plot),
        } => Ok((dataset, plot)),
        _ => Err(DrawError::NotReady),
    }
}

fn panel_at(plot: &PlotState, index: usize) -> Result<Panel, DrawError> {
    plot.panels
        .get(index)
        .cloned()
        .ok_or(DrawError::UnknownPanel {
            index,
            count: plot.panels.len(),
        })
}
