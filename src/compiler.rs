use crate::brush::PixelRect;
use crate::data::Dataset;
use crate::ir::{DrawCommand, Panel, PanelScene, PlotState, SceneGraph, TextAnchor};
use crate::layout::grid_extent;
use crate::scale::PanelGeometry;
use crate::RenderOptions;

/// Point radius for plottable rows.
pub const POINT_RADIUS: f64 = 3.0;
/// Tick count on every axis.
pub const TICKS: usize = 5;
/// Vertical spacing of legend entries.
const LEGEND_SPACING: f64 = 20.0;
const LEGEND_WIDTH: f64 = 120.0;
const TITLE_AREA: f64 = 50.0;
const FONT_SIZE: f64 = 11.0;

/// Compile the current plot into absolute-pixel drawing commands.
pub fn compile_scene(
    data: &Dataset,
    plot: &PlotState,
    brush: Option<(&Panel, PixelRect)>,
    geometry: PanelGeometry,
    options: &RenderOptions,
) -> SceneGraph {
    let size = f64::from(geometry.size);
    let padding = f64::from(geometry.padding);
    let n = plot.panels.len();
    let origin = (f64::from(options.margin_left), padding);
    let at = |x: f64, y: f64| (origin.0 + x, origin.1 + y);

    // Panels: frame, points, brush
    let mut panels = Vec::with_capacity(n);
    for (panel, x_scale) in plot.panels.iter().zip(&plot.scales.values) {
        let offset = panel.x_offset(geometry.size);
        let y_scale = &plot.scales.primary;
        let mut commands = Vec::with_capacity(data.len() + 2);

        commands.push(DrawCommand::Frame {
            tl: at(offset + padding / 2.0, padding / 2.0),
            br: at(offset + size - padding / 2.0, size - padding / 2.0),
        });

        for (row_idx, row) in data.rows().iter().enumerate() {
            let x = row.number(panel.value.index);
            let y = row.number(panel.primary.index);
            // Unplottable rows collapse onto the panel origin
            let ((cx, cy), radius) = if x.is_nan() || y.is_nan() {
                ((0.0, 0.0), 0.0)
            } else {
                ((x_scale.map(x), y_scale.map(y)), POINT_RADIUS)
            };
            commands.push(DrawCommand::Point {
                row: row_idx,
                center: at(offset + cx, cy),
                radius,
                class: plot.highlights.get(row_idx).copied().flatten(),
            });
        }

        if let Some((active, rect)) = brush {
            if active.index == panel.index {
                let (tl, br) = rect.corners();
                commands.push(DrawCommand::Brush {
                    tl: at(offset + tl.0, tl.1),
                    br: at(offset + br.0, br.1),
                });
            }
        }

        panels.push(PanelScene {
            panel: panel.clone(),
            commands,
        });
    }

    let mut decorations = Vec::new();

    // X axes, one per value column
    for (panel, x_scale) in plot.panels.iter().zip(&plot.scales.values) {
        let offset = panel.x_offset(geometry.size);
        for tick in x_scale.ticks(TICKS) {
            let x = offset + x_scale.map(tick);
            decorations.push(DrawCommand::Line {
                points: vec![at(x, 0.0), at(x, size)],
            });
            decorations.push(DrawCommand::Text {
                pos: at(x, size + FONT_SIZE),
                text: format_tick(tick),
                anchor: TextAnchor::Middle,
                size: FONT_SIZE,
            });
        }

        // Column title under the panel
        decorations.push(DrawCommand::Text {
            pos: at(offset + padding + FONT_SIZE, padding + size + 3.0 * FONT_SIZE),
            text: panel.value.name.clone(),
            anchor: TextAnchor::Start,
            size: FONT_SIZE,
        });
    }

    // Shared Y axis for the primary, ticks spanning every panel
    let (grid_width, _) = grid_extent(n, geometry.size);
    let y_scale = &plot.scales.primary;
    for tick in y_scale.ticks(TICKS) {
        let y = y_scale.map(tick);
        decorations.push(DrawCommand::Line {
            points: vec![at(grid_width, y), at(0.0, y)],
        });
        decorations.push(DrawCommand::Text {
            pos: at(-3.0, y),
            text: format_tick(tick),
            anchor: TextAnchor::End,
            size: FONT_SIZE,
        });
    }

    // Legend, one entry per group
    let legend_x = grid_width + 2.0 * padding;
    let legend_y = (size - n as f64 * LEGEND_SPACING) / 2.0;
    for (idx, group) in plot.columns.groups.iter().enumerate() {
        let y = legend_y + idx as f64 * LEGEND_SPACING;
        decorations.push(DrawCommand::Swatch {
            center: at(legend_x, y),
            radius: POINT_RADIUS,
            class: idx,
        });
        decorations.push(DrawCommand::Text {
            pos: at(legend_x + 12.0, y),
            text: group.clone(),
            anchor: TextAnchor::Start,
            size: FONT_SIZE,
        });
    }

    let width = origin.0 + legend_x + LEGEND_WIDTH;
    let height = origin.1 + size + TITLE_AREA;

    SceneGraph {
        width: width.ceil() as u32,
        height: height.ceil() as u32,
        panels,
        decorations,
    }
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::base_highlights;
    use crate::ir::ColumnConfig;
    use crate::layout::build_panels;
    use crate::resolve::resolve_and_prepare;
    use crate::scale::build_scales;

    const GEOMETRY: PanelGeometry = PanelGeometry { size: 140, padding: 10 };

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn make_plot(rows: Vec<Vec<String>>) -> (Dataset, PlotState) {
        let mut data = Dataset::new(strings(&["sw", "pl", "pw", "species"]), rows).unwrap();
        let config = ColumnConfig {
            factors: strings(&["species"]),
            values: strings(&["sw", "pl", "pw"]),
        };
        let columns = resolve_and_prepare(&config, &mut data, "sw").unwrap();
        let scales = build_scales(&data, &columns, GEOMETRY);
        let panels = build_panels(&columns);
        let highlights = base_highlights(&data, &columns);
        (
            data,
            PlotState {
                columns,
                scales,
                panels,
                highlights,
            },
        )
    }

    fn iris() -> Vec<Vec<String>> {
        vec![
            strings(&["3.5", "1.4", "0.2", "a"]),
            strings(&["3.0", "4.5", "1.5", "b"]),
        ]
    }

    #[test]
    fn test_one_point_per_row_per_panel() {
        let (data, plot) = make_plot(iris());
        let scene = compile_scene(&data, &plot, None, GEOMETRY, &RenderOptions::default());
        assert_eq!(scene.panels.len(), 2);
        for panel in &scene.panels {
            assert_eq!(panel.points().count(), 2);
        }
    }

    #[test]
    fn test_points_use_group_class() {
        let (data, plot) = make_plot(iris());
        let scene = compile_scene(&data, &plot, None, GEOMETRY, &RenderOptions::default());
        let classes: Vec<_> = scene.panels[0]
            .points()
            .map(|c| match c {
                DrawCommand::Point { class, .. } => *class,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(classes, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_nan_point_is_invisible_at_origin() {
        let mut rows = iris();
        rows[0][0] = "NA".to_string();
        let (data, plot) = make_plot(rows);
        let scene = compile_scene(&data, &plot, None, GEOMETRY, &RenderOptions::default());
        let origin = (50.0, 10.0);
        let first = scene.panels[1].points().next().cloned();
        match first {
            Some(DrawCommand::Point { radius, center, .. }) => {
                assert_eq!(radius, 0.0);
                assert_eq!(center, (origin.0 + 140.0, origin.1));
            }
            other => panic!("expected point, got {:?}", other),
        }
    }

    #[test]
    fn test_legend_entries() {
        let (data, plot) = make_plot(iris());
        let scene = compile_scene(&data, &plot, None, GEOMETRY, &RenderOptions::default());
        let swatches = scene
            .decorations
            .iter()
            .filter(|c| matches!(c, DrawCommand::Swatch { .. }))
            .count();
        assert_eq!(swatches, 2);
        assert!(scene.decorations.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == "pw"
        )));
    }

    #[test]
    fn test_brush_drawn_on_active_panel_only() {
        let (data, plot) = make_plot(iris());
        let rect = PixelRect::new((60.0, 80.0), (20.0, 30.0));
        let active = plot.panels[1].clone();
        let scene = compile_scene(
            &data,
            &plot,
            Some((&active, rect)),
            GEOMETRY,
            &RenderOptions::default(),
        );
        let has_brush = |p: &PanelScene| p.commands.iter().any(|c| matches!(c, DrawCommand::Brush { .. }));
        assert!(!has_brush(&scene.panels[0]));
        assert!(has_brush(&scene.panels[1]));
        // Drawn from the normalised drag, offset into the second panel
        assert!(scene.panels[1].commands.contains(&DrawCommand::Brush {
            tl: (210.0, 40.0),
            br: (250.0, 90.0),
        }));
    }

    #[test]
    fn test_format_tick() {
        assert_eq!(format_tick(2.0), "2");
        assert_eq!(format_tick(0.30000000000000004), "0.3");
        assert_eq!(format_tick(-1.5), "-1.5");
    }
}
