use crate::error::DrawError;
use crate::ir::{DrawCommand, SceneGraph, TextAnchor};
use crate::palette::{ColorPalette, BRUSH, INK};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

/// Executes a scene graph on a plotters backend.
pub struct Canvas {
    palette: ColorPalette,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(ColorPalette::default())
    }
}

impl Canvas {
    pub fn new(palette: ColorPalette) -> Self {
        Self { palette }
    }

    /// Rasterise the scene and encode it as PNG
    pub fn render_png(&self, scene: &SceneGraph) -> Result<Vec<u8>, DrawError> {
        let (width, height) = (scene.width.max(1), scene.height.max(1));
        let mut buffer = vec![0u8; (width * height * 3) as usize];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            self.paint(&root, scene)?;
        }

        let mut png_bytes = Vec::new();
        {
            let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
            encoder
                .write_image(&buffer, width, height, image::ColorType::Rgb8)
                .map_err(|e| DrawError::Render(format!("failed to encode PNG: {}", e)))?;
        }

        Ok(png_bytes)
    }

    /// Render the scene as an SVG document
    pub fn render_svg(&self, scene: &SceneGraph) -> Result<String, DrawError> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (scene.width.max(1), scene.height.max(1)))
                .into_drawing_area();
            self.paint(&root, scene)?;
        }
        Ok(svg)
    }

    fn paint<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        scene: &SceneGraph,
    ) -> Result<(), DrawError> {
        root.fill(&WHITE).map_err(render_err)?;

        // Axes and legend under the points
        for command in &scene.decorations {
            self.draw_command(root, command)?;
        }
        for panel in &scene.panels {
            for command in &panel.commands {
                self.draw_command(root, command)?;
            }
        }

        root.present().map_err(render_err)
    }

    fn draw_command<DB: DrawingBackend>(
        &self,
        root: &DrawingArea<DB, Shift>,
        command: &DrawCommand,
    ) -> Result<(), DrawError> {
        match command {
            DrawCommand::Frame { tl, br } => root
                .draw(&Rectangle::new([px(*tl), px(*br)], INK.stroke_width(1)))
                .map_err(render_err),
            DrawCommand::Point {
                center,
                radius,
                class,
                ..
            } => {
                // Unplottable rows stay invisible
                if *radius <= 0.0 {
                    return Ok(());
                }
                let color = self.palette.class(*class);
                root.draw(&Circle::new(px(*center), radius.round() as i32, color.filled()))
                    .map_err(render_err)
            }
            DrawCommand::Line { points } => root
                .draw(&PathElement::new(
                    points.iter().copied().map(px).collect::<Vec<_>>(),
                    INK.mix(0.15).stroke_width(1),
                ))
                .map_err(render_err),
            DrawCommand::Text {
                pos,
                text,
                anchor,
                size,
            } => {
                let h_pos = match anchor {
                    TextAnchor::Start => HPos::Left,
                    TextAnchor::Middle => HPos::Center,
                    TextAnchor::End => HPos::Right,
                };
                let style = TextStyle::from(("sans-serif", *size).into_font())
                    .color(&INK)
                    .pos(Pos::new(h_pos, VPos::Center));
                root.draw(&Text::new(text.clone(), px(*pos), style))
                    .map_err(render_err)
            }
            DrawCommand::Swatch {
                center,
                radius,
                class,
            } => {
                let color = self.palette.group(*class);
                root.draw(&Circle::new(px(*center), radius.round() as i32, color.filled()))
                    .map_err(render_err)
            }
            DrawCommand::Brush { tl, br } => {
                root.draw(&Rectangle::new([px(*tl), px(*br)], BRUSH.mix(0.125).filled()))
                    .map_err(render_err)?;
                root.draw(&Rectangle::new([px(*tl), px(*br)], WHITE.stroke_width(1)))
                    .map_err(render_err)
            }
        }
    }
}

fn px((x, y): (f64, f64)) -> (i32, i32) {
    (x.round() as i32, y.round() as i32)
}

fn render_err<E: std::fmt::Display>(e: E) -> DrawError {
    DrawError::Render(e.to_string())
}
