//! Rasterizing the pixel grid onto a host surface.
//!
//! The driver doesn't know any GUI toolkit. It draws onto a [`Surface`];
//! hosts either implement it directly or replay a recorded [`DrawList`].

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::constants::{CELL_SIZE, GRID_HEIGHT, GRID_WIDTH, MAX_CELL_SIZE};
use crate::framebuffer;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct InvalidColor(String);

/// 24 bit RGB, written as `#rrggbb` in config files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Color {
    type Err = InvalidColor;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidColor(text.to_owned());
        let hex = text.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |at: usize| u8::from_str_radix(&hex[at..at + 2], 16).map_err(|_| invalid());
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// The three colors a frame is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub on: Color,
    pub off: Color,
    pub grid: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            on: Color::rgb(0x48, 0xff, 0x00),
            off: Color::rgb(0x00, 0x00, 0x00),
            grid: Color::rgb(0xcc, 0xcc, 0xcc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A 2D raster target
pub trait Surface {
    /// One host pixel wide line
    fn line(&mut self, from: Point, to: Point, color: Color);

    fn fill_rect(&mut self, origin: Point, side: f32, color: Color);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Line { from: Point, to: Point, color: Color },
    FillRect { origin: Point, side: f32, color: Color },
}

/// A surface that only remembers what was drawn on it
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Draws every recorded command onto `surface`, in order
    pub fn replay(&self, surface: &mut dyn Surface) {
        for command in &self.commands {
            match *command {
                DrawCommand::Line { from, to, color } => surface.line(from, to, color),
                DrawCommand::FillRect { origin, side, color } => {
                    surface.fill_rect(origin, side, color)
                }
            }
        }
    }
}

impl Surface for DrawList {
    fn line(&mut self, from: Point, to: Point, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn fill_rect(&mut self, origin: Point, side: f32, color: Color) {
        self.commands
            .push(DrawCommand::FillRect { origin, side, color });
    }
}

/// Geometry of the host surface: cells of `cell_size` separated by one pixel grid lines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Raster {
    pub cell_size: u32,
    pub palette: Palette,
}

impl Default for Raster {
    fn default() -> Self {
        Self::new(CELL_SIZE, Palette::default())
    }
}

impl Raster {
    /// `cell_size` is clamped to `1..=MAX_CELL_SIZE`
    pub fn new(cell_size: u32, palette: Palette) -> Self {
        Self {
            cell_size: cell_size.clamp(1, MAX_CELL_SIZE),
            palette,
        }
    }

    fn pitch(&self) -> f32 {
        (self.cell_size + 1) as f32
    }

    /// Width and height of the surface in host pixels
    pub fn surface_size(&self) -> (u32, u32) {
        let pitch = self.cell_size + 1;
        (pitch * GRID_WIDTH as u32 + 1, pitch * GRID_HEIGHT as u32 + 1)
    }

    /// `GRID_WIDTH + 1` vertical and `GRID_HEIGHT + 1` horizontal lines
    pub fn draw_grid(&self, surface: &mut dyn Surface) {
        let (width, height) = self.surface_size();
        let (width, height) = (width as f32, height as f32);
        let pitch = self.pitch();

        for i in 0..=GRID_WIDTH {
            let x = i as f32 * pitch + 0.5;
            surface.line(Point::new(x, 0.0), Point::new(x, height), self.palette.grid);
        }
        for j in 0..=GRID_HEIGHT {
            let y = j as f32 * pitch + 0.5;
            surface.line(Point::new(0.0, y), Point::new(width, y), self.palette.grid);
        }
    }

    /// One filled square per cell of `pixels`
    pub fn draw_cells(&self, pixels: &[u8], surface: &mut dyn Surface) {
        let pitch = self.pitch();
        let side = self.cell_size as f32;

        for cell in framebuffer::decode(pixels) {
            let origin = Point::new(
                cell.column as f32 * pitch + 1.0,
                cell.row as f32 * pitch + 1.0,
            );
            let color = if cell.on {
                self.palette.on
            } else {
                self.palette.off
            };
            surface.fill_rect(origin, side, color);
        }
    }

    /// A full repaint: grid overlay first, then every cell
    pub fn draw_frame(&self, pixels: &[u8], surface: &mut dyn Surface) {
        self.draw_grid(surface);
        self.draw_cells(pixels, surface);
    }
}
