//! SVG tool path render
//!
//! Z runs to the right, X is drawn as a radius upwards from the spindle axis.

use super::traits::{MotionKind, Point, Render};
use std::{
    fmt,
    fs::File,
    io::{Error, Write},
    path::{Path, PathBuf},
};

const MARGIN: f64 = 5.0;

#[derive(Debug)]
pub struct Svg {
    svg_file: PathBuf,
    items: Vec<DrawingItem>,
    current: Option<DrawingItem>,
    contact: Vec<PathEl>,
    position: Option<Point>,
    bounds: Option<(Point, Point)>,
}

impl Svg {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            svg_file: path.as_ref().to_owned(),
            items: Vec::new(),
            current: None,
            contact: Vec::new(),
            position: None,
            bounds: None,
        }
    }

    fn prepare(&mut self, ty: MotionKind) -> &mut DrawingItem {
        let start = self.position;
        match self.current.take() {
            Some(cur) if cur.ty == ty => self.current = Some(cur),
            prev => {
                self.items.extend(prev);
                self.current = Some(DrawingItem {
                    ty,
                    path: start.into_iter().map(PathEl::Move).collect(),
                });
            }
        }
        self.current.get_or_insert_with(|| DrawingItem {
            ty,
            path: Vec::new(),
        })
    }

    fn grow(&mut self, p: Point) {
        let (lo, hi) = self.bounds.get_or_insert((p, p));
        lo.x = lo.x.min(p.x);
        lo.z = lo.z.min(p.z);
        hi.x = hi.x.max(p.x);
        hi.z = hi.z.max(p.z);
    }

    /// Write the drawing to any sink
    pub fn write_to(mut self, fd: impl Write) -> Result<(), Error> {
        if let Some(cur) = self.current.take() {
            self.items.push(cur);
        }
        write_svg(fd, &self.items, &self.contact, self.bounds)
    }
}

impl Render for Svg {
    fn move_to(&mut self, point: Point) {
        self.grow(point);
        if let Some(cur) = self.current.take() {
            self.items.push(cur);
        }
        self.position = Some(point);
    }

    fn line_to(&mut self, point: Point, contact: Option<Point>, ty: MotionKind) {
        self.grow(point);
        let old_pos = self.position;
        let it = self.prepare(ty);
        if old_pos != Some(point) {
            it.path.push(if it.path.is_empty() {
                PathEl::Move(point)
            } else {
                PathEl::Line(point)
            });
        }
        self.position = Some(point);

        if let Some(c) = contact {
            self.grow(c);
            self.contact.push(if self.contact.is_empty() {
                PathEl::Move(c)
            } else {
                PathEl::Line(c)
            });
        }
    }

    fn finalize(self: Box<Self>) -> Result<(), Error> {
        let fd = File::create(&self.svg_file)?;
        (*self).write_to(fd)
    }
}

#[derive(Debug, Clone, Copy)]
enum PathEl {
    Move(Point),
    Line(Point),
}

impl fmt::Display for PathEl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (cmd, p) = match self {
            PathEl::Move(p) => ('M', p),
            PathEl::Line(p) => ('L', p),
        };
        write!(f, "{cmd}{:.3} {:.3}", p.z, -p.x / 2.0)
    }
}

#[derive(Debug)]
struct DrawingItem {
    ty: MotionKind,
    path: Vec<PathEl>,
}

fn write_svg(
    mut fd: impl Write,
    items: &[DrawingItem],
    contact: &[PathEl],
    bounds: Option<(Point, Point)>,
) -> Result<(), Error> {
    let (lo, hi) = bounds.unwrap_or_default();
    let left = lo.z - MARGIN;
    let top = -hi.x / 2.0 - MARGIN;
    let width = hi.z - lo.z + 2.0 * MARGIN;
    let height = (hi.x - lo.x) / 2.0 + 2.0 * MARGIN;
    writeln!(fd, "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.3}mm\" height=\"{height:.3}mm\" viewBox=\"{left:.3} {top:.3} {width:.3} {height:.3}\">")?;

    // Spindle axis
    writeln!(fd, "<line x1=\"{left:.3}\" y1=\"0\" x2=\"{:.3}\" y2=\"0\" stroke=\"grey\" stroke-width=\"0.2\" stroke-dasharray=\"4 1 1 1\"/>", left + width)?;

    for item in items.iter().filter(|i| i.path.len() > 1) {
        let (color, opacity) = match item.ty {
            MotionKind::Rapid => ("blue", 0.3),
            MotionKind::Cut => ("green", 0.9),
        };
        write!(fd, "<path fill=\"none\" stroke=\"{color}\" stroke-width=\"0.3\" stroke-opacity=\"{opacity}\" d=\"")?;
        for el in &item.path {
            write!(fd, "{el}")?;
        }
        writeln!(fd, "\" stroke-linecap=\"round\" stroke-linejoin=\"round\"/>")?;
    }

    if contact.len() > 1 {
        write!(fd, "<path fill=\"none\" stroke=\"red\" stroke-width=\"0.2\" stroke-dasharray=\"1 1\" d=\"")?;
        for el in contact {
            write!(fd, "{el}")?;
        }
        writeln!(fd, "\"/>")?;
    }

    writeln!(fd, "</svg>")
}

#[cfg(test)]
mod tests {
    use super::Svg;
    use crate::{gcode::parse, machine::interpret, render::Render, MachineConfig};

    fn render(program: &str) -> String {
        let cfg = MachineConfig::default();
        let r = interpret(&parse(program), usize::MAX, &cfg.tools, cfg.home).unwrap();
        let mut svg = Svg::new("unused.svg");
        svg.draw_path(cfg.home.into(), &r.state.path);
        let mut out = Vec::new();
        svg.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn rapid_and_cut_paths() {
        let s = render("G0 X40 Z2\nG1 Z-20\nG0 X100 Z50");
        assert!(s.starts_with("<svg"));
        assert_eq!(s.matches("stroke=\"blue\"").count(), 2);
        assert_eq!(s.matches("stroke=\"green\"").count(), 1);
        assert!(s.contains("M2.000 -20.000L-20.000 -20.000"));
        assert!(!s.contains("stroke=\"red\""));
        assert!(s.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn compensated_overlay() {
        let s = render("G0 X40 Z2\nG42\nG1 Z-20\nG1 X60");
        assert!(s.contains("stroke=\"red\""));
    }
}
