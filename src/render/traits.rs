//! Rendering traits

pub use crate::machine::{MotionKind, PathPoint, Point};
use std::{fmt::Debug, io::Error};

pub trait Render: Debug {
    fn move_to(&mut self, point: Point);
    fn line_to(&mut self, point: Point, contact: Option<Point>, ty: MotionKind);

    fn finalize(self: Box<Self>) -> Result<(), Error>;

    /// Draw a whole tool path starting at `start`
    fn draw_path(&mut self, start: Point, path: &[PathPoint]) {
        self.move_to(start);
        for p in path {
            let contact = p.compensated.then(|| p.contact());
            self.line_to(p.point(), contact, p.motion);
        }
    }
}
