pub mod svg;
pub mod traits;

pub use self::svg::Svg;
pub use self::traits::Render;
