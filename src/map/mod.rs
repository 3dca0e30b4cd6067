mod basemap;
mod figure;
mod geometry;
mod land;
mod projection;
mod renderer;
mod style;

pub use basemap::{Basemap, LineString};
pub use figure::{figure_title, Figure, FigureSize, FIGURE_ASPECT};
pub use land::LandMask;
pub use projection::{miller_forward, miller_inverse, Viewport};
pub use renderer::{MapRenderer, DEFAULT_MARKER_ALPHA};
pub use style::MapStyle;
