pub mod entity;
pub mod geometry;
pub mod palette;
pub mod physics;
