// Domain layer - Core models with no I/O
pub mod analysis;
pub mod chart_image;
pub mod check;
pub mod series;
pub mod table;
