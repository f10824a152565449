pub mod cycles;
pub mod extrema;
