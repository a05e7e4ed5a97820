pub mod help;
pub mod parallax;
