//! Parser frontend: turns raw CSS/SCSS text into the owned syntax tree
//! consumed by the lint rules.

pub mod blaze_scss;

pub use blaze_scss::parse_stylesheet;
