pub mod header;
pub mod range_bar;
