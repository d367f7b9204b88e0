pub mod join;
pub mod output;
pub mod project;
pub mod table;

pub use join::{forward_fill, join, left_join};
pub use output::{save_csv, write_csv_to};
pub use project::project;
pub use table::{Row, Table};
