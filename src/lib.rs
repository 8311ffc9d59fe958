pub mod datatypes;
pub mod modules;
pub mod util;
