pub mod method;
pub mod path;
