pub mod datetime;
pub mod url;
