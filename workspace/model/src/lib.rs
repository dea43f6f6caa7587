pub mod entities;
pub mod lists;
