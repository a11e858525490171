pub mod catalog;
pub mod review;
