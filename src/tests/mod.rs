pub mod common;

mod pagination;
