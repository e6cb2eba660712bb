pub mod expand;
pub mod run;
