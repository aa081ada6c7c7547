pub mod echo;
pub mod flood;
