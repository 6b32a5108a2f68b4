// aquarisk/src/commands/mod.rs

pub mod init;
pub mod inspect;
pub mod run;
