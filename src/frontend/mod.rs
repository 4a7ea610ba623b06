pub mod console;

pub use console::{ConsoleApplication, ConsoleShell, Prompt};
