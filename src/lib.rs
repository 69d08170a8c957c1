pub mod file;

pub use file::{PAGE_SIZE, PageBuffer, PageFile, PageFileError, PageFileResult, PageId};
