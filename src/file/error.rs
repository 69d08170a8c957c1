use thiserror::Error;

use super::PageId;

#[derive(Debug, Error)]
pub enum PageFileError {
    #[error("File unavailable: {0}")]
    FileUnavailable(String),

    #[error("File handle not initialized")]
    HandleNotInitialized,

    #[error("Page out of range: page_id={0}")]
    PageOutOfRange(PageId),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}

pub type PageFileResult<T> = Result<T, PageFileError>;
