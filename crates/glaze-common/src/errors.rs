#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("UI event loop closed")]
    Closed,

    #[error("webview instance destroyed")]
    Destroyed,

    #[error("operation must run on the UI thread")]
    NotUiThread,
}

#[derive(Debug, thiserror::Error)]
pub enum WebViewError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
