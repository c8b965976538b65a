use derive_more::Display;

/// Simplified error system - no over-engineering!
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AppError {
    #[display(fmt = "Network Error: {}", _0)]
    Network(String),
    #[display(fmt = "HTTP Error: {} {}", status, status_text)]
    Http { status: u16, status_text: String },
    #[display(fmt = "Parse Error: {}", _0)]
    Parse(String),
    #[display(fmt = "Validation Error: {}", _0)]
    Validation(String),
    #[display(fmt = "Rendering Error: {}", _0)]
    Rendering(String),
    #[display(fmt = "Configuration Error: {}", _0)]
    Configuration(String),
}

impl std::error::Error for AppError {}

impl AppError {
    /// Short label for the status line.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Network(_) | AppError::Http { .. } => "network",
            AppError::Parse(_) => "parse",
            AppError::Validation(_) => "validation",
            AppError::Rendering(_) => "rendering",
            AppError::Configuration(_) => "configuration",
        }
    }

    /// Wrap a JS exception from a web-sys call.
    pub fn rendering_from_js(context: &str, value: wasm_bindgen::JsValue) -> Self {
        let detail = value.as_string().unwrap_or_else(|| format!("{:?}", value));
        AppError::Rendering(format!("{}: {}", context, detail))
    }
}

pub type NetworkResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
