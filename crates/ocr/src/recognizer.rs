use thiserror::Error;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Image could not be read: {0}")]
    Unreadable(String),
    #[error("OCR engine failed: {0}")]
    Engine(String),
    #[error("No OCR engine in this build; enable the `tesseract` feature")]
    NotAvailable,
}

/// Turns an order scan (PNG/JPEG bytes) into plain text, one table row per line.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

/// Ignores the image and yields fixed text. Used when the caller already
/// holds OCR output.
pub struct PresetText(pub String);

impl PresetText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

impl OcrBackend for PresetText {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.0.clone())
    }
}

/// Every call fails with [`OcrError::NotAvailable`].
pub struct NoEngine;

impl OcrBackend for NoEngine {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable)
    }
}

#[cfg(feature = "tesseract")]
pub fn default_backend() -> Box<dyn OcrBackend> {
    Box::new(tesseract::Tesseract::english())
}

#[cfg(not(feature = "tesseract"))]
pub fn default_backend() -> Box<dyn OcrBackend> {
    Box::new(NoEngine)
}

#[cfg(feature = "tesseract")]
pub mod tesseract {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// Tesseract via leptess. A fresh engine per call keeps the backend `Sync`.
    pub struct Tesseract {
        pub tessdata: Option<String>,
        pub lang: String,
    }

    impl Tesseract {
        pub fn english() -> Self {
            Self { tessdata: None, lang: "eng".to_string() }
        }
    }

    impl OcrBackend for Tesseract {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut engine = LepTess::new(self.tessdata.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(e.to_string()))?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::Unreadable(e.to_string()))?;
            engine
                .get_utf8_text()
                .map_err(|e| OcrError::Engine(e.to_string()))
        }
    }
}
