pub mod extraction;
pub mod ocr;
pub mod processor;
