pub mod config_service;
pub mod docx;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::docx::{DocxBuilder, DocxPackage};
pub use crate::paths::DocfillPaths;
