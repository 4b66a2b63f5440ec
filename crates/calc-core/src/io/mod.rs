//! IO modules - side effects (network, filesystem, processes)

pub mod download;
pub mod install;
pub mod validate;

pub use download::{Download, DownloadError};
pub use install::{AcquisitionError, InstallOptions, InstallReport, Installer};
pub use validate::{ContentType, ExecutableFormat};
