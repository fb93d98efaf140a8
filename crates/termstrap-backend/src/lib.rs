mod detection;
mod error;
mod installers;
mod probe;
mod traits;

pub use detection::{RendererDetection, detect_renderer};
pub use error::BackendError;
pub use installers::{ScriptInstaller, SystemInstaller};
pub use probe::{InstallerOptions, install_with_fallback, probe_order, usable_installers};
pub use traits::{ManagerKind, Package, PackageInstaller};
