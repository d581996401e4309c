mod cdp_session;
mod chrome_finder;
mod error;
mod launcher;
mod profile;

pub use cdp_session::CdpSession;
pub use chrome_finder::ChromeFinder;
pub use error::{Error, Result};
pub use launcher::ChromeLauncher;
pub use profile::ProfileManager;
