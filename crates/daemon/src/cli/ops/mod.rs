pub mod daemon;
pub mod fetch;
pub mod health;
pub mod init;
pub mod list;
pub mod login;
pub mod upload;
pub mod version;
pub mod whoami;

pub use daemon::Daemon;
pub use fetch::Fetch;
pub use health::Health;
pub use init::Init;
pub use list::List;
pub use login::Login;
pub use upload::Upload;
pub use version::Version;
pub use whoami::Whoami;
