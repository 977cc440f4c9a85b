// fwsync-api: HTTP transport for fwsync (IP list fetching + firewall REST binding)

pub mod error;
pub mod firewall;
pub mod iplist;
pub mod models;
pub mod transport;

pub use error::Error;
pub use firewall::FirewallClient;
pub use iplist::IpListClient;
pub use transport::{TlsMode, TransportConfig};
