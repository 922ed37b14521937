//! sshgen-netbox: typed, read-only Netbox client
//!
//! Covers the three list endpoints the generator needs (devices, virtual
//! machines, services), with tag/status filters and lazy pagination.
//!
//! # Example
//!
//! ```no_run
//! use futures::TryStreamExt;
//! use sshgen_netbox::{HostRecord, NetboxClient, ObjectClass, Query, paginate};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = NetboxClient::new(
//!     "https://netbox.example.com",
//!     "0123abcd",
//!     sshgen_netbox::DEFAULT_TIMEOUT,
//! )?;
//! let query = Query::new(ObjectClass::Device).tag("gen_ssh_config");
//!
//! let mut devices = std::pin::pin!(paginate::<HostRecord, _>(&client, &query, 100));
//! while let Some(device) = devices.try_next().await? {
//!     println!("{:?} {:?}", device.name, device.primary_address());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http;
pub mod pager;
pub mod query;
pub mod traits;
pub mod types;

pub use error::{NetboxError, Result};
pub use http::{DEFAULT_TIMEOUT, NetboxClient};
pub use pager::{DEFAULT_PAGE_SIZE, paginate};
pub use query::{ObjectClass, Query};
pub use traits::InventoryApi;
pub use types::{Choice, HostRecord, IpAddressRef, ObjectRef, Page, ParentKind, ServiceRecord};
