//! API client adapter traits
//!
//! The HTTP client and resource model live outside this crate. Commands
//! reach them through these traits only.

use crate::cli::error::{CliError, CliResult};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Parsed `--filter key:value` pairs passed to list endpoints
pub type ListFilter = BTreeMap<String, String>;

/// Endpoints the command layer knows how to address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointName {
    App,
    Cloud,
    CloudAccount,
    Package,
}

impl fmt::Display for EndpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EndpointName::App => "App",
            EndpointName::Cloud => "Cloud",
            EndpointName::CloudAccount => "CloudAccount",
            EndpointName::Package => "Package",
        };
        f.write_str(name)
    }
}

/// A structured object returned by an endpoint
pub trait Resource {
    /// Numeric id of the resource, if it has one
    fn id(&self) -> Option<i64>;

    /// Read a single field
    fn get(&self, field: &str) -> Option<Value>;

    /// Structured representation.
    ///
    /// With `deep`, related resources are expanded into nested objects
    /// instead of being left as ids.
    fn to_value(&self, deep: bool) -> Value;
}

/// Remote state of a long-running operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteState {
    Pending,
    Complete,
    Failed(String),
}

impl RemoteState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RemoteState::Pending)
    }
}

/// A resource whose server-side operation finishes some time after creation
pub trait AsyncResource: Resource {
    /// Re-read the resource from the API
    fn refresh(&mut self) -> CliResult<()>;

    /// State as of the last refresh
    fn state(&self) -> RemoteState;
}

/// A cloud account backup
pub trait Backup: AsyncResource {
    fn filename(&self) -> String;

    /// Id of the owning cloud account
    fn cloud_account_id(&self) -> i64;

    /// Download the backup file into `dir`, returning the written path
    fn download(&self, dir: &Path) -> CliResult<PathBuf>;
}

impl<T: Resource + ?Sized> Resource for Box<T> {
    fn id(&self) -> Option<i64> {
        (**self).id()
    }

    fn get(&self, field: &str) -> Option<Value> {
        (**self).get(field)
    }

    fn to_value(&self, deep: bool) -> Value {
        (**self).to_value(deep)
    }
}

impl<T: AsyncResource + ?Sized> AsyncResource for Box<T> {
    fn refresh(&mut self) -> CliResult<()> {
        (**self).refresh()
    }

    fn state(&self) -> RemoteState {
        (**self).state()
    }
}

impl<T: Backup + ?Sized> Backup for Box<T> {
    fn filename(&self) -> String {
        (**self).filename()
    }

    fn cloud_account_id(&self) -> i64 {
        (**self).cloud_account_id()
    }

    fn download(&self, dir: &Path) -> CliResult<PathBuf> {
        (**self).download(dir)
    }
}

/// An ordered list of resources returned by `Endpoint::list`
#[derive(Default)]
pub struct ResourceCollection {
    items: Vec<Box<dyn Resource>>,
}

impl ResourceCollection {
    pub fn new(items: Vec<Box<dyn Resource>>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Resource> {
        self.items.iter().map(|r| r.as_ref())
    }

    /// Array of each item's structured representation
    pub fn to_value(&self, deep: bool) -> Value {
        Value::Array(self.items.iter().map(|r| r.to_value(deep)).collect())
    }
}

/// Read (and optionally create) access to one resource domain
pub trait Endpoint {
    fn name(&self) -> EndpointName;

    fn retrieve(&self, id: i64) -> CliResult<Box<dyn Resource>>;

    fn list(&self, filter: &ListFilter) -> CliResult<ResourceCollection>;

    /// Create a resource from resolved input fields
    fn create(&self, _fields: &Map<String, Value>) -> CliResult<Box<dyn Resource>> {
        Err(CliError::Unsupported(format!(
            "{} endpoint cannot create resources",
            self.name()
        )))
    }
}

/// Cloud account actions beyond plain reads
pub trait CloudAccountEndpoint: Endpoint {
    /// Start a backup of the account
    fn create_backup(&self, cloud_account_id: i64) -> CliResult<Box<dyn Backup>>;

    fn backups(&self, cloud_account_id: i64) -> CliResult<Vec<Box<dyn Backup>>>;
}

/// Entry point to the remote API
pub trait ApiClient {
    fn endpoint(&self, name: EndpointName) -> CliResult<&dyn Endpoint>;

    fn cloud_accounts(&self) -> CliResult<&dyn CloudAccountEndpoint>;
}
