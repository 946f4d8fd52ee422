//! Services sub-client — live service status feed.

use crate::client::{BinpClient, Feed};
use crate::domain::service::Info;
use crate::error::SdkError;
use crate::network::INTERNAL_PREFIX;

pub struct Services<'a> {
    pub(crate) client: &'a BinpClient,
}

impl<'a> Services<'a> {
    /// Info of a service every time its status changes.
    pub fn updates(&self) -> Result<Feed<Info>, SdkError> {
        self.client
            .feed(&format!("{}/services/updates", INTERNAL_PREFIX))
    }
}
