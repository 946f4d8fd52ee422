//! Journals sub-client — live headline and journal feeds.

use crate::client::{BinpClient, Feed};
use crate::domain::journal::{Headline, Journal};
use crate::error::SdkError;
use crate::network::INTERNAL_PREFIX;
use crate::shared::JournalId;

pub struct Journals<'a> {
    pub(crate) client: &'a BinpClient,
}

impl<'a> Journals<'a> {
    /// Headlines of every journal as operations start and finish.
    pub fn headlines(&self) -> Result<Feed<Headline>, SdkError> {
        self.client
            .feed(&format!("{}/journals/updates", INTERNAL_PREFIX))
    }

    /// The full journal `id`, re-sent whenever a record is added.
    pub fn updates(&self, id: JournalId) -> Result<Feed<Journal>, SdkError> {
        self.client
            .feed(&format!("{}/journal/{}/updates", INTERNAL_PREFIX, id))
    }
}

#[cfg(test)]
mod tests {
    use crate::client::BinpClient;
    use crate::network::Deployment;
    use crate::shared::JournalId;

    #[test]
    fn test_feed_addresses() {
        let client = BinpClient::builder()
            .deployment(Deployment::Development)
            .build()
            .unwrap();
        assert_eq!(
            client.journals().headlines().unwrap().url().as_str(),
            "ws://localhost:8000/internal/journals/updates"
        );
        assert_eq!(
            client.journals().updates(JournalId::new(12)).unwrap().url().as_str(),
            "ws://localhost:8000/internal/journal/12/updates"
        );
    }
}
