use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Announce events. Described on the
/// [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html)
#[derive(Hash, Clone, Copy, Debug, Display, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AnnounceEvent {
    /// The peer has started downloading the torrent.
    #[display("started")]
    Started,
    /// The peer has ceased downloading the torrent.
    #[display("stopped")]
    Stopped,
    /// The peer has completed downloading the torrent.
    #[display("completed")]
    Completed,
    /// This is one of the announcements done at regular intervals.
    #[display("")]
    None,
}

impl AnnounceEvent {
    /// Parses the `event` announce query param. An absent, empty or unknown
    /// value is treated as a regular interval announce.
    #[must_use]
    pub fn from_query_param(raw: &str) -> Self {
        match raw {
            "started" => Self::Started,
            "stopped" => Self::Stopped,
            "completed" => Self::Completed,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::AnnounceEvent;

    #[test]
    fn it_should_parse_the_standard_event_values() {
        assert_eq!(AnnounceEvent::from_query_param("started"), AnnounceEvent::Started);
        assert_eq!(AnnounceEvent::from_query_param("stopped"), AnnounceEvent::Stopped);
        assert_eq!(AnnounceEvent::from_query_param("completed"), AnnounceEvent::Completed);
    }

    #[test]
    fn it_should_treat_unknown_values_as_a_regular_announce() {
        assert_eq!(AnnounceEvent::from_query_param(""), AnnounceEvent::None);
        assert_eq!(AnnounceEvent::from_query_param("paused"), AnnounceEvent::None);
    }
}
