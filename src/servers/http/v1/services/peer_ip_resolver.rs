//! This service resolves the peer IP from the request.
//!
//! The peer IP is used to identify the peer in the tracker: together with
//! the announced port it forms the peer key, and it's the IP published in
//! the `announce` responses (peer list).
//!
//! Given this request chain:
//!
//! ```text
//! client          <-> http proxy 1                 <-> server
//! ip: 126.0.0.1       ip: 126.0.0.2                    ip: 126.0.0.3
//!                     X-Forwarded-For: 126.0.0.1
//! ```
//!
//! a tracker deployed behind the reverse proxy must use the right-most
//! `X-Forwarded-For` IP (`126.0.0.1`), while a directly exposed tracker
//! must use the connection info IP. The proxy-supplied header is preferred
//! when the tracker is configured as being behind a reverse proxy, falling
//! back to the connection address when the header is missing.
use std::net::IpAddr;
use std::panic::Location;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// This struct contains the sources from which the peer IP can be obtained.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone)]
pub struct ClientIpSources {
    /// The right most IP from the `X-Forwarded-For` HTTP header.
    pub right_most_x_forwarded_for: Option<IpAddr>,
    /// The IP from the connection info.
    pub connection_info_ip: Option<IpAddr>,
}

/// The error that can occur when resolving the peer IP.
#[derive(Error, Debug)]
pub enum PeerIpResolutionError {
    /// The peer IP cannot be obtained because neither the `X-Forwarded-For`
    /// header nor the connection info were available.
    #[error("cannot get the client IP from the request in {location}")]
    MissingClientIp { location: &'static Location<'static> },
}

/// Resolves the peer IP from the request sources according to the tracker
/// configuration.
///
/// # Errors
///
/// Will return an error if no source provided an IP, which means the Axum
/// route was built without connection info.
pub fn invoke(on_reverse_proxy: bool, client_ip_sources: &ClientIpSources) -> Result<IpAddr, PeerIpResolutionError> {
    let preferred = if on_reverse_proxy {
        client_ip_sources
            .right_most_x_forwarded_for
            .or(client_ip_sources.connection_info_ip)
    } else {
        client_ip_sources.connection_info_ip
    };

    preferred.ok_or(PeerIpResolutionError::MissingClientIp {
        location: Location::caller(),
    })
}

#[cfg(test)]
mod tests {
    use std::net::IpAddr;
    use std::str::FromStr;

    use super::{invoke, ClientIpSources, PeerIpResolutionError};

    mod working_without_reverse_proxy {
        use super::{invoke, ClientIpSources, IpAddr, FromStr, PeerIpResolutionError};

        #[test]
        fn it_should_get_the_peer_ip_from_the_connection_info() {
            let ip = invoke(
                false,
                &ClientIpSources {
                    right_most_x_forwarded_for: None,
                    connection_info_ip: Some(IpAddr::from_str("203.0.113.195").unwrap()),
                },
            )
            .unwrap();

            assert_eq!(ip, IpAddr::from_str("203.0.113.195").unwrap());
        }

        #[test]
        fn it_should_ignore_the_x_forwarded_for_header() {
            let ip = invoke(
                false,
                &ClientIpSources {
                    right_most_x_forwarded_for: Some(IpAddr::from_str("203.0.113.1").unwrap()),
                    connection_info_ip: Some(IpAddr::from_str("203.0.113.195").unwrap()),
                },
            )
            .unwrap();

            assert_eq!(ip, IpAddr::from_str("203.0.113.195").unwrap());
        }

        #[test]
        fn it_should_return_an_error_if_it_cannot_get_the_peer_ip_from_the_connection_info() {
            let error = invoke(
                false,
                &ClientIpSources {
                    right_most_x_forwarded_for: None,
                    connection_info_ip: None,
                },
            )
            .unwrap_err();

            assert!(matches!(error, PeerIpResolutionError::MissingClientIp { .. }));
        }
    }

    mod working_on_reverse_proxy {
        use super::{invoke, ClientIpSources, IpAddr, FromStr};

        #[test]
        fn it_should_get_the_peer_ip_from_the_right_most_ip_in_the_x_forwarded_for_header() {
            let ip = invoke(
                true,
                &ClientIpSources {
                    right_most_x_forwarded_for: Some(IpAddr::from_str("203.0.113.195").unwrap()),
                    connection_info_ip: Some(IpAddr::from_str("126.0.0.2").unwrap()),
                },
            )
            .unwrap();

            assert_eq!(ip, IpAddr::from_str("203.0.113.195").unwrap());
        }

        #[test]
        fn it_should_fall_back_to_the_connection_info_when_the_header_is_missing() {
            let ip = invoke(
                true,
                &ClientIpSources {
                    right_most_x_forwarded_for: None,
                    connection_info_ip: Some(IpAddr::from_str("126.0.0.2").unwrap()),
                },
            )
            .unwrap();

            assert_eq!(ip, IpAddr::from_str("126.0.0.2").unwrap());
        }
    }
}
