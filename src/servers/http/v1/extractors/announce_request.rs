//! Axum [`extractor`](axum::extract) for the [`Announce`] request.
//!
//! It parses the query parameters returning an [`Announce`] request.
//!
//! The extractor is infallible: tracker protocols are permissive, so absent
//! or malformed parameters default to zero/empty values instead of
//! rejecting the request.
//!
//! **Sample announce request**
//!
//! <http://0.0.0.0:6969/announce?info_hash=%81%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00&peer_id=-qB00000000000000001&port=17548&downloaded=0&uploaded=0&left=0&event=completed>
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;

use crate::servers::http::v1::query::Query;
use crate::servers::http::v1::requests::announce::Announce;

/// Extractor for the [`Announce`] request.
pub struct ExtractRequest(pub Announce);

#[async_trait]
impl<S> FromRequestParts<S> for ExtractRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ExtractRequest(extract_announce_from(parts.uri.query())))
    }
}

fn extract_announce_from(maybe_raw_query: Option<&str>) -> Announce {
    let query = maybe_raw_query
        .unwrap_or_default()
        .parse::<Query>()
        .unwrap_or_default();

    query.into()
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use transfer_bench_primitives::info_hash::InfoHash;
    use transfer_bench_primitives::peer;

    use super::extract_announce_from;

    #[test]
    fn it_should_extract_the_announce_request_from_the_url_query_params() {
        let raw_query = "info_hash=%3B%24U%04%CF%5F%11%BB%DB%E1%20%1C%EAjk%F4Z%EE%1B%C0&peer_id=-qB00000000000000001&port=17548";

        let announce = extract_announce_from(Some(raw_query));

        assert_eq!(
            announce.info_hash,
            InfoHash::from_str("3b245504cf5f11bbdbe1201cea6a6bf45aee1bc0").unwrap()
        );
        assert_eq!(announce.peer_id, peer::Id(*b"-qB00000000000000001"));
        assert_eq!(announce.port, 17548);
    }

    #[test]
    fn it_should_default_everything_when_the_query_is_missing() {
        let announce = extract_announce_from(None);

        assert_eq!(announce.info_hash, InfoHash::from([0u8; 20]));
        assert_eq!(announce.peer_id, peer::Id::default());
    }
}
