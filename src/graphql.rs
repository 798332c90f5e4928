#![forbid(unsafe_code)]

//! Resolves an audience share-link hash to the underlying media ID by
//! replaying the request Wistia's own media page makes against the
//! per-account GraphQL endpoint.

use serde_json::json;
use tracing::debug;

use crate::config::Settings;
use crate::error::{Result, WistiaError};
use crate::extract::{domain_from_url, media_id_from_graphql};
use crate::http::HttpClient;
use crate::media::MediaId;

const OPERATION_NAME: &str = "AudienceLink";
const SCHEMA_HEADER: &str = "x-wistia-gql-schema";
const ANONYMOUS_SCHEMA: &str = "AnonymousSchema";

const AUDIENCE_LINK_QUERY: &str = r#"query AudienceLink($hashedId: HashedId!) {
  audienceLink(hashedId: $hashedId) {
    id
    status
    validFrom
    media {
      id
      ...anonymousMedia
      __typename
    }
    __typename
  }
}

fragment anonymousMedia on AnonymousMedia {
  __typename
  id
  hashedId
  aspectRatio
  name
  displayDescription
  publicCommentsSelection
  playerColor
  mediaType
  createdByRecord
  hasMediaPage
  hasReadyTimeCodedTranscript
  hasSpeakers
  mediaPage {
    id
    hasCustomizations
    customizations
    __typename
  }
  imageUrl
  permissionsForCurrentContact {
    canDownload
    __typename
  }
  topLevelAudienceComments {
    pageInfo {
      endCursor
      hasNextPage
      __typename
    }
    edges {
      node {
        id
        ...anonymousAudienceCommentFields
        replies {
          id
          ...anonymousAudienceCommentFields
          __typename
        }
        __typename
      }
      __typename
    }
    __typename
  }
  topLevelTeamComments {
    pageInfo {
      endCursor
      hasNextPage
      __typename
    }
    edges {
      node {
        id
        ...anonymousTeamCommentFields
        replies {
          id
          ...anonymousTeamCommentFields
          __typename
        }
        __typename
      }
      __typename
    }
    __typename
  }
  account {
    id
    numericId
    wistiaBrandingOptional
    __typename
  }
}

fragment anonymousAudienceCommentFields on AnonymousComment {
  id
  displayName
  initials
  body
  createdAt
  updatedAt
  editedAt
  mediaTimestamp
  canEdit
  canDelete
  __typename
}

fragment anonymousTeamCommentFields on AnonymousTeamComment {
  id
  displayName
  initials
  body
  bodyHtml
  createdAt
  updatedAt
  editedAt
  mediaTimestamp
  canEdit
  canDelete
  __typename
}"#;

pub fn graphql_url(domain: &str) -> String {
    format!("https://{domain}/graphql?op={OPERATION_NAME}")
}

pub fn audience_link_body(link_hash: &str) -> String {
    json!({
        "operationName": OPERATION_NAME,
        "variables": { "hashedId": link_hash },
        "query": AUDIENCE_LINK_QUERY,
    })
    .to_string()
}

/// The endpoint rejects requests that do not look like they came from the
/// media page itself, hence the browser user agent and origin headers.
pub fn resolve_link(
    client: &dyn HttpClient,
    settings: &Settings,
    page_url: &str,
    link_hash: &str,
) -> Result<MediaId> {
    let domain = domain_from_url(page_url)
        .ok_or_else(|| WistiaError::not_found(format!("no domain in {page_url}")))?;
    let origin = format!("https://{domain}");
    let headers = [
        ("Content-Type", "application/json"),
        ("Accept", "*/*"),
        (SCHEMA_HEADER, ANONYMOUS_SCHEMA),
        ("Origin", origin.as_str()),
        ("Referer", page_url),
        ("User-Agent", settings.user_agent.as_str()),
    ];

    let response = client
        .post(&graphql_url(&domain), &headers, &audience_link_body(link_hash))
        .map_err(|err| WistiaError::not_found(format!("GraphQL request failed: {err}")))?;
    if response.status != 200 {
        debug!(status = response.status, body = %response.body, "GraphQL error response");
        return Err(WistiaError::not_found(format!(
            "GraphQL request failed with status {}",
            response.status
        )));
    }

    let media_id = media_id_from_graphql(&response.body).ok_or_else(|| {
        debug!(body = %response.body, "GraphQL response without media hashedId");
        WistiaError::not_found("video ID in GraphQL response")
    })?;
    debug!(%media_id, "GraphQL resolved share link");
    Ok(MediaId::new(media_id))
}
