//! Ticket API Client
//!
//! Frontend bindings to the REST endpoints.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{NewTicket, TicketKey, TicketPatch, TicketsPayload};

#[async_trait(?Send)]
pub trait TicketApi {
    /// `GET /api/tickets`
    async fn list_tickets(&self) -> Result<TicketsPayload, ApiError>;

    /// `POST /api/tickets`, returns the key the server assigned
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketKey, ApiError>;

    /// `PATCH /api/ticket/:key`
    async fn update_ticket(&self, key: TicketKey, patch: &TicketPatch) -> Result<(), ApiError>;

    /// `DELETE /api/ticket/:key`
    async fn delete_ticket(&self, key: TicketKey) -> Result<(), ApiError>;
}

/// Parse the text body of a create response
pub fn parse_created_key(body: &str) -> Result<TicketKey, ApiError> {
    let trimmed = body.trim();
    match trimmed.parse::<TicketKey>() {
        Ok(key) if key > 0 => Ok(key),
        _ => Err(ApiError::InvalidKey(trimmed.to_string())),
    }
}

pub struct HttpTicketApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTicketApi {
    /// `base_url` must be absolute, e.g. the page origin
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Body text of a 2xx response, `ApiError::Status` otherwise
    async fn read_body(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status { status: status.as_u16(), body });
        }
        Ok(body)
    }
}

#[async_trait(?Send)]
impl TicketApi for HttpTicketApi {
    async fn list_tickets(&self) -> Result<TicketsPayload, ApiError> {
        let response = self.client.get(self.url("/api/tickets")).send().await?;
        let body = Self::read_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<TicketKey, ApiError> {
        let response = self
            .client
            .post(self.url("/api/tickets"))
            .json(ticket)
            .send()
            .await?;
        let body = Self::read_body(response).await?;
        parse_created_key(&body)
    }

    async fn update_ticket(&self, key: TicketKey, patch: &TicketPatch) -> Result<(), ApiError> {
        let response = self
            .client
            .patch(self.url(&format!("/api/ticket/{}", key)))
            .json(patch)
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }

    async fn delete_ticket(&self, key: TicketKey) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/api/ticket/{}", key)))
            .send()
            .await?;
        Self::read_body(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_created_key() {
        assert_eq!(parse_created_key("42").unwrap(), 42);
        assert_eq!(parse_created_key(" 7\n").unwrap(), 7);
        assert!(matches!(parse_created_key("0"), Err(ApiError::InvalidKey(_))));
        assert!(matches!(parse_created_key("oops"), Err(ApiError::InvalidKey(s)) if s == "oops"));
        assert!(matches!(parse_created_key(""), Err(ApiError::InvalidKey(_))));
    }

    #[test]
    fn test_urls() {
        let api = HttpTicketApi::new("http://localhost:8080/");
        assert_eq!(api.base_url(), "http://localhost:8080");
        assert_eq!(api.url("/api/tickets"), "http://localhost:8080/api/tickets");
    }
}
