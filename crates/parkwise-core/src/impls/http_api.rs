//! HttpReservationApi - reqwest による ReservationApi の本番実装
//!
//! # 応答の扱い
//! - 期待したステータス以外は `{ message }`（無ければ `{ error }`）を読んで
//!   `ClientError::Service` にする
//! - 401 / 403 は `ClientError::Auth`
//! - 送受信そのものの失敗は `ClientError::Network`
//! - ボディが JSON として読めなければ `ClientError::Parse`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::account::TokenBody;
use crate::domain::draft::CreatedBody;
use crate::domain::parking::SlotsBody;
use crate::domain::{
    AuthToken, ClientError, Credentials, Profile, Registration, Reservation, ReservationId,
    ReservationRequest, Slot,
};
use crate::ports::ReservationApi;

const GENERIC_FAILURE: &str = "Something went wrong";

/// 非成功応答のボディ
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentBody {
    client_secret: Option<String>,
    error: Option<String>,
}

/// 期待する成功ステータス
#[derive(Debug, Clone, Copy)]
enum Expect {
    Exactly(StatusCode),
    AnySuccess,
}

impl Expect {
    fn matches(self, status: StatusCode) -> bool {
        match self {
            Expect::Exactly(expected) => status == expected,
            Expect::AnySuccess => status.is_success(),
        }
    }
}

pub struct HttpReservationApi {
    client: Client,
    base_url: Url,
}

impl HttpReservationApi {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("http client init: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // join() で最後のセグメントが置き換わらないように末尾を "/" に揃える
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// パスセグメントはパーセントエンコードされる
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Parse(format!("base url cannot carry a path: {}", self.base_url))
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String), ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        debug!(%status, bytes = body.len(), "response received");
        Ok((status, body))
    }

    async fn expect_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        expect: Expect,
    ) -> Result<T, ClientError> {
        let (status, body) = self.send(request).await?;
        if !expect.matches(status) {
            return Err(failure(status, &body));
        }
        serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn expect_status(&self, request: RequestBuilder, expect: Expect) -> Result<(), ClientError> {
        let (status, body) = self.send(request).await?;
        if !expect.matches(status) {
            return Err(failure(status, &body));
        }
        Ok(())
    }
}

/// 非成功応答を ClientError に変換
fn failure(status: StatusCode, body: &str) -> ClientError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .message
        .or(parsed.error)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth(message),
        _ => ClientError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

fn token_from(body: TokenBody) -> Result<AuthToken, ClientError> {
    body.token
        .ok_or_else(|| ClientError::Parse("response did not contain a token".to_string()))
}

#[async_trait]
impl ReservationApi for HttpReservationApi {
    async fn login(&self, credentials: &Credentials) -> Result<AuthToken, ClientError> {
        let url = self.endpoint(&["login"])?;
        let body: TokenBody = self
            .expect_json(self.client.post(url).json(credentials), Expect::Exactly(StatusCode::OK))
            .await?;
        token_from(body)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthToken, ClientError> {
        let url = self.endpoint(&["register"])?;
        let body: TokenBody = self
            .expect_json(
                self.client.post(url).json(registration),
                Expect::Exactly(StatusCode::CREATED),
            )
            .await?;
        token_from(body)
    }

    async fn profile(&self, token: &AuthToken) -> Result<Profile, ClientError> {
        let url = self.endpoint(&["profile"])?;
        self.expect_json(
            self.client.get(url).bearer_auth(token.expose()),
            Expect::AnySuccess,
        )
        .await
    }

    async fn slots(&self, token: &AuthToken, location: &str) -> Result<Vec<Slot>, ClientError> {
        let url = self.endpoint(&["slots", location])?;
        let body: SlotsBody = self
            .expect_json(self.client.get(url).bearer_auth(token.expose()), Expect::AnySuccess)
            .await?;
        body.slots
            .ok_or_else(|| ClientError::Parse("response did not contain slots".to_string()))
    }

    async fn create_reservation(
        &self,
        token: &AuthToken,
        request: &ReservationRequest,
    ) -> Result<ReservationId, ClientError> {
        let url = self.endpoint(&["reserve"])?;
        let body: CreatedBody = self
            .expect_json(
                self.client.post(url).bearer_auth(token.expose()).json(request),
                Expect::Exactly(StatusCode::CREATED),
            )
            .await?;
        Ok(body.reservation.id)
    }

    async fn save_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
        total_charges: f64,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["save-reservation"])?;
        let payload = serde_json::json!({
            "reservationId": id,
            "totalCharges": total_charges,
        });
        self.expect_status(
            self.client.post(url).bearer_auth(token.expose()).json(&payload),
            Expect::AnySuccess,
        )
        .await
    }

    async fn reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<Reservation, ClientError> {
        let url = self.endpoint(&["reservations", id.as_str()])?;
        debug!(reservation_id = %id, "fetching reservation");
        self.expect_json(
            self.client.get(url).bearer_auth(token.expose()),
            Expect::Exactly(StatusCode::OK),
        )
        .await
    }

    async fn delete_reservation(
        &self,
        token: &AuthToken,
        id: &ReservationId,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&["reserve", id.as_str()])?;
        debug!(reservation_id = %id, "deleting reservation");
        self.expect_status(
            self.client.delete(url).bearer_auth(token.expose()),
            Expect::Exactly(StatusCode::OK),
        )
        .await
    }

    async fn create_payment_intent(&self, amount_cents: u64) -> Result<String, ClientError> {
        let url = self.endpoint(&["create-payment-intent"])?;
        let payload = serde_json::json!({ "amount": amount_cents });
        let (status, body) = self.send(self.client.post(url).json(&payload)).await?;
        if !status.is_success() {
            return Err(failure(status, &body));
        }

        let parsed: PaymentIntentBody =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        if let Some(message) = parsed.error {
            return Err(ClientError::Service {
                status: status.as_u16(),
                message,
            });
        }
        parsed
            .client_secret
            .ok_or_else(|| ClientError::Parse("response did not contain a client secret".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn api(base: &str) -> HttpReservationApi {
        HttpReservationApi::with_client(Client::new(), Url::parse(base).unwrap())
    }

    #[rstest]
    #[case::bare_host("https://parking.example.com", "https://parking.example.com/reservations/r1")]
    #[case::trailing_slash("https://parking.example.com/", "https://parking.example.com/reservations/r1")]
    #[case::prefixed("https://example.com/api/v1", "https://example.com/api/v1/reservations/r1")]
    fn endpoints_are_appended_to_the_base(#[case] base: &str, #[case] expected: &str) {
        let url = api(base).endpoint(&["reservations", "r1"]).unwrap();
        assert_eq!(url.as_str(), expected);
    }

    #[test]
    fn path_segments_are_encoded() {
        let url = api("https://parking.example.com").endpoint(&["slots", "Gulshan Block 2"]).unwrap();
        assert_eq!(url.as_str(), "https://parking.example.com/slots/Gulshan%20Block%202");
    }

    #[rstest]
    #[case::not_found(404, r#"{"message":"Reservation not found"}"#, "Reservation not found")]
    #[case::error_field(400, r#"{"error":"Amount too small"}"#, "Amount too small")]
    #[case::html_body(502, "<html>Bad Gateway</html>", GENERIC_FAILURE)]
    fn failures_become_service_errors(#[case] status: u16, #[case] body: &str, #[case] message: &str) {
        let err = failure(StatusCode::from_u16(status).unwrap(), body);
        match err {
            ClientError::Service { status: s, message: m } => {
                assert_eq!(s, status);
                assert_eq!(m, message);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(401)]
    #[case(403)]
    fn rejected_tokens_are_auth_errors(#[case] status: u16) {
        let err = failure(StatusCode::from_u16(status).unwrap(), r#"{"message":"Invalid token"}"#);
        assert!(matches!(err, ClientError::Auth(m) if m == "Invalid token"));
    }
}
