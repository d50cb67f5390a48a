//! Stripe Gateway
//!
//! Form-encoded calls against the Stripe REST API, authenticated with the
//! secret key as bearer token.

use serde::Deserialize;

use crate::application::config::BillingConfig;
use crate::domain::gateway::{CheckoutGateway, CheckoutRequest, CheckoutSession};
use crate::error::{BillingError, BillingResult};

#[derive(Clone)]
pub struct StripeGateway {
    client: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl StripeGateway {
    pub fn new(config: &BillingConfig) -> BillingResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BillingError::Internal(format!("HTTP client build failed: {}", e)))?;

        Ok(Self {
            client,
            secret_key: config.secret_key.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }

    async fn read<T>(response: reqwest::Response) -> BillingResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();
        if !status.is_success() {
            let reason = match response.json::<ErrorEnvelope>().await {
                Ok(envelope) => envelope.error.message,
                Err(_) => format!("billing provider answered {}", status),
            };
            return Err(BillingError::Provider(reason));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| BillingError::Provider(format!("unreadable response: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct CustomerList {
    #[serde(default)]
    data: Vec<Customer>,
}

#[derive(Debug, Deserialize)]
struct Customer {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Session {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

fn checkout_form(request: &CheckoutRequest) -> [(&'static str, &str); 7] {
    [
        ("mode", "subscription"),
        ("payment_method_types[0]", "card"),
        ("line_items[0][price]", &request.price_id),
        ("line_items[0][quantity]", "1"),
        ("customer", &request.customer_id),
        ("success_url", &request.success_url),
        ("cancel_url", &request.cancel_url),
    ]
}

fn transport(err: reqwest::Error) -> BillingError {
    BillingError::Provider(err.to_string())
}

impl CheckoutGateway for StripeGateway {
    async fn find_customer_by_email(&self, email: &str) -> BillingResult<Option<String>> {
        let response = self
            .client
            .get(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .query(&[("email", email), ("limit", "1")])
            .send()
            .await
            .map_err(transport)?;

        let list: CustomerList = Self::read(response).await?;
        Ok(list.data.into_iter().next().map(|customer| customer.id))
    }

    async fn create_customer(&self, email: &str, name: Option<&str>) -> BillingResult<String> {
        let mut form = vec![("email", email)];
        if let Some(name) = name {
            form.push(("name", name));
        }

        let response = self
            .client
            .post(self.url("customers"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await
            .map_err(transport)?;

        let customer: Customer = Self::read(response).await?;
        Ok(customer.id)
    }

    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> BillingResult<CheckoutSession> {
        let response = self
            .client
            .post(self.url("checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&checkout_form(request))
            .send()
            .await
            .map_err(transport)?;

        let session: Session = Self::read(response).await?;
        Ok(CheckoutSession {
            id: session.id,
            url: session.url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_form() {
        let request = CheckoutRequest {
            customer_id: "cus_1".to_string(),
            price_id: "price_1".to_string(),
            success_url: "https://a/?checkout=success".to_string(),
            cancel_url: "https://a/?checkout=cancel".to_string(),
        };
        let form = checkout_form(&request);
        assert!(form.contains(&("mode", "subscription")));
        assert!(form.contains(&("line_items[0][price]", "price_1")));
        assert!(form.contains(&("customer", "cus_1")));
    }

    #[test]
    fn test_url_join() {
        let config = BillingConfig {
            api_base: "https://api.stripe.com/v1/".to_string(),
            ..Default::default()
        };
        let gateway = StripeGateway::new(&config).unwrap();
        assert_eq!(
            gateway.url("checkout/sessions"),
            "https://api.stripe.com/v1/checkout/sessions"
        );
    }

    #[test]
    fn test_session_response_parse() {
        let session: Session =
            serde_json::from_str(r#"{"id":"cs_1","object":"checkout.session","url":"https://checkout/x"}"#)
                .unwrap();
        assert_eq!(session.id, "cs_1");
        assert_eq!(session.url.as_deref(), Some("https://checkout/x"));
    }
}
