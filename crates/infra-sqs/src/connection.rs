// SQS client construction

use aws_config::{BehaviorVersion, Region};
use aws_sdk_sqs::config::Credentials;
use tracing::info;

const CREDENTIALS_PROVIDER_NAME: &str = "thumbnailer-environment";

/// Access key pair supplied through configuration
#[derive(Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Connection settings; anything left `None` falls back to the SDK's
/// default provider chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqsSettings {
    pub region: Option<String>,
    pub credentials: Option<StaticCredentials>,
    /// Endpoint override, e.g. `http://localhost:4566` for LocalStack
    pub endpoint_url: Option<String>,
}

/// Build an SQS client once at startup
pub async fn create_client(settings: &SqsSettings) -> aws_sdk_sqs::Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }

    if let Some(credentials) = &settings.credentials {
        loader = loader.credentials_provider(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        ));
    }

    if let Some(endpoint_url) = &settings.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    let config = loader.load().await;

    info!(
        region = ?config.region().map(|r| r.as_ref().to_string()),
        static_credentials = settings.credentials.is_some(),
        endpoint_url = ?settings.endpoint_url,
        "SQS client configured"
    );

    aws_sdk_sqs::Client::new(&config)
}
