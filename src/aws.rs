//! Shared AWS SDK plumbing for the S3 and Rekognition collaborators.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};

use crate::config::AwsConfig;
use crate::error::CollaboratorError;

/// Load the SDK configuration, applying overrides from the `aws` section on
/// top of the default provider chain.
pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(region) = &config.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(aws_credential_types::Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "image-handler-config",
        ));
    }

    loader.load().await
}

/// Convert an SDK failure into the collaborator error surfaced to callers:
/// the HTTP status of the raw response, plus the service error code and
/// message when the service returned them.
pub fn collaborator_error<E>(err: SdkError<E, HttpResponse>) -> CollaboratorError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    let code = err.code().map(str::to_string);
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    CollaboratorError::new(status, code, message)
}
