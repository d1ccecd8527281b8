//! Remote photo publishing.
//!
//! A [`Publisher`] takes the encoded photo and returns a short shareable
//! reference. The stock implementation uploads to Cloudinary with an unsigned
//! preset and returns the hosted image URL.

use crate::config::PublishConfig;
use crate::constants::{CLOUDINARY_API_BASE, QR_SERVICE_URL};
use crate::{Error, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Publishes photo bytes and returns a shareable reference
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload a JPEG-encoded photo
    async fn publish(&self, image: Vec<u8>) -> Result<String>;

    /// Get publisher name
    fn name(&self) -> &str;
}

/// Cloudinary unsigned upload client
pub struct CloudinaryPublisher {
    client: Client,
    endpoint: String,
    upload_preset: String,
}

/// Relevant part of the upload response
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

impl CloudinaryPublisher {
    /// Client for the public API of `cloud_name`
    pub fn new(cloud_name: &str, upload_preset: &str, timeout: Duration) -> Result<Self> {
        Self::with_endpoint(
            format!("{CLOUDINARY_API_BASE}/{cloud_name}/image/upload"),
            upload_preset,
            timeout,
        )
    }

    /// Client for an explicit upload endpoint
    pub fn with_endpoint(endpoint: impl Into<String>, upload_preset: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            upload_preset: upload_preset.to_string(),
        })
    }

    pub fn from_config(config: &PublishConfig) -> Result<Self> {
        let timeout = Duration::from_millis(config.timeout_ms);
        match &config.endpoint {
            Some(endpoint) => Self::with_endpoint(endpoint.clone(), &config.upload_preset, timeout),
            None => Self::new(&config.cloud_name, &config.upload_preset, timeout),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Publisher for CloudinaryPublisher {
    async fn publish(&self, image: Vec<u8>) -> Result<String> {
        debug!("Uploading {} bytes to {}", image.len(), self.endpoint);
        let file = Part::bytes(image).file_name("booth.jpg").mime_str("image/jpeg")?;
        let form = Form::new()
            .part("file", file)
            .text("upload_preset", self.upload_preset.clone());

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Publish(format!("upload failed with status {status}")));
        }

        let body: UploadResponse = response.json().await?;
        body.secure_url
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Publish("upload response has no secure_url".to_string()))
    }

    fn name(&self) -> &str {
        "Cloudinary"
    }
}

/// Publisher used when uploads are disabled; always fails
pub struct OfflinePublisher;

#[async_trait]
impl Publisher for OfflinePublisher {
    async fn publish(&self, _image: Vec<u8>) -> Result<String> {
        Err(Error::Publish("publishing is disabled".to_string()))
    }

    fn name(&self) -> &str {
        "Offline"
    }
}

/// Build the publisher described by the configuration
pub fn create_publisher(config: &PublishConfig) -> Result<Box<dyn Publisher>> {
    if config.enabled {
        Ok(Box::new(CloudinaryPublisher::from_config(config)?))
    } else {
        Ok(Box::new(OfflinePublisher))
    }
}

/// URL of a rendered QR code image encoding `data`
#[must_use]
pub fn qr_code_url(data: &str) -> String {
    format!("{QR_SERVICE_URL}?size=200x200&data={}", urlencoding::encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloudinary_endpoint() {
        let publisher = CloudinaryPublisher::new("mycloud", "preset", Duration::from_secs(5)).unwrap();
        assert_eq!(publisher.endpoint(), "https://api.cloudinary.com/v1_1/mycloud/image/upload");
    }

    #[test]
    fn test_qr_code_url_encodes_data() {
        let url = qr_code_url("https://res.example.com/a b?x=1");
        assert_eq!(
            url,
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=https%3A%2F%2Fres.example.com%2Fa%20b%3Fx%3D1"
        );
    }

    #[tokio::test]
    async fn test_offline_publisher_fails() {
        let result = OfflinePublisher.publish(vec![1, 2, 3]).await;
        assert!(matches!(result, Err(Error::Publish(_))));
    }

    #[test]
    fn test_create_publisher_respects_enabled() {
        let mut config = PublishConfig::default();
        assert_eq!(create_publisher(&config).unwrap().name(), "Cloudinary");
        config.enabled = false;
        assert_eq!(create_publisher(&config).unwrap().name(), "Offline");
    }
}
