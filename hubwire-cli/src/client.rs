use std::time::Duration;

use anyhow::{Context, Result, bail};
use hubwire_api::models::{
    CmdDeviceAdd, CmdDeviceSet, Device, DeviceList, ReplyStatus,
};
use hubwire_api::{CONTENT_TYPE, Message};
use reqwest::{Method, header};

/// Prefixes `http://` unless the host already carries a scheme.
pub fn base_url(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}

/// HTTP client for the hub's protobuf API.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: String,
}

impl HubClient {
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url(host),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.header(header::CONTENT_TYPE, CONTENT_TYPE).body(body);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("{} {} failed", method, url))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read response from {}", url))?;

        if !status.is_success() {
            bail!("HTTP {}: {}", status.as_u16(), String::from_utf8_lossy(&bytes).trim());
        }
        Ok(bytes.to_vec())
    }

    async fn call<M: Message>(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<M> {
        let bytes = self.request(method, path, body).await?;
        M::decode(&bytes).with_context(|| format!("Failed to decode response from {}", path))
    }

    pub async fn health(&self) -> Result<String> {
        let bytes = self.request(Method::GET, "/v1/health", None).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub async fn list(&self) -> Result<DeviceList> {
        self.call(Method::GET, "/v1/devices", None).await
    }

    pub async fn get(&self, device_id: u32) -> Result<Device> {
        self.call(Method::GET, &format!("/v1/devices/{}", device_id), None)
            .await
    }

    pub async fn add(&self, cmd: &CmdDeviceAdd) -> Result<Device> {
        self.call(Method::POST, "/v1/devices", Some(cmd.encode_to_vec()))
            .await
    }

    pub async fn set(&self, device_id: u32, cmd: &CmdDeviceSet) -> Result<ReplyStatus> {
        self.call(
            Method::POST,
            &format!("/v1/devices/{}/set", device_id),
            Some(cmd.encode_to_vec()),
        )
        .await
    }

    pub async fn interview(&self, device_id: u32) -> Result<ReplyStatus> {
        self.call(
            Method::POST,
            &format!("/v1/devices/{}/interview", device_id),
            Some(Vec::new()),
        )
        .await
    }

    pub async fn trigger_scene(&self, scene_id: u32) -> Result<ReplyStatus> {
        self.call(
            Method::POST,
            &format!("/v1/scenes/{}/trigger", scene_id),
            Some(Vec::new()),
        )
        .await
    }

    pub async fn seed(&self) -> Result<String> {
        let bytes = self.request(Method::POST, "/v1/debug/seed", Some(Vec::new())).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url() {
        assert_eq!(base_url("192.168.1.20"), "http://192.168.1.20");
        assert_eq!(base_url("127.0.0.1:8080/"), "http://127.0.0.1:8080");
        assert_eq!(base_url("https://hub.local"), "https://hub.local");
    }
}
