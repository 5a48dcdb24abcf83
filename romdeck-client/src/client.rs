use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LAST_MODIFIED};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use romdeck_core::{Collection, CollectionKind, Firmware, Host, Platform, Rom, Save};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::error::ClientError;
use crate::library::{ArtworkHead, RomLibrary, parse_http_date};
use crate::query::{RomPage, RomQuery, SaveFilter};
use crate::types::{CollectionResponse, PagedRoms, VirtualCollectionResponse};

const HEAD_TIMEOUT: Duration = Duration::from_secs(10);
const ARTWORK_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for one library server.
///
/// Every request carries the host's Basic auth header when credentials are
/// configured. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct RommClient {
    http: reqwest::Client,
    host: Host,
    api_timeout: Duration,
    download_timeout: Duration,
}

impl RommClient {
    pub fn new(
        host: Host,
        api_timeout: Duration,
        download_timeout: Duration,
    ) -> Result<Self, ClientError> {
        host.validate()
            .map_err(|e| ClientError::invalid_query(e.to_string()))?;

        let mut headers = HeaderMap::new();
        if let Some(auth) = host.authorization() {
            let mut value = HeaderValue::from_str(&auth)
                .map_err(|e| ClientError::invalid_query(format!("bad credentials: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            host,
            api_timeout,
            download_timeout,
        })
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    /// Stream a ROM's file to `dest`, writing through a `.tmp` sibling.
    /// Returns the number of bytes written.
    pub async fn download_rom(&self, rom: &Rom, dest: &Path) -> Result<u64, ClientError> {
        let path = format!("/api/roms/{}/content/{}", rom.id, rom.fs_name);
        let mut resp = self
            .send(self.http.get(self.host.url_for(&path)), self.download_timeout)
            .await?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut tmp_name = dest.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp = std::path::PathBuf::from(tmp_name);

        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            let mut written = 0u64;
            while let Some(chunk) = resp.chunk().await? {
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            Ok::<_, ClientError>(written)
        }
        .await;

        match result {
            Ok(written) => {
                tokio::fs::rename(&tmp, dest).await?;
                log::debug!("Downloaded {} ({} bytes)", dest.display(), written);
                Ok(written)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&tmp).await;
                Err(e)
            }
        }
    }

    async fn send(&self, req: RequestBuilder, timeout: Duration) -> Result<Response, ClientError> {
        let resp = req.timeout(timeout).send().await?;
        check_status(resp)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let req = self.http.get(self.host.url_for(path)).query(params);
        let resp = self.send(req, self.api_timeout).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ClientError::decode(format!(
                "{path}: {e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })
    }
}

fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(ClientError::status(
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown"),
    ))
}

#[async_trait]
impl RomLibrary for RommClient {
    async fn get_platforms(&self) -> Result<Vec<Platform>, ClientError> {
        self.get_json("/api/platforms/", &[]).await
    }

    async fn get_roms(&self, query: &RomQuery) -> Result<RomPage, ClientError> {
        let page: PagedRoms = self.get_json("/api/roms/", &query.to_params()).await?;
        Ok(page.into())
    }

    async fn get_rom_by_hash(&self, sha1: &str) -> Result<Option<Rom>, ClientError> {
        match self
            .get_json("/api/roms/by-hash", &[("sha1_hash", sha1.to_string())])
            .await
        {
            Ok(rom) => Ok(Some(rom)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn get_collections(&self) -> Result<Vec<Collection>, ClientError> {
        let list: Vec<CollectionResponse> = self.get_json("/api/collections/", &[]).await?;
        Ok(list
            .into_iter()
            .map(|c| c.into_collection(CollectionKind::Regular))
            .collect())
    }

    async fn get_smart_collections(&self) -> Result<Vec<Collection>, ClientError> {
        let list: Vec<CollectionResponse> =
            self.get_json("/api/collections/smart", &[]).await?;
        Ok(list
            .into_iter()
            .map(|c| c.into_collection(CollectionKind::Smart))
            .collect())
    }

    async fn get_virtual_collections(&self) -> Result<Vec<Collection>, ClientError> {
        let list: Vec<VirtualCollectionResponse> =
            self.get_json("/api/collections/virtual", &[]).await?;
        Ok(list.into_iter().map(Collection::from).collect())
    }

    async fn get_firmware(&self, platform_id: i64) -> Result<Vec<Firmware>, ClientError> {
        self.get_json("/api/firmware/", &[("platform_id", platform_id.to_string())])
            .await
    }

    async fn get_saves(&self, filter: &SaveFilter) -> Result<Vec<Save>, ClientError> {
        self.get_json("/api/saves/", &filter.to_params()).await
    }

    async fn download_save(&self, download_path: &str) -> Result<Vec<u8>, ClientError> {
        let req = self.http.get(self.host.url_for(download_path));
        let resp = self.send(req, self.download_timeout).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn upload_save(
        &self,
        rom_id: i64,
        path: &Path,
        emulator: &str,
    ) -> Result<Save, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("save")
            .to_string();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part("saveFile", part);

        let req = self
            .http
            .post(self.host.url_for("/api/saves/"))
            .query(&[("rom_id", rom_id.to_string()), ("emulator", emulator.to_string())])
            .multipart(form);
        let resp = self.send(req, self.download_timeout).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ClientError::decode(format!(
                "upload response: {e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })
    }

    async fn head_artwork(&self, path: &str) -> Result<ArtworkHead, ClientError> {
        let resp = self
            .http
            .head(self.host.url_for(path))
            .timeout(HEAD_TIMEOUT)
            .send()
            .await?;
        let last_modified = resp
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date);
        Ok(ArtworkHead {
            ok: resp.status() == StatusCode::OK,
            last_modified,
        })
    }

    async fn get_artwork(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let req = self.http.get(self.host.url_for(path));
        let resp = self.send(req, ARTWORK_TIMEOUT).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_host_without_scheme() {
        let err = RommClient::new(
            Host::new("192.168.1.20:8080"),
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ClientError::InvalidQuery(_)));
    }

    #[test]
    fn builds_with_credentials() {
        let host = Host::new("http://romm.local/").with_credentials("admin", "hunter2");
        let client =
            RommClient::new(host, Duration::from_secs(1), Duration::from_secs(1)).unwrap();
        assert_eq!(client.host().origin(), "http://romm.local");
    }
}
