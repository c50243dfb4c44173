use crate::errors::SiteCloneError;
use chrono::Utc;
use phf::phf_map;
use reqwest::header::HeaderMap;
use reqwest::{header, Client, Response};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use url::Url;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

pub fn build_client() -> Result<Client, SiteCloneError> {
    match Client::builder().user_agent(USER_AGENT).build() {
        Ok(c) => Ok(c),
        Err(e) => {
            tracing::error!("Failed to build http client\nError : {}", e);
            Err(SiteCloneError::UnknownError(e.to_string()))
        }
    }
}

/// Downloads `remote_url` to `local_path`, creating parent directories and
/// overwriting any existing file. Failures are logged and swallowed so a
/// batch of downloads can carry on; the returned value is the number of
/// bytes written, `None` when the download failed.
#[tracing::instrument(skip(client))]
pub async fn download_asset(client: &Client, remote_url: &str, local_path: &Path) -> Option<u64> {
    let result = async {
        ensure_parent_dir(local_path).await?;
        let response = fetch(client, remote_url).await?;
        write_response(response, remote_url, local_path).await
    }
    .await;
    match result {
        Ok(bytes_written) => {
            tracing::debug!("Downloaded {} => {}", remote_url, local_path.display());
            Some(bytes_written)
        }
        Err(e) => {
            tracing::error!("Failed to download asset: {}\nError : {}", remote_url, e);
            None
        }
    }
}

/// Downloads `remote_url` into `folder`, naming the file after the url or,
/// failing that, the response headers. Failures are logged and swallowed.
#[tracing::instrument(skip(client))]
pub async fn download_into_dir(client: &Client, remote_url: &str, folder: &Path) -> Option<PathBuf> {
    let result = async {
        let link = match Url::parse(remote_url) {
            Ok(u) => u,
            Err(_) => return Err(SiteCloneError::InvalidUrl(remote_url.to_string())),
        };
        let response = fetch(client, remote_url).await?;
        let f_ext = get_file_extension(&link, response.headers());
        let f_name = get_file_name(&link, response.headers(), f_ext);
        tracing::debug!("File name for {} is {}", remote_url, f_name);
        let destination = folder.join(f_name);
        ensure_parent_dir(&destination).await?;
        write_response(response, remote_url, &destination).await?;
        Ok::<PathBuf, SiteCloneError>(destination)
    }
    .await;
    match result {
        Ok(destination) => Some(destination),
        Err(e) => {
            tracing::error!("Failed to download asset: {}\nError : {}", remote_url, e);
            None
        }
    }
}

async fn ensure_parent_dir(path: &Path) -> Result<(), SiteCloneError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return Ok(()),
    };
    if let Err(e) = fs::create_dir_all(parent).await {
        return Err(SiteCloneError::FileOperationError {
            file_name: parent.to_string_lossy().to_string(),
            message: format!("{} | {}", e, e.kind()),
        });
    }
    Ok(())
}

async fn fetch(client: &Client, remote_url: &str) -> Result<Response, SiteCloneError> {
    let response = match client.get(remote_url).send().await {
        Ok(r) => r,
        Err(e) => return Err(SiteCloneError::NetworkError(e.to_string())),
    };
    if !response.status().is_success() {
        tracing::error!(
            "Error status code received : {} |{}|",
            response.status(),
            remote_url
        );
        return Err(SiteCloneError::ErrorStatusCode {
            status_code: response.status().to_string(),
            url: remote_url.to_string(),
        });
    }
    Ok(response)
}

async fn write_response(
    mut response: Response,
    remote_url: &str,
    destination: &Path,
) -> Result<u64, SiteCloneError> {
    let file_error = |e: std::io::Error| SiteCloneError::FileOperationError {
        file_name: destination.to_string_lossy().to_string(),
        message: format!("{} | {}", e, e.kind()),
    };
    let mut dest_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(destination)
        .await
        .map_err(file_error)?;

    let mut bytes_written = 0u64;
    while let Some(chunk) = match response.chunk().await {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Error downloading resource from {}", remote_url);
            return Err(SiteCloneError::NetworkError(e.to_string()));
        }
    } {
        dest_file.write_all(&chunk).await.map_err(file_error)?;
        bytes_written += chunk.len() as u64;
    }
    dest_file.flush().await.map_err(file_error)?;
    Ok(bytes_written)
}

fn get_file_name(link: &Url, headers: &HeaderMap, f_ext: &str) -> String {
    let last_segment = link
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or("")
        .to_string();
    if !last_segment.is_empty() {
        return last_segment;
    }
    let generic_name = || {
        tracing::warn!(
            "File name can't be determined, using generic name. {}",
            link
        );
        format!("file-{time}{ext}", time = Utc::now().timestamp(), ext = f_ext)
    };
    let disposition = match headers
        .get(header::CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
    {
        Some(v) => v,
        None => return generic_name(),
    };
    // RFC 5987 style first, e.g. filename*=UTF-8''report.pdf
    if let Some(idx) = disposition.find("filename*=") {
        let value = disposition[idx + "filename*=".len()..]
            .split(';')
            .next()
            .unwrap_or("");
        let name = value.rsplit('\'').next().unwrap_or("").trim();
        if !name.is_empty() {
            return name.to_string();
        }
    }
    if let Some(idx) = disposition.find("filename=") {
        let value = disposition[idx + "filename=".len()..]
            .split(';')
            .next()
            .unwrap_or("");
        let name = value.trim().trim_matches('"');
        if !name.is_empty() {
            return name.to_string();
        }
    }
    generic_name()
}

fn get_file_extension(link: &Url, headers: &HeaderMap) -> &'static str {
    let content_type = match headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    {
        Some(ct) => ct.to_lowercase(),
        None => {
            tracing::warn!("File extension can not be determined for {}", link);
            return "";
        }
    };
    // Remove charset if present (E.g text/html; charset=utf-8))
    let mime = content_type.split(';').next().unwrap_or("").trim();
    match MIME_TYPES.get(mime) {
        Some(ext) => *ext,
        None => {
            tracing::warn!("File extension can not be determined for {}", link);
            ""
        }
    }
}

static MIME_TYPES: phf::Map<&'static str, &'static str> = phf_map! {
    "text/html" => ".html",
    "text/css" => ".css",
    "text/javascript" => ".js",
    "application/javascript" => ".js",
    "application/json" => ".json",
    "image/jpeg" => ".jpg",
    "image/png" => ".png",
    "image/gif" => ".gif",
    "image/svg+xml" => ".svg",
    "image/webp" => ".webp",
    "image/x-icon" => ".ico",
    "font/otf" => ".otf",
    "font/ttf" => ".ttf",
    "font/woff" => ".woff",
    "font/woff2" => ".woff2",
    "application/pdf" => ".pdf",
    "application/xhtml+xml" => ".xhtml",
};
