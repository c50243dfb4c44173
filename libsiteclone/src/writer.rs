use crate::errors::SiteCloneError;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Writes `content` to `path`, creating parent directories and replacing any
/// existing file.
#[tracing::instrument(skip(content))]
pub async fn write_file(path: &Path, content: &str) -> Result<String, SiteCloneError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            tracing::error!("Error creating directory {}\nError : {}", parent.display(), e);
            return Err(SiteCloneError::FileOperationError {
                file_name: path.to_string_lossy().to_string(),
                message: format!("Error writing to file | {} | {}", e, e.kind()),
            });
        }
    }

    let mut file = match fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .await
    {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Error opening file : {}\nError : {} | {}", path.display(), e, e.kind());
            return Err(SiteCloneError::FileOperationError {
                file_name: path.to_string_lossy().to_string(),
                message: format!("Error writing to file | {} | {}", e, e.kind()),
            });
        }
    };

    if let Err(e) = file.write_all(content.as_bytes()).await {
        tracing::error!("Error writing to file : {}\nError : {}", path.display(), e);
        return Err(SiteCloneError::FileOperationError {
            file_name: path.to_string_lossy().to_string(),
            message: format!("Error writing to file | {} | {}", e, e.kind()),
        });
    }
    if let Err(e) = file.flush().await {
        return Err(SiteCloneError::FileOperationError {
            file_name: path.to_string_lossy().to_string(),
            message: format!("Error writing to file | {} | {}", e, e.kind()),
        });
    }

    Ok(format!("Successfully wrote to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_creates_parents_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("project").join("css").join("site.css");
        let msg = write_file(&target, "body { color: red; }").await.unwrap();
        assert!(msg.contains("site.css"));
        write_file(&target, "a{}").await.unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "a{}");
    }

    #[tokio::test]
    async fn test_write_error_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let target = blocker.join("index.html");
        let err = write_file(&target, "<html></html>").await.unwrap_err();
        assert!(err.to_string().contains("index.html"));
    }
}
