use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use url::Url;

const DIRECTORY_INDEX_FILE_NAME: &str = "index.html";

/// Where a remote asset lands inside the output folder. The url path is
/// mirrored with one leading separator stripped.
pub fn local_asset_path(output_folder: &Path, asset_url: &Url) -> PathBuf {
    let url_path = asset_url.path();
    let relative = url_path.strip_prefix('/').unwrap_or(url_path);
    let mut local = output_folder.to_path_buf();
    for segment in relative.split('/').filter(|s| !s.is_empty() && *s != "." && *s != "..")
    {
        local.push(segment);
    }
    if relative.is_empty() || relative.ends_with('/') {
        local.push(DIRECTORY_INDEX_FILE_NAME);
    }
    local
}

/// The `./` prefixed, forward slash separated form of `local_path` relative
/// to `output_folder`.
pub fn relative_web_path(output_folder: &Path, local_path: &Path) -> Option<String> {
    let relative = local_path.strip_prefix(output_folder).ok()?;
    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    if segments.is_empty() {
        return None;
    }
    Some(format!("./{}", segments.join("/")))
}

/// Remote references (full urls and bare url paths) to local relative paths.
#[derive(Debug, Default, Clone)]
pub struct PathMapping {
    entries: HashMap<String, String>,
}

impl PathMapping {
    /// Registers `local` under both the full url and its path. A later
    /// registration for the same key replaces the earlier one, so assets on
    /// different hosts sharing a path resolve to whichever came last.
    pub fn register(&mut self, asset_url: &str, url_path: &str, local: &str) {
        self.entries.insert(asset_url.to_string(), local.to_string());
        // A bare "/" would match every separator in the document.
        if url_path.is_empty() || url_path == "/" {
            return;
        }
        if let Some(previous) = self.entries.insert(url_path.to_string(), local.to_string()) {
            if previous != local {
                tracing::warn!(
                    "Path {} already mapped to {}, now mapped to {}",
                    url_path,
                    previous,
                    local
                );
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, reference: &str) -> Option<&str> {
        self.entries.get(reference).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_path_mirrors_url_path() {
        let url = Url::parse("https://example.test/css/a.css?v=3").unwrap();
        let local = local_asset_path(Path::new("site"), &url);
        assert_eq!(local, Path::new("site").join("css").join("a.css"));
        assert_eq!(
            relative_web_path(Path::new("site"), &local).unwrap(),
            "./css/a.css"
        );
    }

    #[test]
    fn test_directory_paths_get_index_file() {
        let url = Url::parse("https://example.test/fonts/inter/").unwrap();
        let local = local_asset_path(Path::new("out"), &url);
        assert_eq!(
            local,
            Path::new("out").join("fonts").join("inter").join("index.html")
        );
        assert_eq!(
            relative_web_path(Path::new("out"), &local).unwrap(),
            "./fonts/inter/index.html"
        );
    }

    #[test]
    fn test_nested_output_folder() {
        let output = Path::new("work").join("mirror");
        let url = Url::parse("https://cdn.example.test/img/logo.png").unwrap();
        let local = local_asset_path(&output, &url);
        assert_eq!(
            relative_web_path(&output, &local).unwrap(),
            "./img/logo.png"
        );
    }

    #[test]
    fn test_mapping_registers_url_and_path() {
        let mut mapping = PathMapping::default();
        mapping.register("https://example.test/a.css", "/a.css", "./a.css");
        assert_eq!(mapping.get("https://example.test/a.css"), Some("./a.css"));
        assert_eq!(mapping.get("/a.css"), Some("./a.css"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_shared_path_last_registration_wins() {
        let mut mapping = PathMapping::default();
        mapping.register("https://a.test/app.js", "/app.js", "./app.js");
        mapping.register("https://b.test/app.js", "/app.js", "./app.js");
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping.get("/app.js"), Some("./app.js"));
    }

    #[test]
    fn test_root_path_is_not_a_key() {
        let mut mapping = PathMapping::default();
        mapping.register("https://example.test/", "/", "./index.html");
        assert_eq!(mapping.len(), 1);
        assert!(mapping.get("/").is_none());
    }
}
