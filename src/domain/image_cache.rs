use std::fs::{self, File};
use std::path::{Path, PathBuf};

use reqwest::Url;
use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};

const CACHE_SUBDIR: &str = "openshift-installer/image_cache";
const DEFAULT_IMAGE_FILE: &str = "rhcos-image";
const PARTIAL_SUFFIX: &str = ".part";

/// Resolves a base image URL to a file on the local disk.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> Result<PathBuf>;
}

/// Downloads images once into a cache directory and reuses them afterwards.
///
/// Every URL gets its own `<sha256(url)>/<file name>` entry, so images that share a
/// file name never shadow each other.
#[derive(Debug)]
pub struct ImageCache {
    cache_dir: PathBuf,
    client: Client,
}

fn download_error(url: &str, reason: impl ToString) -> Error {
    Error::ImageDownload { url: url.to_string(), reason: reason.to_string() }
}

fn local_image(url: &str, path: PathBuf) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(download_error(url, "file does not exist"));
    }
    Ok(path)
}

impl ImageCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        ImageCache { cache_dir: cache_dir.into(), client: Client::new() }
    }

    /// `$XDG_CACHE_HOME/openshift-installer/image_cache`, falling back to `~/.cache`.
    pub fn default_location() -> Result<Self> {
        let base = match std::env::var("XDG_CACHE_HOME") {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => {
                let home = std::env::var("HOME").map_err(|_| Error::Config("HOME is not set".to_string()))?;
                PathBuf::from(home).join(".cache")
            }
        };
        Ok(Self::new(base.join(CACHE_SUBDIR)))
    }

    fn file_name(url: &Url) -> &str {
        url.path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_IMAGE_FILE)
    }

    fn cache_path(&self, url: &Url) -> PathBuf {
        let digest = hex::encode(Sha256::digest(url.as_str().as_bytes()));
        self.cache_dir.join(digest).join(Self::file_name(url))
    }

    fn download(&self, url: &Url, target: &Path) -> Result<()> {
        let mut response = self.client.get(url.clone()).send().map_err(|e| download_error(url.as_str(), e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(download_error(url.as_str(), format!("server returned {}", status)));
        }

        if let Some(dir) = target.parent() {
            fs::create_dir_all(dir).map_err(|e| download_error(url.as_str(), e))?;
        }

        let mut partial = target.as_os_str().to_owned();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        let written = File::create(&partial)
            .map_err(|e| download_error(url.as_str(), e))
            .and_then(|mut file| response.copy_to(&mut file).map_err(|e| download_error(url.as_str(), e)))
            .and_then(|_| fs::rename(&partial, target).map_err(|e| download_error(url.as_str(), e)));

        if written.is_err() {
            if let Err(e) = fs::remove_file(&partial) {
                log::debug!("Could not remove partial download '{}': {}", partial.display(), e);
            }
        }
        written
    }
}

impl ImageFetcher for ImageCache {
    fn fetch(&self, url: &str) -> Result<PathBuf> {
        if url.starts_with('/') {
            return local_image(url, PathBuf::from(url));
        }

        let parsed = Url::parse(url).map_err(|e| download_error(url, e))?;

        match parsed.scheme() {
            "file" => {
                let path = parsed.to_file_path().map_err(|_| download_error(url, "not a local path"))?;
                local_image(url, path)
            }
            "http" | "https" => {
                let target = self.cache_path(&parsed);
                if target.is_file() {
                    log::info!("Using cached image '{}' for {}", target.display(), url);
                    return Ok(target);
                }
                log::info!("Downloading image {} into '{}'", url, target.display());
                self.download(&parsed, &target)?;
                Ok(target)
            }
            scheme => Err(download_error(url, format!("unsupported scheme {}", scheme))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    fn cached_files(dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                files.extend(cached_files(&path));
            } else {
                files.push(path);
            }
        }
        files
    }

    #[test]
    fn test_download_is_cached() {
        let server = MockServer::start();
        let image = server.mock(|when, then| {
            when.method(GET).path("/images/rhcos-openstack.qcow2");
            then.status(200).body("qcow2-bytes");
        });
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let url = server.url("/images/rhcos-openstack.qcow2");

        let first = cache.fetch(&url).unwrap();
        let second = cache.fetch(&url).unwrap();

        assert_eq!(first, second);
        assert!(first.starts_with(dir.path()));
        assert_eq!(first.file_name().unwrap(), "rhcos-openstack.qcow2");
        assert_eq!(fs::read_to_string(&first).unwrap(), "qcow2-bytes");
        image.assert_hits(1);
    }

    #[test]
    fn test_same_file_name_different_urls() {
        let server = MockServer::start();
        let old = server.mock(|when, then| {
            when.method(GET).path("/4.7/rhcos.qcow2");
            then.status(200).body("old-4.7");
        });
        let new = server.mock(|when, then| {
            when.method(GET).path("/4.8/rhcos.qcow2");
            then.status(200).body("new-4.8");
        });
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path());

        let first = cache.fetch(&server.url("/4.7/rhcos.qcow2")).unwrap();
        let second = cache.fetch(&server.url("/4.8/rhcos.qcow2")).unwrap();

        assert_ne!(first, second);
        assert_eq!(fs::read_to_string(&first).unwrap(), "old-4.7");
        assert_eq!(fs::read_to_string(&second).unwrap(), "new-4.8");
        old.assert_hits(1);
        new.assert_hits(1);
    }

    #[test]
    fn test_failed_download() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.qcow2");
            then.status(404);
        });
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path());

        let err = cache.fetch(&server.url("/missing.qcow2")).unwrap_err();
        assert!(matches!(err, Error::ImageDownload { .. }));
        assert!(cached_files(dir.path()).is_empty());
    }

    #[test]
    fn test_truncated_download_leaves_no_partial_file() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            stream.write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1024\r\n\r\nqcow2").unwrap();
        });

        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        let err = cache.fetch(&format!("http://{}/images/rhcos.qcow2", addr)).unwrap_err();
        server.join().unwrap();

        assert!(matches!(err, Error::ImageDownload { .. }), "{:?}", err);
        assert!(cached_files(dir.path()).is_empty());
    }

    #[test]
    fn test_local_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("local.qcow2");
        fs::write(&image, b"local").unwrap();

        let cache = ImageCache::new(dir.path().join("cache"));
        let url = Url::from_file_path(&image).unwrap();
        assert_eq!(cache.fetch(url.as_str()).unwrap(), image);
        assert_eq!(cache.fetch(image.to_str().unwrap()).unwrap(), image);
        assert!(cache.fetch("/does/not/exist.qcow2").is_err());
    }
}
