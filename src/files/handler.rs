//! GET and POST handling for the file-serving deployment.

use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::{FileConfig, LimitsConfig};
use crate::files::content_type::{content_type_for, extension_of};
use crate::files::path::{confine, normalize};
use crate::http::response::TEXT_PLAIN;
use crate::http::{ParsedRequest, RequestError, Response};

/// Serves and stores files beneath one base directory.
#[derive(Debug, Clone)]
pub struct FileHandler {
    base_dir: PathBuf,
    allowed_extensions: Vec<String>,
    max_body_bytes: u64,
}

impl FileHandler {
    pub fn new(files: &FileConfig, limits: &LimitsConfig) -> Self {
        Self {
            base_dir: files.base_dir.clone(),
            allowed_extensions: files.allowed_extensions.clone(),
            max_body_bytes: limits.max_body_bytes,
        }
    }

    /// Serve the file named by the request path.
    pub async fn get(&self, request: &ParsedRequest) -> Result<Response, RequestError> {
        let path = request.path();
        let extension = self.allowed_extension(path)?;
        let target = self.resolve(path).await?;

        let data = match fs::read(&target).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RequestError::NotFound(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path, bytes = data.len(), "Serving file");
        Ok(Response::ok(content_type_for(extension), data))
    }

    /// Store the request body at the request path.
    ///
    /// Two uploads to the same name race; the last writer wins.
    pub async fn upload<B>(&self, request: &ParsedRequest, mut body: B) -> Result<Response, RequestError>
    where
        B: AsyncRead + Unpin,
    {
        let path = request.path();
        self.allowed_extension(path)?;
        let target = self.resolve(path).await?;

        let declared = request.content_length();
        if declared > self.max_body_bytes {
            return Err(RequestError::PayloadTooLarge(declared, self.max_body_bytes));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut data = Vec::with_capacity(declared.min(64 * 1024) as usize);
        body.read_to_end(&mut data).await?;
        if (data.len() as u64) < declared {
            return Err(RequestError::Io(std::io::Error::new(
                ErrorKind::UnexpectedEof,
                format!("body ended after {} of {} bytes", data.len(), declared),
            )));
        }

        fs::write(&target, &data).await?;

        tracing::info!(path = %path, bytes = data.len(), "File uploaded");
        Ok(Response::ok(TEXT_PLAIN, b"File uploaded successfully".to_vec()))
    }

    fn allowed_extension<'p>(&self, path: &'p str) -> Result<&'p str, RequestError> {
        extension_of(path)
            .filter(|ext| self.allowed_extensions.iter().any(|allowed| allowed == ext))
            .ok_or_else(|| RequestError::InvalidExtension(path.to_string()))
    }

    async fn resolve(&self, path: &str) -> Result<PathBuf, RequestError> {
        let target = self.base_dir.join(normalize(path)?);
        confine(&self.base_dir, &target, path).await?;
        Ok(target)
    }
}
