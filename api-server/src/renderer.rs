// Rendering through the external Graphviz `dot` executable

use async_trait::async_trait;
use graphviz_render_core::ImageFormat;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Rendering errors
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("could not start Graphviz ({binary}): {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Graphviz exited with status {status}")]
    Failed { status: String, stderr: String },

    #[error("Graphviz produced no output")]
    EmptyOutput,

    #[error("I/O error while talking to Graphviz: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Engine diagnostics, when there are any
    pub fn details(&self) -> Option<&str> {
        match self {
            RenderError::Failed { stderr, .. } if !stderr.is_empty() => Some(stderr),
            _ => None,
        }
    }
}

/// Turns DOT source into image bytes
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError>;
}

/// Renderer backed by the `dot` command line tool
///
/// Runs `dot -T<format>` with the source on stdin and reads the image from
/// stdout. The working directory is the DOT directory so relative
/// `image="..."` attributes resolve.
#[derive(Debug, Clone)]
pub struct GraphvizRenderer {
    binary: PathBuf,
    working_dir: PathBuf,
}

impl GraphvizRenderer {
    pub fn new(binary: impl AsRef<Path>, working_dir: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl Renderer for GraphvizRenderer {
    async fn render(&self, source: &str, format: ImageFormat) -> Result<Vec<u8>, RenderError> {
        let mut child = Command::new(&self.binary)
            .arg(format!("-T{}", format.extension()))
            .current_dir(&self.working_dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Spawn {
                binary: self.binary.display().to_string(),
                source,
            })?;

        // Feed stdin concurrently so a large output cannot block on a full pipe
        let writer = child.stdin.take().map(|mut stdin| {
            let input = source.as_bytes().to_vec();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(&input).await {
                    return Err(e);
                }
                stdin.shutdown().await
            })
        });

        let output = child.wait_with_output().await?;

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {}
                Ok(Err(e)) => return Err(RenderError::Io(e)),
                Err(join_error) => {
                    return Err(RenderError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        join_error,
                    )))
                }
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(status = %output.status, stderr = %stderr, "Graphviz render failed");
            return Err(RenderError::Failed {
                status: output.status.to_string(),
                stderr,
            });
        }

        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput);
        }

        tracing::debug!(format = %format, bytes = output.stdout.len(), "Graphviz render complete");
        Ok(output.stdout)
    }
}
