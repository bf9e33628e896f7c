//! audd.io music recognition client
//!
//! Uploads a clip as multipart form data and renders the JSON response into
//! the flat text block the front-end displays. The clip file is deleted as
//! soon as its bytes are in memory, so every exit path of this stage leaves
//! the work directory clean.

use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

/// Response text when the API matched nothing
const NOT_FOUND_TEXT: &str = "No se encontró resultado";

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Recognition stage errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Could not read or delete the clip file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP transport failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("Recognition API returned status {0}")]
    Status(u16),

    /// Response body was not valid JSON
    #[error("Failed to parse recognition response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Client for the audd.io recognition API
#[derive(Debug, Clone)]
pub struct AuddClient {
    http: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl AuddClient {
    pub fn new(base_url: String, api_token: String) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_token,
        })
    }

    /// Recognize the song in a clip file.
    ///
    /// The file is consumed: its bytes are read into memory and the file is
    /// deleted before the upload, success or failure. Returns the formatted
    /// metadata text, or the not-found text when the API matched nothing.
    pub async fn recognize(&self, clip: &Path) -> Result<String, RecognitionError> {
        let bytes = match tokio::fs::read(clip).await {
            Ok(bytes) => {
                remove_clip(clip).await;
                bytes
            }
            Err(e) => {
                remove_clip(clip).await;
                return Err(e.into());
            }
        };

        let file_name = clip
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip.mp3".to_string());

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("return", "apple_music,spotify")
            .text("api_token", self.api_token.clone());

        debug!(endpoint = %self.base_url, "Uploading clip for recognition");

        let response = self.http.post(&self.base_url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecognitionError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let json: Value = serde_json::from_str(&body)?;
        Ok(render_result(&json))
    }
}

/// Render the API response into the displayed text block.
///
/// The presence of a non-null top-level `result` is the sole match/no-match
/// discriminator; missing nested fields render as empty strings.
fn render_result(body: &Value) -> String {
    let result = match body.get("result") {
        Some(r) if !r.is_null() => r,
        _ => return NOT_FOUND_TEXT.to_string(),
    };

    let field = |v: &Value, key: &str| -> String {
        v.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let artist = field(result, "artist");
    let title = field(result, "title");
    let album = field(result, "album");
    let release_date = field(result, "release_date");
    let song_link = field(result, "song_link");

    let apple_music = result
        .get("apple_music")
        .map(|a| field(a, "url"))
        .unwrap_or_default();
    let spotify = result
        .get("spotify")
        .and_then(|s| s.get("external_urls"))
        .map(|e| field(e, "spotify"))
        .unwrap_or_default();

    format!(
        "Artista: {artist}\nTítulo: {title}\nÁlbum: {album}\n\
         Fecha de lanzamiento: {release_date}\nLink canción: {song_link}\n\
         Apple Music: {apple_music}\nSpotify: {spotify}"
    )
}

async fn remove_clip(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!(path = %path.display(), "Deleted clip file"),
        Err(e) => warn!(path = %path.display(), "Could not delete clip file: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn write_clip(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("clip-test.mp3");
        std::fs::write(&path, b"fake mp3 bytes").unwrap();
        path
    }

    fn client(base_url: String) -> AuddClient {
        AuddClient::new(base_url, "test-token".to_string()).unwrap()
    }

    #[test]
    fn renders_full_result() {
        let body = json!({
            "status": "success",
            "result": {
                "artist": "Daft Punk",
                "title": "Around the World",
                "album": "Homework",
                "release_date": "1997-01-20",
                "song_link": "https://lis.tn/AroundTheWorld",
                "apple_music": { "url": "https://music.apple.com/x" },
                "spotify": { "external_urls": { "spotify": "https://open.spotify.com/x" } }
            }
        });

        let text = render_result(&body);
        assert!(text.contains("Artista: Daft Punk"));
        assert!(text.contains("Título: Around the World"));
        assert!(text.contains("Álbum: Homework"));
        assert!(text.contains("Fecha de lanzamiento: 1997-01-20"));
        assert!(text.contains("Link canción: https://lis.tn/AroundTheWorld"));
        assert!(text.contains("Apple Music: https://music.apple.com/x"));
        assert!(text.contains("Spotify: https://open.spotify.com/x"));
    }

    #[test]
    fn missing_fields_render_as_empty_strings() {
        let body = json!({ "result": { "artist": "Solo Artist" } });

        let text = render_result(&body);
        assert!(text.contains("Artista: Solo Artist"));
        assert!(text.contains("Título: \n"));
        assert!(text.contains("Apple Music: \n"));
        assert!(text.ends_with("Spotify: "));
    }

    #[test]
    fn absent_result_yields_not_found_text() {
        assert_eq!(render_result(&json!({ "status": "success" })), NOT_FOUND_TEXT);
        assert_eq!(render_result(&json!({ "result": null })), NOT_FOUND_TEXT);
    }

    #[tokio::test]
    async fn successful_recognition_deletes_clip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"status":"success","result":{"artist":"A","title":"T"}}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(&dir);

        let text = client(server.url()).recognize(&clip).await.unwrap();
        assert!(text.contains("Artista: A"));
        assert!(!clip.exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn not_found_response_deletes_clip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body(r#"{"status":"success","result":null}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(&dir);

        let text = client(server.url()).recognize(&clip).await.unwrap();
        assert_eq!(text, NOT_FOUND_TEXT);
        assert!(!clip.exists());
    }

    #[tokio::test]
    async fn server_error_still_deletes_clip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(502)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(&dir);

        let err = client(server.url()).recognize(&clip).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Status(502)));
        assert!(!clip.exists());
    }

    #[tokio::test]
    async fn malformed_body_still_deletes_clip() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(200)
            .with_body("this is not json")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let clip = write_clip(&dir);

        let err = client(server.url()).recognize(&clip).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Parse(_)));
        assert!(!clip.exists());
    }

    #[tokio::test]
    async fn unreadable_clip_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-written.mp3");

        let err = client("http://127.0.0.1:9".to_string())
            .recognize(&missing)
            .await
            .unwrap_err();
        assert!(matches!(err, RecognitionError::Io(_)));
    }
}
