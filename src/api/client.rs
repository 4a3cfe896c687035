use image::DynamicImage;
use reqwest::Url;
use std::time::Duration;

use super::{FetchError, ImageMode, SpriteSource};
use crate::config::Config;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PATHS_ENDPOINT: &str = "/pokemon/get_all_pokemon_images/";

/// HTTP access to the image service. The base URL comes from the `Config`
/// handed to [`HttpSpriteClient::new`] and never changes afterwards.
pub struct HttpSpriteClient {
    config: Config,
    client: reqwest::Client,
}

impl HttpSpriteClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        parse_url(&config.api_url)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            config: config.clone(),
            client,
        })
    }

    pub fn paths_url(&self, monster_id: u32, mode: ImageMode) -> Result<Url, FetchError> {
        let mut url = parse_url(&format!("{}{}", self.config.api_url, PATHS_ENDPOINT))?;
        url.query_pairs_mut()
            .append_pair("pokemon_id", &monster_id.to_string())
            .append_pair("option", mode.as_str());
        Ok(url)
    }

    pub fn sheet_url(&self, image_path: &str) -> Result<Url, FetchError> {
        parse_url(&self.config.image_url(image_path))
    }

    async fn get_bytes(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        log::debug!("GET {}", url);
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status().as_u16()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

impl SpriteSource for HttpSpriteClient {
    async fn fetch_paths(&self, monster_id: u32, mode: ImageMode) -> Result<Vec<String>, FetchError> {
        let url = self.paths_url(monster_id, mode)?;
        let body = self.get_bytes(url).await?;
        // The service answers `null` for a monster without images.
        let paths: Option<Vec<String>> = serde_json::from_slice(&body)?;
        Ok(paths.unwrap_or_default())
    }

    async fn fetch_sheet(&self, image_path: &str) -> Result<DynamicImage, FetchError> {
        let url = self.sheet_url(image_path)?;
        let body = self.get_bytes(url).await?;
        Ok(image::load_from_memory(&body)?)
    }
}

fn parse_url(raw: &str) -> Result<Url, FetchError> {
    Url::parse(raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::{Cursor, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    // Answers exactly one request and hands back its request line.
    fn serve_once(status: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let mut response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            )
            .into_bytes();
            response.extend_from_slice(&body);
            // Error responses may be dropped by the client before it reads the body.
            let _ = stream.write_all(&response);
            let _ = stream.flush();

            String::from_utf8_lossy(&request)
                .lines()
                .next()
                .unwrap_or_default()
                .to_string()
        });

        (base, handle)
    }

    fn client_for(base: &str) -> HttpSpriteClient {
        let config = Config::default().with_api_url_override(Some(base.to_string()));
        HttpSpriteClient::new(&config).unwrap()
    }

    #[test]
    fn test_paths_url_carries_query() {
        let client = client_for("http://localhost:8000/");
        let url = client.paths_url(36, ImageMode::Animations).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/pokemon/get_all_pokemon_images/?pokemon_id=36&option=animations"
        );
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let mut config = Config::default();
        config.api_url = String::new();
        let err = HttpSpriteClient::new(&config).err().unwrap();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_fetch_paths() {
        let body = br#"["srv\\images\\32\\animations\\walk.png","srv\\images\\32\\animations\\idle.png"]"#;
        let (base, server) = serve_once("200 OK", body.to_vec());
        let client = client_for(&base);

        let paths = client.fetch_paths(32, ImageMode::Animations).await.unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths[0].ends_with("walk.png"));

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /pokemon/get_all_pokemon_images/?pokemon_id=32&option=animations"));
    }

    #[tokio::test]
    async fn test_fetch_paths_null_is_empty() {
        let (base, server) = serve_once("200 OK", b"null".to_vec());
        let client = client_for(&base);

        let paths = client.fetch_paths(1, ImageMode::Base).await.unwrap();
        assert!(paths.is_empty());
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_paths_status_error() {
        let (base, server) = serve_once("404 Not Found", b"{\"detail\":\"no pokemon\"}".to_vec());
        let client = client_for(&base);

        let err = client.fetch_paths(99, ImageMode::Base).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_paths_bad_json() {
        let (base, server) = serve_once("200 OK", b"{\"paths\":[]}".to_vec());
        let client = client_for(&base);

        let err = client.fetch_paths(1, ImageMode::Base).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        server.join().unwrap();
    }

    #[tokio::test]
    async fn test_fetch_sheet_decodes_png() {
        let sheet = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
        let mut png = Vec::new();
        DynamicImage::ImageRgba8(sheet)
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();

        let (base, server) = serve_once("200 OK", png);
        let client = client_for(&base);

        let img = client.fetch_sheet("/32/animations/walk.png").await.unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /images/32/animations/walk.png"));
    }
}
