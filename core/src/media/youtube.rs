use std::process::{Command, Stdio};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
// Using youtube_dl crate but will configure it to use yt-dlp executable
use youtube_dl::{YoutubeDl, YoutubeDlOutput};

use crate::config::{FetchBackend, ResolverConfig};
use crate::error::FetchError;
use crate::media::resolver::PlaybackConfigFetcher;
use crate::media::stream::{PlaybackConfig, StreamCandidate};

/// Pick the extraction collaborator for the configured backend
pub fn fetcher_for(config: &ResolverConfig) -> Result<Arc<dyn PlaybackConfigFetcher>, FetchError> {
    match config.backend {
        FetchBackend::Innertube => Ok(Arc::new(InnertubeFetcher::new(config)?)),
        FetchBackend::YtDlp => Ok(Arc::new(YtDlpFetcher::new(config))),
    }
}

/// Queries the public player API with an unauthenticated mobile client context
pub struct InnertubeFetcher {
    client: reqwest::Client,
    endpoint: String,
    client_version: String,
}

impl InnertubeFetcher {
    pub fn new(config: &ResolverConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(format!(
                "com.google.android.youtube/{} (Linux; U; Android 11) gzip",
                config.innertube_client_version
            ));

        // Apply proxy if specified
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: format!(
                "{}/youtubei/v1/player?prettyPrint=false",
                config.api_base.trim_end_matches('/')
            ),
            client_version: config.innertube_client_version.clone(),
        })
    }

    fn request_body(&self, site_id: &str) -> PlayerRequest<'_> {
        PlayerRequest {
            video_id: site_id.to_string(),
            context: RequestContext {
                client: ClientContext {
                    client_name: "ANDROID",
                    client_version: &self.client_version,
                    android_sdk_version: 30,
                    hl: "en",
                    gl: "US",
                },
            },
            content_check_ok: true,
            racy_check_ok: true,
        }
    }
}

#[async_trait]
impl PlaybackConfigFetcher for InnertubeFetcher {
    async fn fetch_playback_config(&self, site_id: &str) -> Result<PlaybackConfig, FetchError> {
        debug!("Requesting player response for {} from {}", site_id, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(site_id))
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        check_status(status, &body)?;
        parse_player_response(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Turn a non-success HTTP status into a site rejection, keeping the API's message if it sent one
fn check_status(status: reqwest::StatusCode, body: &str) -> Result<(), FetchError> {
    if status.is_success() {
        return Ok(());
    }

    let reason = serde_json::from_str::<ApiErrorResponse>(body)
        .ok()
        .and_then(|response| response.error.message)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| "no reason given".to_string());
    warn!("Player API answered {}: {}", status, reason);

    Err(FetchError::Rejected {
        status: status.as_u16().to_string(),
        reason,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRequest<'a> {
    video_id: String,
    context: RequestContext<'a>,
    content_check_ok: bool,
    racy_check_ok: bool,
}

#[derive(Serialize)]
struct RequestContext<'a> {
    client: ClientContext<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientContext<'a> {
    client_name: &'a str,
    client_version: &'a str,
    android_sdk_version: u32,
    hl: &'a str,
    gl: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    streaming_data: Option<StreamingData>,
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StreamingData {
    formats: Vec<ApiFormat>,
    adaptive_formats: Vec<ApiFormat>,
    dash_manifest_url: Option<String>,
    hls_manifest_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ApiFormat {
    bitrate: i64,
    url: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct VideoDetails {
    is_live_content: bool,
}

impl From<ApiFormat> for StreamCandidate {
    fn from(format: ApiFormat) -> Self {
        StreamCandidate {
            bitrate: format.bitrate,
            url: format.url,
        }
    }
}

/// Parse a player API response body into a playback configuration
pub fn parse_player_response(body: &str) -> Result<PlaybackConfig, FetchError> {
    let response: PlayerResponse = serde_json::from_str(body)?;

    if let Some(status) = &response.playability_status {
        if status.status != "OK" {
            return Err(FetchError::Rejected {
                status: status.status.clone(),
                reason: status
                    .reason
                    .clone()
                    .unwrap_or_else(|| "no reason given".to_string()),
            });
        }
    }

    let streaming = response.streaming_data.unwrap_or_default();
    let adaptive = streaming
        .adaptive_formats
        .into_iter()
        .filter(|f| {
            f.mime_type
                .as_deref()
                .is_some_and(|mime| mime.starts_with("video/"))
        })
        .map(StreamCandidate::from)
        .collect();

    Ok(PlaybackConfig {
        adaptive,
        muxed: streaming.formats.into_iter().map(StreamCandidate::from).collect(),
        is_live_content: response.video_details.is_some_and(|d| d.is_live_content),
        dash_manifest_url: streaming.dash_manifest_url,
        hls_manifest_url: streaming.hls_manifest_url,
    })
}

/// Runs the external yt-dlp extractor on a blocking worker
pub struct YtDlpFetcher {
    config: ResolverConfig,
}

impl YtDlpFetcher {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

#[async_trait]
impl PlaybackConfigFetcher for YtDlpFetcher {
    async fn fetch_playback_config(&self, site_id: &str) -> Result<PlaybackConfig, FetchError> {
        let url = format!("https://www.youtube.com/watch?v={}", site_id);
        let config = self.config.clone();

        tokio::task::spawn_blocking(move || run_ytdlp(&url, &config)).await?
    }
}

fn run_ytdlp(url: &str, config: &ResolverConfig) -> Result<PlaybackConfig, FetchError> {
    let mut ytdl = YoutubeDl::new(url);

    // Set socket timeout - convert to seconds as string for yt-dlp
    ytdl.socket_timeout(config.timeout_secs.to_string());

    // Apply proxy if specified
    if let Some(proxy) = &config.proxy {
        ytdl.extra_arg("--proxy");
        ytdl.extra_arg(proxy);
    }

    // Use the yt-dlp executable path from config or find it
    let executable = find_ytdlp_executable(config.ytdlp_path.as_deref()).ok_or_else(|| {
        FetchError::Extractor("yt-dlp not found (install yt-dlp or set its path)".to_string())
    })?;
    ytdl.youtube_dl_path(executable);

    debug!("Running extractor for {}", url);
    match ytdl.run() {
        Ok(YoutubeDlOutput::SingleVideo(video)) => {
            let video = *video;
            let formats = video
                .formats
                .unwrap_or_default()
                .into_iter()
                .map(|f| ExtractedFormat {
                    url: f.url,
                    tbr: f.tbr,
                    vcodec: f.vcodec,
                    acodec: f.acodec,
                    manifest_url: f.manifest_url,
                })
                .collect::<Vec<_>>();
            Ok(config_from_formats(formats, video.is_live.unwrap_or(false)))
        }
        Ok(YoutubeDlOutput::Playlist(_)) => Err(FetchError::Extractor(
            "URL refers to a playlist, not a single video".to_string(),
        )),
        Err(e) => Err(FetchError::Extractor(e.to_string())),
    }
}

/// The subset of an extractor format entry that selection needs
#[derive(Debug, Clone, Default)]
struct ExtractedFormat {
    url: Option<String>,
    /// Total bitrate in kbit/s
    tbr: Option<f64>,
    vcodec: Option<String>,
    acodec: Option<String>,
    manifest_url: Option<String>,
}

fn has_codec(codec: &Option<String>) -> bool {
    codec.as_deref().is_some_and(|c| !c.is_empty() && c != "none")
}

fn config_from_formats(formats: Vec<ExtractedFormat>, is_live: bool) -> PlaybackConfig {
    let mut config = PlaybackConfig {
        is_live_content: is_live,
        ..Default::default()
    };

    for format in formats {
        // Segmented formats only contribute their manifest
        if let Some(manifest) = format.manifest_url {
            if manifest.contains(".mpd") {
                config.dash_manifest_url.get_or_insert(manifest);
            } else {
                config.hls_manifest_url.get_or_insert(manifest);
            }
            continue;
        }

        let candidate = StreamCandidate {
            bitrate: format.tbr.map(|tbr| (tbr * 1000.0).round() as i64).unwrap_or(0),
            url: format.url,
        };
        match (has_codec(&format.vcodec), has_codec(&format.acodec)) {
            (true, true) => config.muxed.push(candidate),
            (true, false) => config.adaptive.push(candidate),
            _ => {}
        }
    }

    config
}

/// Find the yt-dlp executable
fn find_ytdlp_executable(configured: Option<&str>) -> Option<String> {
    let works = |program: &str| {
        Command::new(program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|status| status.success())
    };

    // First check custom path from config
    if let Some(path) = configured {
        if works(path) {
            return Some(path.to_string());
        }
        warn!("Configured extractor {} is not usable, trying defaults", path);
    }

    if works("yt-dlp") {
        return Some("yt-dlp".to_string());
    }

    // Check for youtube-dl as fallback
    if works("youtube-dl") {
        info!("Using youtube-dl instead of yt-dlp (consider upgrading to yt-dlp for better performance)");
        return Some("youtube-dl".to_string());
    }

    None
}
