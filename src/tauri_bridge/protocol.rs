//! Custom protocol handlers for efficient data transfer
//!
//! This module implements the `frame://` custom protocol for direct binary
//! transfer of render frames, bypassing Tauri's IPC JSON serialization.

use image::{codecs::jpeg::JpegEncoder, ImageBuffer, ImageEncoder, Rgba};
use tauri::http::Response as HttpResponse;

use super::shared_state::{Frame, SharedFrameBuffer, SharedPerfStats};
use crate::config::compression::JPEG_QUALITY;

type Response = HttpResponse<Vec<u8>>;

/// Handle requests to the custom `frame://` protocol
///
/// Supported endpoints:
/// - `frame` or `frame.jpg`: JPEG-compressed frame
/// - `frame.raw`: Raw RGBA frame
/// - `stats`: Performance statistics as JSON
pub fn handle_frame_protocol(
    uri_path: &str,
    buffer: &SharedFrameBuffer,
    perf_stats: &SharedPerfStats,
) -> Response {
    let resource = uri_path.trim_start_matches('/');
    log::trace!("frame protocol request: {resource}");

    match resource {
        "frame" | "frame.jpg" => with_frame(buffer, jpeg_response),
        "frame.raw" => with_frame(buffer, |frame| {
            frame_response(frame, "application/octet-stream", frame.rgba.clone())
        }),
        "stats" => handle_stats(perf_stats),
        _ => text_response(404, "Not Found"),
    }
}

fn with_frame(buffer: &SharedFrameBuffer, respond: impl FnOnce(&Frame) -> Response) -> Response {
    let Ok(guard) = buffer.0.lock() else {
        return text_response(500, "Frame buffer unavailable");
    };
    match &*guard {
        Some(frame) => respond(frame),
        None => text_response(503, "Frame not ready"),
    }
}

/// Compress the frame to JPEG; the alpha channel is dropped
fn jpeg_response(frame: &Frame) -> Response {
    let Some(img) =
        ImageBuffer::<Rgba<u8>, _>::from_raw(frame.width, frame.height, frame.rgba.clone())
    else {
        log::warn!(
            "frame of {} bytes does not match {}x{}",
            frame.rgba.len(),
            frame.width,
            frame.height
        );
        return text_response(500, "Malformed frame");
    };
    let rgb_img = image::DynamicImage::ImageRgba8(img).to_rgb8();

    let mut jpeg_data = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut jpeg_data, JPEG_QUALITY);
    if let Err(e) = encoder.write_image(
        rgb_img.as_raw(),
        frame.width,
        frame.height,
        image::ExtendedColorType::Rgb8,
    ) {
        log::warn!("jpeg encoding failed: {e}");
        return text_response(500, "Encoding failed");
    }

    frame_response(frame, "image/jpeg", jpeg_data)
}

fn frame_response(frame: &Frame, content_type: &str, body: Vec<u8>) -> Response {
    HttpResponse::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("X-Frame-Width", frame.width.to_string())
        .header("X-Frame-Height", frame.height.to_string())
        .header("Access-Control-Allow-Origin", "*")
        .header(
            "Access-Control-Expose-Headers",
            "X-Frame-Width, X-Frame-Height",
        )
        .body(body)
        .unwrap_or_default()
}

/// Handle performance stats request
fn handle_stats(perf_stats: &SharedPerfStats) -> Response {
    let Ok(guard) = perf_stats.0.lock() else {
        return text_response(500, "Stats unavailable");
    };
    let json = serde_json::to_vec(&*guard).unwrap_or_default();

    HttpResponse::builder()
        .status(200)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(json)
        .unwrap_or_default()
}

fn text_response(status: u16, message: &str) -> Response {
    HttpResponse::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(message.as_bytes().to_vec())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(frame: Option<Frame>) -> SharedFrameBuffer {
        let buffer = SharedFrameBuffer::default();
        *buffer.0.lock().unwrap() = frame;
        buffer
    }

    fn solid_frame(width: u32, height: u32) -> Frame {
        Frame {
            width,
            height,
            rgba: [200u8, 100, 50, 255].repeat((width * height) as usize),
        }
    }

    #[test]
    fn frame_before_first_render_is_unavailable() {
        let response =
            handle_frame_protocol("/frame", &buffer_with(None), &SharedPerfStats::default());
        assert_eq!(response.status(), 503);
    }

    #[test]
    fn jpeg_carries_frame_dimensions() {
        let buffer = buffer_with(Some(solid_frame(32, 16)));
        let response = handle_frame_protocol("/frame.jpg", &buffer, &SharedPerfStats::default());

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["X-Frame-Width"], "32");
        assert_eq!(response.headers()["X-Frame-Height"], "16");
        // JPEG SOI marker
        assert_eq!(&response.body()[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn raw_frame_is_passed_through() {
        let frame = solid_frame(4, 4);
        let expected = frame.rgba.clone();
        let response = handle_frame_protocol(
            "frame.raw",
            &buffer_with(Some(frame)),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), &expected);
    }

    #[test]
    fn mismatched_frame_size_is_a_server_error() {
        let mut frame = solid_frame(4, 4);
        frame.rgba.truncate(10);
        let response = handle_frame_protocol(
            "/frame",
            &buffer_with(Some(frame)),
            &SharedPerfStats::default(),
        );
        assert_eq!(response.status(), 500);
    }

    #[test]
    fn stats_are_json() {
        let stats = SharedPerfStats::default();
        stats.0.lock().unwrap().camera_resets = 3;
        let response = handle_frame_protocol("/stats", &buffer_with(None), &stats);

        let json: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(json["camera_resets"], 3);
    }

    #[test]
    fn unknown_path_is_not_found() {
        let response =
            handle_frame_protocol("/nope", &buffer_with(None), &SharedPerfStats::default());
        assert_eq!(response.status(), 404);
    }
}
