//! Frame extraction system
//!
//! This module handles extracting rendered frames from the GPU and
//! preparing them for transfer to the Tauri frontend.

use bevy::{prelude::*, render::renderer::RenderDevice, time::Time};

use crate::bevy::resources::{
    FrameBufferRes, FrameCount, FrameRateLimiter, FrameTimings, MainWorldReceiver, PerfStatsRes,
    PreRollFrames,
};
use crate::config::performance::*;
use crate::tauri_bridge::shared_state::Frame;

/// Publish the latest captured frame to the shared frame buffer
#[allow(clippy::too_many_arguments)]
pub fn extract_and_process_frame(
    receiver: Res<MainWorldReceiver>,
    buffer: Option<Res<FrameBufferRes>>,
    perf_stats: Option<Res<PerfStatsRes>>,
    mut count: ResMut<FrameCount>,
    mut pre_roll: ResMut<PreRollFrames>,
    mut timings: ResMut<FrameTimings>,
    mut frame_limiter: ResMut<FrameRateLimiter>,
    time: Res<Time>,
) {
    let Some(b) = buffer else { return };

    // Wait for scene to be fully rendered
    if pre_roll.0 > 0 {
        while receiver.try_recv().is_ok() {}
        pre_roll.0 -= 1;
        if pre_roll.0 % 10 == 0 && pre_roll.0 > 0 {
            log::debug!("pre-roll frames remaining: {}", pre_roll.0);
        }
        return;
    }

    // Frame rate limiting - skip if not enough time has passed
    let now = std::time::Instant::now();
    let elapsed = now.duration_since(frame_limiter.last_frame_time);
    if elapsed < frame_limiter.min_frame_interval {
        while receiver.try_recv().is_ok() {}
        return;
    }
    frame_limiter.last_frame_time = now;

    let frame_start = std::time::Instant::now();

    // Keep only the newest frame from the render world
    let receive_start = std::time::Instant::now();
    let Some(captured) = receiver.try_iter().last() else {
        return;
    };
    let receive_time = receive_start.elapsed().as_secs_f64() * 1000.0;

    let process_start = std::time::Instant::now();
    let Some(rgba) = remove_row_padding(&captured.data, captured.width, captured.height) else {
        return;
    };
    let process_time = process_start.elapsed().as_secs_f64() * 1000.0;
    let data_size = rgba.len();

    let Ok(mut guard) = b.0 .0.lock() else {
        return;
    };
    *guard = Some(Frame {
        width: captured.width,
        height: captured.height,
        rgba,
    });
    drop(guard);
    count.0 += 1;

    let total_time = frame_start.elapsed().as_secs_f64() * 1000.0;
    timings.frame_times.push(total_time);

    // Keep only last N samples for averaging
    if timings.frame_times.len() > FRAME_TIMING_SAMPLES {
        timings.frame_times.remove(0);
    }
    let avg_time = timings.frame_times.iter().sum::<f64>() / timings.frame_times.len() as f64;

    if let Some(perf_res) = &perf_stats {
        if let Ok(mut stats) = perf_res.0 .0.lock() {
            stats.gpu_transfer_ms = receive_time;
            stats.data_processing_ms = process_time;
            stats.frame_encoding_ms = total_time;
            stats.frame_count = count.0;
            stats.data_size_kb = data_size as f64 / 1024.0;
            stats.frame_width = captured.width;
            stats.frame_height = captured.height;
            stats.bevy_fps = if avg_time > 0.0 { 1000.0 / avg_time } else { 0.0 };
        }
    }

    // Log detailed stats periodically
    let current_time = time.elapsed_secs_f64();
    if current_time - timings.last_print_time >= STATS_PRINT_INTERVAL {
        let max_time = timings.frame_times.iter().cloned().fold(0.0f64, f64::max);
        let min_time = timings.frame_times.iter().cloned().fold(f64::MAX, f64::min);

        log::info!(
            "frame {} {}x{} | receive: {:.2}ms | process: {:.2}ms | total: {:.2}ms | avg: {:.2}ms (min: {:.2}ms, max: {:.2}ms) | size: {:.1}KB",
            count.0,
            captured.width,
            captured.height,
            receive_time,
            process_time,
            total_time,
            avg_time,
            min_time,
            max_time,
            data_size as f64 / 1024.0
        );
        timings.last_print_time = current_time;
    }
}

/// Remove GPU buffer row padding alignment, returning pure RGBA data
pub fn remove_row_padding(data: &[u8], width: u32, height: u32) -> Option<Vec<u8>> {
    let row_bytes = width as usize * 4;
    let aligned_row_bytes = RenderDevice::align_copy_bytes_per_row(row_bytes);
    if height == 0 || data.len() < aligned_row_bytes * (height as usize - 1) + row_bytes {
        return None;
    }

    let rgba_data = if row_bytes == aligned_row_bytes {
        data[..row_bytes * height as usize].to_vec()
    } else {
        data.chunks(aligned_row_bytes)
            .take(height as usize)
            .flat_map(|row| &row[..row_bytes])
            .cloned()
            .collect()
    };

    Some(rgba_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_is_stripped_per_row() {
        // 10 px rows are 40 bytes, padded to the 256-byte copy alignment
        let aligned = RenderDevice::align_copy_bytes_per_row(40);
        assert_eq!(aligned, 256);
        let mut data = vec![0u8; aligned * 2];
        data[..40].fill(1);
        data[aligned..aligned + 40].fill(2);

        let rgba = remove_row_padding(&data, 10, 2).unwrap();
        assert_eq!(rgba.len(), 80);
        assert!(rgba[..40].iter().all(|&b| b == 1));
        assert!(rgba[40..].iter().all(|&b| b == 2));
    }

    #[test]
    fn aligned_rows_pass_through() {
        let data: Vec<u8> = (0..=255u8).cycle().take(256 * 3).collect();
        let rgba = remove_row_padding(&data, 64, 3).unwrap();
        assert_eq!(rgba, data);
    }

    #[test]
    fn limiter_interval_follows_configured_fps() {
        let limiter = FrameRateLimiter::new(30.0);
        assert_eq!(
            limiter.min_frame_interval,
            std::time::Duration::from_secs_f64(1.0 / 30.0)
        );
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(remove_row_padding(&[], 10, 2).is_none());
        assert!(remove_row_padding(&[0; 100], 10, 2).is_none());
    }
}
