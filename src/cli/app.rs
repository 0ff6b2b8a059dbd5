//! Interactive record flow
//!
//! Terminal front end for the three-segment flow. Enter toggles the hold:
//! the first press arms the gesture debounce, the next release stops the
//! take. Single-letter commands handle recovery between takes.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::ports::{CaptureDevice, ConfigStore, UploadClient};
use crate::application::{
    CaptureSession, GestureController, GestureEvent, SegmentOrchestrator, SessionEvent,
    StopOutcome,
};
use crate::domain::config::AppConfig;
use crate::domain::recording::Duration;
use crate::domain::segment::{SegmentStatus, MAX_RETRIES, SEGMENT_COUNT};
use crate::infrastructure::{CpalDevice, HttpUploadClient, XdgConfigStore};

use super::presenter::Presenter;

/// All segments uploaded and the URL list printed
pub const EXIT_SUCCESS: u8 = 0;
/// The flow ended before all segments were uploaded
pub const EXIT_ERROR: u8 = 1;
/// Invalid arguments or configuration
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Load configuration with precedence: defaults < file < cli.
/// Environment variables arrive through the CLI parser.
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    AppConfig::defaults().merge(file_config).merge(cli_config)
}

/// Resolved settings for one record run
pub struct RecordOptions {
    pub endpoint: String,
    pub task_id: String,
    pub limit: Duration,
    pub debounce: Duration,
}

/// Run the interactive three-segment record flow to completion
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let device = Arc::new(CpalDevice::new());
    let (session, session_rx) = CaptureSession::new(device, options.limit);
    let uploader = Arc::new(HttpUploadClient::new(&options.endpoint));
    let orchestrator = SegmentOrchestrator::new(session, uploader, options.task_id.clone());
    let (gesture, gesture_rx) = GestureController::with_debounce(options.debounce);

    let mut presenter = Presenter::new();
    run_loop(
        &orchestrator,
        &gesture,
        gesture_rx,
        session_rx,
        &mut presenter,
        options.limit,
    )
    .await
}

async fn run_loop<D, U>(
    orchestrator: &SegmentOrchestrator<D, U>,
    gesture: &GestureController,
    mut gesture_rx: mpsc::Receiver<GestureEvent>,
    mut session_rx: mpsc::Receiver<SessionEvent>,
    presenter: &mut Presenter,
    limit: Duration,
) -> ExitCode
where
    D: CaptureDevice + 'static,
    U: UploadClient,
{
    presenter.info(&format!(
        "Recording {} segments of up to {} each.",
        SEGMENT_COUNT, limit
    ));
    presenter.info("Press Enter to start holding, Enter again to release. r = retry upload, n = re-record, q = quit.");
    presenter.info(&format!("Hold Enter to record segment 1/{}", SEGMENT_COUNT));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pressed = false;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Ok(Some(line)) = line else {
                    presenter.warn("Input closed before all segments were uploaded");
                    return ExitCode::from(EXIT_ERROR);
                };
                match line.trim() {
                    "q" => {
                        presenter.warn("Aborted");
                        return ExitCode::from(EXIT_ERROR);
                    }
                    "r" => {
                        if let Err(e) = orchestrator.retry_upload().await {
                            presenter.error(&e.to_string());
                            continue;
                        }
                        if let Some(code) = settle_segment(orchestrator, presenter).await {
                            return code;
                        }
                    }
                    "n" => {
                        match orchestrator.re_record().await {
                            Ok(()) => presenter.info(&format!(
                                "Hold Enter to record segment {}/{}",
                                orchestrator.current_index().await + 1,
                                SEGMENT_COUNT
                            )),
                            Err(e) => presenter.error(&e.to_string()),
                        }
                    }
                    "" => {
                        if pressed {
                            pressed = false;
                            gesture.release().await;
                        } else {
                            pressed = true;
                            gesture.press();
                        }
                    }
                    other => presenter.warn(&format!("Unknown command: {}", other)),
                }
            }
            event = gesture_rx.recv() => {
                let Some(event) = event else { return ExitCode::from(EXIT_ERROR); };
                match event {
                    GestureEvent::HoldConfirmed => {
                        if let Err(e) = orchestrator.begin_segment().await {
                            presenter.error(&e.to_string());
                            continue;
                        }
                        let segment = orchestrator.current_segment().await;
                        if segment.status() == SegmentStatus::Recording {
                            presenter.start_meter(limit.as_secs());
                        } else if let Some(code) = settle_segment(orchestrator, presenter).await {
                            return code;
                        }
                    }
                    GestureEvent::Released => {
                        match orchestrator.stop_segment().await {
                            Ok(StopOutcome::Finalized) => {
                                presenter.finish_meter();
                                if let Some(code) = settle_segment(orchestrator, presenter).await {
                                    return code;
                                }
                            }
                            Ok(StopOutcome::AlreadyStopped) => {}
                            Err(e) => presenter.error(&e.to_string()),
                        }
                    }
                }
            }
            event = session_rx.recv() => {
                let Some(event) = event else { return ExitCode::from(EXIT_ERROR); };
                match event {
                    SessionEvent::Elapsed { secs, .. } => presenter.update_elapsed(secs),
                    SessionEvent::Volume { level, .. } => presenter.update_volume(level),
                    SessionEvent::AutoStop { .. } => {
                        // Clear the held gesture so the loop is back in sync;
                        // the resulting release observes the finalized segment.
                        pressed = false;
                        gesture.release().await;
                        match orchestrator.handle_event(&event).await {
                            Ok(StopOutcome::Finalized) => {
                                presenter.finish_meter();
                                presenter.warn("Time limit reached; recording stopped");
                                if let Some(code) = settle_segment(orchestrator, presenter).await {
                                    return code;
                                }
                            }
                            Ok(StopOutcome::AlreadyStopped) => {}
                            Err(e) => presenter.error(&e.to_string()),
                        }
                    }
                }
            }
        }
    }
}

/// Report the just-settled segment and steer the flow: advance after an
/// upload, finish after the last one, lay out recovery options on error.
/// Returns an exit code once the whole flow is over.
async fn settle_segment<D, U>(
    orchestrator: &SegmentOrchestrator<D, U>,
    presenter: &mut Presenter,
) -> Option<ExitCode>
where
    D: CaptureDevice + 'static,
    U: UploadClient,
{
    let segment = orchestrator.current_segment().await;
    match segment.status() {
        SegmentStatus::Uploaded => {
            if let Some(url) = segment.remote_url() {
                presenter.success(&format!(
                    "Segment {}/{} uploaded: {}",
                    segment.position() + 1,
                    SEGMENT_COUNT,
                    url
                ));
            }

            if let Ok(completed) = orchestrator.finish().await {
                presenter.success("All segments uploaded");
                for segment in completed {
                    presenter.output(&segment.remote_url);
                }
                return Some(ExitCode::from(EXIT_SUCCESS));
            }

            match orchestrator.advance().await {
                Ok(next) => presenter.info(&format!(
                    "Hold Enter to record segment {}/{}",
                    next + 1,
                    SEGMENT_COUNT
                )),
                Err(e) => {
                    presenter.error(&e.to_string());
                    return Some(ExitCode::from(EXIT_ERROR));
                }
            }
        }
        SegmentStatus::Error => {
            if let Some(message) = segment.error_message() {
                presenter.error(message);
            }
            if segment.payload().is_some() && segment.retry_count() < MAX_RETRIES {
                presenter.info(&format!(
                    "r = retry upload ({}/{} attempts used), n = re-record, or hold Enter to record again",
                    segment.retry_count(),
                    MAX_RETRIES
                ));
            } else {
                presenter.info("Hold Enter to record this segment again");
            }
        }
        _ => {}
    }
    None
}
