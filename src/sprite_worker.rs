// Sprite worker: runs image service requests off the UI thread

use crossbeam_channel::{Receiver, Sender, unbounded};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

use crate::api::{ImageMode, SpriteSource};
use crate::event::{AppMsg, ViewTarget};
use crate::model::sprite::resolve;

#[derive(Clone, Debug)]
pub enum FetchJob {
    Paths {
        target: ViewTarget,
        monster_id: u32,
        mode: ImageMode,
    },
    Sheet {
        target: ViewTarget,
        image_path: String,
    },
}

impl FetchJob {
    /// A sheet job for a single-sheet view is stale once a newer sheet job
    /// for that view is queued behind it.
    fn is_superseded(&self, queued: &VecDeque<FetchJob>) -> bool {
        let FetchJob::Sheet { target, .. } = self else {
            return false;
        };
        target.shows_one_sheet()
            && queued
                .iter()
                .any(|later| matches!(later, FetchJob::Sheet { target: t, .. } if t == target))
    }

    fn skipped(self) -> Option<AppMsg> {
        match self {
            FetchJob::Sheet { target, image_path } => {
                log::debug!("Skipping sheet {}: superseded", image_path);
                Some(AppMsg::SheetSkipped { target, image_path })
            }
            FetchJob::Paths { .. } => None,
        }
    }
}

/// Handle to the worker thread. Jobs run one at a time on a current-thread
/// tokio runtime; every job answers with exactly one `AppMsg` on `tx`. Stale
/// sheet jobs are answered with `SheetSkipped` instead of being fetched. The
/// thread exits once the handle is dropped.
pub struct SpriteWorker {
    jobs: Sender<FetchJob>,
}

impl SpriteWorker {
    pub fn spawn<S>(source: S, tx: Sender<AppMsg>) -> Self
    where
        S: SpriteSource + Send + 'static,
    {
        let (jobs, rx) = unbounded();
        thread::spawn(move || Self::run(source, rx, tx));
        Self { jobs }
    }

    pub fn request_paths(&self, target: ViewTarget, monster_id: u32, mode: ImageMode) {
        self.submit(FetchJob::Paths {
            target,
            monster_id,
            mode,
        });
    }

    pub fn request_sheets(&self, target: ViewTarget, image_paths: &[String]) {
        for image_path in image_paths {
            self.submit(FetchJob::Sheet {
                target,
                image_path: image_path.clone(),
            });
        }
    }

    fn submit(&self, job: FetchJob) {
        if self.jobs.send(job).is_err() {
            log::error!("Sprite worker has stopped; request dropped");
        }
    }

    fn run<S: SpriteSource>(source: S, jobs: Receiver<FetchJob>, tx: Sender<AppMsg>) {
        let rt = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                let _ = tx.send(AppMsg::ErrorOccurred(format!(
                    "Failed to start request runtime: {}",
                    e
                )));
                return;
            }
        };

        let mut queued = VecDeque::new();
        loop {
            if queued.is_empty() {
                match jobs.recv() {
                    Ok(job) => queued.push_back(job),
                    Err(_) => break,
                }
            }
            queued.extend(jobs.try_iter());
            let Some(job) = queued.pop_front() else {
                continue;
            };

            let msg = if job.is_superseded(&queued) {
                job.skipped()
            } else {
                Some(rt.block_on(Self::run_job(&source, job)))
            };
            if let Some(msg) = msg {
                if tx.send(msg).is_err() {
                    break;
                }
            }
        }
    }

    async fn run_job<S: SpriteSource>(source: &S, job: FetchJob) -> AppMsg {
        match job {
            FetchJob::Paths {
                target,
                monster_id,
                mode,
            } => match source.fetch_paths(monster_id, mode).await {
                Ok(paths) => {
                    log::info!(
                        "Found {} {} images for monster {}",
                        paths.len(),
                        mode,
                        monster_id
                    );
                    AppMsg::PathsLoaded {
                        target,
                        descriptors: resolve(&paths),
                    }
                }
                Err(e) => {
                    log::error!("Listing {} images for monster {}: {}", mode, monster_id, e);
                    AppMsg::PathsFailed {
                        target,
                        reason: e.to_string(),
                    }
                }
            },
            FetchJob::Sheet { target, image_path } => {
                match source.fetch_sheet(&image_path).await {
                    Ok(sheet) => {
                        log::debug!(
                            "Loaded sheet {} ({}x{})",
                            image_path,
                            sheet.width(),
                            sheet.height()
                        );
                        AppMsg::SheetLoaded {
                            target,
                            image_path,
                            sheet: Arc::new(sheet),
                        }
                    }
                    Err(e) => {
                        log::warn!("Sheet {}: {}", image_path, e);
                        AppMsg::SheetFailed {
                            target,
                            image_path,
                            reason: e.to_string(),
                        }
                    }
                }
            }
        }
    }
}
