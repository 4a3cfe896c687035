// `log` backend that feeds the Logs panel

use crossbeam_channel::Sender;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use crate::event::AppMsg;

pub struct ChannelLogger {
    tx: Sender<AppMsg>,
    level: LevelFilter,
}

impl ChannelLogger {
    pub fn new(tx: Sender<AppMsg>, level: LevelFilter) -> Self {
        Self { tx, level }
    }

    /// Installs the logger process-wide. Fails if a logger is already set.
    pub fn init(tx: Sender<AppMsg>, level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(Self::new(tx, level)))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for ChannelLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        // The UI may already be gone during shutdown.
        let _ = self.tx.send(AppMsg::LogMessage(format!(
            "{:<5} {}",
            record.level(),
            record.args()
        )));
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use log::Level;

    #[test]
    fn test_records_become_log_messages() {
        let (tx, rx) = unbounded();
        let logger = ChannelLogger::new(tx, LevelFilter::Info);

        logger.log(
            &Record::builder()
                .args(format_args!("Found {} images", 4))
                .level(Level::Warn)
                .build(),
        );
        logger.log(
            &Record::builder()
                .args(format_args!("GET /images/x.png"))
                .level(Level::Debug)
                .build(),
        );

        let messages: Vec<String> = rx
            .try_iter()
            .filter_map(|m| match m {
                AppMsg::LogMessage(s) => Some(s),
                _ => None,
            })
            .collect();
        assert_eq!(messages, vec!["WARN  Found 4 images".to_string()]);
    }
}
