// Tue Jan 15 2026 - Alex

use crate::error::{LinkError, ParseError};
use crate::pool::queue::PoolShared;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

/// Streams filenames from the build system's FIFO, releasing the matching
/// slots to the worker pool as the files land on disk. Only runs when a
/// pipeline FIFO is configured.
pub fn spawn_listener(shared: &Arc<PoolShared>) {
    let shared = shared.clone();
    let _ = thread::Builder::new()
        .name("machld-pipeline".to_string())
        .spawn(move || {
            if let Err(err) = listen(&shared) {
                let mut state = shared.state.lock();
                state.error = Some(LinkError::Parse(err));
                shared.new_file.notify_one();
            }
        });
}

fn listen(shared: &Arc<PoolShared>) -> Result<(), ParseError> {
    let fifo = shared
        .options
        .pipeline_fifo
        .clone()
        .ok_or_else(|| ParseError::Pipeline {
            reason: "no fifo configured".to_string(),
        })?;

    let mut expected: HashMap<PathBuf, usize> = HashMap::new();
    for info in &shared.options.inputs {
        if info.from_file_list {
            expected.insert(info.path.clone(), info.slot);
        }
    }

    let stream = File::open(&fifo).map_err(|e| ParseError::Pipeline {
        reason: format!(
            "failed to open stream. open() returns {} for \"{}\"",
            e,
            fifo.display()
        ),
    })?;
    let mut lines = BufReader::new(stream).lines();

    while !expected.is_empty() {
        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                return Err(ParseError::Pipeline {
                    reason: format!("read failed: {}", e),
                })
            }
            None => {
                return Err(ParseError::Pipeline {
                    reason: format!("{} missing input files", expected.len()),
                })
            }
        };
        let path = PathBuf::from(line);
        let slot = expected
            .remove(&path)
            .ok_or_else(|| ParseError::Pipeline {
                reason: format!("not in file list: {}", path.display()),
            })?;
        let info = &shared.options.inputs[slot];
        if !info.exists_non_empty() {
            return Err(ParseError::Pipeline {
                reason: format!("file does not exist: {}", info.path.display()),
            });
        }

        let mut state = shared.state.lock();
        if state.idle_workers > 0 {
            shared.work_ready.notify_one();
        }
        state.ready[slot] = true;
        if state.cursor > slot {
            state.cursor = slot;
        }
        state.available += 1;
    }
    Ok(())
}
