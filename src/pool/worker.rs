// Tue Jan 15 2026 - Alex

use crate::error::{LinkError, ParseError};
use crate::files::{IgnoredFile, ParsedFile};
use crate::format::probe::make_file;
use crate::options::{FileInfo, LinkOptions};
use crate::pool::queue::PoolShared;
use std::sync::Arc;
use std::thread;

// parsers use large stack buffers
const WORKER_STACK_SIZE: usize = 8 * 1024 * 1024;

pub fn spawn_worker(shared: &Arc<PoolShared>) {
    let shared = shared.clone();
    let _ = thread::Builder::new()
        .name("machld-parser".to_string())
        .stack_size(WORKER_STACK_SIZE)
        .spawn(move || worker_loop(shared));
}

/// What to do with a parse failure: some failures only mean "skip this
/// file" and fill the slot with an Ignored sentinel.
enum Disposition {
    SilentlySkip,
    WarnAndSkip,
    Fatal,
}

fn disposition(err: &ParseError, options: &LinkOptions) -> Disposition {
    if err.is_architecture_mismatch() && !options.error_on_other_arch_files {
        if options.ignore_other_arch_input_files {
            // an architecture not in use
            return Disposition::SilentlySkip;
        }
        return Disposition::WarnAndSkip;
    }
    if err.is_unexpected_dylib() {
        return Disposition::WarnAndSkip;
    }
    if matches!(err, ParseError::BitcodeUnavailable { .. }) {
        return Disposition::WarnAndSkip;
    }
    Disposition::Fatal
}

fn worker_loop(shared: Arc<PoolShared>) {
    let infos: &[FileInfo] = &shared.options.inputs;
    let mut state = shared.state.lock();
    loop {
        if state.remaining == 0 {
            break;
        }
        if state.available == 0 {
            state.idle_workers += 1;
            shared.work_ready.wait(&mut state);
            state.idle_workers -= 1;
            continue;
        }

        let mut slot = state.cursor;
        while slot < infos.len() && (state.parsed[slot].is_some() || !state.ready[slot]) {
            slot += 1;
        }
        if slot >= infos.len() {
            // the availability count was stale
            state.available = 0;
            continue;
        }
        state.ready[slot] = false;
        state.cursor = slot + 1;
        state.available -= 1;
        drop(state);

        let info = &infos[slot];
        let result = make_file(&shared.options, info, false, &shared.stats);

        state = shared.state.lock();
        if state.remaining > 0 {
            state.remaining -= 1;
        }
        match result {
            Ok(file) => {
                state.parsed[slot] = Some(file);
                if state.needed_slot == Some(slot) {
                    shared.new_file.notify_one();
                }
            }
            Err(err) => {
                let disp = disposition(&err, &shared.options);
                if let Disposition::Fatal = disp {
                    // about to die; stop the other workers from doing
                    // unneeded work
                    state.error = Some(LinkError::in_file(info.path.clone(), err));
                    state.remaining = 0;
                } else {
                    if let Disposition::WarnAndSkip = disp {
                        log::warn!("ignoring file {}, {}", info.path.display(), err);
                    }
                    state.parsed[slot] = Some(ParsedFile::Ignored(IgnoredFile::new(
                        &info.path,
                        info.mod_time,
                        info.ordinal,
                    )));
                    if state.needed_slot == Some(slot) {
                        shared.new_file.notify_one();
                    }
                }
            }
        }
    }
    shared.work_ready.notify_all();
    shared.new_file.notify_one();
    drop(state);
}
